//! Novel Context - Aggregate Root

use super::detector::{detect_format, sample_prefix};
use super::splitter::split_chapters;
use super::{Chapter, HeadingPattern, NovelError, NovelPath};

/// Novel 聚合根
///
/// 不变量:
/// - 至少包含一个章节
/// - 章节顺序与原文一致
/// - 创建后不再修改，原文变化时重新解析
#[derive(Debug, Clone)]
pub struct Novel {
    pattern: HeadingPattern,
    chapters: Vec<Chapter>,
}

impl Novel {
    /// 检测格式并切分章节（加入书库时使用）
    ///
    /// 检测只看前 `sample_bytes` 字节，切分使用全文
    pub fn detect(text: &str, sample_bytes: usize) -> Result<Self, NovelError> {
        let pattern = detect_format(sample_prefix(text, sample_bytes))?;
        Self::with_pattern(text, pattern)
    }

    /// 使用已知格式切分章节（按需重新加载时使用）
    pub fn with_pattern(text: &str, pattern: HeadingPattern) -> Result<Self, NovelError> {
        let chapters = split_chapters(text, pattern)?;
        Ok(Self { pattern, chapters })
    }

    /// 从文件读取全文
    pub async fn read_text(path: &NovelPath) -> Result<String, NovelError> {
        tokio::fs::read_to_string(path.as_path())
            .await
            .map_err(|e| NovelError::FileRead {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }

    // Getters
    pub fn pattern(&self) -> HeadingPattern {
        self.pattern
    }

    pub fn chapter_count(&self) -> usize {
        self.chapters.len()
    }

    pub fn chapter_titles(&self) -> Vec<String> {
        self.chapters.iter().map(|c| c.title().to_string()).collect()
    }

    pub fn into_chapters(self) -> Vec<Chapter> {
        self.chapters
    }
}
