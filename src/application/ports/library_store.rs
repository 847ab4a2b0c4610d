//! Library Store Port - 书库与阅读进度持久化
//!
//! 定义持久化的抽象接口，具体实现在 infrastructure 层（JSON 文件、内存）

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

use crate::domain::novel::{Chapter, HeadingPattern, NovelPath};

/// Repository 错误
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

/// 书库中的一本小说
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NovelEntry {
    pub file_path: NovelPath,
    /// 章节标题（与章节一一对应，用于列表展示）
    #[serde(default)]
    pub chapter_titles: Vec<String>,
    /// 检测到的标题格式
    #[serde(default = "default_pattern", deserialize_with = "lenient_pattern")]
    pub detected_pattern: HeadingPattern,
    /// 按需加载的章节缓存，不持久化
    #[serde(skip)]
    pub chapters: Option<Vec<Chapter>>,
}

fn default_pattern() -> HeadingPattern {
    HeadingPattern::Markdown
}

/// 未知的格式名回退为 Markdown
fn lenient_pattern<'de, D>(deserializer: D) -> Result<HeadingPattern, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let name = String::deserialize(deserializer)?;
    Ok(HeadingPattern::from_name(&name).unwrap_or_else(|| {
        tracing::warn!(pattern = %name, "Unknown heading pattern, falling back to markdown");
        default_pattern()
    }))
}

impl NovelEntry {
    pub fn new(file_path: NovelPath, pattern: HeadingPattern, chapters: Vec<Chapter>) -> Self {
        Self {
            file_path,
            chapter_titles: chapters.iter().map(|c| c.title().to_string()).collect(),
            detected_pattern: pattern,
            chapters: Some(chapters),
        }
    }

    /// 缓存是否可用：已加载且与标题数量一致
    pub fn has_fresh_chapters(&self) -> bool {
        matches!(&self.chapters, Some(chapters)
            if !chapters.is_empty() && chapters.len() == self.chapter_titles.len())
    }
}

/// 书库配置（不常变化的部分）
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LibraryRecord {
    /// 路径 -> 小说，按路径排序
    #[serde(default)]
    pub novels: BTreeMap<NovelPath, NovelEntry>,
    #[serde(default)]
    pub active_novel_path: Option<NovelPath>,
    /// 读完一段后自动继续（含自动进入下一章）
    #[serde(default)]
    pub auto_read_next: bool,
}

/// 单本小说的阅读进度（0 起始）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgressRecord {
    pub chapter_index: usize,
    pub segment_index: usize,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressRecord {
    pub fn new(chapter_index: usize, segment_index: usize) -> Self {
        Self {
            chapter_index,
            segment_index,
            updated_at: Some(Utc::now()),
        }
    }

    /// 只比较位置，不比较时间戳
    pub fn same_position(&self, chapter_index: usize, segment_index: usize) -> bool {
        self.chapter_index == chapter_index && self.segment_index == segment_index
    }
}

impl Default for ProgressRecord {
    fn default() -> Self {
        Self {
            chapter_index: 0,
            segment_index: 0,
            updated_at: None,
        }
    }
}

/// 全部小说的阅读进度
pub type ProgressData = BTreeMap<NovelPath, ProgressRecord>;

/// Library Store Port
///
/// 加载失败不应导致进程退出：调用方在出错时回退到空的默认值
#[async_trait]
pub trait LibraryStorePort: Send + Sync {
    /// 加载书库配置，不存在时返回默认值
    async fn load_library(&self) -> Result<LibraryRecord, RepositoryError>;

    /// 保存书库配置
    async fn save_library(&self, library: &LibraryRecord) -> Result<(), RepositoryError>;

    /// 加载阅读进度，不存在或损坏时返回空表
    async fn load_progress(&self) -> Result<ProgressData, RepositoryError>;

    /// 保存阅读进度
    async fn save_progress(&self, progress: &ProgressData) -> Result<(), RepositoryError>;
}
