//! Novel Context - Chapter Splitter

use super::{Chapter, HeadingPattern, NovelError};

/// 按章节标题把全文切分为有序章节
///
/// - 第一个标题之前的文本被丢弃
/// - 标题与正文去除首尾空白，其余保持原样
/// - 一个章节都没有时返回 [`NovelError::NoChapters`]
pub fn split_chapters(text: &str, pattern: HeadingPattern) -> Result<Vec<Chapter>, NovelError> {
    let mut chapters = Vec::new();
    let mut current_title: Option<&str> = None;
    let mut current_body = String::new();

    for line in text.lines() {
        if pattern.is_heading(line) {
            if let Some(title) = current_title.take() {
                chapters.push(Chapter::new(title, &current_body));
            }
            current_title = Some(line);
            current_body.clear();
        } else if current_title.is_some() {
            current_body.push_str(line);
            current_body.push('\n');
        }
    }

    if let Some(title) = current_title {
        chapters.push(Chapter::new(title, &current_body));
    }

    if chapters.is_empty() {
        return Err(NovelError::NoChapters(pattern));
    }
    Ok(chapters)
}
