//! Library Query Handlers

use chrono::{DateTime, Utc};

use crate::application::error::ApplicationError;
use crate::application::queries::{ListChapters, ListNovels, ShowSettings, WhereAmI};
use crate::application::session::Session;
use crate::domain::novel::NovelPath;

// ============================================================================
// Response DTOs
// ============================================================================

/// 书库列表中的一项
#[derive(Debug, Clone)]
pub struct NovelSummary {
    /// 1 起始，`remove` / `switch` 使用同一序号
    pub index: usize,
    pub path: NovelPath,
    pub file_name: String,
    pub chapter_count: usize,
    pub is_active: bool,
    /// 上次读到的章节（0 起始）
    pub chapter_index: usize,
    pub segment_index: usize,
}

/// 章节列表响应
#[derive(Debug, Clone)]
pub struct ChapterListResponse {
    pub path: NovelPath,
    pub titles: Vec<String>,
    /// 上次读到的章节（0 起始）
    pub current_chapter: usize,
}

/// 阅读位置响应
#[derive(Debug, Clone)]
pub struct WhereAmIResponse {
    pub path: NovelPath,
    pub chapter_index: usize,
    /// 进度越界时为 None
    pub chapter_title: Option<String>,
    pub segment_index: usize,
    pub updated_at: Option<DateTime<Utc>>,
}

/// 设置响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettingsResponse {
    pub auto_next: bool,
}

// ============================================================================
// Handlers
// ============================================================================

/// ListNovels Handler
pub struct ListNovelsHandler;

impl ListNovelsHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        session: &Session,
        _query: ListNovels,
    ) -> Result<Vec<NovelSummary>, ApplicationError> {
        let active = session.active_path();
        let summaries = session
            .sorted_entries()
            .enumerate()
            .map(|(i, entry)| {
                let progress = session.progress(&entry.file_path);
                NovelSummary {
                    index: i + 1,
                    path: entry.file_path.clone(),
                    file_name: entry.file_path.file_name(),
                    chapter_count: entry.chapter_titles.len(),
                    is_active: active == Some(&entry.file_path),
                    chapter_index: progress.chapter_index,
                    segment_index: progress.segment_index,
                }
            })
            .collect();
        Ok(summaries)
    }
}

impl Default for ListNovelsHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// ListChapters Handler
///
/// 章节未加载时会先读取原文
pub struct ListChaptersHandler;

impl ListChaptersHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        session: &mut Session,
        _query: ListChapters,
    ) -> Result<ChapterListResponse, ApplicationError> {
        let path = session.require_active()?;
        session.ensure_chapters(&path).await?;

        let titles = session
            .entry(&path)
            .map(|entry| entry.chapter_titles.clone())
            .unwrap_or_default();

        Ok(ChapterListResponse {
            current_chapter: session.progress(&path).chapter_index,
            path,
            titles,
        })
    }
}

impl Default for ListChaptersHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// WhereAmI Handler
///
/// 只使用已保存的标题，不读取原文
pub struct WhereAmIHandler;

impl WhereAmIHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        session: &Session,
        _query: WhereAmI,
    ) -> Result<WhereAmIResponse, ApplicationError> {
        let path = session.require_active()?;
        let progress = session.progress(&path);
        let chapter_title = session
            .entry(&path)
            .and_then(|entry| entry.chapter_titles.get(progress.chapter_index))
            .cloned();

        Ok(WhereAmIResponse {
            path,
            chapter_index: progress.chapter_index,
            chapter_title,
            segment_index: progress.segment_index,
            updated_at: progress.updated_at,
        })
    }
}

impl Default for WhereAmIHandler {
    fn default() -> Self {
        Self::new()
    }
}

/// ShowSettings Handler
pub struct ShowSettingsHandler;

impl ShowSettingsHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        session: &Session,
        _query: ShowSettings,
    ) -> Result<SettingsResponse, ApplicationError> {
        Ok(SettingsResponse {
            auto_next: session.auto_read_next(),
        })
    }
}

impl Default for ShowSettingsHandler {
    fn default() -> Self {
        Self::new()
    }
}
