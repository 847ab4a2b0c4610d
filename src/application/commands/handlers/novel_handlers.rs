//! Novel Command Handlers - 书库管理

use crate::application::commands::{AddNovel, RemoveNovel, SwitchNovel, ToggleSetting};
use crate::application::error::ApplicationError;
use crate::application::ports::NovelEntry;
use crate::application::session::Session;
use crate::domain::novel::{HeadingPattern, Novel, NovelPath, DEFAULT_SAMPLE_BYTES};

// ============================================================================
// AddNovel
// ============================================================================

/// 加入小说响应
#[derive(Debug, Clone)]
pub struct AddNovelResponse {
    pub path: NovelPath,
    pub pattern: HeadingPattern,
    pub chapter_count: usize,
}

/// AddNovel Handler
pub struct AddNovelHandler {
    /// 格式检测读取的样本字节数
    sample_bytes: usize,
}

impl AddNovelHandler {
    pub fn new(sample_bytes: usize) -> Self {
        Self { sample_bytes }
    }

    pub async fn handle(
        &self,
        session: &mut Session,
        command: AddNovel,
    ) -> Result<AddNovelResponse, ApplicationError> {
        let path = NovelPath::canonicalize(&command.path)
            .map_err(|_| ApplicationError::not_found("File", command.path.display()))?;

        if session.contains(&path) {
            return Err(ApplicationError::AlreadyExists(path.to_string()));
        }

        let text = Novel::read_text(&path).await?;
        let novel = Novel::detect(&text, self.sample_bytes)?;
        let pattern = novel.pattern();
        let chapter_count = novel.chapter_count();

        session.insert_novel(NovelEntry::new(path.clone(), pattern, novel.into_chapters()));
        session.set_active(Some(path.clone()));

        tracing::info!(
            path = %path,
            format = %pattern,
            chapters = chapter_count,
            "Novel added"
        );

        Ok(AddNovelResponse {
            path,
            pattern,
            chapter_count,
        })
    }
}

impl Default for AddNovelHandler {
    fn default() -> Self {
        Self::new(DEFAULT_SAMPLE_BYTES)
    }
}

// ============================================================================
// RemoveNovel
// ============================================================================

/// 删除小说响应
#[derive(Debug, Clone)]
pub struct RemoveNovelResponse {
    pub index: usize,
    pub path: NovelPath,
    pub was_active: bool,
}

/// RemoveNovel Handler
pub struct RemoveNovelHandler;

impl RemoveNovelHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        session: &mut Session,
        command: RemoveNovel,
    ) -> Result<RemoveNovelResponse, ApplicationError> {
        let path = session.path_at(command.index)?;
        let was_active = session.active_path() == Some(&path);

        session
            .remove_novel(&path)
            .ok_or_else(|| ApplicationError::not_found("Novel", &path))?;

        tracing::info!(path = %path, was_active = was_active, "Novel removed");

        Ok(RemoveNovelResponse {
            index: command.index,
            path,
            was_active,
        })
    }
}

impl Default for RemoveNovelHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// SwitchNovel
// ============================================================================

/// 切换小说响应
#[derive(Debug, Clone)]
pub struct SwitchNovelResponse {
    pub path: NovelPath,
    pub already_active: bool,
    /// 章节加载失败时为 None（切换本身仍然成功）
    pub chapter_count: Option<usize>,
}

/// SwitchNovel Handler
pub struct SwitchNovelHandler;

impl SwitchNovelHandler {
    pub fn new() -> Self {
        Self
    }

    /// 切换前先落盘上一本的未保存进度，切换后立即保存新的当前指针
    pub async fn handle(
        &self,
        session: &mut Session,
        command: SwitchNovel,
    ) -> Result<SwitchNovelResponse, ApplicationError> {
        let path = session.path_at(command.index)?;

        if session.active_path() == Some(&path) {
            return Ok(SwitchNovelResponse {
                path,
                already_active: true,
                chapter_count: None,
            });
        }

        if session.is_dirty() {
            tracing::info!("Saving progress for previous novel before switching");
            session.flush().await;
        }

        session.set_active(Some(path.clone()));

        let chapter_count = match session.ensure_chapters(&path).await {
            Ok(count) => Some(count),
            Err(e) => {
                tracing::warn!(path = %path, error = %e, "Failed to load chapters after switching");
                None
            }
        };

        session.persist_library().await;

        tracing::info!(path = %path, "Switched active novel");

        Ok(SwitchNovelResponse {
            path,
            already_active: false,
            chapter_count,
        })
    }
}

impl Default for SwitchNovelHandler {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// ToggleSetting
// ============================================================================

/// 切换配置项响应
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleSettingResponse {
    pub setting: String,
    pub enabled: bool,
}

/// ToggleSetting Handler
pub struct ToggleSettingHandler;

impl ToggleSettingHandler {
    pub fn new() -> Self {
        Self
    }

    pub async fn handle(
        &self,
        session: &mut Session,
        command: ToggleSetting,
    ) -> Result<ToggleSettingResponse, ApplicationError> {
        match command.setting.as_str() {
            "auto_next" => {
                let enabled = !session.auto_read_next();
                session.set_auto_read_next(enabled);
                tracing::info!(auto_next = enabled, "Setting toggled");
                Ok(ToggleSettingResponse {
                    setting: command.setting,
                    enabled,
                })
            }
            _ => Err(ApplicationError::UnknownSetting(command.setting)),
        }
    }
}

impl Default for ToggleSettingHandler {
    fn default() -> Self {
        Self::new()
    }
}
