//! Session - 命令执行期间的内存状态
//!
//! 独占书库、阅读进度、当前小说指针与脏标记，由命令分发器持有，
//! 以 `&mut Session` 的形式交给各命令处理器。没有进程级全局状态。

use std::sync::Arc;

use crate::application::error::ApplicationError;
use crate::application::ports::{
    LibraryRecord, LibraryStorePort, NovelEntry, ProgressData, ProgressRecord,
};
use crate::domain::novel::{Chapter, Novel, NovelPath};

pub struct Session {
    store: Arc<dyn LibraryStorePort>,
    library: LibraryRecord,
    progress: ProgressData,
    library_dirty: bool,
    progress_dirty: bool,
}

impl Session {
    pub fn new(
        store: Arc<dyn LibraryStorePort>,
        library: LibraryRecord,
        progress: ProgressData,
    ) -> Self {
        Self {
            store,
            library,
            progress,
            library_dirty: false,
            progress_dirty: false,
        }
    }

    /// 从持久化服务加载；任何加载错误都回退为空的默认值
    pub async fn load(store: Arc<dyn LibraryStorePort>) -> Self {
        let library = match store.load_library().await {
            Ok(library) => library,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load library, starting with an empty one");
                LibraryRecord::default()
            }
        };
        let progress = match store.load_progress().await {
            Ok(progress) => progress,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load progress, starting with empty progress");
                ProgressData::new()
            }
        };

        let mut session = Self::new(store, library, progress);

        if let Some(active) = session.library.active_novel_path.clone() {
            if !session.library.novels.contains_key(&active) {
                tracing::warn!(path = %active, "Active novel not found in library, clearing it");
                session.library.active_novel_path = None;
                session.library_dirty = true;
            }
        }

        session
    }

    // ------------------------------------------------------------------
    // 书库
    // ------------------------------------------------------------------

    pub fn library(&self) -> &LibraryRecord {
        &self.library
    }

    pub fn novel_count(&self) -> usize {
        self.library.novels.len()
    }

    pub fn contains(&self, path: &NovelPath) -> bool {
        self.library.novels.contains_key(path)
    }

    pub fn entry(&self, path: &NovelPath) -> Option<&NovelEntry> {
        self.library.novels.get(path)
    }

    /// 按路径字典序排列的小说
    pub fn sorted_entries(&self) -> impl Iterator<Item = &NovelEntry> {
        self.library.novels.values()
    }

    /// 把 `list` 中的 1 起始序号解析为路径
    pub fn path_at(&self, index: usize) -> Result<NovelPath, ApplicationError> {
        let slot = ApplicationError::check_index(index, self.novel_count())?;
        self.library
            .novels
            .keys()
            .nth(slot)
            .cloned()
            .ok_or(ApplicationError::IndexOutOfRange {
                index,
                max: self.novel_count(),
            })
    }

    pub fn insert_novel(&mut self, entry: NovelEntry) {
        self.library.novels.insert(entry.file_path.clone(), entry);
        self.library_dirty = true;
    }

    /// 删除小说及其进度；若删除的是当前小说则清空指针
    pub fn remove_novel(&mut self, path: &NovelPath) -> Option<NovelEntry> {
        let removed = self.library.novels.remove(path)?;
        if self.progress.remove(path).is_some() {
            self.progress_dirty = true;
        }
        if self.library.active_novel_path.as_ref() == Some(path) {
            self.library.active_novel_path = None;
        }
        self.library_dirty = true;
        Some(removed)
    }

    pub fn active_path(&self) -> Option<&NovelPath> {
        self.library.active_novel_path.as_ref()
    }

    pub fn require_active(&self) -> Result<NovelPath, ApplicationError> {
        self.active_path().cloned().ok_or(ApplicationError::NoActiveNovel)
    }

    pub fn set_active(&mut self, path: Option<NovelPath>) {
        if self.library.active_novel_path != path {
            self.library.active_novel_path = path;
            self.library_dirty = true;
        }
    }

    pub fn auto_read_next(&self) -> bool {
        self.library.auto_read_next
    }

    pub fn set_auto_read_next(&mut self, enabled: bool) {
        if self.library.auto_read_next != enabled {
            self.library.auto_read_next = enabled;
            self.library_dirty = true;
        }
    }

    // ------------------------------------------------------------------
    // 章节缓存
    // ------------------------------------------------------------------

    /// 确保章节已加载，返回章节数
    ///
    /// 缓存缺失或与已存标题数量不一致时，按存储的格式重新读取并切分原文，
    /// 同时刷新标题列表
    pub async fn ensure_chapters(&mut self, path: &NovelPath) -> Result<usize, ApplicationError> {
        let entry = self
            .library
            .novels
            .get(path)
            .ok_or_else(|| ApplicationError::not_found("Novel", path))?;
        if entry.has_fresh_chapters() {
            return Ok(entry.chapter_titles.len());
        }

        let pattern = entry.detected_pattern;
        tracing::info!(path = %path, format = %pattern, "Loading chapters");
        let text = Novel::read_text(path).await?;
        let novel = Novel::with_pattern(&text, pattern)?;
        let titles = novel.chapter_titles();

        let entry = self
            .library
            .novels
            .get_mut(path)
            .ok_or_else(|| ApplicationError::not_found("Novel", path))?;
        if entry.chapter_titles != titles {
            entry.chapter_titles = titles;
            self.library_dirty = true;
        }
        let count = novel.chapter_count();
        entry.chapters = Some(novel.into_chapters());
        tracing::info!(path = %path, chapters = count, "Loaded chapters");
        Ok(count)
    }

    /// 已加载的章节
    pub fn chapter(&self, path: &NovelPath, index: usize) -> Option<&Chapter> {
        self.library
            .novels
            .get(path)?
            .chapters
            .as_ref()?
            .get(index)
    }

    // ------------------------------------------------------------------
    // 进度
    // ------------------------------------------------------------------

    /// 当前进度，没有记录时为 (0, 0)
    pub fn progress(&self, path: &NovelPath) -> ProgressRecord {
        self.progress.get(path).copied().unwrap_or_default()
    }

    /// 仅更新内存中的进度，位置变化时标记为脏
    pub fn record_progress(&mut self, path: &NovelPath, chapter: usize, segment: usize) {
        let unchanged = self
            .progress
            .get(path)
            .map_or(false, |p| p.same_position(chapter, segment));
        if unchanged {
            return;
        }
        self.progress
            .insert(path.clone(), ProgressRecord::new(chapter, segment));
        self.progress_dirty = true;
    }

    pub fn is_dirty(&self) -> bool {
        self.library_dirty || self.progress_dirty
    }

    pub fn is_progress_dirty(&self) -> bool {
        self.progress_dirty
    }

    // ------------------------------------------------------------------
    // 持久化（尽力而为：失败只记录日志并保留脏标记）
    // ------------------------------------------------------------------

    /// 立即保存进度
    pub async fn persist_progress(&mut self) {
        match self.store.save_progress(&self.progress).await {
            Ok(()) => {
                self.progress_dirty = false;
                tracing::debug!(novels = self.progress.len(), "Progress saved");
            }
            Err(e) => tracing::error!(error = %e, "Failed to save progress"),
        }
    }

    /// 立即保存书库配置
    pub async fn persist_library(&mut self) {
        match self.store.save_library(&self.library).await {
            Ok(()) => {
                self.library_dirty = false;
                tracing::debug!(novels = self.library.novels.len(), "Library saved");
            }
            Err(e) => tracing::error!(error = %e, "Failed to save library"),
        }
    }

    /// 进度为脏时才保存
    pub async fn flush_progress(&mut self) {
        if self.progress_dirty {
            self.persist_progress().await;
        }
    }

    /// 保存所有脏状态（退出、收到信号、切换小说前调用）
    pub async fn flush(&mut self) {
        if self.library_dirty {
            self.persist_library().await;
        }
        self.flush_progress().await;
    }
}
