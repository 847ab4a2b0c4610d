//! In-Memory Library Store Implementation
//!
//! 不落盘的持久化实现，记录保存次数并可模拟故障，供测试与试运行使用

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use crate::application::ports::{LibraryRecord, LibraryStorePort, ProgressData, RepositoryError};

/// 内存书库存储
#[derive(Default)]
pub struct InMemoryLibraryStore {
    library: Mutex<LibraryRecord>,
    progress: Mutex<ProgressData>,
    library_saves: AtomicUsize,
    progress_saves: AtomicUsize,
    fail_loads: AtomicBool,
    fail_saves: AtomicBool,
}

impl InMemoryLibraryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn seed_library(&self, library: LibraryRecord) {
        *self.library.lock().unwrap_or_else(|e| e.into_inner()) = library;
    }

    pub fn seed_progress(&self, progress: ProgressData) {
        *self.progress.lock().unwrap_or_else(|e| e.into_inner()) = progress;
    }

    /// 最近一次保存的书库
    pub fn library(&self) -> LibraryRecord {
        self.library.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// 最近一次保存的进度
    pub fn progress(&self) -> ProgressData {
        self.progress.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn library_saves(&self) -> usize {
        self.library_saves.load(Ordering::SeqCst)
    }

    pub fn progress_saves(&self) -> usize {
        self.progress_saves.load(Ordering::SeqCst)
    }

    pub fn fail_loads(&self, fail: bool) {
        self.fail_loads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_saves(&self, fail: bool) {
        self.fail_saves.store(fail, Ordering::SeqCst);
    }

    fn check(flag: &AtomicBool, op: &str) -> Result<(), RepositoryError> {
        if flag.load(Ordering::SeqCst) {
            return Err(RepositoryError::IoError(format!("simulated {} failure", op)));
        }
        Ok(())
    }
}

#[async_trait]
impl LibraryStorePort for InMemoryLibraryStore {
    async fn load_library(&self) -> Result<LibraryRecord, RepositoryError> {
        Self::check(&self.fail_loads, "load")?;
        Ok(self.library())
    }

    async fn save_library(&self, library: &LibraryRecord) -> Result<(), RepositoryError> {
        Self::check(&self.fail_saves, "save")?;
        self.seed_library(library.clone());
        self.library_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn load_progress(&self) -> Result<ProgressData, RepositoryError> {
        Self::check(&self.fail_loads, "load")?;
        Ok(self.progress())
    }

    async fn save_progress(&self, progress: &ProgressData) -> Result<(), RepositoryError> {
        Self::check(&self.fail_saves, "save")?;
        self.seed_progress(progress.clone());
        self.progress_saves.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
