//! JSON Library Store
//!
//! 书库与进度分别存放在数据目录下的 `library.json` 和 `progress.json`

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::application::ports::{LibraryRecord, LibraryStorePort, ProgressData, RepositoryError};

pub const LIBRARY_FILE: &str = "library.json";
pub const PROGRESS_FILE: &str = "progress.json";

/// 基于 JSON 文件的书库存储
pub struct JsonLibraryStore {
    data_dir: PathBuf,
    library_path: PathBuf,
    progress_path: PathBuf,
}

impl JsonLibraryStore {
    /// 目录在第一次保存时创建
    pub fn new(data_dir: impl AsRef<Path>) -> Self {
        let data_dir = data_dir.as_ref().to_path_buf();
        Self {
            library_path: data_dir.join(LIBRARY_FILE),
            progress_path: data_dir.join(PROGRESS_FILE),
            data_dir,
        }
    }

    pub fn library_path(&self) -> &Path {
        &self.library_path
    }

    pub fn progress_path(&self) -> &Path {
        &self.progress_path
    }

    /// 读取文件，不存在时返回 None
    async fn read_optional(path: &Path) -> Result<Option<String>, RepositoryError> {
        match fs::read_to_string(path).await {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(RepositoryError::IoError(format!(
                "{}: {}",
                path.display(),
                e
            ))),
        }
    }

    /// 先写临时文件再重命名，避免留下写了一半的文件
    async fn write_atomic<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), RepositoryError> {
        let json = serde_json::to_vec_pretty(value)
            .map_err(|e| RepositoryError::SerializationError(e.to_string()))?;

        fs::create_dir_all(&self.data_dir)
            .await
            .map_err(|e| RepositoryError::IoError(e.to_string()))?;

        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, &json)
            .await
            .map_err(|e| RepositoryError::IoError(format!("{}: {}", tmp_path.display(), e)))?;
        fs::rename(&tmp_path, path)
            .await
            .map_err(|e| RepositoryError::IoError(format!("{}: {}", path.display(), e)))?;

        tracing::debug!(path = %path.display(), bytes = json.len(), "Saved");
        Ok(())
    }

    fn parse<T: DeserializeOwned>(path: &Path, content: &str) -> Result<T, RepositoryError> {
        serde_json::from_str(content)
            .map_err(|e| RepositoryError::SerializationError(format!("{}: {}", path.display(), e)))
    }
}

#[async_trait]
impl LibraryStorePort for JsonLibraryStore {
    async fn load_library(&self) -> Result<LibraryRecord, RepositoryError> {
        match Self::read_optional(&self.library_path).await? {
            Some(content) => Self::parse(&self.library_path, &content),
            None => Ok(LibraryRecord::default()),
        }
    }

    async fn save_library(&self, library: &LibraryRecord) -> Result<(), RepositoryError> {
        self.write_atomic(&self.library_path, library).await
    }

    async fn load_progress(&self) -> Result<ProgressData, RepositoryError> {
        let Some(content) = Self::read_optional(&self.progress_path).await? else {
            return Ok(ProgressData::new());
        };

        match Self::parse(&self.progress_path, &content) {
            Ok(progress) => Ok(progress),
            Err(e) => {
                tracing::warn!(error = %e, "Progress file is corrupt, starting with empty progress");
                Ok(ProgressData::new())
            }
        }
    }

    async fn save_progress(&self, progress: &ProgressData) -> Result<(), RepositoryError> {
        self.write_atomic(&self.progress_path, progress).await
    }
}
