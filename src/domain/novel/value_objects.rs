//! Novel Context - Value Objects

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};

/// 小说文件的规范化绝对路径，同时是书库与进度的键
///
/// 比较、排序与哈希都按路径的原始字节进行（纯字符串字典序），
/// 而不是 `PathBuf` 的逐组件比较
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NovelPath(PathBuf);

impl NovelPath {
    /// 解析为规范化绝对路径（文件必须存在）
    pub fn canonicalize(path: impl AsRef<Path>) -> std::io::Result<Self> {
        std::fs::canonicalize(path).map(Self)
    }

    pub fn as_path(&self) -> &Path {
        &self.0
    }

    fn as_bytes(&self) -> &[u8] {
        self.0.as_os_str().as_encoded_bytes()
    }

    /// 用于列表展示的文件名
    pub fn file_name(&self) -> String {
        self.0
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.0.display().to_string())
    }
}

impl PartialEq for NovelPath {
    fn eq(&self, other: &Self) -> bool {
        self.as_bytes() == other.as_bytes()
    }
}

impl Eq for NovelPath {}

impl Hash for NovelPath {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.as_bytes().hash(state);
    }
}

impl PartialOrd for NovelPath {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for NovelPath {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_bytes().cmp(other.as_bytes())
    }
}

impl From<PathBuf> for NovelPath {
    fn from(path: PathBuf) -> Self {
        Self(path)
    }
}

impl From<&str> for NovelPath {
    fn from(path: &str) -> Self {
        Self(PathBuf::from(path))
    }
}

impl std::fmt::Display for NovelPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0.display())
    }
}
