//! 应用层错误定义
//!
//! 统一的命令/查询错误类型

use thiserror::Error;

use crate::domain::novel::NovelError;

/// 应用层错误
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// 没有选中的小说
    #[error("No active novel selected. Use 'switch <index>' first.")]
    NoActiveNovel,

    /// 小说已在书库中
    #[error("Novel '{0}' already exists in the library.")]
    AlreadyExists(String),

    /// 资源未找到
    #[error("{resource_type} not found: {id}")]
    NotFound {
        resource_type: &'static str,
        id: String,
    },

    /// 用户给出的 1 起始序号越界
    #[error("Index {index} is out of range. Valid range is 1 to {max}.")]
    IndexOutOfRange { index: usize, max: usize },

    /// 未知配置项
    #[error("Unknown config setting '{0}'. Available: auto_next")]
    UnknownSetting(String),

    /// 格式检测或章节切分失败
    #[error(transparent)]
    Novel(#[from] NovelError),

    /// 仓储错误
    #[error("Repository error: {0}")]
    RepositoryError(String),
}

impl ApplicationError {
    /// 创建 NotFound 错误
    pub fn not_found(resource_type: &'static str, id: impl std::fmt::Display) -> Self {
        Self::NotFound {
            resource_type,
            id: id.to_string(),
        }
    }

    /// 校验 1 起始序号，返回 0 起始序号
    pub fn check_index(index: usize, max: usize) -> Result<usize, Self> {
        if index < 1 || index > max {
            return Err(Self::IndexOutOfRange { index, max });
        }
        Ok(index - 1)
    }
}

impl From<crate::application::ports::RepositoryError> for ApplicationError {
    fn from(err: crate::application::ports::RepositoryError) -> Self {
        Self::RepositoryError(err.to_string())
    }
}
