//! Persistence Layer - 数据持久化
//!
//! JSON 文件存储实现

pub mod json;

pub use self::json::JsonLibraryStore;
