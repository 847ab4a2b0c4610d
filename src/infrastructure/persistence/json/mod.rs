//! JSON 文件存储

mod library_store;

pub use library_store::{JsonLibraryStore, LIBRARY_FILE, PROGRESS_FILE};
