//! Memory Layer - In-Memory State Management
//!
//! 书库存储的内存实现

mod library_store;

pub use library_store::InMemoryLibraryStore;
