//! Infrastructure Layer - 基础设施层
//!
//! 提供所有端口的具体实现，以及命令行入口

pub mod adapters;
pub mod cli;
pub mod events;
pub mod memory;
pub mod persistence;
pub mod signal;

pub use adapters::{CommandSpeechClient, CommandSpeechClientConfig};
pub use events::EventPublisher;
pub use memory::InMemoryLibraryStore;
pub use persistence::JsonLibraryStore;
