//! Application Ports - 出站端口定义
//!
//! 定义应用层与基础设施层的抽象接口

mod library_store;
mod speech_engine;

pub use library_store::{
    LibraryRecord, LibraryStorePort, NovelEntry, ProgressData, ProgressRecord, RepositoryError,
};
pub use speech_engine::{SpeechEnginePort, SpeechError, SpeechHandle};
