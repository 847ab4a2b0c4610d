//! Recite - 命令行小说朗读工具
//!
//! 架构设计: DDD + CQRS + Hexagonal Architecture
//!
//! 领域层 (domain/):
//! - Novel Context: 格式检测、章节切分
//! - Text Segmenter: 章节分段
//! - Narration: 朗读状态机
//!
//! 应用层 (application/):
//! - Ports: 端口定义（SpeechEngine, LibraryStore）
//! - Session: 书库与进度的内存状态
//! - Commands: CQRS 命令处理器（含朗读主循环）
//! - Queries: CQRS 查询处理器
//!
//! 基础设施层 (infrastructure/):
//! - CLI: clap 命令定义与分发
//! - Adapters: 本地语音程序客户端
//! - Persistence: JSON 文件存储
//! - Memory: 内存存储（测试用）
//! - Events: 朗读事件发布
//! - Signal: 关闭信号

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::{load_config, AppConfig};
