//! CLI - 命令行入口
//!
//! clap 命令定义与分发

mod commands;
mod dispatcher;

pub use commands::{Cli, Commands};
pub use dispatcher::{Dispatcher, Outcome};
