//! 应用层 - 命令（写操作）
//!
//! CQRS 命令侧：修改书库、进度或配置

mod narration_commands;
mod novel_commands;

pub mod handlers;

pub use narration_commands::*;
pub use novel_commands::*;
