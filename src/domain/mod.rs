//! Domain Layer - 领域层
//!
//! - Novel Context: 格式检测、章节切分
//! - 文本分割器: 章节正文 -> 朗读片段
//! - Narration: 朗读状态机

pub mod narration;
pub mod novel;

mod text_segmenter;

pub use narration::{NarrationState, StopReason};
pub use text_segmenter::segment_chapter;
