//! Novel Context - 小说限界上下文
//!
//! 职责:
//! - 章节标题格式检测
//! - 按标题切分章节
//! - 小说聚合管理

mod aggregate;
mod detector;
mod entities;
mod errors;
mod heading;
mod splitter;
mod value_objects;

pub use aggregate::Novel;
pub use detector::{detect_format, sample_prefix, score_patterns, DEFAULT_SAMPLE_BYTES};
pub use entities::Chapter;
pub use errors::NovelError;
pub use heading::HeadingPattern;
pub use splitter::split_chapters;
pub use value_objects::NovelPath;
