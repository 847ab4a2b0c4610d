//! Novel Context - Entities

use serde::{Deserialize, Serialize};

use crate::domain::text_segmenter::segment_chapter;

/// 章节
///
/// 不变量:
/// - 标题与正文都已去除首尾空白
/// - 在 Novel 内按原文顺序排列
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    title: String,
    body: String,
}

impl Chapter {
    pub fn new(title: impl AsRef<str>, body: impl AsRef<str>) -> Self {
        Self {
            title: title.as_ref().trim().to_string(),
            body: body.as_ref().trim().to_string(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn body(&self) -> &str {
        &self.body
    }

    /// 朗读单位列表，空章节返回空列表
    pub fn segments(&self) -> Vec<String> {
        segment_chapter(&self.body)
    }
}
