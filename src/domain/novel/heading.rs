//! Novel Context - Heading Patterns
//!
//! 章节标题识别规则（无状态，任何输入都有结果）

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

static CHINESE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*第\s*[一二三四五六七八九十百千万零〇\d]+\s*[章卷节回].*$").unwrap()
});

static ENGLISH_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*Chapter\s+\d+.*$").unwrap());

// Markdown H1-H6
static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*#{1,6}\s+.*$").unwrap());

/// 章节标题格式
///
/// 检测时的优先级即 [`HeadingPattern::ALL`] 的顺序：同分时靠前者胜出
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeadingPattern {
    /// 第X章 / 第X卷 / 第X节 / 第X回
    Chinese,
    /// Chapter N
    English,
    /// # 标题
    Markdown,
}

impl HeadingPattern {
    /// 固定的检测优先级
    pub const ALL: [HeadingPattern; 3] = [
        HeadingPattern::Chinese,
        HeadingPattern::English,
        HeadingPattern::Markdown,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HeadingPattern::Chinese => "chinese",
            HeadingPattern::English => "english",
            HeadingPattern::Markdown => "markdown",
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "chinese" => Some(HeadingPattern::Chinese),
            "english" => Some(HeadingPattern::English),
            "markdown" => Some(HeadingPattern::Markdown),
            _ => None,
        }
    }

    /// 判断一行文本是否为章节标题
    pub fn is_heading(&self, line: &str) -> bool {
        let line = line.trim();
        if line.is_empty() {
            return false;
        }
        self.regex().is_match(line)
    }

    fn regex(&self) -> &'static Regex {
        match self {
            HeadingPattern::Chinese => &CHINESE_HEADING,
            HeadingPattern::English => &ENGLISH_HEADING,
            HeadingPattern::Markdown => &MARKDOWN_HEADING,
        }
    }
}

impl std::fmt::Display for HeadingPattern {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
