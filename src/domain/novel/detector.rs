//! Novel Context - Format Detector
//!
//! 对文本样本逐行打分，选出最可信的章节标题格式

use super::{HeadingPattern, NovelError};

/// 格式检测默认读取的样本大小（1 MiB）
pub const DEFAULT_SAMPLE_BYTES: usize = 1024 * 1024;

/// 单一格式至少需要的命中次数（严格大于 1）
const MIN_CONFIDENT_SCORE: usize = 1;

/// 截取不超过 `max_bytes` 的前缀，不会截断 UTF-8 字符
pub fn sample_prefix(text: &str, max_bytes: usize) -> &str {
    if text.len() <= max_bytes {
        return text;
    }
    let mut end = max_bytes;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// 统计每种格式在样本中的命中行数，顺序同 [`HeadingPattern::ALL`]
pub fn score_patterns(sample: &str) -> [(HeadingPattern, usize); 3] {
    let mut scores = HeadingPattern::ALL.map(|pattern| (pattern, 0usize));
    for line in sample.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        // 一行可以同时命中多种格式
        for (pattern, score) in scores.iter_mut() {
            if pattern.is_heading(line) {
                *score += 1;
            }
        }
    }
    scores
}

/// 检测章节标题格式
///
/// 规则:
/// 1. 得分严格最高且大于 1 的格式胜出，同分按 [`HeadingPattern::ALL`] 顺序取靠前者
/// 2. 否则只要 Markdown 至少命中一次就退回 Markdown
/// 3. 都不满足时返回 [`NovelError::FormatNotDetected`]
pub fn detect_format(sample: &str) -> Result<HeadingPattern, NovelError> {
    let scores = score_patterns(sample);

    let mut best: Option<HeadingPattern> = None;
    let mut best_score = MIN_CONFIDENT_SCORE;
    for (pattern, score) in scores {
        if score > best_score {
            best_score = score;
            best = Some(pattern);
        }
    }

    if let Some(pattern) = best {
        tracing::debug!(format = %pattern, score = best_score, "Detected chapter format");
        return Ok(pattern);
    }

    let markdown_hits = scores
        .iter()
        .find(|(pattern, _)| *pattern == HeadingPattern::Markdown)
        .map_or(0, |(_, score)| *score);
    if markdown_hits >= 1 {
        tracing::warn!("Low confidence in format detection, defaulting to markdown");
        return Ok(HeadingPattern::Markdown);
    }

    Err(NovelError::FormatNotDetected)
}
