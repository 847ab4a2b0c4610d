//! 文本分割器
//!
//! 把章节正文切成朗读单位：以换行为界，去除首尾空白，丢弃空片段

/// 对章节正文进行分段
///
/// 连续多个换行视为一个分隔。非空正文至少得到一个片段，
/// 只含空白的正文得到空列表（表示“无可朗读内容”，不是错误）
pub fn segment_chapter(body: &str) -> Vec<String> {
    body.split('\n')
        .map(str::trim)
        .filter(|piece| !piece.is_empty())
        .map(str::to_string)
        .collect()
}
