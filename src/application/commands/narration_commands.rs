//! Narration Commands - 朗读

/// 朗读命令
///
/// `chapter` 为 1 起始章节序号；为空时从上次位置继续
#[derive(Debug, Clone, Default)]
pub struct ReadChapter {
    pub chapter: Option<usize>,
}

/// 朗读下一章（从第一段开始）
#[derive(Debug, Clone)]
pub struct NextChapter;

/// 朗读上一章（从第一段开始）
#[derive(Debug, Clone)]
pub struct PrevChapter;
