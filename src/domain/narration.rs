//! Narration - 朗读状态机
//!
//! 一次 `read` 调用从 `Idle` 出发，逐段进入 `Speaking`，
//! 最终停在 `Stopped`、`ChapterComplete` 或 `NovelComplete` 之一

/// 停止原因
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StopReason {
    /// 关闭了自动续读，读完一段即停
    AutoAdvanceDisabled,
    /// 语音引擎无法开始朗读
    SubmissionFailed(String),
    /// 语音引擎朗读过程中报错
    CompletionFailed(String),
}

impl StopReason {
    pub fn is_failure(&self) -> bool {
        !matches!(self, StopReason::AutoAdvanceDisabled)
    }
}

/// 朗读状态（章节、片段均为 0 起始）
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NarrationState {
    Idle,
    Speaking { chapter: usize, segment: usize },
    Stopped {
        chapter: usize,
        segment: usize,
        reason: StopReason,
    },
    /// 章节没有可朗读的片段
    ChapterComplete { chapter: usize },
    /// 最后一章已读完
    NovelComplete,
}

impl NarrationState {
    /// 是否为终止状态
    pub fn is_terminal(&self) -> bool {
        !matches!(self, NarrationState::Idle | NarrationState::Speaking { .. })
    }

    /// 是否因语音错误而终止
    pub fn is_failure(&self) -> bool {
        matches!(self, NarrationState::Stopped { reason, .. } if reason.is_failure())
    }
}
