//! Event Publisher Implementation
//!
//! 朗读过程事件广播，CLI 订阅后输出到终端

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;

/// 朗读事件（章节、片段均为 0 起始）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data")]
pub enum NarrationEvent {
    /// 开始朗读某一章
    ChapterStarted {
        chapter: usize,
        title: String,
        total_segments: usize,
    },
    /// 持久化的位置越界，已重置
    ProgressCorrected { chapter: usize, segment: usize },
    /// 片段已提交给语音引擎
    SegmentStarted {
        chapter: usize,
        segment: usize,
        total_segments: usize,
        text: String,
    },
    /// 片段朗读完成
    SegmentFinished { chapter: usize, segment: usize },
    /// 章节读完，准备进入下一章
    ChapterFinished { chapter: usize },
    /// 全书读完
    NovelFinished,
}

/// 事件发布器
pub struct EventPublisher {
    channel: broadcast::Sender<NarrationEvent>,
}

impl EventPublisher {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(256);
        Self { channel: tx }
    }

    pub fn arc(self) -> Arc<Self> {
        Arc::new(self)
    }

    /// 订阅朗读事件
    pub fn subscribe(&self) -> broadcast::Receiver<NarrationEvent> {
        self.channel.subscribe()
    }

    /// 发布事件（没有订阅者时直接丢弃）
    pub fn publish(&self, event: NarrationEvent) {
        if self.channel.send(event).is_err() {
            tracing::trace!("No narration event subscribers");
        }
    }
}

impl Default for EventPublisher {
    fn default() -> Self {
        Self::new()
    }
}
