//! Speech Engine Port - 语音朗读抽象
//!
//! 提交文本后立即返回一个一次性句柄，朗读结束（或失败）时句柄给出唯一结果

use thiserror::Error;
use tokio::sync::oneshot;

/// 语音错误
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SpeechError {
    #[error("cannot speak empty text")]
    EmptyText,

    #[error("speech capability unavailable: {0}")]
    Unavailable(String),

    #[error("speech failed: {0}")]
    Failed(String),

    #[error("speech was interrupted before reporting completion")]
    Interrupted,
}

/// 一次朗读的结果句柄，只能消费一次
#[derive(Debug)]
pub struct SpeechHandle {
    done: oneshot::Receiver<Result<(), SpeechError>>,
}

impl SpeechHandle {
    /// 创建句柄及其对应的完成信号发送端
    pub fn channel() -> (oneshot::Sender<Result<(), SpeechError>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { done: rx })
    }

    /// 等待朗读结束，不设超时
    pub async fn wait(self) -> Result<(), SpeechError> {
        match self.done.await {
            Ok(result) => result,
            // 发送端被丢弃，视为中断
            Err(_) => Err(SpeechError::Interrupted),
        }
    }
}

/// Speech Engine Port
///
/// 外部语音能力的抽象接口。提交失败同步返回，
/// 朗读结果通过 [`SpeechHandle`] 异步返回
pub trait SpeechEnginePort: Send + Sync {
    /// 开始朗读一段非空文本
    fn speak(&self, text: &str) -> Result<SpeechHandle, SpeechError>;
}
