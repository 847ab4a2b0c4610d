//! Fake Speech Client - 用于测试的语音客户端
//!
//! 不发声，按脚本在指定的第 N 次提交上模拟失败或卡住

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use tokio::sync::oneshot;

use crate::application::ports::{SpeechEnginePort, SpeechError, SpeechHandle};

/// 故障脚本（序号为 0 起始的提交次数，包括失败的提交）
#[derive(Debug, Clone, Default)]
pub struct SpeechScript {
    fail_submission_at: Option<usize>,
    fail_completion_at: Option<usize>,
    hang_at: Option<usize>,
}

impl SpeechScript {
    /// 第 n 次提交同步失败
    pub fn fail_submission_at(mut self, n: usize) -> Self {
        self.fail_submission_at = Some(n);
        self
    }

    /// 第 n 次提交成功，但朗读报错
    pub fn fail_completion_at(mut self, n: usize) -> Self {
        self.fail_completion_at = Some(n);
        self
    }

    /// 第 n 次提交成功，但永远不报告完成（模拟进程在朗读中被杀）
    pub fn hang_at(mut self, n: usize) -> Self {
        self.hang_at = Some(n);
        self
    }
}

/// Fake Speech Client
#[derive(Default)]
pub struct FakeSpeechClient {
    script: SpeechScript,
    submissions: AtomicUsize,
    spoken: Mutex<Vec<String>>,
    /// 卡住的片段的发送端，保持存活以免句柄收到中断
    pending: Mutex<Vec<oneshot::Sender<Result<(), SpeechError>>>>,
}

impl FakeSpeechClient {
    pub fn new(script: SpeechScript) -> Self {
        Self {
            script,
            ..Default::default()
        }
    }

    /// 成功提交过的文本，按提交顺序
    pub fn spoken(&self) -> Vec<String> {
        self.spoken.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }
}

impl SpeechEnginePort for FakeSpeechClient {
    fn speak(&self, text: &str) -> Result<SpeechHandle, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let n = self.submissions.fetch_add(1, Ordering::SeqCst);
        if self.script.fail_submission_at == Some(n) {
            return Err(SpeechError::Unavailable("scripted submission failure".into()));
        }

        self.spoken
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(text.to_string());
        tracing::debug!(submission = n, text_len = text.len(), "FakeSpeechClient: speaking");

        let (tx, handle) = SpeechHandle::channel();
        if self.script.hang_at == Some(n) {
            self.pending
                .lock()
                .unwrap_or_else(|e| e.into_inner())
                .push(tx);
        } else if self.script.fail_completion_at == Some(n) {
            let _ = tx.send(Err(SpeechError::Failed("scripted completion failure".into())));
        } else {
            let _ = tx.send(Ok(()));
        }

        Ok(handle)
    }
}
