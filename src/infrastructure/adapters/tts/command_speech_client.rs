//! Command Speech Client - 调用本地语音程序朗读
//!
//! 实现 SpeechEnginePort trait，每个片段启动一次外部程序（默认 macOS `say`），
//! 文本作为最后一个参数传入，程序以 0 退出视为朗读完成

use std::process::Stdio;
use tokio::process::Command;

use crate::application::ports::{SpeechEnginePort, SpeechError, SpeechHandle};

/// 语音程序配置
#[derive(Debug, Clone)]
pub struct CommandSpeechClientConfig {
    /// 程序名或路径
    pub command: String,
    /// 放在文本之前的额外参数
    pub args: Vec<String>,
}

impl Default for CommandSpeechClientConfig {
    fn default() -> Self {
        Self {
            command: "say".to_string(),
            args: Vec::new(),
        }
    }
}

impl CommandSpeechClientConfig {
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            ..Default::default()
        }
    }

    pub fn with_args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }
}

/// 本地语音程序客户端
pub struct CommandSpeechClient {
    config: CommandSpeechClientConfig,
}

impl CommandSpeechClient {
    pub fn new(config: CommandSpeechClientConfig) -> Self {
        tracing::debug!(command = %config.command, args = ?config.args, "CommandSpeechClient initialized");
        Self { config }
    }

    /// 使用默认配置（`say`）创建
    pub fn with_defaults() -> Self {
        Self::new(CommandSpeechClientConfig::default())
    }
}

impl SpeechEnginePort for CommandSpeechClient {
    fn speak(&self, text: &str) -> Result<SpeechHandle, SpeechError> {
        if text.trim().is_empty() {
            return Err(SpeechError::EmptyText);
        }

        let child = Command::new(&self.config.command)
            .args(&self.config.args)
            .arg(text)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                SpeechError::Unavailable(format!(
                    "failed to execute '{}': {}",
                    self.config.command, e
                ))
            })?;

        tracing::trace!(command = %self.config.command, chars = text.chars().count(), "Speech started");

        let (mut tx, handle) = SpeechHandle::channel();
        let command = self.config.command.clone();

        tokio::spawn(async move {
            // 句柄被丢弃（朗读被中止）时放弃等待，child 随之被杀掉
            let output = tokio::select! {
                output = child.wait_with_output() => output,
                _ = tx.closed() => {
                    tracing::debug!(command = %command, "Speech abandoned, terminating");
                    return;
                }
            };

            let result = match output {
                Ok(output) if output.status.success() => Ok(()),
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    Err(SpeechError::Failed(format!(
                        "'{}' exited with {}: {}",
                        command,
                        output.status,
                        stderr.trim()
                    )))
                }
                Err(e) => Err(SpeechError::Failed(e.to_string())),
            };

            if tx.send(result).is_err() {
                tracing::trace!("Speech result dropped, nobody is waiting");
            }
        });

        Ok(handle)
    }
}
