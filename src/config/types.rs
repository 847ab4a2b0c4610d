//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::path::PathBuf;

use crate::application::DEFAULT_FLUSH_EVERY;
use crate::domain::novel::DEFAULT_SAMPLE_BYTES;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 存储配置
    #[serde(default)]
    pub storage: StorageConfig,

    /// 语音程序配置
    #[serde(default)]
    pub speech: SpeechConfig,

    /// 朗读配置
    #[serde(default)]
    pub narration: NarrationConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

/// 存储配置
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `library.json` 与 `progress.json` 所在目录
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,
}

/// 用户配置目录下的 `recite`，取不到时使用当前目录下的 `.recite`
pub fn default_data_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("recite"))
        .unwrap_or_else(|| PathBuf::from(".recite"))
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
        }
    }
}

/// 语音程序配置
#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    /// 程序名或路径
    #[serde(default = "default_speech_command")]
    pub command: String,

    /// 放在文本之前的额外参数，例如 `["-v", "Samantha"]`
    #[serde(default)]
    pub args: Vec<String>,
}

fn default_speech_command() -> String {
    "say".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            command: default_speech_command(),
            args: Vec::new(),
        }
    }
}

/// 朗读配置
#[derive(Debug, Clone, Deserialize)]
pub struct NarrationConfig {
    /// 每读完多少段保存一次进度
    #[serde(default = "default_flush_every")]
    pub flush_every: usize,

    /// 格式检测读取的前缀字节数
    #[serde(default = "default_detect_sample_bytes")]
    pub detect_sample_bytes: usize,
}

fn default_flush_every() -> usize {
    DEFAULT_FLUSH_EVERY
}

fn default_detect_sample_bytes() -> usize {
    DEFAULT_SAMPLE_BYTES
}

impl Default for NarrationConfig {
    fn default() -> Self {
        Self {
            flush_every: default_flush_every(),
            detect_sample_bytes: default_detect_sample_bytes(),
        }
    }
}

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别（`RUST_LOG` 优先）
    #[serde(default = "default_log_level")]
    pub level: String,
}

fn default_log_level() -> String {
    "warn".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}
