//! Configuration Loader
//!
//! 实现多源配置加载与合并逻辑
//!
//! 优先级（从高到低）：
//! 1. 环境变量
//! 2. 配置文件（recite.toml 等）
//! 3. 默认值

use config::{Config, ConfigError as ConfigCrateError, Environment, File};
use std::path::Path;
use thiserror::Error;

use super::types::{default_data_dir, AppConfig};
use crate::application::DEFAULT_FLUSH_EVERY;
use crate::domain::novel::DEFAULT_SAMPLE_BYTES;

/// 配置加载错误
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    LoadError(String),

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

impl From<ConfigCrateError> for ConfigError {
    fn from(err: ConfigCrateError) -> Self {
        ConfigError::LoadError(err.to_string())
    }
}

/// 当前目录下的配置文件（不含扩展名）
const CONFIG_FILE_NAMES: &[&str] = &["recite", "recite.local"];

/// 加载应用配置
///
/// # 环境变量示例
/// - `RECITE_STORAGE__DATA_DIR=/tmp/recite`
/// - `RECITE_SPEECH__COMMAND=espeak`
/// - `RECITE_NARRATION__FLUSH_EVERY=5`
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from_path(None)
}

/// 从指定路径加载配置
///
/// # 参数
/// - `config_path` - 可选的配置文件路径（必须存在），为 None 时使用默认搜索路径
pub fn load_config_from_path(config_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let mut builder = Config::builder();

    // 1. 默认值
    builder = builder
        .set_default(
            "storage.data_dir",
            default_data_dir().to_string_lossy().into_owned(),
        )?
        .set_default("speech.command", "say")?
        .set_default("speech.args", Vec::<String>::new())?
        .set_default("narration.flush_every", DEFAULT_FLUSH_EVERY as u64)?
        .set_default("narration.detect_sample_bytes", DEFAULT_SAMPLE_BYTES as u64)?
        .set_default("log.level", "warn")?;

    // 2. 配置文件
    if let Some(path) = config_path {
        builder = builder.add_source(File::from(path).required(true));
    } else {
        for name in CONFIG_FILE_NAMES {
            builder = builder.add_source(File::with_name(name).required(false));
        }
        if let Some(dir) = dirs::config_dir() {
            let user_file = dir.join("recite").join("settings.toml");
            builder = builder.add_source(File::from(user_file).required(false));
        }
    }

    // 3. 环境变量
    // 前缀: RECITE_，层级分隔符: __
    builder = builder.add_source(
        Environment::with_prefix("RECITE")
            .prefix_separator("_")
            .separator("__")
            .try_parsing(true),
    );

    let config = builder.build()?;

    let app_config: AppConfig = config.try_deserialize().map_err(|e| {
        ConfigError::ParseError(format!("Failed to deserialize config: {}", e))
    })?;

    validate_config(&app_config)?;

    Ok(app_config)
}

/// 验证配置有效性
fn validate_config(config: &AppConfig) -> Result<(), ConfigError> {
    if config.storage.data_dir.as_os_str().is_empty() {
        return Err(ConfigError::ValidationError(
            "Data directory cannot be empty".to_string(),
        ));
    }

    if config.speech.command.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "Speech command cannot be empty".to_string(),
        ));
    }

    if config.narration.flush_every == 0 {
        return Err(ConfigError::ValidationError(
            "narration.flush_every must be at least 1".to_string(),
        ));
    }

    if config.narration.detect_sample_bytes == 0 {
        return Err(ConfigError::ValidationError(
            "narration.detect_sample_bytes must be at least 1".to_string(),
        ));
    }

    Ok(())
}

/// 输出配置信息（debug 级别，避免污染命令输出）
pub fn print_config(config: &AppConfig) {
    tracing::debug!("=== Application Configuration ===");
    tracing::debug!("Data Directory: {:?}", config.storage.data_dir);
    tracing::debug!("Speech Command: {} {:?}", config.speech.command, config.speech.args);
    tracing::debug!("Flush Every: {} segments", config.narration.flush_every);
    tracing::debug!("Detect Sample: {} bytes", config.narration.detect_sample_bytes);
    tracing::debug!("Log Level: {}", config.log.level);
    tracing::debug!("=================================");
}
