//! Recite - 命令行小说朗读工具
//!
//! 每次调用执行一个子命令；收到 Ctrl+C / SIGTERM 时中止朗读并保存进度

use clap::Parser;
use std::process::ExitCode;
use std::sync::Arc;

use recite::application::Session;
use recite::config::{load_config_from_path, print_config};
use recite::infrastructure::adapters::{CommandSpeechClient, CommandSpeechClientConfig};
use recite::infrastructure::cli::{Cli, Dispatcher};
use recite::infrastructure::persistence::JsonLibraryStore;
use recite::infrastructure::signal::shutdown_signal;

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config_from_path(cli.config.as_deref())
        .map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    // 初始化日志（stderr，stdout 留给命令输出）
    let log_filter = format!("{},recite={}", config.log.level, config.log.level);
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    print_config(&config);

    let store = Arc::new(JsonLibraryStore::new(&config.storage.data_dir));
    let speech = Arc::new(CommandSpeechClient::new(
        CommandSpeechClientConfig::new(&config.speech.command)
            .with_args(config.speech.args.clone()),
    ));

    let session = Session::load(store).await;
    let mut dispatcher = Dispatcher::new(session, speech, &config);

    // 信号到达时丢弃命令 future（连同正在朗读的语音进程），再保存
    let result = tokio::select! {
        result = dispatcher.dispatch(cli.command) => Some(result),
        signal = shutdown_signal() => {
            eprintln!("\nReceived signal: {}. Exiting...", signal);
            None
        }
    };

    let session = dispatcher.session_mut();
    if session.is_dirty() {
        tracing::info!("Saving state before exit");
        session.flush().await;
    }

    match result {
        Some(Ok(outcome)) => Ok(ExitCode::from(outcome.exit_code())),
        Some(Err(e)) => {
            eprintln!("Error: {}", e);
            Ok(ExitCode::FAILURE)
        }
        // 被信号中止属于正常退出
        None => Ok(ExitCode::SUCCESS),
    }
}
