//! FolderGrid - 按文件夹管理的相册
//!
//! 命令行外壳：逐行读取命令，交给控制器执行并输出 JSON 结果

pub mod cli;
pub mod commands;

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use foldergrid_core::events::EmittedEvent;
use foldergrid_core::{
    AppPathProvider, AppResult, ChannelEventSink, FolderGridCore, GalleryController,
    PathProvider, SharedPathProvider,
};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::mpsc::UnboundedReceiver;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use cli::Cli;
use commands::Command;

/// 应用程序状态
pub struct AppState {
    pub core: FolderGridCore,
    pub controller: GalleryController,
    /// 等待选择文件夹的资源定位符
    pub pending_add: Option<String>,
}

impl AppState {
    pub fn new(provider: SharedPathProvider, sink: ChannelEventSink) -> AppResult<Self> {
        let core = FolderGridCore::new(provider, Arc::new(sink))?;
        let controller = core.controller()?;
        Ok(Self {
            core,
            controller,
            pending_add: None,
        })
    }
}

/// 初始化日志系统（按天滚动写入日志目录）
///
/// 返回的 guard 必须存活到程序结束，否则缓冲中的日志会丢失
pub fn init_logging(logs_dir: &Path, level: &str) -> anyhow::Result<WorkerGuard> {
    std::fs::create_dir_all(logs_dir)
        .with_context(|| format!("无法创建日志目录: {:?}", logs_dir))?;

    let file_appender = tracing_appender::rolling::daily(logs_dir, "foldergrid.log");
    let (writer, guard) = tracing_appender::non_blocking(file_appender);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .try_init()
        .map_err(|e| anyhow::anyhow!("无法初始化日志: {}", e))?;

    Ok(guard)
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let provider: SharedPathProvider = match &cli.data_dir {
        Some(dir) => Arc::new(AppPathProvider::with_base_dir(dir.clone())),
        None => Arc::new(AppPathProvider::new()),
    };

    let _guard = init_logging(&provider.logs_dir(), &cli.log_level)?;
    tracing::info!("FolderGrid 启动中...");
    tracing::info!("数据目录: {:?}", provider.app_data_dir());

    let (sink, mut events) = ChannelEventSink::new();
    let mut state = AppState::new(provider, sink).context("无法初始化应用")?;
    state
        .controller
        .show_folders()
        .await
        .context("无法加载文件夹列表")?;
    flush_events(&mut events, cli.show_events);

    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        let command = match commands::parse_line(&line) {
            Ok(Some(Command::Quit)) => break,
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(e) => {
                println!("error: {}", e);
                continue;
            }
        };

        match commands::dispatch(&mut state, command).await {
            Ok(output) => println!("{}", commands::render(&output)),
            Err(e) => println!("error: {}", e),
        }
        flush_events(&mut events, cli.show_events);
    }

    tracing::info!("FolderGrid 退出");
    Ok(())
}

fn flush_events(events: &mut UnboundedReceiver<EmittedEvent>, show: bool) {
    while let Ok(event) = events.try_recv() {
        if show {
            println!("event {} {}", event.name, event.payload);
        }
    }
}
