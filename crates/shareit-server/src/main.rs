//! Shareit Server
//!
//! 局域网文件投递服务进程，负责：
//! - 准备上传目录
//! - 打印访问地址和终端二维码
//! - HTTP/WebSocket 服务
//! - 空闲 10 分钟自动退出，Ctrl-C 立即退出

mod service;

use anyhow::Result;
use shareit_core::ServerConfig;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 桥接 log crate（shareit-core 使用）到 tracing
    let _ = tracing_log::LogTracer::init();

    // 初始化日志
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,shareit_core=debug")),
        )
        .try_init();

    let config = ServerConfig::load();
    tracing::info!("Shareit server starting on port {}...", config.port);

    tokio::select! {
        res = service::run_service(config) => {
            if let Err(e) = &res {
                tracing::error!("Server exited: {:#}", e);
            }
            res
        }
        _ = tokio::signal::ctrl_c() => {
            // 不等待进行中的上传
            println!("\nCleaning up and shutting down...");
            std::process::exit(0);
        }
    }
}
