//! Core Service - 启动流程

use anyhow::{Context, Result};
use shareit_core::bootstrap::render_terminal;
use shareit_core::server;
use shareit_core::{
    AddressResolver, AppState, BroadcastNotifier, IdleSupervisor, ServerConfig, SystemResolver,
    UploadDir, reachable_url,
};
use std::sync::Arc;
use tokio::net::TcpListener;

pub async fn run_service(config: ServerConfig) -> Result<()> {
    // 上传目录必须在接受请求之前就绪
    UploadDir::new(&config.upload_dir)
        .ensure_ready()
        .await
        .with_context(|| format!("无法创建上传目录 {}", config.upload_dir.display()))?;

    let listener = TcpListener::bind(config.bind_addr())
        .await
        .with_context(|| format!("无法监听 {}", config.bind_addr()))?;

    let resolver = Arc::new(SystemResolver);
    print_banner(&reachable_url(&resolver.resolve(), config.port));

    let idle = IdleSupervisor::spawn(config.idle_timeout, || {
        tracing::info!("Server shutting down due to inactivity");
        std::process::exit(0);
    });
    tracing::info!("Idle shutdown after {:?} without uploads or listings", idle.timeout());

    let state = Arc::new(AppState::new(
        config,
        Arc::new(BroadcastNotifier::new()),
        resolver,
        idle,
    ));

    server::serve(listener, state).await?;
    Ok(())
}

fn print_banner(url: &str) {
    println!("\nServer running at {url}");
    match render_terminal(url) {
        Ok(qr) => println!("\nScan this QR code to access:\n\n{qr}"),
        Err(e) => tracing::warn!("二维码生成失败: {}", e),
    }
}
