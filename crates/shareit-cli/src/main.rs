//! Shareit CLI
//!
//! 维护工具：
//! - `shareit share <path>`: 复制文件/目录到上传目录后启动服务
//! - `shareit cleanup`: 删除整个上传目录

mod launcher;

use anyhow::Result;
use clap::{Parser, Subcommand};
use shareit_core::{ServerConfig, UploadDir};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "shareit", version, about = "局域网文件投递工具")]
struct Cli {
    /// 上传目录 (默认: 配置文件或 ./uploads)
    #[arg(short, long, global = true)]
    upload_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// 分享文件或目录并启动服务
    Share {
        /// 要分享的文件或目录
        path: PathBuf,
        /// 监听端口 (默认: 5555 或 PORT 环境变量)
        #[arg(short, long)]
        port: Option<u16>,
    },
    /// 删除上传目录中的所有内容
    Cleanup,
}

#[tokio::main]
async fn main() -> Result<()> {
    let _ = tracing_log::LogTracer::init();
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .try_init();

    let cli = Cli::parse();

    let mut config = ServerConfig::load();
    if let Some(dir) = cli.upload_dir {
        config.upload_dir = dir;
    }

    match cli.command {
        Commands::Share { path, port } => {
            let storage = UploadDir::new(&config.upload_dir);
            match storage.import(&path) {
                Ok(count) => println!(
                    "📋 Successfully copied {} to uploads directory ({} files)",
                    path.display(),
                    count
                ),
                Err(e) => {
                    eprintln!("❌ Error copying files: {}", e);
                    std::process::exit(1);
                }
            }

            let status = launcher::run_server(port, &config.upload_dir).await?;
            if !status.success() {
                std::process::exit(status.code().unwrap_or(1));
            }
        }
        Commands::Cleanup => {
            match UploadDir::new(&config.upload_dir).purge().await {
                Ok(()) => println!("🧹 Cleanup completed successfully"),
                Err(e) => {
                    eprintln!("❌ Cleanup error: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}
