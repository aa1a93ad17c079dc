//! HTTP/WebSocket 服务
//!
//! 路由:
//! - `GET  /api/qr`          连接地址和二维码
//! - `POST /api/upload`      multipart 上传（字段名 `file`）
//! - `GET  /api/files`       文件列表
//! - `GET  /uploads/*path`   下载已上传文件
//! - `GET  /ws`              `fileUploaded` 事件推送
//! - 其他路径                前端静态文件，找不到时回退到 `index.html`

pub mod api;
pub mod static_files;
pub mod websocket_handler;

use crate::config::ServerConfig;
use crate::idle::IdleSupervisor;
use crate::listing::ListingService;
use crate::net::AddressResolver;
use crate::notify::Notifier;
use crate::storage::UploadDir;
use crate::upload::UploadPipeline;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    routing::{get, post},
};
use log::{error, info};
use std::sync::Arc;
use tokio::net::TcpListener;

/// 所有处理器共享的状态
pub struct AppState {
    pub config: ServerConfig,
    pub storage: UploadDir,
    pub pipeline: UploadPipeline,
    pub listing: ListingService,
    pub notifier: Arc<dyn Notifier>,
    pub resolver: Arc<dyn AddressResolver>,
    pub idle: IdleSupervisor,
}

impl AppState {
    pub fn new(
        config: ServerConfig,
        notifier: Arc<dyn Notifier>,
        resolver: Arc<dyn AddressResolver>,
        idle: IdleSupervisor,
    ) -> Self {
        let storage = UploadDir::new(&config.upload_dir);
        let pipeline =
            UploadPipeline::new(storage.clone(), notifier.clone(), config.max_upload_size);
        let listing = ListingService::new(storage.clone());

        Self {
            config,
            storage,
            pipeline,
            listing,
            notifier,
            resolver,
            idle,
        }
    }
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/api/qr", get(api::qr_handler))
        .route(
            "/api/upload",
            // 大小上限由上传管道在流式写入时检查
            post(api::upload_handler).layer(DefaultBodyLimit::disable()),
        )
        .route("/api/files", get(api::files_handler))
        .route("/uploads/*path", get(static_files::download_handler))
        .route("/ws", get(websocket_handler::ws_handler))
        .fallback(static_files::shell_handler)
        .with_state(state)
}

/// 在已绑定的监听器上提供服务，直到出错
pub async fn serve(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    info!("Share server listening on {}", addr);

    axum::serve(listener, router(state)).await.inspect_err(|e| {
        error!("Server error: {}", e);
    })
}
