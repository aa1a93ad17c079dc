//! Shareit Core Library
//!
//! 局域网文件投递服务的核心实现：浏览器上传文件到本机目录，
//! 所有已连接的页面实时收到上传通知，并通过二维码分享访问地址。
//!
//! # 模块
//!
//! - **net**: 本机局域网 IPv4 地址解析
//! - **storage**: 上传目录管理（创建、清理、路径解析、导入）
//! - **record**: 文件元数据 `FileRecord`
//! - **upload**: 上传管道（暂存 → 原子重命名 → 通知）
//! - **listing**: 文件列表
//! - **notify**: 上传事件广播
//! - **bootstrap**: 访问地址和二维码
//! - **idle**: 空闲自动退出
//! - **server**: HTTP/WebSocket 路由
//!
//! # 使用示例
//!
//! ```ignore
//! use shareit_core::{AppState, BroadcastNotifier, IdleSupervisor, ServerConfig, SystemResolver};
//!
//! let config = ServerConfig::load();
//! let idle = IdleSupervisor::spawn(config.idle_timeout, || std::process::exit(0));
//! let state = Arc::new(AppState::new(
//!     config,
//!     Arc::new(BroadcastNotifier::new()),
//!     Arc::new(SystemResolver),
//!     idle,
//! ));
//! state.storage.ensure_ready().await?;
//!
//! let listener = TcpListener::bind(state.config.bind_addr()).await?;
//! shareit_core::server::serve(listener, state).await?;
//! ```

pub mod bootstrap;
pub mod config;
pub mod error;
pub mod idle;
pub mod listing;
pub mod net;
pub mod notify;
pub mod record;
pub mod server;
pub mod storage;
pub mod upload;

pub use bootstrap::{ConnectivityInfo, connectivity_info, reachable_url};
pub use config::ServerConfig;
pub use error::ShareError;
pub use idle::{IDLE_TIMEOUT, IdleSupervisor};
pub use listing::ListingService;
pub use net::{AddressResolver, FixedResolver, SystemResolver, local_ip};
pub use notify::{BroadcastNotifier, Notifier, ShareEvent};
pub use record::FileRecord;
pub use server::{AppState, router};
pub use storage::UploadDir;
pub use upload::{MAX_UPLOAD_SIZE, UploadPipeline};
