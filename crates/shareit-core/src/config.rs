//! 服务配置
//!
//! 加载顺序: 默认值 → `<config_dir>/shareit/settings.toml` → 环境变量。
//!
//! | 环境变量 | 字段 |
//! |---|---|
//! | `PORT` | `port` |
//! | `SHAREIT_UPLOAD_DIR` | `upload_dir` |
//! | `SHAREIT_STATIC_DIR` | `static_dir` |
//!
//! 上传大小上限和空闲超时不可由用户配置，只在测试中替换。

use crate::idle::IDLE_TIMEOUT;
use crate::upload::MAX_UPLOAD_SIZE;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs;
use std::net::{Ipv4Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PORT: u16 = 5555;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// 监听端口
    pub port: u16,
    /// 上传目录
    pub upload_dir: PathBuf,
    /// 前端构建产物目录（含 index.html）
    pub static_dir: PathBuf,
    #[serde(skip)]
    pub max_upload_size: u64,
    #[serde(skip)]
    pub idle_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            port: DEFAULT_PORT,
            upload_dir: PathBuf::from("uploads"),
            static_dir: PathBuf::from("dist"),
            max_upload_size: MAX_UPLOAD_SIZE,
            idle_timeout: IDLE_TIMEOUT,
        }
    }
}

impl ServerConfig {
    /// 获取配置文件路径
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("shareit")
            .join("settings.toml")
    }

    /// 从默认配置文件和进程环境加载
    pub fn load() -> Self {
        Self::load_from(&Self::config_path()).with_env(|key| std::env::var(key).ok())
    }

    /// 从指定文件加载（文件不存在或无法解析时使用默认值）
    pub fn load_from(path: &Path) -> Self {
        if path.exists() {
            match fs::read_to_string(path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        debug!("Loaded settings from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        warn!("Failed to parse settings: {}, using defaults", e);
                    }
                },
                Err(e) => {
                    warn!("Failed to read settings file: {}, using defaults", e);
                }
            }
        }
        Self::default()
    }

    /// 应用环境变量覆盖，`lookup` 通常是 `std::env::var`
    #[must_use]
    pub fn with_env<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup("PORT") {
            match raw.trim().parse() {
                Ok(port) => self.port = port,
                Err(_) => warn!("Ignoring invalid PORT value {:?}", raw),
            }
        }
        if let Some(dir) = lookup("SHAREIT_UPLOAD_DIR").filter(|v| !v.is_empty()) {
            self.upload_dir = PathBuf::from(dir);
        }
        if let Some(dir) = lookup("SHAREIT_STATIC_DIR").filter(|v| !v.is_empty()) {
            self.static_dir = PathBuf::from(dir);
        }
        self
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }
}
