//! 服务进程启动器
//!
//! 以子进程方式运行 `shareit-server`，共享标准输入输出，Ctrl-C 时终止子进程。

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Stdio};
use tokio::process::Command;

/// 优先使用与当前可执行文件同目录的 `shareit-server`，否则从 PATH 查找
pub fn server_binary() -> PathBuf {
    let name = format!("shareit-server{}", std::env::consts::EXE_SUFFIX);
    std::env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(|dir| dir.join(&name)))
        .filter(|path| path.is_file())
        .unwrap_or_else(|| PathBuf::from(name))
}

pub fn server_command(binary: &Path, port: Option<u16>, upload_dir: &Path) -> Command {
    let mut cmd = Command::new(binary);
    cmd.env("SHAREIT_UPLOAD_DIR", upload_dir)
        .stdin(Stdio::inherit())
        .stdout(Stdio::inherit())
        .stderr(Stdio::inherit())
        .kill_on_drop(true);
    if let Some(port) = port {
        cmd.env("PORT", port.to_string());
    }
    cmd
}

pub async fn run_server(port: Option<u16>, upload_dir: &Path) -> Result<ExitStatus> {
    let binary = server_binary();
    let mut child = server_command(&binary, port, upload_dir)
        .spawn()
        .with_context(|| format!("Failed to start server: {}", binary.display()))?;

    tokio::select! {
        status = child.wait() => Ok(status?),
        _ = tokio::signal::ctrl_c() => {
            // 子进程可能已经收到同一个 SIGINT 并退出
            let _ = child.kill().await;
            Ok(child.wait().await?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn env_of<'a>(cmd: &'a Command, key: &str) -> Option<&'a OsStr> {
        cmd.as_std()
            .get_envs()
            .find(|(k, _)| *k == OsStr::new(key))
            .and_then(|(_, v)| v)
    }

    #[test]
    fn test_server_command_forwards_settings() {
        let cmd = server_command(Path::new("shareit-server"), Some(8080), Path::new("/tmp/drop"));
        assert_eq!(env_of(&cmd, "PORT"), Some(OsStr::new("8080")));
        assert_eq!(
            env_of(&cmd, "SHAREIT_UPLOAD_DIR"),
            Some(OsStr::new("/tmp/drop"))
        );
    }

    #[test]
    fn test_port_is_optional() {
        let cmd = server_command(Path::new("shareit-server"), None, Path::new("uploads"));
        assert_eq!(env_of(&cmd, "PORT"), None);
    }

    #[test]
    fn test_server_binary_name() {
        let binary = server_binary();
        assert!(
            binary
                .file_name()
                .is_some_and(|name| name.to_string_lossy().starts_with("shareit-server"))
        );
    }
}
