//! 上传目录管理
//!
//! 上传目录是唯一的持久状态，列表服务直接读取文件系统，不维护内存索引。
//! 正在接收的数据写入隐藏的 `.staging` 子目录，完成后原子重命名到最终路径。

use log::{debug, info};
use std::io;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

/// 暂存子目录名，列表和下载都会跳过它
pub const STAGING_DIR_NAME: &str = ".staging";

#[derive(Debug, Clone)]
pub struct UploadDir {
    root: PathBuf,
}

impl UploadDir {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn staging_dir(&self) -> PathBuf {
        self.root.join(STAGING_DIR_NAME)
    }

    /// 创建上传目录（含父目录），已存在视为成功
    pub async fn ensure_ready(&self) -> io::Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;
        debug!("Upload directory ready: {:?}", self.root);
        Ok(())
    }

    /// 递归删除整个上传目录，目录不存在视为成功
    pub async fn purge(&self) -> io::Result<()> {
        match tokio::fs::remove_dir_all(&self.root).await {
            Ok(()) => {
                info!("Removed upload directory {:?}", self.root);
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e),
        }
    }

    /// 上传文件的最终路径
    pub fn final_path(&self, file_name: &str) -> PathBuf {
        self.root.join(file_name)
    }

    /// 把下载 URL 中的相对路径解析到上传目录内
    ///
    /// 含 `..`、绝对路径或指向暂存目录时返回 `None`。
    pub fn resolve(&self, relative: &str) -> Option<PathBuf> {
        let path = safe_join(&self.root, relative)?;
        let first = Path::new(relative.trim_start_matches('/')).components().next();
        if matches!(first, Some(Component::Normal(name)) if name == STAGING_DIR_NAME) {
            return None;
        }
        Some(path)
    }

    /// 把本地文件或目录复制进上传目录（启动器使用）
    ///
    /// - 文件: 复制为 `<root>/<文件名>`
    /// - 目录: 递归复制其内容到 `<root>` 下，同名覆盖
    ///
    /// 返回复制的文件数。
    pub fn import(&self, source: &Path) -> io::Result<usize> {
        std::fs::create_dir_all(&self.root)?;

        let meta = std::fs::metadata(source)?;
        if meta.is_file() {
            let name = source.file_name().ok_or_else(|| {
                io::Error::new(io::ErrorKind::InvalidInput, "source has no file name")
            })?;
            std::fs::copy(source, self.root.join(name))?;
            return Ok(1);
        }

        let mut copied = 0;
        for entry in WalkDir::new(source).min_depth(1) {
            let entry = entry.map_err(io::Error::other)?;
            let relative = entry
                .path()
                .strip_prefix(source)
                .map_err(io::Error::other)?;
            let target = self.root.join(relative);

            if entry.file_type().is_dir() {
                std::fs::create_dir_all(&target)?;
            } else {
                if let Some(parent) = target.parent() {
                    std::fs::create_dir_all(parent)?;
                }
                std::fs::copy(entry.path(), &target)?;
                copied += 1;
            }
        }
        Ok(copied)
    }
}

/// 规范化上传者声明的文件名：只保留最后一个路径分量
///
/// 空名称、`.`、`..` 和暂存目录名返回 `None`。
pub fn sanitize_file_name(declared: &str) -> Option<String> {
    let last = declared
        .rsplit(['/', '\\'])
        .next()
        .unwrap_or_default()
        .trim();

    if last.is_empty() || last == "." || last == ".." || last == STAGING_DIR_NAME {
        return None;
    }
    Some(last.to_string())
}

/// 只允许普通路径分量的拼接
pub(crate) fn safe_join(root: &Path, relative: &str) -> Option<PathBuf> {
    let mut path = root.to_path_buf();
    let mut depth = 0;
    for component in Path::new(relative.trim_start_matches('/')).components() {
        match component {
            Component::Normal(part) => {
                path.push(part);
                depth += 1;
            }
            Component::CurDir => {}
            _ => return None,
        }
    }
    (depth > 0).then_some(path)
}
