//! 文件列表
//!
//! 每次调用都重新枚举上传目录（非递归），按目录返回的顺序输出，不排序。
//! 枚举失败时返回空列表：目录会在下次启动时重新创建。

use crate::record::FileRecord;
use crate::storage::{STAGING_DIR_NAME, UploadDir};
use log::{debug, warn};
use std::io;

#[derive(Debug, Clone)]
pub struct ListingService {
    storage: UploadDir,
}

impl ListingService {
    pub fn new(storage: UploadDir) -> Self {
        Self { storage }
    }

    pub async fn list(&self) -> Vec<FileRecord> {
        match self.try_list().await {
            Ok(files) => files,
            Err(e) => {
                warn!("Error reading files in {:?}: {}", self.storage.root(), e);
                Vec::new()
            }
        }
    }

    async fn try_list(&self) -> io::Result<Vec<FileRecord>> {
        let mut entries = tokio::fs::read_dir(self.storage.root()).await?;
        let mut files = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name == STAGING_DIR_NAME {
                continue;
            }
            let meta = entry.metadata().await?;
            files.push(FileRecord::from_metadata(name, &meta));
        }

        debug!("Listed {} entries", files.len());
        Ok(files)
    }
}
