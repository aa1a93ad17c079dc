//! 上传处理
//!
//! 数据先流式写入暂存目录中的临时文件，写完后原子重命名到最终路径，
//! 外部观察者只会看到旧文件或完整的新文件。
//!
//! 同名并发上传以最后完成重命名者为准，不加锁。

use crate::error::ShareError;
use crate::notify::{Notifier, ShareEvent};
use crate::record::FileRecord;
use crate::storage::{UploadDir, sanitize_file_name};
use axum::body::Bytes;
use chrono::Utc;
use futures_util::{Stream, StreamExt, pin_mut};
use log::{info, warn};
use std::fmt::Display;
use std::sync::Arc;
use tokio::io::AsyncWriteExt;

/// 单次传输的大小上限: 2 GiB
pub const MAX_UPLOAD_SIZE: u64 = 2 * 1024 * 1024 * 1024;

#[derive(Clone)]
pub struct UploadPipeline {
    storage: UploadDir,
    notifier: Arc<dyn Notifier>,
    max_size: u64,
}

impl UploadPipeline {
    pub fn new(storage: UploadDir, notifier: Arc<dyn Notifier>, max_size: u64) -> Self {
        Self {
            storage,
            notifier,
            max_size,
        }
    }

    /// 接收一个文件并发布 `fileUploaded` 事件
    ///
    /// 失败时不会发布事件，最终路径上也不会留下部分数据。
    pub async fn accept<S, E>(&self, declared_name: &str, body: S) -> Result<FileRecord, ShareError>
    where
        S: Stream<Item = Result<Bytes, E>>,
        E: Display,
    {
        let name = sanitize_file_name(declared_name)
            .ok_or_else(|| ShareError::BadRequest("Invalid file name".to_string()))?;

        let staging_dir = self.storage.staging_dir();
        tokio::fs::create_dir_all(&staging_dir).await?;

        // TempPath 在未 persist 时 drop 会删除暂存文件
        let (file, temp_path) = tempfile::Builder::new()
            .prefix("upload-")
            .tempfile_in(&staging_dir)?
            .into_parts();
        let mut file = tokio::fs::File::from_std(file);

        let mut written: u64 = 0;
        pin_mut!(body);
        while let Some(chunk) = body.next().await {
            let chunk = chunk.map_err(|e| {
                warn!("Upload of {} interrupted: {}", name, e);
                ShareError::BadRequest("Upload interrupted".to_string())
            })?;

            written += chunk.len() as u64;
            if written > self.max_size {
                warn!("Upload of {} aborted: exceeds {} bytes", name, self.max_size);
                return Err(ShareError::PayloadTooLarge {
                    limit: self.max_size,
                });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;
        file.sync_all().await?;
        drop(file);

        let final_path = self.storage.final_path(&name);
        temp_path.persist(&final_path).map_err(|e| {
            warn!("Failed to move upload to {:?}: {}", final_path, e.error);
            ShareError::Io(e.error)
        })?;

        let record = FileRecord::new(name, written, Utc::now());
        info!("Stored {} ({} bytes)", record.name, written);
        self.notifier.publish(ShareEvent::FileUploaded(record.clone()));

        Ok(record)
    }
}
