use super::AppState;
use crate::bootstrap::{ConnectivityInfo, connectivity_info};
use crate::error::ShareError;
use crate::record::FileRecord;
use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartRejection},
};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// 上传成功响应
#[derive(Serialize, Deserialize, Debug)]
pub struct UploadResponse {
    pub message: String,
    /// 最后一个写入的文件
    pub file: FileRecord,
    /// 本次请求写入的全部文件
    pub files: Vec<FileRecord>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct FilesResponse {
    pub files: Vec<FileRecord>,
}

pub async fn qr_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<ConnectivityInfo>, ShareError> {
    let info = connectivity_info(state.resolver.as_ref(), state.config.port).inspect_err(|e| {
        warn!("QR code generation failed: {}", e);
    })?;
    Ok(Json(info))
}

pub async fn upload_handler(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<UploadResponse>, ShareError> {
    state.idle.reset();

    let mut multipart = multipart.map_err(|e| {
        debug!("Rejected upload request: {}", e);
        no_file()
    })?;

    let mut stored = Vec::new();
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ShareError::BadRequest(format!("Malformed upload: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let Some(file_name) = field.file_name().map(str::to_owned) else {
            continue;
        };
        let record = state.pipeline.accept(&file_name, field).await?;
        stored.push(record);
    }

    let file = stored.last().cloned().ok_or_else(no_file)?;
    Ok(Json(UploadResponse {
        message: "File uploaded successfully".to_string(),
        file,
        files: stored,
    }))
}

pub async fn files_handler(State(state): State<Arc<AppState>>) -> Json<FilesResponse> {
    state.idle.reset();
    Json(FilesResponse {
        files: state.listing.list().await,
    })
}

fn no_file() -> ShareError {
    ShareError::BadRequest("No file uploaded".to_string())
}
