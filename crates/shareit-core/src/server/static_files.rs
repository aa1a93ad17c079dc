//! 静态文件: 上传文件下载和前端页面

use super::AppState;
use crate::record::mime_for;
use crate::storage::safe_join;
use axum::{
    body::Body,
    extract::{Path, State},
    http::{Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use log::debug;
use std::path::Path as FsPath;
use std::sync::Arc;
use tokio::fs::File;

/// `GET /uploads/*path`
pub async fn download_handler(
    Path(relative): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    match state.storage.resolve(&relative) {
        Some(path) => serve_file(&path).await,
        None => not_found(),
    }
}

/// 未匹配的路径: 先找前端静态文件（路径按 URL 解码），找不到则返回 `index.html`
pub async fn shell_handler(
    State(state): State<Arc<AppState>>,
    method: Method,
    uri: Uri,
) -> Response {
    if method != Method::GET && method != Method::HEAD {
        return not_found();
    }

    let static_dir = &state.config.static_dir;
    let requested = urlencoding::decode(uri.path()).ok();
    if let Some(path) = requested
        .as_deref()
        .and_then(|relative| safe_join(static_dir, relative))
        && is_file(&path).await
    {
        return serve_file(&path).await;
    }
    serve_file(&static_dir.join("index.html")).await
}

async fn is_file(path: &FsPath) -> bool {
    tokio::fs::metadata(path)
        .await
        .is_ok_and(|meta| meta.is_file())
}

async fn serve_file(path: &FsPath) -> Response {
    let meta = match tokio::fs::metadata(path).await {
        Ok(meta) if meta.is_file() => meta,
        _ => {
            debug!("Not found: {:?}", path);
            return not_found();
        }
    };

    match File::open(path).await {
        Ok(file) => {
            let mime = mime_for(&path.to_string_lossy());
            let stream = tokio_util::io::ReaderStream::new(file);
            (
                StatusCode::OK,
                [
                    (header::CONTENT_TYPE, mime),
                    (header::CONTENT_LENGTH, meta.len().to_string()),
                ],
                Body::from_stream(stream),
            )
                .into_response()
        }
        Err(_) => not_found(),
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, "File not found").into_response()
}
