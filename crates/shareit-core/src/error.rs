//! 错误类型
//!
//! 上传、列表和二维码接口共用的错误分类，以及到 HTTP 响应的映射。

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

/// 服务端错误
#[derive(Debug, thiserror::Error)]
pub enum ShareError {
    /// 请求格式错误（缺少文件、文件名非法、连接中断）
    #[error("{0}")]
    BadRequest(String),

    /// 传输超过大小上限
    #[error("File too large (limit {limit} bytes)")]
    PayloadTooLarge { limit: u64 },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// 二维码生成失败
    #[error("Render error: {0}")]
    Render(String),
}

impl ShareError {
    pub fn status(&self) -> StatusCode {
        match self {
            ShareError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ShareError::PayloadTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ShareError::Io(_) | ShareError::Render(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// 返回给客户端的简短说明，不暴露内部路径
    pub fn public_message(&self) -> String {
        match self {
            ShareError::BadRequest(reason) => reason.clone(),
            ShareError::PayloadTooLarge { .. } => "File too large".to_string(),
            ShareError::Io(_) => "Failed to upload file".to_string(),
            ShareError::Render(_) => "Failed to generate QR code".to_string(),
        }
    }
}

impl IntoResponse for ShareError {
    fn into_response(self) -> Response {
        let body = serde_json::json!({ "error": self.public_message() });
        (self.status(), Json(body)).into_response()
    }
}
