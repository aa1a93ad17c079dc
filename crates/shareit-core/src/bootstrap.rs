//! 连接引导
//!
//! 把本机地址和端口拼成局域网 URL，渲染成二维码：
//! - `GET /api/qr` 返回 SVG data URI，供网页显示
//! - 启动时在终端打印字符画二维码

use crate::error::ShareError;
use crate::net::AddressResolver;
use base64::Engine;
use qrcode::QrCode;
use qrcode::render::{svg, unicode};
use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConnectivityInfo {
    pub qr_code: String,
    pub url: String,
}

pub fn reachable_url(host: &str, port: u16) -> String {
    format!("http://{host}:{port}")
}

pub fn connectivity_info(
    resolver: &dyn AddressResolver,
    port: u16,
) -> Result<ConnectivityInfo, ShareError> {
    let url = reachable_url(&resolver.resolve(), port);
    let qr_code = render_data_uri(&url)?;
    Ok(ConnectivityInfo { qr_code, url })
}

/// 渲染为 `data:image/svg+xml;base64,...`
pub fn render_data_uri(url: &str) -> Result<String, ShareError> {
    let code = encode(url)?;
    let image = code
        .render::<svg::Color>()
        .min_dimensions(200, 200)
        .quiet_zone(true)
        .build();
    let encoded = base64::engine::general_purpose::STANDARD.encode(image.as_bytes());
    Ok(format!("data:image/svg+xml;base64,{encoded}"))
}

/// 渲染为终端字符画（深色背景终端下可扫）
pub fn render_terminal(url: &str) -> Result<String, ShareError> {
    let code = encode(url)?;
    Ok(code
        .render::<unicode::Dense1x2>()
        .dark_color(unicode::Dense1x2::Light)
        .light_color(unicode::Dense1x2::Dark)
        .build())
}

fn encode(url: &str) -> Result<QrCode, ShareError> {
    QrCode::new(url.as_bytes()).map_err(|e| ShareError::Render(e.to_string()))
}
