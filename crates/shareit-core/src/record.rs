//! 文件元数据
//!
//! `FileRecord` 不做缓存，每次上传或列表时都从文件系统重新计算。

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use std::fs::Metadata;

/// 一个已存储文件的描述
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FileRecord {
    pub name: String,
    /// 人类可读的大小，例如 `4.2 MiB`
    pub size: String,
    #[serde(rename = "type")]
    pub mime_type: String,
    #[serde(serialize_with = "serialize_millis")]
    pub uploaded_at: DateTime<Utc>,
}

impl FileRecord {
    pub fn new(name: impl Into<String>, len: u64, uploaded_at: DateTime<Utc>) -> Self {
        let name = name.into();
        Self {
            size: format_size(len),
            mime_type: mime_for(&name),
            name,
            uploaded_at,
        }
    }

    /// 从目录项元数据构建，时间取最后修改时间
    pub fn from_metadata(name: impl Into<String>, meta: &Metadata) -> Self {
        let modified = meta.modified().map_or_else(|_| Utc::now(), DateTime::<Utc>::from);
        Self::new(name, meta.len(), modified)
    }
}

/// 字节数格式化
pub fn format_size(len: u64) -> String {
    human_bytes::human_bytes(len as f64)
}

/// 根据扩展名推断 MIME 类型，无法识别时为 `application/octet-stream`
pub fn mime_for(name: &str) -> String {
    mime_guess::from_path(name)
        .first_or_octet_stream()
        .essence_str()
        .to_string()
}

fn serialize_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&ts.to_rfc3339_opts(SecondsFormat::Millis, true))
}
