//! 上传通知广播
//!
//! 发布者不等待观察者：每个事件扇出给发布时刻已订阅的所有接收者，
//! 不重放历史事件，迟到的客户端需要自己重新拉取文件列表。

use crate::record::FileRecord;
use log::trace;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// 每个观察者最多积压的事件数，超出后跳过旧事件
pub const CHANNEL_CAPACITY: usize = 64;

/// 推送给客户端的事件
///
/// JSON: `{"event":"fileUploaded","data":{...}}`
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
#[serde(tag = "event", content = "data", rename_all = "camelCase")]
pub enum ShareEvent {
    FileUploaded(FileRecord),
}

/// 发布/订阅接口，传输方式（WebSocket、SSE、轮询）可替换
pub trait Notifier: Send + Sync {
    /// 发布事件，返回收到事件的观察者数量
    fn publish(&self, event: ShareEvent) -> usize;

    /// 订阅之后发布的事件，丢弃接收端即取消订阅
    fn subscribe(&self) -> broadcast::Receiver<ShareEvent>;
}

/// 基于 `tokio::sync::broadcast` 的实现
#[derive(Debug, Clone)]
pub struct BroadcastNotifier {
    tx: broadcast::Sender<ShareEvent>,
}

impl BroadcastNotifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self { tx }
    }

    pub fn observer_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastNotifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier for BroadcastNotifier {
    fn publish(&self, event: ShareEvent) -> usize {
        // 没有观察者时 send 返回 Err，这不是错误
        let delivered = self.tx.send(event).unwrap_or(0);
        trace!("Event delivered to {} observers", delivered);
        delivered
    }

    fn subscribe(&self) -> broadcast::Receiver<ShareEvent> {
        self.tx.subscribe()
    }
}
