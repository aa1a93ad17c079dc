//! 上传事件推送
//!
//! 订阅在握手完成之前建立，握手成功的客户端不会漏掉之后的事件。
//! 客户端发来的消息一律忽略，收到 Close 即结束会话。

use super::AppState;
use crate::notify::ShareEvent;
use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::IntoResponse,
};
use futures_util::{SinkExt, StreamExt};
use log::{debug, error, warn};
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::wrappers::errors::BroadcastStreamRecvError;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    let events = state.notifier.subscribe();
    ws.on_upgrade(move |socket| async move {
        if let Err(e) = observe(socket, events).await {
            debug!("WebSocket session ended with error: {}", e);
        }
    })
}

async fn observe(
    socket: WebSocket,
    events: broadcast::Receiver<ShareEvent>,
) -> Result<(), axum::Error> {
    debug!("Observer connected");
    let (mut write, mut read) = socket.split();
    let mut events = BroadcastStream::new(events);

    loop {
        tokio::select! {
            event = events.next() => match event {
                Some(Ok(event)) => {
                    let text = match serde_json::to_string(&event) {
                        Ok(text) => text,
                        Err(e) => {
                            error!("Failed to encode event: {}", e);
                            continue;
                        }
                    };
                    write.send(Message::Text(text)).await?;
                }
                Some(Err(BroadcastStreamRecvError::Lagged(skipped))) => {
                    warn!("Observer lagged, skipped {} events", skipped);
                }
                None => break,
            },
            incoming = read.next() => match incoming {
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => return Err(e),
            },
        }
    }

    debug!("Observer disconnected");
    Ok(())
}
