//! 集成测试 - HTTP/WebSocket 接口
//!
//! 在 127.0.0.1 的随机端口上启动完整路由，用真实客户端访问。

use futures_util::StreamExt;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde_json::Value;
use shareit_core::record::format_size;
use shareit_core::server;
use shareit_core::{AppState, BroadcastNotifier, FixedResolver, IdleSupervisor, ServerConfig};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

const TEST_IP: &str = "192.168.1.42";

struct TestServer {
    port: u16,
    dir: TempDir,
    client: reqwest::Client,
}

impl TestServer {
    async fn start() -> Self {
        Self::start_with_limit(shareit_core::MAX_UPLOAD_SIZE).await
    }

    async fn start_with_limit(max_upload_size: u64) -> Self {
        let idle = IdleSupervisor::spawn(Duration::from_secs(3600), || {});
        Self::start_with(max_upload_size, idle).await
    }

    async fn start_with(max_upload_size: u64, idle: IdleSupervisor) -> Self {
        let dir = TempDir::new().unwrap();
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let config = ServerConfig {
            port,
            upload_dir: dir.path().join("uploads"),
            static_dir: dir.path().join("dist"),
            max_upload_size,
            ..Default::default()
        };
        let state = Arc::new(AppState::new(
            config,
            Arc::new(BroadcastNotifier::new()),
            Arc::new(FixedResolver(TEST_IP.to_string())),
            idle,
        ));
        state.storage.ensure_ready().await.unwrap();
        tokio::spawn(server::serve(listener, state));

        Self {
            port,
            dir,
            client: reqwest::Client::new(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("http://127.0.0.1:{}{}", self.port, path)
    }

    async fn upload(&self, name: &str, data: Vec<u8>) -> reqwest::Response {
        let form = Form::new().part("file", Part::bytes(data).file_name(name.to_string()));
        self.client
            .post(self.url("/api/upload"))
            .multipart(form)
            .send()
            .await
            .unwrap()
    }

    async fn list(&self) -> Vec<Value> {
        let resp = self.client.get(self.url("/api/files")).send().await.unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["files"].as_array().unwrap().clone()
    }
}

/// 上传 10 字节的 a.txt 后列表中恰好有这一条记录
#[tokio::test]
async fn test_upload_then_list() {
    let server = TestServer::start().await;

    let resp = server.upload("a.txt", b"0123456789".to_vec()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "File uploaded successfully");
    assert_eq!(body["file"]["name"], "a.txt");
    assert_eq!(body["file"]["type"], "text/plain");
    assert_eq!(body["file"]["size"], "10 B");
    assert!(body["file"]["uploadedAt"].is_string());

    let files = server.list().await;
    assert_eq!(files.len(), 1);
    assert_eq!(files[0]["name"], "a.txt");
    assert_eq!(files[0]["size"], "10 B");
}

/// 上传后通过下载路径取回的内容完全一致
#[tokio::test]
async fn test_download_round_trip() {
    let server = TestServer::start().await;
    let data: Vec<u8> = (0..=255u8).cycle().take(70_000).collect();

    let resp = server.upload("blob.bin", data.clone()).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = server
        .client
        .get(server.url("/uploads/blob.bin"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(
        resp.headers()["content-type"],
        "application/octet-stream"
    );
    assert_eq!(resp.bytes().await.unwrap().as_ref(), data.as_slice());
}

#[tokio::test]
async fn test_oversize_upload_is_rejected() {
    let server = TestServer::start_with_limit(16).await;

    let resp = server.upload("big.bin", vec![7u8; 64]).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);
    let body: Value = resp.json().await.unwrap();
    assert!(body["error"].is_string());

    assert!(server.list().await.is_empty());
    assert!(!server.dir.path().join("uploads/big.bin").exists());
}

#[tokio::test]
async fn test_missing_file_is_client_error() {
    let server = TestServer::start().await;

    let form = Form::new().text("note", "hello");
    let resp = server
        .client
        .post(server.url("/api/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No file uploaded");

    // 不是 multipart 请求
    let resp = server
        .client
        .post(server.url("/api/upload"))
        .body("plain")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No file uploaded");
}

#[tokio::test]
async fn test_multiple_files_in_one_request() {
    let server = TestServer::start().await;

    let form = Form::new()
        .part("file", Part::bytes(b"one".to_vec()).file_name("one.txt"))
        .part("file", Part::bytes(b"two!".to_vec()).file_name("two.md"));
    let resp = server
        .client
        .post(server.url("/api/upload"))
        .multipart(form)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["file"]["name"], "two.md");
    assert_eq!(body["files"].as_array().unwrap().len(), 2);

    let mut names: Vec<String> = server
        .list()
        .await
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect();
    names.sort();
    assert_eq!(names, vec!["one.txt", "two.md"]);
}

#[tokio::test]
async fn test_empty_directory_lists_nothing() {
    let server = TestServer::start().await;
    let resp = server.client.get(server.url("/api/files")).send().await.unwrap();
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body, serde_json::json!({ "files": [] }));
}

#[tokio::test]
async fn test_missing_directory_lists_nothing() {
    let server = TestServer::start().await;
    std::fs::remove_dir_all(server.dir.path().join("uploads")).unwrap();

    assert!(server.list().await.is_empty());
}

/// 连接地址为 http://<解析出的 IP>:<监听端口>
#[tokio::test]
async fn test_qr_endpoint() {
    let server = TestServer::start().await;

    let resp = server.client.get(server.url("/api/qr")).send().await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["url"], format!("http://{}:{}", TEST_IP, server.port));
    assert!(
        body["qrCode"]
            .as_str()
            .unwrap()
            .starts_with("data:image/svg+xml;base64,")
    );
}

/// 上传前已连接的观察者恰好收到一次 fileUploaded 事件
#[tokio::test]
async fn test_websocket_notification() {
    let server = TestServer::start().await;

    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://127.0.0.1:{}/ws", server.port))
        .await
        .unwrap();
    let (_write, mut read) = ws.split();

    let resp = server.upload("photo.jpg", vec![1u8; 2048]).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let msg = tokio::time::timeout(Duration::from_secs(5), read.next())
        .await
        .expect("no event received")
        .unwrap()
        .unwrap();
    let Message::Text(text) = msg else {
        panic!("unexpected frame: {msg:?}");
    };
    let event: Value = serde_json::from_str(&text).unwrap();
    assert_eq!(event["event"], "fileUploaded");
    assert_eq!(event["data"]["name"], "photo.jpg");
    assert_eq!(event["data"]["type"], "image/jpeg");
    assert_eq!(event["data"]["size"], format_size(2048));

    // 不会重复推送
    let extra = tokio::time::timeout(Duration::from_millis(300), read.next()).await;
    assert!(extra.is_err());
}

/// 失败的上传不推送事件
#[tokio::test]
async fn test_failed_upload_is_not_broadcast() {
    let server = TestServer::start_with_limit(4).await;

    let (ws, _) = tokio_tungstenite::connect_async(format!("ws://127.0.0.1:{}/ws", server.port))
        .await
        .unwrap();
    let (_write, mut read) = ws.split();

    let resp = server.upload("big.bin", vec![0u8; 32]).await;
    assert_eq!(resp.status(), StatusCode::PAYLOAD_TOO_LARGE);

    let extra = tokio::time::timeout(Duration::from_millis(300), read.next()).await;
    assert!(extra.is_err());
}

#[tokio::test]
async fn test_download_rejects_traversal() {
    let server = TestServer::start().await;
    std::fs::write(server.dir.path().join("secret.txt"), b"nope").unwrap();

    let resp = server
        .client
        .get(server.url("/uploads/..%2Fsecret.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = server
        .client
        .get(server.url("/uploads/missing.txt"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

/// 未匹配的路径回退到前端 index.html
#[tokio::test]
async fn test_client_shell_fallback() {
    let server = TestServer::start().await;

    let resp = server
        .client
        .get(server.url("/some/client/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let dist = server.dir.path().join("dist");
    std::fs::create_dir_all(dist.join("assets")).unwrap();
    std::fs::write(dist.join("index.html"), "<html>shareit</html>").unwrap();
    std::fs::write(dist.join("assets/app.js"), "console.log(1)").unwrap();

    let resp = server
        .client
        .get(server.url("/some/client/route"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "<html>shareit</html>");

    let resp = server
        .client
        .get(server.url("/assets/app.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "console.log(1)");

    // 路径中的转义字符先解码再查找
    std::fs::write(dist.join("my file.js"), "spaced").unwrap();
    let resp = server
        .client
        .get(server.url("/my%20file.js"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.text().await.unwrap(), "spaced");
}

/// 上传和列表请求都会推迟空闲退出，停止请求后只触发一次
#[tokio::test]
async fn test_requests_reset_idle_timer() {
    let fired = Arc::new(AtomicUsize::new(0));
    let hook = fired.clone();
    let idle = IdleSupervisor::spawn(Duration::from_millis(800), move || {
        hook.fetch_add(1, Ordering::SeqCst);
    });
    let server = TestServer::start_with(shareit_core::MAX_UPLOAD_SIZE, idle).await;

    // 总时长 2 秒，远超最初的截止时间
    for round in 0..8 {
        tokio::time::sleep(Duration::from_millis(250)).await;
        if round % 2 == 0 {
            server.list().await;
        } else {
            let resp = server.upload("ping.txt", b"ping".to_vec()).await;
            assert_eq!(resp.status(), StatusCode::OK);
        }
    }
    assert_eq!(fired.load(Ordering::SeqCst), 0);

    tokio::time::sleep(Duration::from_millis(1600)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

/// 获取二维码不算活动
#[tokio::test]
async fn test_qr_does_not_reset_idle_timer() {
    let fired = Arc::new(AtomicUsize::new(0));
    let hook = fired.clone();
    let idle = IdleSupervisor::spawn(Duration::from_millis(800), move || {
        hook.fetch_add(1, Ordering::SeqCst);
    });
    let server = TestServer::start_with(shareit_core::MAX_UPLOAD_SIZE, idle).await;

    for _ in 0..4 {
        tokio::time::sleep(Duration::from_millis(250)).await;
        server.client.get(server.url("/api/qr")).send().await.unwrap();
    }
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}
