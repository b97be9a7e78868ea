//! End-to-end: settings → registry → lobby actor → HTTP provisioning.

use std::sync::Arc;
use std::time::Duration;

use lobbyforge::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// =========================================================================
// Helpers
// =========================================================================

const SERVER_REPLY: &str = r#"{"matchId":"ignored","ip":"10.1.2.3","port":7777}"#;

/// Answers every request with `200 OK` and `SERVER_REPLY`, counting them.
async fn provisioning_service() -> (String, Arc<std::sync::atomic::AtomicUsize>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    let hits = Arc::new(std::sync::atomic::AtomicUsize::new(0));
    let counter = hits.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut stream, _)) = listener.accept().await else {
                return;
            };
            counter.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            // The request is tiny; one read gets headers and body.
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{SERVER_REPLY}",
                SERVER_REPLY.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
            let _ = stream.shutdown().await;
        }
    });

    (format!("http://{addr}/GameServer"), hits)
}

async fn next_op(inbox: &mut mpsc::UnboundedReceiver<OutboundMessage>, op: OpCode) -> OutboundMessage {
    let wait = async {
        loop {
            let msg = inbox.recv().await.expect("lobby channel open");
            if msg.op_code == op {
                return msg;
            }
        }
    };
    tokio::time::timeout(Duration::from_secs(5), wait)
        .await
        .unwrap_or_else(|_| panic!("no {op} within 5s"))
}

// =========================================================================
// Tests
// =========================================================================

#[tokio::test]
async fn test_two_players_ready_up_and_receive_server() {
    let (endpoint, hits) = provisioning_service().await;
    let settings = Settings::from_lookup(|key| match key {
        "LOBBYFORGE_LAUNCH_ENDPOINT" => Some(endpoint.clone()),
        "LOBBYFORGE_TICK_RATE" => Some("20".into()),
        _ => None,
    });
    let directory = MemoryDirectory::new()
        .with_user("u-ann", "Ann")
        .with_user("u-bo", "Bo");
    let mut registry = settings.registry(Arc::new(directory)).unwrap();

    let ann = Presence::new("s-ann", "u-ann", "ann");
    let bo = Presence::new("s-bo", "u-bo", "bo");
    let created = registry
        .create_lobby(&ann, CreateLobbyRequest::default())
        .await
        .unwrap();
    assert_eq!(created.match_name, "Play with Ann");

    let (ann_tx, mut ann_rx) = mpsc::unbounded_channel();
    let (bo_tx, mut bo_rx) = mpsc::unbounded_channel();
    registry.join(&created.match_id, ann, ann_tx).await.unwrap();
    registry.join(&created.match_id, bo, bo_tx).await.unwrap();

    registry.send(InboundMessage::ready("s-ann")).await.unwrap();
    registry.send(InboundMessage::ready("s-bo")).await.unwrap();

    for inbox in [&mut ann_rx, &mut bo_rx] {
        let start = next_op(inbox, OpCode::GameStart).await;
        assert_eq!(start.data, SERVER_REPLY.as_bytes());
    }
    assert_eq!(hits.load(std::sync::atomic::Ordering::SeqCst), 1);

    let info = registry.info(&created.match_id).await.unwrap();
    assert_eq!(info.phase, Phase::InProgress);
    let label: serde_json::Value = serde_json::from_str(&info.label).unwrap();
    assert_eq!(label["canJoin"], "false");
}

#[tokio::test]
async fn test_unreachable_provisioning_reports_launch_failure() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let settings = Settings {
        launch: LaunchConfig {
            endpoint: format!("http://{addr}/GameServer"),
            timeout: Duration::from_secs(2),
        },
        ..Settings::default()
    };
    let mut registry = settings
        .registry(Arc::new(MemoryDirectory::new()))
        .unwrap();

    let ann = Presence::new("s-ann", "u-ann", "ann");
    let bo = Presence::new("s-bo", "u-bo", "bo");
    let created = registry
        .create_lobby(&ann, CreateLobbyRequest::default())
        .await
        .unwrap();
    // No directory record: falls back to the username.
    assert_eq!(created.match_name, "Play with ann");

    let (ann_tx, mut ann_rx) = mpsc::unbounded_channel();
    let (bo_tx, _bo_rx) = mpsc::unbounded_channel();
    registry.join(&created.match_id, ann, ann_tx).await.unwrap();
    registry.join(&created.match_id, bo, bo_tx).await.unwrap();
    registry.send(InboundMessage::ready("s-ann")).await.unwrap();
    registry.send(InboundMessage::ready("s-bo")).await.unwrap();

    let failed = next_op(&mut ann_rx, OpCode::LaunchFailed).await;
    let body: serde_json::Value = serde_json::from_slice(&failed.data).unwrap();
    assert!(body["reason"].as_str().is_some_and(|r| !r.is_empty()));

    assert!(ann_rx.recv().await.is_none());
    assert_eq!(registry.prune_closed(), vec![created.match_id]);
}
