use std::sync::Arc;
use std::time::Duration;

use lobbyforge::launch::ENDPOINT_VAR;
use lobbyforge::prelude::*;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio::sync::mpsc;

// ---------------------------------------------------------------------------
// Stand-in provisioning service, used when no endpoint is configured
// ---------------------------------------------------------------------------

async fn local_provisioning() -> std::io::Result<String> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        while let Ok((mut stream, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = stream.read(&mut buf).await;
            let body = format!(r#"{{"ip":"{}","port":7777}}"#, addr.ip());
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            let _ = stream.write_all(response.as_bytes()).await;
        }
    });

    Ok(format!("http://{addr}/GameServer"))
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    lobbyforge::init_tracing("info,lobbyforge_host=debug");

    let mut settings = Settings::from_env();
    if std::env::var(ENDPOINT_VAR).is_err() {
        settings.launch.endpoint = local_provisioning().await?;
        tracing::info!(endpoint = %settings.launch.endpoint, "using local provisioning stub");
    }

    let directory = MemoryDirectory::new()
        .with_user("u-ann", "Ann")
        .with_user("u-bo", "Bo");
    let mut registry = settings.registry(Arc::new(directory))?;

    let ann = Presence::new("s-ann", "u-ann", "ann");
    let bo = Presence::new("s-bo", "u-bo", "bo");

    let created = registry
        .create_lobby(&ann, CreateLobbyRequest::default())
        .await?;
    println!("created {} ({})", created.match_name, created.match_id);

    let (ann_tx, mut ann_rx) = mpsc::unbounded_channel();
    let (bo_tx, bo_rx) = mpsc::unbounded_channel();
    registry.join(&created.match_id, ann, ann_tx).await?;
    registry.join(&created.match_id, bo, bo_tx).await?;
    drop(bo_rx);

    for info in registry.list_lobbies(LobbyFilter::All).await {
        println!("lobby {}: {} players, {}", info.lobby_id, info.player_count, info.phase);
    }

    registry.send(InboundMessage::ready("s-ann")).await?;
    registry.send(InboundMessage::ready("s-bo")).await?;

    let outcome = tokio::time::timeout(Duration::from_secs(15), async {
        while let Some(msg) = ann_rx.recv().await {
            let body = String::from_utf8_lossy(&msg.data).into_owned();
            println!("ann <- {}: {body}", msg.op_code);
            if matches!(msg.op_code, OpCode::GameStart | OpCode::LaunchFailed) {
                return Some(msg.op_code);
            }
        }
        None
    })
    .await;

    match outcome {
        Ok(Some(OpCode::GameStart)) => println!("handoff complete"),
        Ok(Some(_)) => println!("launch failed; lobby closed"),
        Ok(None) => println!("lobby closed before launch"),
        Err(_) => println!("timed out waiting for launch"),
    }

    registry
        .destroy(&created.match_id, Duration::from_secs(1))
        .await
        .ok();
    Ok(())
}
