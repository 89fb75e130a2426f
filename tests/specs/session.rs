//! Agent session specs
//!
//! Reconnect after a dropped control connection, against a real
//! in-process WebSocket server.

use futures_util::{SinkExt, StreamExt};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::accept_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use wharf_core::AgentIdentity;
use wharf_session::{supervisor, SessionConfig};
use wharf_wire::{decode, encode, Envelope, IDENTIFY};

#[tokio::test]
async fn agent_reidentifies_after_the_proxy_drops_the_connection() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();

    let server = tokio::spawn(async move {
        let mut identified = Vec::new();
        // First connection: ack the identify, then drop the socket as a
        // restarting proxy would.
        for keep_open in [false, true] {
            let (stream, _) = listener.accept().await.unwrap();
            let mut server = accept_async(stream).await.unwrap();
            let identify = loop {
                match server.next().await.unwrap().unwrap() {
                    Message::Text(text) => break decode(text.as_str()).unwrap(),
                    _ => continue,
                }
            };
            assert_eq!(identify.kind, IDENTIFY);
            let ack = Envelope::response_to(identify.id.clone().unwrap(), serde_json::Value::Null);
            server.send(Message::text(encode(&ack).unwrap())).await.unwrap();
            identified.push(identify);
            if keep_open {
                let _ = tokio::time::timeout(Duration::from_secs(1), server.next()).await;
            }
        }
        identified
    });

    let identity =
        AgentIdentity::new("edge-1", "0191a2b3-0000-7000-8000-000000000001".parse().unwrap());
    let mut config = SessionConfig::new(format!("http://{addr}"), "key-123", identity);
    config.insecure = true;

    let token = CancellationToken::new();
    let agent = tokio::spawn(supervisor::run(config, None, token.clone()));

    // Both connections identified themselves; the reconnect delay starts
    // at one second, so allow a few.
    let identified = tokio::time::timeout(Duration::from_secs(10), server)
        .await
        .expect("supervisor reconnected in time")
        .unwrap();
    assert_eq!(identified.len(), 2);
    assert_eq!(identified[0].payload["name"], "edge-1");
    assert_eq!(identified[1].payload["name"], "edge-1");

    // The operator stop signal never fired during the reconnect.
    assert!(!token.is_cancelled());
    token.cancel();
    tokio::time::timeout(Duration::from_secs(5), agent).await.unwrap().unwrap();
}
