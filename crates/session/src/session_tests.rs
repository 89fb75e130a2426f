// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::time::Duration;
use tokio::net::{TcpListener, TcpStream};
use tokio_tungstenite::tungstenite::handshake::server::{Request, Response};
use tokio_tungstenite::{accept_async, accept_hdr_async, WebSocketStream};

fn identity() -> AgentIdentity {
    AgentIdentity::new("edge-1", "0191a2b3-0000-7000-8000-000000000001".parse().unwrap())
}

fn config(addr: &str) -> SessionConfig {
    let mut config = SessionConfig::new(format!("http://{addr}"), "key-123", identity());
    config.insecure = true;
    config.handshake_timeout = Duration::from_secs(2);
    config.request_timeout = Duration::from_secs(2);
    config
}

async fn bind() -> (TcpListener, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap().to_string();
    (listener, addr)
}

async fn accept(listener: &TcpListener) -> WebSocketStream<TcpStream> {
    let (stream, _) = listener.accept().await.unwrap();
    accept_async(stream).await.unwrap()
}

async fn read_envelope(server: &mut WebSocketStream<TcpStream>) -> Envelope {
    loop {
        match server.next().await.unwrap().unwrap() {
            Message::Text(text) => return decode(text.as_str()).unwrap(),
            _ => continue,
        }
    }
}

async fn send_envelope(server: &mut WebSocketStream<TcpStream>, envelope: &Envelope) {
    server.send(Message::text(encode(envelope).unwrap())).await.unwrap();
}

/// Read the identify frame and acknowledge it.
async fn ack_identify(server: &mut WebSocketStream<TcpStream>) -> Envelope {
    let identify = read_envelope(server).await;
    assert_eq!(identify.kind, IDENTIFY);
    let id = identify.id.clone().unwrap();
    send_envelope(server, &Envelope::response_to(id, serde_json::json!({ "ok": true }))).await;
    identify
}

#[tokio::test]
async fn identify_is_the_first_outbound_message_and_carries_the_identity() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let mut server = accept(&listener).await;
        ack_identify(&mut server).await
    });

    let session = Session::connect(&config(&addr), None).await.unwrap();
    let identify = server.await.unwrap();
    assert_eq!(identify.payload["name"], "edge-1");
    drop(session);
}

#[tokio::test]
async fn upgrade_request_carries_api_key_and_workspace_headers() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (tx, rx) = tokio::sync::oneshot::channel();
        let mut tx = Some(tx);
        let callback = |req: &Request, resp: Response| {
            let api_key = req.headers().get("x-api-key").cloned();
            let workspace = req.headers().get("x-workspace").cloned();
            if let Some(tx) = tx.take() {
                let _ = tx.send((api_key, workspace));
            }
            Ok(resp)
        };
        let mut server = accept_hdr_async(stream, callback).await.unwrap();
        ack_identify(&mut server).await;
        rx.await.unwrap()
    });

    let session = Session::connect(&config(&addr), None).await.unwrap();
    let (api_key, workspace) = server.await.unwrap();
    assert_eq!(api_key.unwrap().to_str().unwrap(), "key-123");
    assert_eq!(
        workspace.unwrap().to_str().unwrap(),
        "0191a2b3-0000-7000-8000-000000000001"
    );
    drop(session);
}

#[tokio::test]
async fn server_ping_is_answered_with_a_pong() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let mut server = accept(&listener).await;
        ack_identify(&mut server).await;
        send_envelope(&mut server, &Envelope::event(wharf_wire::PING, serde_json::Value::Null))
            .await;
        read_envelope(&mut server).await
    });

    let session = Session::connect(&config(&addr), None).await.unwrap();
    let pong = server.await.unwrap();
    assert_eq!(pong.kind, wharf_wire::PONG);
    drop(session);
}

#[tokio::test]
async fn correlated_request_resolves_with_the_matching_response() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let mut server = accept(&listener).await;
        ack_identify(&mut server).await;
        let request = read_envelope(&mut server).await;
        assert_eq!(request.kind, REQUEST);
        let id = request.id.clone().unwrap();
        // An unmatched response first: must be dropped, not delivered.
        send_envelope(&mut server, &Envelope::response_to("no-such-id", serde_json::Value::Null))
            .await;
        send_envelope(&mut server, &Envelope::response_to(id, serde_json::json!({ "n": 7 })))
            .await;
        // Hold the connection open until the client is done.
        let _ = server.next().await;
    });

    let session = Session::connect(&config(&addr), None).await.unwrap();
    let response = session.request(serde_json::json!({ "q": 1 })).await.unwrap();
    assert_eq!(response.payload["n"], 7);
    drop(session);
    server.await.unwrap();
}

#[tokio::test]
async fn session_end_fails_outstanding_requests_with_closed() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let mut server = accept(&listener).await;
        ack_identify(&mut server).await;
        // Read the request, then drop the connection without answering.
        let _ = read_envelope(&mut server).await;
    });

    let session = Session::connect(&config(&addr), None).await.unwrap();
    let stopped = session.stopped();
    let result = session.request(serde_json::json!({ "q": 1 })).await;
    assert!(matches!(result, Err(SessionError::Closed)));
    server.await.unwrap();
    tokio::time::timeout(Duration::from_secs(2), stopped.cancelled()).await.unwrap();
}

#[tokio::test]
async fn quiescence_past_the_heartbeat_window_terminates_the_session() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let mut server = accept(&listener).await;
        ack_identify(&mut server).await;
        // Stay silent; the client's quiescence watchdog should fire.
        let _ = server.next().await;
    });

    let mut config = config(&addr);
    config.heartbeat_window = Duration::from_millis(200);
    let session = Session::connect(&config, None).await.unwrap();
    let stopped = session.stopped();
    tokio::time::timeout(Duration::from_secs(2), stopped.cancelled()).await.unwrap();
    drop(session);
    server.await.unwrap();
}

#[tokio::test]
async fn notifications_are_handed_to_the_registered_channel() {
    let (listener, addr) = bind().await;
    let server = tokio::spawn(async move {
        let mut server = accept(&listener).await;
        ack_identify(&mut server).await;
        send_envelope(
            &mut server,
            &Envelope::event(wharf_wire::NOTIFICATION, serde_json::json!({ "event": "drain" })),
        )
        .await;
        let _ = server.next().await;
    });

    let (tx, mut rx) = mpsc::channel(4);
    let session = Session::connect(&config(&addr), Some(tx)).await.unwrap();
    let notification = tokio::time::timeout(Duration::from_secs(2), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(notification.payload["event"], "drain");
    drop(session);
    server.await.unwrap();
}
