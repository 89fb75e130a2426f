// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The resilient "agent is connected" abstraction.
//!
//! State machine: Dialing → Handshaking → Connected → Terminated. A
//! transport failure in any state terminates the session and fires the
//! stop signal; reconnecting is the supervisor's job.

use crate::correlator::Correlator;
use crate::error::SessionError;
use crate::transport::{self, WsStream};
use crate::url::ws_url;
use futures_util::stream::{SplitSink, SplitStream};
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use wharf_core::AgentIdentity;
use wharf_wire::{decode, encode, headers, Envelope, IdentifyPayload, Inbound, IDENTIFY, REQUEST};

/// Connection settings for one agent session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Base URL shared with the REST client; the WebSocket URL is derived
    /// from it.
    pub base_url: String,
    pub api_key: String,
    /// Forces `ws://` instead of `wss://`.
    pub insecure: bool,
    /// Operator-declared extra upgrade headers.
    pub extra_headers: Vec<(String, String)>,
    pub identity: AgentIdentity,
    /// Quiescence window: with no inbound traffic for this long the
    /// session is considered broken.
    pub heartbeat_window: Duration,
    pub handshake_timeout: Duration,
    pub request_timeout: Duration,
}

impl SessionConfig {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        identity: AgentIdentity,
    ) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            insecure: false,
            extra_headers: Vec::new(),
            identity,
            heartbeat_window: Duration::from_secs(45),
            handshake_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }

    fn upgrade_headers(&self) -> Vec<(String, String)> {
        let mut all = vec![
            (headers::API_KEY.to_string(), self.api_key.clone()),
            (headers::WORKSPACE.to_string(), self.identity.workspace.to_string()),
        ];
        all.extend(self.extra_headers.iter().cloned());
        all
    }
}

/// One established control connection.
///
/// The session exclusively owns its transport and correlator. Dropping the
/// handle (or calling [`Session::close`]) tears the connection down and
/// fails outstanding requests with [`SessionError::Closed`].
pub struct Session {
    outbound: mpsc::Sender<Message>,
    correlator: Arc<Correlator>,
    stopped: CancellationToken,
    request_timeout: Duration,
}

impl Session {
    /// Dial and complete the identify handshake.
    ///
    /// `agent.identify` is the first outbound message; no other traffic
    /// leaves the socket until the control plane acknowledges it.
    pub async fn connect(
        config: &SessionConfig,
        notifications: Option<mpsc::Sender<Envelope>>,
    ) -> Result<Self, SessionError> {
        let url = ws_url(&config.base_url, config.insecure);
        let agent = config.identity.name.clone();
        tracing::debug!(%url, %agent, "dialing control plane");
        let stream = transport::connect(&url, &config.upgrade_headers()).await?;
        let (mut write, mut read) = stream.split();

        let identify_id = wharf_core::request_id();
        let payload = serde_json::to_value(IdentifyPayload::from(&config.identity))
            .map_err(|e| SessionError::Handshake(format!("encode identify payload: {e}")))?;
        let identify = Envelope::request(IDENTIFY, identify_id.clone(), payload);
        write.send(Message::text(encode(&identify)?)).await?;

        match tokio::time::timeout(
            config.handshake_timeout,
            await_identify_ack(&mut write, &mut read, &identify_id),
        )
        .await
        {
            Ok(Ok(())) => tracing::info!(%agent, "identified to control plane"),
            Ok(Err(error)) => return Err(error),
            Err(_) => {
                return Err(SessionError::Handshake(format!(
                    "no acknowledgement within {:?}",
                    config.handshake_timeout
                )))
            }
        }

        let correlator = Arc::new(Correlator::new());
        let stopped = CancellationToken::new();
        let (outbound, outbound_rx) = mpsc::channel::<Message>(64);

        tokio::spawn(write_loop(write, outbound_rx, stopped.clone()));
        tokio::spawn(read_loop(
            read,
            outbound.clone(),
            correlator.clone(),
            notifications,
            stopped.clone(),
            config.heartbeat_window,
            agent,
        ));

        Ok(Self { outbound, correlator, stopped, request_timeout: config.request_timeout })
    }

    /// One-shot stop signal; fires when the session terminates for any
    /// reason. The reconnect loop waits on it.
    pub fn stopped(&self) -> CancellationToken {
        self.stopped.clone()
    }

    /// Tear the session down. Idempotent.
    pub fn close(&self) {
        self.stopped.cancel();
    }

    /// Fire-and-forget send, serialized through the single writer.
    pub async fn send(&self, envelope: &Envelope) -> Result<(), SessionError> {
        let message = Message::text(encode(envelope)?);
        self.outbound.send(message).await.map_err(|_| SessionError::Closed)
    }

    /// Correlated request; resolves with the matching response or fails
    /// with [`SessionError::Closed`] when the session ends first.
    pub async fn request(&self, payload: serde_json::Value) -> Result<Envelope, SessionError> {
        let (id, waiter) = self.correlator.register();
        self.send(&Envelope::request(REQUEST, id, payload)).await?;
        match tokio::time::timeout(self.request_timeout, waiter).await {
            Ok(Ok(envelope)) => Ok(envelope),
            Ok(Err(_)) => Err(SessionError::Closed),
            Err(_) => Err(SessionError::Timeout(self.request_timeout)),
        }
    }
}

/// Read until the identify response arrives. Server pings are answered
/// even during the handshake; everything else is skipped.
async fn await_identify_ack(
    write: &mut SplitSink<WsStream, Message>,
    read: &mut SplitStream<WsStream>,
    identify_id: &str,
) -> Result<(), SessionError> {
    while let Some(frame) = read.next().await {
        match frame? {
            Message::Text(text) => {
                let envelope = match decode(text.as_str()) {
                    Ok(envelope) => envelope,
                    Err(error) => {
                        tracing::debug!(%error, "skipping malformed frame during handshake");
                        continue;
                    }
                };
                match envelope.inbound_kind() {
                    Inbound::Ping => write.send(Message::text(encode(&Envelope::pong())?)).await?,
                    Inbound::Response if envelope.id.as_deref() == Some(identify_id) => {
                        return Ok(());
                    }
                    _ => {
                        tracing::debug!(kind = %envelope.kind, "frame before handshake completion, skipping")
                    }
                }
            }
            Message::Close(_) => {
                return Err(SessionError::Handshake("connection closed during handshake".to_string()))
            }
            _ => {}
        }
    }
    Err(SessionError::Handshake("stream ended during handshake".to_string()))
}

/// Single writer: everything outbound funnels through one task.
async fn write_loop(
    mut write: SplitSink<WsStream, Message>,
    mut outbound: mpsc::Receiver<Message>,
    stopped: CancellationToken,
) {
    loop {
        tokio::select! {
            _ = stopped.cancelled() => break,
            message = outbound.recv() => match message {
                Some(message) => {
                    if let Err(error) = write.send(message).await {
                        tracing::warn!(%error, "transport write error");
                        stopped.cancel();
                        break;
                    }
                }
                None => break,
            }
        }
    }
    let _ = write.close().await;
}

/// Single reader: dispatches inbound frames until the transport fails,
/// the quiescence window elapses, or the session is stopped.
async fn read_loop(
    mut read: SplitStream<WsStream>,
    outbound: mpsc::Sender<Message>,
    correlator: Arc<Correlator>,
    notifications: Option<mpsc::Sender<Envelope>>,
    stopped: CancellationToken,
    heartbeat_window: Duration,
    agent: String,
) {
    loop {
        let frame = tokio::select! {
            _ = stopped.cancelled() => break,
            frame = tokio::time::timeout(heartbeat_window, read.next()) => frame,
        };
        match frame {
            Err(_) => {
                tracing::warn!(
                    %agent,
                    window_ms = heartbeat_window.as_millis() as u64,
                    "no inbound traffic within the quiescence window, terminating session"
                );
                break;
            }
            Ok(None) => {
                tracing::info!(%agent, "control connection ended");
                break;
            }
            Ok(Some(Err(error))) => {
                tracing::warn!(%agent, %error, "transport read error");
                break;
            }
            Ok(Some(Ok(Message::Text(text)))) => {
                dispatch(text.as_str(), &outbound, &correlator, notifications.as_ref()).await;
            }
            Ok(Some(Ok(Message::Close(frame)))) => {
                tracing::info!(%agent, ?frame, "received close frame");
                break;
            }
            Ok(Some(Ok(_))) => {} // Ping/Pong/Binary — ignore
        }
    }
    stopped.cancel();
    correlator.cancel_all();
}

async fn dispatch(
    text: &str,
    outbound: &mpsc::Sender<Message>,
    correlator: &Correlator,
    notifications: Option<&mpsc::Sender<Envelope>>,
) {
    let envelope = match decode(text) {
        Ok(envelope) => envelope,
        Err(error) => {
            tracing::debug!(%error, "skipping malformed frame");
            return;
        }
    };
    match envelope.inbound_kind() {
        Inbound::Ping => {
            if let Ok(pong) = encode(&Envelope::pong()) {
                let _ = outbound.send(Message::text(pong)).await;
            }
        }
        Inbound::Response => match envelope.id.clone() {
            Some(id) => correlator.resolve(&id, envelope),
            None => tracing::debug!("response frame without id, dropping"),
        },
        Inbound::Notification => match notifications {
            Some(tx) => {
                let _ = tx.send(envelope).await;
            }
            None => tracing::debug!("notification with no handler registered, skipping"),
        },
        Inbound::Unknown => {
            tracing::debug!(kind = %envelope.kind, "unknown message type, skipping")
        }
    }
}

#[cfg(test)]
#[path = "session_tests.rs"]
mod tests;
