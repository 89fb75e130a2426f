// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reconnect-forever supervision of the agent session.

use crate::session::{Session, SessionConfig};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use wharf_core::Backoff;
use wharf_wire::Envelope;

/// Keep one session alive until `token` is cancelled.
///
/// The delay between attempts starts at 1s, doubles on each failure, caps
/// at 30s, and resets to the minimum after any successful handshake.
pub async fn run(
    config: SessionConfig,
    notifications: Option<mpsc::Sender<Envelope>>,
    token: CancellationToken,
) {
    run_with_backoff(config, notifications, token, Backoff::standard()).await
}

pub(crate) async fn run_with_backoff(
    config: SessionConfig,
    notifications: Option<mpsc::Sender<Envelope>>,
    token: CancellationToken,
    mut backoff: Backoff,
) {
    let agent = config.identity.name.clone();
    loop {
        if token.is_cancelled() {
            return;
        }
        match Session::connect(&config, notifications.clone()).await {
            Ok(session) => {
                backoff.reset();
                let stopped = session.stopped();
                tokio::select! {
                    _ = token.cancelled() => {
                        session.close();
                        return;
                    }
                    _ = stopped.cancelled() => {
                        tracing::warn!(%agent, "agent session terminated");
                    }
                }
            }
            Err(error) => {
                tracing::warn!(%agent, %error, "failed to establish agent session");
            }
        }
        let delay = backoff.next_delay();
        tracing::debug!(%agent, delay_ms = delay.as_millis() as u64, "reconnecting after backoff");
        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            _ = token.cancelled() => return,
        }
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
