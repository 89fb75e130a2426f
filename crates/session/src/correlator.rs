// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Request/response correlation by opaque id.

use parking_lot::Mutex;
use std::collections::HashMap;
use tokio::sync::oneshot;
use wharf_core::request_id;
use wharf_wire::Envelope;

/// Matches outbound requests with inbound responses.
///
/// Each registered id is resolved at most once; dropping the map on
/// session end fails every outstanding waiter with a closed-channel error,
/// which callers surface as [`crate::SessionError::Closed`].
#[derive(Default)]
pub struct Correlator {
    waiters: Mutex<HashMap<String, oneshot::Sender<Envelope>>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mint a fresh id and a one-shot handle for its response.
    pub fn register(&self) -> (String, oneshot::Receiver<Envelope>) {
        let (tx, rx) = oneshot::channel();
        let id = request_id();
        self.waiters.lock().insert(id.clone(), tx);
        (id, rx)
    }

    /// Deliver a response to the matching waiter. Unmatched or duplicate
    /// deliveries are logged and dropped.
    pub fn resolve(&self, id: &str, envelope: Envelope) {
        let Some(waiter) = self.waiters.lock().remove(id) else {
            tracing::debug!(id, "dropping response with no matching request");
            return;
        };
        if waiter.send(envelope).is_err() {
            tracing::debug!(id, "response waiter abandoned before delivery");
        }
    }

    /// Fail every outstanding waiter; called exactly once on session end.
    pub fn cancel_all(&self) {
        let waiters = std::mem::take(&mut *self.waiters.lock());
        if !waiters.is_empty() {
            tracing::debug!(outstanding = waiters.len(), "cancelling outstanding requests");
        }
    }

    #[cfg(test)]
    pub(crate) fn pending(&self) -> usize {
        self.waiters.lock().len()
    }
}

#[cfg(test)]
#[path = "correlator_tests.rs"]
mod tests;
