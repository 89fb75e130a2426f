// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Session error kinds.

use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Dial, read, or write failure on the underlying socket. Terminal for
    /// the transport; the supervisor reconnects.
    #[error("websocket transport error: {0}")]
    Transport(#[from] tokio_tungstenite::tungstenite::Error),

    /// The control plane never acknowledged `agent.identify`.
    #[error("identify handshake failed: {0}")]
    Handshake(String),

    /// A correlated request outlived its deadline. The caller decides
    /// whether to retry.
    #[error("no response within {0:?}")]
    Timeout(Duration),

    /// The session terminated while requests were outstanding.
    #[error("session closed")]
    Closed,

    #[error(transparent)]
    Wire(#[from] wharf_wire::WireError),

    /// Operator-supplied header name or value that cannot travel in an
    /// upgrade request. Fatal at startup.
    #[error("invalid header {0:?}")]
    Header(String),
}
