// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Durable agent session over a WebSocket control connection.
//!
//! A [`Session`] dials the control-plane proxy, identifies itself, then
//! multiplexes request/response correlation over the socket; the
//! [`supervisor`] keeps one alive forever with backoff.

mod correlator;
mod error;
mod session;
pub mod supervisor;
mod transport;
mod url;

pub use correlator::Correlator;
pub use error::SessionError;
pub use session::{Session, SessionConfig};
pub use url::ws_url;
