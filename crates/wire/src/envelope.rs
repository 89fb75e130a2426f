// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The request/response envelope carried in every frame.

use crate::kind::{Inbound, PONG, RESPONSE};
use serde::{Deserialize, Serialize};

/// One message, either direction.
///
/// A request that sets `id` elicits at most one response carrying the same
/// `id`; messages without an `id` are fire-and-forget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "serde_json::Value::is_null")]
    pub payload: serde_json::Value,
}

impl Envelope {
    /// Fire-and-forget message.
    pub fn event(kind: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { kind: kind.into(), id: None, payload }
    }

    /// Correlated request; the caller owns the id.
    pub fn request(kind: impl Into<String>, id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { kind: kind.into(), id: Some(id.into()), payload }
    }

    /// Response to a correlated request.
    pub fn response_to(id: impl Into<String>, payload: serde_json::Value) -> Self {
        Self { kind: RESPONSE.to_string(), id: Some(id.into()), payload }
    }

    /// Heartbeat reply.
    pub fn pong() -> Self {
        Self::event(PONG, serde_json::Value::Null)
    }

    pub fn inbound_kind(&self) -> Inbound {
        Inbound::classify(&self.kind)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum WireError {
    #[error("malformed frame: {0}")]
    Malformed(#[from] serde_json::Error),
}

pub fn decode(text: &str) -> Result<Envelope, WireError> {
    Ok(serde_json::from_str(text)?)
}

pub fn encode(envelope: &Envelope) -> Result<String, WireError> {
    Ok(serde_json::to_string(envelope)?)
}

#[cfg(test)]
#[path = "envelope_tests.rs"]
mod tests;
