// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error kinds for control-plane calls.

use reqwest::StatusCode;

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Connection, TLS, or timeout failure before a response arrived.
    #[error("network error calling control plane: {0}")]
    Transport(#[from] reqwest::Error),

    /// The control plane answered with a non-2xx status.
    #[error("control plane returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    /// 2xx response whose body did not match the expected shape.
    #[error("could not decode control plane response: {0}")]
    Decode(#[source] serde_json::Error),

    /// The owning task was cancelled; never reported as a job failure.
    #[error("operation cancelled")]
    Cancelled,

    /// Client misconfiguration (bad base URL, unencodable header). Fatal
    /// at startup, never retried.
    #[error("invalid control plane client configuration: {0}")]
    Config(String),
}

impl ApiError {
    /// Transient errors eligible for the retry budget: network failures,
    /// 5xx, and 429. Other 4xx are semantic and surface immediately.
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Transport(e) => !e.is_builder(),
            ApiError::Status { status, .. } => {
                status.is_server_error() || *status == StatusCode::TOO_MANY_REQUESTS
            }
            ApiError::Decode(_) | ApiError::Cancelled | ApiError::Config(_) => false,
        }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
