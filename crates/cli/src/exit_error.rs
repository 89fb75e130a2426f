// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fatal error surface for the binary.
//!
//! Every fatal path funnels into one enum so `main()` owns process
//! termination and the exit codes stay stable: 2 for rejected operator
//! input, 1 for runtime failures.

use crate::config::ConfigError;
use std::fmt;
use wharf_agent::RunnerError;
use wharf_client::ApiError;
use wharf_sync::SyncError;

#[derive(Debug)]
pub enum ExitError {
    /// Misconfiguration detected at startup; never retried.
    Config(String),
    /// A failure the process could not recover from.
    Runtime(String),
}

impl ExitError {
    pub fn code(&self) -> i32 {
        match self {
            ExitError::Config(_) => 2,
            ExitError::Runtime(_) => 1,
        }
    }
}

impl fmt::Display for ExitError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExitError::Config(message) => write!(f, "configuration error: {message}"),
            ExitError::Runtime(message) => f.write_str(message),
        }
    }
}

impl std::error::Error for ExitError {}

impl From<ConfigError> for ExitError {
    fn from(error: ConfigError) -> Self {
        ExitError::Config(error.to_string())
    }
}

impl From<ApiError> for ExitError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Config(message) => ExitError::Config(message),
            other => ExitError::Runtime(other.to_string()),
        }
    }
}

impl From<RunnerError> for ExitError {
    fn from(error: RunnerError) -> Self {
        ExitError::Runtime(error.to_string())
    }
}

impl From<SyncError> for ExitError {
    fn from(error: SyncError) -> Self {
        ExitError::Runtime(error.to_string())
    }
}
