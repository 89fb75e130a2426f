// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Workspace identity.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// The workspace this agent belongs to. Wire format is the bare UUID string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkspaceId(Uuid);

impl WorkspaceId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl FromStr for WorkspaceId {
    type Err = WorkspaceIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self).map_err(|_| WorkspaceIdError(s.to_string()))
    }
}

impl std::fmt::Display for WorkspaceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Raised at startup for a malformed workspace id; never retried.
#[derive(Debug, thiserror::Error)]
#[error("invalid workspace id {0:?}: expected a UUID")]
pub struct WorkspaceIdError(String);

#[cfg(test)]
#[path = "workspace_tests.rs"]
mod tests;
