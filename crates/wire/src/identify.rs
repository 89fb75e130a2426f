// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `agent.identify` handshake payload.
//!
//! The workspace travels in the upgrade headers, not here; the payload
//! carries only what the control plane records against the agent entry.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use wharf_core::AgentIdentity;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentifyPayload {
    pub name: String,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
    #[serde(default)]
    pub associated_resources: Vec<String>,
}

impl From<&AgentIdentity> for IdentifyPayload {
    fn from(identity: &AgentIdentity) -> Self {
        Self {
            name: identity.name.clone(),
            metadata: identity.metadata.clone(),
            associated_resources: identity.associated_resources.clone(),
        }
    }
}

#[cfg(test)]
#[path = "identify_tests.rs"]
mod tests;
