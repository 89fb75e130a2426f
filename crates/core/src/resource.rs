// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource records published to the control plane catalog.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Reserved metadata key prefixes. Searchable key/value pairs live under
/// these; sensitive values are never stored in metadata.
pub mod meta {
    pub const NETWORK: &str = "network/";
    pub const COMPUTE: &str = "compute/";
    pub const KUBERNETES: &str = "kubernetes/";
}

/// Control-plane-assigned id of a resource provider, opaque to the agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProviderId(String);

impl ProviderId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ProviderId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// An inventory record representing one external object.
///
/// `identifier` is the primary key on the control plane: repeated upserts
/// with the same identifier replace the prior record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resource {
    /// Stable natural key for the source (ARN, self-link, cluster URL).
    pub identifier: String,
    pub name: String,
    pub kind: String,
    /// Schema tag for `config`, not a semver.
    pub version: String,
    /// Nested configuration. Provider-specific shape lives under a single
    /// well-known key per source.
    #[serde(default)]
    pub config: serde_json::Value,
    #[serde(default)]
    pub metadata: BTreeMap<String, String>,
}

/// Edge semantics for a relationship rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DependencyType {
    ProvisionedIn,
    AssociatedWith,
}

impl std::fmt::Display for DependencyType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            DependencyType::ProvisionedIn => "provisioned-in",
            DependencyType::AssociatedWith => "associated-with",
        })
    }
}

/// A server-materialized edge between resource kinds, matched by metadata
/// keys. Declarations are idempotent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelationshipRule {
    /// Edge label, unique per provider.
    pub reference: String,
    pub name: String,
    pub dependency_type: DependencyType,
    pub source_kind: String,
    pub source_version: String,
    pub target_kind: String,
    pub target_version: String,
    /// Metadata keys whose values must match on both ends, in order.
    pub metadata_keys: Vec<String>,
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
