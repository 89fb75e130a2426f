// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Name-to-id resolution for a provider and the batch upsert entry point.

use std::sync::Arc;
use wharf_client::{ApiError, ResourceApi};
use wharf_core::{ProviderId, RelationshipRule, Resource, WorkspaceId};

/// A named publisher of resources.
///
/// The provider id is resolved once at construction and read-only after;
/// every upsert then goes through the provider.
pub struct ResourceProvider<A> {
    api: Arc<A>,
    id: ProviderId,
    name: String,
}

impl<A: ResourceApi> ResourceProvider<A> {
    /// Create or look up the provider on the control plane and memoize its
    /// id.
    pub async fn ensure(api: Arc<A>, workspace: WorkspaceId, name: &str) -> Result<Self, ApiError> {
        let id = api.ensure_provider(workspace, name).await?;
        tracing::debug!(provider = name, id = %id, "resource provider ensured");
        Ok(Self { api, id, name: name.to_string() })
    }

    pub fn id(&self) -> &ProviderId {
        &self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declare the edges the control plane should materialize between
    /// resources this provider publishes and other resources.
    pub async fn declare_rules(&self, rules: &[RelationshipRule]) -> Result<(), ApiError> {
        if rules.is_empty() {
            return Ok(());
        }
        self.api.declare_relationship_rules(&self.id, rules).await
    }

    /// Submit one batch with set semantics on `identifier`: the batch is
    /// the authoritative snapshot for this provider at this moment.
    pub async fn upsert(&self, resources: &[Resource]) -> Result<(), ApiError> {
        self.api.upsert_resources(&self.id, resources).await
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
