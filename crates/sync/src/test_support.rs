// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes for the inventory pipeline (behind the `test-support` feature).

use crate::source::{InventorySource, SourceError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use wharf_client::{ApiError, ResourceApi};
use wharf_core::{ProviderId, RelationshipRule, Resource, WorkspaceId};

/// What the fake control plane observed, in call order.
#[derive(Debug, Clone, PartialEq)]
pub enum ResourceCall {
    EnsureProvider { workspace: WorkspaceId, name: String },
    DeclareRules { provider: ProviderId, count: usize },
    Upsert { provider: ProviderId, identifiers: Vec<String> },
}

/// In-memory control plane for the resource surface.
#[derive(Default)]
pub struct FakeResourceApi {
    calls: Mutex<Vec<ResourceCall>>,
    next_provider_id: Mutex<u32>,
}

impl FakeResourceApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ResourceCall> {
        self.calls.lock().clone()
    }

    pub fn ensure_count(&self) -> usize {
        self.calls
            .lock()
            .iter()
            .filter(|c| matches!(c, ResourceCall::EnsureProvider { .. }))
            .count()
    }

    pub fn upserted_identifiers(&self) -> Vec<String> {
        self.calls
            .lock()
            .iter()
            .filter_map(|c| match c {
                ResourceCall::Upsert { identifiers, .. } => Some(identifiers.clone()),
                _ => None,
            })
            .flatten()
            .collect()
    }
}

#[async_trait]
impl ResourceApi for FakeResourceApi {
    async fn ensure_provider(
        &self,
        workspace: WorkspaceId,
        name: &str,
    ) -> Result<ProviderId, ApiError> {
        self.calls
            .lock()
            .push(ResourceCall::EnsureProvider { workspace, name: name.to_string() });
        let mut next = self.next_provider_id.lock();
        *next += 1;
        Ok(ProviderId::new(format!("prov-{next}")))
    }

    async fn declare_relationship_rules(
        &self,
        provider: &ProviderId,
        rules: &[RelationshipRule],
    ) -> Result<(), ApiError> {
        self.calls
            .lock()
            .push(ResourceCall::DeclareRules { provider: provider.clone(), count: rules.len() });
        Ok(())
    }

    async fn upsert_resources(
        &self,
        provider: &ProviderId,
        resources: &[Resource],
    ) -> Result<(), ApiError> {
        self.calls.lock().push(ResourceCall::Upsert {
            provider: provider.clone(),
            identifiers: resources.iter().map(|r| r.identifier.clone()).collect(),
        });
        Ok(())
    }
}

/// Scripted inventory source with per-shard outcomes.
pub struct FakeSource {
    name: String,
    shards: Vec<String>,
    outcomes: Mutex<HashMap<String, Result<Vec<Resource>, String>>>,
    rules: Vec<RelationshipRule>,
}

impl FakeSource {
    pub fn new(name: &str, shards: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            shards: shards.iter().map(|s| s.to_string()).collect(),
            outcomes: Mutex::new(HashMap::new()),
            rules: Vec::new(),
        }
    }

    pub fn with_rules(mut self, rules: Vec<RelationshipRule>) -> Self {
        self.rules = rules;
        self
    }

    pub fn stub_shard(&self, shard: &str, outcome: Result<Vec<Resource>, String>) {
        self.outcomes.lock().insert(shard.to_string(), outcome);
    }
}

#[async_trait]
impl InventorySource for FakeSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn shards(&self) -> Result<Vec<String>, SourceError> {
        Ok(self.shards.clone())
    }

    async fn collect(&self, shard: &str) -> Result<Vec<Resource>, SourceError> {
        match self.outcomes.lock().get(shard) {
            Some(Ok(resources)) => Ok(resources.clone()),
            Some(Err(message)) => Err(SourceError::Backend(message.clone())),
            None => Ok(Vec::new()),
        }
    }

    fn relationship_rules(&self) -> Vec<RelationshipRule> {
        self.rules.clone()
    }
}
