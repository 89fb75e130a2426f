// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The inventory source contract.

use async_trait::async_trait;
use wharf_core::{RelationshipRule, Resource};

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    /// The backing API rejected or lost a call.
    #[error("{0}")]
    Backend(String),

    #[error("operation cancelled")]
    Cancelled,
}

/// One family of third-party inventory (a cloud provider, an IaC vendor,
/// a fleet of clusters).
///
/// A shard is the unit of parallelism: a region, a project, or a cluster
/// context, depending on the source family.
#[async_trait]
pub trait InventorySource: Send + Sync {
    /// Short family name used in logs and derived provider names.
    fn name(&self) -> &str;

    /// The shards to sync this cycle. Implementations own discovery and
    /// any hard-coded fallback when discovery fails.
    async fn shards(&self) -> Result<Vec<String>, SourceError>;

    /// Collect and normalize one shard. Pagination completes before the
    /// call returns; per-item failures are logged and skipped inside.
    async fn collect(&self, shard: &str) -> Result<Vec<Resource>, SourceError>;

    /// Edges the control plane should materialize between this source's
    /// resources. Declared before every upsert; declarations are
    /// idempotent.
    fn relationship_rules(&self) -> Vec<RelationshipRule> {
        Vec::new()
    }
}
