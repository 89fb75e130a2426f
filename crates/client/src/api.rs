// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The control-plane surfaces the loops are generic over.
//!
//! Splitting job and resource traffic keeps the job agent and the
//! inventory fan-out independently testable; one client may implement
//! both.

use crate::error::ApiError;
use async_trait::async_trait;
use wharf_core::{Job, JobId, JobUpdate, ProviderId, RelationshipRule, Resource, WorkspaceId};

/// Queue and status surface used by the job agent loop.
#[async_trait]
pub trait JobApi: Send + Sync {
    /// Claim the queued jobs currently assigned to this agent. The claim
    /// is idempotent by agent name; re-claiming returns the same jobs.
    async fn claim_queued_jobs(&self, agent: &str) -> Result<Vec<Job>, ApiError>;

    /// Jobs the control plane believes are still running on this agent.
    async fn list_running_jobs(&self, agent: &str) -> Result<Vec<Job>, ApiError>;

    /// Partial status update, idempotent by job id.
    async fn update_job(&self, id: JobId, update: &JobUpdate) -> Result<(), ApiError>;
}

/// Catalog surface used by the resource provider and inventory fan-out.
#[async_trait]
pub trait ResourceApi: Send + Sync {
    /// Create or look up a provider by name and return its id.
    async fn ensure_provider(
        &self,
        workspace: WorkspaceId,
        name: &str,
    ) -> Result<ProviderId, ApiError>;

    /// Declare relationship rules. Idempotent; re-declaration is a no-op.
    async fn declare_relationship_rules(
        &self,
        provider: &ProviderId,
        rules: &[RelationshipRule],
    ) -> Result<(), ApiError>;

    /// Replace the provider's resource set with one batch.
    async fn upsert_resources(
        &self,
        provider: &ProviderId,
        resources: &[Resource],
    ) -> Result<(), ApiError>;
}
