// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! One inventory cycle: parallel shard collection, aggregation, and a
//! single batch upsert.

use crate::provider::ResourceProvider;
use crate::source::{InventorySource, SourceError};
use futures_util::stream::{self, StreamExt};
use parking_lot::Mutex;
use std::sync::Arc;
use wharf_client::{ApiError, ResourceApi};
use wharf_core::{short, WorkspaceId};

/// Per-cycle settings.
#[derive(Debug, Clone)]
pub struct SyncOptions {
    pub workspace: WorkspaceId,
    /// Operator-supplied provider name; derived deterministically from the
    /// source and shards when absent.
    pub provider_name: Option<String>,
}

impl SyncOptions {
    pub fn new(workspace: WorkspaceId) -> Self {
        Self { workspace, provider_name: None }
    }
}

/// What one cycle accomplished.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub shards_ok: usize,
    pub shards_failed: usize,
    pub upserted: usize,
}

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error("shard discovery failed: {0}")]
    Discovery(#[from] SourceError),

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// `<source>-<workspace prefix>-<shard-join>`, stable across cycles.
fn derived_provider_name(source: &str, workspace: &WorkspaceId, shards: &[String]) -> String {
    let workspace = workspace.to_string();
    format!("{source}-{}-{}", short(&workspace, 8), shards.join("-"))
}

/// Run one cycle: collect every shard in parallel, then publish the union
/// of the successful shards as one batch.
///
/// Per-shard failures never fail the cycle; successful shards still
/// publish. An empty aggregate skips the provider ensure and the upsert
/// entirely.
pub async fn sync_once<A: ResourceApi>(
    api: Arc<A>,
    source: &dyn InventorySource,
    opts: &SyncOptions,
) -> Result<SyncReport, SyncError> {
    let shards = source.shards().await?;
    if shards.is_empty() {
        tracing::info!(source = source.name(), "no shards to sync");
        return Ok(SyncReport::default());
    }

    let aggregate = Mutex::new(Vec::new());
    let failed = Mutex::new(0usize);
    stream::iter(shards.iter())
        .for_each_concurrent(None, |shard| {
            let aggregate = &aggregate;
            let failed = &failed;
            async move {
                match source.collect(shard).await {
                    Ok(resources) => {
                        tracing::debug!(
                            source = source.name(),
                            shard = %shard,
                            count = resources.len(),
                            "collected shard"
                        );
                        aggregate.lock().extend(resources);
                    }
                    Err(error) => {
                        tracing::warn!(
                            source = source.name(),
                            shard = %shard,
                            %error,
                            "shard collection failed, continuing with the rest"
                        );
                        *failed.lock() += 1;
                    }
                }
            }
        })
        .await;

    let resources = aggregate.into_inner();
    let shards_failed = failed.into_inner();
    let report = SyncReport {
        shards_ok: shards.len() - shards_failed,
        shards_failed,
        upserted: resources.len(),
    };

    if resources.is_empty() {
        tracing::info!(source = source.name(), "inventory cycle produced no resources, skipping upsert");
        return Ok(report);
    }

    let provider_name = opts
        .provider_name
        .clone()
        .unwrap_or_else(|| derived_provider_name(source.name(), &opts.workspace, &shards));
    let provider = ResourceProvider::ensure(api, opts.workspace, &provider_name).await?;
    // Rules go first so the control plane can materialize edges as soon as
    // the batch lands.
    provider.declare_rules(&source.relationship_rules()).await?;
    provider.upsert(&resources).await?;
    tracing::info!(
        source = source.name(),
        provider = %provider_name,
        upserted = resources.len(),
        shards_failed,
        "inventory batch upserted"
    );
    Ok(report)
}

#[cfg(test)]
#[path = "fanout_tests.rs"]
mod tests;
