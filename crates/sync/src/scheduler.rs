// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fixed-interval scheduling of inventory cycles.

use crate::fanout::{sync_once, SyncOptions};
use crate::source::InventorySource;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use wharf_client::ResourceApi;

/// Sync on a fixed interval until cancelled. Cycles never overlap: a late
/// cycle skips its tick rather than stacking behind it.
pub async fn run<A: ResourceApi>(
    api: Arc<A>,
    source: Arc<dyn InventorySource>,
    opts: SyncOptions,
    interval: Duration,
    token: CancellationToken,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = token.cancelled() => {
                tracing::info!(source = source.name(), "inventory sync stopped");
                return;
            }
            _ = ticker.tick() => {}
        }
        if let Err(error) = sync_once(api.clone(), source.as_ref(), &opts).await {
            tracing::warn!(
                source = source.name(),
                %error,
                "inventory cycle failed, retrying next interval"
            );
        }
    }
}

#[cfg(test)]
#[path = "scheduler_tests.rs"]
mod tests;
