// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wharf sync` - inventory synchronization commands

use crate::config::{self, Config};
use crate::exit_error::ExitError;
use crate::signals;
use clap::{Args, Subcommand};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wharf_client::{ControlPlaneClient, ControlPlaneConfig};
use wharf_sync::{sync_once, InventorySource, KubernetesSource, SyncOptions};

#[derive(Args)]
pub struct SyncArgs {
    #[command(subcommand)]
    command: SyncCommand,
}

#[derive(Subcommand)]
enum SyncCommand {
    /// Sync Kubernetes cluster inventory (clusters, nodes, namespaces)
    Kubernetes {
        /// Kubeconfig context to sync (repeatable; discovered when omitted)
        #[arg(long = "context")]
        contexts: Vec<String>,

        /// Resource provider name (overrides the derived name)
        #[arg(long)]
        provider: Option<String>,

        /// Sync interval (e.g. "60s", "5m"); defaults to `sync.interval`
        #[arg(long)]
        interval: Option<String>,

        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,
    },
}

pub async fn run(args: SyncArgs, config: Config) -> Result<(), ExitError> {
    match args.command {
        SyncCommand::Kubernetes { contexts, provider, interval, once } => {
            let contexts = if contexts.is_empty() {
                config.kubernetes_contexts.clone()
            } else {
                contexts
            };
            let source: Arc<dyn InventorySource> = Arc::new(KubernetesSource::new(contexts));

            let mut opts = SyncOptions::new(config.workspace);
            opts.provider_name = provider.or_else(|| config.sync_provider.clone());

            let interval = match &interval {
                Some(value) => config::parse_duration(value)?,
                None => config.sync_interval,
            };

            let token = CancellationToken::new();
            signals::spawn_handler(token.clone());

            let client = Arc::new(ControlPlaneClient::new(
                ControlPlaneConfig::new(
                    config.url.clone(),
                    config.api_key.clone(),
                    config.workspace,
                ),
                token.child_token(),
            )?);

            if once {
                let report = sync_once(client, source.as_ref(), &opts).await?;
                tracing::info!(
                    shards_ok = report.shards_ok,
                    shards_failed = report.shards_failed,
                    upserted = report.upserted,
                    "sync cycle complete"
                );
                return Ok(());
            }

            tracing::info!(interval_secs = interval.as_secs(), "starting inventory sync");
            wharf_sync::run(client, source, opts, interval, token).await;
            Ok(())
        }
    }
}
