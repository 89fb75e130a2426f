// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wharf agent` - run the job agent against the control plane

use crate::config::{self, Config};
use crate::exit_error::ExitError;
use crate::signals;
use clap::Args;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use wharf_agent::{JobAgent, JobAgentConfig, KubeRunner};
use wharf_client::{ControlPlaneClient, ControlPlaneConfig};
use wharf_session::{supervisor, SessionConfig};

#[derive(Args)]
pub struct AgentArgs {
    /// Agent name (overrides `agent.name` from the config file)
    #[arg(long)]
    name: Option<String>,

    /// Link the agent to an existing resource (repeatable)
    #[arg(long = "associated-resource")]
    associated_resources: Vec<String>,

    /// Attach metadata as key=value (repeatable)
    #[arg(long = "metadata", value_parser = config::parse_key_val)]
    metadata: Vec<(String, String)>,

    /// Kubernetes namespace the runner launches jobs in
    #[arg(long, default_value = "default")]
    namespace: String,

    /// Job loop tick period (e.g. "10s", "1m")
    #[arg(long)]
    interval: Option<String>,
}

pub async fn run(args: AgentArgs, mut config: Config) -> Result<(), ExitError> {
    if let Some(name) = args.name {
        config.agent_name = Some(name);
    }
    config.associated_resources.extend(args.associated_resources);
    config.metadata.extend(args.metadata);

    let identity = config.agent_identity()?;
    let interval = match &args.interval {
        Some(value) => Some(config::parse_duration(value)?),
        None => None,
    };

    let token = CancellationToken::new();
    signals::spawn_handler(token.clone());

    let client = ControlPlaneClient::new(
        ControlPlaneConfig::new(config.url.clone(), config.api_key.clone(), config.workspace),
        token.child_token(),
    )?;

    let runner = KubeRunner::new(&args.namespace).await?;

    let mut session_config =
        SessionConfig::new(config.url.clone(), config.api_key.clone(), identity.clone());
    session_config.insecure = config.insecure;
    if let Some(window) = config.heartbeat_window {
        session_config.heartbeat_window = window;
    }

    let mut agent_config = JobAgentConfig::new(identity.name.clone());
    if let Some(interval) = interval {
        agent_config.interval = interval;
    }
    let agent = JobAgent::new(Arc::new(client), Arc::new(runner), agent_config);

    tracing::info!(agent = %identity.name, url = %config.url, "starting agent");
    let session = tokio::spawn(supervisor::run(session_config, None, token.clone()));
    agent.run(token.clone()).await;
    let _ = session.await;
    Ok(())
}
