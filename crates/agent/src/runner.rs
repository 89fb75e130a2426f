// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The runner capability: what actually executes a job.

use async_trait::async_trait;
use wharf_core::{Job, JobStatus};

#[derive(Debug, thiserror::Error)]
pub enum RunnerError {
    /// The runner backend rejected or lost the call.
    #[error("{0}")]
    Backend(String),

    /// The job payload does not describe something this runner can start.
    #[error("invalid job payload: {0}")]
    Payload(String),
}

/// Pluggable execution backend.
///
/// The agent never executes workloads itself; it delegates to a runner and
/// reports what the runner observes.
#[async_trait]
pub trait Runner: Send + Sync {
    /// Launch the job's workload. Returns the runner-assigned external id,
    /// or `None` when the backend cannot assign one yet.
    ///
    /// A failure here is not a terminal verdict: the agent reports the job
    /// as still in progress and lets the control plane decide.
    async fn start(&self, job: &Job) -> Result<Option<String>, RunnerError>;

    /// Observe the job's current phase. Makes no agent-side state changes
    /// and must be safe for repeated calls, including across overlapping
    /// cycles.
    async fn status(&self, job: &Job) -> Result<(JobStatus, Option<String>), RunnerError>;
}
