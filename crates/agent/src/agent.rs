// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Two-phase job scheduler: claim-and-start, poll-and-report.
//!
//! Both phases fan out with bounded concurrency and complete every spawned
//! task before returning. One bad job never blocks the others, and an
//! unreachable control plane is retried on the next tick.

use crate::runner::Runner;
use futures_util::stream::{self, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use wharf_client::{ApiError, JobApi};
use wharf_core::{Job, JobId, JobStatus, JobUpdate};

/// Tuning for the job agent loop.
#[derive(Debug, Clone)]
pub struct JobAgentConfig {
    /// Agent name the control plane queues jobs against.
    pub agent_name: String,
    /// Tick period for both phases.
    pub interval: Duration,
    /// Fan-out bound for per-job tasks within one phase.
    pub fan_out: usize,
    /// Deadline for a single runner start/status call. Expiry is reported
    /// as still-in-progress, never as a terminal failure.
    pub call_timeout: Duration,
}

impl JobAgentConfig {
    pub fn new(agent_name: impl Into<String>) -> Self {
        Self {
            agent_name: agent_name.into(),
            interval: Duration::from_secs(10),
            fan_out: 8,
            call_timeout: Duration::from_secs(60),
        }
    }
}

/// Bridges the control plane's job queue to a [`Runner`].
pub struct JobAgent<A, R> {
    api: Arc<A>,
    runner: Arc<R>,
    config: JobAgentConfig,
}

impl<A: JobApi, R: Runner> JobAgent<A, R> {
    pub fn new(api: Arc<A>, runner: Arc<R>, config: JobAgentConfig) -> Self {
        Self { api, runner, config }
    }

    /// Tick until cancelled. A late cycle skips rather than stacks.
    pub async fn run(&self, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.config.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    tracing::info!(agent = %self.config.agent_name, "job agent stopped");
                    return;
                }
                _ = ticker.tick() => {}
            }
            self.run_cycle(&token).await;
        }
    }

    /// One scheduling cycle. The phases are independent and may overlap
    /// each other, but each completes all of its own tasks before the
    /// cycle returns.
    pub async fn run_cycle(&self, token: &CancellationToken) {
        tokio::join!(self.claim_and_start(token), self.poll_and_report(token));
    }

    /// Phase A: claim queued jobs and start each via the runner.
    async fn claim_and_start(&self, token: &CancellationToken) {
        if token.is_cancelled() {
            return;
        }
        let jobs = match self.api.claim_queued_jobs(&self.config.agent_name).await {
            Ok(jobs) => jobs,
            Err(ApiError::Cancelled) => return,
            Err(error) => {
                tracing::warn!(
                    agent = %self.config.agent_name,
                    %error,
                    "failed to claim queued jobs, retrying next cycle"
                );
                return;
            }
        };
        if jobs.is_empty() {
            return;
        }
        tracing::info!(agent = %self.config.agent_name, count = jobs.len(), "claimed queued jobs");
        stream::iter(jobs)
            .for_each_concurrent(self.config.fan_out, |job| async move {
                self.start_one(job).await;
            })
            .await;
    }

    async fn start_one(&self, job: Job) {
        let started = tokio::time::timeout(self.config.call_timeout, self.runner.start(&job)).await;
        let update = match started {
            Ok(Ok(Some(external_id))) => {
                tracing::info!(job = %job.id, external_id = %external_id, "job started");
                JobUpdate::external_id(external_id)
            }
            Ok(Ok(None)) => {
                tracing::info!(job = %job.id, "job started without an external id");
                return;
            }
            Ok(Err(error)) => {
                tracing::warn!(job = %job.id, %error, "runner failed to start job");
                JobUpdate::status(JobStatus::InProgress)
                    .with_message(format!("failed to start: {error}"))
            }
            Err(_) => {
                tracing::warn!(job = %job.id, "runner start call timed out");
                JobUpdate::status(JobStatus::InProgress).with_message(format!(
                    "failed to start: timed out after {:?}",
                    self.config.call_timeout
                ))
            }
        };
        self.report(job.id, update).await;
    }

    /// Phase B: poll running jobs and report status transitions.
    async fn poll_and_report(&self, token: &CancellationToken) {
        if token.is_cancelled() {
            return;
        }
        let jobs = match self.api.list_running_jobs(&self.config.agent_name).await {
            Ok(jobs) => jobs,
            Err(ApiError::Cancelled) => return,
            Err(error) => {
                tracing::warn!(
                    agent = %self.config.agent_name,
                    %error,
                    "failed to list running jobs, retrying next cycle"
                );
                return;
            }
        };
        stream::iter(jobs)
            .for_each_concurrent(self.config.fan_out, |job| async move {
                self.poll_one(job).await;
            })
            .await;
    }

    async fn poll_one(&self, job: Job) {
        if job.status.is_terminal() {
            tracing::debug!(job = %job.id, status = %job.status, "job already terminal, not polling");
            return;
        }
        let polled = tokio::time::timeout(self.config.call_timeout, self.runner.status(&job)).await;
        let update = match polled {
            Ok(Ok((status, message))) => {
                let update = JobUpdate::status(status);
                match message.filter(|m| !m.is_empty()) {
                    Some(message) => update.with_message(message),
                    None => update,
                }
            }
            Ok(Err(error)) => {
                // No phase claim: the next poll may still observe the truth.
                tracing::warn!(job = %job.id, %error, "runner status poll failed");
                JobUpdate::default().with_message(format!("failed to poll status: {error}"))
            }
            Err(_) => {
                tracing::warn!(job = %job.id, "runner status call timed out");
                JobUpdate::status(JobStatus::InProgress).with_message(format!(
                    "status poll timed out after {:?}",
                    self.config.call_timeout
                ))
            }
        };
        self.report(job.id, update).await;
    }

    async fn report(&self, id: JobId, update: JobUpdate) {
        if let Err(error) = self.api.update_job(id, &update).await {
            tracing::warn!(job = %id, %error, "failed to report job update");
        }
    }
}

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
