// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fakes for the job loop (behind the `test-support` feature).

use crate::runner::{Runner, RunnerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::time::Duration;
use wharf_client::{ApiError, JobApi, StatusCode};
use wharf_core::{Job, JobId, JobStatus, JobUpdate};

/// Scripted runner recording every start/status call.
#[derive(Default)]
pub struct FakeRunner {
    start_results: Mutex<HashMap<JobId, Result<Option<String>, String>>>,
    status_results: Mutex<HashMap<JobId, (JobStatus, Option<String>)>>,
    status_failures: Mutex<HashMap<JobId, String>>,
    start_delay: Mutex<Option<Duration>>,
    started: Mutex<Vec<JobId>>,
    polled: Mutex<Vec<JobId>>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stub_start(&self, id: JobId, result: Result<Option<String>, String>) {
        self.start_results.lock().insert(id, result);
    }

    pub fn stub_status(&self, id: JobId, status: JobStatus, message: Option<String>) {
        self.status_results.lock().insert(id, (status, message));
    }

    pub fn fail_status(&self, id: JobId, message: impl Into<String>) {
        self.status_failures.lock().insert(id, message.into());
    }

    /// Every subsequent `start` sleeps this long before answering.
    pub fn delay_starts(&self, delay: Duration) {
        *self.start_delay.lock() = Some(delay);
    }

    pub fn started(&self) -> Vec<JobId> {
        self.started.lock().clone()
    }

    pub fn polled(&self) -> Vec<JobId> {
        self.polled.lock().clone()
    }
}

#[async_trait]
impl Runner for FakeRunner {
    async fn start(&self, job: &Job) -> Result<Option<String>, RunnerError> {
        self.started.lock().push(job.id);
        let delay = *self.start_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        match self.start_results.lock().get(&job.id) {
            Some(Ok(external_id)) => Ok(external_id.clone()),
            Some(Err(message)) => Err(RunnerError::Backend(message.clone())),
            None => Ok(None),
        }
    }

    async fn status(&self, job: &Job) -> Result<(JobStatus, Option<String>), RunnerError> {
        self.polled.lock().push(job.id);
        if let Some(message) = self.status_failures.lock().get(&job.id) {
            return Err(RunnerError::Backend(message.clone()));
        }
        match self.status_results.lock().get(&job.id) {
            Some((status, message)) => Ok((*status, message.clone())),
            None => Ok((JobStatus::InProgress, None)),
        }
    }
}

/// In-memory control plane for the job surface.
#[derive(Default)]
pub struct FakeJobApi {
    queued: Mutex<Vec<Job>>,
    running: Mutex<Vec<Job>>,
    updates: Mutex<Vec<(JobId, JobUpdate)>>,
    fail_claims: Mutex<bool>,
}

impl FakeJobApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_queued(&self, job: Job) {
        self.queued.lock().push(job);
    }

    pub fn push_running(&self, job: Job) {
        self.running.lock().push(job);
    }

    /// Replace the running list, as the control plane does once a job
    /// reaches a terminal status.
    pub fn set_running(&self, jobs: Vec<Job>) {
        *self.running.lock() = jobs;
    }

    /// Every subsequent claim fails with a 503.
    pub fn fail_claims(&self) {
        *self.fail_claims.lock() = true;
    }

    pub fn updates(&self) -> Vec<(JobId, JobUpdate)> {
        self.updates.lock().clone()
    }

    pub fn updates_for(&self, id: JobId) -> Vec<JobUpdate> {
        self.updates
            .lock()
            .iter()
            .filter(|(job, _)| *job == id)
            .map(|(_, update)| update.clone())
            .collect()
    }
}

#[async_trait]
impl JobApi for FakeJobApi {
    async fn claim_queued_jobs(&self, _agent: &str) -> Result<Vec<Job>, ApiError> {
        if *self.fail_claims.lock() {
            return Err(ApiError::Status {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "maintenance".to_string(),
            });
        }
        Ok(std::mem::take(&mut *self.queued.lock()))
    }

    async fn list_running_jobs(&self, _agent: &str) -> Result<Vec<Job>, ApiError> {
        Ok(self.running.lock().clone())
    }

    async fn update_job(&self, id: JobId, update: &JobUpdate) -> Result<(), ApiError> {
        self.updates.lock().push((id, update.clone()));
        Ok(())
    }
}
