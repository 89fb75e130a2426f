// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Job records and the status lifecycle.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a job assigned to this agent.
///
/// Minted by the control plane; the agent never persists jobs and holds
/// them only by id for the duration of a cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(Uuid);

impl JobId {
    pub fn new(id: Uuid) -> Self {
        Self(id)
    }

    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Closed status vocabulary shared with the control plane.
///
/// Transitions are monotonic toward a terminal state; once a terminal
/// status has been reported the agent stops polling the job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum JobStatus {
    Pending,
    InProgress,
    Successful,
    Failure,
    Cancelled,
    Skipped,
    ActionRequired,
    ExternalRunNotFound,
}

impl JobStatus {
    /// Terminal statuses end polling for the job.
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Successful | JobStatus::Failure | JobStatus::Cancelled | JobStatus::Skipped
        )
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in-progress",
            JobStatus::Successful => "successful",
            JobStatus::Failure => "failure",
            JobStatus::Cancelled => "cancelled",
            JobStatus::Skipped => "skipped",
            JobStatus::ActionRequired => "action-required",
            JobStatus::ExternalRunNotFound => "external-run-not-found",
        })
    }
}

/// A unit of work assigned to this agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: JobId,
    pub status: JobStatus,
    /// Opaque runner-assigned handle; empty until the runner reports one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    /// What to run. Shape is owned by the runner backend.
    #[serde(default)]
    pub payload: serde_json::Value,
}

/// Partial update reported back to the control plane.
///
/// Carrying `external_id` alone does not imply a status change; status
/// transitions are always explicit.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct JobUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub external_id: Option<String>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self { status: Some(status), ..Self::default() }
    }

    pub fn external_id(external_id: impl Into<String>) -> Self {
        Self { external_id: Some(external_id.into()), ..Self::default() }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn is_empty(&self) -> bool {
        self.status.is_none() && self.message.is_none() && self.external_id.is_none()
    }
}

#[cfg(test)]
#[path = "job_tests.rs"]
mod tests;
