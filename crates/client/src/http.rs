// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Production control-plane client over HTTP.
//!
//! Endpoint paths are control-plane-owned; this client commits only to the
//! envelope shapes and verbs. Every mutation is idempotent by natural key
//! (job id, provider name, resource identifier), which is what makes the
//! retry policy safe.

use crate::api::{JobApi, ResourceApi};
use crate::error::ApiError;
use crate::retry::with_retries;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use wharf_core::{
    Job, JobId, JobUpdate, ProviderId, RelationshipRule, Resource, RetryBudget, WorkspaceId,
};
use wharf_wire::headers;

/// Connection settings for [`ControlPlaneClient`].
#[derive(Debug, Clone)]
pub struct ControlPlaneConfig {
    /// Base URL, e.g. `https://ctrl.example.com`. Shared with the agent
    /// transport, which derives its WebSocket URL from the same value.
    pub base_url: String,
    pub api_key: String,
    pub workspace: WorkspaceId,
    /// Per-call deadline. A deadline expiry never fails a job terminally.
    pub call_timeout: Duration,
    pub retry_budget: RetryBudget,
}

impl ControlPlaneConfig {
    pub fn new(base_url: impl Into<String>, api_key: impl Into<String>, workspace: WorkspaceId) -> Self {
        Self {
            base_url: base_url.into(),
            api_key: api_key.into(),
            workspace,
            call_timeout: Duration::from_secs(30),
            retry_budget: RetryBudget::HTTP,
        }
    }
}

/// Typed REST client; cheap to clone, safe for concurrent use.
#[derive(Clone)]
pub struct ControlPlaneClient {
    http: reqwest::Client,
    base: String,
    workspace: WorkspaceId,
    budget: RetryBudget,
    token: CancellationToken,
}

#[derive(Deserialize)]
struct JobsEnvelope {
    jobs: Vec<Job>,
}

#[derive(Deserialize)]
struct ProviderEnvelope {
    id: ProviderId,
}

impl ControlPlaneClient {
    /// Build the client. `token` is chained from the process-level signal;
    /// cancelling it interrupts in-flight calls and retry sleeps.
    pub fn new(config: ControlPlaneConfig, token: CancellationToken) -> Result<Self, ApiError> {
        let base = config.base_url.trim_end_matches('/').to_string();
        reqwest::Url::parse(&base)
            .map_err(|e| ApiError::Config(format!("unparseable base URL {base:?}: {e}")))?;

        let mut default_headers = HeaderMap::new();
        let mut api_key = HeaderValue::from_str(&config.api_key)
            .map_err(|_| ApiError::Config("API key is not a valid header value".to_string()))?;
        api_key.set_sensitive(true);
        default_headers.insert(headers::API_KEY, api_key);
        let workspace = HeaderValue::from_str(&config.workspace.to_string())
            .map_err(|_| ApiError::Config("workspace id is not a valid header value".to_string()))?;
        default_headers.insert(headers::WORKSPACE, workspace);

        let http = reqwest::Client::builder()
            .timeout(config.call_timeout)
            .default_headers(default_headers)
            .build()?;

        Ok(Self { http, base, workspace: config.workspace, budget: config.retry_budget, token })
    }

    pub fn workspace(&self) -> WorkspaceId {
        self.workspace
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/api/v1/{}", self.base, path)
    }

    /// One retried HTTP exchange; returns the raw success body.
    async fn call_raw(
        &self,
        op: &'static str,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<String, ApiError> {
        with_retries(op, self.budget, &self.token, || {
            let request = match &body {
                Some(json) => self.http.request(method.clone(), url.as_str()).json(json),
                None => self.http.request(method.clone(), url.as_str()),
            };
            async move {
                let response = request.send().await?;
                let status = response.status();
                let text = response.text().await?;
                if status.is_success() {
                    Ok(text)
                } else {
                    Err(ApiError::Status { status, body: text })
                }
            }
        })
        .await
    }

    async fn call_json<T: DeserializeOwned>(
        &self,
        op: &'static str,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<T, ApiError> {
        let text = self.call_raw(op, method, url, body).await?;
        serde_json::from_str(&text).map_err(ApiError::Decode)
    }

    async fn call_ok(
        &self,
        op: &'static str,
        method: Method,
        url: String,
        body: Option<serde_json::Value>,
    ) -> Result<(), ApiError> {
        self.call_raw(op, method, url, body).await.map(|_| ())
    }
}

#[async_trait]
impl JobApi for ControlPlaneClient {
    async fn claim_queued_jobs(&self, agent: &str) -> Result<Vec<Job>, ApiError> {
        let url = self.endpoint(&format!("agents/{agent}/jobs/queued/claim"));
        let envelope: JobsEnvelope = self.call_json("claim-queued-jobs", Method::POST, url, None).await?;
        Ok(envelope.jobs)
    }

    async fn list_running_jobs(&self, agent: &str) -> Result<Vec<Job>, ApiError> {
        let url = self.endpoint(&format!("agents/{agent}/jobs/running"));
        self.call_json("list-running-jobs", Method::GET, url, None).await
    }

    async fn update_job(&self, id: JobId, update: &JobUpdate) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("jobs/{id}"));
        let body = serde_json::to_value(update).map_err(ApiError::Decode)?;
        self.call_ok("update-job", Method::PATCH, url, Some(body)).await
    }
}

#[async_trait]
impl ResourceApi for ControlPlaneClient {
    async fn ensure_provider(
        &self,
        workspace: WorkspaceId,
        name: &str,
    ) -> Result<ProviderId, ApiError> {
        let url = self.endpoint(&format!("workspaces/{workspace}/resource-providers/{name}"));
        let envelope: ProviderEnvelope =
            self.call_json("ensure-provider", Method::PUT, url, None).await?;
        Ok(envelope.id)
    }

    async fn declare_relationship_rules(
        &self,
        provider: &ProviderId,
        rules: &[RelationshipRule],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("resource-providers/{provider}/relationship-rules"));
        let body = serde_json::json!({ "rules": rules });
        self.call_ok("declare-relationship-rules", Method::POST, url, Some(body)).await
    }

    async fn upsert_resources(
        &self,
        provider: &ProviderId,
        resources: &[Resource],
    ) -> Result<(), ApiError> {
        let url = self.endpoint(&format!("resource-providers/{provider}/resources"));
        let body = serde_json::json!({ "resources": resources });
        self.call_ok("upsert-resources", Method::PUT, url, Some(body)).await
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
