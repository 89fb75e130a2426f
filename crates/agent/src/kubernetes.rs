// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Reference runner backed by Kubernetes batch Jobs.
//!
//! The job payload carries its pod shape under the `kubernetes` key:
//!
//! ```json
//! { "kubernetes": { "image": "...", "command": ["..."], "env": { "K": "V" } } }
//! ```

use crate::runner::{Runner, RunnerError};
use async_trait::async_trait;
use k8s_openapi::api::batch::v1::{Job as BatchJob, JobSpec};
use k8s_openapi::api::core::v1::{Container, EnvVar, PodSpec, PodTemplateSpec};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;
use kube::api::{Api, PostParams};
use std::collections::BTreeMap;
use wharf_core::{Job, JobStatus};

const MANAGED_BY_LABEL: &str = "app.kubernetes.io/managed-by";
const MANAGED_BY: &str = "wharf";

/// Executes each job as a `batch/v1` Job in one namespace.
pub struct KubeRunner {
    jobs: Api<BatchJob>,
}

impl KubeRunner {
    /// Connect using the ambient kubeconfig or in-cluster environment.
    pub async fn new(namespace: &str) -> Result<Self, RunnerError> {
        let client = kube::Client::try_default()
            .await
            .map_err(|e| RunnerError::Backend(e.to_string()))?;
        Ok(Self::with_client(client, namespace))
    }

    pub fn with_client(client: kube::Client, namespace: &str) -> Self {
        Self { jobs: Api::namespaced(client, namespace) }
    }
}

/// Deterministic Job name so a retried start finds the earlier attempt.
fn job_name(job: &Job) -> String {
    format!("wharf-{}", job.id)
}

/// Build the Job manifest from the payload. Pure; no cluster access.
fn build_job(name: &str, job: &Job) -> Result<BatchJob, RunnerError> {
    let spec = job
        .payload
        .get("kubernetes")
        .ok_or_else(|| RunnerError::Payload("missing 'kubernetes' configuration".to_string()))?;
    let image = spec
        .get("image")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RunnerError::Payload("missing 'kubernetes.image'".to_string()))?;
    let command: Vec<String> = spec
        .get("command")
        .and_then(|v| v.as_array())
        .map(|args| args.iter().filter_map(|a| a.as_str().map(String::from)).collect())
        .unwrap_or_default();
    let env: Vec<EnvVar> = spec
        .get("env")
        .and_then(|v| v.as_object())
        .map(|vars| {
            vars.iter()
                .map(|(name, value)| EnvVar {
                    name: name.clone(),
                    value: Some(value.as_str().map(String::from).unwrap_or_else(|| value.to_string())),
                    ..Default::default()
                })
                .collect()
        })
        .unwrap_or_default();

    Ok(BatchJob {
        metadata: ObjectMeta {
            name: Some(name.to_string()),
            labels: Some(BTreeMap::from([(MANAGED_BY_LABEL.to_string(), MANAGED_BY.to_string())])),
            ..Default::default()
        },
        spec: Some(JobSpec {
            backoff_limit: Some(0),
            template: PodTemplateSpec {
                metadata: None,
                spec: Some(PodSpec {
                    restart_policy: Some("Never".to_string()),
                    containers: vec![Container {
                        name: "workload".to_string(),
                        image: Some(image.to_string()),
                        command: if command.is_empty() { None } else { Some(command) },
                        env: if env.is_empty() { None } else { Some(env) },
                        ..Default::default()
                    }],
                    ..Default::default()
                }),
            },
            ..Default::default()
        }),
        ..Default::default()
    })
}

/// Map observed Job state onto the agent's status vocabulary. Pure.
fn phase_from(batch_job: &BatchJob) -> (JobStatus, Option<String>) {
    let Some(status) = &batch_job.status else {
        return (JobStatus::Pending, None);
    };
    if let Some(conditions) = &status.conditions {
        for condition in conditions {
            if condition.status != "True" {
                continue;
            }
            match condition.type_.as_str() {
                "Complete" => return (JobStatus::Successful, None),
                "Failed" => return (JobStatus::Failure, condition.message.clone()),
                _ => {}
            }
        }
    }
    if status.active.unwrap_or(0) > 0 {
        return (JobStatus::InProgress, None);
    }
    (JobStatus::Pending, None)
}

#[async_trait]
impl Runner for KubeRunner {
    async fn start(&self, job: &Job) -> Result<Option<String>, RunnerError> {
        let name = job_name(job);
        let manifest = build_job(&name, job)?;
        match self.jobs.create(&PostParams::default(), &manifest).await {
            Ok(_) => Ok(Some(name)),
            // A previous attempt already created it; starting is idempotent.
            Err(kube::Error::Api(response)) if response.code == 409 => Ok(Some(name)),
            Err(error) => Err(RunnerError::Backend(error.to_string())),
        }
    }

    async fn status(&self, job: &Job) -> Result<(JobStatus, Option<String>), RunnerError> {
        let name = job.external_id.clone().unwrap_or_else(|| job_name(job));
        match self.jobs.get(&name).await {
            Ok(batch_job) => Ok(phase_from(&batch_job)),
            Err(kube::Error::Api(response)) if response.code == 404 => Ok((
                JobStatus::ExternalRunNotFound,
                Some(format!("kubernetes job {name} not found")),
            )),
            Err(error) => Err(RunnerError::Backend(error.to_string())),
        }
    }
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod tests;
