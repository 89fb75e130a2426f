// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Kubernetes inventory source.
//!
//! Shards are kubeconfig contexts. Each cycle publishes one cluster
//! record per context plus its nodes and namespaces, with searchable
//! metadata under the `kubernetes/`, `compute/`, and `network/` prefixes.

use crate::source::{InventorySource, SourceError};
use async_trait::async_trait;
use k8s_openapi::api::core::v1::{Namespace, Node};
use kube::api::{Api, ListParams};
use kube::config::{KubeConfigOptions, Kubeconfig};
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use std::fmt::Debug;
use wharf_core::{resource::meta, Backoff, DependencyType, RelationshipRule, Resource, RetryBudget};

pub const CLUSTER_KIND: &str = "kubernetes/cluster";
pub const NODE_KIND: &str = "kubernetes/node";
pub const NAMESPACE_KIND: &str = "kubernetes/namespace";
pub const SCHEMA_VERSION: &str = "v1";

/// Shard name used when no kubeconfig is available (in-cluster agents).
const IN_CLUSTER: &str = "in-cluster";

const PAGE_SIZE: u32 = 200;

pub struct KubernetesSource {
    /// Operator-selected contexts; discovered from the kubeconfig when
    /// empty.
    contexts: Vec<String>,
}

impl KubernetesSource {
    pub fn new(contexts: Vec<String>) -> Self {
        Self { contexts }
    }

    async fn client_for(&self, shard: &str) -> Result<kube::Client, SourceError> {
        if shard == IN_CLUSTER {
            return kube::Client::try_default()
                .await
                .map_err(|e| SourceError::Backend(e.to_string()));
        }
        let options = KubeConfigOptions { context: Some(shard.to_string()), ..Default::default() };
        let config = kube::Config::from_kubeconfig(&options)
            .await
            .map_err(|e| SourceError::Backend(e.to_string()))?;
        kube::Client::try_from(config).map_err(|e| SourceError::Backend(e.to_string()))
    }
}

#[async_trait]
impl InventorySource for KubernetesSource {
    fn name(&self) -> &str {
        "kubernetes"
    }

    async fn shards(&self) -> Result<Vec<String>, SourceError> {
        if !self.contexts.is_empty() {
            return Ok(self.contexts.clone());
        }
        match Kubeconfig::read() {
            Ok(config) if !config.contexts.is_empty() => {
                Ok(config.contexts.iter().map(|c| c.name.clone()).collect())
            }
            Ok(_) => Ok(vec![IN_CLUSTER.to_string()]),
            Err(error) => {
                tracing::debug!(%error, "no kubeconfig, assuming in-cluster");
                Ok(vec![IN_CLUSTER.to_string()])
            }
        }
    }

    async fn collect(&self, shard: &str) -> Result<Vec<Resource>, SourceError> {
        let client = self.client_for(shard).await?;
        let collected_at = chrono::Utc::now().to_rfc3339();

        let server_version = match client.apiserver_version().await {
            Ok(info) => Some(info.git_version),
            Err(error) => {
                tracing::debug!(shard, %error, "could not read apiserver version");
                None
            }
        };
        let mut resources = vec![cluster_resource(shard, server_version.as_deref(), &collected_at)];

        let nodes: Vec<Node> = list_all(&Api::all(client.clone())).await?;
        for node in &nodes {
            match normalize_node(shard, node, &collected_at) {
                Some(resource) => resources.push(resource),
                None => tracing::warn!(shard, "skipping node without a name"),
            }
        }

        let namespaces: Vec<Namespace> = list_all(&Api::all(client)).await?;
        for namespace in &namespaces {
            match normalize_namespace(shard, namespace, &collected_at) {
                Some(resource) => resources.push(resource),
                None => tracing::warn!(shard, "skipping namespace without a name"),
            }
        }

        Ok(resources)
    }

    fn relationship_rules(&self) -> Vec<RelationshipRule> {
        let edge = |reference: &str, name: &str, source_kind: &str| RelationshipRule {
            reference: reference.to_string(),
            name: name.to_string(),
            dependency_type: DependencyType::ProvisionedIn,
            source_kind: source_kind.to_string(),
            source_version: SCHEMA_VERSION.to_string(),
            target_kind: CLUSTER_KIND.to_string(),
            target_version: SCHEMA_VERSION.to_string(),
            metadata_keys: vec![context_key()],
        };
        vec![
            edge("node-in-cluster", "node provisioned in cluster", NODE_KIND),
            edge("namespace-in-cluster", "namespace provisioned in cluster", NAMESPACE_KIND),
        ]
    }
}

fn context_key() -> String {
    format!("{}context", meta::KUBERNETES)
}

/// Paginate a cluster-scoped list to completion, retrying transient
/// failures per page.
async fn list_all<K>(api: &Api<K>) -> Result<Vec<K>, SourceError>
where
    K: Clone + DeserializeOwned + Debug,
{
    let mut items = Vec::new();
    let mut params = ListParams::default().limit(PAGE_SIZE);
    loop {
        let page = {
            let mut backoff = Backoff::standard();
            let mut attempt = 1u32;
            loop {
                match api.list(&params).await {
                    Ok(page) => break page,
                    Err(error) if is_transient(&error) && attempt < RetryBudget::HTTP.attempts() => {
                        let delay = backoff.next_delay();
                        tracing::warn!(
                            attempt,
                            delay_ms = delay.as_millis() as u64,
                            %error,
                            "transient list failure, retrying page"
                        );
                        tokio::time::sleep(delay).await;
                        attempt += 1;
                    }
                    Err(error) => return Err(SourceError::Backend(error.to_string())),
                }
            }
        };
        let continue_token = page.metadata.continue_.clone().unwrap_or_default();
        items.extend(page.items);
        if continue_token.is_empty() {
            return Ok(items);
        }
        params = ListParams::default().limit(PAGE_SIZE).continue_token(&continue_token);
    }
}

fn is_transient(error: &kube::Error) -> bool {
    match error {
        kube::Error::Api(response) => response.code == 429 || response.code >= 500,
        kube::Error::Service(_) | kube::Error::HyperError(_) => true,
        _ => false,
    }
}

/// One record per cluster context; nodes and namespaces hang off it via
/// the relationship rules.
fn cluster_resource(shard: &str, server_version: Option<&str>, collected_at: &str) -> Resource {
    let mut metadata = base_metadata(shard, collected_at);
    if let Some(version) = server_version {
        metadata.insert(format!("{}server-version", meta::KUBERNETES), version.to_string());
    }
    Resource {
        identifier: format!("k8s://{shard}"),
        name: shard.to_string(),
        kind: CLUSTER_KIND.to_string(),
        version: SCHEMA_VERSION.to_string(),
        config: serde_json::json!({ "kubernetes": { "context": shard } }),
        metadata,
    }
}

fn normalize_node(shard: &str, node: &Node, collected_at: &str) -> Option<Resource> {
    let name = node.metadata.name.clone()?;
    let mut metadata = base_metadata(shard, collected_at);
    metadata.insert(format!("{}name", meta::KUBERNETES), name.clone());

    if let Some(status) = &node.status {
        if let Some(info) = &status.node_info {
            metadata.insert(format!("{}arch", meta::COMPUTE), info.architecture.clone());
            metadata.insert(format!("{}os", meta::COMPUTE), info.operating_system.clone());
            metadata
                .insert(format!("{}kubelet-version", meta::COMPUTE), info.kubelet_version.clone());
        }
        for address in status.addresses.iter().flatten() {
            if address.type_ == "InternalIP" {
                metadata.insert(format!("{}internal-ip", meta::NETWORK), address.address.clone());
            }
        }
    }

    let provider_id = node.spec.as_ref().and_then(|s| s.provider_id.clone());
    Some(Resource {
        identifier: format!("k8s://{shard}/node/{name}"),
        name,
        kind: NODE_KIND.to_string(),
        version: SCHEMA_VERSION.to_string(),
        config: serde_json::json!({
            "kubernetes": { "context": shard, "providerId": provider_id }
        }),
        metadata,
    })
}

fn normalize_namespace(shard: &str, namespace: &Namespace, collected_at: &str) -> Option<Resource> {
    let name = namespace.metadata.name.clone()?;
    let mut metadata = base_metadata(shard, collected_at);
    metadata.insert(format!("{}name", meta::KUBERNETES), name.clone());
    Some(Resource {
        identifier: format!("k8s://{shard}/namespace/{name}"),
        name,
        kind: NAMESPACE_KIND.to_string(),
        version: SCHEMA_VERSION.to_string(),
        config: serde_json::json!({ "kubernetes": { "context": shard } }),
        metadata,
    })
}

fn base_metadata(shard: &str, collected_at: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (context_key(), shard.to_string()),
        (format!("{}collected-at", meta::KUBERNETES), collected_at.to_string()),
    ])
}

#[cfg(test)]
#[path = "kubernetes_tests.rs"]
mod tests;
