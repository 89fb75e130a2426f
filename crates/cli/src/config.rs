// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Operator configuration: TOML file plus environment overrides.
//!
//! Precedence: environment > file. The file is found via `--config`,
//! `WHARF_CONFIG`, or `./wharf.toml`; a missing file is fine as long as
//! the environment supplies the required values.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use wharf_core::{AgentIdentity, WorkspaceId, WorkspaceIdError};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("missing control plane URL (set `url` in the config file or WHARF_URL)")]
    MissingUrl,

    #[error("missing API key (set `api-key` in the config file or WHARF_API_KEY)")]
    MissingApiKey,

    #[error("missing workspace (set `workspace` in the config file or WHARF_WORKSPACE)")]
    MissingWorkspace,

    #[error(transparent)]
    Workspace(#[from] WorkspaceIdError),

    #[error("missing agent name (set `agent.name` in the config file or WHARF_AGENT_NAME)")]
    MissingAgentName,

    #[error("invalid duration {value:?}: {reason}")]
    Duration { value: String, reason: String },
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct ConfigFile {
    url: Option<String>,
    api_key: Option<String>,
    workspace: Option<String>,
    insecure: Option<bool>,
    #[serde(default)]
    agent: AgentSection,
    #[serde(default)]
    sync: SyncSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct AgentSection {
    name: Option<String>,
    #[serde(default)]
    associated_resources: Vec<String>,
    #[serde(default)]
    metadata: BTreeMap<String, String>,
    /// Session quiescence window, e.g. "45s".
    heartbeat_window: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SyncSection {
    interval: Option<String>,
    provider: Option<String>,
    #[serde(default)]
    kubernetes_contexts: Vec<String>,
}

/// Fully-resolved operator configuration.
#[derive(Debug, Clone)]
pub struct Config {
    pub url: String,
    pub api_key: String,
    pub workspace: WorkspaceId,
    pub insecure: bool,
    pub agent_name: Option<String>,
    pub associated_resources: Vec<String>,
    pub metadata: BTreeMap<String, String>,
    pub heartbeat_window: Option<Duration>,
    pub sync_interval: Duration,
    pub sync_provider: Option<String>,
    pub kubernetes_contexts: Vec<String>,
}

impl Config {
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let file = match resolve_path(explicit) {
            Some(path) => read_file(&path)?,
            None => ConfigFile::default(),
        };

        let url = env_var("WHARF_URL")
            .or(file.url)
            .ok_or(ConfigError::MissingUrl)?;
        let api_key = env_var("WHARF_API_KEY")
            .or(file.api_key)
            .ok_or(ConfigError::MissingApiKey)?;
        let workspace = env_var("WHARF_WORKSPACE")
            .or(file.workspace)
            .ok_or(ConfigError::MissingWorkspace)?
            .parse::<WorkspaceId>()?;
        let insecure = match env_var("WHARF_INSECURE") {
            Some(value) => matches!(value.as_str(), "1" | "true" | "yes"),
            None => file.insecure.unwrap_or(false),
        };
        let sync_interval = match &file.sync.interval {
            Some(value) => parse_duration(value)?,
            None => Duration::from_secs(300),
        };
        let heartbeat_window = match &file.agent.heartbeat_window {
            Some(value) => Some(parse_duration(value)?),
            None => None,
        };

        Ok(Self {
            url,
            api_key,
            workspace,
            insecure,
            agent_name: env_var("WHARF_AGENT_NAME").or(file.agent.name),
            associated_resources: file.agent.associated_resources,
            metadata: file.agent.metadata,
            heartbeat_window,
            sync_interval,
            sync_provider: file.sync.provider,
            kubernetes_contexts: file.sync.kubernetes_contexts,
        })
    }

    /// The identity presented on the control connection. Fails when no
    /// agent name is configured.
    pub fn agent_identity(&self) -> Result<AgentIdentity, ConfigError> {
        let name = self.agent_name.clone().ok_or(ConfigError::MissingAgentName)?;
        let mut identity = AgentIdentity::new(name, self.workspace);
        identity.associated_resources = self.associated_resources.clone();
        identity.metadata = self.metadata.clone();
        Ok(identity)
    }
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|value| !value.is_empty())
}

/// --config > WHARF_CONFIG > ./wharf.toml > ~/.config/wharf/wharf.toml
fn resolve_path(explicit: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit {
        return Some(path.to_path_buf());
    }
    if let Some(path) = env_var("WHARF_CONFIG") {
        return Some(PathBuf::from(path));
    }
    let local = PathBuf::from("wharf.toml");
    if local.exists() {
        return Some(local);
    }
    dirs::config_dir().map(|dir| dir.join("wharf/wharf.toml")).filter(|path| path.exists())
}

fn read_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })
}

/// Parse a duration string like "30s", "5m", "1h".
pub fn parse_duration(s: &str) -> Result<Duration, ConfigError> {
    let s = s.trim();
    let invalid = |reason: &str| ConfigError::Duration {
        value: s.to_string(),
        reason: reason.to_string(),
    };
    if s.is_empty() {
        return Err(invalid("empty duration"));
    }

    let (num_str, suffix) = s
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| (&s[..i], &s[i..]))
        .unwrap_or((s, ""));
    let num: u64 = num_str.parse().map_err(|_| invalid("expected a number"))?;

    let multiplier = match suffix.trim() {
        "ms" => return Ok(Duration::from_millis(num)),
        "" | "s" | "sec" | "secs" => 1,
        "m" | "min" | "mins" => 60,
        "h" | "hr" | "hrs" => 3600,
        other => return Err(invalid(&format!("unknown suffix {other:?}"))),
    };
    Ok(Duration::from_secs(num * multiplier))
}

/// clap value parser for repeated `--metadata key=value` flags.
pub fn parse_key_val(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got {s:?}")),
    }
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod tests;
