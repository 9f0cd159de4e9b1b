use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context as _;
use serde::Deserialize;

use crate::error::SyncError;
use crate::maintain::Maintenance;
use crate::reconcile::Mode;
use crate::remote::{DEFAULT_API_VERSION, RemoteConfig};

#[derive(Debug, Default, Deserialize)]
pub struct UserConfig {
    pub logging: Option<LoggingCfg>,
    pub remote: Option<RemoteCfg>,
    pub agents: Option<AgentsCfg>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LoggingCfg {
    pub to_file: Option<bool>,
    pub dir: Option<String>,
    pub json: Option<bool>,
    pub compact: Option<bool>,
    pub pretty: Option<bool>,
    pub level: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct RemoteCfg {
    pub endpoint: Option<String>,
    pub token: Option<String>,
    pub api_version: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AgentsCfg {
    pub mode: Option<String>,
    pub workspace_dir: Option<String>, // absolute paths preferred
    pub agents_dir: Option<String>,
    pub project: Option<String>,
    pub gpt5_only: Option<bool>,
    pub output_json: Option<bool>,
}

pub fn load_user_config(home: &Path) -> anyhow::Result<Option<UserConfig>> {
    let path = home.join("config.toml");
    if !path.exists() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(&path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let cfg: UserConfig =
        toml::from_str(&s).with_context(|| format!("invalid config {}", path.display()))?;
    Ok(Some(cfg))
}

pub fn expand_home(path: &str) -> PathBuf {
    if let Some(stripped) = path.strip_prefix("~/")
        && let Ok(home) = std::env::var("HOME")
    {
        return PathBuf::from(home).join(stripped);
    }
    PathBuf::from(path)
}

/// `explicit` if set, else `$HOME/.agent-sync`, else `./.agent-sync`.
pub fn agent_sync_home(explicit: &str) -> PathBuf {
    if !explicit.is_empty() {
        expand_home(explicit)
    } else if let Ok(home) = std::env::var("HOME") {
        PathBuf::from(home).join(".agent-sync")
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(".agent-sync")
    }
}

/// Remote settings as read from the environment. Blank values count as unset.
#[derive(Debug, Default, Clone)]
pub struct RemoteEnv {
    pub endpoint: Option<String>,
    /// Older spelling of the endpoint variable, still honoured.
    pub legacy_endpoint: Option<String>,
    pub token: Option<String>,
    pub api_version: Option<String>,
}

impl RemoteEnv {
    pub fn from_env() -> Self {
        let var = |k: &str| std::env::var(k).ok();
        Self {
            endpoint: var("AZURE_AI_PROJECT_ENDPOINT"),
            legacy_endpoint: var("AZURE_AIPROJECT_ENDPOINT"),
            token: var("AZURE_AI_PROJECT_TOKEN"),
            api_version: var("AZURE_AI_API_VERSION"),
        }
    }
}

/// Merge env and file settings into a `RemoteConfig`. Env wins; a missing
/// endpoint is fatal.
pub fn resolve_remote(env: RemoteEnv, file: Option<&RemoteCfg>) -> anyhow::Result<RemoteConfig> {
    fn set(v: Option<String>) -> Option<String> {
        v.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
    }
    let file = file.map(|c| (c.endpoint.clone(), c.token.clone(), c.api_version.clone()));
    let (file_endpoint, file_token, file_api_version) = file.unwrap_or_default();

    let endpoint = set(env.endpoint)
        .or_else(|| set(env.legacy_endpoint))
        .or_else(|| set(file_endpoint))
        .context(
            "project endpoint not configured; set AZURE_AI_PROJECT_ENDPOINT or [remote].endpoint",
        )?;
    let token = set(env.token).or_else(|| set(file_token));
    let api_version = set(env.api_version)
        .or_else(|| set(file_api_version))
        .unwrap_or_else(|| DEFAULT_API_VERSION.to_string());

    Ok(RemoteConfig {
        endpoint,
        token,
        api_version,
    })
}

/// What a run does: reconcile local definitions, or rewrite remote ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Reconcile(Mode),
    Maintain(Maintenance),
}

impl FromStr for Operation {
    type Err = SyncError;

    /// Accepts the mode names and the numeric menu keys `1`..`5`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let op = match s.trim().to_ascii_lowercase().as_str() {
            "1" | "create" => Operation::Reconcile(Mode::CreateMissing),
            "2" | "update" => Operation::Reconcile(Mode::UpdateExisting),
            "3" | "sync" => Operation::Reconcile(Mode::Sync),
            "4" | "approve-mcp" => Operation::Maintain(Maintenance::ApproveMcp),
            "5" | "strip-sampling" => Operation::Maintain(Maintenance::StripSampling),
            _ => {
                return Err(SyncError::UnknownMode {
                    value: s.to_string(),
                });
            }
        };
        Ok(op)
    }
}
