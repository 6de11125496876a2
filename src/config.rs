//! Layered configuration for the gateway.
//!
//! Settings resolve in order: built-in defaults, then an optional
//! `formgate.toml`, then environment variables, then CLI flags (applied by
//! the caller). The GitHub token is deliberately env-only (`GITHUB_TOKEN`);
//! it never appears in the TOML file or in `config show` output.
//!
//! # Configuration File Format
//!
//! ```toml
//! [server]
//! port = 8080
//! host = "127.0.0.1"
//!
//! [github]
//! repo = "owner/repo"
//!
//! [limits]
//! min_interval_secs = 30
//! min_message_len = 3
//! max_message_len = 10000
//! max_tracked_clients = 10000
//! ```

use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

pub const DEFAULT_CONFIG_FILE: &str = "formgate.toml";

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSection {
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_host")]
    pub host: String,
}

impl Default for ServerSection {
    fn default() -> Self {
        Self {
            port: default_port(),
            host: default_host(),
        }
    }
}

/// Target repository for filed issues.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GithubSection {
    /// "owner/repo" slug of the repository that receives contact issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repo: Option<String>,
}

/// Submission validation and throttle limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LimitsSection {
    /// Minimum seconds between accepted submissions from one client.
    #[serde(default = "default_min_interval_secs")]
    pub min_interval_secs: u64,
    /// Shortest message accepted, in characters, after trimming.
    #[serde(default = "default_min_message_len")]
    pub min_message_len: usize,
    /// Longest message accepted, in characters, after trimming.
    #[serde(default = "default_max_message_len")]
    pub max_message_len: usize,
    /// Cap on the throttle table before old entries are evicted.
    #[serde(default = "default_max_tracked_clients")]
    pub max_tracked_clients: usize,
}

impl Default for LimitsSection {
    fn default() -> Self {
        Self {
            min_interval_secs: default_min_interval_secs(),
            min_message_len: default_min_message_len(),
            max_message_len: default_max_message_len(),
            max_tracked_clients: default_max_tracked_clients(),
        }
    }
}

fn default_port() -> u16 {
    8080
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_min_interval_secs() -> u64 {
    30
}

fn default_min_message_len() -> usize {
    3
}

fn default_max_message_len() -> usize {
    10_000
}

fn default_max_tracked_clients() -> usize {
    10_000
}

/// Fully resolved gateway configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerSection,
    #[serde(default)]
    pub github: GithubSection,
    #[serde(default)]
    pub limits: LimitsSection,
    /// Loaded from the environment only, never serialized.
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Config {
    /// Load configuration for a project directory, layering file and
    /// environment on top of the defaults.
    pub fn load(project_dir: &Path) -> Result<Self> {
        let path = project_dir.join(DEFAULT_CONFIG_FILE);
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Config::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Overlay environment variables onto the current values.
    fn apply_env(&mut self) {
        if let Ok(port) = std::env::var("FORMGATE_PORT") {
            if let Ok(port) = port.parse() {
                self.server.port = port;
            } else {
                tracing::warn!(value = %port, "Ignoring unparseable FORMGATE_PORT");
            }
        }
        if let Ok(host) = std::env::var("FORMGATE_HOST") {
            self.server.host = host;
        }
        if let Ok(repo) = std::env::var("GITHUB_REPO") {
            self.github.repo = Some(repo);
        }
        if let Ok(secs) = std::env::var("FORMGATE_MIN_INTERVAL_SECS") {
            if let Ok(secs) = secs.parse() {
                self.limits.min_interval_secs = secs;
            } else {
                tracing::warn!(value = %secs, "Ignoring unparseable FORMGATE_MIN_INTERVAL_SECS");
            }
        }
        self.github_token = std::env::var("GITHUB_TOKEN").ok().filter(|t| !t.is_empty());
    }

    /// Validate the configuration, returning human-readable warnings.
    ///
    /// Warnings are non-fatal: the server will start without a token so the
    /// health endpoint stays useful, but submissions will be rejected.
    pub fn validate(&self) -> Vec<String> {
        let mut warnings = Vec::new();

        match &self.github.repo {
            None => warnings.push(
                "No GitHub repository configured (set [github].repo or GITHUB_REPO)".to_string(),
            ),
            Some(repo) => {
                if crate::github::parse_owner_repo(repo).is_none() {
                    warnings.push(format!(
                        "GitHub repository '{repo}' is not an owner/repo slug"
                    ));
                }
            }
        }

        match &self.github_token {
            None => warnings
                .push("GITHUB_TOKEN is not set; submissions will be rejected".to_string()),
            Some(token) => {
                if !crate::github::is_valid_github_token(token) {
                    warnings.push(
                        "GITHUB_TOKEN does not look like a known GitHub token format".to_string(),
                    );
                }
            }
        }

        if self.limits.min_message_len == 0 {
            warnings.push("min_message_len of 0 accepts empty messages".to_string());
        }
        if self.limits.max_message_len < self.limits.min_message_len {
            warnings.push(format!(
                "max_message_len ({}) is below min_message_len ({})",
                self.limits.max_message_len, self.limits.min_message_len
            ));
        }
        if self.limits.min_interval_secs == 0 {
            warnings.push("min_interval_secs of 0 disables the throttle".to_string());
        }

        warnings
    }

    /// Serialize the non-secret settings back to TOML (for `config show`).
    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize configuration")
    }
}

/// Default config file content written by `formgate config init`.
pub fn default_config_toml() -> String {
    let defaults = Config::default();
    format!(
        r#"# formgate configuration
# The GitHub token is read from the GITHUB_TOKEN environment variable,
# never from this file.

[server]
port = {port}
host = "{host}"

[github]
# repo = "owner/repo"

[limits]
min_interval_secs = {interval}
min_message_len = {min_len}
max_message_len = {max_len}
max_tracked_clients = {max_clients}
"#,
        port = defaults.server.port,
        host = defaults.server.host,
        interval = defaults.limits.min_interval_secs,
        min_len = defaults.limits.min_message_len,
        max_len = defaults.limits.max_message_len,
        max_clients = defaults.limits.max_tracked_clients,
    )
}
