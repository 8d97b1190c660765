use anyhow::Result;
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::fork::{ResetSettings, DEFAULT_BACKUP_NAMESPACE, MAX_BRANCH_COUNT};

const CONFIG_FILE: &str = "upstream-reset.toml";
const ENV_PREFIX: &str = "UPSTREAM_RESET";

/// Main configuration structure for upstream-reset
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct UpstreamResetConfig {
    /// GitHub configuration
    pub github: GitHubConfig,
    /// Reset behaviour
    pub reset: ResetConfig,
    /// Logging settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GitHubConfig {
    /// GitHub API token (can be set via env var)
    pub token: Option<String>,
    /// API base URL, for GitHub Enterprise
    pub api_base: Option<String>,
    /// Rate limiting settings
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst_capacity: u32,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ResetConfig {
    /// Upper bound on the union of fork and parent branches
    pub max_branches: usize,
    /// Ref namespace that receives the per-run backups
    pub backup_namespace: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    pub log_level: String,
    /// Emit JSON structured logs instead of human readable lines
    pub json_logs: bool,
}

impl Default for UpstreamResetConfig {
    fn default() -> Self {
        Self {
            github: GitHubConfig {
                token: None, // Will be read from env var or upstream-reset.toml
                api_base: None,
                rate_limit: RateLimitConfig {
                    requests_per_second: 1,
                    burst_capacity: 10,
                },
            },
            reset: ResetConfig {
                max_branches: MAX_BRANCH_COUNT,
                backup_namespace: DEFAULT_BACKUP_NAMESPACE.to_string(),
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl ResetConfig {
    pub fn settings(&self) -> ResetSettings {
        ResetSettings {
            max_branches: self.max_branches,
            backup_namespace: self.backup_namespace.trim_end_matches('/').to_string(),
        }
    }
}

impl UpstreamResetConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration file (upstream-reset.toml, or the given path)
    /// 3. Environment variables (UPSTREAM_RESET_ prefix, `__` between sections)
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        match path {
            Some(path) => {
                builder = builder.add_source(File::from(path));
            }
            None if Path::new(CONFIG_FILE).exists() => {
                builder = builder.add_source(File::from(Path::new(CONFIG_FILE)));
            }
            None => {}
        }

        // e.g. UPSTREAM_RESET_RESET__MAX_BRANCHES=10
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let mut loaded: UpstreamResetConfig = builder.build()?.try_deserialize()?;

        // Special handling for GitHub token - check the conventional variables too
        if loaded.github.token.is_none() {
            if let Ok(token) = std::env::var("UPSTREAM_RESET_GITHUB_TOKEN") {
                loaded.github.token = Some(token);
            } else if let Ok(token) = std::env::var("GITHUB_TOKEN") {
                loaded.github.token = Some(token);
            }
        }

        Ok(loaded)
    }

    /// Save configuration to file
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let toml_content = toml::to_string_pretty(self)?;
        std::fs::write(path, toml_content)?;
        Ok(())
    }

    /// Load .env file if it exists
    pub fn load_env_file() -> Result<()> {
        if Path::new(".env").exists() {
            dotenvy::dotenv()?;
            tracing::info!("Loaded environment variables from .env file");
        }
        Ok(())
    }
}
