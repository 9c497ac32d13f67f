use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::engine::Credential;

/// Main configuration structure for flowctl
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct FlowctlConfig {
    /// Engine connection settings
    pub engine: EngineConfig,
    /// Retry policy for idempotent reads
    pub retry: RetryConfig,
    /// Observability settings
    pub observability: ObservabilityConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct EngineConfig {
    /// API root of the workflow engine
    pub base_url: String,
    /// Bearer token (can be set via FLOWCTL_TOKEN)
    pub token: Option<String>,
    /// User the token belongs to, used to predict claim/complete outcomes
    pub user: Option<String>,
    /// Per-request timeout
    pub timeout_seconds: u64,
    /// Client-side request pacing
    pub rate_limit: RateLimitConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RateLimitConfig {
    /// Sustained requests per second
    pub requests_per_second: u32,
    /// Burst capacity
    pub burst: u32,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Attempts including the first one
    pub max_attempts: u32,
    pub base_delay_ms: u64,
    pub max_delay_ms: u64,
    pub jitter: bool,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ObservabilityConfig {
    /// Log level, or any EnvFilter directive
    pub log_level: String,
    /// Emit JSON lines instead of human readable logs
    pub json_logs: bool,
}

impl Default for FlowctlConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig {
                base_url: "http://localhost:8080/api/v1".to_string(),
                token: None, // Read from FLOWCTL_TOKEN or .flowctl-rc
                user: None,
                timeout_seconds: 30,
                rate_limit: RateLimitConfig {
                    requests_per_second: 20,
                    burst: 40,
                },
            },
            retry: RetryConfig {
                max_attempts: 3,
                base_delay_ms: 250,
                max_delay_ms: 5_000,
                jitter: true,
            },
            observability: ObservabilityConfig {
                log_level: "info".to_string(),
                json_logs: false,
            },
        }
    }
}

impl FlowctlConfig {
    /// Load configuration from multiple sources with precedence:
    /// 1. Default values
    /// 2. Configuration files (flowctl.toml, .flowctl-rc) in the working directory
    /// 3. Environment variables (FLOWCTL_ENGINE__BASE_URL, ...)
    pub fn load() -> Result<Self> {
        Self::load_from(Path::new("."), environment())
    }

    /// Same as [`FlowctlConfig::load`], reading files from `dir` and
    /// variables from `env`.
    pub fn load_from(dir: &Path, env: Environment) -> Result<Self> {
        let defaults = Config::try_from(&FlowctlConfig::default())
            .context("Failed to seed default configuration")?;
        let mut builder = Config::builder().add_source(defaults);

        let toml_file = dir.join("flowctl.toml");
        if toml_file.exists() {
            builder = builder.add_source(File::from(toml_file));
        }

        let rc_file = dir.join(".flowctl-rc");
        if rc_file.exists() {
            builder = builder.add_source(File::from(rc_file).format(config::FileFormat::Toml));
        }

        let config = builder
            .add_source(env)
            .build()
            .context("Failed to read configuration sources")?;

        let mut flowctl_config: FlowctlConfig = config
            .try_deserialize()
            .context("Invalid configuration")?;

        // Short form for the token, as exported by most login helpers
        if flowctl_config.engine.token.is_none() {
            if let Ok(token) = std::env::var("FLOWCTL_TOKEN") {
                if !token.trim().is_empty() {
                    flowctl_config.engine.token = Some(token);
                }
            }
        }

        Ok(flowctl_config)
    }

    /// Credential built from the configured token and user.
    pub fn credential(&self) -> Credential {
        let credential = match &self.engine.token {
            Some(token) => Credential::bearer(token.clone()),
            None => Credential::anonymous(),
        };
        match &self.engine.user {
            Some(user) => credential.with_user(user.clone()),
            None => credential,
        }
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

/// `FLOWCTL_` variables, with `__` between nested keys.
pub fn environment() -> Environment {
    Environment::with_prefix("FLOWCTL")
        .prefix_separator("_")
        .separator("__")
        .try_parsing(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults_without_sources() {
        let dir = TempDir::new().unwrap();
        let config = FlowctlConfig::load_from(dir.path(), env(&[])).unwrap();
        assert_eq!(config.engine.base_url, "http://localhost:8080/api/v1");
        assert_eq!(config.retry.max_attempts, 3);
        assert!(!config.observability.json_logs);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let dir = TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("flowctl.toml"),
            "[engine]\nbase_url = \"https://engine.example.com/api/v1\"\nuser = \"alice\"\n\n[engine.rate_limit]\nburst = 5\n",
        )
        .unwrap();

        let config = FlowctlConfig::load_from(dir.path(), env(&[])).unwrap();
        assert_eq!(config.engine.base_url, "https://engine.example.com/api/v1");
        assert_eq!(config.engine.user.as_deref(), Some("alice"));
        assert_eq!(config.engine.rate_limit.burst, 5);
        assert_eq!(config.engine.rate_limit.requests_per_second, 20);
    }

    #[test]
    fn test_rc_file_overrides_toml() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("flowctl.toml"), "[engine]\ntimeout_seconds = 10\n").unwrap();
        std::fs::write(dir.path().join(".flowctl-rc"), "[engine]\ntimeout_seconds = 45\n").unwrap();

        let config = FlowctlConfig::load_from(dir.path(), env(&[])).unwrap();
        assert_eq!(config.engine.timeout_seconds, 45);
    }

    #[test]
    fn test_environment_overrides_files() {
        let dir = TempDir::new().unwrap();
        std::fs::write(dir.path().join("flowctl.toml"), "[retry]\nmax_attempts = 5\n").unwrap();

        let config = FlowctlConfig::load_from(
            dir.path(),
            env(&[
                ("FLOWCTL_RETRY__MAX_ATTEMPTS", "1"),
                ("FLOWCTL_ENGINE__TOKEN", "secret"),
                ("FLOWCTL_OBSERVABILITY__JSON_LOGS", "true"),
            ]),
        )
        .unwrap();
        assert_eq!(config.retry.max_attempts, 1);
        assert_eq!(config.engine.token.as_deref(), Some("secret"));
        assert!(config.observability.json_logs);
    }

    #[test]
    fn test_save_and_reload() {
        let dir = TempDir::new().unwrap();
        let mut config = FlowctlConfig::default();
        config.engine.base_url = "http://engine.internal:9000/api/v1".to_string();
        config.save_to_file(dir.path().join("flowctl.toml")).unwrap();

        let reloaded = FlowctlConfig::load_from(dir.path(), env(&[])).unwrap();
        assert_eq!(reloaded.engine.base_url, config.engine.base_url);
    }

    #[test]
    fn test_credential_from_config() {
        let mut config = FlowctlConfig::default();
        config.engine.token = Some("abc".to_string());
        config.engine.user = Some("alice".to_string());

        let credential = config.credential();
        assert!(!credential.is_anonymous());
        assert_eq!(credential.user_id(), Some("alice"));
    }
}
