use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use stalegreen_core::RuleConfig;
use std::path::Path;

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub github: GithubConfig,
    #[serde(default)]
    pub rule: RuleConfig,
}

/// GitHub connection configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GithubConfig {
    /// Personal access token used for API calls
    pub token: String,
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded in the following order (later sources
    /// override earlier ones):
    /// 1. Default values for the rule knobs
    /// 2. config.toml file (if present)
    /// 3. Environment variables (prefixed with STALEGREEN_)
    ///
    /// Environment variables use double underscore for nesting:
    /// - STALEGREEN_GITHUB__TOKEN=ghp_...
    /// - STALEGREEN_RULE__STALE_AFTER_HOURS=96
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = RuleConfig::default();
        let builder = Config::builder()
            .set_default("rule.approval_label", defaults.approval_label)?
            .set_default("rule.bot_login", defaults.bot_login)?
            .set_default("rule.ci_trigger_login", defaults.ci_trigger_login)?
            .set_default("rule.required_contexts", defaults.required_contexts)?
            .set_default("rule.stale_after_hours", defaults.stale_after_hours)?
            .set_default("rule.grace_minutes", defaults.grace_minutes)?;

        // Try to load config.toml if it exists
        let builder = if Path::new("config.toml").exists() {
            builder.add_source(File::with_name("config"))
        } else {
            builder
        };

        // Override with environment variables
        let builder = builder.add_source(
            Environment::with_prefix("STALEGREEN")
                .separator("__")
                .try_parsing(true),
        );

        builder.build()?.try_deserialize()
    }
}
