//! CLI configuration from `.env` and the process environment.
//!
//! `.env` entries are read without being exported, and the process
//! environment wins over them. Command-line flags win over both.

use anyhow::{bail, Context, Result};
use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::time::Duration;
use style_scraper::ScraperConfig;

pub const OUTPUT_DIR_VAR: &str = "STYLE_SCRAPER_OUTPUT_DIR";
pub const TIMEOUT_VAR: &str = "STYLE_SCRAPER_TIMEOUT_SECS";
pub const USER_AGENT_VAR: &str = "STYLE_SCRAPER_USER_AGENT";
pub const STRICT_GROUNDING_VAR: &str = "STYLE_SCRAPER_STRICT_GROUNDING";

/// Settings the environment may override.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliConfig {
    pub output_dir: Option<PathBuf>,
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
    pub strict_grounding: bool,
}

impl CliConfig {
    /// Load from `.env` (if present) layered under the process environment.
    pub fn from_env() -> Result<Self> {
        let mut vars = HashMap::new();

        if let Ok(entries) = dotenvy::dotenv_iter() {
            for entry in entries {
                let (key, value) = entry.context("Failed to parse .env file")?;
                vars.insert(key, value);
            }
        }

        vars.extend(env::vars_os().filter_map(|(key, value)| {
            Some((key.into_string().ok()?, value.into_string().ok()?))
        }));

        Self::from_vars(&vars)
    }

    pub fn from_vars(vars: &HashMap<String, String>) -> Result<Self> {
        let get = |key: &str| vars.get(key).map(|v| v.trim()).filter(|v| !v.is_empty());

        let timeout_secs = get(TIMEOUT_VAR)
            .map(|v| {
                v.parse::<u64>()
                    .with_context(|| format!("{TIMEOUT_VAR} must be a whole number of seconds"))
            })
            .transpose()?;

        let strict_grounding = match get(STRICT_GROUNDING_VAR) {
            None => false,
            Some(v) => parse_flag(v)
                .with_context(|| format!("{STRICT_GROUNDING_VAR} must be true or false"))?,
        };

        Ok(Self {
            output_dir: get(OUTPUT_DIR_VAR).map(PathBuf::from),
            timeout_secs,
            user_agent: get(USER_AGENT_VAR).map(str::to_string),
            strict_grounding,
        })
    }

    /// Library configuration with flag overrides applied.
    pub fn scraper_config(
        &self,
        timeout_secs: Option<u64>,
        output_dir: Option<PathBuf>,
    ) -> ScraperConfig {
        let mut config = ScraperConfig::new().with_strict_grounding(self.strict_grounding);

        if let Some(secs) = timeout_secs.or(self.timeout_secs) {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(dir) = output_dir.or_else(|| self.output_dir.clone()) {
            config = config.with_output_dir(dir);
        }
        if let Some(user_agent) = &self.user_agent {
            config = config.with_user_agent(user_agent.clone());
        }
        config
    }
}

fn parse_flag(value: &str) -> Result<bool> {
    match value.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("unrecognized flag value: {other}"),
    }
}
