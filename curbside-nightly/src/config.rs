use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use curbside_provider_twilio::Channel;
use serde::Deserialize;

/// Top-level nightly configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct NightlyConfig {
    /// Municipality slug the subscribers live in.
    #[serde(default = "default_municipality")]
    pub municipality: String,

    /// IANA timezone the reminder window is evaluated in.
    #[serde(default = "default_timezone")]
    pub timezone: String,

    /// JSON file holding the subscriber list.
    #[serde(default = "default_subscribers")]
    pub subscribers: PathBuf,

    /// Optional TOML street index merged over the built-in one.
    #[serde(default)]
    pub streets: Option<PathBuf>,

    /// Messaging channel.
    #[serde(default)]
    pub channel: Channel,

    /// Log messages instead of sending them.
    #[serde(default)]
    pub dry_run: bool,
}

impl Default for NightlyConfig {
    fn default() -> Self {
        Self {
            municipality: default_municipality(),
            timezone: default_timezone(),
            subscribers: default_subscribers(),
            streets: None,
            channel: Channel::default(),
            dry_run: false,
        }
    }
}

impl NightlyConfig {
    /// Read the configuration file; a missing file yields the defaults.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            tracing::info!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let toml_str = fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&toml_str)
    }

    pub(crate) fn parse(toml_str: &str) -> Result<Self> {
        toml::from_str(toml_str).context("failed to parse TOML config")
    }
}

fn default_municipality() -> String {
    "lower-merion".to_owned()
}
fn default_timezone() -> String {
    "US/Eastern".to_owned()
}
fn default_subscribers() -> PathBuf {
    PathBuf::from("subscribers.json")
}
