use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::dialogflow::Platform;

/// What to do with a message whose payload doesn't match its declared kind
#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Drop the message, keep converting the rest of the batch
    #[default]
    Skip,
    /// Reject the whole batch
    Fail,
}

impl std::fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedPolicy::Skip => write!(f, "skip"),
            MalformedPolicy::Fail => write!(f, "fail"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default, PartialEq)]
pub struct Config {
    #[serde(default)]
    pub converter: ConverterConfig,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct ConverterConfig {
    #[serde(default = "default_target_platform")]
    pub target_platform: Platform,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
}

impl Default for ConverterConfig {
    fn default() -> Self {
        Self {
            target_platform: default_target_platform(),
            on_malformed: MalformedPolicy::default(),
        }
    }
}

fn default_target_platform() -> Platform {
    Platform::Teams
}

impl Config {
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))
    }
}
