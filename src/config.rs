use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub web: WebConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub journal: JournalConfig,
    #[serde(default)]
    pub log: LogConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct WebConfig {
    #[serde(default = "default_web_address")]
    pub address: String,
    #[serde(default = "default_web_port")]
    pub port: u16,
    /// Allow cross-origin requests (mobile and dev clients)
    #[serde(default = "default_true")]
    pub cors: bool,
}

/// How a machine type missing from the threshold table is treated
/// when the factory score is averaged.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum UnknownMachinePolicy {
    /// Listed as 0.00 and averaged in as 0
    #[default]
    Zero,
    /// Left out of the score map and the factory average
    Exclude,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct ScoringConfig {
    #[serde(default)]
    pub unknown_machine: UnknownMachinePolicy,
}

#[derive(Debug, Deserialize, Clone)]
pub struct JournalConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Max journal entries before rotation
    #[serde(default = "default_journal_max")]
    pub max_entries: usize,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct LogConfig {
    /// Emit JSON lines instead of the human-readable format
    #[serde(default)]
    pub json: bool,
}

impl Default for WebConfig {
    fn default() -> Self {
        Self {
            address: default_web_address(),
            port: default_web_port(),
            cors: true,
        }
    }
}

impl Default for JournalConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: default_journal_max(),
        }
    }
}

// Default value functions
fn default_true() -> bool { true }
fn default_journal_max() -> usize { 10_000 }
fn default_web_address() -> String { "0.0.0.0".to_string() }
fn default_web_port() -> u16 { 3001 }

impl Config {
    pub fn load(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file '{}'", path))?;
        Self::parse(&content).with_context(|| format!("Failed to parse config '{}'", path))
    }

    pub fn parse(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
