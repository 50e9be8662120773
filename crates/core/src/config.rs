use crate::error::BackupError;
use crate::ports::Result;
use serde::Deserialize;
use std::fs;
use std::path::Path;

pub const DEFAULT_SLACK_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Immutable settings for one backup run, read from `settings.json`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BackupConfig {
    pub slack_token: String,
    pub growi_token: String,
    /// Look-back window in days, 0 for the whole history
    pub backup_period: u32,
    /// Page size for history requests
    pub limit: u32,
    #[serde(rename = "channel")]
    pub channels: Vec<String>,
    pub growi_article_path: String,
    pub growi_uri: String,
    #[serde(default = "default_slack_api_base")]
    pub slack_api_base: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

fn default_slack_api_base() -> String {
    DEFAULT_SLACK_API_BASE.to_string()
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

impl BackupConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: BackupConfig =
            serde_json::from_str(json).map_err(|e| BackupError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = fs::read_to_string(path)
            .map_err(|e| BackupError::Config(format!("cannot read {}: {}", path.display(), e)))?;
        Self::from_json_str(&json)
    }

    pub fn validate(&self) -> Result<()> {
        if self.slack_token.trim().is_empty() {
            return Err(BackupError::Config("slack_token must not be empty".to_string()));
        }
        if self.growi_token.trim().is_empty() {
            return Err(BackupError::Config("growi_token must not be empty".to_string()));
        }
        if self.limit == 0 {
            return Err(BackupError::Config("limit must be at least 1".to_string()));
        }
        if self.channels.is_empty() {
            return Err(BackupError::Config("channel must list at least one channel".to_string()));
        }
        if self.growi_uri.trim().is_empty() {
            return Err(BackupError::Config("growi_uri must not be empty".to_string()));
        }
        if self.request_timeout_secs == 0 {
            return Err(BackupError::Config("request_timeout_secs must be at least 1".to_string()));
        }
        Ok(())
    }

    pub fn with_backup_period(self, backup_period: u32) -> Self {
        Self { backup_period, ..self }
    }
}
