use backup_core::error::BackupError;
use backup_core::ports::{DocumentPublisher, Result};
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

#[derive(Debug, Deserialize)]
struct PagesCreateResponse {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Growi wiki implementation of the DocumentPublisher trait
pub struct GrowiPublisher {
    http: reqwest::blocking::Client,
    endpoint: String,
    access_token: String,
}

impl GrowiPublisher {
    pub fn new(growi_uri: &str, access_token: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent("slack-growi-backup")
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackupError::transport("growi client", e))?;
        Ok(Self {
            http,
            endpoint: format!("{}/_api/pages.create", growi_uri.trim_end_matches('/')),
            access_token: access_token.trim().to_string(),
        })
    }

    fn publish_error(path: &str, message: impl ToString) -> BackupError {
        BackupError::Publish {
            path: path.to_string(),
            message: message.to_string(),
        }
    }
}

impl DocumentPublisher for GrowiPublisher {
    fn publish_document(&self, path: &str, body: &str) -> Result<()> {
        debug!(path, bytes = body.len(), "creating wiki page");
        let response = self
            .http
            .post(&self.endpoint)
            .form(&[
                ("body", body),
                ("path", path),
                ("access_token", self.access_token.as_str()),
            ])
            .send()
            .map_err(|e| Self::publish_error(path, e))?;

        let status = response.status();
        let text = response.text().map_err(|e| Self::publish_error(path, e))?;
        let parsed: Option<PagesCreateResponse> = serde_json::from_str(&text).ok();

        if !status.is_success() {
            let detail = parsed
                .and_then(|r| r.error)
                .unwrap_or_else(|| text.chars().take(240).collect());
            return Err(Self::publish_error(
                path,
                format!("status {}: {}", status.as_u16(), detail),
            ));
        }
        match parsed {
            Some(PagesCreateResponse { ok: true, .. }) => Ok(()),
            Some(PagesCreateResponse { error, .. }) => Err(Self::publish_error(
                path,
                error.unwrap_or_else(|| "page was not created".to_string()),
            )),
            None => Err(Self::publish_error(path, "response is not JSON")),
        }
    }
}
