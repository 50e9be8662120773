use backup_core::domain::{HistoryPage, MemberSource, RawMessage};
use backup_core::error::BackupError;
use backup_core::ports::{ChatSource, Result};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashSet;
use std::time::Duration;
use tracing::debug;

// Upper bound on pages followed for users.list and conversations.replies
const MAX_AUX_PAGES: usize = 1_000;
const MEMBERS_PAGE_SIZE: &str = "200";

#[derive(Debug, Deserialize)]
struct SlackEnvelope {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct ResponseMetadata {
    #[serde(default)]
    next_cursor: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsersListResponse {
    #[serde(default)]
    members: Vec<MemberSource>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

#[derive(Debug, Deserialize)]
struct ChannelInfo {
    name: String,
}

#[derive(Debug, Deserialize)]
struct ConversationInfoResponse {
    channel: ChannelInfo,
}

#[derive(Debug, Deserialize)]
struct MessagesResponse {
    messages: Vec<RawMessage>,
    #[serde(default)]
    response_metadata: Option<ResponseMetadata>,
}

fn next_cursor(metadata: Option<ResponseMetadata>) -> Option<String> {
    metadata
        .and_then(|m| m.next_cursor)
        .filter(|cursor| !cursor.is_empty())
}

/// Slack Web API implementation of the ChatSource trait
pub struct SlackChatSource {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

impl SlackChatSource {
    pub fn new(api_base: &str, token: &str, request_timeout: Duration) -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent("slack-growi-backup")
            .timeout(request_timeout)
            .build()
            .map_err(|e| BackupError::transport("slack client", e))?;
        Ok(Self {
            http,
            api_base: api_base.trim_end_matches('/').to_string(),
            token: token.trim().to_string(),
        })
    }

    /// Calls a Web API method and decodes the body once Slack reports `ok`.
    fn api_get<T: DeserializeOwned>(&self, method: &str, params: &[(&str, String)]) -> Result<T> {
        let response = self
            .http
            .get(format!("{}/{}", self.api_base, method))
            .bearer_auth(&self.token)
            .query(params)
            .send()
            .map_err(|e| BackupError::transport(method, e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(BackupError::transport(
                method,
                format!(
                    "status {}: {}",
                    status.as_u16(),
                    body.chars().take(240).collect::<String>()
                ),
            ));
        }

        let payload: Value = response
            .json()
            .map_err(|e| BackupError::malformed(method, e))?;
        let envelope: SlackEnvelope =
            serde_json::from_value(payload.clone()).map_err(|e| BackupError::malformed(method, e))?;
        if !envelope.ok {
            return Err(BackupError::transport(
                method,
                envelope.error.unwrap_or_else(|| "unknown_error".to_string()),
            ));
        }
        serde_json::from_value(payload).map_err(|e| BackupError::malformed(method, e))
    }
}

impl ChatSource for SlackChatSource {
    // users.list is workspace-wide; the channel id is not part of the request
    fn get_members(&self, _channel_id: &str) -> Result<Vec<MemberSource>> {
        let mut members = Vec::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_AUX_PAGES {
            let mut params = vec![("limit", MEMBERS_PAGE_SIZE.to_string())];
            if let Some(c) = cursor.take() {
                params.push(("cursor", c));
            }
            let response: UsersListResponse = self.api_get("users.list", &params)?;
            members.extend(response.members);
            cursor = next_cursor(response.response_metadata);
            if cursor.is_none() {
                debug!(members = members.len(), "fetched member list");
                return Ok(members);
            }
        }
        Err(BackupError::malformed("users.list", "cursor chain did not terminate"))
    }

    fn get_channel_name(&self, channel_id: &str) -> Result<String> {
        let response: ConversationInfoResponse =
            self.api_get("conversations.info", &[("channel", channel_id.to_string())])?;
        Ok(response.channel.name)
    }

    fn get_history_page(
        &self,
        channel_id: &str,
        oldest: i64,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage> {
        let mut params = vec![
            ("channel", channel_id.to_string()),
            ("oldest", oldest.to_string()),
            ("limit", limit.to_string()),
        ];
        if let Some(c) = cursor {
            params.push(("cursor", c.to_string()));
        }
        let response: MessagesResponse = self.api_get("conversations.history", &params)?;
        Ok(HistoryPage {
            messages: response.messages,
            next_cursor: next_cursor(response.response_metadata),
        })
    }

    // Every replies page repeats the parent, so messages are kept once per ts
    fn get_thread_replies(&self, channel_id: &str, parent_ts: &str) -> Result<Vec<RawMessage>> {
        let mut messages = Vec::new();
        let mut seen = HashSet::new();
        let mut cursor: Option<String> = None;
        for _ in 0..MAX_AUX_PAGES {
            let mut params = vec![
                ("channel", channel_id.to_string()),
                ("ts", parent_ts.to_string()),
            ];
            if let Some(c) = cursor.take() {
                params.push(("cursor", c));
            }
            let response: MessagesResponse = self.api_get("conversations.replies", &params)?;
            messages.extend(
                response
                    .messages
                    .into_iter()
                    .filter(|m| seen.insert(m.ts.clone())),
            );
            cursor = next_cursor(response.response_metadata);
            if cursor.is_none() {
                return Ok(messages);
            }
        }
        Err(BackupError::malformed(
            "conversations.replies",
            "cursor chain did not terminate",
        ))
    }
}
