use crate::domain::RawMessage;
use crate::error::BackupError;
use crate::ports::{ChatSource, Result};
use tracing::debug;

/// Fetches a thread as the parent message followed by its replies.
pub fn expand_thread(
    source: &dyn ChatSource,
    channel_id: &str,
    parent_ts: &str,
) -> Result<Vec<RawMessage>> {
    let messages = source.get_thread_replies(channel_id, parent_ts)?;
    if messages.is_empty() {
        return Err(BackupError::EmptyThread(parent_ts.to_string()));
    }
    debug!(channel_id, parent_ts, replies = messages.len() - 1, "expanded thread");
    Ok(messages)
}
