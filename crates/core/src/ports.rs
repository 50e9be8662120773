use crate::domain::{HistoryPage, MemberSource, RawMessage};
use crate::error::BackupError;

pub type Result<T> = std::result::Result<T, BackupError>;

/// Read side of the chat backend.
/// This is a port (interface) implemented by the chat adapters.
pub trait ChatSource {
    fn get_members(&self, channel_id: &str) -> Result<Vec<MemberSource>>;

    fn get_channel_name(&self, channel_id: &str) -> Result<String>;

    // `cursor` is None for the first page
    fn get_history_page(
        &self,
        channel_id: &str,
        oldest: i64,
        limit: u32,
        cursor: Option<&str>,
    ) -> Result<HistoryPage>;

    /// Returns the parent message followed by every reply, oldest first.
    fn get_thread_replies(&self, channel_id: &str, parent_ts: &str) -> Result<Vec<RawMessage>>;
}

/// Trait for publishing a rendered document to the wiki
pub trait DocumentPublisher {
    fn publish_document(&self, path: &str, body: &str) -> Result<()>;
}
