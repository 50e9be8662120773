use crate::aggregate::aggregate;
use crate::config::BackupConfig;
use crate::domain::{ChannelRecord, RawMessage};
use crate::identity::resolve;
use crate::normalize::normalize;
use crate::paginator::fetch_history;
use crate::ports::{ChatSource, DocumentPublisher, Result};
use crate::render::render_document;
use crate::thread::expand_thread;
use crate::utils::BackupWindow;
use tracing::{info, warn};

/// Outcome of publishing one channel's document.
#[derive(Debug)]
pub struct ChannelOutcome {
    pub channel_name: String,
    pub path: String,
    pub result: Result<()>,
}

#[derive(Debug, Default)]
pub struct BackupReport {
    pub outcomes: Vec<ChannelOutcome>,
}

impl BackupReport {
    pub fn published(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_ok())
    }

    pub fn failed(&self) -> impl Iterator<Item = &ChannelOutcome> {
        self.outcomes.iter().filter(|o| o.result.is_err())
    }

    pub fn all_published(&self) -> bool {
        self.failed().next().is_none()
    }
}

/// Application service that backs up chat channels into wiki documents
pub struct BackupServiceImpl {
    chat_source: Box<dyn ChatSource>,
    publisher: Box<dyn DocumentPublisher>,
    config: BackupConfig,
    window: BackupWindow,
}

impl BackupServiceImpl {
    pub fn new(
        chat_source: Box<dyn ChatSource>,
        publisher: Box<dyn DocumentPublisher>,
        config: BackupConfig,
        window: BackupWindow,
    ) -> Self {
        Self {
            chat_source,
            publisher,
            config,
            window,
        }
    }

    /// Builds the time-ordered record of one channel.
    pub fn collect_channel(&self, channel_id: &str) -> Result<ChannelRecord> {
        let source = self.chat_source.as_ref();
        let identities = resolve(&source.get_members(channel_id)?)?;
        let channel_name = source.get_channel_name(channel_id)?;
        info!(
            channel_id,
            channel_name = %channel_name,
            members = identities.len(),
            "collecting channel"
        );

        let pages = fetch_history(
            source,
            channel_id,
            self.window.oldest_bound(),
            self.config.limit,
        )?;
        let top_level: Vec<RawMessage> = pages.into_iter().flat_map(|page| page.messages).collect();

        let record = aggregate(
            &channel_name,
            &top_level,
            |parent| expand_thread(source, channel_id, &parent.ts),
            |message| normalize(message, &identities),
        )?;
        info!(
            channel_name = %channel_name,
            top_level = top_level.len(),
            entries = record.entries.len(),
            "collected channel"
        );
        Ok(record)
    }

    /// Collects every configured channel, then publishes one document each.
    ///
    /// Collection errors abort the run before anything is published. Publish
    /// errors are recorded in the report and the remaining channels continue.
    pub fn execute_backup(&self) -> Result<BackupReport> {
        let records = self
            .config
            .channels
            .iter()
            .map(|channel_id| self.collect_channel(channel_id))
            .collect::<Result<Vec<_>>>()?;

        let mut report = BackupReport::default();
        for record in records {
            let path = self
                .window
                .document_path(&self.config.growi_article_path, &record.channel_name);
            let body = render_document(&record.channel_name, &record);
            let result = self.publisher.publish_document(&path, &body);
            match &result {
                Ok(()) => info!(path = %path, "published document"),
                Err(e) => warn!(path = %path, error = %e, "failed to publish document"),
            }
            report.outcomes.push(ChannelOutcome {
                channel_name: record.channel_name,
                path,
                result,
            });
        }
        Ok(report)
    }
}
