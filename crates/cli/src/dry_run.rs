use backup_core::error::BackupError;
use backup_core::ports::{DocumentPublisher, Result};
use std::io::Write;

/// Prints documents to stdout instead of creating wiki pages
pub struct StdoutPublisher;

impl DocumentPublisher for StdoutPublisher {
    fn publish_document(&self, path: &str, body: &str) -> Result<()> {
        let mut out = std::io::stdout().lock();
        writeln!(out, "--- {}", path)
            .and_then(|_| out.write_all(body.as_bytes()))
            .map_err(|e| BackupError::Publish {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}
