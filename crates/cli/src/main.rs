mod dry_run;

use anyhow::Context;
use backup_core::application::BackupServiceImpl;
use backup_core::config::BackupConfig;
use backup_core::ports::{ChatSource, DocumentPublisher};
use backup_core::utils::BackupWindow;
use clap::Parser;
use dry_run::StdoutPublisher;
use growi_adapter::GrowiPublisher;
use slack_adapter::SlackChatSource;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "slack_growi_backup=info,backup_core=info,slack_adapter=info,growi_adapter=info";

/// CLI tool to back up Slack channel history as Growi wiki pages
#[derive(Parser, Debug)]
#[command(name = "slack-growi-backup")]
#[command(about = "Backs up Slack channels, threads included, into Growi wiki pages")]
struct Cli {
    /// Path to the JSON settings file
    #[arg(short = 's', long = "settings", default_value = "settings.json")]
    settings: PathBuf,

    /// Overrides backup_period from the settings file (days, 0 = whole history)
    #[arg(short = 'p', long = "backup-period")]
    backup_period: Option<u32>,

    /// Print the documents instead of publishing them
    #[arg(long = "dry-run")]
    dry_run: bool,
}

/// Returns whether every channel was published.
fn run(cli: &Cli) -> anyhow::Result<bool> {
    let mut config = BackupConfig::load(&cli.settings)
        .with_context(|| format!("loading settings from {}", cli.settings.display()))?;
    if let Some(period) = cli.backup_period {
        config = config.with_backup_period(period);
    }
    let timeout = Duration::from_secs(config.request_timeout_secs);

    // Instantiate concrete implementations of secondary adapters
    let chat_source: Box<dyn ChatSource> = Box::new(
        SlackChatSource::new(&config.slack_api_base, &config.slack_token, timeout)
            .context("building slack client")?,
    );
    let publisher: Box<dyn DocumentPublisher> = if cli.dry_run {
        Box::new(StdoutPublisher)
    } else {
        Box::new(
            GrowiPublisher::new(&config.growi_uri, &config.growi_token, timeout)
                .context("building growi client")?,
        )
    };

    let window = BackupWindow::starting_now(config.backup_period);
    info!(
        channels = config.channels.len(),
        period = %window.period_label(),
        dry_run = cli.dry_run,
        "starting backup"
    );

    let service = BackupServiceImpl::new(chat_source, publisher, config, window);
    let report = service.execute_backup().context("collecting channel history")?;

    for outcome in report.failed() {
        if let Err(e) = &outcome.result {
            error!(
                channel = %outcome.channel_name,
                path = %outcome.path,
                error = %e,
                "channel not published"
            );
        }
    }
    info!(published = report.published().count(), "backup finished");
    Ok(report.all_published())
}

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| DEFAULT_LOG_FILTER.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => std::process::exit(2),
        Err(e) => {
            eprintln!("Error during backup: {:#}", e);
            std::process::exit(1);
        }
    }
}
