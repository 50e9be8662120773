use crate::error::BackupError;
use crate::ports::Result;
use chrono::{DateTime, Duration, Local, TimeZone};

pub const POST_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const DATE_FORMAT: &str = "%Y-%m-%d";

/// Returns the whole-second part of a `<unix_seconds>.<fraction>` timestamp.
pub fn parse_ts_seconds(ts: &str) -> Result<i64> {
    let malformed = || BackupError::MalformedTimestamp(ts.to_string());
    let (seconds, fraction) = ts.split_once('.').ok_or_else(malformed)?;
    if seconds.is_empty()
        || fraction.is_empty()
        || !seconds.bytes().all(|b| b.is_ascii_digit())
        || !fraction.bytes().all(|b| b.is_ascii_digit())
    {
        return Err(malformed());
    }
    seconds.parse().map_err(|_| malformed())
}

/// Formats Unix seconds in `tz` as `YYYY-MM-DD HH:MM:SS`.
pub fn format_unix_seconds<Tz: TimeZone>(seconds: i64, tz: &Tz) -> Option<String>
where
    Tz::Offset: std::fmt::Display,
{
    let utc = DateTime::from_timestamp(seconds, 0)?;
    Some(utc.with_timezone(tz).format(POST_TIME_FORMAT).to_string())
}

/// Formats a message timestamp as local time.
pub fn format_post_time(ts: &str) -> Result<String> {
    let seconds = parse_ts_seconds(ts)?;
    format_unix_seconds(seconds, &Local)
        .ok_or_else(|| BackupError::MalformedTimestamp(ts.to_string()))
}

/// The look-back window of one backup run, fixed when the run starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupWindow {
    oldest: Option<DateTime<Local>>,
    today: DateTime<Local>,
}

impl BackupWindow {
    /// `period_days == 0` means the whole history.
    pub fn new(period_days: u32, now: DateTime<Local>) -> Self {
        let oldest = (period_days > 0).then(|| now - Duration::days(i64::from(period_days)));
        Self { oldest, today: now }
    }

    pub fn starting_now(period_days: u32) -> Self {
        Self::new(period_days, Local::now())
    }

    /// Unix seconds of the oldest message to fetch, 0 when unbounded.
    pub fn oldest_bound(&self) -> i64 {
        self.oldest.map(|oldest| oldest.timestamp()).unwrap_or(0)
    }

    pub fn period_label(&self) -> String {
        let today = self.today.format(DATE_FORMAT);
        match self.oldest {
            Some(oldest) => format!("{}to{}", oldest.format(DATE_FORMAT), today),
            None => format!("oldestto{}", today),
        }
    }

    /// `<base>/<channel>/<period_label>`
    pub fn document_path(&self, base_path: &str, channel_name: &str) -> String {
        format!(
            "{}/{}/{}",
            base_path.trim_end_matches('/'),
            channel_name.trim_matches('/'),
            self.period_label()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn noon() -> DateTime<Local> {
        Local.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_parse_ts_seconds_valid() {
        assert_eq!(parse_ts_seconds("1700000000.000200").unwrap(), 1_700_000_000);
    }

    #[test]
    fn test_parse_ts_seconds_without_fraction() {
        assert!(matches!(
            parse_ts_seconds("1700000000"),
            Err(BackupError::MalformedTimestamp(_))
        ));
    }

    #[test]
    fn test_parse_ts_seconds_non_numeric() {
        assert!(parse_ts_seconds("abc.123").is_err());
        assert!(parse_ts_seconds("123.x").is_err());
        assert!(parse_ts_seconds(".123").is_err());
        assert!(parse_ts_seconds("").is_err());
    }

    #[test]
    fn test_format_unix_seconds_utc() {
        assert_eq!(
            format_unix_seconds(1_700_000_000, &Utc).unwrap(),
            "2023-11-14 22:13:20"
        );
    }

    #[test]
    fn test_format_post_time_is_fixed_width() {
        let formatted = format_post_time("1700000000.1").unwrap();
        assert_eq!(formatted.len(), "YYYY-MM-DD HH:MM:SS".len());
    }

    #[test]
    fn test_window_unbounded() {
        let window = BackupWindow::new(0, noon());
        assert_eq!(window.oldest_bound(), 0);
        assert_eq!(window.period_label(), "oldestto2024-03-15");
    }

    #[test]
    fn test_window_bounded() {
        let window = BackupWindow::new(7, noon());
        assert_eq!(window.period_label(), "2024-03-08to2024-03-15");
        assert_eq!(window.oldest_bound(), noon().timestamp() - 7 * 86_400);
    }

    #[test]
    fn test_document_path_collapses_separators() {
        let window = BackupWindow::new(0, noon());
        assert_eq!(
            window.document_path("/backup/slack/", "general"),
            "/backup/slack/general/oldestto2024-03-15"
        );
        assert_eq!(
            window.document_path("/backup", "random"),
            "/backup/random/oldestto2024-03-15"
        );
    }
}
