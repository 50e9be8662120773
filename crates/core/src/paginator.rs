use crate::domain::HistoryPage;
use crate::error::BackupError;
use crate::ports::{ChatSource, Result};
use std::collections::HashSet;
use tracing::debug;

/// Fetches every top-level message in `[oldest, now)` by following the
/// continuation cursor until a page arrives without one.
///
/// Pages are returned in request order and each page keeps the ordering the
/// store delivered it in. The same `oldest` bound is sent with every request.
/// Any failed page aborts the whole fetch, as does a cursor the store has
/// already handed out.
pub fn fetch_history(
    source: &dyn ChatSource,
    channel_id: &str,
    oldest: i64,
    page_size: u32,
) -> Result<Vec<HistoryPage>> {
    let mut pages = Vec::new();
    let mut cursor: Option<String> = None;
    let mut seen_cursors = HashSet::new();

    loop {
        let page = source.get_history_page(channel_id, oldest, page_size, cursor.as_deref())?;
        // An empty cursor marks the last page just like a missing one
        let next = page.next_cursor.clone().filter(|c| !c.is_empty());
        debug!(
            channel_id,
            page = pages.len() + 1,
            messages = page.messages.len(),
            "fetched history page"
        );
        pages.push(page);
        match next {
            Some(next) if !seen_cursors.insert(next.clone()) => {
                return Err(BackupError::malformed(
                    "conversations.history",
                    format!("cursor {next} repeated"),
                ));
            }
            Some(next) => cursor = Some(next),
            None => break,
        }
    }

    Ok(pages)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{MemberSource, RawMessage};
    use std::cell::RefCell;

    /// Serves a fixed chain of pages linked by cursors "c1", "c2", ...
    struct PagedStore {
        pages: Vec<Vec<&'static str>>,
        last_cursor: Option<&'static str>,
        fail_on_page: Option<usize>,
        requests: RefCell<Vec<(i64, u32, Option<String>)>>,
    }

    impl PagedStore {
        fn new(pages: Vec<Vec<&'static str>>) -> Self {
            Self {
                pages,
                last_cursor: None,
                fail_on_page: None,
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl ChatSource for PagedStore {
        fn get_members(&self, _channel_id: &str) -> Result<Vec<MemberSource>> {
            Ok(Vec::new())
        }

        fn get_channel_name(&self, _channel_id: &str) -> Result<String> {
            Ok("general".to_string())
        }

        fn get_history_page(
            &self,
            _channel_id: &str,
            oldest: i64,
            limit: u32,
            cursor: Option<&str>,
        ) -> Result<HistoryPage> {
            self.requests
                .borrow_mut()
                .push((oldest, limit, cursor.map(str::to_string)));
            let index = match cursor {
                None => 0,
                Some(c) => c.trim_start_matches('c').parse::<usize>().unwrap(),
            };
            if self.fail_on_page == Some(index) {
                return Err(BackupError::transport("conversations.history", "boom"));
            }
            let next_cursor = if index + 1 < self.pages.len() {
                Some(format!("c{}", index + 1))
            } else {
                self.last_cursor.map(str::to_string)
            };
            Ok(HistoryPage {
                messages: self.pages[index]
                    .iter()
                    .map(|ts| RawMessage {
                        ts: ts.to_string(),
                        user: None,
                        text: String::new(),
                        reply_count: None,
                    })
                    .collect(),
                next_cursor,
            })
        }

        fn get_thread_replies(
            &self,
            _channel_id: &str,
            _parent_ts: &str,
        ) -> Result<Vec<RawMessage>> {
            Ok(Vec::new())
        }
    }

    fn timestamps(pages: &[HistoryPage]) -> Vec<Vec<String>> {
        pages
            .iter()
            .map(|page| page.messages.iter().map(|m| m.ts.clone()).collect())
            .collect()
    }

    #[test]
    fn test_fetch_history_follows_cursor_chain() {
        let store = PagedStore::new(vec![
            vec!["3.0", "2.0"],
            vec!["1.5"],
            vec!["1.2", "1.1", "1.0"],
        ]);
        let pages = fetch_history(&store, "C1", 100, 20).unwrap();
        assert_eq!(
            timestamps(&pages),
            vec![
                vec!["3.0".to_string(), "2.0".to_string()],
                vec!["1.5".to_string()],
                vec!["1.2".to_string(), "1.1".to_string(), "1.0".to_string()],
            ]
        );
        let requests = store.requests.borrow();
        assert_eq!(
            *requests,
            vec![
                (100, 20, None),
                (100, 20, Some("c1".to_string())),
                (100, 20, Some("c2".to_string())),
            ]
        );
    }

    #[test]
    fn test_fetch_history_single_page() {
        let store = PagedStore::new(vec![vec!["1.0"]]);
        let pages = fetch_history(&store, "C1", 0, 10).unwrap();
        assert_eq!(pages.len(), 1);
        assert_eq!(store.requests.borrow().len(), 1);
    }

    #[test]
    fn test_fetch_history_empty_cursor_terminates() {
        let mut store = PagedStore::new(vec![vec!["2.0"], vec!["1.0"]]);
        store.last_cursor = Some("");
        let pages = fetch_history(&store, "C1", 0, 10).unwrap();
        assert_eq!(pages.len(), 2);
    }

    #[test]
    fn test_fetch_history_failed_page_is_fatal() {
        let mut store = PagedStore::new(vec![vec!["3.0"], vec!["2.0"], vec!["1.0"]]);
        store.fail_on_page = Some(1);
        let err = fetch_history(&store, "C1", 0, 10).unwrap_err();
        assert!(matches!(err, BackupError::Transport { .. }));
    }

    #[test]
    fn test_fetch_history_repeated_cursor_is_malformed() {
        // the last page points back at page 1
        let mut store = PagedStore::new(vec![vec!["3.0"], vec!["2.0"]]);
        store.last_cursor = Some("c1");
        let err = fetch_history(&store, "C1", 0, 10).unwrap_err();
        assert!(matches!(err, BackupError::MalformedPayload { .. }));
        assert_eq!(store.requests.borrow().len(), 2);
    }
}
