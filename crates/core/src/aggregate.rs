use crate::domain::{
    ChannelEntry, ChannelRecord, NormalizedPost, RawMessage, SimplePost, ThreadGroup,
};
use crate::ports::Result;

/// Merges a channel's top-level messages into one time-ordered record.
///
/// A message with a reply count is swapped for its expanded thread, which is
/// placed as a unit at the parent's time. Entries are stable-sorted by
/// `post_time`, so replies keep their retrieval order and equal timestamps keep
/// their input order.
pub fn aggregate<T, N>(
    channel_name: &str,
    top_level: &[RawMessage],
    mut thread_fetch: T,
    normalize: N,
) -> Result<ChannelRecord>
where
    T: FnMut(&RawMessage) -> Result<Vec<RawMessage>>,
    N: Fn(&RawMessage) -> Result<NormalizedPost>,
{
    let mut entries = Vec::with_capacity(top_level.len());

    for message in top_level {
        if message.has_replies() {
            let posts = thread_fetch(message)?
                .iter()
                .map(&normalize)
                .collect::<Result<Vec<_>>>()?;
            let post_time = match posts.first() {
                Some(parent) => parent.post_time.clone(),
                None => normalize(message)?.post_time,
            };
            entries.push(ChannelEntry::Thread(ThreadGroup { post_time, posts }));
        } else {
            let post = normalize(message)?;
            entries.push(ChannelEntry::Simple(SimplePost {
                post_time: post.post_time.clone(),
                post,
            }));
        }
    }

    entries.sort_by(|a, b| a.post_time().cmp(b.post_time()));

    Ok(ChannelRecord {
        channel_name: channel_name.to_string(),
        entries,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BackupError;

    fn raw(ts: &str, text: &str, reply_count: Option<u64>) -> RawMessage {
        RawMessage {
            ts: ts.to_string(),
            user: None,
            text: text.to_string(),
            reply_count,
        }
    }

    // Uses the raw ts as post_time so ordering is independent of the local zone
    fn plain(message: &RawMessage) -> Result<NormalizedPost> {
        Ok(NormalizedPost {
            post_time: message.ts.clone(),
            author: message.user.clone().unwrap_or_default(),
            body: message.text.clone(),
        })
    }

    fn no_threads(_: &RawMessage) -> Result<Vec<RawMessage>> {
        panic!("no thread expected")
    }

    #[test]
    fn test_aggregate_sorts_ascending() {
        let top = vec![
            raw("3.0", "c", None),
            raw("1.0", "a", None),
            raw("2.0", "b", None),
        ];
        let record = aggregate("general", &top, no_threads, plain).unwrap();
        let times: Vec<&str> = record.entries.iter().map(|e| e.post_time()).collect();
        assert_eq!(times, vec!["1.0", "2.0", "3.0"]);
        assert_eq!(record.channel_name, "general");
    }

    #[test]
    fn test_aggregate_sort_is_stable() {
        let top = vec![
            raw("2.0", "first", None),
            raw("1.0", "x", None),
            raw("2.0", "second", None),
        ];
        let record = aggregate("general", &top, no_threads, plain).unwrap();
        let bodies: Vec<&str> = record
            .entries
            .iter()
            .map(|e| e.posts()[0].body.as_str())
            .collect();
        assert_eq!(bodies, vec!["x", "first", "second"]);
    }

    #[test]
    fn test_aggregate_replaces_parent_with_thread() {
        let top = vec![raw("5.0", "later", None), raw("2.0", "parent", Some(2))];
        let record = aggregate(
            "general",
            &top,
            |parent| {
                assert_eq!(parent.ts, "2.0");
                Ok(vec![
                    raw("2.0", "parent", Some(2)),
                    raw("9.0", "late reply", None),
                    raw("3.0", "reply", None),
                ])
            },
            plain,
        )
        .unwrap();
        assert_eq!(record.entries.len(), 2);
        assert!(record.entries[0].is_thread());
        assert_eq!(record.entries[0].post_time(), "2.0");
        let bodies: Vec<&str> = record.entries[0]
            .posts()
            .iter()
            .map(|p| p.body.as_str())
            .collect();
        // replies keep retrieval order even when out of time order
        assert_eq!(bodies, vec!["parent", "late reply", "reply"]);
        assert!(!record.entries[1].is_thread());
    }

    #[test]
    fn test_aggregate_propagates_thread_failure() {
        let top = vec![raw("1.0", "parent", Some(1))];
        let err = aggregate(
            "general",
            &top,
            |_| Err(BackupError::transport("conversations.replies", "timeout")),
            plain,
        )
        .unwrap_err();
        assert!(matches!(err, BackupError::Transport { .. }));
    }

    #[test]
    fn test_aggregate_propagates_normalize_failure() {
        let top = vec![raw("1.0", "a", None)];
        let err = aggregate("general", &top, no_threads, |m| {
            Err(BackupError::MalformedTimestamp(m.ts.clone()))
        })
        .unwrap_err();
        assert!(matches!(err, BackupError::MalformedTimestamp(_)));
    }
}
