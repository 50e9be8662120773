use serde::Deserialize;

/// A member record as delivered by the chat backend.
#[derive(Debug, Clone, Deserialize)]
pub struct MemberSource {
    pub id: String,
    #[serde(default)]
    pub profile: MemberProfile,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MemberProfile {
    #[serde(default)]
    pub display_name: String,
    #[serde(default)]
    pub real_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Member {
    pub id: String,
    pub display_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct RawMessage {
    pub ts: String,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub reply_count: Option<u64>,
}

impl RawMessage {
    pub fn has_replies(&self) -> bool {
        self.reply_count.is_some()
    }
}

/// One page of top-level channel history.
#[derive(Debug, Clone, Default)]
pub struct HistoryPage {
    pub messages: Vec<RawMessage>,
    pub next_cursor: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedPost {
    pub post_time: String,
    pub author: String,
    pub body: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThreadGroup {
    pub post_time: String,
    pub posts: Vec<NormalizedPost>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimplePost {
    pub post_time: String,
    pub post: NormalizedPost,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChannelEntry {
    Thread(ThreadGroup),
    Simple(SimplePost),
}

impl ChannelEntry {
    pub fn post_time(&self) -> &str {
        match self {
            ChannelEntry::Thread(group) => &group.post_time,
            ChannelEntry::Simple(simple) => &simple.post_time,
        }
    }

    pub fn is_thread(&self) -> bool {
        matches!(self, ChannelEntry::Thread(_))
    }

    pub fn posts(&self) -> &[NormalizedPost] {
        match self {
            ChannelEntry::Thread(group) => &group.posts,
            ChannelEntry::Simple(simple) => std::slice::from_ref(&simple.post),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelRecord {
    pub channel_name: String,
    pub entries: Vec<ChannelEntry>,
}
