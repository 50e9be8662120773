use crate::domain::{NormalizedPost, RawMessage};
use crate::identity::IdentityMap;
use crate::ports::Result;
use crate::utils::format_post_time;
use regex::Regex;
use std::sync::OnceLock;

const CODE_FENCE: &str = "```";
const EMPTY_BODY: &str = "None";

fn mention_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<@([A-Za-z0-9]+)>").expect("mention pattern is valid"))
}

/// Puts every code fence on its own line.
pub fn space_code_blocks(text: &str) -> String {
    if text.contains(CODE_FENCE) {
        text.replace(CODE_FENCE, "\n```\n")
    } else {
        text.to_string()
    }
}

/// Replaces each `<@ID>` token with `@<display name>`.
pub fn substitute_mentions(text: &str, identities: &IdentityMap) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    let mut last = 0;
    for caps in mention_pattern().captures_iter(text) {
        let (Some(token), Some(id)) = (caps.get(0), caps.get(1)) else {
            continue;
        };
        let name = identities.lookup(id.as_str())?;
        out.push_str(&text[last..token.start()]);
        out.push('@');
        out.push_str(name);
        last = token.end();
    }
    out.push_str(&text[last..]);
    Ok(out)
}

pub fn normalize_body(text: &str, identities: &IdentityMap) -> Result<String> {
    let mut body = space_code_blocks(text);
    if body.is_empty() {
        body = EMPTY_BODY.to_string();
    }
    substitute_mentions(&body, identities)
}

pub fn normalize(raw: &RawMessage, identities: &IdentityMap) -> Result<NormalizedPost> {
    let post_time = format_post_time(&raw.ts)?;
    let author = match &raw.user {
        Some(user) => identities.lookup(user)?.to_string(),
        None => String::new(),
    };
    Ok(NormalizedPost {
        post_time,
        author,
        body: normalize_body(&raw.text, identities)?,
    })
}
