use crate::domain::{ChannelRecord, NormalizedPost};

const SEPARATOR: &str = "======";

fn post_header(post: &NormalizedPost) -> String {
    if post.author.is_empty() {
        post.post_time.clone()
    } else {
        format!("{} {}", post.post_time, post.author)
    }
}

/// Renders a channel record as a plain text wiki document.
pub fn render_document(title: &str, record: &ChannelRecord) -> String {
    let mut output = String::new();
    output.push_str(title);
    output.push('\n');

    for entry in &record.entries {
        output.push_str(SEPARATOR);
        output.push('\n');
        for post in entry.posts() {
            output.push_str(&post_header(post));
            output.push('\n');
            output.push_str(&post.body);
            output.push('\n');
        }
    }

    output.push_str(SEPARATOR);
    output.push('\n');
    output
}
