//! Up/down votes on assistant replies. Informational only: nothing here
//! touches the session, the transcript, or the graph.

use tracing::info;

/// Characters of the reply quoted in the feedback line.
const PREVIEW_CHARS: usize = 100;

/// Build the feedback line for `content` and log it.
pub fn feedback(content: &str, liked: bool) -> String {
    let preview: String = content.chars().take(PREVIEW_CHARS).collect();
    let verb = if liked { "upvoted" } else { "downvoted" };
    info!(liked, chars = content.chars().count(), "response feedback");
    format!("You {verb} this response: {preview}...")
}
