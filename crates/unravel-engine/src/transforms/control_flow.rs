use tracing::debug;

use unravel_protocols::Message;

use crate::budget::Budget;
use crate::oracle::{ChatOptions, Oracle, extract_code, split_snippet};
use crate::syntax;

const SYSTEM_PROMPT: &str = "You are a JavaScript reverse engineer. \
You receive code whose control flow was flattened into a dispatcher loop: \
a while loop around a switch that jumps between cases in a fixed order. \
Rewrite it with the original sequential, structured control flow. \
Preserve behaviour exactly. Reply with the rewritten code only, in one fenced javascript block.";

/// Ask the oracle to restore structured control flow.
///
/// Only the first `limit` characters are sent. When the source is longer, the
/// reply replaces the sent prefix and the unsent remainder is appended. The
/// result is accepted only if it parses as a whole; every failure returns
/// `None` and leaves the unit unchanged.
pub(crate) async fn unflatten_control_flow(
    oracle: &dyn Oracle,
    source: &str,
    limit: usize,
    budget: &Budget,
) -> Option<String> {
    let (snippet, remainder) = split_snippet(source, limit);
    let messages = vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!("```javascript\n{snippet}\n```")),
    ];

    let reply = match budget
        .guard(oracle.chat(messages, ChatOptions::default()))
        .await
    {
        Ok(reply) => reply,
        Err(err) => {
            debug!(error = %err, "Control-flow oracle call failed");
            return None;
        }
    };

    let code = extract_code(&reply.content)?;
    let candidate = if remainder.is_empty() {
        code
    } else {
        format!("{code}\n{remainder}")
    };

    if syntax::parses(&candidate) {
        Some(candidate)
    } else {
        debug!("Control-flow oracle reply does not parse; keeping flattened code");
        None
    }
}
