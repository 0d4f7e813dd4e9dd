use tracing::debug;

use unravel_protocols::Message;

use crate::budget::Budget;
use crate::oracle::{ChatOptions, Oracle, extract_code};
use crate::syntax;
use crate::types::Technique;

const SYSTEM_PROMPT: &str = "You are a JavaScript reverse engineer cleaning up deobfuscated code. \
Rename meaningless identifiers to descriptive names, remove leftover obfuscation artifacts \
and keep behaviour identical. Reply with the full cleaned code only, in one fenced javascript block.";

/// Final oracle pass over the whole unit.
///
/// Returns the cleaned code, or a warning describing why the unit was kept
/// as it was.
pub(crate) async fn llm_cleanup(
    oracle: &dyn Oracle,
    source: &str,
    techniques: &[Technique],
    budget: &Budget,
) -> Result<String, String> {
    let names: Vec<&str> = techniques.iter().map(Technique::as_str).collect();
    let messages = vec![
        Message::system(SYSTEM_PROMPT),
        Message::user(format!(
            "Techniques already handled: {}.\n\n```javascript\n{source}\n```",
            names.join(", ")
        )),
    ];
    let options = ChatOptions {
        temperature: 0.1,
        max_tokens: 4000,
    };

    let reply = budget
        .guard(oracle.chat(messages, options))
        .await
        .map_err(|err| format!("LLM cleanup failed: {err}"))?;

    let code = extract_code(&reply.content)
        .ok_or_else(|| "LLM cleanup returned no code".to_string())?;
    if !syntax::parses(&code) {
        debug!("Cleanup reply does not parse");
        return Err("LLM cleanup produced invalid code; kept previous result".to_string());
    }
    Ok(code)
}
