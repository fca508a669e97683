//! Parse a model completion into an extraction result.
//!
//! The whole trimmed response must parse as JSON; as the one concession
//! to markdown-wrapped output, a complete ```json fenced block is also
//! accepted. Anything else is absent — no scanning for brace boundaries,
//! so a truncated or partially-matching response is never accepted.

use serde_json::Value;

/// Parse the raw completion text. Returns the extracted mapping, or
/// `None` if the response does not contain a parseable JSON object.
pub fn parse_fragment(response: &str) -> Option<Value> {
    let trimmed = response.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return require_object(value);
    }

    let fenced = extract_fenced_json(trimmed)?;
    let value = serde_json::from_str(fenced).ok()?;
    require_object(value)
}

/// Only a JSON object is a usable extraction result.
fn require_object(value: Value) -> Option<Value> {
    value.is_object().then_some(value)
}

/// Extract the contents of the first complete ```json fenced block.
fn extract_fenced_json(response: &str) -> Option<&str> {
    let start = response.find("```json")? + "```json".len();
    let end = response[start..].find("```")?;
    Some(response[start..start + end].trim())
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
