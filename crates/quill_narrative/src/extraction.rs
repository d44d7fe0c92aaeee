//! Pulling a JSON payload out of free-form generator output.
//!
//! Models wrap JSON in fenced blocks, prefix it with chatter, or trail it
//! with explanations. [`extract_json`] finds the payload; the adapter then
//! hands it to serde.

use quill_error::GenerationFailure;

/// Locate the JSON value in a generator response.
///
/// Tries a fenced ```` ```json ```` block, then any fenced block, then the
/// first balanced object or array, whichever opens first.
///
/// # Errors
///
/// [`GenerationFailure::Malformed`] if no candidate is found.
///
/// # Examples
///
/// ```
/// use quill_narrative::extract_json;
///
/// let reply = "Sure!\n```json\n{\"title\": \"Ash\"}\n```\nEnjoy.";
/// assert_eq!(extract_json(reply).unwrap(), "{\"title\": \"Ash\"}");
/// ```
pub fn extract_json(response: &str) -> Result<&str, GenerationFailure> {
    if let Some(block) = fenced_block(response) {
        let block = block.trim();
        if block.starts_with('{') || block.starts_with('[') {
            return Ok(block);
        }
    }

    let object = response.find('{');
    let array = response.find('[');
    let order = match (object, array) {
        (Some(o), Some(a)) if a < o => [('[', ']'), ('{', '}')],
        _ => [('{', '}'), ('[', ']')],
    };

    for (open, close) in order {
        if let Some(found) = balanced(response, open, close) {
            return Ok(found);
        }
    }

    tracing::debug!(length = response.len(), "No JSON payload in response");
    Err(GenerationFailure::Malformed(format!(
        "no JSON value in {} byte response",
        response.len()
    )))
}

/// Body of the first fenced code block, preferring one tagged `json`.
///
/// A block with no closing fence runs to the end of the response, which is
/// what a truncated reply looks like.
fn fenced_block(response: &str) -> Option<&str> {
    let (start, tag_len) = match response.find("```json") {
        Some(start) => (start, "```json".len()),
        None => (response.find("```")?, 3),
    };
    let after_tag = start + tag_len;
    let body_start = response[after_tag..]
        .find('\n')
        .map_or(after_tag, |n| after_tag + n + 1);
    let rest = &response[body_start..];
    Some(rest.find("```").map_or(rest, |end| &rest[..end]))
}

/// First `open`..`close` span with matching depth, ignoring delimiters
/// inside string literals.
fn balanced(response: &str, open: char, close: char) -> Option<&str> {
    let start = response.find(open)?;
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, ch) in response[start..].char_indices() {
        if escaped {
            escaped = false;
            continue;
        }
        match ch {
            '\\' if in_string => escaped = true,
            '"' => in_string = !in_string,
            c if c == open && !in_string => depth += 1,
            c if c == close && !in_string => {
                depth -= 1;
                if depth == 0 {
                    return Some(&response[start..start + offset + ch.len_utf8()]);
                }
            }
            _ => {}
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_object_with_prose_around_it() {
        let reply = r#"Here you go: {"a": {"b": "}"}} hope that helps"#;
        assert_eq!(extract_json(reply).unwrap(), r#"{"a": {"b": "}"}}"#);
    }

    #[test]
    fn array_wins_when_it_opens_first() {
        let reply = r#"[{"name": "x"}, {"name": "y"}]"#;
        assert_eq!(extract_json(reply).unwrap(), reply);
    }

    #[test]
    fn untagged_fence_is_accepted() {
        let reply = "```\n[1, 2]\n```";
        assert_eq!(extract_json(reply).unwrap(), "[1, 2]");
    }

    #[test]
    fn escaped_quote_does_not_end_string() {
        let reply = r#"{"line": "she said \"}\" twice"}"#;
        assert_eq!(extract_json(reply).unwrap(), reply);
    }

    #[test]
    fn plain_prose_is_malformed() {
        assert!(matches!(
            extract_json("no structure here"),
            Err(GenerationFailure::Malformed(_))
        ));
    }

    #[test]
    fn unbalanced_object_is_malformed() {
        assert!(extract_json(r#"{"open": true"#).is_err());
    }
}
