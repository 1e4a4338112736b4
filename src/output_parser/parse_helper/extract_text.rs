use std::sync::LazyLock;

use regex::Regex;

static CODEBLOCK_START: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*```[\w+-]*").expect("Static regex is valid"));
static CODEBLOCK_END: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"```\s*$").expect("Static regex is valid"));

/// Drops a leading `<think>…</think>` block some reasoning models emit.
pub fn remove_thought(text: &str) -> &str {
    match text.rsplit_once("</think>") {
        Some((_, rest)) => rest.trim(),
        None => text,
    }
}

/// Strips an opening and/or closing markdown fence, if present.
pub fn extract_from_codeblock(text: &str) -> &str {
    let start = CODEBLOCK_START
        .find(text)
        .filter(|m| m.start() == 0)
        .map(|m| m.end())
        .unwrap_or(0);

    let end = CODEBLOCK_END
        .find(&text[start..])
        .map(|m| start + m.start())
        .unwrap_or(text.len());

    text[start..end].trim()
}
