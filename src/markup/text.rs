//! Plain-text helpers: tag stripping and minimal escaping.

/// Remove every `<...>` run, decode HTML entities and trim.
///
/// Scanning is naive: a `<` opens a tag until the next `>`, whatever sits in
/// between, and a stray `>` is dropped. Entities are decoded after stripping,
/// so `&lt;b&gt;` survives as the literal text `<b>`.
pub fn strip_tags(markup: &str) -> String {
    let mut in_tag = false;
    let mut plain = String::with_capacity(markup.len());
    for ch in markup.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => plain.push(ch),
            _ => {}
        }
    }
    html_escape::decode_html_entities(&plain).trim().to_string()
}

/// Escape `&`, `<` and `>` for element content; nothing else is touched
pub fn escape_text(text: &str) -> String {
    html_escape::encode_text(text).into_owned()
}

/// Escape a value placed inside a double-quoted attribute
pub fn escape_attribute(value: &str) -> String {
    html_escape::encode_double_quoted_attribute(value).into_owned()
}

/// Re-quote a value read from a single-quoted attribute for a double-quoted one.
/// Only `"` changes; existing entities are left as written.
pub fn escape_quotes(value: &str) -> String {
    value.replace('"', "&quot;")
}
