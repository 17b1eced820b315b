//! Regex-based field extraction for data.go.kr XML payloads
//!
//! The welfare API answers loosely structured XML where only a handful of
//! leaf tags matter, so values are pulled out with non-greedy tag patterns
//! instead of a full document parse. Missing tags yield empty strings.

use regex::Regex;
use std::collections::HashMap;
use std::sync::{Arc, OnceLock, RwLock};

const CDATA_OPEN: &str = "<![CDATA[";
const CDATA_CLOSE: &str = "]]>";

fn pattern_cache() -> &'static RwLock<HashMap<String, Arc<Regex>>> {
    static CACHE: OnceLock<RwLock<HashMap<String, Arc<Regex>>>> = OnceLock::new();
    CACHE.get_or_init(|| RwLock::new(HashMap::new()))
}

/// Compiled `<tag>(.*?)</tag>` pattern, shared across calls.
fn tag_pattern(tag: &str) -> Option<Arc<Regex>> {
    if let Ok(cache) = pattern_cache().read() {
        if let Some(re) = cache.get(tag) {
            return Some(Arc::clone(re));
        }
    }

    let escaped = regex::escape(tag);
    let re = match Regex::new(&format!(r"(?s)<{escaped}>(.*?)</{escaped}>")) {
        Ok(re) => Arc::new(re),
        Err(e) => {
            tracing::warn!(tag, error = %e, "Failed to compile tag pattern");
            return None;
        },
    };

    if let Ok(mut cache) = pattern_cache().write() {
        cache.insert(tag.to_string(), Arc::clone(&re));
    }
    Some(re)
}

/// Strip a CDATA wrapper, or unescape entities when there is none.
fn decode_body(raw: &str) -> String {
    let trimmed = raw.trim();
    if let Some(inner) = trimmed
        .strip_prefix(CDATA_OPEN)
        .and_then(|rest| rest.strip_suffix(CDATA_CLOSE))
    {
        return inner.trim().to_string();
    }

    match quick_xml::escape::unescape(trimmed) {
        Ok(text) => text.trim().to_string(),
        Err(_) => trimmed.to_string(),
    }
}

/// Body of the first `<tag>` element, or an empty string.
pub fn tag_value(xml: &str, tag: &str) -> String {
    tag_pattern(tag)
        .and_then(|re| re.captures(xml).and_then(|c| c.get(1)).map(|m| decode_body(m.as_str())))
        .unwrap_or_default()
}

/// Bodies of every `<tag>` element in document order.
pub fn tag_values(xml: &str, tag: &str) -> Vec<String> {
    match tag_pattern(tag) {
        Some(re) => re
            .captures_iter(xml)
            .filter_map(|c| c.get(1))
            .map(|m| decode_body(m.as_str()))
            .collect(),
        None => Vec::new(),
    }
}

/// Raw inner text of every `<tag>` block, undecoded.
pub fn blocks<'a>(xml: &'a str, tag: &str) -> Vec<&'a str> {
    match tag_pattern(tag) {
        Some(re) => re
            .captures_iter(xml)
            .filter_map(|c| c.get(1))
            .map(|m| m.as_str())
            .collect(),
        None => Vec::new(),
    }
}

/// `<child>` of each `<parent>` block; blocks with an empty child are skipped.
pub fn child_values(xml: &str, parent: &str, child: &str) -> Vec<String> {
    blocks(xml, parent)
        .into_iter()
        .map(|block| tag_value(block, child))
        .filter(|value| !value.is_empty())
        .collect()
}

/// `(first, second)` of each `<parent>` block that has a non-empty `first`.
///
/// Both values come from the same block, so a block missing `second` cannot
/// shift the pairing of later blocks.
pub fn child_pairs(xml: &str, parent: &str, first: &str, second: &str) -> Vec<(String, String)> {
    blocks(xml, parent)
        .into_iter()
        .filter_map(|block| {
            let key = tag_value(block, first);
            (!key.is_empty()).then(|| (key, tag_value(block, second)))
        })
        .collect()
}

/// Normalise whitespace in free-text fields.
pub fn clean_text(text: &str) -> String {
    static BLANK_LINES: OnceLock<Option<Regex>> = OnceLock::new();
    static INLINE_SPACE: OnceLock<Option<Regex>> = OnceLock::new();

    let mut out = text.replace("\r\n", "\n");

    if let Some(re) = BLANK_LINES.get_or_init(|| Regex::new(r"\n{3,}").ok()) {
        out = re.replace_all(&out, "\n\n").into_owned();
    }
    if let Some(re) = INLINE_SPACE.get_or_init(|| Regex::new(r"[ \t]+").ok()) {
        out = re.replace_all(&out, " ").into_owned();
    }

    out.trim().to_string()
}
