//! `{{ key }}` token scanning and replacement
//!
//! Values files are treated as plain text here: tokens are found with a
//! pattern scan and replaced literally, without parsing the YAML around them.
//! Everything that needs to know the token syntax goes through this module.

use once_cell::sync::Lazy;
use regex::Regex;

/// Matches `{{ key }}` with optional whitespace inside the braces
static TOKEN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\{\{\s*(.*?)\s*\}\}").expect("token pattern is valid"));

/// Distinct token keys in order of first appearance
pub fn keys(content: &str) -> Vec<String> {
    let mut keys: Vec<String> = Vec::new();
    for caps in TOKEN_PATTERN.captures_iter(content) {
        let key = &caps[1];
        if !keys.iter().any(|k| k == key) {
            keys.push(key.to_string());
        }
    }
    keys
}

/// Whether a token for `key` occurs in `content`
pub fn contains(content: &str, key: &str) -> bool {
    TOKEN_PATTERN
        .captures_iter(content)
        .any(|caps| &caps[1] == key)
}

/// Replace tokens in a single pass over `content`
///
/// `lookup` receives each token's key and returns its replacement, or `None`
/// to leave the token untouched. Replacement text is inserted verbatim and is
/// never scanned again, so values containing tokens are not expanded.
pub fn replace_with<F>(content: &str, mut lookup: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    TOKEN_PATTERN
        .replace_all(content, |caps: &regex::Captures<'_>| {
            lookup(&caps[1]).unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}
