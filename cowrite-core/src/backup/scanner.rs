use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex, RegexBuilder};
use serde_json::Value;
use uuid::Uuid;

static MEDIA_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"/media/([0-9a-fA-F-]{36})").expect("media reference pattern is valid")
});

/// Collects media ids embedded in free text and nested JSON values.
///
/// Only `/media/{uuid}` references count. Tokens of the right length that do
/// not parse as a UUID are skipped.
#[derive(Debug, Default)]
pub struct ReferenceScanner {
    found: BTreeSet<Uuid>,
}

impl ReferenceScanner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn scan_text(&mut self, text: &str) {
        for caps in MEDIA_REFERENCE.captures_iter(text) {
            if let Ok(id) = Uuid::parse_str(&caps[1]) {
                self.found.insert(id);
            }
        }
    }

    pub fn scan_opt(&mut self, text: Option<&str>) {
        if let Some(text) = text {
            self.scan_text(text);
        }
    }

    /// Scans every string leaf of `value`. Object keys are ignored.
    pub fn scan_json(&mut self, value: &Value) {
        match value {
            Value::String(s) => self.scan_text(s),
            Value::Array(items) => items.iter().for_each(|item| self.scan_json(item)),
            Value::Object(map) => map.values().for_each(|item| self.scan_json(item)),
            _ => {}
        }
    }

    pub fn finish(self) -> BTreeSet<Uuid> {
        self.found
    }
}

/// Rebuilds `value` with `f` applied to every string leaf.
pub fn deep_replace_strings<F>(value: &Value, f: &F) -> Value
where
    F: Fn(&str) -> String,
{
    match value {
        Value::String(s) => Value::String(f(s)),
        Value::Array(items) => Value::Array(items.iter().map(|v| deep_replace_strings(v, f)).collect()),
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| (k.clone(), deep_replace_strings(v, f)))
                .collect(),
        ),
        other => other.clone(),
    }
}

/// Replaces old media ids with new ones, ignoring ASCII case, so
/// `/media/0F8FAD5B-...` and `/media/0f8fad5b-...` are rewritten alike.
#[derive(Debug, Clone, Default)]
pub struct MediaIdRewriter {
    rules: Vec<(Regex, String)>,
}

impl MediaIdRewriter {
    pub fn new(replacements: &[(String, String)]) -> Self {
        let rules = replacements
            .iter()
            .filter(|(old, _)| !old.is_empty())
            .filter_map(|(old, new)| {
                RegexBuilder::new(&regex::escape(old))
                    .case_insensitive(true)
                    .build()
                    .ok()
                    .map(|pattern| (pattern, new.clone()))
            })
            .collect();
        Self { rules }
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn rewrite(&self, text: &str) -> String {
        let mut out = text.to_string();
        for (pattern, new) in &self.rules {
            if pattern.is_match(&out) {
                out = pattern.replace_all(&out, NoExpand(new)).into_owned();
            }
        }
        out
    }
}

/// Literal replacement for each `(old, new)` pair, in order, ignoring case.
pub fn replace_media_ids(text: &str, replacements: &[(String, String)]) -> String {
    MediaIdRewriter::new(replacements).rewrite(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const A: &str = "0f8fad5b-d9cb-469f-a165-70867728950e";
    const B: &str = "7c9e6679-7425-40de-944b-e07fc1f90ae7";

    #[test]
    fn finds_references_in_text_and_nested_json() {
        let mut scanner = ReferenceScanner::new();
        scanner.scan_text(&format!("<img src=\"/api/media/{A}\"> and /media/{A} again"));
        scanner.scan_json(&json!({
            "cover": { "images": [format!("/api/media/{B}"), 42, null] },
            "/media/ffffffff-ffff-ffff-ffff-ffffffffffff": true,
        }));

        let found = scanner.finish();
        assert_eq!(found.len(), 2);
        assert!(found.contains(&Uuid::parse_str(A).unwrap()));
        assert!(found.contains(&Uuid::parse_str(B).unwrap()));
    }

    #[test]
    fn skips_malformed_tokens() {
        let mut scanner = ReferenceScanner::new();
        scanner.scan_text("/media/------------------------------------");
        scanner.scan_text("/media/0f8fad5b-d9cb-469f-a165-70867728950");
        scanner.scan_opt(None);
        assert!(scanner.finish().is_empty());
    }

    #[test]
    fn deep_replace_only_touches_string_leaves() {
        let value = json!({
            "title": "abc",
            "count": 3,
            "flag": false,
            "nested": [{ "abc": "xabcx" }, null]
        });
        let replaced = deep_replace_strings(&value, &|s: &str| s.replace("abc", "Z"));

        assert_eq!(
            replaced,
            json!({
                "title": "Z",
                "count": 3,
                "flag": false,
                "nested": [{ "abc": "xZx" }, null]
            })
        );
    }

    #[test]
    fn replaces_every_occurrence() {
        let pairs = vec![(A.to_string(), B.to_string())];
        let text = format!("/api/media/{A} /api/media/{A}");
        assert_eq!(
            replace_media_ids(&text, &pairs),
            format!("/api/media/{B} /api/media/{B}")
        );
        assert_eq!(replace_media_ids("plain", &pairs), "plain");
    }

    #[test]
    fn replacement_ignores_case_of_old_id() {
        let rewriter = MediaIdRewriter::new(&[(A.to_string(), B.to_string())]);
        let upper = A.to_ascii_uppercase();
        assert_eq!(
            rewriter.rewrite(&format!("/api/media/{upper} and /media/{A}")),
            format!("/api/media/{B} and /media/{B}")
        );
    }

    #[test]
    fn replacement_text_is_not_expanded() {
        let rewriter = MediaIdRewriter::new(&[(A.to_string(), "$1x".to_string())]);
        assert_eq!(rewriter.rewrite(A), "$1x");
        assert!(MediaIdRewriter::new(&[(String::new(), B.to_string())]).is_empty());
    }
}
