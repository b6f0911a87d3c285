//! Parameter sanitization

use std::collections::BTreeMap;

/// HTML-escape a raw URL-derived value before it reaches context or a frame.
pub fn sanitize_param(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '/' => out.push_str("&sol;"),
            other => out.push(other),
        }
    }
    out
}

pub fn sanitize_params(params: &BTreeMap<String, String>) -> BTreeMap<String, String> {
    params
        .iter()
        .map(|(k, v)| (sanitize_param(k), sanitize_param(v)))
        .collect()
}
