//! Path, query and URL helpers

use std::collections::BTreeMap;

/// Split `path?query` into its parts. A leading `#` (hash routing) is
/// dropped, as is any anchor after it.
pub fn split_path_query(raw: &str) -> (&str, Option<&str>) {
    let raw = raw.strip_prefix('#').unwrap_or(raw);
    let raw = raw.split('#').next().unwrap_or(raw);
    match raw.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (raw, None),
    }
}

/// Path segments without empty entries: `/home//dashboard/` → `["home", "dashboard"]`.
pub fn split_segments(path: &str) -> Vec<String> {
    let (path, _) = split_path_query(path);
    path.split('/')
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn trim_slashes(path: &str) -> &str {
    path.trim_matches('/')
}

pub fn add_leading_slash(path: &str) -> String {
    if path.starts_with('/') {
        path.to_string()
    } else {
        format!("/{}", path)
    }
}

/// Parse a query string (`a=1&b=2`, with or without the leading `?`).
pub fn parse_query(query: &str) -> BTreeMap<String, String> {
    let query = query.strip_prefix('?').unwrap_or(query);
    query
        .split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            (decode(k), decode(v))
        })
        .collect()
}

pub fn build_query(params: &BTreeMap<String, String>) -> String {
    params
        .iter()
        .map(|(k, v)| format!("{}={}", urlencoding::encode(k), urlencoding::encode(v)))
        .collect::<Vec<_>>()
        .join("&")
}

/// Join a path with a query map; an empty map yields the bare path.
pub fn with_query(path: &str, params: &BTreeMap<String, String>) -> String {
    if params.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, build_query(params))
    }
}

fn decode(value: &str) -> String {
    urlencoding::decode(value)
        .map(|v| v.into_owned())
        .unwrap_or_else(|_| value.to_string())
}

pub fn url_without_hash(url: &str) -> &str {
    url.split('#').next().unwrap_or(url)
}

/// Origin of an absolute URL; relative URLs have none (they share the host origin).
pub fn url_origin(url: &str) -> Option<String> {
    url::Url::parse(url)
        .ok()
        .map(|u| u.origin().ascii_serialization())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_ignore_slashes_and_query() {
        assert_eq!(split_segments("/home/dashboard/"), vec!["home", "dashboard"]);
        assert_eq!(split_segments("home?~a=1"), vec!["home"]);
        assert!(split_segments("").is_empty());
        assert!(split_segments("/").is_empty());
        assert_eq!(split_path_query("#/home?a=1#top"), ("/home", Some("a=1")));
    }

    #[test]
    fn query_round_trips_encoded_values() {
        let q = parse_query("?~foo=bar%20baz&other=1");
        assert_eq!(q.get("~foo").map(String::as_str), Some("bar baz"));
        assert_eq!(q.get("other").map(String::as_str), Some("1"));
    }

    #[test]
    fn origins_compare_scheme_host_port() {
        assert_eq!(
            url_origin("https://a.example.com/x/y#z"),
            Some("https://a.example.com".to_string())
        );
        assert_eq!(url_origin("/relative/path"), None);
        assert_eq!(url_without_hash("https://x/y#frag"), "https://x/y");
    }
}
