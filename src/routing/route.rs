//! Route value and query-string contract
//!
//! Node params travel as prefixed query keys (`?~sort=asc`); a bookmarked
//! modal travels as `modalPath` + `modalPathParams` (JSON settings).

use crate::connector::ModalSettings;
use crate::core::escape::sanitize_param;
use crate::core::url::{add_leading_slash, parse_query, split_path_query, trim_slashes, with_query};
use crate::navigation::{NavigationNode, Params};
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;

/// The committed route.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Route {
    /// Path and query as read from history.
    pub raw: String,
    /// Path without slashes at either end.
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub node: Option<NavigationNode>,
    pub node_params: Params,
}

impl Route {
    pub fn parse(raw: &str, node_param_prefix: &str) -> Self {
        let (path, query) = split_path_query(raw);
        let query = parse_query(query.unwrap_or(""));
        Self {
            raw: raw.strip_prefix('#').unwrap_or(raw).to_string(),
            path: trim_slashes(path).to_string(),
            node: None,
            node_params: filter_node_params(&query, node_param_prefix),
        }
    }
}

/// Keys carrying `prefix`, stripped of it, values sanitized.
pub fn filter_node_params(query: &BTreeMap<String, String>, prefix: &str) -> Params {
    query
        .iter()
        .filter_map(|(key, value)| {
            let name = key.strip_prefix(prefix)?;
            (!name.is_empty()).then(|| (name.to_string(), sanitize_param(value)))
        })
        .collect()
}

/// Query entries that are neither node params nor reserved modal keys.
pub fn search_params(query: &BTreeMap<String, String>, prefix: &str, reserved: &[&str]) -> Params {
    query
        .iter()
        .filter(|(key, _)| !key.starts_with(prefix) && !reserved.contains(&key.as_str()))
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect()
}

/// `raw` with `params` merged in as prefixed node params.
pub fn add_node_params(raw: &str, params: &Params, prefix: &str) -> String {
    let (path, query) = split_path_query(raw);
    let mut merged = parse_query(query.unwrap_or(""));
    for (key, value) in params {
        merged.insert(format!("{prefix}{key}"), value.clone());
    }
    with_query(&add_leading_slash(path), &merged)
}

/// `raw` with plain search params merged in.
pub fn add_search_params(raw: &str, params: &Params) -> String {
    let (path, query) = split_path_query(raw);
    let mut merged = parse_query(query.unwrap_or(""));
    merged.extend(params.iter().map(|(k, v)| (k.clone(), v.clone())));
    with_query(&add_leading_slash(path), &merged)
}

/// Modal path and settings from a bookmarked URL.
pub fn modal_from_query(
    query: &BTreeMap<String, String>,
    path_key: &str,
    params_key: &str,
) -> Option<(String, ModalSettings)> {
    let path = query.get(path_key).filter(|p| !p.is_empty())?;
    let settings = match query.get(params_key) {
        Some(raw) => match serde_json::from_str::<ModalSettings>(raw) {
            Ok(settings) => settings,
            Err(e) => {
                tracing::warn!(error = %e, "ignoring malformed modal params");
                ModalSettings::new()
            }
        },
        None => ModalSettings::new(),
    };
    Some((path.clone(), settings))
}

/// `raw` with the modal keys set (or replaced).
pub fn append_modal_params(
    raw: &str,
    path_key: &str,
    params_key: &str,
    modal_path: &str,
    settings: &ModalSettings,
) -> String {
    let (path, query) = split_path_query(raw);
    let mut merged = parse_query(query.unwrap_or(""));
    merged.insert(path_key.to_string(), add_leading_slash(modal_path));
    if settings.is_empty() {
        merged.remove(params_key);
    } else {
        merged.insert(params_key.to_string(), serde_json::Value::Object(settings.clone()).to_string());
    }
    with_query(&add_leading_slash(path), &merged)
}

/// `raw` without the modal keys.
pub fn strip_modal_params(raw: &str, path_key: &str, params_key: &str) -> String {
    let (path, query) = split_path_query(raw);
    let mut merged = parse_query(query.unwrap_or(""));
    merged.remove(path_key);
    merged.remove(params_key);
    with_query(&add_leading_slash(path), &merged)
}

/// Whether `raw` matches one of the configured skip patterns. Invalid
/// patterns are logged and never match.
pub fn matches_skip_pattern(raw: &str, patterns: &[String]) -> bool {
    patterns.iter().any(|pattern| match Regex::new(pattern) {
        Ok(re) => re.is_match(raw),
        Err(e) => {
            tracing::warn!(pattern = %pattern, error = %e, "invalid skipRoutingForUrlPatterns entry");
            false
        }
    })
}

/// Resolve a client link against the current path.
pub fn resolve_link(current_path: &str, link: &str, relative: bool, from_parent: bool) -> String {
    let link = link.trim();
    if link.starts_with('/') {
        return trim_slashes(link).to_string();
    }
    let base = trim_slashes(current_path);
    let base = if from_parent {
        base.rsplit_once('/').map(|(parent, _)| parent).unwrap_or("")
    } else if relative {
        base
    } else {
        ""
    };
    let mut segments: Vec<&str> = base.split('/').filter(|s| !s.is_empty()).collect();
    for part in link.split('/').filter(|s| !s.is_empty()) {
        match part {
            "." => {}
            ".." => {
                segments.pop();
            }
            other => segments.push(other),
        }
    }
    segments.join("/")
}
