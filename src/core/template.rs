//! Template substitution for view URLs and context objects
//!
//! `{context.key}` and `{nodeParams.key}` are replaced by URI-encoded values
//! (unresolved placeholders are removed), `:param` tokens by path parameter
//! values. Context objects carry `":param"` string values that are swapped
//! for the resolved parameter after each dynamic segment match.

use regex::{Captures, Regex};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::sync::OnceLock;

const CONTEXT_PREFIX: &str = "context.";
const NODE_PARAMS_PREFIX: &str = "nodeParams.";

/// Inputs for view-URL substitution.
#[derive(Debug, Clone, Default)]
pub struct ViewUrlData<'a> {
    pub context: Option<&'a Map<String, Value>>,
    pub node_params: Option<&'a BTreeMap<String, String>>,
    pub path_params: Option<&'a BTreeMap<String, String>>,
}

pub fn substitute_view_url(view_url: &str, data: &ViewUrlData<'_>) -> String {
    let mut url = view_url.to_string();
    if let Some(params) = data.path_params {
        url = replace_path_params(&url, params);
    }
    url = replace_braced(&url, context_token(), |key| {
        data.context.and_then(|c| c.get(key)).map(value_text)
    });
    url = replace_braced(&url, node_params_token(), |key| {
        data.node_params.and_then(|p| p.get(key)).cloned()
    });
    url
}

/// Replace `:name` tokens whose name is a known parameter.
pub fn replace_path_params(input: &str, params: &BTreeMap<String, String>) -> String {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    let re = TOKEN.get_or_init(|| Regex::new(r":(\w+)").expect("static regex"));
    re.replace_all(input, |caps: &Captures| match params.get(&caps[1]) {
        Some(v) => urlencoding::encode(v).into_owned(),
        None => caps[0].to_string(),
    })
    .into_owned()
}

fn braced(prefix: &str) -> Regex {
    Regex::new(&format!(r"\{{{}([^}}]+)\}}", regex::escape(prefix))).expect("escaped regex")
}

fn context_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| braced(CONTEXT_PREFIX))
}

fn node_params_token() -> &'static Regex {
    static TOKEN: OnceLock<Regex> = OnceLock::new();
    TOKEN.get_or_init(|| braced(NODE_PARAMS_PREFIX))
}

fn replace_braced(input: &str, re: &Regex, lookup: impl Fn(&str) -> Option<String>) -> String {
    re.replace_all(input, |caps: &Captures| {
        lookup(&caps[1])
            .map(|v| urlencoding::encode(&v).into_owned())
            .unwrap_or_default()
    })
    .into_owned()
}

/// Swap `":name"` string values for the matching path parameter, recursively.
pub fn substitute_dynamic_params(object: &Map<String, Value>, params: &BTreeMap<String, String>) -> Map<String, Value> {
    object
        .iter()
        .map(|(k, v)| (k.clone(), substitute_value(v, params)))
        .collect()
}

fn substitute_value(value: &Value, params: &BTreeMap<String, String>) -> Value {
    match value {
        Value::String(s) => match s.strip_prefix(':').and_then(|name| params.get(name)) {
            Some(resolved) => Value::String(resolved.clone()),
            None => value.clone(),
        },
        Value::Object(obj) => Value::Object(substitute_dynamic_params(obj, params)),
        Value::Array(arr) => Value::Array(arr.iter().map(|v| substitute_value(v, params)).collect()),
        other => other.clone(),
    }
}

/// Text form of a JSON value as it appears in a URL.
pub fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn view_url_substitution() {
        let context = json!({"project": "p 1", "count": 3}).as_object().cloned().unwrap();
        let node_params: BTreeMap<String, String> = [("tab".to_string(), "info".to_string())].into();
        let path_params: BTreeMap<String, String> = [("id".to_string(), "42".to_string())].into();

        let url = substitute_view_url(
            "https://mf.example.com/:id/view?p={context.project}&n={context.count}&t={nodeParams.tab}&x={context.missing}",
            &ViewUrlData {
                context: Some(&context),
                node_params: Some(&node_params),
                path_params: Some(&path_params),
            },
        );
        assert_eq!(url, "https://mf.example.com/42/view?p=p%201&n=3&t=info&x=");
    }

    #[test]
    fn braced_tokens_are_compiled_once() {
        assert!(std::ptr::eq(context_token(), context_token()));
        assert!(std::ptr::eq(node_params_token(), node_params_token()));
        assert!(!std::ptr::eq(context_token(), node_params_token()));

        let node_params: BTreeMap<String, String> = [("q".to_string(), "a&b".to_string())].into();
        let data = ViewUrlData { node_params: Some(&node_params), ..Default::default() };
        for _ in 0..2 {
            assert_eq!(substitute_view_url("/s?q={nodeParams.q}&c={context.q}", &data), "/s?q=a%26b&c=");
        }
    }

    #[test]
    fn ports_are_not_parameters() {
        let params: BTreeMap<String, String> = [("id".to_string(), "7".to_string())].into();
        assert_eq!(replace_path_params("http://host:8080/:id", &params), "http://host:8080/7");
    }

    #[test]
    fn context_placeholders_take_param_values() {
        let ctx = json!({"user": ":userId", "nested": {"u": ":userId"}, "fixed": ":other"});
        let params: BTreeMap<String, String> = [("userId".to_string(), "u1".to_string())].into();
        let out = substitute_dynamic_params(ctx.as_object().unwrap(), &params);
        assert_eq!(out["user"], "u1");
        assert_eq!(out["nested"]["u"], "u1");
        assert_eq!(out["fixed"], ":other");
    }
}
