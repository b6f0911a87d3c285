//! Shell configuration
//!
//! Deserialized from JSON (camelCase keys) for the static parts; hooks,
//! resolvers and interceptors are attached with the `with_*` builders.

use crate::core::paths::{frames, query};
use crate::core::value::{Callback, Hook};
use crate::error::ConfigError;
use crate::frames::{FrameElement, FrameKind};
use crate::navigation::{Context, NavigationNode};
use serde::Deserialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;
use std::rc::Rc;

pub type AccessibilityResolver = dyn Fn(&NavigationNode, Option<&NavigationNode>, &Context) -> bool;
pub type NodeChangeHook = dyn Fn(Option<&NavigationNode>, &NavigationNode);
/// Returns a redirect path for a path that did not resolve, or `None` to stay.
pub type PageNotFoundHandler = dyn Fn(&str) -> Option<String>;
pub type IframeInterceptor = dyn Fn(&mut FrameElement, Option<&str>, &NavigationNode, FrameKind) -> anyhow::Result<()>;
/// Returns `true` to let the default error handling continue.
pub type AuthErrorHook = dyn Fn(&crate::error::AuthError) -> bool;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShellConfig {
    pub navigation: NavigationConfig,
    pub routing: RoutingConfig,
    pub settings: Settings,
    pub auth: AuthConfig,
}

impl ShellConfig {
    pub fn new(nodes: Vec<NavigationNode>) -> Self {
        Self { navigation: NavigationConfig { nodes, ..Default::default() }, ..Default::default() }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(raw)?)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.display().to_string(), source })?;
        Self::from_json_str(&raw)
    }

    pub fn with_global_context(mut self, context: Value) -> Self {
        if let Value::Object(map) = context { self.navigation.global_context = map; }
        self
    }
    pub fn with_view_group_settings(mut self, vg: impl Into<String>, settings: ViewGroupSettings) -> Self {
        self.navigation.view_group_settings.insert(vg.into(), settings);
        self
    }
    pub fn with_isolate_all_views(mut self, isolate: bool) -> Self { self.navigation.defaults.isolate_view = isolate; self }
    pub fn with_app_switcher(mut self, switcher: AppSwitcher) -> Self { self.navigation.app_switcher = Some(switcher); self }
    pub fn with_routing(mut self, routing: RoutingConfig) -> Self { self.routing = routing; self }
    pub fn with_settings(mut self, settings: Settings) -> Self { self.settings = settings; self }
    pub fn with_auth(mut self, auth: AuthConfig) -> Self { self.auth = auth; self }

    pub fn with_accessibility_resolver(
        mut self,
        f: impl Fn(&NavigationNode, Option<&NavigationNode>, &Context) -> bool + 'static,
    ) -> Self {
        self.navigation.node_accessibility_resolver = Some(Callback(Rc::new(f)));
        self
    }

    pub fn with_node_change_hook(mut self, f: impl Fn(Option<&NavigationNode>, &NavigationNode) + 'static) -> Self {
        self.routing.node_change_hook = Hook::Set(Callback(Rc::new(f)));
        self
    }

    pub fn with_page_not_found_handler(mut self, f: impl Fn(&str) -> Option<String> + 'static) -> Self {
        self.routing.page_not_found_handler = Some(Callback(Rc::new(f)));
        self
    }

    pub fn with_iframe_interceptor(
        mut self,
        f: impl Fn(&mut FrameElement, Option<&str>, &NavigationNode, FrameKind) -> anyhow::Result<()> + 'static,
    ) -> Self {
        self.settings.iframe_creation_interceptor = Some(Callback(Rc::new(f)));
        self
    }

    pub fn view_group_settings(&self, vg: &str) -> Option<&ViewGroupSettings> {
        self.navigation.view_group_settings.get(vg)
    }

    /// Frames of this view group are hidden rather than destroyed.
    pub fn can_cache(&self, vg: &str) -> bool {
        self.view_group_settings(vg)
            .and_then(|s| s.preload_url.as_deref())
            .is_some_and(|u| !u.is_empty())
    }

    pub fn modal_params_key(&self) -> String {
        format!("{}{}", self.routing.modal_path_param, query::MODAL_PARAMS_SUFFIX)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationConfig {
    pub nodes: Vec<NavigationNode>,
    pub global_context: Context,
    pub view_group_settings: BTreeMap<String, ViewGroupSettings>,
    pub defaults: NavigationDefaults,
    pub app_switcher: Option<AppSwitcher>,
    pub preload_view_groups: bool,
    #[serde(skip)]
    pub node_accessibility_resolver: Option<Callback<AccessibilityResolver>>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            global_context: Context::new(),
            view_group_settings: BTreeMap::new(),
            defaults: NavigationDefaults::default(),
            app_switcher: None,
            preload_view_groups: true,
            node_accessibility_resolver: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationDefaults {
    /// Global `isolateAllViews` default.
    pub isolate_view: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewGroupSettings {
    pub preload_url: Option<String>,
    pub load_on_startup: bool,
    pub no_client_check: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSwitcher {
    pub items: Vec<AppSwitcherItem>,
    pub show_main_app_entry: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppSwitcherItem {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection_conditions: Option<SelectionConditions>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SelectionConditions {
    pub route: Option<String>,
    pub context_criteria: Vec<ContextCriterion>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, serde::Serialize)]
pub struct ContextCriterion {
    pub key: String,
    pub value: Value,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RoutingConfig {
    pub use_hash_routing: bool,
    pub node_param_prefix: String,
    pub show_modal_path_in_url: bool,
    pub modal_path_param: String,
    pub skip_routing_for_url_patterns: Vec<String>,
    pub node_change_hook: Hook<NodeChangeHook>,
    #[serde(skip)]
    pub page_not_found_handler: Option<Callback<PageNotFoundHandler>>,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            use_hash_routing: false,
            node_param_prefix: query::NODE_PARAM_PREFIX.into(),
            show_modal_path_in_url: false,
            modal_path_param: query::MODAL_PATH_PARAM.into(),
            skip_routing_for_url_patterns: query::SKIP_PATTERNS.iter().map(|p| p.to_string()).collect(),
            node_change_hook: Hook::Unset,
            page_not_found_handler: None,
        }
    }
}

impl RoutingConfig {
    pub fn hash() -> Self { Self { use_hash_routing: true, ..Default::default() } }
    pub fn with_node_param_prefix(mut self, prefix: impl Into<String>) -> Self { self.node_param_prefix = prefix.into(); self }
    pub fn with_modal_path_in_url(mut self) -> Self { self.show_modal_path_in_url = true; self }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub header: HeaderSettings,
    pub custom_sandbox_rules: Vec<String>,
    pub allow_rules: Vec<String>,
    pub feature_toggles: FeatureToggleSettings,
    /// Milliseconds to wait for `navigate.ok` from a reused frame.
    pub navigate_ok_timeout: u64,
    pub hide_navigation: bool,
    #[serde(skip)]
    pub iframe_creation_interceptor: Option<Callback<IframeInterceptor>>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            header: HeaderSettings::default(),
            custom_sandbox_rules: Vec::new(),
            allow_rules: Vec::new(),
            feature_toggles: FeatureToggleSettings::default(),
            navigate_ok_timeout: frames::NAVIGATE_OK_TIMEOUT_MS,
            hide_navigation: false,
            iframe_creation_interceptor: None,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct HeaderSettings {
    pub title: Option<String>,
    pub logo: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FeatureToggleSettings {
    /// Query parameter carrying a comma separated toggle list.
    pub query_string_param: Option<String>,
    /// Toggles active from startup.
    pub initial: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AuthConfig {
    #[serde(rename = "use")]
    pub provider: Option<String>,
    pub disable_auto_login: bool,
    #[serde(skip)]
    pub on_auth_error: Option<Callback<AuthErrorHook>>,
    #[serde(skip)]
    pub on_auth_config_error: Option<Callback<AuthErrorHook>>,
}

impl AuthConfig {
    pub fn using(provider: impl Into<String>) -> Self {
        Self { provider: Some(provider.into()), ..Default::default() }
    }
    pub fn with_on_auth_error(mut self, f: impl Fn(&crate::error::AuthError) -> bool + 'static) -> Self {
        self.on_auth_error = Some(Callback(Rc::new(f)));
        self
    }
    pub fn with_on_auth_config_error(mut self, f: impl Fn(&crate::error::AuthError) -> bool + 'static) -> Self {
        self.on_auth_config_error = Some(Callback(Rc::new(f)));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_fill_missing_sections() {
        let config = ShellConfig::from_json_str(r#"{"navigation": {"nodes": [{"pathSegment": "home"}]}}"#).unwrap();
        assert_eq!(config.navigation.nodes.len(), 1);
        assert_eq!(config.routing.node_param_prefix, "~");
        assert_eq!(config.routing.modal_path_param, "modalPath");
        assert_eq!(config.modal_params_key(), "modalPathParams");
        assert_eq!(config.settings.navigate_ok_timeout, 2000);
        assert!(config.navigation.preload_view_groups);
        assert!(matches!(config.routing.node_change_hook, Hook::Unset));
    }

    #[test]
    fn only_preloaded_view_groups_are_cached() {
        let config = ShellConfig::default()
            .with_view_group_settings("vg1", ViewGroupSettings { preload_url: Some("/pre".into()), ..Default::default() })
            .with_view_group_settings("vg2", ViewGroupSettings::default());
        assert!(config.can_cache("vg1"));
        assert!(!config.can_cache("vg2"));
        assert!(!config.can_cache("unknown"));
    }

    #[test]
    fn non_function_hook_is_kept_as_invalid() {
        let config = ShellConfig::from_json_str(r#"{"routing": {"nodeChangeHook": "oops"}}"#).unwrap();
        assert!(matches!(config.routing.node_change_hook, Hook::Invalid(_)));
    }
}
