//! Navigation node model
//!
//! Nodes come from static configuration (JSON) and may be enriched
//! programmatically with hooks. Every node carries a `NodeId` derived from
//! its position in the tree so identity survives the per-resolution clone.

use crate::core::value::{Callback, ConfigFn};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::fmt;

/// Key/value context merged down the node tree.
pub type Context = Map<String, Value>;
/// Path parameters and node parameters.
pub type Params = BTreeMap<String, String>;

/// Positional node identity: `root`, `root.0`, `root.0.2`, ...
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn root() -> Self {
        Self("root".into())
    }

    pub fn child(&self, index: usize) -> Self {
        Self(format!("{}.{}", self.0, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_assigned(&self) -> bool {
        !self.0.is_empty()
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub collapsible: Option<bool>,
}

/// Grouping tag: a plain id or an inline definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Category {
    Id(String),
    Inline(CategoryDef),
}

impl Category {
    pub fn id(&self) -> &str {
        match self {
            Category::Id(id) => id,
            Category::Inline(def) => def.id.as_deref().or(def.label.as_deref()).unwrap_or_default(),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Category::Id(id) => id,
            Category::Inline(def) => def.label.as_deref().or(def.id.as_deref()).unwrap_or_default(),
        }
    }

    pub fn icon(&self) -> Option<&str> {
        match self {
            Category::Id(_) => None,
            Category::Inline(def) => def.icon.as_deref(),
        }
    }

    /// Explicit label of an inline definition; plain ids have none.
    pub fn explicit_label(&self) -> Option<&str> {
        match self {
            Category::Id(_) => None,
            Category::Inline(def) => def.label.as_deref(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessMode {
    Exclusive,
}

/// `anonymousAccess: true | "exclusive"`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnonymousAccess {
    Flag(bool),
    Mode(AccessMode),
}

impl AnonymousAccess {
    pub fn is_exclusive(&self) -> bool {
        matches!(self, AnonymousAccess::Mode(AccessMode::Exclusive))
    }

    pub fn allows_anonymous(&self) -> bool {
        matches!(self, AnonymousAccess::Flag(true) | AnonymousAccess::Mode(AccessMode::Exclusive))
    }
}

/// Reaction when a frame does not finish loading in time.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageErrorHandler {
    /// Milliseconds after mount before the handler fires.
    pub timeout: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redirect_path: Option<String>,
    #[serde(skip)]
    pub error_fn: Option<Callback<dyn Fn(&NavigationNode)>>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadingIndicator {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hide_automatically: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WebComponentSettings {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tag_name: Option<String>,
    #[serde(default)]
    pub self_registered: bool,
}

/// `webcomponent: true | { tagName, selfRegistered }`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WebComponent {
    Enabled(bool),
    Settings(WebComponentSettings),
}

impl WebComponent {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, WebComponent::Enabled(false))
    }
}

/// Children produced from the node's merged context.
pub type ChildrenResolver = ConfigFn<Context, Vec<NavigationNode>>;
/// Activation guard; resolving to `false` vetoes the navigation.
pub type ActivationHook = ConfigFn<NavigationNode, bool>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NavigationNode {
    #[serde(skip_deserializing)]
    pub id: NodeId,
    #[serde(default)]
    pub path_segment: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NavigationNode>,
    #[serde(skip)]
    pub children_resolver: Option<ChildrenResolver>,
    #[serde(default, skip_serializing_if = "Map::is_empty")]
    pub context: Context,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<Category>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub view_group: Option<String>,
    #[serde(default)]
    pub hide_from_nav: bool,
    #[serde(default)]
    pub hide_side_nav: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_nav: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_selected_for_children: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub isolate_view: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_child_node: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anonymous_access: Option<AnonymousAccess>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub visible_for_feature_toggles: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_permissions: Option<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_error_handler: Option<PageErrorHandler>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loading_indicator: Option<LoadingIndicator>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub webcomponent: Option<WebComponent>,
    #[serde(skip)]
    pub on_node_activation: Option<ActivationHook>,
}

impl NavigationNode {
    pub fn new(path_segment: impl Into<String>) -> Self {
        Self { path_segment: path_segment.into(), ..Default::default() }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self { self.label = Some(label.into()); self }
    pub fn with_view_url(mut self, url: impl Into<String>) -> Self { self.view_url = Some(url.into()); self }
    pub fn with_children(mut self, children: Vec<NavigationNode>) -> Self { self.children = children; self }
    pub fn with_children_resolver(mut self, resolver: ChildrenResolver) -> Self { self.children_resolver = Some(resolver); self }
    pub fn with_context(mut self, context: Value) -> Self {
        if let Value::Object(map) = context { self.context = map; }
        self
    }
    pub fn with_category(mut self, category: Category) -> Self { self.category = Some(category); self }
    pub fn with_view_group(mut self, vg: impl Into<String>) -> Self { self.view_group = Some(vg.into()); self }
    pub fn with_isolate_view(mut self, isolate: bool) -> Self { self.isolate_view = Some(isolate); self }
    pub fn with_tab_nav(mut self, tab_nav: bool) -> Self { self.tab_nav = Some(tab_nav); self }
    pub fn with_keep_selected_for_children(mut self, keep: bool) -> Self { self.keep_selected_for_children = Some(keep); self }
    pub fn with_feature_toggles(mut self, toggles: &[&str]) -> Self {
        self.visible_for_feature_toggles = toggles.iter().map(|t| t.to_string()).collect();
        self
    }
    pub fn with_anonymous_access(mut self, access: AnonymousAccess) -> Self { self.anonymous_access = Some(access); self }
    pub fn with_page_error_handler(mut self, handler: PageErrorHandler) -> Self { self.page_error_handler = Some(handler); self }
    pub fn with_webcomponent(mut self) -> Self { self.webcomponent = Some(WebComponent::Enabled(true)); self }
    pub fn hidden_from_nav(mut self) -> Self { self.hide_from_nav = true; self }
    pub fn on_activation(mut self, hook: ActivationHook) -> Self { self.on_node_activation = Some(hook); self }

    /// `:id` style segment.
    pub fn is_dynamic(&self) -> bool {
        self.path_segment.starts_with(':')
    }

    pub fn param_name(&self) -> Option<&str> {
        self.path_segment.strip_prefix(':')
    }

    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.path_segment)
    }

    pub fn has_view(&self) -> bool {
        self.view_url.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn may_have_children(&self) -> bool {
        !self.children.is_empty() || self.children_resolver.is_some()
    }

    pub fn is_webcomponent(&self) -> bool {
        self.webcomponent.as_ref().is_some_and(WebComponent::is_enabled)
    }

    pub fn loading_indicator_enabled(&self) -> bool {
        self.loading_indicator
            .as_ref()
            .and_then(|l| l.enabled)
            .unwrap_or(true)
    }

    /// Synthetic root holding the top-level nodes.
    pub fn synthetic_root(children: Vec<NavigationNode>, context: Context) -> Self {
        Self { id: NodeId::root(), children, context, ..Default::default() }
    }
}

/// Assign positional ids below `parent` (only where missing).
pub fn assign_ids(nodes: &mut [NavigationNode], parent: &NodeId) {
    for (i, node) in nodes.iter_mut().enumerate() {
        if !node.id.is_assigned() {
            node.id = parent.child(i);
        }
        let id = node.id.clone();
        assign_ids(&mut node.children, &id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn deserializes_camel_case_config() {
        let node: NavigationNode = serde_json::from_value(json!({
            "pathSegment": ":projectId",
            "viewUrl": "/project/:projectId",
            "category": {"id": "cat", "label": "Category"},
            "anonymousAccess": "exclusive",
            "visibleForFeatureToggles": ["ft1"],
            "children": [{"pathSegment": "settings"}]
        }))
        .unwrap();
        assert!(node.is_dynamic());
        assert_eq!(node.param_name(), Some("projectId"));
        assert_eq!(node.category.as_ref().map(Category::id), Some("cat"));
        assert!(node.anonymous_access.unwrap().is_exclusive());
        assert_eq!(node.children.len(), 1);
    }

    #[test]
    fn ids_follow_tree_position() {
        let mut nodes = vec![
            NavigationNode::new("a").with_children(vec![NavigationNode::new("b")]),
            NavigationNode::new("c"),
        ];
        assign_ids(&mut nodes, &NodeId::root());
        assert_eq!(nodes[0].id.as_str(), "root.0");
        assert_eq!(nodes[0].children[0].id.as_str(), "root.0.0");
        assert_eq!(nodes[1].id.as_str(), "root.1");
    }
}
