//! PathResolver
//!
//! Walks the node tree segment by segment starting from a synthetic root.
//! Every node on the path is a clone carrying its merged context and its
//! accessible children, so the canonical tree is never mutated.

use super::node::{assign_ids, Context, NavigationNode, Params};
use crate::config::ShellConfig;
use crate::context::AppContext;
use crate::core::escape::sanitize_param;
use crate::core::paths::MAX_REDIRECT_DEPTH;
use crate::core::template::substitute_dynamic_params;
use crate::core::url::{split_path_query, split_segments, trim_slashes};
use serde::Serialize;
use std::rc::Rc;

/// Result of one resolution pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PathData {
    pub selected_node: Option<NavigationNode>,
    pub selected_node_children: Vec<NavigationNode>,
    /// Ancestor chain; index 0 is the synthetic root.
    pub nodes_in_path: Vec<NavigationNode>,
    pub root_nodes: Vec<NavigationNode>,
    pub path_params: Params,
    /// Context accumulated down to the selected node.
    pub context: Context,
    /// Every segment of the requested path matched a node.
    pub is_existing_route: bool,
    /// Segments that did match, joined with `/`.
    pub matched_path: String,
    pub path_segments: Vec<String>,
}

impl PathData {
    /// Raw segments leading to `nodes_in_path[depth]`.
    pub fn path_to(&self, depth: usize) -> String {
        self.path_segments
            .iter()
            .take(depth)
            .cloned()
            .collect::<Vec<_>>()
            .join("/")
    }
}

/// Pick the child matching `segment`.
///
/// A lone dynamic sibling shadows its static siblings (with a warning);
/// several dynamic siblings make the level unresolvable.
pub fn find_matching_node<'a>(segment: &str, nodes: &'a [NavigationNode]) -> Option<&'a NavigationNode> {
    let dynamic: Vec<&NavigationNode> = nodes.iter().filter(|n| n.is_dynamic()).collect();
    if nodes.len() > 1 {
        match dynamic.len() {
            0 => {}
            1 => {
                tracing::warn!(
                    segment,
                    dynamic = %dynamic[0].path_segment,
                    "static and dynamic nodes on the same level, static nodes are ignored"
                );
                return Some(dynamic[0]);
            }
            n => {
                tracing::error!(segment, count = n, "multiple dynamic nodes on the same level, no match");
                return None;
            }
        }
    }
    nodes.iter().find(|n| n.path_segment == segment || n.is_dynamic())
}

pub struct PathResolver {
    ctx: Rc<AppContext>,
}

impl PathResolver {
    pub fn new(ctx: Rc<AppContext>) -> Self {
        Self { ctx }
    }

    pub async fn resolve(&self, path: &str) -> PathData {
        let config = self.ctx.config();
        self.resolve_in(&config, path).await
    }

    pub async fn resolve_in(&self, config: &ShellConfig, path: &str) -> PathData {
        let segments = split_segments(path);
        let global = config.navigation.global_context.clone();

        let mut root = NavigationNode::synthetic_root(config.navigation.nodes.clone(), global.clone());
        let root_nodes = self.children_of(config, &root, &global).await;
        root.children = root_nodes.clone();

        let mut nodes_in_path = vec![root];
        let mut children = root_nodes.clone();
        let mut context = global;
        let mut path_params = Params::new();
        let mut matched = Vec::new();

        for segment in &segments {
            let Some(found) = find_matching_node(segment, &children) else {
                break;
            };
            let mut node = found.clone();

            let mut merged = context.clone();
            for (k, v) in &node.context {
                merged.insert(k.clone(), v.clone());
            }
            if let Some(name) = node.param_name() {
                path_params.insert(name.to_string(), sanitize_param(segment));
                merged = substitute_dynamic_params(&merged, &path_params);
            }

            node.context = merged.clone();
            children = self.children_of(config, &node, &merged).await;
            node.children = children.clone();

            matched.push(segment.clone());
            context = merged;
            nodes_in_path.push(node);
        }

        let selected_node = (nodes_in_path.len() > 1)
            .then(|| nodes_in_path.last().cloned())
            .flatten();

        PathData {
            selected_node,
            selected_node_children: children,
            nodes_in_path,
            root_nodes,
            path_params,
            context,
            is_existing_route: matched.len() == segments.len(),
            matched_path: matched.join("/"),
            path_segments: segments,
        }
    }

    /// Accessible children of `node`, running (and memoizing) its children resolver.
    pub async fn children_of(&self, config: &ShellConfig, node: &NavigationNode, context: &Context) -> Vec<NavigationNode> {
        let raw = match &node.children_resolver {
            Some(resolver) => match self.ctx.children_cache.get(&node.id, context) {
                Some(cached) => cached,
                None => {
                    let mut produced = resolver.evaluate(context.clone()).await;
                    assign_ids(&mut produced, &node.id);
                    self.ctx
                        .children_cache
                        .insert(node.id.clone(), context.clone(), produced.clone());
                    produced
                }
            },
            None => node.children.clone(),
        };
        let auth = self.ctx.auth_state();
        self.ctx.access_filter(config).filter_children(raw, node, context, auth)
    }

    /// Target path when `path` lands on a navigation-only node, else `None`.
    ///
    /// Descends until a node with a view (or nowhere further to go) is
    /// reached, so the returned target never redirects again.
    pub async fn should_redirect(&self, path: &str) -> Option<String> {
        let config = self.ctx.config();
        let start = trim_slashes(split_path_query(path).0).to_string();
        let mut current = start.clone();

        for _ in 0..MAX_REDIRECT_DEPTH {
            let data = self.resolve_in(&config, &current).await;
            if !data.is_existing_route {
                break;
            }
            let next = match &data.selected_node {
                None => data
                    .root_nodes
                    .iter()
                    .find(|n| !n.path_segment.is_empty() && !n.is_dynamic())
                    .map(|n| n.path_segment.clone()),
                Some(node) if !node.has_view() => default_child(node),
                Some(_) => None,
            };
            match next {
                Some(segment) if current.is_empty() => current = segment,
                Some(segment) => current = format!("{}/{}", current, segment),
                None => break,
            }
        }

        (current != start).then_some(current)
    }
}

fn default_child(node: &NavigationNode) -> Option<String> {
    let statics = || node.children.iter().filter(|c| !c.path_segment.is_empty() && !c.is_dynamic());
    if let Some(wanted) = node.default_child_node.as_deref() {
        if let Some(child) = statics().find(|c| c.path_segment == wanted) {
            return Some(child.path_segment.clone());
        }
        tracing::warn!(default_child = wanted, parent = %node.path_segment, "defaultChildNode not found among children");
    }
    statics()
        .find(|c| c.has_view())
        .or_else(|| statics().find(|c| c.may_have_children()))
        .map(|c| c.path_segment.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_and_dynamic_matching() {
        let nodes = vec![NavigationNode::new("a"), NavigationNode::new("b")];
        assert_eq!(find_matching_node("b", &nodes).map(|n| n.path_segment.as_str()), Some("b"));
        assert!(find_matching_node("c", &nodes).is_none());

        let mixed = vec![NavigationNode::new("a"), NavigationNode::new(":id")];
        assert_eq!(find_matching_node("a", &mixed).map(|n| n.path_segment.as_str()), Some(":id"));

        let ambiguous = vec![NavigationNode::new(":x"), NavigationNode::new(":y")];
        assert!(find_matching_node("a", &ambiguous).is_none());

        let single = vec![NavigationNode::new(":only")];
        assert!(find_matching_node("anything", &single).is_some());
    }

    #[test]
    fn default_child_prefers_configured_then_viewable() {
        let node = NavigationNode::new("p").with_children(vec![
            NavigationNode::new(":id").with_view_url("/d"),
            NavigationNode::new("group"),
            NavigationNode::new("first").with_view_url("/f"),
            NavigationNode::new("second").with_view_url("/s"),
        ]);
        assert_eq!(default_child(&node).as_deref(), Some("first"));

        let mut configured = node.clone();
        configured.default_child_node = Some("second".into());
        assert_eq!(default_child(&configured).as_deref(), Some("second"));
    }

    #[test]
    fn path_to_joins_raw_segments() {
        let data = PathData {
            path_segments: vec!["a".into(), "42".into(), "c".into()],
            ..Default::default()
        };
        assert_eq!(data.path_to(0), "");
        assert_eq!(data.path_to(2), "a/42");
    }
}
