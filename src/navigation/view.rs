//! NavViewBuilder
//!
//! Turns resolved `PathData` into render-ready view-models for the top,
//! left and tab navigation.

use super::node::{Category, Context, NavigationNode};
use super::resolver::PathData;
use crate::config::{AppSwitcherItem, ShellConfig};
use crate::core::url::split_segments;
use serde::Serialize;

/// Separator between a category and its sub-category id.
const SUB_CATEGORY_DELIMITER: &str = "::";

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum NavItem {
    Node { node: NavigationNode, selected: bool },
    Category(NavCategory),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NavCategory {
    pub id: String,
    pub label: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub nodes: Vec<NavItem>,
}

impl NavItem {
    fn has_visible_leaf(&self) -> bool {
        match self {
            NavItem::Node { node, .. } => is_visible_leaf(node),
            NavItem::Category(group) => group.nodes.iter().any(NavItem::has_visible_leaf),
        }
    }

    pub fn as_category(&self) -> Option<&NavCategory> {
        match self {
            NavItem::Category(c) => Some(c),
            NavItem::Node { .. } => None,
        }
    }

    pub fn as_node(&self) -> Option<&NavigationNode> {
        match self {
            NavItem::Node { node, .. } => Some(node),
            NavItem::Category(_) => None,
        }
    }
}

fn is_visible_leaf(node: &NavigationNode) -> bool {
    !node.hide_from_nav && !node.display_label().is_empty()
}

fn new_group(category: &Category, id: &str, label: String) -> NavItem {
    NavItem::Category(NavCategory {
        id: id.to_string(),
        label,
        icon: category.icon().map(str::to_string),
        nodes: Vec::new(),
    })
}

fn has_group(items: &[NavItem], id: &str) -> bool {
    items.iter().any(|item| matches!(item, NavItem::Category(c) if c.id == id))
}

fn group_mut<'a>(items: &'a mut [NavItem], id: &str) -> Option<&'a mut NavCategory> {
    items.iter_mut().find_map(|item| match item {
        NavItem::Category(c) if c.id == id => Some(c),
        _ => None,
    })
}

/// An inline definition seen later can still supply the label and icon.
fn refine_group(group: &mut NavCategory, category: &Category, fallback_label: &str) {
    if let Some(label) = category.explicit_label() {
        if group.label == fallback_label || group.label == group.id {
            group.label = label.to_string();
        }
    }
    if group.icon.is_none() {
        group.icon = category.icon().map(str::to_string);
    }
}

/// Group `nodes` by category, in order of first appearance.
///
/// `parent::child` ids nest inside the `parent` group. When that group
/// does not exist yet the sub-category becomes a top-level group of its own.
pub fn build_nav_items(nodes: &[NavigationNode], selected: Option<&NavigationNode>) -> Vec<NavItem> {
    let mut items: Vec<NavItem> = Vec::new();

    for node in nodes {
        let leaf = NavItem::Node {
            node: node.clone(),
            selected: selected.is_some_and(|s| s.id == node.id && s.path_segment == node.path_segment),
        };
        let Some(category) = &node.category else {
            items.push(leaf);
            continue;
        };
        let id = category.id();

        match id.split_once(SUB_CATEGORY_DELIMITER) {
            Some((parent_id, child_id)) if has_group(&items, parent_id) => {
                let child_label = category.explicit_label().unwrap_or(child_id).to_string();
                if let Some(parent) = group_mut(&mut items, parent_id) {
                    if group_mut(&mut parent.nodes, id).is_none() {
                        parent.nodes.push(new_group(category, id, child_label));
                    }
                    if let Some(sub) = group_mut(&mut parent.nodes, id) {
                        refine_group(sub, category, child_id);
                        sub.nodes.push(leaf);
                    }
                }
            }
            Some((parent_id, child_id)) => {
                if !has_group(&items, id) {
                    tracing::debug!(category = id, parent = parent_id, "sub-category without parent, shown at top level");
                    let label = category.explicit_label().unwrap_or(child_id).to_string();
                    items.push(new_group(category, id, label));
                }
                if let Some(group) = group_mut(&mut items, id) {
                    refine_group(group, category, child_id);
                    group.nodes.push(leaf);
                }
            }
            None => {
                if group_mut(&mut items, id).is_none() {
                    items.push(new_group(category, id, category.label().to_string()));
                }
                if let Some(group) = group_mut(&mut items, id) {
                    refine_group(group, category, id);
                    group.nodes.push(leaf);
                }
            }
        }
    }

    prune(items)
}

fn prune(items: Vec<NavItem>) -> Vec<NavItem> {
    items
        .into_iter()
        .filter_map(|item| match item {
            NavItem::Category(mut group) => {
                group.nodes = prune(group.nodes);
                let item = NavItem::Category(group);
                item.has_visible_leaf().then_some(item)
            }
            leaf => leaf.has_visible_leaf().then_some(leaf),
        })
        .collect()
}

/// Cut the ancestor chain at the deepest node that keeps itself selected
/// for its children (or opens a tab nav). An explicit `false` on either
/// flag stops the scan.
pub fn truncated_path(nodes_in_path: &[NavigationNode]) -> Vec<NavigationNode> {
    let mut child_to_keep_found = false;
    let mut tab_nav_unset = false;
    let mut res: Vec<NavigationNode> = Vec::new();

    for node in nodes_in_path.iter().rev() {
        if !child_to_keep_found || node.tab_nav == Some(true) {
            if node.tab_nav == Some(false) {
                tab_nav_unset = true;
            }
            if node.keep_selected_for_children == Some(false) {
                child_to_keep_found = true;
            } else if node.keep_selected_for_children == Some(true)
                || (node.tab_nav == Some(true) && !tab_nav_unset)
            {
                child_to_keep_found = true;
                res.clear();
            }
        }
        res.push(node.clone());
    }

    res.reverse();
    res
}

fn keeps_selection(node: &NavigationNode) -> bool {
    node.keep_selected_for_children == Some(true) || node.tab_nav == Some(true)
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeftNavData {
    pub items: Vec<NavItem>,
    pub selected_node: Option<NavigationNode>,
    /// Node whose children are listed.
    pub parent_node: Option<NavigationNode>,
    /// Path of `parent_node`; item links are relative to it.
    pub base_path: String,
    pub hide_side_nav: bool,
}

pub fn get_left_nav_data(data: &PathData) -> LeftNavData {
    let truncated = truncated_path(&data.nodes_in_path);
    let Some(last_idx) = truncated.len().checked_sub(1) else {
        return LeftNavData::default();
    };
    let last = &truncated[last_idx];

    let (parent_idx, selected) = if keeps_selection(last) {
        (last_idx.checked_sub(1), Some(last))
    } else if !last.children.is_empty() {
        (Some(last_idx), data.selected_node.as_ref())
    } else {
        (last_idx.checked_sub(1), Some(last))
    };

    // The synthetic root feeds the top nav, never the side nav.
    let Some(parent_idx) = parent_idx.filter(|i| *i > 0) else {
        return LeftNavData {
            selected_node: selected.cloned(),
            ..Default::default()
        };
    };
    let parent = &truncated[parent_idx];

    LeftNavData {
        items: build_nav_items(&parent.children, selected),
        selected_node: selected.cloned(),
        parent_node: Some(parent.clone()),
        base_path: data.path_to(parent_idx),
        hide_side_nav: data.nodes_in_path.iter().any(|n| n.hide_side_nav),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TabNavData {
    pub items: Vec<NavItem>,
    pub header_node: Option<NavigationNode>,
    pub selected_node: Option<NavigationNode>,
    pub base_path: String,
}

/// Tabs are the children of the deepest `tabNav` node on the path.
pub fn get_tab_nav_data(data: &PathData) -> TabNavData {
    let Some(header_idx) = data.nodes_in_path.iter().rposition(|n| n.tab_nav == Some(true)) else {
        return TabNavData::default();
    };
    let header = &data.nodes_in_path[header_idx];
    let selected = data.nodes_in_path.get(header_idx + 1);
    TabNavData {
        items: build_nav_items(&header.children, selected),
        header_node: Some(header.clone()),
        selected_node: selected.cloned(),
        base_path: data.path_to(header_idx),
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TopNavData {
    pub items: Vec<NavItem>,
    pub selected_node: Option<NavigationNode>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub app_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    pub app_switcher_items: Vec<AppSwitcherItem>,
    pub hide_navigation: bool,
}

pub fn get_top_nav_data(config: &ShellConfig, data: &PathData) -> TopNavData {
    let selected = data.nodes_in_path.get(1);
    let path = data.path_segments.join("/");
    let switcher_items = config
        .navigation
        .app_switcher
        .as_ref()
        .map(|s| s.items.clone())
        .unwrap_or_default();

    let app_title = active_app_switcher_item(&switcher_items, &path, &data.context)
        .map(|item| item.title.clone())
        .or_else(|| config.settings.header.title.clone());

    TopNavData {
        items: build_nav_items(&data.root_nodes, selected),
        selected_node: selected.cloned(),
        app_title,
        logo: config.settings.header.logo.clone(),
        app_switcher_items: switcher_items,
        hide_navigation: config.settings.hide_navigation,
    }
}

/// First match among items ordered by link, descending, so a deeper link
/// beats its own prefix.
pub fn active_app_switcher_item<'a>(
    items: &'a [AppSwitcherItem],
    path: &str,
    context: &Context,
) -> Option<&'a AppSwitcherItem> {
    let mut sorted: Vec<&AppSwitcherItem> = items.iter().collect();
    sorted.sort_by(|a, b| b.link.cmp(&a.link));
    sorted.into_iter().find(|item| app_switcher_matches(item, path, context))
}

fn app_switcher_matches(item: &AppSwitcherItem, path: &str, context: &Context) -> bool {
    if let Some(conditions) = &item.selection_conditions {
        if let Some(route) = &conditions.route {
            let criteria_met = conditions
                .context_criteria
                .iter()
                .all(|c| context.get(&c.key) == Some(&c.value));
            if is_segment_prefix(route, path) && criteria_met {
                return true;
            }
        }
    }
    item.link.as_deref().is_some_and(|link| is_segment_prefix(link, path))
}

fn is_segment_prefix(prefix: &str, path: &str) -> bool {
    let prefix = split_segments(prefix);
    !prefix.is_empty() && split_segments(path).starts_with(&prefix)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::node::CategoryDef;

    fn labelled(seg: &str) -> NavigationNode {
        NavigationNode::new(seg).with_label(seg.to_uppercase())
    }

    #[test]
    fn nested_sub_categories_and_empty_groups() {
        let nodes = vec![
            labelled("a").with_category(Category::Id("main".into())),
            labelled("b").with_category(Category::Id("main::sub".into())),
            labelled("c").with_category(Category::Id("empty".into())).hidden_from_nav(),
            labelled("d"),
        ];
        let items = build_nav_items(&nodes, None);
        assert_eq!(items.len(), 2);
        let main = items[0].as_category().unwrap();
        assert_eq!(main.nodes.len(), 2);
        let sub = main.nodes[1].as_category().unwrap();
        assert_eq!(sub.id, "main::sub");
        assert_eq!(sub.label, "sub");
        assert_eq!(items[1].as_node().map(|n| n.path_segment.as_str()), Some("d"));
    }

    #[test]
    fn orphaned_sub_category_is_promoted() {
        let nodes = vec![labelled("x").with_category(Category::Id("missing::child".into()))];
        let items = build_nav_items(&nodes, None);
        let group = items[0].as_category().unwrap();
        assert_eq!(group.id, "missing::child");
        assert_eq!(group.nodes.len(), 1);
    }

    #[test]
    fn inline_label_wins_over_plain_id() {
        let nodes = vec![
            labelled("a").with_category(Category::Id("cat".into())),
            labelled("b").with_category(Category::Inline(CategoryDef {
                id: Some("cat".into()),
                label: Some("Nice Label".into()),
                icon: Some("star".into()),
                ..Default::default()
            })),
        ];
        let group = build_nav_items(&nodes, None)[0].as_category().cloned().unwrap();
        assert_eq!(group.label, "Nice Label");
        assert_eq!(group.icon.as_deref(), Some("star"));
    }

    #[test]
    fn truncation_stops_at_keep_selected() {
        let path = vec![
            NavigationNode::new(""),
            NavigationNode::new("a").with_keep_selected_for_children(true),
            NavigationNode::new("b"),
            NavigationNode::new("c"),
        ];
        let cut = truncated_path(&path);
        assert_eq!(cut.len(), 2);
        assert_eq!(cut[1].path_segment, "a");

        let explicit_off = vec![
            NavigationNode::new(""),
            NavigationNode::new("a").with_keep_selected_for_children(true),
            NavigationNode::new("b").with_keep_selected_for_children(false),
            NavigationNode::new("c"),
        ];
        assert_eq!(truncated_path(&explicit_off).len(), 4);
    }

    #[test]
    fn deeper_app_switcher_link_wins() {
        let items = vec![
            AppSwitcherItem { title: "Root".into(), link: Some("/projects".into()), selection_conditions: None },
            AppSwitcherItem { title: "Deep".into(), link: Some("/projects/pr1".into()), selection_conditions: None },
        ];
        let ctx = Context::new();
        assert_eq!(active_app_switcher_item(&items, "projects/pr1/settings", &ctx).map(|i| i.title.as_str()), Some("Deep"));
        assert_eq!(active_app_switcher_item(&items, "projects/pr2", &ctx).map(|i| i.title.as_str()), Some("Root"));
        assert!(active_app_switcher_item(&items, "home", &ctx).is_none());
    }
}
