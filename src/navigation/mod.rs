//! Navigation - node tree, access filtering, path resolution, nav view-models
//!
//! resolver: path -> PathData (selected node, ancestor chain, params)
//! view:     PathData -> top/left/tab nav items

pub mod access;
pub mod cache;
pub mod node;
pub mod resolver;
pub mod view;

pub use access::{AccessFilter, AuthState, FeatureToggles};
pub use cache::ChildrenCache;
pub use node::{
    assign_ids, AccessMode, ActivationHook, AnonymousAccess, Category, CategoryDef, ChildrenResolver, Context,
    LoadingIndicator, NavigationNode, NodeId, PageErrorHandler, Params, WebComponent, WebComponentSettings,
};
pub use resolver::{find_matching_node, PathData, PathResolver};
pub use view::{
    build_nav_items, get_left_nav_data, get_tab_nav_data, get_top_nav_data, truncated_path, LeftNavData, NavCategory,
    NavItem, TabNavData, TopNavData,
};
