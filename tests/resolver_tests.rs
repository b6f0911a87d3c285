//! Path resolution: matching, redirects, children resolvers, access filtering

use mfe_shell::core::value::ConfigFn;
use mfe_shell::navigation::{AnonymousAccess, Context, NavigationNode, PathResolver};
use mfe_shell::{AppContext, ShellConfig};
use proptest::prelude::*;
use serde_json::json;
use std::cell::Cell;
use std::rc::Rc;

fn resolver(config: ShellConfig) -> (Rc<AppContext>, PathResolver) {
    let ctx = AppContext::new(config);
    let resolver = PathResolver::new(ctx.clone());
    (ctx, resolver)
}

fn portal() -> ShellConfig {
    ShellConfig::new(vec![
        NavigationNode::new("home")
            .with_label("Home")
            .with_view_url("https://apps.example.com/home")
            .with_children(vec![NavigationNode::new("dashboard")
                .with_label("Dashboard")
                .with_view_url("https://apps.example.com/dashboard")]),
        NavigationNode::new("projects").with_label("Projects").with_children(vec![
            NavigationNode::new("overview").with_label("Overview").with_view_url("/projects/overview"),
            NavigationNode::new(":projectId")
                .with_view_url("/projects/{pathParams.projectId}")
                .with_context(json!({ "project": ":projectId" })),
        ]),
    ])
}

#[tokio::test]
async fn trailing_slash_resolves_leaf() {
    let (_, resolver) = resolver(portal());
    let data = resolver.resolve("home/dashboard/").await;

    assert!(data.is_existing_route);
    assert_eq!(data.selected_node.as_ref().map(|n| n.path_segment.as_str()), Some("dashboard"));
    assert!(data.selected_node_children.is_empty());
    assert_eq!(data.nodes_in_path.len(), 3);
    assert_eq!(data.matched_path, "home/dashboard");
}

#[tokio::test]
async fn empty_path_redirects_to_first_root_node() {
    let (_, resolver) = resolver(portal());
    assert_eq!(resolver.should_redirect("").await.as_deref(), Some("home"));
    assert_eq!(resolver.should_redirect("/").await.as_deref(), Some("home"));
}

#[tokio::test]
async fn navigation_only_node_redirects_to_first_viewable_child() {
    let (_, resolver) = resolver(portal());
    assert_eq!(resolver.should_redirect("projects").await.as_deref(), Some("projects/overview"));
    assert_eq!(resolver.should_redirect("home").await, None);
}

#[tokio::test]
async fn redirect_targets_never_redirect_again() {
    let nested = ShellConfig::new(vec![NavigationNode::new("a").with_children(vec![
        NavigationNode::new("b").with_children(vec![NavigationNode::new("c").with_view_url("/c")]),
    ])]);

    for config in [portal(), nested] {
        let (_, resolver) = resolver(config);
        for path in ["", "home", "projects", "a", "a/b", "missing"] {
            if let Some(target) = resolver.should_redirect(path).await {
                assert_eq!(resolver.should_redirect(&target).await, None, "{path} -> {target}");
            }
        }
    }
}

#[tokio::test]
async fn resolution_is_deterministic() {
    let (_, resolver) = resolver(portal());
    for path in ["home", "home/dashboard", "projects/42", "projects/overview", "nope/deeper"] {
        let first = resolver.resolve(path).await;
        let second = resolver.resolve(path).await;
        assert_eq!(first, second, "{path}");
    }
}

#[tokio::test]
async fn dynamic_segment_fills_params_and_context() {
    let (_, resolver) = resolver(portal());
    let data = resolver.resolve("projects/p-7").await;

    assert!(data.is_existing_route);
    assert_eq!(data.path_params.get("projectId").map(String::as_str), Some("p-7"));
    assert_eq!(data.context.get("project"), Some(&json!("p-7")));
}

#[tokio::test]
async fn lone_dynamic_sibling_shadows_static_siblings() {
    let (_, resolver) = resolver(portal());
    // "overview" sits next to ":projectId"; the dynamic node wins.
    let data = resolver.resolve("projects/overview").await;
    assert_eq!(data.selected_node.as_ref().map(|n| n.path_segment.as_str()), Some(":projectId"));
}

#[tokio::test]
async fn unmatched_tail_reports_partial_route() {
    let (_, resolver) = resolver(portal());
    let data = resolver.resolve("home/unknown/deeper").await;

    assert!(!data.is_existing_route);
    assert_eq!(data.matched_path, "home");
    assert_eq!(data.selected_node.as_ref().map(|n| n.path_segment.as_str()), Some("home"));
}

#[tokio::test]
async fn children_resolver_runs_once_per_context() {
    let calls = Rc::new(Cell::new(0u32));
    let counter = calls.clone();
    let config = ShellConfig::new(vec![NavigationNode::new("settings")
        .with_view_url("/settings")
        .with_context(json!({ "tenant": "acme" }))
        .with_children_resolver(ConfigFn::future(move |ctx: Context| {
            counter.set(counter.get() + 1);
            async move {
                let tenant = ctx.get("tenant").and_then(|v| v.as_str()).unwrap_or_default().to_string();
                vec![NavigationNode::new(tenant).with_view_url("/tenant")]
            }
        }))]);
    let (ctx, resolver) = resolver(config);

    let data = resolver.resolve("settings/acme").await;
    assert!(data.is_existing_route);
    resolver.resolve("settings/acme").await;
    assert_eq!(calls.get(), 1);
    assert!(!ctx.children_cache.is_empty());

    ctx.children_cache.clear();
    resolver.resolve("settings").await;
    assert_eq!(calls.get(), 2);
}

#[tokio::test]
async fn feature_toggles_hide_nodes() {
    let config = ShellConfig::new(vec![
        NavigationNode::new("beta").with_view_url("/beta").with_feature_toggles(&["beta"]),
        NavigationNode::new("classic").with_view_url("/classic").with_feature_toggles(&["!beta"]),
    ]);
    let (ctx, resolver) = resolver(config);

    assert!(!resolver.resolve("beta").await.is_existing_route);
    assert!(resolver.resolve("classic").await.is_existing_route);

    ctx.toggles.set("beta");
    assert!(resolver.resolve("beta").await.is_existing_route);
    assert!(!resolver.resolve("classic").await.is_existing_route);
}

#[tokio::test]
async fn anonymous_access_follows_login_state() {
    use mfe_shell::config::AuthConfig;
    use mfe_shell::navigation::AccessMode;

    let config = ShellConfig::new(vec![
        NavigationNode::new("public").with_view_url("/p").with_anonymous_access(AnonymousAccess::Flag(true)),
        NavigationNode::new("welcome")
            .with_view_url("/w")
            .with_anonymous_access(AnonymousAccess::Mode(AccessMode::Exclusive)),
        NavigationNode::new("private").with_view_url("/x"),
    ])
    .with_auth(AuthConfig::using("oidc"));
    let (ctx, resolver) = resolver(config);

    assert!(resolver.resolve("public").await.is_existing_route);
    assert!(resolver.resolve("welcome").await.is_existing_route);
    assert!(!resolver.resolve("private").await.is_existing_route);

    ctx.auth.set(mfe_shell::AuthData { access_token: Some("t".into()), ..Default::default() });
    assert!(resolver.resolve("public").await.is_existing_route);
    assert!(!resolver.resolve("welcome").await.is_existing_route);
    assert!(resolver.resolve("private").await.is_existing_route);
}

#[tokio::test]
async fn accessibility_resolver_sees_parent() {
    let config = ShellConfig::new(vec![NavigationNode::new("admin")
        .with_view_url("/admin")
        .with_children(vec![NavigationNode::new("users").with_view_url("/users")])])
    .with_accessibility_resolver(|node, parent, _ctx| {
        !(node.path_segment == "users" && parent.is_some_and(|p| p.path_segment == "admin"))
    });
    let (_, resolver) = resolver(config);

    assert!(resolver.resolve("admin").await.is_existing_route);
    assert!(!resolver.resolve("admin/users").await.is_existing_route);
}

proptest! {
    #[test]
    fn path_params_are_sanitized(segment in "[a-z0-9<>\"'&; -]{1,16}") {
        let config = ShellConfig::new(vec![NavigationNode::new("home").with_children(vec![
            NavigationNode::new(":id").with_view_url("/item/{pathParams.id}"),
        ])]);
        let (_, resolver) = resolver(config);
        let data = futures::executor::block_on(resolver.resolve(&format!("home/{}", segment)));

        let value = data.path_params.get("id").cloned().unwrap_or_default();
        prop_assert!(!value.contains('<'));
        prop_assert!(!value.contains('>'));
        prop_assert!(!value.contains('"'));
        prop_assert!(!value.contains('\''));
        prop_assert_eq!(value, mfe_shell::core::escape::sanitize_param(&segment));
    }
}
