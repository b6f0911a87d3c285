//! Access filtering: feature toggles, anonymous access, custom resolver

use super::node::{Context, NavigationNode};
use crate::config::AccessibilityResolver;
use crate::core::value::Callback;
use std::cell::RefCell;
use std::collections::BTreeSet;

/// Login state as seen by the access filter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AuthState {
    pub authorization_enabled: bool,
    pub logged_in: bool,
}

impl AuthState {
    pub fn disabled() -> Self {
        Self::default()
    }
}

/// Set of currently active feature toggles.
#[derive(Debug, Default)]
pub struct FeatureToggles {
    active: RefCell<BTreeSet<String>>,
}

impl FeatureToggles {
    pub fn new(initial: &[String]) -> Self {
        let toggles = Self::default();
        for t in initial {
            toggles.set(t);
        }
        toggles
    }

    pub fn set(&self, name: &str) {
        let name = name.trim();
        if name.is_empty() || name.starts_with('!') {
            tracing::warn!(toggle = name, "feature toggle name is empty or negated, ignored");
            return;
        }
        self.active.borrow_mut().insert(name.to_string());
    }

    pub fn unset(&self, name: &str) {
        self.active.borrow_mut().remove(name.trim());
    }

    /// Activate toggles from a comma-separated query value.
    pub fn set_from_list(&self, list: &str) {
        list.split(',').filter(|t| !t.trim().is_empty()).for_each(|t| self.set(t));
    }

    pub fn is_active(&self, name: &str) -> bool {
        self.active.borrow().contains(name)
    }

    pub fn active_list(&self) -> Vec<String> {
        self.active.borrow().iter().cloned().collect()
    }
}

/// Pure visibility predicate over a node.
pub struct AccessFilter<'a> {
    toggles: &'a FeatureToggles,
    resolver: Option<&'a Callback<AccessibilityResolver>>,
}

impl<'a> AccessFilter<'a> {
    pub fn new(toggles: &'a FeatureToggles, resolver: Option<&'a Callback<AccessibilityResolver>>) -> Self {
        Self { toggles, resolver }
    }

    pub fn is_permitted(
        &self,
        node: &NavigationNode,
        parent: Option<&NavigationNode>,
        context: &Context,
        auth: AuthState,
    ) -> bool {
        if auth.authorization_enabled {
            let anon = node.anonymous_access;
            let exclusive = anon.is_some_and(|a| a.is_exclusive());
            let allows_anonymous = anon.is_some_and(|a| a.allows_anonymous());
            if (auth.logged_in && exclusive) || (!auth.logged_in && !allows_anonymous) {
                return false;
            }
        }

        for toggle in &node.visible_for_feature_toggles {
            let visible = match toggle.strip_prefix('!') {
                Some(negated) => !self.toggles.is_active(negated),
                None => self.toggles.is_active(toggle),
            };
            if !visible {
                return false;
            }
        }

        match self.resolver {
            Some(resolver) => (resolver.0)(node, parent, context),
            None => true,
        }
    }

    pub fn filter_children(
        &self,
        children: Vec<NavigationNode>,
        parent: &NavigationNode,
        context: &Context,
        auth: AuthState,
    ) -> Vec<NavigationNode> {
        children
            .into_iter()
            .filter(|child| self.is_permitted(child, Some(parent), context, auth))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::navigation::node::{AccessMode, AnonymousAccess};
    use std::rc::Rc;

    #[test]
    fn feature_toggles_gate_visibility() {
        let toggles = FeatureToggles::new(&["beta".to_string()]);
        let filter = AccessFilter::new(&toggles, None);
        let ctx = Context::new();

        let beta = NavigationNode::new("b").with_feature_toggles(&["beta"]);
        let not_beta = NavigationNode::new("nb").with_feature_toggles(&["!beta"]);
        let both = NavigationNode::new("x").with_feature_toggles(&["beta", "gamma"]);

        assert!(filter.is_permitted(&beta, None, &ctx, AuthState::disabled()));
        assert!(!filter.is_permitted(&not_beta, None, &ctx, AuthState::disabled()));
        assert!(!filter.is_permitted(&both, None, &ctx, AuthState::disabled()));

        toggles.set("gamma");
        assert!(filter.is_permitted(&both, None, &ctx, AuthState::disabled()));
    }

    #[test]
    fn anonymous_access_rules() {
        let toggles = FeatureToggles::default();
        let filter = AccessFilter::new(&toggles, None);
        let ctx = Context::new();
        let anon = AuthState { authorization_enabled: true, logged_in: false };
        let user = AuthState { authorization_enabled: true, logged_in: true };

        let plain = NavigationNode::new("p");
        let open = NavigationNode::new("o").with_anonymous_access(AnonymousAccess::Flag(true));
        let exclusive = NavigationNode::new("e").with_anonymous_access(AnonymousAccess::Mode(AccessMode::Exclusive));

        assert!(!filter.is_permitted(&plain, None, &ctx, anon));
        assert!(filter.is_permitted(&plain, None, &ctx, user));
        assert!(filter.is_permitted(&open, None, &ctx, anon));
        assert!(filter.is_permitted(&open, None, &ctx, user));
        assert!(filter.is_permitted(&exclusive, None, &ctx, anon));
        assert!(!filter.is_permitted(&exclusive, None, &ctx, user));
    }

    #[test]
    fn custom_resolver_sees_parent_and_context() {
        let toggles = FeatureToggles::default();
        let resolver: Callback<AccessibilityResolver> = Callback(Rc::new(
            |node: &NavigationNode, parent: Option<&NavigationNode>, ctx: &Context| {
                parent.is_some() && node.path_segment != "admin" && ctx.get("tenant").is_some()
            },
        ));
        let filter = AccessFilter::new(&toggles, Some(&resolver));
        let parent = NavigationNode::new("root");
        let mut ctx = Context::new();
        ctx.insert("tenant".into(), "t1".into());

        let kids = filter.filter_children(
            vec![NavigationNode::new("admin"), NavigationNode::new("users")],
            &parent,
            &ctx,
            AuthState::disabled(),
        );
        assert_eq!(kids.len(), 1);
        assert_eq!(kids[0].path_segment, "users");
    }
}
