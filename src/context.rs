//! Application context
//!
//! One instance per page. Everything that used to be ambient global state
//! (configuration, feature toggles, auth data, children cache) lives here and
//! is handed to each component's constructor.

use crate::auth::AuthStore;
use crate::config::ShellConfig;
use crate::navigation::{assign_ids, AccessFilter, AuthState, ChildrenCache, FeatureToggles, NodeId};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Debug)]
pub struct AppContext {
    config: RefCell<Rc<ShellConfig>>,
    pub toggles: FeatureToggles,
    pub auth: AuthStore,
    pub children_cache: ChildrenCache,
}

impl AppContext {
    pub fn new(config: ShellConfig) -> Rc<Self> {
        let toggles = FeatureToggles::new(&config.settings.feature_toggles.initial);
        Rc::new(Self {
            config: RefCell::new(Rc::new(prepare(config))),
            toggles,
            auth: AuthStore::default(),
            children_cache: ChildrenCache::new(),
        })
    }

    /// Snapshot of the current configuration.
    pub fn config(&self) -> Rc<ShellConfig> {
        self.config.borrow().clone()
    }

    /// Replace the configuration; cached children become stale.
    pub fn set_config(&self, config: ShellConfig) {
        for toggle in &config.settings.feature_toggles.initial {
            self.toggles.set(toggle);
        }
        *self.config.borrow_mut() = Rc::new(prepare(config));
        self.children_cache.clear();
    }

    pub fn auth_state(&self) -> AuthState {
        self.auth.state(&self.config().auth)
    }

    pub fn access_filter<'a>(&'a self, config: &'a ShellConfig) -> AccessFilter<'a> {
        AccessFilter::new(&self.toggles, config.navigation.node_accessibility_resolver.as_ref())
    }
}

fn prepare(mut config: ShellConfig) -> ShellConfig {
    assign_ids(&mut config.navigation.nodes, &NodeId::root());
    config
}
