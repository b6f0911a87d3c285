//! RoutingController - one route-change pass per history event
//!
//! ```text
//! Idle ──event──► Resolving ──redirect──► Redirecting ──► (next pass)
//!                    │
//!                    ├── skip / not found / denied / vetoed / superseded
//!                    └── render navs, node-change hook, commit, mount ──► Active
//! ```
//!
//! A pass that awaits (children resolvers, `onNodeActivation`) checks the
//! navigation epoch when it resumes; a newer event wins and the stale pass
//! ends before touching navs, history or frames.

use super::history::History;
use super::route::{
    append_modal_params, filter_node_params, matches_skip_pattern, modal_from_query, search_params,
    strip_modal_params, Route,
};
use crate::connector::{AlertSettings, Connector, ModalSettings};
use crate::context::AppContext;
use crate::core::paths::PAGE_NOT_FOUND_TEXT;
use crate::core::template::{substitute_view_url, ViewUrlData};
use crate::core::url::{add_leading_slash, parse_query, split_path_query, trim_slashes};
use crate::core::value::Hook;
use crate::frames::{FrameId, FrameLifecycleManager, FramePayload, MountOutcome, MountRequest, Slot};
use crate::modal::{ModalEntry, ModalStack};
use crate::navigation::{
    get_left_nav_data, get_tab_nav_data, get_top_nav_data, NavigationNode, Params, PathData, PathResolver,
};
use crate::ux::Ux;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteState {
    Idle,
    Resolving,
    Redirecting,
    Active,
}

/// How a route-change pass ended.
#[derive(Debug, Clone, PartialEq)]
pub enum RouteOutcome {
    /// Location matched a skip pattern.
    Skipped,
    /// A newer navigation started while this one was suspended.
    Superseded,
    Redirected(String),
    NotFound(String),
    /// `onNodeActivation` returned false.
    Vetoed,
    Committed(Option<MountOutcome>),
    Modal(FrameId),
    Drawer(FrameId),
    /// History updated without a route-change pass.
    Silent,
}

#[derive(Debug, Clone, Default)]
pub struct NavigateOptions {
    pub preserve_view: bool,
    pub modal: Option<ModalSettings>,
    pub drawer: Option<ModalSettings>,
    pub without_sync: bool,
    pub replace: bool,
}

impl NavigateOptions {
    pub fn replace() -> Self {
        Self { replace: true, ..Default::default() }
    }

    pub fn modal(settings: ModalSettings) -> Self {
        Self { modal: Some(settings), ..Default::default() }
    }

    pub fn drawer(settings: ModalSettings) -> Self {
        Self { drawer: Some(settings), ..Default::default() }
    }
}

pub struct RoutingController {
    ctx: Rc<AppContext>,
    resolver: PathResolver,
    history: Rc<dyn History>,
    connector: Rc<dyn Connector>,
    frames: Rc<FrameLifecycleManager>,
    modals: Rc<ModalStack>,
    ux: Rc<Ux>,
    state: Cell<RouteState>,
    current: RefCell<Option<Route>>,
    previous_node: RefCell<Option<NavigationNode>>,
    epoch: Cell<u64>,
}

impl RoutingController {
    pub fn new(
        ctx: Rc<AppContext>,
        history: Rc<dyn History>,
        connector: Rc<dyn Connector>,
        frames: Rc<FrameLifecycleManager>,
        modals: Rc<ModalStack>,
        ux: Rc<Ux>,
    ) -> Self {
        Self {
            resolver: PathResolver::new(ctx.clone()),
            ctx,
            history,
            connector,
            frames,
            modals,
            ux,
            state: Cell::new(RouteState::Idle),
            current: RefCell::new(None),
            previous_node: RefCell::new(None),
            epoch: Cell::new(0),
        }
    }

    pub fn state(&self) -> RouteState {
        self.state.get()
    }

    pub fn current_route(&self) -> Option<Route> {
        self.current.borrow().clone()
    }

    pub fn current_path(&self) -> String {
        self.current.borrow().as_ref().map(|r| r.path.clone()).unwrap_or_default()
    }

    pub fn resolver(&self) -> &PathResolver {
        &self.resolver
    }

    pub fn history(&self) -> Rc<dyn History> {
        self.history.clone()
    }

    /// History location for a path (with optional query).
    pub fn location_for(&self, path: &str) -> String {
        let path = add_leading_slash(path.strip_prefix('#').unwrap_or(path));
        if self.ctx.config().routing.use_hash_routing {
            format!("#{}", path)
        } else {
            path
        }
    }

    fn is_stale(&self, epoch: u64) -> bool {
        self.epoch.get() != epoch
    }

    /// Run one route-change pass for the current history location.
    pub fn handle_route_change(&self) -> LocalBoxFuture<'_, RouteOutcome> {
        async move {
            let epoch = self.epoch.get() + 1;
            self.epoch.set(epoch);
            let config = self.ctx.config();
            let raw = self.history.location();

            if matches_skip_pattern(&raw, &config.routing.skip_routing_for_url_patterns) {
                tracing::debug!(location = %raw, "routing skipped");
                return RouteOutcome::Skipped;
            }
            self.state.set(RouteState::Resolving);

            let (path, query) = split_path_query(&raw);
            let path = trim_slashes(path).to_string();
            let query_map = parse_query(query.unwrap_or(""));

            if let Some(param) = config.settings.feature_toggles.query_string_param.as_deref() {
                if let Some(list) = query_map.get(param) {
                    self.ctx.toggles.set_from_list(list);
                }
            }

            if config.routing.show_modal_path_in_url && self.modals.is_empty() {
                let params_key = config.modal_params_key();
                if let Some((modal_path, settings)) =
                    modal_from_query(&query_map, &config.routing.modal_path_param, &params_key)
                {
                    self.open_modal(&modal_path, settings, false).await;
                    if self.is_stale(epoch) {
                        return RouteOutcome::Superseded;
                    }
                }
            }

            let data = self.resolver.resolve(&path).await;
            if self.is_stale(epoch) {
                return RouteOutcome::Superseded;
            }

            if let Some(target) = self.resolver.should_redirect(&path).await {
                if self.is_stale(epoch) {
                    return RouteOutcome::Superseded;
                }
                self.state.set(RouteState::Redirecting);
                let target_with_query = match query {
                    Some(q) if !q.is_empty() => format!("{}?{}", target, q),
                    _ => target.clone(),
                };
                tracing::debug!(from = %path, to = %target, "redirecting");
                self.history.replace(&self.location_for(&target_with_query));
                self.handle_route_change().await;
                return RouteOutcome::Redirected(target);
            }

            if !data.is_existing_route {
                return self.page_not_found(&path, &data).await;
            }

            let node_params = filter_node_params(&query_map, &config.routing.node_param_prefix);
            let Some(node) = data.selected_node.clone() else {
                self.render_navs(&data);
                self.commit(&raw, &path, None, node_params);
                return RouteOutcome::Committed(None);
            };

            if let Some(hook) = &node.on_node_activation {
                let allowed = hook.evaluate(node.clone()).await;
                if self.is_stale(epoch) {
                    return RouteOutcome::Superseded;
                }
                if !allowed {
                    tracing::debug!(path = %path, "navigation vetoed by onNodeActivation");
                    self.state.set(self.settled_state());
                    return RouteOutcome::Vetoed;
                }
            }

            self.render_navs(&data);

            let previous = self.previous_node.borrow().clone();
            match &config.routing.node_change_hook {
                Hook::Set(hook) => (hook.0)(previous.as_ref(), &node),
                Hook::Invalid(value) => tracing::warn!(%value, "nodeChangeHook is not a function"),
                Hook::Unset => {}
            }
            *self.previous_node.borrow_mut() = Some(node.clone());
            self.commit(&raw, &path, Some(node.clone()), node_params.clone());

            let mounted = node.has_view().then(|| {
                let params_key = config.modal_params_key();
                let reserved = [config.routing.modal_path_param.as_str(), params_key.as_str()];
                let payload = FramePayload {
                    context: data.context.clone(),
                    node_params: node_params.clone(),
                    path_params: data.path_params.clone(),
                    search_params: search_params(&query_map, &config.routing.node_param_prefix, &reserved),
                    ..Default::default()
                };
                let view_url = view_url_for(&node, &data, &node_params);
                self.frames.mount(Slot::Main, MountRequest { node, previous_node: previous, view_url, payload })
            });
            RouteOutcome::Committed(mounted)
        }
        .boxed_local()
    }

    fn settled_state(&self) -> RouteState {
        if self.current.borrow().is_some() {
            RouteState::Active
        } else {
            RouteState::Idle
        }
    }

    fn commit(&self, raw: &str, path: &str, node: Option<NavigationNode>, node_params: Params) {
        *self.current.borrow_mut() = Some(Route {
            raw: raw.strip_prefix('#').unwrap_or(raw).to_string(),
            path: path.to_string(),
            node,
            node_params,
        });
        self.state.set(RouteState::Active);
    }

    fn render_navs(&self, data: &PathData) {
        let config = self.ctx.config();
        self.connector.render_top_nav(&get_top_nav_data(&config, data));
        self.connector.render_left_nav(&get_left_nav_data(data));
        self.connector.render_tab_nav(&get_tab_nav_data(data));
    }

    async fn page_not_found(&self, path: &str, data: &PathData) -> RouteOutcome {
        let config = self.ctx.config();
        tracing::warn!(path = %path, matched = %data.matched_path, "route not found");
        match &config.routing.page_not_found_handler {
            Some(handler) => {
                if let Some(target) = (handler.0)(path) {
                    self.history.replace(&self.location_for(&target));
                    self.handle_route_change().await;
                }
            }
            None => {
                self.ux.notify(&AlertSettings::error(format!("{}: {}", PAGE_NOT_FOUND_TEXT, path)));
                self.history.replace(&self.location_for(&data.matched_path));
                self.handle_route_change().await;
            }
        }
        RouteOutcome::NotFound(path.to_string())
    }

    /// Navigate to `path` (which may carry a query).
    pub async fn navigate(&self, path: &str, options: NavigateOptions) -> RouteOutcome {
        if let Some(settings) = options.modal {
            return self.open_modal(path, settings, true).await;
        }
        if let Some(settings) = options.drawer {
            return self.open_drawer(path, settings).await;
        }
        if !self.modals.is_empty() {
            self.close_modals().await;
        }
        if options.preserve_view {
            let return_path = self.current_route().map(|r| r.raw).unwrap_or_default();
            self.frames.preserve_view(Slot::Main, &return_path);
        }

        let location = self.location_for(path);
        if options.replace {
            self.history.replace(&location);
        } else {
            self.history.push(&location);
        }
        if options.without_sync {
            let prefix = self.ctx.config().routing.node_param_prefix.clone();
            let mut route = Route::parse(&location, &prefix);
            route.node = self.current.borrow().as_ref().and_then(|r| r.node.clone());
            *self.current.borrow_mut() = Some(route);
            return RouteOutcome::Silent;
        }
        self.handle_route_change().await
    }

    /// Open `path` in a new modal on top of the stack.
    pub async fn open_modal(&self, path: &str, settings: ModalSettings, write_url: bool) -> RouteOutcome {
        let config = self.ctx.config();
        let (modal_path, query) = split_path_query(path);
        let modal_path = trim_slashes(modal_path).to_string();
        let data = self.resolver.resolve(&modal_path).await;
        let node = match data.selected_node.clone() {
            Some(node) if data.is_existing_route && node.has_view() => node,
            _ => {
                tracing::warn!(path = %modal_path, "modal path does not resolve to a view");
                return RouteOutcome::NotFound(modal_path);
            }
        };

        let mut settings = settings;
        if !settings.contains_key("title") {
            if let Some(label) = &node.label {
                settings.insert("title".into(), Value::String(label.clone()));
            }
        }

        let node_params = filter_node_params(&parse_query(query.unwrap_or("")), &config.routing.node_param_prefix);
        let mut payload = FramePayload {
            context: data.context.clone(),
            node_params: node_params.clone(),
            path_params: data.path_params.clone(),
            ..Default::default()
        };
        payload.internal.modal = Some(true);

        let slot = Slot::Modal(self.modals.len());
        let view_url = view_url_for(&node, &data, &node_params);
        let frame = self.frames.mount(slot, MountRequest { node, previous_node: None, view_url, payload }).frame();
        self.connector.render_modal(frame, &settings);

        let frames = self.frames.clone();
        self.modals.register_modal(ModalEntry::new(settings.clone()).with_on_internal_close(move || {
            frames.close_slot(slot);
            Ok(())
        }));

        if write_url && config.routing.show_modal_path_in_url {
            let current = self.history.location();
            let updated = append_modal_params(
                current.strip_prefix('#').unwrap_or(&current),
                &config.routing.modal_path_param,
                &config.modal_params_key(),
                &modal_path,
                &settings,
            );
            self.history.replace(&self.location_for(&updated));
        }
        RouteOutcome::Modal(frame)
    }

    pub async fn open_drawer(&self, path: &str, settings: ModalSettings) -> RouteOutcome {
        let config = self.ctx.config();
        let (drawer_path, query) = split_path_query(path);
        let drawer_path = trim_slashes(drawer_path).to_string();
        let data = self.resolver.resolve(&drawer_path).await;
        let node = match data.selected_node.clone() {
            Some(node) if data.is_existing_route && node.has_view() => node,
            _ => {
                tracing::warn!(path = %drawer_path, "drawer path does not resolve to a view");
                return RouteOutcome::NotFound(drawer_path);
            }
        };
        let node_params = filter_node_params(&parse_query(query.unwrap_or("")), &config.routing.node_param_prefix);
        let payload = FramePayload {
            context: data.context.clone(),
            node_params: node_params.clone(),
            path_params: data.path_params.clone(),
            ..Default::default()
        };
        let view_url = view_url_for(&node, &data, &node_params);
        let frame = self
            .frames
            .mount(Slot::Drawer, MountRequest { node, previous_node: None, view_url, payload })
            .frame();
        self.connector.render_drawer(frame, &settings);
        RouteOutcome::Drawer(frame)
    }

    /// Close every modal and drop the bookmarked modal keys from the URL.
    pub async fn close_modals(&self) {
        self.modals.close_modals().await;
        self.strip_modal_location();
    }

    /// Close the newest modal only.
    pub async fn close_top_modal(&self) -> bool {
        let closed = self.modals.close_top().await;
        if closed && self.modals.is_empty() {
            self.strip_modal_location();
        }
        closed
    }

    fn strip_modal_location(&self) {
        let config = self.ctx.config();
        if !config.routing.show_modal_path_in_url {
            return;
        }
        let current = self.history.location();
        let stripped = strip_modal_params(&current, &config.routing.modal_path_param, &config.modal_params_key());
        if self.location_for(&stripped) != current {
            self.history.replace(&self.location_for(&stripped));
        }
    }

    /// Write `location` without a route-change pass (node/search param updates).
    pub fn update_location(&self, path_and_query: &str, keep_browser_history: bool) {
        let location = self.location_for(path_and_query);
        if keep_browser_history {
            self.history.push(&location);
        } else {
            self.history.replace(&location);
        }
        let prefix = self.ctx.config().routing.node_param_prefix.clone();
        let mut route = Route::parse(&location, &prefix);
        route.node = self.current.borrow().as_ref().and_then(|r| r.node.clone());
        *self.current.borrow_mut() = Some(route);
    }

    /// Set the in-page anchor without a route-change pass.
    pub fn set_anchor(&self, anchor: &str) {
        let current = self.history.location();
        let stripped = current.strip_prefix('#').unwrap_or(&current);
        let base = stripped.split('#').next().unwrap_or(stripped);
        let location = format!("{}#{}", self.location_for(base), anchor.trim_start_matches('#'));
        self.history.replace(&location);
    }

    pub fn anchor(&self) -> Option<String> {
        let current = self.history.location();
        let stripped = current.strip_prefix('#').unwrap_or(&current);
        stripped.split_once('#').map(|(_, anchor)| anchor.to_string()).filter(|a| !a.is_empty())
    }

    /// Whether `path` resolves completely.
    pub async fn path_exists(&self, path: &str) -> bool {
        let data = self.resolver.resolve(path).await;
        data.is_existing_route && data.selected_node.is_some()
    }

    /// Node-change bookkeeping for callers that need it.
    pub fn previous_node(&self) -> Option<NavigationNode> {
        self.previous_node.borrow().clone()
    }
}

fn view_url_for(node: &NavigationNode, data: &PathData, node_params: &BTreeMap<String, String>) -> String {
    let template = node.view_url.as_deref().unwrap_or_default();
    substitute_view_url(
        template,
        &ViewUrlData {
            context: Some(&data.context),
            node_params: Some(node_params),
            path_params: Some(&data.path_params),
        },
    )
}
