//! FrameLifecycleManager
//!
//! Decides per navigation whether the active frame of a slot is reused,
//! a pooled view-group frame is promoted, or a new frame is created, and
//! retires the previous frame (hidden if its view group is cached,
//! removed otherwise).
//!
//! ```text
//! mount(slot, request)
//!   │
//!   ├── go-back target on top of the preserved stack?  → restore
//!   ├── current frame reusable and handshake ok?       → luigi.navigate + navigate-ok timer
//!   ├── retire current (hide cached vg / remove)
//!   ├── not isolated, pooled frame with same vg?       → promote + luigi.navigate
//!   └── create (sandbox, allow, interceptor, loading indicator, page-error timer)
//! ```

use super::factory::{create_iframe, create_web_component};
use super::handle::{ClientMeta, FrameConfig, FrameHandle, FrameId, FrameKind, Slot};
use super::message::{FramePayload, Outbound};
use super::surface::FrameSurface;
use crate::clock::TimerQueue;
use crate::config::ShellConfig;
use crate::connector::Connector;
use crate::context::AppContext;
use crate::core::paths::frames::{MIN_HANDSHAKE_CLIENT_VERSION, PRELOAD_BATCH_SIZE};
use crate::core::url::{url_origin, url_without_hash};
use crate::navigation::{Context, NavigationNode};
use std::cell::{Cell, RefCell};
use std::collections::{BTreeMap, BTreeSet};
use std::rc::Rc;

/// Timer payloads owned by the lifecycle manager.
#[derive(Debug, Clone, PartialEq)]
pub enum FrameTimer {
    NavigateOk { slot: Slot, frame: FrameId },
    PageError { slot: Slot, frame: FrameId },
}

/// Everything a frame needs for one navigation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MountRequest {
    pub node: NavigationNode,
    pub previous_node: Option<NavigationNode>,
    /// Substituted view URL.
    pub view_url: String,
    pub payload: FramePayload,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MountOutcome {
    Reused(FrameId),
    Pooled(FrameId),
    Created(FrameId),
    Restored(FrameId),
}

impl MountOutcome {
    pub fn frame(&self) -> FrameId {
        match *self {
            MountOutcome::Reused(id)
            | MountOutcome::Pooled(id)
            | MountOutcome::Created(id)
            | MountOutcome::Restored(id) => id,
        }
    }
}

#[derive(Debug, Clone)]
struct PreservedView {
    frame: FrameId,
    slot: Slot,
    path: String,
    go_back_context: Option<Context>,
}

/// `true` when the frame must not be trusted with a reuse navigation.
pub fn handshake_failed(meta: &ClientMeta, no_client_check: bool) -> bool {
    if no_client_check {
        return false;
    }
    match meta.init_ok {
        None => true,
        Some(true) => false,
        Some(false) => meta
            .client_version
            .as_deref()
            .is_some_and(|v| version_at_least(v, MIN_HANDSHAKE_CLIENT_VERSION)),
    }
}

fn version_parts(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            digits.parse().unwrap_or(0)
        })
        .collect()
}

pub fn version_at_least(version: &str, minimum: &str) -> bool {
    let mut v = version_parts(version);
    let mut m = version_parts(minimum);
    let len = v.len().max(m.len());
    v.resize(len, 0);
    m.resize(len, 0);
    v >= m
}

/// Isolation for one side of a transition: an explicit node flag wins,
/// otherwise the global default applies unless both sides share a view group.
fn side_isolated(node: Option<&NavigationNode>, isolate_all: bool, same_view_group: bool) -> bool {
    match node.and_then(|n| n.isolate_view) {
        Some(flag) => flag,
        None => isolate_all && !same_view_group,
    }
}

pub fn is_isolated(previous: Option<&NavigationNode>, next: &NavigationNode, isolate_all: bool) -> bool {
    let same_view_group = match (previous.and_then(|p| p.view_group.as_deref()), next.view_group.as_deref()) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    };
    side_isolated(previous, isolate_all, same_view_group) || side_isolated(Some(next), isolate_all, same_view_group)
}

/// Same URL (ignoring the hash) without view groups, or same non-empty
/// view group; the origin must match either way.
pub fn can_reuse_frame(current: &FrameHandle, next_view_url: &str, next_view_group: Option<&str>) -> bool {
    let same_origin = url_origin(&current.view_url) == url_origin(next_view_url);
    let same_url = url_without_hash(&current.view_url) == url_without_hash(next_view_url)
        && current.vg.is_none()
        && next_view_group.is_none();
    let same_view_group = match (current.vg.as_deref(), next_view_group) {
        (Some(a), Some(b)) => !a.is_empty() && a == b,
        _ => false,
    };
    same_origin && (same_url || same_view_group)
}

pub struct FrameLifecycleManager {
    ctx: Rc<AppContext>,
    connector: Rc<dyn Connector>,
    surface: Rc<dyn FrameSurface>,
    timers: Rc<TimerQueue<FrameTimer>>,
    handles: RefCell<BTreeMap<FrameId, FrameHandle>>,
    configs: RefCell<BTreeMap<Slot, FrameConfig>>,
    requests: RefCell<BTreeMap<Slot, MountRequest>>,
    preserved: RefCell<Vec<PreservedView>>,
    destroyed_listeners: RefCell<Vec<Box<dyn Fn(FrameId)>>>,
    next_id: Cell<u64>,
}

impl FrameLifecycleManager {
    pub fn new(ctx: Rc<AppContext>, connector: Rc<dyn Connector>, timers: Rc<TimerQueue<FrameTimer>>) -> Self {
        let surface = connector.container_wrapper();
        Self {
            ctx,
            connector,
            surface,
            timers,
            handles: RefCell::new(BTreeMap::new()),
            configs: RefCell::new(BTreeMap::new()),
            requests: RefCell::new(BTreeMap::new()),
            preserved: RefCell::new(Vec::new()),
            destroyed_listeners: RefCell::new(Vec::new()),
            next_id: Cell::new(1),
        }
    }

    /// Called with the id of every frame removed from the surface.
    pub fn on_destroyed(&self, f: impl Fn(FrameId) + 'static) {
        self.destroyed_listeners.borrow_mut().push(Box::new(f));
    }

    pub fn surface(&self) -> Rc<dyn FrameSurface> {
        self.surface.clone()
    }

    pub fn frame_config(&self, slot: Slot) -> FrameConfig {
        self.configs.borrow().get(&slot).cloned().unwrap_or_default()
    }

    pub fn active_frame(&self, slot: Slot) -> Option<FrameId> {
        self.configs.borrow().get(&slot).and_then(|c| c.iframe)
    }

    pub fn handle(&self, id: FrameId) -> Option<FrameHandle> {
        self.handles.borrow().get(&id).cloned()
    }

    pub fn handles(&self) -> Vec<FrameHandle> {
        self.handles.borrow().values().cloned().collect()
    }

    pub fn slot_of(&self, id: FrameId) -> Option<Slot> {
        self.handles.borrow().get(&id).map(|h| h.slot)
    }

    /// Depth of the preserved-view (go-back) stack.
    pub fn view_stack_size(&self) -> usize {
        self.preserved.borrow().len()
    }

    pub fn post(&self, id: FrameId, message: Outbound) {
        tracing::trace!(frame = %id, msg = message.name(), "post");
        self.surface.post_message(id, message.to_wire());
    }

    fn with_config<R>(&self, slot: Slot, f: impl FnOnce(&mut FrameConfig) -> R) -> R {
        let mut configs = self.configs.borrow_mut();
        f(configs.entry(slot).or_default())
    }

    fn with_handle(&self, id: FrameId, f: impl FnOnce(&mut FrameHandle)) {
        if let Some(handle) = self.handles.borrow_mut().get_mut(&id) {
            f(handle);
        }
    }

    fn next_frame_id(&self) -> FrameId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        FrameId(id)
    }

    fn clear_timers(&self, slot: Slot) {
        let (timeout, page_error) = self.with_config(slot, |c| (c.timeout_handle.take(), c.page_error_handle.take()));
        for id in timeout.into_iter().chain(page_error) {
            self.timers.cancel(id);
        }
    }

    fn payload_for(&self, request: &MountRequest) -> FramePayload {
        let mut payload = request.payload.clone();
        payload.internal.view_stack_size = self.view_stack_size();
        payload.internal.client_permissions = request.node.client_permissions.clone();
        payload
    }

    fn record_navigation(&self, id: FrameId, request: &MountRequest) {
        self.with_handle(id, |h| {
            h.view_url = request.view_url.clone();
            h.current_node = request.node.clone();
            h.path_params = request.payload.path_params.clone();
            h.node_params = request.payload.node_params.clone();
            h.context = request.payload.context.clone();
            h.client_permissions = request.node.client_permissions.clone();
        });
    }

    pub fn init_handshake_failed(&self, slot: Slot) -> bool {
        let Some(handle) = self.active_frame(slot).and_then(|id| self.handle(id)) else {
            return true;
        };
        let config = self.ctx.config();
        let no_client_check = handle
            .vg
            .as_deref()
            .and_then(|vg| config.view_group_settings(vg))
            .is_some_and(|s| s.no_client_check);
        handshake_failed(&handle.luigi, no_client_check)
    }

    /// Mount `request` into `slot`.
    pub fn mount(&self, slot: Slot, request: MountRequest) -> MountOutcome {
        self.clear_timers(slot);
        let config = self.ctx.config();
        self.requests.borrow_mut().insert(slot, request.clone());
        self.with_config(slot, |c| {
            c.isolate_all_views = config.navigation.defaults.isolate_view;
            c.is_fallback_frame = false;
        });

        if let Some(id) = self.go_back_target(slot) {
            return self.restore_preserved(slot, id, &request);
        }

        if slot != Slot::Main || request.node.is_webcomponent() {
            self.retire(slot, &config, slot != Slot::Main);
            return MountOutcome::Created(self.create(slot, &request, &config));
        }

        let isolated = is_isolated(
            request.previous_node.as_ref(),
            &request.node,
            config.navigation.defaults.isolate_view,
        );

        if let Some(current) = self.active_frame(slot).and_then(|id| self.handle(id)) {
            let reusable = current.kind == FrameKind::Iframe
                && !isolated
                && can_reuse_frame(&current, &request.view_url, request.node.view_group.as_deref());
            let failed = self.init_handshake_failed(slot);
            if reusable && !failed {
                self.navigate_existing(slot, current.id, &request, &config);
                return MountOutcome::Reused(current.id);
            }
            if reusable {
                tracing::info!(frame = %current.id, "no handshake from frame, replacing it");
            }
            self.retire(slot, &config, reusable);
        }

        if !isolated {
            if let Some(vg) = request.node.view_group.as_deref() {
                if let Some(id) = self.find_pooled(slot, vg) {
                    tracing::debug!(frame = %id, vg, "promoting pooled frame");
                    self.surface.set_visible(id, true);
                    self.surface.move_to_front(id);
                    self.with_config(slot, |c| c.iframe = Some(id));
                    self.navigate_existing(slot, id, &request, &config);
                    return MountOutcome::Pooled(id);
                }
            }
        }

        MountOutcome::Created(self.create(slot, &request, &config))
    }

    fn find_pooled(&self, slot: Slot, vg: &str) -> Option<FrameId> {
        let handles = self.handles.borrow();
        self.surface.frames(slot).into_iter().find(|id| {
            handles
                .get(id)
                .is_some_and(|h| h.kind == FrameKind::Iframe && !h.pv && h.vg.as_deref() == Some(vg))
        })
    }

    fn navigate_existing(&self, slot: Slot, id: FrameId, request: &MountRequest, config: &ShellConfig) {
        self.record_navigation(id, request);
        self.with_handle(id, |h| h.luigi.next_view_url = Some(request.view_url.clone()));
        self.post(
            id,
            Outbound::Navigate { view_url: request.view_url.clone(), payload: self.payload_for(request) },
        );
        let timer = self
            .timers
            .schedule(config.settings.navigate_ok_timeout, FrameTimer::NavigateOk { slot, frame: id });
        self.with_config(slot, |c| {
            c.navigate_ok = None;
            c.timeout_handle = Some(timer);
        });
    }

    /// Take the active frame out of the slot: cached view groups are
    /// hidden and told they are inactive, everything else is removed.
    fn retire(&self, slot: Slot, config: &ShellConfig, force_remove: bool) {
        let Some(id) = self.with_config(slot, |c| c.iframe.take()) else {
            return;
        };
        let Some(handle) = self.handle(id) else {
            self.destroy(id);
            return;
        };
        let cached = !force_remove
            && handle.kind == FrameKind::Iframe
            && handle.vg.as_deref().is_some_and(|vg| config.can_cache(vg));

        if cached {
            self.surface.set_visible(id, false);
            self.post(
                id,
                Outbound::Inactive {
                    payload: FramePayload {
                        context: handle.context.clone(),
                        node_params: handle.node_params.clone(),
                        path_params: handle.path_params.clone(),
                        ..Default::default()
                    },
                },
            );
        } else {
            self.destroy(id);
        }
    }

    fn destroy(&self, id: FrameId) {
        let was_loading = self.handles.borrow_mut().remove(&id).is_some_and(|h| h.loading);
        self.surface.remove(id);
        if was_loading {
            self.connector.hide_loading_indicator();
        }
        for listener in self.destroyed_listeners.borrow().iter() {
            listener(id);
        }
    }

    fn create(&self, slot: Slot, request: &MountRequest, config: &ShellConfig) -> FrameId {
        let id = self.next_frame_id();
        let node = &request.node;

        let (element, mut handle) = if node.is_webcomponent() {
            let element = create_web_component(id, &request.view_url, node, &request.payload.context, config);
            let mut handle = FrameHandle::new(id, FrameKind::WebComponent, slot, &request.view_url, node);
            handle.ready = true;
            handle.luigi.init_ok = Some(true);
            (element, handle)
        } else {
            let element = create_iframe(id, &request.view_url, node, config);
            (element, FrameHandle::new(id, FrameKind::Iframe, slot, &request.view_url, node))
        };
        handle.path_params = request.payload.path_params.clone();
        handle.node_params = request.payload.node_params.clone();
        handle.context = request.payload.context.clone();
        handle.loading = handle.kind == FrameKind::Iframe && node.loading_indicator_enabled();
        let show_loading = handle.loading;

        tracing::debug!(frame = %id, ?slot, url = %request.view_url, "creating frame");
        self.handles.borrow_mut().insert(id, handle);
        self.surface.mount(slot, element);

        let page_error = node
            .page_error_handler
            .as_ref()
            .filter(|h| h.timeout > 0)
            .map(|h| self.timers.schedule(h.timeout, FrameTimer::PageError { slot, frame: id }));
        self.with_config(slot, |c| {
            c.iframe = Some(id);
            c.navigate_ok = None;
            c.page_error_handle = page_error;
        });

        if show_loading {
            self.connector.show_loading_indicator();
        }
        id
    }

    /// Remove a slot's frame entirely (closing a modal or drawer).
    pub fn close_slot(&self, slot: Slot) {
        self.clear_timers(slot);
        if let Some(id) = self.with_config(slot, |c| c.iframe.take()) {
            self.destroy(id);
        }
        self.configs.borrow_mut().remove(&slot);
        self.requests.borrow_mut().remove(&slot);
    }

    /// Dispatch a fired timer. Returns a path to navigate to, if any.
    pub fn on_timer(&self, timer: FrameTimer) -> Option<String> {
        match timer {
            FrameTimer::NavigateOk { slot, frame } => {
                self.navigate_ok_expired(slot, frame);
                None
            }
            FrameTimer::PageError { slot, frame } => self.page_error_expired(slot, frame),
        }
    }

    fn navigate_ok_expired(&self, slot: Slot, frame: FrameId) {
        let (active, navigate_ok) = self.with_config(slot, |c| {
            c.timeout_handle = None;
            (c.iframe, c.navigate_ok)
        });
        if active != Some(frame) || navigate_ok.is_some() {
            return;
        }

        tracing::info!(frame = %frame, "no navigate.ok received, replacing frame");
        self.destroy(frame);
        self.with_config(slot, |c| {
            c.iframe = None;
            c.is_fallback_frame = true;
        });
        let Some(request) = self.requests.borrow().get(&slot).cloned() else {
            return;
        };
        let config = self.ctx.config();
        self.create(slot, &request, &config);
    }

    fn page_error_expired(&self, slot: Slot, frame: FrameId) -> Option<String> {
        self.with_config(slot, |c| c.page_error_handle = None);
        let handle = self.handle(frame)?;
        if !handle.loading {
            return None;
        }
        let node = handle.current_node.clone();
        let handler = node.page_error_handler.clone()?;

        if let Some(error_url) = handler.view_url.filter(|u| !u.is_empty()) {
            tracing::info!(frame = %frame, url = %error_url, "frame did not load in time, showing error view");
            let mut request = self.requests.borrow().get(&slot).cloned().unwrap_or_default();
            request.view_url = error_url;
            request.node.page_error_handler = None;
            self.with_config(slot, |c| c.iframe = None);
            self.destroy(frame);
            let config = self.ctx.config();
            self.create(slot, &request, &config);
            return None;
        }

        self.hide_loading(frame);
        if let Some(error_fn) = handler.error_fn {
            (error_fn.0)(&node);
            return None;
        }
        let target = handler.redirect_path.unwrap_or_else(|| "/".to_string());
        tracing::warn!(frame = %frame, redirect = %target, "frame did not load in time, redirecting");
        Some(target)
    }

    /// Load event from the host element.
    pub fn on_loaded(&self, id: FrameId) {
        self.with_handle(id, |h| h.ready = true);
    }

    pub fn on_initialized(&self, id: FrameId, client_version: Option<String>) {
        self.with_handle(id, |h| {
            h.luigi.init_ok = Some(true);
            if client_version.is_some() {
                h.luigi.client_version = client_version;
            }
        });
        self.hide_loading(id);
    }

    /// A client asked for its context: record its version and answer with `luigi.init`.
    pub fn on_context_requested(&self, id: FrameId, client_version: Option<String>) -> bool {
        let Some(handle) = self.handle(id) else {
            return false;
        };
        self.with_handle(id, |h| {
            h.luigi.init_ok = Some(false);
            h.luigi.client_version = client_version;
        });
        let mut payload = FramePayload {
            context: handle.context,
            node_params: handle.node_params,
            path_params: handle.path_params,
            ..Default::default()
        };
        payload.internal.view_stack_size = self.view_stack_size();
        payload.internal.client_permissions = handle.client_permissions;
        payload.internal.modal = matches!(handle.slot, Slot::Modal(_)).then_some(true);
        self.post(id, Outbound::Init { payload });
        true
    }

    pub fn on_navigate_ok(&self, id: FrameId, meta: ClientMeta) {
        self.with_handle(id, |h| {
            h.luigi.init_ok = Some(meta.init_ok.unwrap_or(true));
            if meta.client_version.is_some() {
                h.luigi.client_version = meta.client_version.clone();
            }
        });
        let confirmed: Vec<Slot> = self
            .configs
            .borrow()
            .iter()
            .filter(|(_, c)| c.iframe == Some(id))
            .map(|(slot, _)| *slot)
            .collect();
        for slot in confirmed {
            let timer = self.with_config(slot, |c| {
                c.navigate_ok = Some(true);
                c.timeout_handle.take()
            });
            if let Some(timer) = timer {
                self.timers.cancel(timer);
            }
        }
        self.hide_loading(id);
    }

    pub fn show_loading(&self, id: FrameId) {
        self.with_handle(id, |h| h.loading = true);
        self.connector.show_loading_indicator();
    }

    pub fn hide_loading(&self, id: FrameId) {
        let was_loading = {
            let mut handles = self.handles.borrow_mut();
            handles.get_mut(&id).is_some_and(|h| std::mem::replace(&mut h.loading, false))
        };
        if was_loading {
            self.connector.hide_loading_indicator();
        }
    }

    /// Keep the slot's active frame on the go-back stack; the next mount
    /// gets a fresh frame.
    pub fn preserve_view(&self, slot: Slot, return_path: &str) -> bool {
        self.clear_timers(slot);
        let Some(id) = self.with_config(slot, |c| c.iframe.take()) else {
            return false;
        };
        self.with_handle(id, |h| h.pv = true);
        self.surface.set_visible(id, false);
        self.preserved.borrow_mut().push(PreservedView {
            frame: id,
            slot,
            path: return_path.to_string(),
            go_back_context: None,
        });
        true
    }

    /// Drop the active frame and make the top preserved view the slot's
    /// target. Returns the path to navigate back to.
    pub fn go_back(&self, go_back_context: Option<Context>) -> Option<String> {
        let (slot, frame, path) = {
            let mut preserved = self.preserved.borrow_mut();
            let top = preserved.last_mut()?;
            top.go_back_context = go_back_context;
            (top.slot, top.frame, top.path.clone())
        };
        self.clear_timers(slot);
        if let Some(current) = self.with_config(slot, |c| c.iframe.replace(frame)) {
            if current != frame {
                self.destroy(current);
            }
        }
        Some(path)
    }

    fn go_back_target(&self, slot: Slot) -> Option<FrameId> {
        let active = self.active_frame(slot)?;
        let preserved = self.preserved.borrow();
        let top = preserved.last()?;
        (top.frame == active && top.slot == slot).then_some(active)
    }

    fn restore_preserved(&self, slot: Slot, id: FrameId, request: &MountRequest) -> MountOutcome {
        let entry = self.preserved.borrow_mut().pop();
        let go_back_context = entry.and_then(|e| e.go_back_context);

        self.with_handle(id, |h| h.pv = false);
        self.record_navigation(id, request);
        self.surface.set_visible(id, true);
        self.surface.move_to_front(id);

        let mut payload = self.payload_for(request);
        if let Some(extra) = go_back_context {
            payload.context.extend(extra);
        }
        payload.internal.is_navigate_back = true;
        tracing::debug!(frame = %id, ?slot, "restoring preserved view");
        self.post(id, Outbound::Navigate { view_url: request.view_url.clone(), payload });
        MountOutcome::Restored(id)
    }

    /// Create hidden frames for view groups with a `preloadUrl`, a few at
    /// a time. At startup only `loadOnStartup` groups qualify.
    pub fn preload_view_groups(&self, startup: bool) -> Vec<FrameId> {
        let config = self.ctx.config();
        if !config.navigation.preload_view_groups {
            return Vec::new();
        }
        let existing: BTreeSet<String> = {
            let handles = self.handles.borrow();
            self.surface
                .frames(Slot::Main)
                .iter()
                .filter_map(|id| handles.get(id).and_then(|h| h.vg.clone()))
                .collect()
        };

        let mut created = Vec::new();
        for (vg, settings) in &config.navigation.view_group_settings {
            if created.len() >= PRELOAD_BATCH_SIZE {
                break;
            }
            let Some(url) = settings.preload_url.as_deref().filter(|u| !u.is_empty()) else {
                continue;
            };
            if existing.contains(vg) || (startup && !settings.load_on_startup) {
                continue;
            }
            let node = NavigationNode {
                view_group: Some(vg.clone()),
                view_url: Some(url.to_string()),
                ..Default::default()
            };
            let id = self.next_frame_id();
            let mut element = create_iframe(id, url, &node, &config);
            element.visible = false;
            self.handles
                .borrow_mut()
                .insert(id, FrameHandle::new(id, FrameKind::Iframe, Slot::Main, url, &node));
            self.surface.mount(Slot::Main, element);
            tracing::debug!(frame = %id, vg = %vg, "preloaded view group");
            created.push(id);
        }
        created
    }

    /// Remove every main-slot frame except the active one and forget the
    /// go-back stack.
    pub fn remove_inactive_frames(&self) {
        let active = self.active_frame(Slot::Main);
        for id in self.surface.frames(Slot::Main) {
            if Some(id) != active {
                self.destroy(id);
            }
        }
        self.preserved.borrow_mut().retain(|p| p.slot != Slot::Main);
    }
}
