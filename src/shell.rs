//! Shell - the assembled micro-frontend host
//!
//! Owns one instance of every component, wired through constructors. The
//! host page feeds it history events, frame messages, load events and
//! elapsed time; everything visible goes out through the connector.

use crate::auth::{AuthData, Authenticator, IdpProvider};
use crate::bridge::{CommunicationBridge, InboundEvent};
use crate::clock::TimerQueue;
use crate::config::ShellConfig;
use crate::connector::{Connector, ModalSettings};
use crate::context::AppContext;
use crate::error::{AuthError, ShellError, ShellResult};
use crate::frames::{FrameId, FrameLifecycleManager, FrameTimer, Outbound};
use crate::modal::ModalStack;
use crate::navigation::PathResolver;
use crate::routing::{History, NavigateOptions, RouteOutcome, RoutingController};
use crate::ux::Ux;
use serde_json::Value;
use std::rc::Rc;

pub struct Shell {
    ctx: Rc<AppContext>,
    connector: Rc<dyn Connector>,
    timers: Rc<TimerQueue<FrameTimer>>,
    frames: Rc<FrameLifecycleManager>,
    modals: Rc<ModalStack>,
    ux: Rc<Ux>,
    routing: Rc<RoutingController>,
    bridge: CommunicationBridge,
    auth: Authenticator,
}

impl Shell {
    pub fn new(config: ShellConfig, connector: Rc<dyn Connector>, history: Rc<dyn History>) -> Self {
        let ctx = AppContext::new(config);
        let timers = Rc::new(TimerQueue::new());
        let frames = Rc::new(FrameLifecycleManager::new(ctx.clone(), connector.clone(), timers.clone()));
        let modals = Rc::new(ModalStack::new());
        let ux = Rc::new(Ux::new(connector.clone()));
        let dirty = ux.clone();
        frames.on_destroyed(move |id| dirty.set_dirty(id, false));
        let routing = Rc::new(RoutingController::new(
            ctx.clone(),
            history,
            connector.clone(),
            frames.clone(),
            modals.clone(),
            ux.clone(),
        ));
        let bridge =
            CommunicationBridge::new(ctx.clone(), routing.clone(), frames.clone(), ux.clone(), connector.clone());
        Self { ctx, connector, timers, frames, modals, ux, routing, bridge, auth: Authenticator::default() }
    }

    /// Render the layout, preload startup view groups, log in if the
    /// configuration asks for it, then route the current location.
    pub async fn start(&self) -> Result<RouteOutcome, AuthError> {
        self.connector.render_main_layout();
        let preloaded = self.frames.preload_view_groups(true);
        if !preloaded.is_empty() {
            tracing::debug!(count = preloaded.len(), "preloaded view groups");
        }

        let config = self.ctx.config();
        if config.auth.provider.is_some() && !config.auth.disable_auto_login && !self.ctx.auth.is_logged_in() {
            self.auth.login(&config.auth, &self.ctx.auth).await?;
        }
        Ok(self.routing.handle_route_change().await)
    }

    pub fn context(&self) -> Rc<AppContext> {
        self.ctx.clone()
    }

    pub fn config(&self) -> Rc<ShellConfig> {
        self.ctx.config()
    }

    /// Swap the configuration and re-route the current location.
    pub async fn set_config(&self, config: ShellConfig) -> RouteOutcome {
        self.ctx.set_config(config);
        self.routing.handle_route_change().await
    }

    pub fn resolver(&self) -> &PathResolver {
        self.routing.resolver()
    }

    pub fn routing(&self) -> &RoutingController {
        &self.routing
    }

    pub fn frames(&self) -> &FrameLifecycleManager {
        &self.frames
    }

    pub fn modals(&self) -> &ModalStack {
        &self.modals
    }

    pub fn ux(&self) -> &Ux {
        &self.ux
    }

    pub fn timers(&self) -> &TimerQueue<FrameTimer> {
        &self.timers
    }

    /// hashchange / popstate.
    pub async fn on_location_change(&self) -> RouteOutcome {
        self.routing.handle_route_change().await
    }

    /// Host-initiated navigation; unsaved changes are confirmed first.
    pub async fn navigate(&self, path: &str) -> RouteOutcome {
        self.navigate_with(path, NavigateOptions::default()).await
    }

    pub async fn navigate_with(&self, path: &str, options: NavigateOptions) -> RouteOutcome {
        if !self.ux.confirm_discard_changes().await {
            return RouteOutcome::Vetoed;
        }
        self.routing.navigate(path, options).await
    }

    pub async fn open_as_modal(&self, path: &str, settings: ModalSettings) -> RouteOutcome {
        self.routing.navigate(path, NavigateOptions::modal(settings)).await
    }

    pub async fn open_as_drawer(&self, path: &str, settings: ModalSettings) -> RouteOutcome {
        self.routing.navigate(path, NavigateOptions::drawer(settings)).await
    }

    pub async fn close_modals(&self) {
        self.routing.close_modals().await;
    }

    pub async fn close_modal(&self) -> bool {
        self.routing.close_top_modal().await
    }

    pub fn get_modal_settings(&self) -> ModalSettings {
        self.modals.get_modal_settings()
    }

    pub fn update_modal_settings(&self, partial: ModalSettings) -> ShellResult<()> {
        if self.modals.update_modal_settings(partial) {
            Ok(())
        } else {
            Err(ShellError::NoModal)
        }
    }

    /// A frame posted a message.
    pub async fn dispatch(&self, source: FrameId, event: InboundEvent) -> ShellResult<()> {
        self.bridge.handle(source, event).await
    }

    pub async fn dispatch_wire(&self, source: FrameId, raw: Value) -> ShellResult<()> {
        self.bridge.handle_wire(source, raw).await
    }

    pub fn on_custom_message(&self, id: impl Into<String>, f: impl Fn(FrameId, &Value) + 'static) {
        self.bridge.on_custom_message(id, f);
    }

    /// Post a `custom` message to a frame; `message` carries the listener `id`.
    pub fn send_custom_message(&self, frame: FrameId, message: Value) -> ShellResult<()> {
        if self.frames.handle(frame).is_none() {
            return Err(ShellError::UnknownFrame(frame.to_string()));
        }
        self.frames.post(frame, Outbound::Custom { data: message });
        Ok(())
    }

    /// The host element of a frame fired `load`.
    pub fn on_frame_loaded(&self, id: FrameId) {
        self.frames.on_loaded(id);
    }

    /// Advance the timer clock by `elapsed_ms` and act on what fired.
    pub async fn advance_timers(&self, elapsed_ms: u64) -> Vec<RouteOutcome> {
        let mut outcomes = Vec::new();
        for fired in self.timers.advance(elapsed_ms) {
            tracing::trace!(timer = fired.id, deadline = fired.deadline_ms, "timer fired");
            if let Some(path) = self.frames.on_timer(fired.payload) {
                outcomes.push(self.routing.navigate(&path, NavigateOptions::default()).await);
            }
        }
        outcomes
    }

    /// Create hidden frames for the next batch of preloadable view groups.
    pub fn preload(&self) -> Vec<FrameId> {
        self.frames.preload_view_groups(false)
    }

    pub fn register_idp_provider(&self, name: impl Into<String>, provider: Rc<dyn IdpProvider>) {
        self.auth.register_provider(name, provider);
    }

    pub async fn login(&self) -> Result<Option<AuthData>, AuthError> {
        let config = self.ctx.config();
        let data = self.auth.login(&config.auth, &self.ctx.auth).await?;
        if data.is_some() {
            self.ctx.children_cache.clear();
            self.routing.handle_route_change().await;
        }
        Ok(data)
    }

    /// Log out, drop every inactive frame and cached children, re-route.
    pub async fn logout(&self) -> Result<(), AuthError> {
        let config = self.ctx.config();
        let result = self.auth.logout(&config.auth, &self.ctx.auth).await;
        self.frames.remove_inactive_frames();
        self.ctx.children_cache.clear();
        self.routing.handle_route_change().await;
        result
    }
}
