//! CommunicationBridge - frame events into router and UX calls
//!
//! events:   inbound event catalog (serde, stable names + legacy aliases)
//! handlers: alert / confirmation handlers handed to the connector
//!
//! Each event is unwrapped and forwarded; decisions stay with the
//! router, the frame lifecycle and the UX state.

pub mod events;
pub mod handlers;

pub use events::{InboundEvent, NavigationParams, PathExistsQuery};
pub use handlers::{AlertHandler, AlertOutcome, ConfirmationHandler};

use crate::connector::Connector;
use crate::context::AppContext;
use crate::core::value::Callback;
use crate::error::{ShellError, ShellResult};
use crate::frames::{ClientMeta, FrameId, FrameLifecycleManager, Outbound};
use crate::routing::route::{add_node_params, add_search_params};
use crate::routing::{resolve_link, NavigateOptions, RoutingController};
use crate::ux::Ux;
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

pub type CustomMessageListener = dyn Fn(FrameId, &Value);

pub struct CommunicationBridge {
    ctx: Rc<AppContext>,
    routing: Rc<RoutingController>,
    frames: Rc<FrameLifecycleManager>,
    ux: Rc<Ux>,
    connector: Rc<dyn Connector>,
    listeners: RefCell<BTreeMap<String, Callback<CustomMessageListener>>>,
}

impl CommunicationBridge {
    pub fn new(
        ctx: Rc<AppContext>,
        routing: Rc<RoutingController>,
        frames: Rc<FrameLifecycleManager>,
        ux: Rc<Ux>,
        connector: Rc<dyn Connector>,
    ) -> Self {
        Self { ctx, routing, frames, ux, connector, listeners: RefCell::new(BTreeMap::new()) }
    }

    /// Listen for `custom-message` events carrying `id`.
    pub fn on_custom_message(&self, id: impl Into<String>, f: impl Fn(FrameId, &Value) + 'static) {
        self.listeners.borrow_mut().insert(id.into(), Callback(Rc::new(f)));
    }

    /// Parse and dispatch a raw postMessage payload.
    pub async fn handle_wire(&self, source: FrameId, raw: Value) -> ShellResult<()> {
        let event = InboundEvent::from_wire(raw)?;
        self.handle(source, event).await
    }

    pub async fn handle(&self, source: FrameId, event: InboundEvent) -> ShellResult<()> {
        if self.frames.handle(source).is_none() {
            return Err(ShellError::UnknownFrame(source.to_string()));
        }
        tracing::trace!(frame = %source, ?event, "frame event");

        match event {
            InboundEvent::NavigationRequest { params } => self.navigation_request(params).await,
            InboundEvent::ShowAlert { data } => {
                let outcome = self.ux.show_alert(&data).await;
                let dismiss_key = match outcome {
                    AlertOutcome::Dismissed { dismiss_key } => dismiss_key,
                    AlertOutcome::Link { url } => {
                        self.routing.navigate(&url, NavigateOptions::default()).await;
                        None
                    }
                };
                self.frames.post(source, Outbound::AlertClosed { id: data.id, dismiss_key });
            }
            InboundEvent::ShowConfirmationModal { data } => {
                let confirmed = self.ux.show_confirmation(&data).await;
                self.frames.post(source, Outbound::ConfirmationClosed { confirmed });
            }
            InboundEvent::ShowLoadingIndicator => self.frames.show_loading(source),
            InboundEvent::HideLoadingIndicator => self.frames.hide_loading(source),
            InboundEvent::AddBackdrop => self.ux.add_backdrop(),
            InboundEvent::RemoveBackdrop => self.ux.remove_backdrop(),
            InboundEvent::SetDirtyStatus { dirty } => self.ux.set_dirty(source, dirty),
            InboundEvent::AddNodeParams { data, keep_browser_history } => {
                let prefix = self.ctx.config().routing.node_param_prefix.clone();
                let raw = self.current_raw();
                self.routing.update_location(&add_node_params(&raw, &data, &prefix), keep_browser_history);
            }
            InboundEvent::AddSearchParams { data, keep_browser_history } => {
                let raw = self.current_raw();
                self.routing.update_location(&add_search_params(&raw, &data), keep_browser_history);
            }
            InboundEvent::CustomMessage { id, data } => {
                let listener = id.as_deref().and_then(|id| self.listeners.borrow().get(id).cloned());
                match listener {
                    Some(listener) => (listener.0)(source, &data),
                    None => tracing::debug!(frame = %source, id = ?id, "no listener for custom message"),
                }
            }
            InboundEvent::SetDocumentTitle { title } => self.ux.set_document_title(&title),
            InboundEvent::OpenUserSettings { data } => self.connector.open_user_settings(&data),
            InboundEvent::CloseUserSettings => self.connector.close_user_settings(),
            InboundEvent::Initialized { client_version } => self.frames.on_initialized(source, client_version),
            InboundEvent::NavigateOk { init_ok, client_version } => {
                self.frames.on_navigate_ok(source, ClientMeta { init_ok, client_version, next_view_url: None })
            }
            InboundEvent::SetAnchor { anchor } => self.routing.set_anchor(&anchor),
            InboundEvent::CheckPathExists { correlation_id, data } => {
                let path = resolve_link(&self.routing.current_path(), &data.link, data.relative, false);
                let path_exists = self.routing.path_exists(&path).await;
                self.frames.post(source, Outbound::PathExistsAnswer { correlation_id, path_exists });
            }
            InboundEvent::GoBack { go_back_context } => match self.frames.go_back(go_back_context) {
                Some(path) => {
                    self.routing.navigate(&path, NavigateOptions::default()).await;
                }
                None => {
                    if self.routing.history().back().is_some() {
                        self.routing.handle_route_change().await;
                    }
                }
            },
            InboundEvent::GetContext { client_version } => {
                self.frames.on_context_requested(source, client_version);
            }
        }
        Ok(())
    }

    async fn navigation_request(&self, params: NavigationParams) {
        if !self.ux.confirm_discard_changes().await {
            tracing::debug!(link = %params.link, "navigation cancelled, unsaved changes kept");
            return;
        }
        let mut path = resolve_link(&self.routing.current_path(), &params.link, params.relative, params.from_parent);
        if !params.node_params.is_empty() {
            let prefix = self.ctx.config().routing.node_param_prefix.clone();
            path = add_node_params(&path, &params.node_params, &prefix);
        }
        let options = NavigateOptions {
            preserve_view: params.preserve_view,
            modal: params.modal,
            drawer: params.drawer,
            without_sync: params.without_sync,
            replace: false,
        };
        self.routing.navigate(&path, options).await;
    }

    fn current_raw(&self) -> String {
        self.routing.current_route().map(|r| r.raw).unwrap_or_default()
    }
}
