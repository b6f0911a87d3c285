//! Frame → host event catalog
//!
//! Every inbound event is a JSON object tagged by `msg`. Names are the
//! stable constants in `core::paths::inbound`; the legacy `luigi.*` names
//! older clients send are accepted as aliases.

use crate::connector::{AlertSettings, ConfirmationSettings, ModalSettings};
use crate::error::ShellError;
use crate::navigation::{Context, Params};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Navigation target as sent by a client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NavigationParams {
    pub link: String,
    /// Resolve `link` against the current route.
    pub relative: bool,
    /// Resolve `link` against the parent of the current route.
    pub from_parent: bool,
    pub preserve_view: bool,
    pub node_params: Params,
    pub modal: Option<ModalSettings>,
    pub drawer: Option<ModalSettings>,
    pub without_sync: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PathExistsQuery {
    pub link: String,
    pub relative: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "msg", rename_all = "camelCase")]
pub enum InboundEvent {
    #[serde(rename = "navigation-request", alias = "luigi.navigation.open")]
    NavigationRequest { params: NavigationParams },

    #[serde(rename = "show-alert-request", alias = "luigi.ux.alert.show")]
    ShowAlert { data: AlertSettings },

    #[serde(rename = "show-confirmation-modal-request", alias = "luigi.ux.confirmationModal.show")]
    ShowConfirmationModal {
        #[serde(default)]
        data: ConfirmationSettings,
    },

    #[serde(rename = "show-loading-indicator-request", alias = "luigi.show-loading-indicator")]
    ShowLoadingIndicator,

    #[serde(rename = "hide-loading-indicator-request", alias = "luigi.hide-loading-indicator")]
    HideLoadingIndicator,

    #[serde(rename = "add-backdrop-request", alias = "luigi.add-backdrop")]
    AddBackdrop,

    #[serde(rename = "remove-backdrop-request", alias = "luigi.remove-backdrop")]
    RemoveBackdrop,

    #[serde(rename = "set-dirty-status-request", alias = "luigi.set-page-dirty")]
    SetDirtyStatus { dirty: bool },

    #[serde(rename = "add-node-params-request", alias = "luigi.addNodeParams")]
    AddNodeParams {
        data: Params,
        #[serde(default, rename = "keepBrowserHistory")]
        keep_browser_history: bool,
    },

    #[serde(rename = "add-search-params-request", alias = "luigi.addSearchParams")]
    AddSearchParams {
        data: Params,
        #[serde(default, rename = "keepBrowserHistory")]
        keep_browser_history: bool,
    },

    #[serde(rename = "custom-message", alias = "custom")]
    CustomMessage {
        #[serde(default)]
        id: Option<String>,
        #[serde(default)]
        data: Value,
    },

    #[serde(rename = "set-document-title-request", alias = "luigi.ux.set-document-title")]
    SetDocumentTitle { title: String },

    #[serde(rename = "open-user-settings-request", alias = "luigi.ux.openUserSettings")]
    OpenUserSettings {
        #[serde(default)]
        data: Value,
    },

    #[serde(rename = "close-user-settings-request", alias = "luigi.ux.closeUserSettings")]
    CloseUserSettings,

    #[serde(rename = "initialized", alias = "luigi.init.ok")]
    Initialized {
        #[serde(default, rename = "clientVersion")]
        client_version: Option<String>,
    },

    #[serde(rename = "navigate.ok", alias = "luigi.navigate.ok")]
    NavigateOk {
        #[serde(default, rename = "initOk")]
        init_ok: Option<bool>,
        #[serde(default, rename = "clientVersion")]
        client_version: Option<String>,
    },

    #[serde(rename = "set-anchor-request", alias = "luigi.setAnchor")]
    SetAnchor { anchor: String },

    #[serde(rename = "check-path-exists-request", alias = "luigi.navigation.pathExists")]
    CheckPathExists {
        #[serde(default, rename = "correlationId")]
        correlation_id: Option<String>,
        data: PathExistsQuery,
    },

    #[serde(rename = "go-back-request", alias = "luigi.navigation.back")]
    GoBack {
        #[serde(default, rename = "goBackContext")]
        go_back_context: Option<Context>,
    },

    #[serde(rename = "get-context-request", alias = "luigi.get-context")]
    GetContext {
        #[serde(default, rename = "clientVersion")]
        client_version: Option<String>,
    },
}

impl InboundEvent {
    /// Parse a raw postMessage payload.
    pub fn from_wire(raw: Value) -> Result<Self, ShellError> {
        let name = raw.get("msg").and_then(Value::as_str).unwrap_or_default().to_string();
        serde_json::from_value(raw).map_err(|e| ShellError::Protocol(format!("{name}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::paths::inbound;
    use serde_json::json;

    #[test]
    fn parses_navigation_request() {
        let event = InboundEvent::from_wire(json!({
            "msg": inbound::NAVIGATION_REQUEST,
            "params": { "link": "/home", "preserveView": true, "nodeParams": { "a": "1" } }
        }))
        .unwrap();
        let InboundEvent::NavigationRequest { params } = event else { panic!("wrong variant") };
        assert_eq!(params.link, "/home");
        assert!(params.preserve_view);
        assert_eq!(params.node_params.get("a").map(String::as_str), Some("1"));
        assert!(params.modal.is_none());
    }

    #[test]
    fn accepts_legacy_names() {
        let event = InboundEvent::from_wire(json!({ "msg": "luigi.navigate.ok", "initOk": true })).unwrap();
        assert_eq!(event, InboundEvent::NavigateOk { init_ok: Some(true), client_version: None });

        let event = InboundEvent::from_wire(json!({ "msg": "luigi.set-page-dirty", "dirty": true })).unwrap();
        assert_eq!(event, InboundEvent::SetDirtyStatus { dirty: true });
    }

    #[test]
    fn unit_events_round_trip() {
        let wire = serde_json::to_value(InboundEvent::AddBackdrop).unwrap();
        assert_eq!(wire, json!({ "msg": inbound::ADD_BACKDROP }));
        assert_eq!(InboundEvent::from_wire(wire).unwrap(), InboundEvent::AddBackdrop);
    }

    #[test]
    fn unknown_event_is_protocol_error() {
        let err = InboundEvent::from_wire(json!({ "msg": "nope" })).unwrap_err();
        assert!(matches!(err, ShellError::Protocol(ref m) if m.starts_with("nope")));
    }
}
