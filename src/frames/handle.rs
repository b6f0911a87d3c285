//! Frame metadata side table entries

use crate::clock::TimerId;
use crate::navigation::{Context, NavigationNode, Params};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct FrameId(pub u64);

impl fmt::Display for FrameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FrameKind {
    Iframe,
    WebComponent,
}

/// Content slot a frame is mounted into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Slot {
    Main,
    /// Modal at the given stack depth.
    Modal(usize),
    Drawer,
    SplitView,
}

/// What the embedded client reported about itself.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub init_ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_version: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_view_url: Option<String>,
}

/// Host-side record of one mounted frame.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameHandle {
    pub id: FrameId,
    pub kind: FrameKind,
    pub slot: Slot,
    pub view_url: String,
    pub current_node: NavigationNode,
    /// Epoch milliseconds.
    pub created_at: i64,
    pub path_params: Params,
    pub node_params: Params,
    pub context: Context,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_permissions: Option<Value>,
    /// View group tag.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vg: Option<String>,
    /// Load event observed.
    pub ready: bool,
    pub luigi: ClientMeta,
    /// Preserved view waiting on the go-back stack.
    pub pv: bool,
    /// Loading indicator shown for this frame and not yet hidden.
    pub loading: bool,
}

impl FrameHandle {
    pub fn new(id: FrameId, kind: FrameKind, slot: Slot, view_url: impl Into<String>, node: &NavigationNode) -> Self {
        Self {
            id,
            kind,
            slot,
            view_url: view_url.into(),
            current_node: node.clone(),
            created_at: chrono::Utc::now().timestamp_millis(),
            path_params: Params::new(),
            node_params: Params::new(),
            context: Context::new(),
            client_permissions: node.client_permissions.clone(),
            vg: node.view_group.clone(),
            ready: false,
            luigi: ClientMeta::default(),
            pv: false,
            loading: false,
        }
    }
}

/// Per-slot lifecycle state.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameConfig {
    pub iframe: Option<FrameId>,
    pub navigate_ok: Option<bool>,
    pub is_fallback_frame: bool,
    pub isolate_all_views: bool,
    pub builder_compatibility_mode: bool,
    /// Pending navigate-ok fallback timer.
    pub timeout_handle: Option<TimerId>,
    pub page_error_handle: Option<TimerId>,
}

/// Element handed to the content surface (and to the creation interceptor).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameElement {
    pub id: FrameId,
    pub kind: FrameKind,
    /// `iframe` or the custom element tag.
    pub tag_name: String,
    pub src: String,
    pub sandbox: String,
    pub allow: String,
    pub attributes: BTreeMap<String, String>,
    pub visible: bool,
}

impl FrameElement {
    pub fn new(id: FrameId, kind: FrameKind, tag_name: impl Into<String>, src: impl Into<String>) -> Self {
        Self {
            id,
            kind,
            tag_name: tag_name.into(),
            src: src.into(),
            sandbox: String::new(),
            allow: String::new(),
            attributes: BTreeMap::new(),
            visible: true,
        }
    }

    /// CSS `display` value.
    pub fn style_display(&self) -> &'static str {
        if self.visible {
            ""
        } else {
            "none"
        }
    }

    pub fn set_attribute(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.attributes.insert(name.into(), value.into());
    }
}
