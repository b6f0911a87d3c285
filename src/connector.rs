//! Connector - the presentation layer the shell drives
//!
//! The shell computes view-models and decides what happens; a connector
//! turns that into widgets. It never calls back into shell internals except
//! through the alert/confirmation handlers it is handed.

use crate::bridge::handlers::{AlertHandler, ConfirmationHandler};
use crate::frames::{FrameId, FrameSurface};
use crate::navigation::{LeftNavData, TabNavData, TopNavData};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Free-form modal/drawer settings (`title`, `size`, `width`, ...).
pub type ModalSettings = Map<String, Value>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertLink {
    pub text: String,
    pub url: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AlertSettings {
    pub id: Option<String>,
    pub text: String,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub links: BTreeMap<String, AlertLink>,
    /// Milliseconds until the alert closes itself.
    pub close_after: Option<u64>,
}

impl AlertSettings {
    pub fn error(text: impl Into<String>) -> Self {
        Self { text: text.into(), kind: Some("error".into()), ..Default::default() }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ConfirmationSettings {
    pub header: Option<String>,
    pub body: Option<String>,
    pub button_confirm: Option<String>,
    pub button_dismiss: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub trait Connector {
    fn render_main_layout(&self) {}
    fn render_top_nav(&self, data: &TopNavData);
    fn render_left_nav(&self, data: &LeftNavData);
    fn render_tab_nav(&self, data: &TabNavData);
    /// Container the content frames are mounted into.
    fn container_wrapper(&self) -> Rc<dyn FrameSurface>;
    /// Modal chrome around `content`; the user closing it should end in `Shell::close_modals`.
    fn render_modal(&self, content: FrameId, settings: &ModalSettings);
    fn render_drawer(&self, content: FrameId, settings: &ModalSettings);
    fn render_alert(&self, settings: &AlertSettings, handler: AlertHandler);
    fn render_confirmation_modal(&self, settings: &ConfirmationSettings, handler: ConfirmationHandler);
    fn show_loading_indicator(&self);
    fn hide_loading_indicator(&self);
    fn add_backdrop(&self);
    fn remove_backdrop(&self);
    fn open_user_settings(&self, settings: &Value);
    fn close_user_settings(&self);
    fn set_document_title(&self, _title: &str) {}
}
