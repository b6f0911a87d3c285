//! Shared test doubles: a connector that records every call and answers
//! alerts and confirmations the way a test tells it to.

#![allow(dead_code)]

use mfe_shell::connector::{AlertSettings, ConfirmationSettings, Connector, ModalSettings};
use mfe_shell::frames::{FrameId, FrameSurface, MemorySurface};
use mfe_shell::navigation::{LeftNavData, TabNavData, TopNavData};
use mfe_shell::{AlertHandler, ConfirmationHandler, MemoryHistory, Shell, ShellConfig};
use serde_json::Value;
use std::cell::{Cell, RefCell};
use std::rc::Rc;

#[derive(Debug, Clone, PartialEq)]
pub enum AlertReply {
    Close,
    Key(String),
    Link(String),
    /// Drop the handler unsettled.
    Ignore,
}

pub struct RecordingConnector {
    pub surface: Rc<MemorySurface>,
    pub top_navs: RefCell<Vec<TopNavData>>,
    pub left_navs: RefCell<Vec<LeftNavData>>,
    pub tab_navs: RefCell<Vec<TabNavData>>,
    pub modals: RefCell<Vec<(FrameId, ModalSettings)>>,
    pub drawers: RefCell<Vec<(FrameId, ModalSettings)>>,
    pub alerts: RefCell<Vec<AlertSettings>>,
    pub confirmations: RefCell<Vec<ConfirmationSettings>>,
    pub loading_shown: Cell<u32>,
    pub loading_hidden: Cell<u32>,
    pub backdrop_added: Cell<u32>,
    pub backdrop_removed: Cell<u32>,
    pub user_settings: RefCell<Option<Value>>,
    pub user_settings_closed: Cell<bool>,
    pub titles: RefCell<Vec<String>>,
    pub alert_reply: RefCell<AlertReply>,
    /// `None` drops the handler unsettled.
    pub confirm_reply: Cell<Option<bool>>,
}

impl RecordingConnector {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            surface: Rc::new(MemorySurface::new()),
            top_navs: RefCell::new(Vec::new()),
            left_navs: RefCell::new(Vec::new()),
            tab_navs: RefCell::new(Vec::new()),
            modals: RefCell::new(Vec::new()),
            drawers: RefCell::new(Vec::new()),
            alerts: RefCell::new(Vec::new()),
            confirmations: RefCell::new(Vec::new()),
            loading_shown: Cell::new(0),
            loading_hidden: Cell::new(0),
            backdrop_added: Cell::new(0),
            backdrop_removed: Cell::new(0),
            user_settings: RefCell::new(None),
            user_settings_closed: Cell::new(false),
            titles: RefCell::new(Vec::new()),
            alert_reply: RefCell::new(AlertReply::Close),
            confirm_reply: Cell::new(Some(true)),
        })
    }

    pub fn last_left_nav(&self) -> Option<LeftNavData> {
        self.left_navs.borrow().last().cloned()
    }
}

impl Connector for RecordingConnector {
    fn render_top_nav(&self, data: &TopNavData) {
        self.top_navs.borrow_mut().push(data.clone());
    }

    fn render_left_nav(&self, data: &LeftNavData) {
        self.left_navs.borrow_mut().push(data.clone());
    }

    fn render_tab_nav(&self, data: &TabNavData) {
        self.tab_navs.borrow_mut().push(data.clone());
    }

    fn container_wrapper(&self) -> Rc<dyn FrameSurface> {
        self.surface.clone()
    }

    fn render_modal(&self, content: FrameId, settings: &ModalSettings) {
        self.modals.borrow_mut().push((content, settings.clone()));
    }

    fn render_drawer(&self, content: FrameId, settings: &ModalSettings) {
        self.drawers.borrow_mut().push((content, settings.clone()));
    }

    fn render_alert(&self, settings: &AlertSettings, handler: AlertHandler) {
        self.alerts.borrow_mut().push(settings.clone());
        match self.alert_reply.borrow().clone() {
            AlertReply::Close => {
                handler.close();
            }
            AlertReply::Key(key) => {
                handler.close_with(key);
            }
            AlertReply::Link(key) => {
                handler.link(&key);
            }
            AlertReply::Ignore => {}
        }
    }

    fn render_confirmation_modal(&self, settings: &ConfirmationSettings, handler: ConfirmationHandler) {
        self.confirmations.borrow_mut().push(settings.clone());
        match self.confirm_reply.get() {
            Some(true) => {
                handler.confirm();
            }
            Some(false) => {
                handler.dismiss();
            }
            None => {}
        }
    }

    fn show_loading_indicator(&self) {
        self.loading_shown.set(self.loading_shown.get() + 1);
    }

    fn hide_loading_indicator(&self) {
        self.loading_hidden.set(self.loading_hidden.get() + 1);
    }

    fn add_backdrop(&self) {
        self.backdrop_added.set(self.backdrop_added.get() + 1);
    }

    fn remove_backdrop(&self) {
        self.backdrop_removed.set(self.backdrop_removed.get() + 1);
    }

    fn open_user_settings(&self, settings: &Value) {
        *self.user_settings.borrow_mut() = Some(settings.clone());
    }

    fn close_user_settings(&self) {
        self.user_settings_closed.set(true);
    }

    fn set_document_title(&self, title: &str) {
        self.titles.borrow_mut().push(title.to_string());
    }
}

pub struct Harness {
    pub shell: Shell,
    pub connector: Rc<RecordingConnector>,
    pub history: Rc<MemoryHistory>,
}

/// Shell over a recording connector and in-memory history at `location`.
pub fn harness(config: ShellConfig, location: &str) -> Harness {
    let connector = RecordingConnector::new();
    let history = Rc::new(MemoryHistory::new(location));
    let shell = Shell::new(config, connector.clone(), history.clone());
    Harness { shell, connector, history }
}
