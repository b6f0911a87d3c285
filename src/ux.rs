//! UX state shared by the bridge and the router: dirty frames, backdrop,
//! alerts, confirmation modals, document title.

use crate::bridge::handlers::{AlertHandler, AlertOutcome, ConfirmationHandler};
use crate::connector::{AlertSettings, ConfirmationSettings, Connector};
use crate::core::paths::DIRTY_STATUS_TEXT;
use crate::frames::FrameId;
use std::cell::{Cell, RefCell};
use std::collections::BTreeSet;
use std::rc::Rc;

pub struct Ux {
    connector: Rc<dyn Connector>,
    dirty: RefCell<BTreeSet<FrameId>>,
    backdrops: Cell<u32>,
    title: RefCell<Option<String>>,
}

impl Ux {
    pub fn new(connector: Rc<dyn Connector>) -> Self {
        Self {
            connector,
            dirty: RefCell::new(BTreeSet::new()),
            backdrops: Cell::new(0),
            title: RefCell::new(None),
        }
    }

    pub fn set_dirty(&self, frame: FrameId, dirty: bool) {
        let mut set = self.dirty.borrow_mut();
        if dirty {
            set.insert(frame);
        } else {
            set.remove(&frame);
        }
    }

    pub fn is_dirty(&self) -> bool {
        !self.dirty.borrow().is_empty()
    }

    pub fn clear_dirty(&self) {
        self.dirty.borrow_mut().clear();
    }

    /// Backdrops nest: the connector sees the first add and the last remove.
    pub fn add_backdrop(&self) {
        let count = self.backdrops.get();
        self.backdrops.set(count + 1);
        if count == 0 {
            self.connector.add_backdrop();
        }
    }

    pub fn remove_backdrop(&self) {
        match self.backdrops.get() {
            0 => {}
            1 => {
                self.backdrops.set(0);
                self.connector.remove_backdrop();
            }
            n => self.backdrops.set(n - 1),
        }
    }

    pub fn backdrop_count(&self) -> u32 {
        self.backdrops.get()
    }

    pub fn set_document_title(&self, title: &str) {
        *self.title.borrow_mut() = Some(title.to_string());
        self.connector.set_document_title(title);
    }

    pub fn document_title(&self) -> Option<String> {
        self.title.borrow().clone()
    }

    /// Show an alert and wait for it to close. A connector that drops the
    /// handler counts as a plain dismissal.
    pub async fn show_alert(&self, settings: &AlertSettings) -> AlertOutcome {
        let (handler, rx) = AlertHandler::new(settings);
        self.connector.render_alert(settings, handler);
        rx.await.unwrap_or(AlertOutcome::Dismissed { dismiss_key: None })
    }

    /// Show an alert without waiting on it.
    pub fn notify(&self, settings: &AlertSettings) {
        let (handler, _rx) = AlertHandler::new(settings);
        self.connector.render_alert(settings, handler);
    }

    pub async fn show_confirmation(&self, settings: &ConfirmationSettings) -> bool {
        let (handler, rx) = ConfirmationHandler::new();
        self.connector.render_confirmation_modal(settings, handler);
        rx.await.unwrap_or(false)
    }

    /// Ask before leaving unsaved changes. Confirming forgets them.
    pub async fn confirm_discard_changes(&self) -> bool {
        if !self.is_dirty() {
            return true;
        }
        let settings = ConfirmationSettings { body: Some(DIRTY_STATUS_TEXT.to_string()), ..Default::default() };
        let confirmed = self.show_confirmation(&settings).await;
        if confirmed {
            self.clear_dirty();
        }
        confirmed
    }
}
