//! Alert and confirmation handlers handed to the connector
//!
//! Each handler settles exactly once. Dropping it unsettled resolves the
//! waiting side as dismissed.

use crate::connector::{AlertLink, AlertSettings};
use futures::channel::oneshot;
use std::cell::RefCell;
use std::collections::BTreeMap;

/// How an alert was closed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AlertOutcome {
    Dismissed { dismiss_key: Option<String> },
    /// A link inside the alert text was followed.
    Link { url: String },
}

pub struct AlertHandler {
    links: BTreeMap<String, AlertLink>,
    tx: RefCell<Option<oneshot::Sender<AlertOutcome>>>,
}

impl AlertHandler {
    pub fn new(settings: &AlertSettings) -> (Self, oneshot::Receiver<AlertOutcome>) {
        let (tx, rx) = oneshot::channel();
        let handler = Self { links: settings.links.clone(), tx: RefCell::new(Some(tx)) };
        (handler, rx)
    }

    fn settle(&self, outcome: AlertOutcome) -> bool {
        match self.tx.borrow_mut().take() {
            Some(tx) => tx.send(outcome).is_ok(),
            None => false,
        }
    }

    pub fn close(&self) -> bool {
        self.settle(AlertOutcome::Dismissed { dismiss_key: None })
    }

    pub fn close_with(&self, dismiss_key: impl Into<String>) -> bool {
        self.settle(AlertOutcome::Dismissed { dismiss_key: Some(dismiss_key.into()) })
    }

    /// Follow the link registered under `key`. Unknown keys leave the alert open.
    pub fn link(&self, key: &str) -> bool {
        let Some(link) = self.links.get(key) else {
            tracing::warn!(key, "alert link not found");
            return false;
        };
        self.settle(AlertOutcome::Link { url: link.url.clone() })
    }

    pub fn is_settled(&self) -> bool {
        self.tx.borrow().is_none()
    }
}

pub struct ConfirmationHandler {
    tx: RefCell<Option<oneshot::Sender<bool>>>,
}

impl ConfirmationHandler {
    pub fn new() -> (Self, oneshot::Receiver<bool>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx: RefCell::new(Some(tx)) }, rx)
    }

    fn settle(&self, confirmed: bool) -> bool {
        match self.tx.borrow_mut().take() {
            Some(tx) => tx.send(confirmed).is_ok(),
            None => false,
        }
    }

    pub fn confirm(&self) -> bool {
        self.settle(true)
    }

    pub fn dismiss(&self) -> bool {
        self.settle(false)
    }
}
