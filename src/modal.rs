//! ModalStack - open modals in open order
//!
//! Closing processes a drained snapshot: entries registered while a close
//! is in flight land on the fresh stack and survive it. One entry's failing
//! close handler never stops the others.

use crate::connector::ModalSettings;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use futures::FutureExt;
use std::cell::RefCell;

pub type InternalCloseFn = Box<dyn FnOnce() -> anyhow::Result<()>>;

/// One open modal.
#[derive(Default)]
pub struct ModalEntry {
    pub settings: ModalSettings,
    /// Settles once the modal's content has finished closing.
    pub close_promise: Option<LocalBoxFuture<'static, ()>>,
    /// Settles `close_promise`.
    pub resolve_fn: Option<Box<dyn FnOnce()>>,
    /// Asked before a user-initiated close.
    pub on_close_request: Option<Box<dyn Fn()>>,
    /// Tears down the modal's frame and chrome.
    pub on_internal_close: Option<InternalCloseFn>,
}

impl ModalEntry {
    pub fn new(settings: ModalSettings) -> Self {
        Self { settings, ..Default::default() }
    }

    /// Entry with a close promise settled by its own `resolve_fn`.
    pub fn deferred(settings: ModalSettings) -> Self {
        let (tx, rx) = oneshot::channel::<()>();
        Self {
            settings,
            close_promise: Some(rx.map(|_| ()).boxed_local()),
            resolve_fn: Some(Box::new(move || {
                let _ = tx.send(());
            })),
            ..Default::default()
        }
    }

    pub fn with_on_internal_close(mut self, f: impl FnOnce() -> anyhow::Result<()> + 'static) -> Self {
        self.on_internal_close = Some(Box::new(f));
        self
    }

    pub fn with_on_close_request(mut self, f: impl Fn() + 'static) -> Self {
        self.on_close_request = Some(Box::new(f));
        self
    }

    async fn close(self, index: usize) {
        if let Some(resolve) = self.resolve_fn {
            resolve();
        }
        if let Some(promise) = self.close_promise {
            promise.await;
        }
        if let Some(on_internal_close) = self.on_internal_close {
            if let Err(e) = on_internal_close() {
                tracing::warn!(modal = index, error = %e, "modal close handler failed");
            }
        }
    }
}

#[derive(Default)]
pub struct ModalStack {
    entries: RefCell<Vec<ModalEntry>>,
}

impl ModalStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_modal(&self, entry: ModalEntry) {
        self.entries.borrow_mut().push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    /// Close every open modal, newest first.
    pub async fn close_modals(&self) {
        let snapshot = std::mem::take(&mut *self.entries.borrow_mut());
        for (index, entry) in snapshot.into_iter().enumerate().rev() {
            entry.close(index).await;
        }
    }

    /// Close the newest modal only. Returns `false` when none is open.
    pub async fn close_top(&self) -> bool {
        let top = self.entries.borrow_mut().pop();
        match top {
            Some(entry) => {
                let index = self.len();
                entry.close(index).await;
                true
            }
            None => false,
        }
    }

    /// Run the newest modal's close-request hook; `false` when it has none.
    pub fn request_close(&self) -> bool {
        let entries = self.entries.borrow();
        match entries.last().and_then(|e| e.on_close_request.as_ref()) {
            Some(hook) => {
                hook();
                true
            }
            None => false,
        }
    }

    /// Settings of the newest modal, or empty.
    pub fn get_modal_settings(&self) -> ModalSettings {
        self.entries.borrow().last().map(|e| e.settings.clone()).unwrap_or_default()
    }

    /// Merge `partial` into the newest modal's settings.
    pub fn update_modal_settings(&self, partial: ModalSettings) -> bool {
        let mut entries = self.entries.borrow_mut();
        match entries.last_mut() {
            Some(top) => {
                top.settings.extend(partial);
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::cell::Cell;
    use std::rc::Rc;

    fn settings(title: &str) -> ModalSettings {
        json!({ "title": title }).as_object().cloned().unwrap_or_default()
    }

    #[tokio::test]
    async fn deferred_entry_does_not_block_close() {
        let stack = ModalStack::new();
        let closed = Rc::new(Cell::new(false));
        let flag = closed.clone();
        stack.register_modal(ModalEntry::deferred(settings("a")).with_on_internal_close(move || {
            flag.set(true);
            Ok(())
        }));
        stack.close_modals().await;
        assert!(closed.get());
        assert!(stack.is_empty());
    }

    #[test]
    fn settings_track_the_top_entry() {
        let stack = ModalStack::new();
        assert!(stack.get_modal_settings().is_empty());
        assert!(!stack.update_modal_settings(settings("x")));

        stack.register_modal(ModalEntry::new(settings("first")));
        stack.register_modal(ModalEntry::new(settings("second")));
        assert_eq!(stack.get_modal_settings()["title"], "second");

        let mut partial = ModalSettings::new();
        partial.insert("size".into(), json!("l"));
        assert!(stack.update_modal_settings(partial));
        let top = stack.get_modal_settings();
        assert_eq!(top["title"], "second");
        assert_eq!(top["size"], "l");
    }

    #[tokio::test]
    async fn close_top_pops_one() {
        let stack = ModalStack::new();
        stack.register_modal(ModalEntry::new(settings("first")));
        stack.register_modal(ModalEntry::new(settings("second")));
        assert!(stack.close_top().await);
        assert_eq!(stack.len(), 1);
        assert_eq!(stack.get_modal_settings()["title"], "first");
    }
}
