//! Content surface
//!
//! The container wrapper the frames live in. `FrameLifecycleManager` is its
//! only writer. `MemorySurface` keeps everything in memory for headless
//! hosts and tests; browser hosts wrap the real container element.

use super::handle::{FrameElement, FrameId, Slot};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::BTreeMap;

pub trait FrameSurface {
    /// Insert as the first child of the slot's container.
    fn mount(&self, slot: Slot, element: FrameElement);
    fn remove(&self, id: FrameId) -> bool;
    fn set_visible(&self, id: FrameId, visible: bool);
    /// Reposition as first child.
    fn move_to_front(&self, id: FrameId);
    fn element(&self, id: FrameId) -> Option<FrameElement>;
    /// Frames in a slot, in container order.
    fn frames(&self, slot: Slot) -> Vec<FrameId>;
    fn post_message(&self, id: FrameId, message: Value);

    fn contains(&self, id: FrameId) -> bool {
        self.element(id).is_some()
    }
}

#[derive(Debug, Default)]
pub struct MemorySurface {
    slots: RefCell<BTreeMap<Slot, Vec<FrameElement>>>,
    outbox: RefCell<Vec<(FrameId, Value)>>,
}

impl MemorySurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every message posted so far, oldest first.
    pub fn posted(&self) -> Vec<(FrameId, Value)> {
        self.outbox.borrow().clone()
    }

    pub fn messages_for(&self, id: FrameId) -> Vec<Value> {
        self.outbox
            .borrow()
            .iter()
            .filter(|(target, _)| *target == id)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// `msg` names posted to `id`.
    pub fn message_names(&self, id: FrameId) -> Vec<String> {
        self.messages_for(id)
            .iter()
            .filter_map(|m| m.get("msg").and_then(Value::as_str).map(str::to_string))
            .collect()
    }

    pub fn clear_outbox(&self) {
        self.outbox.borrow_mut().clear();
    }

    fn with_element(&self, id: FrameId, f: impl FnOnce(&mut FrameElement)) {
        let mut slots = self.slots.borrow_mut();
        if let Some(el) = slots.values_mut().flat_map(|v| v.iter_mut()).find(|e| e.id == id) {
            f(el);
        }
    }
}

impl FrameSurface for MemorySurface {
    fn mount(&self, slot: Slot, element: FrameElement) {
        self.slots.borrow_mut().entry(slot).or_default().insert(0, element);
    }

    fn remove(&self, id: FrameId) -> bool {
        let mut slots = self.slots.borrow_mut();
        for frames in slots.values_mut() {
            if let Some(pos) = frames.iter().position(|e| e.id == id) {
                frames.remove(pos);
                return true;
            }
        }
        false
    }

    fn set_visible(&self, id: FrameId, visible: bool) {
        self.with_element(id, |el| el.visible = visible);
    }

    fn move_to_front(&self, id: FrameId) {
        let mut slots = self.slots.borrow_mut();
        for frames in slots.values_mut() {
            if let Some(pos) = frames.iter().position(|e| e.id == id) {
                let el = frames.remove(pos);
                frames.insert(0, el);
                return;
            }
        }
    }

    fn element(&self, id: FrameId) -> Option<FrameElement> {
        self.slots
            .borrow()
            .values()
            .flat_map(|v| v.iter())
            .find(|e| e.id == id)
            .cloned()
    }

    fn frames(&self, slot: Slot) -> Vec<FrameId> {
        self.slots
            .borrow()
            .get(&slot)
            .map(|v| v.iter().map(|e| e.id).collect())
            .unwrap_or_default()
    }

    fn post_message(&self, id: FrameId, message: Value) {
        if !self.contains(id) {
            tracing::debug!(frame = %id, "message to detached frame dropped");
            return;
        }
        self.outbox.borrow_mut().push((id, message));
    }
}
