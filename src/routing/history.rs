//! Browser history abstraction
//!
//! The router is the only writer. Locations are stored the way the browser
//! shows them: `#/home?~a=1` in hash mode, `/home?~a=1` in path mode.

use std::cell::{Cell, RefCell};

pub trait History {
    /// Current location (hash or path plus query).
    fn location(&self) -> String;
    fn push(&self, location: &str);
    fn replace(&self, location: &str);
    /// Step back one entry. Returns the new location, if there was one.
    fn back(&self) -> Option<String>;
}

/// In-memory history for headless hosts and tests.
pub struct MemoryHistory {
    entries: RefCell<Vec<String>>,
    index: Cell<usize>,
}

impl MemoryHistory {
    pub fn new(initial: impl Into<String>) -> Self {
        Self { entries: RefCell::new(vec![initial.into()]), index: Cell::new(0) }
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.borrow().clone()
    }
}

impl Default for MemoryHistory {
    fn default() -> Self {
        Self::new("/")
    }
}

impl History for MemoryHistory {
    fn location(&self) -> String {
        self.entries.borrow().get(self.index.get()).cloned().unwrap_or_default()
    }

    fn push(&self, location: &str) {
        let mut entries = self.entries.borrow_mut();
        entries.truncate(self.index.get() + 1);
        entries.push(location.to_string());
        self.index.set(entries.len() - 1);
    }

    fn replace(&self, location: &str) {
        let mut entries = self.entries.borrow_mut();
        match entries.get_mut(self.index.get()) {
            Some(current) => *current = location.to_string(),
            None => entries.push(location.to_string()),
        }
    }

    fn back(&self) -> Option<String> {
        let index = self.index.get().checked_sub(1)?;
        self.index.set(index);
        Some(self.location())
    }
}
