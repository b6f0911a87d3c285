//! Clock - host-driven timer queue
//!
//! The shell never sleeps on its own. Timers (navigate-ok fallback,
//! page-error handler) are entries in a queue; whoever hosts the shell
//! advances logical time and gets back the payloads that came due.
//!
//! # Two Modes
//!
//! | Mode | Driver | Use Case |
//! |------|--------|----------|
//! | Host-driven | caller invokes `Shell::advance_timers(ms)` | tests, browser `setTimeout` glue |
//! | Background | `runtime::drive_timers` (tokio interval) | native hosts, CLI |
//!
//! ```text
//! schedule(delay, payload) ──► pending (deadline = now + delay)
//!                                   │
//! advance(elapsed) ─────────────────┤ now += elapsed
//!                                   ▼
//!                      due payloads, deadline order
//! ```

use std::cell::{Cell, RefCell};

pub type TimerId = u64;

/// A timer that came due.
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<T> {
    pub id: TimerId,
    pub deadline_ms: u64,
    pub payload: T,
}

struct Pending<T> {
    id: TimerId,
    deadline_ms: u64,
    payload: T,
}

pub struct TimerQueue<T> {
    now_ms: Cell<u64>,
    next_id: Cell<TimerId>,
    pending: RefCell<Vec<Pending<T>>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> std::fmt::Debug for TimerQueue<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TimerQueue")
            .field("now_ms", &self.now_ms.get())
            .field("pending", &self.pending.borrow().len())
            .finish()
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self {
            now_ms: Cell::new(0),
            next_id: Cell::new(1),
            pending: RefCell::new(Vec::new()),
        }
    }

    /// Logical time in milliseconds since the queue was created.
    pub fn now_ms(&self) -> u64 {
        self.now_ms.get()
    }

    pub fn schedule(&self, delay_ms: u64, payload: T) -> TimerId {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        self.pending.borrow_mut().push(Pending {
            id,
            deadline_ms: self.now_ms.get().saturating_add(delay_ms),
            payload,
        });
        id
    }

    /// Returns whether the timer was still pending.
    pub fn cancel(&self, id: TimerId) -> bool {
        let mut pending = self.pending.borrow_mut();
        let before = pending.len();
        pending.retain(|p| p.id != id);
        pending.len() != before
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.pending.borrow().iter().any(|p| p.id == id)
    }

    pub fn next_deadline(&self) -> Option<u64> {
        self.pending.borrow().iter().map(|p| p.deadline_ms).min()
    }

    pub fn len(&self) -> usize {
        self.pending.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Move time forward and take every timer whose deadline has passed.
    pub fn advance(&self, elapsed_ms: u64) -> Vec<Fired<T>> {
        let now = self.now_ms.get().saturating_add(elapsed_ms);
        self.now_ms.set(now);

        let mut pending = self.pending.borrow_mut();
        let (due, rest): (Vec<_>, Vec<_>) = pending.drain(..).partition(|p| p.deadline_ms <= now);
        *pending = rest;

        let mut fired: Vec<Fired<T>> = due
            .into_iter()
            .map(|p| Fired { id: p.id, deadline_ms: p.deadline_ms, payload: p.payload })
            .collect();
        fired.sort_by_key(|f| (f.deadline_ms, f.id));
        fired
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_in_deadline_order() {
        let queue = TimerQueue::new();
        queue.schedule(300, "late");
        queue.schedule(100, "early");
        let mid = queue.schedule(200, "mid");

        assert!(queue.advance(50).is_empty());
        assert_eq!(queue.next_deadline(), Some(100));

        let fired: Vec<_> = queue.advance(200).into_iter().map(|f| f.payload).collect();
        assert_eq!(fired, vec!["early", "mid"]);
        assert!(!queue.is_pending(mid));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn cancelled_timers_never_fire() {
        let queue = TimerQueue::new();
        let id = queue.schedule(10, ());
        assert!(queue.cancel(id));
        assert!(!queue.cancel(id));
        assert!(queue.advance(100).is_empty());
    }

    #[test]
    fn zero_delay_fires_on_next_advance() {
        let queue = TimerQueue::new();
        queue.advance(1000);
        queue.schedule(0, 1);
        assert_eq!(queue.advance(0).len(), 1);
    }
}
