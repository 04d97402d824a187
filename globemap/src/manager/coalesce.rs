//! Active/pending request coalescing.
//!
//! Both the tile manager and the map generator run at most one unit of work
//! at a time. Requests arriving while work is in flight collapse into a
//! single pending slot holding only the newest input:
//!
//! ```text
//!            submit(a)              submit(b), submit(c)
//!   Idle ──────────────► Active ─────────────────────────► Active + pending(c)
//!    ▲                     │                                     │
//!    │   finish() -> None  │          finish() -> Some(c)        │
//!    └─────────────────────┘   ◄─────────────────────────────────┘
//! ```
//!
//! The pending input is handed over inside [`Coalescer::finish`] while the
//! state stays active, so a request arriving between two units of work can
//! never start a third one in parallel.

use tracing::debug;

/// Single-slot coalescing state machine.
///
/// Not synchronized; wrap it in a mutex when shared between threads.
#[derive(Debug)]
pub struct Coalescer<T> {
    active: bool,
    pending: Option<T>,
    /// Inputs replaced before they could run
    superseded: u64,
}

impl<T> Default for Coalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Coalescer<T> {
    pub fn new() -> Self {
        Self {
            active: false,
            pending: None,
            superseded: 0,
        }
    }

    /// Offers new input.
    ///
    /// Returns the input back when the caller should start work on it now.
    /// Returns `None` when work is already in flight; the input then
    /// replaces any older pending one.
    #[must_use]
    pub fn submit(&mut self, input: T) -> Option<T> {
        if self.active {
            if self.pending.replace(input).is_some() {
                self.superseded += 1;
                debug!(superseded = self.superseded, "Pending request replaced");
            }
            return None;
        }
        self.active = true;
        Some(input)
    }

    /// Marks the in-flight work as done.
    ///
    /// Returns the pending input to start next, staying active; otherwise
    /// goes idle and returns `None`.
    #[must_use]
    pub fn finish(&mut self) -> Option<T> {
        match self.pending.take() {
            Some(next) => Some(next),
            None => {
                self.active = false;
                None
            }
        }
    }

    /// Drops any pending input and goes idle.
    pub fn reset(&mut self) {
        self.active = false;
        self.pending = None;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn superseded(&self) -> u64 {
        self.superseded
    }
}
