//! Trailing-edge debouncing for viewport resize.
//!
//! Every `resize` event schedules a new ticket and supersedes the previous
//! one. Only the newest ticket fires, so a continuous resize gesture produces
//! a single re-measure once the viewport settles. Hosts either arm a timer
//! per ticket and call `fire`, or call `poll` from a frame loop.

/// Handle for one scheduled run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ticket(u64);

#[derive(Debug, Clone)]
pub struct Debouncer {
    delay_ms: f64,
    generation: u64,
    deadline: Option<f64>,
}

impl Debouncer {
    pub fn new(delay_ms: u32) -> Self {
        Self {
            delay_ms: f64::from(delay_ms),
            generation: 0,
            deadline: None,
        }
    }

    pub fn delay_ms(&self) -> f64 {
        self.delay_ms
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Schedule a run `delay_ms` after `now_ms`, superseding any pending one.
    pub fn schedule(&mut self, now_ms: f64) -> Ticket {
        self.generation += 1;
        self.deadline = Some(now_ms + self.delay_ms);
        Ticket(self.generation)
    }

    /// A timer armed for `ticket` expired. Returns `true` if the ticket is
    /// still the newest pending one; the debouncer is then idle again.
    pub fn fire(&mut self, ticket: Ticket) -> bool {
        if ticket.0 != self.generation || self.deadline.is_none() {
            return false;
        }
        self.deadline = None;
        true
    }

    /// Frame-loop variant: returns `true` once the pending deadline has passed.
    pub fn poll(&mut self, now_ms: f64) -> bool {
        match self.deadline {
            Some(deadline) if now_ms >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }

    /// Drop any pending run.
    pub fn cancel(&mut self) {
        self.deadline = None;
    }
}

impl Default for Debouncer {
    fn default() -> Self {
        Self::new(100)
    }
}
