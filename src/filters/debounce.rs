//! Last-write-wins delay of a single pending value
use std::time::{Duration, Instant};

/// Holds at most one pending value. Scheduling replaces the pending value and
/// re-arms the deadline, polling releases it once the deadline has passed.
#[derive(Clone, Debug)]
pub struct Debouncer<T> {
    delay: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(delay: Duration) -> Self {
        Self { delay, pending: None }
    }

    pub fn schedule(&mut self, value: T, now: Instant) {
        self.pending = Some((now + self.delay, value));
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|&(deadline, _)| deadline)
    }

    /// Takes the pending value when its deadline is reached
    pub fn poll(&mut self, now: Instant) -> Option<T> {
        let ready = self.deadline().map_or(false, |deadline| now >= deadline);
        if ready {
            self.cancel()
        } else {
            None
        }
    }

    pub fn cancel(&mut self) -> Option<T> {
        self.pending.take().map(|(_, value)| value)
    }
}
