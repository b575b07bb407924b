#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `cfdp_timer` is the minimal cooperative scheduler the receiver state
//! machine uses for its three per-transaction timers (`NAK`, `INACTIVITY`,
//! `FINISHED_ACK_WAIT`). It is deliberately generic over the key type so the
//! receiver can use its own enum rather than this crate defining one.
//!
//! # Design
//!
//! [`TimerService::tick`] *returns* the keys that fired rather than invoking
//! a stored callback, and leaves invoking the corresponding behaviour to the
//! caller. Storing an `on_fire` closure as a boxed value per entry would
//! force either `dyn FnOnce` allocation per timer or awkward lifetime
//! plumbing for no benefit here: the receiver already dispatches on
//! `(state, event)` pairs, so a fired timer is just another event value for
//! that same `match`.
//!
//! Time is supplied by the caller as an explicit [`std::time::Instant`]
//! rather than read internally via `Instant::now()`, so tests can drive the
//! service deterministically without real sleeps.
//!
//! # Invariants
//!
//! - At most one deadline is ever scheduled per key; [`TimerService::schedule`]
//!   replacing an existing entry for the same key is the stated CFDP
//!   semantics ("If `key` already exists, its prior timer is cancelled and
//!   replaced").
//! - [`TimerService::tick`] returns fired keys in non-decreasing deadline
//!   order and removes them before returning, so a caller that reacts to a
//!   fired timer by calling [`TimerService::schedule`] again for the same
//!   key can never observe that new timer in the same `tick` call — the
//!   fired set is a snapshot taken before any caller code runs.
//! - [`TimerService::cancel`] is always safe to call for a key that is not
//!   scheduled; it is a no-op.
//!
//! # Examples
//!
//! ```
//! use cfdp_timer::TimerService;
//! use std::time::{Duration, Instant};
//!
//! #[derive(Clone, Eq, PartialEq, Debug)]
//! enum Key { Nak }
//!
//! let mut timers = TimerService::new();
//! let t0 = Instant::now();
//! timers.schedule_after(Key::Nak, t0, Duration::from_secs(10));
//! assert!(timers.tick(t0).is_empty());
//! assert_eq!(timers.tick(t0 + Duration::from_secs(11)), vec![Key::Nak]);
//! ```
//!
//! # See also
//!
//! - [`cfdp_receiver`](https://docs.rs/cfdp_receiver) wires this service's
//!   fired keys back into its event dispatch.

use std::time::{Duration, Instant};

/// A keyed one-shot scheduler. `K` is typically a small `Copy` enum such as
/// a receiver's `NAK` / `INACTIVITY` / `FINISHED_ACK_WAIT` timer key.
#[derive(Debug, Clone, Default)]
pub struct TimerService<K> {
    entries: Vec<(K, Instant)>,
}

impl<K: Clone + PartialEq> TimerService<K> {
    /// Creates an empty scheduler.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Schedules `key` to fire at `deadline`, replacing any prior timer for
    /// the same key.
    pub fn schedule(&mut self, key: K, deadline: Instant) {
        self.cancel(&key);
        self.entries.push((key, deadline));
    }

    /// Convenience wrapper around [`TimerService::schedule`] that computes
    /// the deadline from `now + delay`.
    pub fn schedule_after(&mut self, key: K, now: Instant, delay: Duration) {
        self.schedule(key, now + delay);
    }

    /// Removes the timer for `key` if one is scheduled. Always safe to call.
    pub fn cancel(&mut self, key: &K) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(existing, _)| existing != key);
        self.entries.len() != before
    }

    /// Reports whether `key` currently has a pending timer.
    #[must_use]
    pub fn is_scheduled(&self, key: &K) -> bool {
        self.entries.iter().any(|(existing, _)| existing == key)
    }

    /// The deadline for `key`, if scheduled.
    #[must_use]
    pub fn deadline(&self, key: &K) -> Option<Instant> {
        self.entries
            .iter()
            .find(|(existing, _)| existing == key)
            .map(|(_, deadline)| *deadline)
    }

    /// Removes and returns every key whose deadline is at or before `now`,
    /// in non-decreasing deadline order.
    pub fn tick(&mut self, now: Instant) -> Vec<K> {
        let mut fired = Vec::new();
        let mut remaining = Vec::with_capacity(self.entries.len());
        for (key, deadline) in self.entries.drain(..) {
            if deadline <= now {
                fired.push((key, deadline));
            } else {
                remaining.push((key, deadline));
            }
        }
        self.entries = remaining;
        fired.sort_by_key(|(_, deadline)| *deadline);
        fired.into_iter().map(|(key, _)| key).collect()
    }

    /// Cancels every scheduled timer.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Eq, PartialEq, Debug)]
    enum Key {
        Nak,
        Inactivity,
        FinishedAckWait,
    }

    #[test]
    fn schedule_then_tick_before_deadline_does_not_fire() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::Nak, now, Duration::from_secs(10));
        assert!(timers.tick(now + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn tick_at_or_past_deadline_fires() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::Nak, now, Duration::from_secs(10));
        assert_eq!(timers.tick(now + Duration::from_secs(10)), vec![Key::Nak]);
    }

    #[test]
    fn fired_timer_is_removed() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::Nak, now, Duration::from_secs(1));
        let _ = timers.tick(now + Duration::from_secs(2));
        assert!(!timers.is_scheduled(&Key::Nak));
        assert!(timers.tick(now + Duration::from_secs(100)).is_empty());
    }

    #[test]
    fn rescheduling_replaces_the_prior_timer() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::Nak, now, Duration::from_secs(1));
        timers.schedule_after(Key::Nak, now, Duration::from_secs(100));
        assert!(timers.tick(now + Duration::from_secs(2)).is_empty());
        assert!(timers.is_scheduled(&Key::Nak));
    }

    #[test]
    fn cancel_is_a_no_op_when_unscheduled() {
        let mut timers: TimerService<Key> = TimerService::new();
        assert!(!timers.cancel(&Key::Inactivity));
    }

    #[test]
    fn multiple_keys_fire_in_deadline_order() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::FinishedAckWait, now, Duration::from_secs(3));
        timers.schedule_after(Key::Nak, now, Duration::from_secs(1));
        timers.schedule_after(Key::Inactivity, now, Duration::from_secs(2));

        let fired = timers.tick(now + Duration::from_secs(10));
        assert_eq!(fired, vec![Key::Nak, Key::Inactivity, Key::FinishedAckWait]);
    }

    #[test]
    fn reentrant_schedule_during_reaction_does_not_fire_same_tick() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::Nak, now, Duration::from_secs(1));

        let fired = timers.tick(now + Duration::from_secs(5));
        assert_eq!(fired, vec![Key::Nak]);

        // Reacting to the fire by rescheduling happens *after* tick
        // returned; it must not retroactively appear in `fired`.
        timers.schedule_after(Key::Nak, now + Duration::from_secs(5), Duration::from_secs(1));
        assert!(timers.tick(now + Duration::from_secs(5)).is_empty());
    }

    #[test]
    fn clear_cancels_every_timer() {
        let mut timers = TimerService::new();
        let now = Instant::now();
        timers.schedule_after(Key::Nak, now, Duration::from_secs(1));
        timers.schedule_after(Key::Inactivity, now, Duration::from_secs(1));
        timers.clear();
        assert!(timers.tick(now + Duration::from_secs(10)).is_empty());
    }
}
