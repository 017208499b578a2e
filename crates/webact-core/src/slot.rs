//! Per-activity result slot: the terminal state record a [`crate::collector::Collector`]
//! holds for each activity type in its key set.
//!
//! Three independent flags (`completed`, `canceled`, `success_set`) are
//! all a slot has. Every predicate below is a pure function of those
//! three booleans.

use std::fmt;

/// Terminal record for a single activity. `S` is the success payload type,
/// `F` the failure payload type. Both must be `Default` so a slot that
/// hasn't reached the relevant branch can return a harmless placeholder,
/// mirroring the original `success()`/`failure()` accessors.
pub struct Slot<S, F> {
    completed: bool,
    canceled: bool,
    success_set: bool,
    success: S,
    failure: F,
}

impl<S: Default, F: Default> Default for Slot<S, F> {
    fn default() -> Self {
        Slot {
            completed: false,
            canceled: false,
            success_set: false,
            success: S::default(),
            failure: F::default(),
        }
    }
}

impl<S: fmt::Debug, F: fmt::Debug> fmt::Debug for Slot<S, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Slot")
            .field("completed", &self.completed)
            .field("canceled", &self.canceled)
            .field("success_set", &self.success_set)
            .finish()
    }
}

impl<S: Default, F: Default> Slot<S, F> {
    pub fn new() -> Self {
        Self::default()
    }

    /// First terminal event wins (P1): `completed` latches and a second
    /// `set_success`/`set_failure` is a no-op. `set_cancel` is the one
    /// transition that can still apply afterwards; see its own doc.
    pub fn set_success(&mut self, value: S) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.success_set = true;
        self.success = value;
    }

    pub fn set_failure(&mut self, value: F) {
        if self.completed {
            return;
        }
        self.completed = true;
        self.failure = value;
    }

    /// Marks the slot canceled without touching `completed`/`success_set`.
    /// Applied before any other write, this produces a pure cancellation
    /// (`completed=false`), a fourth terminal shape distinct from `okay`,
    /// `failed` and `error` (P2). Applied after `set_success` (the
    /// `cancel_if` path), it produces `error` (`completed ∧ success_set ∧
    /// canceled`), preserving the success payload already recorded.
    pub fn set_cancel(&mut self) {
        self.canceled = true;
    }

    pub fn completed(&self) -> bool {
        self.completed
    }

    pub fn canceled(&self) -> bool {
        self.canceled
    }

    /// `okay` ≡ `completed ∧ success_set ∧ ¬canceled`.
    pub fn okay(&self) -> bool {
        self.completed && self.success_set && !self.canceled
    }

    /// `failed` ≡ `completed ∧ ¬canceled ∧ ¬success_set`. A pure
    /// cancellation (`completed=false`) is neither `okay` nor `failed`.
    pub fn failed(&self) -> bool {
        self.completed && !self.canceled && !self.success_set
    }

    /// `error` ≡ `completed ∧ success_set ∧ canceled`: succeeded, then
    /// converted to cancel by `cancel_if`.
    pub fn error(&self) -> bool {
        self.completed && self.success_set && self.canceled
    }

    pub fn success_data(&self) -> &S {
        &self.success
    }

    pub fn failure_data(&self) -> &F {
        &self.failure
    }

    pub fn apply<R>(&self, on_success: impl FnOnce(&S) -> R, on_failure: impl FnOnce(&F) -> R) -> Option<R> {
        if !self.completed {
            return None;
        }
        Some(if self.success_set {
            on_success(&self.success)
        } else {
            on_failure(&self.failure)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fresh_slot_is_pending_not_any_terminal_state() {
        let slot: Slot<u32, String> = Slot::new();
        assert!(!slot.completed());
        assert!(!slot.okay());
        assert!(!slot.error());
        assert!(!slot.failed());
        assert!(!slot.canceled());
    }

    #[test]
    fn success_sets_okay_and_not_error() {
        let mut slot: Slot<u32, String> = Slot::new();
        slot.set_success(7);
        assert!(slot.completed());
        assert!(slot.okay());
        assert!(!slot.error());
        assert!(!slot.failed());
        assert_eq!(*slot.success_data(), 7);
    }

    #[test]
    fn failure_sets_failed_not_okay_or_error() {
        let mut slot: Slot<u32, String> = Slot::new();
        slot.set_failure("boom".to_string());
        assert!(slot.completed());
        assert!(!slot.okay());
        assert!(!slot.error());
        assert!(slot.failed());
    }

    #[test]
    fn cancel_after_success_produces_error_and_keeps_payload() {
        let mut slot: Slot<u32, String> = Slot::new();
        slot.set_success(42);
        slot.set_cancel();
        assert!(slot.canceled());
        assert!(!slot.okay());
        assert!(slot.error());
        assert!(!slot.failed());
        assert_eq!(*slot.success_data(), 42);
    }

    #[test]
    fn pure_cancel_with_no_prior_event_is_not_completed() {
        let mut slot: Slot<u32, String> = Slot::new();
        slot.set_cancel();
        assert!(slot.canceled());
        assert!(!slot.completed());
        assert!(!slot.okay());
        assert!(!slot.error());
        assert!(!slot.failed());
    }

    #[test]
    fn first_terminal_event_wins() {
        let mut slot: Slot<u32, String> = Slot::new();
        slot.set_success(1);
        slot.set_success(2);
        assert_eq!(*slot.success_data(), 1);
    }

    #[test]
    fn predicates_are_mutually_exclusive() {
        let mut a: Slot<u32, String> = Slot::new();
        a.set_success(1);
        assert!(a.okay() && !a.error() && !a.failed());

        let mut b: Slot<u32, String> = Slot::new();
        b.set_failure("x".into());
        assert!(!b.okay() && !b.error() && b.failed());

        let mut c: Slot<u32, String> = Slot::new();
        c.set_success(1);
        c.set_cancel();
        assert!(!c.okay() && c.error() && !c.failed());
    }
}
