//! Join node: counts parent arrivals for a child activity and decides
//! whether the child starts or is canceled outright.
//!
//! Mirrors `udho::activities::combinator<NextT, Dependencies...>`. Arrivals
//! are serialized behind a `Mutex` (spec.md §5's "lightweight mutex
//! guarding the counter" option) rather than posted onto a shared strand,
//! since every combinator here only ever guards its own counter and never
//! touches another combinator's state.

use std::sync::Mutex;

use crate::activity::{Activity, ActivityCore};

type Preparator = Box<dyn FnOnce() + Send>;
type Starter = Box<dyn FnOnce() + Send>;
type Canceler = Box<dyn FnOnce() + Send>;

struct Inner {
    remaining: usize,
    canceled: bool,
    fired: bool,
    preparator: Option<Preparator>,
}

/// Owned by a subtask's child side; the parent side only ever calls
/// [`Combinator::arrive`].
pub struct Combinator {
    inner: Mutex<Inner>,
    on_start: Mutex<Option<Starter>>,
    on_cancel: Mutex<Option<Canceler>>,
}

impl Combinator {
    /// `parents` is the number of activities this combinator waits on
    /// before starting its child.
    pub fn new(parents: usize) -> Self {
        Combinator {
            inner: Mutex::new(Inner { remaining: parents, canceled: false, fired: false, preparator: None }),
            on_start: Mutex::new(None),
            on_cancel: Mutex::new(None),
        }
    }

    /// Registers one more parent to wait on. Only valid before the graph
    /// has started running (`Subtask::after` calls this while the caller is
    /// still wiring the graph together, never after `arrive` has started
    /// firing).
    pub fn register_parent(&self) {
        self.inner.lock().unwrap().remaining += 1;
    }

    /// Installs the callback that starts the child activity. Called once,
    /// by `Subtask::with`, before the graph runs.
    pub fn on_start(&self, f: impl FnOnce() + Send + 'static) {
        *self.on_start.lock().unwrap() = Some(Box::new(f));
    }

    pub fn on_cancel(&self, f: impl FnOnce() + Send + 'static) {
        *self.on_cancel.lock().unwrap() = Some(Box::new(f));
    }

    /// A preparator runs once, immediately before the child starts, and
    /// never runs at all if the child ends up canceled instead. Installing
    /// a second preparator replaces the first.
    pub fn prepare(&self, f: impl FnOnce() + Send + 'static) {
        self.inner.lock().unwrap().preparator = Some(Box::new(f));
    }

    /// One parent's exit route arrives. `proceeded` is `true` when the
    /// parent's own `finish` routed to `Proceed`; `false` for `Cancel`.
    /// The first cancellation short-circuits the remaining arrivals: the
    /// child is told to cancel immediately rather than waiting for every
    /// parent to report in, matching the original's cancellation
    /// short-circuit (a diamond with one canceled parent doesn't wait on
    /// its sibling before canceling the join).
    pub fn arrive(&self, proceeded: bool) {
        let (should_cancel, should_start) = {
            let mut inner = self.inner.lock().unwrap();
            if inner.fired {
                return;
            }
            if !proceeded {
                inner.canceled = true;
            }
            if inner.remaining > 0 {
                inner.remaining -= 1;
            }

            if inner.canceled {
                inner.fired = true;
                (true, false)
            } else if inner.remaining == 0 {
                inner.fired = true;
                (false, true)
            } else {
                (false, false)
            }
        };

        if should_cancel {
            if let Some(cancel) = self.on_cancel.lock().unwrap().take() {
                cancel();
            }
        } else if should_start {
            let preparator = self.inner.lock().unwrap().preparator.take();
            if let Some(prepare) = preparator {
                prepare();
            }
            if let Some(start) = self.on_start.lock().unwrap().take() {
                start();
            }
        }
    }

    /// Force-cancels the child regardless of arrival count, used by the
    /// init/starter combinator specialization which has no parents to wait
    /// on and by an external cancellation request.
    pub fn cancel_now(&self) {
        let already_fired = {
            let mut inner = self.inner.lock().unwrap();
            let was_fired = inner.fired;
            inner.canceled = true;
            inner.fired = true;
            was_fired
        };
        if !already_fired {
            if let Some(cancel) = self.on_cancel.lock().unwrap().take() {
                cancel();
            }
        }
    }
}

/// Dispatches a parent `ActivityCore`'s completion/cancellation listeners
/// into a child combinator's `arrive` call, expressed once here so every
/// `Subtask::done` wiring goes through the same path.
pub fn connect<A: Activity>(parent: &ActivityCore<A>, child: std::sync::Arc<Combinator>) {
    let proceed_child = child.clone();
    parent.add_listener(Box::new(move || proceed_child.arrive(true)));
    parent.add_cancel_listener(Box::new(move || child.arrive(false)));
}
