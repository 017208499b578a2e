//! The `Activity` trait and the shared exit-route algorithm every activity
//! runs through when it reaches a terminal state.
//!
//! `ActivityCore` is composition, not inheritance. A concrete activity
//! embeds an `ActivityCore<A>` field and forwards
//! `required`/`cancel_if`/`if_errored`/`if_failed` to it instead of
//! overriding virtual methods the way the original `activity<...>` base
//! class does.

use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::{Arc, Mutex};

use crate::errors::{Error, Result};

/// A boxed synchronous predicate over the activity, used for
/// `cancel_if`/`if_errored`/`if_failed`. Evaluated after the slot has
/// already recorded the incoming success/failure, so a hook can inspect
/// `self` through the `&A` reference passed to `finish`.
pub type Hook<A> = Box<dyn Fn(&A) -> bool + Send + Sync>;

/// One-shot completion/cancellation listener. Held in registration order
/// and drained exactly once per terminal event, matching the original
/// `boost::signals2::signal` semantics without pulling in a signals crate.
pub type Listener = Box<dyn FnOnce() + Send>;

/// Every user-defined activity implements this trait. `Success`/`Failure`
/// are the payload types stored in the activity's slot; `run` is the async
/// body a subtask invokes once all of its parents have arrived.
#[async_trait::async_trait]
pub trait Activity: Send + Sync + 'static {
    type Success: Send + Sync + 'static + Default;
    type Failure: Send + Sync + 'static + Default;

    /// Human-readable name used in panic/error messages; defaults to the
    /// Rust type name, which is enough to disambiguate activities in logs.
    fn name() -> &'static str {
        std::any::type_name::<Self>()
    }

    /// Access to the embedded base state. Composition stands in for the
    /// inheritance the original `activity<DerivedT, ...>` CRTP base uses:
    /// a concrete activity holds an `ActivityCore<Self>` field and returns
    /// a reference to it here.
    fn core(&self) -> &ActivityCore<Self>
    where
        Self: Sized;

    async fn run(&self) -> std::result::Result<Self::Success, Self::Failure>;
}

/// Whether an activity's terminal state propagates to its children
/// (`Proceed`) or tells them to cancel instead (`Cancel`). Governs only
/// what children see; see [`FinishOutcome::mark_canceled`] for how the
/// activity's own slot ends up marked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitRoute {
    Proceed,
    Cancel,
}

/// Entry condition fed into `finish`: which terminal event the activity's
/// body (or an upstream cancellation) produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entry {
    Success,
    Failure,
    Cancel,
}

/// Result of the `_finish` exit-route decision. `route` decides what
/// children are told; `mark_canceled` decides whether the activity's own
/// slot additionally gets `set_cancel()`'d. The two are independent: a
/// `cancel_if`-triggered success can end up `mark_canceled: true` with
/// `route: Proceed` when `if_errored` overrides the abort, so the activity
/// itself still reads as `error` while its children still start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinishOutcome {
    pub route: ExitRoute,
    pub mark_canceled: bool,
}

struct Hooks<A> {
    required: bool,
    cancel_if: Option<Hook<A>>,
    if_errored: Option<Hook<A>>,
    if_failed: Option<Hook<A>>,
}

impl<A> Default for Hooks<A> {
    fn default() -> Self {
        Hooks { required: true, cancel_if: None, if_errored: None, if_failed: None }
    }
}

/// The state an activity's base keeps: its hooks and its two listener
/// lists. A concrete activity embeds one of these and forwards the builder
/// methods (`required`, `cancel_if`, ...) to it.
pub struct ActivityCore<A> {
    hooks: Mutex<Hooks<A>>,
    on_done: Mutex<Vec<Listener>>,
    on_canceled: Mutex<Vec<Listener>>,
}

impl<A> Default for ActivityCore<A> {
    fn default() -> Self {
        ActivityCore {
            hooks: Mutex::new(Hooks::default()),
            on_done: Mutex::new(Vec::new()),
            on_canceled: Mutex::new(Vec::new()),
        }
    }
}

impl<A: Activity> ActivityCore<A> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_required(&self, required: bool) {
        self.hooks.lock().unwrap().required = required;
    }

    pub fn set_cancel_if(&self, hook: Hook<A>) {
        self.hooks.lock().unwrap().cancel_if = Some(hook);
    }

    pub fn set_if_errored(&self, hook: Hook<A>) {
        self.hooks.lock().unwrap().if_errored = Some(hook);
    }

    pub fn set_if_failed(&self, hook: Hook<A>) {
        self.hooks.lock().unwrap().if_failed = Some(hook);
    }

    /// Installs the same predicate as both `if_errored` and `if_failed`,
    /// exactly mirroring `subtask::if_canceled` in the original source:
    /// cancellation there is not a distinct hook slot, it is a convenience
    /// that arms both failure-shaped hooks identically. The closure is
    /// shared behind an `Arc` so both slots can own a handle to it.
    pub fn set_if_canceled(&self, hook: Hook<A>) {
        let shared: Arc<dyn Fn(&A) -> bool + Send + Sync> = Arc::from(hook);
        let a = shared.clone();
        let b = shared;
        let mut hooks = self.hooks.lock().unwrap();
        hooks.if_errored = Some(Box::new(move |act: &A| a(act)));
        hooks.if_failed = Some(Box::new(move |act: &A| b(act)));
    }

    pub fn add_listener(&self, listener: Listener) {
        self.on_done.lock().unwrap().push(listener);
    }

    pub fn add_cancel_listener(&self, listener: Listener) {
        self.on_canceled.lock().unwrap().push(listener);
    }

    /// Guards an arbitrary user callback (the activity body, a hook, a
    /// preparator, a listener) against panicking and converts a caught
    /// panic into an engine error, exactly as spec.md's exception-safety
    /// note requires. A panicking hook is treated as if it had returned
    /// `true` by the caller in `finish`, below.
    pub fn guard<R>(activity: &'static str, f: impl FnOnce() -> R + std::panic::UnwindSafe) -> Result<R> {
        catch_unwind(f).map_err(|payload| {
            let msg = payload
                .downcast_ref::<&str>()
                .map(|s| s.to_string())
                .or_else(|| payload.downcast_ref::<String>().cloned())
                .unwrap_or_else(|| "non-string panic payload".to_string());
            Error::PanicInActivity { activity, payload: msg }
        })
    }

    /// The exit-route decision, reproduced bit-exact from the original
    /// reference implementation's `_finish()`:
    ///
    /// - `Entry::Cancel` always routes `Cancel`. No hook is consulted.
    /// - `Entry::Failure` consults `if_failed`. If the hook is set and
    ///   returns `false`, the failure is forgiven and the route is
    ///   `Proceed`; otherwise (hook absent, or hook returns `true`) the
    ///   route is `Cancel` only when `required` is set, `Proceed`
    ///   otherwise. The activity's own slot is left exactly as
    ///   `run_and_finish` recorded it (`failed`, not `canceled`).
    /// - `Entry::Success` consults `cancel_if`. If it is unset or returns
    ///   `false`, the route is `Proceed` and nothing else changes. If it
    ///   returns `true`, the slot is additionally marked canceled
    ///   (`mark_canceled: true`, turning the already-recorded success into
    ///   `error`), and `if_errored` gets a say over the *route* only: if
    ///   `if_errored` is set and returns `false`, the abort is abandoned and
    ///   children still see `Proceed` even though this activity reads as
    ///   `error`; otherwise the route is `Cancel`.
    ///
    /// A missing hook never silently proceeds a `cancel_if`/`required`
    /// abort. Only an explicit `false` return does.
    pub fn finish(&self, activity: &A, entry: Entry) -> FinishOutcome {
        let hooks = self.hooks.lock().unwrap();
        let run_hook = |hook: &Option<Hook<A>>| -> Option<bool> {
            hook.as_ref().map(|h| match Self::guard("hook", AssertUnwindSafe(|| h(activity))) {
                Ok(v) => v,
                Err(_) => true,
            })
        };

        match entry {
            Entry::Cancel => FinishOutcome { route: ExitRoute::Cancel, mark_canceled: false },
            Entry::Failure => {
                let route = match run_hook(&hooks.if_failed) {
                    Some(false) => ExitRoute::Proceed,
                    _ if hooks.required => ExitRoute::Cancel,
                    _ => ExitRoute::Proceed,
                };
                FinishOutcome { route, mark_canceled: false }
            }
            Entry::Success => {
                if run_hook(&hooks.cancel_if).unwrap_or(false) {
                    let route = match run_hook(&hooks.if_errored) {
                        Some(false) => ExitRoute::Proceed,
                        _ => ExitRoute::Cancel,
                    };
                    FinishOutcome { route, mark_canceled: true }
                } else {
                    FinishOutcome { route: ExitRoute::Proceed, mark_canceled: false }
                }
            }
        }
    }

    pub fn required(&self) -> bool {
        self.hooks.lock().unwrap().required
    }

    /// Drains and invokes every completion listener exactly once, in
    /// registration order, guarding each against panics individually so one
    /// misbehaving listener cannot suppress the rest.
    pub fn dispatch_done(&self) {
        let listeners: Vec<Listener> = std::mem::take(&mut *self.on_done.lock().unwrap());
        for listener in listeners {
            let _ = Self::guard("listener", AssertUnwindSafe(listener));
        }
    }

    pub fn dispatch_canceled(&self) {
        let listeners: Vec<Listener> = std::mem::take(&mut *self.on_canceled.lock().unwrap());
        for listener in listeners {
            let _ = Self::guard("cancel listener", AssertUnwindSafe(listener));
        }
    }
}
