//! Final barrier: fires a user callback exactly once after every watched
//! activity reaches a terminal state.
//!
//! There is no single `require<A1,...>::with(collector)` constructor the
//! way spec.md's C++ source writes it (Rust generics aren't variadic). The
//! Rust shape is a builder that `watch`es one already-built `Subtask` at a
//! time, attaching its own listeners to each watched activity's completion
//! and cancellation lists directly (the collector only stores slots, not
//! activity listener lists; see `crate::collector`).

use std::sync::{Arc, Mutex};

use crate::accessor::Accessor;
use crate::activity::Activity;
use crate::collector::Collector;
use crate::reactor::Reactor;
use crate::subtask::Subtask;

struct BarrierState {
    remaining: usize,
    any_canceled: bool,
    fired: bool,
}

struct Inner<Ctx> {
    collector: Arc<Collector<Ctx>>,
    reactor: Arc<dyn Reactor>,
    force: bool,
    state: Mutex<BarrierState>,
    callback: Box<dyn Fn(Accessor<Ctx>) + Send + Sync>,
}

impl<Ctx: Clone + Send + Sync + 'static> Inner<Ctx> {
    /// One watched activity reached a terminal state. Decrements the
    /// remaining count and fires the callback, posted to the reactor
    /// (never inline), the first time either every watched activity has
    /// arrived or `force` is set and at least one watched activity was
    /// canceled.
    fn arrive(this: &Arc<Self>, canceled: bool) {
        let should_fire = {
            let mut state = this.state.lock().unwrap();
            if state.fired {
                return;
            }
            if canceled {
                state.any_canceled = true;
            }
            if state.remaining > 0 {
                state.remaining -= 1;
            }
            if state.remaining == 0 || (this.force && state.any_canceled) {
                state.fired = true;
                true
            } else {
                false
            }
        };
        if should_fire {
            let this = this.clone();
            let accessor = Accessor::new(this.collector.clone());
            this.reactor.post(Box::pin(async move {
                (this.callback)(accessor);
            }));
        }
    }
}

/// Accumulates the set of activities a [`FinalBarrier`] watches before the
/// callback is armed with [`FinalBarrierBuilder::exec`].
pub struct FinalBarrierBuilder<Ctx> {
    collector: Arc<Collector<Ctx>>,
    reactor: Arc<dyn Reactor>,
    total: usize,
    force: bool,
    hooks: Vec<Box<dyn FnOnce(Arc<Inner<Ctx>>) + Send>>,
}

impl<Ctx: Clone + Send + Sync + 'static> FinalBarrierBuilder<Ctx> {
    pub fn new(collector: Arc<Collector<Ctx>>, reactor: Arc<dyn Reactor>) -> Self {
        FinalBarrierBuilder { collector, reactor, total: 0, force: false, hooks: Vec::new() }
    }

    /// Fire early if any watched activity ends up canceled, even while
    /// others are still pending (spec.md §4.7's `force` flag).
    pub fn force(mut self, force: bool) -> Self {
        self.force = force;
        self
    }

    /// Adds `subtask`'s activity to the watched set.
    pub fn watch<A: Activity>(mut self, subtask: &Subtask<Ctx, A>) -> Self {
        self.total += 1;
        let activity = subtask.activity_arc();
        self.hooks.push(Box::new(move |inner: Arc<Inner<Ctx>>| {
            let done_inner = inner.clone();
            activity.core().add_listener(Box::new(move || Inner::arrive(&done_inner, false)));
            activity.core().add_cancel_listener(Box::new(move || Inner::arrive(&inner, true)));
        }));
        self
    }

    /// Arms the barrier with `callback`, invoked exactly once (posted on
    /// the reactor) once the watched set has fully terminated.
    pub fn exec(self, callback: impl Fn(Accessor<Ctx>) + Send + Sync + 'static) -> FinalBarrier<Ctx> {
        let inner = Arc::new(Inner {
            collector: self.collector,
            reactor: self.reactor,
            force: self.force,
            state: Mutex::new(BarrierState { remaining: self.total, any_canceled: false, fired: false }),
            callback: Box::new(callback),
        });
        for hook in self.hooks {
            hook(inner.clone());
        }
        if self.total == 0 {
            Inner::arrive(&inner, false);
        }
        FinalBarrier { inner }
    }
}

/// A handle to an armed barrier. Kept around only so callers can hold it
/// alive for as long as the graph may still be running; it has no public
/// operations of its own once `exec` has armed it.
pub struct FinalBarrier<Ctx> {
    #[allow(dead_code)]
    inner: Arc<Inner<Ctx>>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityCore;
    use crate::collector::Collector;
    use crate::reactor::{BoxFuture, Reactor, Strand};
    use crate::starter::Starter;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Inline;
    impl Reactor for Inline {
        fn post(&self, task: BoxFuture) {
            tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(task);
        }
        fn timer(&self, _after: Duration, task: BoxFuture) {
            self.post(task);
        }
        fn strand(&self) -> Box<dyn Strand> {
            struct S;
            impl Strand for S {
                fn post(&self, task: BoxFuture) {
                    tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap().block_on(task);
                }
            }
            Box::new(S)
        }
    }

    #[derive(Default)]
    struct A {
        core: ActivityCore<A>,
    }
    #[async_trait::async_trait]
    impl Activity for A {
        type Success = u32;
        type Failure = String;
        fn core(&self) -> &ActivityCore<Self> {
            &self.core
        }
        async fn run(&self) -> std::result::Result<u32, String> {
            Ok(1)
        }
    }

    #[derive(Default)]
    struct B {
        core: ActivityCore<B>,
    }
    #[async_trait::async_trait]
    impl Activity for B {
        type Success = u32;
        type Failure = String;
        fn core(&self) -> &ActivityCore<Self> {
            &self.core
        }
        async fn run(&self) -> std::result::Result<u32, String> {
            Ok(2)
        }
    }

    #[test]
    fn fires_once_after_every_watched_activity_terminates() {
        let collector = Arc::new(Collector::builder(()).with::<A>().with::<B>().build());
        let reactor: Arc<dyn Reactor> = Arc::new(Inline);
        let starter = Starter::with(collector.clone());
        let a = Subtask::with(collector.clone(), A::default(), reactor.clone());
        let b = Subtask::with(collector.clone(), B::default(), reactor.clone());
        starter.done(&a);
        starter.done(&b);

        let fire_count = Arc::new(AtomicUsize::new(0));
        let count = fire_count.clone();
        let _barrier = FinalBarrierBuilder::new(collector.clone(), reactor.clone())
            .watch(&a)
            .watch(&b)
            .exec(move |acc| {
                count.fetch_add(1, Ordering::SeqCst);
                assert!(acc.okay::<A>());
                assert!(acc.okay::<B>());
            });

        starter.exec();
        assert_eq!(fire_count.load(Ordering::SeqCst), 1);
    }

    #[derive(Default)]
    struct FailingParent {
        core: ActivityCore<FailingParent>,
    }
    #[async_trait::async_trait]
    impl Activity for FailingParent {
        type Success = u32;
        type Failure = String;
        fn core(&self) -> &ActivityCore<Self> {
            &self.core
        }
        async fn run(&self) -> std::result::Result<u32, String> {
            Err("boom".to_string())
        }
    }

    /// Never wired to a starter or parent, so its combinator never arrives
    /// and it stays pending for the lifetime of the test.
    #[derive(Default)]
    struct NeverStarted {
        core: ActivityCore<NeverStarted>,
    }
    #[async_trait::async_trait]
    impl Activity for NeverStarted {
        type Success = u32;
        type Failure = String;
        fn core(&self) -> &ActivityCore<Self> {
            &self.core
        }
        async fn run(&self) -> std::result::Result<u32, String> {
            Ok(0)
        }
    }

    #[test]
    fn force_fires_early_when_a_watched_activity_is_canceled_while_others_are_still_pending() {
        let collector = Arc::new(
            Collector::builder(()).with::<FailingParent>().with::<B>().with::<NeverStarted>().build(),
        );
        let reactor: Arc<dyn Reactor> = Arc::new(Inline);
        let starter = Starter::with(collector.clone());
        let parent = Subtask::with(collector.clone(), FailingParent::default(), reactor.clone());
        let b = Subtask::with(collector.clone(), B::default(), reactor.clone());
        b.after(&parent);
        let pending = Subtask::with(collector.clone(), NeverStarted::default(), reactor.clone());

        let fired = Arc::new(AtomicUsize::new(0));
        let count = fired.clone();
        let _barrier = FinalBarrierBuilder::new(collector.clone(), reactor.clone())
            .force(true)
            .watch(&b)
            .watch(&pending)
            .exec(move |_acc| {
                count.fetch_add(1, Ordering::SeqCst);
            });

        starter.done(&parent);
        starter.exec();
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(collector.canceled::<B>());
        assert!(!collector.completed::<NeverStarted>());
    }
}
