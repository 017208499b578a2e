//! Graph-building handle around one activity: wires it to its parents and
//! its combinator, and exposes the hook/requirement builder methods.
//!
//! Mirrors `udho::activities::subtask<ActivityT, Dependencies...>`. The
//! root case (no parents) is `crate::starter::Starter`.

use std::sync::Arc;

use crate::activity::{Activity, Entry, ExitRoute, Hook};
use crate::collector::Collector;
use crate::combinator::{self, Combinator};
use crate::reactor::{BoxFuture, Reactor};

/// A handle to one activity participating in the graph, plus the
/// combinator that decides when it starts. Cloning a `Subtask` clones the
/// handle; both copies refer to the same run.
pub struct Subtask<Ctx, A: Activity> {
    activity: Arc<A>,
    combinator: Arc<Combinator>,
    collector: Arc<Collector<Ctx>>,
}

impl<Ctx, A: Activity> Clone for Subtask<Ctx, A> {
    fn clone(&self) -> Self {
        Subtask {
            activity: self.activity.clone(),
            combinator: self.combinator.clone(),
            collector: self.collector.clone(),
        }
    }
}

impl<Ctx: Clone + Send + Sync + 'static, A: Activity> Subtask<Ctx, A> {
    /// Builds a subtask for `activity`, wired to `collector` and ready to
    /// be hooked up to parents via [`Subtask::after`] or [`Subtask::done`].
    pub fn with(collector: Arc<Collector<Ctx>>, activity: A, reactor: Arc<dyn Reactor>) -> Self {
        let activity = Arc::new(activity);
        let combinator = Arc::new(Combinator::new(0));
        let subtask = Subtask { activity: activity.clone(), combinator: combinator.clone(), collector: collector.clone() };
        subtask.arm_start(reactor);
        subtask
    }

    fn arm_start(&self, reactor: Arc<dyn Reactor>) {
        let activity = self.activity.clone();
        let collector = self.collector.clone();
        self.combinator.on_start(move || {
            let fut: BoxFuture = Box::pin(run_and_finish::<Ctx, A>(activity, collector));
            reactor.post(fut);
        });

        let collector_cancel = self.collector.clone();
        let activity_cancel = self.activity.clone();
        self.combinator.on_cancel(move || {
            let _ = collector_cancel.set_cancel::<A>();
            activity_cancel.core().dispatch_canceled();
        });
    }

    /// Declares `parent` as a dependency. Waits for `parent` to reach a
    /// terminal state before starting; a `Cancel` route cancels this
    /// subtask instead of starting it. Symmetric with `parent.done(self)`.
    pub fn after<P: Activity>(&self, parent: &Subtask<Ctx, P>) -> &Self {
        self.depends_on_core(parent.activity.core())
    }

    /// Registers `next` as depending on this subtask. Symmetric inverse of
    /// `next.after(self)`.
    pub fn done<V: Activity>(&self, next: &Subtask<Ctx, V>) -> &Self {
        next.depends_on_core(self.activity.core());
        self
    }

    /// Lower-level form of `after` that takes an `ActivityCore` directly.
    /// Used by `Starter`, which has no `Subtask` of its own.
    pub fn depends_on_core<P: Activity>(&self, parent_core: &crate::activity::ActivityCore<P>) -> &Self {
        self.combinator.register_parent();
        combinator::connect(parent_core, self.combinator.clone());
        self
    }

    /// Clones the underlying activity handle. Used by `FinalBarrier` to
    /// attach its own listeners without needing write access to the
    /// `Subtask`.
    pub fn activity_arc(&self) -> Arc<A> {
        self.activity.clone()
    }

    /// Installs a callback that runs once, immediately before this
    /// activity starts. Never runs if the subtask ends up canceled instead.
    pub fn prepare(&self, f: impl FnOnce() + Send + 'static) -> &Self {
        self.combinator.prepare(f);
        self
    }

    pub fn required(&self, required: bool) -> &Self {
        self.activity.core().set_required(required);
        self
    }

    pub fn cancel_if(&self, hook: Hook<A>) -> &Self {
        self.activity.core().set_cancel_if(hook);
        self
    }

    pub fn if_errored(&self, hook: Hook<A>) -> &Self {
        self.activity.core().set_if_errored(hook);
        self
    }

    pub fn if_failed(&self, hook: Hook<A>) -> &Self {
        self.activity.core().set_if_failed(hook);
        self
    }

    pub fn if_canceled(&self, hook: Hook<A>) -> &Self {
        self.activity.core().set_if_canceled(hook);
        self
    }

    pub fn activity(&self) -> &A {
        &self.activity
    }

    /// Starts this subtask directly, bypassing the combinator's arrival
    /// count. Only meaningful for a subtask with no registered parents.
    pub fn start(&self, reactor: Arc<dyn Reactor>) {
        let activity = self.activity.clone();
        let collector = self.collector.clone();
        reactor.post(Box::pin(run_and_finish::<Ctx, A>(activity, collector)));
    }
}

/// Runs the activity body, records the outcome in its slot, decides the
/// exit route, and dispatches listeners. Mirrors the original's
/// `success(data)`/`failure(data)` entry points followed by `_finish()`.
async fn run_and_finish<Ctx, A>(activity: Arc<A>, collector: Arc<Collector<Ctx>>)
where
    Ctx: Clone + Send + Sync + 'static,
    A: Activity,
{
    let activity_for_run = activity.clone();
    let spawn_result = tokio::spawn(async move { activity_for_run.run().await }).await;

    let entry = match spawn_result {
        Ok(Ok(success)) => {
            let _ = collector.set_success::<A>(success);
            Entry::Success
        }
        Ok(Err(failure)) => {
            let _ = collector.set_failure::<A>(failure);
            Entry::Failure
        }
        Err(join_err) => {
            let message = if join_err.is_panic() {
                panic_message(join_err.into_panic())
            } else {
                "activity task was canceled before completion".to_string()
            };
            log::error!(
                "activity `{}` panicked (engine {}): {}",
                A::name(),
                crate::constants::ENGINE_VERSION,
                message
            );
            let _ = collector.set_failure::<A>(A::Failure::default());
            Entry::Failure
        }
    };

    let outcome = activity.core().finish(&activity, entry);
    if outcome.mark_canceled {
        // cancel_if-triggered success only; turns the slot into `error`.
        let _ = collector.set_cancel::<A>();
    }
    match outcome.route {
        ExitRoute::Proceed => activity.core().dispatch_done(),
        ExitRoute::Cancel => activity.core().dispatch_canceled(),
    }
}

fn panic_message(payload: Box<dyn std::any::Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "non-string panic payload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activity::ActivityCore;
    use crate::reactor::{BoxFuture, Reactor, Strand};
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
    struct Parent {
        core: ActivityCore<Parent>,
    }
    #[async_trait::async_trait]
    impl Activity for Parent {
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
    struct Child {
        core: ActivityCore<Child>,
    }
    #[async_trait::async_trait]
    impl Activity for Child {
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
    fn done_is_the_symmetric_inverse_of_after() {
        let collector = Arc::new(Collector::builder(()).with::<Parent>().with::<Child>().build());
        let reactor: Arc<dyn Reactor> = Arc::new(Inline);
        let parent = Subtask::with(collector.clone(), Parent::default(), reactor.clone());
        let child = Subtask::with(collector.clone(), Child::default(), reactor.clone());
        parent.done(&child);

        parent.start(reactor.clone());

        assert!(collector.okay::<Parent>());
        assert!(collector.okay::<Child>());
    }
}
