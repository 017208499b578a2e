//! Read-only view over a collector.
//!
//! The original `accessor<T...>` narrows the compile-time key set to the
//! subset of activities a particular piece of code is allowed to read.
//! The collector's key set is already a runtime set here (see
//! `crate::collector`), so `Accessor` narrows the *API surface* instead:
//! a cheap clone of the same `Arc<Collector<_>>` handle with no write
//! methods at all.

use std::sync::Arc;

use crate::activity::Activity;
use crate::collector::Collector;

#[derive(Clone)]
pub struct Accessor<Ctx> {
    collector: Arc<Collector<Ctx>>,
}

impl<Ctx: Clone> Accessor<Ctx> {
    pub fn new(collector: Arc<Collector<Ctx>>) -> Self {
        Accessor { collector }
    }

    pub fn context(&self) -> Ctx {
        self.collector.context()
    }

    pub fn exists<A: Activity>(&self) -> bool {
        self.collector.exists::<A>()
    }

    pub fn completed<A: Activity>(&self) -> bool {
        self.collector.completed::<A>()
    }

    pub fn canceled<A: Activity>(&self) -> bool {
        self.collector.canceled::<A>()
    }

    pub fn okay<A: Activity>(&self) -> bool {
        self.collector.okay::<A>()
    }

    pub fn failed<A: Activity>(&self) -> bool {
        self.collector.failed::<A>()
    }

    pub fn error<A: Activity>(&self) -> bool {
        self.collector.error::<A>()
    }

    pub fn success<A: Activity>(&self) -> A::Success
    where
        A::Success: Clone,
    {
        self.collector.success::<A>()
    }

    pub fn failure<A: Activity>(&self) -> A::Failure
    where
        A::Failure: Clone,
    {
        self.collector.failure::<A>()
    }

    pub fn apply<A: Activity, R>(
        &self,
        on_success: impl FnOnce(&A::Success) -> R,
        on_failure: impl FnOnce(&A::Failure) -> R,
    ) -> Option<R> {
        self.collector.apply::<A, R>(on_success, on_failure)
    }
}
