//! The synthetic root activity that kicks off a DAG.
//!
//! Mirrors `udho::activities::init<ContextT, Activities...>`: an activity
//! that always succeeds immediately and exists only to give a graph with
//! several independent roots a single entry point. A starter carries no
//! slot of its own in the collector; nothing ever reads `okay<Starter>()`.
//! It only exists to fan its single "go" signal out to every subtask
//! that declares it as a parent via [`Starter::done`].

use std::sync::Arc;

use crate::accessor::Accessor;
use crate::activity::{Activity, ActivityCore};
use crate::collector::Collector;
use crate::errors::{Error, Result};
use crate::subtask::Subtask;

/// Zero-sized marker type used only to give the starter's `ActivityCore` a
/// concrete `Activity` impl to be generic over; no instance of this type is
/// ever constructed or `run()`.
pub struct StarterMarker;

#[async_trait::async_trait]
impl Activity for StarterMarker {
    type Success = ();
    type Failure = ();

    fn core(&self) -> &ActivityCore<Self> {
        unreachable!("StarterMarker is never driven through run_and_finish")
    }

    async fn run(&self) -> std::result::Result<(), ()> {
        unreachable!("StarterMarker is never driven through run_and_finish")
    }
}

/// The DAG's entry point. Exposes the collector and an accessor for
/// convenience (spec.md §4.7), and a `done`/`exec` pair that plays the role
/// of the original's `operator()` / `done(combinator)`.
pub struct Starter<Ctx> {
    collector: Arc<Collector<Ctx>>,
    core: ActivityCore<StarterMarker>,
}

impl<Ctx: Clone + Send + Sync + 'static> Starter<Ctx> {
    pub fn with(collector: Arc<Collector<Ctx>>) -> Self {
        Starter { collector, core: ActivityCore::new() }
    }

    pub fn collector(&self) -> Arc<Collector<Ctx>> {
        self.collector.clone()
    }

    pub fn accessor(&self) -> Accessor<Ctx> {
        Accessor::new(self.collector.clone())
    }

    /// Declares `child` as depending on this starter: `child` won't start
    /// until [`Starter::exec`] is called. Symmetric with `Subtask::after`,
    /// but taking the starter instead of another subtask, since the
    /// starter has no combinator of its own to be a `Subtask`.
    pub fn done<A: Activity>(&self, child: &Subtask<Ctx, A>) -> &Self {
        child.depends_on_core(&self.core);
        self
    }

    /// A starter has no parents to read an outcome from, so preparing it
    /// is a runtime error (spec.md §4.7: "Preparing the starter is a
    /// compile-time error", downgraded to `Result::Err` per SPEC_FULL.md
    /// §9, since Rust's generics can't reject this at compile time the way
    /// the original's template specialization does).
    pub fn prepare(&self, _f: impl FnOnce()) -> Result<()> {
        Err(Error::StarterHasNoParents)
    }

    /// Starts the graph: fires every directly-attached child's arrival
    /// (always with `proceeded = true`, since the starter cannot fail or be
    /// canceled).
    pub fn exec(&self) {
        self.core.dispatch_done();
    }
}
