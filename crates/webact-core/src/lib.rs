//! webact-core: the activity scheduler.
//!
//! Purpose:
//! - A dependency-graph-driven asynchronous task scheduler with typed
//!   per-task result storage, cancellation propagation, and hook-based
//!   policy overrides.
//! - Every user task (an [`Activity`]) is wired into a DAG through
//!   [`Subtask`] handles; a [`Combinator`] joins N parents before starting
//!   one child; a [`Starter`] gives the graph a single entry point; a
//!   [`FinalBarrier`] fires once every watched activity has terminated.
//!
//! Modules:
//! - `slot`: the per-activity terminal state record (`completed`,
//!   `canceled`, `success_set` and the derived `okay`/`failed`/`error`
//!   predicates).
//! - `collector`: the request-scoped typed map from activity identity to
//!   result slot.
//! - `accessor`: a read-only, type-narrowed view over a collector.
//! - `activity`: the `Activity` trait and the shared exit-route (`finish`)
//!   algorithm every activity runs through at its terminal event.
//! - `combinator`: the join node that waits for N parents before starting
//!   (or canceling) a child.
//! - `subtask`: the handle pairing one activity with its combinator and
//!   exposing `done`/`after`/`prepare`.
//! - `starter`: the synthetic always-succeeds root activity.
//! - `barrier`: the final completion barrier.
//! - `reactor`: the `post`/`timer`/`strand` interface the engine consumes
//!   (implemented by the `webact-reactor` crate).
//! - `errors`: engine-level errors, misuse of the API and the
//!   panic-guard path, never a user activity's own failure/cancellation.
//!
//! Re-exports: the symbols a downstream crate needs to build a graph are
//! re-exported here so `webact_core::{Activity, Subtask, Starter, ...}`
//! is enough for most call sites.

pub mod accessor;
pub mod activity;
pub mod barrier;
pub mod collector;
pub mod combinator;
pub mod constants;
pub mod errors;
pub mod reactor;
pub mod slot;
pub mod starter;
pub mod subtask;

pub use accessor::Accessor;
pub use activity::{Activity, ActivityCore, Entry, ExitRoute, FinishOutcome, Hook};
pub use barrier::{FinalBarrier, FinalBarrierBuilder};
pub use collector::{Collector, CollectorBuilder};
pub use combinator::Combinator;
pub use errors::{Error, Result};
pub use reactor::{BoxFuture, Reactor, Strand};
pub use slot::Slot;
pub use starter::Starter;
pub use subtask::Subtask;
