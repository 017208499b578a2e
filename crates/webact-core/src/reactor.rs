//! The reactor interface the engine consumes. Concrete implementations
//! (a `tokio`-backed one lives in the `webact-reactor` crate) decide how
//! `post`ed work actually gets scheduled; the engine only ever posts, it
//! never blocks waiting on its own posted work.

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

pub type BoxFuture = Pin<Box<dyn Future<Output = ()> + Send>>;

/// A reactor accepts fire-and-forget work (`post`) and can hand out a
/// [`Strand`] that guarantees a series of posted tasks run one at a time,
/// matching spec.md §6's "post/timer/strand" external interface.
pub trait Reactor: Send + Sync + 'static {
    fn post(&self, task: BoxFuture);

    fn timer(&self, after: Duration, task: BoxFuture);

    fn strand(&self) -> Box<dyn Strand>;
}

/// A serialized execution context: tasks posted to the same strand never
/// run concurrently with one another. The combinator doesn't strictly need
/// this (it serializes with its own mutex, per spec.md §5's alternative),
/// but a user activity that wants to coordinate with siblings without its
/// own lock can ask the context for one.
pub trait Strand: Send + Sync {
    fn post(&self, task: BoxFuture);
}
