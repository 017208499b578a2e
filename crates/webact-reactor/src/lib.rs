//! A `tokio`-backed implementation of `webact_core::reactor::{Reactor, Strand}`.
//!
//! `TokioReactor` hands every `post`ed task to the ambient tokio runtime via
//! `tokio::spawn`; `timer` does the same after a `tokio::time::sleep`. A
//! strand serializes its posted tasks through an internal mpsc queue drained
//! by a single background task, so two activities sharing a strand never run
//! concurrently even though the reactor itself is fully parallel.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc;
use webact_core::reactor::{BoxFuture, Reactor, Strand};

#[derive(Clone, Default)]
pub struct TokioReactor {
    handle: Option<tokio::runtime::Handle>,
}

impl TokioReactor {
    /// Binds to the tokio runtime of the calling context (`Handle::current`).
    /// Panics outside of a tokio runtime, same as any other `tokio::spawn`
    /// call would.
    pub fn new() -> Self {
        TokioReactor { handle: Some(tokio::runtime::Handle::current()) }
    }

    fn handle(&self) -> tokio::runtime::Handle {
        self.handle.clone().unwrap_or_else(tokio::runtime::Handle::current)
    }
}

impl Reactor for TokioReactor {
    fn post(&self, task: BoxFuture) {
        self.handle().spawn(task);
    }

    fn timer(&self, after: Duration, task: BoxFuture) {
        let handle = self.handle();
        handle.spawn(async move {
            tokio::time::sleep(after).await;
            task.await;
        });
    }

    fn strand(&self) -> Box<dyn Strand> {
        Box::new(TokioStrand::new(self.handle()))
    }
}

/// Serializes posted tasks through an unbounded channel drained by a single
/// background worker task, so two activities sharing a strand run one at a
/// time regardless of which reactor thread posted them.
pub struct TokioStrand {
    sender: mpsc::UnboundedSender<BoxFuture>,
}

impl TokioStrand {
    fn new(handle: tokio::runtime::Handle) -> Self {
        let (sender, mut receiver) = mpsc::unbounded_channel::<BoxFuture>();
        handle.spawn(async move {
            while let Some(task) = receiver.recv().await {
                task.await;
            }
        });
        TokioStrand { sender }
    }
}

impl Strand for TokioStrand {
    fn post(&self, task: BoxFuture) {
        if self.sender.send(task).is_err() {
            log::warn!("posted to a strand whose worker task has already shut down");
        }
    }
}

/// Convenience constructor used by callers that already hold a runtime
/// handle (e.g. a CLI's `#[tokio::main]` entry point) and want an
/// `Arc<dyn Reactor>` ready to hand to `webact_core::starter::Starter`.
pub fn reactor() -> Arc<dyn Reactor> {
    Arc::new(TokioReactor::new())
}
