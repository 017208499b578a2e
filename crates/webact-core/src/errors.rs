//! Errors raised by the activity engine itself.
//!
//! A user activity's own failure is never represented here: `Failure`
//! payloads and cancellation are ordinary terminal states of a result slot,
//! not engine errors. This enum only covers misuse of the engine's API and
//! the panic-guard path described in [`crate::activity`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("activity type `{type_name}` is not part of this collector's key set")]
    UnknownActivity { type_name: &'static str },

    #[error("the starter activity has no parents and cannot be prepared")]
    StarterHasNoParents,

    #[error("activity `{activity}` panicked: {payload}")]
    PanicInActivity { activity: &'static str, payload: String },
}

pub type Result<T> = std::result::Result<T, Error>;
