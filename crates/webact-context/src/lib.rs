//! The request-scoped context handle the activity engine carries.
//!
//! `webact_core::collector::Collector` is generic over a context type and
//! treats it as an opaque, cheaply cloneable handle (spec.md §6: "its sole
//! engine-visible operation is copy/refcount"). `Context` here is that
//! handle: a request id, a creation timestamp, a small key/value [`bag`],
//! and a logging scope that tags every line with the request id, the one
//! piece of "ambient HTTP scaffolding" SPEC_FULL.md calls out as worth
//! carrying even though HTTP parsing/routing/templating themselves are
//! non-goals.

pub mod bag;
pub mod config;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use bag::Bag;

struct Inner {
    request_id: Uuid,
    created_at: DateTime<Utc>,
    bag: Bag,
}

/// Cheap to clone: an `Arc` around the shared request state, exactly the
/// "copy/refcount" contract the core requires of its `Ctx` type parameter.
#[derive(Clone)]
pub struct Context(Arc<Inner>);

impl Context {
    pub fn new() -> Self {
        Context(Arc::new(Inner { request_id: Uuid::new_v4(), created_at: Utc::now(), bag: Bag::new() }))
    }

    pub fn request_id(&self) -> Uuid {
        self.0.request_id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.0.created_at
    }

    pub fn bag(&self) -> &Bag {
        &self.0.bag
    }

    /// Logs at `info` level with the request id prefixed, standing in for
    /// the structured logging scope a real HTTP context would open per
    /// request.
    pub fn info(&self, msg: &str) {
        log::info!("[{}] {}", self.0.request_id, msg);
    }

    pub fn warn(&self, msg: &str) {
        log::warn!("[{}] {}", self.0.request_id, msg);
    }

    pub fn error(&self, msg: &str) {
        log::error!("[{}] {}", self.0.request_id, msg);
    }
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_the_same_request_id_and_bag() {
        let ctx = Context::new();
        let clone = ctx.clone();
        assert_eq!(ctx.request_id(), clone.request_id());
        clone.bag().set("k", 1u32);
        assert_eq!(ctx.bag().get::<u32>("k"), Some(1));
    }

    #[test]
    fn fresh_contexts_get_distinct_request_ids() {
        assert_ne!(Context::new().request_id(), Context::new().request_id());
    }
}
