//! Request-scoped typed store of activity result slots.
//!
//! The original `udho::activities::collector<ContextT, T...>` keys its
//! slots through a compile-time heterogeneous container (`hazo::node`) built
//! from the variadic activity type list. Rust generics aren't variadic, so
//! the key set is registered at construction time through
//! [`builder::CollectorBuilder`] and slots are looked up by `TypeId` behind
//! a `RwLock`, with a runtime error rather than a compile error when code
//! reaches for an activity outside the registered set. See SPEC_FULL.md §9.

pub mod builder;

use std::any::{Any, TypeId};
use std::collections::HashSet;
use std::sync::RwLock;

use crate::activity::Activity;
use crate::errors::{Error, Result};
use crate::slot::Slot;

pub use builder::CollectorBuilder;

struct AnySlot(Box<dyn Any + Send + Sync>);

/// Holds one [`Slot`] per registered activity type plus a clone of the
/// request context handed to every activity on construction.
pub struct Collector<Ctx> {
    context: Ctx,
    known: HashSet<TypeId>,
    slots: RwLock<std::collections::HashMap<TypeId, AnySlot>>,
}

impl<Ctx: Clone> Collector<Ctx> {
    pub fn builder(context: Ctx) -> CollectorBuilder<Ctx> {
        CollectorBuilder::new(context)
    }

    pub fn context(&self) -> Ctx {
        self.context.clone()
    }

    fn require_known<A: Activity>(&self) -> Result<()> {
        if self.known.contains(&TypeId::of::<A>()) {
            Ok(())
        } else {
            Err(Error::UnknownActivity { type_name: std::any::type_name::<A>() })
        }
    }

    fn with_slot<A: Activity, R>(&self, f: impl FnOnce(&Slot<A::Success, A::Failure>) -> R) -> Result<R> {
        self.require_known::<A>()?;
        let slots = self.slots.read().unwrap();
        let boxed = slots
            .get(&TypeId::of::<A>())
            .expect("registered activity must have a slot (invariant of CollectorBuilder::with)");
        let slot = boxed
            .0
            .downcast_ref::<Slot<A::Success, A::Failure>>()
            .expect("slot type matches the activity's Success/Failure types by construction");
        Ok(f(slot))
    }

    fn with_slot_mut<A: Activity, R>(&self, f: impl FnOnce(&mut Slot<A::Success, A::Failure>) -> R) -> Result<R> {
        self.require_known::<A>()?;
        let mut slots = self.slots.write().unwrap();
        let boxed = slots
            .get_mut(&TypeId::of::<A>())
            .expect("registered activity must have a slot (invariant of CollectorBuilder::with)");
        let slot = boxed
            .0
            .downcast_mut::<Slot<A::Success, A::Failure>>()
            .expect("slot type matches the activity's Success/Failure types by construction");
        Ok(f(slot))
    }

    pub fn exists<A: Activity>(&self) -> bool {
        self.known.contains(&TypeId::of::<A>())
    }

    pub fn set_success<A: Activity>(&self, value: A::Success) -> Result<()> {
        self.with_slot_mut::<A, _>(|s| s.set_success(value))
    }

    pub fn set_failure<A: Activity>(&self, value: A::Failure) -> Result<()> {
        self.with_slot_mut::<A, _>(|s| s.set_failure(value))
    }

    pub fn set_cancel<A: Activity>(&self) -> Result<()> {
        self.with_slot_mut::<A, _>(|s| s.set_cancel())
    }

    pub fn completed<A: Activity>(&self) -> bool {
        self.with_slot::<A, _>(|s| s.completed()).unwrap_or(false)
    }

    pub fn canceled<A: Activity>(&self) -> bool {
        self.with_slot::<A, _>(|s| s.canceled()).unwrap_or(false)
    }

    pub fn okay<A: Activity>(&self) -> bool {
        self.with_slot::<A, _>(|s| s.okay()).unwrap_or(false)
    }

    /// Mirrors the original accessor default: an activity outside the key
    /// set, or one that hasn't reached a terminal state, reads as `failed`.
    pub fn failed<A: Activity>(&self) -> bool {
        self.with_slot::<A, _>(|s| s.failed()).unwrap_or(true)
    }

    pub fn error<A: Activity>(&self) -> bool {
        self.with_slot::<A, _>(|s| s.error()).unwrap_or(false)
    }

    pub fn success<A: Activity>(&self) -> A::Success
    where
        A::Success: Clone,
    {
        self.with_slot::<A, _>(|s| s.success_data().clone()).unwrap_or_default()
    }

    pub fn failure<A: Activity>(&self) -> A::Failure
    where
        A::Failure: Clone,
    {
        self.with_slot::<A, _>(|s| s.failure_data().clone()).unwrap_or_default()
    }

    pub fn apply<A: Activity, R>(
        &self,
        on_success: impl FnOnce(&A::Success) -> R,
        on_failure: impl FnOnce(&A::Failure) -> R,
    ) -> Option<R> {
        self.with_slot::<A, _>(|s| s.apply(on_success, on_failure)).ok().flatten()
    }
}
