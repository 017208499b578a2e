//! Builder that fixes a collector's key set before the activity graph runs.
//!
//! Chaining `.with::<A>()` calls is the Rust stand-in for the original's
//! variadic `collector<ContextT, T...>` template parameter list: each call
//! registers one more activity type's default slot. Once `.build()` is
//! called the key set is frozen; there is no `insert` on [`super::Collector`]
//! itself, only on the builder.

use std::any::TypeId;
use std::collections::{HashMap, HashSet};
use std::sync::RwLock;

use super::{AnySlot, Collector};
use crate::activity::Activity;
use crate::slot::Slot;

pub struct CollectorBuilder<Ctx> {
    context: Ctx,
    known: HashSet<TypeId>,
    slots: HashMap<TypeId, AnySlot>,
}

impl<Ctx> CollectorBuilder<Ctx> {
    pub fn new(context: Ctx) -> Self {
        CollectorBuilder { context, known: HashSet::new(), slots: HashMap::new() }
    }

    /// Registers `A` in the collector's key set with a fresh, empty slot.
    /// Calling this twice for the same activity is a harmless no-op; the
    /// existing slot is left in place rather than reset.
    pub fn with<A: Activity>(mut self) -> Self {
        let id = TypeId::of::<A>();
        self.known.insert(id);
        self.slots.entry(id).or_insert_with(|| AnySlot(Box::new(Slot::<A::Success, A::Failure>::new())));
        self
    }

    pub fn build(self) -> Collector<Ctx> {
        Collector { context: self.context, known: self.known, slots: RwLock::new(self.slots) }
    }
}
