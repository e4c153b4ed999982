// ============================================================================
// spark-array-state - Type Definitions
// Capability traits for the host runtime and type-erased scheduler nodes
// ============================================================================

use std::any::Any;
use std::fmt;
use std::rc::{Rc, Weak};

use super::constants::*;

// =============================================================================
// UPDATE
// =============================================================================

/// A pending change to a state cell.
///
/// Updates queued in the same turn are applied in call order. A `Produce`
/// update sees the result of every update queued before it, which is what
/// lets `push(1); push(2)` compose without either call observing the other.
pub enum Update<T> {
    /// Replace the value outright.
    Replace(Rc<T>),
    /// Compute the next value from the previous one. Must not mutate `prev`.
    Produce(Box<dyn FnOnce(&T) -> T>),
}

impl<T> Update<T> {
    /// Build a replacement update.
    pub fn replace(value: impl Into<Rc<T>>) -> Self {
        Update::Replace(value.into())
    }

    /// Build a producer update.
    pub fn produce(f: impl FnOnce(&T) -> T + 'static) -> Self {
        Update::Produce(Box::new(f))
    }

    /// Apply this update on top of `prev`, returning the next snapshot.
    pub fn apply(self, prev: Rc<T>) -> Rc<T> {
        match self {
            Update::Replace(next) => next,
            Update::Produce(f) => Rc::new(f(&prev)),
        }
    }

    /// Check if this is a replacement update
    pub fn is_replace(&self) -> bool {
        matches!(self, Update::Replace(_))
    }
}

impl<T> fmt::Debug for Update<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Update::Replace(_) => f.write_str("Update::Replace(..)"),
            Update::Produce(_) => f.write_str("Update::Produce(..)"),
        }
    }
}

// =============================================================================
// HOST RUNTIME CAPABILITIES
// =============================================================================
//
// The array container only needs two things from whatever runtime hosts it:
// a cell that can be read and handed updates, and a memo that hands back the
// same allocation while its dependencies are unchanged. Both are traits so
// the container can run on the in-crate runtime, a test double, or anything
// else that honors the contract.
// =============================================================================

/// A reactive cell holding a value of type `T`.
///
/// `read` returns the value as of the last completed update cycle.
/// `update` only enqueues; the cell decides when the change becomes visible.
pub trait StateCell<T> {
    /// Read the committed snapshot.
    fn read(&self) -> Rc<T>;

    /// Enqueue an update.
    fn update(&self, update: Update<T>);
}

/// Memoization keyed by a dependency list.
///
/// Returns the previously computed `Rc` (same pointer) while `deps` compares
/// equal to the dependencies of the last computation.
pub trait StableMemo<D, V> {
    /// Return the cached value for `deps`, computing it if needed.
    fn memoize<F>(&self, deps: D, compute: F) -> Rc<V>
    where
        F: FnOnce() -> V;
}

// =============================================================================
// TYPE-ERASED SCHEDULER NODES
// =============================================================================
//
// The scheduler queues cells of many value types and components that render
// arbitrary closures. It never needs the value type, so both sides are
// erased behind these traits and stored as Rc<dyn AnyCell> and
// Weak<dyn AnyReaction>.
// =============================================================================

/// Type-erased view of a state cell for the scheduler.
pub trait AnyCell: Any {
    /// Get the flags bitmask
    fn flags(&self) -> u32;

    /// Set the flags bitmask
    fn set_flags(&self, flags: u32);

    /// Number of updates waiting to be committed
    fn pending_count(&self) -> usize;

    /// Apply every pending update in order. Returns how many were applied.
    fn commit(&self) -> usize;

    /// Register a reaction to re-run after this cell commits.
    fn subscribe(&self, reaction: Weak<dyn AnyReaction>);

    /// Number of live subscribers
    fn subscriber_count(&self) -> usize;

    /// Call `f` for each live subscriber, pruning dropped ones.
    fn for_each_subscriber(&self, f: &mut dyn FnMut(Rc<dyn AnyReaction>));

    /// Check if the cell is queued for the current flush
    fn is_scheduled(&self) -> bool {
        self.flags() & SCHEDULED != 0
    }

    /// Mark the cell as queued
    fn mark_scheduled(&self) {
        self.set_flags(self.flags() | SCHEDULED);
    }

    /// Clear the queued mark
    fn clear_scheduled(&self) {
        self.set_flags(self.flags() & !SCHEDULED);
    }
}

/// Type-erased reaction (a component) that re-runs after a commit.
pub trait AnyReaction: Any {
    /// Get the flags bitmask
    fn flags(&self) -> u32;

    /// Set the flags bitmask
    fn set_flags(&self, flags: u32);

    /// Run the reaction again.
    fn rerender(&self);

    /// Check if this reaction is dirty
    fn is_dirty(&self) -> bool {
        self.flags() & DIRTY != 0
    }

    /// Check if this reaction has been disposed
    fn is_disposed(&self) -> bool {
        self.flags() & DISPOSED != 0
    }

    /// Mark as dirty (clear status bits, set DIRTY)
    fn mark_dirty(&self) {
        let flags = (self.flags() & STATUS_MASK) | DIRTY;
        self.set_flags(flags);
    }

    /// Mark as clean (clear status bits, set CLEAN)
    fn mark_clean(&self) {
        let flags = (self.flags() & STATUS_MASK) | CLEAN;
        self.set_flags(flags);
    }
}

// =============================================================================
// TESTS
// =============================================================================
