// ============================================================================
// spark-array-state - Stable Memo
// Hand back the same allocation while a dependency list is unchanged
// ============================================================================

use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::Rc;

use crate::core::types::StableMemo;

/// A memo slot keyed by a dependency list.
///
/// The first call computes; later calls return the cached `Rc` (the same
/// pointer) as long as the dependencies compare equal. With `()` as the
/// dependency list the value is computed exactly once.
///
/// # Example
///
/// ```
/// use spark_array_state::{Memo, StableMemo};
/// use std::rc::Rc;
///
/// let memo = Memo::new();
/// let a = memo.memoize((), || vec![1, 2, 3]);
/// let b = memo.memoize((), || unreachable!());
/// assert!(Rc::ptr_eq(&a, &b));
/// ```
pub struct Memo<D, V> {
    /// Dependencies and value of the last computation
    cached: RefCell<Option<(D, Rc<V>)>>,

    /// How many times the value was computed
    computes: Cell<u32>,
}

impl<D, V> Memo<D, V> {
    /// Create an empty memo.
    pub fn new() -> Self {
        Self {
            cached: RefCell::new(None),
            computes: Cell::new(0),
        }
    }

    /// Check if a value has been computed.
    pub fn is_computed(&self) -> bool {
        self.cached.borrow().is_some()
    }

    /// Number of computations so far.
    pub fn compute_count(&self) -> u32 {
        self.computes.get()
    }

    /// Get the cached value without computing.
    pub fn peek(&self) -> Option<Rc<V>> {
        self.cached.borrow().as_ref().map(|(_, v)| v.clone())
    }
}

impl<D, V> Default for Memo<D, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<D: PartialEq, V> StableMemo<D, V> for Memo<D, V> {
    fn memoize<F>(&self, deps: D, compute: F) -> Rc<V>
    where
        F: FnOnce() -> V,
    {
        if let Some((prev, value)) = self.cached.borrow().as_ref() {
            if *prev == deps {
                return value.clone();
            }
        }

        // No borrow held: compute may read other memos or cells
        let value = Rc::new(compute());
        self.computes.set(self.computes.get() + 1);
        *self.cached.borrow_mut() = Some((deps, value.clone()));
        value
    }
}

impl<D, V> fmt::Debug for Memo<D, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memo")
            .field("computed", &self.is_computed())
            .field("computes", &self.compute_count())
            .finish()
    }
}

/// Create an empty memo.
pub fn memo<D, V>() -> Memo<D, V> {
    Memo::new()
}

// =============================================================================
// TESTS
// =============================================================================
