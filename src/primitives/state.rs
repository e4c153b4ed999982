// ============================================================================
// spark-array-state - State Cell
// The runtime's writable cell: committed snapshot plus a queue of updates
// ============================================================================

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::types::{AnyCell, AnyReaction, StateCell, Update};
use crate::reactivity::scheduling::schedule_cell;

// =============================================================================
// STATE INNER
// =============================================================================

/// The data behind a `State<T>`.
///
/// The committed value is an `Rc<T>` snapshot. Committing swaps in a new
/// snapshot and never touches the old one, so anyone still holding a previous
/// read keeps seeing exactly what they read.
pub struct StateInner<T> {
    /// Flags bitmask (CELL | SCHEDULED)
    flags: Cell<u32>,

    /// Last committed snapshot
    value: RefCell<Rc<T>>,

    /// Updates waiting for the next commit, in call order
    pending: RefCell<VecDeque<Update<T>>>,

    /// Incremented once per commit that applied at least one update
    version: Cell<u32>,

    /// Components to re-render after a commit (weak refs to avoid cycles)
    subscribers: RefCell<Vec<Weak<dyn AnyReaction>>>,
}

impl<T> StateInner<T> {
    /// Create a new cell around an initial snapshot
    pub fn new(value: Rc<T>) -> Self {
        Self {
            flags: Cell::new(CELL),
            value: RefCell::new(value),
            pending: RefCell::new(VecDeque::new()),
            version: Cell::new(0),
            subscribers: RefCell::new(Vec::new()),
        }
    }

    /// Get the committed snapshot
    pub fn read(&self) -> Rc<T> {
        self.value.borrow().clone()
    }

    /// Queue an update without scheduling
    pub fn enqueue(&self, update: Update<T>) {
        self.pending.borrow_mut().push_back(update);
    }

    /// Get the commit version
    pub fn version(&self) -> u32 {
        self.version.get()
    }
}

impl<T: 'static> AnyCell for StateInner<T> {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn pending_count(&self) -> usize {
        self.pending.borrow().len()
    }

    fn commit(&self) -> usize {
        // Take the queue first so producers may enqueue follow-ups
        let updates: Vec<Update<T>> = self.pending.borrow_mut().drain(..).collect();
        if updates.is_empty() {
            return 0;
        }

        let applied = updates.len();
        let mut value = self.read();
        for update in updates {
            value = update.apply(value);
        }
        *self.value.borrow_mut() = value;

        let version = self.version.get().wrapping_add(1);
        self.version.set(version);
        tracing::trace!(applied, version, "state committed");

        applied
    }

    fn subscribe(&self, reaction: Weak<dyn AnyReaction>) {
        let mut subs = self.subscribers.borrow_mut();
        if !subs.iter().any(|s| Weak::ptr_eq(s, &reaction)) {
            subs.push(reaction);
        }
    }

    fn subscriber_count(&self) -> usize {
        self.subscribers
            .borrow()
            .iter()
            .filter(|s| s.strong_count() > 0)
            .count()
    }

    fn for_each_subscriber(&self, f: &mut dyn FnMut(Rc<dyn AnyReaction>)) {
        // Collect first, then call out: f may touch this cell again
        let live: Vec<Rc<dyn AnyReaction>> = {
            let mut subs = self.subscribers.borrow_mut();
            subs.retain(|s| s.strong_count() > 0);
            subs.iter().filter_map(Weak::upgrade).collect()
        };

        for reaction in live {
            f(reaction);
        }
    }
}

// =============================================================================
// STATE<T> - The public cell handle
// =============================================================================

/// A state cell holding a value of type `T`.
///
/// Cloning the handle shares the cell. Writes never mutate the committed
/// value: they enqueue an [`Update`] that the scheduler applies, in call
/// order, before the next read outside a batch.
///
/// # Example
///
/// ```
/// use spark_array_state::state;
///
/// let count = state(0);
/// count.produce(|n| n + 1);
/// count.produce(|n| n * 10);
/// assert_eq!(*count.read(), 10);
/// ```
pub struct State<T> {
    inner: Rc<StateInner<T>>,
}

impl<T> Clone for State<T> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<T> State<T> {
    /// Create a new cell with the given initial value.
    pub fn new(value: T) -> Self {
        Self::from_rc(Rc::new(value))
    }

    /// Create a new cell around an existing snapshot.
    pub fn from_rc(value: Rc<T>) -> Self {
        Self {
            inner: Rc::new(StateInner::new(value)),
        }
    }

    /// Read the committed snapshot.
    pub fn read(&self) -> Rc<T> {
        self.inner.read()
    }

    /// Get a clone of the committed value.
    pub fn get(&self) -> T
    where
        T: Clone,
    {
        T::clone(&self.inner.read())
    }

    /// Access the committed value with a closure.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.inner.read())
    }

    /// Number of committed update cycles that touched this cell.
    pub fn version(&self) -> u32 {
        self.inner.version()
    }

    /// Get a reference to the inner cell (for advanced use).
    pub fn inner(&self) -> &Rc<StateInner<T>> {
        &self.inner
    }

    /// Check if two handles share one cell.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.inner, &other.inner)
    }
}

impl<T: 'static> State<T> {
    /// Enqueue an update and schedule a commit.
    pub fn update(&self, update: Update<T>) {
        self.inner.enqueue(update);
        schedule_cell(self.inner.clone() as Rc<dyn AnyCell>);
    }

    /// Replace the value. Always schedules a cycle, even for an equal value.
    pub fn set(&self, value: T) {
        self.update(Update::replace(value));
    }

    /// Replace the value with an existing snapshot.
    pub fn replace(&self, value: Rc<T>) {
        self.update(Update::Replace(value));
    }

    /// Compute the next value from the previous one.
    pub fn produce(&self, f: impl FnOnce(&T) -> T + 'static) {
        self.update(Update::produce(f));
    }

    /// Number of updates waiting to be committed.
    pub fn pending_count(&self) -> usize {
        self.inner.pending_count()
    }

    /// Number of live components subscribed to this cell.
    pub fn subscriber_count(&self) -> usize {
        self.inner.subscriber_count()
    }

    /// Get the cell as a type-erased scheduler node.
    pub fn as_any_cell(&self) -> Rc<dyn AnyCell> {
        self.inner.clone()
    }
}

impl<T: 'static> StateCell<T> for State<T> {
    fn read(&self) -> Rc<T> {
        State::read(self)
    }

    fn update(&self, update: Update<T>) {
        State::update(self, update)
    }
}

impl<T: fmt::Debug> fmt::Debug for State<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("State")
            .field("value", &self.read())
            .field("version", &self.version())
            .finish()
    }
}

// =============================================================================
// STATE CREATION FUNCTIONS
// =============================================================================

/// Create a new state cell.
///
/// # Example
///
/// ```
/// use spark_array_state::state;
///
/// let name = state(String::from("hello"));
/// name.set(String::from("world"));
/// assert_eq!(name.get(), "world");
/// ```
pub fn state<T>(value: T) -> State<T> {
    State::new(value)
}

/// Create a state cell from a producer, which runs exactly once, now.
pub fn state_with<T>(init: impl FnOnce() -> T) -> State<T> {
    State::new(init())
}

// =============================================================================
// TESTS
// =============================================================================
