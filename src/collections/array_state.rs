// ============================================================================
// spark-array-state - Array State
// A state cell holding a Vec<T>, edited only through a fixed action set
// ============================================================================
//
// Every action builds a brand-new Vec from the previous snapshot and hands it
// to the cell as an Update. Nothing here ever mutates a committed Vec, and
// nothing here keeps its own copy of the value: the cell owns it.
//
// Positional actions (insert_at, remove_at, update_at) are all thin wrappers
// over splice, so they share one set of clamping rules.
// ============================================================================

use std::fmt;
use std::marker::PhantomData;
use std::rc::Rc;

use crate::collections::splice::spliced;
use crate::core::types::{StableMemo, StateCell, Update};
use crate::primitives::component::RenderContext;
use crate::primitives::memo::Memo;
use crate::primitives::state::State;

// =============================================================================
// INITIAL VALUE
// =============================================================================

/// Seed for an array state: a literal vector or a producer of one.
///
/// A producer is consumed exactly once, when the state is created.
pub enum InitialValue<T> {
    /// Use this vector as-is.
    Value(Vec<T>),
    /// Call this to build the vector.
    Lazy(Box<dyn FnOnce() -> Vec<T>>),
}

impl<T> InitialValue<T> {
    /// Wrap a producer.
    pub fn lazy(init: impl FnOnce() -> Vec<T> + 'static) -> Self {
        InitialValue::Lazy(Box::new(init))
    }

    /// Resolve into the seed vector, running the producer if there is one.
    pub fn into_vec(self) -> Vec<T> {
        match self {
            InitialValue::Value(v) => v,
            InitialValue::Lazy(init) => init(),
        }
    }
}

impl<T> From<Vec<T>> for InitialValue<T> {
    fn from(value: Vec<T>) -> Self {
        InitialValue::Value(value)
    }
}

impl<T, const N: usize> From<[T; N]> for InitialValue<T> {
    fn from(value: [T; N]) -> Self {
        InitialValue::Value(Vec::from(value))
    }
}

impl<T> fmt::Debug for InitialValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InitialValue::Value(v) => write!(f, "InitialValue::Value(len = {})", v.len()),
            InitialValue::Lazy(_) => f.write_str("InitialValue::Lazy(..)"),
        }
    }
}

// =============================================================================
// ARRAY ACTIONS
// =============================================================================

/// The fixed set of edits for an array state.
///
/// Holds nothing but the cell handle. Each call enqueues one update and
/// returns; updates issued in the same turn are applied in call order, each
/// on top of the previous one's result.
///
/// # Example
///
/// ```
/// use spark_array_state::array_state;
///
/// let list = array_state(vec![1, 2, 3]);
/// let (_, actions) = list.observe();
///
/// actions.push([4]);
/// assert_eq!(*list.value(), vec![1, 2, 3, 4]);
///
/// actions.remove_at(0);
/// assert_eq!(*list.value(), vec![2, 3, 4]);
///
/// actions.insert_at(1, [9]);
/// assert_eq!(*list.value(), vec![2, 9, 3, 4]);
/// ```
pub struct ArrayActions<T, C = State<Vec<T>>> {
    cell: C,
    _element: PhantomData<fn() -> T>,
}

impl<T, C> ArrayActions<T, C>
where
    T: Clone + 'static,
    C: StateCell<Vec<T>>,
{
    /// Build the action set over a cell.
    pub fn new(cell: C) -> Self {
        Self {
            cell,
            _element: PhantomData,
        }
    }

    /// Get the cell these actions write to.
    pub fn cell(&self) -> &C {
        &self.cell
    }

    fn produce(&self, f: impl FnOnce(&Vec<T>) -> Vec<T> + 'static) {
        self.cell.update(Update::produce(f));
    }

    /// Replace the whole array.
    ///
    /// Accepts a `Vec<T>` or an existing `Rc<Vec<T>>` snapshot; passing the
    /// current snapshot back still runs an update cycle.
    pub fn set(&self, new_array: impl Into<Rc<Vec<T>>>) {
        self.cell.update(Update::Replace(new_array.into()));
    }

    /// Append `values` in order.
    pub fn push(&self, values: impl IntoIterator<Item = T>) {
        let values: Vec<T> = values.into_iter().collect();
        self.produce(move |prev| {
            let mut next = Vec::with_capacity(prev.len() + values.len());
            next.extend_from_slice(prev);
            next.extend(values);
            next
        });
    }

    /// Remove the last element. No-op on an empty array.
    pub fn pop(&self) {
        self.produce(|prev| prev[..prev.len().saturating_sub(1)].to_vec());
    }

    /// Replace the array with an empty one.
    pub fn clear(&self) {
        self.cell.update(Update::Replace(Rc::new(Vec::new())));
    }

    /// Remove the first element. No-op on an empty array.
    pub fn shift(&self) {
        self.produce(|prev| prev.get(1..).unwrap_or_default().to_vec());
    }

    /// Prepend `values`, keeping their order.
    pub fn unshift(&self, values: impl IntoIterator<Item = T>) {
        let values: Vec<T> = values.into_iter().collect();
        self.produce(move |prev| {
            let mut next = Vec::with_capacity(prev.len() + values.len());
            next.extend(values);
            next.extend_from_slice(prev);
            next
        });
    }

    /// Remove `delete_count` elements at `start`, then insert `values` there.
    ///
    /// A negative `start` counts back from the end; a `start` past the end
    /// appends. `delete_count` is clamped to what is left after `start`.
    pub fn splice(&self, start: isize, delete_count: isize, values: impl IntoIterator<Item = T>) {
        let values: Vec<T> = values.into_iter().collect();
        self.produce(move |prev| spliced(prev, start, delete_count, values));
    }

    /// Insert `values` at `start`. Same as `splice(start, 0, values)`.
    pub fn insert_at(&self, start: isize, values: impl IntoIterator<Item = T>) {
        self.splice(start, 0, values);
    }

    /// Remove the element at `index`. Same as `splice(index, 1, [])`.
    pub fn remove_at(&self, index: isize) {
        self.splice(index, 1, std::iter::empty());
    }

    /// Replace the element at `index`. Same as `splice(index, 1, [value])`,
    /// so an index past the end appends.
    pub fn update_at(&self, index: isize, value: T) {
        self.splice(index, 1, [value]);
    }
}

impl<T, C> fmt::Debug for ArrayActions<T, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayActions").finish_non_exhaustive()
    }
}

// =============================================================================
// ARRAY STATE - The container
// =============================================================================

/// An array-valued state paired with its action set.
///
/// The action set is memoized with an empty dependency list when the
/// container is built, so [`actions`](Self::actions) and
/// [`observe`](Self::observe) hand out the same `Rc` for the container's
/// whole life.
///
/// Generic over the cell so any [`StateCell`] implementation can host it.
pub struct ArrayState<T, C = State<Vec<T>>> {
    cell: C,
    actions: Memo<(), ArrayActions<T, C>>,
}

impl<T: Clone + 'static> ArrayState<T> {
    /// Create an array state on a fresh runtime cell.
    pub fn new(initial: impl Into<InitialValue<T>>) -> Self {
        Self::with_cell(State::new(initial.into().into_vec()))
    }
}

impl<T, C> ArrayState<T, C>
where
    T: Clone + 'static,
    C: StateCell<Vec<T>> + Clone,
{
    /// Create an array state on an existing cell.
    pub fn with_cell(cell: C) -> Self {
        let this = Self {
            cell,
            actions: Memo::new(),
        };
        this.actions();
        this
    }

    /// The committed array and the action set.
    pub fn observe(&self) -> (Rc<Vec<T>>, Rc<ArrayActions<T, C>>) {
        (self.value(), self.actions())
    }

    /// The committed array.
    pub fn value(&self) -> Rc<Vec<T>> {
        self.cell.read()
    }

    /// The action set. Always the same `Rc`.
    pub fn actions(&self) -> Rc<ArrayActions<T, C>> {
        self.actions
            .memoize((), || ArrayActions::new(self.cell.clone()))
    }

    /// Get the underlying cell.
    pub fn cell(&self) -> &C {
        &self.cell
    }
}

impl<T, C> fmt::Debug for ArrayState<T, C>
where
    T: fmt::Debug + Clone + 'static,
    C: StateCell<Vec<T>> + Clone,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArrayState")
            .field("value", &self.value())
            .finish_non_exhaustive()
    }
}

// =============================================================================
// CREATION FUNCTIONS
// =============================================================================

/// Create an array state from a vector.
///
/// # Example
///
/// ```
/// use spark_array_state::array_state;
///
/// let list = array_state(Vec::<i32>::new());
/// let (value, actions) = list.observe();
/// assert!(value.is_empty());
///
/// actions.pop();
/// actions.shift();
/// assert!(list.value().is_empty());
/// ```
pub fn array_state<T: Clone + 'static>(initial: Vec<T>) -> ArrayState<T> {
    ArrayState::new(initial)
}

/// Create an array state from a producer, which runs exactly once, now.
pub fn array_state_with<T: Clone + 'static>(
    init: impl FnOnce() -> Vec<T> + 'static,
) -> ArrayState<T> {
    ArrayState::new(InitialValue::lazy(init))
}

// =============================================================================
// HOOK
// =============================================================================

/// Array state owned by a component.
///
/// Returns the committed array and the action set. The state is created on
/// the component's first render (running a lazy initial value then, and only
/// then); later renders get the same cell and the identical action `Rc`.
///
/// # Example
///
/// ```
/// use spark_array_state::{component, use_array_state, ArrayActions};
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let handle: Rc<RefCell<Option<Rc<ArrayActions<i32>>>>> = Rc::new(RefCell::new(None));
///
/// let _c = component({
///     let seen = seen.clone();
///     let handle = handle.clone();
///     move |cx| {
///         let (items, actions) = use_array_state(cx, vec![1, 2, 3]);
///         seen.borrow_mut().push(items.len());
///         *handle.borrow_mut() = Some(actions);
///     }
/// });
///
/// let actions = handle.borrow().clone().unwrap();
/// actions.push([4, 5]);
/// assert_eq!(*seen.borrow(), vec![3, 5]);
/// ```
pub fn use_array_state<T>(
    cx: &RenderContext<'_>,
    initial: impl Into<InitialValue<T>>,
) -> (Rc<Vec<T>>, Rc<ArrayActions<T>>)
where
    T: Clone + 'static,
{
    let initial = initial.into();
    let (value, cell) = cx.use_state_with(move || initial.into_vec());
    let actions = cx.use_memo((), move || ArrayActions::new(cell));
    (value, actions)
}

/// [`use_array_state`] seeded by a producer.
pub fn use_array_state_with<T>(
    cx: &RenderContext<'_>,
    init: impl FnOnce() -> Vec<T> + 'static,
) -> (Rc<Vec<T>>, Rc<ArrayActions<T>>)
where
    T: Clone + 'static,
{
    use_array_state(cx, InitialValue::lazy(init))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reactivity::batching::batch;
    use std::cell::{Cell, RefCell};

    /// Test double: queues updates and applies them only on `flush`.
    #[derive(Clone)]
    struct QueueCell<T> {
        value: Rc<RefCell<Rc<T>>>,
        queue: Rc<RefCell<Vec<Update<T>>>>,
        replaces: Rc<Cell<usize>>,
    }

    impl<T> QueueCell<T> {
        fn new(value: T) -> Self {
            Self {
                value: Rc::new(RefCell::new(Rc::new(value))),
                queue: Rc::new(RefCell::new(Vec::new())),
                replaces: Rc::new(Cell::new(0)),
            }
        }

        fn queued(&self) -> usize {
            self.queue.borrow().len()
        }

        fn flush(&self) {
            let updates = self.queue.replace(Vec::new());
            let mut value = self.value.borrow().clone();
            for update in updates {
                value = update.apply(value);
            }
            *self.value.borrow_mut() = value;
        }
    }

    impl<T> StateCell<T> for QueueCell<T> {
        fn read(&self) -> Rc<T> {
            self.value.borrow().clone()
        }

        fn update(&self, update: Update<T>) {
            if update.is_replace() {
                self.replaces.set(self.replaces.get() + 1);
            }
            self.queue.borrow_mut().push(update);
        }
    }

    fn queued(values: Vec<i32>) -> (ArrayState<i32, QueueCell<Vec<i32>>>, QueueCell<Vec<i32>>) {
        let cell = QueueCell::new(values);
        (ArrayState::with_cell(cell.clone()), cell)
    }

    // =========================================================================
    // Injected cell
    // =========================================================================

    #[test]
    fn actions_only_enqueue() {
        let (list, cell) = queued(vec![1, 2, 3]);
        let actions = list.actions();

        actions.push([4]);
        actions.pop();
        assert_eq!(cell.queued(), 2);
        assert_eq!(*list.value(), vec![1, 2, 3]);

        cell.flush();
        assert_eq!(*list.value(), vec![1, 2, 3]);
    }

    #[test]
    fn queued_producers_compose() {
        let (list, cell) = queued(vec![]);
        let actions = list.actions();

        actions.push([1]);
        actions.push([2]);
        actions.unshift([0]);
        actions.update_at(1, 10);
        cell.flush();

        assert_eq!(*list.value(), vec![0, 10, 2]);
    }

    #[test]
    fn set_and_clear_are_replacements() {
        let (list, cell) = queued(vec![1]);
        let actions = list.actions();

        actions.set(vec![5, 6]);
        actions.clear();
        actions.push([7]);
        assert_eq!(cell.replaces.get(), 2);

        cell.flush();
        assert_eq!(*list.value(), vec![7]);
    }

    #[test]
    fn clear_then_push_in_same_turn() {
        let (list, cell) = queued(vec![1, 2, 3]);
        let actions = list.actions();

        actions.push([4]);
        actions.clear();
        actions.push([5]);
        cell.flush();

        assert_eq!(*list.value(), vec![5]);
    }

    #[test]
    fn actions_identity_is_stable() {
        let (list, _cell) = queued(vec![1]);
        let a = list.actions();
        let (_, b) = list.observe();
        let (_, c) = list.observe();
        assert!(Rc::ptr_eq(&a, &b));
        assert!(Rc::ptr_eq(&b, &c));
    }

    // =========================================================================
    // Runtime cell: each operation
    // =========================================================================

    #[test]
    fn set_replaces_exactly() {
        let list = array_state(vec![1, 2, 3]);
        let replacement = Rc::new(vec![9, 8]);
        list.actions().set(replacement.clone());
        assert!(Rc::ptr_eq(&list.value(), &replacement));
    }

    #[test]
    fn set_same_snapshot_still_cycles() {
        let list = array_state(vec![1, 2, 3]);
        let before = list.cell().version();
        list.actions().set(list.value());
        assert_eq!(list.cell().version(), before + 1);
        assert_eq!(*list.value(), vec![1, 2, 3]);
    }

    #[test]
    fn push_appends_in_order() {
        let list = array_state(vec![1]);
        list.actions().push([2, 3, 4]);
        assert_eq!(*list.value(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn push_nothing_still_cycles() {
        let list = array_state(vec![1]);
        let before = list.cell().version();
        list.actions().push(std::iter::empty());
        assert_eq!(list.cell().version(), before + 1);
        assert_eq!(*list.value(), vec![1]);
    }

    #[test]
    fn pop_and_shift() {
        let list = array_state(vec![1, 2, 3]);
        let actions = list.actions();

        actions.pop();
        assert_eq!(*list.value(), vec![1, 2]);

        actions.shift();
        assert_eq!(*list.value(), vec![2]);

        actions.shift();
        actions.shift();
        actions.pop();
        assert!(list.value().is_empty());
    }

    #[test]
    fn clear_is_idempotent() {
        let list = array_state(vec![1, 2]);
        list.actions().clear();
        assert!(list.value().is_empty());
        list.actions().clear();
        assert!(list.value().is_empty());
    }

    #[test]
    fn unshift_keeps_given_order() {
        let list = array_state(vec![3]);
        list.actions().unshift([1, 2]);
        assert_eq!(*list.value(), vec![1, 2, 3]);

        list.actions().unshift(std::iter::empty());
        assert_eq!(*list.value(), vec![1, 2, 3]);
    }

    #[test]
    fn splice_replaces_range() {
        let list = array_state(vec![1, 2, 3, 4, 5]);
        list.actions().splice(1, 2, [8, 9]);
        assert_eq!(*list.value(), vec![1, 8, 9, 4, 5]);
    }

    #[test]
    fn splice_clamps() {
        let list = array_state(vec![1, 2, 3]);
        let actions = list.actions();

        actions.splice(1, 100, std::iter::empty());
        assert_eq!(*list.value(), vec![1]);

        actions.splice(50, 1, [7]);
        assert_eq!(*list.value(), vec![1, 7]);

        actions.splice(0, -3, [0]);
        assert_eq!(*list.value(), vec![0, 1, 7]);
    }

    #[test]
    fn insert_at_positions() {
        let list = array_state(vec![1, 2]);
        let actions = list.actions();

        actions.insert_at(1, [5, 6]);
        assert_eq!(*list.value(), vec![1, 5, 6, 2]);

        actions.insert_at(99, [9]);
        assert_eq!(*list.value(), vec![1, 5, 6, 2, 9]);
    }

    #[test]
    fn remove_at_out_of_bounds_is_noop() {
        let list = array_state(vec![1, 2, 3]);
        let actions = list.actions();

        actions.remove_at(3);
        actions.remove_at(100);
        assert_eq!(*list.value(), vec![1, 2, 3]);

        actions.remove_at(1);
        assert_eq!(*list.value(), vec![1, 3]);
    }

    #[test]
    fn remove_at_negative_counts_from_end() {
        let list = array_state(vec![1, 2, 3]);
        list.actions().remove_at(-1);
        assert_eq!(*list.value(), vec![1, 2]);
    }

    #[test]
    fn update_at_replaces_or_appends() {
        let list = array_state(vec![1, 2, 3]);
        let actions = list.actions();

        actions.update_at(1, 20);
        assert_eq!(*list.value(), vec![1, 20, 3]);

        actions.update_at(10, 99);
        assert_eq!(*list.value(), vec![1, 20, 3, 99]);
    }

    #[test]
    fn previous_snapshot_is_never_mutated() {
        let list = array_state(vec![1, 2, 3]);
        let before = list.value();

        let actions = list.actions();
        actions.push([4]);
        actions.pop();
        actions.shift();
        actions.unshift([0]);
        actions.splice(0, 1, [5]);
        actions.update_at(0, 6);
        actions.remove_at(0);
        actions.clear();

        assert_eq!(*before, vec![1, 2, 3]);
    }

    #[test]
    fn batched_pushes_compose() {
        let list = array_state(Vec::new());
        let actions = list.actions();

        batch(|| {
            actions.push([1]);
            actions.push([2]);
            assert!(list.value().is_empty());
        });

        assert_eq!(*list.value(), vec![1, 2]);
    }

    #[test]
    fn lazy_initial_value_runs_once() {
        let calls = Rc::new(Cell::new(0));
        let list = array_state_with({
            let calls = calls.clone();
            move || {
                calls.set(calls.get() + 1);
                vec!['a', 'b']
            }
        });

        list.actions().push(['c']);
        let _ = list.observe();
        assert_eq!(calls.get(), 1);
        assert_eq!(*list.value(), vec!['a', 'b', 'c']);
    }

    #[test]
    fn initial_value_conversions() {
        let from_array: InitialValue<u8> = [1, 2].into();
        assert_eq!(from_array.into_vec(), vec![1, 2]);

        let from_vec: InitialValue<u8> = vec![3].into();
        assert_eq!(format!("{:?}", from_vec), "InitialValue::Value(len = 1)");

        let lazy = InitialValue::lazy(|| vec![4u8]);
        assert_eq!(format!("{:?}", lazy), "InitialValue::Lazy(..)");
        assert_eq!(lazy.into_vec(), vec![4]);
    }

    #[test]
    fn array_state_debug() {
        let list = array_state(vec![1, 2]);
        let s = format!("{:?}", list);
        assert!(s.contains("ArrayState"));
        assert!(s.contains("[1, 2]"));
        assert_eq!(format!("{:?}", list.actions()), "ArrayActions { .. }");
    }
}
