// ============================================================================
// spark-array-state - Components
// Re-rendering UI computations with call-order hook slots
// ============================================================================
//
// A component is the "owning UI computation" of the cells it creates through
// its hooks. It renders once on creation and again whenever one of those
// cells commits. Hook storage is indexed by call order, so a render must call
// the same hooks in the same order every time.
//
// Renders run inside a batch: a state update issued while rendering is
// applied after the render function returns, never in the middle of it.
// ============================================================================

use std::any::{type_name, Any};
use std::cell::{Cell, RefCell};
use std::fmt;
use std::rc::{Rc, Weak};

use crate::core::constants::*;
use crate::core::context::with_context;
use crate::core::error::RuntimeError;
use crate::core::types::{AnyCell, AnyReaction, StableMemo};
use crate::primitives::memo::Memo;
use crate::primitives::state::State;
use crate::reactivity::scheduling::flush_or_panic;

// =============================================================================
// TYPE ALIASES
// =============================================================================

/// Render function signature
pub type RenderFn = Box<dyn FnMut(&RenderContext<'_>)>;

/// One hook slot: the stored value and the type it was created as
type HookSlot = (Rc<dyn Any>, &'static str);

// =============================================================================
// COMPONENT INNER
// =============================================================================

/// The data behind a `Component`.
pub struct ComponentInner {
    /// Flags bitmask (COMPONENT | status | RENDERING | DISPOSED)
    flags: Cell<u32>,

    /// The render function (taken out while it runs)
    render: RefCell<Option<RenderFn>>,

    /// Hook slots in call order
    hooks: RefCell<Vec<HookSlot>>,

    /// Completed renders
    renders: Cell<u32>,

    /// Weak self-reference, handed to cells as the subscriber
    self_weak: Weak<ComponentInner>,
}

impl ComponentInner {
    fn new(render: RenderFn) -> Rc<Self> {
        Rc::new_cyclic(|weak| Self {
            flags: Cell::new(COMPONENT | DIRTY),
            render: RefCell::new(Some(render)),
            hooks: RefCell::new(Vec::new()),
            renders: Cell::new(0),
            self_weak: weak.clone(),
        })
    }

    /// Get this component as a weak subscriber
    pub fn as_weak_reaction(&self) -> Weak<dyn AnyReaction> {
        self.self_weak.clone()
    }

    /// Number of completed renders
    pub fn render_count(&self) -> u32 {
        self.renders.get()
    }

    /// Number of hook slots
    pub fn hook_count(&self) -> usize {
        self.hooks.borrow().len()
    }

    /// Run the render function once.
    ///
    /// The render runs inside a batch; updates it issues are flushed after
    /// the render function has been put back, so the follow-up render sees
    /// this one as completed.
    fn run(&self) {
        let flags = self.flags.get();
        if flags & (DISPOSED | RENDERING) != 0 {
            return;
        }

        // Clean before rendering: a commit during this render re-dirties us
        self.mark_clean();
        self.flags.set(self.flags.get() | RENDERING);
        with_context(|ctx| ctx.enter_batch());

        // Puts the render function back, clears RENDERING and leaves the
        // batch, even on panic
        struct RenderGuard<'a> {
            inner: &'a ComponentInner,
            render: Option<RenderFn>,
        }

        impl Drop for RenderGuard<'_> {
            fn drop(&mut self) {
                if self.inner.flags.get() & DISPOSED == 0 {
                    *self.inner.render.borrow_mut() = self.render.take();
                }
                let flags = self.inner.flags.get() & !RENDERING;
                self.inner.flags.set(flags);

                // A flush that ran mid-render (tick) may have dirtied us
                // while we could not re-run; queue the render it skipped
                let requeue = flags & (DIRTY | DISPOSED) == DIRTY;
                with_context(|ctx| {
                    if requeue {
                        ctx.add_dirty_reaction(self.inner.as_weak_reaction());
                    }
                    ctx.exit_batch();
                });
            }
        }

        let mut guard = RenderGuard {
            inner: self,
            render: self.render.borrow_mut().take(),
        };

        let render_index = self.renders.get();
        if let Some(render) = guard.render.as_mut() {
            let cx = RenderContext {
                component: self,
                cursor: Cell::new(0),
                render_index,
            };
            render(&cx);

            let used = cx.cursor.get();
            let stored = self.hook_count();
            if used != stored && self.flags.get() & DISPOSED == 0 {
                tracing::warn!(used, stored, "render called fewer hooks than a previous render");
            }
        }
        self.renders.set(render_index + 1);
        drop(guard);

        tracing::debug!(render = render_index + 1, "component rendered");

        let should_flush = with_context(|ctx| !ctx.is_batching() && !ctx.is_flushing());
        if should_flush {
            flush_or_panic();
        }
    }

    fn dispose(&self) {
        self.flags.set(self.flags.get() | DISPOSED);
        self.render.borrow_mut().take();
        // Drop hook values outside the borrow
        let hooks = self.hooks.replace(Vec::new());
        drop(hooks);
    }
}

impl AnyReaction for ComponentInner {
    fn flags(&self) -> u32 {
        self.flags.get()
    }

    fn set_flags(&self, flags: u32) {
        self.flags.set(flags);
    }

    fn rerender(&self) {
        self.run();
    }
}

// =============================================================================
// RENDER CONTEXT
// =============================================================================

/// Handle passed to a render function for calling hooks.
pub struct RenderContext<'a> {
    component: &'a ComponentInner,
    cursor: Cell<usize>,
    render_index: u32,
}

impl RenderContext<'_> {
    /// Zero on the first render, then one more per completed render.
    pub fn render_index(&self) -> u32 {
        self.render_index
    }

    /// Check if this is the component's first render.
    pub fn is_first_render(&self) -> bool {
        self.render_index == 0
    }

    /// Get the owning component as a weak subscriber.
    pub fn as_weak_reaction(&self) -> Weak<dyn AnyReaction> {
        self.component.as_weak_reaction()
    }

    /// Claim the next hook slot, creating it with `init` on first use.
    ///
    /// `init` runs only when the slot is created. Panics if the slot holds a
    /// different type than requested, which means the hooks were called in a
    /// different order than on a previous render.
    pub fn use_hook<H: 'static>(&self, init: impl FnOnce() -> H) -> Rc<H> {
        match self.try_use_hook(init) {
            Ok(hook) => hook,
            Err(err) => panic!("{err}"),
        }
    }

    /// Like [`use_hook`](Self::use_hook), reporting a mismatch as an error.
    pub fn try_use_hook<H: 'static>(
        &self,
        init: impl FnOnce() -> H,
    ) -> Result<Rc<H>, RuntimeError> {
        let slot = self.cursor.get();
        self.cursor.set(slot + 1);

        let existing = self.component.hooks.borrow().get(slot).cloned();
        if let Some((value, expected)) = existing {
            return value
                .downcast::<H>()
                .map_err(|_| RuntimeError::HookOrderMismatch {
                    slot,
                    expected,
                    found: type_name::<H>(),
                });
        }

        // No borrow held while initializing
        let value = Rc::new(init());
        self.component
            .hooks
            .borrow_mut()
            .push((value.clone() as Rc<dyn Any>, type_name::<H>()));
        Ok(value)
    }

    /// A state cell owned by this component.
    ///
    /// Returns the committed value and the cell. `initial` is only used on
    /// the first render.
    pub fn use_state<T: 'static>(&self, initial: T) -> (Rc<T>, State<T>) {
        self.use_state_with(move || initial)
    }

    /// A state cell seeded by a producer that runs on the first render only.
    pub fn use_state_with<T: 'static>(&self, init: impl FnOnce() -> T) -> (Rc<T>, State<T>) {
        let cell = self.use_hook(|| {
            let cell = State::new(init());
            cell.inner().subscribe(self.as_weak_reaction());
            cell
        });
        (cell.read(), State::clone(&cell))
    }

    /// A value recomputed only when `deps` changes between renders.
    pub fn use_memo<D, V>(&self, deps: D, compute: impl FnOnce() -> V) -> Rc<V>
    where
        D: PartialEq + 'static,
        V: 'static,
    {
        let memo = self.use_hook(Memo::<D, V>::new);
        memo.memoize(deps, compute)
    }
}

// =============================================================================
// COMPONENT - The public handle
// =============================================================================

/// A re-rendering UI computation.
///
/// Dropping the last handle unsubscribes it from every cell: cells only hold
/// weak references to their components.
///
/// # Example
///
/// ```
/// use spark_array_state::component;
/// use std::cell::RefCell;
/// use std::rc::Rc;
///
/// let seen = Rc::new(RefCell::new(Vec::new()));
/// let setter = Rc::new(RefCell::new(None));
///
/// let c = component({
///     let seen = seen.clone();
///     let setter = setter.clone();
///     move |cx| {
///         let (count, set_count) = cx.use_state(0);
///         seen.borrow_mut().push(*count);
///         *setter.borrow_mut() = Some(set_count);
///     }
/// });
///
/// let set_count = setter.borrow().clone().unwrap();
/// set_count.set(5);
///
/// assert_eq!(*seen.borrow(), vec![0, 5]);
/// assert_eq!(c.render_count(), 2);
/// ```
#[derive(Clone)]
pub struct Component {
    inner: Rc<ComponentInner>,
}

impl Component {
    /// Create a component and render it once.
    pub fn new(render: impl FnMut(&RenderContext<'_>) + 'static) -> Self {
        let inner = ComponentInner::new(Box::new(render));
        inner.run();
        Self { inner }
    }

    /// Number of completed renders.
    pub fn render_count(&self) -> u32 {
        self.inner.render_count()
    }

    /// Number of hook slots in use.
    pub fn hook_count(&self) -> usize {
        self.inner.hook_count()
    }

    /// Force a re-render, scheduled like any other.
    pub fn rerender(&self) {
        if self.inner.is_disposed() || self.inner.is_dirty() {
            return;
        }
        self.inner.mark_dirty();
        let weak: Weak<dyn AnyReaction> = self.inner.as_weak_reaction();
        let should_flush = with_context(|ctx| {
            ctx.add_dirty_reaction(weak);
            !ctx.is_batching() && !ctx.is_flushing()
        });
        if should_flush {
            flush_or_panic();
        }
    }

    /// Stop rendering and release all hook state.
    pub fn dispose(&self) {
        self.inner.dispose();
    }

    /// Check if the component has been disposed.
    pub fn is_disposed(&self) -> bool {
        self.inner.is_disposed()
    }

    /// Get a reference to the inner component (for advanced use).
    pub fn inner(&self) -> &Rc<ComponentInner> {
        &self.inner
    }
}

impl fmt::Debug for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Component")
            .field("renders", &self.render_count())
            .field("hooks", &self.hook_count())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}

/// Create a component and render it once.
pub fn component(render: impl FnMut(&RenderContext<'_>) + 'static) -> Component {
    Component::new(render)
}

// =============================================================================
// TESTS
// =============================================================================
