// ============================================================================
// spark-array-state - Runtime Context
// Thread-local state for the update scheduler
// ============================================================================

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use super::config::RuntimeConfig;
use super::types::{AnyCell, AnyReaction};

// =============================================================================
// RUNTIME CONTEXT
// =============================================================================

/// Thread-local runtime context holding all scheduler state.
///
/// Everything reactive in this crate is single-threaded; each thread gets its
/// own independent scheduler.
pub struct RuntimeContext {
    // =========================================================================
    // BATCHING
    // =========================================================================
    /// Current batch depth (for nested batches)
    pub batch_depth: Cell<u32>,

    /// Whether a flush is currently running
    pub is_flushing: Cell<bool>,

    // =========================================================================
    // QUEUES
    // =========================================================================
    /// Cells with pending updates, in the order they were first scheduled.
    /// Held strongly: an enqueued update is always applied.
    pub pending_cells: RefCell<Vec<Rc<dyn AnyCell>>>,

    /// Components to re-render once the pending cells are committed
    pub dirty_reactions: RefCell<Vec<Weak<dyn AnyReaction>>>,

    // =========================================================================
    // COUNTERS
    // =========================================================================
    /// Completed update cycles (flushes that committed at least one cell)
    pub cycle: Cell<u64>,

    // =========================================================================
    // CONFIG
    // =========================================================================
    /// Scheduler configuration
    pub config: Cell<RuntimeConfig>,
}

impl RuntimeContext {
    /// Create a new runtime context with default values
    pub fn new() -> Self {
        Self {
            batch_depth: Cell::new(0),
            is_flushing: Cell::new(false),
            pending_cells: RefCell::new(Vec::new()),
            dirty_reactions: RefCell::new(Vec::new()),
            cycle: Cell::new(0),
            config: Cell::new(RuntimeConfig::default()),
        }
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    /// Increment batch depth, returns new depth
    pub fn enter_batch(&self) -> u32 {
        let depth = self.batch_depth.get() + 1;
        self.batch_depth.set(depth);
        depth
    }

    /// Decrement batch depth, returns new depth
    pub fn exit_batch(&self) -> u32 {
        let depth = self.batch_depth.get().saturating_sub(1);
        self.batch_depth.set(depth);
        depth
    }

    /// Get current batch depth
    pub fn get_batch_depth(&self) -> u32 {
        self.batch_depth.get()
    }

    /// Check if currently in a batch
    pub fn is_batching(&self) -> bool {
        self.batch_depth.get() > 0
    }

    /// Set flushing mode, returning previous
    pub fn set_flushing(&self, value: bool) -> bool {
        self.is_flushing.replace(value)
    }

    /// Check if a flush is running
    pub fn is_flushing(&self) -> bool {
        self.is_flushing.get()
    }

    // =========================================================================
    // QUEUES
    // =========================================================================

    /// Queue a cell for the next commit pass
    pub fn add_pending_cell(&self, cell: Rc<dyn AnyCell>) {
        self.pending_cells.borrow_mut().push(cell);
    }

    /// Take all queued cells
    pub fn take_pending_cells(&self) -> Vec<Rc<dyn AnyCell>> {
        self.pending_cells.replace(Vec::new())
    }

    /// Check if any cell is queued
    pub fn has_pending_cells(&self) -> bool {
        !self.pending_cells.borrow().is_empty()
    }

    /// Queue a component for re-render
    pub fn add_dirty_reaction(&self, reaction: Weak<dyn AnyReaction>) {
        self.dirty_reactions.borrow_mut().push(reaction);
    }

    /// Take all queued components
    pub fn take_dirty_reactions(&self) -> Vec<Weak<dyn AnyReaction>> {
        self.dirty_reactions.replace(Vec::new())
    }

    // =========================================================================
    // COUNTERS
    // =========================================================================

    /// Increment and return the cycle counter
    pub fn increment_cycle(&self) -> u64 {
        let c = self.cycle.get() + 1;
        self.cycle.set(c);
        c
    }

    /// Get the cycle counter
    pub fn get_cycle(&self) -> u64 {
        self.cycle.get()
    }
}

impl Default for RuntimeContext {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// THREAD-LOCAL ACCESS
// =============================================================================

thread_local! {
    /// The thread-local runtime context
    static CONTEXT: RuntimeContext = RuntimeContext::new();
}

/// Access the thread-local runtime context.
pub fn with_context<R>(f: impl FnOnce(&RuntimeContext) -> R) -> R {
    CONTEXT.with(f)
}

// =============================================================================
// CONVENIENCE FUNCTIONS
// =============================================================================

/// Check if currently in a batch
pub fn is_batching() -> bool {
    with_context(|ctx| ctx.is_batching())
}

/// Check if a flush is running
pub fn is_flushing() -> bool {
    with_context(|ctx| ctx.is_flushing())
}

/// Number of completed update cycles on this thread
pub fn cycle() -> u64 {
    with_context(|ctx| ctx.get_cycle())
}

// =============================================================================
// TESTS
// =============================================================================
