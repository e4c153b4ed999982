// ============================================================================
// spark-array-state - Batching
// Group multiple updates into a single update cycle
// ============================================================================

use crate::core::context::with_context;
use crate::core::error::Result;
use crate::reactivity::scheduling::{flush_or_panic, flush_updates};

// =============================================================================
// BATCH
// =============================================================================

/// Batch multiple updates into a single update cycle.
///
/// Without batching, each update is committed (and subscribed components
/// re-render) before the call returns. Inside a batch, updates queue up and
/// are applied in call order when the outermost batch exits. Reads inside the
/// batch see the last committed value.
///
/// # Example
///
/// ```
/// use spark_array_state::{array_state, batch};
///
/// let list = array_state(vec![1]);
/// let (_, actions) = list.observe();
///
/// batch(|| {
///     actions.push([2]);
///     actions.push([3]);
///     // Not committed yet
///     assert_eq!(*list.value(), vec![1]);
/// });
///
/// assert_eq!(*list.value(), vec![1, 2, 3]);
/// ```
pub fn batch<T>(f: impl FnOnce() -> T) -> T {
    with_context(|ctx| ctx.enter_batch());

    // Use a guard pattern to ensure we exit the batch even on panic
    struct BatchGuard;

    impl Drop for BatchGuard {
        fn drop(&mut self) {
            let depth = with_context(|ctx| ctx.exit_batch());

            // When outermost batch completes, flush pending updates
            if depth == 0 && !std::thread::panicking() {
                let flushing = with_context(|ctx| ctx.is_flushing());
                if !flushing {
                    flush_or_panic();
                }
            }
        }
    }

    let _guard = BatchGuard;
    f()
}

/// Check if currently inside a batch.
///
/// # Example
///
/// ```
/// use spark_array_state::{batch, is_batching};
///
/// assert!(!is_batching());
///
/// batch(|| {
///     assert!(is_batching());
/// });
///
/// assert!(!is_batching());
/// ```
pub fn is_batching() -> bool {
    with_context(|ctx| ctx.is_batching())
}

// =============================================================================
// TICK
// =============================================================================

/// Apply every pending update now, even from inside a batch.
///
/// Panics if the flush does not settle (see [`try_tick`]).
pub fn tick() {
    flush_or_panic();
}

/// Apply every pending update now, reporting an update loop as an error.
///
/// # Example
///
/// ```
/// use spark_array_state::{batch, state, try_tick};
///
/// let count = state(0);
/// batch(|| {
///     count.set(5);
///     try_tick().unwrap();
///     assert_eq!(*count.read(), 5);
/// });
/// ```
pub fn try_tick() -> Result<()> {
    flush_updates()
}

// =============================================================================
// TESTS
// =============================================================================
