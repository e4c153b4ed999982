// ============================================================================
// spark-array-state - Errors
// Failures of the update scheduler and component hooks
// ============================================================================
//
// Array edits never fail: every index and count is clamped. The only failure
// modes live in the host runtime, where a component can keep scheduling
// updates forever or call its hooks in a different order between renders.
// ============================================================================

use thiserror::Error;

/// Errors raised by the runtime.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuntimeError {
    /// The flush loop did not settle within the configured number of passes.
    #[error(
        "maximum update depth exceeded after {passes} flush passes; a component \
         is probably updating state unconditionally while it renders"
    )]
    FlushLimitExceeded {
        /// Passes run before giving up
        passes: u32,
    },

    /// A hook slot was read back as a different kind than it was created with.
    #[error("hook order changed between renders: slot {slot} was `{expected}`, now `{found}`")]
    HookOrderMismatch {
        /// Slot index in call order
        slot: usize,
        /// Type stored in the slot on the first render
        expected: &'static str,
        /// Type requested on this render
        found: &'static str,
    },
}

/// Result type for runtime operations.
pub type Result<T> = std::result::Result<T, RuntimeError>;

impl RuntimeError {
    /// Check if this error came from an update loop.
    pub fn is_flush_limit(&self) -> bool {
        matches!(self, RuntimeError::FlushLimitExceeded { .. })
    }
}
