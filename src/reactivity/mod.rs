// ============================================================================
// spark-array-state - Reactivity Module
// Batching and the commit/re-render scheduler
// ============================================================================

pub mod batching;
pub mod scheduling;

// Re-export batching functions
pub use batching::{batch, is_batching, tick, try_tick};

// Re-export scheduling functions
pub use scheduling::{flush_updates, schedule_cell};
