// ============================================================================
// spark-array-state - Core Module
// Capability traits, errors, configuration and the thread-local context
// ============================================================================

pub mod config;
pub mod constants;
pub mod context;
pub mod error;
pub mod types;

// Re-export commonly used items
pub use config::{config, configure, RuntimeConfig};
pub use constants::*;
pub use context::{cycle, is_batching, is_flushing, with_context, RuntimeContext};
pub use error::{Result, RuntimeError};
pub use types::{AnyCell, AnyReaction, StableMemo, StateCell, Update};
