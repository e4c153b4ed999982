// ============================================================================
// spark-array-state - Array State for Reactive Applications
// ============================================================================
//
// A container for one array-valued piece of reactive state, edited only
// through a fixed, referentially stable set of actions that always produce a
// new Vec instead of mutating the committed one.
//
// The container talks to its host runtime through two traits (StateCell and
// StableMemo). A small single-threaded runtime with batching, components and
// hooks is included so the container works out of the box.
// ============================================================================

#[macro_use]
mod macros;

pub mod collections;
pub mod core;
pub mod primitives;
pub mod reactivity;

// Re-export core items at crate root for ergonomic access
pub use crate::core::constants;
pub use crate::core::config::{config, configure, RuntimeConfig};
pub use crate::core::context::{cycle, is_flushing, with_context, RuntimeContext};
pub use crate::core::error::{Result, RuntimeError};
pub use crate::core::types::{AnyCell, AnyReaction, StableMemo, StateCell, Update};

// Re-export primitives at crate root
pub use primitives::component::{component, Component, RenderContext};
pub use primitives::memo::{memo, Memo};
pub use primitives::state::{state, state_with, State};

// Re-export reactivity functions
pub use reactivity::batching::{batch, is_batching, tick, try_tick};
pub use reactivity::scheduling::flush_updates;

// Re-export collections
pub use collections::{
    array_state, array_state_with, use_array_state, use_array_state_with, ArrayActions,
    ArrayState, InitialValue,
};

// =============================================================================
// TESTS
// =============================================================================
