// ============================================================================
// spark-array-state - Primitives Module
// Host runtime primitives: state cell, stable memo, component
// ============================================================================

pub mod component;
pub mod memo;
pub mod state;

// Re-export for convenience
pub use component::{component, Component, ComponentInner, RenderContext, RenderFn};
pub use memo::{memo, Memo};
pub use state::{state, state_with, State, StateInner};
