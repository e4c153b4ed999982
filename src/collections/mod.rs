// ============================================================================
// spark-array-state - Collections
// Array-valued state and the bounded splice it is built on
// ============================================================================

mod array_state;
pub mod splice;

pub use array_state::{
    array_state, array_state_with, use_array_state, use_array_state_with, ArrayActions,
    ArrayState, InitialValue,
};
