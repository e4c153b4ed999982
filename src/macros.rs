// ============================================================================
// spark-array-state - Ergonomic Macros
// ============================================================================

/// Create an array state from a list of elements, like `vec!`.
///
/// # Usage
///
/// ```rust
/// use spark_array_state::array_state;
///
/// let empty = array_state![];
/// let list = array_state![1, 2, 3];
/// let zeros = array_state![0u8; 4];
///
/// empty.actions().push(["a"]);
/// assert_eq!(*list.value(), vec![1, 2, 3]);
/// assert_eq!(*zeros.value(), vec![0, 0, 0, 0]);
/// ```
#[macro_export]
macro_rules! array_state {
    () => {
        $crate::array_state(::std::vec::Vec::new())
    };
    ($elem:expr; $n:expr) => {
        $crate::array_state(::std::vec![$elem; $n])
    };
    ($($x:expr),+ $(,)?) => {
        $crate::array_state(::std::vec![$($x),+])
    };
}
