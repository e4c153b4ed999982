// ============================================================================
// spark-array-state - Bounded Splice
// The single clamping edit every positional array action is built on
// ============================================================================
//
// Indices and counts are signed and never rejected:
// - a negative start counts back from the end, bottoming out at 0
// - a start past the end lands on the end (so inserting there appends)
// - a delete count is clamped to [0, elements after start]
// ============================================================================

/// Resolve a signed start index against a length.
///
/// ```
/// use spark_array_state::collections::splice::resolve_start;
///
/// assert_eq!(resolve_start(1, 5), 1);
/// assert_eq!(resolve_start(-1, 5), 4);
/// assert_eq!(resolve_start(-10, 5), 0);
/// assert_eq!(resolve_start(10, 5), 5);
/// ```
pub fn resolve_start(start: isize, len: usize) -> usize {
    if start < 0 {
        len.saturating_sub(start.unsigned_abs())
    } else {
        start.unsigned_abs().min(len)
    }
}

/// Resolve a signed delete count against an already-resolved start.
pub fn resolve_delete_count(delete_count: isize, start: usize, len: usize) -> usize {
    let available = len.saturating_sub(start);
    if delete_count <= 0 {
        0
    } else {
        delete_count.unsigned_abs().min(available)
    }
}

/// Build the result of splicing `values` into `prev`, leaving `prev` intact.
///
/// Removes up to `delete_count` elements starting at `start`, then inserts
/// `values` at that position. Both arguments are clamped, so this never
/// panics.
///
/// ```
/// use spark_array_state::collections::splice::spliced;
///
/// let prev = [1, 2, 3, 4, 5];
/// assert_eq!(spliced(&prev, 1, 2, vec![8, 9]), vec![1, 8, 9, 4, 5]);
/// assert_eq!(spliced(&prev, 10, 1, vec![6]), vec![1, 2, 3, 4, 5, 6]);
/// assert_eq!(prev, [1, 2, 3, 4, 5]);
/// ```
pub fn spliced<T: Clone>(prev: &[T], start: isize, delete_count: isize, values: Vec<T>) -> Vec<T> {
    let len = prev.len();
    let start = resolve_start(start, len);
    let deleted = resolve_delete_count(delete_count, start, len);

    let mut next = Vec::with_capacity(len - deleted + values.len());
    next.extend_from_slice(&prev[..start]);
    next.extend(values);
    next.extend_from_slice(&prev[start + deleted..]);
    next
}

// =============================================================================
// TESTS
// =============================================================================
