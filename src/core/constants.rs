// ============================================================================
// spark-array-state - Constants
// Flag constants for state cells and components
// ============================================================================

// =============================================================================
// NODE TYPE FLAGS
// =============================================================================

/// Node is a state cell (holds a committed value and a pending queue)
pub const CELL: u32 = 1 << 0;

/// Node is a component (re-renders when a subscribed cell commits)
pub const COMPONENT: u32 = 1 << 1;

// =============================================================================
// NODE STATE FLAGS
// =============================================================================

/// Node is clean (nothing to commit / nothing to re-render)
pub const CLEAN: u32 = 1 << 10;

/// Node is dirty (component must re-render)
pub const DIRTY: u32 = 1 << 11;

/// Cell has pending updates and is queued in the current turn
pub const SCHEDULED: u32 = 1 << 12;

/// Component render function is currently running
pub const RENDERING: u32 = 1 << 13;

/// Component has been disposed and never renders again
pub const DISPOSED: u32 = 1 << 14;

// =============================================================================
// STATUS MASK (for clearing status bits)
// =============================================================================

/// Mask to clear the status bits (CLEAN, DIRTY)
pub const STATUS_MASK: u32 = !(DIRTY | CLEAN);

// =============================================================================
// SCHEDULER LIMITS
// =============================================================================

/// Flush passes allowed before the scheduler assumes an update loop
pub const DEFAULT_MAX_FLUSH_PASSES: u32 = 1000;

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flags_are_distinct() {
        let all_flags = [CELL, COMPONENT, CLEAN, DIRTY, SCHEDULED, RENDERING, DISPOSED];

        for (i, &a) in all_flags.iter().enumerate() {
            for (j, &b) in all_flags.iter().enumerate() {
                if i != j {
                    assert_eq!(a & b, 0, "Flags at index {} and {} overlap", i, j);
                }
            }
        }
    }

    #[test]
    fn status_mask_keeps_type_and_scheduling_bits() {
        let flags = COMPONENT | DIRTY | RENDERING;
        let cleared = flags & STATUS_MASK;

        assert_eq!(cleared & DIRTY, 0);
        assert_ne!(cleared & COMPONENT, 0);
        assert_ne!(cleared & RENDERING, 0);
    }
}
