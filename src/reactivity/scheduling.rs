// ============================================================================
// spark-array-state - Update Scheduling
// Queues cells with pending updates and runs the commit/re-render loop
// ============================================================================
//
// There is no microtask queue to defer onto, so scheduling is synchronous:
// an update enqueued outside a batch is flushed before the call returns,
// and updates enqueued inside a batch (or a component render) are flushed
// when the outermost batch exits.
//
// A flush alternates two kinds of pass until nothing is left:
// - commit: every queued cell applies its pending updates in call order and
//   marks its subscribers dirty
// - render: every dirty component re-runs, possibly queueing more updates
// ============================================================================

use std::rc::Rc;

use crate::core::config::config;
use crate::core::constants::RENDERING;
use crate::core::context::with_context;
use crate::core::error::{Result, RuntimeError};
use crate::core::types::{AnyCell, AnyReaction};

// =============================================================================
// SCHEDULE CELL
// =============================================================================

/// Queue a cell that just received an update.
///
/// A cell is queued at most once per flush; further updates pile up in the
/// cell's own pending list. Flushes immediately unless batching or already
/// flushing.
pub fn schedule_cell(cell: Rc<dyn AnyCell>) {
    if !cell.is_scheduled() {
        cell.mark_scheduled();
        with_context(|ctx| ctx.add_pending_cell(cell));
    }

    let should_flush = with_context(|ctx| !ctx.is_batching() && !ctx.is_flushing());

    if should_flush {
        flush_or_panic();
    }
}

/// Flush, treating an update loop as a fatal bug.
pub(crate) fn flush_or_panic() {
    if let Err(err) = flush_updates() {
        panic!("{err}");
    }
}

// =============================================================================
// FLUSH
// =============================================================================

/// Run commit and render passes until the runtime is quiescent.
///
/// Returns `Ok` immediately when called re-entrantly from inside a flush; the
/// outer flush picks up whatever was queued.
pub fn flush_updates() -> Result<()> {
    let was_flushing = with_context(|ctx| ctx.set_flushing(true));
    if was_flushing {
        return Ok(());
    }

    // Restore the flag even if a render panics
    struct FlushGuard;

    impl Drop for FlushGuard {
        fn drop(&mut self) {
            with_context(|ctx| ctx.set_flushing(false));
        }
    }

    let _guard = FlushGuard;

    let max_passes = config().max_flush_passes;
    let mut passes = 0u32;
    let mut committed = 0usize;
    let mut rendered = 0usize;

    loop {
        let (has_cells, has_reactions) = with_context(|ctx| {
            (
                ctx.has_pending_cells(),
                !ctx.dirty_reactions.borrow().is_empty(),
            )
        });

        if !has_cells && !has_reactions {
            break;
        }

        passes += 1;
        if passes > max_passes {
            tracing::warn!(
                passes = max_passes,
                committed,
                rendered,
                "flush did not settle, aborting"
            );
            return Err(RuntimeError::FlushLimitExceeded { passes: max_passes });
        }

        if has_cells {
            committed += commit_pass();
        } else {
            rendered += render_pass();
        }
    }

    if committed > 0 {
        let cycle = with_context(|ctx| ctx.increment_cycle());
        tracing::debug!(cycle, passes, committed, rendered, "update cycle complete");
    }

    Ok(())
}

/// Commit every queued cell. Returns the number of updates applied.
fn commit_pass() -> usize {
    let cells = with_context(|ctx| ctx.take_pending_cells());
    let mut applied_total = 0;

    for cell in cells {
        cell.clear_scheduled();
        let applied = cell.commit();
        applied_total += applied;

        if applied > 0 {
            cell.for_each_subscriber(&mut |reaction| mark_for_render(reaction));
        }
    }

    applied_total
}

/// Queue a subscriber for re-render unless it already is.
fn mark_for_render(reaction: Rc<dyn AnyReaction>) {
    if reaction.is_disposed() || reaction.is_dirty() {
        return;
    }
    reaction.mark_dirty();
    with_context(|ctx| ctx.add_dirty_reaction(Rc::downgrade(&reaction)));
}

/// Re-render every dirty component. Returns the number rendered.
fn render_pass() -> usize {
    let reactions = with_context(|ctx| ctx.take_dirty_reactions());
    let mut count = 0;

    for weak in reactions {
        if let Some(reaction) = weak.upgrade() {
            // A component still rendering re-queues itself when it finishes
            let rendering = reaction.flags() & RENDERING != 0;
            if reaction.is_disposed() || !reaction.is_dirty() || rendering {
                continue;
            }
            reaction.rerender();
            count += 1;
        }
    }

    count
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::config::{configure, RuntimeConfig};
    use crate::core::constants::*;
    use crate::core::context::cycle;
    use crate::primitives::component::component;
    use crate::primitives::state::{state, State};
    use crate::reactivity::batching::batch;
    use std::cell::Cell;

    #[test]
    fn update_outside_batch_flushes_immediately() {
        let s = state(1);
        s.set(2);
        assert_eq!(*s.read(), 2);
        assert_eq!(s.pending_count(), 0);
    }

    #[test]
    fn cycle_counter_advances_per_flush() {
        let s = state(0);
        let before = cycle();
        s.set(1);
        s.set(2);
        assert_eq!(cycle(), before + 2);

        batch(|| {
            s.set(3);
            s.set(4);
        });
        assert_eq!(cycle(), before + 3);
    }

    #[test]
    fn reentrant_flush_is_a_no_op() {
        with_context(|ctx| ctx.set_flushing(true));
        assert_eq!(flush_updates(), Ok(()));
        with_context(|ctx| ctx.set_flushing(false));
    }

    #[test]
    fn runaway_render_hits_flush_limit() {
        let prev = configure(RuntimeConfig::default().with_max_flush_passes(20));

        let result = std::panic::catch_unwind(|| {
            let _c = component(|cx| {
                let (n, set_n) = cx.use_state(0u64);
                // Unconditional write during render: never settles
                set_n.set(*n + 1);
            });
        });
        assert!(result.is_err());

        // Drain whatever the aborted flush left behind
        with_context(|ctx| {
            for cell in ctx.take_pending_cells() {
                cell.clear_scheduled();
            }
            ctx.take_dirty_reactions();
            ctx.batch_depth.set(0);
        });
        configure(prev);
    }

    struct LoopingReaction {
        flags: Cell<u32>,
        target: State<u32>,
    }

    impl AnyReaction for LoopingReaction {
        fn flags(&self) -> u32 {
            self.flags.get()
        }

        fn set_flags(&self, flags: u32) {
            self.flags.set(flags);
        }

        fn rerender(&self) {
            self.mark_clean();
            self.target.produce(|n| n + 1);
        }
    }

    #[test]
    fn flush_updates_reports_limit() {
        let prev = configure(RuntimeConfig::default().with_max_flush_passes(4));

        let s = state(0u32);
        let reaction = Rc::new(LoopingReaction {
            flags: Cell::new(COMPONENT | CLEAN),
            target: s.clone(),
        });
        let as_reaction: Rc<dyn AnyReaction> = reaction.clone();
        s.inner().subscribe(Rc::downgrade(&as_reaction));

        batch(|| {
            s.set(1);
            let err = flush_updates().unwrap_err();
            assert_eq!(err, RuntimeError::FlushLimitExceeded { passes: 4 });

            // Unsubscribe so the batch exit can settle
            reaction.set_flags(reaction.flags() | DISPOSED);
        });

        assert!(*s.read() >= 2);
        configure(prev);
    }
}
