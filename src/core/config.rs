// ============================================================================
// spark-array-state - Runtime Configuration
// Per-thread knobs for the update scheduler
// ============================================================================

use super::constants::DEFAULT_MAX_FLUSH_PASSES;
use super::context::with_context;

/// Scheduler configuration for the current thread.
///
/// # Example
///
/// ```
/// use spark_array_state::{config, configure, RuntimeConfig};
///
/// configure(RuntimeConfig::default().with_max_flush_passes(64));
/// assert_eq!(config().max_flush_passes, 64);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RuntimeConfig {
    /// Commit/re-render passes a single flush may run before it is treated as
    /// an update loop.
    pub max_flush_passes: u32,
}

impl RuntimeConfig {
    /// Set the flush pass limit. Zero is raised to one.
    pub fn with_max_flush_passes(mut self, passes: u32) -> Self {
        self.max_flush_passes = passes.max(1);
        self
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            max_flush_passes: DEFAULT_MAX_FLUSH_PASSES,
        }
    }
}

/// Install a configuration for the current thread, returning the previous one.
pub fn configure(config: RuntimeConfig) -> RuntimeConfig {
    with_context(|ctx| ctx.config.replace(config))
}

/// Read the configuration of the current thread.
pub fn config() -> RuntimeConfig {
    with_context(|ctx| ctx.config.get())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_matches_scheduler_limit() {
        assert_eq!(RuntimeConfig::default().max_flush_passes, DEFAULT_MAX_FLUSH_PASSES);
    }

    #[test]
    fn zero_passes_is_raised() {
        let cfg = RuntimeConfig::default().with_max_flush_passes(0);
        assert_eq!(cfg.max_flush_passes, 1);
    }

    #[test]
    fn configure_returns_previous() {
        let prev = configure(RuntimeConfig::default().with_max_flush_passes(5));
        assert_eq!(prev, RuntimeConfig::default());
        assert_eq!(config().max_flush_passes, 5);

        configure(prev);
        assert_eq!(config(), RuntimeConfig::default());
    }
}
