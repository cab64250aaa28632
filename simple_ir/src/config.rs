//! Graph construction settings.

use thiserror::Error;

/// Configuration for a [`Graph`](crate::ir::Graph).
///
/// # Example
///
/// ```
/// use simple_ir::GraphConfig;
///
/// // Keep every node exactly as the parser built it.
/// let config = GraphConfig {
///     peephole: false,
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GraphConfig {
    /// Run the peephole engine after every construction.
    ///
    /// When disabled, types are still computed but no node is replaced.
    ///
    /// Default: true
    pub peephole: bool,

    /// Upper bound on rewrites applied to one freshly built node.
    ///
    /// Only applied rewrites count; the final check that finds nothing left
    /// to do does not, so a value of 1 admits exactly one rewrite.
    ///
    /// Every rewrite rule strictly shrinks the graph, so the bound is never
    /// reached by a correct rule set; hitting it is reported as an internal
    /// error.
    ///
    /// Default: 64
    pub max_peephole_iterations: usize,

    /// Check def-use symmetry of the whole graph after each construction.
    ///
    /// Quadratic in graph size; meant for tests and debugging.
    ///
    /// Default: true in debug builds
    pub verify_edges: bool,
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            peephole: true,
            max_peephole_iterations: 64,
            verify_edges: cfg!(debug_assertions),
        }
    }
}

impl GraphConfig {
    /// Peephole on, edge verification on.
    pub fn debug() -> Self {
        Self {
            verify_edges: true,
            ..Default::default()
        }
    }

    /// No simplification: the graph mirrors the construction calls.
    pub fn unoptimized() -> Self {
        Self {
            peephole: false,
            ..Default::default()
        }
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_peephole_iterations == 0 {
            return Err(ConfigError::ZeroPeepholeIterations);
        }
        Ok(())
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ConfigError {
    /// `max_peephole_iterations` must allow at least one rewrite.
    #[error("max_peephole_iterations must be at least 1")]
    ZeroPeepholeIterations,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(GraphConfig::default().validate().is_ok());
    }

    #[test]
    fn test_preset_configs() {
        let debug = GraphConfig::debug();
        assert!(debug.verify_edges);
        assert!(debug.peephole);
        assert!(debug.validate().is_ok());

        let raw = GraphConfig::unoptimized();
        assert!(!raw.peephole);
        assert!(raw.validate().is_ok());
    }

    #[test]
    fn test_invalid_iteration_bound() {
        let config = GraphConfig {
            max_peephole_iterations: 0,
            ..Default::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::ZeroPeepholeIterations));
    }
}
