//! Errors surfaced by the outbreak engine to its callers.

use thiserror::Error;

/// Failures of the engine's control operations.
///
/// Only `reset` (parameter and pattern checks) and a controller configured to
/// halt on inert grids can fail; stepping, observing and evaluating are total.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    /// A rate was outside `[0, 1]` (or not a number).
    #[error("parameter `{name}` must be within [0, 1], got {value}")]
    InvalidParameter { name: &'static str, value: f64 },

    /// Grid dimensions must both be positive.
    #[error("grid dimensions must be positive, got {width}x{height}")]
    InvalidGridSize { width: usize, height: usize },

    /// The pattern's own parameters do not fit the grid.
    #[error("pattern `{pattern}` cannot be placed: {reason}")]
    InvalidPattern { pattern: &'static str, reason: String },

    /// The controller refuses to advance a grid with nothing left to change.
    #[error("simulation reached a terminal state at step {step}")]
    TerminalState { step: usize },
}
