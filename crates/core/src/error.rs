//! Error types for the plume simulation core

/// Errors reported at the simulation boundary.
///
/// Validation happens once per call, before the first grid mutation, so a
/// returned error always leaves the grid untouched. Internal contract
/// violations (out-of-range cell writes, bad decay factors) are programming
/// errors and panic instead of returning a variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SimulationError {
    /// Invalid static configuration: domain bounds, resolution, cutoff radii
    Configuration(String),
    /// Invalid per-tick parameter: wind, emission factor, stability label,
    /// or a malformed source under the abort policy
    InvalidParameter(String),
}

impl std::fmt::Display for SimulationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SimulationError::Configuration(msg) => write!(f, "Invalid configuration: {msg}"),
            SimulationError::InvalidParameter(msg) => write!(f, "Invalid parameter: {msg}"),
        }
    }
}

impl std::error::Error for SimulationError {}
