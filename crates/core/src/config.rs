//! Simulation configuration: domain bounds and plume model constants
//!
//! Every tunable the dispersion model uses lives here as a named, overridable
//! value instead of an inline literal. Defaults reproduce the behavior of the
//! reference vehicle-exhaust model.

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Rectangular world-space domain covered by the pollution grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DomainBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DomainBounds {
    /// Create validated bounds. Requires `x_min < x_max` and `y_min < y_max`,
    /// all finite.
    pub fn new(x_min: f64, x_max: f64, y_min: f64, y_max: f64) -> Result<Self, SimulationError> {
        let bounds = DomainBounds {
            x_min,
            x_max,
            y_min,
            y_max,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub(crate) fn validate(&self) -> Result<(), SimulationError> {
        let values = [self.x_min, self.x_max, self.y_min, self.y_max];
        if values.iter().any(|v| !v.is_finite()) {
            return Err(SimulationError::Configuration(format!(
                "domain bounds must be finite, got ({}, {}, {}, {})",
                self.x_min, self.x_max, self.y_min, self.y_max
            )));
        }
        if self.x_min >= self.x_max {
            return Err(SimulationError::Configuration(format!(
                "x_min ({}) must be less than x_max ({})",
                self.x_min, self.x_max
            )));
        }
        if self.y_min >= self.y_max {
            return Err(SimulationError::Configuration(format!(
                "y_min ({}) must be less than y_max ({})",
                self.y_min, self.y_max
            )));
        }
        Ok(())
    }

    /// Domain width in world units (m)
    pub fn width(&self) -> f64 {
        self.x_max - self.x_min
    }

    /// Domain height in world units (m)
    pub fn height(&self) -> f64 {
        self.y_max - self.y_min
    }

    /// Check whether a world point lies inside the domain
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x_min && x < self.x_max && y >= self.y_min && y < self.y_max
    }
}

/// Policy for a malformed source entry (non-finite position or speed,
/// negative speed) encountered during a batch update.
///
/// Both behaviors exist in the reference model: the native batch path aborts
/// the whole call, while the interpreted path silently moves on. The choice
/// is explicit here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MalformedSourcePolicy {
    /// Reject the whole tick before any mutation (default)
    #[default]
    AbortTick,
    /// Drop the offending source, log a warning, count it in the tick stats
    SkipAndReport,
}

/// Named constants of the Gaussian-plume model.
///
/// Defaults match the reference implementation; all values may be overridden
/// before constructing a [`crate::PlumeSolver`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlumeConfig {
    /// Base emission rate of a single vehicle before speed scaling (g/s)
    pub base_emission: f64,
    /// Per-tick multiplicative survival factor applied to every cell, in (0, 1]
    pub decay_factor: f64,
    /// Receptors closer than this to a source receive nothing (singularity guard, m)
    pub near_field_cutoff: f64,
    /// Receptors farther than this receive nothing (radius of influence, m)
    pub influence_radius: f64,
    /// Half-width of the square window a source can write into (m)
    pub capture_radius: f64,
    /// Batch sizes at or above this run sources in parallel
    pub parallel_source_threshold: usize,
    /// What to do with a malformed source entry
    pub malformed_source_policy: MalformedSourcePolicy,
}

impl Default for PlumeConfig {
    fn default() -> Self {
        PlumeConfig {
            base_emission: 0.1,
            decay_factor: 0.99,
            near_field_cutoff: 1.0,
            influence_radius: 300.0,
            capture_radius: 100.0,
            parallel_source_threshold: 16,
            malformed_source_policy: MalformedSourcePolicy::default(),
        }
    }
}

impl PlumeConfig {
    pub(crate) fn validate(&self) -> Result<(), SimulationError> {
        if !self.base_emission.is_finite() || self.base_emission < 0.0 {
            return Err(SimulationError::Configuration(format!(
                "base_emission must be finite and non-negative, got {}",
                self.base_emission
            )));
        }
        if !self.decay_factor.is_finite() || self.decay_factor <= 0.0 || self.decay_factor > 1.0 {
            return Err(SimulationError::Configuration(format!(
                "decay_factor must be in (0, 1], got {}",
                self.decay_factor
            )));
        }
        if !self.near_field_cutoff.is_finite() || self.near_field_cutoff <= 0.0 {
            return Err(SimulationError::Configuration(format!(
                "near_field_cutoff must be positive, got {}",
                self.near_field_cutoff
            )));
        }
        if !self.influence_radius.is_finite() || self.influence_radius <= self.near_field_cutoff {
            return Err(SimulationError::Configuration(format!(
                "influence_radius ({}) must exceed near_field_cutoff ({})",
                self.influence_radius, self.near_field_cutoff
            )));
        }
        if !self.capture_radius.is_finite() || self.capture_radius <= 0.0 {
            return Err(SimulationError::Configuration(format!(
                "capture_radius must be positive, got {}",
                self.capture_radius
            )));
        }
        Ok(())
    }
}
