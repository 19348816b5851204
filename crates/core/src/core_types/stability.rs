//! Pasquill atmospheric stability classes and their spread coefficients
//!
//! The class controls how quickly the plume widens with downwind distance:
//! A is the most unstable (widest spread), F the most stable (narrowest).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::SimulationError;

/// Pasquill-Gifford stability class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StabilityClass {
    /// Very unstable
    A,
    /// Moderately unstable
    B,
    /// Slightly unstable
    C,
    /// Neutral
    D,
    /// Slightly stable
    E,
    /// Moderately stable
    F,
}

impl StabilityClass {
    /// The fixed (a, b) coefficient pair for this class.
    pub fn coefficients(self) -> SpreadCoefficients {
        match self {
            StabilityClass::A => SpreadCoefficients::new(0.22, 0.20),
            StabilityClass::B => SpreadCoefficients::new(0.16, 0.12),
            StabilityClass::C => SpreadCoefficients::new(0.11, 0.08),
            StabilityClass::D => SpreadCoefficients::new(0.08, 0.06),
            StabilityClass::E => SpreadCoefficients::new(0.06, 0.03),
            StabilityClass::F => SpreadCoefficients::new(0.04, 0.016),
        }
    }

    /// Resolve a textual class label under the given policy.
    ///
    /// An unrecognized label either falls back to
    /// [`SpreadCoefficients::NEUTRAL_FALLBACK`] or is rejected, depending on
    /// the policy. Leading/trailing whitespace is ignored and labels are
    /// case-insensitive, matching what the reference configuration UI emits.
    pub fn resolve_coefficients(
        label: &str,
        policy: UnknownClassPolicy,
    ) -> Result<SpreadCoefficients, SimulationError> {
        match label.trim().parse::<StabilityClass>() {
            Ok(class) => Ok(class.coefficients()),
            Err(_) if policy == UnknownClassPolicy::FallbackNeutral => {
                tracing::warn!(label, "unknown stability class, using neutral fallback");
                Ok(SpreadCoefficients::NEUTRAL_FALLBACK)
            }
            Err(err) => Err(err),
        }
    }
}

impl FromStr for StabilityClass {
    type Err = SimulationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "A" | "a" => Ok(StabilityClass::A),
            "B" | "b" => Ok(StabilityClass::B),
            "C" | "c" => Ok(StabilityClass::C),
            "D" | "d" => Ok(StabilityClass::D),
            "E" | "e" => Ok(StabilityClass::E),
            "F" | "f" => Ok(StabilityClass::F),
            other => Err(SimulationError::InvalidParameter(format!(
                "unknown stability class '{other}', expected A-F"
            ))),
        }
    }
}

impl fmt::Display for StabilityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            StabilityClass::A => "A",
            StabilityClass::B => "B",
            StabilityClass::C => "C",
            StabilityClass::D => "D",
            StabilityClass::E => "E",
            StabilityClass::F => "F",
        };
        f.write_str(label)
    }
}

/// The (a, b) pair feeding the sigma_y/sigma_z distance laws.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SpreadCoefficients {
    /// Crosswind spread coefficient (a)
    pub horizontal: f64,
    /// Vertical spread coefficient (b)
    pub vertical: f64,
}

impl SpreadCoefficients {
    /// Near-neutral pair used when an unknown class label is tolerated.
    /// Intentionally not equal to any class's table entry, matching the
    /// reference model's default branch.
    pub const NEUTRAL_FALLBACK: SpreadCoefficients = SpreadCoefficients {
        horizontal: 0.10,
        vertical: 0.05,
    };

    pub const fn new(horizontal: f64, vertical: f64) -> Self {
        SpreadCoefficients {
            horizontal,
            vertical,
        }
    }
}

/// Policy for a stability label that does not parse as A-F.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UnknownClassPolicy {
    /// Substitute [`SpreadCoefficients::NEUTRAL_FALLBACK`] and log a warning (default)
    #[default]
    FallbackNeutral,
    /// Reject the label with an error
    Strict,
}
