//! Moving point sources (vehicles)

use nalgebra::Vector2;
use serde::{Deserialize, Serialize};

/// One vehicle's state for a single tick.
///
/// Sources are ephemeral: the driver owns vehicle identity and lifecycle, the
/// engine only sees a fresh position/speed snapshot each tick.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VehicleSource {
    /// World position (m)
    pub position: Vector2<f64>,
    /// Ground speed (m/s)
    pub speed: f64,
}

impl VehicleSource {
    pub fn new(x: f64, y: f64, speed: f64) -> Self {
        VehicleSource {
            position: Vector2::new(x, y),
            speed,
        }
    }

    /// A well-formed source has finite coordinates and a finite,
    /// non-negative speed. Anything else is handled according to
    /// [`crate::MalformedSourcePolicy`].
    pub fn is_well_formed(&self) -> bool {
        self.position.x.is_finite()
            && self.position.y.is_finite()
            && self.speed.is_finite()
            && self.speed >= 0.0
    }
}
