//! Gaussian spread laws
//!
//! sigma_y and sigma_z describe how far the plume has spread crosswind and
//! vertically after traveling a given distance. Both follow the same
//! stretched-linear form `c · d · (1 + 1e-4·d)^-0.5`, with the coefficient
//! taken from the stability-class table
//! ([`crate::StabilityClass::coefficients`]).

/// Far-field flattening constant of the spread law (1/m)
const STRETCH_FACTOR: f64 = 1e-4;

fn spread(distance: f64, coefficient: f64) -> f64 {
    coefficient * distance * (1.0 + STRETCH_FACTOR * distance).powf(-0.5)
}

/// Crosswind spread (m) at the given downwind distance.
/// Strictly positive for `distance > 0` and positive coefficient.
pub fn sigma_y(distance: f64, horizontal_coefficient: f64) -> f64 {
    spread(distance, horizontal_coefficient)
}

/// Vertical spread (m) at the given downwind distance.
pub fn sigma_z(distance: f64, vertical_coefficient: f64) -> f64 {
    spread(distance, vertical_coefficient)
}
