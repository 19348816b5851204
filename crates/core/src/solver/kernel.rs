//! Gaussian-plume dispersion kernel
//!
//! Computes one source's contribution over a clipped grid window and
//! accumulates it into a cell buffer. This is the hot loop: all parameter
//! validation happened at the solver boundary, the only branches left are
//! the two distance guards.

use nalgebra::Vector2;

use crate::core_types::SpreadCoefficients;
use crate::grid::pollution_grid::{GridGeometry, GridWindow};
use crate::physics::{sigma_y, sigma_z};

/// Fully derived per-source dispersion parameters for one tick.
#[derive(Debug, Clone, Copy)]
pub(crate) struct PlumeParameters {
    pub source: Vector2<f64>,
    /// Emission rate after speed and fleet scaling (g/s)
    pub emission_rate: f64,
    /// Effective release height (m)
    pub plume_height: f64,
    /// Wind speed (m/s), validated > 0
    pub wind_speed: f64,
    /// Wind direction (radians), normalized into [0, 2*pi)
    pub wind_direction: f64,
    pub coefficients: SpreadCoefficients,
}

/// Accumulate one source's plume into `cells` over `window`.
///
/// Receptors closer than `near_cutoff` to the source are skipped (point-source
/// singularity), receptors beyond `influence_radius` as well. The vertical
/// term is the doubled single-exponential form of the reference model, not
/// the textbook ground-reflection mirror pair.
pub(crate) fn disperse_into(
    geometry: GridGeometry,
    window: GridWindow,
    cells: &mut [f64],
    plume: &PlumeParameters,
    near_cutoff: f64,
    influence_radius: f64,
) {
    let two_pi = std::f64::consts::TAU;
    let near_cutoff_sq = near_cutoff * near_cutoff;
    let normalization = plume.emission_rate / (two_pi * plume.wind_speed);

    for iy in window.iy_min..window.iy_max {
        for ix in window.ix_min..window.ix_max {
            let (receptor_x, receptor_y) = geometry.cell_center(ix, iy);
            let dx = receptor_x - plume.source.x;
            let dy = receptor_y - plume.source.y;
            let distance_sq = dx * dx + dy * dy;

            if distance_sq < near_cutoff_sq {
                continue;
            }
            let distance = distance_sq.sqrt();
            if distance > influence_radius {
                continue;
            }

            // Angle between wind direction and the source->receptor bearing,
            // wrapped into [0, pi]; only its square is used below
            let mut angle_diff = (dy.atan2(dx) - plume.wind_direction).abs();
            if angle_diff > std::f64::consts::PI {
                angle_diff = two_pi - angle_diff;
            }

            let sy = sigma_y(distance, plume.coefficients.horizontal);
            let sz = sigma_z(distance, plume.coefficients.vertical);

            let lateral = (-0.5 * (angle_diff / sy).powi(2)).exp();
            let vertical = 2.0 * (-0.5 * (plume.plume_height / sz).powi(2)).exp();

            cells[geometry.cell_index(ix, iy)] += normalization * lateral * vertical / (sy * sz);
        }
    }
}
