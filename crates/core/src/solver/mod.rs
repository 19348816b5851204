//! Batched multi-source grid update
//!
//! [`PlumeSolver`] runs one tick: validate everything at the boundary, apply
//! global decay, then disperse each source through the kernel. Large batches
//! run sources in parallel with rayon, each worker accumulating into a
//! private scratch buffer that is merged by elementwise summation, so results
//! match the serial path within floating-point tolerance regardless of worker
//! count.

mod kernel;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::config::{MalformedSourcePolicy, PlumeConfig};
use crate::core_types::{SpreadCoefficients, StabilityClass, VehicleSource};
use crate::error::SimulationError;
use crate::grid::PollutionGrid;
use crate::physics::{emission_rate, plume_rise};

use kernel::PlumeParameters;

/// Per-tick ambient inputs shared by every source.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AmbientConditions {
    /// Wind speed (m/s), must be positive
    pub wind_speed: f64,
    /// Direction the wind blows toward (radians)
    pub wind_direction: f64,
    /// Global fleet emission multiplier, must be non-negative
    pub emission_factor: f64,
    /// Spread coefficients, from a stability class or the neutral fallback
    pub coefficients: SpreadCoefficients,
}

impl AmbientConditions {
    pub fn new(
        wind_speed: f64,
        wind_direction: f64,
        emission_factor: f64,
        stability_class: StabilityClass,
    ) -> Self {
        Self::with_coefficients(
            wind_speed,
            wind_direction,
            emission_factor,
            stability_class.coefficients(),
        )
    }

    /// Conditions with an explicit coefficient pair, e.g. the neutral
    /// fallback resolved from an untrusted label via
    /// [`StabilityClass::resolve_coefficients`].
    pub fn with_coefficients(
        wind_speed: f64,
        wind_direction: f64,
        emission_factor: f64,
        coefficients: SpreadCoefficients,
    ) -> Self {
        AmbientConditions {
            wind_speed,
            wind_direction,
            emission_factor,
            coefficients,
        }
    }

    fn validate(&self) -> Result<(), SimulationError> {
        if !self.wind_speed.is_finite() || self.wind_speed <= 0.0 {
            return Err(SimulationError::InvalidParameter(format!(
                "wind_speed must be positive, got {}",
                self.wind_speed
            )));
        }
        if !self.wind_direction.is_finite() {
            return Err(SimulationError::InvalidParameter(format!(
                "wind_direction must be finite, got {}",
                self.wind_direction
            )));
        }
        if !self.emission_factor.is_finite() || self.emission_factor < 0.0 {
            return Err(SimulationError::InvalidParameter(format!(
                "emission_factor must be non-negative, got {}",
                self.emission_factor
            )));
        }
        if !self.coefficients.horizontal.is_finite()
            || self.coefficients.horizontal <= 0.0
            || !self.coefficients.vertical.is_finite()
            || self.coefficients.vertical <= 0.0
        {
            return Err(SimulationError::InvalidParameter(format!(
                "spread coefficients must be positive, got ({}, {})",
                self.coefficients.horizontal, self.coefficients.vertical
            )));
        }
        Ok(())
    }

    /// Wind direction wrapped into [0, 2*pi), the domain the kernel's single
    /// angle wrap assumes
    fn normalized_direction(&self) -> f64 {
        self.wind_direction.rem_euclid(std::f64::consts::TAU)
    }
}

/// Outcome of one batch update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickStats {
    /// Sources dispersed into the grid
    pub sources_applied: usize,
    /// Malformed sources dropped under [`MalformedSourcePolicy::SkipAndReport`]
    pub sources_skipped: usize,
}

/// Orchestrates decay plus per-source dispersion for one tick.
///
/// Construction validates the [`PlumeConfig`] once; every `update` call then
/// validates its per-tick inputs before the first grid mutation, so a failed
/// call never leaves a partially updated grid.
#[derive(Debug, Clone)]
pub struct PlumeSolver {
    config: PlumeConfig,
}

impl PlumeSolver {
    pub fn new(config: PlumeConfig) -> Result<Self, SimulationError> {
        config.validate()?;
        Ok(PlumeSolver { config })
    }

    pub fn config(&self) -> &PlumeConfig {
        &self.config
    }

    /// Run one tick: decay the whole grid, then add every source's plume.
    ///
    /// Sources are independent; their accumulation order only perturbs
    /// results within floating-point tolerance. Batches at or above
    /// `parallel_source_threshold` are dispersed in parallel.
    pub fn update(
        &self,
        grid: &mut PollutionGrid,
        sources: &[VehicleSource],
        conditions: &AmbientConditions,
    ) -> Result<TickStats, SimulationError> {
        conditions.validate()?;
        let (plumes, sources_skipped) = self.screen_sources(sources, conditions)?;

        // Validation is complete; from here the tick always runs to the end
        grid.apply_decay(self.config.decay_factor);

        if plumes.len() >= self.config.parallel_source_threshold {
            self.disperse_parallel(grid, &plumes);
        } else {
            self.disperse_serial(grid, &plumes);
        }

        let stats = TickStats {
            sources_applied: plumes.len(),
            sources_skipped,
        };
        tracing::debug!(
            applied = stats.sources_applied,
            skipped = stats.sources_skipped,
            "tick complete"
        );
        Ok(stats)
    }

    /// Disperse a single source without applying decay. Incremental/debug
    /// counterpart of [`PlumeSolver::update`].
    pub fn disperse_single(
        &self,
        grid: &mut PollutionGrid,
        source: &VehicleSource,
        conditions: &AmbientConditions,
    ) -> Result<(), SimulationError> {
        conditions.validate()?;
        let (plumes, _) = self.screen_sources(std::slice::from_ref(source), conditions)?;
        self.disperse_serial(grid, &plumes);
        Ok(())
    }

    /// Validate sources against the malformed-source policy and derive the
    /// per-source dispersion parameters. No grid access happens here.
    fn screen_sources(
        &self,
        sources: &[VehicleSource],
        conditions: &AmbientConditions,
    ) -> Result<(Vec<PlumeParameters>, usize), SimulationError> {
        let wind_direction = conditions.normalized_direction();
        let mut plumes = Vec::with_capacity(sources.len());
        let mut skipped = 0_usize;

        for (index, source) in sources.iter().enumerate() {
            if !source.is_well_formed() {
                match self.config.malformed_source_policy {
                    MalformedSourcePolicy::AbortTick => {
                        return Err(SimulationError::InvalidParameter(format!(
                            "source {index} is malformed: position ({}, {}), speed {}",
                            source.position.x, source.position.y, source.speed
                        )));
                    }
                    MalformedSourcePolicy::SkipAndReport => {
                        tracing::warn!(
                            index,
                            x = source.position.x,
                            y = source.position.y,
                            speed = source.speed,
                            "skipping malformed source"
                        );
                        skipped += 1;
                        continue;
                    }
                }
            }
            plumes.push(PlumeParameters {
                source: source.position,
                emission_rate: emission_rate(
                    source.speed,
                    self.config.base_emission,
                    conditions.emission_factor,
                ),
                plume_height: plume_rise(source.speed),
                wind_speed: conditions.wind_speed,
                wind_direction,
                coefficients: conditions.coefficients,
            });
        }
        Ok((plumes, skipped))
    }

    fn disperse_serial(&self, grid: &mut PollutionGrid, plumes: &[PlumeParameters]) {
        let geometry = grid.geometry();
        let cells = grid.cells_mut();
        for plume in plumes {
            let window = geometry.window_for(
                plume.source.x,
                plume.source.y,
                self.config.capture_radius,
            );
            kernel::disperse_into(
                geometry,
                window,
                cells,
                plume,
                self.config.near_field_cutoff,
                self.config.influence_radius,
            );
        }
    }

    /// Parallel path: partition sources across workers, each accumulating
    /// into a private scratch grid, merged by elementwise summation.
    fn disperse_parallel(&self, grid: &mut PollutionGrid, plumes: &[PlumeParameters]) {
        let geometry = grid.geometry();
        let cell_count = grid.as_slice().len();

        let scratch = plumes
            .par_iter()
            .fold(
                || vec![0.0_f64; cell_count],
                |mut local, plume| {
                    let window = geometry.window_for(
                        plume.source.x,
                        plume.source.y,
                        self.config.capture_radius,
                    );
                    kernel::disperse_into(
                        geometry,
                        window,
                        &mut local,
                        plume,
                        self.config.near_field_cutoff,
                        self.config.influence_radius,
                    );
                    local
                },
            )
            .reduce(
                || vec![0.0_f64; cell_count],
                |mut merged, local| {
                    for (target, value) in merged.iter_mut().zip(local) {
                        *target += value;
                    }
                    merged
                },
            );

        for (cell, contribution) in grid.cells_mut().iter_mut().zip(scratch) {
            *cell += contribution;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DomainBounds;

    fn small_grid() -> PollutionGrid {
        let bounds = DomainBounds::new(0.0, 100.0, 0.0, 100.0).unwrap();
        PollutionGrid::new(bounds, 10).unwrap()
    }

    fn conditions() -> AmbientConditions {
        AmbientConditions::new(5.0, 0.0, 1.0, StabilityClass::D)
    }

    #[test]
    fn test_negative_wind_rejected() {
        let solver = PlumeSolver::new(PlumeConfig::default()).unwrap();
        let mut grid = small_grid();
        let bad = AmbientConditions::new(-2.0, 0.0, 1.0, StabilityClass::D);
        let result = solver.update(&mut grid, &[VehicleSource::new(50.0, 50.0, 10.0)], &bad);
        assert!(matches!(
            result,
            Err(SimulationError::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_screen_derives_parameters() {
        let solver = PlumeSolver::new(PlumeConfig::default()).unwrap();
        let sources = [VehicleSource::new(50.0, 50.0, 30.0)];
        let (plumes, skipped) = solver.screen_sources(&sources, &conditions()).unwrap();
        assert_eq!(skipped, 0);
        assert_eq!(plumes.len(), 1);
        // 30 m/s: emission 0.1 * 1.5, plume rise 0.15*30 + 0.5
        assert!((plumes[0].emission_rate - 0.15).abs() < 1e-12);
        assert!((plumes[0].plume_height - 5.0).abs() < 1e-12);
    }

    #[test]
    fn test_wind_direction_normalized_for_kernel() {
        let solver = PlumeSolver::new(PlumeConfig::default()).unwrap();
        let sources = [VehicleSource::new(50.0, 50.0, 10.0)];
        let shifted = AmbientConditions::new(5.0, -std::f64::consts::PI, 1.0, StabilityClass::D);
        let (plumes, _) = solver.screen_sources(&sources, &shifted).unwrap();
        assert!((plumes[0].wind_direction - std::f64::consts::PI).abs() < 1e-12);
    }

    #[test]
    fn test_skip_policy_counts_and_continues() {
        let config = PlumeConfig {
            malformed_source_policy: MalformedSourcePolicy::SkipAndReport,
            ..PlumeConfig::default()
        };
        let solver = PlumeSolver::new(config).unwrap();
        let sources = [
            VehicleSource::new(f64::NAN, 50.0, 10.0),
            VehicleSource::new(50.0, 50.0, 10.0),
        ];
        let (plumes, skipped) = solver.screen_sources(&sources, &conditions()).unwrap();
        assert_eq!(skipped, 1);
        assert_eq!(plumes.len(), 1);
    }
}
