//! 2D pollutant concentration grid
//!
//! Owns the mutable concentration field as a flat row-major `Vec<f64>`
//! (`iy * nx + ix`) over a rectangular world-space domain. All spatial access
//! goes through bounds-checked accessors or clipped windows; nothing here can
//! write outside the buffer. Invariant: every cell is finite and >= 0.

use serde::{Deserialize, Serialize};

use crate::config::DomainBounds;
use crate::error::SimulationError;

/// A clipped half-open index range `[ix_min, ix_max) x [iy_min, iy_max)`.
///
/// Produced by [`PollutionGrid::window_for`]; always within grid bounds, may
/// be empty when the requested region lies outside the domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridWindow {
    pub ix_min: usize,
    pub ix_max: usize,
    pub iy_min: usize,
    pub iy_max: usize,
}

impl GridWindow {
    /// True when the window covers no cells
    pub fn is_empty(&self) -> bool {
        self.ix_min >= self.ix_max || self.iy_min >= self.iy_max
    }

    /// Number of cells covered
    pub fn cell_count(&self) -> usize {
        if self.is_empty() {
            0
        } else {
            (self.ix_max - self.ix_min) * (self.iy_max - self.iy_min)
        }
    }
}

/// Copyable grid geometry: dimensions plus the world<->index transform.
/// Lets the kernel iterate cell centers without borrowing the cell buffer.
#[derive(Debug, Clone, Copy)]
pub(crate) struct GridGeometry {
    pub nx: usize,
    pub ny: usize,
    pub x_min: f64,
    pub y_min: f64,
    pub cell_width: f64,
    pub cell_height: f64,
}

impl GridGeometry {
    /// World coordinates of the center of cell (ix, iy)
    pub fn cell_center(&self, ix: usize, iy: usize) -> (f64, f64) {
        (
            self.x_min + (ix as f64 + 0.5) * self.cell_width,
            self.y_min + (iy as f64 + 0.5) * self.cell_height,
        )
    }

    /// Flat buffer index of cell (ix, iy)
    #[inline]
    pub fn cell_index(&self, ix: usize, iy: usize) -> usize {
        iy * self.nx + ix
    }

    /// Map the square of half-width `radius` centered on a world point into
    /// a clipped index window. Truncating linear transform, clamped to the
    /// grid on both ends.
    pub fn window_for(&self, x: f64, y: f64, radius: f64) -> GridWindow {
        assert!(
            radius.is_finite() && radius > 0.0,
            "window radius must be positive, got {radius}"
        );
        let nx = self.nx as f64;
        let ny = self.ny as f64;
        let width = nx * self.cell_width;
        let height = ny * self.cell_height;

        let ix_min = ((x - radius - self.x_min) / width * nx).clamp(0.0, nx) as usize;
        let ix_max = ((x + radius - self.x_min) / width * nx).clamp(0.0, nx) as usize;
        let iy_min = ((y - radius - self.y_min) / height * ny).clamp(0.0, ny) as usize;
        let iy_max = ((y + radius - self.y_min) / height * ny).clamp(0.0, ny) as usize;

        GridWindow {
            ix_min,
            ix_max,
            iy_min,
            iy_max,
        }
    }
}

/// Summary statistics over the field, for dashboards and quick checks
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridStats {
    /// Largest cell value
    pub max: f64,
    /// Mean over all cells
    pub mean: f64,
    /// Cells holding a strictly positive concentration
    pub nonzero_cells: usize,
    /// Indices of the peak cell, None on an all-zero grid
    pub peak_cell: Option<(usize, usize)>,
}

/// The pollutant concentration field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PollutionGrid {
    nx: usize,
    ny: usize,
    bounds: DomainBounds,
    cell_width: f64,
    cell_height: f64,
    /// Row-major: `iy * nx + ix`
    cells: Vec<f64>,
}

impl PollutionGrid {
    /// Create a square-resolution grid over the given domain, all cells zero.
    pub fn new(bounds: DomainBounds, resolution: usize) -> Result<Self, SimulationError> {
        Self::with_dimensions(bounds, resolution, resolution)
    }

    /// Create a grid with independent x/y cell counts.
    pub fn with_dimensions(
        bounds: DomainBounds,
        nx: usize,
        ny: usize,
    ) -> Result<Self, SimulationError> {
        bounds.validate()?;
        if nx == 0 || ny == 0 {
            return Err(SimulationError::Configuration(format!(
                "grid resolution must be positive, got {nx}x{ny}"
            )));
        }
        let cell_width = bounds.width() / nx as f64;
        let cell_height = bounds.height() / ny as f64;
        tracing::info!(
            nx,
            ny,
            cell_width,
            cell_height,
            "created pollution grid over ({}, {}) - ({}, {})",
            bounds.x_min,
            bounds.y_min,
            bounds.x_max,
            bounds.y_max
        );
        Ok(PollutionGrid {
            nx,
            ny,
            bounds,
            cell_width,
            cell_height,
            cells: vec![0.0; nx * ny],
        })
    }

    /// Cells along x
    pub fn nx(&self) -> usize {
        self.nx
    }

    /// Cells along y
    pub fn ny(&self) -> usize {
        self.ny
    }

    /// Domain covered by the grid
    pub fn bounds(&self) -> DomainBounds {
        self.bounds
    }

    /// Cell width in world units (m)
    pub fn cell_width(&self) -> f64 {
        self.cell_width
    }

    /// Cell height in world units (m)
    pub fn cell_height(&self) -> f64 {
        self.cell_height
    }

    /// Read-only view of the field, row-major `iy * nx + ix`
    pub fn as_slice(&self) -> &[f64] {
        &self.cells
    }

    pub(crate) fn cells_mut(&mut self) -> &mut [f64] {
        &mut self.cells
    }

    pub(crate) fn geometry(&self) -> GridGeometry {
        GridGeometry {
            nx: self.nx,
            ny: self.ny,
            x_min: self.bounds.x_min,
            y_min: self.bounds.y_min,
            cell_width: self.cell_width,
            cell_height: self.cell_height,
        }
    }

    /// Concentration at cell (ix, iy)
    ///
    /// # Panics
    /// Panics if the indices are out of range.
    pub fn value_at(&self, ix: usize, iy: usize) -> f64 {
        assert!(
            ix < self.nx && iy < self.ny,
            "cell ({ix}, {iy}) out of range for {}x{} grid",
            self.nx,
            self.ny
        );
        self.cells[iy * self.nx + ix]
    }

    /// Accumulate a contribution into cell (ix, iy).
    ///
    /// Out-of-range indices are a caller contract violation: clipping happens
    /// in [`PollutionGrid::window_for`], never here.
    ///
    /// # Panics
    /// Panics if the indices are out of range.
    pub fn add_contribution(&mut self, ix: usize, iy: usize, value: f64) {
        assert!(
            ix < self.nx && iy < self.ny,
            "cell ({ix}, {iy}) out of range for {}x{} grid",
            self.nx,
            self.ny
        );
        self.cells[iy * self.nx + ix] += value;
    }

    /// Multiply every cell by `factor`, modeling passive loss between ticks.
    ///
    /// # Panics
    /// Panics if `factor` is outside `(0, 1]`; the solver validates its decay
    /// factor at construction, so this fires only on direct misuse.
    pub fn apply_decay(&mut self, factor: f64) {
        assert!(
            factor > 0.0 && factor <= 1.0,
            "decay factor must be in (0, 1], got {factor}"
        );
        for cell in &mut self.cells {
            *cell *= factor;
        }
    }

    /// Clipped index window for a world-space square of half-width `radius`.
    /// See [`GridWindow`]; an off-domain request yields an empty window.
    pub fn window_for(&self, x: f64, y: f64, radius: f64) -> GridWindow {
        self.geometry().window_for(x, y, radius)
    }

    /// World coordinates of the center of cell (ix, iy)
    pub fn cell_center(&self, ix: usize, iy: usize) -> (f64, f64) {
        self.geometry().cell_center(ix, iy)
    }

    /// Indices of the cell containing a world point, None outside the domain
    pub fn cell_containing(&self, x: f64, y: f64) -> Option<(usize, usize)> {
        if !self.bounds.contains(x, y) {
            return None;
        }
        let ix = ((x - self.bounds.x_min) / self.cell_width) as usize;
        let iy = ((y - self.bounds.y_min) / self.cell_height) as usize;
        // Points on the far edge of the last cell round down into range
        Some((ix.min(self.nx - 1), iy.min(self.ny - 1)))
    }

    /// Summary statistics over the field
    pub fn stats(&self) -> GridStats {
        let mut max = 0.0_f64;
        let mut sum = 0.0_f64;
        let mut nonzero = 0_usize;
        let mut peak = None;
        for (index, &value) in self.cells.iter().enumerate() {
            sum += value;
            if value > 0.0 {
                nonzero += 1;
            }
            if value > max {
                max = value;
                peak = Some((index % self.nx, index / self.nx));
            }
        }
        GridStats {
            max,
            mean: sum / self.cells.len() as f64,
            nonzero_cells: nonzero,
            peak_cell: peak,
        }
    }
}
