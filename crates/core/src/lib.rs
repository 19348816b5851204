//! Pollutant Dispersion Core Library
//!
//! A Gaussian-plume grid engine for vehicle exhaust: each simulation tick,
//! every moving point source (a vehicle) contributes to a 2D concentration
//! field over a bounded window, after a global decay pass models passive
//! loss between ticks.
//!
//! ## Structure
//!
//! - [`grid`] - the owned concentration field with bounds-safe index and
//!   window operations
//! - [`physics`] - emission-rate/plume-rise fits and the sigma spread laws
//! - [`core_types`] - stability classes and per-tick vehicle snapshots
//! - [`solver`] - the batch updater tying it all together
//!
//! The external traffic simulator is a collaborator, not a dependency: it
//! hands in `(x, y, speed)` snapshots each tick and reads the grid back
//! through the read-only accessors.

pub mod config;
pub mod core_types;
pub mod error;
pub mod grid;
pub mod physics;
pub mod solver;

// Re-export the boundary types
pub use config::{DomainBounds, MalformedSourcePolicy, PlumeConfig};
pub use core_types::{SpreadCoefficients, StabilityClass, UnknownClassPolicy, VehicleSource};
pub use error::SimulationError;
pub use grid::{GridStats, GridWindow, PollutionGrid};
pub use solver::{AmbientConditions, PlumeSolver, TickStats};
