//! Physical sub-models: per-vehicle emission and Gaussian spread laws

pub mod dispersion;
pub mod emission;

pub use dispersion::{sigma_y, sigma_z};
pub use emission::{emission_rate, plume_rise};
