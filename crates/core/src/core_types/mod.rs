//! Core types shared across the simulation

pub mod source;
pub mod stability;

pub use source::VehicleSource;
pub use stability::{SpreadCoefficients, StabilityClass, UnknownClassPolicy};
