//! Concentration grid storage and bounds-safe spatial operations

pub mod pollution_grid;

pub use pollution_grid::{GridStats, GridWindow, PollutionGrid};
