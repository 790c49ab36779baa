//! Strip Packing SAT Solver
//!
//! This library finds minimal-height placements of rectangular circuits on a
//! fixed-width plate using an order-encoded SAT formulation.

pub mod config;
pub mod packing;
pub mod sat;
pub mod search;
pub mod utils;

pub use config::Settings;
pub use packing::Instance;
pub use search::{PackingSolution, SearchOutcome};

use anyhow::Result;
use std::time::Duration;

/// Main entry point: load the configured instance and search for its
/// minimal plate height.
pub fn solve_instance(settings: &Settings) -> Result<SearchOutcome> {
    let instance = packing::load_instance_from_file(&settings.input.instance_file)?;
    let search = search::HeightSearch::new(
        settings.encoding,
        Duration::from_secs(settings.solver.timeout_seconds),
    );
    search.run(&instance)
}
