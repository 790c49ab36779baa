//! Incremental plate-height search
//!
//! Heights are tried in increasing order from the area lower bound to the
//! stacked-circuits upper bound, so the first satisfiable height is optimal.
//! The time budget spans the whole search; once it runs out the instance is
//! abandoned rather than retried at a later height.

use super::solution::PackingSolution;
use crate::config::EncodingConfig;
use crate::packing::Instance;
use crate::sat::{AttemptOutcome, PlacementEncoder};
use anyhow::Result;
use std::time::{Duration, Instant};

/// Drives the sequence of height attempts for one instance
pub struct HeightSearch {
    encoding: EncodingConfig,
    time_budget: Duration,
}

/// Terminal outcome of a height search
#[derive(Debug, Clone)]
pub enum SearchOutcome {
    /// Solved at the lowest satisfiable height
    Solved(PackingSolution),
    /// The budget ran out while attempting this height; no verdict for it
    TimeExhausted { plate_height: usize },
    /// Every height in the bound range is unsatisfiable
    HeightBoundExceeded,
}

impl HeightSearch {
    pub fn new(encoding: EncodingConfig, time_budget: Duration) -> Self {
        Self {
            encoding,
            time_budget,
        }
    }

    /// Search for the minimal plate height. Each attempt gets a fresh encoder
    /// and whatever remains of the overall budget.
    pub fn run(&self, instance: &Instance) -> Result<SearchOutcome> {
        let started = Instant::now();
        let mut attempts = 0;

        // The unrotated stacking bound can undershoot when rotation is
        // forced, so the rotated bound is used instead. The range is empty
        // when the lower bound already exceeds the upper bound, which
        // happens for instances no height can accommodate.
        let max_height = if self.encoding.rotation {
            instance.max_height_rotated()
        } else {
            instance.max_height()
        };

        for height in instance.min_height()..=max_height {
            let Some(remaining) = self.time_budget.checked_sub(started.elapsed()) else {
                return Ok(SearchOutcome::TimeExhausted { plate_height: height });
            };

            attempts += 1;
            let mut encoder = PlacementEncoder::new(instance, height, self.encoding);
            match encoder.attempt(remaining)? {
                AttemptOutcome::Satisfiable(placements) => {
                    return Ok(SearchOutcome::Solved(PackingSolution::new(
                        instance,
                        height,
                        placements,
                        started.elapsed(),
                        attempts,
                        self.encoding.rotation,
                    )));
                }
                AttemptOutcome::Unsatisfiable => {}
                AttemptOutcome::TimeExhausted => {
                    return Ok(SearchOutcome::TimeExhausted { plate_height: height });
                }
            }
        }

        Ok(SearchOutcome::HeightBoundExceeded)
    }
}
