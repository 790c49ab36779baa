//! Independent geometric validation of decoded solutions
//!
//! Checks placements against the original instance rather than the SAT
//! model, so an encoding or decoding bug cannot validate itself.

use super::solution::PackingSolution;
use crate::packing::Instance;
use itertools::Itertools;

/// Validates solved placements against their instance
pub struct PlacementValidator {
    rotation: bool,
}

/// Result of solution validation
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub violations: Vec<Violation>,
}

/// A single geometric or structural violation. Indices refer to the
/// instance's sorted circuit order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    CountMismatch { expected: usize, found: usize },
    DimensionMismatch { index: usize },
    OutOfBounds { index: usize },
    Overlap { first: usize, second: usize },
}

impl PlacementValidator {
    pub fn new(rotation: bool) -> Self {
        Self { rotation }
    }

    /// Check count, per-circuit dimensions, plate bounds, and pairwise
    /// non-overlap. All violations are collected, not just the first.
    pub fn validate(&self, instance: &Instance, solution: &PackingSolution) -> ValidationResult {
        let mut violations = Vec::new();

        if solution.placements.len() != instance.circuit_count() {
            violations.push(Violation::CountMismatch {
                expected: instance.circuit_count(),
                found: solution.placements.len(),
            });
            return ValidationResult {
                is_valid: false,
                violations,
            };
        }

        for (index, (placement, circuit)) in solution
            .placements
            .iter()
            .zip(instance.circuits())
            .enumerate()
        {
            let upright = (placement.width, placement.height) == (circuit.width, circuit.height);
            let swapped = (placement.width, placement.height) == (circuit.height, circuit.width);
            if !(upright || (self.rotation && swapped)) {
                violations.push(Violation::DimensionMismatch { index });
            }

            if !placement.fits_within(solution.plate_width, solution.plate_height) {
                violations.push(Violation::OutOfBounds { index });
            }
        }

        for (first, second) in (0..solution.placements.len()).tuple_combinations() {
            if solution.placements[first].overlaps(&solution.placements[second]) {
                violations.push(Violation::Overlap { first, second });
            }
        }

        ValidationResult {
            is_valid: violations.is_empty(),
            violations,
        }
    }
}

impl std::fmt::Display for Violation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Violation::CountMismatch { expected, found } => {
                write!(f, "expected {} placements, found {}", expected, found)
            }
            Violation::DimensionMismatch { index } => {
                write!(f, "circuit {} placed with wrong dimensions", index)
            }
            Violation::OutOfBounds { index } => {
                write!(f, "circuit {} extends outside the plate", index)
            }
            Violation::Overlap { first, second } => {
                write!(f, "circuits {} and {} overlap", first, second)
            }
        }
    }
}
