//! SAT encoder for a single plate-height attempt
//!
//! Each candidate height gets a fresh variable universe, constraint set, and
//! solver instance; nothing is shared between attempts.

use super::{ConstraintGenerator, SatSolver, SolverModel, SolverVerdict};
use crate::config::EncodingConfig;
use crate::packing::{Circuit, Instance, Placement};
use anyhow::{Context, Result};
use std::collections::HashMap;
use std::time::Duration;

/// Encodes and solves the placement problem at one candidate height
pub struct PlacementEncoder {
    constraint_generator: ConstraintGenerator,
    solver: SatSolver,
    circuits: Vec<Circuit>,
    plate_width: usize,
    plate_height: usize,
    rotation: bool,
}

/// Outcome of one height attempt
#[derive(Debug, Clone)]
pub enum AttemptOutcome {
    Satisfiable(Vec<Placement>),
    Unsatisfiable,
    TimeExhausted,
}

impl PlacementEncoder {
    /// Create an encoder for the given instance at one candidate height
    pub fn new(instance: &Instance, plate_height: usize, encoding: EncodingConfig) -> Self {
        Self {
            constraint_generator: ConstraintGenerator::new(instance, plate_height, encoding),
            solver: SatSolver::new(),
            circuits: instance.circuits().to_vec(),
            plate_width: instance.plate_width(),
            plate_height,
            rotation: encoding.rotation,
        }
    }

    /// Encode the placement problem and solve it within the time budget
    pub fn attempt(&mut self, budget: Duration) -> Result<AttemptOutcome> {
        let clauses = self
            .constraint_generator
            .generate_all_constraints()
            .context("Failed to generate placement constraints")?;

        self.solver
            .add_clauses(&clauses)
            .context("Failed to add clauses to SAT solver")?;
        self.solver.set_timeout(budget);

        match self.solver.solve()? {
            SolverVerdict::Satisfiable(model) => {
                let placements = self.extract_placements(&model)?;
                Ok(AttemptOutcome::Satisfiable(placements))
            }
            SolverVerdict::Unsatisfiable => Ok(AttemptOutcome::Unsatisfiable),
            SolverVerdict::TimeExhausted => Ok(AttemptOutcome::TimeExhausted),
        }
    }

    /// Decode every circuit's placement from a satisfying assignment
    fn extract_placements(&mut self, model: &SolverModel) -> Result<Vec<Placement>> {
        let mut placements = Vec::with_capacity(self.circuits.len());

        for circuit in 0..self.circuits.len() {
            let variable_manager = self.constraint_generator.variable_manager();

            let x_literals = variable_manager.x_positions(circuit)?;
            let y_literals = variable_manager.y_positions(circuit)?;
            let x = decode_position(&model.assignment, &x_literals);
            let y = decode_position(&model.assignment, &y_literals);

            let rotated = if self.rotation {
                let flag = variable_manager.rotation_flag(circuit)?;
                model.assignment.get(&flag).copied().unwrap_or(false)
            } else {
                false
            };

            let Circuit { width, height } = self.circuits[circuit];
            let (width, height) = if rotated { (height, width) } else { (width, height) };

            placements.push(Placement::new(width, height, x, y));
        }

        Ok(placements)
    }

    /// Get encoding statistics
    pub fn statistics(&self) -> EncodingStatistics {
        let solver_stats = self.solver.statistics();

        EncodingStatistics {
            circuit_count: self.circuits.len(),
            plate_width: self.plate_width,
            plate_height: self.plate_height,
            total_variables: solver_stats.variable_count,
            total_clauses: solver_stats.clause_count,
        }
    }
}

/// Decode an order-encoded literal sequence: the position is the index of the
/// first true literal, or the sequence length when none is true. Unassigned
/// literals count as false.
pub fn decode_position(assignment: &HashMap<i32, bool>, literals: &[i32]) -> usize {
    literals
        .iter()
        .position(|literal| assignment.get(literal).copied().unwrap_or(false))
        .unwrap_or(literals.len())
}

/// Statistics about one height attempt's encoding
#[derive(Debug, Clone)]
pub struct EncodingStatistics {
    pub circuit_count: usize,
    pub plate_width: usize,
    pub plate_height: usize,
    pub total_variables: usize,
    pub total_clauses: usize,
}

impl std::fmt::Display for EncodingStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "SAT Encoding Statistics:")?;
        writeln!(f, "  Circuits: {}", self.circuit_count)?;
        writeln!(f, "  Plate: {}x{}", self.plate_width, self.plate_height)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  Total clauses: {}", self.total_clauses)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encoding(rotation: bool, symmetry_breaking: bool, pruning: bool) -> EncodingConfig {
        EncodingConfig {
            rotation,
            symmetry_breaking,
            pruning,
        }
    }

    fn budget() -> Duration {
        Duration::from_secs(30)
    }

    fn assert_valid_placements(placements: &[Placement], plate_width: usize, plate_height: usize) {
        for placement in placements {
            assert!(placement.fits_within(plate_width, plate_height), "{:?}", placement);
        }
        for (i, a) in placements.iter().enumerate() {
            for b in &placements[i + 1..] {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_decode_position() {
        let mut assignment = HashMap::new();
        assignment.insert(1, false);
        assignment.insert(2, true);
        assignment.insert(3, true);

        assert_eq!(decode_position(&assignment, &[1, 2, 3]), 1);
        assert_eq!(decode_position(&assignment, &[2, 3]), 0);
        // literal 4 is unassigned and counts as false
        assert_eq!(decode_position(&assignment, &[1, 4]), 2);
    }

    #[test]
    fn test_exact_fit_square() {
        let instance = Instance::new(4, vec![(4, 4)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 4, encoding(false, true, true));

        match encoder.attempt(budget()).unwrap() {
            AttemptOutcome::Satisfiable(placements) => {
                assert_eq!(placements.len(), 1);
                assert_eq!(placements[0], Placement::new(4, 4, 0, 0));
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_instance_at_optimal_height() {
        let instance = Instance::new(9, vec![(3, 3), (2, 4), (2, 8), (3, 9), (4, 12)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 12, encoding(false, true, true));

        match encoder.attempt(budget()).unwrap() {
            AttemptOutcome::Satisfiable(placements) => {
                assert_eq!(placements.len(), 5);
                assert_valid_placements(&placements, 9, 12);
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_reference_instance_below_optimal_height() {
        // Total area is 108 = 9 * 12, so height 11 lacks area entirely.
        let instance = Instance::new(9, vec![(3, 3), (2, 4), (2, 8), (3, 9), (4, 12)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 11, encoding(false, true, true));

        assert!(matches!(
            encoder.attempt(budget()).unwrap(),
            AttemptOutcome::Unsatisfiable
        ));
    }

    #[test]
    fn test_pruning_preserves_satisfiability() {
        let instance = Instance::new(9, vec![(3, 3), (2, 4), (2, 8), (3, 9), (4, 12)]).unwrap();

        let mut pruned = PlacementEncoder::new(&instance, 12, encoding(false, true, true));
        let mut unpruned = PlacementEncoder::new(&instance, 12, encoding(false, false, false));

        assert!(matches!(
            pruned.attempt(budget()).unwrap(),
            AttemptOutcome::Satisfiable(_)
        ));
        assert!(matches!(
            unpruned.attempt(budget()).unwrap(),
            AttemptOutcome::Satisfiable(_)
        ));
    }

    #[test]
    fn test_pruning_preserves_unsatisfiability() {
        // Height 11 lacks area entirely; pruning must agree with the full
        // encoding on the UNSAT side as well.
        let instance = Instance::new(9, vec![(3, 3), (2, 4), (2, 8), (3, 9), (4, 12)]).unwrap();

        let mut pruned = PlacementEncoder::new(&instance, 11, encoding(false, true, true));
        let mut unpruned = PlacementEncoder::new(&instance, 11, encoding(false, false, false));

        assert!(matches!(
            pruned.attempt(budget()).unwrap(),
            AttemptOutcome::Unsatisfiable
        ));
        assert!(matches!(
            unpruned.attempt(budget()).unwrap(),
            AttemptOutcome::Unsatisfiable
        ));
    }

    #[test]
    fn test_identical_largest_circuits_with_symmetry_breaking() {
        // Two equal largest circuits: the anchor is confined to the
        // left/bottom half while identical-pair pruning keeps only
        // first-left-of/below-second. Both must favor the same twin or a
        // feasible instance comes out UNSAT.
        let instance = Instance::new(4, vec![(3, 3), (3, 3)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 6, encoding(false, true, true));

        match encoder.attempt(budget()).unwrap() {
            AttemptOutcome::Satisfiable(placements) => {
                assert_valid_placements(&placements, 4, 6);
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_oversized_circuit_unsatisfiable() {
        let instance = Instance::new(4, vec![(5, 2), (1, 1)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 10, encoding(false, false, true));

        assert!(matches!(
            encoder.attempt(budget()).unwrap(),
            AttemptOutcome::Unsatisfiable
        ));
    }

    #[test]
    fn test_rotation_recovers_oversized_circuit() {
        // The 5x2 circuit only fits the 4-wide plate rotated.
        let instance = Instance::new(4, vec![(5, 2), (1, 1)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 6, encoding(true, false, true));

        match encoder.attempt(budget()).unwrap() {
            AttemptOutcome::Satisfiable(placements) => {
                assert_valid_placements(&placements, 4, 6);
                // decoded dimensions reflect the forced rotation
                assert_eq!((placements[0].width, placements[0].height), (2, 5));
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_rotation_solution_dimensions_match_circuits() {
        let instance = Instance::new(3, vec![(3, 1), (1, 3), (2, 2)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 4, encoding(true, true, true));

        match encoder.attempt(budget()).unwrap() {
            AttemptOutcome::Satisfiable(placements) => {
                assert_valid_placements(&placements, 3, 4);
                for (placement, circuit) in placements.iter().zip(instance.circuits()) {
                    let upright = (placement.width, placement.height) == (circuit.width, circuit.height);
                    let swapped = (placement.width, placement.height) == (circuit.height, circuit.width);
                    assert!(upright || swapped);
                }
            }
            other => panic!("expected satisfiable, got {:?}", other),
        }
    }

    #[test]
    fn test_statistics_after_attempt() {
        let instance = Instance::new(4, vec![(2, 2), (2, 2)]).unwrap();
        let mut encoder = PlacementEncoder::new(&instance, 4, encoding(false, false, true));
        encoder.attempt(budget()).unwrap();

        let stats = encoder.statistics();
        assert_eq!(stats.circuit_count, 2);
        assert!(stats.total_variables > 0);
        assert!(stats.total_clauses > 0);
    }
}
