//! Constraint generation for the strip packing SAT encoding
//!
//! Four clause families are emitted per height attempt: domain constraints
//! restricting each circuit's order-encoded position range, ordering
//! constraints enforcing the order-encoding invariant, rotation constraints
//! fixing flags whose orientation cannot fit the plate, and pairwise
//! non-overlap constraints with geometry-driven literal pruning.

use super::VariableManager;
use crate::config::EncodingConfig;
use crate::packing::{Circuit, Instance};
use anyhow::Result;
use itertools::Itertools;

/// Represents a SAT clause (disjunction of literals)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    /// Positive for variable, negative for negation
    pub literals: Vec<i32>,
}

impl Clause {
    pub fn new(literals: Vec<i32>) -> Self {
        Self { literals }
    }

    /// Create a unit clause (single literal)
    pub fn unit(literal: i32) -> Self {
        Self { literals: vec![literal] }
    }

    /// Create a binary clause (two literals)
    pub fn binary(lit1: i32, lit2: i32) -> Self {
        Self { literals: vec![lit1, lit2] }
    }

    /// The empty clause: an immediate contradiction
    pub fn empty() -> Self {
        Self { literals: Vec::new() }
    }

    /// Build `guard -> (lit1 | lit2 | ...)` when a guard literal is given,
    /// or the plain disjunction otherwise.
    pub fn guarded(guard: Option<i32>, mut literals: Vec<i32>) -> Self {
        if let Some(guard) = guard {
            literals.insert(0, -guard);
        }
        Self { literals }
    }

    /// Check if clause is empty (unsatisfiable)
    pub fn is_empty(&self) -> bool {
        self.literals.is_empty()
    }

    /// Check if clause is unit
    pub fn is_unit(&self) -> bool {
        self.literals.len() == 1
    }
}

/// The two plate axes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Axis {
    Horizontal,
    Vertical,
}

const AXES: [Axis; 2] = [Axis::Horizontal, Axis::Vertical];

/// Which of the four relative-order literals survive pruning for a pair.
/// Fields follow the disjunction order `lr[i][j], lr[j][i], ud[i][j], ud[j][i]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PairDirections {
    pub first_left_of_second: bool,
    pub second_left_of_first: bool,
    pub first_below_second: bool,
    pub second_below_first: bool,
}

impl PairDirections {
    pub fn all() -> Self {
        Self {
            first_left_of_second: true,
            second_left_of_first: true,
            first_below_second: true,
            second_below_first: true,
        }
    }

    pub fn active_count(&self) -> usize {
        [
            self.first_left_of_second,
            self.second_left_of_first,
            self.first_below_second,
            self.second_below_first,
        ]
        .iter()
        .filter(|&&d| d)
        .count()
    }
}

/// Generates placement constraints for one candidate plate height
pub struct ConstraintGenerator {
    variable_manager: VariableManager,
    circuits: Vec<Circuit>,
    plate_width: usize,
    plate_height: usize,
    anchor: usize,
    encoding: EncodingConfig,
}

impl ConstraintGenerator {
    /// Create a generator for the given instance at one candidate height
    pub fn new(instance: &Instance, plate_height: usize, encoding: EncodingConfig) -> Self {
        let variable_manager = VariableManager::new(
            instance.circuit_count(),
            instance.plate_width(),
            plate_height,
            encoding.rotation,
        );

        Self {
            variable_manager,
            circuits: instance.circuits().to_vec(),
            plate_width: instance.plate_width(),
            plate_height,
            anchor: instance.anchor_index(),
            encoding,
        }
    }

    /// Generate all four constraint families
    pub fn generate_all_constraints(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        clauses.extend(self.generate_domain_constraints()?);
        clauses.extend(self.generate_ordering_constraints()?);
        if self.encoding.rotation {
            clauses.extend(self.generate_rotation_constraints()?);
        }
        clauses.extend(self.generate_non_overlap_constraints()?);

        Ok(clauses)
    }

    /// Domain constraints: each circuit's left/bottom edge cannot start past
    /// the last position where its effective size still fits the plate.
    pub fn generate_domain_constraints(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        for circuit in 0..self.circuits.len() {
            for axis in AXES {
                if self.encoding.rotation {
                    let rot = self.variable_manager.rotation_flag(circuit)?;
                    clauses.extend(self.domain_for_axis(circuit, axis, false, Some(-rot))?);
                    clauses.extend(self.domain_for_axis(circuit, axis, true, Some(rot))?);
                } else {
                    clauses.extend(self.domain_for_axis(circuit, axis, false, None)?);
                }
            }
        }

        if self.encoding.symmetry_breaking {
            clauses.extend(self.generate_anchor_confinement()?);
        }

        Ok(clauses)
    }

    /// Domain clauses for one circuit, axis, and orientation. A guard literal
    /// restricts the clauses to the matching rotation branch. An orientation
    /// whose measure exceeds the strip has no feasible position at all: the
    /// guarded form forbids that branch, the unguarded form is a contradiction.
    fn domain_for_axis(
        &mut self,
        circuit: usize,
        axis: Axis,
        rotated: bool,
        guard: Option<i32>,
    ) -> Result<Vec<Clause>> {
        let strip = self.strip_measure(axis);
        let measure = self.circuit_measure(circuit, axis, rotated);

        if measure > strip {
            return Ok(vec![match guard {
                Some(guard) => Clause::unit(-guard),
                None => Clause::empty(),
            }]);
        }

        let mut clauses = Vec::new();
        for position in (strip - measure)..strip {
            let literal = self.position_literal(axis, circuit, position)?;
            clauses.push(Clause::guarded(guard, vec![literal]));
        }
        Ok(clauses)
    }

    /// Symmetry breaking: confine the widest-by-area circuit to the
    /// left/bottom half of its feasible range. Any placement can be reflected
    /// into this half, so completeness is preserved.
    fn generate_anchor_confinement(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        for axis in AXES {
            if self.encoding.rotation {
                let rot = self.variable_manager.rotation_flag(self.anchor)?;
                clauses.extend(self.confinement_for_axis(axis, false, Some(-rot))?);
                clauses.extend(self.confinement_for_axis(axis, true, Some(rot))?);
            } else {
                clauses.extend(self.confinement_for_axis(axis, false, None)?);
            }
        }

        Ok(clauses)
    }

    fn confinement_for_axis(&mut self, axis: Axis, rotated: bool, guard: Option<i32>) -> Result<Vec<Clause>> {
        let strip = self.strip_measure(axis);
        let measure = self.circuit_measure(self.anchor, axis, rotated);
        if measure > strip {
            // infeasible orientation, handled by the domain constraints
            return Ok(Vec::new());
        }

        let slack = strip - measure;
        let mut clauses = Vec::new();
        for position in (slack / 2)..slack {
            let literal = self.position_literal(axis, self.anchor, position)?;
            clauses.push(Clause::guarded(guard, vec![literal]));
        }
        Ok(clauses)
    }

    /// Ordering constraints: `pos[e] -> pos[e+1]` for every adjacent pair,
    /// so each order-encoded sequence decodes to a single integer position.
    pub fn generate_ordering_constraints(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        for circuit in 0..self.circuits.len() {
            for axis in AXES {
                let strip = self.strip_measure(axis);
                for position in 0..strip.saturating_sub(1) {
                    let here = self.position_literal(axis, circuit, position)?;
                    let next = self.position_literal(axis, circuit, position + 1)?;
                    clauses.push(Clause::binary(-here, next));
                }
            }
        }

        Ok(clauses)
    }

    /// Rotation constraints: fix the flag of any circuit for which one
    /// orientation cannot fit the plate. Conflicting units make the height
    /// unsatisfiable, which is the correct verdict.
    pub fn generate_rotation_constraints(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        for (circuit, &Circuit { width, height }) in self.circuits.iter().enumerate() {
            let rot = self.variable_manager.rotation_flag(circuit)?;

            if height > self.plate_width || width > self.plate_height {
                // rotated orientation cannot fit
                clauses.push(Clause::unit(-rot));
            }
            if width > self.plate_width || height > self.plate_height {
                // unrotated orientation cannot fit
                clauses.push(Clause::unit(rot));
            }
        }

        Ok(clauses)
    }

    /// Non-overlap constraints: for every unordered pair, the 4-literal
    /// disjunction over relative-order literals (reduced by pruning), each
    /// surviving literal backed by its implication family.
    pub fn generate_non_overlap_constraints(&mut self) -> Result<Vec<Clause>> {
        let mut clauses = Vec::new();

        for (first, second) in (0..self.circuits.len()).tuple_combinations() {
            let directions = self.pair_directions(first, second);
            clauses.extend(self.non_overlap_for_pair(first, second, directions)?);
        }

        Ok(clauses)
    }

    fn non_overlap_for_pair(
        &mut self,
        first: usize,
        second: usize,
        directions: PairDirections,
    ) -> Result<Vec<Clause>> {
        let mut selector = Vec::new();
        let mut clauses = Vec::new();

        if directions.first_left_of_second {
            selector.push(self.relation_literal(Axis::Horizontal, first, second)?);
            clauses.extend(self.relative_order_clauses(Axis::Horizontal, first, second)?);
        }
        if directions.second_left_of_first {
            selector.push(self.relation_literal(Axis::Horizontal, second, first)?);
            clauses.extend(self.relative_order_clauses(Axis::Horizontal, second, first)?);
        }
        if directions.first_below_second {
            selector.push(self.relation_literal(Axis::Vertical, first, second)?);
            clauses.extend(self.relative_order_clauses(Axis::Vertical, first, second)?);
        }
        if directions.second_below_first {
            selector.push(self.relation_literal(Axis::Vertical, second, first)?);
            clauses.extend(self.relative_order_clauses(Axis::Vertical, second, first)?);
        }

        // Empty when every direction is pruned: the pair cannot coexist at
        // this height and the contradiction surfaces as UNSAT.
        clauses.push(Clause::new(selector));
        Ok(clauses)
    }

    /// Decide which of the four relative-order literals are needed for a
    /// pair. Every dropped literal must be provably false in all satisfying
    /// assignments; pruning reduces clause count but never feasibility.
    pub fn pair_directions(&self, first: usize, second: usize) -> PairDirections {
        if !self.encoding.pruning {
            return PairDirections::all();
        }

        let a = self.circuits[first];
        let b = self.circuits[second];

        // Identical rectangles are interchangeable: one direction per axis
        // suffices, rotated or not.
        if a == b {
            return PairDirections {
                first_left_of_second: true,
                second_left_of_first: false,
                first_below_second: true,
                second_below_first: false,
            };
        }

        // The remaining rules reason about fixed dimensions and are not valid
        // when the effective size depends on a rotation flag.
        if self.encoding.rotation {
            return PairDirections::all();
        }

        if self.encoding.symmetry_breaking && (first == self.anchor || second == self.anchor) {
            return self.anchor_pair_directions(first, second);
        }

        if a.width + b.width > self.plate_width {
            return PairDirections {
                first_left_of_second: false,
                second_left_of_first: false,
                first_below_second: true,
                second_below_first: true,
            };
        }
        if a.height + b.height > self.plate_height {
            return PairDirections {
                first_left_of_second: true,
                second_left_of_first: true,
                first_below_second: false,
                second_below_first: false,
            };
        }

        PairDirections::all()
    }

    /// The anchor's left/bottom edge is confined to the lower half of its
    /// feasible range, so a circuit larger than that margin can never sit
    /// strictly left of (below) the anchor.
    fn anchor_pair_directions(&self, first: usize, second: usize) -> PairDirections {
        let anchor = self.circuits[self.anchor];
        let other = if first == self.anchor {
            self.circuits[second]
        } else {
            self.circuits[first]
        };

        let margin_x = self.plate_width.saturating_sub(anchor.width) / 2;
        let margin_y = self.plate_height.saturating_sub(anchor.height) / 2;
        let too_wide = other.width > margin_x;
        let too_tall = other.height > margin_y;

        let mut directions = PairDirections::all();
        if first == self.anchor {
            directions.second_left_of_first = !too_wide;
            directions.second_below_first = !too_tall;
        } else {
            directions.first_left_of_second = !too_wide;
            directions.first_below_second = !too_tall;
        }
        directions
    }

    /// Implication family backing one relative-order literal, duplicated and
    /// guarded per rotation branch when rotation is enabled.
    fn relative_order_clauses(&mut self, axis: Axis, first: usize, second: usize) -> Result<Vec<Clause>> {
        if self.encoding.rotation {
            let rot = self.variable_manager.rotation_flag(first)?;
            let mut clauses = self.relation_implications(axis, first, second, false, Some(-rot))?;
            clauses.extend(self.relation_implications(axis, first, second, true, Some(rot))?);
            Ok(clauses)
        } else {
            self.relation_implications(axis, first, second, false, None)
        }
    }

    /// Clauses making `relation(first, second)` imply strict separation on
    /// `axis` for one orientation of `first`: boundary clauses forbid
    /// `second` starting inside `first`'s claimed cells, and a 3-literal
    /// clause per split point propagates `first`'s extent.
    fn relation_implications(
        &mut self,
        axis: Axis,
        first: usize,
        second: usize,
        rotated: bool,
        guard: Option<i32>,
    ) -> Result<Vec<Clause>> {
        let strip = self.strip_measure(axis);
        let measure = self.circuit_measure(first, axis, rotated);
        let relation = self.relation_literal(axis, first, second)?;

        let mut clauses = Vec::new();

        for position in 0..measure.min(strip) {
            let second_at = self.position_literal(axis, second, position)?;
            clauses.push(Clause::guarded(guard, vec![-relation, -second_at]));
        }

        for position in 0..strip.saturating_sub(measure) {
            let first_at = self.position_literal(axis, first, position)?;
            let second_beyond = self.position_literal(axis, second, position + measure)?;
            clauses.push(Clause::guarded(guard, vec![-relation, first_at, -second_beyond]));
        }

        Ok(clauses)
    }

    fn strip_measure(&self, axis: Axis) -> usize {
        match axis {
            Axis::Horizontal => self.plate_width,
            Axis::Vertical => self.plate_height,
        }
    }

    fn circuit_measure(&self, circuit: usize, axis: Axis, rotated: bool) -> usize {
        let Circuit { width, height } = self.circuits[circuit];
        match (axis, rotated) {
            (Axis::Horizontal, false) | (Axis::Vertical, true) => width,
            (Axis::Vertical, false) | (Axis::Horizontal, true) => height,
        }
    }

    fn position_literal(&mut self, axis: Axis, circuit: usize, position: usize) -> Result<i32> {
        match axis {
            Axis::Horizontal => self.variable_manager.x_position(circuit, position),
            Axis::Vertical => self.variable_manager.y_position(circuit, position),
        }
    }

    fn relation_literal(&mut self, axis: Axis, first: usize, second: usize) -> Result<i32> {
        match axis {
            Axis::Horizontal => self.variable_manager.left_of(first, second),
            Axis::Vertical => self.variable_manager.below(first, second),
        }
    }

    /// Get the variable manager (for decoding and external access)
    pub fn variable_manager(&mut self) -> &mut VariableManager {
        &mut self.variable_manager
    }

    /// Constraint generation statistics
    pub fn statistics(&self) -> ConstraintStatistics {
        ConstraintStatistics {
            circuit_count: self.circuits.len(),
            plate_width: self.plate_width,
            plate_height: self.plate_height,
            total_variables: self.variable_manager.variable_count(),
        }
    }
}

/// Statistics about constraint generation
#[derive(Debug, Clone)]
pub struct ConstraintStatistics {
    pub circuit_count: usize,
    pub plate_width: usize,
    pub plate_height: usize,
    pub total_variables: usize,
}

impl std::fmt::Display for ConstraintStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Constraint Generation Statistics:")?;
        writeln!(f, "  Circuits: {}", self.circuit_count)?;
        writeln!(f, "  Plate: {}x{}", self.plate_width, self.plate_height)?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EncodingConfig;

    fn encoding(rotation: bool, symmetry_breaking: bool, pruning: bool) -> EncodingConfig {
        EncodingConfig {
            rotation,
            symmetry_breaking,
            pruning,
        }
    }

    #[test]
    fn test_clause_creation() {
        let clause = Clause::new(vec![1, -2, 3]);
        assert_eq!(clause.literals, vec![1, -2, 3]);
        assert!(!clause.is_empty());
        assert!(!clause.is_unit());

        let unit = Clause::unit(5);
        assert!(unit.is_unit());

        assert!(Clause::empty().is_empty());
    }

    #[test]
    fn test_guarded_clause() {
        let guarded = Clause::guarded(Some(7), vec![1, 2]);
        assert_eq!(guarded.literals, vec![-7, 1, 2]);

        let negative_guard = Clause::guarded(Some(-7), vec![1]);
        assert_eq!(negative_guard.literals, vec![7, 1]);

        let unguarded = Clause::guarded(None, vec![1, 2]);
        assert_eq!(unguarded.literals, vec![1, 2]);
    }

    #[test]
    fn test_ordering_constraint_shape() {
        let instance = Instance::new(4, vec![(2, 2)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 3, encoding(false, false, true));

        let clauses = generator.generate_ordering_constraints().unwrap();
        // (4 - 1) horizontal + (3 - 1) vertical implications
        assert_eq!(clauses.len(), 5);
        assert!(clauses.iter().all(|c| c.literals.len() == 2));
        // Each implication is (-pos[e], pos[e+1])
        assert!(clauses.iter().all(|c| c.literals[0] < 0 && c.literals[1] > 0));
    }

    #[test]
    fn test_domain_units_for_exact_fit() {
        // A 4x4 circuit on a 4-wide plate at height 4: every position literal
        // forced true on both axes.
        let instance = Instance::new(4, vec![(4, 4)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 4, encoding(false, false, true));

        let clauses = generator.generate_domain_constraints().unwrap();
        assert_eq!(clauses.len(), 8);
        assert!(clauses.iter().all(Clause::is_unit));
        assert!(clauses.iter().all(|c| c.literals[0] > 0));
    }

    #[test]
    fn test_oversized_circuit_yields_contradiction() {
        let instance = Instance::new(4, vec![(5, 4), (1, 4)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 6, encoding(false, false, true));

        let clauses = generator.generate_domain_constraints().unwrap();
        assert!(clauses.iter().any(Clause::is_empty));
    }

    #[test]
    fn test_rotation_forced_for_wide_circuit() {
        // Width 5 does not fit a 4-wide plate, but the rotated orientation does.
        let instance = Instance::new(4, vec![(5, 2), (1, 1)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 7, encoding(true, false, true));

        let rot = generator.variable_manager().rotation_flag(0).unwrap();
        let clauses = generator.generate_rotation_constraints().unwrap();
        assert!(clauses.contains(&Clause::unit(rot)));
        assert!(!clauses.contains(&Clause::unit(-rot)));
    }

    #[test]
    fn test_rotation_conflict_for_unplaceable_circuit() {
        // 5x6 fits a 4x4 plate in neither orientation: both units emitted.
        let instance = Instance::new(4, vec![(5, 6)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 4, encoding(true, false, true));

        let rot = generator.variable_manager().rotation_flag(0).unwrap();
        let clauses = generator.generate_rotation_constraints().unwrap();
        assert!(clauses.contains(&Clause::unit(rot)));
        assert!(clauses.contains(&Clause::unit(-rot)));
    }

    #[test]
    fn test_identical_pair_pruned_to_one_direction_each() {
        let instance = Instance::new(6, vec![(2, 3), (2, 3)]).unwrap();
        let generator = ConstraintGenerator::new(&instance, 4, encoding(false, false, true));

        let directions = generator.pair_directions(0, 1);
        assert_eq!(directions.active_count(), 2);
        assert!(directions.first_left_of_second);
        assert!(directions.first_below_second);
    }

    #[test]
    fn test_wide_pair_drops_horizontal_relations() {
        let instance = Instance::new(5, vec![(3, 1), (4, 1), (1, 1)]).unwrap();
        let generator = ConstraintGenerator::new(&instance, 4, encoding(false, false, true));

        // circuits sorted by area: (4,1) first, (3,1) second; 4 + 3 > 5
        let directions = generator.pair_directions(0, 1);
        assert!(!directions.first_left_of_second);
        assert!(!directions.second_left_of_first);
        assert!(directions.first_below_second);
        assert!(directions.second_below_first);
    }

    #[test]
    fn test_tall_pair_drops_vertical_relations() {
        let instance = Instance::new(10, vec![(1, 3), (1, 2), (1, 1)]).unwrap();
        let generator = ConstraintGenerator::new(&instance, 4, encoding(false, false, true));

        // heights 3 + 2 > 4 while widths 1 + 1 <= 10
        let directions = generator.pair_directions(0, 1);
        assert!(directions.first_left_of_second);
        assert!(directions.second_left_of_first);
        assert!(!directions.first_below_second);
        assert!(!directions.second_below_first);
    }

    #[test]
    fn test_pruning_disabled_keeps_all_directions() {
        let instance = Instance::new(5, vec![(3, 1), (4, 1)]).unwrap();
        let generator = ConstraintGenerator::new(&instance, 4, encoding(false, false, false));

        assert_eq!(generator.pair_directions(0, 1).active_count(), 4);
    }

    #[test]
    fn test_anchor_pair_pruning() {
        // Anchor is the 4x12; margin left of it is (9 - 4) / 2 = 2, so the
        // 3-wide circuit can never sit strictly left of the anchor.
        let instance = Instance::new(9, vec![(3, 3), (4, 12)]).unwrap();
        let generator = ConstraintGenerator::new(&instance, 12, encoding(false, true, true));

        assert_eq!(generator.anchor, 0);
        let directions = generator.pair_directions(0, 1);
        assert!(directions.first_left_of_second);
        assert!(!directions.second_left_of_first);
        // vertical margin is (12 - 12) / 2 = 0: nothing fits below the anchor
        assert!(!directions.second_below_first);
    }

    #[test]
    fn test_rotation_disables_size_based_pruning() {
        let instance = Instance::new(5, vec![(3, 1), (4, 1)]).unwrap();
        let generator = ConstraintGenerator::new(&instance, 4, encoding(true, false, true));

        // With rotation the effective widths depend on the flags.
        assert_eq!(generator.pair_directions(0, 1).active_count(), 4);
    }

    #[test]
    fn test_full_generation_smoke() {
        let instance = Instance::new(9, vec![(3, 3), (2, 4), (2, 8), (3, 9), (4, 12)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 12, encoding(false, true, true));

        let clauses = generator.generate_all_constraints().unwrap();
        assert!(!clauses.is_empty());
        // Feasible instance: no immediate contradiction in the encoding
        assert!(clauses.iter().all(|c| !c.is_empty()));

        let stats = generator.statistics();
        assert_eq!(stats.circuit_count, 5);
        assert!(stats.total_variables > 0);
    }

    #[test]
    fn test_pruned_pair_emits_smaller_selector() {
        let instance = Instance::new(5, vec![(3, 2), (4, 2)]).unwrap();
        let mut generator = ConstraintGenerator::new(&instance, 4, encoding(false, false, true));

        let directions = generator.pair_directions(0, 1);
        let clauses = generator.non_overlap_for_pair(0, 1, directions).unwrap();
        // The final clause is the selector disjunction over surviving literals
        let selector = clauses.last().unwrap();
        assert_eq!(selector.literals.len(), 2);
    }
}
