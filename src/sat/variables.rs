//! Variable management for the placement SAT encoding
//!
//! Identity is structural: every literal is keyed by a small tuple (circuit,
//! axis, position) or (circuit, circuit, relation) rather than by name, and
//! the whole universe is scoped to a single candidate plate height.

use anyhow::Result;
use std::collections::HashMap;

/// Types of variables used in the placement encoding
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VariableType {
    /// Order-encoded: circuit's left edge is at position <= `position`
    XPosition { circuit: usize, position: usize },
    /// Order-encoded: circuit's bottom edge is at position <= `position`
    YPosition { circuit: usize, position: usize },
    /// Circuit is placed with width and height swapped
    Rotated { circuit: usize },
    /// `first` is placed strictly left of `second`
    LeftOf { first: usize, second: usize },
    /// `first` is placed strictly below `second`
    Below { first: usize, second: usize },
}

/// Maps structural variable identities to solver variable IDs for one
/// height attempt. Discarded together with its clauses once the attempt's
/// verdict is known.
#[derive(Debug)]
pub struct VariableManager {
    variable_map: HashMap<VariableType, i32>,
    /// Next available variable ID; SAT variables start from 1
    next_id: i32,
    circuit_count: usize,
    plate_width: usize,
    plate_height: usize,
    rotation: bool,
}

impl VariableManager {
    pub fn new(circuit_count: usize, plate_width: usize, plate_height: usize, rotation: bool) -> Self {
        Self {
            variable_map: HashMap::new(),
            next_id: 1,
            circuit_count,
            plate_width,
            plate_height,
            rotation,
        }
    }

    /// Get or create the variable ID for the given identity
    pub fn get_variable(&mut self, var_type: VariableType) -> Result<i32> {
        if let Some(&id) = self.variable_map.get(&var_type) {
            return Ok(id);
        }

        self.validate_variable(&var_type)?;

        let id = self.next_id;
        self.next_id += 1;
        self.variable_map.insert(var_type, id);
        Ok(id)
    }

    /// Literal for "circuit's left edge is at or before `position`"
    pub fn x_position(&mut self, circuit: usize, position: usize) -> Result<i32> {
        self.get_variable(VariableType::XPosition { circuit, position })
    }

    /// Literal for "circuit's bottom edge is at or before `position`"
    pub fn y_position(&mut self, circuit: usize, position: usize) -> Result<i32> {
        self.get_variable(VariableType::YPosition { circuit, position })
    }

    /// Rotation flag for a circuit
    pub fn rotation_flag(&mut self, circuit: usize) -> Result<i32> {
        self.get_variable(VariableType::Rotated { circuit })
    }

    /// Relative-order literal: `first` strictly left of `second`
    pub fn left_of(&mut self, first: usize, second: usize) -> Result<i32> {
        self.get_variable(VariableType::LeftOf { first, second })
    }

    /// Relative-order literal: `first` strictly below `second`
    pub fn below(&mut self, first: usize, second: usize) -> Result<i32> {
        self.get_variable(VariableType::Below { first, second })
    }

    /// All x-axis literals for one circuit, in position order
    pub fn x_positions(&mut self, circuit: usize) -> Result<Vec<i32>> {
        (0..self.plate_width)
            .map(|position| self.x_position(circuit, position))
            .collect()
    }

    /// All y-axis literals for one circuit, in position order
    pub fn y_positions(&mut self, circuit: usize) -> Result<Vec<i32>> {
        (0..self.plate_height)
            .map(|position| self.y_position(circuit, position))
            .collect()
    }

    /// Total number of variables created so far
    pub fn variable_count(&self) -> usize {
        (self.next_id - 1) as usize
    }

    pub fn plate_width(&self) -> usize {
        self.plate_width
    }

    pub fn plate_height(&self) -> usize {
        self.plate_height
    }

    fn validate_variable(&self, var_type: &VariableType) -> Result<()> {
        match *var_type {
            VariableType::XPosition { circuit, position } => {
                self.validate_circuit(circuit)?;
                if position >= self.plate_width {
                    anyhow::bail!(
                        "x position {} out of bounds (plate width: {})",
                        position,
                        self.plate_width
                    );
                }
            }
            VariableType::YPosition { circuit, position } => {
                self.validate_circuit(circuit)?;
                if position >= self.plate_height {
                    anyhow::bail!(
                        "y position {} out of bounds (plate height: {})",
                        position,
                        self.plate_height
                    );
                }
            }
            VariableType::Rotated { circuit } => {
                self.validate_circuit(circuit)?;
                if !self.rotation {
                    anyhow::bail!("rotation flag requested but rotation is disabled");
                }
            }
            VariableType::LeftOf { first, second } | VariableType::Below { first, second } => {
                self.validate_circuit(first)?;
                self.validate_circuit(second)?;
                if first == second {
                    anyhow::bail!("relative-order literal undefined for circuit {} with itself", first);
                }
            }
        }
        Ok(())
    }

    fn validate_circuit(&self, circuit: usize) -> Result<()> {
        if circuit >= self.circuit_count {
            anyhow::bail!(
                "circuit index {} out of bounds (count: {})",
                circuit,
                self.circuit_count
            );
        }
        Ok(())
    }

    /// Per-family variable counts
    pub fn statistics(&self) -> VariableStatistics {
        let mut stats = VariableStatistics {
            total_variables: self.variable_count(),
            ..Default::default()
        };

        for var_type in self.variable_map.keys() {
            match var_type {
                VariableType::XPosition { .. } => stats.x_variables += 1,
                VariableType::YPosition { .. } => stats.y_variables += 1,
                VariableType::Rotated { .. } => stats.rotation_variables += 1,
                VariableType::LeftOf { .. } => stats.left_of_variables += 1,
                VariableType::Below { .. } => stats.below_variables += 1,
            }
        }

        stats
    }
}

/// Statistics about variable usage
#[derive(Debug, Clone, Default)]
pub struct VariableStatistics {
    pub total_variables: usize,
    pub x_variables: usize,
    pub y_variables: usize,
    pub rotation_variables: usize,
    pub left_of_variables: usize,
    pub below_variables: usize,
}

impl std::fmt::Display for VariableStatistics {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Variable Statistics:")?;
        writeln!(f, "  Total variables: {}", self.total_variables)?;
        writeln!(f, "  X position variables: {}", self.x_variables)?;
        writeln!(f, "  Y position variables: {}", self.y_variables)?;
        writeln!(f, "  Rotation flags: {}", self.rotation_variables)?;
        writeln!(f, "  Left-of literals: {}", self.left_of_variables)?;
        writeln!(f, "  Below literals: {}", self.below_variables)?;
        Ok(())
    }
}
