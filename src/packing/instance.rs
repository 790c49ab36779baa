//! Problem instance representation for strip packing

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A rectangular circuit to be placed on the plate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Circuit {
    pub width: usize,
    pub height: usize,
}

impl Circuit {
    pub fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Occupied plate area
    pub fn area(&self) -> usize {
        self.width * self.height
    }
}

/// Errors produced while building an instance from raw input
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("instance is empty")]
    Empty,
    #[error("invalid plate width: '{0}'")]
    InvalidPlateWidth(String),
    #[error("invalid circuit count: '{0}'")]
    InvalidCircuitCount(String),
    #[error("line {line}: invalid circuit '{text}' (expected '<width> <height>')")]
    InvalidCircuit { line: usize, text: String },
    #[error("line {line}: circuit dimensions must be positive")]
    NonPositiveDimension { line: usize },
    #[error("expected {expected} circuits, found {found}")]
    CircuitCountMismatch { expected: usize, found: usize },
    #[error("plate width must be positive")]
    NonPositivePlateWidth,
}

/// Immutable strip packing instance: fixed-width plate plus the circuits to
/// place on it, with derived height bounds.
///
/// Circuits are stored sorted by decreasing area (ties by decreasing
/// width/height tuple). The sort is only an index scheme: variable identity
/// and the widest-circuit symmetry anchor refer to positions in this order.
#[derive(Debug, Clone)]
pub struct Instance {
    plate_width: usize,
    circuits: Vec<Circuit>,
    min_height: usize,
    max_height: usize,
}

impl Instance {
    /// Build an instance from a plate width and raw circuit dimensions.
    pub fn new(plate_width: usize, raw_circuits: Vec<(usize, usize)>) -> Result<Self, InstanceError> {
        if plate_width == 0 {
            return Err(InstanceError::NonPositivePlateWidth);
        }
        if raw_circuits.is_empty() {
            return Err(InstanceError::Empty);
        }

        let mut circuits: Vec<Circuit> = raw_circuits
            .into_iter()
            .map(|(w, h)| Circuit::new(w, h))
            .collect();
        circuits.sort_by(|a, b| {
            (b.area(), b.width, b.height).cmp(&(a.area(), a.width, a.height))
        });

        let total_area: usize = circuits.iter().map(Circuit::area).sum();
        let max_height: usize = circuits.iter().map(|c| c.height).sum();
        // Area-based lower bound: not always tight but always valid.
        let min_height = total_area.div_ceil(plate_width);

        Ok(Self {
            plate_width,
            circuits,
            min_height,
            max_height,
        })
    }

    pub fn plate_width(&self) -> usize {
        self.plate_width
    }

    pub fn circuit_count(&self) -> usize {
        self.circuits.len()
    }

    pub fn circuit(&self, index: usize) -> Circuit {
        self.circuits[index]
    }

    pub fn circuits(&self) -> &[Circuit] {
        &self.circuits
    }

    /// Area-based lower bound on the plate height
    pub fn min_height(&self) -> usize {
        self.min_height
    }

    /// Trivial stacking upper bound on the plate height
    pub fn max_height(&self) -> usize {
        self.max_height
    }

    /// Stacking upper bound when circuits may rotate: a circuit placed in
    /// either orientation is at most its larger dimension tall.
    pub fn max_height_rotated(&self) -> usize {
        self.circuits.iter().map(|c| c.width.max(c.height)).sum()
    }

    /// Index of the largest circuit by area, used as the symmetry-breaking
    /// anchor. Ties resolve to the earliest index, so identical largest
    /// circuits anchor on the first twin, matching the direction the
    /// identical-pair pruning keeps.
    pub fn anchor_index(&self) -> usize {
        let mut anchor = 0;
        for (index, circuit) in self.circuits.iter().enumerate() {
            if circuit.area() > self.circuits[anchor].area() {
                anchor = index;
            }
        }
        anchor
    }

    /// Total circuit area
    pub fn total_area(&self) -> usize {
        self.circuits.iter().map(Circuit::area).sum()
    }
}
