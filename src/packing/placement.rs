//! Placed circuit geometry

use serde::{Deserialize, Serialize};

/// A circuit placed on the plate: post-rotation effective dimensions plus
/// the coordinates of its bottom-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placement {
    pub width: usize,
    pub height: usize,
    pub x: usize,
    pub y: usize,
}

impl Placement {
    pub fn new(width: usize, height: usize, x: usize, y: usize) -> Self {
        Self { width, height, x, y }
    }

    /// Exclusive right edge
    pub fn right(&self) -> usize {
        self.x + self.width
    }

    /// Exclusive top edge
    pub fn top(&self) -> usize {
        self.y + self.height
    }

    /// Axis-aligned bounding box intersection test. Touching edges do not
    /// count as overlap.
    pub fn overlaps(&self, other: &Placement) -> bool {
        self.x < other.right() && other.x < self.right() && self.y < other.top() && other.y < self.top()
    }

    /// True when the placement lies fully inside a plate of the given size
    pub fn fits_within(&self, plate_width: usize, plate_height: usize) -> bool {
        self.right() <= plate_width && self.top() <= plate_height
    }
}

impl std::fmt::Display for Placement {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {} {} {}", self.width, self.height, self.x, self.y)
    }
}
