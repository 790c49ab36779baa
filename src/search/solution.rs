//! Solution representation for solved packing instances

use crate::packing::{Instance, Placement};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// A solved instance: the plate dimensions and one placement per circuit, in
/// the instance's (sorted) circuit order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PackingSolution {
    pub plate_width: usize,
    pub plate_height: usize,
    pub placements: Vec<Placement>,
    /// Time spent across all height attempts
    #[serde(skip)]
    pub solve_time: Duration,
    pub metadata: SolutionMetadata,
}

/// Metadata about how the solution was found
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolutionMetadata {
    /// Number of heights attempted, the last one satisfiable
    pub attempts: usize,
    /// Area-based height lower bound
    pub lower_bound: usize,
    /// Stacked-circuits height upper bound
    pub upper_bound: usize,
    /// Fraction of the plate covered by circuits (0.0 to 1.0)
    pub fill_ratio: f64,
    pub rotation_enabled: bool,
}

impl PackingSolution {
    pub fn new(
        instance: &Instance,
        plate_height: usize,
        placements: Vec<Placement>,
        solve_time: Duration,
        attempts: usize,
        rotation_enabled: bool,
    ) -> Self {
        let plate_area = instance.plate_width() * plate_height;
        let fill_ratio = if plate_area == 0 {
            0.0
        } else {
            instance.total_area() as f64 / plate_area as f64
        };
        let upper_bound = if rotation_enabled {
            instance.max_height_rotated()
        } else {
            instance.max_height()
        };

        Self {
            plate_width: instance.plate_width(),
            plate_height,
            placements,
            solve_time,
            metadata: SolutionMetadata {
                attempts,
                lower_bound: instance.min_height(),
                upper_bound,
                fill_ratio,
                rotation_enabled,
            },
        }
    }

    /// True when the found height equals the area lower bound. Heights are
    /// searched in increasing order, so every solution is minimal; this only
    /// says whether the bound itself was tight.
    pub fn matches_lower_bound(&self) -> bool {
        self.plate_height == self.metadata.lower_bound
    }

    /// Convert to JSON string
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Create from JSON string
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Save to file
    pub fn save_to_file<P: AsRef<std::path::Path>>(&self, path: P) -> anyhow::Result<()> {
        let json = self.to_json()?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_from_file<P: AsRef<std::path::Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

impl std::fmt::Display for PackingSolution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}x{} plate, {} circuits, fill {:.1}%, {} attempt(s), {:.3}s",
            self.plate_width,
            self.plate_height,
            self.placements.len(),
            self.metadata.fill_ratio * 100.0,
            self.metadata.attempts,
            self.solve_time.as_secs_f64()
        )
    }
}
