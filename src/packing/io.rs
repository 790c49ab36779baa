//! File I/O for strip packing instances and textual solutions
//!
//! Instance format: line 1 is the plate width, line 2 the circuit count `n`,
//! followed by `n` lines of `"<width> <height>"`.

use super::{Instance, InstanceError, Placement};
use anyhow::{Context, Result};
use std::path::{Path, PathBuf};

/// Load an instance from a text file
pub fn load_instance_from_file<P: AsRef<Path>>(path: P) -> Result<Instance> {
    let content = std::fs::read_to_string(&path)
        .with_context(|| format!("Failed to read instance file: {}", path.as_ref().display()))?;

    parse_instance_from_string(&content)
        .with_context(|| format!("Failed to parse instance file: {}", path.as_ref().display()))
}

/// Parse an instance from its textual representation
pub fn parse_instance_from_string(content: &str) -> Result<Instance, InstanceError> {
    let lines: Vec<&str> = content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(InstanceError::Empty);
    }

    let plate_width: usize = lines[0]
        .parse()
        .map_err(|_| InstanceError::InvalidPlateWidth(lines[0].to_string()))?;

    let count_line = lines
        .get(1)
        .ok_or_else(|| InstanceError::InvalidCircuitCount("<missing>".to_string()))?;
    let declared_count: usize = count_line
        .parse()
        .map_err(|_| InstanceError::InvalidCircuitCount(count_line.to_string()))?;

    let mut circuits = Vec::with_capacity(declared_count);
    for (offset, line) in lines[2..].iter().enumerate() {
        let line_number = offset + 3;
        let mut parts = line.split_whitespace();
        let (width, height) = match (parts.next(), parts.next(), parts.next()) {
            (Some(w), Some(h), None) => {
                let width: usize = w.parse().map_err(|_| InstanceError::InvalidCircuit {
                    line: line_number,
                    text: line.to_string(),
                })?;
                let height: usize = h.parse().map_err(|_| InstanceError::InvalidCircuit {
                    line: line_number,
                    text: line.to_string(),
                })?;
                (width, height)
            }
            _ => {
                return Err(InstanceError::InvalidCircuit {
                    line: line_number,
                    text: line.to_string(),
                })
            }
        };
        if width == 0 || height == 0 {
            return Err(InstanceError::NonPositiveDimension { line: line_number });
        }
        circuits.push((width, height));
    }

    if circuits.len() != declared_count {
        return Err(InstanceError::CircuitCountMismatch {
            expected: declared_count,
            found: circuits.len(),
        });
    }

    Instance::new(plate_width, circuits)
}

/// List the instance files (`.txt`) in a directory, sorted by file name
pub fn list_instance_files<P: AsRef<Path>>(dir: P) -> Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let mut files = Vec::new();

    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read instance directory: {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "txt") {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Render a solved placement in the reference textual solution format:
/// plate dimensions, circuit count, then one `"w h x y"` line per circuit.
pub fn solution_to_string(plate_width: usize, plate_height: usize, placements: &[Placement]) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} {}\n", plate_width, plate_height));
    out.push_str(&format!("{}\n", placements.len()));
    for placement in placements {
        out.push_str(&format!("{}\n", placement));
    }
    out
}

/// Save a textual solution to a file, creating parent directories as needed
pub fn save_solution_to_file<P: AsRef<Path>>(
    plate_width: usize,
    plate_height: usize,
    placements: &[Placement],
    path: P,
) -> Result<()> {
    let content = solution_to_string(plate_width, plate_height, placements);

    if let Some(parent) = path.as_ref().parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    std::fs::write(&path, content)
        .with_context(|| format!("Failed to write solution to file: {}", path.as_ref().display()))?;

    Ok(())
}

/// Create example instance files for testing and first runs
pub fn create_example_instances<P: AsRef<Path>>(output_dir: P) -> Result<()> {
    let dir = output_dir.as_ref();
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    // Five circuits on a width-9 plate; optimal height 12
    let reference = "9\n5\n3 3\n2 4\n2 8\n3 9\n4 12\n";
    std::fs::write(dir.join("reference.txt"), reference).context("Failed to write reference.txt")?;

    // Single square filling the plate exactly
    let square = "4\n1\n4 4\n";
    std::fs::write(dir.join("square.txt"), square).context("Failed to write square.txt")?;

    // Tall plate that benefits from rotation
    let rotated = "3\n3\n3 1\n1 3\n2 2\n";
    std::fs::write(dir.join("mixed.txt"), rotated).context("Failed to write mixed.txt")?;

    Ok(())
}
