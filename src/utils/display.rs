//! Display and output formatting utilities

use crate::config::OutputFormat;
use crate::packing::io::solution_to_string;
use crate::search::PackingSolution;
use anyhow::Result;
use std::path::Path;

/// Format solutions for display
pub struct SolutionFormatter;

impl SolutionFormatter {
    /// Format a solution for console output
    pub fn format_solution(solution: &PackingSolution, show_plate: bool) -> String {
        let mut output = String::new();

        output.push_str(&format!(
            "=== Plate {}x{} ===\n",
            solution.plate_width, solution.plate_height
        ));
        output.push_str(&format!("Circuits: {}\n", solution.placements.len()));
        output.push_str(&format!(
            "Fill ratio: {:.1}%\n",
            solution.metadata.fill_ratio * 100.0
        ));
        output.push_str(&format!(
            "Height bounds: {}..{}\n",
            solution.metadata.lower_bound, solution.metadata.upper_bound
        ));
        output.push_str(&format!("Attempts: {}\n", solution.metadata.attempts));
        output.push_str(&format!(
            "Solve time: {:.3}s\n",
            solution.solve_time.as_secs_f64()
        ));
        if solution.metadata.rotation_enabled {
            output.push_str("Rotation: enabled\n");
        }

        if show_plate {
            output.push('\n');
            output.push_str(&Self::format_plate(solution));
        }

        output
    }

    /// Render the plate as ASCII art, one letter per circuit, top row first.
    /// Uncovered cells show as '.'.
    pub fn format_plate(solution: &PackingSolution) -> String {
        let mut cells = vec![vec!['.'; solution.plate_width]; solution.plate_height];

        for (index, placement) in solution.placements.iter().enumerate() {
            let letter = Self::circuit_letter(index);
            for y in placement.y..placement.top().min(solution.plate_height) {
                for x in placement.x..placement.right().min(solution.plate_width) {
                    cells[y][x] = letter;
                }
            }
        }

        let mut output = String::new();
        for row in cells.iter().rev() {
            output.extend(row.iter());
            output.push('\n');
        }
        output
    }

    /// Format a placement listing with one line per circuit
    pub fn format_placements(solution: &PackingSolution) -> String {
        let mut output = String::new();

        output.push_str("   | Size  | Position\n");
        output.push_str("---|-------|---------\n");
        for (index, placement) in solution.placements.iter().enumerate() {
            output.push_str(&format!(
                " {} | {}x{} | ({}, {})\n",
                Self::circuit_letter(index),
                placement.width,
                placement.height,
                placement.x,
                placement.y
            ));
        }

        output
    }

    fn circuit_letter(index: usize) -> char {
        // Wraps after 26 circuits; distinctness matters most on small plates
        (b'A' + (index % 26) as u8) as char
    }

    /// Save a solution based on the configured output format
    pub fn save_solution<P: AsRef<Path>>(
        solution: &PackingSolution,
        output_dir: P,
        format: OutputFormat,
    ) -> Result<()> {
        Self::save_solution_as(solution, output_dir, "solution", format)
    }

    /// Save a solution under a caller-chosen file stem, one file per
    /// instance in batch runs
    pub fn save_solution_as<P: AsRef<Path>>(
        solution: &PackingSolution,
        output_dir: P,
        name: &str,
        format: OutputFormat,
    ) -> Result<()> {
        let output_dir = output_dir.as_ref();
        std::fs::create_dir_all(output_dir)?;

        match format {
            OutputFormat::Text => {
                let content = solution_to_string(
                    solution.plate_width,
                    solution.plate_height,
                    &solution.placements,
                );
                std::fs::write(output_dir.join(format!("{}.txt", name)), content)?;
            }
            OutputFormat::Json => {
                solution.save_to_file(output_dir.join(format!("{}.json", name)))?;
            }
        }

        Ok(())
    }
}

/// Color output utilities
pub struct ColorOutput;

impl ColorOutput {
    /// Format text with color (if terminal supports it)
    pub fn colored(text: &str, color: Color) -> String {
        if Self::supports_color() {
            format!("\x1b[{}m{}\x1b[0m", color.code(), text)
        } else {
            text.to_string()
        }
    }

    /// Check if terminal supports color
    fn supports_color() -> bool {
        std::env::var("NO_COLOR").is_err() && (std::env::var("TERM").unwrap_or_default() != "dumb")
    }

    /// Format success message
    pub fn success(text: &str) -> String {
        Self::colored(text, Color::Green)
    }

    /// Format error message
    pub fn error(text: &str) -> String {
        Self::colored(text, Color::Red)
    }

    /// Format warning message
    pub fn warning(text: &str) -> String {
        Self::colored(text, Color::Yellow)
    }

    /// Format info message
    pub fn info(text: &str) -> String {
        Self::colored(text, Color::Blue)
    }
}

#[derive(Debug, Clone, Copy)]
pub enum Color {
    Red,
    Green,
    Yellow,
    Blue,
}

impl Color {
    fn code(self) -> u8 {
        match self {
            Color::Red => 31,
            Color::Green => 32,
            Color::Yellow => 33,
            Color::Blue => 34,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packing::{Instance, Placement};
    use std::time::Duration;
    use tempfile::tempdir;

    fn two_circuit_solution() -> PackingSolution {
        let instance = Instance::new(4, vec![(2, 2), (2, 2)]).unwrap();
        PackingSolution::new(
            &instance,
            2,
            vec![Placement::new(2, 2, 0, 0), Placement::new(2, 2, 2, 0)],
            Duration::from_millis(10),
            1,
            false,
        )
    }

    #[test]
    fn test_plate_rendering() {
        let solution = two_circuit_solution();
        let plate = SolutionFormatter::format_plate(&solution);
        assert_eq!(plate, "AABB\nAABB\n");
    }

    #[test]
    fn test_plate_shows_gaps() {
        let instance = Instance::new(3, vec![(2, 1)]).unwrap();
        let solution = PackingSolution::new(
            &instance,
            2,
            vec![Placement::new(2, 1, 0, 0)],
            Duration::ZERO,
            1,
            false,
        );

        // circuit sits in the bottom-left; top row is empty
        let plate = SolutionFormatter::format_plate(&solution);
        assert_eq!(plate, "...\nAA.\n");
    }

    #[test]
    fn test_solution_formatting() {
        let solution = two_circuit_solution();
        let text = SolutionFormatter::format_solution(&solution, true);

        assert!(text.contains("Plate 4x2"));
        assert!(text.contains("Circuits: 2"));
        assert!(text.contains("AABB"));
    }

    #[test]
    fn test_save_solution_text() {
        let solution = two_circuit_solution();
        let temp_dir = tempdir().unwrap();

        SolutionFormatter::save_solution(&solution, temp_dir.path(), OutputFormat::Text).unwrap();
        let content = std::fs::read_to_string(temp_dir.path().join("solution.txt")).unwrap();
        assert_eq!(content, "4 2\n2\n2 2 0 0\n2 2 2 0\n");
    }

    #[test]
    fn test_save_solution_json() {
        let solution = two_circuit_solution();
        let temp_dir = tempdir().unwrap();

        SolutionFormatter::save_solution(&solution, temp_dir.path(), OutputFormat::Json).unwrap();
        let restored =
            PackingSolution::load_from_file(temp_dir.path().join("solution.json")).unwrap();
        assert_eq!(restored.placements, solution.placements);
    }

    #[test]
    fn test_save_solution_with_custom_name() {
        let solution = two_circuit_solution();
        let temp_dir = tempdir().unwrap();

        SolutionFormatter::save_solution_as(&solution, temp_dir.path(), "ins-3", OutputFormat::Text)
            .unwrap();
        assert!(temp_dir.path().join("ins-3.txt").exists());
    }

    #[test]
    fn test_color_output() {
        let colored = ColorOutput::colored("test", Color::Red);
        assert!(colored.contains("test"));

        let success = ColorOutput::success("OK");
        assert!(success.contains("OK"));
    }
}
