//! Configuration settings for the strip packing solver

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub solver: SolverConfig,
    pub input: InputConfig,
    pub output: OutputConfig,
    pub encoding: EncodingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Overall time budget for one instance, spanning all height attempts
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    pub instance_file: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub output_directory: PathBuf,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputFormat {
    Text,
    Json,
}

/// Toggles for the SAT encoding. Pruning and symmetry breaking only shrink
/// the formula; rotation changes which placements are feasible.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EncodingConfig {
    pub rotation: bool,
    pub symmetry_breaking: bool,
    pub pruning: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            solver: SolverConfig { timeout_seconds: 300 },
            input: InputConfig {
                instance_file: PathBuf::from("input/instances/reference.txt"),
            },
            output: OutputConfig {
                format: OutputFormat::Text,
                output_directory: PathBuf::from("output/solutions"),
            },
            encoding: EncodingConfig {
                rotation: false,
                symmetry_breaking: true,
                pruning: true,
            },
        }
    }
}

impl Settings {
    /// Load settings from a YAML file
    pub fn from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let settings: Settings = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        settings.validate()?;
        Ok(settings)
    }

    /// Save settings to a YAML file
    pub fn to_file(&self, path: &PathBuf) -> Result<()> {
        let content = serde_yaml::to_string(self).context("Failed to serialize settings")?;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
        }

        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate the settings
    pub fn validate(&self) -> Result<()> {
        if self.solver.timeout_seconds == 0 {
            anyhow::bail!("Solver timeout must be positive");
        }

        if !self.input.instance_file.exists() {
            anyhow::bail!(
                "Instance file does not exist: {}",
                self.input.instance_file.display()
            );
        }

        Ok(())
    }

    /// Merge settings with command line overrides
    pub fn merge_with_cli(&mut self, cli_overrides: &CliOverrides) {
        if let Some(timeout_seconds) = cli_overrides.timeout_seconds {
            self.solver.timeout_seconds = timeout_seconds;
        }
        if let Some(ref instance_file) = cli_overrides.instance_file {
            self.input.instance_file = instance_file.clone();
        }
        if let Some(ref output_dir) = cli_overrides.output_dir {
            self.output.output_directory = output_dir.clone();
        }
        if let Some(rotation) = cli_overrides.rotation {
            self.encoding.rotation = rotation;
        }
        if let Some(symmetry_breaking) = cli_overrides.symmetry_breaking {
            self.encoding.symmetry_breaking = symmetry_breaking;
        }
        if let Some(pruning) = cli_overrides.pruning {
            self.encoding.pruning = pruning;
        }
    }
}

/// Command line overrides for settings
#[derive(Debug, Default)]
pub struct CliOverrides {
    pub timeout_seconds: Option<u64>,
    pub instance_file: Option<PathBuf>,
    pub output_dir: Option<PathBuf>,
    pub rotation: Option<bool>,
    pub symmetry_breaking: Option<bool>,
    pub pruning: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.solver.timeout_seconds, 300);
        assert!(settings.encoding.pruning);
        assert!(!settings.encoding.rotation);
    }

    #[test]
    fn test_yaml_round_trip() {
        let temp_dir = tempdir().unwrap();

        // validation requires the instance file to exist
        let instance_path = temp_dir.path().join("instance.txt");
        std::fs::write(&instance_path, "4\n1\n4 4\n").unwrap();

        let mut settings = Settings::default();
        settings.input.instance_file = instance_path;
        settings.encoding.rotation = true;

        let config_path = temp_dir.path().join("config.yaml");
        settings.to_file(&config_path).unwrap();

        let restored = Settings::from_file(&config_path).unwrap();
        assert!(restored.encoding.rotation);
        assert_eq!(restored.solver.timeout_seconds, 300);
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut settings = Settings::default();
        settings.solver.timeout_seconds = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut settings = Settings::default();
        let overrides = CliOverrides {
            timeout_seconds: Some(60),
            rotation: Some(true),
            pruning: Some(false),
            ..Default::default()
        };

        settings.merge_with_cli(&overrides);
        assert_eq!(settings.solver.timeout_seconds, 60);
        assert!(settings.encoding.rotation);
        assert!(!settings.encoding.pruning);
    }
}
