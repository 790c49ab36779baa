//! Configuration management for the strip packing solver

pub mod settings;

pub use settings::{
    CliOverrides, EncodingConfig, InputConfig, OutputConfig, OutputFormat, Settings, SolverConfig,
};
