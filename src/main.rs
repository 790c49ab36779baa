//! Main CLI application for the strip packing solver

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::time::Duration;
use strip_packing_sat::{
    config::{CliOverrides, Settings},
    packing::{create_example_instances, list_instance_files, load_instance_from_file},
    sat::ConstraintGenerator,
    search::{HeightSearch, PackingSolution, PlacementValidator, SearchOutcome},
    utils::{ColorOutput, SolutionFormatter},
};

#[derive(Parser)]
#[command(name = "strip_packing_sat")]
#[command(about = "Strip Packing SAT Solver")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Solve a strip packing instance
    Solve {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Instance file (overrides config)
        #[arg(short, long)]
        instance: Option<PathBuf>,

        /// Time budget in seconds (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Allow 90-degree rotation of circuits
        #[arg(long)]
        rotation: bool,

        /// Disable symmetry breaking
        #[arg(long)]
        no_symmetry_breaking: bool,

        /// Disable clause pruning
        #[arg(long)]
        no_pruning: bool,

        /// Render the solved plate as ASCII art
        #[arg(long)]
        show_plate: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Solve every instance in a directory sequentially
    Batch {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Directory containing instance files
        #[arg(short, long)]
        directory: PathBuf,

        /// Time budget in seconds per instance (overrides config)
        #[arg(short, long)]
        timeout: Option<u64>,

        /// Output directory (overrides config)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Allow 90-degree rotation of circuits
        #[arg(long)]
        rotation: bool,

        /// Disable symmetry breaking
        #[arg(long)]
        no_symmetry_breaking: bool,

        /// Disable clause pruning
        #[arg(long)]
        no_pruning: bool,
    },

    /// Create example configuration and input files
    Setup {
        /// Directory to create files in
        #[arg(short, long, default_value = ".")]
        directory: PathBuf,

        /// Force overwrite existing files
        #[arg(short, long)]
        force: bool,
    },

    /// Validate a saved solution against its instance
    Validate {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Instance file
        #[arg(short, long)]
        instance: PathBuf,

        /// Solution file (JSON)
        #[arg(short, long)]
        solution: PathBuf,
    },

    /// Analyze an instance without solving it
    Analyze {
        /// Configuration file path
        #[arg(short, long, default_value = "config/default.yaml")]
        config: PathBuf,

        /// Instance file
        #[arg(short, long)]
        instance: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Solve {
            config,
            instance,
            timeout,
            output,
            rotation,
            no_symmetry_breaking,
            no_pruning,
            show_plate,
            verbose,
        } => solve_command(
            config,
            instance,
            timeout,
            output,
            rotation,
            no_symmetry_breaking,
            no_pruning,
            show_plate,
            verbose,
        ),
        Commands::Batch {
            config,
            directory,
            timeout,
            output,
            rotation,
            no_symmetry_breaking,
            no_pruning,
        } => batch_command(
            config,
            directory,
            timeout,
            output,
            rotation,
            no_symmetry_breaking,
            no_pruning,
        ),
        Commands::Setup { directory, force } => setup_command(directory, force),
        Commands::Validate {
            config,
            instance,
            solution,
        } => validate_command(config, instance, solution),
        Commands::Analyze { config, instance } => analyze_command(config, instance),
    }
}

fn load_settings(config_path: &PathBuf) -> Result<Settings> {
    if config_path.exists() {
        Settings::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))
    } else {
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "Config file {} not found, using defaults",
                config_path.display()
            ))
        );
        Ok(Settings::default())
    }
}

#[allow(clippy::too_many_arguments)]
fn solve_command(
    config_path: PathBuf,
    instance_file: Option<PathBuf>,
    timeout: Option<u64>,
    output_dir: Option<PathBuf>,
    rotation: bool,
    no_symmetry_breaking: bool,
    no_pruning: bool,
    show_plate: bool,
    verbose: bool,
) -> Result<()> {
    println!("{}", ColorOutput::info("Starting strip packing solver"));

    let mut settings = load_settings(&config_path)?;

    let cli_overrides = CliOverrides {
        timeout_seconds: timeout,
        instance_file: instance_file.clone(),
        output_dir: output_dir.clone(),
        rotation: rotation.then_some(true),
        symmetry_breaking: no_symmetry_breaking.then_some(false),
        pruning: no_pruning.then_some(false),
    };
    settings.merge_with_cli(&cli_overrides);

    settings.validate().context("Configuration validation failed")?;

    let instance = load_instance_from_file(&settings.input.instance_file)?;

    if verbose {
        println!("Configuration:");
        println!("  Instance file: {}", settings.input.instance_file.display());
        println!("  Timeout: {}s", settings.solver.timeout_seconds);
        println!("  Rotation: {}", settings.encoding.rotation);
        println!("  Symmetry breaking: {}", settings.encoding.symmetry_breaking);
        println!("  Pruning: {}", settings.encoding.pruning);
        println!();
        println!(
            "Instance: plate width {}, {} circuits, height bounds {}..{}",
            instance.plate_width(),
            instance.circuit_count(),
            instance.min_height(),
            instance.max_height()
        );
        println!();
    }

    println!("{}", ColorOutput::info("Searching for minimal plate height..."));
    let search = HeightSearch::new(
        settings.encoding,
        Duration::from_secs(settings.solver.timeout_seconds),
    );

    match search.run(&instance)? {
        SearchOutcome::Solved(solution) => {
            println!(
                "{}",
                ColorOutput::success(&format!(
                    "Solved: height {} in {:.3}s ({} attempt(s))",
                    solution.plate_height,
                    solution.solve_time.as_secs_f64(),
                    solution.metadata.attempts
                ))
            );

            let validation =
                PlacementValidator::new(settings.encoding.rotation).validate(&instance, &solution);
            if !validation.is_valid {
                for violation in &validation.violations {
                    println!("{}", ColorOutput::error(&format!("Violation: {}", violation)));
                }
                anyhow::bail!("Decoded solution failed validation");
            }

            println!("\n{}", SolutionFormatter::format_solution(&solution, show_plate));
            if verbose {
                println!("{}", SolutionFormatter::format_placements(&solution));
            }

            SolutionFormatter::save_solution(
                &solution,
                &settings.output.output_directory,
                settings.output.format,
            )
            .context("Failed to save solution")?;
            println!(
                "{}",
                ColorOutput::success(&format!(
                    "Solution saved to {}",
                    settings.output.output_directory.display()
                ))
            );
        }
        SearchOutcome::TimeExhausted { plate_height } => {
            println!(
                "{}",
                ColorOutput::warning(&format!(
                    "Time budget exhausted at height {}; instance abandoned",
                    plate_height
                ))
            );
        }
        SearchOutcome::HeightBoundExceeded => {
            println!(
                "{}",
                ColorOutput::error("No height in the bound range is satisfiable")
            );
        }
    }

    Ok(())
}

#[allow(clippy::too_many_arguments)]
fn batch_command(
    config_path: PathBuf,
    directory: PathBuf,
    timeout: Option<u64>,
    output_dir: Option<PathBuf>,
    rotation: bool,
    no_symmetry_breaking: bool,
    no_pruning: bool,
) -> Result<()> {
    use std::io::Write as _;

    println!("{}", ColorOutput::info("Starting batch solve"));

    let mut settings = load_settings(&config_path)?;
    settings.merge_with_cli(&CliOverrides {
        timeout_seconds: timeout,
        output_dir,
        rotation: rotation.then_some(true),
        symmetry_breaking: no_symmetry_breaking.then_some(false),
        pruning: no_pruning.then_some(false),
        ..Default::default()
    });

    let instance_files = list_instance_files(&directory)?;
    if instance_files.is_empty() {
        anyhow::bail!("No instance files found in {}", directory.display());
    }

    std::fs::create_dir_all(&settings.output.output_directory).with_context(|| {
        format!(
            "Failed to create directory: {}",
            settings.output.output_directory.display()
        )
    })?;

    // Each instance gets its own full time budget
    let search = HeightSearch::new(
        settings.encoding,
        Duration::from_secs(settings.solver.timeout_seconds),
    );
    let validator = PlacementValidator::new(settings.encoding.rotation);

    let mut solved = 0;
    let mut failures: Vec<String> = Vec::new();

    for path in &instance_files {
        let name = path
            .file_stem()
            .and_then(|stem| stem.to_str())
            .unwrap_or("instance")
            .to_string();

        let instance = match load_instance_from_file(path) {
            Ok(instance) => instance,
            Err(error) => {
                println!("{}", ColorOutput::error(&format!("{}: {:#}", name, error)));
                failures.push(format!("{}: {:#}", name, error));
                continue;
            }
        };

        match search.run(&instance)? {
            SearchOutcome::Solved(solution) => {
                let validation = validator.validate(&instance, &solution);
                if !validation.is_valid {
                    println!(
                        "{}",
                        ColorOutput::error(&format!("{}: decoded solution failed validation", name))
                    );
                    failures.push(format!("{}: decoded solution failed validation", name));
                    continue;
                }

                SolutionFormatter::save_solution_as(
                    &solution,
                    &settings.output.output_directory,
                    &name,
                    settings.output.format,
                )
                .with_context(|| format!("Failed to save solution for {}", name))?;
                println!(
                    "{}",
                    ColorOutput::success(&format!(
                        "{}: height {} in {:.3}s",
                        name,
                        solution.plate_height,
                        solution.solve_time.as_secs_f64()
                    ))
                );
                solved += 1;
            }
            SearchOutcome::TimeExhausted { plate_height } => {
                println!(
                    "{}",
                    ColorOutput::warning(&format!(
                        "{}: time exhausted at height {}",
                        name, plate_height
                    ))
                );
                failures.push(format!("{}: time exhausted at height {}", name, plate_height));
            }
            SearchOutcome::HeightBoundExceeded => {
                println!(
                    "{}",
                    ColorOutput::error(&format!("{}: no satisfiable height", name))
                );
                failures.push(format!("{}: no satisfiable height", name));
            }
        }
    }

    if !failures.is_empty() {
        let failure_log = settings.output.output_directory.join("failures.txt");
        let mut log = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&failure_log)
            .with_context(|| format!("Failed to open failure log: {}", failure_log.display()))?;
        for line in &failures {
            writeln!(log, "{}", line)?;
        }
        println!(
            "{}",
            ColorOutput::warning(&format!(
                "{} failure(s) logged to {}",
                failures.len(),
                failure_log.display()
            ))
        );
    }

    println!(
        "{}",
        ColorOutput::success(&format!(
            "Batch complete: {}/{} instance(s) solved",
            solved,
            instance_files.len()
        ))
    );

    Ok(())
}

fn setup_command(directory: PathBuf, force: bool) -> Result<()> {
    println!("{}", ColorOutput::info("Setting up project structure..."));

    let config_dir = directory.join("config");
    let input_dir = directory.join("input/instances");
    let output_dir = directory.join("output/solutions");

    for dir in [&config_dir, &input_dir, &output_dir] {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create directory {}", dir.display()))?;
    }

    let config_path = config_dir.join("default.yaml");
    if !config_path.exists() || force {
        Settings::default()
            .to_file(&config_path)
            .context("Failed to create default configuration")?;
        println!("Created: {}", config_path.display());
    } else {
        println!("Skipped: {} (already exists)", config_path.display());
    }

    create_example_instances(&input_dir).context("Failed to create example instances")?;
    println!("Created example instances in: {}", input_dir.display());

    let examples_dir = config_dir.join("examples");
    std::fs::create_dir_all(&examples_dir)?;

    let mut rotation_config = Settings::default();
    rotation_config.encoding.rotation = true;
    rotation_config.input.instance_file = PathBuf::from("input/instances/mixed.txt");
    rotation_config.to_file(&examples_dir.join("rotation.yaml"))?;

    let mut plain_config = Settings::default();
    plain_config.encoding.symmetry_breaking = false;
    plain_config.encoding.pruning = false;
    plain_config.to_file(&examples_dir.join("plain.yaml"))?;

    println!("Created example configurations in: {}", examples_dir.display());

    println!("\n{}", ColorOutput::success("Setup complete"));
    println!("\nNext steps:");
    println!("1. Edit configuration files in {}", config_dir.display());
    println!("2. Add your instances to {}", input_dir.display());
    println!("3. Run: cargo run -- solve --config config/default.yaml");

    Ok(())
}

fn validate_command(config_path: PathBuf, instance_path: PathBuf, solution_path: PathBuf) -> Result<()> {
    println!("{}", ColorOutput::info("Validating solution..."));

    let settings = load_settings(&config_path)?;

    let instance = load_instance_from_file(&instance_path)
        .with_context(|| format!("Failed to load instance from {}", instance_path.display()))?;
    let solution = PackingSolution::load_from_file(&solution_path)
        .with_context(|| format!("Failed to load solution from {}", solution_path.display()))?;

    let result = PlacementValidator::new(settings.encoding.rotation).validate(&instance, &solution);

    if result.is_valid {
        println!("{}", ColorOutput::success("Solution is valid"));
        println!("{}", SolutionFormatter::format_solution(&solution, true));
    } else {
        println!("{}", ColorOutput::error("Solution is invalid"));
        for violation in &result.violations {
            println!("  {}", violation);
        }
        anyhow::bail!("{} violation(s) found", result.violations.len());
    }

    Ok(())
}

fn analyze_command(config_path: PathBuf, instance_path: PathBuf) -> Result<()> {
    println!("{}", ColorOutput::info("Analyzing instance..."));

    let settings = load_settings(&config_path)?;

    let instance = load_instance_from_file(&instance_path)
        .with_context(|| format!("Failed to load instance from {}", instance_path.display()))?;

    println!("Instance:");
    println!("  Plate width: {}", instance.plate_width());
    println!("  Circuits: {}", instance.circuit_count());
    println!("  Total area: {}", instance.total_area());
    println!(
        "  Height bounds: {}..{}",
        instance.min_height(),
        instance.max_height()
    );

    // Encoding size at the lower bound is representative of the first attempt
    let mut generator = ConstraintGenerator::new(&instance, instance.min_height(), settings.encoding);
    let clauses = generator
        .generate_all_constraints()
        .context("Failed to generate constraints")?;

    println!("\nEncoding at height {}:", instance.min_height());
    println!("  Clauses: {}", clauses.len());
    println!("{}", generator.variable_manager().statistics());

    Ok(())
}
