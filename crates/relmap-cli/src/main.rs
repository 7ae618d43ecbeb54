use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use relmap_core::{Config, Model, Report, Severity};
use relmap_engine::{format_columns, ColumnProjection, ConventionProjection, ForeignKeyValidator, ValidationOutcome};

const DEFAULT_CONFIG: &str = "relmap.toml";

/// relmap - Foreign key mapping checks for relational models
#[derive(Parser)]
#[command(name = "relmap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: relmap.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check foreign keys that share a physical constraint
    Check {
        /// Model JSON file
        model: PathBuf,

        /// Output file for report.json
        #[arg(short, long, default_value = "report.json")]
        output: PathBuf,
    },

    /// List every foreign key with its table, constraint name and columns
    Constraints {
        /// Model JSON file
        model: PathBuf,
    },
}

fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref(), cli.verbose)?;

    if cli.verbose {
        eprintln!("{} naming: {:?}", "Using".cyan(), config.naming.convention);
    }

    match cli.command {
        Commands::Check { model, output } => check_command(&config, &model, &output, cli.verbose),
        Commands::Constraints { model } => constraints_command(&config, &model, cli.verbose),
    }
}

fn load_config(path: Option<&Path>, verbose: bool) -> Result<Config> {
    let config = if let Some(config_path) = path {
        Config::from_file(config_path)
            .with_context(|| format!("Failed to load config from {}", config_path.display()))?
    } else if Path::new(DEFAULT_CONFIG).exists() {
        Config::from_file(Path::new(DEFAULT_CONFIG))?
    } else {
        if verbose {
            eprintln!("{}", "No config file found, using defaults".yellow());
        }
        Config::default()
    };

    Ok(config)
}

fn load_model(path: &Path, verbose: bool) -> Result<Model> {
    if verbose {
        eprintln!("{} {}", "Loading model from:".cyan(), path.display());
    }

    let model = Model::from_file(path).with_context(|| format!("Failed to load model {}", path.display()))?;
    tracing::debug!(entities = model.entity_types.len(), "Loaded model");
    Ok(model)
}

/// Check command - validate foreign keys mapped to shared constraints
fn check_command(config: &Config, model_path: &Path, output: &Path, verbose: bool) -> Result<()> {
    let model = load_model(model_path, verbose)?;

    if verbose {
        eprintln!("{}", "Checking shared foreign key constraints...".cyan());
    }

    let mut outcome = ForeignKeyValidator::from_config(config).validate(&model)?;
    outcome.report.model = Some(model_path.display().to_string());

    outcome.report.save_to_file(output)?;
    if verbose {
        eprintln!("{} {}", "Report saved to:".green(), output.display());
    }

    print_shared_constraints(&outcome);
    print_report_summary(&outcome.report);

    if outcome.has_errors() {
        std::process::exit(1);
    }

    Ok(())
}

/// Constraints command - show how each foreign key maps to the database
fn constraints_command(config: &Config, model_path: &Path, verbose: bool) -> Result<()> {
    let model = load_model(model_path, verbose)?;
    let default_schema = config.naming.default_schema.as_deref();
    let foreign_keys = model.resolve_foreign_keys(default_schema)?;
    let projection = ConventionProjection::new(config.naming.clone());

    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Foreign Key Constraints".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    if foreign_keys.is_empty() {
        println!("{}", "No foreign keys in model".yellow());
        return Ok(());
    }

    for fk in &foreign_keys {
        let store_object = fk.declaring_table();
        let name = projection.constraint_name(fk, store_object);
        let columns = projection.column_names(fk.properties(), store_object);
        let principal_columns = projection.column_names(fk.principal_key_properties(), fk.principal_table());

        println!("{} {}", name.green().bold(), format!("({})", fk.declaring_entity().display_name()).dimmed());
        println!(
            "    {} {} -> {} {}",
            fk.declaring_table_name(),
            format_columns(&columns),
            fk.principal_table_name(),
            format_columns(&principal_columns)
        );
        println!(
            "    unique: {}, on delete: {}",
            fk.is_unique(),
            fk.delete_behavior()
        );
    }

    println!();
    println!("{} foreign keys", foreign_keys.len());

    Ok(())
}

fn print_shared_constraints(outcome: &ValidationOutcome) {
    if outcome.shared.is_empty() {
        return;
    }

    println!("\n{}", "Shared constraints:".bold());
    for shared in &outcome.shared {
        println!(
            "  {}.{} <- {}",
            shared.store_object.display_name(),
            shared.constraint_name.green(),
            shared.entities.join(", ")
        );
    }
}

fn print_report_summary(report: &Report) {
    println!("\n{}", "=".repeat(60).bright_blue());
    println!("{}", "Foreign Key Check Report".bold().bright_blue());
    println!("{}", "=".repeat(60).bright_blue());
    println!();

    println!("Version: {}", report.version);
    println!("Timestamp: {}", report.timestamp);
    println!();

    println!("{}", "Summary:".bold());
    println!("  Foreign keys checked: {}", report.summary.foreign_keys_checked);
    println!("  Shared constraints:   {}", report.summary.shared_constraints);
    println!("  Total diagnostics:    {}", report.summary.total);

    if report.summary.errors > 0 {
        println!("  Errors:   {}", format!("{}", report.summary.errors).red().bold());
    } else {
        println!("  Errors:   {}", format!("{}", report.summary.errors).green());
    }

    if report.summary.warnings > 0 {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).yellow());
    } else {
        println!("  Warnings: {}", format!("{}", report.summary.warnings).green());
    }

    println!("  Info:     {}", report.summary.info);
    println!();

    let problems: Vec<_> = report
        .diagnostics
        .iter()
        .filter(|d| d.severity > Severity::Info)
        .collect();

    if problems.is_empty() {
        println!("{}", "✓ No issues found!".green().bold());
    } else {
        println!("{}", "Diagnostics:".bold());
        for diag in problems {
            let severity_str = match diag.severity {
                Severity::Error => "ERROR".red().bold(),
                Severity::Warn => "WARN".yellow().bold(),
                Severity::Info => "INFO".cyan(),
            };

            println!("  [{}] {}: {}", severity_str, diag.code, diag.message);

            if let Some(loc) = &diag.location {
                print!("    at {}", loc.entity);
                if let Some(table) = &loc.table {
                    print!(" ({})", table);
                }
                if let Some(constraint) = &loc.constraint {
                    print!(" constraint {}", constraint);
                }
                println!();
            }

            if let (Some(first), Some(second)) = (&diag.first, &diag.second) {
                println!("    First:  {}", first);
                println!("    Second: {}", second);
            }

            if !diag.related.is_empty() {
                println!("    Related: {}", diag.related.join(", "));
            }

            println!();
        }
    }

    println!("{}", "=".repeat(60).bright_blue());
}
