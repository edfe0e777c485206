//! assetplan CLI
//!
//! Usage: assetplan [--config PATH] <COMMAND>
//!
//! Commands:
//!   build   Plan and write every asset into the output directory
//!   plan    Show the planned operations and manifest
//!   deps    Print an asset's dependencies in load order

mod cli;

use std::path::Path;

use anyhow::{Context, Result};
use assetplan::application::{execute, plan, ExecuteOptions, State};
use assetplan::config::{self, Config};
use assetplan::domain::entities::Op;
use assetplan::infrastructure::LocalFs;
use clap::Parser;
use is_terminal::IsTerminal;
use tracing_subscriber::EnvFilter;

use cli::{Cli, Commands};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let (config, config_warnings) = load_config(cli.config.as_deref())?;
    let mut diagnostics = Diagnostics {
        warnings: config_warnings,
    };
    match cli.command {
        Commands::Build { dry_run } => cmd_build(
            &config,
            &mut diagnostics,
            dry_run || config::dry_run_from_env(),
        ),
        Commands::Plan { json } => cmd_plan(&config, &mut diagnostics, json),
        Commands::Deps { name } => cmd_deps(&config, &mut diagnostics, &name),
    }
}

/// `RUST_LOG` wins; otherwise `-v` raises the level step by step
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("assetplan={}", level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .init();
}

/// Load the config and print its warnings; returns how many there were
fn load_config(path: Option<&Path>) -> Result<(Config, usize)> {
    let path = match path {
        Some(path) => path.to_path_buf(),
        None => config::discover(&std::env::current_dir()?)?,
    };
    let (config, warnings) = Config::load_with_warnings(&path)
        .with_context(|| format!("Failed to load {}", path.display()))?;
    for warning in &warnings {
        eprintln!("[WARN] {}", warning);
    }
    Ok((config.with_env_overrides(), warnings.len()))
}

/// Warnings printed so far in this run
struct Diagnostics {
    warnings: usize,
}

impl Diagnostics {
    /// Print the plan's warnings and errors; on errors print the totals
    /// and exit non-zero
    fn report(&mut self, state: &mut State) {
        let mut warnings = state.warnings().to_vec();
        warnings.sort();
        let mut errors = state.errors().to_vec();
        errors.sort();

        for warning in &warnings {
            eprintln!("[WARN] {}", warning);
        }
        for error in &errors {
            eprintln!("[ERROR] {}", error);
        }
        self.warnings += warnings.len();
        if !errors.is_empty() {
            self.finish(errors.len());
        }
    }

    /// Print the totals; exit non-zero if there were errors
    fn finish(&self, errors: usize) {
        eprintln!("{} warnings, {} errors.", self.warnings, errors);
        if errors > 0 {
            std::process::exit(1);
        }
    }
}

fn cmd_build(config: &Config, diagnostics: &mut Diagnostics, dry_run: bool) -> Result<()> {
    let mut state = plan::run(config)?;
    diagnostics.report(&mut state);

    let results = state.into_results();
    let options = ExecuteOptions::default().dry_run(dry_run);
    let outcome = execute::execute(&results, &LocalFs::new(), &options);

    for action in &outcome.actions {
        println!("{}", action);
    }
    for error in &outcome.errors {
        eprintln!("[ERROR] {}", error);
    }
    if outcome.ok() {
        let verb = if dry_run { "Would write" } else { "Wrote" };
        println!(
            "{} {} files ({} bytes) to {}",
            verb,
            outcome.files,
            outcome.bytes,
            results.target.display()
        );
    }
    diagnostics.finish(outcome.errors.len());
    Ok(())
}

fn cmd_plan(config: &Config, diagnostics: &mut Diagnostics, json: bool) -> Result<()> {
    let mut state = plan::run(config)?;
    diagnostics.report(&mut state);
    let results = state.into_results();

    if json {
        let ops: Vec<serde_json::Value> = results
            .ops
            .iter()
            .map(|op| match op {
                Op::Copy(copy) => serde_json::json!({
                    "kind": op.kind(),
                    "from": copy.from.path(),
                    "to": op.to().path(),
                }),
                Op::Write(write) => serde_json::json!({
                    "kind": op.kind(),
                    "to": op.to().path(),
                    "bytes": write.content.len(),
                }),
            })
            .collect();
        let output = serde_json::json!({
            "ops": ops,
            "manifest": results.manifest.entries(),
            "warnings": results.warnings,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else {
        for op in &results.ops {
            println!("{}", op);
        }
        println!();
        println!("{}", results.manifest.serialize()?);
    }
    Ok(())
}

fn cmd_deps(config: &Config, diagnostics: &mut Diagnostics, name: &str) -> Result<()> {
    let mut state = plan::parse(config);
    diagnostics.report(&mut state);

    let order = state
        .graph()
        .and_then(|graph| graph.load_order(name))
        .with_context(|| format!("Unknown asset: {}", name))?;
    for dep in order {
        println!("{}", dep);
    }
    Ok(())
}
