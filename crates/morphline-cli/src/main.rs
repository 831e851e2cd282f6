//! # Morphline CLI
//!
//! Samples element documents and reports on them.
//!
//! ## Commands
//! - `sample`: Resolve an element at evenly spaced times and write JSON
//! - `check`: Build an element and compute every segment plan up front
//! - `info`: List the available mappers, aligners and easings

mod document;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use document::ElementDoc;
use morphline::{resolve_frames, EngineConfig};
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Parser)]
#[command(name = "morphline")]
#[command(about = "Shape morphing and keystate interpolation")]
#[command(version)]
struct Cli {
    /// Engine config (JSON); built-in defaults when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve an element at evenly spaced times
    Sample {
        /// Element document (JSON)
        input: PathBuf,

        /// Number of frames; defaults to one second at the configured rate
        #[arg(short, long)]
        frames: Option<usize>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Build an element and compute all of its segment plans
    Check {
        /// Element document (JSON)
        input: PathBuf,
    },

    /// Show the available strategies
    Info,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("morphline=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => EngineConfig::load(path)?,
        None => EngineConfig::default(),
    };

    match cli.command {
        Commands::Sample {
            input,
            frames,
            output,
        } => cmd_sample(&config, &input, frames, output.as_deref()),
        Commands::Check { input } => cmd_check(&config, &input),
        Commands::Info => cmd_info(&config),
    }
}

fn load_element(config: &EngineConfig, input: &Path) -> Result<morphline::Element> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("Failed to read element document {}", input.display()))?;
    let doc = ElementDoc::from_json_str(&json)
        .with_context(|| format!("Invalid element document {}", input.display()))?;
    let element = doc
        .build(config)
        .with_context(|| format!("Cannot build element from {}", input.display()))?;
    Ok(element)
}

fn cmd_sample(
    config: &EngineConfig,
    input: &Path,
    frames: Option<usize>,
    output: Option<&Path>,
) -> Result<()> {
    let element = load_element(config, input)?;
    let count = frames.unwrap_or_else(|| config.frame_count(1.0));
    let states = resolve_frames(&element, count)?;
    let json = serde_json::to_string_pretty(&states)?;
    match output {
        Some(path) => {
            std::fs::write(path, json)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!(frames = states.len(), path = %path.display(), "Wrote frames");
        }
        None => println!("{}", json),
    }
    Ok(())
}

fn cmd_check(config: &EngineConfig, input: &Path) -> Result<()> {
    let element = load_element(config, input)?;
    element.prepare()?;
    println!(
        "✓ {} keystates, {} segments, {} cached plans",
        element.keystates().len(),
        element.segment_count(),
        element.plans().len()
    );
    Ok(())
}

fn cmd_info(config: &EngineConfig) -> Result<()> {
    println!("Mappers:");
    println!("========");
    for mapper in ["simple", "greedy", "clustering", "hungarian", "explicit"] {
        println!("  • {}", mapper);
    }
    println!();
    println!("Aligners:");
    println!("=========");
    for aligner in ["angular", "euclidean", "sequential"] {
        println!("  • {}", aligner);
    }
    println!();
    println!("Easings:");
    println!("========");
    for easing in [
        "linear",
        "ease_in",
        "ease_out",
        "ease_in_out",
        "ease_in_quad",
        "ease_out_quad",
        "ease_in_out_quad",
        "ease_in_cubic",
        "ease_out_cubic",
        "ease_in_out_cubic",
        "hold",
    ] {
        println!("  • {}", easing);
    }
    println!();
    println!("Active defaults:");
    println!("{}", serde_json::to_string_pretty(&config.defaults)?);
    Ok(())
}
