use std::path::PathBuf;

use clap::{Parser, Subcommand};
use itertools::Itertools;
use rootcause::prelude::*;
use tracing_subscriber::EnvFilter;

use radarmap::builtin::builtin_registry;
use radarmap::loader::registry_from_json;
use radarmap::{MapRegistry, WorldPos, locate};

/// Inspect radar map metadata and project world positions onto radar overlays
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// JSON file with map records. The built-in maps are used if not provided.
    #[clap(short, long)]
    records: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List registered maps
    List,
    /// Project a world position onto a map's radar
    #[command(allow_negative_numbers = true)]
    Project {
        /// Map name, e.g. de_vertigo
        map: String,
        x: f32,
        y: f32,
        z: f32,
    },
}

fn load_registry(path: Option<&PathBuf>) -> Result<MapRegistry, Report> {
    let Some(path) = path else {
        let registry = builtin_registry().context("Built-in map records are invalid")?;
        return Ok(registry);
    };

    let json = std::fs::read_to_string(path)
        .context_with(|| format!("Failed to read map records: {}", path.display()))?;
    let registry = registry_from_json(&json)
        .context_with(|| format!("Failed to load map records: {}", path.display()))?;
    Ok(registry)
}

fn main() -> Result<(), Report> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let registry = load_registry(args.records.as_ref())?;

    match args.command {
        Command::List => {
            for record in registry.records() {
                let floors = record
                    .floors()
                    .iter()
                    .map(|floor| floor.z_range().to_string())
                    .join(", ");
                println!(
                    "{}\t{}\tresolution={}\tfloors=[{}]",
                    record.map_id(),
                    record.display_name(),
                    record.resolution(),
                    floors
                );
            }
        }
        Command::Project { map, x, y, z } => {
            let placement = locate(&registry, &map, WorldPos::new(x, y, z))
                .context_with(|| format!("Failed to project position on {map}"))?;
            println!(
                "{} {} {} {}",
                placement.map_id(),
                placement.floor,
                placement.pixel,
                placement.overlay
            );
            if let Some(diagnostic) = &placement.diagnostic {
                eprintln!("warning: {diagnostic}");
            }
        }
    }

    Ok(())
}
