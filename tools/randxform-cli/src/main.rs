//! randxform - random scale and rotation runner
//!
//! Validates transform configs, writes the default config, and runs a config
//! against a scene fixture loaded into the in-memory host.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use randxform_core::{
    ItemOutcome, MemoryScene, RunError, RunReport, SampledTransform, SceneHost, TransformConfig,
    config, run, validate_pivot,
};

#[derive(Parser)]
#[command(name = "randxform")]
#[command(about = "Random scale and rotation for mesh items and polygon islands")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a config file
    Check {
        /// Path to the config file
        #[arg(default_value = "randxform.toml")]
        config: PathBuf,
    },

    /// Write the default config
    Init {
        /// Output path
        #[arg(default_value = "randxform.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Run a config against a scene fixture
    Run {
        /// Path to the config file
        #[arg(short, long, default_value = "randxform.toml")]
        config: PathBuf,

        /// Scene fixture (TOML)
        #[arg(short, long)]
        scene: PathBuf,

        /// Seed (overrides the config)
        #[arg(long)]
        seed: Option<u64>,

        /// Write the resulting scene here
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Check { config: path } => {
            tracing::info!("Checking config {:?}", path);
            let config = config::load(&path)
                .with_context(|| format!("invalid config {}", path.display()))?;
            if config.polygon_islands {
                validate_pivot(&config.pivot_position)?;
            }
            print_summary(&config);
            tracing::info!("Config is valid!");
        }

        Commands::Init { path, force } => {
            if path.exists() && !force {
                anyhow::bail!("{} already exists (use --force to overwrite)", path.display());
            }
            config::save(&TransformConfig::default(), &path)?;
            tracing::info!("Wrote default config to {:?}", path);
        }

        Commands::Run {
            config: config_path,
            scene: scene_path,
            seed,
            output,
        } => {
            let mut config = config::load(&config_path)
                .with_context(|| format!("invalid config {}", config_path.display()))?;
            if seed.is_some() {
                config.seed = seed;
            }
            let mut scene = MemoryScene::load(&scene_path)
                .with_context(|| format!("invalid scene {}", scene_path.display()))?;

            let report = match run(&mut scene, &config) {
                Ok(report) => report,
                Err(err) => {
                    show_notifications(&scene);
                    return Err(run_error(err));
                }
            };
            print_report(&scene, &report)?;

            if let Some(output) = output {
                save_scene(&scene, &output)?;
            }
        }
    }

    Ok(())
}

fn run_error(err: RunError) -> anyhow::Error {
    anyhow::Error::new(err).context("transform run aborted")
}

/// Stand-in for the host's modal dialog
fn show_notifications(scene: &MemoryScene) {
    for note in scene.notifications() {
        eprintln!("[{:?}] {}: {}", note.severity, note.title, note.message);
    }
}

fn print_summary(config: &TransformConfig) {
    let mode = if config.polygon_islands {
        "polygon islands"
    } else {
        "whole items"
    };
    println!("mode: {mode}");
    if config.polygon_islands {
        println!("pivot: {}", config.pivot_position);
    }
    if config.apply_scale {
        let scale = &config.scale;
        if config.uniform_scale {
            println!("scale: uniform {}..{}", scale.uniform.min, scale.uniform.max);
        } else {
            println!(
                "scale: x {}..{}, y {}..{}, z {}..{}",
                scale.x.min, scale.x.max, scale.y.min, scale.y.max, scale.z.min, scale.z.max
            );
        }
    } else {
        println!("scale: off");
    }
    if config.apply_rotation {
        let rotation = &config.rotation;
        println!(
            "rotation: x {}..{}, y {}..{}, z {}..{}",
            rotation.x.min,
            rotation.x.max,
            rotation.y.min,
            rotation.y.max,
            rotation.z.min,
            rotation.z.max
        );
    } else {
        println!("rotation: off");
    }
    if let Some(seed) = config.seed {
        println!("seed: {seed}");
    }
}

fn print_report(scene: &MemoryScene, report: &RunReport) -> Result<()> {
    for outcome in &report.items {
        let target = outcome.target();
        let name = scene.item_name(target).unwrap_or("?");
        match outcome {
            ItemOutcome::Whole { sample, .. } => {
                let channels = scene.channels(target)?;
                println!(
                    "{name}: scale {:?} rotation {:?}",
                    channels.scale.to_array(),
                    channels.rotation.to_array()
                );
                tracing::debug!(?sample, "item sample");
            }
            ItemOutcome::Islands(islands) => {
                println!("{name}: {} islands", islands.islands.len());
                for (index, island) in islands.islands.iter().enumerate() {
                    println!(
                        "  island {index}: {} polygons {}",
                        island.polygons.len(),
                        describe(&island.sample)
                    );
                }
            }
        }
    }
    println!("transformed {} units", report.units());
    Ok(())
}

fn describe(sample: &SampledTransform) -> String {
    let mut parts = Vec::new();
    if let Some(scale) = sample.scale {
        parts.push(format!("scale {:?}", scale.to_array()));
    }
    if let Some(rotation) = sample.rotation {
        parts.push(format!("rotation {:?}", rotation.to_array()));
    }
    if parts.is_empty() {
        "unchanged".to_string()
    } else {
        parts.join(" ")
    }
}

fn save_scene(scene: &MemoryScene, path: &Path) -> Result<()> {
    scene
        .save(path)
        .with_context(|| format!("failed to write scene {}", path.display()))?;
    tracing::info!("Wrote scene to {:?}", path);
    Ok(())
}
