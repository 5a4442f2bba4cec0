//! Site plan command line entry point

mod config;
mod script;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use sp_core::deserialize_project;
use sp_tools::DraftingSession;

use crate::config::ConfigManager;

#[derive(Parser, Debug)]
#[command(name = "siteplan", about = "Headless site plan drafting engine", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Replay a scripted event sequence and write the resulting project
    Replay {
        /// RON file with the event list
        script: PathBuf,
        /// Project document to start from
        #[arg(long)]
        input: Option<PathBuf>,
        /// Where to write the project document (stdout if omitted)
        #[arg(long)]
        output: Option<PathBuf>,
        /// Configuration file (defaults to the user config directory)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Project name stored in the document
        #[arg(long, default_value = "Untitled")]
        name: String,
    },
    /// Write a configuration file, optionally overriding individual settings
    InitConfig {
        #[arg(long)]
        config: Option<PathBuf>,
        /// Start from defaults even if the file exists
        #[arg(long)]
        reset: bool,
        /// Grid spacing in cm
        #[arg(long)]
        grid_spacing: Option<f64>,
        /// Enable or disable grid snapping
        #[arg(long)]
        snap: Option<bool>,
        /// Layer that is active when a session starts
        #[arg(long)]
        active_layer: Option<String>,
    },
}

fn main() -> Result<()> {
    use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "siteplan=info,sp_core=info,sp_tools=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Replay {
            script,
            input,
            output,
            config,
            name,
        } => run_replay(script, input, output, config, &name),
        Command::InitConfig {
            config,
            reset,
            grid_spacing,
            snap,
            active_layer,
        } => init_config(
            config,
            reset,
            ConfigOverrides {
                grid_spacing,
                snap,
                active_layer,
            },
        ),
    }
}

fn config_manager(path: Option<PathBuf>) -> ConfigManager {
    match path {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new(),
    }
}

fn run_replay(
    script_path: PathBuf,
    input: Option<PathBuf>,
    output: Option<PathBuf>,
    config: Option<PathBuf>,
    name: &str,
) -> Result<()> {
    let manager = config_manager(config);
    let mut session = DraftingSession::new(manager.config());

    if let Some(input) = input {
        let json = std::fs::read_to_string(&input)
            .with_context(|| format!("Failed to read project {:?}", input))?;
        let document = deserialize_project(&json)
            .with_context(|| format!("Invalid project document {:?}", input))?;
        session
            .load_document(document)
            .with_context(|| format!("Failed to load project {:?}", input))?;
    }

    let source = std::fs::read_to_string(&script_path)
        .with_context(|| format!("Failed to read script {:?}", script_path))?;
    let events = script::parse_script(&source)?;
    let summary = script::replay(&mut session, &events)?;
    tracing::info!(
        "Replayed {} events: {} committed, {} rejected",
        summary.events,
        summary.committed,
        summary.rejected
    );

    let json = session.to_document(name).to_json_pretty()?;
    match output {
        Some(path) => {
            std::fs::write(&path, json).with_context(|| format!("Failed to write {:?}", path))?;
            tracing::info!("Wrote project to {:?}", path);
        }
        None => println!("{}", json),
    }
    Ok(())
}

#[derive(Debug, Default)]
struct ConfigOverrides {
    grid_spacing: Option<f64>,
    snap: Option<bool>,
    active_layer: Option<String>,
}

fn init_config(path: Option<PathBuf>, reset: bool, overrides: ConfigOverrides) -> Result<()> {
    let mut manager = config_manager(path);
    if reset || !manager.path().exists() {
        manager.reset_to_defaults();
    }
    apply_overrides(&mut manager, overrides)?;

    if manager.is_dirty() {
        manager.save().context("Failed to save configuration")?;
    } else {
        tracing::info!("Configuration unchanged");
    }
    println!("{}", manager.path().display());
    Ok(())
}

fn apply_overrides(manager: &mut ConfigManager, overrides: ConfigOverrides) -> Result<()> {
    if let Some(spacing) = overrides.grid_spacing {
        if !spacing.is_finite() || spacing <= 0.0 {
            anyhow::bail!("Grid spacing must be a positive number, got {}", spacing);
        }
        manager.config_mut().snap.grid_spacing = spacing;
    }
    if let Some(enabled) = overrides.snap {
        manager.config_mut().snap.enabled = enabled;
    }
    if let Some(layer) = overrides.active_layer {
        manager.config_mut().initial_active_layer = layer;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_config_applies_overrides() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        init_config(
            Some(path.clone()),
            false,
            ConfigOverrides {
                grid_spacing: Some(25.0),
                snap: Some(false),
                active_layer: Some("vegetation".into()),
            },
        )
        .unwrap();

        let manager = ConfigManager::with_path(path);
        assert_eq!(manager.config().snap.grid_spacing, 25.0);
        assert!(!manager.config().snap.enabled);
        assert_eq!(manager.config().initial_active_layer, "vegetation");
    }

    #[test]
    fn test_init_config_keeps_existing_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        let grid = |spacing| ConfigOverrides {
            grid_spacing: Some(spacing),
            ..Default::default()
        };
        init_config(Some(path.clone()), false, grid(40.0)).unwrap();
        init_config(Some(path.clone()), false, ConfigOverrides::default()).unwrap();
        assert_eq!(ConfigManager::with_path(path.clone()).config().snap.grid_spacing, 40.0);

        init_config(Some(path.clone()), true, ConfigOverrides::default()).unwrap();
        assert_eq!(
            ConfigManager::with_path(path).config().snap.grid_spacing,
            sp_core::DEFAULT_GRID_SPACING
        );
    }

    #[test]
    fn test_init_config_rejects_bad_grid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.ron");
        let overrides = ConfigOverrides {
            grid_spacing: Some(0.0),
            ..Default::default()
        };
        assert!(init_config(Some(path.clone()), false, overrides).is_err());
        assert!(!path.exists());
    }
}
