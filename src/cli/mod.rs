//! Command-line interface implementation
//!
//! This module provides the CLI entry point and dispatches to submodules
//! for specific command implementations.

mod coverage;
mod orphans;
mod resolve;

use clap::{Parser, Subcommand};
use std::io::IsTerminal;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use crate::attributes::TerrainAttributes;
use crate::cache::SpriteResolver;
use crate::config::loader::{
    default_config, find_config, load_config, merge_cli_overrides, resolve_sprite_dir, CliOverrides,
};
use crate::config::TerraConfig;
use crate::loader::{FsSpriteLoader, NonePolicy};

/// Exit codes
pub(crate) const EXIT_SUCCESS: u8 = 0;
pub(crate) const EXIT_ERROR: u8 = 1;
pub(crate) const EXIT_INVALID_ARGS: u8 = 2;

/// Terrasprite - resolve terrain tiles to sprite assets
#[derive(Parser)]
#[command(name = "terrasprite")]
#[command(about = "Terrasprite - resolve terrain attribute triples to sprite assets")]
#[command(version)]
pub struct Cli {
    /// Path to terrasprite.toml (default: search upward from the current directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Sprite directory (overrides config)
    #[arg(long, global = true)]
    pub sprites: Option<PathBuf>,

    /// Treatment of `none` vegetation: literal or suppress (overrides config)
    #[arg(long, global = true)]
    pub none_policy: Option<NonePolicy>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// A terrain triple given as three positional values.
#[derive(clap::Args, Debug, Clone)]
pub struct TripleArgs {
    /// Vegetation (none, grassland, forest, desert, tundra, swamp)
    pub vegetation: String,
    /// Climate (hot, moderate, cold)
    pub climate: String,
    /// Height (deep_water, shallow_water, lowlands, hills, mountains)
    pub height: String,
}

impl TripleArgs {
    fn attributes(&self) -> Result<TerrainAttributes, ExitCode> {
        TerrainAttributes::parse(&self.vegetation, &self.climate, &self.height).map_err(|e| {
            eprintln!("Error: {}", e);
            ExitCode::from(EXIT_INVALID_ARGS)
        })
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Print the ordered candidate list for a triple
    Candidates {
        #[command(flatten)]
        triple: TripleArgs,
    },

    /// Resolve one triple to a sprite (or the fallback color)
    Resolve {
        #[command(flatten)]
        triple: TripleArgs,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Resolve every triple and report which candidate each one uses
    Coverage {
        /// Output as JSON
        #[arg(long)]
        json: bool,

        /// Exit with an error if any triple falls back
        #[arg(long)]
        strict: bool,

        /// Number of parallel jobs (default: available cores)
        #[arg(short, long)]
        jobs: Option<usize>,
    },

    /// List sprite files that no triple can resolve to
    Orphans,

    /// Re-run coverage whenever sprite files change
    Watch,
}

/// Run the CLI and return the exit code.
pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Candidates { ref triple } => match triple.attributes() {
            Ok(attrs) => {
                let config = match load_settings(&cli) {
                    Ok(config) => config,
                    Err(code) => return code,
                };
                resolve::run_candidates(attrs, &config)
            }
            Err(code) => code,
        },
        Commands::Resolve { ref triple, json } => {
            let attrs = match triple.attributes() {
                Ok(attrs) => attrs,
                Err(code) => return code,
            };
            match load_settings(&cli) {
                Ok(config) => resolve::run_resolve(attrs, &build_resolver(&config), json),
                Err(code) => code,
            }
        }
        Commands::Coverage { json, strict, jobs } => match load_settings(&cli) {
            Ok(config) => coverage::run_coverage(&build_resolver(&config), json, strict, jobs),
            Err(code) => code,
        },
        Commands::Orphans => match load_settings(&cli) {
            Ok(config) => orphans::run_orphans(&config),
            Err(code) => code,
        },
        Commands::Watch => match load_settings(&cli) {
            Ok(config) => {
                let resolver = build_resolver(&config);
                coverage::run_watch(resolver, &config)
            }
            Err(code) => code,
        },
    }
}

/// Install the stderr log subscriber; `--verbose` raises the level to DEBUG.
fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(false)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Warning: could not install logger: {}", e);
    }
}

/// Load config (explicit or discovered) and apply CLI overrides.
fn load_settings(cli: &Cli) -> Result<TerraConfig, ExitCode> {
    let config_path = cli.config.clone().or_else(find_config);

    let (mut config, project_root) = match config_path {
        Some(path) => {
            tracing::debug!("Using config: {}", path.display());
            let config = load_config(Some(&path)).map_err(|e| {
                eprintln!("Error loading config: {}", e);
                ExitCode::from(EXIT_ERROR)
            })?;
            (config, Some(project_root_of(&path)))
        }
        None => {
            tracing::debug!("No terrasprite.toml found, using defaults");
            (default_config(), None)
        }
    };

    let overrides = CliOverrides {
        sprites_dir: cli.sprites.clone(),
        none_policy: cli.none_policy,
        ..Default::default()
    };
    let from_cli = overrides.sprites_dir.is_some();
    merge_cli_overrides(&mut config, &overrides);

    // Config paths are relative to the config file; CLI and default paths
    // stay relative to the working directory
    if let (Some(root), false) = (project_root, from_cli) {
        let cwd = std::env::current_dir().unwrap_or_default();
        resolve_sprite_dir(&mut config, &root, &cwd);
    }

    Ok(config)
}

fn project_root_of(config_path: &Path) -> PathBuf {
    config_path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| std::env::current_dir().unwrap_or_default())
}

/// Build the process-wide resolver for a loaded configuration.
pub fn build_resolver(config: &TerraConfig) -> Arc<SpriteResolver> {
    let loader = FsSpriteLoader::new(config.naming());
    let resolver = SpriteResolver::new(loader, config.fallback_provider())
        .with_none_policy(config.sprites.none_policy);
    Arc::new(resolver)
}
