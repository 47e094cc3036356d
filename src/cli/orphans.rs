//! Orphans command implementation

use std::process::ExitCode;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::config::TerraConfig;
use crate::orphans::find_orphans;

/// List sprite files that no triple resolves to. Exits with an error when
/// the sprite directory is missing.
pub fn run_orphans(config: &TerraConfig) -> ExitCode {
    let naming = config.naming();
    if !naming.dir.is_dir() {
        eprintln!("Error: Sprite directory not found: {}", naming.dir.display());
        return ExitCode::from(EXIT_ERROR);
    }

    let orphans = find_orphans(&naming, config.sprites.none_policy);
    if orphans.is_empty() {
        println!("No orphaned sprites in {}", naming.dir.display());
    } else {
        println!("{} orphaned sprite(s):", orphans.len());
        for path in &orphans {
            println!("  {}", path.display());
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
