//! Candidates and resolve command implementations

use std::process::ExitCode;

use serde_json::json;

use super::{EXIT_ERROR, EXIT_SUCCESS};
use crate::attributes::TerrainAttributes;
use crate::cache::{Resolution, SpriteResolver};
use crate::candidates::generate_candidates;
use crate::color::format_color;
use crate::config::TerraConfig;

/// Print the candidate list, marking candidates the none policy skips.
pub fn run_candidates(attrs: TerrainAttributes, config: &TerraConfig) -> ExitCode {
    let naming = config.naming();
    let policy = config.sprites.none_policy;

    println!("Candidates for {}:", attrs);
    for (i, candidate) in generate_candidates(attrs).iter().enumerate() {
        match candidate.id() {
            Some(id) if policy.allows(candidate) => {
                println!("  {}. {:<32} {}", i + 1, id, naming.path_for(&id).display())
            }
            Some(id) => println!("  {}. {:<32} (skipped: none policy {})", i + 1, id, policy),
            None => println!("  {}. {}", i + 1, candidate),
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}

/// Resolve one triple and print the outcome.
pub fn run_resolve(attrs: TerrainAttributes, resolver: &SpriteResolver, json: bool) -> ExitCode {
    let resolution = resolver.resolve(attrs);

    if json {
        let value = match &resolution {
            Resolution::Sprite { sprite, rank } => json!({
                "attributes": attrs,
                "sprite": sprite.id,
                "rank": rank,
                "path": sprite.path,
                "size": [sprite.width(), sprite.height()],
            }),
            Resolution::Fallback(visual) => json!({
                "attributes": attrs,
                "fallback": visual,
            }),
        };
        return match serde_json::to_string_pretty(&value) {
            Ok(text) => {
                println!("{}", text);
                ExitCode::from(EXIT_SUCCESS)
            }
            Err(e) => {
                eprintln!("Error: failed to serialize result: {}", e);
                ExitCode::from(EXIT_ERROR)
            }
        };
    }

    match &resolution {
        Resolution::Sprite { sprite, rank } => {
            println!(
                "{} -> {} (rank {}, {}x{})",
                attrs,
                sprite.path.display(),
                rank,
                sprite.width(),
                sprite.height()
            );
        }
        Resolution::Fallback(visual) => {
            println!("{} -> fallback {}", attrs, format_color(visual.color));
        }
    }
    ExitCode::from(EXIT_SUCCESS)
}
