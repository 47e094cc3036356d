//! Detection of sprite files no triple can ever resolve to

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{glob, Pattern};

use crate::attributes::TerrainAttributes;
use crate::candidates::generate_candidates;
use crate::loader::{NonePolicy, SpriteNaming};

/// Every sprite identity reachable under `policy`, across all triples.
pub fn reachable_ids(policy: NonePolicy) -> HashSet<String> {
    TerrainAttributes::all()
        .flat_map(|attrs| {
            generate_candidates(attrs)
                .sprites()
                .iter()
                .filter(|c| policy.allows(c))
                .filter_map(|c| c.id())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Sprite files in the naming directory whose stem is not a reachable id.
///
/// Typical causes are typos (`forrest.png`) and the never-tried
/// `climate-height` combination (`hot-mountains.png`).
pub fn find_orphans(naming: &SpriteNaming, policy: NonePolicy) -> Vec<PathBuf> {
    let reachable = reachable_ids(policy);
    let dir = Pattern::escape(&naming.dir.to_string_lossy());
    let pattern = Path::new(&dir).join(format!("*.{}", Pattern::escape(&naming.extension)));

    let mut orphans: Vec<PathBuf> = match glob(&pattern.to_string_lossy()) {
        Ok(paths) => paths
            .filter_map(Result::ok)
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_stem()
                    .and_then(|s| s.to_str())
                    .map_or(true, |stem| !reachable.contains(stem))
            })
            .collect(),
        Err(e) => {
            tracing::warn!("Invalid sprite pattern {}: {}", pattern.display(), e);
            Vec::new()
        }
    };
    orphans.sort();
    orphans
}
