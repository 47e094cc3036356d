//! Sprite hot reload
//!
//! Watches the sprite directory with debouncing and clears the resolver's
//! cache whenever sprite files change, so the next lookup for every triple
//! starts again from its most specific candidate.

use notify::RecursiveMode;
use notify_debouncer_mini::{new_debouncer, DebouncedEvent, DebouncedEventKind};
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, RecvError};
use std::time::Duration;
use thiserror::Error;

use crate::cache::SpriteResolver;
use crate::config::schema::WatchConfig;
use crate::loader::SpriteNaming;

/// Why watch mode stopped or could not start.
#[derive(Debug, Error)]
pub enum WatchError {
    #[error("sprite directory not found: {}", .0.display())]
    SpritesNotFound(PathBuf),
    #[error("cannot start file watcher: {0}")]
    WatcherInit(#[source] notify::Error),
    #[error("cannot watch {}: {source}", .path.display())]
    WatchPath {
        path: PathBuf,
        #[source]
        source: notify::Error,
    },
    #[error("file watcher stopped: {0}")]
    Disconnected(#[from] RecvError),
}

/// Handle a batch of changed paths: if any is a sprite file, invalidate the
/// cache. Returns the changed sprite paths.
pub fn apply_changes<'a>(
    resolver: &SpriteResolver,
    naming: &SpriteNaming,
    paths: impl IntoIterator<Item = &'a Path>,
) -> Vec<PathBuf> {
    let mut changed: Vec<PathBuf> = paths
        .into_iter()
        .filter(|path| is_sprite_file(path, &naming.extension))
        .map(Path::to_path_buf)
        .collect();
    changed.sort();
    changed.dedup();

    if !changed.is_empty() {
        for path in &changed {
            tracing::info!("Sprite changed: {}", path.display());
        }
        resolver.invalidate_all();
    }
    changed
}

/// Watch the sprite directory and invalidate `resolver` on changes.
///
/// Calls `on_reload` with the changed paths after each invalidation. Blocks
/// until the watcher channel closes.
pub fn watch_sprites<F>(
    resolver: &SpriteResolver,
    naming: &SpriteNaming,
    config: &WatchConfig,
    mut on_reload: F,
) -> Result<(), WatchError>
where
    F: FnMut(&[PathBuf]),
{
    if !naming.dir.is_dir() {
        return Err(WatchError::SpritesNotFound(naming.dir.clone()));
    }

    let (tx, rx) = channel();

    let debounce_duration = Duration::from_millis(config.debounce_ms as u64);
    let mut debouncer = new_debouncer(debounce_duration, tx).map_err(WatchError::WatcherInit)?;

    debouncer
        .watcher()
        .watch(&naming.dir, RecursiveMode::NonRecursive)
        .map_err(|source| WatchError::WatchPath { path: naming.dir.clone(), source })?;

    tracing::info!("Watching {} for sprite changes...", naming.dir.display());

    loop {
        match rx.recv() {
            Ok(Ok(events)) => {
                let paths = events.iter().filter(|e| is_change(e)).map(|e| e.path.as_path());
                let changed = apply_changes(resolver, naming, paths);
                if !changed.is_empty() {
                    on_reload(&changed);
                }
            }
            Ok(Err(error)) => {
                // Non-fatal, keep watching
                tracing::warn!("Watch error: {:?}", error);
            }
            Err(e) => return Err(e.into()),
        }
    }
}

fn is_change(event: &DebouncedEvent) -> bool {
    matches!(event.kind, DebouncedEventKind::Any | DebouncedEventKind::AnyContinuous)
}

/// Check if a path is a sprite file with the given extension
fn is_sprite_file(path: &Path, extension: &str) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().eq_ignore_ascii_case(extension))
        .unwrap_or(false)
}
