//! Sprite asset loading
//!
//! A [`SpriteLoader`] turns one sprite identity into a decoded image. The
//! filesystem loader maps identities onto a flat directory of files named
//! `{id}.{extension}` (e.g. `forest-hot-mountains.png`).

use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::sync::Arc;
use thiserror::Error;

use crate::attributes::Vegetation;
use crate::candidates::Candidate;

/// Default sprite directory, relative to the project root.
pub const DEFAULT_SPRITE_DIR: &str = "assets/sprites";

/// Default sprite file extension.
pub const DEFAULT_EXTENSION: &str = "png";

/// Recommended sprite edge length in pixels. Advisory only.
pub const RECOMMENDED_SIZE: u32 = 256;

/// A decoded sprite, owned by the resolver and shared read-only.
#[derive(Debug, Clone, PartialEq)]
pub struct SpriteHandle {
    /// Identity the sprite was loaded for (e.g. `forest-hot`)
    pub id: String,
    /// Where the sprite came from
    pub path: PathBuf,
    pub image: RgbaImage,
}

impl SpriteHandle {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Why a single candidate could not be loaded.
#[derive(Debug, Error)]
pub enum LoadError {
    /// No asset exists for the candidate
    #[error("sprite not found: {}", .0.display())]
    NotFound(PathBuf),
    /// The asset exists but could not be read
    #[error("failed to read sprite {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The asset exists but is not a decodable image
    #[error("failed to decode sprite {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::NotFound(path) => path,
            LoadError::Io { path, .. } | LoadError::Decode { path, .. } => path,
        }
    }

    /// A plain miss, as opposed to a present-but-broken asset.
    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::NotFound(_))
    }
}

/// Loads one sprite identity. Implementations do their own I/O and must not
/// retry; the resolver moves on to the next candidate on any error.
pub trait SpriteLoader: Send + Sync {
    fn load(&self, id: &str) -> Result<SpriteHandle, LoadError>;
}

impl<T: SpriteLoader + ?Sized> SpriteLoader for Arc<T> {
    fn load(&self, id: &str) -> Result<SpriteHandle, LoadError> {
        (**self).load(id)
    }
}

/// How candidates whose vegetation is `none` are treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NonePolicy {
    /// `none` is an ordinary file name segment (`none-hot-hills.png`)
    #[default]
    Literal,
    /// Vegetation-prefixed candidates are skipped for `none`
    Suppress,
}

impl NonePolicy {
    /// Whether the resolver should hand this candidate to the loader.
    pub fn allows(self, candidate: &Candidate) -> bool {
        match self {
            NonePolicy::Literal => !candidate.is_fallback(),
            NonePolicy::Suppress => {
                !candidate.is_fallback() && candidate.vegetation() != Some(Vegetation::None)
            }
        }
    }
}

impl fmt::Display for NonePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NonePolicy::Literal => f.write_str("literal"),
            NonePolicy::Suppress => f.write_str("suppress"),
        }
    }
}

impl FromStr for NonePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "literal" => Ok(NonePolicy::Literal),
            "suppress" => Ok(NonePolicy::Suppress),
            other => Err(format!("unknown none policy '{}' (expected literal or suppress)", other)),
        }
    }
}

/// Maps sprite identities to file paths in a flat directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpriteNaming {
    pub dir: PathBuf,
    pub extension: String,
}

impl Default for SpriteNaming {
    fn default() -> Self {
        Self { dir: PathBuf::from(DEFAULT_SPRITE_DIR), extension: DEFAULT_EXTENSION.to_string() }
    }
}

impl SpriteNaming {
    pub fn new(dir: impl Into<PathBuf>, extension: impl Into<String>) -> Self {
        Self { dir: dir.into(), extension: extension.into() }
    }

    /// `{dir}/{id}.{extension}`
    pub fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.{}", id, self.extension))
    }
}

/// Loads sprites from the filesystem and decodes them with `image`.
#[derive(Debug, Clone, Default)]
pub struct FsSpriteLoader {
    naming: SpriteNaming,
}

impl FsSpriteLoader {
    pub fn new(naming: SpriteNaming) -> Self {
        Self { naming }
    }

    pub fn naming(&self) -> &SpriteNaming {
        &self.naming
    }
}

impl SpriteLoader for FsSpriteLoader {
    fn load(&self, id: &str) -> Result<SpriteHandle, LoadError> {
        let path = self.naming.path_for(id);
        if !path.is_file() {
            return Err(LoadError::NotFound(path));
        }

        // Read first: any error past this point is in the file's contents,
        // including truncation surfacing as an io::Error from the decoder
        let bytes = match fs::read(&path) {
            Ok(bytes) => bytes,
            Err(source) => return Err(LoadError::Io { path, source }),
        };
        let image = match image::load_from_memory(&bytes) {
            Ok(image) => image.to_rgba8(),
            Err(source) => return Err(LoadError::Decode { path, source }),
        };

        if image.width() != image.height() || image.width() != RECOMMENDED_SIZE {
            tracing::debug!(
                "Sprite {} is {}x{}, recommended {}x{}",
                path.display(),
                image.width(),
                image.height(),
                RECOMMENDED_SIZE,
                RECOMMENDED_SIZE
            );
        }

        Ok(SpriteHandle { id: id.to_string(), path, image })
    }
}
