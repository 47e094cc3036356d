//! Terrasprite - terrain sprite resolution
//!
//! This library provides functionality to:
//! - Generate the ordered sprite candidates for a terrain attribute triple
//! - Load candidates from a flat sprite directory until one succeeds
//! - Cache each triple's resolution with single-flight coalescing
//! - Invalidate the cache when sprites are hot-reloaded
//!
//! ```no_run
//! use std::sync::Arc;
//! use terrasprite::attributes::{Climate, Height, TerrainAttributes, Vegetation};
//! use terrasprite::cache::SpriteResolver;
//! use terrasprite::fallback::ConstantFallback;
//! use terrasprite::loader::FsSpriteLoader;
//!
//! let resolver = Arc::new(SpriteResolver::new(FsSpriteLoader::default(), ConstantFallback::default()));
//! let tile = TerrainAttributes::new(Vegetation::Forest, Climate::Hot, Height::Mountains);
//! let resolution = resolver.resolve(tile);
//! ```

pub mod attributes;
pub mod cache;
pub mod candidates;
pub mod cli;
pub mod color;
pub mod config;
pub mod coverage;
pub mod fallback;
pub mod loader;
pub mod orphans;
pub mod watch;

pub use attributes::TerrainAttributes;
pub use cache::{Resolution, SpriteResolver};
pub use candidates::generate_candidates;
