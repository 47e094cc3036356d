//! Batch resolution over many triples
//!
//! Resolves a set of triples in parallel through a shared [`SpriteResolver`]
//! and reports which candidate rank each one landed on. Used by the CLI to
//! audit an asset directory against the full attribute vocabulary.

use rayon::prelude::*;
use serde::Serialize;
use std::path::PathBuf;

use crate::attributes::TerrainAttributes;
use crate::cache::{CacheStats, Resolution, SpriteResolver};
use crate::candidates::CANDIDATE_COUNT;
use crate::fallback::FallbackVisual;

/// How one triple resolved.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageEntry {
    pub attributes: TerrainAttributes,
    /// 1-based candidate rank of the winning sprite; `None` for fallback
    pub rank: Option<usize>,
    pub sprite: Option<String>,
    pub path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback: Option<FallbackVisual>,
}

impl CoverageEntry {
    fn from_resolution(attributes: TerrainAttributes, resolution: &Resolution) -> Self {
        match resolution {
            Resolution::Sprite { sprite, rank } => Self {
                attributes,
                rank: Some(*rank),
                sprite: Some(sprite.id.clone()),
                path: Some(sprite.path.clone()),
                fallback: None,
            },
            Resolution::Fallback(visual) => Self {
                attributes,
                rank: None,
                sprite: None,
                path: None,
                fallback: Some(*visual),
            },
        }
    }

    pub fn is_fallback(&self) -> bool {
        self.sprite.is_none()
    }
}

/// Result of a batch resolution.
#[derive(Debug, Clone, Serialize)]
pub struct CoverageReport {
    pub entries: Vec<CoverageEntry>,
    pub stats: CacheStats,
}

impl CoverageReport {
    pub fn fallback_count(&self) -> usize {
        self.entries.iter().filter(|e| e.is_fallback()).count()
    }

    /// Entries per outcome: index 0-5 are ranks 1-6, index 6 is fallback.
    pub fn rank_counts(&self) -> [usize; CANDIDATE_COUNT] {
        let mut counts = [0; CANDIDATE_COUNT];
        for entry in &self.entries {
            let slot = entry.rank.map(|r| r - 1).unwrap_or(CANDIDATE_COUNT - 1);
            counts[slot] += 1;
        }
        counts
    }
}

/// Resolve every triple in parallel. Entries keep the input order.
pub fn coverage(resolver: &SpriteResolver, attrs: &[TerrainAttributes]) -> CoverageReport {
    let entries = attrs
        .par_iter()
        .map(|&a| CoverageEntry::from_resolution(a, &resolver.resolve(a)))
        .collect();

    CoverageReport { entries, stats: resolver.stats() }
}

/// Resolve the full vocabulary (all 90 triples).
pub fn full_coverage(resolver: &SpriteResolver) -> CoverageReport {
    let all: Vec<TerrainAttributes> = TerrainAttributes::all().collect();
    coverage(resolver, &all)
}
