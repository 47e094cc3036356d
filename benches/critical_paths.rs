//! Criterion benchmarks for Terrasprite critical paths
//!
//! Benchmarks the operations on the per-tile hot path:
//! - Candidates: building the ordered candidate list
//! - Cache: resolving a triple that is already cached
//! - Coverage: cold resolution of all 90 triples, serial and parallel

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use image::{Rgba, RgbaImage};
use std::collections::HashSet;
use std::path::PathBuf;
use terrasprite::attributes::{Climate, Height, TerrainAttributes, Vegetation};
use terrasprite::cache::SpriteResolver;
use terrasprite::candidates::generate_candidates;
use terrasprite::coverage::full_coverage;
use terrasprite::fallback::HeightPaletteFallback;
use terrasprite::loader::{LoadError, SpriteHandle, SpriteLoader};

// =============================================================================
// Test Data Generators
// =============================================================================

/// Loader backed by a fixed set of ids; no filesystem access.
struct MemoryLoader {
    ids: HashSet<String>,
}

impl MemoryLoader {
    fn new(ids: &[&str]) -> Self {
        Self { ids: ids.iter().map(|id| id.to_string()).collect() }
    }
}

impl SpriteLoader for MemoryLoader {
    fn load(&self, id: &str) -> Result<SpriteHandle, LoadError> {
        let path = PathBuf::from(format!("mem/{}.png", id));
        if !self.ids.contains(id) {
            return Err(LoadError::NotFound(path));
        }
        Ok(SpriteHandle {
            id: id.to_string(),
            path,
            image: RgbaImage::from_pixel(16, 16, Rgba([40, 120, 60, 255])),
        })
    }
}

/// A sparse set: a few full triples, every vegetation, and two heights.
fn make_resolver() -> SpriteResolver {
    let loader = MemoryLoader::new(&[
        "forest-hot-mountains",
        "grassland-moderate-lowlands",
        "forest",
        "desert",
        "tundra",
        "swamp",
        "grassland",
        "deep_water",
        "shallow_water",
    ]);
    SpriteResolver::new(loader, HeightPaletteFallback::terrain_default())
}

// =============================================================================
// Candidate Benchmarks
// =============================================================================

fn bench_candidates(c: &mut Criterion) {
    let mut group = c.benchmark_group("candidates");

    let attrs = TerrainAttributes::new(Vegetation::Forest, Climate::Hot, Height::Mountains);
    group.bench_function("generate_one", |b| b.iter(|| generate_candidates(black_box(attrs))));

    let all: Vec<TerrainAttributes> = TerrainAttributes::all().collect();
    group.throughput(Throughput::Elements(all.len() as u64));
    group.bench_function("generate_all_ids", |b| {
        b.iter(|| {
            all.iter()
                .flat_map(|attrs| generate_candidates(*attrs).iter().filter_map(|c| c.id()).collect::<Vec<_>>())
                .count()
        })
    });

    group.finish();
}

// =============================================================================
// Cache Benchmarks
// =============================================================================

fn bench_cache(c: &mut Criterion) {
    let mut group = c.benchmark_group("cache");

    let resolver = make_resolver();
    let attrs = TerrainAttributes::new(Vegetation::Forest, Climate::Cold, Height::Hills);
    resolver.resolve(attrs);

    group.bench_function("resolve_hit", |b| b.iter(|| resolver.resolve(black_box(attrs))));
    group.bench_function("peek_hit", |b| b.iter(|| resolver.peek(black_box(attrs))));

    // A 64x64 map of tiles cycling through every triple
    let all: Vec<TerrainAttributes> = TerrainAttributes::all().collect();
    let map: Vec<TerrainAttributes> = (0..64 * 64).map(|i| all[i % all.len()]).collect();
    for attrs in &all {
        resolver.resolve(*attrs);
    }
    group.throughput(Throughput::Elements(map.len() as u64));
    group.bench_function("resolve_map_64x64_warm", |b| {
        b.iter(|| map.iter().filter(|attrs| resolver.resolve(**attrs).is_fallback()).count())
    });

    group.finish();
}

// =============================================================================
// Coverage Benchmarks
// =============================================================================

fn bench_coverage(c: &mut Criterion) {
    let mut group = c.benchmark_group("coverage");

    group.bench_function("full_coverage_cold", |b| {
        b.iter_with_setup(make_resolver, |resolver| full_coverage(&resolver))
    });

    for threads in [1usize, 4].iter() {
        let pool = match rayon::ThreadPoolBuilder::new().num_threads(*threads).build() {
            Ok(pool) => pool,
            Err(_) => continue,
        };
        group.bench_with_input(BenchmarkId::new("full_coverage_threads", threads), threads, |b, _| {
            b.iter_with_setup(make_resolver, |resolver| pool.install(|| full_coverage(&resolver)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_candidates, bench_cache, bench_coverage);
criterion_main!(benches);
