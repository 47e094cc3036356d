//! Single-flight sprite resolution cache
//!
//! [`SpriteResolver`] memoizes, per [`TerrainAttributes`], the sprite chosen
//! by walking the candidate list, or the fallback visual when nothing loads.
//! Concurrent requests for the same triple share one load sequence: the first
//! caller leads the flight, later callers block until it completes and all of
//! them receive the same [`Resolution`].
//!
//! The map lock is held only to decide between hit, join and lead. Loading
//! happens outside it, so distinct triples resolve without contention.

use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};

use tracing::{debug, info, warn};

use crate::attributes::TerrainAttributes;
use crate::candidates::generate_candidates;
use crate::fallback::{FallbackProvider, FallbackVisual};
use crate::loader::{NonePolicy, SpriteHandle, SpriteLoader};

/// The outcome of resolving one triple. Cheap to clone; sprites are shared.
#[derive(Debug, Clone)]
pub enum Resolution {
    /// `rank` is the 1-based position of the winning candidate.
    Sprite { sprite: Arc<SpriteHandle>, rank: usize },
    Fallback(FallbackVisual),
}

impl Resolution {
    pub fn sprite(&self) -> Option<&SpriteHandle> {
        match self {
            Resolution::Sprite { sprite, .. } => Some(sprite),
            Resolution::Fallback(_) => None,
        }
    }

    pub fn rank(&self) -> Option<usize> {
        match self {
            Resolution::Sprite { rank, .. } => Some(*rank),
            Resolution::Fallback(_) => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Resolution::Fallback(_))
    }

    /// True when both resolutions are the same cached result (same sprite
    /// allocation, or equal fallback visuals).
    pub fn same_as(&self, other: &Resolution) -> bool {
        match (self, other) {
            (Resolution::Sprite { sprite: a, .. }, Resolution::Sprite { sprite: b, .. }) => Arc::ptr_eq(a, b),
            (Resolution::Fallback(a), Resolution::Fallback(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug)]
enum FlightState {
    Running,
    Done(Resolution),
    /// The leader unwound before finishing; waiters start over.
    Abandoned,
}

/// A load sequence in progress, awaited by every caller that joins it.
#[derive(Debug)]
struct Flight {
    state: Mutex<FlightState>,
    ready: Condvar,
}

impl Flight {
    fn new() -> Self {
        Self { state: Mutex::new(FlightState::Running), ready: Condvar::new() }
    }

    fn wait(&self) -> Option<Resolution> {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        loop {
            match &*state {
                FlightState::Running => {
                    state = self.ready.wait(state).unwrap_or_else(PoisonError::into_inner);
                }
                FlightState::Done(result) => return Some(result.clone()),
                FlightState::Abandoned => return None,
            }
        }
    }

    fn complete(&self, result: Option<Resolution>) {
        let mut state = self.state.lock().unwrap_or_else(PoisonError::into_inner);
        *state = match result {
            Some(result) => FlightState::Done(result),
            None => FlightState::Abandoned,
        };
        self.ready.notify_all();
    }
}

#[derive(Debug)]
enum CacheEntry {
    Pending(Arc<Flight>),
    Done(Resolution),
}

enum Step {
    Hit(Resolution),
    Join(Arc<Flight>),
    Lead(Arc<Flight>),
}

/// Snapshot of resolver counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Calls to `resolve`
    pub lookups: u64,
    /// Lookups answered from a completed entry
    pub hits: u64,
    /// Lookups that joined a flight already in progress
    pub coalesced: u64,
    /// Load sequences started
    pub flights: u64,
    /// Individual loader invocations
    pub loader_calls: u64,
    /// Flights that ended in the fallback visual
    pub fallbacks: u64,
    /// Calls to `invalidate_all`
    pub invalidations: u64,
}

impl CacheStats {
    /// Hit rate (0.0 - 1.0)
    pub fn hit_rate(&self) -> f64 {
        if self.lookups == 0 {
            0.0
        } else {
            self.hits as f64 / self.lookups as f64
        }
    }
}

#[derive(Debug, Default)]
struct Counters {
    lookups: AtomicU64,
    hits: AtomicU64,
    coalesced: AtomicU64,
    flights: AtomicU64,
    loader_calls: AtomicU64,
    fallbacks: AtomicU64,
    invalidations: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> CacheStats {
        CacheStats {
            lookups: self.lookups.load(Ordering::Relaxed),
            hits: self.hits.load(Ordering::Relaxed),
            coalesced: self.coalesced.load(Ordering::Relaxed),
            flights: self.flights.load(Ordering::Relaxed),
            loader_calls: self.loader_calls.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            invalidations: self.invalidations.load(Ordering::Relaxed),
        }
    }
}

/// Resolves terrain triples to sprites, once per triple.
///
/// Create one per render system and share it as `Arc<SpriteResolver>`.
pub struct SpriteResolver {
    entries: Mutex<HashMap<TerrainAttributes, CacheEntry>>,
    loader: Box<dyn SpriteLoader>,
    fallback: Box<dyn FallbackProvider>,
    none_policy: NonePolicy,
    counters: Counters,
}

impl std::fmt::Debug for SpriteResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteResolver")
            .field("none_policy", &self.none_policy)
            .field("entries", &self.lock_entries().len())
            .finish_non_exhaustive()
    }
}

impl SpriteResolver {
    pub fn new(
        loader: impl SpriteLoader + 'static,
        fallback: impl FallbackProvider + 'static,
    ) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            loader: Box::new(loader),
            fallback: Box::new(fallback),
            none_policy: NonePolicy::default(),
            counters: Counters::default(),
        }
    }

    /// Set how `none` vegetation candidates are treated.
    pub fn with_none_policy(mut self, policy: NonePolicy) -> Self {
        self.none_policy = policy;
        self
    }

    pub fn none_policy(&self) -> NonePolicy {
        self.none_policy
    }

    /// Resolve a triple to a sprite or the fallback visual. Never fails.
    pub fn resolve(&self, attrs: TerrainAttributes) -> Resolution {
        Counters::bump(&self.counters.lookups);

        loop {
            let step = {
                let mut entries = self.lock_entries();
                match entries.get(&attrs) {
                    Some(CacheEntry::Done(result)) => Step::Hit(result.clone()),
                    Some(CacheEntry::Pending(flight)) => Step::Join(Arc::clone(flight)),
                    None => {
                        let flight = Arc::new(Flight::new());
                        entries.insert(attrs, CacheEntry::Pending(Arc::clone(&flight)));
                        Step::Lead(flight)
                    }
                }
            };

            match step {
                Step::Hit(result) => {
                    Counters::bump(&self.counters.hits);
                    return result;
                }
                Step::Join(flight) => {
                    Counters::bump(&self.counters.coalesced);
                    if let Some(result) = flight.wait() {
                        return result;
                    }
                    debug!("Flight for {} was abandoned, retrying", attrs);
                }
                Step::Lead(flight) => {
                    let mut guard = LeaderGuard { resolver: self, attrs, flight, finished: false };
                    let result = self.load_sequence(attrs);
                    guard.finish(result.clone());
                    return result;
                }
            }
        }
    }

    /// The completed resolution for a triple, without triggering a load.
    pub fn peek(&self, attrs: TerrainAttributes) -> Option<Resolution> {
        match self.lock_entries().get(&attrs) {
            Some(CacheEntry::Done(result)) => Some(result.clone()),
            _ => None,
        }
    }

    /// Drop every cached resolution, e.g. after sprites were hot-reloaded.
    ///
    /// Flights already running still hand their result to their own waiters
    /// but no longer populate the cache, so the next `resolve` starts again
    /// from the most specific candidate.
    pub fn invalidate_all(&self) {
        let cleared = {
            let mut entries = self.lock_entries();
            let cleared = entries.len();
            entries.clear();
            cleared
        };
        Counters::bump(&self.counters.invalidations);
        info!("Sprite cache invalidated ({} entries)", cleared);
    }

    /// Number of triples with a completed resolution.
    pub fn cached_len(&self) -> usize {
        self.lock_entries().values().filter(|e| matches!(e, CacheEntry::Done(_))).count()
    }

    pub fn stats(&self) -> CacheStats {
        self.counters.snapshot()
    }

    fn lock_entries(&self) -> MutexGuard<'_, HashMap<TerrainAttributes, CacheEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Try candidates in order; first success wins, otherwise fall back.
    fn load_sequence(&self, attrs: TerrainAttributes) -> Resolution {
        Counters::bump(&self.counters.flights);
        let candidates = generate_candidates(attrs);

        for (index, candidate) in candidates.sprites().iter().enumerate() {
            if !self.none_policy.allows(candidate) {
                debug!("Skipping {} for {} (none policy: {})", candidate, attrs, self.none_policy);
                continue;
            }
            let Some(id) = candidate.id() else {
                continue;
            };

            Counters::bump(&self.counters.loader_calls);
            match self.loader.load(&id) {
                Ok(sprite) => {
                    info!("Loaded sprite: {}", sprite.path.display());
                    return Resolution::Sprite { sprite: Arc::new(sprite), rank: index + 1 };
                }
                Err(err) if err.is_not_found() => {
                    info!("Failed to load sprite: {}", err.path().display());
                }
                Err(err) => {
                    warn!("Failed to load sprite: {} ({})", err.path().display(), err);
                }
            }
        }

        Counters::bump(&self.counters.fallbacks);
        let visual = self.fallback.fallback(&attrs);
        info!("No sprite for {}, using fallback color", attrs);
        Resolution::Fallback(visual)
    }

    /// Publish a leader's outcome. `None` means the leader unwound.
    fn complete_flight(&self, attrs: TerrainAttributes, flight: &Arc<Flight>, result: Option<Resolution>) {
        {
            let mut entries = self.lock_entries();
            // An invalidation may have replaced or removed our entry
            let ours = matches!(
                entries.get(&attrs),
                Some(CacheEntry::Pending(pending)) if Arc::ptr_eq(pending, flight)
            );
            if ours {
                match &result {
                    Some(result) => {
                        entries.insert(attrs, CacheEntry::Done(result.clone()));
                    }
                    None => {
                        entries.remove(&attrs);
                    }
                }
            }
        }
        flight.complete(result);
    }
}

/// Releases waiters even if the leader's load sequence panics.
struct LeaderGuard<'a> {
    resolver: &'a SpriteResolver,
    attrs: TerrainAttributes,
    flight: Arc<Flight>,
    finished: bool,
}

impl LeaderGuard<'_> {
    fn finish(&mut self, result: Resolution) {
        self.finished = true;
        self.resolver.complete_flight(self.attrs, &self.flight, Some(result));
    }
}

impl Drop for LeaderGuard<'_> {
    fn drop(&mut self) {
        if !self.finished {
            self.resolver.complete_flight(self.attrs, &self.flight, None);
        }
    }
}
