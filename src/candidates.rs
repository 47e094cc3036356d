//! Sprite candidate generation
//!
//! Maps a terrain attribute triple to the ordered list of sprite identities
//! tried during resolution, most specific first:
//!
//! 1. `vegetation-climate-height`
//! 2. `vegetation-height`
//! 3. `vegetation-climate`
//! 4. `vegetation`
//! 5. `height`
//! 6. `climate`
//! 7. fallback sentinel
//!
//! There is no `climate-height` candidate.

use serde::{Serialize, Serializer};
use std::fmt;

use crate::attributes::{Climate, Height, TerrainAttributes, Vegetation};

/// Separator between attribute values in a sprite identity.
pub const SEPARATOR: &str = "-";

/// Number of entries in every candidate list, sentinel included.
pub const CANDIDATE_COUNT: usize = 7;

/// One sprite identity considered during resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Candidate {
    VegetationClimateHeight(Vegetation, Climate, Height),
    VegetationHeight(Vegetation, Height),
    VegetationClimate(Vegetation, Climate),
    Vegetation(Vegetation),
    Height(Height),
    Climate(Climate),
    /// No sprite; use the fallback visual.
    Fallback,
}

impl Candidate {
    /// The sprite identity, or `None` for the fallback sentinel.
    pub fn id(&self) -> Option<String> {
        let parts: Vec<&str> = match *self {
            Candidate::VegetationClimateHeight(v, c, h) => vec![v.as_str(), c.as_str(), h.as_str()],
            Candidate::VegetationHeight(v, h) => vec![v.as_str(), h.as_str()],
            Candidate::VegetationClimate(v, c) => vec![v.as_str(), c.as_str()],
            Candidate::Vegetation(v) => vec![v.as_str()],
            Candidate::Height(h) => vec![h.as_str()],
            Candidate::Climate(c) => vec![c.as_str()],
            Candidate::Fallback => return None,
        };
        Some(parts.join(SEPARATOR))
    }

    /// The vegetation segment this candidate starts with, if any.
    pub fn vegetation(&self) -> Option<Vegetation> {
        match *self {
            Candidate::VegetationClimateHeight(v, _, _)
            | Candidate::VegetationHeight(v, _)
            | Candidate::VegetationClimate(v, _)
            | Candidate::Vegetation(v) => Some(v),
            _ => None,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Candidate::Fallback)
    }
}

impl fmt::Display for Candidate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.id() {
            Some(id) => f.write_str(&id),
            None => f.write_str("<fallback>"),
        }
    }
}

impl Serialize for Candidate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self.id() {
            Some(id) => serializer.serialize_some(&id),
            None => serializer.serialize_none(),
        }
    }
}

/// The fixed-length, ordered candidate list for one triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateList([Candidate; CANDIDATE_COUNT]);

impl CandidateList {
    pub fn as_slice(&self) -> &[Candidate] {
        &self.0
    }

    /// The real candidates (ranks 1-6), without the trailing sentinel.
    pub fn sprites(&self) -> &[Candidate] {
        &self.0[..CANDIDATE_COUNT - 1]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Candidate> {
        self.0.iter()
    }
}

impl<'a> IntoIterator for &'a CandidateList {
    type Item = &'a Candidate;
    type IntoIter = std::slice::Iter<'a, Candidate>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Generate the candidate list for a triple.
///
/// Pure and total. `Vegetation::None` is emitted literally (`none-hot-hills`);
/// whether such candidates are attempted is decided by the resolver's
/// [`NonePolicy`](crate::loader::NonePolicy).
pub fn generate_candidates(attrs: TerrainAttributes) -> CandidateList {
    let TerrainAttributes { vegetation: v, climate: c, height: h } = attrs;
    CandidateList([
        Candidate::VegetationClimateHeight(v, c, h),
        Candidate::VegetationHeight(v, h),
        Candidate::VegetationClimate(v, c),
        Candidate::Vegetation(v),
        Candidate::Height(h),
        Candidate::Climate(c),
        Candidate::Fallback,
    ])
}
