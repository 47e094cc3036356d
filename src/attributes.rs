//! Terrain attribute vocabulary
//!
//! The three closed sets that describe a terrain tile. Values arrive already
//! validated from the attribute schema; this module only names them, orders
//! them, and converts them to and from their string form.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Error when a string does not name a known attribute value.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AttributeError {
    #[error("unknown vegetation '{0}' (expected one of: {})", Vegetation::names())]
    Vegetation(String),
    #[error("unknown climate '{0}' (expected one of: {})", Climate::names())]
    Climate(String),
    #[error("unknown height '{0}' (expected one of: {})", Height::names())]
    Height(String),
}

macro_rules! attribute_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $err:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(rename_all = "snake_case")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            /// Every value, in vocabulary order.
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            /// The value as it appears in sprite file names.
            pub fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }

            fn names() -> String {
                Self::ALL.iter().map(|v| v.as_str()).collect::<Vec<_>>().join(", ")
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = AttributeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(AttributeError::$err(other.to_string())),
                }
            }
        }
    };
}

attribute_enum! {
    /// Ground cover of a tile.
    Vegetation, Vegetation {
        None => "none",
        Grassland => "grassland",
        Forest => "forest",
        Desert => "desert",
        Tundra => "tundra",
        Swamp => "swamp",
    }
}

attribute_enum! {
    /// Climate band of a tile.
    Climate, Climate {
        Hot => "hot",
        Moderate => "moderate",
        Cold => "cold",
    }
}

attribute_enum! {
    /// Elevation class of a tile.
    Height, Height {
        DeepWater => "deep_water",
        ShallowWater => "shallow_water",
        Lowlands => "lowlands",
        Hills => "hills",
        Mountains => "mountains",
    }
}

/// The attribute triple that keys sprite resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TerrainAttributes {
    pub vegetation: Vegetation,
    pub climate: Climate,
    pub height: Height,
}

impl TerrainAttributes {
    pub fn new(vegetation: Vegetation, climate: Climate, height: Height) -> Self {
        Self { vegetation, climate, height }
    }

    /// Parse a triple from its three string values.
    pub fn parse(vegetation: &str, climate: &str, height: &str) -> Result<Self, AttributeError> {
        Ok(Self {
            vegetation: vegetation.parse()?,
            climate: climate.parse()?,
            height: height.parse()?,
        })
    }

    /// Every combination of the vocabulary (6 x 3 x 5 = 90 triples).
    pub fn all() -> impl Iterator<Item = TerrainAttributes> {
        Vegetation::ALL.iter().flat_map(|&v| {
            Climate::ALL
                .iter()
                .flat_map(move |&c| Height::ALL.iter().map(move |&h| TerrainAttributes::new(v, c, h)))
        })
    }
}

impl fmt::Display for TerrainAttributes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {}, {})", self.vegetation, self.climate, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_all_covers_every_combination_once() {
        let all: Vec<_> = TerrainAttributes::all().collect();
        assert_eq!(all.len(), 90);
        let unique: HashSet<_> = all.iter().copied().collect();
        assert_eq!(unique.len(), 90);
    }

    #[test]
    fn test_parse_round_trips_names() {
        for v in Vegetation::ALL {
            assert_eq!(v.as_str().parse::<Vegetation>(), Ok(*v));
        }
        assert_eq!("deep_water".parse::<Height>(), Ok(Height::DeepWater));
        assert_eq!("moderate".parse::<Climate>(), Ok(Climate::Moderate));
    }

    #[test]
    fn test_parse_unknown_value() {
        let err = TerrainAttributes::parse("jungle", "hot", "hills").unwrap_err();
        assert_eq!(err, AttributeError::Vegetation("jungle".to_string()));
        assert!(err.to_string().contains("grassland"));

        let err = TerrainAttributes::parse("forest", "hot", "plateau").unwrap_err();
        assert_eq!(err, AttributeError::Height("plateau".to_string()));
    }

    #[test]
    fn test_structural_equality_and_hash() {
        let a = TerrainAttributes::new(Vegetation::Forest, Climate::Hot, Height::Mountains);
        let b = TerrainAttributes::parse("forest", "hot", "mountains").unwrap();
        assert_eq!(a, b);

        let mut set = HashSet::new();
        set.insert(a);
        assert!(set.contains(&b));
    }

    #[test]
    fn test_serde_uses_snake_case() {
        let attrs = TerrainAttributes::new(Vegetation::None, Climate::Cold, Height::ShallowWater);
        let json = serde_json::to_string(&attrs).unwrap();
        assert_eq!(json, r#"{"vegetation":"none","climate":"cold","height":"shallow_water"}"#);
        let back: TerrainAttributes = serde_json::from_str(&json).unwrap();
        assert_eq!(back, attrs);
    }
}
