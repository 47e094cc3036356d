//! Fallback visuals for tiles with no loadable sprite
//!
//! The resolver asks a [`FallbackProvider`] for a flat color once it has
//! exhausted every candidate for a triple. Providers cannot fail.

use image::Rgba;
use serde::{Serialize, Serializer};
use std::collections::HashMap;

use crate::attributes::{Height, TerrainAttributes};
use crate::color::format_color;

/// Magenta default for missing sprites, visible at a glance.
pub const MAGENTA_FALLBACK: Rgba<u8> = Rgba([255, 0, 255, 255]);

/// The default presentation used in place of a sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FallbackVisual {
    pub color: Rgba<u8>,
}

impl FallbackVisual {
    pub fn new(color: Rgba<u8>) -> Self {
        Self { color }
    }
}

impl Serialize for FallbackVisual {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_color(self.color))
    }
}

/// Supplies the default visual for a triple.
pub trait FallbackProvider: Send + Sync {
    fn fallback(&self, attrs: &TerrainAttributes) -> FallbackVisual;
}

impl<T: FallbackProvider + ?Sized> FallbackProvider for Box<T> {
    fn fallback(&self, attrs: &TerrainAttributes) -> FallbackVisual {
        (**self).fallback(attrs)
    }
}

/// The same color for every triple.
#[derive(Debug, Clone, Copy)]
pub struct ConstantFallback(pub FallbackVisual);

impl Default for ConstantFallback {
    fn default() -> Self {
        Self(FallbackVisual::new(MAGENTA_FALLBACK))
    }
}

impl FallbackProvider for ConstantFallback {
    fn fallback(&self, _attrs: &TerrainAttributes) -> FallbackVisual {
        self.0
    }
}

/// A color per height class, with a default for heights not listed.
#[derive(Debug, Clone)]
pub struct HeightPaletteFallback {
    colors: HashMap<Height, Rgba<u8>>,
    default: Rgba<u8>,
}

impl HeightPaletteFallback {
    pub fn new(default: Rgba<u8>) -> Self {
        Self { colors: HashMap::new(), default }
    }

    pub fn with_color(mut self, height: Height, color: Rgba<u8>) -> Self {
        self.colors.insert(height, color);
        self
    }

    /// Map-style palette: water blues, lowland green, hill brown, mountain grey.
    pub fn terrain_default() -> Self {
        Self::new(MAGENTA_FALLBACK)
            .with_color(Height::DeepWater, Rgba([24, 54, 120, 255]))
            .with_color(Height::ShallowWater, Rgba([64, 128, 196, 255]))
            .with_color(Height::Lowlands, Rgba([112, 160, 80, 255]))
            .with_color(Height::Hills, Rgba([150, 120, 80, 255]))
            .with_color(Height::Mountains, Rgba([128, 128, 128, 255]))
    }
}

impl FallbackProvider for HeightPaletteFallback {
    fn fallback(&self, attrs: &TerrainAttributes) -> FallbackVisual {
        let color = self.colors.get(&attrs.height).copied().unwrap_or(self.default);
        FallbackVisual::new(color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Climate, Vegetation};

    fn attrs(height: Height) -> TerrainAttributes {
        TerrainAttributes::new(Vegetation::Desert, Climate::Hot, height)
    }

    #[test]
    fn test_constant_fallback_ignores_attributes() {
        let provider = ConstantFallback::default();
        assert_eq!(provider.fallback(&attrs(Height::Hills)).color, MAGENTA_FALLBACK);
        assert_eq!(provider.fallback(&attrs(Height::DeepWater)).color, MAGENTA_FALLBACK);
    }

    #[test]
    fn test_height_palette_uses_default_for_unlisted() {
        let provider = HeightPaletteFallback::new(Rgba([0, 0, 0, 255]))
            .with_color(Height::Hills, Rgba([1, 2, 3, 255]));
        assert_eq!(provider.fallback(&attrs(Height::Hills)).color, Rgba([1, 2, 3, 255]));
        assert_eq!(provider.fallback(&attrs(Height::Lowlands)).color, Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_terrain_default_covers_every_height() {
        let provider = HeightPaletteFallback::terrain_default();
        for &h in Height::ALL {
            assert_ne!(provider.fallback(&attrs(h)).color, MAGENTA_FALLBACK);
        }
    }

    #[test]
    fn test_serializes_as_hex() {
        let json = serde_json::to_string(&FallbackVisual::new(Rgba([255, 0, 255, 255]))).unwrap();
        assert_eq!(json, "\"#FF00FFFF\"");
    }
}
