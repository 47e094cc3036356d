//! Configuration schema types for `terrasprite.toml`
//!
//! Defines the structure and validation rules for sprite resolution settings.

use image::Rgba;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::attributes::Height;
use crate::color::parse_color;
use crate::fallback::{ConstantFallback, FallbackProvider, FallbackVisual, HeightPaletteFallback, MAGENTA_FALLBACK};
use crate::loader::{NonePolicy, SpriteNaming, DEFAULT_EXTENSION, DEFAULT_SPRITE_DIR};

/// Sprite lookup settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpritesConfig {
    /// Flat directory holding the sprite files
    #[serde(default = "default_dir")]
    pub dir: PathBuf,
    /// File extension, without the dot
    #[serde(default = "default_extension")]
    pub extension: String,
    /// Treatment of `none` vegetation candidates
    #[serde(default)]
    pub none_policy: NonePolicy,
}

fn default_dir() -> PathBuf {
    PathBuf::from(DEFAULT_SPRITE_DIR)
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Default for SpritesConfig {
    fn default() -> Self {
        Self { dir: default_dir(), extension: default_extension(), none_policy: NonePolicy::default() }
    }
}

/// Flat-color fallback settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FallbackConfig {
    /// Color used when no height-specific color applies
    #[serde(default = "default_color")]
    pub color: String,
    /// Optional per-height colors, keyed by height name
    #[serde(default)]
    pub heights: HashMap<String, String>,
}

fn default_color() -> String {
    "#FF00FF".to_string()
}

impl Default for FallbackConfig {
    fn default() -> Self {
        Self { color: default_color(), heights: HashMap::new() }
    }
}

/// Hot-reload settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WatchConfig {
    /// Debounce delay in milliseconds
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u32,
}

fn default_debounce_ms() -> u32 {
    100
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self { debounce_ms: 100 }
    }
}

/// Complete terrasprite.toml configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct TerraConfig {
    #[serde(default)]
    pub sprites: SpritesConfig,
    #[serde(default)]
    pub fallback: FallbackConfig,
    #[serde(default)]
    pub watch: WatchConfig,
}

/// Configuration validation error
#[derive(Debug, Clone)]
pub struct ConfigValidationError {
    /// Path to the invalid field (e.g., "fallback.heights.hills")
    pub field: String,
    /// Error message
    pub message: String,
}

impl std::fmt::Display for ConfigValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "terrasprite.toml: '{}' {}", self.field, self.message)
    }
}

impl TerraConfig {
    /// Validate the configuration and return any errors
    pub fn validate(&self) -> Vec<ConfigValidationError> {
        let mut errors = Vec::new();

        let extension = self.sprites.extension.trim();
        if extension.is_empty() {
            errors.push(ConfigValidationError {
                field: "sprites.extension".to_string(),
                message: "must be a non-empty string".to_string(),
            });
        } else if extension.starts_with('.') {
            errors.push(ConfigValidationError {
                field: "sprites.extension".to_string(),
                message: "must not start with '.'".to_string(),
            });
        }

        if let Err(e) = parse_color(&self.fallback.color) {
            errors.push(ConfigValidationError {
                field: "fallback.color".to_string(),
                message: format!("is not a valid color: {}", e),
            });
        }

        let mut heights: Vec<_> = self.fallback.heights.iter().collect();
        heights.sort();
        for (height, color) in heights {
            if let Err(e) = height.parse::<Height>() {
                errors.push(ConfigValidationError {
                    field: format!("fallback.heights.{}", height),
                    message: e.to_string(),
                });
            }
            if let Err(e) = parse_color(color) {
                errors.push(ConfigValidationError {
                    field: format!("fallback.heights.{}", height),
                    message: format!("is not a valid color: {}", e),
                });
            }
        }

        if self.watch.debounce_ms == 0 {
            errors.push(ConfigValidationError {
                field: "watch.debounce_ms".to_string(),
                message: "must be a positive integer".to_string(),
            });
        }

        errors
    }

    /// Check if validation passed
    pub fn is_valid(&self) -> bool {
        self.validate().is_empty()
    }

    /// File naming for the configured sprite directory.
    pub fn naming(&self) -> SpriteNaming {
        SpriteNaming::new(self.sprites.dir.clone(), self.sprites.extension.trim())
    }

    /// Build the fallback provider. Invalid colors fall back to magenta and
    /// unknown heights are ignored; `validate()` reports both.
    pub fn fallback_provider(&self) -> Box<dyn FallbackProvider> {
        let default = parse_color(&self.fallback.color).unwrap_or(MAGENTA_FALLBACK);
        if self.fallback.heights.is_empty() {
            return Box::new(ConstantFallback(FallbackVisual::new(default)));
        }

        let palette = self.fallback.heights.iter().fold(
            HeightPaletteFallback::new(default),
            |palette, (height, color)| match height.parse::<Height>() {
                Ok(height) => {
                    let color: Rgba<u8> = parse_color(color).unwrap_or(default);
                    palette.with_color(height, color)
                }
                Err(_) => palette,
            },
        );
        Box::new(palette)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Climate, TerrainAttributes, Vegetation};

    #[test]
    fn test_empty_config_uses_defaults() {
        let config: TerraConfig = toml::from_str("").unwrap();
        assert_eq!(config.sprites.dir, PathBuf::from("assets/sprites"));
        assert_eq!(config.sprites.extension, "png");
        assert_eq!(config.sprites.none_policy, NonePolicy::Literal);
        assert_eq!(config.watch.debounce_ms, 100);
        assert!(config.is_valid());
    }

    #[test]
    fn test_parse_full_config() {
        let config: TerraConfig = toml::from_str(
            r##"
[sprites]
dir = "art/tiles"
extension = "webp"
none_policy = "suppress"

[fallback]
color = "#222"

[fallback.heights]
deep_water = "#183678"
hills = "#967850"
"##,
        )
        .unwrap();

        assert_eq!(config.naming().path_for("hills"), PathBuf::from("art/tiles/hills.webp"));
        assert_eq!(config.sprites.none_policy, NonePolicy::Suppress);
        assert_eq!(config.fallback.heights.len(), 2);
        assert!(config.is_valid());

        let provider = config.fallback_provider();
        let hills = TerrainAttributes::new(Vegetation::Forest, Climate::Cold, Height::Hills);
        let lowlands = TerrainAttributes::new(Vegetation::Forest, Climate::Cold, Height::Lowlands);
        assert_eq!(provider.fallback(&hills).color, Rgba([0x96, 0x78, 0x50, 255]));
        assert_eq!(provider.fallback(&lowlands).color, Rgba([0x22, 0x22, 0x22, 255]));
    }

    #[test]
    fn test_unknown_height_key_is_reported() {
        let config: TerraConfig = toml::from_str("[fallback.heights]\nplateau = \"#000\"\n").unwrap();
        let errors = config.validate();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "fallback.heights.plateau");
        assert!(errors[0].message.contains("unknown height"));
    }

    #[test]
    fn test_validate_reports_each_problem() {
        let mut config = TerraConfig::default();
        config.sprites.extension = ".png".to_string();
        config.fallback.color = "magenta".to_string();
        config.fallback.heights.insert("hills".to_string(), "#12".to_string());
        config.watch.debounce_ms = 0;

        let fields: Vec<String> = config.validate().into_iter().map(|e| e.field).collect();
        assert_eq!(
            fields,
            vec!["sprites.extension", "fallback.color", "fallback.heights.hills", "watch.debounce_ms"]
        );
    }
}
