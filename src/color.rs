//! Hex color parsing for fallback visuals
//!
//! Supports `#RGB`, `#RGBA`, `#RRGGBB` and `#RRGGBBAA`.

use image::Rgba;
use thiserror::Error;

/// Error type for color parsing failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    /// Input string was empty
    #[error("empty color string")]
    Empty,
    /// Input string doesn't start with '#'
    #[error("color must start with '#'")]
    MissingHash,
    /// Invalid length (must be 3, 4, 6, or 8 hex chars after #)
    #[error("invalid color length {0}, expected 3, 4, 6, or 8")]
    InvalidLength(usize),
    /// Contains non-hex characters
    #[error("invalid hex character '{0}'")]
    InvalidHex(char),
}

/// Parse a hex color string into an RGBA color.
///
/// # Examples
///
/// ```
/// use terrasprite::color::parse_color;
///
/// assert_eq!(parse_color("#F00").unwrap(), image::Rgba([255, 0, 0, 255]));
/// assert_eq!(parse_color("#1E90FF80").unwrap(), image::Rgba([30, 144, 255, 128]));
/// ```
pub fn parse_color(s: &str) -> Result<Rgba<u8>, ColorError> {
    let s = s.trim();
    if s.is_empty() {
        return Err(ColorError::Empty);
    }
    let hex = s.strip_prefix('#').ok_or(ColorError::MissingHash)?;

    let digits = hex.chars().map(parse_hex_digit).collect::<Result<Vec<u8>, _>>()?;

    match digits.as_slice() {
        // Short forms double each digit
        [r, g, b] => Ok(Rgba([r * 17, g * 17, b * 17, 255])),
        [r, g, b, a] => Ok(Rgba([r * 17, g * 17, b * 17, a * 17])),
        [r1, r0, g1, g0, b1, b0] => Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, 255])),
        [r1, r0, g1, g0, b1, b0, a1, a0] => {
            Ok(Rgba([r1 * 16 + r0, g1 * 16 + g0, b1 * 16 + b0, a1 * 16 + a0]))
        }
        _ => Err(ColorError::InvalidLength(digits.len())),
    }
}

/// Format a color as `#RRGGBBAA`.
pub fn format_color(color: Rgba<u8>) -> String {
    let [r, g, b, a] = color.0;
    format!("#{:02X}{:02X}{:02X}{:02X}", r, g, b, a)
}

/// Parse a single hex digit (0-9, A-F, a-f) to u8 (0-15)
fn parse_hex_digit(c: char) -> Result<u8, ColorError> {
    match c {
        '0'..='9' => Ok(c as u8 - b'0'),
        'a'..='f' => Ok(c as u8 - b'a' + 10),
        'A'..='F' => Ok(c as u8 - b'A' + 10),
        _ => Err(ColorError::InvalidHex(c)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_forms() {
        assert_eq!(parse_color("#0F0"), Ok(Rgba([0, 255, 0, 255])));
        assert_eq!(parse_color("#0F08"), Ok(Rgba([0, 255, 0, 136])));
    }

    #[test]
    fn test_long_forms() {
        assert_eq!(parse_color("#4a7c59"), Ok(Rgba([74, 124, 89, 255])));
        assert_eq!(parse_color("#4A7C5900"), Ok(Rgba([74, 124, 89, 0])));
    }

    #[test]
    fn test_errors() {
        assert_eq!(parse_color(""), Err(ColorError::Empty));
        assert_eq!(parse_color("ff0000"), Err(ColorError::MissingHash));
        assert_eq!(parse_color("#ff00"), Ok(Rgba([255, 255, 0, 0])));
        assert_eq!(parse_color("#ff000"), Err(ColorError::InvalidLength(5)));
        assert_eq!(parse_color("#gg0000"), Err(ColorError::InvalidHex('g')));
    }

    #[test]
    fn test_format_color() {
        assert_eq!(format_color(Rgba([255, 0, 128, 255])), "#FF0080FF");
        assert_eq!(parse_color(&format_color(Rgba([1, 2, 3, 4]))), Ok(Rgba([1, 2, 3, 4])));
    }
}
