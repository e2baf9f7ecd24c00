//! Channel-wise color comparison with a tolerance.
//!
//! Used by palette grounding inside the pipeline and by the `verify-color`
//! command to check scraped colors against the live page.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::ColorFormatError;

/// Maximum per-channel difference accepted by default.
pub const DEFAULT_TOLERANCE: u8 = 2;

/// Red, green and blue channels, each 0-255.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
}

impl Rgb {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self { red, green, blue }
    }

    pub fn channels(&self) -> [u8; 3] {
        [self.red, self.green, self.blue]
    }

    /// `#rrggbb`, lowercase.
    pub fn to_hex(&self) -> String {
        format!("#{:02x}{:02x}{:02x}", self.red, self.green, self.blue)
    }

    /// `rgb(r, g, b)`, the way browsers serialize computed colors.
    pub fn to_css(&self) -> String {
        format!("rgb({}, {}, {})", self.red, self.green, self.blue)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RGB({}, {}, {})", self.red, self.green, self.blue)
    }
}

/// Parse `#RRGGBB` (leading `#` optional) into channels.
pub fn hex_to_channels(hex: &str) -> Result<Rgb, ColorFormatError> {
    let digits = hex.strip_prefix('#').unwrap_or(hex);
    if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ColorFormatError::InvalidHex(hex.to_string()));
    }

    let channel = |i: usize| {
        u8::from_str_radix(&digits[i..i + 2], 16)
            .map_err(|_| ColorFormatError::InvalidHex(hex.to_string()))
    };
    Ok(Rgb::new(channel(0)?, channel(2)?, channel(4)?))
}

/// Parse `rgb(R, G, B)` or `rgba(R, G, B, A)` into channels; alpha is dropped.
pub fn rgb_string_to_channels(value: &str) -> Result<Rgb, ColorFormatError> {
    let invalid = || ColorFormatError::InvalidRgb(value.to_string());

    let trimmed = value.trim();
    let inner = trimmed
        .strip_prefix("rgba(")
        .or_else(|| trimmed.strip_prefix("rgb("))
        .and_then(|rest| rest.strip_suffix(')'))
        .ok_or_else(invalid)?;

    let tokens: Vec<&str> = inner.split(',').map(str::trim).collect();
    if tokens.len() < 3 {
        return Err(invalid());
    }

    let channel = |token: &str| token.parse::<u8>().map_err(|_| invalid());
    Ok(Rgb::new(
        channel(tokens[0])?,
        channel(tokens[1])?,
        channel(tokens[2])?,
    ))
}

/// Outcome of comparing two colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ToleranceComparison {
    /// Whether the largest channel difference is within tolerance
    pub matches: bool,

    /// Largest absolute difference over the three channels
    pub max_channel_diff: u8,
}

/// Compare two colors channel by channel.
pub fn compare(a: Rgb, b: Rgb, tolerance: u8) -> ToleranceComparison {
    let max_channel_diff = a
        .channels()
        .iter()
        .zip(b.channels().iter())
        .map(|(x, y)| x.abs_diff(*y))
        .max()
        .unwrap_or(0);

    ToleranceComparison {
        matches: max_channel_diff <= tolerance,
        max_channel_diff,
    }
}

/// A comparator bound to one tolerance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColorComparator {
    tolerance: u8,
}

impl Default for ColorComparator {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ColorComparator {
    pub fn new(tolerance: u8) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> u8 {
        self.tolerance
    }

    pub fn compare(&self, a: Rgb, b: Rgb) -> ToleranceComparison {
        compare(a, b, self.tolerance)
    }

    /// Compare a hex color against a browser-serialized `rgb()` color.
    pub fn compare_hex_to_rgb(
        &self,
        hex: &str,
        rgb: &str,
    ) -> Result<ToleranceComparison, ColorFormatError> {
        Ok(self.compare(hex_to_channels(hex)?, rgb_string_to_channels(rgb)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_hex_to_channels() {
        assert_eq!(hex_to_channels("#160822"), Ok(Rgb::new(22, 8, 34)));
        assert_eq!(hex_to_channels("FFFFFF"), Ok(Rgb::new(255, 255, 255)));
    }

    #[test]
    fn test_hex_requires_six_digits() {
        for bad in ["#fff", "#16082280", "", "#", "#12345g", "#+12345", "#ééé"] {
            assert!(
                matches!(hex_to_channels(bad), Err(ColorFormatError::InvalidHex(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_rgb_string_to_channels() {
        assert_eq!(rgb_string_to_channels("rgb(22, 8, 34)"), Ok(Rgb::new(22, 8, 34)));
        assert_eq!(
            rgb_string_to_channels("rgba(22, 8, 34, 0.5)"),
            Ok(Rgb::new(22, 8, 34))
        );
        assert_eq!(rgb_string_to_channels("rgb(0,0,0)"), Ok(Rgb::new(0, 0, 0)));
    }

    #[test]
    fn test_rgb_string_format_errors() {
        for bad in ["rgb(22, 8)", "hsl(1, 2%, 3%)", "rgb(256, 0, 0)", "rgb(a, b, c)", "#160822"] {
            assert!(
                matches!(rgb_string_to_channels(bad), Err(ColorFormatError::InvalidRgb(_))),
                "{bad}"
            );
        }
    }

    #[test]
    fn test_compare_exact_match() {
        let result = compare(
            hex_to_channels("#160822").unwrap(),
            rgb_string_to_channels("rgb(22, 8, 34)").unwrap(),
            2,
        );
        assert!(result.matches);
        assert_eq!(result.max_channel_diff, 0);
    }

    #[test]
    fn test_compare_mismatch() {
        let result = compare(
            hex_to_channels("#160822").unwrap(),
            rgb_string_to_channels("rgb(30, 20, 40)").unwrap(),
            2,
        );
        assert!(!result.matches);
        assert_eq!(result.max_channel_diff, 12);
    }

    #[test]
    fn test_compare_within_tolerance() {
        let result = ColorComparator::default()
            .compare_hex_to_rgb("#160822", "rgb(24, 6, 34)")
            .unwrap();
        assert!(result.matches);
        assert_eq!(result.max_channel_diff, 2);
    }

    #[test]
    fn test_rgb_formatting() {
        let rgb = Rgb::new(22, 8, 34);
        assert_eq!(rgb.to_hex(), "#160822");
        assert_eq!(rgb.to_css(), "rgb(22, 8, 34)");
        assert_eq!(rgb.to_string(), "RGB(22, 8, 34)");
    }

    fn rgb() -> impl Strategy<Value = Rgb> {
        (any::<u8>(), any::<u8>(), any::<u8>()).prop_map(|(r, g, b)| Rgb::new(r, g, b))
    }

    proptest! {
        #[test]
        fn prop_hex_round_trip(color in rgb()) {
            prop_assert_eq!(hex_to_channels(&color.to_hex()), Ok(color));
        }

        #[test]
        fn prop_rgb_string_round_trip(color in rgb()) {
            prop_assert_eq!(rgb_string_to_channels(&color.to_css()), Ok(color));
        }

        #[test]
        fn prop_compare_symmetric(a in rgb(), b in rgb(), t in any::<u8>()) {
            prop_assert_eq!(compare(a, b, t), compare(b, a, t));
        }

        #[test]
        fn prop_compare_monotonic(a in rgb(), b in rgb(), t in 0u8..=254, bump in 1u8..=255) {
            let raised = t.saturating_add(bump);
            if compare(a, b, t).matches {
                prop_assert!(compare(a, b, raised).matches);
            }
        }

        #[test]
        fn prop_identical_colors_match_at_zero(a in rgb()) {
            let result = compare(a, a, 0);
            prop_assert!(result.matches);
            prop_assert_eq!(result.max_channel_diff, 0);
        }
    }
}
