//! Color values tagged by the grammar that matched them.

use regex::Regex;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;
use std::sync::LazyLock;

use super::tolerance::{hex_to_channels, Rgb};
use crate::error::ColorFormatError;

// Hex format (#RGB, #RRGGBB, #RRGGBBAA)
static HEX_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^#([A-Fa-f0-9]{3}|[A-Fa-f0-9]{6}|[A-Fa-f0-9]{8})$").expect("hex pattern is valid")
});

static RGB_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^rgba?\(\s*(\d+)\s*,\s*(\d+)\s*,\s*(\d+)\s*(?:,\s*([\d.]+)\s*)?\)$")
        .expect("rgb pattern is valid")
});

static HSL_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^hsla?\(\s*(\d+)\s*,\s*(\d+)%\s*,\s*(\d+)%\s*(?:,\s*([\d.]+)\s*)?\)$")
        .expect("hsl pattern is valid")
});

/// The grammar a color matched, with its channel values.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ColorNotation {
    /// `#` followed by 3, 6 or 8 hex digits (stored without the `#`)
    Hex { digits: String },

    /// `rgb()` / `rgba()` with integer channels
    Rgb {
        red: u32,
        green: u32,
        blue: u32,
        alpha: Option<String>,
    },

    /// `hsl()` / `hsla()` with integer hue and percentage saturation/lightness
    Hsl {
        hue: u32,
        saturation: u32,
        lightness: u32,
        alpha: Option<String>,
    },
}

/// A CSS color accepted by the schema.
///
/// Keeps the original text so serialization round-trips exactly.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ColorValue {
    text: String,
    notation: ColorNotation,
}

impl ColorValue {
    /// Match `text` against hex, rgb and hsl in that order. First match wins.
    pub fn parse(text: &str) -> Option<Self> {
        let notation = parse_hex(text)
            .or_else(|| parse_rgb(text))
            .or_else(|| parse_hsl(text))?;
        Some(Self {
            text: text.to_string(),
            notation,
        })
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn notation(&self) -> &ColorNotation {
        &self.notation
    }

    /// Alpha in `0.0..=1.0` when the color carries one.
    pub fn alpha(&self) -> Option<f64> {
        match &self.notation {
            ColorNotation::Hex { digits } if digits.len() == 8 => {
                u8::from_str_radix(&digits[6..8], 16)
                    .ok()
                    .map(|a| f64::from(a) / 255.0)
            }
            ColorNotation::Hex { .. } => None,
            ColorNotation::Rgb { alpha, .. } | ColorNotation::Hsl { alpha, .. } => {
                alpha.as_deref().and_then(|a| a.parse().ok())
            }
        }
    }

    /// Fully transparent colors carry no visual information.
    pub fn is_transparent(&self) -> bool {
        self.alpha() == Some(0.0)
    }

    /// Convert to RGB channels for comparison.
    ///
    /// Returns `None` for rgb() channels outside 0-255.
    pub fn channels(&self) -> Option<Rgb> {
        match &self.notation {
            ColorNotation::Hex { digits } => {
                let six = match digits.len() {
                    3 => digits.chars().flat_map(|c| [c, c]).collect::<String>(),
                    _ => digits[..6].to_string(),
                };
                hex_to_channels(&six).ok()
            }
            ColorNotation::Rgb {
                red, green, blue, ..
            } => Some(Rgb::new(
                u8::try_from(*red).ok()?,
                u8::try_from(*green).ok()?,
                u8::try_from(*blue).ok()?,
            )),
            ColorNotation::Hsl {
                hue,
                saturation,
                lightness,
                ..
            } => Some(hsl_to_rgb(*hue, *saturation, *lightness)),
        }
    }
}

fn parse_hex(text: &str) -> Option<ColorNotation> {
    let caps = HEX_PATTERN.captures(text)?;
    Some(ColorNotation::Hex {
        digits: caps[1].to_string(),
    })
}

fn parse_rgb(text: &str) -> Option<ColorNotation> {
    let caps = RGB_PATTERN.captures(text)?;
    Some(ColorNotation::Rgb {
        red: caps[1].parse().ok()?,
        green: caps[2].parse().ok()?,
        blue: caps[3].parse().ok()?,
        alpha: caps.get(4).map(|m| m.as_str().to_string()),
    })
}

fn parse_hsl(text: &str) -> Option<ColorNotation> {
    let caps = HSL_PATTERN.captures(text)?;
    Some(ColorNotation::Hsl {
        hue: caps[1].parse().ok()?,
        saturation: caps[2].parse().ok()?,
        lightness: caps[3].parse().ok()?,
        alpha: caps.get(4).map(|m| m.as_str().to_string()),
    })
}

fn hsl_to_rgb(hue: u32, saturation: u32, lightness: u32) -> Rgb {
    let h = f64::from(hue % 360) / 360.0;
    let s = f64::from(saturation.min(100)) / 100.0;
    let l = f64::from(lightness.min(100)) / 100.0;

    let to_u8 = |v: f64| (v * 255.0).round().clamp(0.0, 255.0) as u8;

    if s == 0.0 {
        let v = to_u8(l);
        return Rgb::new(v, v, v);
    }

    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    let channel = |t: f64| {
        let t = t.rem_euclid(1.0);
        if t < 1.0 / 6.0 {
            p + (q - p) * 6.0 * t
        } else if t < 0.5 {
            q
        } else if t < 2.0 / 3.0 {
            p + (q - p) * (2.0 / 3.0 - t) * 6.0
        } else {
            p
        }
    };

    Rgb::new(
        to_u8(channel(h + 1.0 / 3.0)),
        to_u8(channel(h)),
        to_u8(channel(h - 1.0 / 3.0)),
    )
}

impl FromStr for ColorValue {
    type Err = ColorFormatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s).ok_or_else(|| ColorFormatError::Unrecognized(s.to_string()))
    }
}

impl fmt::Display for ColorValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl Serialize for ColorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for ColorValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
