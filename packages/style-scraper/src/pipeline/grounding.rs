//! Palette grounding.
//!
//! Checks each palette color against the colors actually observed on the
//! page. A color with no observed counterpart within tolerance is likely
//! invented by the analyst.

use serde::Serialize;

use crate::color::{ColorComparator, ColorValue};
use crate::types::page::ScrapedPage;
use crate::types::style::ColorPalette;

/// Grounding of one palette slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorGrounding {
    /// Palette field name
    pub field: &'static str,

    /// Palette value as written
    pub value: String,

    /// Closest observed color, if any could be compared
    pub nearest: Option<String>,

    /// Channel difference to `nearest`
    pub max_channel_diff: Option<u8>,

    pub grounded: bool,
}

/// Grounding of the whole palette.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaletteGrounding {
    pub entries: Vec<ColorGrounding>,
}

impl PaletteGrounding {
    pub fn is_fully_grounded(&self) -> bool {
        self.entries.iter().all(|e| e.grounded)
    }

    pub fn ungrounded_fields(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|e| !e.grounded)
            .map(|e| e.field.to_string())
            .collect()
    }
}

/// Compare every palette color against every observed page color.
pub fn ground_palette(
    palette: &ColorPalette,
    page: &ScrapedPage,
    comparator: &ColorComparator,
) -> PaletteGrounding {
    let observed: Vec<(&str, _)> = page
        .observed_colors()
        .into_iter()
        .filter_map(|text| {
            let color = ColorValue::parse(text.trim())?;
            if color.is_transparent() {
                return None;
            }
            Some((text, color.channels()?))
        })
        .collect();

    let entries = palette
        .entries()
        .into_iter()
        .map(|(field, value)| {
            let nearest = value.channels().and_then(|channels| {
                observed
                    .iter()
                    .map(|(text, seen)| (*text, comparator.compare(channels, *seen)))
                    .min_by_key(|(_, result)| result.max_channel_diff)
            });

            ColorGrounding {
                field,
                value: value.as_str().to_string(),
                nearest: nearest.map(|(text, _)| text.to_string()),
                max_channel_diff: nearest.map(|(_, result)| result.max_channel_diff),
                grounded: nearest.is_some_and(|(_, result)| result.matches),
            }
        })
        .collect();

    PaletteGrounding { entries }
}
