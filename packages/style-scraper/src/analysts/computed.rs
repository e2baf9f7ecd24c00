//! Deterministic analyst built on computed styles.
//!
//! Produces a loosely-typed record the pipeline pushes through schema
//! validation, the same path model-backed analysts take.

use async_trait::async_trait;
use chrono::Utc;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::color::ColorValue;
use crate::error::ExtractionResult;
use crate::extractors::html::normalize_color;
use crate::traits::analyst::{AnalysisOutput, StyleAnalyst};
use crate::types::page::ScrapedPage;

/// Tone and style when no classifier is involved.
pub const UNCLASSIFIED: &str = "unclassified";

const FALLBACK_FONT: &str = "serif";
const FALLBACK_BACKGROUND: &str = "#ffffff";
const FALLBACK_TEXT: &str = "#000000";

/// Where to look for one palette slot: custom property name fragments first,
/// then `(selector, property)` pairs.
struct SlotSources {
    name: &'static str,
    variable_hints: &'static [&'static str],
    elements: &'static [(&'static str, &'static str)],
    fallback: Option<&'static str>,
}

const PALETTE_SOURCES: [SlotSources; 5] = [
    SlotSources {
        name: "primary",
        variable_hints: &["primary", "brand"],
        elements: &[
            ("header", "backgroundColor"),
            ("button", "backgroundColor"),
            ("a", "color"),
            ("h1", "color"),
        ],
        fallback: None,
    },
    SlotSources {
        name: "secondary",
        variable_hints: &["secondary"],
        elements: &[("nav", "backgroundColor"), ("h1", "color"), ("a", "color")],
        fallback: None,
    },
    SlotSources {
        name: "accent",
        variable_hints: &["accent", "highlight"],
        elements: &[("button", "backgroundColor"), ("a", "color")],
        fallback: None,
    },
    SlotSources {
        name: "background",
        variable_hints: &["background", "bg"],
        elements: &[("body", "backgroundColor")],
        fallback: Some(FALLBACK_BACKGROUND),
    },
    SlotSources {
        name: "text",
        variable_hints: &["text", "foreground"],
        elements: &[("body", "color")],
        fallback: Some(FALLBACK_TEXT),
    },
];

/// Analyst that reads the palette, typography and metadata straight off the
/// scraped page.
#[derive(Debug, Clone, Copy, Default)]
pub struct ComputedStyleAnalyst;

impl ComputedStyleAnalyst {
    pub fn new() -> Self {
        Self
    }

    /// Build the record for a page.
    pub fn record(&self, page: &ScrapedPage) -> Map<String, Value> {
        let host = page.host();

        let mut record = Map::new();
        record.insert("event_id".into(), json!(event_slug(host.as_deref(), &page.url)));
        record.insert(
            "event_name".into(),
            json!(page.title().or(host).unwrap_or_else(|| page.url.clone())),
        );
        record.insert("source_url".into(), json!(page.url));
        record.insert("colors".into(), Value::Object(palette(page)));
        record.insert("typography".into(), Value::Object(typography(page)));
        record.insert("brand_voice".into(), Value::Object(brand_voice(page)));
        record.insert("logo_url".into(), json!(page.assets.logo));
        record.insert("favicon_url".into(), json!(page.assets.favicon));
        record.insert("scraped_at".into(), json!(Utc::now().to_rfc3339()));
        record
    }
}

#[async_trait]
impl StyleAnalyst for ComputedStyleAnalyst {
    async fn analyze(&self, page: &ScrapedPage) -> ExtractionResult<AnalysisOutput> {
        let record = self.record(page);
        debug!(url = %page.url, fields = record.len(), "Computed-style record built");
        Ok(AnalysisOutput::Mapping(record))
    }

    fn name(&self) -> &str {
        "computed-style"
    }
}

/// `www.Event-Tech.live` becomes `event-tech-live`.
pub fn event_slug(host: Option<&str>, url: &str) -> String {
    let source = host.unwrap_or(url).to_ascii_lowercase();
    let source = source.strip_prefix("www.").unwrap_or(&source);

    let mut slug = String::with_capacity(source.len());
    for c in source.chars() {
        if c.is_ascii_alphanumeric() {
            slug.push(c);
        } else if !slug.ends_with('-') {
            slug.push('-');
        }
    }
    let slug = slug.trim_matches('-');
    if slug.is_empty() {
        "event".to_string()
    } else {
        slug.to_string()
    }
}

/// Opaque colors as `#rrggbb`; transparent and unrecognized values yield `None`.
fn to_hex(value: &str) -> Option<String> {
    let color = ColorValue::parse(&normalize_color(value)?)?;
    if color.is_transparent() {
        return None;
    }
    Some(color.channels()?.to_hex())
}

fn from_variables(page: &ScrapedPage, hints: &[&str]) -> Option<String> {
    hints.iter().find_map(|hint| {
        page.css_variables
            .iter()
            .filter(|(name, _)| name.to_ascii_lowercase().contains(hint))
            .find_map(|(_, value)| to_hex(value))
    })
}

fn from_elements(page: &ScrapedPage, elements: &[(&str, &str)]) -> Option<String> {
    elements.iter().find_map(|(selector, property)| {
        page.computed_style(selector)
            .and_then(|style| style.property(property))
            .and_then(to_hex)
    })
}

fn palette(page: &ScrapedPage) -> Map<String, Value> {
    let mut colors = Map::new();
    for slot in &PALETTE_SOURCES {
        let value = from_variables(page, slot.variable_hints)
            .or_else(|| from_elements(page, slot.elements))
            .or_else(|| slot.fallback.map(str::to_string));
        // Missing slots are left out so validation names them
        if let Some(value) = value {
            colors.insert(slot.name.into(), json!(value));
        }
    }
    colors
}

fn typography(page: &ScrapedPage) -> Map<String, Value> {
    let body = page.computed_style("body");
    let h1 = page.computed_style("h1");

    let body_font = body
        .and_then(|s| s.font_family.clone())
        .unwrap_or_else(|| FALLBACK_FONT.to_string());
    let heading_font = h1
        .and_then(|s| s.font_family.clone())
        .unwrap_or_else(|| body_font.clone());

    let mut typography = Map::new();
    typography.insert("heading_font".into(), json!(heading_font));
    typography.insert("body_font".into(), json!(body_font));
    if let Some(size) = h1.and_then(|s| s.font_size.as_deref()) {
        typography.insert("heading_size".into(), json!(size));
    }
    if let Some(size) = body.and_then(|s| s.font_size.as_deref()) {
        typography.insert("body_size".into(), json!(size));
    }
    if let Some(line_height) = body
        .and_then(|s| s.line_height.as_deref())
        .filter(|lh| *lh != "normal")
    {
        typography.insert("line_height".into(), json!(line_height));
    }
    typography
}

fn brand_voice(page: &ScrapedPage) -> Map<String, Value> {
    let keywords: Vec<String> = page
        .meta_content("keywords")
        .map(|content| {
            content
                .split(',')
                .map(str::trim)
                .filter(|k| !k.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default();

    let mut voice = Map::new();
    voice.insert("tone".into(), json!(UNCLASSIFIED));
    voice.insert("keywords".into(), json!(keywords));
    voice.insert("style".into(), json!(UNCLASSIFIED));
    voice
}
