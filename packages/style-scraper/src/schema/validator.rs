//! Turns an untyped JSON record into an [`EventStyleConfig`].
//!
//! The walk never stops at the first problem: every missing field, wrong
//! type, bad color and unknown top-level key is collected so the caller sees
//! the whole picture in one pass.

use serde_json::{Map, Value};
use tracing::debug;

use crate::color::ColorValue;
use crate::error::{ValidationError, ValidationErrors};
use crate::types::style::{
    BrandVoice, ColorPalette, EventStyleConfig, LayoutConfig, Typography, DEFAULT_BODY_SIZE,
    DEFAULT_BORDER_RADIUS, DEFAULT_CONTAINER_WIDTH, DEFAULT_GRID_SYSTEM, DEFAULT_HEADING_SIZE,
    DEFAULT_LINE_HEIGHT, DEFAULT_SPACING_UNIT,
};

/// Top-level keys of the closed schema, in serialization order.
pub const TOP_LEVEL_FIELDS: [&str; 10] = [
    "event_id",
    "event_name",
    "source_url",
    "colors",
    "typography",
    "brand_voice",
    "layout",
    "logo_url",
    "favicon_url",
    "scraped_at",
];

/// Validates records against the event style schema.
#[derive(Debug, Clone, Copy, Default)]
pub struct StyleSchemaValidator;

impl StyleSchemaValidator {
    pub fn new() -> Self {
        Self
    }

    /// Validate a JSON value. Returns the typed config or every violation found.
    pub fn validate(&self, raw: &Value) -> Result<EventStyleConfig, ValidationErrors> {
        let Some(record) = raw.as_object() else {
            return Err(ValidationErrors::single(ValidationError::NotAnObject));
        };

        let mut walk = Walk::default();

        let unknown: Vec<String> = record
            .keys()
            .filter(|key| !TOP_LEVEL_FIELDS.contains(&key.as_str()))
            .cloned()
            .collect();
        if !unknown.is_empty() {
            walk.errors.push(ValidationError::UnknownFields(unknown));
        }

        let event_id = walk.required_string(record, "event_id", "event_id");
        let event_name = walk.required_string(record, "event_name", "event_name");
        let source_url = walk.required_string(record, "source_url", "source_url");

        let colors = walk
            .required_object(record, "colors", "colors")
            .and_then(|section| walk.palette(section));
        let typography = walk
            .required_object(record, "typography", "typography")
            .and_then(|section| walk.typography(section));
        let brand_voice = walk
            .required_object(record, "brand_voice", "brand_voice")
            .and_then(|section| walk.brand_voice(section));

        let layout = match record.get("layout") {
            None => Some(Some(LayoutConfig::default())),
            Some(Value::Null) => Some(None),
            Some(Value::Object(section)) => walk.layout(section).map(Some),
            Some(_) => {
                walk.wrong_type("layout", "an object or null");
                None
            }
        };

        let logo_url = walk.optional_string(record, "logo_url", "logo_url");
        let favicon_url = walk.optional_string(record, "favicon_url", "favicon_url");
        let scraped_at = walk.optional_string(record, "scraped_at", "scraped_at");

        if !walk.errors.is_empty() {
            debug!(errors = walk.errors.len(), "Record failed schema validation");
            return Err(ValidationErrors::new(walk.errors));
        }

        match (
            event_id,
            event_name,
            source_url,
            colors,
            typography,
            brand_voice,
            layout,
            logo_url,
            favicon_url,
            scraped_at,
        ) {
            (
                Some(event_id),
                Some(event_name),
                Some(source_url),
                Some(colors),
                Some(typography),
                Some(brand_voice),
                Some(layout),
                Some(logo_url),
                Some(favicon_url),
                Some(scraped_at),
            ) => Ok(EventStyleConfig {
                event_id,
                event_name,
                source_url,
                colors,
                typography,
                brand_voice,
                layout,
                logo_url,
                favicon_url,
                scraped_at,
            }),
            // Every None above pushed an error, so this is unreachable in practice.
            _ => Err(ValidationErrors::single(ValidationError::NotAnObject)),
        }
    }

    /// Parse text as JSON, then validate.
    pub fn validate_json(&self, text: &str) -> Result<EventStyleConfig, ValidationErrors> {
        let value: Value = serde_json::from_str(text)
            .map_err(|e| ValidationErrors::single(ValidationError::InvalidJson(e.to_string())))?;
        self.validate(&value)
    }
}

/// Error accumulator for one validation pass.
#[derive(Default)]
struct Walk {
    errors: Vec<ValidationError>,
}

impl Walk {
    fn missing(&mut self, path: &str) {
        self.errors.push(ValidationError::MissingField(path.to_string()));
    }

    fn wrong_type(&mut self, path: &str, expected: &'static str) {
        self.errors.push(ValidationError::WrongType {
            path: path.to_string(),
            expected,
        });
    }

    fn required_string(&mut self, section: &Map<String, Value>, key: &str, path: &str) -> Option<String> {
        match section.get(key) {
            None | Some(Value::Null) => {
                self.missing(path);
                None
            }
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.wrong_type(path, "a string");
                None
            }
        }
    }

    /// Returns `Some(None)` when absent or null, `None` on a type error.
    fn optional_string(
        &mut self,
        section: &Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<Option<String>> {
        match section.get(key) {
            None | Some(Value::Null) => Some(None),
            Some(Value::String(s)) => Some(Some(s.clone())),
            Some(_) => {
                self.wrong_type(path, "a string or null");
                None
            }
        }
    }

    /// A string with a default when absent. Explicit null is a type error.
    fn defaulted_string(
        &mut self,
        section: &Map<String, Value>,
        key: &str,
        path: &str,
        default: &str,
    ) -> Option<String> {
        match section.get(key) {
            None => Some(default.to_string()),
            Some(Value::String(s)) => Some(s.clone()),
            Some(_) => {
                self.wrong_type(path, "a string");
                None
            }
        }
    }

    fn required_object<'a>(
        &mut self,
        section: &'a Map<String, Value>,
        key: &str,
        path: &str,
    ) -> Option<&'a Map<String, Value>> {
        match section.get(key) {
            None | Some(Value::Null) => {
                self.missing(path);
                None
            }
            Some(Value::Object(map)) => Some(map),
            Some(_) => {
                self.wrong_type(path, "an object");
                None
            }
        }
    }

    fn color(&mut self, section: &Map<String, Value>, key: &str) -> Option<ColorValue> {
        let path = format!("colors.{key}");
        let text = self.required_string(section, key, &path)?;
        match ColorValue::parse(&text) {
            Some(color) => Some(color),
            None => {
                self.errors.push(ValidationError::InvalidColor { path, value: text });
                None
            }
        }
    }

    fn palette(&mut self, section: &Map<String, Value>) -> Option<ColorPalette> {
        let primary = self.color(section, "primary");
        let secondary = self.color(section, "secondary");
        let accent = self.color(section, "accent");
        let background = self.color(section, "background");
        let text = self.color(section, "text");

        Some(ColorPalette {
            primary: primary?,
            secondary: secondary?,
            accent: accent?,
            background: background?,
            text: text?,
        })
    }

    fn typography(&mut self, section: &Map<String, Value>) -> Option<Typography> {
        let heading_font = self.required_string(section, "heading_font", "typography.heading_font");
        let body_font = self.required_string(section, "body_font", "typography.body_font");
        let heading_size = self.defaulted_string(
            section,
            "heading_size",
            "typography.heading_size",
            DEFAULT_HEADING_SIZE,
        );
        let body_size =
            self.defaulted_string(section, "body_size", "typography.body_size", DEFAULT_BODY_SIZE);
        let line_height = self.defaulted_string(
            section,
            "line_height",
            "typography.line_height",
            DEFAULT_LINE_HEIGHT,
        );

        Some(Typography {
            heading_font: heading_font?,
            body_font: body_font?,
            heading_size: heading_size?,
            body_size: body_size?,
            line_height: line_height?,
        })
    }

    fn brand_voice(&mut self, section: &Map<String, Value>) -> Option<BrandVoice> {
        let tone = self.required_string(section, "tone", "brand_voice.tone");
        let style = self.required_string(section, "style", "brand_voice.style");
        let keywords = self.keywords(section);
        let personality =
            self.optional_string(section, "personality", "brand_voice.personality");

        Some(BrandVoice {
            tone: tone?,
            keywords: keywords?,
            style: style?,
            personality: personality?,
        })
    }

    fn keywords(&mut self, section: &Map<String, Value>) -> Option<Vec<String>> {
        let items = match section.get("keywords") {
            None => return Some(Vec::new()),
            Some(Value::Array(items)) => items,
            Some(_) => {
                self.wrong_type("brand_voice.keywords", "an array of strings");
                return None;
            }
        };

        let mut keywords = Vec::with_capacity(items.len());
        let mut valid = true;
        for (i, item) in items.iter().enumerate() {
            match item.as_str() {
                Some(keyword) => keywords.push(keyword.to_string()),
                None => {
                    self.wrong_type(&format!("brand_voice.keywords[{i}]"), "a string");
                    valid = false;
                }
            }
        }
        valid.then_some(keywords)
    }

    fn layout(&mut self, section: &Map<String, Value>) -> Option<LayoutConfig> {
        let grid_system = self.defaulted_string(
            section,
            "grid_system",
            "layout.grid_system",
            DEFAULT_GRID_SYSTEM,
        );
        let spacing_unit = self.defaulted_string(
            section,
            "spacing_unit",
            "layout.spacing_unit",
            DEFAULT_SPACING_UNIT,
        );
        let border_radius = self.defaulted_string(
            section,
            "border_radius",
            "layout.border_radius",
            DEFAULT_BORDER_RADIUS,
        );
        let container_width = self.defaulted_string(
            section,
            "container_width",
            "layout.container_width",
            DEFAULT_CONTAINER_WIDTH,
        );

        Some(LayoutConfig {
            grid_system: grid_system?,
            spacing_unit: spacing_unit?,
            border_radius: border_radius?,
            container_width: container_width?,
        })
    }
}
