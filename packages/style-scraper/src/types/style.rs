//! The canonical event style configuration.
//!
//! Instances are produced by [`StyleSchemaValidator`](crate::schema::StyleSchemaValidator)
//! or built directly by typed collaborators. Serialization order is fixed, so
//! exporting the same value twice yields identical bytes.

use serde::Serialize;

use crate::color::ColorValue;

pub const DEFAULT_HEADING_SIZE: &str = "2rem";
pub const DEFAULT_BODY_SIZE: &str = "1rem";
pub const DEFAULT_LINE_HEIGHT: &str = "1.6";

pub const DEFAULT_GRID_SYSTEM: &str = "flexbox";
pub const DEFAULT_SPACING_UNIT: &str = "8px";
pub const DEFAULT_BORDER_RADIUS: &str = "8px";
pub const DEFAULT_CONTAINER_WIDTH: &str = "1200px";

/// Color palette for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ColorPalette {
    /// Primary brand color
    pub primary: ColorValue,

    /// Secondary brand color
    pub secondary: ColorValue,

    /// Accent color for highlights
    pub accent: ColorValue,

    /// Page background color
    pub background: ColorValue,

    /// Body text color
    pub text: ColorValue,
}

impl ColorPalette {
    /// Palette slots paired with their field names, in schema order.
    pub fn entries(&self) -> [(&'static str, &ColorValue); 5] {
        [
            ("primary", &self.primary),
            ("secondary", &self.secondary),
            ("accent", &self.accent),
            ("background", &self.background),
            ("text", &self.text),
        ]
    }
}

/// Typography settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Typography {
    pub heading_font: String,
    pub body_font: String,
    pub heading_size: String,
    pub body_size: String,
    pub line_height: String,
}

impl Typography {
    /// Create typography with default sizes.
    pub fn new(heading_font: impl Into<String>, body_font: impl Into<String>) -> Self {
        Self {
            heading_font: heading_font.into(),
            body_font: body_font.into(),
            heading_size: DEFAULT_HEADING_SIZE.to_string(),
            body_size: DEFAULT_BODY_SIZE.to_string(),
            line_height: DEFAULT_LINE_HEIGHT.to_string(),
        }
    }
}

/// Brand voice and tone.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BrandVoice {
    /// Overall tone (professional, casual, energetic, ...)
    pub tone: String,

    /// Key brand keywords, in the order they were given
    pub keywords: Vec<String>,

    /// Writing style (formal, conversational, technical, ...)
    pub style: String,

    pub personality: Option<String>,
}

impl BrandVoice {
    pub fn new(tone: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            tone: tone.into(),
            keywords: Vec::new(),
            style: style.into(),
            personality: None,
        }
    }

    pub fn with_keywords(mut self, keywords: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_personality(mut self, personality: impl Into<String>) -> Self {
        self.personality = Some(personality.into());
        self
    }
}

/// Layout and spacing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LayoutConfig {
    pub grid_system: String,
    pub spacing_unit: String,
    pub border_radius: String,
    pub container_width: String,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            grid_system: DEFAULT_GRID_SYSTEM.to_string(),
            spacing_unit: DEFAULT_SPACING_UNIT.to_string(),
            border_radius: DEFAULT_BORDER_RADIUS.to_string(),
            container_width: DEFAULT_CONTAINER_WIDTH.to_string(),
        }
    }
}

/// Complete style configuration for an event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EventStyleConfig {
    /// Unique event identifier, also the artifact name
    pub event_id: String,
    pub event_name: String,
    pub source_url: String,
    pub colors: ColorPalette,
    pub typography: Typography,
    pub brand_voice: BrandVoice,
    pub layout: Option<LayoutConfig>,
    pub logo_url: Option<String>,
    pub favicon_url: Option<String>,

    /// When the page was scraped (RFC 3339)
    pub scraped_at: Option<String>,
}

impl EventStyleConfig {
    /// Create a config with the default layout and no optional metadata.
    pub fn new(
        event_id: impl Into<String>,
        event_name: impl Into<String>,
        source_url: impl Into<String>,
        colors: ColorPalette,
        typography: Typography,
        brand_voice: BrandVoice,
    ) -> Self {
        Self {
            event_id: event_id.into(),
            event_name: event_name.into(),
            source_url: source_url.into(),
            colors,
            typography,
            brand_voice,
            layout: Some(LayoutConfig::default()),
            logo_url: None,
            favicon_url: None,
            scraped_at: None,
        }
    }

    pub fn with_layout(mut self, layout: Option<LayoutConfig>) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_logo_url(mut self, url: impl Into<String>) -> Self {
        self.logo_url = Some(url.into());
        self
    }

    pub fn with_favicon_url(mut self, url: impl Into<String>) -> Self {
        self.favicon_url = Some(url.into());
        self
    }

    pub fn with_scraped_at(mut self, timestamp: impl Into<String>) -> Self {
        self.scraped_at = Some(timestamp.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn color(text: &str) -> ColorValue {
        ColorValue::parse(text).unwrap()
    }

    fn palette() -> ColorPalette {
        ColorPalette {
            primary: color("#667eea"),
            secondary: color("#764ba2"),
            accent: color("#f093fb"),
            background: color("#ffffff"),
            text: color("#1a202c"),
        }
    }

    #[test]
    fn test_typography_defaults() {
        let typography = Typography::new("Inter", "Roboto");
        assert_eq!(typography.heading_size, "2rem");
        assert_eq!(typography.body_size, "1rem");
        assert_eq!(typography.line_height, "1.6");
    }

    #[test]
    fn test_layout_defaults() {
        let layout = LayoutConfig::default();
        assert_eq!(layout.grid_system, "flexbox");
        assert_eq!(layout.spacing_unit, "8px");
        assert_eq!(layout.border_radius, "8px");
        assert_eq!(layout.container_width, "1200px");
    }

    #[test]
    fn test_serialization_field_order() {
        let config = EventStyleConfig::new(
            "event-2025",
            "TechConf 2025",
            "https://techconf.example.com",
            palette(),
            Typography::new("Inter", "Roboto"),
            BrandVoice::new("professional", "formal").with_keywords(["innovation", "networking"]),
        );

        let json = serde_json::to_value(&config).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(
            keys,
            [
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
            ]
        );
        assert_eq!(json["colors"]["primary"], "#667eea");
        assert_eq!(json["brand_voice"]["keywords"][1], "networking");
        assert!(json["logo_url"].is_null());
    }

    #[test]
    fn test_palette_entries_in_schema_order() {
        let names: Vec<&str> = palette().entries().iter().map(|(name, _)| *name).collect();
        assert_eq!(names, ["primary", "secondary", "accent", "background", "text"]);
    }
}
