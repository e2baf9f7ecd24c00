//! Raw material returned by an extractor.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ExtractionError, ExtractionResult};
use crate::extractors::html::StyledDocument;

/// Computed style properties of one element.
///
/// Field names follow the browser's `getComputedStyle` camelCase keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ComputedStyle {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background_color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<String>,
}

impl ComputedStyle {
    /// Look up a property by camelCase or kebab-case name.
    pub fn property(&self, name: &str) -> Option<&str> {
        let value = match name {
            "backgroundColor" | "background-color" => &self.background_color,
            "color" => &self.color,
            "fontFamily" | "font-family" => &self.font_family,
            "fontSize" | "font-size" => &self.font_size,
            "lineHeight" | "line-height" => &self.line_height,
            _ => return None,
        };
        value.as_deref()
    }

    /// Set a property by camelCase or kebab-case name. Unknown names are ignored.
    pub fn set_property(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "backgroundColor" | "background-color" => &mut self.background_color,
            "color" => &mut self.color,
            "fontFamily" | "font-family" => &mut self.font_family,
            "fontSize" | "font-size" => &mut self.font_size,
            "lineHeight" | "line-height" => &mut self.line_height,
            _ => return false,
        };
        *slot = Some(value.into());
        true
    }

    /// Color-valued properties that are set.
    pub fn colors(&self) -> impl Iterator<Item = &str> {
        [&self.background_color, &self.color]
            .into_iter()
            .filter_map(|c| c.as_deref())
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// Brand assets discovered on the page.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageAssets {
    pub logo: Option<String>,
    pub favicon: Option<String>,
}

/// Everything an extractor collected from a single page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScrapedPage {
    /// URL the content was fetched from (after redirects)
    pub url: String,

    /// Raw HTML
    pub html: String,

    /// Computed styles keyed by selector, in the order they were sampled
    pub computed_styles: IndexMap<String, ComputedStyle>,

    /// Custom properties declared on `:root`, keyed with their `--` prefix
    pub css_variables: IndexMap<String, String>,

    pub assets: PageAssets,

    pub success: bool,
}

impl ScrapedPage {
    /// Create an empty, successful page.
    pub fn new(url: impl Into<String>, html: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            html: html.into(),
            computed_styles: IndexMap::new(),
            css_variables: IndexMap::new(),
            assets: PageAssets::default(),
            success: true,
        }
    }

    /// Build a page by statically resolving styles from HTML and inline CSS.
    pub fn from_html(url: impl Into<String>, html: impl Into<String>) -> Self {
        let url = url.into();
        let html = html.into();

        let document = StyledDocument::parse(&html);
        let css_variables = document.variables().clone();
        let computed_styles = document.computed_styles();
        let assets = document.assets(&url);

        Self {
            url,
            html,
            computed_styles,
            css_variables,
            assets,
            success: true,
        }
    }

    pub fn with_style(mut self, selector: impl Into<String>, style: ComputedStyle) -> Self {
        self.computed_styles.insert(selector.into(), style);
        self
    }

    pub fn with_variable(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.css_variables.insert(name.into(), value.into());
        self
    }

    pub fn with_assets(mut self, assets: PageAssets) -> Self {
        self.assets = assets;
        self
    }

    pub fn with_success(mut self, success: bool) -> Self {
        self.success = success;
        self
    }

    /// Contents of the `<title>` element.
    pub fn title(&self) -> Option<String> {
        StyledDocument::parse(&self.html).title()
    }

    /// Contents of `<meta name="...">`.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        StyledDocument::parse(&self.html).meta_content(name)
    }

    /// Style sampled at extraction time under exactly this selector.
    pub fn computed_style(&self, selector: &str) -> Option<&ComputedStyle> {
        self.computed_styles.get(selector)
    }

    /// Style of the first element matching any CSS selector.
    ///
    /// Sampled styles are used when the selector was sampled; otherwise the
    /// HTML is inspected.
    pub fn style_for(&self, selector: &str) -> ExtractionResult<ComputedStyle> {
        if let Some(style) = self.computed_styles.get(selector) {
            return Ok(style.clone());
        }
        StyledDocument::parse(&self.html)
            .computed_style(selector)?
            .ok_or_else(|| ExtractionError::ElementNotFound {
                selector: selector.to_string(),
            })
    }

    /// Every color observed on the page: computed style colors followed by
    /// CSS variable values.
    pub fn observed_colors(&self) -> Vec<&str> {
        self.computed_styles
            .values()
            .flat_map(|style| style.colors())
            .chain(self.css_variables.values().map(String::as_str))
            .collect()
    }

    /// Hostname of the page URL.
    pub fn host(&self) -> Option<String> {
        url::Url::parse(&self.url)
            .ok()
            .and_then(|u| u.host_str().map(str::to_string))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_lookup_accepts_both_spellings() {
        let style = ComputedStyle {
            background_color: Some("rgb(22, 8, 34)".into()),
            ..Default::default()
        };
        assert_eq!(style.property("backgroundColor"), Some("rgb(22, 8, 34)"));
        assert_eq!(style.property("background-color"), Some("rgb(22, 8, 34)"));
        assert_eq!(style.property("color"), None);
        assert_eq!(style.property("margin"), None);
    }

    #[test]
    fn test_set_property() {
        let mut style = ComputedStyle::default();
        assert!(style.set_property("font-size", "16px"));
        assert!(!style.set_property("margin", "0"));
        assert_eq!(style.font_size.as_deref(), Some("16px"));
    }

    #[test]
    fn test_computed_style_serde_uses_camel_case() {
        let style = ComputedStyle {
            background_color: Some("rgb(0, 0, 0)".into()),
            font_family: Some("Inter".into()),
            ..Default::default()
        };
        let json = serde_json::to_value(&style).unwrap();
        assert_eq!(json["backgroundColor"], "rgb(0, 0, 0)");
        assert_eq!(json["fontFamily"], "Inter");
        assert!(json.get("color").is_none());
    }

    #[test]
    fn test_style_for_any_selector() {
        let html = r#"<html><head><style>.hero { background-color: #160822; }</style></head>
            <body><div class="hero">Summit</div></body></html>"#;
        let page = ScrapedPage::from_html("https://example.com", html);

        assert!(page.computed_style(".hero").is_none());
        for selector in [".hero", "div.hero"] {
            let style = page.style_for(selector).unwrap();
            assert_eq!(style.background_color.as_deref(), Some("rgb(22, 8, 34)"));
        }
        assert!(matches!(
            page.style_for("#missing"),
            Err(ExtractionError::ElementNotFound { .. })
        ));
    }

    #[test]
    fn test_from_html_ignores_markup_in_script_strings() {
        let html = r#"<html><head>
            <script>var t = "<style>body{background-color:red}</style>";</script>
            </head><body><img alt="Home > Logo" src="/logo.png"></body></html>"#;
        let page = ScrapedPage::from_html("https://example.com/", html);

        assert_eq!(
            page.computed_style("body").and_then(|s| s.background_color.as_deref()),
            Some("rgba(0, 0, 0, 0)")
        );
        assert_eq!(page.assets.logo.as_deref(), Some("https://example.com/logo.png"));
    }

    #[test]
    fn test_observed_colors() {
        let page = ScrapedPage::new("https://example.com", "")
            .with_style(
                "body",
                ComputedStyle {
                    background_color: Some("rgb(255, 255, 255)".into()),
                    color: Some("rgb(0, 0, 0)".into()),
                    ..Default::default()
                },
            )
            .with_variable("--brand", "#160822");

        assert_eq!(
            page.observed_colors(),
            ["rgb(255, 255, 255)", "rgb(0, 0, 0)", "#160822"]
        );
    }

    #[test]
    fn test_host() {
        let page = ScrapedPage::new("https://www.eventtechlive.com/agenda", "");
        assert_eq!(page.host().as_deref(), Some("www.eventtechlive.com"));
    }
}
