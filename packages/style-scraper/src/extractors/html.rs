//! Static HTML and CSS inspection.
//!
//! Approximates what a browser would report from `getComputedStyle` using
//! only the document text. The document is parsed with `scraper`; rules from
//! `<style>` elements whose selector matches an element are applied in source
//! order, then the element's inline `style` attribute. Specificity is not
//! considered. Colors are serialized the way browsers serialize computed
//! colors (`rgb(r, g, b)` / `rgba(r, g, b, a)`).

use indexmap::IndexMap;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

use crate::color::{ColorValue, Rgb};
use crate::error::{ExtractionError, ExtractionResult};
use crate::types::page::{ComputedStyle, PageAssets};

/// Elements sampled for computed styles, in order.
pub const STYLE_SELECTORS: [&str; 6] = ["body", "header", "nav", "h1", "button", "a"];

/// Properties a [`ComputedStyle`] records.
const SAMPLED_PROPERTIES: [&str; 5] = [
    "background-color",
    "color",
    "font-family",
    "font-size",
    "line-height",
];

/// Properties that fall back to the nearest ancestor's value.
const INHERITED_PROPERTIES: [&str; 4] = ["color", "font-family", "font-size", "line-height"];

const DEFAULT_BACKGROUND: &str = "rgba(0, 0, 0, 0)";
const DEFAULT_COLOR: &str = "rgb(0, 0, 0)";

const LOGO_SELECTOR: &str =
    r#"img[alt*="logo" i], img[class*="logo" i], img[id*="logo" i], .logo img, #logo img"#;

static CSS_COMMENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("css comment pattern is valid"));

static CSS_RULE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^{}]+)\{([^{}]*)\}").expect("css rule pattern is valid"));

static VAR_REFERENCE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"var\(\s*(--[A-Za-z0-9_-]+)\s*(?:,\s*([^()]*(?:\([^()]*\))?[^()]*))?\)")
        .expect("var pattern is valid")
});

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

/// `(selector list, declaration block)` pairs in source order.
///
/// Rules nested in at-rules are returned as if they were top-level.
pub fn css_rules(css: &str) -> Vec<(String, String)> {
    let css = CSS_COMMENT.replace_all(css, "");
    CSS_RULE
        .captures_iter(&css)
        .map(|cap| (cap[1].trim().to_string(), cap[2].to_string()))
        .filter(|(selector, _)| !selector.starts_with('@'))
        .collect()
}

/// `property: value` pairs of a declaration block. Property names are
/// lowercased; `!important` is dropped.
pub fn declarations(block: &str) -> Vec<(String, String)> {
    block
        .split(';')
        .filter_map(|decl| {
            let (property, value) = decl.split_once(':')?;
            let property = property.trim();
            let value = value.trim();
            let value = value
                .strip_suffix("!important")
                .map(str::trim_end)
                .unwrap_or(value);
            if property.is_empty() || value.is_empty() {
                return None;
            }
            // Custom properties are case-sensitive
            let property = if property.starts_with("--") {
                property.to_string()
            } else {
                property.to_ascii_lowercase()
            };
            Some((property, value.to_string()))
        })
        .collect()
}

/// Replace `var(--name, fallback)` references. Unresolvable references
/// without a fallback make the whole value unresolvable.
pub fn resolve_vars(value: &str, vars: &IndexMap<String, String>) -> Option<String> {
    let mut current = value.to_string();
    // Bounded to tolerate self-referencing variables
    for _ in 0..8 {
        if !VAR_REFERENCE.is_match(&current) {
            return Some(current);
        }
        let mut unresolved = false;
        let next = VAR_REFERENCE
            .replace_all(&current, |cap: &regex::Captures<'_>| {
                let fallback = cap.get(2).map(|m| m.as_str().trim().to_string());
                match vars.get(&cap[1]).cloned().or(fallback) {
                    Some(v) => v,
                    None => {
                        unresolved = true;
                        String::new()
                    }
                }
            })
            .into_owned();
        if unresolved {
            return None;
        }
        current = next;
    }
    (!VAR_REFERENCE.is_match(&current)).then_some(current)
}

/// Serialize a CSS color the way a computed style would.
///
/// Returns `None` for values that are not a recognized color.
pub fn normalize_color(value: &str) -> Option<String> {
    let value = value.trim().to_ascii_lowercase();
    if value == "transparent" {
        return Some(DEFAULT_BACKGROUND.to_string());
    }
    if let Some(rgb) = named_color(&value) {
        return Some(rgb.to_css());
    }

    let color = ColorValue::parse(&value)?;
    let rgb = color.channels()?;
    match color.alpha() {
        Some(alpha) if alpha < 1.0 => {
            let alpha = (alpha * 1000.0).round() / 1000.0;
            Some(format!(
                "rgba({}, {}, {}, {})",
                rgb.red, rgb.green, rgb.blue, alpha
            ))
        }
        _ => Some(rgb.to_css()),
    }
}

fn named_color(name: &str) -> Option<Rgb> {
    let rgb = match name {
        "black" => Rgb::new(0, 0, 0),
        "white" => Rgb::new(255, 255, 255),
        "red" => Rgb::new(255, 0, 0),
        "green" => Rgb::new(0, 128, 0),
        "lime" => Rgb::new(0, 255, 0),
        "blue" => Rgb::new(0, 0, 255),
        "yellow" => Rgb::new(255, 255, 0),
        "orange" => Rgb::new(255, 165, 0),
        "purple" => Rgb::new(128, 0, 128),
        "navy" => Rgb::new(0, 0, 128),
        "teal" => Rgb::new(0, 128, 128),
        "maroon" => Rgb::new(128, 0, 0),
        "olive" => Rgb::new(128, 128, 0),
        "silver" => Rgb::new(192, 192, 192),
        "gray" | "grey" => Rgb::new(128, 128, 128),
        _ => return None,
    };
    Some(rgb)
}

/// First color token of a `background` shorthand.
fn background_color_token(value: &str) -> Option<String> {
    let mut depth = 0usize;
    let mut start = 0;
    let mut tokens = Vec::new();
    for (i, c) in value.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            c if c.is_whitespace() && depth == 0 => {
                tokens.push(&value[start..i]);
                start = i + c.len_utf8();
            }
            _ => {}
        }
    }
    tokens.push(&value[start..]);
    tokens
        .into_iter()
        .filter(|t| !t.is_empty())
        .find_map(normalize_color)
}

/// Apply one declaration to a style, resolving variables and colors.
fn apply_declaration(
    style: &mut ComputedStyle,
    property: &str,
    value: &str,
    vars: &IndexMap<String, String>,
) {
    let Some(value) = resolve_vars(value, vars) else {
        return;
    };
    match property {
        "background" => {
            if let Some(color) = background_color_token(&value) {
                style.background_color = Some(color);
            }
        }
        "background-color" | "color" => {
            if let Some(color) = normalize_color(&value) {
                style.set_property(property, color);
            }
        }
        p if SAMPLED_PROPERTIES.contains(&p) => {
            style.set_property(p, value);
        }
        _ => {}
    }
}

fn resolve_against(base: &str, reference: &str) -> String {
    Url::parse(base)
        .and_then(|base| base.join(reference))
        .map(|u| u.to_string())
        .unwrap_or_else(|_| reference.to_string())
}

/// A style rule whose selector the document's selector engine understands.
struct StyleRule {
    selector: Selector,
    declarations: Vec<(String, String)>,
}

/// A parsed document together with the style rules it carries.
///
/// Rules with selectors `scraper` cannot parse (pseudo-classes such as
/// `:hover`, pseudo-elements) are dropped, as a browser drops them for
/// elements at rest.
pub struct StyledDocument {
    document: Html,
    rules: Vec<StyleRule>,
    variables: IndexMap<String, String>,
}

impl StyledDocument {
    pub fn parse(html: &str) -> Self {
        let document = Html::parse_document(html);

        let mut rules = Vec::new();
        if let Some(style) = selector("style") {
            for element in document.select(&style) {
                let css: String = element.text().collect();
                for (selectors, block) in css_rules(&css) {
                    if let Some(selector) = selector(&selectors) {
                        rules.push(StyleRule {
                            selector,
                            declarations: declarations(&block),
                        });
                    }
                }
            }
        }

        let root = document.root_element();
        let mut variables = IndexMap::new();
        for rule in rules.iter().filter(|rule| rule.selector.matches(&root)) {
            for (property, value) in &rule.declarations {
                if property.starts_with("--") {
                    variables.insert(property.clone(), value.clone());
                }
            }
        }

        Self {
            document,
            rules,
            variables,
        }
    }

    /// Custom properties declared on the root element, later declarations
    /// winning.
    pub fn variables(&self) -> &IndexMap<String, String> {
        &self.variables
    }

    /// Declared values of one element, without inheritance or defaults.
    fn specified_style(&self, element: &ElementRef<'_>) -> ComputedStyle {
        let mut style = ComputedStyle::default();
        for rule in self.rules.iter().filter(|rule| rule.selector.matches(element)) {
            for (property, value) in &rule.declarations {
                apply_declaration(&mut style, property, value, &self.variables);
            }
        }
        if let Some(inline) = element.value().attr("style") {
            for (property, value) in declarations(inline) {
                apply_declaration(&mut style, &property, &value, &self.variables);
            }
        }
        style
    }

    fn style_of(&self, element: &ElementRef<'_>) -> ComputedStyle {
        let mut style = self.specified_style(element);

        let ancestors: Vec<ComputedStyle> = element
            .ancestors()
            .filter_map(ElementRef::wrap)
            .map(|ancestor| self.specified_style(&ancestor))
            .collect();
        for property in INHERITED_PROPERTIES {
            if style.property(property).is_some() {
                continue;
            }
            if let Some(value) = ancestors.iter().find_map(|a| a.property(property)) {
                let value = value.to_string();
                style.set_property(property, value);
            }
        }

        if style.background_color.is_none() {
            style.background_color = Some(DEFAULT_BACKGROUND.to_string());
        }
        if style.color.is_none() {
            style.color = Some(DEFAULT_COLOR.to_string());
        }
        style
    }

    /// Style of the first element matching a CSS selector, or `None` when
    /// nothing matches.
    pub fn computed_style(&self, css: &str) -> ExtractionResult<Option<ComputedStyle>> {
        let selector = selector(css).ok_or_else(|| ExtractionError::InvalidSelector {
            selector: css.to_string(),
        })?;
        Ok(self
            .document
            .select(&selector)
            .next()
            .map(|element| self.style_of(&element)))
    }

    /// Styles of each sampled element present in the page.
    pub fn computed_styles(&self) -> IndexMap<String, ComputedStyle> {
        STYLE_SELECTORS
            .iter()
            .filter_map(|&css| {
                let style = self.computed_style(css).ok().flatten()?;
                Some((css.to_string(), style))
            })
            .collect()
    }

    /// Logo and favicon, resolved against `base_url`.
    pub fn assets(&self, base_url: &str) -> PageAssets {
        let logo = selector(LOGO_SELECTOR).and_then(|logo| {
            self.document
                .select(&logo)
                .find_map(|img| img.value().attr("src"))
                .map(|src| resolve_against(base_url, src))
        });

        let favicon = selector("link[rel][href]").and_then(|link| {
            self.document
                .select(&link)
                .find(|el| {
                    el.value().attr("rel").is_some_and(|rel| {
                        let rel = rel.trim().to_ascii_lowercase();
                        rel == "icon" || rel == "shortcut icon"
                    })
                })
                .and_then(|el| el.value().attr("href"))
                .map(|href| resolve_against(base_url, href))
        });

        PageAssets { logo, favicon }
    }

    /// Contents of `<title>`, whitespace collapsed.
    pub fn title(&self) -> Option<String> {
        let title = selector("title")?;
        let text: String = self.document.select(&title).next()?.text().collect();
        let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
        (!text.is_empty()).then_some(text)
    }

    /// `content` of the first `<meta name="...">` with a matching name.
    pub fn meta_content(&self, name: &str) -> Option<String> {
        let meta = selector("meta[name]")?;
        self.document
            .select(&meta)
            .find(|el| {
                el.value()
                    .attr("name")
                    .is_some_and(|n| n.eq_ignore_ascii_case(name))
            })
            .and_then(|el| el.value().attr("content"))
            .map(str::to_string)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"<!DOCTYPE html>
<html>
<head>
  <title>Event Tech Live &amp; Expo</title>
  <meta name="keywords" content="events, technology, expo">
  <link rel="icon" href="/favicon.ico">
  <style>
    :root { --brand-primary: #160822; --accent: #ff3366; }
    /* body { color: red; } */
    body { background-color: #ffffff; color: #1a1a1a; font-family: "Inter", sans-serif; font-size: 16px; line-height: 1.5; }
    header, .hero { background: var(--brand-primary) url(bg.png) no-repeat; }
    h1 { color: var(--missing, #333333); font-size: 2.5rem; }
    button { background-color: var(--accent) !important; color: white; }
    button:hover { background-color: black; }
    .card .title { color: #ff3366; }
  </style>
</head>
<body>
  <header><img src="/img/logo.svg" alt="Event Tech Live Logo"></header>
  <h1 style="font-family: 'Poppins', sans-serif">Welcome</h1>
  <div class="hero" id="hero"><p>Join us</p></div>
  <section class="card"><h2 class="title">Speakers</h2></section>
  <button>Register</button>
</body>
</html>"##;

    fn document() -> StyledDocument {
        StyledDocument::parse(PAGE)
    }

    #[test]
    fn test_root_variables() {
        let doc = document();
        let vars = doc.variables();
        assert_eq!(vars.get("--brand-primary").map(String::as_str), Some("#160822"));
        assert_eq!(vars.get("--accent").map(String::as_str), Some("#ff3366"));
    }

    #[test]
    fn test_computed_styles_for_present_elements() {
        let styles = document().computed_styles();
        let selectors: Vec<&str> = styles.keys().map(String::as_str).collect();
        assert_eq!(selectors, ["body", "header", "h1", "button"]);

        let body = &styles["body"];
        assert_eq!(body.background_color.as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(body.color.as_deref(), Some("rgb(26, 26, 26)"));
        assert_eq!(body.font_family.as_deref(), Some("\"Inter\", sans-serif"));
    }

    #[test]
    fn test_shorthand_background_and_vars() {
        let styles = document().computed_styles();
        assert_eq!(
            styles["header"].background_color.as_deref(),
            Some("rgb(22, 8, 34)")
        );
        assert_eq!(
            styles["button"].background_color.as_deref(),
            Some("rgb(255, 51, 102)")
        );
        assert_eq!(styles["button"].color.as_deref(), Some("rgb(255, 255, 255)"));
    }

    #[test]
    fn test_var_fallback_inline_and_inheritance() {
        let h1 = &document().computed_styles()["h1"];
        assert_eq!(h1.color.as_deref(), Some("rgb(51, 51, 51)"));
        assert_eq!(h1.font_family.as_deref(), Some("'Poppins', sans-serif"));
        assert_eq!(h1.font_size.as_deref(), Some("2.5rem"));
        assert_eq!(h1.line_height.as_deref(), Some("1.5"));
        assert_eq!(h1.background_color.as_deref(), Some("rgba(0, 0, 0, 0)"));
    }

    #[test]
    fn test_commented_rule_ignored() {
        let body = &document().computed_styles()["body"];
        assert_ne!(body.color.as_deref(), Some("rgb(255, 0, 0)"));
    }

    #[test]
    fn test_class_id_and_compound_selectors() {
        let doc = document();
        for css in [".hero", "div.hero", "#hero", "body > div"] {
            let style = doc.computed_style(css).unwrap().unwrap();
            assert_eq!(
                style.background_color.as_deref(),
                Some("rgb(22, 8, 34)"),
                "{css}"
            );
        }

        let title = doc.computed_style(".card .title").unwrap().unwrap();
        assert_eq!(title.color.as_deref(), Some("rgb(255, 51, 102)"));
    }

    #[test]
    fn test_inherits_from_nearest_ancestor() {
        let html = r#"<html><head><style>
            body { color: #000000; }
            .promo { color: #ff3366; font-size: 20px; }
        </style></head>
        <body><div class="promo"><p>Early bird</p></div></body></html>"#;

        let p = StyledDocument::parse(html).computed_style("p").unwrap().unwrap();
        assert_eq!(p.color.as_deref(), Some("rgb(255, 51, 102)"));
        assert_eq!(p.font_size.as_deref(), Some("20px"));
    }

    #[test]
    fn test_hover_rule_not_applied() {
        let button = &document().computed_styles()["button"];
        assert_ne!(button.background_color.as_deref(), Some("rgb(0, 0, 0)"));
    }

    #[test]
    fn test_missing_and_invalid_selectors() {
        let doc = document();
        assert_eq!(doc.computed_style("footer").unwrap(), None);
        assert!(matches!(
            doc.computed_style("div[["),
            Err(ExtractionError::InvalidSelector { .. })
        ));
    }

    #[test]
    fn test_style_inside_script_string_ignored() {
        let html = r#"<html><head>
            <script>var t = "<style>body{background-color:red}</style>";</script>
        </head><body></body></html>"#;

        let body = StyledDocument::parse(html).computed_style("body").unwrap().unwrap();
        assert_eq!(body.background_color.as_deref(), Some("rgba(0, 0, 0, 0)"));
    }

    #[test]
    fn test_normalize_color() {
        assert_eq!(normalize_color("#160822").as_deref(), Some("rgb(22, 8, 34)"));
        assert_eq!(normalize_color("#FFF").as_deref(), Some("rgb(255, 255, 255)"));
        assert_eq!(
            normalize_color("rgba(22,8,34,0.5)").as_deref(),
            Some("rgba(22, 8, 34, 0.5)")
        );
        assert_eq!(normalize_color("transparent").as_deref(), Some("rgba(0, 0, 0, 0)"));
        assert_eq!(normalize_color("Navy").as_deref(), Some("rgb(0, 0, 128)"));
        assert_eq!(normalize_color("inherit"), None);
    }

    #[test]
    fn test_resolve_vars() {
        let doc = document();
        let vars = doc.variables();
        assert_eq!(resolve_vars("var(--accent)", vars).as_deref(), Some("#ff3366"));
        assert_eq!(
            resolve_vars("var(--nope, rgb(1, 2, 3))", vars).as_deref(),
            Some("rgb(1, 2, 3)")
        );
        assert_eq!(resolve_vars("var(--nope)", vars), None);
    }

    #[test]
    fn test_self_referencing_var_is_unresolved() {
        let mut vars = IndexMap::new();
        vars.insert("--loop".to_string(), "var(--loop)".to_string());
        assert_eq!(resolve_vars("var(--loop)", &vars), None);
    }

    #[test]
    fn test_assets_resolved_against_base() {
        let assets = document().assets("https://eventtechlive.com/2025/");
        assert_eq!(
            assets.logo.as_deref(),
            Some("https://eventtechlive.com/img/logo.svg")
        );
        assert_eq!(
            assets.favicon.as_deref(),
            Some("https://eventtechlive.com/favicon.ico")
        );
    }

    #[test]
    fn test_logo_alt_containing_angle_bracket() {
        let html = r#"<html><body><img alt="Home > Logo" src="/logo.png"></body></html>"#;
        let assets = StyledDocument::parse(html).assets("https://example.com/");
        assert_eq!(assets.logo.as_deref(), Some("https://example.com/logo.png"));
    }

    #[test]
    fn test_title_and_meta() {
        let doc = document();
        assert_eq!(doc.title().as_deref(), Some("Event Tech Live & Expo"));
        assert_eq!(
            doc.meta_content("keywords").as_deref(),
            Some("events, technology, expo")
        );
        assert_eq!(doc.meta_content("description"), None);
    }
}
