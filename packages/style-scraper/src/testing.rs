//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the style scraper
//! without making network calls.

use async_trait::async_trait;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use std::time::Duration;

use crate::error::{ExtractionError, ExtractionResult};
use crate::traits::{
    analyst::{AnalysisOutput, StyleAnalyst},
    extractor::StyleExtractor,
};
use crate::types::page::{ComputedStyle, PageAssets, ScrapedPage};

/// A record that passes schema validation, with colors that
/// [`sample_page`] actually shows.
pub fn sample_record(url: &str) -> Value {
    json!({
        "event_id": "sample-event",
        "event_name": "Sample Event",
        "source_url": url,
        "colors": {
            "primary": "#160822",
            "secondary": "#ff3366",
            "accent": "#ffcc00",
            "background": "#ffffff",
            "text": "#1a1a1a"
        },
        "typography": {
            "heading_font": "Poppins, sans-serif",
            "body_font": "Inter, sans-serif"
        },
        "brand_voice": {
            "tone": "energetic",
            "keywords": ["events", "technology"],
            "style": "conversational"
        }
    })
}

/// A page whose observed colors ground [`sample_record`]'s palette.
pub fn sample_page(url: &str) -> ScrapedPage {
    let style = |background: &str, color: &str| ComputedStyle {
        background_color: Some(background.to_string()),
        color: Some(color.to_string()),
        ..Default::default()
    };

    ScrapedPage::new(
        url,
        "<html><head><title>Sample Event</title></head><body></body></html>",
    )
    .with_style("body", style("rgb(255, 255, 255)", "rgb(26, 26, 26)"))
    .with_style("header", style("rgb(22, 8, 34)", "rgb(255, 255, 255)"))
    .with_style("button", style("rgb(255, 51, 102)", "rgb(255, 204, 0)"))
    .with_assets(PageAssets::default())
}

/// Failure a [`MockExtractor`] can be told to produce.
#[derive(Debug, Clone)]
pub enum MockFailure {
    Timeout,
    Navigation(String),
    ElementNotFound(String),
}

/// A mock extractor for testing.
///
/// Returns registered pages by URL, or [`sample_page`] for anything else.
/// Clones share state, so a clone kept by the test sees every call.
#[derive(Clone, Default)]
pub struct MockExtractor {
    /// Predefined pages by URL
    pages: Arc<RwLock<HashMap<String, ScrapedPage>>>,

    failure: Arc<RwLock<Option<MockFailure>>>,

    /// Artificial latency before answering
    delay: Arc<RwLock<Option<Duration>>>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a predefined page.
    pub fn with_page(self, url: impl Into<String>, page: ScrapedPage) -> Self {
        self.pages.write().unwrap().insert(url.into(), page);
        self
    }

    /// Fail every call as if the page never finished loading.
    pub fn failing_with_timeout(self) -> Self {
        *self.failure.write().unwrap() = Some(MockFailure::Timeout);
        self
    }

    pub fn failing_with(self, failure: MockFailure) -> Self {
        *self.failure.write().unwrap() = Some(failure);
        self
    }

    pub fn with_delay(self, delay: Duration) -> Self {
        *self.delay.write().unwrap() = Some(delay);
        self
    }

    /// URLs requested so far.
    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }
}

#[async_trait]
impl StyleExtractor for MockExtractor {
    async fn extract(&self, url: &str, timeout: Duration) -> ExtractionResult<ScrapedPage> {
        self.calls.write().unwrap().push(url.to_string());

        let delay = *self.delay.read().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let failure = self.failure.read().unwrap().clone();
        match failure {
            Some(MockFailure::Timeout) => Err(ExtractionError::Timeout {
                url: url.to_string(),
                timeout,
            }),
            Some(MockFailure::Navigation(message)) => Err(ExtractionError::Navigation {
                url: url.to_string(),
                source: message.into(),
            }),
            Some(MockFailure::ElementNotFound(selector)) => {
                Err(ExtractionError::ElementNotFound { selector })
            }
            None => Ok(self
                .pages
                .read()
                .unwrap()
                .get(url)
                .cloned()
                .unwrap_or_else(|| sample_page(url))),
        }
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// A mock analyst for testing.
///
/// Without a configured output it answers with [`sample_record`] as a
/// mapping for the analyzed page's URL.
#[derive(Clone, Default)]
pub struct MockAnalyst {
    output: Option<AnalysisOutput>,

    failure: Option<String>,

    /// URLs of analyzed pages
    calls: Arc<RwLock<Vec<String>>>,
}

impl MockAnalyst {
    pub fn new() -> Self {
        Self::default()
    }

    /// Always return this output.
    pub fn returning(output: AnalysisOutput) -> Self {
        Self {
            output: Some(output),
            ..Default::default()
        }
    }

    /// Always fail with this message.
    pub fn failing_with(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }
}

#[async_trait]
impl StyleAnalyst for MockAnalyst {
    async fn analyze(&self, page: &ScrapedPage) -> ExtractionResult<AnalysisOutput> {
        self.calls.write().unwrap().push(page.url.clone());

        if let Some(message) = &self.failure {
            return Err(ExtractionError::Analysis(message.clone().into()));
        }

        Ok(match &self.output {
            Some(output) => output.clone(),
            None => match sample_record(&page.url) {
                Value::Object(map) => AnalysisOutput::Mapping(map),
                _ => AnalysisOutput::Empty,
            },
        })
    }

    fn name(&self) -> &str {
        "mock"
    }
}
