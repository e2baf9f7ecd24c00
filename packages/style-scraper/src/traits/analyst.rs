//! Analyst trait and the tagged output it produces.

use async_trait::async_trait;
use serde_json::{Map, Value};

use crate::error::{ExtractionResult, PipelineError, PipelineResult};
use crate::schema::StyleSchemaValidator;
use crate::types::page::ScrapedPage;
use crate::types::style::EventStyleConfig;

/// Maximum raw text echoed back in a parse failure.
const RAW_PREVIEW_BYTES: usize = 500;

/// Turns a scraped page into a style description.
#[async_trait]
pub trait StyleAnalyst: Send + Sync {
    async fn analyze(&self, page: &ScrapedPage) -> ExtractionResult<AnalysisOutput>;

    /// Analyst name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// What an analyst handed back.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutput {
    /// Already-typed config
    Structured(Box<EventStyleConfig>),

    /// Loosely-typed record that still needs schema validation
    Mapping(Map<String, Value>),

    /// Raw text expected to contain JSON, possibly inside a code fence
    Raw(String),

    /// Nothing usable
    Empty,
}

impl AnalysisOutput {
    /// Pick the first candidate present, in priority order. Empty mappings
    /// and blank text count as absent.
    pub fn from_candidates(
        structured: Option<EventStyleConfig>,
        mapping: Option<Map<String, Value>>,
        raw: Option<String>,
    ) -> Self {
        if let Some(config) = structured {
            return Self::Structured(Box::new(config));
        }
        if let Some(map) = mapping.filter(|map| !map.is_empty()) {
            return Self::Mapping(map);
        }
        match raw {
            Some(text) if !text.trim().is_empty() => Self::Raw(text),
            _ => Self::Empty,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Structured(_) => "structured",
            Self::Mapping(_) => "mapping",
            Self::Raw(_) => "raw",
            Self::Empty => "empty",
        }
    }

    /// Resolve into a validated config.
    ///
    /// Raw text that is not JSON and empty output both fail with
    /// [`PipelineError::NoUsableOutput`]. A present record that breaks the
    /// schema fails with [`PipelineError::Validation`].
    pub fn into_config(self, validator: &StyleSchemaValidator) -> PipelineResult<EventStyleConfig> {
        match self {
            Self::Structured(config) => Ok(*config),
            Self::Mapping(map) => Ok(validator.validate(&Value::Object(map))?),
            Self::Raw(text) => {
                let body = strip_code_blocks(&text);
                let value: Value =
                    serde_json::from_str(body).map_err(|e| PipelineError::NoUsableOutput {
                        reason: format!(
                            "output is not valid JSON ({}): {}",
                            e,
                            truncate_to_char_boundary(body, RAW_PREVIEW_BYTES)
                        ),
                    })?;
                Ok(validator.validate(&value)?)
            }
            Self::Empty => Err(PipelineError::NoUsableOutput {
                reason: "analyst returned no output".to_string(),
            }),
        }
    }
}

/// Strip markdown code fences from model-style output.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

fn truncate_to_char_boundary(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while !s.is_char_boundary(end) && end > 0 {
        end -= 1;
    }
    &s[..end]
}
