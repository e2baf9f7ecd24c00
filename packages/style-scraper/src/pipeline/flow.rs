//! The style extraction pipeline.
//!
//! One pipeline processes one URL, once:
//!
//! ```text
//! gate -> extract -> analyze -> validate -> ground -> (export)
//! ```
//!
//! The URL is gated at construction, so a rejected URL never produces a
//! pipeline at all. Extraction and analysis share a single timeout.

use std::path::PathBuf;
use tracing::{debug, info, warn};

use crate::color::ColorComparator;
use crate::error::{ExportResult, ExtractionError, PipelineError, PipelineResult, SecurityResult};
use crate::schema::StyleSchemaValidator;
use crate::security::{CanonicalUrl, UrlGate};
use crate::traits::analyst::StyleAnalyst;
use crate::traits::extractor::{GuardedExtractor, StyleExtractor};
use crate::types::config::ScraperConfig;
use crate::types::style::EventStyleConfig;

use super::export::ConfigExporter;
use super::grounding::{ground_palette, PaletteGrounding};
use super::state::PipelineState;

/// Drives one URL from `Pending` to `Completed` or `Failed`.
///
/// # Example
///
/// ```rust,ignore
/// use style_scraper::{MockAnalyst, MockExtractor, ScraperConfig, StylePipeline};
///
/// let mut pipeline = StylePipeline::new(
///     "https://example.com",
///     MockExtractor::new(),
///     MockAnalyst::returning(output),
///     ScraperConfig::default(),
/// )?;
/// let config = pipeline.start().await?;
/// assert!(pipeline.state().result().is_some());
/// ```
pub struct StylePipeline<E: StyleExtractor, A: StyleAnalyst> {
    url: CanonicalUrl,
    config: ScraperConfig,
    extractor: GuardedExtractor<E>,
    analyst: A,
    validator: StyleSchemaValidator,
    exporter: ConfigExporter,
    state: PipelineState,
    grounding: Option<PaletteGrounding>,
}

impl<E: StyleExtractor, A: StyleAnalyst> StylePipeline<E, A> {
    /// Gate the URL and set up a pending run.
    pub fn new(url: &str, extractor: E, analyst: A, config: ScraperConfig) -> SecurityResult<Self> {
        let gate = UrlGate::new();
        let url = gate.check(url)?;
        debug!(url = %url, timeout = ?config.timeout, "Pipeline created");

        Ok(Self {
            state: PipelineState::new(url.as_str()),
            exporter: ConfigExporter::new(config.output_dir.clone()),
            extractor: GuardedExtractor::with_gate(extractor, gate),
            validator: StyleSchemaValidator::new(),
            grounding: None,
            url,
            config,
            analyst,
        })
    }

    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    pub fn url(&self) -> &CanonicalUrl {
        &self.url
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Palette grounding of the last run, once validation has passed.
    pub fn grounding(&self) -> Option<&PaletteGrounding> {
        self.grounding.as_ref()
    }

    /// Run the pipeline.
    ///
    /// Only a pending pipeline can start; any other state returns
    /// [`PipelineError::InvalidTransition`] without touching the state.
    /// Failures are recorded in the state and also returned.
    pub async fn start(&mut self) -> PipelineResult<EventStyleConfig> {
        self.state.begin_scraping()?;

        match self.run().await {
            Ok(config) => {
                info!(url = %self.url, event_id = %config.event_id, "Style extraction completed");
                self.state.complete(config.clone())?;
                Ok(config)
            }
            Err(e) => {
                warn!(url = %self.url, error = %e, "Style extraction failed");
                self.state.fail(e.to_string())?;
                Err(e)
            }
        }
    }

    async fn run(&mut self) -> PipelineResult<EventStyleConfig> {
        let url = self.url.as_str().to_string();
        let timeout = self.config.timeout;

        let collaborators = async {
            debug!(url = %url, extractor = self.extractor.name(), "Extracting page");
            let page = self.extractor.extract(&url, timeout).await?;
            if !page.success {
                return Err(ExtractionError::Unsuccessful { url: url.clone() });
            }

            debug!(url = %url, analyst = self.analyst.name(), "Analyzing page");
            let output = self.analyst.analyze(&page).await?;
            Ok::<_, ExtractionError>((page, output))
        };

        let (page, output) = tokio::time::timeout(timeout, collaborators)
            .await
            .map_err(|_| ExtractionError::Timeout {
                url: url.clone(),
                timeout,
            })??;

        debug!(url = %url, output = output.kind(), "Validating analyst output");
        let config = output.into_config(&self.validator)?;

        let comparator = ColorComparator::new(self.config.color_tolerance);
        let report = ground_palette(&config.colors, &page, &comparator);
        let ungrounded = report.ungrounded_fields();
        self.grounding = Some(report);

        if !ungrounded.is_empty() {
            warn!(
                url = %url,
                fields = ?ungrounded,
                tolerance = self.config.color_tolerance,
                "Palette colors not observed on page"
            );
            if self.config.strict_grounding {
                return Err(PipelineError::UngroundedColors { fields: ungrounded });
            }
        }

        Ok(config)
    }

    /// Persist a config under the configured output directory.
    pub fn export(&self, config: &EventStyleConfig) -> ExportResult<PathBuf> {
        self.exporter.export(config)
    }
}
