//! Event Style Scraper
//!
//! Harvests visual style data (colors, typography, brand voice) from event
//! websites supplied as untrusted URLs and turns it into a validated,
//! persisted configuration artifact.
//!
//! # Trust Boundary
//!
//! Every URL passes the [`UrlGate`] before any network access. The gate is a
//! pure, literal pre-flight check: scheme allow-list, loopback, private and
//! link-local address rejection. No DNS resolution is performed.
//!
//! # Usage
//!
//! ```rust,ignore
//! use style_scraper::{ComputedStyleAnalyst, HttpStyleExtractor, ScraperConfig, StylePipeline};
//!
//! let config = ScraperConfig::new().with_timeout_secs(30);
//! let extractor = HttpStyleExtractor::from_config(&config)?;
//! let mut pipeline = StylePipeline::new(
//!     "https://eventtechlive.com",
//!     extractor,
//!     ComputedStyleAnalyst::new(),
//!     config,
//! )?;
//!
//! let style = pipeline.start().await?;
//! let path = pipeline.export(&style)?;
//! ```
//!
//! # Modules
//!
//! - [`security`] - URL gate (SSRF protection) and single-use enforcement
//! - [`color`] - Color grammars and the tolerance comparator
//! - [`schema`] - Closed-schema validation of loosely-typed records
//! - [`traits`] - Collaborator seams (extractor, analyst)
//! - [`extractors`] - HTTP extractor and static HTML/CSS parsing
//! - [`analysts`] - Deterministic computed-style analyst
//! - [`pipeline`] - State machine, palette grounding and export
//! - [`testing`] - Mock collaborators for testing

pub mod analysts;
pub mod color;
pub mod error;
pub mod extractors;
pub mod pipeline;
pub mod schema;
pub mod security;
pub mod testing;
pub mod traits;
pub mod types;

// Re-export core types at crate root
pub use error::{
    ColorFormatError, ExportError, ExtractionError, PipelineError, SecurityError,
    ValidationError, ValidationErrors,
};
pub use color::{
    compare, hex_to_channels, rgb_string_to_channels, ColorComparator, ColorNotation,
    ColorValue, Rgb, ToleranceComparison, DEFAULT_TOLERANCE,
};
pub use schema::StyleSchemaValidator;
pub use security::{CanonicalUrl, RejectReason, SecurityVerdict, UrlGate, UseGuard};
pub use traits::{
    analyst::{AnalysisOutput, StyleAnalyst},
    extractor::{GuardedExtractor, StyleExtractor},
};
pub use types::{
    config::ScraperConfig,
    page::{ComputedStyle, PageAssets, ScrapedPage},
    style::{BrandVoice, ColorPalette, EventStyleConfig, LayoutConfig, Typography},
};

// Re-export pipeline components
pub use pipeline::{
    ground_palette, ColorGrounding, ConfigExporter, PaletteGrounding, PipelineState,
    PipelineStatus, StylePipeline,
};

// Re-export collaborator implementations
pub use analysts::ComputedStyleAnalyst;
pub use extractors::HttpStyleExtractor;

// Re-export testing utilities
pub use testing::{MockAnalyst, MockExtractor};
