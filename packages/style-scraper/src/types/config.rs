//! Scraper configuration.

use std::path::PathBuf;
use std::time::Duration;

use crate::color::DEFAULT_TOLERANCE;

/// Default bound on extraction plus analysis.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Directory artifacts are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "style-configs";

pub const DEFAULT_USER_AGENT: &str =
    "EventStyleScraper/0.1.0 (+https://github.com/personal-event-summary; contact@example.com)";

/// Configuration for a scrape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScraperConfig {
    /// Upper bound on one pipeline run
    pub timeout: Duration,

    /// Where exported configs are written
    pub output_dir: PathBuf,

    /// Channel tolerance for palette grounding
    pub color_tolerance: u8,

    /// Fail the run when palette colors cannot be found on the page
    pub strict_grounding: bool,

    /// User agent sent with every request
    pub user_agent: String,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            color_tolerance: DEFAULT_TOLERANCE,
            strict_grounding: false,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl ScraperConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_timeout_secs(self, secs: u64) -> Self {
        self.with_timeout(Duration::from_secs(secs))
    }

    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    pub fn with_color_tolerance(mut self, tolerance: u8) -> Self {
        self.color_tolerance = tolerance;
        self
    }

    pub fn with_strict_grounding(mut self, strict: bool) -> Self {
        self.strict_grounding = strict;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}
