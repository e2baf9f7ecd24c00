//! Pipeline run state.

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::info;

use crate::error::{PipelineError, PipelineResult};
use crate::types::style::EventStyleConfig;

/// Lifecycle of one pipeline run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PipelineStatus {
    #[default]
    Pending,
    Scraping,
    Completed,
    Failed,
}

impl PipelineStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    /// Forward-only transitions: Pending -> Scraping -> Completed | Failed.
    fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Scraping)
                | (Self::Scraping, Self::Completed)
                | (Self::Scraping, Self::Failed)
        )
    }
}

impl fmt::Display for PipelineStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Scraping => "scraping",
            Self::Completed => "completed",
            Self::Failed => "failed",
        };
        f.write_str(s)
    }
}

/// State owned by a single run.
///
/// `result` is present only when completed and `error` only when failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PipelineState {
    url: String,
    status: PipelineStatus,
    result: Option<EventStyleConfig>,
    error: Option<String>,
}

impl PipelineState {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: PipelineStatus::Pending,
            result: None,
            error: None,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn status(&self) -> PipelineStatus {
        self.status
    }

    pub fn result(&self) -> Option<&EventStyleConfig> {
        self.result.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn advance(&mut self, next: PipelineStatus) -> PipelineResult<()> {
        if !self.status.can_advance_to(next) {
            return Err(PipelineError::InvalidTransition {
                from: self.status,
                to: next,
            });
        }
        info!(url = %self.url, from = %self.status, to = %next, "Pipeline transition");
        self.status = next;
        Ok(())
    }

    pub(crate) fn begin_scraping(&mut self) -> PipelineResult<()> {
        self.advance(PipelineStatus::Scraping)
    }

    pub(crate) fn complete(&mut self, config: EventStyleConfig) -> PipelineResult<()> {
        self.advance(PipelineStatus::Completed)?;
        self.result = Some(config);
        Ok(())
    }

    pub(crate) fn fail(&mut self, error: impl Into<String>) -> PipelineResult<()> {
        self.advance(PipelineStatus::Failed)?;
        self.error = Some(error.into());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path() {
        let mut state = PipelineState::new("https://example.com");
        assert_eq!(state.status(), PipelineStatus::Pending);

        state.begin_scraping().unwrap();
        assert_eq!(state.status(), PipelineStatus::Scraping);

        state.fail("boom").unwrap();
        assert_eq!(state.status(), PipelineStatus::Failed);
        assert_eq!(state.error(), Some("boom"));
        assert!(state.result().is_none());
    }

    #[test]
    fn test_no_state_is_revisited() {
        let mut state = PipelineState::new("https://example.com");
        assert!(matches!(
            state.fail("skipped scraping"),
            Err(PipelineError::InvalidTransition {
                from: PipelineStatus::Pending,
                to: PipelineStatus::Failed
            })
        ));

        state.begin_scraping().unwrap();
        assert!(state.begin_scraping().is_err());

        state.fail("first").unwrap();
        assert!(state.fail("second").is_err());
        assert!(state.begin_scraping().is_err());
        assert_eq!(state.error(), Some("first"));
        assert_eq!(state.status(), PipelineStatus::Failed);
    }

    #[test]
    fn test_status_display_and_serde() {
        assert_eq!(PipelineStatus::Scraping.to_string(), "scraping");
        assert_eq!(
            serde_json::to_string(&PipelineStatus::Completed).unwrap(),
            "\"completed\""
        );
        assert!(PipelineStatus::Failed.is_terminal());
        assert!(!PipelineStatus::Pending.is_terminal());
    }
}
