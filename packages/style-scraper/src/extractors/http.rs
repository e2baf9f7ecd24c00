//! HTTP-based style extractor.
//!
//! Fetches the page with `reqwest` and resolves styles statically from the
//! returned document. JavaScript-applied styles are not seen; plug in a
//! browser-backed [`StyleExtractor`] when those matter.

use async_trait::async_trait;
use std::error::Error as StdError;
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::{ExtractionError, ExtractionResult, SecurityError};
use crate::security::UrlGate;
use crate::traits::extractor::StyleExtractor;
use crate::types::config::ScraperConfig;
use crate::types::page::ScrapedPage;

/// Redirect hops followed before giving up.
pub const MAX_REDIRECTS: usize = 5;

/// Extractor that fetches pages over HTTP.
///
/// Every redirect hop is re-checked by the [`UrlGate`], so a public URL
/// cannot bounce the request into a private network.
///
/// # Example
///
/// ```rust,ignore
/// use style_scraper::{GuardedExtractor, HttpStyleExtractor, StyleExtractor};
///
/// let extractor = GuardedExtractor::new(HttpStyleExtractor::new("MyBot/1.0")?);
/// let page = extractor.extract("https://example.com", Duration::from_secs(30)).await?;
/// ```
pub struct HttpStyleExtractor {
    client: reqwest::Client,
    user_agent: String,
}

impl HttpStyleExtractor {
    /// Create an extractor with a gated redirect policy.
    pub fn new(user_agent: impl Into<String>) -> ExtractionResult<Self> {
        let gate = UrlGate::new();
        let policy = reqwest::redirect::Policy::custom(move |attempt| {
            if attempt.previous().len() >= MAX_REDIRECTS {
                return attempt.error(format!("more than {MAX_REDIRECTS} redirects"));
            }
            match gate.check(attempt.url().as_str()) {
                Ok(_) => attempt.follow(),
                Err(e) => {
                    warn!(target_url = %attempt.url(), error = %e, "Refusing redirect");
                    attempt.error(e)
                }
            }
        });

        let client = reqwest::Client::builder()
            .redirect(policy)
            .build()
            .map_err(|e| ExtractionError::Client(Box::new(e)))?;

        Ok(Self {
            client,
            user_agent: user_agent.into(),
        })
    }

    pub fn from_config(config: &ScraperConfig) -> ExtractionResult<Self> {
        Self::new(config.user_agent.clone())
    }

    /// Use a custom HTTP client. The caller is responsible for its redirect policy.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    fn map_request_error(url: &str, timeout: Duration, error: reqwest::Error) -> ExtractionError {
        if error.is_timeout() {
            return ExtractionError::Timeout {
                url: url.to_string(),
                timeout,
            };
        }
        if let Some(security) = security_cause(&error) {
            return ExtractionError::Security(security);
        }
        ExtractionError::Navigation {
            url: url.to_string(),
            source: Box::new(error),
        }
    }
}

/// Find a gate rejection raised by the redirect policy.
fn security_cause(error: &reqwest::Error) -> Option<SecurityError> {
    let mut source = error.source();
    while let Some(cause) = source {
        if let Some(security) = cause.downcast_ref::<SecurityError>() {
            return Some(security.clone());
        }
        source = cause.source();
    }
    None
}

#[async_trait]
impl StyleExtractor for HttpStyleExtractor {
    async fn extract(&self, url: &str, timeout: Duration) -> ExtractionResult<ScrapedPage> {
        debug!(url = %url, timeout = ?timeout, "HTTP fetch starting");

        let response = self
            .client
            .get(url)
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| {
                warn!(url = %url, error = %e, "HTTP request failed");
                Self::map_request_error(url, timeout, e)
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(ExtractionError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        // Assets resolve against the final URL after redirects
        let final_url = response.url().to_string();
        let html = response
            .text()
            .await
            .map_err(|e| Self::map_request_error(url, timeout, e))?;

        let page = ScrapedPage::from_html(final_url, html);
        debug!(
            url = %page.url,
            content_length = page.html.len(),
            selectors = page.computed_styles.len(),
            variables = page.css_variables.len(),
            "Page styles extracted"
        );

        Ok(page)
    }

    fn name(&self) -> &str {
        "http"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_user_agent() {
        let config = ScraperConfig::new().with_user_agent("TestBot/1.0");
        let extractor = HttpStyleExtractor::from_config(&config).unwrap();
        assert_eq!(extractor.user_agent(), "TestBot/1.0");
        assert_eq!(extractor.name(), "http");
    }
}
