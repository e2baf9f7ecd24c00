//! Extractor trait and the single-use, gated wrapper.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::ExtractionResult;
use crate::security::{UrlGate, UseGuard};
use crate::types::page::ScrapedPage;

/// Fetches a page and samples its styles.
#[async_trait]
pub trait StyleExtractor: Send + Sync {
    /// Fetch `url` and collect computed styles, CSS variables and assets.
    ///
    /// Implementations should give up once `timeout` has elapsed.
    async fn extract(&self, url: &str, timeout: Duration) -> ExtractionResult<ScrapedPage>;

    /// Extractor name for logging.
    fn name(&self) -> &str {
        "unknown"
    }
}

/// An extractor that gates every URL and can be used only once.
pub struct GuardedExtractor<E: StyleExtractor> {
    inner: E,
    gate: UrlGate,
    guard: UseGuard,
}

impl<E: StyleExtractor> GuardedExtractor<E> {
    pub fn new(extractor: E) -> Self {
        Self::with_gate(extractor, UrlGate::new())
    }

    pub fn with_gate(extractor: E, gate: UrlGate) -> Self {
        Self {
            inner: extractor,
            gate,
            guard: UseGuard::new(),
        }
    }

    pub fn is_used(&self) -> bool {
        self.guard.is_used()
    }

    pub fn inner(&self) -> &E {
        &self.inner
    }

    pub fn into_inner(self) -> E {
        self.inner
    }
}

#[async_trait]
impl<E: StyleExtractor> StyleExtractor for GuardedExtractor<E> {
    async fn extract(&self, url: &str, timeout: Duration) -> ExtractionResult<ScrapedPage> {
        self.gate.check(url)?;
        self.guard.claim()?;

        debug!(url = %url, extractor = self.inner.name(), "Delegating extraction");
        self.inner.extract(url, timeout).await
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}
