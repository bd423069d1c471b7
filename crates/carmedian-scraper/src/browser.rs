//! The browsing capability consumed by the retrieval pipeline.
//!
//! The pipeline never talks to a concrete browser; it drives the
//! [`Browser`]/[`Page`] traits so the whole scrape-and-reduce path is
//! testable with a fake. The shipped backend, [`HttpBrowser`], fetches
//! the page over plain HTTP and answers selector queries against the
//! parsed document.

use std::time::Duration;

use async_trait::async_trait;
use scraper::{Html, Selector};

use carmedian_core::AppConfig;

use crate::error::ScrapeError;

/// Factory for page contexts. The driver owns exactly one page at a time
/// and replaces it (close-and-reopen) only inside the navigation retry
/// path.
#[async_trait]
pub trait Browser: Send + Sync {
    async fn new_page(&self) -> Result<Box<dyn Page>, ScrapeError>;
}

/// One page context.
#[async_trait]
pub trait Page: Send {
    /// Navigate to `url` within `timeout`.
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Navigation`] on timeout, transport failure, or a
    /// non-success HTTP status.
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError>;

    /// Wait up to `timeout` for `selector` to appear. `Ok(false)` means
    /// the wait elapsed without a match — classification of that outcome
    /// belongs to the caller.
    async fn wait_for_selector(
        &mut self,
        selector: &str,
        timeout: Duration,
    ) -> Result<bool, ScrapeError>;

    /// Full visible text of the page, for no-results / bot-wall
    /// classification.
    async fn body_text(&self) -> Result<String, ScrapeError>;

    /// Price-bearing string per listing card, in document order, capped
    /// at `max_cards`. For each card the `price_selectors` candidates are
    /// tried in order and the first non-empty value wins (the named
    /// `attribute` when configured, text content otherwise); a card with
    /// no match contributes an empty string.
    async fn extract_cards(
        &self,
        card_selector: &str,
        price_selectors: &[String],
        attribute: Option<&str>,
        max_cards: usize,
    ) -> Result<Vec<String>, ScrapeError>;

    /// Perform one incremental scroll cycle and report the resulting page
    /// height, so the caller can stop once content stops growing.
    async fn scroll_and_height(&mut self) -> Result<u64, ScrapeError>;
}

/// HTTP-backed browsing capability: `reqwest` fetch + `scraper` queries.
///
/// A CDP-based backend can implement the same traits for JavaScript-heavy
/// targets; the `headless` toggle is accepted here so configuration stays
/// backend-agnostic (it has no effect on plain HTTP).
pub struct HttpBrowser {
    client: reqwest::Client,
}

impl HttpBrowser {
    /// Build the backend from the validated configuration (user agent,
    /// headless toggle).
    ///
    /// # Errors
    ///
    /// [`ScrapeError::Browser`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(config: &AppConfig) -> Result<Self, ScrapeError> {
        let client = reqwest::Client::builder()
            .user_agent(&config.user_agent)
            .cookie_store(true)
            .connect_timeout(Duration::from_secs(10))
            .build()
            .map_err(|e| ScrapeError::Browser {
                reason: format!("cannot build HTTP client: {e}"),
            })?;
        Ok(Self { client })
    }
}

#[async_trait]
impl Browser for HttpBrowser {
    async fn new_page(&self) -> Result<Box<dyn Page>, ScrapeError> {
        Ok(Box::new(HttpPage {
            client: self.client.clone(),
            html: String::new(),
        }))
    }
}

/// A fetched document held as raw HTML; queries parse on demand so the
/// non-`Send` DOM never lives across an await point.
struct HttpPage {
    client: reqwest::Client,
    html: String,
}

impl HttpPage {
    fn parse_selector(selector: &str) -> Result<Selector, ScrapeError> {
        Selector::parse(selector).map_err(|e| ScrapeError::Browser {
            reason: format!("invalid selector {selector:?}: {e}"),
        })
    }
}

#[async_trait]
impl Page for HttpPage {
    async fn navigate(&mut self, url: &str, timeout: Duration) -> Result<(), ScrapeError> {
        let navigation_error = |reason: String| ScrapeError::Navigation {
            url: url.to_string(),
            reason,
        };

        let response = self
            .client
            .get(url)
            .timeout(timeout)
            .send()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(navigation_error(format!("HTTP {status}")));
        }

        self.html = response
            .text()
            .await
            .map_err(|e| navigation_error(e.to_string()))?;
        Ok(())
    }

    async fn wait_for_selector(
        &mut self,
        selector: &str,
        _timeout: Duration,
    ) -> Result<bool, ScrapeError> {
        // A static document either has the selector or never will, so the
        // bounded wait collapses to a single check.
        let parsed = Self::parse_selector(selector)?;
        let document = Html::parse_document(&self.html);
        Ok(document.select(&parsed).next().is_some())
    }

    async fn body_text(&self) -> Result<String, ScrapeError> {
        let document = Html::parse_document(&self.html);
        Ok(document
            .root_element()
            .text()
            .collect::<Vec<_>>()
            .join(" "))
    }

    async fn extract_cards(
        &self,
        card_selector: &str,
        price_selectors: &[String],
        attribute: Option<&str>,
        max_cards: usize,
    ) -> Result<Vec<String>, ScrapeError> {
        let card = Self::parse_selector(card_selector)?;
        let candidates = price_selectors
            .iter()
            .map(|s| Self::parse_selector(s))
            .collect::<Result<Vec<_>, _>>()?;

        let document = Html::parse_document(&self.html);
        let mut samples = Vec::new();
        for element in document.select(&card).take(max_cards) {
            let mut sample = String::new();
            for candidate in &candidates {
                let Some(found) = element.select(candidate).next() else {
                    continue;
                };
                let value = match attribute {
                    Some(name) => found.value().attr(name).unwrap_or_default().to_string(),
                    None => found.text().collect::<String>(),
                };
                let value = value.trim();
                if !value.is_empty() {
                    sample = value.to_string();
                    break;
                }
            }
            samples.push(sample);
        }
        Ok(samples)
    }

    async fn scroll_and_height(&mut self) -> Result<u64, ScrapeError> {
        // Nothing lazy-loads over plain HTTP; a constant height makes the
        // caller's no-growth early stop fire after two cycles.
        Ok(self.html.len() as u64)
    }
}

#[cfg(test)]
#[path = "browser_test.rs"]
mod tests;
