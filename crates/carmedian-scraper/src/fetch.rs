//! Page retrieval orchestration: navigation with a single
//! context-resetting retry, content readiness, and bot-wall
//! classification.

use std::time::Duration;

use carmedian_core::AppConfig;

use crate::browser::{Browser, Page};
use crate::error::ScrapeError;

/// Pause between scroll cycles while lazy-loaded listings settle.
const SCROLL_SETTLE_MS: u64 = 900;

/// Bring `page` to a ready state for extraction, or classify why it
/// cannot be.
///
/// Steps: navigate (with one retry through a fresh page context), wait
/// for the listing-card selector, classify the page text when cards never
/// appear, then run bounded scroll-settle cycles to flush lazy-loaded
/// content.
///
/// This function only decides *reachability* of usable content; sample
/// quality is judged later by the aggregator.
///
/// # Errors
///
/// - [`ScrapeError::Navigation`] — both navigation attempts failed.
/// - [`ScrapeError::NoResults`] — the page reports an empty result set.
/// - [`ScrapeError::BotWall`] — captcha / "are you a human" interstitial.
/// - [`ScrapeError::CardsNotFound`] — cards absent with no recognizable
///   phrasing; the selector may be stale.
/// - [`ScrapeError::Browser`] — the backend itself failed.
pub async fn retrieve(
    browser: &dyn Browser,
    page: &mut Box<dyn Page>,
    url: &str,
    config: &AppConfig,
) -> Result<(), ScrapeError> {
    navigate_with_retry(browser, page, url, config).await?;

    let selector_timeout = Duration::from_millis(config.selector_timeout_ms);
    let cards_present = page
        .wait_for_selector(&config.card_selector, selector_timeout)
        .await?;

    if !cards_present {
        let text = page.body_text().await?.to_lowercase();
        if text.contains("no results") || text.contains("try a different search") {
            return Err(ScrapeError::NoResults {
                url: url.to_string(),
            });
        }
        if text.contains("are you a human") || text.contains("captcha") {
            return Err(ScrapeError::BotWall {
                url: url.to_string(),
            });
        }
        return Err(ScrapeError::CardsNotFound {
            url: url.to_string(),
        });
    }

    settle_lazy_content(page.as_mut(), config.scroll_rounds).await
}

/// Navigate with a bounded timeout; on failure, discard the page context
/// and try once more through a fresh one.
///
/// A stale context can enter a detached-frame state where every further
/// navigation fails; replacing the page is the only reliable way out.
async fn navigate_with_retry(
    browser: &dyn Browser,
    page: &mut Box<dyn Page>,
    url: &str,
    config: &AppConfig,
) -> Result<(), ScrapeError> {
    let timeout = Duration::from_millis(config.page_timeout_ms);

    let first = match page.navigate(url, timeout).await {
        Ok(()) => return Ok(()),
        Err(e) => e,
    };
    tracing::debug!(url, error = %first, "navigation failed, retrying with a fresh page");

    *page = browser.new_page().await?;
    page.navigate(url, timeout).await
}

/// Scroll-and-wait cycles to trigger lazy-loaded listings, stopping early
/// once two consecutive cycles produce no height growth.
async fn settle_lazy_content(page: &mut dyn Page, rounds: usize) -> Result<(), ScrapeError> {
    let mut last_height = 0u64;
    let mut stable_cycles = 0u32;

    for round in 0..rounds {
        let height = page.scroll_and_height().await?;
        if height == last_height {
            stable_cycles += 1;
            if stable_cycles >= 2 {
                break;
            }
        } else {
            stable_cycles = 0;
        }
        last_height = height;

        if round + 1 < rounds {
            tokio::time::sleep(Duration::from_millis(SCROLL_SETTLE_MS)).await;
        }
    }
    Ok(())
}

#[cfg(test)]
#[path = "fetch_test.rs"]
mod tests;
