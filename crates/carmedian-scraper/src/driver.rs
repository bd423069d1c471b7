//! Per-target control flow: resolve → fetch → extract → aggregate →
//! rate-limit, strictly sequential.

use std::time::Duration;

use chrono::{SecondsFormat, Utc};
use rand::Rng;
use regex::Regex;

use carmedian_core::{display_name, AppConfig, PriceSummary};

use crate::browser::{Browser, Page};
use crate::error::ScrapeError;
use crate::fetch;
use crate::price;
use crate::resolve::ResolvedTarget;
use crate::stats;

/// Upper bound of the random jitter added to the inter-target delay, in
/// milliseconds. A perfectly regular cadence is itself a detection
/// signal.
const JITTER_MS: u64 = 250;

/// Outcome of one scrape pass.
#[derive(Debug)]
pub struct RunReport {
    /// Targets processed, successfully or not.
    pub attempted: usize,
    /// One summary per target that survived extraction and aggregation.
    pub rows: Vec<PriceSummary>,
}

/// Process `work` in order, one target at a time.
///
/// Every per-target failure is converted into "no row" plus a log line;
/// it never aborts the pass. Targets are never fetched concurrently —
/// fan-out raises fetch velocity and risks cross-tab interference through
/// shared session state. Between targets the configured rate-limit delay
/// (plus jitter) is enforced, except after the last one.
///
/// # Errors
///
/// Only [`ScrapeError::Browser`] from opening the initial page context;
/// nothing target-specific propagates.
pub async fn run(
    browser: &dyn Browser,
    config: &AppConfig,
    work: &[ResolvedTarget],
) -> Result<RunReport, ScrapeError> {
    // Validated at config load; compile failure cannot occur here.
    let pattern = config.price_pattern.as_deref().and_then(|p| Regex::new(p).ok());

    let mut page = browser.new_page().await?;
    let mut rows = Vec::new();
    let total = work.len();

    for (index, item) in work.iter().enumerate() {
        tracing::info!(
            progress = format!("{}/{total}", index + 1),
            target = %item.target.pretty(),
            url = %item.url,
            "scraping target"
        );

        match scrape_target(browser, &mut page, item, config, pattern.as_ref()).await {
            Ok(summary) => {
                tracing::info!(
                    target = %item.target.pretty(),
                    n = summary.n,
                    median = summary.median,
                    "aggregated"
                );
                rows.push(summary);
            }
            Err(error) => {
                tracing::warn!(
                    target = %item.target.pretty(),
                    outcome = outcome_label(&error),
                    error = %error,
                    "target skipped"
                );
            }
        }

        if index + 1 < total {
            let jitter = rand::rng().random_range(0..=JITTER_MS);
            tokio::time::sleep(Duration::from_millis(config.rate_limit_ms + jitter)).await;
        }
    }

    tracing::info!(
        attempted = total,
        collected = rows.len(),
        finished_at = %Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
        "scrape pass complete"
    );
    Ok(RunReport {
        attempted: total,
        rows,
    })
}

/// Full fetch → extract → normalize → aggregate cycle for one target.
async fn scrape_target(
    browser: &dyn Browser,
    page: &mut Box<dyn Page>,
    item: &ResolvedTarget,
    config: &AppConfig,
    pattern: Option<&Regex>,
) -> Result<PriceSummary, ScrapeError> {
    fetch::retrieve(browser, page, &item.url, config).await?;

    let raw_samples = page
        .extract_cards(
            &config.card_selector,
            &config.price_selectors,
            config.price_attribute.as_deref(),
            config.max_cards,
        )
        .await?;

    let prices: Vec<f64> = raw_samples
        .iter()
        .filter_map(|raw| price::parse_price_text(&price::apply_pattern(raw, pattern)))
        .filter(|&value| price::within_bounds(value, config.min_price, config.max_price))
        .collect();

    if config.debug {
        tracing::debug!(
            target = %item.target.pretty(),
            raw = ?&raw_samples[..raw_samples.len().min(10)],
            parsed = ?&prices[..prices.len().min(10)],
            "price samples"
        );
    }

    let quartiles = stats::summarize(&prices, config.min_prices)?;

    #[allow(clippy::cast_possible_truncation)]
    Ok(PriceSummary {
        year: item.target.year,
        make: display_name(&item.target.make),
        model: display_name(&item.target.model),
        median: quartiles.median,
        p25: quartiles.p25,
        p75: quartiles.p75,
        n: quartiles.n as u32,
        source: config.source.clone(),
        scraped_at: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
    })
}

/// Short state-machine label for the skip log line.
fn outcome_label(error: &ScrapeError) -> &'static str {
    match error {
        ScrapeError::Navigation { .. } => "nav_failed",
        ScrapeError::NoResults { .. } => "no_results",
        ScrapeError::BotWall { .. } => "bot_wall",
        ScrapeError::CardsNotFound { .. } => "cards_not_found",
        ScrapeError::InsufficientSamples { .. } => "insufficient_samples",
        ScrapeError::TooUniform { .. } => "too_uniform",
        ScrapeError::Browser { .. } => "browser_failure",
    }
}

#[cfg(test)]
#[path = "driver_test.rs"]
mod tests;
