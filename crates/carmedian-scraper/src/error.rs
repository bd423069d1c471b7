use thiserror::Error;

/// Per-target failures. Every variant is caught at the driver level and
/// converted into "no row for this target"; none of them aborts the run.
#[derive(Debug, Error)]
pub enum ScrapeError {
    /// Navigation failed even after discarding the page context and
    /// retrying with a fresh one.
    #[error("navigation to {url} failed after retry: {reason}")]
    Navigation { url: String, reason: String },

    /// The page loaded but reports an empty result set. A legitimate
    /// outcome, not a fault.
    #[error("no listings for {url}")]
    NoResults { url: String },

    /// The page presented a captcha / bot interstitial. Never retried —
    /// hammering a bot wall burns the rate-limit slot and risks
    /// escalation.
    #[error("bot wall encountered at {url}")]
    BotWall { url: String },

    /// Listing cards never appeared and the page text matched neither the
    /// no-results nor the bot-wall phrasing. The card selector may be
    /// stale.
    #[error("listing cards not found at {url}")]
    CardsNotFound { url: String },

    /// Fewer in-range prices than the configured minimum.
    #[error("collected {got} prices, need at least {need}")]
    InsufficientSamples { got: usize, need: usize },

    /// The sample set failed the uniformity guard: the selector likely
    /// bound to a placeholder or repeated decorative element.
    #[error("prices look too uniform ({distinct} distinct rounded values, stdev {stdev:.1})")]
    TooUniform { distinct: usize, stdev: f64 },

    /// The browsing backend itself failed (client construction, page
    /// creation, evaluation).
    #[error("browser failure: {reason}")]
    Browser { reason: String },
}

/// Result-store failures. Load-side `Io` with a missing file is handled
/// as "empty store" by the caller; write-side failures are fatal and
/// propagate to a non-zero exit.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("result store {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("result store {path}: {source}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },
}
