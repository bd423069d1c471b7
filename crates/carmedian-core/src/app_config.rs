/// Immutable runtime configuration, validated once at startup and passed
/// by reference into every component.
///
/// Built by [`crate::config::load_config`] from defaults, an optional YAML
/// override file, and environment overrides — in that precedence order.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Search-results URL template. Every occurrence of `{year}`, `{make}`,
    /// `{model}`, `{makeSlug}` and `{modelSlug}` is substituted per target.
    pub url_template: String,
    /// Minimum normalized prices required before a summary is emitted.
    pub min_prices: usize,
    /// Lower bound of plausible listing prices; parsed values below this
    /// are treated as extraction noise and dropped.
    pub min_price: f64,
    /// Upper bound of plausible listing prices.
    pub max_price: f64,
    /// Navigation timeout in milliseconds.
    pub page_timeout_ms: u64,
    /// Timeout in milliseconds for the listing-card selector to appear.
    pub selector_timeout_ms: u64,
    /// Selector matching one listing card.
    pub card_selector: String,
    /// Ordered candidates for the price-bearing element inside a card;
    /// the first one yielding non-empty text wins.
    pub price_selectors: Vec<String>,
    /// When set, read this attribute from the price element instead of its
    /// text content.
    pub price_attribute: Option<String>,
    /// Optional pre-extraction regex applied to the raw element text; the
    /// first capture group (or whole match) feeds the price parser.
    pub price_pattern: Option<String>,
    /// Cards examined per page, counted from the top of the results.
    pub max_cards: usize,
    /// Maximum scroll-and-wait cycles to trigger lazy-loaded listings.
    pub scroll_rounds: usize,
    /// `source` column value for persisted rows.
    pub source: String,
    /// User agent presented by the browsing backend.
    pub user_agent: String,
    /// Minimum delay between targets, in milliseconds.
    pub rate_limit_ms: u64,
    /// Headless-mode toggle forwarded to the browsing backend.
    pub headless: bool,
    /// Zero-based offset into the resolved target list.
    pub offset: usize,
    /// Number of targets to process from `offset`.
    pub limit: usize,
    /// Log raw and parsed price samples per target.
    pub debug: bool,
    /// Drop targets whose identity is already present in the result store.
    pub skip_existing: bool,
}
