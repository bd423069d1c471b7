use std::path::Path;

use serde::Deserialize;

use crate::app_config::AppConfig;
use crate::ConfigError;

/// Tokens the URL template may contain. A template with none of these
/// would fetch the same page for every target, so validation requires at
/// least one.
pub const TEMPLATE_TOKENS: [&str; 5] = ["{year}", "{make}", "{model}", "{makeSlug}", "{modelSlug}"];

/// Optional YAML override file. Every field is optional; anything absent
/// keeps its default. Field names mirror the config document shape
/// (`urlTemplate`, `minPrices`, ...).
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
struct ConfigFile {
    url_template: Option<String>,
    min_prices: Option<usize>,
    min_price: Option<f64>,
    max_price: Option<f64>,
    page_timeout_ms: Option<u64>,
    selector_timeout_ms: Option<u64>,
    selector_card: Option<String>,
    selector_price_candidates: Option<Vec<String>>,
    price_attribute: Option<String>,
    price_pattern: Option<String>,
    max_cards: Option<usize>,
    scroll_rounds: Option<usize>,
    source: Option<String>,
    user_agent: Option<String>,
}

/// Load configuration from defaults, an optional YAML override file, and
/// environment overrides.
///
/// Calls `dotenvy::dotenv().ok()` first so a `.env` file participates in
/// the environment layer.
///
/// # Errors
///
/// Returns `ConfigError` if the override file cannot be read or parsed,
/// an environment override has an unparseable value, or the merged result
/// fails validation.
pub fn load_config(overrides_path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    let file = match overrides_path {
        Some(path) => read_config_file(path)?,
        None => ConfigFile::default(),
    };
    build_config(file, |key| std::env::var(key))
}

/// Like [`load_config`] but without `.env` loading or an override file —
/// the environment already in the process is the only override layer.
///
/// # Errors
///
/// Returns `ConfigError` on unparseable environment values or failed
/// validation.
pub fn load_config_from_env() -> Result<AppConfig, ConfigError> {
    build_config(ConfigFile::default(), |key| std::env::var(key))
}

fn read_config_file(path: &Path) -> Result<ConfigFile, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|e| ConfigError::FileIo {
        path: path.display().to_string(),
        source: e,
    })?;
    Ok(serde_yaml::from_str(&content)?)
}

/// Merge defaults, file overrides, and environment overrides into a
/// validated [`AppConfig`].
///
/// Decoupled from the real environment via `lookup` so tests can drive it
/// with a plain map.
fn build_config<F>(file: ConfigFile, lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let parse_u64 = |var: &str, fallback: u64| -> Result<u64, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(fallback),
        }
    };
    let parse_usize = |var: &str, fallback: usize| -> Result<usize, ConfigError> {
        match lookup(var) {
            Ok(raw) => raw.parse::<usize>().map_err(|e| ConfigError::InvalidEnvVar {
                var: var.to_string(),
                reason: e.to_string(),
            }),
            Err(_) => Ok(fallback),
        }
    };
    let parse_flag = |var: &str, fallback: bool| -> bool {
        match lookup(var) {
            Ok(raw) => !matches!(raw.trim(), "" | "0" | "false" | "no" | "off"),
            Err(_) => fallback,
        }
    };

    // The default template anchors a nationwide used-listing search to a
    // ZIP (the site requires one in the URL).
    let zip = lookup("ZIP").unwrap_or_else(|_| "94103".to_string());
    let default_template = format!(
        "https://www.cars.com/shopping/results/?stock_type=used\
         &makes[]={{makeSlug}}&models[]={{makeSlug}}-{{modelSlug}}\
         &year_min={{year}}&year_max={{year}}&maximum_distance=all&zip={zip}"
    );

    let config = AppConfig {
        url_template: file.url_template.unwrap_or(default_template),
        min_prices: file.min_prices.unwrap_or(12),
        min_price: file.min_price.unwrap_or(1_000.0),
        max_price: file.max_price.unwrap_or(300_000.0),
        page_timeout_ms: file.page_timeout_ms.unwrap_or(60_000),
        selector_timeout_ms: file.selector_timeout_ms.unwrap_or(45_000),
        card_selector: file.selector_card.unwrap_or_else(|| ".vehicle-card".to_string()),
        price_selectors: file.selector_price_candidates.unwrap_or_else(|| {
            vec![
                "[data-test=\"vehicleCardPrice\"]".to_string(),
                ".primary-price".to_string(),
                "[class*=\"price\"]".to_string(),
            ]
        }),
        price_attribute: file.price_attribute,
        price_pattern: file.price_pattern,
        max_cards: file.max_cards.unwrap_or(80),
        scroll_rounds: file.scroll_rounds.unwrap_or(12),
        source: file.source.unwrap_or_else(|| "www.cars.com".to_string()),
        user_agent: file.user_agent.unwrap_or_else(|| {
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 \
             (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36"
                .to_string()
        }),
        rate_limit_ms: parse_u64("RATE_LIMIT_MS", 2_500)?,
        headless: parse_flag("HEADLESS", true),
        offset: parse_usize("OFFSET", 0)?,
        limit: parse_usize("LIMIT", 20)?,
        debug: parse_flag("DEBUG", false),
        skip_existing: parse_flag("SKIP_EXISTING", false),
    };

    validate(&config)?;
    Ok(config)
}

fn validate(config: &AppConfig) -> Result<(), ConfigError> {
    if config.url_template.trim().is_empty() {
        return Err(ConfigError::Validation(
            "urlTemplate must be non-empty".to_string(),
        ));
    }
    if !TEMPLATE_TOKENS
        .iter()
        .any(|t| config.url_template.contains(t))
    {
        return Err(ConfigError::Validation(format!(
            "urlTemplate contains none of the recognized tokens {TEMPLATE_TOKENS:?}"
        )));
    }
    if config.min_prices == 0 {
        return Err(ConfigError::Validation(
            "minPrices must be at least 1".to_string(),
        ));
    }
    if config.min_price >= config.max_price {
        return Err(ConfigError::Validation(format!(
            "minPrice ({}) must be below maxPrice ({})",
            config.min_price, config.max_price
        )));
    }
    if config.card_selector.trim().is_empty() {
        return Err(ConfigError::Validation(
            "selectorCard must be non-empty".to_string(),
        ));
    }
    if config.price_selectors.is_empty() {
        return Err(ConfigError::Validation(
            "selectorPriceCandidates must list at least one selector".to_string(),
        ));
    }
    if let Some(pattern) = &config.price_pattern {
        regex::Regex::new(pattern).map_err(|e| {
            ConfigError::Validation(format!("pricePattern does not compile: {e}"))
        })?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;
