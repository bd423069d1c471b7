//! Price-text normalization: raw listing-card strings to numeric prices.
//!
//! Listing cards carry anything from `"$12,500"` to `"$10,000 - $14,000"`
//! to `"Call for price"` to a lone dash. The rules here turn that into
//! either one finite number or nothing — malformed text is dropped, never
//! an error.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

/// Phrases that mean "no real price", regardless of any digits present
/// (e.g. `"Call 555-1234 for price"`).
static NO_PRICE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)contact|call|no price|tbd|not priced|ask").unwrap());

/// A lone em/en dash (or hyphen) is the site's placeholder for a missing
/// price.
static DASH_ONLY: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*[—–-]\s*$").unwrap());

/// Two currency-like groups separated by a dash: `"$10,000 - $14,000"`.
/// Each group is 4–8 characters of digits and grouping punctuation,
/// which keeps a stray `"$500"` fee or a 3-digit monthly payment from
/// matching.
static RANGE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$?\s*([\d.,]{4,8})\s*[–-]\s*\$?\s*([\d.,]{4,8})").unwrap()
});

/// A single currency-like group: `"$12,500"`.
static SINGLE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\$?\s*([\d.,]{4,8})").unwrap());

/// Parse one raw price string into a numeric price.
///
/// Order of rules:
/// 1. "no real price" phrasing or a lone dash → `None`.
/// 2. A price range → arithmetic mean of its bounds.
/// 3. A single price → that value.
/// 4. Anything else, or a non-finite parse → `None`.
#[must_use]
pub fn parse_price_text(raw: &str) -> Option<f64> {
    let text = raw.trim();
    if text.is_empty() || NO_PRICE.is_match(text) || DASH_ONLY.is_match(text) {
        return None;
    }

    if let Some(captures) = RANGE.captures(text) {
        let low = parse_group(&captures[1])?;
        let high = parse_group(&captures[2])?;
        return Some((low + high) / 2.0);
    }

    if let Some(captures) = SINGLE.captures(text) {
        return parse_group(&captures[1]);
    }

    None
}

/// Bounds filter: values outside `[min, max]` are extraction noise (a
/// page year, a zip code, a monthly payment), not legitimate prices.
#[must_use]
pub fn within_bounds(value: f64, min: f64, max: f64) -> bool {
    value >= min && value <= max
}

/// Apply the optional configured extraction regex before parsing.
///
/// When `pattern` is set, the first capture group (or the whole match if
/// the pattern has no groups) becomes the text to parse; no match yields
/// an empty string, which the parser then drops.
#[must_use]
pub fn apply_pattern<'a>(raw: &'a str, pattern: Option<&Regex>) -> Cow<'a, str> {
    match pattern {
        None => Cow::Borrowed(raw),
        Some(re) => match re.captures(raw) {
            Some(captures) => {
                let matched = captures
                    .get(1)
                    .or_else(|| captures.get(0))
                    .map_or("", |m| m.as_str());
                Cow::Owned(matched.to_string())
            }
            None => Cow::Borrowed(""),
        },
    }
}

/// Strip grouping punctuation and parse as a number.
fn parse_group(group: &str) -> Option<f64> {
    let digits: String = group.chars().filter(|c| c.is_ascii_digit()).collect();
    let value = digits.parse::<f64>().ok()?;
    value.is_finite().then_some(value)
}

#[cfg(test)]
#[path = "price_test.rs"]
mod tests;
