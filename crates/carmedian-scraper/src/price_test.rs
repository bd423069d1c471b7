use super::*;

// -----------------------------------------------------------------------
// parse_price_text
// -----------------------------------------------------------------------

#[test]
fn single_price_with_currency_and_grouping() {
    assert_eq!(parse_price_text("$12,500"), Some(12_500.0));
    assert_eq!(parse_price_text("  $ 9,999 "), Some(9_999.0));
    assert_eq!(parse_price_text("24500"), Some(24_500.0));
}

#[test]
fn range_yields_mean_of_bounds() {
    assert_eq!(parse_price_text("$10,000 - $14,000"), Some(12_000.0));
    assert_eq!(parse_price_text("15,000-17,000"), Some(16_000.0));
    // En dash separator.
    assert_eq!(parse_price_text("$10,000 – $14,000"), Some(12_000.0));
}

#[test]
fn placeholder_phrases_yield_no_value_even_with_digits() {
    assert_eq!(parse_price_text("Call for price"), None);
    assert_eq!(parse_price_text("Call 555-1234 for price"), None);
    assert_eq!(parse_price_text("Contact dealer"), None);
    assert_eq!(parse_price_text("Not Priced"), None);
    assert_eq!(parse_price_text("TBD"), None);
    assert_eq!(parse_price_text("Ask about $12,500"), None);
}

#[test]
fn lone_dash_yields_no_value() {
    assert_eq!(parse_price_text("—"), None);
    assert_eq!(parse_price_text(" – "), None);
    assert_eq!(parse_price_text("-"), None);
}

#[test]
fn empty_and_non_numeric_text_yield_no_value() {
    assert_eq!(parse_price_text(""), None);
    assert_eq!(parse_price_text("   "), None);
    assert_eq!(parse_price_text("Great deal!"), None);
}

#[test]
fn short_numeric_groups_do_not_match() {
    // 3 digits is below the 4-character group floor — monthly payments
    // and fees must not look like prices.
    assert_eq!(parse_price_text("$399"), None);
}

// -----------------------------------------------------------------------
// within_bounds
// -----------------------------------------------------------------------

#[test]
fn bounds_filter_drops_out_of_range_values() {
    assert!(within_bounds(12_500.0, 1_000.0, 300_000.0));
    assert!(within_bounds(1_000.0, 1_000.0, 300_000.0));
    // Parses fine, but above maxPrice: extraction noise.
    assert!(!within_bounds(500_000.0, 1_000.0, 300_000.0));
    // A page year that slipped through a selector.
    assert!(!within_bounds(2_024.0, 2_500.0, 300_000.0));
}

// -----------------------------------------------------------------------
// apply_pattern
// -----------------------------------------------------------------------

#[test]
fn pattern_with_group_extracts_the_group() {
    let re = regex::Regex::new(r"price:\s*(\S+)").unwrap();
    assert_eq!(apply_pattern("price: $12,500 obo", Some(&re)), "$12,500");
}

#[test]
fn pattern_without_group_uses_whole_match() {
    let re = regex::Regex::new(r"\$[\d,]+").unwrap();
    assert_eq!(apply_pattern("asking $12,500 obo", Some(&re)), "$12,500");
}

#[test]
fn pattern_miss_yields_empty_text() {
    let re = regex::Regex::new(r"price:\s*(\S+)").unwrap();
    assert_eq!(apply_pattern("no price here", Some(&re)), "");
}

#[test]
fn no_pattern_passes_text_through() {
    assert_eq!(apply_pattern("$12,500", None), "$12,500");
}
