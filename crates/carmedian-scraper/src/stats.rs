//! Statistical aggregation of normalized prices for one target.

use crate::error::ScrapeError;

/// Population standard deviation below this many currency units means the
/// samples are implausibly tight for genuine used-listing prices.
const STDEV_FLOOR: f64 = 150.0;

/// Rounding granularity for the distinct-value check of the uniformity
/// guard.
const ROUND_STEP: f64 = 10.0;

/// Quartile summary of one target's sample set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Quartiles {
    pub median: i64,
    pub p25: i64,
    pub p75: i64,
    pub n: usize,
}

/// Quantile `q` over `sorted` (ascending) with linear interpolation
/// between order statistics.
///
/// For `n` values: `pos = (n-1)*q`, `base = floor(pos)`,
/// `rest = pos - base`, result
/// `sorted[base] + rest * (sorted[base+1] - sorted[base])` when `base+1`
/// is in range, else `sorted[base]`.
#[must_use]
pub fn quantile(sorted: &[f64], q: f64) -> f64 {
    if sorted.is_empty() {
        return f64::NAN;
    }
    #[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    {
        let pos = (sorted.len() - 1) as f64 * q;
        let base = pos.floor() as usize;
        let rest = pos - pos.floor();
        match sorted.get(base + 1) {
            Some(&next) => sorted[base] + rest * (next - sorted[base]),
            None => sorted[base],
        }
    }
}

/// Population standard deviation. Zero for an empty slice.
#[must_use]
pub fn stdev(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    #[allow(clippy::cast_precision_loss)]
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;
    variance.sqrt()
}

/// Reduce one target's in-range prices to a quartile summary, or reject.
///
/// Rejection happens in two stages:
/// 1. `InsufficientSamples` when fewer than `min_prices` values remain
///    after normalization and bounds filtering.
/// 2. `TooUniform` when the values round (to the nearest 10) into at most
///    two distinct buckets, or their standard deviation sits under
///    [`STDEV_FLOOR`]. A selector that bound to a placeholder or repeated
///    decorative element produces exactly this shape, and without the
///    guard it would yield a confident-looking but meaningless summary.
///
/// # Errors
///
/// See above; both variants carry enough context for the driver's log
/// line.
pub fn summarize(values: &[f64], min_prices: usize) -> Result<Quartiles, ScrapeError> {
    if values.len() < min_prices {
        return Err(ScrapeError::InsufficientSamples {
            got: values.len(),
            need: min_prices,
        });
    }

    let distinct = distinct_rounded(values);
    let spread = stdev(values);
    if distinct <= 2 || spread < STDEV_FLOOR {
        return Err(ScrapeError::TooUniform {
            distinct,
            stdev: spread,
        });
    }

    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    #[allow(clippy::cast_possible_truncation)]
    Ok(Quartiles {
        median: quantile(&sorted, 0.5).round() as i64,
        p25: quantile(&sorted, 0.25).round() as i64,
        p75: quantile(&sorted, 0.75).round() as i64,
        n: values.len(),
    })
}

fn distinct_rounded(values: &[f64]) -> usize {
    let mut buckets: Vec<i64> = values
        .iter()
        .map(|v| {
            #[allow(clippy::cast_possible_truncation)]
            let bucket = (v / ROUND_STEP).round() as i64;
            bucket
        })
        .collect();
    buckets.sort_unstable();
    buckets.dedup();
    buckets.len()
}

#[cfg(test)]
#[path = "stats_test.rs"]
mod tests;
