//! The persisted result store: one CSV row per target identity.
//!
//! Persistence strategy is merge-and-rewrite: load the prior store, merge
//! the run's rows over it (new wins per identity), and rewrite the whole
//! file through a temp-file rename. A run terminated mid-pass therefore
//! never leaves a corrupt or duplicated store behind — the previous file
//! stays intact until the final rename.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use carmedian_core::{PriceSummary, TargetKey};

use crate::error::StoreError;

/// Load the persisted store into a map keyed by target identity.
///
/// A missing file is an empty store, not a failure. Should the file
/// carry duplicate identities (e.g. written by an older append-style
/// run), later rows win, so the in-memory view is always deduplicated.
///
/// # Errors
///
/// [`StoreError::Io`] when the file exists but cannot be read,
/// [`StoreError::Csv`] when a row does not parse.
pub fn load(path: &Path) -> Result<HashMap<TargetKey, PriceSummary>, StoreError> {
    let path_str = path.display().to_string();
    let file = match std::fs::File::open(path) {
        Ok(file) => file,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(HashMap::new()),
        Err(e) => {
            return Err(StoreError::Io {
                path: path_str,
                source: e,
            })
        }
    };

    let mut rows = HashMap::new();
    let mut reader = csv::Reader::from_reader(file);
    for record in reader.deserialize::<PriceSummary>() {
        let row = record.map_err(|e| StoreError::Csv {
            path: path_str.clone(),
            source: e,
        })?;
        rows.insert(row.key(), row);
    }
    Ok(rows)
}

/// Merge this run's rows over the existing store. For any identity
/// present in both, the new row wins — last write by run, no timestamp
/// comparison.
#[must_use]
pub fn merge(
    mut existing: HashMap<TargetKey, PriceSummary>,
    new_rows: Vec<PriceSummary>,
) -> HashMap<TargetKey, PriceSummary> {
    for row in new_rows {
        existing.insert(row.key(), row);
    }
    existing
}

/// Persist the full merged set, replacing any prior file content.
///
/// Rows are written sorted by identity for stable diffs, with exactly one
/// header. The write goes to a sibling temp file first and lands via
/// rename, so readers never observe a half-written store.
///
/// # Errors
///
/// [`StoreError::Io`] / [`StoreError::Csv`] on any write failure; the
/// caller treats these as fatal.
pub fn write(path: &Path, rows: &HashMap<TargetKey, PriceSummary>) -> Result<(), StoreError> {
    let path_str = path.display().to_string();
    let io_err = |e: std::io::Error| StoreError::Io {
        path: path_str.clone(),
        source: e,
    };

    let mut ordered: Vec<&PriceSummary> = rows.values().collect();
    ordered.sort_by_key(|row| row.key());

    let tmp_path = path.with_extension("csv.tmp");
    {
        let file = std::fs::File::create(&tmp_path).map_err(io_err)?;
        let mut writer = csv::Writer::from_writer(file);
        for row in ordered {
            writer.serialize(row).map_err(|e| StoreError::Csv {
                path: path_str.clone(),
                source: e,
            })?;
        }
        let mut file = writer
            .into_inner()
            .map_err(|e| io_err(e.into_error()))?;
        file.flush().map_err(io_err)?;
    }
    std::fs::rename(&tmp_path, path).map_err(io_err)?;
    Ok(())
}

#[cfg(test)]
#[path = "store_test.rs"]
mod tests;
