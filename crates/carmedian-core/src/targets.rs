use std::path::Path;

use crate::{ConfigError, Target};

/// Display normalization for make/model strings: `-` and `_` fold to
/// spaces, whitespace collapses, and each word gets a leading capital.
/// `"land-rover"` → `"Land Rover"`, `"f-150"` → `"F 150"`.
///
/// Idempotent; applied to persisted rows and to identity keys so that
/// catalog spelling variants map to one stored row.
#[must_use]
pub fn display_name(raw: &str) -> String {
    let folded: String = raw
        .trim()
        .chars()
        .map(|c| if c == '-' || c == '_' { ' ' } else { c })
        .collect();
    folded
        .split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Load the target catalog from a CSV file with `year, make, model`
/// columns (matched case-insensitively, extra columns ignored).
///
/// Rows missing any of the three fields, or with an unparseable year, are
/// skipped silently — the catalog is generated upstream and partial rows
/// are expected.
///
/// # Errors
///
/// Returns [`ConfigError::CatalogIo`] if the file cannot be opened and
/// [`ConfigError::CatalogCsv`] if it is not valid CSV.
pub fn load_targets(path: &Path) -> Result<Vec<Target>, ConfigError> {
    let path_str = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| ConfigError::CatalogIo {
        path: path_str.clone(),
        source: e,
    })?;

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader
        .headers()
        .map_err(|e| ConfigError::CatalogCsv {
            path: path_str.clone(),
            source: e,
        })?
        .clone();

    let column = |name: &str| -> Option<usize> {
        headers
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name))
    };
    let (Some(year_col), Some(make_col), Some(model_col)) =
        (column("year"), column("make"), column("model"))
    else {
        return Err(ConfigError::Validation(format!(
            "target catalog {path_str} must have year, make, model columns"
        )));
    };

    let mut targets = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| ConfigError::CatalogCsv {
            path: path_str.clone(),
            source: e,
        })?;
        let field = |idx: usize| record.get(idx).map(str::trim).unwrap_or_default();

        let make = field(make_col);
        let model = field(model_col);
        let Ok(year) = field(year_col).parse::<i32>() else {
            continue;
        };
        if make.is_empty() || model.is_empty() {
            continue;
        }
        targets.push(Target {
            year,
            make: make.to_string(),
            model: model.to_string(),
        });
    }
    Ok(targets)
}

#[cfg(test)]
#[path = "targets_test.rs"]
mod tests;
