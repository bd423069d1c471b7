//! Command handlers: work-list planning and the scrape-merge-write run.

use std::collections::HashSet;
use std::path::Path;

use carmedian_core::{AppConfig, Target, TargetKey};
use carmedian_scraper::{plan_work, store, HttpBrowser, ResolvedTarget};

/// Print the effective work list without touching the network.
pub(crate) fn plan(config: &AppConfig, targets: &[Target], out: &Path) -> anyhow::Result<()> {
    let work = effective_work(config, targets, out);
    println!(
        "planning {} of {} targets (OFFSET={}, LIMIT={})",
        work.len(),
        targets.len(),
        config.offset,
        config.limit
    );
    for item in &work {
        println!("{}", plan_line(item));
    }
    Ok(())
}

/// Full pass: drive every planned target, then merge the collected rows
/// into the store.
///
/// A pass that collects zero rows is a normal completion — the store is
/// left untouched and the process exits zero. Only a failed final write
/// escapes as an error (the run's work would otherwise be silently
/// lost).
pub(crate) async fn scrape(
    config: &AppConfig,
    targets: &[Target],
    out: &Path,
) -> anyhow::Result<()> {
    let work = effective_work(config, targets, out);
    tracing::info!(
        total = targets.len(),
        planned = work.len(),
        offset = config.offset,
        limit = config.limit,
        "planned work list"
    );

    let browser = HttpBrowser::new(config)?;
    let report = carmedian_scraper::run(&browser, config, &work).await?;

    if report.rows.is_empty() {
        tracing::info!("no rows aggregated, store left untouched");
        return Ok(());
    }

    let merged = store::merge(load_lenient(out), report.rows);
    store::write(out, &merged)?;
    tracing::info!(
        rows = merged.len(),
        path = %out.display(),
        "store written"
    );
    Ok(())
}

fn effective_work(config: &AppConfig, targets: &[Target], out: &Path) -> Vec<ResolvedTarget> {
    let skip = if config.skip_existing {
        skip_set(out)
    } else {
        HashSet::new()
    };
    plan_work(
        targets,
        &config.url_template,
        config.offset,
        config.limit,
        &skip,
    )
}

/// Identities already present in the store, for `SKIP_EXISTING` runs.
fn skip_set(out: &Path) -> HashSet<TargetKey> {
    load_lenient(out).into_keys().collect()
}

/// Load the store, treating an unreadable one as empty. Load-side
/// failures are non-fatal; only the final write is allowed to kill the
/// run.
fn load_lenient(
    out: &Path,
) -> std::collections::HashMap<TargetKey, carmedian_core::PriceSummary> {
    match store::load(out) {
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!(path = %out.display(), error = %e, "cannot load result store, treating as empty");
            std::collections::HashMap::new()
        }
    }
}

fn plan_line(item: &ResolvedTarget) -> String {
    format!("{} -> {}", item.target.pretty(), item.url)
}

#[cfg(test)]
#[path = "run_test.rs"]
mod tests;
