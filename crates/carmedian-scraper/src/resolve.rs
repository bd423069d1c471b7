//! Target resolution: URL templating, slugging, and work-list windowing.

use std::collections::HashSet;

use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};

use carmedian_core::{Target, TargetKey};

/// Percent-encoding set matching JavaScript's `encodeURIComponent`:
/// everything but alphanumerics and `- _ . ! ~ * ' ( )`.
const URL_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// A target with its fully substituted request URL. Derived per run,
/// never persisted.
#[derive(Debug, Clone)]
pub struct ResolvedTarget {
    pub target: Target,
    pub url: String,
}

/// URL-safe slug: lowercase, any run of characters outside `[a-z0-9]`
/// collapses to a single `-`, leading/trailing `-` stripped.
/// `"F-150"` → `"f-150"`, `"Grand  Cherokee"` → `"grand-cherokee"`.
#[must_use]
pub fn slug(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut pending_dash = false;
    for c in raw.chars().flat_map(char::to_lowercase) {
        if c.is_ascii_alphanumeric() {
            if pending_dash && !out.is_empty() {
                out.push('-');
            }
            pending_dash = false;
            out.push(c);
        } else {
            pending_dash = true;
        }
    }
    out
}

/// Substitute every occurrence of every recognized token in `template`.
///
/// Tokens: `{year}`, `{make}`, `{model}`, `{makeSlug}`, `{modelSlug}`.
/// Replacing all occurrences matters — templates commonly embed a token
/// twice (e.g. `makes[]={makeSlug}&models[]={makeSlug}-{modelSlug}`).
/// Each substituted value is percent-encoded.
#[must_use]
pub fn resolve_url(template: &str, target: &Target) -> String {
    let encode = |value: &str| utf8_percent_encode(value, URL_COMPONENT).to_string();

    let substitutions = [
        ("{year}", encode(&target.year.to_string())),
        ("{make}", encode(&target.make)),
        ("{model}", encode(&target.model)),
        ("{makeSlug}", encode(&slug(&target.make))),
        ("{modelSlug}", encode(&slug(&target.model))),
    ];

    let mut url = template.to_string();
    for (token, value) in &substitutions {
        url = url.replace(token, value);
    }
    url
}

/// Build the effective work list: drop targets whose identity is in
/// `skip`, then window the remainder to `[offset, offset + limit)`, then
/// resolve URLs. Order of the input sequence is preserved.
#[must_use]
pub fn plan_work(
    targets: &[Target],
    template: &str,
    offset: usize,
    limit: usize,
    skip: &HashSet<TargetKey>,
) -> Vec<ResolvedTarget> {
    targets
        .iter()
        .filter(|t| !skip.contains(&t.key()))
        .skip(offset)
        .take(limit)
        .map(|t| ResolvedTarget {
            target: t.clone(),
            url: resolve_url(template, t),
        })
        .collect()
}

#[cfg(test)]
#[path = "resolve_test.rs"]
mod tests;
