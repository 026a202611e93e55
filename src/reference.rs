//! Reference generation and run-scoped deduplication.
//!
//! A reference is the stable identity of an offer across runs:
//! `OPERATOR_CATEGORY_NAMESLUG_HASH`. The hash covers only stable inputs
//! (URL path and name slug) so re-running against unchanged pages reproduces
//! the same reference and record-store upserts update instead of duplicating.

use std::collections::HashSet;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use crate::offer::OfferCategory;

const OPERATOR_SLUG_LEN: usize = 8;
const NAME_SLUG_LEN: usize = 24;
const HASH_PREFIX_LEN: usize = 8;

/// Uppercase-alphanumeric slug, truncated to `max` characters
fn slugify(s: &str, max: usize) -> String {
    s.chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .take(max)
        .collect::<String>()
        .to_uppercase()
}

/// Strip scheme, host, query and fragment from a URL, keeping only the path.
/// Volatile query parameters must never influence an offer's identity.
fn url_path(url: &str) -> &str {
    let rest = match url.find("://") {
        Some(pos) => &url[pos + 3..],
        None => url,
    };
    let path = match rest.find('/') {
        Some(pos) => &rest[pos..],
        None => "",
    };
    let path = path.split('?').next().unwrap_or(path);
    path.split('#').next().unwrap_or(path)
}

/// Build the base reference for one offer. Deterministic: depends only on
/// operator, category, offer name and the URL path.
pub fn generate_reference(
    operator: &str,
    category: OfferCategory,
    offer_name: &str,
    source_url: &str,
) -> String {
    let operator_slug = slugify(operator, OPERATOR_SLUG_LEN);
    let name_slug = slugify(offer_name, NAME_SLUG_LEN);

    let mut hasher = Sha256::new();
    hasher.update(url_path(source_url).as_bytes());
    hasher.update(b"|");
    hasher.update(name_slug.as_bytes());
    let digest = hex::encode(hasher.finalize());

    format!(
        "{}_{}_{}_{}",
        operator_slug,
        category.code(),
        name_slug,
        &digest[..HASH_PREFIX_LEN]
    )
}

/// Run-scoped set of assigned references.
///
/// The pipeline may be driven from several crawler worker threads; this set
/// is the only shared state, so it carries its own lock.
#[derive(Debug, Default)]
pub struct ReferenceSet {
    inner: Mutex<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    seen: HashSet<String>,
    collisions: usize,
}

impl ReferenceSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a unique reference, suffixing `_2`, `_3`, ... on collision
    pub fn assign(&self, base: &str) -> String {
        let mut inner = self.inner.lock().expect("reference set lock poisoned");
        if inner.seen.insert(base.to_string()) {
            return base.to_string();
        }
        inner.collisions += 1;
        let mut n = 2;
        loop {
            let candidate = format!("{}_{}", base, n);
            if inner.seen.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }

    /// Number of collisions resolved by suffixing in this run
    pub fn collisions(&self) -> usize {
        self.inner.lock().expect("reference set lock poisoned").collisions
    }
}
