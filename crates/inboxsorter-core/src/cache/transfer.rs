//! Export and import of the cache table as JSON.

use std::collections::HashSet;
use std::path::Path;

use tracing::{info, warn};

use super::model::CacheEntry;
use super::repository::CacheStore;
use crate::Result;

/// Write every stored entry to `path` as a JSON array.
///
/// Returns the number of exported entries.
///
/// # Errors
///
/// Returns an error if the store cannot be read or the file cannot be written.
pub async fn export_to_json<S: CacheStore>(store: &S, path: &Path) -> Result<usize> {
    let mut entries = store.load_all().await?;
    entries.sort_by(|a, b| a.internal_address.cmp(&b.internal_address));

    let contents = serde_json::to_string_pretty(&entries)?;
    tokio::fs::write(path, contents).await?;

    info!(entries = entries.len(), path = %path.display(), "Exported address cache");
    Ok(entries.len())
}

/// Clean up imported entries.
///
/// Keys are trimmed and lower-cased, blank keys are dropped and only the
/// first occurrence of each key is kept.
#[must_use]
pub fn normalize_import(entries: Vec<CacheEntry>) -> Vec<CacheEntry> {
    let mut seen = HashSet::new();
    let mut cleaned = Vec::with_capacity(entries.len());

    for entry in entries {
        let key = entry.internal_address.trim().to_lowercase();
        if key.is_empty() {
            warn!("Dropping imported entry with a blank address");
            continue;
        }
        if seen.insert(key.clone()) {
            cleaned.push(CacheEntry {
                internal_address: key,
                canonical_address: entry.canonical_address,
            });
        }
    }

    cleaned
}

/// Replace the store content with the entries in the JSON file at `path`.
///
/// Returns the number of entries written after normalization.
///
/// # Errors
///
/// Returns an error if the file cannot be read or parsed, or the store
/// cannot be written.
pub async fn import_from_json<S: CacheStore>(store: &S, path: &Path) -> Result<usize> {
    let contents = tokio::fs::read_to_string(path).await?;
    let parsed: Vec<CacheEntry> = serde_json::from_str(&contents)?;
    let total = parsed.len();

    let entries = normalize_import(parsed);
    store.replace_all(&entries).await?;

    info!(
        read = total,
        written = entries.len(),
        path = %path.display(),
        "Imported address cache"
    );
    Ok(entries.len())
}
