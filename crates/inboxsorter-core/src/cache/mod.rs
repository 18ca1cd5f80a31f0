//! Address resolution cache.
//!
//! Maps internal directory addresses to canonical mail addresses. Entries
//! are held in memory for the whole run, resolved through the directory on
//! a miss, and written back to `SQLite` in full every
//! `cache_save_interval` new resolutions.

mod model;
mod repository;
mod resolver;
mod transfer;

pub use model::CacheEntry;
pub use repository::{CacheStore, SqliteCacheStore};
pub use resolver::{AddressResolutionCache, DEFAULT_CACHE_SAVE_INTERVAL, DirectoryResolver};
pub use transfer::{export_to_json, import_from_json, normalize_import};
