//! # inboxsorter-core
//!
//! Core logic for `InboxSorter`.
//!
//! This crate provides:
//! - **Rules** - sender-address and keyword rule tables
//! - **Classifier** - first-match routing of a message to a destination
//! - **Address Cache** - write-back cache of internal to canonical addresses (`SQLite`)
//! - **Executor** - move/delete actions with on-demand folder creation
//! - **Session** - one sorting run over a sequence of messages

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![forbid(unsafe_code)]

pub mod cache;
pub mod classifier;
pub mod config;
mod error;
pub mod rules;
pub mod service;
pub mod session;

pub use cache::{
    AddressResolutionCache, CacheEntry, CacheStore, DirectoryResolver, SqliteCacheStore,
};
pub use classifier::{MatchType, RuleMatch, classify};
pub use config::{ConfigError, SorterConfig};
pub use error::{
    ActionError, CacheLoadError, CacheSaveError, ClassificationError, Error, ResolveError,
    Result, RuleLoadError,
};
pub use rules::{JsonRuleSource, MatchScope, RuleLoad, RuleSource, RuleStore};
pub use service::{
    ActionExecutor, ActionKind, ActionRecord, DELETE_DESTINATION, MailError, MailMessage, Mailbox,
};
pub use session::{MessageOutcome, RunSummary, SortSession};
