//! Sender and keyword rules.
//!
//! Rules come in two tables:
//! - **Sender rules**: keyed by the exact (lower-cased) sender address
//! - **Keyword rules**: keyed by a substring searched for in the subject,
//!   or in the subject and body, evaluated in load order
//!
//! Both tables are rebuilt wholesale on every load.

mod model;
mod source;
mod store;

pub use model::{EmailRule, KeywordRule, MatchScope, RowKind, RuleRow};
pub use source::{JsonRuleSource, RuleSource};
pub use store::{RuleLoad, RuleStore};
