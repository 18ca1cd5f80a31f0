//! In-memory rule tables.

use std::collections::HashMap;

use tracing::{debug, info, warn};

use super::model::{EmailRule, KeywordRule, MatchScope, RowKind, RuleRow};
use super::source::RuleSource;
use crate::error::RuleLoadError;

/// Sender and keyword rule tables for one run.
///
/// Keys are lower-cased on insert and the last write for a key wins.
/// Keyword rules keep the position of their first insertion, which is the
/// tie-break when several keywords match the same message.
#[derive(Debug, Clone, Default)]
pub struct RuleStore {
    sender_rules: HashMap<String, EmailRule>,
    keyword_rules: Vec<KeywordRule>,
    keyword_index: HashMap<String, usize>,
}

/// Outcome of loading rules from a source.
#[derive(Debug, Clone, Default)]
pub struct RuleLoad {
    /// The rules that were accepted.
    pub rules: RuleStore,
    /// Rows that were skipped.
    pub skipped: Vec<RuleLoadError>,
}

impl RuleStore {
    /// Create an empty rule store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load every row from `source`.
    ///
    /// Malformed rows are skipped and returned in [`RuleLoad::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`RuleLoadError::SourceUnavailable`] if the source cannot be read.
    pub async fn load<S: RuleSource>(source: &S) -> Result<RuleLoad, RuleLoadError> {
        let rows = source.load_rows().await?;
        let load = Self::from_rows(rows);
        info!(
            sender_rules = load.rules.sender_rule_count(),
            keyword_rules = load.rules.keyword_rule_count(),
            skipped = load.skipped.len(),
            "Loaded rules"
        );
        Ok(load)
    }

    /// Build a rule store from raw rows, skipping the malformed ones.
    #[must_use]
    pub fn from_rows<I>(rows: I) -> RuleLoad
    where
        I: IntoIterator<Item = RuleRow>,
    {
        let mut rules = Self::new();
        let mut skipped = Vec::new();

        for row in rows {
            if let Err(err) = rules.add_row(row) {
                warn!(error = %err, "Skipping rule row");
                skipped.push(err);
            }
        }

        RuleLoad { rules, skipped }
    }

    fn add_row(&mut self, row: RuleRow) -> Result<(), RuleLoadError> {
        let malformed = |reason: &str| RuleLoadError::MalformedRow {
            group: row.group.clone(),
            index: row.index,
            reason: reason.to_string(),
        };
        let required = || {
            let Some(key) = row.key.as_deref() else {
                return Err(malformed("missing address or keyword"));
            };
            match row.destination.as_deref() {
                Some(dest) if !dest.trim().is_empty() => Ok((key, dest)),
                _ => Err(malformed("missing destination")),
            }
        };

        match row.kind {
            RowKind::Sender { sender_only } => {
                let (key, destination) = required()?;
                self.add_sender_rule(key, destination, sender_only);
            }
            RowKind::Keyword { match_scope } => {
                let (key, destination) = required()?;
                self.add_keyword_rule(key, destination, match_scope);
            }
            RowKind::Unrecognized => {
                return Err(malformed("unrecognized group kind or match scope"));
            }
        }
        Ok(())
    }

    /// Add or replace the sender rule for `address`.
    pub fn add_sender_rule(&mut self, address: &str, destination: &str, sender_only: bool) {
        let address = address.to_lowercase();
        if self.sender_rules.contains_key(&address) {
            debug!(%address, "Replacing sender rule");
        }
        self.sender_rules.insert(
            address.clone(),
            EmailRule {
                address,
                destination: destination.to_string(),
                sender_only,
            },
        );
    }

    /// Add or replace the keyword rule for `keyword`.
    ///
    /// A replaced keyword keeps its original position.
    pub fn add_keyword_rule(&mut self, keyword: &str, destination: &str, match_scope: MatchScope) {
        let keyword = keyword.to_lowercase();
        let rule = KeywordRule {
            keyword: keyword.clone(),
            destination: destination.to_string(),
            match_scope,
        };

        if let Some(&slot) = self.keyword_index.get(&keyword) {
            debug!(%keyword, "Replacing keyword rule");
            self.keyword_rules[slot] = rule;
        } else {
            self.keyword_index.insert(keyword, self.keyword_rules.len());
            self.keyword_rules.push(rule);
        }
    }

    /// Look up the sender rule for an already lower-cased address.
    #[must_use]
    pub fn sender_rule(&self, address: &str) -> Option<&EmailRule> {
        self.sender_rules.get(address)
    }

    /// Keyword rules in load order.
    #[must_use]
    pub fn keyword_rules(&self) -> &[KeywordRule] {
        &self.keyword_rules
    }

    /// Number of sender rules.
    #[must_use]
    pub fn sender_rule_count(&self) -> usize {
        self.sender_rules.len()
    }

    /// Number of keyword rules.
    #[must_use]
    pub fn keyword_rule_count(&self) -> usize {
        self.keyword_rules.len()
    }

    /// Whether no rules are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sender_rules.is_empty() && self.keyword_rules.is_empty()
    }
}
