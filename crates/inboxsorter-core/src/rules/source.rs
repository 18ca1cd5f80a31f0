//! Rule sources.
//!
//! A rule source yields raw [`RuleRow`]s grouped the way the rule book is
//! maintained: one named group per destination, each listing sender
//! addresses or keywords.

use std::future::Future;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::Value;
use tracing::warn;

use super::model::{MatchScope, RowKind, RuleRow};
use crate::error::RuleLoadError;

/// Something that can produce raw rule rows.
pub trait RuleSource {
    /// Read all rule rows.
    ///
    /// Row-level problems are returned as rows with missing fields so the
    /// caller can skip them individually.
    ///
    /// # Errors
    ///
    /// Returns [`RuleLoadError::SourceUnavailable`] if nothing can be read.
    fn load_rows(&self) -> impl Future<Output = Result<Vec<RuleRow>, RuleLoadError>> + Send;
}

/// One group as written in the file. Kind and scope stay textual so an
/// unknown value only affects its own group.
#[derive(Debug, Deserialize)]
struct RuleGroup {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    kind: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    sender_only: bool,
    #[serde(default)]
    match_scope: Option<String>,
    #[serde(default)]
    entries: Vec<Value>,
}

impl RuleGroup {
    fn row_kind(&self) -> Option<RowKind> {
        match self.kind.as_deref()?.trim().to_lowercase().as_str() {
            "sender" => Some(RowKind::Sender {
                sender_only: self.sender_only,
            }),
            "keyword" => {
                let match_scope = match self.match_scope.as_deref() {
                    Some(scope) => MatchScope::parse(scope)?,
                    None => MatchScope::default(),
                };
                Some(RowKind::Keyword { match_scope })
            }
            _ => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RuleFile {
    #[serde(default)]
    groups: Vec<Value>,
}

/// Rule source backed by a JSON rules file.
///
/// ```json
/// {
///   "groups": [
///     { "name": "ResearchEmail", "kind": "sender", "destination": "Research",
///       "sender_only": true, "entries": ["lab@corp.com"] },
///     { "name": "Invoices", "kind": "keyword", "destination": "Finance\\Invoices",
///       "match_scope": "subject_and_body", "entries": ["invoice", 2024] }
///   ]
/// }
/// ```
#[derive(Debug, Clone)]
pub struct JsonRuleSource {
    path: PathBuf,
}

impl JsonRuleSource {
    /// Create a source reading from `path`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the rules file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Parse rule rows from JSON text.
    ///
    /// `null` and blank entries are treated as empty cells and dropped.
    /// Numbers are converted to their text form. Any other entry type, a
    /// group without a destination, or a group with an unknown kind or match
    /// scope produces rows that will be rejected; other groups still load.
    ///
    /// # Errors
    ///
    /// Returns [`RuleLoadError::SourceUnavailable`] if the text is not a valid rules file.
    pub fn parse(json: &str) -> Result<Vec<RuleRow>, RuleLoadError> {
        let file: RuleFile = serde_json::from_str(json)
            .map_err(|e| RuleLoadError::SourceUnavailable(format!("invalid rules file: {e}")))?;

        let mut rows = Vec::new();
        for (position, value) in file.groups.into_iter().enumerate() {
            let fallback_name = value
                .get("name")
                .and_then(Value::as_str)
                .map_or_else(|| format!("group {position}"), ToString::to_string);

            let group: RuleGroup = match serde_json::from_value(value) {
                Ok(group) => group,
                Err(e) => {
                    warn!(group = %fallback_name, error = %e, "Unreadable rule group");
                    rows.push(RuleRow {
                        group: fallback_name,
                        index: 0,
                        kind: RowKind::Unrecognized,
                        key: None,
                        destination: None,
                    });
                    continue;
                }
            };

            let name = group.name.clone().unwrap_or(fallback_name);
            let kind = group.row_kind().unwrap_or_else(|| {
                warn!(
                    group = %name,
                    kind = ?group.kind,
                    match_scope = ?group.match_scope,
                    "Unrecognized rule group"
                );
                RowKind::Unrecognized
            });

            for (index, entry) in group.entries.iter().enumerate() {
                let key = match entry {
                    Value::Null => continue,
                    Value::String(s) if s.trim().is_empty() => continue,
                    Value::String(s) => Some(s.clone()),
                    Value::Number(n) => Some(n.to_string()),
                    _ => None,
                };
                rows.push(RuleRow {
                    group: name.clone(),
                    index,
                    kind,
                    key,
                    destination: group.destination.clone(),
                });
            }
        }

        Ok(rows)
    }
}

impl RuleSource for JsonRuleSource {
    async fn load_rows(&self) -> Result<Vec<RuleRow>, RuleLoadError> {
        let contents = tokio::fs::read_to_string(&self.path).await.map_err(|e| {
            RuleLoadError::SourceUnavailable(format!("{}: {e}", self.path.display()))
        })?;
        Self::parse(&contents)
    }
}
