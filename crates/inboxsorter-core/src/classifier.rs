//! Message classification.
//!
//! Sender rules are checked first and short-circuit keyword evaluation.
//! Keyword rules are then tried in load order and the first hit wins.

use serde::Serialize;

use crate::rules::RuleStore;

/// Which rule table produced a match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum MatchType {
    /// Matched a sender rule.
    EmailMatch,
    /// Matched a keyword rule.
    KeywordMatch,
}

impl MatchType {
    /// Name used in audit log lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::EmailMatch => "EmailMatch",
            Self::KeywordMatch => "KeywordMatch",
        }
    }
}

impl std::fmt::Display for MatchType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The rule that applies to a message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleMatch {
    /// Folder path or the delete sentinel.
    pub destination: String,
    /// Sender address or keyword that fired.
    pub trigger: String,
    /// Which table the rule came from.
    pub match_type: MatchType,
}

/// Decide which rule, if any, applies to a message.
///
/// All inputs are lower-cased before matching. Keyword containment is a
/// plain substring test, so short keywords also hit inside longer words.
#[must_use]
pub fn classify(
    rules: &RuleStore,
    sender_address: &str,
    subject: &str,
    body: &str,
) -> Option<RuleMatch> {
    let sender = sender_address.to_lowercase();

    if let Some(rule) = rules.sender_rule(&sender) {
        // `sender_only` can only reject an empty sender, which needs an
        // empty-key rule to get here in the first place.
        if !rule.sender_only || !sender.is_empty() {
            return Some(RuleMatch {
                destination: rule.destination.clone(),
                trigger: sender,
                match_type: MatchType::EmailMatch,
            });
        }
    }

    let subject = subject.to_lowercase();
    let body = body.to_lowercase();

    rules
        .keyword_rules()
        .iter()
        .find(|rule| rule.match_scope.matches(&rule.keyword, &subject, &body))
        .map(|rule| RuleMatch {
            destination: rule.destination.clone(),
            trigger: rule.keyword.clone(),
            match_type: MatchType::KeywordMatch,
        })
}
