//! Rule data models.

/// Which message fields a keyword rule searches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MatchScope {
    /// Only the subject line is searched.
    #[default]
    SubjectOnly,
    /// Subject and body are both searched.
    SubjectAndBody,
}

impl MatchScope {
    /// Parse from the rule file representation.
    ///
    /// Returns `None` for anything but `subject_only` or `subject_and_body`.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "subject_only" => Some(Self::SubjectOnly),
            "subject_and_body" => Some(Self::SubjectAndBody),
            _ => None,
        }
    }

    /// Convert to the rule file representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SubjectOnly => "subject_only",
            Self::SubjectAndBody => "subject_and_body",
        }
    }

    /// Whether `keyword` occurs in the fields this scope covers.
    ///
    /// All three arguments are expected to be lower-cased already.
    #[must_use]
    pub fn matches(&self, keyword: &str, subject: &str, body: &str) -> bool {
        match self {
            Self::SubjectOnly => subject.contains(keyword),
            Self::SubjectAndBody => subject.contains(keyword) || body.contains(keyword),
        }
    }
}

/// A rule keyed by exact sender address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailRule {
    /// Sender address (normalized to lowercase).
    pub address: String,
    /// Folder path or the delete sentinel.
    pub destination: String,
    /// Only fire when the sender address is non-empty.
    pub sender_only: bool,
}

/// A rule keyed by a substring of the subject and/or body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordRule {
    /// Keyword (normalized to lowercase).
    pub keyword: String,
    /// Folder path or the delete sentinel.
    pub destination: String,
    /// Fields searched for the keyword.
    pub match_scope: MatchScope,
}

/// Category-specific part of a raw rule row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowKind {
    /// Row of a sender-address group.
    Sender {
        /// See [`EmailRule::sender_only`].
        sender_only: bool,
    },
    /// Row of a keyword group.
    Keyword {
        /// See [`KeywordRule::match_scope`].
        match_scope: MatchScope,
    },
    /// Row of a group whose kind or match scope is not understood.
    Unrecognized,
}

/// A raw rule row as produced by a rule source, before validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuleRow {
    /// Name of the group (sheet) the row belongs to.
    pub group: String,
    /// Position of the row inside its group.
    pub index: usize,
    /// Sender or keyword specific settings.
    pub kind: RowKind,
    /// Sender address or keyword.
    pub key: Option<String>,
    /// Destination folder path or the delete sentinel.
    pub destination: Option<String>,
}

impl RuleRow {
    /// Build a sender rule row.
    #[must_use]
    pub fn sender(
        group: &str,
        index: usize,
        address: &str,
        destination: &str,
        sender_only: bool,
    ) -> Self {
        Self {
            group: group.to_string(),
            index,
            kind: RowKind::Sender { sender_only },
            key: Some(address.to_string()),
            destination: Some(destination.to_string()),
        }
    }

    /// Build a keyword rule row.
    #[must_use]
    pub fn keyword(
        group: &str,
        index: usize,
        keyword: &str,
        destination: &str,
        match_scope: MatchScope,
    ) -> Self {
        Self {
            group: group.to_string(),
            index,
            kind: RowKind::Keyword { match_scope },
            key: Some(keyword.to_string()),
            destination: Some(destination.to_string()),
        }
    }
}
