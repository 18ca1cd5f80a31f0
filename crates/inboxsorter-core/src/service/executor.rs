//! Applying routing decisions to messages.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, error, info};

use super::mail::{MailError, MailMessage, Mailbox};
use crate::classifier::{MatchType, RuleMatch};
use crate::error::ActionError;

/// Destination that deletes the message instead of moving it.
pub const DELETE_DESTINATION: &str = "delete";

/// Separator between folder names in a destination path.
pub const FOLDER_SEPARATOR: char = '\\';

/// Tracing target of the per-action audit line.
pub const AUDIT_TARGET: &str = "inboxsorter::audit";

/// What was done to a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ActionKind {
    /// Moved into a folder.
    Moved,
    /// Deleted.
    Deleted,
}

impl ActionKind {
    /// Name used in audit log lines.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Moved => "MOVED",
            Self::Deleted => "DELETED",
        }
    }
}

/// Journal entry for an applied action.
#[derive(Debug, Clone, Serialize)]
pub struct ActionRecord {
    /// What was done.
    pub action: ActionKind,
    /// Destination path or the delete sentinel.
    pub destination: String,
    /// Sender address or keyword that fired.
    pub trigger: String,
    /// Which rule table matched.
    pub match_type: MatchType,
    /// Subject of the message.
    pub subject: String,
    /// When the action was applied.
    pub applied_at: DateTime<Utc>,
}

/// Walk `path` below `root`, creating every missing folder on the way.
///
/// Empty segments (doubled or trailing separators) are ignored, so an
/// empty path resolves to `root` itself.
///
/// # Errors
///
/// Returns an error if a folder cannot be looked up or created.
pub async fn find_or_create_folder<M: Mailbox>(
    mailbox: &M,
    root: &M::Folder,
    path: &str,
) -> Result<M::Folder, MailError> {
    let mut current = root.clone();

    for segment in path.split(FOLDER_SEPARATOR).filter(|s| !s.is_empty()) {
        current = match mailbox.find_subfolder(&current, segment).await? {
            Some(folder) => folder,
            None => {
                debug!(%segment, %path, "Creating folder");
                mailbox.create_subfolder(&current, segment).await?
            }
        };
    }

    Ok(current)
}

/// Applies destinations to messages and keeps a journal of what was done.
#[derive(Debug, Default)]
pub struct ActionExecutor {
    journal: Vec<ActionRecord>,
}

impl ActionExecutor {
    /// Create an executor with an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply `rule` to `message`.
    ///
    /// Returns `true` if the message was moved or deleted. Failures are
    /// logged with the destination and leave the message where it was.
    pub async fn execute<M: Mailbox>(
        &mut self,
        mailbox: &M,
        message: &M::Message,
        root: &M::Folder,
        rule: &RuleMatch,
    ) -> bool {
        match Self::apply(mailbox, message, root, rule).await {
            Ok(record) => {
                info!(
                    target: AUDIT_TARGET,
                    action = record.action.as_str(),
                    destination = %record.destination,
                    trigger = %record.trigger,
                    match_type = %record.match_type,
                    subject = %record.subject,
                    "Action applied"
                );
                self.journal.push(record);
                true
            }
            Err(e) => {
                error!(
                    destination = %e.destination,
                    trigger = %rule.trigger,
                    match_type = %rule.match_type,
                    error = %e.source,
                    "Action failed"
                );
                false
            }
        }
    }

    /// Apply `rule` to `message` without logging or journaling.
    ///
    /// # Errors
    ///
    /// Returns an [`ActionError`] if the mail client rejects any step.
    pub async fn apply<M: Mailbox>(
        mailbox: &M,
        message: &M::Message,
        root: &M::Folder,
        rule: &RuleMatch,
    ) -> Result<ActionRecord, ActionError> {
        let failed = |source: MailError| ActionError {
            destination: rule.destination.clone(),
            source,
        };

        let action = if rule.destination == DELETE_DESTINATION {
            mailbox.delete_message(message).await.map_err(failed)?;
            ActionKind::Deleted
        } else {
            let folder = find_or_create_folder(mailbox, root, &rule.destination)
                .await
                .map_err(failed)?;
            mailbox
                .move_message(message, &folder)
                .await
                .map_err(failed)?;
            ActionKind::Moved
        };

        Ok(ActionRecord {
            action,
            destination: rule.destination.clone(),
            trigger: rule.trigger.clone(),
            match_type: rule.match_type,
            subject: message.subject().unwrap_or_default(),
            applied_at: Utc::now(),
        })
    }

    /// Actions applied so far, oldest first.
    #[must_use]
    pub fn journal(&self) -> &[ActionRecord] {
        &self.journal
    }

    /// Take the journal, leaving it empty.
    pub fn take_journal(&mut self) -> Vec<ActionRecord> {
        std::mem::take(&mut self.journal)
    }
}
