//! Mail-facing services.
//!
//! This module holds the contracts the sorter expects from a mail client
//! and the executor that turns a matched rule into a move or delete.

pub mod executor;
pub mod mail;

#[cfg(test)]
pub(crate) mod fake;

pub use executor::{
    ActionExecutor, ActionKind, ActionRecord, AUDIT_TARGET, DELETE_DESTINATION, FOLDER_SEPARATOR,
    find_or_create_folder,
};
pub use mail::{MailError, MailMessage, Mailbox};
