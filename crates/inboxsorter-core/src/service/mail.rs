//! Mail object contracts.
//!
//! The mail client lives outside this crate. These traits describe the
//! small set of capabilities the sorter needs from it, so the classifier
//! and executor can run against any client (or a fake in tests).

use std::future::Future;

/// Errors reported by the mail client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MailError {
    /// A message field could not be read.
    #[error("Field unavailable: {0}")]
    FieldUnavailable(String),

    /// The client refused the operation.
    #[error("Access denied: {0}")]
    Denied(String),

    /// Operation failed.
    #[error("Operation failed: {0}")]
    Operation(String),
}

/// Read access to the fields of one message.
pub trait MailMessage {
    /// Message subject.
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read.
    fn subject(&self) -> Result<String, MailError>;

    /// Plain text body.
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read.
    fn body(&self) -> Result<String, MailError>;

    /// Sender address as reported by the client.
    ///
    /// # Errors
    ///
    /// Returns an error if the field cannot be read.
    fn sender_address(&self) -> Result<String, MailError>;

    /// Internal directory address of the sender, if the client considers
    /// the sender resolvable through the directory.
    fn internal_sender(&self) -> Option<String>;
}

/// Folder tree and message primitives of a mail store.
pub trait Mailbox {
    /// Handle to a folder.
    type Folder: Clone + Send + Sync;

    /// Handle to a message.
    type Message: MailMessage + Send + Sync;

    /// Find the direct child of `parent` called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder tree cannot be read.
    fn find_subfolder(
        &self,
        parent: &Self::Folder,
        name: &str,
    ) -> impl Future<Output = Result<Option<Self::Folder>, MailError>> + Send;

    /// Create a child of `parent` called `name`.
    ///
    /// # Errors
    ///
    /// Returns an error if the folder cannot be created.
    fn create_subfolder(
        &self,
        parent: &Self::Folder,
        name: &str,
    ) -> impl Future<Output = Result<Self::Folder, MailError>> + Send;

    /// Move `message` into `folder`.
    ///
    /// # Errors
    ///
    /// Returns an error if the move is rejected.
    fn move_message(
        &self,
        message: &Self::Message,
        folder: &Self::Folder,
    ) -> impl Future<Output = Result<(), MailError>> + Send;

    /// Delete `message`.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete is rejected.
    fn delete_message(
        &self,
        message: &Self::Message,
    ) -> impl Future<Output = Result<(), MailError>> + Send;
}
