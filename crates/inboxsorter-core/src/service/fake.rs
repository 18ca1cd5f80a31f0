//! In-memory mail client used by unit tests.

use std::collections::{BTreeSet, HashSet};
use std::sync::Mutex;

use super::mail::{MailError, MailMessage, Mailbox};

/// A message with fixed fields.
#[derive(Debug, Clone)]
pub struct FakeMessage {
    pub id: u32,
    pub subject: Result<String, MailError>,
    pub body: Result<String, MailError>,
    pub sender: Result<String, MailError>,
    pub internal: Option<String>,
}

impl FakeMessage {
    pub fn new(id: u32, sender: &str, subject: &str, body: &str) -> Self {
        Self {
            id,
            subject: Ok(subject.to_string()),
            body: Ok(body.to_string()),
            sender: Ok(sender.to_string()),
            internal: None,
        }
    }

    pub fn internal(mut self, internal_address: &str) -> Self {
        self.internal = Some(internal_address.to_string());
        self
    }
}

impl MailMessage for FakeMessage {
    fn subject(&self) -> Result<String, MailError> {
        self.subject.clone()
    }

    fn body(&self) -> Result<String, MailError> {
        self.body.clone()
    }

    fn sender_address(&self) -> Result<String, MailError> {
        self.sender.clone()
    }

    fn internal_sender(&self) -> Option<String> {
        self.internal.clone()
    }
}

/// Folder tree keyed by `\`-joined path; the root is the empty path.
#[derive(Debug, Default)]
pub struct FakeMailbox {
    folders: Mutex<BTreeSet<String>>,
    created: Mutex<Vec<String>>,
    moves: Mutex<Vec<(u32, String)>>,
    deleted: Mutex<Vec<u32>>,
    denied: Mutex<HashSet<String>>,
    reject_moves: Mutex<bool>,
}

#[allow(clippy::unwrap_used)]
impl FakeMailbox {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_folders(paths: &[&str]) -> Self {
        let mailbox = Self::new();
        mailbox
            .folders
            .lock()
            .unwrap()
            .extend(paths.iter().map(|p| (*p).to_string()));
        mailbox
    }

    pub fn root(&self) -> String {
        String::new()
    }

    pub fn deny_create(&self, name: &str) {
        self.denied.lock().unwrap().insert(name.to_string());
    }

    pub fn reject_moves(&self) {
        *self.reject_moves.lock().unwrap() = true;
    }

    pub fn created(&self) -> Vec<String> {
        self.created.lock().unwrap().clone()
    }

    pub fn moves(&self) -> Vec<(u32, String)> {
        self.moves.lock().unwrap().clone()
    }

    pub fn deleted(&self) -> Vec<u32> {
        self.deleted.lock().unwrap().clone()
    }

    fn child(parent: &str, name: &str) -> String {
        if parent.is_empty() {
            name.to_string()
        } else {
            format!("{parent}\\{name}")
        }
    }
}

#[allow(clippy::unwrap_used)]
impl Mailbox for FakeMailbox {
    type Folder = String;
    type Message = FakeMessage;

    async fn find_subfolder(&self, parent: &String, name: &str) -> Result<Option<String>, MailError> {
        let path = Self::child(parent, name);
        Ok(self.folders.lock().unwrap().contains(&path).then_some(path))
    }

    async fn create_subfolder(&self, parent: &String, name: &str) -> Result<String, MailError> {
        if self.denied.lock().unwrap().contains(name) {
            return Err(MailError::Denied(format!("cannot create {name}")));
        }
        let path = Self::child(parent, name);
        self.folders.lock().unwrap().insert(path.clone());
        self.created.lock().unwrap().push(path.clone());
        Ok(path)
    }

    async fn move_message(&self, message: &FakeMessage, folder: &String) -> Result<(), MailError> {
        if *self.reject_moves.lock().unwrap() {
            return Err(MailError::Operation("move rejected".to_string()));
        }
        self.moves.lock().unwrap().push((message.id, folder.clone()));
        Ok(())
    }

    async fn delete_message(&self, message: &FakeMessage) -> Result<(), MailError> {
        self.deleted.lock().unwrap().push(message.id);
        Ok(())
    }
}
