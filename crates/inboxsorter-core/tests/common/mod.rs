//! In-memory mail client and directory used by the integration tests.

#![allow(dead_code, clippy::unwrap_used, missing_docs)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use inboxsorter_core::{DirectoryResolver, MailError, MailMessage, Mailbox, ResolveError};

/// Folder handle: index into the folder arena.
pub type FolderId = usize;

#[derive(Debug)]
struct FolderNode {
    name: String,
    parent: Option<FolderId>,
}

/// Message as seen by the sorter.
#[derive(Debug, Clone)]
pub struct Message {
    pub id: u32,
    pub subject: String,
    pub body: String,
    pub sender: String,
    pub internal: Option<String>,
    pub broken: bool,
}

impl Message {
    pub fn new(id: u32, sender: &str, subject: &str, body: &str) -> Self {
        Self {
            id,
            subject: subject.to_string(),
            body: body.to_string(),
            sender: sender.to_string(),
            internal: None,
            broken: false,
        }
    }

    /// Message from an internal directory sender.
    pub fn internal(id: u32, internal_address: &str, subject: &str) -> Self {
        Self {
            internal: Some(internal_address.to_string()),
            ..Self::new(id, internal_address, subject, "")
        }
    }

    /// Message whose body cannot be read.
    pub fn broken(id: u32) -> Self {
        Self {
            broken: true,
            ..Self::new(id, "x@y.com", "", "")
        }
    }
}

impl MailMessage for Message {
    fn subject(&self) -> Result<String, MailError> {
        Ok(self.subject.clone())
    }

    fn body(&self) -> Result<String, MailError> {
        if self.broken {
            return Err(MailError::FieldUnavailable("body".to_string()));
        }
        Ok(self.body.clone())
    }

    fn sender_address(&self) -> Result<String, MailError> {
        Ok(self.sender.clone())
    }

    fn internal_sender(&self) -> Option<String> {
        self.internal.clone()
    }
}

/// Mail store with a folder arena; folder 0 is the inbox.
#[derive(Debug)]
pub struct MemoryMailbox {
    folders: Mutex<Vec<FolderNode>>,
    locations: Mutex<HashMap<u32, FolderId>>,
    deleted: Mutex<Vec<u32>>,
    read_only: Mutex<Vec<String>>,
}

impl MemoryMailbox {
    pub const INBOX: FolderId = 0;

    pub fn new() -> Self {
        Self {
            folders: Mutex::new(vec![FolderNode {
                name: "Inbox".to_string(),
                parent: None,
            }]),
            locations: Mutex::new(HashMap::new()),
            deleted: Mutex::new(Vec::new()),
            read_only: Mutex::new(Vec::new()),
        }
    }

    /// Refuse folder creation below folders named `name`.
    pub fn make_read_only(&self, name: &str) {
        self.read_only.lock().unwrap().push(name.to_string());
    }

    /// Add an existing folder below `parent`.
    pub fn add_folder(&self, parent: FolderId, name: &str) -> FolderId {
        let mut folders = self.folders.lock().unwrap();
        folders.push(FolderNode {
            name: name.to_string(),
            parent: Some(parent),
        });
        folders.len() - 1
    }

    /// `\`-joined path of a folder below the inbox.
    pub fn path_of(&self, folder: FolderId) -> String {
        let folders = self.folders.lock().unwrap();
        let mut parts = Vec::new();
        let mut current = folder;
        while let Some(parent) = folders[current].parent {
            parts.push(folders[current].name.clone());
            current = parent;
        }
        parts.reverse();
        parts.join("\\")
    }

    pub fn folder_count(&self) -> usize {
        self.folders.lock().unwrap().len()
    }

    /// Path of the folder a message was moved to.
    pub fn location(&self, id: u32) -> Option<String> {
        let folder = self.locations.lock().unwrap().get(&id).copied();
        folder.map(|f| self.path_of(f))
    }

    pub fn deleted(&self) -> Vec<u32> {
        self.deleted.lock().unwrap().clone()
    }
}

impl Mailbox for MemoryMailbox {
    type Folder = FolderId;
    type Message = Message;

    async fn find_subfolder(
        &self,
        parent: &FolderId,
        name: &str,
    ) -> Result<Option<FolderId>, MailError> {
        let folders = self.folders.lock().unwrap();
        Ok(folders
            .iter()
            .position(|f| f.parent == Some(*parent) && f.name.eq_ignore_ascii_case(name)))
    }

    async fn create_subfolder(&self, parent: &FolderId, name: &str) -> Result<FolderId, MailError> {
        let parent_name = self.folders.lock().unwrap()[*parent].name.clone();
        if self.read_only.lock().unwrap().contains(&parent_name) {
            return Err(MailError::Denied(format!("{parent_name} is read-only")));
        }
        Ok(self.add_folder(*parent, name))
    }

    async fn move_message(&self, message: &Message, folder: &FolderId) -> Result<(), MailError> {
        self.locations.lock().unwrap().insert(message.id, *folder);
        Ok(())
    }

    async fn delete_message(&self, message: &Message) -> Result<(), MailError> {
        self.deleted.lock().unwrap().push(message.id);
        Ok(())
    }
}

/// Directory answering from a fixed table.
#[derive(Debug, Default)]
pub struct Directory {
    entries: HashMap<String, String>,
    offline: AtomicUsize,
    lookups: AtomicUsize,
}

impl Directory {
    pub fn new(pairs: &[(&str, &str)]) -> Self {
        Self {
            entries: pairs
                .iter()
                .map(|(k, v)| (k.to_lowercase(), (*v).to_string()))
                .collect(),
            ..Self::default()
        }
    }

    /// Fail the next `n` lookups.
    pub fn go_offline(&self, n: usize) {
        self.offline.store(n, Ordering::SeqCst);
    }

    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

impl DirectoryResolver for &Directory {
    async fn lookup_canonical_address(
        &self,
        internal_address: &str,
    ) -> Result<Option<String>, ResolveError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.offline.load(Ordering::SeqCst) > 0 {
            self.offline.fetch_sub(1, Ordering::SeqCst);
            return Err(ResolveError("directory offline".to_string()));
        }
        Ok(self.entries.get(&internal_address.to_lowercase()).cloned())
    }
}
