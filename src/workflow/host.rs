// src/workflow/host.rs
//! Collaborators the page host provides: widgets, session store, the remote
//! analysis call and user notifications. In-memory versions back the CLI and
//! the tests.

use crate::app_log;
use crate::error::{HostError, TransportError};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Mutex;

/// A file picked in the upload widget.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub name: String,
    pub size: u64,
    pub mime_type: String,
    pub data: Vec<u8>,
}

impl Attachment {
    pub fn new(name: impl Into<String>, mime_type: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            mime_type: mime_type.into(),
            data,
        }
    }

    /// An attachment that only reports metadata, as file pickers do before upload.
    pub fn metadata_only(name: impl Into<String>, mime_type: impl Into<String>, size: u64) -> Self {
        Self {
            name: name.into(),
            size,
            mime_type: mime_type.into(),
            data: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionInput {
    pub file: Option<Attachment>,
    pub free_text: String,
}

/// What the remote analysis call returned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvokerResponse {
    pub status: u16,
    pub body: String,
}

impl InvokerResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Error,
}

pub trait AttachmentSource: Send {
    fn selected(&self) -> Vec<Attachment>;
    fn clear(&mut self) -> Result<(), HostError>;
}

pub trait TextSource: Send {
    fn value(&self) -> String;
    fn set(&mut self, value: &str);
    fn clear(&mut self);
}

pub trait SessionStore: Send {
    fn set(&mut self, key: &str, value: Value);
    fn clear(&mut self, key: &str);
    fn get(&self, key: &str) -> Option<Value>;
}

pub trait PageView: Send {
    fn set_page(&mut self, page: u8);
    fn current_page(&self) -> u8;
}

#[rocket::async_trait]
pub trait AnalysisInvoker: Send + Sync {
    async fn run(&self, input: &SubmissionInput) -> Result<InvokerResponse, TransportError>;
}

pub trait Notifier: Send + Sync {
    fn notify(&self, message: &str, level: NoticeLevel);
}

#[derive(Debug, Default)]
pub struct MemoryAttachments {
    files: Vec<Attachment>,
}

impl MemoryAttachments {
    pub fn with_file(file: Attachment) -> Self {
        Self { files: vec![file] }
    }

    pub fn select(&mut self, file: Attachment) {
        self.files = vec![file];
    }
}

impl AttachmentSource for MemoryAttachments {
    fn selected(&self) -> Vec<Attachment> {
        self.files.clone()
    }

    fn clear(&mut self) -> Result<(), HostError> {
        self.files.clear();
        Ok(())
    }
}

#[derive(Debug, Default)]
pub struct MemoryText {
    value: String,
}

impl MemoryText {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }
}

impl TextSource for MemoryText {
    fn value(&self) -> String {
        self.value.clone()
    }

    fn set(&mut self, value: &str) {
        self.value = value.to_string();
    }

    fn clear(&mut self) {
        self.value.clear();
    }
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: HashMap<String, Value>,
}

impl SessionStore for MemoryStore {
    fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    fn clear(&mut self, key: &str) {
        self.values.remove(key);
    }

    fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }
}

#[derive(Debug)]
pub struct MemoryView {
    page: u8,
}

impl Default for MemoryView {
    fn default() -> Self {
        Self { page: 1 }
    }
}

impl PageView for MemoryView {
    fn set_page(&mut self, page: u8) {
        self.page = page;
    }

    fn current_page(&self) -> u8 {
        self.page
    }
}

/// Prints notices for terminal use.
pub struct ConsoleNotifier;

impl Notifier for ConsoleNotifier {
    fn notify(&self, message: &str, level: NoticeLevel) {
        match level {
            NoticeLevel::Success => {
                app_log!(info, "{}", message);
                println!("✓ {}", message);
            }
            NoticeLevel::Error => {
                app_log!(warn, "{}", message);
                eprintln!("✗ {}", message);
            }
        }
    }
}

/// Keeps every notice in order so callers can inspect what the user saw.
#[derive(Debug, Default)]
pub struct NoticeLog {
    notices: Mutex<Vec<(NoticeLevel, String)>>,
}

impl NoticeLog {
    pub fn notices(&self) -> Vec<(NoticeLevel, String)> {
        match self.notices.lock() {
            Ok(notices) => notices.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn last(&self) -> Option<(NoticeLevel, String)> {
        self.notices().pop()
    }
}

impl Notifier for NoticeLog {
    fn notify(&self, message: &str, level: NoticeLevel) {
        let mut notices = match self.notices.lock() {
            Ok(notices) => notices,
            Err(poisoned) => poisoned.into_inner(),
        };
        notices.push((level, message.to_string()));
    }
}
