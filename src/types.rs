//! Shared types for the page client.
//!
//! These mirror the request and response bodies of the board's HTTP
//! endpoints.

use std::fmt;
use std::path::PathBuf;

use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::Result;

// =============================================================================
// Identifiers
// =============================================================================

/// Opaque identifier of a Q&A post.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PostId(String);

impl PostId {
    /// Wrap a raw token. Blank tokens are not identifiers.
    pub fn new(raw: impl Into<String>) -> Option<Self> {
        let raw = raw.into();
        if raw.trim().is_empty() {
            None
        } else {
            Some(Self(raw))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PostId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Chrome API Types
// =============================================================================

/// Unread counts returned by `/users/message_count`.
///
/// Missing and `null` counts decode as zero, which hides the matching badge.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCounts {
    /// Unread messages.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub message_count: u64,
    /// Unread alerts.
    #[serde(default, deserialize_with = "null_as_zero")]
    pub alert_count: u64,
}

fn null_as_zero<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a logout response. Only `message` is read, and only on failure.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LogoutResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
}

// =============================================================================
// Form submission
// =============================================================================

/// One entry of a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormEntry {
    /// Plain field value.
    Text { name: String, value: String },
    /// File attachment read from disk when the request is built.
    File { name: String, path: PathBuf },
}

impl FormEntry {
    pub fn name(&self) -> &str {
        match self {
            Self::Text { name, .. } | Self::File { name, .. } => name,
        }
    }
}

/// Ordered multipart payload serialized from a `<form>`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormData {
    entries: Vec<FormEntry>,
}

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.entries.push(FormEntry::Text {
            name: name.into(),
            value: value.into(),
        });
    }

    pub fn append_file(&mut self, name: impl Into<String>, path: impl Into<PathBuf>) {
        self.entries.push(FormEntry::File {
            name: name.into(),
            path: path.into(),
        });
    }

    /// First text value submitted under `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries.iter().find_map(|entry| match entry {
            FormEntry::Text { name: n, value } if n == name => Some(value.as_str()),
            _ => None,
        })
    }

    pub fn entries(&self) -> &[FormEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Build the multipart body, reading attachments from disk.
    pub async fn into_multipart(self) -> Result<Form> {
        let mut form = Form::new();
        for entry in self.entries {
            form = match entry {
                FormEntry::Text { name, value } => form.text(name, value),
                FormEntry::File { name, path } => {
                    let bytes = tokio::fs::read(&path).await?;
                    let file_name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    let mime = mime_guess::from_path(&path).first_or_octet_stream();
                    let part = Part::bytes(bytes)
                        .file_name(file_name)
                        .mime_str(mime.essence_str())?;
                    form.part(name, part)
                }
            };
        }
        Ok(form)
    }
}
