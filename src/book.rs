//! Book entity adapter.
//!
//! A [`Book`] is built per-request either from an uploaded file (mode A,
//! followed by [`Book::parse`]) or from submitted form fields (mode B for
//! create/update). It serializes to the camelCase JSON shape the frontend
//! expects and is discarded once the response is written.

use crate::error::{AppError, Result};
use crate::formats;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One entry of a book's table of contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContentItem {
    /// Navigation point id from toc.ncx.
    pub nav_id: String,
    /// Chapter label.
    pub label: String,
    /// Target href inside the archive.
    pub href: String,
    /// Reading order.
    pub play_order: i64,
}

/// A catalog entry, request-scoped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Server-side file name (generated for uploads), the catalog key.
    pub file_name: String,
    /// Name the file had on the client, if uploaded.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub original_name: Option<String>,
    /// Path of the file under the upload directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,
    /// Book title.
    #[serde(default)]
    pub title: String,
    /// Author name.
    #[serde(default)]
    pub author: String,
    /// Publisher name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    /// Language code.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Cover image href inside the archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cover: Option<String>,
    /// Path of the OPF root file inside the archive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub root_file: Option<String>,
    /// Numeric category id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<i64>,
    /// Category display text.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_text: Option<String>,
    /// Table of contents.
    #[serde(default)]
    pub contents: Vec<ContentItem>,
    /// Owning username, stamped server-side from the identity token.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
}

/// Raw create/update payload. Assigned onto a [`Book`] without validation
/// beyond the presence checks done by callers.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookFields {
    /// Catalog key.
    #[serde(default)]
    pub file_name: String,
    /// Book title.
    #[serde(default)]
    pub title: String,
    /// Author name.
    #[serde(default)]
    pub author: String,
    /// Publisher name.
    pub publisher: Option<String>,
    /// Language code.
    pub language: Option<String>,
    /// Cover href.
    pub cover: Option<String>,
    /// OPF root file path.
    pub root_file: Option<String>,
    /// Numeric category id.
    pub category: Option<i64>,
    /// Category display text.
    pub category_text: Option<String>,
    /// Client-claimed username; overwritten when a verified identity exists.
    pub username: Option<String>,
}

impl Book {
    /// Mode A: build from an uploaded file descriptor.
    pub fn from_upload(file_path: PathBuf, original_name: impl Into<String>) -> Self {
        let file_name = file_path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_string();

        Self {
            file_name,
            original_name: Some(original_name.into()),
            file_path: Some(file_path),
            ..Self::default()
        }
    }

    /// Mode B: build from submitted fields.
    pub fn from_fields(fields: BookFields) -> Self {
        Self {
            file_name: fields.file_name,
            title: fields.title,
            author: fields.author,
            publisher: fields.publisher,
            language: fields.language,
            cover: fields.cover,
            root_file: fields.root_file,
            category: fields.category,
            category_text: fields.category_text,
            username: fields.username,
            ..Self::default()
        }
    }

    /// Extract metadata from the uploaded file into this entity.
    ///
    /// Runs the blocking archive work off the async runtime. Fails with
    /// [`AppError::Parse`] when the file is not a well-formed EPUB.
    pub async fn parse(&mut self) -> Result<()> {
        let path = self
            .file_path
            .clone()
            .ok_or_else(|| AppError::Parse("no uploaded file to parse".into()))?;

        let meta = tokio::task::spawn_blocking(move || formats::epub::parse_epub(&path))
            .await
            .map_err(|e| AppError::Internal(format!("parse task failed: {}", e)))??;

        self.title = meta.title;
        self.author = meta.author.unwrap_or_default();
        self.publisher = meta.publisher;
        self.language = meta.language;
        self.cover = meta.cover;
        self.root_file = Some(meta.root_file);
        self.contents = meta.contents;
        Ok(())
    }

    /// Best-effort removal of the uploaded temp file.
    ///
    /// Invoked on parse failure. Failures are logged and swallowed; they
    /// never reach the client or the response already in flight.
    pub async fn reset(&self) {
        let Some(path) = &self.file_path else {
            return;
        };

        if let Err(e) = tokio::fs::remove_file(path).await {
            tracing::warn!(path = %path.display(), error = %e, "Failed to remove uploaded file");
        } else {
            tracing::debug!(path = %path.display(), "Removed uploaded file");
        }
    }
}
