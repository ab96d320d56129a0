//! JSON-file document store
//!
//! Holds the uploaded document records in upload order. Positions shift when
//! a document is removed, so any `SearchIndex` built over the store must be
//! rebuilt afterwards.

use crate::error::{ExamDeskError, Result};
use crate::search::Document;
use std::path::{Path, PathBuf};

pub struct DocumentStore {
    path: PathBuf,
    documents: Vec<Document>,
}

impl DocumentStore {
    /// Open the store at `path`; a missing file is an empty store
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let documents = if path.exists() {
            let content = std::fs::read_to_string(&path)?;
            if content.trim().is_empty() {
                Vec::new()
            } else {
                serde_json::from_str(&content)?
            }
        } else {
            Vec::new()
        };

        tracing::debug!(
            "Opened document store {} ({} documents)",
            path.display(),
            documents.len()
        );
        Ok(Self { path, documents })
    }

    /// Default store path (or `EXAMDESK_STORE`)
    pub fn default_path() -> PathBuf {
        if let Ok(path) = std::env::var("EXAMDESK_STORE") {
            return PathBuf::from(path);
        }
        dirs::data_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::DATA_DIR_NAME)
            .join("documents.json")
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Append a document and return its position
    pub fn add(&mut self, document: Document) -> usize {
        self.documents.push(document);
        self.documents.len() - 1
    }

    /// Remove the document at `position`
    pub fn remove(&mut self, position: usize) -> Result<Document> {
        if position >= self.documents.len() {
            return Err(ExamDeskError::DocumentNotFound(position));
        }
        Ok(self.documents.remove(position))
    }

    /// Write all documents back to disk
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_json::to_string_pretty(&self.documents)?;
        std::fs::write(&self.path, content)?;
        Ok(())
    }
}
