//! Resource-file ingestion
//!
//! Files become documents with id = file name and a [`ResourceMetadata`]
//! whose `resource_id` is the path as given, which is what ACL entries key on
//! (e.g. `resources/testfile1.txt`).

use super::{IndexAdministrator, WriteOperation};
use crate::defaults::{DEFAULT_CONTENT_TYPE, METADATA_VERSION, RESOURCE_ID_KEY};
use crate::error::{Result, SearchError};
use crate::index::Metadata;
use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};

/// Metadata stored with every ingested resource file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceMetadata {
    pub resource_id: String,
    pub filename: String,
    pub path: String,
    /// RFC 3339, UTC
    pub created_at: String,
    /// RFC 3339, UTC
    pub updated_at: String,
    pub content_type: String,
    /// Bytes on disk
    pub file_size: u64,
    /// Characters of decoded content
    pub content_length: usize,
    pub metadata_version: String,
}

impl ResourceMetadata {
    /// Describe a file whose content has already been read
    pub fn for_file(path: &Path, content: &str, file_size: u64, created_at: Option<String>) -> Self {
        let now = now_rfc3339();
        let path_str = path.to_string_lossy().into_owned();

        Self {
            resource_id: path_str.clone(),
            filename: file_name(path).unwrap_or_default(),
            path: path_str,
            created_at: created_at.unwrap_or_else(|| now.clone()),
            updated_at: now,
            content_type: content_type_for(path).to_string(),
            file_size,
            content_length: content.chars().count(),
            metadata_version: METADATA_VERSION.to_string(),
        }
    }

    pub fn into_metadata(self) -> Metadata {
        let mut map = Metadata::new();
        map.insert(RESOURCE_ID_KEY.into(), Value::String(self.resource_id));
        map.insert("filename".into(), Value::String(self.filename));
        map.insert("path".into(), Value::String(self.path));
        map.insert("created_at".into(), Value::String(self.created_at));
        map.insert("updated_at".into(), Value::String(self.updated_at));
        map.insert("content_type".into(), Value::String(self.content_type));
        map.insert("file_size".into(), Value::from(self.file_size));
        map.insert("content_length".into(), Value::from(self.content_length));
        map.insert("metadata_version".into(), Value::String(self.metadata_version));
        map
    }

    /// Parse stored metadata back; `None` if it was not written by ingestion
    pub fn from_metadata(metadata: &Metadata) -> Option<Self> {
        serde_json::from_value(Value::Object(metadata.clone())).ok()
    }
}

/// MIME type guessed from the file extension
pub fn content_type_for(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase());

    match ext.as_deref() {
        Some("txt") | Some("text") | Some("log") => "text/plain",
        Some("md") | Some("markdown") => "text/markdown",
        Some("html") | Some("htm") => "text/html",
        Some("csv") => "text/csv",
        Some("json") => "application/json",
        Some("xml") => "application/xml",
        Some("yaml") | Some("yml") => "application/yaml",
        Some("pdf") => "application/pdf",
        _ => DEFAULT_CONTENT_TYPE,
    }
}

fn now_rfc3339() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn file_name(path: &Path) -> Option<String> {
    path.file_name().map(|n| n.to_string_lossy().into_owned())
}

impl IndexAdministrator {
    /// Upsert every regular file in `dir`
    ///
    /// Files are visited in sorted order. Subdirectories are skipped.
    ///
    /// # Returns
    /// Number of files ingested
    pub fn ingest_dir(&self, dir: impl AsRef<Path>) -> Result<usize> {
        let dir = dir.as_ref();

        let mut paths: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            if entry.file_type()?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort();

        let mut ids = Vec::with_capacity(paths.len());
        let mut documents = Vec::with_capacity(paths.len());
        let mut metadatas = Vec::with_capacity(paths.len());

        for path in &paths {
            let (id, content, metadata) = read_resource(path, None)?;
            ids.push(id);
            documents.push(content);
            metadatas.push(metadata.into_metadata());
        }

        let count = self.update_db(ids, documents, Some(metadatas), WriteOperation::Upsert)?;
        tracing::info!(
            collection = %self.collection,
            dir = %dir.display(),
            count,
            "Ingested resource directory"
        );
        Ok(count)
    }

    /// Re-read one resource file into its document
    ///
    /// The document id is the file name. If no document with that id exists,
    /// this fails with [`SearchError::NotFound`] unless `upsert_if_missing`
    /// is set. An existing document keeps its original `created_at`.
    pub fn update_resource_file(&self, path: impl AsRef<Path>, upsert_if_missing: bool) -> Result<()> {
        let path = path.as_ref();
        let id = file_name(path)
            .ok_or_else(|| SearchError::invalid_argument(format!("not a file path: {}", path.display())))?;

        let existing = self.get_documents(std::slice::from_ref(&id))?;
        let created_at = match existing.first() {
            Some(doc) => doc
                .metadata
                .get("created_at")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            None if upsert_if_missing => None,
            None => {
                return Err(SearchError::NotFound { id });
            }
        };

        let (id, content, metadata) = read_resource(path, created_at)?;
        let operation = if upsert_if_missing {
            WriteOperation::Upsert
        } else {
            WriteOperation::Update
        };
        self.update_db(vec![id], vec![content], Some(vec![metadata.into_metadata()]), operation)?;
        Ok(())
    }
}

fn read_resource(path: &Path, created_at: Option<String>) -> Result<(String, String, ResourceMetadata)> {
    let content = fs::read_to_string(path)?;
    let file_size = fs::metadata(path)?.len();
    let id = file_name(path)
        .ok_or_else(|| SearchError::invalid_argument(format!("not a file path: {}", path.display())))?;
    let metadata = ResourceMetadata::for_file(path, &content, file_size, created_at);
    Ok((id, content, metadata))
}
