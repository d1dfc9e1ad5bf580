//! Index administration
//!
//! [`IndexAdministrator`] owns every write to a collection: reset, batched
//! add/update/upsert, deletion and resource-file ingestion (see [`ingest`]).
//! [`open_index`] builds the server's index at startup.
//! Batches are validated in full before the index is contacted, and the index
//! applies each batch atomically, so a rejected batch leaves nothing behind.

pub mod bootstrap;
pub mod ingest;

pub use bootstrap::open_index;
pub use ingest::ResourceMetadata;

use crate::acl::AccessControl;
use crate::defaults::RESOURCE_ID_KEY;
use crate::error::{Result, SearchError};
use crate::index::{Document, IndexRecord, Metadata, VectorIndexClient};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Kind of batched write
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum WriteOperation {
    /// Insert new documents; fails if any id exists
    Add,
    /// Replace existing documents; fails if any id is missing
    Update,
    /// Insert or replace
    #[default]
    Upsert,
}

impl WriteOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            WriteOperation::Add => "add",
            WriteOperation::Update => "update",
            WriteOperation::Upsert => "upsert",
        }
    }
}

impl FromStr for WriteOperation {
    type Err = SearchError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "add" => Ok(WriteOperation::Add),
            "update" => Ok(WriteOperation::Update),
            "upsert" => Ok(WriteOperation::Upsert),
            _ => Err(SearchError::invalid_argument(format!(
                "Invalid operation: {}. Use 'add', 'update', or 'upsert'",
                s
            ))),
        }
    }
}

impl fmt::Display for WriteOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Write-side handle on one collection
#[derive(Debug, Clone)]
pub struct IndexAdministrator {
    index: Arc<dyn VectorIndexClient>,
    collection: String,
    acl: Arc<dyn AccessControl>,
}

impl IndexAdministrator {
    pub fn new(
        index: Arc<dyn VectorIndexClient>,
        collection: impl Into<String>,
        acl: Arc<dyn AccessControl>,
    ) -> Self {
        Self {
            index,
            collection: collection.into(),
            acl,
        }
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Create the collection, discarding any existing documents
    pub fn init_db(&self) -> Result<()> {
        self.index.create_or_reset_collection(&self.collection)?;
        tracing::info!(
            collection = %self.collection,
            backend = self.index.backend_name(),
            "Collection initialized"
        );
        Ok(())
    }

    /// Apply a batch of writes
    ///
    /// `metadatas` may be omitted only for [`WriteOperation::Update`], in which
    /// case each document keeps its stored metadata.
    ///
    /// # Returns
    /// Number of documents written
    pub fn update_db(
        &self,
        ids: Vec<String>,
        documents: Vec<String>,
        metadatas: Option<Vec<Metadata>>,
        operation: WriteOperation,
    ) -> Result<usize> {
        validate_batch(&ids, &documents, metadatas.as_deref(), operation)?;

        if let Some(metadatas) = &metadatas {
            self.warn_unknown_resources(metadatas);
        }

        let count = ids.len();
        let records: Vec<IndexRecord> = match metadatas {
            Some(metadatas) => ids
                .into_iter()
                .zip(documents)
                .zip(metadatas)
                .map(|((id, content), metadata)| IndexRecord::new(id, content).with_metadata(metadata))
                .collect(),
            None => ids
                .into_iter()
                .zip(documents)
                .map(|(id, content)| IndexRecord::new(id, content))
                .collect(),
        };

        match operation {
            WriteOperation::Add => self.index.add(&self.collection, records)?,
            WriteOperation::Update => self.index.update(&self.collection, records)?,
            WriteOperation::Upsert => self.index.upsert(&self.collection, records)?,
        }

        tracing::info!(
            collection = %self.collection,
            operation = operation.as_str(),
            count,
            "Documents written"
        );
        Ok(count)
    }

    /// Remove documents by id; missing ids are ignored
    ///
    /// # Returns
    /// Number of documents actually removed
    pub fn delete_documents(&self, ids: &[String]) -> Result<usize> {
        let removed = self.index.delete(&self.collection, ids)?;
        tracing::info!(
            collection = %self.collection,
            requested = ids.len(),
            removed,
            "Documents deleted"
        );
        Ok(removed)
    }

    /// Every document in the collection, ordered by id
    pub fn get_all_documents(&self) -> Result<Vec<Document>> {
        Ok(self.index.get(&self.collection, None)?)
    }

    /// Fetch documents by id, skipping ids that are not stored
    pub fn get_documents(&self, ids: &[String]) -> Result<Vec<Document>> {
        Ok(self.index.get(&self.collection, Some(ids))?)
    }

    pub fn count(&self) -> Result<usize> {
        Ok(self.index.count(&self.collection)?)
    }

    fn warn_unknown_resources(&self, metadatas: &[Metadata]) {
        for resource_id in metadatas.iter().filter_map(resource_id_of) {
            if !self.acl.has_resource(resource_id) {
                tracing::warn!(
                    collection = %self.collection,
                    resource_id,
                    "Document references a resource with no ACL entry; no user can read it"
                );
            }
        }
    }
}

fn resource_id_of(metadata: &Metadata) -> Option<&str> {
    metadata.get(RESOURCE_ID_KEY).and_then(|v| v.as_str())
}

fn validate_batch(
    ids: &[String],
    documents: &[String],
    metadatas: Option<&[Metadata]>,
    operation: WriteOperation,
) -> Result<()> {
    if ids.len() != documents.len() {
        return Err(SearchError::invalid_argument(format!(
            "ids and documents must have the same length ({} vs {})",
            ids.len(),
            documents.len()
        )));
    }

    let mut seen = HashSet::with_capacity(ids.len());
    for id in ids {
        if id.is_empty() {
            return Err(SearchError::invalid_argument("document id must not be empty"));
        }
        if !seen.insert(id.as_str()) {
            return Err(SearchError::invalid_argument(format!(
                "duplicate document id in batch: {}",
                id
            )));
        }
    }

    match metadatas {
        Some(metadatas) => {
            if metadatas.len() != ids.len() {
                return Err(SearchError::invalid_argument(format!(
                    "metadatas must have the same length as ids ({} vs {})",
                    metadatas.len(),
                    ids.len()
                )));
            }
            if let Some((id, _)) = ids
                .iter()
                .zip(metadatas)
                .find(|(_, metadata)| resource_id_of(metadata).is_none())
            {
                return Err(SearchError::invalid_argument(format!(
                    "metadata for {} must contain a string '{}'",
                    id, RESOURCE_ID_KEY
                )));
            }
        }
        None if operation != WriteOperation::Update && !ids.is_empty() => {
            return Err(SearchError::invalid_argument(format!(
                "metadatas are required for {}",
                operation
            )));
        }
        None => {}
    }

    Ok(())
}
