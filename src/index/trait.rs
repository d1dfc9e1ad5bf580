//! Vector index client trait
//!
//! The capability set the search core needs from a vector-search backend.

use std::fmt::Debug;

use super::{Document, IndexRecord, IndexResult, MetadataFilter, QueryHit};

/// Common interface for vector index backends
///
/// Every operation names the collection it acts on. Write operations are
/// all-or-nothing per call: if any record is rejected, none is applied.
pub trait VectorIndexClient: Send + Sync + Debug + 'static {
    /// Nearest-neighbor query
    ///
    /// # Arguments
    /// * `collection` - Collection to search
    /// * `text` - Query text, embedded by the backend
    /// * `top_k` - Maximum number of hits
    /// * `filter` - Restriction applied before ranking, so that every one of
    ///   the `top_k` slots is drawn from matching documents
    ///
    /// # Returns
    /// Hits sorted by distance ascending, ties broken by id
    fn query(
        &self,
        collection: &str,
        text: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> IndexResult<Vec<QueryHit>>;

    /// Insert new documents; fails with `AlreadyExists` if any id is taken
    fn add(&self, collection: &str, records: Vec<IndexRecord>) -> IndexResult<()>;

    /// Replace existing documents; fails with `NotFound` if any id is missing
    fn update(&self, collection: &str, records: Vec<IndexRecord>) -> IndexResult<()>;

    /// Insert or replace
    fn upsert(&self, collection: &str, records: Vec<IndexRecord>) -> IndexResult<()>;

    /// Remove documents by id, ignoring unknown ids
    ///
    /// # Returns
    /// Number of documents actually removed
    fn delete(&self, collection: &str, ids: &[String]) -> IndexResult<usize>;

    /// Fetch documents by id (all documents when `ids` is `None`)
    ///
    /// Unknown ids are skipped.
    fn get(&self, collection: &str, ids: Option<&[String]>) -> IndexResult<Vec<Document>>;

    /// Number of documents in the collection
    fn count(&self, collection: &str) -> IndexResult<usize>;

    fn collection_exists(&self, name: &str) -> bool;

    /// Create the collection, discarding any existing contents
    fn create_or_reset_collection(&self, name: &str) -> IndexResult<()>;

    /// Get the name of this backend (for logging/debugging)
    fn backend_name(&self) -> &'static str;
}
