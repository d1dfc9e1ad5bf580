//! In-process vector index
//!
//! [`MemoryIndex`] keeps named collections behind a single `RwLock`. Text is
//! embedded before the lock is taken, so writers hold the lock only for the
//! existence checks and the mutation itself, and a rejected batch leaves the
//! collection untouched.

use super::collection::{Collection, Prepared};
use super::{Document, DistanceMetric, IndexError, IndexRecord, IndexResult};
use super::{MetadataFilter, QueryHit, VectorIndexClient};
use crate::embedding::Embedder;
use parking_lot::RwLock;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

/// Vector index held entirely in memory
pub struct MemoryIndex {
    embedder: Arc<dyn Embedder>,
    metric: DistanceMetric,
    pub(super) collections: RwLock<HashMap<String, Collection>>,
}

impl MemoryIndex {
    /// Create an empty index using the default metric
    pub fn new(embedder: Arc<dyn Embedder>) -> Self {
        Self::with_metric(embedder, DistanceMetric::default())
    }

    pub fn with_metric(embedder: Arc<dyn Embedder>, metric: DistanceMetric) -> Self {
        Self {
            embedder,
            metric,
            collections: RwLock::new(HashMap::new()),
        }
    }

    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    pub fn embedder(&self) -> &Arc<dyn Embedder> {
        &self.embedder
    }

    /// Names of all collections, sorted
    pub fn collection_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.collections.read().keys().cloned().collect();
        names.sort();
        names
    }

    pub(super) fn prepare(&self, records: Vec<IndexRecord>) -> Vec<Prepared> {
        records
            .into_iter()
            .map(|record| {
                let embedding = self.embedder.embed(&record.content);
                (record, embedding)
            })
            .collect()
    }

    fn with_collection_mut<T>(
        &self,
        name: &str,
        f: impl FnOnce(&mut Collection) -> IndexResult<T>,
    ) -> IndexResult<T> {
        let mut collections = self.collections.write();
        let collection = collections
            .get_mut(name)
            .ok_or_else(|| IndexError::collection_not_found(name))?;
        f(collection)
    }

    fn with_collection<T>(&self, name: &str, f: impl FnOnce(&Collection) -> T) -> IndexResult<T> {
        let collections = self.collections.read();
        let collection = collections
            .get(name)
            .ok_or_else(|| IndexError::collection_not_found(name))?;
        Ok(f(collection))
    }
}

impl fmt::Debug for MemoryIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryIndex")
            .field("embedder", &self.embedder)
            .field("metric", &self.metric)
            .field("collections", &self.collection_names())
            .finish()
    }
}

impl VectorIndexClient for MemoryIndex {
    fn query(
        &self,
        collection: &str,
        text: &str,
        top_k: usize,
        filter: Option<&MetadataFilter>,
    ) -> IndexResult<Vec<QueryHit>> {
        let query = self.embedder.embed(text);
        let metric = self.metric;
        self.with_collection(collection, |c| c.search(&query, top_k, filter, metric))
    }

    fn add(&self, collection: &str, records: Vec<IndexRecord>) -> IndexResult<()> {
        let prepared = self.prepare(records);
        self.with_collection_mut(collection, |c| c.add(prepared))
    }

    fn update(&self, collection: &str, records: Vec<IndexRecord>) -> IndexResult<()> {
        let prepared = self.prepare(records);
        self.with_collection_mut(collection, |c| c.update(prepared))
    }

    fn upsert(&self, collection: &str, records: Vec<IndexRecord>) -> IndexResult<()> {
        let prepared = self.prepare(records);
        self.with_collection_mut(collection, |c| {
            c.upsert(prepared);
            Ok(())
        })
    }

    fn delete(&self, collection: &str, ids: &[String]) -> IndexResult<usize> {
        self.with_collection_mut(collection, |c| Ok(c.delete(ids)))
    }

    fn get(&self, collection: &str, ids: Option<&[String]>) -> IndexResult<Vec<Document>> {
        self.with_collection(collection, |c| c.get(ids))
    }

    fn count(&self, collection: &str) -> IndexResult<usize> {
        self.with_collection(collection, |c| c.len())
    }

    fn collection_exists(&self, name: &str) -> bool {
        self.collections.read().contains_key(name)
    }

    fn create_or_reset_collection(&self, name: &str) -> IndexResult<()> {
        if name.trim().is_empty() {
            return Err(IndexError::backend("collection name must not be empty"));
        }
        let previous = self.collections.write().insert(name.to_string(), Collection::new());
        tracing::debug!(
            collection = name,
            discarded = previous.map_or(0, |c| c.len()),
            "Collection reset"
        );
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
