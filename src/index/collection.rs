//! Collection state
//!
//! Each collection holds its own isolated document set:
//! - content and metadata per document id
//! - the embedding computed when the document was written
//!
//! Search is an exact scan, so a filtered query sees every matching document
//! rather than a truncated candidate list.

use super::{Document, DistanceMetric, IndexError, IndexRecord, IndexResult, Metadata};
use super::{MetadataFilter, QueryHit};
use std::cmp::Ordering;
use std::collections::{BTreeMap, HashSet};

/// Stored document with its embedding
#[derive(Debug, Clone)]
struct Entry {
    content: String,
    metadata: Metadata,
    embedding: Vec<f32>,
}

/// Per-collection state
#[derive(Debug, Default)]
pub(super) struct Collection {
    entries: BTreeMap<String, Entry>,
}

/// Record paired with its precomputed embedding
pub(super) type Prepared = (IndexRecord, Vec<f32>);

impl Collection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    /// Insert new records; rejects the whole batch if any id is taken
    pub fn add(&mut self, records: Vec<Prepared>) -> IndexResult<()> {
        let mut seen = HashSet::with_capacity(records.len());
        for (record, _) in &records {
            if self.contains(&record.id) || !seen.insert(record.id.as_str()) {
                return Err(IndexError::AlreadyExists {
                    id: record.id.clone(),
                });
            }
        }

        for (record, embedding) in records {
            self.entries.insert(
                record.id,
                Entry {
                    content: record.content,
                    metadata: record.metadata.unwrap_or_default(),
                    embedding,
                },
            );
        }
        Ok(())
    }

    /// Replace existing records; rejects the whole batch if any id is missing
    pub fn update(&mut self, records: Vec<Prepared>) -> IndexResult<()> {
        if let Some((record, _)) = records.iter().find(|(r, _)| !self.contains(&r.id)) {
            return Err(IndexError::NotFound {
                id: record.id.clone(),
            });
        }

        for (record, embedding) in records {
            self.put(record, embedding);
        }
        Ok(())
    }

    /// Insert or replace
    pub fn upsert(&mut self, records: Vec<Prepared>) {
        for (record, embedding) in records {
            self.put(record, embedding);
        }
    }

    fn put(&mut self, record: IndexRecord, embedding: Vec<f32>) {
        match self.entries.get_mut(&record.id) {
            Some(entry) => {
                entry.content = record.content;
                entry.embedding = embedding;
                if let Some(metadata) = record.metadata {
                    entry.metadata = metadata;
                }
            }
            None => {
                self.entries.insert(
                    record.id,
                    Entry {
                        content: record.content,
                        metadata: record.metadata.unwrap_or_default(),
                        embedding,
                    },
                );
            }
        }
    }

    /// Remove ids, returning how many were present
    pub fn delete(&mut self, ids: &[String]) -> usize {
        ids.iter()
            .filter(|id| self.entries.remove(id.as_str()).is_some())
            .count()
    }

    pub fn get(&self, ids: Option<&[String]>) -> Vec<Document> {
        match ids {
            None => self
                .entries
                .iter()
                .map(|(id, entry)| to_document(id, entry))
                .collect(),
            Some(ids) => ids
                .iter()
                .filter_map(|id| self.entries.get(id).map(|entry| to_document(id, entry)))
                .collect(),
        }
    }

    /// All documents, in id order, for snapshotting
    pub fn documents(&self) -> Vec<Document> {
        self.get(None)
    }

    /// Exact k-nearest-neighbor search over documents matching `filter`
    pub fn search(
        &self,
        query: &[f32],
        k: usize,
        filter: Option<&MetadataFilter>,
        metric: DistanceMetric,
    ) -> Vec<QueryHit> {
        let mut scored: Vec<(f32, &String, &Entry)> = self
            .entries
            .iter()
            .filter(|(_, entry)| filter.map_or(true, |f| f.matches(&entry.metadata)))
            .map(|(id, entry)| (metric.distance(query, &entry.embedding), id, entry))
            .collect();

        // Distance ascending, then id for a stable total order
        scored.sort_by(|a, b| match a.0.total_cmp(&b.0) {
            Ordering::Equal => a.1.cmp(b.1),
            other => other,
        });
        scored.truncate(k);

        scored
            .into_iter()
            .map(|(distance, id, entry)| QueryHit {
                id: id.clone(),
                content: entry.content.clone(),
                metadata: entry.metadata.clone(),
                distance,
            })
            .collect()
    }
}

fn to_document(id: &str, entry: &Entry) -> Document {
    Document {
        id: id.to_string(),
        content: entry.content.clone(),
        metadata: entry.metadata.clone(),
    }
}
