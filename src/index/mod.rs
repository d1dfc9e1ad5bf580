//! Vector index abstraction layer
//!
//! The search core talks to the vector index only through the
//! [`VectorIndexClient`] trait, so any backend offering named collections,
//! filtered nearest-neighbor queries and add/update/upsert/delete can be
//! swapped in.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────┐
//! │              Arc<dyn VectorIndexClient>                    │
//! │  ┌──────────────────────────────────────────────────────┐  │
//! │  │ MemoryIndex                                          │  │
//! │  │   Arc<dyn Embedder>   text -> vector                 │  │
//! │  │   RwLock<HashMap<name, Collection>>                  │  │
//! │  │     Collection: id -> (content, metadata, vector)    │  │
//! │  │     exact scan + MetadataFilter                      │  │
//! │  └──────────────────────────────────────────────────────┘  │
//! └────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use gatesearch::index::{MemoryIndex, MetadataFilter, VectorIndexClient};
//!
//! let index = MemoryIndex::new(Arc::new(HashingEmbedder::default()));
//! index.create_or_reset_collection("docs")?;
//! let filter = MetadataFilter::new().field_in("resource_id", ["a", "b"]);
//! let hits = index.query("docs", "quarterly report", 5, Some(&filter))?;
//! ```

mod collection;
mod filter;
mod memory;
mod persistence;
mod r#trait;

pub use filter::{Condition, MetadataFilter};
pub use memory::MemoryIndex;
pub use r#trait::VectorIndexClient;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Opaque per-document metadata (a JSON object)
pub type Metadata = serde_json::Map<String, serde_json::Value>;

/// Error type for vector index operations
#[derive(Debug, thiserror::Error)]
pub enum IndexError {
    #[error("Collection not found: {name}")]
    CollectionNotFound { name: String },

    #[error("Document already exists: {id}")]
    AlreadyExists { id: String },

    #[error("Document not found: {id}")]
    NotFound { id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Index backend error: {0}")]
    Backend(String),
}

pub type IndexResult<T> = Result<T, IndexError>;

impl IndexError {
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }

    pub fn serialization(msg: impl Into<String>) -> Self {
        Self::Serialization(msg.into())
    }

    pub(crate) fn collection_not_found(name: &str) -> Self {
        Self::CollectionNotFound {
            name: name.to_string(),
        }
    }
}

/// A stored document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: String,
    pub content: String,
    #[serde(default)]
    pub metadata: Metadata,
}

/// A single write to the index
///
/// `metadata: None` keeps the stored metadata on update/upsert of an existing
/// document and stores an empty object for a new one.
#[derive(Debug, Clone, PartialEq)]
pub struct IndexRecord {
    pub id: String,
    pub content: String,
    pub metadata: Option<Metadata>,
}

impl IndexRecord {
    pub fn new(id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: None,
        }
    }

    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = Some(metadata);
        self
    }
}

/// One nearest-neighbor hit, as returned by [`VectorIndexClient::query`]
#[derive(Debug, Clone, PartialEq)]
pub struct QueryHit {
    pub id: String,
    pub content: String,
    pub metadata: Metadata,
    /// Lower is closer
    pub distance: f32,
}

/// Distance function between embeddings
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum DistanceMetric {
    /// Squared Euclidean distance
    #[default]
    L2,
    /// 1 - cosine similarity
    Cosine,
}

impl DistanceMetric {
    pub fn distance(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            DistanceMetric::L2 => a
                .iter()
                .zip(b.iter())
                .map(|(x, y)| (x - y) * (x - y))
                .sum(),
            DistanceMetric::Cosine => {
                let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
                let na: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
                let nb: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
                if na == 0.0 || nb == 0.0 {
                    1.0
                } else {
                    1.0 - dot / (na * nb)
                }
            }
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DistanceMetric::L2 => "l2",
            DistanceMetric::Cosine => "cosine",
        }
    }
}

impl FromStr for DistanceMetric {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "l2" => Ok(DistanceMetric::L2),
            "cosine" => Ok(DistanceMetric::Cosine),
            _ => Err(format!("Unknown distance metric: {}", s)),
        }
    }
}
