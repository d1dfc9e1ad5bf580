//! # Gatesearch
//!
//! Permission-aware semantic search over a small document collection.
//!
//! ## Architecture
//!
//! ```text
//! HTTP API (Axum)
//!     │
//!     ├──────────────────────┐
//!     ▼                      ▼
//! SearchEngine           IndexAdministrator
//! (read, per user)       (reset, writes, ingestion)
//!     │   │                  │
//!     │   └── AccessControl ─┤  (AclTable)
//!     ▼                      ▼
//! VectorIndexClient (MemoryIndex)
//!     ├── Embedder (HashingEmbedder)
//!     └── Collections (exact scan + MetadataFilter)
//! ```
//!
//! ## Search strategies
//!
//! - **filter_first**: restrict to documents the user may read, then rank
//! - **query_first**: rank everything, keep top_k, then drop unreadable results
//!
//! ## Quick Start
//!
//! ```ignore
//! use gatesearch::{AclTable, HashingEmbedder, IndexAdministrator, MemoryIndex};
//! use gatesearch::{SearchEngine, SearchRequest};
//! use std::sync::Arc;
//!
//! let index = Arc::new(MemoryIndex::new(Arc::new(HashingEmbedder::default())));
//! let acl = Arc::new(AclTable::load("config/acl.json")?);
//!
//! let admin = IndexAdministrator::new(index.clone(), "resources_db", acl.clone());
//! admin.init_db()?;
//! admin.ingest_dir("resources")?;
//!
//! let engine = SearchEngine::new(index, "resources_db", acl)?;
//! let results = engine.search(&SearchRequest::new("test content").user("user1"))?;
//! ```

pub mod defaults;
pub mod error;
pub mod acl;
pub mod embedding;
pub mod index;
pub mod search;
pub mod admin;
pub mod config;
pub mod api;

pub use acl::{AccessControl, AclTable, UserProfile};
pub use admin::{IndexAdministrator, ResourceMetadata, WriteOperation};
pub use config::Config;
pub use embedding::{Embedder, HashingEmbedder};
pub use error::{Result, SearchError};
pub use index::{
    DistanceMetric, Document, IndexError, IndexRecord, MemoryIndex, Metadata, MetadataFilter,
    VectorIndexClient,
};
pub use search::{SearchEngine, SearchMethod, SearchRequest, SearchResult};
