//! Startup index construction
//!
//! A restored snapshot is authoritative: the collection is only reset and
//! re-ingested from `resources_dir` when no snapshot was loaded.

use super::IndexAdministrator;
use crate::acl::AccessControl;
use crate::config::Config;
use crate::embedding::HashingEmbedder;
use crate::error::Result;
use crate::index::MemoryIndex;
use std::sync::Arc;

/// Build the server's index from the snapshot or the resources directory
pub fn open_index(config: &Config, acl: Arc<dyn AccessControl>) -> Result<Arc<MemoryIndex>> {
    let embedder = Arc::new(HashingEmbedder::new(config.engine.embedding_dims));

    let snapshot = config
        .ingest
        .snapshot_path
        .as_ref()
        .filter(|path| path.exists());
    if let Some(path) = snapshot {
        let index = MemoryIndex::load_snapshot(path, embedder, config.engine.distance_metric)?;
        if config.ingest.init_on_start {
            tracing::info!(
                path = %path.display(),
                "Snapshot restored, skipping startup ingestion"
            );
        }
        return Ok(Arc::new(index));
    }

    let index = Arc::new(MemoryIndex::with_metric(embedder, config.engine.distance_metric));
    if config.ingest.init_on_start {
        let admin = IndexAdministrator::new(index.clone(), config.engine.collection_name.clone(), acl);
        admin.init_db()?;
        if config.ingest.resources_dir.is_dir() {
            admin.ingest_dir(&config.ingest.resources_dir)?;
        } else {
            tracing::warn!(
                dir = %config.ingest.resources_dir.display(),
                "Resources directory not found, collection left empty"
            );
        }
    }

    Ok(index)
}
