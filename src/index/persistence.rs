//! MemoryIndex snapshots
//!
//! A snapshot stores documents (id, content, metadata) per collection as JSON.
//! Embeddings are not stored; they are recomputed on load, so a snapshot stays
//! valid when the embedder's dimensionality changes.

use super::collection::Collection;
use super::{Document, DistanceMetric, IndexError, IndexRecord, IndexResult, MemoryIndex};
use crate::embedding::Embedder;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fs::{self, File};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

const SNAPSHOT_VERSION: u32 = 1;

#[derive(Serialize, Deserialize)]
struct Snapshot {
    version: u32,
    collections: BTreeMap<String, Vec<Document>>,
}

impl MemoryIndex {
    /// Write all collections to `path`
    ///
    /// The file is written next to its destination and renamed into place.
    ///
    /// # Returns
    /// Number of documents written
    pub fn save_snapshot(&self, path: impl AsRef<Path>) -> IndexResult<usize> {
        let path = path.as_ref();

        let snapshot = {
            let collections = self.collections.read();
            Snapshot {
                version: SNAPSHOT_VERSION,
                collections: collections
                    .iter()
                    .map(|(name, c)| (name.clone(), c.documents()))
                    .collect(),
            }
        };
        let count = snapshot.collections.values().map(Vec::len).sum();

        let data = serde_json::to_vec(&snapshot)
            .map_err(|e| IndexError::serialization(e.to_string()))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let tmp_path = tmp_path_for(path)?;
        let written = File::create(&tmp_path)
            .and_then(|mut file| {
                file.write_all(&data)?;
                file.sync_all()
            })
            .and_then(|()| fs::rename(&tmp_path, path));
        if let Err(e) = written {
            let _ = fs::remove_file(&tmp_path);
            return Err(e.into());
        }

        tracing::info!(path = %path.display(), documents = count, "Saved index snapshot");
        Ok(count)
    }

    /// Rebuild an index from a snapshot written by [`MemoryIndex::save_snapshot`]
    pub fn load_snapshot(
        path: impl AsRef<Path>,
        embedder: Arc<dyn Embedder>,
        metric: DistanceMetric,
    ) -> IndexResult<Self> {
        let path = path.as_ref();
        let data = fs::read(path)?;
        let snapshot: Snapshot =
            serde_json::from_slice(&data).map_err(|e| IndexError::serialization(e.to_string()))?;

        if snapshot.version != SNAPSHOT_VERSION {
            return Err(IndexError::serialization(format!(
                "unsupported snapshot version {}",
                snapshot.version
            )));
        }

        let index = MemoryIndex::with_metric(embedder, metric);
        let mut collections = HashMap::with_capacity(snapshot.collections.len());
        let mut count = 0;

        for (name, documents) in snapshot.collections {
            count += documents.len();
            let records = documents
                .into_iter()
                .map(|doc| IndexRecord::new(doc.id, doc.content).with_metadata(doc.metadata))
                .collect();

            let mut collection = Collection::new();
            collection.add(index.prepare(records))?;
            collections.insert(name, collection);
        }
        *index.collections.write() = collections;

        tracing::info!(path = %path.display(), documents = count, "Loaded index snapshot");
        Ok(index)
    }
}

/// Sibling of `path` with `.tmp` appended to the full file name
fn tmp_path_for(path: &Path) -> IndexResult<PathBuf> {
    let mut name = path
        .file_name()
        .ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("snapshot path has no file name: {}", path.display()),
            )
        })?
        .to_os_string();
    name.push(".tmp");
    Ok(path.with_file_name(name))
}
