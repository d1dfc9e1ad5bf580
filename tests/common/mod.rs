//! Shared test utilities for gatesearch testing
//!
//! This module provides:
//! - An angle-based embedder for exactly controlled rankings
//! - Fixture ACL tables
//! - Index/engine/administrator setup helpers
//! - Temporary resource directories

#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde_json::Value;
use tempfile::TempDir;

use gatesearch::{
    AccessControl, AclTable, Embedder, IndexAdministrator, MemoryIndex, Metadata, SearchEngine,
    VectorIndexClient, WriteOperation,
};

pub const COLLECTION: &str = "test_docs";

/// ACL fixture: user1 reads only testfile1, user2 reads only testfile2
pub const FIXTURE_ACL: &str = r#"{
    "version": "1.0",
    "description": "Fixture ACL",
    "resources": {
        "resources/testfile1.txt": { "user1": ["read", "write"] },
        "resources/testfile2.txt": { "user2": ["read"] }
    },
    "users": {
        "user1": { "name": "User One", "role": "admin" },
        "user2": { "name": "User Two", "role": "viewer" }
    }
}"#;

pub fn fixture_acl() -> AclTable {
    AclTable::from_json_str(FIXTURE_ACL).unwrap()
}

/// Embeds text whose first token is an angle in degrees as a unit 2-vector
///
/// Distances then follow angular separation from the query exactly, so
/// `"0"` ranks `"10 ..."` before `"20 ..."` and so on. Text that does not
/// start with a number embeds at 0 degrees.
#[derive(Debug, Default)]
pub struct AngleEmbedder;

impl AngleEmbedder {
    pub fn angle_of(text: &str) -> f32 {
        text.split_whitespace()
            .next()
            .and_then(|t| t.parse::<f32>().ok())
            .unwrap_or(0.0)
    }
}

impl Embedder for AngleEmbedder {
    fn embed(&self, text: &str) -> Vec<f32> {
        let radians = Self::angle_of(text).to_radians();
        vec![radians.cos(), radians.sin()]
    }

    fn dimensions(&self) -> usize {
        2
    }
}

/// Index using the angle embedder, with `COLLECTION` created
pub fn angle_index() -> Arc<MemoryIndex> {
    let index = Arc::new(MemoryIndex::new(Arc::new(AngleEmbedder)));
    index.create_or_reset_collection(COLLECTION).unwrap();
    index
}

/// Metadata carrying only a resource id
pub fn meta(resource_id: &str) -> Metadata {
    let mut metadata = Metadata::new();
    metadata.insert("resource_id".into(), Value::String(resource_id.into()));
    metadata
}

pub fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|s| s.to_string()).collect()
}

/// Upsert `(id, content, resource_id)` triples through an administrator
pub fn populate(admin: &IndexAdministrator, docs: &[(&str, &str, &str)]) {
    let ids = docs.iter().map(|(id, _, _)| id.to_string()).collect();
    let contents = docs.iter().map(|(_, content, _)| content.to_string()).collect();
    let metadatas = docs.iter().map(|(_, _, resource)| meta(resource)).collect();
    admin
        .update_db(ids, contents, Some(metadatas), WriteOperation::Upsert)
        .unwrap();
}

pub fn admin_for(index: &Arc<MemoryIndex>, acl: &Arc<AclTable>) -> IndexAdministrator {
    let index: Arc<dyn VectorIndexClient> = index.clone();
    let acl: Arc<dyn AccessControl> = acl.clone();
    IndexAdministrator::new(index, COLLECTION, acl)
}

pub fn engine_for(index: &Arc<MemoryIndex>, acl: &Arc<AclTable>) -> SearchEngine {
    let index: Arc<dyn VectorIndexClient> = index.clone();
    let acl: Arc<dyn AccessControl> = acl.clone();
    SearchEngine::new(index, COLLECTION, acl).unwrap()
}

/// Temporary directory holding the given `(file name, content)` pairs
pub fn resources_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().unwrap();
    for (name, content) in files {
        std::fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

/// Resource id ingestion assigns to `name` inside `dir`
pub fn resource_path(dir: &Path, name: &str) -> String {
    PathBuf::from(dir).join(name).to_string_lossy().into_owned()
}
