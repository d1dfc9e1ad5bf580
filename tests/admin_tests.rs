//! Index Administration Tests
//!
//! Tests covering:
//! - Atomic batches (no partial mutation on conflict / not-found)
//! - Idempotent delete and upsert
//! - Validation before index contact
//! - Resource-file ingestion and re-ingestion
//! - Snapshot persistence through a restart

mod common;

use std::sync::Arc;

use gatesearch::{
    AclTable, DistanceMetric, HashingEmbedder, IndexAdministrator, MemoryIndex, ResourceMetadata,
    SearchEngine, SearchError, SearchRequest, WriteOperation,
};

use common::{admin_for, angle_index, fixture_acl, meta, populate, resource_path, resources_dir, strings};

fn seeded_admin() -> (Arc<MemoryIndex>, IndexAdministrator) {
    let index = angle_index();
    let acl = Arc::new(fixture_acl());
    let admin = admin_for(&index, &acl);
    populate(
        &admin,
        &[
            ("a", "10 alpha", "resources/testfile1.txt"),
            ("b", "20 beta", "resources/testfile2.txt"),
        ],
    );
    (index, admin)
}

// ============================================================================
// ATOMIC BATCHES
// ============================================================================

#[test]
fn test_add_conflict_leaves_index_unchanged() {
    let (_index, admin) = seeded_admin();
    let before = admin.get_all_documents().unwrap();

    let err = admin
        .update_db(
            strings(&["c", "a"]),
            strings(&["30 gamma", "40 replaced"]),
            Some(vec![meta("resources/testfile1.txt"), meta("resources/testfile1.txt")]),
            WriteOperation::Add,
        )
        .unwrap_err();
    assert!(matches!(err, SearchError::Conflict { ref id } if id == "a"));
    assert_eq!(admin.get_all_documents().unwrap(), before);
}

#[test]
fn test_update_missing_leaves_index_unchanged() {
    let (_index, admin) = seeded_admin();
    let before = admin.get_all_documents().unwrap();

    let err = admin
        .update_db(
            strings(&["a", "zzz"]),
            strings(&["11 changed", "12 nothing"]),
            None,
            WriteOperation::Update,
        )
        .unwrap_err();
    assert!(matches!(err, SearchError::NotFound { ref id } if id == "zzz"));
    assert_eq!(admin.get_all_documents().unwrap(), before);
}

#[test]
fn test_validation_happens_before_index_contact() {
    let index = Arc::new(MemoryIndex::new(Arc::new(HashingEmbedder::default())));
    let admin = IndexAdministrator::new(index, "never_created", Arc::new(AclTable::empty()));

    // Argument errors win over the missing collection
    let err = admin
        .update_db(strings(&["a", "b"]), strings(&["x"]), None, WriteOperation::Upsert)
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidArgument(_)));

    let err = admin
        .update_db(strings(&["a"]), strings(&["x"]), Some(vec![meta("r")]), WriteOperation::Upsert)
        .unwrap_err();
    assert!(matches!(err, SearchError::NotInitialized { ref collection } if collection == "never_created"));
}

// ============================================================================
// IDEMPOTENCE
// ============================================================================

#[test]
fn test_delete_twice_equals_once() {
    let (_index, admin) = seeded_admin();

    assert_eq!(admin.delete_documents(&strings(&["a"])).unwrap(), 1);
    let once = admin.get_all_documents().unwrap();

    assert_eq!(admin.delete_documents(&strings(&["a"])).unwrap(), 0);
    assert_eq!(admin.get_all_documents().unwrap(), once);
    assert_eq!(admin.delete_documents(&[]).unwrap(), 0);
}

#[test]
fn test_upsert_twice_equals_once() {
    let (_index, admin) = seeded_admin();
    let write = || {
        admin
            .update_db(
                strings(&["a", "c"]),
                strings(&["15 alpha two", "30 gamma"]),
                Some(vec![meta("resources/testfile1.txt"), meta("resources/testfile2.txt")]),
                WriteOperation::Upsert,
            )
            .unwrap()
    };

    write();
    let once = admin.get_all_documents().unwrap();
    write();
    assert_eq!(admin.get_all_documents().unwrap(), once);
    assert_eq!(once.len(), 3);
}

#[test]
fn test_update_without_metadata_keeps_it() {
    let (_index, admin) = seeded_admin();
    admin
        .update_db(strings(&["b"]), strings(&["25 beta revised"]), None, WriteOperation::Update)
        .unwrap();

    let doc = admin.get_documents(&strings(&["b"])).unwrap().remove(0);
    assert_eq!(doc.content, "25 beta revised");
    assert_eq!(doc.metadata["resource_id"], "resources/testfile2.txt");
}

// ============================================================================
// INGESTION
// ============================================================================

#[test]
fn test_ingest_dir() {
    let dir = resources_dir(&[
        ("b.md", "# second"),
        ("a.txt", "first file"),
        ("c.json", "{\"k\": 1}"),
    ]);
    std::fs::create_dir(dir.path().join("nested")).unwrap();
    std::fs::write(dir.path().join("nested").join("skip.txt"), "skipped").unwrap();

    let index = Arc::new(MemoryIndex::new(Arc::new(HashingEmbedder::default())));
    let admin = IndexAdministrator::new(index, "docs", Arc::new(AclTable::empty()));
    admin.init_db().unwrap();

    assert_eq!(admin.ingest_dir(dir.path()).unwrap(), 3);

    let docs = admin.get_all_documents().unwrap();
    let ids: Vec<&str> = docs.iter().map(|d| d.id.as_str()).collect();
    assert_eq!(ids, vec!["a.txt", "b.md", "c.json"]);

    let meta = ResourceMetadata::from_metadata(&docs[1].metadata).unwrap();
    assert_eq!(meta.resource_id, resource_path(dir.path(), "b.md"));
    assert_eq!(meta.filename, "b.md");
    assert_eq!(meta.content_type, "text/markdown");
    assert_eq!(meta.file_size, 8);
    assert_eq!(meta.content_length, 8);
    assert_eq!(meta.metadata_version, "1.0");
}

#[test]
fn test_ingest_missing_dir_is_io_error() {
    let index = Arc::new(MemoryIndex::new(Arc::new(HashingEmbedder::default())));
    let admin = IndexAdministrator::new(index, "docs", Arc::new(AclTable::empty()));
    admin.init_db().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let err = admin.ingest_dir(dir.path().join("missing")).unwrap_err();
    assert!(matches!(err, SearchError::Io(_)));
}

#[test]
fn test_update_resource_file() {
    let dir = resources_dir(&[("notes.txt", "original text")]);
    let path = dir.path().join("notes.txt");

    let index = Arc::new(MemoryIndex::new(Arc::new(HashingEmbedder::default())));
    let admin = IndexAdministrator::new(index, "docs", Arc::new(AclTable::empty()));
    admin.init_db().unwrap();

    // Not indexed yet
    let err = admin.update_resource_file(&path, false).unwrap_err();
    assert!(matches!(err, SearchError::NotFound { ref id } if id == "notes.txt"));
    assert_eq!(admin.count().unwrap(), 0);

    admin.update_resource_file(&path, true).unwrap();
    let first = admin.get_all_documents().unwrap().remove(0);
    let first_meta = ResourceMetadata::from_metadata(&first.metadata).unwrap();

    std::fs::write(&path, "revised text, now longer").unwrap();
    admin.update_resource_file(&path, false).unwrap();

    let second = admin.get_all_documents().unwrap().remove(0);
    let second_meta = ResourceMetadata::from_metadata(&second.metadata).unwrap();
    assert_eq!(second.content, "revised text, now longer");
    assert_eq!(second_meta.created_at, first_meta.created_at);
    assert_eq!(second_meta.content_length, 24);
}

// ============================================================================
// PERSISTENCE
// ============================================================================

#[test]
fn test_snapshot_restart_keeps_search_results() {
    let dir = tempfile::tempdir().unwrap();
    let snapshot = dir.path().join("index.json");
    let acl = Arc::new(fixture_acl());

    let request = SearchRequest::new("test content").user("user2");
    let before = {
        let index = Arc::new(MemoryIndex::new(Arc::new(HashingEmbedder::default())));
        let admin = IndexAdministrator::new(index.clone(), "docs", acl.clone());
        admin.init_db().unwrap();
        admin
            .update_db(
                strings(&["testfile1.txt", "testfile2.txt"]),
                strings(&["notes about the quarterly budget", "test content"]),
                Some(vec![meta("resources/testfile1.txt"), meta("resources/testfile2.txt")]),
                WriteOperation::Add,
            )
            .unwrap();
        index.save_snapshot(&snapshot).unwrap();
        SearchEngine::new(index, "docs", acl.clone()).unwrap().search(&request).unwrap()
    };

    let restored = MemoryIndex::load_snapshot(
        &snapshot,
        Arc::new(HashingEmbedder::default()),
        DistanceMetric::L2,
    )
    .unwrap();
    let after = SearchEngine::new(Arc::new(restored), "docs", acl)
        .unwrap()
        .search(&request)
        .unwrap();

    assert_eq!(before, after);
    assert_eq!(after[0].document_id, "testfile2.txt");
}
