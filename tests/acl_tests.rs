//! ACL Tests
//!
//! Tests covering:
//! - Loading from JSON files
//! - Total lookups (missing keys deny)
//! - Malformed tables rejected at load time
//! - Allowed-resource resolution

mod common;

use std::collections::BTreeSet;

use gatesearch::acl::permission;
use gatesearch::{AccessControl, AclTable, SearchError};

use common::{fixture_acl, FIXTURE_ACL};

// ============================================================================
// LOADING
// ============================================================================

#[test]
fn test_load_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("acl.json");
    std::fs::write(&path, FIXTURE_ACL).unwrap();

    let acl = AclTable::load(&path).unwrap();
    assert_eq!(acl.len(), 2);
    assert_eq!(acl.version(), Some("1.0"));
    assert_eq!(acl.users().count(), 2);
    assert_eq!(acl.user_profile("user1").unwrap().role.as_deref(), Some("admin"));
}

#[test]
fn test_missing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nope.json");

    let err = AclTable::load(&path).unwrap_err();
    assert!(matches!(err, SearchError::Configuration(_)));

    let acl = AclTable::load_or_empty(&path).unwrap();
    assert!(acl.is_empty());
    assert!(!acl.can_access("user1", "resources/testfile1.txt", "read"));
}

#[test]
fn test_malformed_tables_rejected() {
    let cases = [
        "not json",
        r#"{"resources": []}"#,
        r#"{"resources": {"r": {"u": "read"}}}"#,
        r#"{"resources": {"r": {"u": ["read"]}, "r": {"u": ["write"]}}}"#,
        r#"{"resources": {"": {"u": ["read"]}}}"#,
    ];
    for json in cases {
        let err = AclTable::from_json_str(json).unwrap_err();
        assert!(
            matches!(err, SearchError::Configuration(_)),
            "{} should be a configuration error",
            json
        );
    }

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("acl.json");
    std::fs::write(&path, "{ broken").unwrap();
    assert!(matches!(
        AclTable::load_or_empty(&path).unwrap_err(),
        SearchError::Configuration(_)
    ));
}

#[test]
fn test_sections_are_optional() {
    let acl = AclTable::from_json_str("{}").unwrap();
    assert!(acl.is_empty());
    assert_eq!(acl.users().count(), 0);
}

// ============================================================================
// LOOKUPS
// ============================================================================

#[test]
fn test_missing_keys_deny() {
    let acl = fixture_acl();
    assert!(acl.can_access("user1", "resources/testfile1.txt", permission::READ));
    assert!(acl.can_access("user1", "resources/testfile1.txt", permission::WRITE));

    // Unknown resource, unknown user, ungranted permission
    assert!(!acl.can_access("user1", "resources/unknown.txt", permission::READ));
    assert!(!acl.can_access("ghost", "resources/testfile1.txt", permission::READ));
    assert!(!acl.can_access("user1", "resources/testfile1.txt", permission::DELETE));
    assert!(!acl.can_access("user2", "resources/testfile1.txt", permission::READ));
}

#[test]
fn test_allowed_resource_ids() {
    let acl = fixture_acl();

    let expected: BTreeSet<String> = ["resources/testfile1.txt".to_string()].into();
    assert_eq!(acl.allowed_resource_ids("user1", permission::READ), expected);

    let expected: BTreeSet<String> = ["resources/testfile2.txt".to_string()].into();
    assert_eq!(acl.allowed_resource_ids("user2", permission::READ), expected);

    assert!(acl.allowed_resource_ids("user2", permission::WRITE).is_empty());
    assert!(acl.allowed_resource_ids("ghost", permission::READ).is_empty());
}

#[test]
fn test_allowed_ids_agree_with_can_access() {
    let acl = fixture_acl();
    for user in ["user1", "user2", "ghost"] {
        for perm in [permission::READ, permission::WRITE, permission::DELETE] {
            let allowed = acl.allowed_resource_ids(user, perm);
            for (resource, _) in acl.resources() {
                assert_eq!(
                    allowed.contains(resource),
                    acl.can_access(user, resource, perm),
                    "{} {} {}",
                    user,
                    resource,
                    perm
                );
            }
        }
    }
}

#[test]
fn test_has_resource() {
    let acl = fixture_acl();
    assert!(acl.has_resource("resources/testfile2.txt"));
    assert!(!acl.has_resource("resources/testfile3.txt"));
}

#[test]
fn test_builder_matches_json() {
    let built = AclTable::builder()
        .grant("resources/testfile1.txt", "user1", ["read"])
        .grant("resources/testfile1.txt", "user1", ["write", "read"])
        .grant("resources/testfile2.txt", "user2", ["read"])
        .build();

    let loaded = fixture_acl();
    for (resource, grants) in loaded.resources() {
        assert_eq!(built.resource_permissions(resource), Some(grants));
    }
}
