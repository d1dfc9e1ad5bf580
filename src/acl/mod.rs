//! Resource-centric access control
//!
//! Permissions are keyed by resource, then user, then permission string:
//!
//! ```text
//! resources
//!   "resources/testfile1.txt"
//!     "user1" -> ["read", "write", "delete"]
//!     "user2" -> ["read"]
//! ```
//!
//! Every lookup is deny-by-default: a missing resource, a missing user under a
//! resource, or a missing permission all answer `false`, never an error.
//! [`AccessControl`] is the seam callers depend on; [`AclTable`] is the
//! in-memory implementation loaded from the JSON ACL file.

mod loader;

use crate::error::{Result, SearchError};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Debug;
use std::path::Path;

/// Well-known permission names
pub mod permission {
    pub const READ: &str = "read";
    pub const WRITE: &str = "write";
    pub const DELETE: &str = "delete";
}

/// Authorization decisions used by search and administration
///
/// Implementations must be total: no lookup may fail once the
/// implementation has been constructed.
pub trait AccessControl: Send + Sync + Debug + 'static {
    /// True iff `user_id` holds `permission` on `resource_id`
    fn can_access(&self, user_id: &str, resource_id: &str, permission: &str) -> bool;

    /// Every resource on which `user_id` holds `permission`
    fn allowed_resource_ids(&self, user_id: &str, permission: &str) -> BTreeSet<String>;

    /// Whether the resource has any entry at all
    fn has_resource(&self, resource_id: &str) -> bool;
}

/// Per-resource grants: user id -> ordered permission set
pub type ResourceGrants = BTreeMap<String, Vec<String>>;

/// Advisory user information; never consulted by access decisions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(default, alias = "name")]
    pub display_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl UserProfile {
    pub fn new(display_name: impl Into<String>) -> Self {
        Self {
            display_name: display_name.into(),
            role: None,
        }
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }
}

/// In-memory permission table
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AclTable {
    resources: BTreeMap<String, ResourceGrants>,
    users: BTreeMap<String, UserProfile>,
    version: Option<String>,
    description: Option<String>,
}

impl AclTable {
    /// Table that grants nothing to anyone
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn builder() -> AclTableBuilder {
        AclTableBuilder::default()
    }

    /// Parse a table from its JSON form
    pub fn from_json_str(json: &str) -> Result<Self> {
        let raw: loader::RawAcl = serde_json::from_str(json)
            .map_err(|e| SearchError::configuration(format!("invalid ACL: {}", e)))?;
        Ok(raw.into_table())
    }

    /// Load a table from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            SearchError::configuration(format!("cannot read ACL file {}: {}", path.display(), e))
        })?;
        let table = Self::from_json_str(&json)?;

        tracing::info!(
            path = %path.display(),
            resources = table.len(),
            users = table.users.len(),
            "Loaded ACL table"
        );
        Ok(table)
    }

    /// Load a table, treating a missing file as an empty table
    ///
    /// A file that exists but is malformed is still an error.
    pub fn load_or_empty(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!(path = %path.display(), "ACL file not found, denying all user access");
            return Ok(Self::empty());
        }
        Self::load(path)
    }

    /// Grants recorded for a resource, if any
    pub fn resource_permissions(&self, resource_id: &str) -> Option<&ResourceGrants> {
        self.resources.get(resource_id)
    }

    pub fn user_profile(&self, user_id: &str) -> Option<&UserProfile> {
        self.users.get(user_id)
    }

    pub fn users(&self) -> impl Iterator<Item = (&str, &UserProfile)> {
        self.users.iter().map(|(id, profile)| (id.as_str(), profile))
    }

    pub fn resources(&self) -> impl Iterator<Item = (&str, &ResourceGrants)> {
        self.resources.iter().map(|(id, grants)| (id.as_str(), grants))
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Number of resources in the table
    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl AccessControl for AclTable {
    fn can_access(&self, user_id: &str, resource_id: &str, permission: &str) -> bool {
        self.resources
            .get(resource_id)
            .and_then(|grants| grants.get(user_id))
            .map_or(false, |perms| perms.iter().any(|p| p == permission))
    }

    fn allowed_resource_ids(&self, user_id: &str, permission: &str) -> BTreeSet<String> {
        self.resources
            .iter()
            .filter(|(_, grants)| {
                grants
                    .get(user_id)
                    .map_or(false, |perms| perms.iter().any(|p| p == permission))
            })
            .map(|(resource_id, _)| resource_id.clone())
            .collect()
    }

    fn has_resource(&self, resource_id: &str) -> bool {
        self.resources.contains_key(resource_id)
    }
}

/// Programmatic construction of an [`AclTable`]
#[derive(Debug, Default)]
pub struct AclTableBuilder {
    table: AclTable,
}

impl AclTableBuilder {
    /// Grant permissions on a resource to a user, merging with earlier grants
    pub fn grant<I, S>(
        mut self,
        resource_id: impl Into<String>,
        user_id: impl Into<String>,
        permissions: I,
    ) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let perms = self
            .table
            .resources
            .entry(resource_id.into())
            .or_default()
            .entry(user_id.into())
            .or_default();
        for permission in permissions {
            let permission = permission.into();
            if !perms.contains(&permission) {
                perms.push(permission);
            }
        }
        self
    }

    pub fn user(mut self, user_id: impl Into<String>, profile: UserProfile) -> Self {
        self.table.users.insert(user_id.into(), profile);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.table.version = Some(version.into());
        self
    }

    pub fn build(self) -> AclTable {
        self.table
    }
}
