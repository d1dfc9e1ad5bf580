//! ACL file parsing
//!
//! The on-disk format is JSON with `resources` and `users` mappings. Parsing is
//! strict: duplicate keys at any mapping level and empty identifiers are
//! rejected here so that lookups on a loaded table can never fail.

use super::{AclTable, UserProfile};
use serde::de::{self, Deserializer, MapAccess, Visitor};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::marker::PhantomData;

/// Raw shape of the ACL document
#[derive(Debug, Deserialize)]
pub(super) struct RawAcl {
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub resources: UniqueMap<UniqueMap<Vec<String>>>,
    #[serde(default)]
    pub users: UniqueMap<UserProfile>,
}

impl RawAcl {
    pub(super) fn into_table(self) -> AclTable {
        let resources = self
            .resources
            .0
            .into_iter()
            .map(|(resource_id, grants)| {
                let grants = grants
                    .0
                    .into_iter()
                    .map(|(user_id, permissions)| (user_id, dedup_ordered(permissions)))
                    .collect();
                (resource_id, grants)
            })
            .collect();

        AclTable {
            resources,
            users: self.users.0,
            version: self.version,
            description: self.description,
        }
    }
}

/// Collapse repeated permissions, keeping the first occurrence of each
pub(super) fn dedup_ordered(permissions: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(permissions.len());
    for permission in permissions {
        if !out.contains(&permission) {
            out.push(permission);
        }
    }
    out
}

/// String-keyed map that refuses duplicate and empty keys
#[derive(Debug)]
pub(super) struct UniqueMap<V>(pub BTreeMap<String, V>);

impl<V> Default for UniqueMap<V> {
    fn default() -> Self {
        Self(BTreeMap::new())
    }
}

impl<'de, V: Deserialize<'de>> Deserialize<'de> for UniqueMap<V> {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct UniqueMapVisitor<V>(PhantomData<V>);

        impl<'de, V: Deserialize<'de>> Visitor<'de> for UniqueMapVisitor<V> {
            type Value = UniqueMap<V>;

            fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
                f.write_str("a map with unique, non-empty string keys")
            }

            fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
            where
                A: MapAccess<'de>,
            {
                let mut map = BTreeMap::new();
                while let Some((key, value)) = access.next_entry::<String, V>()? {
                    if key.trim().is_empty() {
                        return Err(de::Error::custom("empty identifier"));
                    }
                    if map.contains_key(&key) {
                        return Err(de::Error::custom(format!("duplicate key `{}`", key)));
                    }
                    map.insert(key, value);
                }
                Ok(UniqueMap(map))
            }
        }

        deserializer.deserialize_map(UniqueMapVisitor(PhantomData))
    }
}
