//! Entity identity.
//!
//! The canonical identity field on the wire is `id`. Some backend collections
//! still emit the storage key as `_id` instead; [`Identity`] reads both and
//! [`Identity::key`] prefers `id`, falling back to `_id` only when `id` is
//! absent. Numeric and string ids normalize to the same [`EntityKey`], so
//! `{"id": 7}` and `{"id": "7"}` name the same entity.

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Normalized identity key of a catalog entity.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityKey(String);

impl EntityKey {
    /// Wrap a raw key.
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key as it should appear in a request path.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<u64> for EntityKey {
    fn from(value: u64) -> Self {
        Self(value.to_string())
    }
}

impl Serialize for EntityKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for EntityKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawKey {
            Text(String),
            Signed(i64),
            Unsigned(u64),
        }

        Ok(match RawKey::deserialize(deserializer)? {
            RawKey::Text(s) => EntityKey(s),
            RawKey::Signed(n) => EntityKey(n.to_string()),
            RawKey::Unsigned(n) => EntityKey(n.to_string()),
        })
    }
}

/// The `id` / `_id` pair carried by every deduplicable entity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Canonical identity field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntityKey>,
    /// Storage key emitted by some collections in place of `id`.
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub legacy_id: Option<EntityKey>,
}

impl Identity {
    /// Identity with only the canonical field set.
    pub fn new(key: impl Into<EntityKey>) -> Self {
        Self {
            id: Some(key.into()),
            legacy_id: None,
        }
    }

    /// `id`, falling back to `_id`.
    pub fn key(&self) -> Option<&EntityKey> {
        self.id.as_ref().or(self.legacy_id.as_ref())
    }
}

/// Anything that can be deduplicated by identity.
///
/// Entities that carry neither `id` nor `_id` return `None`; aggregation keeps
/// such entities because there is no way to prove they are duplicates.
pub trait Identified {
    /// Identity key of this entity, if it has one.
    fn entity_key(&self) -> Option<EntityKey>;
}

impl Identified for Identity {
    fn entity_key(&self) -> Option<EntityKey> {
        self.key().cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_and_string_ids_are_the_same_key() {
        let a: Identity = serde_json::from_str(r#"{"id": 42}"#).unwrap();
        let b: Identity = serde_json::from_str(r#"{"id": "42"}"#).unwrap();
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn id_wins_over_legacy_id() {
        let both: Identity = serde_json::from_str(r#"{"id": "tt1", "_id": "abc"}"#).unwrap();
        assert_eq!(both.key(), Some(&EntityKey::new("tt1")));

        let legacy: Identity = serde_json::from_str(r#"{"_id": "abc"}"#).unwrap();
        assert_eq!(legacy.key(), Some(&EntityKey::new("abc")));

        let none: Identity = serde_json::from_str("{}").unwrap();
        assert_eq!(none.key(), None);
    }
}
