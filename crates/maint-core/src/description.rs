//! Action descriptions: the immutable "what and where" of a maintenance action.
//!
//! A description is an ordered string map. Its identity hash is what the
//! registry uses to keep two workers from ever running the same work at once,
//! so the hash depends only on the key/value content, never on the order the
//! pairs were inserted in.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;

pub const KEY: &str = "key";
pub const FIELDS: &str = "fields";
pub const TYPE: &str = "type";
pub const INDEXES: &str = "indexes";
pub const SHARDS: &str = "shards";
pub const DATABASE: &str = "database";
pub const COLLECTION: &str = "collection";
pub const EDGE: &str = "edge";
pub const NAME: &str = "name";
pub const ID: &str = "id";
pub const LEADER: &str = "leader";
pub const LOCAL_LEADER: &str = "localLeader";
pub const GLOB_UID: &str = "globallyUniqueId";
pub const OBJECT_ID: &str = "objectId";

// ---------------------------------------------------------------------------
// ActionDescription
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ActionDescription {
    entries: BTreeMap<String, String>,
}

impl ActionDescription {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    pub fn has(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The `type` entry, which selects the step body that runs this action.
    pub fn action_type(&self) -> Option<&str> {
        self.get(TYPE)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.entries.clone()
    }

    /// Identity hash used for de-duplication.
    ///
    /// SHA-256 over `key \0 value \0` for every pair in key order, truncated to
    /// the first eight bytes. Stable across processes and platforms.
    pub fn identity_hash(&self) -> u64 {
        let mut hasher = Sha256::new();
        for (k, v) in &self.entries {
            hasher.update(k.as_bytes());
            hasher.update([0u8]);
            hasher.update(v.as_bytes());
            hasher.update([0u8]);
        }
        let digest = hasher.finalize();
        let mut head = [0u8; 8];
        head.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(head)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for ActionDescription {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::new(iter)
    }
}

impl std::fmt::Display for ActionDescription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let parts: Vec<String> = self.iter().map(|(k, v)| format!("{k}={v}")).collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hash_ignores_insertion_order() {
        let a = ActionDescription::new([
            (TYPE, "CreateIndex"),
            (DATABASE, "_system"),
            (COLLECTION, "users"),
            (SHARDS, "s1001"),
        ]);
        let b = ActionDescription::new([
            (SHARDS, "s1001"),
            (COLLECTION, "users"),
            (TYPE, "CreateIndex"),
            (DATABASE, "_system"),
        ]);
        assert_eq!(a, b);
        assert_eq!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn hash_changes_with_content() {
        let a = ActionDescription::new([(TYPE, "DropIndex"), (SHARDS, "s1")]);
        let b = ActionDescription::new([(TYPE, "DropIndex"), (SHARDS, "s2")]);
        assert_ne!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn hash_separates_key_and_value_boundaries() {
        let a = ActionDescription::new([("ab", "c")]);
        let b = ActionDescription::new([("a", "bc")]);
        assert_ne!(a.identity_hash(), b.identity_hash());
    }

    #[test]
    fn hash_is_stable_across_runs() {
        let d = ActionDescription::new([(TYPE, "noop")]);
        assert_eq!(d.identity_hash(), d.clone().identity_hash());
        assert_eq!(
            ActionDescription::default().identity_hash(),
            ActionDescription::new(Vec::<(String, String)>::new()).identity_hash()
        );
    }

    #[test]
    fn accessors_and_display() {
        let d: ActionDescription = [(TYPE, "UpdateCollection"), (LEADER, "PRMR-1")]
            .into_iter()
            .collect();
        assert_eq!(d.action_type(), Some("UpdateCollection"));
        assert!(d.has(LEADER));
        assert!(!d.has(LOCAL_LEADER));
        assert_eq!(d.len(), 2);
        assert_eq!(d.to_string(), "{leader=PRMR-1, type=UpdateCollection}");
    }

    #[test]
    fn deserializes_from_plain_map() {
        let d: ActionDescription =
            serde_yaml::from_str("type: noop\ndatabase: _system\n").unwrap();
        assert_eq!(d.get(DATABASE), Some("_system"));
    }
}
