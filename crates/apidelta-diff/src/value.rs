//! Generic diff node shapes shared by every comparator.
//!
//! - [`ValueDiff`] -- a scalar that changed (`from` → `to`)
//! - [`StringsDiff`] -- set-like string lists (required names, tags, scopes)
//! - [`KeyedDiff`] -- keyed containers: added, deleted, modified entries
//! - [`Change`] -- one optional element that appeared, vanished or changed
//!
//! An unchanged element is represented by `None` at the parent, never by an
//! empty node.

use std::collections::BTreeMap;

use serde::{Serialize, Serializer};

/// A scalar that differs between base and revision.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ValueDiff<T> {
    pub from: T,
    pub to: T,
}

impl<T: PartialEq + Clone> ValueDiff<T> {
    /// `Some` only if the two values differ.
    pub fn between(from: &T, to: &T) -> Option<Self> {
        if from == to {
            None
        } else {
            Some(Self {
                from: from.clone(),
                to: to.clone(),
            })
        }
    }
}

impl ValueDiff<bool> {
    /// The flag went from unset to set.
    pub fn enabled(&self) -> bool {
        !self.from && self.to
    }

    /// The flag went from set to unset.
    pub fn disabled(&self) -> bool {
        self.from && !self.to
    }
}

impl<T> ValueDiff<Option<T>> {
    /// A value appeared where there was none.
    pub fn set(&self) -> bool {
        self.from.is_none() && self.to.is_some()
    }

    /// A value was dropped.
    pub fn unset(&self) -> bool {
        self.from.is_some() && self.to.is_none()
    }
}

/// Difference between two lists treated as sets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct StringsDiff {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<String>,
}

impl StringsDiff {
    /// Compare two lists as sets. Output keeps first-seen order of each side.
    pub fn between(base: &[String], revision: &[String]) -> Option<Self> {
        let mut diff = Self::default();
        for name in revision {
            if !base.contains(name) && !diff.added.contains(name) {
                diff.added.push(name.clone());
            }
        }
        for name in base {
            if !revision.contains(name) && !diff.deleted.contains(name) {
                diff.deleted.push(name.clone());
            }
        }
        (!diff.is_empty()).then_some(diff)
    }

    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty()
    }
}

/// Difference between two keyed containers.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct KeyedDiff<K, D> {
    /// Keys present only in the revision.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub added: Vec<K>,
    /// Keys present only in the base.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub deleted: Vec<K>,
    /// Shared keys whose values differ.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub modified: BTreeMap<K, D>,
}

impl<K, D> Default for KeyedDiff<K, D> {
    fn default() -> Self {
        Self {
            added: Vec::new(),
            deleted: Vec::new(),
            modified: BTreeMap::new(),
        }
    }
}

impl<K: Ord, D> KeyedDiff<K, D> {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.deleted.is_empty() && self.modified.is_empty()
    }
}

/// Compare two maps key by key.
///
/// `diff` is called for every shared key and returns `None` when the two
/// values are equivalent.
pub fn diff_keyed<'a, K, V, D, F>(
    base: &'a BTreeMap<K, V>,
    revision: &'a BTreeMap<K, V>,
    mut diff: F,
) -> Option<KeyedDiff<K, D>>
where
    K: Ord + Clone,
    F: FnMut(&'a V, &'a V) -> Option<D>,
{
    let mut result = KeyedDiff::default();

    for (key, base_value) in base {
        match revision.get(key) {
            Some(revision_value) => {
                if let Some(d) = diff(base_value, revision_value) {
                    result.modified.insert(key.clone(), d);
                }
            }
            None => result.deleted.push(key.clone()),
        }
    }

    for key in revision.keys() {
        if !base.contains_key(key) {
            result.added.push(key.clone());
        }
    }

    (!result.is_empty()).then_some(result)
}

/// One optional element compared across versions.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Change<'a, T, D> {
    /// Present only in the revision.
    Added(&'a T),
    /// Present only in the base.
    Deleted(&'a T),
    /// Present on both sides and different.
    Modified(D),
}

impl<'a, T, D> Change<'a, T, D> {
    /// Compare an optional element. Both sides absent is "no change".
    pub fn compare<F>(base: Option<&'a T>, revision: Option<&'a T>, diff: F) -> Option<Self>
    where
        F: FnOnce(&'a T, &'a T) -> Option<D>,
    {
        match (base, revision) {
            (None, None) => None,
            (Some(b), None) => Some(Self::Deleted(b)),
            (None, Some(r)) => Some(Self::Added(r)),
            (Some(b), Some(r)) => diff(b, r).map(Self::Modified),
        }
    }

    pub fn modified(&self) -> Option<&D> {
        match self {
            Self::Modified(d) => Some(d),
            Self::Added(_) | Self::Deleted(_) => None,
        }
    }

    pub fn added(&self) -> Option<&'a T> {
        match self {
            Self::Added(t) => Some(t),
            Self::Deleted(_) | Self::Modified(_) => None,
        }
    }

    pub fn deleted(&self) -> Option<&'a T> {
        match self {
            Self::Deleted(t) => Some(t),
            Self::Added(_) | Self::Modified(_) => None,
        }
    }
}

/// Serialize a borrowed map as the list of its keys.
pub(crate) fn serialize_keys<S, K, V>(map: &BTreeMap<K, V>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    K: Serialize,
{
    serializer.collect_seq(map.keys())
}
