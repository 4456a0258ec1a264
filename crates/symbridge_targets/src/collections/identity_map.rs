//! A map keyed by object identity.

use hashbrown::{HashMap, hash_map};

use super::{SymbolicHandle, unintercepted};
use crate::ObjectIdentity;

/// A map the interpreter reasons about as a whole, whose keys compare by reference.
///
/// Two keys that compare equal but are distinct objects are distinct entries.
///
/// Keys are addresses, so the same caveats as for [`ObjectIdentity`] apply: zero-sized keys are
/// not supported, and every key object has to outlive its entry. A freed key's address can be
/// handed to a new object, which would then find the old entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolicIdentityMap<V> {
    /// Backed by a hash table over object addresses
    Concrete(HashMap<ObjectIdentity, V>),
    /// Modeled by the interpreter, every operation is fatal
    Symbolic(SymbolicHandle),
}

impl<V> Default for SymbolicIdentityMap<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> SymbolicIdentityMap<V> {
    /// An empty, concrete map
    #[must_use]
    pub fn new() -> Self {
        Self::Concrete(HashMap::default())
    }

    /// The placeholder for a map the interpreter models as `handle`
    #[must_use]
    pub fn from_handle(handle: SymbolicHandle) -> Self {
        Self::Symbolic(handle)
    }

    /// `true` for the symbolic variant
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// The interpreter handle of a symbolic map
    #[must_use]
    pub fn symbolic_handle(&self) -> Option<SymbolicHandle> {
        match self {
            Self::Concrete(_) => None,
            Self::Symbolic(handle) => Some(*handle),
        }
    }

    #[track_caller]
    fn entries(&self, operation: &str) -> &HashMap<ObjectIdentity, V> {
        match self {
            Self::Concrete(entries) => entries,
            Self::Symbolic(handle) => unintercepted(operation, *handle),
        }
    }

    #[track_caller]
    fn entries_mut(&mut self, operation: &str) -> &mut HashMap<ObjectIdentity, V> {
        match self {
            Self::Concrete(entries) => entries,
            Self::Symbolic(handle) => unintercepted(operation, *handle),
        }
    }

    /// The number of keys
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries("SymbolicIdentityMap::size").len()
    }

    /// The value stored for `key`
    #[must_use]
    pub fn get(&self, key: ObjectIdentity) -> Option<&V> {
        self.entries("SymbolicIdentityMap::get").get(&key)
    }

    /// Stores `value` for `key`, returning the value it replaces.
    pub fn put(&mut self, key: ObjectIdentity, value: V) -> Option<V> {
        self.entries_mut("SymbolicIdentityMap::put").insert(key, value)
    }

    /// Removes `key`, returning its value.
    pub fn remove(&mut self, key: ObjectIdentity) -> Option<V> {
        self.entries_mut("SymbolicIdentityMap::remove").remove(&key)
    }

    /// Is there a value for `key`?
    #[must_use]
    pub fn contains_key(&self, key: ObjectIdentity) -> bool {
        self.entries("SymbolicIdentityMap::contains_key").contains_key(&key)
    }

    /// Iterates all entries, in no particular order
    pub fn iter(&self) -> hash_map::Iter<'_, ObjectIdentity, V> {
        self.entries("SymbolicIdentityMap::iter").iter()
    }
}

impl<V> SymbolicIdentityMap<V>
where
    V: Clone,
{
    /// Adds every entry of `other`. On a key present in both, `other`'s value wins.
    pub fn merge(&mut self, other: &Self) {
        let source = other.entries("SymbolicIdentityMap::merge");
        let target = self.entries_mut("SymbolicIdentityMap::merge");
        target.extend(source.iter().map(|(k, v)| (*k, v.clone())));
    }
}

impl<V> FromIterator<(ObjectIdentity, V)> for SymbolicIdentityMap<V> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (ObjectIdentity, V)>,
    {
        Self::Concrete(iter.into_iter().collect())
    }
}
