//! A key to value association with structural key equality.

use core::{borrow::Borrow, hash::Hash};

use hashbrown::{HashMap, hash_map};

use super::{SymbolicHandle, unintercepted};

/// A map the interpreter reasons about as a whole.
#[derive(Debug, Clone)]
pub enum SymbolicMap<K, V> {
    /// Backed by a hash table
    Concrete(HashMap<K, V>),
    /// Modeled by the interpreter, every operation is fatal
    Symbolic(SymbolicHandle),
}

impl<K, V> Default for SymbolicMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> SymbolicMap<K, V> {
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
    fn entries(&self, operation: &str) -> &HashMap<K, V> {
        match self {
            Self::Concrete(entries) => entries,
            Self::Symbolic(handle) => unintercepted(operation, *handle),
        }
    }

    #[track_caller]
    fn entries_mut(&mut self, operation: &str) -> &mut HashMap<K, V> {
        match self {
            Self::Concrete(entries) => entries,
            Self::Symbolic(handle) => unintercepted(operation, *handle),
        }
    }

    /// The number of keys
    #[must_use]
    pub fn size(&self) -> usize {
        self.entries("SymbolicMap::size").len()
    }

    /// Iterates all entries, in no particular order
    pub fn iter(&self) -> hash_map::Iter<'_, K, V> {
        self.entries("SymbolicMap::iter").iter()
    }
}

impl<K, V> SymbolicMap<K, V>
where
    K: Eq + Hash,
{
    /// The value stored for `key`
    #[must_use]
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries("SymbolicMap::get").get(key)
    }

    /// Stores `value` for `key`, returning the value it replaces.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        self.entries_mut("SymbolicMap::put").insert(key, value)
    }

    /// Removes `key`, returning its value.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries_mut("SymbolicMap::remove").remove(key)
    }

    /// Is there a value for `key`?
    #[must_use]
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.entries("SymbolicMap::contains_key").contains_key(key)
    }
}

impl<K, V> SymbolicMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    /// Adds every entry of `other`. On a key present in both, `other`'s value wins.
    ///
    /// Branches that concretely diverged from the same symbolic map are reconciled this way,
    /// with the later branch passed as `other`.
    pub fn merge(&mut self, other: &Self) {
        let source = other.entries("SymbolicMap::merge");
        let target = self.entries_mut("SymbolicMap::merge");
        target.extend(source.iter().map(|(k, v)| (k.clone(), v.clone())));
    }
}

impl<K, V> FromIterator<(K, V)> for SymbolicMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
    {
        Self::Concrete(iter.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use alloc::string::{String, ToString};

    use super::SymbolicMap;
    use crate::SymbolicHandle;

    #[test]
    fn test_put_get_contains() {
        let mut map = SymbolicMap::new();
        assert_eq!(map.size(), 0);
        assert_eq!(map.put("a".to_string(), 1), None);
        assert_eq!(map.put("b".to_string(), 2), None);
        assert_eq!(map.put("a".to_string(), 3), Some(1));

        assert_eq!(map.size(), 2);
        assert_eq!(map.get("a"), Some(&3));
        assert!(map.contains_key("b"));
        assert!(!map.contains_key("c"));
        assert_eq!(map.get("c"), None);
    }

    #[test]
    fn test_structural_keys() {
        let mut map = SymbolicMap::new();
        let first = String::from("key");
        let second = String::from("key");
        map.put(first, 1);
        assert_eq!(map.get(&second), Some(&1));
    }

    #[test]
    fn test_remove() {
        let mut map: SymbolicMap<u32, u32> = [(1, 10), (2, 20)].into_iter().collect();
        assert_eq!(map.remove(&1), Some(10));
        assert_eq!(map.remove(&1), None);
        assert_eq!(map.size(), 1);
    }

    #[test]
    fn test_merge_is_right_biased() {
        let mut left: SymbolicMap<u32, &str> = [(1, "left"), (2, "left")].into_iter().collect();
        let right: SymbolicMap<u32, &str> = [(2, "right"), (3, "right")].into_iter().collect();
        left.merge(&right);

        assert_eq!(left.size(), 3);
        assert_eq!(left.get(&1), Some(&"left"));
        assert_eq!(left.get(&2), Some(&"right"));
        assert_eq!(left.get(&3), Some(&"right"));
        assert_eq!(right.size(), 2);
    }

    #[test]
    fn test_symbolic_tag() {
        let map = SymbolicMap::<u32, u32>::from_handle(SymbolicHandle::new(9));
        assert!(map.is_symbolic());
        assert_eq!(map.symbolic_handle(), Some(SymbolicHandle::new(9)));
        assert!(!SymbolicMap::<u32, u32>::new().is_symbolic());
    }

    #[test]
    #[should_panic(expected = "SymbolicMap::get on symbolic collection #9")]
    fn test_symbolic_get_is_fatal() {
        let map = SymbolicMap::<u32, u32>::from_handle(SymbolicHandle::new(9));
        let _ = map.get(&1);
    }

    #[test]
    #[should_panic(expected = "SymbolicMap::merge")]
    fn test_merge_symbolic_is_fatal() {
        let mut map = SymbolicMap::<u32, u32>::new();
        map.merge(&SymbolicMap::from_handle(SymbolicHandle::new(1)));
    }
}
