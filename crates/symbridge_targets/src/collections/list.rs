//! An index-addressed sequence of nullable elements.

use alloc::vec::Vec;
use core::slice;

use symbridge_core::Error;

use super::{SymbolicHandle, unintercepted};

fn out_of_bounds(index: usize, size: usize) -> Error {
    Error::illegal_argument(format!("index {index} out of bounds for size {size}"))
}

/// A list the interpreter reasons about as a whole.
///
/// Elements may be absent (`None`), which is also what [`SymbolicList::copy_into`] pads with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolicList<T> {
    /// Backed by a plain vector
    Concrete(Vec<Option<T>>),
    /// Modeled by the interpreter, every operation is fatal
    Symbolic(SymbolicHandle),
}

impl<T> Default for SymbolicList<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SymbolicList<T> {
    /// An empty, concrete list
    #[must_use]
    pub fn new() -> Self {
        Self::Concrete(Vec::new())
    }

    /// The placeholder for a list the interpreter models as `handle`
    #[must_use]
    pub fn from_handle(handle: SymbolicHandle) -> Self {
        Self::Symbolic(handle)
    }

    /// `true` for the symbolic variant
    #[must_use]
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Self::Symbolic(_))
    }

    /// The interpreter handle of a symbolic list
    #[must_use]
    pub fn symbolic_handle(&self) -> Option<SymbolicHandle> {
        match self {
            Self::Concrete(_) => None,
            Self::Symbolic(handle) => Some(*handle),
        }
    }

    #[track_caller]
    fn items(&self, operation: &str) -> &Vec<Option<T>> {
        match self {
            Self::Concrete(items) => items,
            Self::Symbolic(handle) => unintercepted(operation, *handle),
        }
    }

    #[track_caller]
    fn items_mut(&mut self, operation: &str) -> &mut Vec<Option<T>> {
        match self {
            Self::Concrete(items) => items,
            Self::Symbolic(handle) => unintercepted(operation, *handle),
        }
    }

    /// The number of elements, absent ones included
    #[must_use]
    pub fn size(&self) -> usize {
        self.items("SymbolicList::size").len()
    }

    /// The element at `index`, or `None` if that slot is absent.
    pub fn get(&self, index: usize) -> Result<Option<&T>, Error> {
        let items = self.items("SymbolicList::get");
        items
            .get(index)
            .map(Option::as_ref)
            .ok_or_else(|| out_of_bounds(index, items.len()))
    }

    /// Replaces the element at `index`, returning the previous one.
    pub fn set(&mut self, index: usize, value: Option<T>) -> Result<Option<T>, Error> {
        let items = self.items_mut("SymbolicList::set");
        let size = items.len();
        let slot = items.get_mut(index).ok_or_else(|| out_of_bounds(index, size))?;
        Ok(core::mem::replace(slot, value))
    }

    /// Appends `value`.
    pub fn add(&mut self, value: Option<T>) {
        self.items_mut("SymbolicList::add").push(value);
    }

    /// Inserts `value` at `index`, shifting every later element one slot to the right.
    ///
    /// `index` may equal [`SymbolicList::size`] to append.
    pub fn insert(&mut self, index: usize, value: Option<T>) -> Result<(), Error> {
        let items = self.items_mut("SymbolicList::insert");
        if index > items.len() {
            return Err(out_of_bounds(index, items.len()));
        }
        items.insert(index, value);
        Ok(())
    }

    /// Removes the element at `index`, shifting every later element one slot to the left.
    pub fn remove(&mut self, index: usize) -> Result<Option<T>, Error> {
        let items = self.items_mut("SymbolicList::remove");
        if index >= items.len() {
            return Err(out_of_bounds(index, items.len()));
        }
        Ok(items.remove(index))
    }

    /// Iterates all slots in order
    pub fn iter(&self) -> slice::Iter<'_, Option<T>> {
        self.items("SymbolicList::iter").iter()
    }
}

impl<T> SymbolicList<T>
where
    T: Clone,
{
    /// Copies `length` elements starting at `src_from` into `dst`, starting at `dst_from`.
    ///
    /// `dst` is first padded with absent elements until it holds at least `dst_from + length`.
    /// The source range has to lie within this list.
    pub fn copy_into(
        &self,
        dst: &mut Self,
        src_from: usize,
        dst_from: usize,
        length: usize,
    ) -> Result<(), Error> {
        let source = self.source_range("SymbolicList::copy", src_from, length)?;
        let target = dst.items_mut("SymbolicList::copy");
        write_padded(target, dst_from, source.iter().cloned())
    }

    /// [`SymbolicList::copy_into`] with this list as both source and destination.
    ///
    /// All source elements are read before the first write, overlapping ranges are fine.
    pub fn copy_within(
        &mut self,
        src_from: usize,
        dst_from: usize,
        length: usize,
    ) -> Result<(), Error> {
        let source = self
            .source_range("SymbolicList::copy", src_from, length)?
            .to_vec();
        let target = self.items_mut("SymbolicList::copy");
        write_padded(target, dst_from, source)
    }

    #[track_caller]
    fn source_range(
        &self,
        operation: &str,
        src_from: usize,
        length: usize,
    ) -> Result<&[Option<T>], Error> {
        let items = self.items(operation);
        let end = src_from
            .checked_add(length)
            .filter(|end| *end <= items.len())
            .ok_or_else(|| {
                Error::illegal_argument(format!(
                    "source range {src_from}+{length} out of bounds for size {}",
                    items.len()
                ))
            })?;
        Ok(&items[src_from..end])
    }
}

fn write_padded<T, I>(target: &mut Vec<Option<T>>, dst_from: usize, source: I) -> Result<(), Error>
where
    I: IntoIterator<Item = Option<T>>,
    I::IntoIter: ExactSizeIterator,
{
    let source = source.into_iter();
    let end = dst_from.checked_add(source.len()).ok_or_else(|| {
        Error::illegal_argument(format!("destination offset {dst_from} overflows"))
    })?;
    if target.len() < end {
        target.resize_with(end, || None);
    }
    for (slot, value) in target[dst_from..end].iter_mut().zip(source) {
        *slot = value;
    }
    Ok(())
}

impl<T> FromIterator<Option<T>> for SymbolicList<T> {
    fn from_iter<I>(iter: I) -> Self
    where
        I: IntoIterator<Item = Option<T>>,
    {
        Self::Concrete(iter.into_iter().collect())
    }
}

impl<T> From<Vec<Option<T>>> for SymbolicList<T> {
    fn from(items: Vec<Option<T>>) -> Self {
        Self::Concrete(items)
    }
}

#[cfg(test)]
mod tests {
    use alloc::{vec, vec::Vec};

    use super::SymbolicList;
    use crate::SymbolicHandle;

    fn list(items: &[u32]) -> SymbolicList<u32> {
        items.iter().copied().map(Some).collect()
    }

    fn contents(list: &SymbolicList<u32>) -> Vec<Option<u32>> {
        list.iter().copied().collect()
    }

    #[test]
    fn test_get_set_add() {
        let mut list = SymbolicList::new();
        assert_eq!(list.size(), 0);
        list.add(Some(1));
        list.add(None);
        list.add(Some(3));

        assert_eq!(list.size(), 3);
        assert_eq!(list.get(0).unwrap(), Some(&1));
        assert_eq!(list.get(1).unwrap(), None);
        assert!(list.get(3).is_err());

        assert_eq!(list.set(1, Some(2)).unwrap(), None);
        assert_eq!(list.set(1, Some(20)).unwrap(), Some(2));
        assert!(list.set(5, Some(0)).is_err());
        assert_eq!(contents(&list), vec![Some(1), Some(20), Some(3)]);
    }

    #[test]
    fn test_insert_shifts_right() {
        let mut list = list(&[1, 2, 3]);
        list.insert(1, Some(9)).unwrap();
        assert_eq!(contents(&list), vec![Some(1), Some(9), Some(2), Some(3)]);

        list.insert(0, Some(0)).unwrap();
        list.insert(list.size(), Some(4)).unwrap();
        assert_eq!(
            contents(&list),
            vec![Some(0), Some(1), Some(9), Some(2), Some(3), Some(4)]
        );
        assert!(list.insert(7, None).is_err());
    }

    #[test]
    fn test_remove_shifts_left() {
        let mut list = list(&[1, 2, 3, 4, 5]);
        assert_eq!(list.remove(0).unwrap(), Some(1));
        assert_eq!(list.remove(3).unwrap(), Some(5));
        assert_eq!(list.remove(1).unwrap(), Some(3));
        assert_eq!(contents(&list), vec![Some(2), Some(4)]);
        assert!(list.remove(2).is_err());
    }

    #[test]
    fn test_copy_pads_destination() {
        let source = list(&[10, 20, 30]);
        let mut destination = list(&[1]);
        source.copy_into(&mut destination, 1, 3, 2).unwrap();
        assert_eq!(
            contents(&destination),
            vec![Some(1), None, None, Some(20), Some(30)]
        );
    }

    #[test]
    fn test_copy_overwrites_without_growing() {
        let source = list(&[7, 8]);
        let mut destination = list(&[1, 2, 3, 4]);
        source.copy_into(&mut destination, 0, 1, 2).unwrap();
        assert_eq!(
            contents(&destination),
            vec![Some(1), Some(7), Some(8), Some(4)]
        );
    }

    #[test]
    fn test_copy_rejects_source_overrun() {
        let source = list(&[1, 2]);
        let mut destination = SymbolicList::new();
        assert!(source.copy_into(&mut destination, 1, 0, 2).is_err());
        assert!(source.copy_into(&mut destination, usize::MAX, 0, 2).is_err());
        assert_eq!(destination.size(), 0);
    }

    #[test]
    fn test_copy_within_overlapping() {
        let mut list = list(&[1, 2, 3, 4]);
        list.copy_within(0, 1, 3).unwrap();
        assert_eq!(contents(&list), vec![Some(1), Some(1), Some(2), Some(3)]);

        list.copy_within(2, 5, 2).unwrap();
        assert_eq!(
            contents(&list),
            vec![Some(1), Some(1), Some(2), Some(3), None, Some(2), Some(3)]
        );
    }

    #[test]
    fn test_symbolic_tag() {
        let handle = SymbolicHandle::new(3);
        let symbolic = SymbolicList::<u32>::from_handle(handle);
        assert!(symbolic.is_symbolic());
        assert_eq!(symbolic.symbolic_handle(), Some(handle));
        assert_eq!(SymbolicList::<u32>::new().symbolic_handle(), None);
    }

    #[test]
    #[should_panic(expected = "SymbolicList::size on symbolic collection #3")]
    fn test_symbolic_size_is_fatal() {
        let _ = SymbolicList::<u32>::from_handle(SymbolicHandle::new(3)).size();
    }

    #[test]
    #[should_panic(expected = "not intercepted")]
    fn test_symbolic_insert_is_fatal() {
        let mut list = SymbolicList::from_handle(SymbolicHandle::new(4));
        let _ = list.insert(0, Some(1_u32));
    }

    #[test]
    #[should_panic(expected = "SymbolicList::copy")]
    fn test_copy_into_symbolic_is_fatal() {
        let source = list(&[1]);
        let mut destination = SymbolicList::from_handle(SymbolicHandle::new(5));
        let _ = source.copy_into(&mut destination, 0, 0, 1);
    }
}
