//! A self-hosted dynamic array.
//!
//! The buffer talks to the global allocator directly and never goes through [`alloc::vec::Vec`]
//! or any other collection type, so it keeps working while those types are themselves traced
//! or mocked in the analyzed program.

use alloc::alloc::{alloc, dealloc, handle_alloc_error, realloc};
use core::{
    alloc::Layout,
    fmt::{self, Debug, Formatter},
    marker::PhantomData,
    mem::size_of,
    ptr::{self, NonNull},
    slice,
};

use symbridge_core::HasLen;

use crate::BUFFER_INITIAL_CAPACITY;

/// An append-only growable array of plain `Copy` data.
///
/// Capacity grows to `⌊capacity * 3 / 2⌋` whenever an [`GrowableBuffer::add`] finds the buffer
/// full, and is never given back: [`GrowableBuffer::clear`] only forgets the elements.
/// There is no synchronization, a buffer belongs to exactly one owner.
pub struct GrowableBuffer<T>
where
    T: Copy,
{
    items: NonNull<T>,
    capacity: usize,
    size: usize,
    phantom: PhantomData<T>,
}

// # Safety
// The buffer exclusively owns its block, moving it to another thread moves the block with it.
unsafe impl<T> Send for GrowableBuffer<T> where T: Copy + Send {}

impl<T> GrowableBuffer<T>
where
    T: Copy,
{
    /// Creates an empty buffer with the build-time default capacity (see `build.rs`).
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(BUFFER_INITIAL_CAPACITY)
    }

    /// Creates an empty buffer that can hold `capacity` elements before it grows.
    ///
    /// A capacity of zero is bumped to one.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = if size_of::<T>() == 0 {
            usize::MAX
        } else {
            capacity.max(1)
        };
        Self {
            items: Self::allocate(capacity),
            capacity,
            size: 0,
            phantom: PhantomData,
        }
    }

    fn layout(capacity: usize) -> Layout {
        Layout::array::<T>(capacity).expect("GrowableBuffer capacity overflow")
    }

    fn allocate(capacity: usize) -> NonNull<T> {
        if size_of::<T>() == 0 {
            return NonNull::dangling();
        }
        let layout = Self::layout(capacity);
        // # Safety
        // `layout` is never zero-sized here.
        let ptr = unsafe { alloc(layout) }.cast::<T>();
        NonNull::new(ptr).unwrap_or_else(|| handle_alloc_error(layout))
    }

    #[cold]
    fn grow(&mut self) {
        let new_capacity = self
            .capacity
            .checked_add(self.capacity / 2)
            .expect("GrowableBuffer capacity overflow")
            .max(self.capacity + 1);

        let old_layout = Self::layout(self.capacity);
        let new_layout = Self::layout(new_capacity);
        // # Safety
        // `items` was allocated with `old_layout` and the new size is larger than zero.
        let ptr = unsafe {
            realloc(
                self.items.as_ptr().cast::<u8>(),
                old_layout,
                new_layout.size(),
            )
        }
        .cast::<T>();
        self.items = NonNull::new(ptr).unwrap_or_else(|| handle_alloc_error(new_layout));
        self.capacity = new_capacity;
    }

    /// Appends `value`, growing the backing block if it is full.
    #[inline]
    pub fn add(&mut self, value: T) {
        if self.size == self.capacity {
            self.grow();
        }
        // # Safety
        // `size < capacity` after growing, the slot is inside the block.
        unsafe {
            self.items.as_ptr().add(self.size).write(value);
        }
        self.size += 1;
    }

    /// Returns the element at `index`, or `None` if `index >= len()`.
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<T> {
        if index < self.size {
            // # Safety
            // Checked against `size` above.
            Some(unsafe { self.get_unchecked(index) })
        } else {
            None
        }
    }

    /// Returns the element at `index` without a bounds check.
    ///
    /// # Safety
    /// `index` must be smaller than [`HasLen::len`].
    #[inline]
    #[must_use]
    pub unsafe fn get_unchecked(&self, index: usize) -> T {
        debug_assert!(index < self.size);
        unsafe { self.items.as_ptr().add(index).read() }
    }

    /// Forgets the last element, used to undo a speculative [`GrowableBuffer::add`].
    ///
    /// Does nothing on an empty buffer.
    #[inline]
    pub fn remove_last(&mut self) {
        self.size = self.size.saturating_sub(1);
    }

    /// Forgets all elements, keeping the capacity.
    #[inline]
    pub fn clear(&mut self) {
        self.size = 0;
    }

    /// The number of elements the buffer holds before it has to grow.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The live elements, in insertion order.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        // # Safety
        // The first `size` slots are initialized, `items` is non-null and aligned.
        unsafe { slice::from_raw_parts(self.items.as_ptr(), self.size) }
    }

    /// Iterates the live elements, in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.as_slice().iter()
    }
}

impl<T> HasLen for GrowableBuffer<T>
where
    T: Copy,
{
    #[inline]
    fn len(&self) -> usize {
        self.size
    }
}

impl<T> Default for GrowableBuffer<T>
where
    T: Copy,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for GrowableBuffer<T>
where
    T: Copy,
{
    fn clone(&self) -> Self {
        let items = Self::allocate(self.capacity);
        // # Safety
        // Both blocks hold at least `size` elements and are distinct allocations.
        unsafe {
            ptr::copy_nonoverlapping(self.items.as_ptr(), items.as_ptr(), self.size);
        }
        Self {
            items,
            capacity: self.capacity,
            size: self.size,
            phantom: PhantomData,
        }
    }
}

impl<T> Drop for GrowableBuffer<T>
where
    T: Copy,
{
    fn drop(&mut self) {
        if size_of::<T>() != 0 {
            // # Safety
            // `items` was allocated with the layout for the current capacity.
            unsafe {
                dealloc(
                    self.items.as_ptr().cast::<u8>(),
                    Self::layout(self.capacity),
                );
            }
        }
    }
}

impl<T> Debug for GrowableBuffer<T>
where
    T: Copy + Debug,
{
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("GrowableBuffer")
            .field("capacity", &self.capacity)
            .field("items", &self.as_slice())
            .finish()
    }
}

impl<'a, T> IntoIterator for &'a GrowableBuffer<T>
where
    T: Copy,
{
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
