use std::{ops::Index, slice};

use super::ContainerError;

/// A binary min-heap over a `Vec<T>` that can delete at any position.
///
/// Node `i` has children `2i + 1` and `2i + 2`. After every mutating call
/// each parent is `<=` both of its children.
#[derive(Debug, Clone)]
pub struct IndexedMinHeap<T> {
    data: Vec<T>,
}

impl<T> Default for IndexedMinHeap<T> {
    fn default() -> Self {
        Self { data: Vec::new() }
    }
}

impl<T> IndexedMinHeap<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            data: Vec::with_capacity(capacity),
        }
    }

    pub fn size(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn clear(&mut self) {
        self.data.clear();
    }

    pub fn get(&self, i: usize) -> Option<&T> {
        self.data.get(i)
    }

    /// The backing array in heap order.
    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn iter(&self) -> slice::Iter<'_, T> {
        self.data.iter()
    }

    /// The smallest element, `None` when the heap is empty.
    pub fn peek_min(&self) -> Option<&T> {
        self.data.first()
    }
}

impl<T: Ord> IndexedMinHeap<T> {
    pub fn insert(&mut self, d: T) {
        self.data.push(d);
        let at = self.sift_up(self.data.len() - 1);
        trace!("min heap: inserted at slot {at} of {}", self.data.len());
    }

    pub fn delete_min(&mut self) -> Result<T, ContainerError> {
        if self.data.is_empty() {
            return Err(ContainerError::EmptyHeap);
        }
        self.delete_at(0)
    }

    /// Removes and returns the element at slot `i`.
    ///
    /// The tail element is moved into slot `i` and sifted down. If it did not
    /// move down, it is sifted up instead, since the tail of one subtree can be
    /// smaller than the parent of a slot in another subtree.
    pub fn delete_at(&mut self, i: usize) -> Result<T, ContainerError> {
        if i >= self.data.len() {
            return Err(ContainerError::IndexOutOfRange {
                index: i,
                len: self.data.len(),
            });
        }
        let removed = self.data.swap_remove(i);
        if i < self.data.len() && self.sift_down(i) == i {
            self.sift_up(i);
        }
        Ok(removed)
    }

    /// Checks the heap property over the whole array.
    pub fn is_heap(&self) -> bool {
        (1..self.data.len()).all(|i| self.data[(i - 1) / 2] <= self.data[i])
    }

    /// Consumes the heap, returning its elements smallest first.
    pub fn into_sorted_vec(mut self) -> Vec<T> {
        let mut sorted = Vec::with_capacity(self.data.len());
        while let Ok(min) = self.delete_min() {
            sorted.push(min);
        }
        sorted
    }

    fn sift_up(&mut self, mut i: usize) -> usize {
        while i > 0 {
            let parent = (i - 1) / 2;
            if self.data[i] < self.data[parent] {
                self.data.swap(i, parent);
                i = parent;
            } else {
                break;
            }
        }
        i
    }

    fn sift_down(&mut self, mut i: usize) -> usize {
        let len = self.data.len();
        loop {
            let left = 2 * i + 1;
            let right = left + 1;
            let mut smallest = i;
            if left < len && self.data[left] < self.data[smallest] {
                smallest = left;
            }
            if right < len && self.data[right] < self.data[smallest] {
                smallest = right;
            }
            if smallest == i {
                return i;
            }
            self.data.swap(i, smallest);
            i = smallest;
        }
    }
}

impl<T> Index<usize> for IndexedMinHeap<T> {
    type Output = T;

    /// # Panics
    ///
    /// Panics if `i` is out of range.
    fn index(&self, i: usize) -> &T {
        &self.data[i]
    }
}

impl<T: Ord> Extend<T> for IndexedMinHeap<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for d in iter {
            self.insert(d);
        }
    }
}

impl<T: Ord> FromIterator<T> for IndexedMinHeap<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut heap = Self::new();
        heap.extend(iter);
        heap
    }
}

impl<'a, T> IntoIterator for &'a IndexedMinHeap<T> {
    type Item = &'a T;
    type IntoIter = slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}
