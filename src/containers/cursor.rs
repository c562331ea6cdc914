use std::fmt;

use super::ContainerError;

/// A position inside a `BucketSet`: a `(bucket, offset)` pair.
///
/// The end position is `(num_buckets, 0)`. A cursor borrows the set, so the
/// set cannot be mutated while the cursor is alive.
pub struct Cursor<'a, T> {
    buckets: &'a [Vec<T>],
    bucket: usize,
    offset: usize,
}

impl<'a, T> Cursor<'a, T> {
    pub(super) fn first(buckets: &'a [Vec<T>]) -> Self {
        match buckets.iter().position(|b| !b.is_empty()) {
            Some(bucket) => Self {
                buckets,
                bucket,
                offset: 0,
            },
            None => Self::past_end(buckets),
        }
    }

    pub(super) fn past_end(buckets: &'a [Vec<T>]) -> Self {
        Self {
            buckets,
            bucket: buckets.len(),
            offset: 0,
        }
    }

    /// The element under the cursor, or `None` at the end.
    pub fn get(&self) -> Option<&'a T> {
        self.buckets.get(self.bucket)?.get(self.offset)
    }

    pub fn is_end(&self) -> bool {
        self.bucket == self.buckets.len()
    }

    /// `(bucket, offset)` of the cursor.
    pub fn position(&self) -> (usize, usize) {
        (self.bucket, self.offset)
    }

    /// Steps to the next element, or to the end after the last one.
    pub fn move_next(&mut self) -> Result<(), ContainerError> {
        if self.is_end() {
            return Err(ContainerError::CursorPastEnd);
        }
        if self.offset + 1 < self.buckets[self.bucket].len() {
            self.offset += 1;
            return Ok(());
        }
        self.offset = 0;
        self.bucket = self.buckets[self.bucket + 1..]
            .iter()
            .position(|b| !b.is_empty())
            .map_or(self.buckets.len(), |skip| self.bucket + 1 + skip);
        Ok(())
    }

    /// Steps to the previous element. Stepping back from the end lands on
    /// the last element.
    pub fn move_prev(&mut self) -> Result<(), ContainerError> {
        if self.offset > 0 {
            self.offset -= 1;
            return Ok(());
        }
        let bucket = self.buckets[..self.bucket]
            .iter()
            .rposition(|b| !b.is_empty())
            .ok_or(ContainerError::CursorBeforeBegin)?;
        self.bucket = bucket;
        self.offset = self.buckets[bucket].len() - 1;
        Ok(())
    }
}

impl<'a, T> Clone for Cursor<'a, T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<'a, T> Copy for Cursor<'a, T> {}

impl<'a, T> PartialEq for Cursor<'a, T> {
    fn eq(&self, other: &Self) -> bool {
        self.bucket == other.bucket && self.offset == other.offset
    }
}

impl<'a, T> Eq for Cursor<'a, T> {}

impl<'a, T> fmt::Debug for Cursor<'a, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cursor")
            .field("bucket", &self.bucket)
            .field("offset", &self.offset)
            .finish()
    }
}
