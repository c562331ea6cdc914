use std::{
    fmt,
    hash::{BuildHasher, BuildHasherDefault, Hash, Hasher},
    iter::{FusedIterator, Flatten},
    slice,
};

use rustc_hash::FxHasher;

use super::{ContainerError, Cursor};

/// A hash set with a fixed number of buckets.
///
/// Each bucket is a `Vec<T>` kept in insertion order. An element `d` always
/// lives in bucket `hash(d) % num_buckets()`, and no two resident elements
/// compare equal. The bucket count is chosen once and never grows; there is
/// no rehashing, so callers can rely on the bucket an element maps to.
///
/// Hashing goes through `S`, which defaults to the deterministic `FxHasher`.
#[derive(Clone)]
pub struct BucketSet<T, S = BuildHasherDefault<FxHasher>> {
    buckets: Vec<Vec<T>>,
    hash_builder: S,
}

impl<T> BucketSet<T>
where
    T: Hash + Eq,
{
    /// Allocates `bucket_count` empty buckets.
    pub fn new(bucket_count: usize) -> Result<Self, ContainerError> {
        Self::with_hasher(bucket_count, Default::default())
    }
}

impl<T, S> BucketSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    pub fn with_hasher(bucket_count: usize, hash_builder: S) -> Result<Self, ContainerError> {
        if bucket_count == 0 {
            return Err(ContainerError::ZeroBuckets);
        }
        let mut buckets = Vec::with_capacity(bucket_count);
        buckets.resize_with(bucket_count, Vec::new);
        Ok(Self {
            buckets,
            hash_builder,
        })
    }

    /// Drops every element and starts over with `bucket_count` buckets.
    ///
    /// On error the set is left as it was.
    pub fn reinit(&mut self, bucket_count: usize) -> Result<(), ContainerError> {
        if bucket_count == 0 {
            return Err(ContainerError::ZeroBuckets);
        }
        self.buckets.clear();
        self.buckets.shrink_to_fit();
        self.buckets.resize_with(bucket_count, Vec::new);
        Ok(())
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// The elements of bucket `i` in insertion order.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.num_buckets()`.
    pub fn bucket(&self, i: usize) -> &[T] {
        &self.buckets[i]
    }

    /// The bucket `d` belongs to.
    pub fn bucket_index(&self, d: &T) -> usize {
        let mut hasher = self.hash_builder.build_hasher();
        d.hash(&mut hasher);
        (hasher.finish() % self.buckets.len() as u64) as usize
    }

    fn locate(&self, d: &T) -> (usize, Option<usize>) {
        let id = self.bucket_index(d);
        (id, self.buckets[id].iter().position(|stored| stored == d))
    }

    pub fn contains(&self, d: &T) -> bool {
        self.locate(d).1.is_some()
    }

    /// The stored element equal to `d`, if any.
    pub fn get(&self, d: &T) -> Option<&T> {
        let (id, pos) = self.locate(d);
        pos.map(|pos| &self.buckets[id][pos])
    }

    /// Returns `false` and leaves the set untouched if an equal element is
    /// already present; otherwise appends `d` to its bucket.
    pub fn insert(&mut self, d: T) -> bool {
        let (id, pos) = self.locate(&d);
        if pos.is_some() {
            return false;
        }
        trace!("bucket set: insert into bucket {id}");
        self.buckets[id].push(d);
        true
    }

    /// Overwrites the stored element equal to `d` and returns `true`, or
    /// inserts `d` as new and returns `false`.
    pub fn upsert(&mut self, d: T) -> bool {
        let (id, pos) = self.locate(&d);
        match pos {
            Some(pos) => {
                self.buckets[id][pos] = d;
                true
            }
            None => {
                trace!("bucket set: upsert appends to bucket {id}");
                self.buckets[id].push(d);
                false
            }
        }
    }

    /// Replaces `d` with a copy of the stored element that equals it.
    ///
    /// Useful when equality only looks at part of the element. Leaves `d`
    /// untouched and returns `false` when nothing matches.
    pub fn lookup_canonical(&self, d: &mut T) -> bool
    where
        T: Clone,
    {
        match self.get(d) {
            Some(stored) => {
                d.clone_from(stored);
                true
            }
            None => false,
        }
    }

    /// Removes the element equal to `d`, keeping the order of the rest of
    /// its bucket.
    pub fn remove(&mut self, d: &T) -> bool {
        self.take(d).is_some()
    }

    /// Like `remove`, but hands the stored element back.
    pub fn take(&mut self, d: &T) -> Option<T> {
        let (id, pos) = self.locate(d);
        let pos = pos?;
        trace!("bucket set: remove slot {pos} of bucket {id}");
        Some(self.buckets[id].remove(pos))
    }
}

impl<T, S> BucketSet<T, S> {
    /// Number of live elements. There is no cached counter; this walks the
    /// whole set.
    pub fn size(&self) -> usize {
        self.iter().count()
    }

    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Empties every bucket. The bucket count does not change.
    pub fn clear(&mut self) {
        self.buckets.iter_mut().for_each(Vec::clear);
    }

    /// Visits buckets in ascending order, and each bucket in insertion order.
    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            inner: self.buckets.iter().flatten(),
        }
    }

    /// Cursor at the first element, or `end()` if the set is empty.
    pub fn begin(&self) -> Cursor<'_, T> {
        Cursor::first(&self.buckets)
    }

    pub fn end(&self) -> Cursor<'_, T> {
        Cursor::past_end(&self.buckets)
    }
}

impl<T, S> fmt::Debug for BucketSet<T, S>
where
    T: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

impl<T, S> Extend<T> for BucketSet<T, S>
where
    T: Hash + Eq,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for d in iter {
            self.insert(d);
        }
    }
}

impl<'a, T, S> IntoIterator for &'a BucketSet<T, S> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Borrowing iterator over a `BucketSet`, see [`BucketSet::iter`].
pub struct Iter<'a, T> {
    inner: Flatten<slice::Iter<'a, Vec<T>>>,
}

impl<'a, T> Clone for Iter<'a, T> {
    fn clone(&self) -> Self {
        Iter {
            inner: self.inner.clone(),
        }
    }
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

impl<'a, T> DoubleEndedIterator for Iter<'a, T> {
    fn next_back(&mut self) -> Option<Self::Item> {
        self.inner.next_back()
    }
}

impl<'a, T> FusedIterator for Iter<'a, T> {}

#[cfg(test)]
mod tests {
    use std::hash::{BuildHasherDefault, Hash, Hasher};

    use super::BucketSet;
    use crate::containers::ContainerError;

    /// Hashes a `u64` to itself, so tests control bucket placement.
    #[derive(Default)]
    struct IdentityHasher(u64);

    impl Hasher for IdentityHasher {
        fn finish(&self) -> u64 {
            self.0
        }

        fn write(&mut self, bytes: &[u8]) {
            for b in bytes {
                self.0 = (self.0 << 8) | u64::from(*b);
            }
        }

        fn write_u64(&mut self, n: u64) {
            self.0 = n;
        }
    }

    type Identity = BuildHasherDefault<IdentityHasher>;

    /// Equality and hashing only look at `key`.
    #[derive(Debug, Clone)]
    struct Entry {
        key: u64,
        payload: &'static str,
    }

    impl Hash for Entry {
        fn hash<H: Hasher>(&self, state: &mut H) {
            self.key.hash(state)
        }
    }

    impl PartialEq for Entry {
        fn eq(&self, other: &Self) -> bool {
            self.key == other.key
        }
    }

    impl Eq for Entry {}

    fn entry(key: u64, payload: &'static str) -> Entry {
        Entry { key, payload }
    }

    #[test]
    fn test_zero_buckets_rejected() {
        assert_eq!(
            BucketSet::<u64>::new(0).unwrap_err(),
            ContainerError::ZeroBuckets
        );
        let mut set = BucketSet::<u64>::new(4).unwrap();
        set.insert(7);
        assert_eq!(set.reinit(0), Err(ContainerError::ZeroBuckets));
        assert_eq!(set.num_buckets(), 4);
        assert!(set.contains(&7));
    }

    #[test]
    fn test_insert_rejects_duplicates() {
        let mut set = BucketSet::<u64, Identity>::with_hasher(3, Identity::default()).unwrap();
        assert!(set.insert(4));
        assert!(!set.insert(4));
        assert_eq!(set.size(), 1);
        assert_eq!(set.bucket(1), &[4]);
    }

    #[test]
    fn test_placement_and_order() {
        let mut set = BucketSet::<u64, Identity>::with_hasher(3, Identity::default()).unwrap();
        for d in [0, 1, 2, 3, 4] {
            assert!(set.insert(d));
        }
        assert_eq!(set.size(), 5);
        assert_eq!(set.bucket(0), &[0, 3]);
        assert_eq!(set.bucket(1), &[1, 4]);
        assert_eq!(set.bucket(2), &[2]);

        assert!(set.remove(&1));
        assert!(!set.remove(&1));
        assert_eq!(set.size(), 4);
        assert_eq!(set.iter().copied().collect::<Vec<_>>(), vec![0, 3, 4, 2]);
    }

    #[test]
    fn test_remove_keeps_bucket_order() {
        let mut set = BucketSet::<u64, Identity>::with_hasher(2, Identity::default()).unwrap();
        set.extend([0, 2, 4, 6, 8]);
        assert!(set.remove(&4));
        assert_eq!(set.bucket(0), &[0, 2, 6, 8]);
    }

    #[test]
    fn test_upsert_polarity() {
        let mut set = BucketSet::<Entry, Identity>::with_hasher(5, Identity::default()).unwrap();
        assert!(!set.upsert(entry(3, "first")));
        assert!(set.upsert(entry(3, "second")));
        assert_eq!(set.size(), 1);
        assert_eq!(set.get(&entry(3, "")).unwrap().payload, "second");
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut set = BucketSet::<Entry, Identity>::with_hasher(1, Identity::default()).unwrap();
        set.insert(entry(1, "a"));
        set.insert(entry(2, "b"));
        set.insert(entry(3, "c"));
        set.upsert(entry(2, "B"));
        let payloads: Vec<_> = set.iter().map(|e| e.payload).collect();
        assert_eq!(payloads, vec!["a", "B", "c"]);
    }

    #[test]
    fn test_lookup_canonical() {
        let mut set = BucketSet::<Entry, Identity>::with_hasher(4, Identity::default()).unwrap();
        set.insert(entry(9, "stored"));

        let mut probe = entry(9, "probe");
        assert!(set.lookup_canonical(&mut probe));
        assert_eq!(probe.payload, "stored");

        let mut missing = entry(10, "probe");
        assert!(!set.lookup_canonical(&mut missing));
        assert_eq!(missing.payload, "probe");
    }

    #[test]
    fn test_clear_and_reinit() {
        let mut set = BucketSet::<u64>::new(8).unwrap();
        set.extend(0..20);
        assert!(!set.is_empty());
        set.clear();
        assert!(set.is_empty());
        assert_eq!(set.num_buckets(), 8);

        set.extend(0..5);
        set.reinit(2).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.num_buckets(), 2);
        assert!(set.insert(3));
    }

    #[test]
    fn test_take_returns_stored() {
        let mut set = BucketSet::<Entry>::new(16).unwrap();
        set.insert(entry(5, "kept"));
        assert_eq!(set.take(&entry(5, "")).map(|e| e.payload), Some("kept"));
        assert!(set.take(&entry(5, "")).is_none());
    }

    #[test]
    fn test_reverse_iteration() {
        let mut set = BucketSet::<u64, Identity>::with_hasher(3, Identity::default()).unwrap();
        set.extend([5, 3, 0, 4]);
        let forward: Vec<_> = set.iter().copied().collect();
        let mut backward: Vec<_> = set.iter().rev().copied().collect();
        backward.reverse();
        assert_eq!(forward, vec![3, 0, 4, 5]);
        assert_eq!(forward, backward);
    }

    #[test]
    fn test_debug_lists_elements() {
        let mut set = BucketSet::<u64, Identity>::with_hasher(3, Identity::default()).unwrap();
        set.extend([2, 1]);
        assert_eq!(format!("{set:?}"), "{1, 2}");
    }
}
