#[cfg(test)]
mod test_containers {
    use std::collections::HashSet;
    use std::hash::{BuildHasherDefault, Hasher};

    use bucketheap::containers::{BucketSet, ContainerError, IndexedMinHeap};
    use rand::{rngs::StdRng, Rng, SeedableRng};

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

    fn check_placement<S: std::hash::BuildHasher>(set: &BucketSet<u64, S>) {
        for i in 0..set.num_buckets() {
            for d in set.bucket(i) {
                assert_eq!(set.bucket_index(d), i);
            }
        }
    }

    #[test]
    fn test_three_bucket_example() {
        let mut set = BucketSet::<u64, Identity>::with_hasher(3, Identity::default()).unwrap();
        // hashes mod 3: 0, 1, 2, 0, 1
        let (h0a, h1a, h2, h0b, h1b) = (0, 1, 2, 3, 4);
        for d in [h0a, h1a, h2, h0b, h1b] {
            assert!(set.insert(d));
        }
        assert_eq!(set.size(), 5);

        assert!(set.remove(&h1a));
        assert_eq!(set.size(), 4);
        assert_eq!(
            set.iter().copied().collect::<Vec<_>>(),
            vec![h0a, h0b, h1b, h2]
        );
    }

    #[test]
    fn test_heap_example() {
        let mut heap = IndexedMinHeap::new();
        for d in [5, 3, 8, 1] {
            heap.insert(d);
        }
        let mut extracted = Vec::new();
        for _ in 0..4 {
            extracted.push(heap.delete_min().unwrap());
        }
        assert_eq!(extracted, vec![1, 3, 5, 8]);
        assert!(heap.is_empty());
        assert_eq!(heap.delete_min(), Err(ContainerError::EmptyHeap));
    }

    #[test]
    fn test_set_matches_model() {
        let mut rng = StdRng::seed_from_u64(0x5eed);
        let mut set = BucketSet::<u64>::new(13).unwrap();
        let mut model = HashSet::new();

        for step in 0..2000 {
            let d = rng.gen_range(0..64u64);
            match rng.gen_range(0..4) {
                0 | 1 => assert_eq!(set.insert(d), model.insert(d)),
                2 => assert_eq!(set.remove(&d), model.remove(&d)),
                _ => assert_eq!(set.upsert(d), !model.insert(d)),
            }

            if step % 50 == 0 {
                for probe in 0..64u64 {
                    assert_eq!(set.contains(&probe), model.contains(&probe));
                }
                let live: Vec<u64> = set.iter().copied().collect();
                let unique: HashSet<u64> = live.iter().copied().collect();
                assert_eq!(live.len(), unique.len());
                assert_eq!(unique, model);
                assert_eq!(set.size(), model.len());
                assert_eq!(set.is_empty(), model.is_empty());
                check_placement(&set);
            }
        }
    }

    #[test]
    fn test_traversal_is_deterministic() {
        let build = || {
            let mut rng = StdRng::seed_from_u64(42);
            let mut set = BucketSet::<u64>::new(5).unwrap();
            for _ in 0..300 {
                let d = rng.gen_range(0..100u64);
                if rng.gen_bool(0.7) {
                    set.insert(d);
                } else {
                    set.remove(&d);
                }
            }
            set
        };
        let a: Vec<u64> = build().iter().copied().collect();
        let b: Vec<u64> = build().iter().copied().collect();
        assert_eq!(a, b);
    }

    #[test]
    fn test_cursor_walk_counts_size() {
        let mut set = BucketSet::<u64>::new(6).unwrap();
        set.extend((0..40).map(|d| d * 7));
        let mut count = 0;
        let mut cursor = set.begin();
        while cursor != set.end() {
            count += 1;
            cursor.move_next().unwrap();
        }
        assert_eq!(count, set.size());
    }

    #[test]
    fn test_heap_sorts() {
        let mut rng = StdRng::seed_from_u64(11);
        let mut heap = IndexedMinHeap::new();
        let mut inserted = Vec::new();
        for _ in 0..500 {
            let d = rng.gen_range(-50..50i32);
            heap.insert(d);
            inserted.push(d);
            assert!(heap.is_heap());
        }

        let mut extracted = Vec::new();
        while let Ok(min) = heap.delete_min() {
            assert!(heap.is_heap());
            extracted.push(min);
        }
        inserted.sort();
        assert_eq!(extracted, inserted);
    }

    #[test]
    fn test_heap_delete_at_random() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut heap = IndexedMinHeap::new();
        let mut model: Vec<u32> = Vec::new();

        for _ in 0..3000 {
            if heap.is_empty() || rng.gen_bool(0.55) {
                let d = rng.gen_range(0..1000u32);
                heap.insert(d);
                model.push(d);
            } else {
                let i = rng.gen_range(0..heap.size());
                let expected = heap[i];
                assert_eq!(heap.delete_at(i), Ok(expected));
                let pos = model.iter().position(|d| *d == expected).unwrap();
                model.swap_remove(pos);
            }
            assert!(heap.is_heap());
            assert_eq!(heap.size(), model.len());
            assert_eq!(heap.peek_min(), model.iter().min());
        }
    }
}
