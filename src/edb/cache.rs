//! Bounded LRU cache for decoded long-value data segments.
//!
//! Re-assembling a multi-megabyte long value (e.g. an email attachment
//! stored across hundreds of long-value segments) is expensive to repeat
//! on every access; [`SegmentCache`] memoizes already-decoded segments
//! keyed by `(long_value_id, segment_offset)`, bounded so pathological
//! access patterns (scanning every row of a table with many large
//! columns) cannot grow memory without limit.

use std::num::NonZeroUsize;

use lru::LruCache;

/// Default capacity, in entries, when none is configured via
/// [`crate::edb::OpenOptions`].
pub const DEFAULT_CAPACITY: usize = 256;

pub struct SegmentCache {
    cache: LruCache<(u32, u32), std::rc::Rc<Vec<u8>>>,
}

impl SegmentCache {
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::new(1).unwrap());
        SegmentCache {
            cache: LruCache::new(capacity),
        }
    }

    pub fn get(&mut self, long_value_id: u32, segment_offset: u32) -> Option<std::rc::Rc<Vec<u8>>> {
        self.cache.get(&(long_value_id, segment_offset)).cloned()
    }

    pub fn insert(&mut self, long_value_id: u32, segment_offset: u32, data: Vec<u8>) {
        self.cache
            .put((long_value_id, segment_offset), std::rc::Rc::new(data));
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }
}

impl Default for SegmentCache {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_and_get() {
        let mut cache = SegmentCache::new(2);
        cache.insert(1, 1, vec![1, 2, 3]);
        assert_eq!(cache.get(1, 1).map(|v| (*v).clone()), Some(vec![1, 2, 3]));
    }

    #[test]
    fn test_eviction_at_capacity() {
        let mut cache = SegmentCache::new(1);
        cache.insert(1, 1, vec![1]);
        cache.insert(2, 1, vec![2]);
        assert!(cache.get(1, 1).is_none());
        assert!(cache.get(2, 1).is_some());
    }

    #[test]
    fn test_miss_returns_none() {
        let mut cache = SegmentCache::new(4);
        assert!(cache.get(9, 9).is_none());
    }
}
