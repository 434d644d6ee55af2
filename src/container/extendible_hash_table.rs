//! Disk-backed extendible hash table.
//!
//! Three page kinds form the structure: one header page routing on the
//! high bits of the hash, directory pages routing on the low bits, and
//! bucket pages holding the entries. Buckets split when full and merge
//! with their split image when emptied; the directory doubles and halves
//! as local depths demand.
//!
//! # Latch coupling
//! Every operation walks header → directory → bucket, releasing each
//! ancestor's guard as soon as the child's guard is held and the path is
//! known to be stable. Latches are never taken upward, so the walk cannot
//! deadlock. Lookups use read guards throughout; mutations hold write
//! guards from the directory down.

use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::sync::Arc;

use crate::buffer::BufferPoolManager;
use crate::common::{PageId, Result};
use crate::storage::page::{HashBucketPage, HashDirectoryPage, HashHeaderPage, OnPage};

/// Produces the 32-bit hash the table routes on.
///
/// The table itself never hashes; the hasher is supplied by the caller so
/// tests can pin down bucket placement exactly.
pub trait KeyHasher<K>: Send + Sync {
    fn hash_key(&self, key: &K) -> u32;
}

/// Hashes through the standard library's default hasher.
#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultKeyHasher;

impl<K: Hash> KeyHasher<K> for DefaultKeyHasher {
    fn hash_key(&self, key: &K) -> u32 {
        let mut hasher = std::collections::hash_map::DefaultHasher::new();
        key.hash(&mut hasher);
        hasher.finish() as u32
    }
}

/// Uses the key itself as its hash. Deterministic bucket placement for
/// tests and tools.
#[derive(Debug, Default, Clone, Copy)]
pub struct IdentityHasher;

impl KeyHasher<i64> for IdentityHasher {
    fn hash_key(&self, key: &i64) -> u32 {
        *key as u32
    }
}

impl KeyHasher<u32> for IdentityHasher {
    fn hash_key(&self, key: &u32) -> u32 {
        *key
    }
}

/// Disk extendible hash table over a shared buffer pool.
///
/// Keys are unique: inserting a present key fails rather than overwriting.
/// `insert` can also fail when the target bucket is full and its directory
/// slot already uses all `directory_max_depth` bits, i.e. the structure
/// cannot grow any further.
pub struct DiskExtendibleHashTable<K, V, H> {
    bpm: Arc<BufferPoolManager>,
    hasher: H,
    header_page_id: PageId,
    directory_max_depth: u32,
    bucket_max_size: u32,
    _marker: PhantomData<(K, V)>,
}

impl<K, V, H> DiskExtendibleHashTable<K, V, H>
where
    K: OnPage + PartialEq + Clone,
    V: OnPage + Clone,
    H: KeyHasher<K>,
{
    /// Create an empty table, allocating and initializing its header page.
    pub fn new(
        bpm: Arc<BufferPoolManager>,
        hasher: H,
        header_max_depth: u32,
        directory_max_depth: u32,
        bucket_max_size: u32,
    ) -> Result<Self> {
        assert!(bucket_max_size <= HashBucketPage::<K, V>::capacity());

        let guard = bpm.new_page()?;
        let header_page_id = guard.page_id();
        let mut header_guard = guard.upgrade_write();
        HashHeaderPage::new(header_max_depth).save(header_guard.data_mut());
        drop(header_guard);

        Ok(Self {
            bpm,
            hasher,
            header_page_id,
            directory_max_depth,
            bucket_max_size,
            _marker: PhantomData,
        })
    }

    /// The page id of the table's header page.
    pub fn header_page_id(&self) -> PageId {
        self.header_page_id
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Fetch the value stored under `key`.
    pub fn get(&self, key: &K) -> Result<Option<V>> {
        let hash = self.hasher.hash_key(key);

        let header_guard = self.bpm.fetch_page_read(self.header_page_id)?;
        let header = HashHeaderPage::load(header_guard.data());
        let directory_page_id = header.directory_page_id(header.directory_index(hash));
        if !directory_page_id.is_valid() {
            return Ok(None);
        }

        let directory_guard = self.bpm.fetch_page_read(directory_page_id)?;
        drop(header_guard);
        let directory = HashDirectoryPage::load(directory_guard.data());
        let bucket_page_id = directory.bucket_page_id(directory.bucket_index(hash));
        if !bucket_page_id.is_valid() {
            return Ok(None);
        }

        let bucket_guard = self.bpm.fetch_page_read(bucket_page_id)?;
        drop(directory_guard);
        let bucket = HashBucketPage::<K, V>::load(bucket_guard.data());
        Ok(bucket.lookup(key))
    }

    // ========================================================================
    // Insertion
    // ========================================================================

    /// Insert a `(key, value)` entry.
    ///
    /// Returns `Ok(false)` if the key is already present, or if the table
    /// cannot make room for it at its maximum directory depth.
    pub fn insert(&self, key: &K, value: &V) -> Result<bool> {
        let hash = self.hasher.hash_key(key);

        let mut header_guard = self.bpm.fetch_page_write(self.header_page_id)?;
        let mut header = HashHeaderPage::load(header_guard.data());
        let directory_idx = header.directory_index(hash);
        let mut directory_page_id = header.directory_page_id(directory_idx);

        if !directory_page_id.is_valid() {
            directory_page_id = self.insert_to_new_directory(&mut header, directory_idx)?;
            header.save(header_guard.data_mut());
        }

        let mut directory_guard = self.bpm.fetch_page_write(directory_page_id)?;
        drop(header_guard);
        let mut directory = HashDirectoryPage::load(directory_guard.data());
        let bucket_idx = directory.bucket_index(hash);
        let bucket_page_id = directory.bucket_page_id(bucket_idx);

        if !bucket_page_id.is_valid() {
            let inserted = self.insert_to_new_bucket(&mut directory, bucket_idx, key, value)?;
            directory.save(directory_guard.data_mut());
            return Ok(inserted);
        }

        let mut bucket_guard = self.bpm.fetch_page_write(bucket_page_id)?;
        let mut bucket = HashBucketPage::<K, V>::load(bucket_guard.data());
        if !bucket.is_full() {
            let inserted = bucket.insert(key.clone(), value.clone());
            if inserted {
                bucket.save(bucket_guard.data_mut());
            }
            return Ok(inserted);
        }

        drop(bucket_guard);
        let inserted = self.split_insert(&mut directory, bucket_idx, hash, key, value)?;
        directory.save(directory_guard.data_mut());
        #[cfg(debug_assertions)]
        directory.verify_integrity();
        Ok(inserted)
    }

    /// Allocate a directory page for `directory_idx` and record it in the
    /// header.
    fn insert_to_new_directory(
        &self,
        header: &mut HashHeaderPage,
        directory_idx: u32,
    ) -> Result<PageId> {
        let guard = self.bpm.new_page()?;
        let page_id = guard.page_id();
        let mut directory_guard = guard.upgrade_write();
        HashDirectoryPage::new(self.directory_max_depth).save(directory_guard.data_mut());
        header.set_directory_page_id(directory_idx, page_id);
        Ok(page_id)
    }

    /// Allocate a bucket page for `bucket_idx` with the entry already in it.
    fn insert_to_new_bucket(
        &self,
        directory: &mut HashDirectoryPage,
        bucket_idx: u32,
        key: &K,
        value: &V,
    ) -> Result<bool> {
        let guard = self.bpm.new_page()?;
        let page_id = guard.page_id();
        let mut bucket_guard = guard.upgrade_write();
        let mut bucket = HashBucketPage::<K, V>::new(self.bucket_max_size);
        let inserted = bucket.insert(key.clone(), value.clone());
        bucket.save(bucket_guard.data_mut());
        directory.set_bucket_page_id(bucket_idx, page_id);
        Ok(inserted)
    }

    /// Split the full bucket at `bucket_idx` and insert into whichever half
    /// the key now lands in. Recurses while the pathological case (every
    /// entry rehashing to one side) keeps the target full.
    fn split_insert(
        &self,
        directory: &mut HashDirectoryPage,
        bucket_idx: u32,
        hash: u32,
        key: &K,
        value: &V,
    ) -> Result<bool> {
        if directory.local_depth(bucket_idx) == directory.max_depth() {
            // Every distinguishing bit is already in use.
            log::warn!(
                "bucket split impossible at max depth {}",
                directory.max_depth()
            );
            return Ok(false);
        }
        if directory.local_depth(bucket_idx) == directory.global_depth() {
            directory.incr_global_depth();
        }
        directory.incr_local_depth(bucket_idx);

        let bucket_page_id = directory.bucket_page_id(bucket_idx);
        let mut bucket_guard = self.bpm.fetch_page_write(bucket_page_id)?;
        let mut bucket = HashBucketPage::<K, V>::load(bucket_guard.data());

        // Bring up the split image with the same depth and a fresh page.
        let split_idx = directory.split_image_index(bucket_idx);
        directory.set_local_depth(split_idx, directory.local_depth(bucket_idx) as u8);
        let guard = self.bpm.new_page()?;
        let split_page_id = guard.page_id();
        let mut split_guard = guard.upgrade_write();
        directory.set_bucket_page_id(split_idx, split_page_id);
        log::debug!(
            "splitting bucket slot {} into slot {} ({})",
            bucket_idx,
            split_idx,
            split_page_id
        );

        // Rehash: entries whose slot is now the split image move over.
        let mut split_bucket = HashBucketPage::<K, V>::new(self.bucket_max_size);
        let mut i = bucket.len();
        while i > 0 {
            i -= 1;
            let (k, v) = bucket.entry_at(i).clone();
            if directory.bucket_index(self.hasher.hash_key(&k)) == split_idx {
                split_bucket.insert(k.clone(), v);
                bucket.remove(&k);
            }
        }
        split_bucket.save(split_guard.data_mut());
        bucket.save(bucket_guard.data_mut());
        drop(split_guard);
        drop(bucket_guard);

        // Point every alias of either half at the right page. Aliases of a
        // depth-d slot are the indexes agreeing on its low d bits.
        let stride = 1usize << directory.local_depth(bucket_idx);
        let mask = (stride - 1) as u32;
        let depth = directory.local_depth(bucket_idx) as u8;
        for idx in [split_idx, bucket_idx] {
            let target = directory.bucket_page_id(idx);
            let mut alias = (idx & mask) as usize;
            while alias < directory.size() as usize {
                directory.set_local_depth(alias as u32, depth);
                directory.set_bucket_page_id(alias as u32, target);
                alias += stride;
            }
        }

        // The directory may have grown; re-resolve the key's slot.
        let bucket_idx = directory.bucket_index(hash);
        let target_page_id = directory.bucket_page_id(bucket_idx);
        let mut target_guard = self.bpm.fetch_page_write(target_page_id)?;
        let mut target = HashBucketPage::<K, V>::load(target_guard.data());
        if target.is_full() {
            drop(target_guard);
            return self.split_insert(directory, bucket_idx, hash, key, value);
        }
        let inserted = target.insert(key.clone(), value.clone());
        if inserted {
            target.save(target_guard.data_mut());
        }
        Ok(inserted)
    }

    // ========================================================================
    // Removal
    // ========================================================================

    /// Remove the entry under `key`. Returns whether it existed.
    pub fn remove(&self, key: &K) -> Result<bool> {
        let hash = self.hasher.hash_key(key);

        let header_guard = self.bpm.fetch_page_read(self.header_page_id)?;
        let header = HashHeaderPage::load(header_guard.data());
        let directory_page_id = header.directory_page_id(header.directory_index(hash));
        if !directory_page_id.is_valid() {
            return Ok(false);
        }

        let mut directory_guard = self.bpm.fetch_page_write(directory_page_id)?;
        drop(header_guard);
        let mut directory = HashDirectoryPage::load(directory_guard.data());
        let bucket_idx = directory.bucket_index(hash);
        let bucket_page_id = directory.bucket_page_id(bucket_idx);
        if !bucket_page_id.is_valid() {
            return Ok(false);
        }

        let mut bucket_guard = self.bpm.fetch_page_write(bucket_page_id)?;
        let mut bucket = HashBucketPage::<K, V>::load(bucket_guard.data());
        let removed = bucket.remove(key);
        if !removed {
            return Ok(false);
        }
        bucket.save(bucket_guard.data_mut());
        let emptied = bucket.is_empty();
        drop(bucket_guard);

        if emptied {
            self.merge(&mut directory, bucket_idx, hash)?;
            directory.save(directory_guard.data_mut());
            #[cfg(debug_assertions)]
            directory.verify_integrity();
        }
        Ok(true)
    }

    /// Fold the empty bucket at `bucket_idx` into its split image, shrink
    /// the directory while possible, and keep merging while the re-resolved
    /// bucket or its image is empty.
    fn merge(&self, directory: &mut HashDirectoryPage, bucket_idx: u32, hash: u32) -> Result<()> {
        let local_depth = directory.local_depth(bucket_idx);
        if local_depth == 0 {
            return Ok(());
        }
        let split_idx = directory.split_image_index(bucket_idx);
        if directory.local_depth(split_idx) != local_depth {
            // The image is split finer; merging would mix keys.
            return Ok(());
        }
        let split_page_id = directory.bucket_page_id(split_idx);
        let bucket_page_id = directory.bucket_page_id(bucket_idx);
        log::debug!(
            "merging bucket slot {} ({}) into slot {} ({})",
            bucket_idx,
            bucket_page_id,
            split_idx,
            split_page_id
        );

        directory.set_bucket_page_id(bucket_idx, split_page_id);
        directory.decr_local_depth(bucket_idx);
        directory.decr_local_depth(split_idx);
        let merged_depth = directory.local_depth(bucket_idx) as u8;
        for i in 0..directory.size() {
            let pid = directory.bucket_page_id(i);
            if pid == split_page_id || pid == bucket_page_id {
                directory.set_bucket_page_id(i, split_page_id);
                directory.set_local_depth(i, merged_depth);
            }
        }

        // No slot points at the emptied page any more; recycle it. Freeing
        // is best effort and may be deferred if someone still pins it.
        if bucket_page_id != split_page_id {
            let _ = self.bpm.delete_page(bucket_page_id);
        }

        while directory.can_shrink() {
            directory.decr_global_depth();
        }

        // The table may have shrunk; re-resolve and keep merging while a
        // half is empty.
        let bucket_idx = directory.bucket_index(hash);
        if directory.local_depth(bucket_idx) == 0 {
            return Ok(());
        }
        let split_idx = directory.split_image_index(bucket_idx);

        let bucket_guard = self.bpm.fetch_page_read(directory.bucket_page_id(bucket_idx))?;
        let bucket_empty = HashBucketPage::<K, V>::load(bucket_guard.data()).is_empty();
        drop(bucket_guard);
        let split_guard = self.bpm.fetch_page_read(directory.bucket_page_id(split_idx))?;
        let split_empty = HashBucketPage::<K, V>::load(split_guard.data()).is_empty();
        drop(split_guard);

        if bucket_empty {
            self.merge(directory, bucket_idx, hash)
        } else if split_empty {
            self.merge(directory, split_idx, hash)
        } else {
            Ok(())
        }
    }

    // ========================================================================
    // Introspection (tests and tools)
    // ========================================================================

    /// The global depth of the directory serving `hash`, if it exists.
    pub fn directory_global_depth(&self, hash: u32) -> Result<Option<u32>> {
        let header_guard = self.bpm.fetch_page_read(self.header_page_id)?;
        let header = HashHeaderPage::load(header_guard.data());
        let directory_page_id = header.directory_page_id(header.directory_index(hash));
        if !directory_page_id.is_valid() {
            return Ok(None);
        }
        let directory_guard = self.bpm.fetch_page_read(directory_page_id)?;
        drop(header_guard);
        let directory = HashDirectoryPage::load(directory_guard.data());
        Ok(Some(directory.global_depth()))
    }

    /// Whether the directory serving `hash` could shrink further.
    pub fn directory_can_shrink(&self, hash: u32) -> Result<bool> {
        let header_guard = self.bpm.fetch_page_read(self.header_page_id)?;
        let header = HashHeaderPage::load(header_guard.data());
        let directory_page_id = header.directory_page_id(header.directory_index(hash));
        if !directory_page_id.is_valid() {
            return Ok(false);
        }
        let directory_guard = self.bpm.fetch_page_read(directory_page_id)?;
        drop(header_guard);
        let directory = HashDirectoryPage::load(directory_guard.data());
        Ok(directory.can_shrink())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::common::Rid;
    use crate::storage::DiskManager;
    use tempfile::tempdir;

    fn create_table(
        header_depth: u32,
        directory_depth: u32,
        bucket_size: u32,
    ) -> (
        DiskExtendibleHashTable<i64, Rid, IdentityHasher>,
        tempfile::TempDir,
    ) {
        let dir = tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let bpm = Arc::new(BufferPoolManager::new(64, 2, dm));
        let table = DiskExtendibleHashTable::new(
            bpm,
            IdentityHasher,
            header_depth,
            directory_depth,
            bucket_size,
        )
        .unwrap();
        (table, dir)
    }

    fn rid(v: i64) -> Rid {
        Rid::new(0, v as u32)
    }

    #[test]
    fn test_empty_table_misses() {
        let (table, _dir) = create_table(0, 3, 2);
        assert_eq!(table.get(&1).unwrap(), None);
        assert!(!table.remove(&1).unwrap());
    }

    #[test]
    fn test_insert_get_round_trip() {
        let (table, _dir) = create_table(0, 3, 2);

        assert!(table.insert(&5, &rid(5)).unwrap());
        assert_eq!(table.get(&5).unwrap(), Some(rid(5)));

        // Duplicate keys are rejected.
        assert!(!table.insert(&5, &rid(99)).unwrap());
        assert_eq!(table.get(&5).unwrap(), Some(rid(5)));
    }

    #[test]
    fn test_insert_remove_round_trip() {
        let (table, _dir) = create_table(0, 3, 2);

        assert!(table.insert(&5, &rid(5)).unwrap());
        assert!(table.remove(&5).unwrap());
        assert_eq!(table.get(&5).unwrap(), None);
        assert!(!table.remove(&5).unwrap());
    }

    #[test]
    fn test_splits_grow_directory() {
        let (table, _dir) = create_table(0, 3, 2);

        // Identity hashing: keys 0..=8 spread over the low three bits,
        // with 0 and 8 sharing bucket 0.
        for i in 0..9i64 {
            assert!(table.insert(&i, &rid(i)).unwrap(), "insert {}", i);
        }
        for i in 0..9i64 {
            assert_eq!(table.get(&i).unwrap(), Some(rid(i)), "get {}", i);
        }
        assert!(table.directory_global_depth(0).unwrap().unwrap() <= 3);
    }

    #[test]
    fn test_split_failure_at_max_depth() {
        let (table, _dir) = create_table(0, 2, 2);

        // All keys share the low two bits: one bucket, never splittable
        // into a useful image. Two fit, the third must fail.
        assert!(table.insert(&0, &rid(0)).unwrap());
        assert!(table.insert(&4, &rid(4)).unwrap());
        assert!(!table.insert(&8, &rid(8)).unwrap());

        // The table still answers for what it holds.
        assert_eq!(table.get(&0).unwrap(), Some(rid(0)));
        assert_eq!(table.get(&4).unwrap(), Some(rid(4)));
        assert_eq!(table.get(&8).unwrap(), None);
    }

    #[test]
    fn test_remove_all_shrinks_directory_to_zero() {
        let (table, _dir) = create_table(0, 3, 2);

        let keys: Vec<i64> = (0..16).collect();
        for &k in &keys {
            table.insert(&k, &rid(k)).unwrap();
        }
        assert!(table.directory_global_depth(0).unwrap().unwrap() > 0);

        for &k in &keys {
            assert!(table.remove(&k).unwrap(), "remove {}", k);
        }
        for &k in &keys {
            assert_eq!(table.get(&k).unwrap(), None);
        }
        assert_eq!(table.directory_global_depth(0).unwrap(), Some(0));
        assert!(!table.directory_can_shrink(0).unwrap());
    }

    #[test]
    fn test_interleaved_insert_remove() {
        let (table, _dir) = create_table(0, 9, 4);

        for i in 0..64i64 {
            assert!(table.insert(&i, &rid(i)).unwrap());
        }
        for i in (0..64i64).step_by(2) {
            assert!(table.remove(&i).unwrap());
        }
        for i in 0..64i64 {
            let expected = if i % 2 == 0 { None } else { Some(rid(i)) };
            assert_eq!(table.get(&i).unwrap(), expected, "get {}", i);
        }
        // Reinsert the removed keys with fresh values.
        for i in (0..64i64).step_by(2) {
            assert!(table.insert(&i, &rid(i + 1000)).unwrap());
        }
        for i in (0..64i64).step_by(2) {
            assert_eq!(table.get(&i).unwrap(), Some(rid(i + 1000)));
        }
    }

    #[test]
    fn test_default_hasher_spread() {
        let dir = tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        let bpm = Arc::new(BufferPoolManager::new(64, 2, dm));
        let table: DiskExtendibleHashTable<i64, Rid, DefaultKeyHasher> =
            DiskExtendibleHashTable::new(bpm, DefaultKeyHasher, 0, 9, 8).unwrap();

        for i in 0..200i64 {
            assert!(table.insert(&i, &rid(i)).unwrap(), "insert {}", i);
        }
        for i in 0..200i64 {
            assert_eq!(table.get(&i).unwrap(), Some(rid(i)));
        }
    }

    #[test]
    fn test_header_routing_with_multiple_directories() {
        let (table, _dir) = create_table(2, 3, 2);

        // Keys differing in their top two bits land in different
        // directories.
        let low = 1i64;
        let high = (1i64 << 31) | 1;
        assert!(table.insert(&low, &rid(1)).unwrap());
        assert!(table.insert(&high, &rid(2)).unwrap());
        assert_eq!(table.get(&low).unwrap(), Some(rid(1)));
        assert_eq!(table.get(&high).unwrap(), Some(rid(2)));
    }
}
