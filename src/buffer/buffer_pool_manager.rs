//! Buffer Pool Manager - the core page caching layer.
//!
//! The [`BufferPoolManager`] provides:
//! - Page caching between disk and memory
//! - Pin-based reference counting
//! - Automatic dirty page write-back
//! - LRU-K eviction

use std::collections::HashMap;
use std::sync::atomic::Ordering;

use parking_lot::Mutex;

use crate::buffer::{LruKReplacer, PageGuard, PageReadGuard, PageWriteGuard, PoolStats};
use crate::buffer::frame::Frame;
use crate::common::{Error, FrameId, PageId, Result};
use crate::storage::{DiskManager, DiskScheduler};

/// State serialized by the pool's coarse latch.
struct PoolState {
    /// Maps page IDs to frame IDs, unique on both sides.
    page_table: HashMap<PageId, FrameId>,
    /// Frames not bound to any page.
    free_list: Vec<FrameId>,
    /// Next page id to hand out, monotonic from zero.
    next_page_id: u32,
}

/// Manages a fixed pool of frames caching disk pages.
///
/// # Architecture
/// ```text
/// ┌────────────────────────────────────────────────────────────┐
/// │                    BufferPoolManager                       │
/// │  ┌───────────────────────────────┐  ┌───────────────────┐  │
/// │  │ state (coarse latch)          │  │ frames: Vec<Frame>│  │
/// │  │  page_table: PageId → FrameId │─▶│ [F0] [F1] [F2] …  │  │
/// │  │  free_list, next_page_id      │  └───────────────────┘  │
/// │  └───────────────────────────────┘                         │
/// │  ┌──────────────┐  ┌─────────────────┐  ┌──────────────┐   │
/// │  │ LruKReplacer │  │  DiskScheduler  │  │  PoolStats   │   │
/// │  └──────────────┘  └─────────────────┘  └──────────────┘   │
/// └────────────────────────────────────────────────────────────┘
/// ```
///
/// # Concurrency
/// Every public operation takes the single coarse `state` latch for its
/// duration, and disk I/O is awaited while that latch is held. This trades
/// throughput for clarity and makes the operation contracts easy to reason
/// about; the per-page reader-writer latches inside each [`Frame`] are
/// independent of the pool latch and are what the page guards hold.
///
/// # Usage
/// ```ignore
/// let dm = DiskManager::create("test.db")?;
/// let bpm = BufferPoolManager::new(10, 2, dm);
///
/// let guard = bpm.new_page()?;            // pinned, zeroed
/// let pid = guard.page_id();
/// let mut w = guard.upgrade_write();      // exclusive page latch
/// w.data_mut()[0] = 0xAB;                 // marks dirty
/// drop(w);                                // unlatch + unpin
///
/// let r = bpm.fetch_page_read(pid)?;
/// assert_eq!(r.data()[0], 0xAB);
/// ```
pub struct BufferPoolManager {
    /// Fixed pool of frames allocated at startup.
    frames: Vec<Frame>,

    /// Coarse latch over the page table, free list, and id allocator.
    state: Mutex<PoolState>,

    /// Eviction policy; keeps its own internal latch.
    replacer: LruKReplacer,

    /// All I/O funnels through the scheduler's request queue.
    disk_scheduler: DiskScheduler,

    /// Performance counters.
    stats: PoolStats,

    /// Number of frames in the pool (immutable after construction).
    pool_size: usize,
}

impl BufferPoolManager {
    /// Create a new buffer pool manager.
    ///
    /// # Arguments
    /// * `pool_size` - number of frames in the pool
    /// * `replacer_k` - history length for the LRU-K replacer
    /// * `disk_manager` - handles disk I/O, wrapped in a scheduler
    ///
    /// # Panics
    /// Panics if `pool_size` is 0.
    pub fn new(pool_size: usize, replacer_k: usize, disk_manager: DiskManager) -> Self {
        assert!(pool_size > 0, "pool_size must be > 0");

        let frames: Vec<Frame> = (0..pool_size).map(|_| Frame::new()).collect();
        // All frames start free. LIFO order for cache locality.
        let free_list: Vec<FrameId> = (0..pool_size).map(FrameId::new).collect();

        Self {
            frames,
            state: Mutex::new(PoolState {
                page_table: HashMap::new(),
                free_list,
                next_page_id: 0,
            }),
            replacer: LruKReplacer::new(pool_size, replacer_k),
            disk_scheduler: DiskScheduler::new(disk_manager),
            stats: PoolStats::new(),
            pool_size,
        }
    }

    // ========================================================================
    // Public API: create and fetch pages
    // ========================================================================

    /// Allocate a fresh page and pin it in a frame.
    ///
    /// The new page gets the next monotonic page id, zeroed contents, and a
    /// pin count of one, held by the returned guard.
    ///
    /// # Errors
    /// `Error::NoFreeFrames` if every frame is pinned.
    pub fn new_page(&self) -> Result<PageGuard<'_>> {
        let mut state = self.state.lock();

        let frame_id = self.acquire_frame(&mut state)?;
        let page_id = PageId::new(state.next_page_id);
        state.next_page_id += 1;

        let frame = &self.frames[frame_id.0];
        frame.page_mut().reset();
        frame.set_page_id(Some(page_id));
        frame.pin();

        state.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);
        self.replacer.set_evictable(frame_id, false);

        Ok(PageGuard::new(self, frame_id, page_id))
    }

    /// Fetch a page, pinning it (no latch).
    ///
    /// A resident page costs a pin bump and a recency update; otherwise a
    /// frame is obtained as in [`new_page`](Self::new_page) and the page is
    /// read from disk before the guard is returned.
    pub fn fetch_page(&self, page_id: PageId) -> Result<PageGuard<'_>> {
        let frame_id = self.fetch_page_internal(page_id)?;
        Ok(PageGuard::new(self, frame_id, page_id))
    }

    /// Fetch a page for reading (pin + shared latch).
    pub fn fetch_page_read(&self, page_id: PageId) -> Result<PageReadGuard<'_>> {
        Ok(self.fetch_page(page_id)?.upgrade_read())
    }

    /// Fetch a page for writing (pin + exclusive latch).
    pub fn fetch_page_write(&self, page_id: PageId) -> Result<PageWriteGuard<'_>> {
        Ok(self.fetch_page(page_id)?.upgrade_write())
    }

    // ========================================================================
    // Public API: unpin, flush, delete
    // ========================================================================

    /// Decrement a page's pin count, OR-ing `is_dirty` into its dirty flag.
    ///
    /// Once a frame is dirty it stays dirty until flushed, regardless of
    /// later unpins with `is_dirty = false`. When the pin count reaches
    /// zero the frame becomes evictable.
    ///
    /// Returns `false` if the page is not resident or was already unpinned.
    pub fn unpin_page(&self, page_id: PageId, is_dirty: bool) -> bool {
        let state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return false;
        };
        let frame = &self.frames[frame_id.0];
        if !frame.is_pinned() {
            return false;
        }
        if is_dirty {
            frame.mark_dirty();
        }
        if frame.unpin() == 0 {
            self.replacer.set_evictable(frame_id, true);
        }
        true
    }

    /// Write a page to disk regardless of its dirty flag, then clear it.
    ///
    /// Returns `Ok(false)` if the page is not resident.
    pub fn flush_page(&self, page_id: PageId) -> Result<bool> {
        let state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(false);
        };
        self.write_back(frame_id, page_id)?;
        Ok(true)
    }

    /// Flush every bound frame.
    pub fn flush_all_pages(&self) -> Result<()> {
        let state = self.state.lock();
        let pages: Vec<(PageId, FrameId)> = state
            .page_table
            .iter()
            .map(|(&pid, &fid)| (pid, fid))
            .collect();
        for (page_id, frame_id) in pages {
            self.write_back(frame_id, page_id)?;
        }
        Ok(())
    }

    /// Drop a page from the pool and recycle its frame.
    ///
    /// A non-resident page is a successful no-op. Returns `Ok(false)` if
    /// the page is pinned; nothing is changed in that case.
    pub fn delete_page(&self, page_id: PageId) -> Result<bool> {
        let mut state = self.state.lock();
        let Some(&frame_id) = state.page_table.get(&page_id) else {
            return Ok(true);
        };
        let frame = &self.frames[frame_id.0];
        if frame.is_pinned() {
            return Ok(false);
        }

        state.page_table.remove(&page_id);
        self.replacer.remove(frame_id);
        frame.page_mut().reset();
        frame.set_page_id(None);
        frame.clear_dirty();
        state.free_list.push(frame_id);
        Ok(true)
    }

    // ========================================================================
    // Public API: introspection
    // ========================================================================

    pub fn stats(&self) -> &PoolStats {
        &self.stats
    }

    pub fn pool_size(&self) -> usize {
        self.pool_size
    }

    pub fn free_frame_count(&self) -> usize {
        self.state.lock().free_list.len()
    }

    /// Number of pages currently bound to frames.
    pub fn resident_page_count(&self) -> usize {
        self.state.lock().page_table.len()
    }

    // ========================================================================
    // Internal: guard support
    // ========================================================================

    #[inline]
    pub(crate) fn frame(&self, frame_id: FrameId) -> &Frame {
        &self.frames[frame_id.0]
    }

    /// Unpin a frame. Called by guards on drop; never takes the pool latch,
    /// so dropping a guard cannot deadlock against a pool operation.
    pub(crate) fn unpin_frame(&self, frame_id: FrameId, is_dirty: bool) {
        let frame = &self.frames[frame_id.0];
        if is_dirty {
            frame.mark_dirty();
        }
        if frame.unpin() == 0 {
            self.replacer.set_evictable(frame_id, true);
        }
    }

    // ========================================================================
    // Internal: fetch and eviction
    // ========================================================================

    fn fetch_page_internal(&self, page_id: PageId) -> Result<FrameId> {
        let mut state = self.state.lock();

        if let Some(&frame_id) = state.page_table.get(&page_id) {
            let frame = &self.frames[frame_id.0];
            frame.pin();
            self.replacer.record_access(frame_id);
            self.replacer.set_evictable(frame_id, false);
            self.stats.hits.fetch_add(1, Ordering::Relaxed);
            return Ok(frame_id);
        }

        self.stats.misses.fetch_add(1, Ordering::Relaxed);
        let frame_id = self.acquire_frame(&mut state)?;
        let frame = &self.frames[frame_id.0];

        // Blocking read while the pool latch is held. Deliberate: the
        // request queue is the only ordering between I/Os, and holding the
        // latch keeps the page table consistent with frame contents.
        {
            let mut page = frame.page_mut();
            if let Err(e) = self
                .disk_scheduler
                .read_blocking(page_id, page.as_mut_slice())
            {
                state.free_list.push(frame_id);
                return Err(e);
            }
        }

        frame.set_page_id(Some(page_id));
        frame.pin();
        state.page_table.insert(page_id, frame_id);
        self.replacer.record_access(frame_id);
        self.replacer.set_evictable(frame_id, false);

        Ok(frame_id)
    }

    /// Get a usable frame: free list first, then eviction.
    ///
    /// An evicted frame's dirty contents are written back before reuse.
    fn acquire_frame(&self, state: &mut PoolState) -> Result<FrameId> {
        if let Some(frame_id) = state.free_list.pop() {
            return Ok(frame_id);
        }

        let frame_id = self.replacer.evict().ok_or(Error::NoFreeFrames)?;
        self.stats.evictions.fetch_add(1, Ordering::Relaxed);

        let frame = &self.frames[frame_id.0];
        let old_page_id = frame.page_id().expect("evicted frame must be bound");
        if frame.is_dirty() {
            if let Err(e) = self.write_back(frame_id, old_page_id) {
                // Put the victim back under replacer control so the frame
                // is not stranded.
                self.replacer.record_access(frame_id);
                self.replacer.set_evictable(frame_id, true);
                return Err(e);
            }
        }
        state.page_table.remove(&old_page_id);
        frame.set_page_id(None);
        Ok(frame_id)
    }

    /// Write a frame's page through the scheduler and clear its dirty flag.
    fn write_back(&self, frame_id: FrameId, page_id: PageId) -> Result<()> {
        let frame = &self.frames[frame_id.0];
        {
            let page = frame.page();
            self.disk_scheduler.write_blocking(page_id, page.as_slice())?;
        }
        frame.clear_dirty();
        self.stats.writebacks.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }
}
