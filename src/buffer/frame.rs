//! Frame - a slot in the buffer pool.
//!
//! A [`Frame`] holds a [`Page`] plus metadata needed for buffer management:
//! - Which page is loaded (if any)
//! - Pin count for reference counting
//! - Dirty flag for write-back tracking

use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use parking_lot::{Mutex, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::common::PageId;
use crate::storage::page::Page;

/// A frame in the buffer pool.
///
/// Frames are the "slots" in the buffer pool. Each frame can hold one page.
/// The pool has a fixed number of frames allocated at startup; a frame is
/// either free (on the pool's free list) or bound to a page through the
/// page table.
///
/// # Thread Safety
/// All fields use interior mutability for safe concurrent access:
/// - `page`: `RwLock` - the page-level latch, independent of the pool latch
/// - `page_id`: `Mutex` - safe updates
/// - `pin_count`: `AtomicU32` - lock-free reference counting
/// - `is_dirty`: `AtomicBool` - lock-free dirty tracking
pub struct Frame {
    /// The page data, protected by the page-level reader-writer latch.
    page: RwLock<Page>,

    /// Which page is currently loaded, or None if the frame is free.
    page_id: Mutex<Option<PageId>>,

    /// Number of live references preventing eviction.
    pin_count: AtomicU32,

    /// Whether the page has been modified since it was loaded.
    is_dirty: AtomicBool,
}

impl Frame {
    /// Create a new free frame.
    pub fn new() -> Self {
        Self {
            page: RwLock::new(Page::new()),
            page_id: Mutex::new(None),
            pin_count: AtomicU32::new(0),
            is_dirty: AtomicBool::new(false),
        }
    }

    /// Acquire the shared (read) latch on the page.
    #[inline]
    pub fn page(&self) -> RwLockReadGuard<'_, Page> {
        self.page.read()
    }

    /// Acquire the exclusive (write) latch on the page.
    #[inline]
    pub fn page_mut(&self) -> RwLockWriteGuard<'_, Page> {
        self.page.write()
    }

    /// Get the page ID of the loaded page.
    #[inline]
    pub fn page_id(&self) -> Option<PageId> {
        *self.page_id.lock()
    }

    /// Set the page ID.
    #[inline]
    pub fn set_page_id(&self, page_id: Option<PageId>) {
        *self.page_id.lock() = page_id;
    }

    /// Increment the pin count. Returns the new pin count.
    #[inline]
    pub fn pin(&self) -> u32 {
        self.pin_count.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Decrement the pin count. Returns the new pin count.
    ///
    /// # Panics
    /// Panics if the pin count is already 0.
    #[inline]
    pub fn unpin(&self) -> u32 {
        let old = self.pin_count.fetch_sub(1, Ordering::Relaxed);
        assert!(old > 0, "pin count underflow");
        old - 1
    }

    /// Get the current pin count.
    #[inline]
    pub fn pin_count(&self) -> u32 {
        self.pin_count.load(Ordering::Relaxed)
    }

    /// Check if the frame is currently pinned.
    #[inline]
    pub fn is_pinned(&self) -> bool {
        self.pin_count() > 0
    }

    /// Mark the frame as dirty (modified).
    #[inline]
    pub fn mark_dirty(&self) {
        self.is_dirty.store(true, Ordering::Relaxed);
    }

    /// Clear the dirty flag.
    #[inline]
    pub fn clear_dirty(&self) {
        self.is_dirty.store(false, Ordering::Relaxed);
    }

    /// Check if the frame is dirty.
    #[inline]
    pub fn is_dirty(&self) -> bool {
        self.is_dirty.load(Ordering::Relaxed)
    }

    /// Check if the frame is free (no page loaded).
    #[inline]
    pub fn is_free(&self) -> bool {
        self.page_id().is_none()
    }
}

impl Default for Frame {
    fn default() -> Self {
        Self::new()
    }
}
