//! RAII guards for page access.
//!
//! Three guards with increasing strength:
//! - [`PageGuard`] - holds a pin, no latch
//! - [`PageReadGuard`] - pin + shared page latch
//! - [`PageWriteGuard`] - pin + exclusive page latch, tracks dirtiness
//!
//! All three release everything they hold exactly once when dropped. A
//! basic guard deliberately exposes no page data: a pin keeps the page
//! resident but grants no exclusion, so data access lives on the latched
//! guards, reached via [`PageGuard::upgrade_read`] /
//! [`PageGuard::upgrade_write`].

use std::mem::ManuallyDrop;
use std::ops::{Deref, DerefMut};

use parking_lot::{RwLockReadGuard, RwLockWriteGuard};

use crate::common::{FrameId, PageId};
use crate::storage::page::Page;

use super::buffer_pool_manager::BufferPoolManager;

/// Guard holding only a pin on a page.
///
/// Keeps the page resident while alive; upgrade to a latched guard to read
/// or modify the page's bytes. Moving the guard transfers the pin; the
/// moved-from value no longer releases anything (ordinary Rust move
/// semantics).
pub struct PageGuard<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
    page_id: PageId,
}

impl<'a> PageGuard<'a> {
    pub(crate) fn new(bpm: &'a BufferPoolManager, frame_id: FrameId, page_id: PageId) -> Self {
        Self {
            bpm,
            frame_id,
            page_id,
        }
    }

    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// Take the page's shared latch, consuming this guard.
    ///
    /// The pin carries over to the returned guard and is released once,
    /// when that guard drops.
    pub fn upgrade_read(self) -> PageReadGuard<'a> {
        let this = ManuallyDrop::new(self);
        let lock = this.bpm.frame(this.frame_id).page();
        PageReadGuard {
            bpm: this.bpm,
            frame_id: this.frame_id,
            page_id: this.page_id,
            lock,
        }
    }

    /// Take the page's exclusive latch, consuming this guard.
    pub fn upgrade_write(self) -> PageWriteGuard<'a> {
        let this = ManuallyDrop::new(self);
        let lock = this.bpm.frame(this.frame_id).page_mut();
        PageWriteGuard {
            bpm: this.bpm,
            frame_id: this.frame_id,
            page_id: this.page_id,
            lock,
            is_dirty: false,
        }
    }
}

impl Drop for PageGuard<'_> {
    fn drop(&mut self) {
        self.bpm.unpin_frame(self.frame_id, false);
    }
}

/// Guard for shared (read-only) page access.
///
/// Multiple read guards can exist for the same page simultaneously. The
/// latch and pin are released when the guard drops.
pub struct PageReadGuard<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
    page_id: PageId,
    lock: RwLockReadGuard<'a, Page>,
}

impl PageReadGuard<'_> {
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// The page's bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.lock.as_slice()
    }
}

impl Deref for PageReadGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl Drop for PageReadGuard<'_> {
    fn drop(&mut self) {
        // The latch (lock field) is released right after this body runs;
        // unpinning first is safe because unpin never takes the pool latch.
        self.bpm.unpin_frame(self.frame_id, false);
    }
}

/// Guard for exclusive page access.
///
/// Only one write guard can exist for a page at a time. Mutable access
/// through [`data_mut`](Self::data_mut) (or `DerefMut`) marks the guard
/// dirty; the flag is propagated to the frame when the guard drops.
pub struct PageWriteGuard<'a> {
    bpm: &'a BufferPoolManager,
    frame_id: FrameId,
    page_id: PageId,
    lock: RwLockWriteGuard<'a, Page>,
    is_dirty: bool,
}

impl PageWriteGuard<'_> {
    #[inline]
    pub fn page_id(&self) -> PageId {
        self.page_id
    }

    #[inline]
    pub fn frame_id(&self) -> FrameId {
        self.frame_id
    }

    /// The page's bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.lock.as_slice()
    }

    /// The page's bytes, mutably. Marks the guard dirty.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [u8] {
        self.is_dirty = true;
        self.lock.as_mut_slice()
    }
}

impl Deref for PageWriteGuard<'_> {
    type Target = Page;

    #[inline]
    fn deref(&self) -> &Page {
        &self.lock
    }
}

impl DerefMut for PageWriteGuard<'_> {
    #[inline]
    fn deref_mut(&mut self) -> &mut Page {
        self.is_dirty = true;
        &mut self.lock
    }
}

impl Drop for PageWriteGuard<'_> {
    fn drop(&mut self) {
        self.bpm.unpin_frame(self.frame_id, self.is_dirty);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::DiskManager;
    use tempfile::tempdir;

    fn create_bpm(pool_size: usize) -> (BufferPoolManager, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let dm = DiskManager::create(dir.path().join("test.db")).unwrap();
        (BufferPoolManager::new(pool_size, 2, dm), dir)
    }

    #[test]
    fn test_guard_drop_unpins() {
        let (bpm, _dir) = create_bpm(4);

        let guard = bpm.new_page().unwrap();
        let fid = guard.frame_id();
        assert_eq!(bpm.frame(fid).pin_count(), 1);
        drop(guard);
        assert_eq!(bpm.frame(fid).pin_count(), 0);
    }

    #[test]
    fn test_upgrade_keeps_single_pin() {
        let (bpm, _dir) = create_bpm(4);

        let guard = bpm.new_page().unwrap();
        let fid = guard.frame_id();
        let read = guard.upgrade_read();
        assert_eq!(bpm.frame(fid).pin_count(), 1);
        drop(read);
        assert_eq!(bpm.frame(fid).pin_count(), 0);
    }

    #[test]
    fn test_write_guard_marks_dirty_only_on_mutation() {
        let (bpm, _dir) = create_bpm(4);

        let pid = bpm.new_page().unwrap().page_id();

        let guard = bpm.fetch_page_write(pid).unwrap();
        let fid = guard.frame_id();
        drop(guard);
        assert!(!bpm.frame(fid).is_dirty());

        let mut guard = bpm.fetch_page_write(pid).unwrap();
        guard.data_mut()[0] = 1;
        drop(guard);
        assert!(bpm.frame(fid).is_dirty());
    }

    #[test]
    fn test_two_read_guards_coexist() {
        let (bpm, _dir) = create_bpm(4);

        let pid = bpm.new_page().unwrap().page_id();
        let g1 = bpm.fetch_page_read(pid).unwrap();
        let g2 = bpm.fetch_page_read(pid).unwrap();
        assert_eq!(g1.page_id(), g2.page_id());
        assert_eq!(bpm.frame(g1.frame_id()).pin_count(), 2);
    }

    #[test]
    fn test_moved_guard_releases_once() {
        let (bpm, _dir) = create_bpm(4);

        let guard = bpm.new_page().unwrap();
        let fid = guard.frame_id();
        let moved = guard;
        assert_eq!(bpm.frame(fid).pin_count(), 1);
        drop(moved);
        assert_eq!(bpm.frame(fid).pin_count(), 0);
    }
}
