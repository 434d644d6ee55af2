//! Disk Manager - low-level file I/O for database pages.
//!
//! The [`DiskManager`] handles all direct file operations:
//! - Reading and writing pages
//! - Managing the database file

use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;

use crate::common::config::PAGE_SIZE;
use crate::common::{PageId, Result};

/// Manages disk I/O for a single database file.
///
/// # File Layout
/// The database is stored as a single file with pages laid out sequentially:
/// ```text
/// ┌─────────┬─────────┬─────────┬─────────┬─────────┐
/// │ Page 0  │ Page 1  │ Page 2  │  ...    │ Page N  │
/// │ (4KB)   │ (4KB)   │ (4KB)   │         │ (4KB)   │
/// └─────────┴─────────┴─────────┴─────────┴─────────┘
/// ```
///
/// Page N is located at file offset `N × PAGE_SIZE`.
///
/// Page ids are allocated by the buffer pool, not here, so a page may be
/// read before it was ever written: such a read yields a zeroed page.
/// Writes extend the file as needed.
///
/// # Thread Safety
/// `DiskManager` is **single-threaded**. The [`DiskScheduler`] wraps it in a
/// worker thread and is the only caller in normal operation.
///
/// [`DiskScheduler`]: crate::storage::DiskScheduler
pub struct DiskManager {
    file: File,
}

impl DiskManager {
    /// Create a new database file.
    ///
    /// # Errors
    /// Returns an error if the file already exists or cannot be created.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create_new(true)
            .open(path)?;

        Ok(Self { file })
    }

    /// Open an existing database file.
    ///
    /// # Errors
    /// Returns an error if the file doesn't exist or cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = OpenOptions::new().read(true).write(true).open(&path)?;
        Ok(Self { file })
    }

    /// Open an existing database file, or create if it doesn't exist.
    pub fn open_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        if path.as_ref().exists() {
            Self::open(path)
        } else {
            Self::create(path)
        }
    }

    /// Read a page from disk into `buf`.
    ///
    /// A page that lies beyond the end of the file (allocated but never
    /// flushed) reads back as zeroes.
    pub fn read_page(&mut self, page_id: PageId, buf: &mut [u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        let file_len = self.file.metadata()?.len();
        if offset >= file_len {
            buf.fill(0);
            return Ok(());
        }

        self.file.seek(SeekFrom::Start(offset))?;
        self.file.read_exact(buf)?;
        Ok(())
    }

    /// Write a page to disk, extending the file if needed.
    ///
    /// # Durability
    /// This method calls `fsync()` after writing so that a flushed page is
    /// actually on disk when the call returns.
    pub fn write_page(&mut self, page_id: PageId, buf: &[u8]) -> Result<()> {
        debug_assert_eq!(buf.len(), PAGE_SIZE);

        let offset = (page_id.0 as u64) * (PAGE_SIZE as u64);
        self.file.seek(SeekFrom::Start(offset))?;
        self.file.write_all(buf)?;
        self.file.sync_all()?;
        Ok(())
    }

    /// Get the number of whole pages currently materialized in the file.
    pub fn page_count(&self) -> Result<u32> {
        let file_size = self.file.metadata()?.len();
        Ok((file_size / PAGE_SIZE as u64) as u32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::page::Page;
    use tempfile::tempdir;

    #[test]
    fn test_create_existing_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        DiskManager::create(&path).unwrap();
        assert!(DiskManager::create(&path).is_err());
    }

    #[test]
    fn test_open_nonexistent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nonexistent.db");

        assert!(DiskManager::open(&path).is_err());
    }

    #[test]
    fn test_write_and_read_page() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut dm = DiskManager::create(&path).unwrap();

        let mut page = Page::new();
        page.as_mut_slice()[0] = 0xAB;
        page.as_mut_slice()[4095] = 0xEF;
        dm.write_page(PageId::new(3), page.as_slice()).unwrap();

        let mut back = Page::new();
        dm.read_page(PageId::new(3), back.as_mut_slice()).unwrap();
        assert_eq!(back.as_slice()[0], 0xAB);
        assert_eq!(back.as_slice()[4095], 0xEF);

        // Writing page 3 materialized pages 0..=3.
        assert_eq!(dm.page_count().unwrap(), 4);
    }

    #[test]
    fn test_read_unwritten_page_is_zeroed() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        let mut dm = DiskManager::create(&path).unwrap();

        let mut buf = Page::new();
        buf.as_mut_slice().fill(0x55);
        dm.read_page(PageId::new(9), buf.as_mut_slice()).unwrap();
        assert!(buf.as_slice().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_persistence() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("test.db");

        {
            let mut dm = DiskManager::create(&path).unwrap();
            let mut page = Page::new();
            page.as_mut_slice()[0] = 0x42;
            dm.write_page(PageId::new(0), page.as_slice()).unwrap();
        }

        {
            let mut dm = DiskManager::open(&path).unwrap();
            let mut page = Page::new();
            dm.read_page(PageId::new(0), page.as_mut_slice()).unwrap();
            assert_eq!(page.as_slice()[0], 0x42);
        }
    }
}
