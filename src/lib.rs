//! quilldb - an educational disk-backed relational engine.
//!
//! # Architecture
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                           quilldb                              │
//! ├────────────────────────────────────────────────────────────────┤
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │        Execution (execution/ + optimizer/)               │  │
//! │  │   PlanNode → rewrites → pull-based executor tree         │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                              ↓                                 │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │     Catalog + TableHeap + HashIndex (catalog/, index/)   │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                              ↓                                 │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │   Disk extendible hash table (container/)                │  │
//! │  │   header page → directory pages → bucket pages           │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                              ↓                                 │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │   Buffer pool (buffer/)                                  │  │
//! │  │   BufferPoolManager + LRU-K replacer + page guards       │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                              ↓                                 │
//! │  ┌──────────────────────────────────────────────────────────┐  │
//! │  │   Storage (storage/)                                     │  │
//! │  │   DiskScheduler → DiskManager → single page file         │  │
//! │  └──────────────────────────────────────────────────────────┘  │
//! │                                                                │
//! │  trie/ - copy-on-write trie + concurrent store (standalone)    │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Modules
//! - [`common`] - shared primitives (PageId, FrameId, Rid, Error, config)
//! - [`storage`] - disk I/O, on-page layouts, table heap
//! - [`buffer`] - buffer pool, eviction policy, page guards
//! - [`container`] - disk extendible hash table
//! - [`types`] / [`catalog`] / [`index`] - values, tuples, tables, indexes
//! - [`execution`] - plans, expressions, iterator-model executors
//! - [`optimizer`] - rule-based plan rewrites
//! - [`trie`] - copy-on-write trie and its concurrent store

pub mod buffer;
pub mod catalog;
pub mod common;
pub mod container;
pub mod execution;
pub mod index;
pub mod optimizer;
pub mod storage;
pub mod trie;
pub mod types;

// Re-export commonly used items at the crate root for convenience.
pub use common::config::PAGE_SIZE;
pub use common::{Error, FrameId, PageId, Result, Rid};

pub use buffer::{BufferPoolManager, LruKReplacer, PageGuard, PageReadGuard, PageWriteGuard};
pub use container::DiskExtendibleHashTable;
pub use storage::{DiskManager, DiskScheduler};
pub use trie::{Trie, TrieStore};
