//! Concurrent wrapper around the copy-on-write trie.

use std::marker::PhantomData;
use std::ops::Deref;

use parking_lot::Mutex;

use super::{Trie, TrieValue};

/// Single-writer / multi-reader trie store.
///
/// Two locks with distinct jobs:
/// - `root`: held only to read or swap the root pointer, never across a
///   trie operation, so readers stay wait-free against each other.
/// - `write_lock`: held for a writer's whole read-modify-publish cycle,
///   serializing writers.
///
/// Readers snapshot the root, then walk it outside any lock; a concurrent
/// write publishes a fresh version and never disturbs the snapshot.
#[derive(Default)]
pub struct TrieStore {
    root: Mutex<Trie>,
    write_lock: Mutex<()>,
}

impl TrieStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up `key`, requiring the stored value to be a `T`.
    ///
    /// The returned guard keeps the snapshotted version alive, so the
    /// borrowed value stays valid however many writes land afterward.
    pub fn get<T: Send + Sync + 'static>(&self, key: &str) -> Option<ValueGuard<T>> {
        let snapshot = self.root.lock().clone();
        let value = snapshot.value_slot(key)?.clone();
        if !value.as_ref().is::<T>() {
            return None;
        }
        Some(ValueGuard {
            _version: snapshot,
            value,
            _marker: PhantomData,
        })
    }

    /// Store `value` under `key`.
    pub fn put<T: Send + Sync + 'static>(&self, key: &str, value: T) {
        let _writer = self.write_lock.lock();
        let snapshot = self.root.lock().clone();
        let next = snapshot.put(key, value);
        *self.root.lock() = next;
    }

    /// Remove the value under `key`.
    pub fn remove(&self, key: &str) {
        let _writer = self.write_lock.lock();
        let snapshot = self.root.lock().clone();
        let next = snapshot.remove(key);
        *self.root.lock() = next;
    }
}

/// Read guard produced by [`TrieStore::get`].
///
/// Holds the trie version it was read from; dereferences to the value.
pub struct ValueGuard<T> {
    _version: Trie,
    value: TrieValue,
    _marker: PhantomData<T>,
}

impl<T: Send + Sync + 'static> Deref for ValueGuard<T> {
    type Target = T;

    fn deref(&self) -> &T {
        // Type checked when the guard was constructed.
        self.value.as_ref().downcast_ref::<T>().unwrap()
    }
}
