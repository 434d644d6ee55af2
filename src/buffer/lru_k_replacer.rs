//! LRU-K eviction policy.
//!
//! Tracks the last `k` access timestamps of every frame and evicts the
//! frame whose k-th most recent access lies furthest in the past. Frames
//! with fewer than `k` recorded accesses have infinite backward k-distance
//! and are always preferred as victims, earliest first access first.

use std::collections::{HashMap, VecDeque};

use parking_lot::Mutex;

use crate::common::FrameId;

/// Per-frame access metadata.
struct LruKNode {
    /// Up to `k` access timestamps, oldest at the front.
    history: VecDeque<u64>,
    is_evictable: bool,
}

struct ReplacerState {
    node_store: HashMap<FrameId, LruKNode>,
    /// Logical clock, bumped on every recorded access.
    current_timestamp: u64,
    /// Number of evictable frames.
    curr_size: usize,
}

/// LRU-K replacer over the buffer pool's frames.
///
/// All methods take `&self`; the internal latch is held for the duration of
/// each operation. A frame enters the replacer on its first recorded access
/// (non-evictable by default) and leaves on [`remove`](Self::remove) or a
/// successful [`evict`](Self::evict).
pub struct LruKReplacer {
    state: Mutex<ReplacerState>,
    replacer_size: usize,
    k: usize,
}

impl LruKReplacer {
    /// Create a replacer for `num_frames` frames with history length `k`.
    pub fn new(num_frames: usize, k: usize) -> Self {
        assert!(k > 0, "k must be positive");
        Self {
            state: Mutex::new(ReplacerState {
                node_store: HashMap::new(),
                current_timestamp: 0,
                curr_size: 0,
            }),
            replacer_size: num_frames,
            k,
        }
    }

    /// Record an access to `frame_id` at the current logical timestamp.
    ///
    /// Creates the frame's node on first access; the node starts
    /// non-evictable.
    pub fn record_access(&self, frame_id: FrameId) {
        debug_assert!(
            frame_id.0 < self.replacer_size,
            "frame {} outside replacer capacity {}",
            frame_id,
            self.replacer_size
        );
        let mut state = self.state.lock();
        let timestamp = state.current_timestamp;
        state.current_timestamp += 1;

        let k = self.k;
        let node = state.node_store.entry(frame_id).or_insert_with(|| LruKNode {
            history: VecDeque::with_capacity(k),
            is_evictable: false,
        });
        node.history.push_back(timestamp);
        if node.history.len() > k {
            node.history.pop_front();
        }
    }

    /// Toggle whether `frame_id` may be evicted.
    ///
    /// Unknown frames are ignored.
    pub fn set_evictable(&self, frame_id: FrameId, evictable: bool) {
        let mut state = self.state.lock();
        let mut delta: isize = 0;
        if let Some(node) = state.node_store.get_mut(&frame_id) {
            if evictable && !node.is_evictable {
                delta = 1;
            } else if !evictable && node.is_evictable {
                delta = -1;
            }
            node.is_evictable = evictable;
        }
        state.curr_size = (state.curr_size as isize + delta) as usize;
    }

    /// Evict the frame with the largest backward k-distance.
    ///
    /// A frame with fewer than `k` recorded accesses counts as infinitely
    /// distant and wins over any fully-sampled frame; ties fall to the
    /// earliest timestamp. The victim's node is removed before the latch is
    /// released, so no other thread can observe a half-evicted frame.
    ///
    /// Returns `None` when no frame is evictable.
    pub fn evict(&self) -> Option<FrameId> {
        let mut state = self.state.lock();

        // Order victims by (has a full history, oldest retained timestamp):
        // sparse histories first, then earliest k-th most recent access.
        let victim = state
            .node_store
            .iter()
            .filter(|(_, node)| node.is_evictable)
            .map(|(&frame_id, node)| {
                let full = node.history.len() >= self.k;
                let front = *node.history.front().expect("node with empty history");
                ((full, front), frame_id)
            })
            .min_by_key(|(key, _)| *key)
            .map(|(_, frame_id)| frame_id)?;

        state.node_store.remove(&victim);
        state.curr_size -= 1;
        log::debug!("evicting {}", victim);
        Some(victim)
    }

    /// Drop all metadata for `frame_id`.
    ///
    /// The frame must currently be evictable; removing a pinned frame is a
    /// bug in the caller. Unknown frames are ignored.
    pub fn remove(&self, frame_id: FrameId) {
        let mut state = self.state.lock();
        if let Some(node) = state.node_store.get(&frame_id) {
            assert!(node.is_evictable, "removing a non-evictable frame");
            state.node_store.remove(&frame_id);
            state.curr_size -= 1;
        }
    }

    /// Number of evictable frames.
    pub fn size(&self) -> usize {
        self.state.lock().curr_size
    }
}
