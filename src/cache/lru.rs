//! Recency List Module
//!
//! Doubly-linked recency order over arena slots, stored as index pairs.

use crate::error::CacheResult;

const HEAD: usize = 0;
const TAIL: usize = 1;
const SENTINELS: usize = 2;

#[derive(Debug, Clone, Copy)]
struct Link {
    prev: usize,
    next: usize,
}

// == Recency List ==
/// Tracks access order for LRU eviction.
///
/// Nodes live in a vector indexed by arena slot (offset past the two
/// sentinels), so the caller always names the node it moves or removes and
/// nothing is ever searched for:
/// - Head = most recently used
/// - Tail = least recently used
#[derive(Debug)]
pub struct RecencyList {
    links: Vec<Link>,
    len: usize,
}

impl Default for RecencyList {
    fn default() -> Self {
        Self::new()
    }
}

impl RecencyList {
    // == Constructor ==
    /// Creates an empty list.
    pub fn new() -> Self {
        Self {
            links: vec![
                Link { prev: HEAD, next: TAIL },
                Link { prev: HEAD, next: TAIL },
            ],
            len: 0,
        }
    }

    // == Reserve ==
    /// Grows the node table so `slot` can be linked without allocating.
    pub fn reserve_for(&mut self, slot: usize) -> CacheResult<()> {
        let needed = slot + SENTINELS + 1;
        if needed > self.links.len() {
            self.links.try_reserve(needed - self.links.len())?;
            self.links.resize(needed, Link { prev: HEAD, next: HEAD });
        }
        Ok(())
    }

    fn link_after_head(&mut self, node: usize) {
        let first = self.links[HEAD].next;
        self.links[node] = Link { prev: HEAD, next: first };
        self.links[first].prev = node;
        self.links[HEAD].next = node;
    }

    fn unlink(&mut self, node: usize) {
        let Link { prev, next } = self.links[node];
        self.links[prev].next = next;
        self.links[next].prev = prev;
    }

    // == Insert At Head ==
    /// Links a slot that is not yet in the list as most recently used.
    ///
    /// The slot's node must have been reserved with [`reserve_for`](Self::reserve_for).
    pub fn insert_at_head(&mut self, slot: usize) {
        self.link_after_head(slot + SENTINELS);
        self.len += 1;
    }

    // == Move To Head ==
    /// Marks a linked slot as most recently used.
    pub fn move_to_head(&mut self, slot: usize) {
        let node = slot + SENTINELS;
        if self.links[HEAD].next == node {
            return;
        }
        self.unlink(node);
        self.link_after_head(node);
    }

    // == Remove ==
    /// Unlinks a slot from the list.
    pub fn remove(&mut self, slot: usize) {
        self.unlink(slot + SENTINELS);
        self.len -= 1;
    }

    // == Remove Tail ==
    /// Unlinks and returns the least recently used slot.
    ///
    /// Returns None if the list is empty.
    pub fn remove_tail(&mut self) -> Option<usize> {
        let node = self.links[TAIL].prev;
        if node == HEAD {
            return None;
        }
        self.unlink(node);
        self.len -= 1;
        Some(node - SENTINELS)
    }

    // == Peek Tail ==
    /// Returns the least recently used slot without removing it.
    #[allow(dead_code)]
    pub fn peek_tail(&self) -> Option<usize> {
        let node = self.links[TAIL].prev;
        (node != HEAD).then(|| node - SENTINELS)
    }

    /// Returns the number of linked slots.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Iterates slots from most to least recently used.
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            list: self,
            node: self.links[HEAD].next,
        }
    }
}

/// Head-to-tail iterator over a [`RecencyList`].
pub struct Iter<'a> {
    list: &'a RecencyList,
    node: usize,
}

impl Iterator for Iter<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.node == TAIL {
            return None;
        }
        let slot = self.node - SENTINELS;
        self.node = self.list.links[self.node].next;
        Some(slot)
    }
}
