//! Bounded node cache with write-back eviction
//!
//! Keeps the root pinned plus a small recency list of nodes keyed by file
//! offset. The cache is a pure accelerator: evicting a dirty node writes
//! it back first, so the file never lags behind what the cache has
//! discarded. A linear scan over the recency list is intentional at the
//! default capacity of 15; offsets are compared, not hashed.
//!
//! No internal synchronization: the index owns its cache exclusively and
//! the `&mut` receivers make one-writer usage a compile-time property.

use crate::index::error::IndexResult;
use crate::index::location::LocationCodec;
use crate::index::node::{Node, NodeLayout};
use std::cell::RefCell;
use std::collections::VecDeque;
use std::fs::File;
use std::rc::Rc;

/// Default number of non-root nodes kept in memory
pub const DEFAULT_CACHE_CAPACITY: usize = 15;

/// Shared handle to a cached node
///
/// `Rc<RefCell<_>>` because an insert holds a parent and child of the
/// same cache simultaneously; the index is single-threaded by design.
pub type NodeRef<L> = Rc<RefCell<Node<L>>>;

/// LRU cache of B-tree nodes with a pinned root
pub struct NodeCache<L> {
    root: Option<NodeRef<L>>,
    /// Most-recently-used at the front
    recents: VecDeque<NodeRef<L>>,
    capacity: usize,
}

impl<L: Clone> NodeCache<L> {
    pub fn new(capacity: usize) -> Self {
        // A split holds three nodes at once (node, sibling, parent)
        assert!(capacity >= 3, "node cache needs room for a split in flight");
        Self {
            root: None,
            recents: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// A fresh, empty cache with the same capacity
    pub fn new_like(other: &Self) -> Self {
        Self::new(other.capacity)
    }

    /// The pinned root node, if one has been set
    pub fn root(&self) -> Option<NodeRef<L>> {
        self.root.clone()
    }

    /// Pin a new root, demoting the previous root into the recency list
    /// where it becomes evictable like any other node
    pub fn set_root<C>(
        &mut self,
        node: NodeRef<L>,
        file: &mut File,
        codec: &C,
        layout: &NodeLayout,
    ) -> IndexResult<()>
    where
        C: LocationCodec<Location = L>,
    {
        if let Some(old_root) = self.root.take() {
            self.evict_to_capacity(file, codec, layout)?;
            self.recents.push_front(old_root);
        }
        self.root = Some(node);
        Ok(())
    }

    /// Fetch the node at `offset`, reading it from disk on a miss
    pub fn get<C>(
        &mut self,
        offset: i64,
        file: &mut File,
        codec: &C,
        layout: &NodeLayout,
    ) -> IndexResult<NodeRef<L>>
    where
        C: LocationCodec<Location = L>,
    {
        if let Some(root) = &self.root {
            if root.borrow().offset() == offset {
                return Ok(root.clone());
            }
        }

        if let Some(pos) = self
            .recents
            .iter()
            .position(|n| n.borrow().offset() == offset)
        {
            // Promote the hit to most-recently-used
            let node = self.recents.remove(pos).unwrap();
            self.recents.push_front(node.clone());
            return Ok(node);
        }

        let mut node = Node::new(offset, layout);
        node.read(file, codec, layout)?;
        self.insert(Rc::new(RefCell::new(node)), file, codec, layout)
    }

    /// Insert a freshly allocated node as most-recently-used
    pub fn add<C>(
        &mut self,
        node: Node<L>,
        file: &mut File,
        codec: &C,
        layout: &NodeLayout,
    ) -> IndexResult<NodeRef<L>>
    where
        C: LocationCodec<Location = L>,
    {
        self.insert(Rc::new(RefCell::new(node)), file, codec, layout)
    }

    fn insert<C>(
        &mut self,
        node: NodeRef<L>,
        file: &mut File,
        codec: &C,
        layout: &NodeLayout,
    ) -> IndexResult<NodeRef<L>>
    where
        C: LocationCodec<Location = L>,
    {
        self.evict_to_capacity(file, codec, layout)?;
        self.recents.push_front(node.clone());
        Ok(node)
    }

    /// Drop least-recently-used nodes until there is room for one more,
    /// flushing any that are dirty
    fn evict_to_capacity<C>(
        &mut self,
        file: &mut File,
        codec: &C,
        layout: &NodeLayout,
    ) -> IndexResult<()>
    where
        C: LocationCodec<Location = L>,
    {
        while self.recents.len() >= self.capacity {
            let victim = self.recents.pop_back().unwrap();
            let mut victim = victim.borrow_mut();
            if victim.is_dirty() {
                tracing::debug!(offset = victim.offset(), "writing back evicted node");
                victim.write(file, codec, layout)?;
            }
        }
        Ok(())
    }

    /// Write every dirty cached node (root included) to disk
    pub fn flush_all<C>(
        &mut self,
        file: &mut File,
        codec: &C,
        layout: &NodeLayout,
    ) -> IndexResult<()>
    where
        C: LocationCodec<Location = L>,
    {
        let mut flushed = 0usize;
        if let Some(root) = &self.root {
            let mut root = root.borrow_mut();
            if root.is_dirty() {
                root.write(file, codec, layout)?;
                flushed += 1;
            }
        }
        for node in &self.recents {
            let mut node = node.borrow_mut();
            if node.is_dirty() {
                node.write(file, codec, layout)?;
                flushed += 1;
            }
        }
        tracing::debug!(flushed, "flushed dirty nodes");
        Ok(())
    }

    /// Number of nodes in the recency list (root excluded)
    pub fn len(&self) -> usize {
        self.recents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.recents.is_empty()
    }
}
