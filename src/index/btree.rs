//! On-disk B-tree checkpoint index
//!
//! The indexing engine: owns the backing file, the degree-derived sizing
//! constants, the header, and the node cache. A build pass calls
//! [`insert`](BTreeIndex::insert) for each checkpoint, then
//! [`set_index_complete`](BTreeIndex::set_index_complete) once to flush
//! and freeze; lookups afterwards walk the tree read-only through the
//! cache.
//!
//! Splits happen *before* descending into a full node, so the node an
//! insert finally writes into always has a free slot and no second pass
//! is needed. Nodes are appended to the file and never relocated, which
//! keeps allocation at pure offset arithmetic.

use crate::index::cache::{NodeCache, NodeRef, DEFAULT_CACHE_CAPACITY};
use crate::index::checkpoint::{Checkpoint, TimeRange, Timestamp};
use crate::index::error::IndexResult;
use crate::index::header::{HeaderKind, IndexHeader, FORMAT_VERSION};
use crate::index::location::LocationCodec;
use crate::index::node::{Node, NodeLayout, NULL_OFFSET};
use crate::index::visitor::FloorVisitor;
use crate::index::{CheckpointCollection, SearchResult};
use std::cell::RefCell;
use std::cmp::Ordering;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::rc::Rc;

/// Default B-tree branching parameter
pub const DEFAULT_DEGREE: usize = 15;

/// Tuning knobs for a B-tree index
///
/// The degree is baked into the file layout; opening a file written with
/// a different degree fails the geometry check and rebuilds from scratch.
#[derive(Debug, Clone, Copy)]
pub struct IndexConfig {
    /// B-tree branching parameter (`max_entries = 2 * degree - 1`)
    pub degree: usize,
    /// Number of non-root nodes kept in memory
    pub cache_capacity: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            degree: DEFAULT_DEGREE,
            cache_capacity: DEFAULT_CACHE_CAPACITY,
        }
    }
}

/// Persistent B-tree mapping event timestamps to trace seek positions
pub struct BTreeIndex<C: LocationCodec> {
    path: PathBuf,
    file: File,
    codec: C,
    layout: NodeLayout,
    header: IndexHeader,
    cache: NodeCache<C::Location>,
    /// Number of nodes allocated in the file
    node_count: u32,
    created_from_scratch: bool,
    complete: bool,
}

impl<C: LocationCodec> BTreeIndex<C> {
    /// Open an index file, creating or rebuilding it when absent, stale,
    /// or from an incompatible format revision
    pub fn open(path: impl AsRef<Path>, codec: C, config: IndexConfig) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let layout = NodeLayout::new(config.degree, codec.size());
        let mut index = Self {
            path,
            file,
            codec,
            layout,
            header: IndexHeader::new(0),
            cache: NodeCache::new(config.cache_capacity),
            node_count: 0,
            created_from_scratch: false,
            complete: false,
        };

        if index.try_open_existing()? {
            index.complete = true;
        } else {
            index.create_from_scratch()?;
        }

        Ok(index)
    }

    /// Attempt to load an existing, completed index; false means the file
    /// must be (re)built from scratch
    fn try_open_existing(&mut self) -> IndexResult<bool> {
        let header_size = HeaderKind::BTree.size() as u64;
        let len = self.file.metadata()?.len();
        if len < header_size {
            return Ok(false);
        }

        let header = match IndexHeader::read_from(&mut self.file, HeaderKind::BTree) {
            Ok(header) => header,
            Err(err) => {
                tracing::warn!(path = %self.path.display(), %err, "unreadable index header, rebuilding");
                return Ok(false);
            }
        };

        if !header.is_current(self.codec.sub_version()) {
            tracing::warn!(
                path = %self.path.display(),
                version = header.version,
                sub_version = header.sub_version,
                "index version mismatch, rebuilding"
            );
            return Ok(false);
        }

        // Geometry check: node area and root offset must line up with the
        // configured degree, or the file was written with another layout
        let node_size = self.layout.node_size as u64;
        let node_area = len - header_size;
        let root = header.root_offset as u64;
        let aligned = node_area % node_size == 0
            && root >= header_size
            && root < len
            && (root - header_size) % node_size == 0;
        if !aligned {
            tracing::warn!(path = %self.path.display(), "index geometry mismatch, rebuilding");
            return Ok(false);
        }

        let mut root_node = Node::new(header.root_offset, &self.layout);
        root_node.read(&mut self.file, &self.codec, &self.layout)?;
        self.cache.set_root(
            Rc::new(RefCell::new(root_node)),
            &mut self.file,
            &self.codec,
            &self.layout,
        )?;

        self.node_count = (node_area / node_size) as u32;
        self.header = header;
        tracing::debug!(
            path = %self.path.display(),
            checkpoints = self.header.count,
            nodes = self.node_count,
            "opened existing index"
        );
        Ok(true)
    }

    /// Initialize an empty index: stale-marked header plus one empty root
    fn create_from_scratch(&mut self) -> IndexResult<()> {
        self.file.set_len(0)?;
        self.header = IndexHeader::new(self.codec.sub_version());
        self.node_count = 0;
        self.cache = NodeCache::new_like(&self.cache);

        // Header carries INVALID_VERSION until completion, so an
        // interrupted build reopens as absent rather than trusted
        self.header.write_to(&mut self.file, HeaderKind::BTree)?;

        let root = self.alloc_root()?;
        self.header.root_offset = root.borrow().offset();
        self.created_from_scratch = true;
        self.complete = false;
        tracing::debug!(path = %self.path.display(), "created index from scratch");
        Ok(())
    }

    /// Append a new node to the file and pin it as the root, demoting the
    /// previous root into the ordinary recency list
    fn alloc_root(&mut self) -> IndexResult<NodeRef<C::Location>> {
        let offset = self.next_node_offset();
        let node = Rc::new(RefCell::new(Node::new(offset, &self.layout)));
        self.cache
            .set_root(node.clone(), &mut self.file, &self.codec, &self.layout)?;
        Ok(node)
    }

    /// Append a new node to the file and cache it
    fn alloc_node(&mut self) -> IndexResult<NodeRef<C::Location>> {
        let offset = self.next_node_offset();
        let node = Node::new(offset, &self.layout);
        self.cache
            .add(node, &mut self.file, &self.codec, &self.layout)
    }

    fn next_node_offset(&mut self) -> i64 {
        let offset = HeaderKind::BTree.size() as i64 + self.node_count as i64 * self.layout.node_size as i64;
        self.node_count += 1;
        offset
    }

    /// The greatest stored checkpoint at or before `timestamp`, if any
    pub fn find_floor(&mut self, timestamp: Timestamp) -> IndexResult<Option<Checkpoint<C::Location>>> {
        let mut visitor = FloorVisitor::new(timestamp);
        self.accept(self.header.root_offset, &mut visitor)?;
        Ok(visitor.floor().cloned())
    }

    /// Recursive insert; returns false when the checkpoint already exists
    fn insert_at(
        &mut self,
        checkpoint: Checkpoint<C::Location>,
        offset: i64,
        parent: Option<(i64, usize)>,
    ) -> IndexResult<bool> {
        let mut offset = offset;
        let mut node = self
            .cache
            .get(offset, &mut self.file, &self.codec, &self.layout)?;

        if node.borrow().is_full() {
            let median = node
                .borrow()
                .entry(self.layout.median)
                .cloned()
                .expect("full node has a median entry");

            if median.timestamp == checkpoint.timestamp {
                // Already present; splitting would be wasted work
                return Ok(false);
            }

            // Split before descending so the target node below always has
            // a free slot
            let (parent_node, parent_index) = match parent {
                Some((parent_offset, index)) => (
                    self.cache
                        .get(parent_offset, &mut self.file, &self.codec, &self.layout)?,
                    index,
                ),
                None => {
                    let new_root = self.alloc_root()?;
                    new_root.borrow_mut().set_child(0, offset);
                    self.header.root_offset = new_root.borrow().offset();
                    (new_root, 0)
                }
            };

            let new_node = self.alloc_node()?;
            let new_offset = new_node.borrow().offset();
            tracing::debug!(offset, new_offset, "splitting full node");

            {
                let mut full = node.borrow_mut();
                let mut split = new_node.borrow_mut();

                // Upper half of entries and children moves to the new node
                for i in 0..self.layout.median {
                    let moved = full.take_entry(self.layout.median + 1 + i);
                    split.set_entry(i, moved);
                    split.set_child(i, full.child(self.layout.median + 1 + i));
                    full.set_child(self.layout.median + 1 + i, NULL_OFFSET);
                }
                split.set_child(self.layout.median, full.child(self.layout.max_children - 1));
                full.set_child(self.layout.max_children - 1, NULL_OFFSET);
                full.take_entry(self.layout.median);

                // Lift the median into the parent, shifting its entries
                // and children right to make room
                let mut up = parent_node.borrow_mut();
                let count = up.entry_count();
                for i in (parent_index..count).rev() {
                    let entry = up.take_entry(i);
                    up.set_entry(i + 1, entry);
                }
                for i in ((parent_index + 1)..=count).rev() {
                    let child = up.child(i);
                    up.set_child(i + 1, child);
                }
                up.set_entry(parent_index, Some(median.clone()));
                up.set_child(parent_index + 1, new_offset);
            }

            if checkpoint.timestamp > median.timestamp {
                node = new_node;
                offset = new_offset;
            }
        }

        enum Probe {
            Duplicate,
            Descend(i64, usize),
            Leaf(usize),
        }

        let probe = {
            let n = node.borrow();
            let count = n.entry_count();
            let mut lower = 0usize;
            let mut upper = count;
            let mut duplicate = false;
            while lower < upper {
                let middle = (lower + upper) / 2;
                let entry = n.entry(middle).expect("probe within sorted prefix");
                match entry.timestamp.cmp(&checkpoint.timestamp) {
                    Ordering::Equal => {
                        duplicate = true;
                        break;
                    }
                    Ordering::Less => lower = middle + 1,
                    Ordering::Greater => upper = middle,
                }
            }
            if duplicate {
                Probe::Duplicate
            } else {
                let child = n.child(lower);
                if child != NULL_OFFSET {
                    Probe::Descend(child, lower)
                } else {
                    Probe::Leaf(lower)
                }
            }
        };

        match probe {
            Probe::Duplicate => Ok(false),
            Probe::Descend(child, index) => {
                self.insert_at(checkpoint, child, Some((offset, index)))
            }
            Probe::Leaf(index) => {
                let mut n = node.borrow_mut();
                let count = n.entry_count();
                for i in (index..count).rev() {
                    let entry = n.take_entry(i);
                    n.set_entry(i + 1, entry);
                }
                n.set_entry(index, Some(checkpoint));
                Ok(true)
            }
        }
    }

    /// Walk the subtree at `offset`, narrowing through the visitor
    fn accept(
        &mut self,
        offset: i64,
        visitor: &mut FloorVisitor<C::Location>,
    ) -> IndexResult<()> {
        if offset == NULL_OFFSET {
            return Ok(());
        }

        let node = self
            .cache
            .get(offset, &mut self.file, &self.codec, &self.layout)?;

        let child = {
            let n = node.borrow();
            let count = n.entry_count();
            let mut lower = 0usize;
            let mut upper = count;
            while lower < upper {
                let middle = (lower + upper) / 2;
                let entry = n.entry(middle).expect("probe within sorted prefix");
                match visitor.compare(entry) {
                    // Exact hit ends the whole search
                    Ordering::Equal => return Ok(()),
                    Ordering::Less => lower = middle + 1,
                    Ordering::Greater => upper = middle,
                }
            }
            // Child left of the first entry greater than the query
            n.child(lower)
        };

        self.accept(child, visitor)
    }

    /// Persisted header metadata
    pub fn header(&self) -> &IndexHeader {
        &self.header
    }

    /// Number of nodes allocated in the file
    pub fn node_count(&self) -> u32 {
        self.node_count
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl<C: LocationCodec> CheckpointCollection for BTreeIndex<C> {
    type Location = C::Location;

    fn insert(&mut self, timestamp: Timestamp, location: C::Location) -> IndexResult<()> {
        if self.complete {
            return Err(crate::index::error::IndexError::IndexFrozen);
        }

        // Ranks are assigned in insertion order; identical to timestamp
        // order when the build honors the non-decreasing contract
        let rank = self.header.count as u64;
        let checkpoint = Checkpoint::new(timestamp, location, rank);
        let root_offset = self.header.root_offset;

        if self.insert_at(checkpoint, root_offset, None)? {
            self.header.count += 1;
        }
        Ok(())
    }

    fn binary_search(&mut self, timestamp: Timestamp) -> IndexResult<SearchResult> {
        let mut visitor = FloorVisitor::new(timestamp);
        self.accept(self.header.root_offset, &mut visitor)?;
        Ok(visitor.result())
    }

    fn size(&self) -> u64 {
        self.header.count as u64
    }

    fn is_created_from_scratch(&self) -> bool {
        self.created_from_scratch
    }

    fn time_range(&self) -> Option<TimeRange> {
        self.header.time_range
    }

    fn set_time_range(&mut self, range: TimeRange) {
        self.header.time_range = Some(range);
    }

    fn nb_events(&self) -> u64 {
        self.header.nb_events
    }

    fn set_nb_events(&mut self, nb_events: u64) {
        self.header.nb_events = nb_events;
    }

    fn set_index_complete(&mut self) -> IndexResult<()> {
        self.cache
            .flush_all(&mut self.file, &self.codec, &self.layout)?;
        self.header.version = FORMAT_VERSION;
        self.header.write_to(&mut self.file, HeaderKind::BTree)?;
        self.file.sync_all()?;
        self.complete = true;
        tracing::debug!(
            path = %self.path.display(),
            checkpoints = self.header.count,
            nodes = self.node_count,
            "index completed"
        );
        Ok(())
    }

    fn delete(self) -> IndexResult<()> {
        let path = self.path.clone();
        drop(self);
        std::fs::remove_file(path)?;
        Ok(())
    }

    fn dispose(self) {
        // Dropping releases the file handle; an incomplete build is left
        // stale-marked and will be rebuilt on the next open
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::error::IndexError;
    use crate::index::location::ByteOffsetCodec;
    use tempfile::tempdir;

    /// Codec whose trace format revision can be varied in tests
    #[derive(Clone, Copy)]
    struct VersionedCodec(i32);

    impl LocationCodec for VersionedCodec {
        type Location = u64;

        fn size(&self) -> usize {
            ByteOffsetCodec.size()
        }

        fn encode(&self, location: &u64, buf: &mut [u8]) {
            ByteOffsetCodec.encode(location, buf)
        }

        fn decode(&self, buf: &[u8]) -> IndexResult<u64> {
            ByteOffsetCodec.decode(buf)
        }

        fn sub_version(&self) -> i32 {
            self.0
        }
    }

    fn small_config() -> IndexConfig {
        IndexConfig {
            degree: 2,
            cache_capacity: 4,
        }
    }

    fn open_at(dir: &Path, config: IndexConfig) -> BTreeIndex<ByteOffsetCodec> {
        BTreeIndex::open(dir.join("trace.idx"), ByteOffsetCodec, config).unwrap()
    }

    #[test]
    fn test_fresh_index_is_from_scratch_and_empty() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), IndexConfig::default());

        assert!(index.is_created_from_scratch());
        assert_eq!(index.size(), 0);
        assert_eq!(index.binary_search(1000).unwrap(), Err(0));
        assert_eq!(index.find_floor(1000).unwrap(), None);
    }

    #[test]
    fn test_roundtrip_ranks() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), small_config());

        for i in 0..100u64 {
            index.insert(i as i64 * 1000, i * 64).unwrap();
        }
        assert_eq!(index.size(), 100);

        for i in 0..100u64 {
            assert_eq!(index.binary_search(i as i64 * 1000).unwrap(), Ok(i));
        }
    }

    #[test]
    fn test_ordering_property() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), small_config());

        let timestamps = [5, 17, 120, 121, 4000, 4001, 9999];
        for (i, ts) in timestamps.iter().enumerate() {
            index.insert(*ts, i as u64 * 8).unwrap();
        }

        let mut previous = None;
        for ts in timestamps {
            let rank = index.binary_search(ts).unwrap().unwrap();
            if let Some(prev) = previous {
                assert!(rank > prev, "ranks must respect timestamp order");
            }
            previous = Some(rank);
        }
    }

    #[test]
    fn test_duplicate_insert_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), small_config());

        for i in 0..10 {
            index.insert(i * 100, i as u64).unwrap();
        }
        let before = index.binary_search(500).unwrap();

        index.insert(500, 999).unwrap();
        assert_eq!(index.size(), 10);
        assert_eq!(index.binary_search(500).unwrap(), before);

        // Floor checkpoint keeps the originally stored location
        let floor = index.find_floor(500).unwrap().unwrap();
        assert_eq!(floor.location, 5);
    }

    #[test]
    fn test_floor_search_insertion_points() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), small_config());

        for i in 0..50u64 {
            index.insert(i as i64 * 10, i).unwrap();
        }

        // Before everything
        assert_eq!(index.binary_search(-5).unwrap(), Err(0));
        assert_eq!(index.find_floor(-5).unwrap(), None);

        // Between stored timestamps: floor is the preceding checkpoint
        assert_eq!(index.binary_search(105).unwrap(), Err(11));
        let floor = index.find_floor(105).unwrap().unwrap();
        assert_eq!(floor.timestamp, 100);
        assert_eq!(floor.rank, 10);

        // Past everything
        assert_eq!(index.binary_search(1_000_000).unwrap(), Err(50));
        assert_eq!(index.find_floor(1_000_000).unwrap().unwrap().timestamp, 490);
    }

    #[test]
    fn test_degree_two_split_structure() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), small_config());

        // Fill the root to capacity, then force a split from the left
        index.insert(10, 0).unwrap();
        index.insert(20, 8).unwrap();
        index.insert(30, 16).unwrap();
        index.insert(5, 24).unwrap();

        let header_size = HeaderKind::BTree.size() as i64;
        let node_size = index.layout.node_size as i64;

        // Old root stays at node 0; the new root and the split sibling
        // are appended after it
        assert_eq!(index.node_count(), 3);
        assert_eq!(index.header().root_offset, header_size + node_size);

        let root = index.cache.root().unwrap();
        {
            let root = root.borrow();
            assert_eq!(root.entry_count(), 1);
            assert_eq!(root.entry(0).unwrap().timestamp, 20);
            assert_eq!(root.child(0), header_size);
            assert_eq!(root.child(1), header_size + 2 * node_size);
        }

        let left = index
            .cache
            .get(header_size, &mut index.file, &index.codec, &index.layout)
            .unwrap();
        {
            let left = left.borrow();
            assert_eq!(left.entry_count(), 2);
            assert_eq!(left.entry(0).unwrap().timestamp, 5);
            assert_eq!(left.entry(1).unwrap().timestamp, 10);
        }

        let right = index
            .cache
            .get(
                header_size + 2 * node_size,
                &mut index.file,
                &index.codec,
                &index.layout,
            )
            .unwrap();
        {
            let right = right.borrow();
            assert_eq!(right.entry_count(), 1);
            assert_eq!(right.entry(0).unwrap().timestamp, 30);
        }

        // Exact search for the lifted median still finds its rank
        assert_eq!(index.binary_search(20).unwrap(), Ok(1));
    }

    #[test]
    fn test_no_data_loss_across_cache_eviction() {
        let dir = tempdir().unwrap();
        // Degree 2 with a minimal cache: plenty of splits and evictions
        let mut index = open_at(
            dir.path(),
            IndexConfig {
                degree: 2,
                cache_capacity: 3,
            },
        );

        for i in 0..500u64 {
            index.insert(i as i64 * 1_000_000, i * 4096).unwrap();
        }

        for i in 0..500u64 {
            assert_eq!(index.binary_search(i as i64 * 1_000_000).unwrap(), Ok(i));
            let floor = index.find_floor(i as i64 * 1_000_000 + 1).unwrap().unwrap();
            assert_eq!(floor.location, i * 4096);
        }
    }

    #[test]
    fn test_completion_freezes_and_reopen_matches() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.idx");
        let probes: Vec<i64> = vec![-1, 0, 7, 500, 505, 99_999, 1_000_000];

        let expected: Vec<SearchResult> = {
            let mut index =
                BTreeIndex::open(&path, ByteOffsetCodec, small_config()).unwrap();
            for i in 0..200u64 {
                index.insert(i as i64 * 5, i * 16).unwrap();
            }
            index.set_time_range(TimeRange::new(0, 995));
            index.set_nb_events(200);

            let results = probes
                .iter()
                .map(|&ts| index.binary_search(ts).unwrap())
                .collect();
            index.set_index_complete().unwrap();
            results
        };

        let mut reopened = BTreeIndex::open(&path, ByteOffsetCodec, small_config()).unwrap();
        assert!(!reopened.is_created_from_scratch());
        assert_eq!(reopened.size(), 200);
        assert_eq!(reopened.time_range(), Some(TimeRange::new(0, 995)));
        assert_eq!(reopened.nb_events(), 200);

        for (probe, want) in probes.iter().zip(expected) {
            assert_eq!(reopened.binary_search(*probe).unwrap(), want);
        }

        // A reopened index is frozen
        assert!(matches!(
            reopened.insert(10_000_000, 0),
            Err(IndexError::IndexFrozen)
        ));
    }

    #[test]
    fn test_insert_after_complete_is_rejected() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), small_config());

        index.insert(100, 0).unwrap();
        index.set_index_complete().unwrap();

        assert!(matches!(index.insert(200, 8), Err(IndexError::IndexFrozen)));
        assert_eq!(index.size(), 1);
    }

    #[test]
    fn test_interrupted_build_is_rebuilt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.idx");

        {
            let mut index =
                BTreeIndex::open(&path, ByteOffsetCodec, small_config()).unwrap();
            for i in 0..50 {
                index.insert(i * 10, i as u64).unwrap();
            }
            // Dropped without set_index_complete: header stays stale
        }

        let index = BTreeIndex::open(&path, ByteOffsetCodec, small_config()).unwrap();
        assert!(index.is_created_from_scratch());
        assert_eq!(index.size(), 0);
    }

    #[test]
    fn test_sub_version_mismatch_rebuilds() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.idx");

        {
            let mut index =
                BTreeIndex::open(&path, VersionedCodec(1), small_config()).unwrap();
            index.insert(100, 0).unwrap();
            index.set_index_complete().unwrap();
        }

        // Same revision: reopened as-is
        {
            let index = BTreeIndex::open(&path, VersionedCodec(1), small_config()).unwrap();
            assert!(!index.is_created_from_scratch());
            assert_eq!(index.size(), 1);
        }

        // Bumped revision: treated as absent
        let index = BTreeIndex::open(&path, VersionedCodec(2), small_config()).unwrap();
        assert!(index.is_created_from_scratch());
        assert_eq!(index.size(), 0);
    }

    #[test]
    fn test_default_degree_bulk_build() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path(), IndexConfig::default());

        for i in 0..2000u64 {
            index.insert(i as i64, i).unwrap();
        }
        index.set_index_complete().unwrap();

        assert_eq!(index.binary_search(0).unwrap(), Ok(0));
        assert_eq!(index.binary_search(1999).unwrap(), Ok(1999));
        assert_eq!(index.binary_search(1000).unwrap(), Ok(1000));
        // With degree 15 a 2000-entry tree stays shallow
        assert!(index.node_count() < 150);
    }

    #[test]
    fn test_delete_removes_backing_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.idx");

        let mut index = BTreeIndex::open(&path, ByteOffsetCodec, small_config()).unwrap();
        index.insert(100, 0).unwrap();
        index.set_index_complete().unwrap();
        assert!(path.exists());

        index.delete().unwrap();
        assert!(!path.exists());
    }
}
