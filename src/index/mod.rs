//! Waypoint Checkpoint Index
//!
//! Persistent, disk-backed indexes mapping event timestamps to seek
//! positions in a large append-only trace:
//!
//! - **BTreeIndex**: on-disk B-tree with a bounded LRU node cache and
//!   write-back eviction
//! - **FlatIndex**: flat sorted array with random access by rank
//!
//! # Architecture
//!
//! ```text
//! Build:  insert(ts, loc) → node split/allocate → Node Cache → file
//! Freeze: set_index_complete() → flush dirty nodes → header rewrite
//! Query:  binary_search(ts) → floor visitor walk → rank / insertion
//! ```
//!
//! Both encodings implement the same [`CheckpointCollection`] contract;
//! the choice is made at construction and baked into the file.

pub mod btree;
pub mod cache;
pub mod checkpoint;
pub mod error;
pub mod flat;
pub mod header;
pub mod location;
pub mod node;
pub mod visitor;

pub use btree::{BTreeIndex, IndexConfig, DEFAULT_DEGREE};
pub use cache::{NodeCache, DEFAULT_CACHE_CAPACITY};
pub use checkpoint::{Checkpoint, TimeRange, Timestamp};
pub use error::{IndexError, IndexResult};
pub use flat::FlatIndex;
pub use header::{HeaderKind, IndexHeader, FORMAT_VERSION};
pub use location::{ByteOffsetCodec, LocationCodec};
pub use visitor::FloorVisitor;

/// Outcome of a rank lookup, mirroring `slice::binary_search`:
/// `Ok(rank)` for an exact timestamp match, `Err(insertion_point)` when
/// the timestamp is absent (the rank the checkpoint would occupy)
pub type SearchResult = Result<u64, u64>;

/// Contract shared by both index encodings
///
/// An index is built by one writer calling [`insert`], frozen once with
/// [`set_index_complete`], then queried read-only. Inserting into a
/// frozen index returns [`IndexError::IndexFrozen`]. [`BTreeIndex`]
/// accepts timestamps in any order; [`FlatIndex`] requires them
/// non-decreasing.
///
/// [`insert`]: CheckpointCollection::insert
/// [`set_index_complete`]: CheckpointCollection::set_index_complete
pub trait CheckpointCollection {
    /// Trace-defined seek position type
    type Location;

    /// Append a checkpoint; the rank is assigned by the index. Inserting
    /// an already-present timestamp is an idempotent no-op.
    fn insert(&mut self, timestamp: Timestamp, location: Self::Location) -> IndexResult<()>;

    /// Exact/floor rank lookup
    fn binary_search(&mut self, timestamp: Timestamp) -> IndexResult<SearchResult>;

    /// Number of checkpoints stored
    fn size(&self) -> u64;

    /// True when opening found no usable index and a fresh one was
    /// started; the caller must populate it
    fn is_created_from_scratch(&self) -> bool;

    /// Trace time range covered by the index
    fn time_range(&self) -> Option<TimeRange>;

    fn set_time_range(&mut self, range: TimeRange);

    /// Number of events in the indexed trace
    fn nb_events(&self) -> u64;

    fn set_nb_events(&mut self, nb_events: u64);

    /// Flush everything, stamp the header with the current format
    /// version, and freeze the index for read-only use
    fn set_index_complete(&mut self) -> IndexResult<()>;

    /// Remove the backing file
    fn delete(self) -> IndexResult<()>;

    /// Release file handles without deleting anything
    fn dispose(self);
}
