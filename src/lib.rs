//! # Waypoint
//!
//! Persistent checkpoint indexes for append-only trace files.
//!
//! A checkpoint pairs an event timestamp with the location of that event
//! in a trace file. Waypoint stores checkpoints in disk-backed indexes so
//! that a reader can seek close to any requested timestamp without
//! scanning the trace from the start.
//!
//! ## Features
//!
//! - **Disk-backed B-tree**: Checkpoints are inserted in arbitrary order
//!   and queried by floor search over timestamps
//! - **Flat array index**: A compact alternative for traces whose
//!   checkpoints arrive in timestamp order
//! - **Pluggable locations**: Trace-specific location types plug in
//!   through the [`LocationCodec`](index::LocationCodec) trait
//! - **Crash-safe builds**: An index interrupted mid-build reopens as
//!   absent and is rebuilt from scratch
//!
//! ## Modules
//!
//! - [`index`]: The checkpoint index engines and their on-disk formats
//! - [`config`]: TOML configuration with environment overrides
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use waypoint::index::{BTreeIndex, ByteOffsetCodec, CheckpointCollection, IndexConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut index = BTreeIndex::open("trace.idx", ByteOffsetCodec, IndexConfig::default())?;
//!
//!     if index.is_created_from_scratch() {
//!         index.insert(1_000, 0)?;
//!         index.insert(2_000, 4_096)?;
//!         index.set_index_complete()?;
//!     }
//!
//!     // Floor search: the checkpoint at or before the timestamp
//!     match index.binary_search(1_500)? {
//!         Ok(rank) => println!("exact match at rank {rank}"),
//!         Err(insertion) => println!("floor rank {}", insertion.saturating_sub(1)),
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod index;

pub use config::{Config, ConfigError, IndexSettings, LoggingConfig};

pub use index::{
    BTreeIndex, ByteOffsetCodec, Checkpoint, CheckpointCollection, FlatIndex, IndexConfig,
    IndexError, IndexResult, LocationCodec, SearchResult, TimeRange, Timestamp,
};
