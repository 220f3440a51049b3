//! Flat sorted-array checkpoint index
//!
//! The sibling encoding to the B-tree: checkpoints are appended to the
//! file in increasing timestamp order, so rank `r` lives at a fixed
//! offset (`header + r * checkpoint_size`) and lookup is an ordinary
//! sorted-array binary search against the file. No splitting, no tree
//! structure, and unlike the B-tree it supports random access by rank.

use crate::index::checkpoint::{
    read_checkpoint, serialized_size, write_checkpoint, Checkpoint, TimeRange, Timestamp,
};
use crate::index::error::{IndexError, IndexResult};
use crate::index::header::{HeaderKind, IndexHeader, FORMAT_VERSION};
use crate::index::location::LocationCodec;
use crate::index::{CheckpointCollection, SearchResult};
use std::cmp::Ordering;
use std::fs::{File, OpenOptions};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

/// Persistent sorted array mapping event timestamps to trace seek
/// positions
pub struct FlatIndex<C: LocationCodec> {
    path: PathBuf,
    file: File,
    codec: C,
    checkpoint_size: usize,
    header: IndexHeader,
    /// Timestamp of the most recently appended checkpoint
    last_timestamp: Option<Timestamp>,
    created_from_scratch: bool,
    complete: bool,
}

impl<C: LocationCodec> FlatIndex<C> {
    /// Open an index file, creating or rebuilding it when absent, stale,
    /// or from an incompatible format revision
    pub fn open(path: impl AsRef<Path>, codec: C) -> IndexResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .open(&path)?;

        let checkpoint_size = serialized_size(&codec);
        let mut index = Self {
            path,
            file,
            codec,
            checkpoint_size,
            header: IndexHeader::new(0),
            last_timestamp: None,
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

    fn try_open_existing(&mut self) -> IndexResult<bool> {
        let header_size = HeaderKind::Flat.size() as u64;
        let len = self.file.metadata()?.len();
        if len < header_size {
            return Ok(false);
        }

        let header = match IndexHeader::read_from(&mut self.file, HeaderKind::Flat) {
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

        let expected = header_size + header.count as u64 * self.checkpoint_size as u64;
        if len < expected {
            tracing::warn!(path = %self.path.display(), "index shorter than its count, rebuilding");
            return Ok(false);
        }

        self.header = header;
        tracing::debug!(
            path = %self.path.display(),
            checkpoints = self.header.count,
            "opened existing index"
        );
        Ok(true)
    }

    fn create_from_scratch(&mut self) -> IndexResult<()> {
        self.file.set_len(0)?;
        self.header = IndexHeader::new(self.codec.sub_version());
        self.last_timestamp = None;

        // Stale-marked until completion, same as the B-tree encoding
        self.header.write_to(&mut self.file, HeaderKind::Flat)?;

        self.created_from_scratch = true;
        self.complete = false;
        tracing::debug!(path = %self.path.display(), "created index from scratch");
        Ok(())
    }

    fn checkpoint_offset(&self, rank: u64) -> u64 {
        HeaderKind::Flat.size() as u64 + rank * self.checkpoint_size as u64
    }

    /// Random access by rank
    ///
    /// # Panics
    /// Panics if `rank` is out of range.
    pub fn get(&mut self, rank: u64) -> IndexResult<Checkpoint<C::Location>> {
        assert!(
            rank < self.header.count as u64,
            "rank {} out of range (size {})",
            rank,
            self.header.count
        );

        self.file.seek(SeekFrom::Start(self.checkpoint_offset(rank)))?;
        let mut buf = vec![0u8; self.checkpoint_size];
        self.file.read_exact(&mut buf)?;

        let checkpoint = read_checkpoint(&self.codec, &buf)?;
        if checkpoint.rank != rank {
            return Err(IndexError::Corrupt(format!(
                "checkpoint at rank {} records rank {}",
                rank, checkpoint.rank
            )));
        }
        Ok(checkpoint)
    }

    /// The greatest stored checkpoint at or before `timestamp`, if any
    pub fn find_floor(&mut self, timestamp: Timestamp) -> IndexResult<Option<Checkpoint<C::Location>>> {
        match self.binary_search(timestamp)? {
            Ok(rank) => Ok(Some(self.get(rank)?)),
            Err(0) => Ok(None),
            Err(insertion) => Ok(Some(self.get(insertion - 1)?)),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Persisted header metadata
    pub fn header(&self) -> &IndexHeader {
        &self.header
    }
}

impl<C: LocationCodec> CheckpointCollection for FlatIndex<C> {
    type Location = C::Location;

    fn insert(&mut self, timestamp: Timestamp, location: C::Location) -> IndexResult<()> {
        if self.complete {
            return Err(IndexError::IndexFrozen);
        }

        if let Some(last) = self.last_timestamp {
            // Sorted layout depends entirely on append order
            assert!(
                timestamp >= last,
                "flat index requires non-decreasing timestamps ({} after {})",
                timestamp,
                last
            );
            if timestamp == last {
                return Ok(());
            }
        }

        let rank = self.header.count as u64;
        let checkpoint = Checkpoint::new(timestamp, location, rank);

        let mut buf = vec![0u8; self.checkpoint_size];
        write_checkpoint(&self.codec, &checkpoint, &mut buf);
        self.file.seek(SeekFrom::Start(self.checkpoint_offset(rank)))?;
        self.file.write_all(&buf)?;

        self.header.count += 1;
        self.last_timestamp = Some(timestamp);
        Ok(())
    }

    fn binary_search(&mut self, timestamp: Timestamp) -> IndexResult<SearchResult> {
        let mut lower = 0u64;
        let mut upper = self.header.count as u64;

        while lower < upper {
            let middle = (lower + upper) / 2;
            let entry = self.get(middle)?;
            match entry.timestamp.cmp(&timestamp) {
                Ordering::Equal => return Ok(Ok(middle)),
                Ordering::Less => lower = middle + 1,
                Ordering::Greater => upper = middle,
            }
        }

        Ok(Err(lower))
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
        self.header.version = FORMAT_VERSION;
        self.header.write_to(&mut self.file, HeaderKind::Flat)?;
        self.file.sync_all()?;
        self.complete = true;
        tracing::debug!(
            path = %self.path.display(),
            checkpoints = self.header.count,
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
    use crate::index::location::ByteOffsetCodec;
    use tempfile::tempdir;

    fn open_at(dir: &Path) -> FlatIndex<ByteOffsetCodec> {
        FlatIndex::open(dir.join("trace.flat.idx"), ByteOffsetCodec).unwrap()
    }

    #[test]
    fn test_fresh_index_is_empty() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path());

        assert!(index.is_created_from_scratch());
        assert_eq!(index.size(), 0);
        assert_eq!(index.binary_search(1000).unwrap(), Err(0));
        assert_eq!(index.find_floor(1000).unwrap(), None);
    }

    #[test]
    fn test_roundtrip_ranks_and_random_access() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path());

        for i in 0..100u64 {
            index.insert(i as i64 * 1000, i * 64).unwrap();
        }

        for i in 0..100u64 {
            assert_eq!(index.binary_search(i as i64 * 1000).unwrap(), Ok(i));

            let checkpoint = index.get(i).unwrap();
            assert_eq!(checkpoint.timestamp, i as i64 * 1000);
            assert_eq!(checkpoint.location, i * 64);
            assert_eq!(checkpoint.rank, i);
        }
    }

    #[test]
    fn test_floor_search_insertion_points() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path());

        for i in 0..50u64 {
            index.insert(i as i64 * 10, i).unwrap();
        }

        assert_eq!(index.binary_search(-5).unwrap(), Err(0));
        assert_eq!(index.binary_search(105).unwrap(), Err(11));
        assert_eq!(index.binary_search(1_000_000).unwrap(), Err(50));

        let floor = index.find_floor(105).unwrap().unwrap();
        assert_eq!(floor.timestamp, 100);
        assert_eq!(floor.rank, 10);
    }

    #[test]
    fn test_duplicate_append_is_idempotent() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path());

        index.insert(100, 0).unwrap();
        index.insert(100, 999).unwrap();

        assert_eq!(index.size(), 1);
        assert_eq!(index.get(0).unwrap().location, 0);
    }

    #[test]
    #[should_panic]
    fn test_out_of_order_append_fails_fast() {
        let dir = tempdir().unwrap();
        let mut index = open_at(dir.path());

        index.insert(100, 0).unwrap();
        index.insert(50, 8).unwrap();
    }

    #[test]
    fn test_completion_and_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.flat.idx");

        {
            let mut index = FlatIndex::open(&path, ByteOffsetCodec).unwrap();
            for i in 0..200u64 {
                index.insert(i as i64 * 5, i * 16).unwrap();
            }
            index.set_time_range(TimeRange::new(0, 995));
            index.set_nb_events(200);
            index.set_index_complete().unwrap();
        }

        let mut reopened = FlatIndex::open(&path, ByteOffsetCodec).unwrap();
        assert!(!reopened.is_created_from_scratch());
        assert_eq!(reopened.size(), 200);
        assert_eq!(reopened.time_range(), Some(TimeRange::new(0, 995)));
        assert_eq!(reopened.nb_events(), 200);
        assert_eq!(reopened.binary_search(500).unwrap(), Ok(100));
        assert_eq!(reopened.binary_search(502).unwrap(), Err(101));

        assert!(matches!(
            reopened.insert(10_000, 0),
            Err(IndexError::IndexFrozen)
        ));
    }

    #[test]
    fn test_interrupted_build_is_rebuilt() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("trace.flat.idx");

        {
            let mut index = FlatIndex::open(&path, ByteOffsetCodec).unwrap();
            index.insert(100, 0).unwrap();
        }

        let index = FlatIndex::open(&path, ByteOffsetCodec).unwrap();
        assert!(index.is_created_from_scratch());
        assert_eq!(index.size(), 0);
    }

    #[test]
    fn test_tree_and_flat_agree() {
        use crate::index::btree::{BTreeIndex, IndexConfig};

        let dir = tempdir().unwrap();
        let mut flat = open_at(dir.path());
        let mut tree = BTreeIndex::open(
            dir.path().join("trace.idx"),
            ByteOffsetCodec,
            IndexConfig {
                degree: 2,
                cache_capacity: 4,
            },
        )
        .unwrap();

        for i in 0..300u64 {
            let ts = i as i64 * 7;
            flat.insert(ts, i).unwrap();
            tree.insert(ts, i).unwrap();
        }

        for probe in [-3, 0, 1, 7, 350, 351, 2093, 2094, 100_000] {
            assert_eq!(
                flat.binary_search(probe).unwrap(),
                tree.binary_search(probe).unwrap(),
                "encodings disagree at probe {}",
                probe
            );
        }
    }
}
