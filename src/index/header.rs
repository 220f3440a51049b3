//! Index file header
//!
//! Both index encodings persist the same metadata block at offset 0; the
//! B-tree variant carries one extra field for the root node offset.
//!
//! Layout (little-endian):
//! ```text
//! version:          i32   (-1 until the index is completed)
//! sub_version:      i32   (trace format revision, from the codec)
//! element_count:    i32
//! time_range_start: i64   (i64::MAX when unset)
//! time_range_end:   i64   (i64::MIN when unset)
//! event_count:      i64
//! root_offset:      i64   (B-tree files only)
//! ```
//!
//! A freshly created file keeps `version = -1` until
//! `set_index_complete()` rewrites the header, so an interrupted build
//! reopens as stale and is rebuilt rather than trusted.

use crate::index::checkpoint::{TimeRange, Timestamp};
use crate::index::error::{IndexError, IndexResult};
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

/// Current index format version
pub const FORMAT_VERSION: i32 = 1;

/// Version written at creation time; never matches [`FORMAT_VERSION`]
pub const INVALID_VERSION: i32 = -1;

/// Which file encoding a header belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderKind {
    /// `[header][node 0][node 1]...`
    BTree,
    /// `[header][checkpoint 0][checkpoint 1]...`
    Flat,
}

impl HeaderKind {
    /// Header size in bytes for this encoding
    pub fn size(&self) -> usize {
        match self {
            HeaderKind::BTree => 44,
            HeaderKind::Flat => 36,
        }
    }
}

/// Persisted index metadata
#[derive(Debug, Clone)]
pub struct IndexHeader {
    /// Format version; [`INVALID_VERSION`] until completion
    pub version: i32,
    /// Trace format revision, from the location codec
    pub sub_version: i32,
    /// Number of checkpoints stored
    pub count: u32,
    /// Trace time range covered by the index, if set
    pub time_range: Option<TimeRange>,
    /// Number of events in the indexed trace
    pub nb_events: u64,
    /// File offset of the root node (B-tree files only)
    pub root_offset: i64,
}

impl IndexHeader {
    /// Create a header for a freshly built index
    pub fn new(sub_version: i32) -> Self {
        Self {
            version: INVALID_VERSION,
            sub_version,
            count: 0,
            time_range: None,
            nb_events: 0,
            root_offset: 0,
        }
    }

    /// True when this header was written by the current format and trace
    /// revision; anything else is treated as an absent index
    pub fn is_current(&self, sub_version: i32) -> bool {
        self.version == FORMAT_VERSION && self.sub_version == sub_version
    }

    /// Serialize the header
    pub fn to_bytes(&self, kind: HeaderKind) -> Vec<u8> {
        let mut buf = Vec::with_capacity(kind.size());

        let (start, end) = match self.time_range {
            Some(range) => (range.start, range.end),
            // Unset range stored as an empty interval
            None => (Timestamp::MAX, Timestamp::MIN),
        };

        buf.extend_from_slice(&self.version.to_le_bytes());
        buf.extend_from_slice(&self.sub_version.to_le_bytes());
        buf.extend_from_slice(&(self.count as i32).to_le_bytes());
        buf.extend_from_slice(&start.to_le_bytes());
        buf.extend_from_slice(&end.to_le_bytes());
        buf.extend_from_slice(&(self.nb_events as i64).to_le_bytes());

        if kind == HeaderKind::BTree {
            buf.extend_from_slice(&self.root_offset.to_le_bytes());
        }

        buf
    }

    /// Parse a header
    pub fn from_bytes(buf: &[u8], kind: HeaderKind) -> IndexResult<Self> {
        if buf.len() < kind.size() {
            return Err(IndexError::Corrupt(format!(
                "header truncated: {} of {} bytes",
                buf.len(),
                kind.size()
            )));
        }

        let version = i32::from_le_bytes(buf[0..4].try_into().unwrap());
        let sub_version = i32::from_le_bytes(buf[4..8].try_into().unwrap());
        let count = i32::from_le_bytes(buf[8..12].try_into().unwrap());
        let start = i64::from_le_bytes(buf[12..20].try_into().unwrap());
        let end = i64::from_le_bytes(buf[20..28].try_into().unwrap());
        let nb_events = i64::from_le_bytes(buf[28..36].try_into().unwrap());

        if count < 0 || nb_events < 0 {
            return Err(IndexError::Corrupt(format!(
                "negative counts in header: count={}, events={}",
                count, nb_events
            )));
        }

        let root_offset = if kind == HeaderKind::BTree {
            i64::from_le_bytes(buf[36..44].try_into().unwrap())
        } else {
            0
        };

        let time_range = if start <= end {
            Some(TimeRange::new(start, end))
        } else {
            None
        };

        Ok(Self {
            version,
            sub_version,
            count: count as u32,
            time_range,
            nb_events: nb_events as u64,
            root_offset,
        })
    }

    /// Write the header at the start of the file
    pub fn write_to(&self, file: &mut File, kind: HeaderKind) -> IndexResult<()> {
        file.seek(SeekFrom::Start(0))?;
        file.write_all(&self.to_bytes(kind))?;
        Ok(())
    }

    /// Read the header from the start of the file
    pub fn read_from(file: &mut File, kind: HeaderKind) -> IndexResult<Self> {
        file.seek(SeekFrom::Start(0))?;
        let mut buf = vec![0u8; kind.size()];
        file.read_exact(&mut buf)?;
        Self::from_bytes(&buf, kind)
    }
}
