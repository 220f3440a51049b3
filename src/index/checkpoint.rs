//! Core data types for the checkpoint index
//!
//! - `Checkpoint`: one indexed `(timestamp, location, rank)` triple
//! - `TimeRange`: the time interval covered by an index
//!
//! Timestamps are `i64` nanoseconds since the trace epoch; the index only
//! relies on them being totally ordered.

use crate::index::error::{IndexError, IndexResult};
use crate::index::location::LocationCodec;

/// Timestamp of a trace event, in nanoseconds
pub type Timestamp = i64;

/// A single indexed seek point into the trace
///
/// The location is opaque to the index; only the trace's own
/// [`LocationCodec`](crate::index::LocationCodec) knows how to encode it.
/// The rank is the 0-based ordinal position of the checkpoint in full
/// timestamp order, assigned by the index at insert time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Checkpoint<L> {
    /// Timestamp of the event this checkpoint seeks to
    pub timestamp: Timestamp,
    /// Trace-defined seek position
    pub location: L,
    /// Ordinal position in full timestamp order
    pub rank: u64,
}

impl<L> Checkpoint<L> {
    pub fn new(timestamp: Timestamp, location: L, rank: u64) -> Self {
        Self {
            timestamp,
            location,
            rank,
        }
    }
}

/// Serialized checkpoint width for a given codec: location bytes, then
/// `timestamp: i64`, then `rank: i64`
pub fn serialized_size<C: LocationCodec>(codec: &C) -> usize {
    codec.size() + 16
}

/// Encode a checkpoint into `buf`, which is exactly
/// [`serialized_size`] bytes
pub fn write_checkpoint<C: LocationCodec>(
    codec: &C,
    checkpoint: &Checkpoint<C::Location>,
    buf: &mut [u8],
) {
    let at = codec.size();
    codec.encode(&checkpoint.location, &mut buf[..at]);
    buf[at..at + 8].copy_from_slice(&checkpoint.timestamp.to_le_bytes());
    buf[at + 8..at + 16].copy_from_slice(&(checkpoint.rank as i64).to_le_bytes());
}

/// Decode a checkpoint from `buf`, which is exactly
/// [`serialized_size`] bytes
pub fn read_checkpoint<C: LocationCodec>(
    codec: &C,
    buf: &[u8],
) -> IndexResult<Checkpoint<C::Location>> {
    let at = codec.size();
    let location = codec.decode(&buf[..at])?;
    let timestamp = i64::from_le_bytes(buf[at..at + 8].try_into().unwrap());
    let rank = i64::from_le_bytes(buf[at + 8..at + 16].try_into().unwrap());
    if rank < 0 {
        return Err(IndexError::Corrupt(format!(
            "checkpoint holds negative rank {}",
            rank
        )));
    }
    Ok(Checkpoint::new(timestamp, location, rank as u64))
}

/// Time range covered by an index (closed interval: [start, end])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeRange {
    /// Start timestamp (inclusive), in nanoseconds
    pub start: Timestamp,
    /// End timestamp (inclusive), in nanoseconds
    pub end: Timestamp,
}

impl TimeRange {
    /// Create a new time range
    ///
    /// # Panics
    /// Panics if start > end
    pub fn new(start: Timestamp, end: Timestamp) -> Self {
        assert!(start <= end, "TimeRange: start must not exceed end");
        Self { start, end }
    }

    /// Check if a timestamp falls within this range
    pub fn contains(&self, timestamp: Timestamp) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }

    /// Check if this range overlaps with another
    pub fn overlaps(&self, other: &TimeRange) -> bool {
        self.start <= other.end && self.end >= other.start
    }

    /// Get the duration in nanoseconds
    pub fn duration(&self) -> i64 {
        self.end - self.start
    }

    /// Extend this range to cover another timestamp
    pub fn extend(&self, timestamp: Timestamp) -> Self {
        Self {
            start: self.start.min(timestamp),
            end: self.end.max(timestamp),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_range_contains() {
        let range = TimeRange::new(1000, 2000);

        assert!(!range.contains(999));
        assert!(range.contains(1000));
        assert!(range.contains(1500));
        assert!(range.contains(2000));
        assert!(!range.contains(2001));
    }

    #[test]
    fn test_time_range_overlaps() {
        let range1 = TimeRange::new(1000, 2000);
        let range2 = TimeRange::new(1500, 2500);
        let range3 = TimeRange::new(2001, 3000);
        let range4 = TimeRange::new(500, 999);

        assert!(range1.overlaps(&range2));
        assert!(!range1.overlaps(&range3));
        assert!(!range1.overlaps(&range4));
    }

    #[test]
    fn test_time_range_extend() {
        let range = TimeRange::new(1000, 2000);

        let extended = range.extend(3000);
        assert_eq!(extended.start, 1000);
        assert_eq!(extended.end, 3000);

        let extended = range.extend(500);
        assert_eq!(extended.start, 500);
        assert_eq!(extended.end, 2000);

        let unchanged = range.extend(1500);
        assert_eq!(unchanged, range);
    }

    #[test]
    #[should_panic]
    fn test_time_range_rejects_inverted_bounds() {
        TimeRange::new(2000, 1000);
    }

    #[test]
    fn test_checkpoint_ordering_fields() {
        let cp = Checkpoint::new(1000, 42u64, 0);
        assert_eq!(cp.timestamp, 1000);
        assert_eq!(cp.location, 42);
        assert_eq!(cp.rank, 0);
    }

    #[test]
    fn test_checkpoint_serialization_roundtrip() {
        use crate::index::location::ByteOffsetCodec;

        let codec = ByteOffsetCodec;
        let checkpoint = Checkpoint::new(-12345, 0xCAFE_u64, 77);
        let mut buf = vec![0u8; serialized_size(&codec)];

        write_checkpoint(&codec, &checkpoint, &mut buf);
        assert_eq!(read_checkpoint(&codec, &buf).unwrap(), checkpoint);
    }

    #[test]
    fn test_checkpoint_negative_rank_rejected() {
        use crate::index::location::ByteOffsetCodec;

        let codec = ByteOffsetCodec;
        let mut buf = vec![0u8; serialized_size(&codec)];
        write_checkpoint(&codec, &Checkpoint::new(0, 0u64, 0), &mut buf);
        buf[16..24].copy_from_slice(&(-1i64).to_le_bytes());

        assert!(matches!(
            read_checkpoint::<ByteOffsetCodec>(&codec, &buf),
            Err(IndexError::Corrupt(_))
        ));
    }
}
