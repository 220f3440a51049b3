//! Trace location boundary
//!
//! The index never interprets seek positions; the trace injects a codec
//! that tells the index how wide a location is and how to move it on and
//! off disk. This keeps the index generic over whatever the trace uses to
//! address events (byte offsets, packet indices, compound positions).

use crate::index::error::{IndexError, IndexResult};
use std::fmt::Debug;

/// Fixed-width encoder/decoder for trace-defined seek positions
///
/// `size()` must be constant for the lifetime of an index file; it feeds
/// directly into node-size arithmetic, so a codec that changes width
/// between runs must also bump [`sub_version`](LocationCodec::sub_version)
/// to force a rebuild.
pub trait LocationCodec {
    /// The trace's seek position type
    type Location: Clone + Debug + PartialEq;

    /// Encoded width of a location, in bytes
    fn size(&self) -> usize;

    /// Encode a location into `buf`, which is exactly `size()` bytes
    fn encode(&self, location: &Self::Location, buf: &mut [u8]);

    /// Decode a location from `buf`, which is exactly `size()` bytes
    fn decode(&self, buf: &[u8]) -> IndexResult<Self::Location>;

    /// Trace-specific format revision, persisted in the index header
    ///
    /// A mismatch on open discards the index and rebuilds from scratch.
    fn sub_version(&self) -> i32 {
        0
    }
}

/// Stock codec for traces addressed by a plain byte offset
#[derive(Debug, Clone, Copy, Default)]
pub struct ByteOffsetCodec;

impl LocationCodec for ByteOffsetCodec {
    type Location = u64;

    fn size(&self) -> usize {
        8
    }

    fn encode(&self, location: &u64, buf: &mut [u8]) {
        buf.copy_from_slice(&location.to_le_bytes());
    }

    fn decode(&self, buf: &[u8]) -> IndexResult<u64> {
        let bytes: [u8; 8] = buf
            .try_into()
            .map_err(|_| IndexError::Corrupt(format!("location truncated: {} bytes", buf.len())))?;
        Ok(u64::from_le_bytes(bytes))
    }
}
