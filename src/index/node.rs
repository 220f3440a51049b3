//! B-tree node: fixed-size disk block of checkpoints and child offsets
//!
//! Layout (little-endian):
//! ```text
//! ┌──────────────────────────────────────────────┐
//! │ children: max_children × i64 (-1 = none)     │
//! │ entry_count: i32                             │
//! │ entries: entry_count × serialized checkpoint │
//! │   location: codec.size() bytes               │
//! │   timestamp: i64                             │
//! │   rank: i64                                  │
//! │ (zero padding up to node_size)               │
//! └──────────────────────────────────────────────┘
//! ```
//!
//! Every node occupies exactly `node_size` bytes, so allocation is pure
//! offset arithmetic and nodes are never relocated after allocation.

use crate::index::checkpoint::{read_checkpoint, write_checkpoint, Checkpoint};
use crate::index::error::{IndexError, IndexResult};
use crate::index::location::LocationCodec;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom, Write};

/// Sentinel for an absent child pointer
pub const NULL_OFFSET: i64 = -1;

/// Degree-derived sizing constants, computed once per index
#[derive(Debug, Clone, Copy)]
pub struct NodeLayout {
    /// B-tree branching parameter
    pub degree: usize,
    /// `2 * degree - 1`
    pub max_entries: usize,
    /// `2 * degree`
    pub max_children: usize,
    /// Index of the median entry in a full node: `degree - 1`
    pub median: usize,
    /// Serialized checkpoint width: location + timestamp + rank
    pub checkpoint_size: usize,
    /// Total node width on disk
    pub node_size: usize,
}

impl NodeLayout {
    /// Derive the layout from the branching degree and the codec's
    /// location width
    pub fn new(degree: usize, location_size: usize) -> Self {
        assert!(degree >= 2, "B-tree degree must be at least 2");

        let max_entries = 2 * degree - 1;
        let max_children = 2 * degree;
        let checkpoint_size = location_size + 16;
        let node_size = 4 + checkpoint_size * max_entries + 8 * max_children;

        Self {
            degree,
            max_entries,
            max_children,
            median: degree - 1,
            checkpoint_size,
            node_size,
        }
    }
}

/// In-memory copy of one on-disk node
///
/// Entries are kept sorted ascending by timestamp with empties trailing;
/// a node with `k` entries has `k + 1` meaningful child pointers. The
/// offset is the node's identity and never changes.
#[derive(Debug)]
pub struct Node<L> {
    offset: i64,
    entries: Vec<Option<Checkpoint<L>>>,
    children: Vec<i64>,
    dirty: bool,
}

impl<L: Clone> Node<L> {
    /// Create an empty node at the given file offset
    ///
    /// Fresh nodes start dirty so a newly allocated (even still-empty)
    /// node reaches disk on the next flush.
    pub fn new(offset: i64, layout: &NodeLayout) -> Self {
        Self {
            offset,
            entries: vec![None; layout.max_entries],
            children: vec![NULL_OFFSET; layout.max_children],
            dirty: true,
        }
    }

    pub fn offset(&self) -> i64 {
        self.offset
    }

    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// True when the last entry slot is occupied
    pub fn is_full(&self) -> bool {
        self.entries.last().map(Option::is_some).unwrap_or(false)
    }

    pub fn entry(&self, index: usize) -> Option<&Checkpoint<L>> {
        self.entries[index].as_ref()
    }

    /// Store or clear an entry slot and mark the node dirty
    pub fn set_entry(&mut self, index: usize, entry: Option<Checkpoint<L>>) {
        self.entries[index] = entry;
        self.dirty = true;
    }

    /// Take an entry out of a slot, marking the node dirty
    pub fn take_entry(&mut self, index: usize) -> Option<Checkpoint<L>> {
        self.dirty = true;
        self.entries[index].take()
    }

    pub fn child(&self, index: usize) -> i64 {
        self.children[index]
    }

    pub fn set_child(&mut self, index: usize, offset: i64) {
        self.children[index] = offset;
        self.dirty = true;
    }

    /// Number of occupied entry slots (empties only ever trail)
    pub fn entry_count(&self) -> usize {
        self.entries.iter().take_while(|e| e.is_some()).count()
    }

    /// Read this node's block from disk, replacing in-memory state
    pub fn read<C>(&mut self, file: &mut File, codec: &C, layout: &NodeLayout) -> IndexResult<()>
    where
        C: LocationCodec<Location = L>,
    {
        file.seek(SeekFrom::Start(self.offset as u64))?;
        let mut buf = vec![0u8; layout.node_size];
        file.read_exact(&mut buf)?;

        for i in 0..layout.max_children {
            let at = i * 8;
            self.children[i] = i64::from_le_bytes(buf[at..at + 8].try_into().unwrap());
        }

        let count_at = layout.max_children * 8;
        let count = i32::from_le_bytes(buf[count_at..count_at + 4].try_into().unwrap());
        if count < 0 || count as usize > layout.max_entries {
            return Err(IndexError::Corrupt(format!(
                "node at offset {} claims {} entries (max {})",
                self.offset, count, layout.max_entries
            )));
        }

        let mut at = count_at + 4;
        for i in 0..layout.max_entries {
            if i < count as usize {
                let entry = read_checkpoint(codec, &buf[at..at + layout.checkpoint_size])?;
                self.entries[i] = Some(entry);
                at += layout.checkpoint_size;
            } else {
                self.entries[i] = None;
            }
        }

        self.dirty = false;
        Ok(())
    }

    /// Write this node's block to disk
    pub fn write<C>(&mut self, file: &mut File, codec: &C, layout: &NodeLayout) -> IndexResult<()>
    where
        C: LocationCodec<Location = L>,
    {
        let mut buf = vec![0u8; layout.node_size];

        for (i, child) in self.children.iter().enumerate() {
            buf[i * 8..i * 8 + 8].copy_from_slice(&child.to_le_bytes());
        }

        let count = self.entry_count();
        let count_at = layout.max_children * 8;
        buf[count_at..count_at + 4].copy_from_slice(&(count as i32).to_le_bytes());

        let mut at = count_at + 4;
        for entry in self.entries.iter().flatten() {
            write_checkpoint(codec, entry, &mut buf[at..at + layout.checkpoint_size]);
            at += layout.checkpoint_size;
        }

        file.seek(SeekFrom::Start(self.offset as u64))?;
        file.write_all(&buf)?;

        self.dirty = false;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::location::ByteOffsetCodec;
    use tempfile::tempfile;

    fn layout() -> NodeLayout {
        NodeLayout::new(2, ByteOffsetCodec.size())
    }

    #[test]
    fn test_layout_arithmetic() {
        let layout = layout();
        assert_eq!(layout.max_entries, 3);
        assert_eq!(layout.max_children, 4);
        assert_eq!(layout.median, 1);
        assert_eq!(layout.checkpoint_size, 24);
        // 4 + 24*3 + 8*4
        assert_eq!(layout.node_size, 108);
    }

    #[test]
    fn test_entry_count_and_fullness() {
        let layout = layout();
        let mut node = Node::new(44, &layout);
        assert_eq!(node.entry_count(), 0);
        assert!(!node.is_full());

        node.set_entry(0, Some(Checkpoint::new(10, 0u64, 0)));
        node.set_entry(1, Some(Checkpoint::new(20, 8u64, 1)));
        assert_eq!(node.entry_count(), 2);
        assert!(!node.is_full());

        node.set_entry(2, Some(Checkpoint::new(30, 16u64, 2)));
        assert!(node.is_full());
    }

    #[test]
    fn test_set_entry_marks_dirty() {
        let layout = layout();
        let mut file = tempfile().unwrap();
        let mut node = Node::new(0, &layout);

        node.write(&mut file, &ByteOffsetCodec, &layout).unwrap();
        assert!(!node.is_dirty());

        node.set_entry(0, Some(Checkpoint::new(10, 0u64, 0)));
        assert!(node.is_dirty());

        node.write(&mut file, &ByteOffsetCodec, &layout).unwrap();
        assert!(!node.is_dirty());

        node.set_child(1, 152);
        assert!(node.is_dirty());
    }

    #[test]
    fn test_node_disk_roundtrip() {
        let layout = layout();
        let codec = ByteOffsetCodec;
        let mut file = tempfile().unwrap();

        let mut node = Node::new(44, &layout);
        node.set_entry(0, Some(Checkpoint::new(100, 4096u64, 0)));
        node.set_entry(1, Some(Checkpoint::new(200, 8192u64, 1)));
        node.set_child(0, 152);
        node.set_child(1, 260);
        node.set_child(2, 368);
        node.write(&mut file, &codec, &layout).unwrap();

        let mut restored: Node<u64> = Node::new(44, &layout);
        restored.read(&mut file, &codec, &layout).unwrap();

        assert!(!restored.is_dirty());
        assert_eq!(restored.entry_count(), 2);
        assert_eq!(restored.entry(0), Some(&Checkpoint::new(100, 4096, 0)));
        assert_eq!(restored.entry(1), Some(&Checkpoint::new(200, 8192, 1)));
        assert_eq!(restored.entry(2), None);
        assert_eq!(restored.child(0), 152);
        assert_eq!(restored.child(1), 260);
        assert_eq!(restored.child(2), 368);
        assert_eq!(restored.child(3), NULL_OFFSET);
    }

    #[test]
    fn test_node_rejects_bad_entry_count() {
        let layout = layout();
        let codec = ByteOffsetCodec;
        let mut file = tempfile().unwrap();

        let mut node: Node<u64> = Node::new(0, &layout);
        node.write(&mut file, &codec, &layout).unwrap();

        // Overwrite the count field with an impossible value
        let count_at = layout.max_children as u64 * 8;
        file.seek(SeekFrom::Start(count_at)).unwrap();
        file.write_all(&(99i32).to_le_bytes()).unwrap();

        let mut restored: Node<u64> = Node::new(0, &layout);
        assert!(matches!(
            restored.read(&mut file, &codec, &layout),
            Err(IndexError::Corrupt(_))
        ));
    }
}
