//! Floor-search visitor
//!
//! Comparator-driven traversal state for locating the checkpoint with the
//! greatest rank at or before a queried timestamp. The `compare` method
//! is both the binary-search key function and the best-floor-candidate
//! accumulator; the two update together per comparison so results stay
//! consistent with the early exit the tree takes on an exact match.

use crate::index::checkpoint::{Checkpoint, Timestamp};
use crate::index::SearchResult;
use std::cmp::Ordering;

/// Running best-match state for one floor search
#[derive(Debug)]
pub struct FloorVisitor<L> {
    query: Timestamp,
    /// Rank of the best floor candidate so far; -1 before any match
    rank: i64,
    found: Option<Checkpoint<L>>,
    exact: bool,
}

impl<L: Clone> FloorVisitor<L> {
    pub fn new(query: Timestamp) -> Self {
        Self {
            query,
            rank: -1,
            found: None,
            exact: false,
        }
    }

    /// Order `entry` against the query, remembering it when it is at or
    /// before the query
    ///
    /// During descent, entries at or before the query are probed in
    /// increasing timestamp order, so the last one remembered is the
    /// floor. Once an exact match latches, the candidate stops moving.
    pub fn compare(&mut self, entry: &Checkpoint<L>) -> Ordering {
        let ordering = entry.timestamp.cmp(&self.query);
        if ordering != Ordering::Greater && !self.exact {
            self.rank = entry.rank as i64;
            self.found = Some(entry.clone());
            if ordering == Ordering::Equal {
                self.exact = true;
            }
        }
        ordering
    }

    /// True once an entry with exactly the queried timestamp was seen
    pub fn is_exact(&self) -> bool {
        self.exact
    }

    /// The greatest checkpoint at or before the query, if any
    pub fn floor(&self) -> Option<&Checkpoint<L>> {
        self.found.as_ref()
    }

    /// Fold the final state into a rank-or-insertion-point result
    pub fn result(&self) -> SearchResult {
        if self.exact {
            Ok(self.rank as u64)
        } else {
            // First stored checkpoint after the query sits right past the
            // floor; with no floor the insertion point is 0
            Err((self.rank + 1) as u64)
        }
    }
}
