use std::ops::Range;

use serde::{Deserialize, Serialize};

/// A contiguous range of test items handed to a single worker.
///
/// This type is exchanged over the network as the worker's assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ShardSpec {
    pub start: usize,
    pub count: usize,
}

impl ShardSpec {
    pub fn new(start: usize, count: usize) -> Self {
        Self { start, count }
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// One past the last index of the shard, `None` if it overflows.
    #[inline]
    pub fn end(&self) -> Option<usize> {
        self.start.checked_add(self.count)
    }

    /// The indices covered by the shard, `None` if it overflows.
    #[inline]
    pub fn range(&self) -> Option<Range<usize>> {
        self.end().map(|end| self.start..end)
    }
}
