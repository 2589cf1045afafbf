//! Dispatch planning: pure arithmetic, no parallelism.
//!
//! Given a key count and a worker-group budget, decide how the key range
//! partitions into fixed-size blocks, how blocks are assigned to groups, and
//! how much scratch the pipeline needs. Every stage dispatch in a digit pass
//! is parameterized by one [`DispatchPlan`].

use crate::{SortError, BIN_COUNT, BLOCK_SIZE};

/// Read-only configuration for one digit pass.
///
/// Groups are assigned contiguous block ranges in strictly increasing index
/// order; the `num_groups_with_extra_block` groups at the *high* end of the
/// index range each process one extra block. The scatter stage's offset
/// arithmetic depends on the extra groups being contiguous at the high end,
/// so this assignment must not be changed to round-robin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DispatchPlan {
    /// Number of keys being sorted.
    pub num_keys: u32,
    /// Blocks each non-extra group processes.
    pub blocks_per_group: u32,
    /// Worker groups dispatched per stage. Never exceeds the requested
    /// budget, and never exceeds the block count (no idle groups).
    pub num_groups: u32,
    /// How many groups (the last ones by index) process one extra block.
    pub num_groups_with_extra_block: u32,
    /// Reduction segments per bin: how many partial-sum entries get combined
    /// into each reduced-table entry row.
    pub num_reduce_groups_per_bin: u32,
    /// Entries in the reduced table, and the length of the single-group
    /// prefix scan (`BIN_COUNT * num_reduce_groups_per_bin`).
    pub num_scan_values: u32,
}

impl DispatchPlan {
    /// Plan one digit pass for `num_keys` keys under a budget of
    /// `max_groups` worker groups.
    pub fn new(num_keys: usize, max_groups: u32) -> Result<Self, SortError> {
        if num_keys == 0 {
            return Err(SortError::InvalidInput("number of keys must be nonzero"));
        }
        if num_keys > u32::MAX as usize {
            return Err(SortError::CapacityExceeded { num_keys });
        }
        if max_groups == 0 {
            return Err(SortError::InvalidInput("worker group budget must be nonzero"));
        }

        let num_blocks = num_keys.div_ceil(BLOCK_SIZE) as u32;

        let (num_groups, blocks_per_group, extra) = if num_blocks < max_groups {
            // Fewer blocks than budget: one block per group, no idle groups.
            (num_blocks, 1, 0)
        } else {
            (max_groups, num_blocks / max_groups, num_blocks % max_groups)
        };

        // One reduced entry per BLOCK_SIZE partial counts within a bin. The
        // reduced table is scanned by a single group, so it must fit one
        // group's scan capacity.
        let num_reduce_groups_per_bin = if BLOCK_SIZE as u32 > num_groups {
            1
        } else {
            num_groups.div_ceil(BLOCK_SIZE as u32)
        };
        let num_scan_values = BIN_COUNT as u32 * num_reduce_groups_per_bin;
        if num_scan_values > BLOCK_SIZE as u32 {
            return Err(SortError::InvalidInput(
                "worker group budget too large for single-group scan",
            ));
        }

        Ok(Self {
            num_keys: num_keys as u32,
            blocks_per_group,
            num_groups,
            num_groups_with_extra_block: extra,
            num_reduce_groups_per_bin,
            num_scan_values,
        })
    }

    /// Total blocks covering the key range.
    pub fn num_blocks(&self) -> usize {
        (self.num_keys as usize).div_ceil(BLOCK_SIZE)
    }

    /// Index of the first group that carries an extra block.
    #[inline]
    pub(crate) fn first_extra_group(&self) -> u32 {
        self.num_groups - self.num_groups_with_extra_block
    }

    /// Starting key index and block count for `group`.
    ///
    /// Non-extra groups pack `blocks_per_group` blocks each from the bottom
    /// of the range; extra groups follow, offset by one additional block per
    /// extra group before them.
    pub fn group_assignment(&self, group: u32) -> (usize, usize) {
        debug_assert!(group < self.num_groups);
        let mut start_block = self.blocks_per_group as usize * group as usize;
        let mut blocks = self.blocks_per_group as usize;
        if group >= self.first_extra_group() {
            start_block += (group - self.first_extra_group()) as usize;
            blocks += 1;
        }
        (start_block * BLOCK_SIZE, blocks)
    }

    /// Key-index range `group` processes, clamped to the key count.
    pub fn key_range(&self, group: u32) -> std::ops::Range<usize> {
        let (start, blocks) = self.group_assignment(group);
        let end = (start + blocks * BLOCK_SIZE).min(self.num_keys as usize);
        start..end
    }

    /// Entries of the partial histogram table this plan touches.
    pub(crate) fn sum_table_len(&self) -> usize {
        BIN_COUNT * self.num_groups as usize
    }
}

/// Scratch-table sizing for a maximum key count.
///
/// The collaborator driving individual stage dispatches allocates two scratch
/// tables of `u32` counts up front: the partial histogram table and the
/// reduced histogram table. Both are sized once for the largest sort the
/// allocation will serve and reused across all passes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScratchLayout {
    /// Entries in the partial histogram table (`BIN_COUNT * num_blocks`).
    pub histogram_len: usize,
    /// Entries in the reduced table (`BIN_COUNT * num_reduced_blocks`).
    pub reduced_len: usize,
}

impl ScratchLayout {
    /// Compute scratch sizes for sorts of up to `max_keys` keys.
    pub fn for_max_keys(max_keys: usize) -> Result<Self, SortError> {
        if max_keys == 0 {
            return Err(SortError::InvalidInput("number of keys must be nonzero"));
        }
        if max_keys > u32::MAX as usize {
            return Err(SortError::CapacityExceeded { num_keys: max_keys });
        }
        let num_blocks = max_keys.div_ceil(BLOCK_SIZE);
        let num_reduced_blocks = num_blocks.div_ceil(BLOCK_SIZE);
        Ok(Self {
            histogram_len: BIN_COUNT * num_blocks,
            reduced_len: BIN_COUNT * num_reduced_blocks,
        })
    }

    /// Partial histogram table size in bytes.
    pub fn histogram_bytes(&self) -> usize {
        self.histogram_len * std::mem::size_of::<u32>()
    }

    /// Reduced table size in bytes.
    pub fn reduced_bytes(&self) -> usize {
        self.reduced_len * std::mem::size_of::<u32>()
    }
}
