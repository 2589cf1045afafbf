//! Histogram (count) stage.
//!
//! Each worker group walks its assigned block range and counts how many keys
//! fall into each 4-bit digit bin, then writes its 16 totals into the partial
//! histogram table at `sum_table[bin * num_groups + group]`. Groups touch
//! disjoint columns, so no cross-group synchronization happens here; the
//! table is consistent once the dispatch joins.

use rayon::prelude::*;

use crate::arena::{GroupHistogram, SharedTable};
use crate::plan::DispatchPlan;
use crate::{digit, SortError, BIN_COUNT, BLOCK_SIZE, ELEMENTS_PER_THREAD, GROUP_WIDTH};

/// Build the partial histogram table for the digit selected by `shift`.
pub fn count(
    plan: &DispatchPlan,
    shift: u32,
    src: &[u32],
    sum_table: &mut [u32],
) -> Result<(), SortError> {
    let num_keys = plan.num_keys as usize;
    if src.len() < num_keys {
        return Err(SortError::InvalidInput("source buffer shorter than plan"));
    }
    if sum_table.len() < plan.sum_table_len() {
        return Err(SortError::ScratchTooSmall {
            needed: plan.sum_table_len(),
            available: sum_table.len(),
        });
    }

    let num_groups = plan.num_groups as usize;
    let table = SharedTable::new(sum_table);

    (0..plan.num_groups).into_par_iter().for_each(|group| {
        let mut hist = GroupHistogram::new();
        let (group_start, num_blocks) = plan.group_assignment(group);

        let mut block_start = group_start;
        for _ in 0..num_blocks {
            // Each lane loads ELEMENTS_PER_THREAD keys at GROUP_WIDTH
            // stride. The striding is what hides load latency on the GPU;
            // the visitation order is irrelevant for counting.
            for lane in 0..GROUP_WIDTH {
                for element in 0..ELEMENTS_PER_THREAD {
                    let idx = block_start + element * GROUP_WIDTH + lane;
                    if idx < num_keys {
                        hist.add(digit(src[idx], shift), lane);
                    }
                }
            }
            block_start += BLOCK_SIZE;
        }

        // Lanes are done counting (barrier on the GPU); one lane per bin
        // totals that bin's row and publishes the group's partial count.
        for bin in 0..BIN_COUNT {
            // SAFETY: each group writes only its own column of the table.
            unsafe { table.write(bin * num_groups + group as usize, hist.bin_total(bin)) };
        }
    });

    Ok(())
}
