//! Reduction stage.
//!
//! Sums segments of `BLOCK_SIZE` consecutive per-bin partial counts into one
//! reduced-table entry, bin-major (a segment never crosses a bin boundary).
//! One reduction level is enough: the planner caps the group count so the
//! reduced table fits a single group's scan.

use rayon::prelude::*;

use crate::plan::DispatchPlan;
use crate::{SortError, BLOCK_SIZE};

/// Reduce the partial histogram table into `reduced`, one entry per
/// (bin, reduce group) pair.
pub fn reduce(
    plan: &DispatchPlan,
    sum_table: &[u32],
    reduced: &mut [u32],
) -> Result<(), SortError> {
    if sum_table.len() < plan.sum_table_len() {
        return Err(SortError::ScratchTooSmall {
            needed: plan.sum_table_len(),
            available: sum_table.len(),
        });
    }
    let num_scan_values = plan.num_scan_values as usize;
    if reduced.len() < num_scan_values {
        return Err(SortError::ScratchTooSmall {
            needed: num_scan_values,
            available: reduced.len(),
        });
    }

    let num_groups = plan.num_groups as usize;
    let per_bin = plan.num_reduce_groups_per_bin as usize;

    reduced[..num_scan_values]
        .par_iter_mut()
        .enumerate()
        .for_each(|(i, out)| {
            let bin = i / per_bin;
            let segment = i % per_bin;
            let first = segment * BLOCK_SIZE;
            let last = ((segment + 1) * BLOCK_SIZE).min(num_groups);
            let row = &sum_table[bin * num_groups..(bin + 1) * num_groups];
            *out = row[first..last].iter().sum();
        });

    Ok(())
}
