//! Scan stage: exclusive prefix over the reduced table, then scan-and-add
//! back down through the partial histogram table.
//!
//! After both steps, `sum_table[bin * num_groups + group]` holds the exact
//! destination-buffer index where the first key with digit `bin` produced by
//! `group` must land. Offsets start fresh at 0 for bin 0 every pass; nothing
//! carries across digit passes.

use rayon::prelude::*;

use crate::arena::SharedTable;
use crate::plan::DispatchPlan;
use crate::{SortError, BLOCK_SIZE};

/// Exclusive prefix sum over the reduced table, bin-major, in place.
///
/// The reduced table fits one group's scan capacity, so this runs as a
/// single logical group.
pub fn scan_prefix(plan: &DispatchPlan, reduced: &mut [u32]) -> Result<(), SortError> {
    let num_scan_values = plan.num_scan_values as usize;
    if reduced.len() < num_scan_values {
        return Err(SortError::ScratchTooSmall {
            needed: num_scan_values,
            available: reduced.len(),
        });
    }

    let mut running = 0u32;
    for value in reduced[..num_scan_values].iter_mut() {
        let count = *value;
        *value = running;
        running += count;
    }

    Ok(())
}

/// Scan-and-add: exclusively scan each `BLOCK_SIZE`-entry segment of the
/// partial histogram table in place, biased by the segment's scanned
/// reduced-table entry. Converts every partial count into a global base
/// offset.
pub fn scan_add(
    plan: &DispatchPlan,
    sum_table: &mut [u32],
    reduced: &[u32],
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
    let table = SharedTable::new(sum_table);

    (0..num_scan_values).into_par_iter().for_each(|i| {
        let bin = i / per_bin;
        let segment = i % per_bin;
        let first = bin * num_groups + segment * BLOCK_SIZE;
        let last = bin * num_groups + ((segment + 1) * BLOCK_SIZE).min(num_groups);

        let mut running = reduced[i];
        for idx in first..last {
            // SAFETY: segments partition the table; only this reduce group
            // touches [first, last).
            unsafe {
                let count = table.get(idx);
                table.write(idx, running);
                running += count;
            }
        }
    });

    Ok(())
}
