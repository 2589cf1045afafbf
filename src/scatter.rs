//! Scatter stage.
//!
//! Each group re-walks exactly the block range it counted in the histogram
//! stage and writes every key to `offset[digit][group] + rank`, where rank
//! is the key's position among same-digit keys of the group, in encountered
//! order. The per-digit counter increments after each write, so equal digits
//! get consecutive, increasing destinations; combined with the planner's
//! strictly increasing block assignment and the scan stage's offsets, this
//! makes the whole sort stable.
//!
//! The offset table partitions the destination buffer: no two groups ever
//! write the same slot, so groups run fully in parallel with no
//! synchronization.

use rayon::prelude::*;

use crate::arena::SharedTable;
use crate::plan::DispatchPlan;
use crate::{digit, SortError, BIN_COUNT};

/// Scatter keys into `dst` for the digit selected by `shift`.
pub fn scatter(
    plan: &DispatchPlan,
    shift: u32,
    src: &[u32],
    dst: &mut [u32],
    offset_table: &[u32],
) -> Result<(), SortError> {
    validate(plan, src.len(), dst.len(), offset_table.len())?;

    let keys_out = SharedTable::new(dst);
    run_groups(plan, shift, src, offset_table, |src_idx, dst_idx| {
        // SAFETY: the offset table assigns each destination slot to exactly
        // one (group, digit, rank) triple.
        unsafe { keys_out.write(dst_idx, src[src_idx]) };
    });

    Ok(())
}

/// Scatter keys and their paired payloads for the digit selected by `shift`.
pub fn scatter_pairs(
    plan: &DispatchPlan,
    shift: u32,
    src_keys: &[u32],
    src_payloads: &[u32],
    dst_keys: &mut [u32],
    dst_payloads: &mut [u32],
    offset_table: &[u32],
) -> Result<(), SortError> {
    if src_keys.len() != src_payloads.len() || dst_keys.len() != dst_payloads.len() {
        return Err(SortError::LengthMismatch {
            keys: src_keys.len(),
            payloads: src_payloads.len(),
        });
    }
    validate(plan, src_keys.len(), dst_keys.len(), offset_table.len())?;

    let keys_out = SharedTable::new(dst_keys);
    let payloads_out = SharedTable::new(dst_payloads);
    run_groups(plan, shift, src_keys, offset_table, |src_idx, dst_idx| {
        // SAFETY: same disjoint-slot argument as the keys-only path; the
        // payload buffer uses identical indices.
        unsafe {
            keys_out.write(dst_idx, src_keys[src_idx]);
            payloads_out.write(dst_idx, src_payloads[src_idx]);
        }
    });

    Ok(())
}

fn validate(
    plan: &DispatchPlan,
    src_len: usize,
    dst_len: usize,
    offset_len: usize,
) -> Result<(), SortError> {
    let num_keys = plan.num_keys as usize;
    if src_len < num_keys || dst_len < num_keys {
        return Err(SortError::InvalidInput("key buffer shorter than plan"));
    }
    if offset_len < plan.sum_table_len() {
        return Err(SortError::ScratchTooSmall {
            needed: plan.sum_table_len(),
            available: offset_len,
        });
    }
    Ok(())
}

/// Walk every group's key range in increasing index order, emitting
/// `(src_idx, dst_idx)` per key.
///
/// Within a group the local per-digit rank comes from 16 running counters
/// seeded from the offset table. On the GPU the rank is produced by a
/// cooperative exclusive scan over the lanes per block slice; the slices are
/// visited in increasing index order there too, so the serialized walk
/// assigns identical destinations.
fn run_groups(
    plan: &DispatchPlan,
    shift: u32,
    src: &[u32],
    offset_table: &[u32],
    emit: impl Fn(usize, usize) + Sync,
) {
    let num_groups = plan.num_groups as usize;

    (0..plan.num_groups).into_par_iter().for_each(|group| {
        let mut next_dst = [0u32; BIN_COUNT];
        for (bin, slot) in next_dst.iter_mut().enumerate() {
            *slot = offset_table[bin * num_groups + group as usize];
        }

        for src_idx in plan.key_range(group) {
            let bin = digit(src[src_idx], shift);
            emit(src_idx, next_dst[bin] as usize);
            next_dst[bin] += 1;
        }
    });
}
