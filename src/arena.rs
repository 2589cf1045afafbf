//! Group-local shared memory emulation.
//!
//! On the GPU this algorithm keeps a 16-bin histogram in group-shared memory,
//! with each bin's counter spread across 128 lanes so concurrent lanes never
//! collide. Here a worker group is one rayon task, so the arena is a plain
//! array owned by the task: lane increments are serialized by construction
//! and the arena dies when the group's stage call returns. The lane layout is
//! kept so the per-bin totaling step reads the same way the kernel does.

use std::marker::PhantomData;

use crate::{BIN_COUNT, GROUP_WIDTH};

/// Per-group histogram arena: `BIN_COUNT` rows of `GROUP_WIDTH` lane
/// counters, bin-major.
pub struct GroupHistogram {
    counts: [u32; BIN_COUNT * GROUP_WIDTH],
}

impl GroupHistogram {
    pub fn new() -> Self {
        Self {
            counts: [0; BIN_COUNT * GROUP_WIDTH],
        }
    }

    /// Increment `bin`'s counter for `lane`.
    #[inline(always)]
    pub fn add(&mut self, bin: usize, lane: usize) {
        debug_assert!(bin < BIN_COUNT && lane < GROUP_WIDTH);
        self.counts[bin * GROUP_WIDTH + lane] += 1;
    }

    /// Sum one bin's lane counters into the group's total for that bin.
    pub fn bin_total(&self, bin: usize) -> u32 {
        self.counts[bin * GROUP_WIDTH..(bin + 1) * GROUP_WIDTH]
            .iter()
            .sum()
    }
}

impl Default for GroupHistogram {
    fn default() -> Self {
        Self::new()
    }
}

/// Shared view of a `u32` table that multiple worker groups write in
/// parallel.
///
/// Groups write disjoint slots: the histogram stage writes one column per
/// group, the scan-and-add stage rewrites one segment per reduce group, and
/// the scatter stage writes destination slots partitioned by the offset
/// table. The planner's coverage invariant is what makes the disjointness
/// hold, so every access goes through `unsafe` methods that state it.
pub(crate) struct SharedTable<'a, T> {
    ptr: *mut T,
    len: usize,
    _marker: PhantomData<&'a mut [T]>,
}

unsafe impl<T: Send> Send for SharedTable<'_, T> {}
unsafe impl<T: Send> Sync for SharedTable<'_, T> {}

impl<'a, T: Copy> SharedTable<'a, T> {
    pub fn new(slice: &'a mut [T]) -> Self {
        Self {
            ptr: slice.as_mut_ptr(),
            len: slice.len(),
            _marker: PhantomData,
        }
    }

    /// Write `value` at `idx`.
    ///
    /// # Safety
    /// `idx` must be in bounds and no other group may read or write `idx`
    /// during this stage.
    #[inline(always)]
    pub unsafe fn write(&self, idx: usize, value: T) {
        debug_assert!(idx < self.len);
        unsafe { *self.ptr.add(idx) = value }
    }

    /// Read the value at `idx`.
    ///
    /// # Safety
    /// `idx` must be in bounds and no other group may write `idx` during
    /// this stage.
    #[inline(always)]
    pub unsafe fn get(&self, idx: usize) -> T {
        debug_assert!(idx < self.len);
        unsafe { *self.ptr.add(idx) }
    }
}
