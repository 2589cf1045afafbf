//! Massively-parallel LSD radix sort over `u32` keys, optionally carrying a
//! 32-bit payload per key.
//!
//! The sort runs as a sequence of short, independent parallel passes over
//! large buffers rather than as one sequential algorithm. Each 4-bit digit of
//! the key gets one pass through a four-stage pipeline:
//!
//! 1. **Histogram** — every worker group counts digit occurrences over its
//!    assigned block range into a per-(bin, group) partial table.
//! 2. **Reduce** — partial counts are summed in segments of `BLOCK_SIZE`
//!    per-bin entries into a small reduced table.
//! 3. **Scan** — an exclusive prefix sum over the reduced table (bin-major),
//!    then a scan-and-add back down that turns every partial count into the
//!    global destination offset for that (bin, group) pair.
//! 4. **Scatter** — groups re-walk their block range and write each key (and
//!    payload) to `offset[digit] + rank`, preserving stability.
//!
//! Source and destination buffers ping-pong between passes; after the eighth
//! pass the sorted data is back in the original buffer.
//!
//! Worker groups never synchronize with each other inside a stage. Every
//! cross-group data dependency is resolved by the stage boundary: a stage's
//! parallel dispatch joins completely before the next stage starts. Groups
//! are modeled as rayon tasks, and the group-internal 128-lane structure is
//! executed serially inside each task (see [`arena`]).
//!
//! ```
//! use parasort::ParallelSorter;
//!
//! let mut sorter = ParallelSorter::new();
//! let mut data = vec![5u32, 3, 9, 1, 7];
//! sorter.sort_u32(&mut data).unwrap();
//! assert_eq!(data, vec![1, 3, 5, 7, 9]);
//! ```

pub mod arena;
pub mod histogram;
pub mod plan;
pub mod reduce;
pub mod scan;
pub mod scatter;

pub use plan::{DispatchPlan, ScratchLayout};

/// Bits of the key consumed per pass.
pub const BITS_PER_PASS: u32 = 4;

/// Number of digit bins (`2^BITS_PER_PASS`).
pub const BIN_COUNT: usize = 1 << BITS_PER_PASS;

/// Keys loaded per lane per block, at `GROUP_WIDTH` stride.
///
/// The strided load pattern in the histogram and scatter stages assumes this
/// exact value; changing it requires revisiting those loops.
pub const ELEMENTS_PER_THREAD: usize = 3;

/// Lanes per worker group.
pub const GROUP_WIDTH: usize = 128;

/// Keys per block: the unit of work assignment from the planner.
pub const BLOCK_SIZE: usize = ELEMENTS_PER_THREAD * GROUP_WIDTH;

/// Width of the keys being sorted.
pub const KEY_BITS: u32 = 32;

/// Digit passes needed to cover a full key.
pub const NUM_PASSES: u32 = KEY_BITS / BITS_PER_PASS;

/// Default worker-group budget for [`ParallelSorter`].
pub const DEFAULT_MAX_GROUPS: u32 = 800;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SortError {
    /// Zero keys, zero group budget, or a group budget whose scan workload
    /// would not fit a single group.
    #[error("invalid input: {0}")]
    InvalidInput(&'static str),
    /// A stage was handed a scratch table smaller than its plan requires.
    /// The caller must re-plan against the scratch it actually allocated.
    #[error("scratch table too small: stage needs {needed} entries, buffer holds {available}")]
    ScratchTooSmall { needed: usize, available: usize },
    /// Key count would overflow the 32-bit counters used for prefix sums.
    #[error("key count {num_keys} exceeds 32-bit counter capacity")]
    CapacityExceeded { num_keys: usize },
    #[error("length mismatch: keys={keys}, payloads={payloads}")]
    LengthMismatch { keys: usize, payloads: usize },
}

/// Extract the 4-bit digit examined during the pass with shift `shift`.
#[inline(always)]
pub(crate) fn digit(key: u32, shift: u32) -> usize {
    ((key >> shift) & (BIN_COUNT as u32 - 1)) as usize
}

/// Reusable sorter owning the ping-pong and scratch buffers.
///
/// Buffers are allocated on first use and grown on demand, so repeated sorts
/// (including smaller ones after a larger one) reuse the same allocations.
/// One `ParallelSorter` owns its scratch exclusively; concurrent sorts need
/// one sorter each.
pub struct ParallelSorter {
    max_groups: u32,
    keys_a: Vec<u32>,
    keys_b: Vec<u32>,
    vals_a: Vec<u32>,
    vals_b: Vec<u32>,
    sum_table: Vec<u32>,
    reduced_table: Vec<u32>,
    scratch_keys: usize,
}

impl Default for ParallelSorter {
    fn default() -> Self {
        Self::new()
    }
}

impl ParallelSorter {
    /// Create a sorter with the default group budget.
    pub fn new() -> Self {
        Self::with_max_groups(DEFAULT_MAX_GROUPS)
    }

    /// Create a sorter that dispatches at most `max_groups` worker groups
    /// per stage. The budget caps parallelism; correctness does not depend
    /// on it (a budget of 1 degenerates to a serial sort).
    pub fn with_max_groups(max_groups: u32) -> Self {
        Self {
            max_groups,
            keys_a: Vec::new(),
            keys_b: Vec::new(),
            vals_a: Vec::new(),
            vals_b: Vec::new(),
            sum_table: Vec::new(),
            reduced_table: Vec::new(),
            scratch_keys: 0,
        }
    }

    /// Sort a slice of `u32` keys ascending, in place.
    pub fn sort_u32(&mut self, data: &mut [u32]) -> Result<(), SortError> {
        if data.is_empty() {
            return Ok(());
        }
        let n = data.len();
        let plan = DispatchPlan::new(n, self.max_groups)?;
        self.ensure_buffers(n, false);
        self.keys_a[..n].copy_from_slice(data);
        self.run_passes(&plan, n, false)?;
        data.copy_from_slice(&self.keys_a[..n]);
        Ok(())
    }

    /// Sort `keys` ascending, in place, carrying `payloads` along: after the
    /// call, `payloads[i]` is the payload that accompanied `keys[i]` in the
    /// input. Ties keep their input order (the sort is stable).
    pub fn sort_pairs_u32(
        &mut self,
        keys: &mut [u32],
        payloads: &mut [u32],
    ) -> Result<(), SortError> {
        if keys.len() != payloads.len() {
            return Err(SortError::LengthMismatch {
                keys: keys.len(),
                payloads: payloads.len(),
            });
        }
        if keys.is_empty() {
            return Ok(());
        }
        let n = keys.len();
        let plan = DispatchPlan::new(n, self.max_groups)?;
        self.ensure_buffers(n, true);
        self.keys_a[..n].copy_from_slice(keys);
        self.vals_a[..n].copy_from_slice(payloads);
        self.run_passes(&plan, n, true)?;
        keys.copy_from_slice(&self.keys_a[..n]);
        payloads.copy_from_slice(&self.vals_a[..n]);
        Ok(())
    }

    /// Run the full digit-pass sequence over the internal ping-pong buffers.
    /// `NUM_PASSES` is even, so the sorted data ends up back in buffer A.
    fn run_passes(&mut self, plan: &DispatchPlan, n: usize, has_payload: bool) -> Result<(), SortError> {
        let Self {
            keys_a,
            keys_b,
            vals_a,
            vals_b,
            sum_table,
            reduced_table,
            ..
        } = self;

        let mut src_keys: &mut [u32] = &mut keys_a[..n];
        let mut dst_keys: &mut [u32] = &mut keys_b[..n];
        let (mut src_vals, mut dst_vals): (&mut [u32], &mut [u32]) = if has_payload {
            (&mut vals_a[..n], &mut vals_b[..n])
        } else {
            (Default::default(), Default::default())
        };

        for pass in 0..NUM_PASSES {
            let shift = pass * BITS_PER_PASS;

            // Each stage call joins all its groups before returning; that
            // join is the only cross-group synchronization in the pipeline.
            histogram::count(plan, shift, src_keys, sum_table)?;
            reduce::reduce(plan, sum_table, reduced_table)?;
            scan::scan_prefix(plan, reduced_table)?;
            scan::scan_add(plan, sum_table, reduced_table)?;
            if has_payload {
                scatter::scatter_pairs(
                    plan, shift, src_keys, src_vals, dst_keys, dst_vals, sum_table,
                )?;
                std::mem::swap(&mut src_vals, &mut dst_vals);
            } else {
                scatter::scatter(plan, shift, src_keys, dst_keys, sum_table)?;
            }
            std::mem::swap(&mut src_keys, &mut dst_keys);
        }

        Ok(())
    }

    fn ensure_buffers(&mut self, n: usize, has_payload: bool) {
        if self.keys_a.len() < n {
            self.keys_a.resize(n, 0);
            self.keys_b.resize(n, 0);
        }
        if has_payload && self.vals_a.len() < n {
            self.vals_a.resize(n, 0);
            self.vals_b.resize(n, 0);
        }
        if self.scratch_keys < n {
            // Planner guarantees num_keys <= u32::MAX here, so the layout
            // arithmetic cannot fail.
            let layout = ScratchLayout::for_max_keys(n).expect("validated key count");
            self.sum_table.resize(layout.histogram_len, 0);
            self.reduced_table.resize(layout.reduced_len, 0);
            self.scratch_keys = n;
        }
    }
}
