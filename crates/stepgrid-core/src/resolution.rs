//! Mapping between logical (display) steps and storage cells.
//!
//! Notes are always stored at [`BASE_RESOLUTION`] cells per bar. The grid the
//! user sees is quantized to `steps_per_bar`, one of
//! [`SUPPORTED_STEPS_PER_BAR`]. Every supported value divides the base
//! resolution evenly, so the mapping is exact integer arithmetic.

use std::ops::Range;

/// Storage cells per bar
pub const BASE_RESOLUTION: usize = 128;

/// Display resolutions, ascending
pub const SUPPORTED_STEPS_PER_BAR: [u32; 4] = [8, 16, 32, 64];

pub const DEFAULT_STEPS_PER_BAR: u32 = 16;

/// Snap an arbitrary value to the nearest supported steps-per-bar.
///
/// Ties go to the smaller value.
pub fn coerce_steps_per_bar(steps_per_bar: u32) -> u32 {
    let mut best = SUPPORTED_STEPS_PER_BAR[0];
    let mut best_dist = u32::MAX;
    for &candidate in &SUPPORTED_STEPS_PER_BAR {
        let dist = candidate.abs_diff(steps_per_bar);
        if dist < best_dist {
            best = candidate;
            best_dist = dist;
        }
    }
    best
}

/// Storage cells covered by one logical step
pub fn storage_per_step(steps_per_bar: u32) -> usize {
    BASE_RESOLUTION / coerce_steps_per_bar(steps_per_bar) as usize
}

pub fn logical_to_storage(step: usize, steps_per_bar: u32) -> usize {
    step * storage_per_step(steps_per_bar)
}

pub fn storage_to_logical(index: usize, steps_per_bar: u32) -> usize {
    index / storage_per_step(steps_per_bar)
}

/// Storage range covered by `length` logical steps starting at `step`.
/// Saturates instead of overflowing; callers clamp to the grid.
pub fn logical_range(step: usize, length: usize, steps_per_bar: u32) -> Range<usize> {
    let per_step = storage_per_step(steps_per_bar);
    step.saturating_mul(per_step)..step.saturating_add(length).saturating_mul(per_step)
}

/// Storage columns for a loop of `bars` bars
pub fn storage_steps(bars: u32) -> usize {
    bars as usize * BASE_RESOLUTION
}

/// Logical columns for a loop of `bars` bars
pub fn logical_steps(bars: u32, steps_per_bar: u32) -> usize {
    bars as usize * coerce_steps_per_bar(steps_per_bar) as usize
}
