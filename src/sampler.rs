//! Thumbnail time sampling.
//!
//! Screenlists sample the video at a fixed stride: the duration is divided
//! into `count` equal slots (rounding the slot length down to a whole
//! millisecond) and the start of each slot is used. The first thumbnail is
//! always the very first frame.

/// Compute `count` evenly spaced timestamps, in milliseconds, over
/// `[0, duration_ms)`.
///
/// `t_i = i × ⌊duration_ms / count⌋`. When the duration is shorter than
/// `count` milliseconds the stride is zero and every timestamp is `0`;
/// duplicates are left to the frame source.
///
/// Returns an empty schedule when `count` is zero.
///
/// # Example
///
/// ```
/// use screengen::sampler::sample_timestamps;
///
/// assert_eq!(sample_timestamps(270_000, 3), vec![0, 90_000, 180_000]);
/// ```
pub fn sample_timestamps(duration_ms: u64, count: u32) -> Vec<u64> {
    if count == 0 {
        return Vec::new();
    }
    let stride = duration_ms / u64::from(count);
    (0..u64::from(count)).map(|index| index * stride).collect()
}
