//! Internal conversion helpers.
//!
//! Pixel-data copying out of FFmpeg frames and timestamp conversions
//! between milliseconds, stream time bases, and `AV_TIME_BASE`.

use ffmpeg_next::{Rational, frame::Video as VideoFrame};

/// Bytes per pixel of an RGB24 frame.
const RGB24_BYTES_PER_PIXEL: usize = 3;

/// Pack the rows of a scaled RGB24 frame into one contiguous buffer,
/// dropping FFmpeg's per-row padding.
///
/// A frame with less data than `width`×`height` yields a short buffer; the
/// caller rejects it when building the image.
pub(crate) fn packed_rgb24(rgb_frame: &VideoFrame, width: u32, height: u32) -> Vec<u8> {
    let row_length = width as usize * RGB24_BYTES_PER_PIXEL;
    let stride = rgb_frame.stride(0).max(1);
    rgb_frame
        .data(0)
        .chunks(stride)
        .take(height as usize)
        .flat_map(|row| row.get(..row_length).unwrap_or(row))
        .copied()
        .collect()
}

/// Convert milliseconds on the stream clock to a container-level seek
/// timestamp.
///
/// `Input::seek` with no stream index expects `AV_TIME_BASE` units
/// (microseconds).
pub(crate) fn milliseconds_to_seek_timestamp(milliseconds: u64) -> i64 {
    i64::try_from(milliseconds.saturating_mul(1000)).unwrap_or(i64::MAX)
}

/// Rescale a PTS value from the stream time base to whole milliseconds.
///
/// Negative timestamps (pre-roll, or FFmpeg's "no value" marker) clamp to
/// zero.
pub(crate) fn pts_to_milliseconds(pts: i64, time_base: Rational) -> u64 {
    let denominator = i128::from(time_base.denominator());
    if denominator == 0 || pts <= 0 {
        return 0;
    }
    let milliseconds = i128::from(pts) * i128::from(time_base.numerator()) * 1000 / denominator;
    u64::try_from(milliseconds).unwrap_or(0)
}
