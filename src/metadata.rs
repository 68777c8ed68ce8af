//! Video metadata shown in the screenlist header.
//!
//! Metadata is read once when a [`VideoFile`](crate::VideoFile) is opened and
//! cached for its lifetime.

use std::path::PathBuf;

/// Properties of an opened video.
///
/// # Example
///
/// ```no_run
/// use screengen::{FrameSource, VideoFile};
///
/// let video = VideoFile::open("input.mp4")?;
/// let metadata = video.metadata();
/// println!("{} ms, {}x{}", metadata.duration_ms, metadata.width, metadata.height);
/// # Ok::<(), screengen::ScreengenError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct VideoMetadata {
    /// Path the video was opened from, as given by the caller.
    pub path: PathBuf,
    /// Container duration in whole milliseconds.
    pub duration_ms: u64,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Long codec name of the video stream (e.g. `"H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10"`).
    pub video_codec: String,
    /// Long codec name of the best audio stream, or an empty string when
    /// the file has no audio.
    pub audio_codec: String,
}
