//! Error types for the `screengen` crate.
//!
//! This module defines [`ScreengenError`], the error type returned by every
//! fallible operation in the crate. Each variant corresponds to one stage of
//! screenlist generation (opening the video, extracting a frame, writing a
//! temporary thumbnail, stating the source file, running the compositor) and
//! carries enough context to be shown to the operator as is.

use std::{io::Error as IoError, path::PathBuf, process::ExitStatus};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for all `screengen` operations.
///
/// Every error is terminal for a run: nothing in the crate retries or
/// degrades to partial output.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScreengenError {
    /// The video file could not be opened or is not a recognised format.
    #[error("Failed to open video file at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::VideoFile::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The file does not contain a video stream.
    #[error("No video stream found in file")]
    NoVideoStream,

    /// No frame could be produced at the requested timestamp.
    #[error("Can't extract image at {timestamp_ms} ms: {reason}")]
    FrameExtraction {
        /// Requested timestamp in milliseconds.
        timestamp_ms: u64,
        /// Why the frame could not be produced.
        reason: String,
    },

    /// A thumbnail could not be written to its temporary file.
    #[error("Can't write thumbnail: {reason}")]
    Encoding {
        /// Underlying I/O or image encoder message.
        reason: String,
    },

    /// The source file could not be stat'ed for the size header.
    #[error("Can't get file size of {path}: {source}")]
    Stat {
        /// The source video path.
        path: PathBuf,
        /// The I/O error returned by the filesystem.
        source: IoError,
    },

    /// The compositor process could not be started.
    #[error("Failed to launch compositor `{program}`: {source}")]
    CompositorLaunch {
        /// Program that was executed.
        program: String,
        /// Spawn error.
        source: IoError,
    },

    /// The compositor ran but exited unsuccessfully.
    #[error("Compositor failed ({status}): {stderr}")]
    CompositionFailed {
        /// Exit status reported by the operating system.
        status: ExitStatus,
        /// Trimmed standard error output of the compositor.
        stderr: String,
    },

    /// A screenlist option is out of range.
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),
}

impl From<FfmpegError> for ScreengenError {
    fn from(error: FfmpegError) -> Self {
        ScreengenError::FfmpegError(error.to_string())
    }
}

impl From<ImageError> for ScreengenError {
    fn from(error: ImageError) -> Self {
        ScreengenError::Encoding {
            reason: error.to_string(),
        }
    }
}
