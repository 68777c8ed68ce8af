//! Video opening and frame extraction.
//!
//! [`VideoFile`] opens a file with FFmpeg, caches its [`VideoMetadata`], and
//! decodes single frames at millisecond timestamps, scaled straight to the
//! requested thumbnail size. The [`FrameSource`] trait is the seam the
//! screenlist driver works against, so any other frame provider can be
//! plugged in.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::Path,
};

use ffmpeg_next::{
    codec::context::Context as CodecContext,
    format::{Pixel, context::Input},
    frame::Video as VideoFrame,
    media::Type,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};
use image::{DynamicImage, RgbImage};

use crate::{conversion, error::ScreengenError, metadata::VideoMetadata};

/// A provider of decoded, scaled video frames.
pub trait FrameSource {
    /// Metadata of the underlying video.
    fn metadata(&self) -> &VideoMetadata;

    /// Decode the frame shown at `timestamp_ms`, scaled to exactly
    /// `width`×`height`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::FrameExtraction`] when no frame can be
    /// produced at that position.
    fn frame_at(
        &mut self,
        timestamp_ms: u64,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ScreengenError>;
}

/// An opened video file.
///
/// Created via [`VideoFile::open`]; holds the FFmpeg demuxer context for its
/// whole lifetime and releases it on drop.
///
/// # Example
///
/// ```no_run
/// use screengen::{FrameSource, VideoFile};
///
/// let mut video = VideoFile::open("input.mp4")?;
/// let frame = video.frame_at(10_000, 256, 144)?;
/// # Ok::<(), screengen::ScreengenError>(())
/// ```
pub struct VideoFile {
    input_context: Input,
    video_stream_index: usize,
    start_time_ms: u64,
    metadata: VideoMetadata,
}

impl Debug for VideoFile {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("VideoFile")
            .field("metadata", &self.metadata)
            .field("video_stream_index", &self.video_stream_index)
            .field("start_time_ms", &self.start_time_ms)
            .finish_non_exhaustive()
    }
}

impl VideoFile {
    /// Open a video file and read its metadata.
    ///
    /// Initializes FFmpeg (idempotent), opens the file, and picks the best
    /// video and audio streams.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::FileOpen`] if the file cannot be opened or
    /// its codec parameters cannot be read, and
    /// [`ScreengenError::NoVideoStream`] if it has no video.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, ScreengenError> {
        let path = path.as_ref();
        let open_error = |reason: String| ScreengenError::FileOpen {
            path: path.to_path_buf(),
            reason,
        };

        ffmpeg_next::init()
            .map_err(|error| open_error(format!("FFmpeg initialisation failed: {error}")))?;

        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| open_error(error.to_string()))?;

        let video_stream = input_context
            .streams()
            .best(Type::Video)
            .ok_or(ScreengenError::NoVideoStream)?;
        let video_stream_index = video_stream.index();
        // Stream timestamps may begin well above zero (MPEG-TS); an unset
        // start clamps to zero.
        let start_time_ms =
            conversion::pts_to_milliseconds(video_stream.start_time(), video_stream.time_base());
        let video_parameters = video_stream.parameters();
        let video_codec = codec_long_name(&video_parameters);
        let video_decoder = CodecContext::from_parameters(video_parameters)
            .and_then(|context| context.decoder().video())
            .map_err(|error| open_error(format!("Failed to create video decoder: {error}")))?;

        let audio_codec = input_context
            .streams()
            .best(Type::Audio)
            .map(|stream| codec_long_name(&stream.parameters()))
            .unwrap_or_default();

        // Container duration is in AV_TIME_BASE (microseconds).
        let duration_ms = u64::try_from(input_context.duration()).unwrap_or(0) / 1000;

        let metadata = VideoMetadata {
            path: path.to_path_buf(),
            duration_ms,
            width: video_decoder.width(),
            height: video_decoder.height(),
            video_codec,
            audio_codec,
        };
        log::debug!("Opened {}: {metadata:?}", path.display());

        Ok(Self {
            input_context,
            video_stream_index,
            start_time_ms,
            metadata,
        })
    }

    /// Decode forward from a seek point and return the first frame at or
    /// after `timestamp_ms`, or the last frame of the stream.
    ///
    /// `timestamp_ms` counts from the start of the video; packet timestamps
    /// count from the stream clock's origin, `start_time_ms` earlier.
    fn decode_frame_at(
        &mut self,
        timestamp_ms: u64,
        width: u32,
        height: u32,
    ) -> Result<Option<DynamicImage>, ScreengenError> {
        let stream = self
            .input_context
            .stream(self.video_stream_index)
            .ok_or(ScreengenError::NoVideoStream)?;
        let time_base = stream.time_base();
        let decoder_context = CodecContext::from_parameters(stream.parameters())?;
        let mut decoder = decoder_context.decoder().video()?;

        let mut scaler = ScalingContext::get(
            decoder.format(),
            decoder.width(),
            decoder.height(),
            Pixel::RGB24,
            width,
            height,
            ScalingFlags::BILINEAR,
        )?;

        // Seek to the keyframe at or before the target.
        let target_pts_ms = timestamp_ms.saturating_add(self.start_time_ms);
        let seek_target = conversion::milliseconds_to_seek_timestamp(target_pts_ms);
        self.input_context.seek(seek_target, ..seek_target)?;

        let mut decoded_frame = VideoFrame::empty();
        let mut rgb_frame = VideoFrame::empty();
        let mut have_frame = false;

        for (stream, packet) in self.input_context.packets() {
            if stream.index() != self.video_stream_index {
                continue;
            }

            decoder.send_packet(&packet)?;

            while decoder.receive_frame(&mut decoded_frame).is_ok() {
                scaler.run(&decoded_frame, &mut rgb_frame)?;
                have_frame = true;

                let pts = decoded_frame.timestamp().unwrap_or(0);
                if conversion::pts_to_milliseconds(pts, time_base) >= target_pts_ms {
                    return convert_frame_to_image(&rgb_frame, width, height).map(Some);
                }
            }
        }

        decoder.send_eof()?;
        while decoder.receive_frame(&mut decoded_frame).is_ok() {
            scaler.run(&decoded_frame, &mut rgb_frame)?;
            have_frame = true;

            let pts = decoded_frame.timestamp().unwrap_or(0);
            if conversion::pts_to_milliseconds(pts, time_base) >= target_pts_ms {
                break;
            }
        }

        if have_frame {
            convert_frame_to_image(&rgb_frame, width, height).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl FrameSource for VideoFile {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn frame_at(
        &mut self,
        timestamp_ms: u64,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ScreengenError> {
        let extraction_error = |reason: String| ScreengenError::FrameExtraction {
            timestamp_ms,
            reason,
        };

        if width == 0 || height == 0 {
            return Err(extraction_error(format!(
                "Invalid target size {width}x{height}"
            )));
        }

        log::debug!("Extracting frame at {timestamp_ms} ms ({width}x{height})");
        match self.decode_frame_at(timestamp_ms, width, height) {
            Ok(Some(image)) => Ok(image),
            Ok(None) => Err(extraction_error(
                "No frame could be decoded from the video stream".to_string(),
            )),
            Err(error) => Err(extraction_error(error.to_string())),
        }
    }
}

fn codec_long_name(parameters: &ffmpeg_next::codec::Parameters) -> String {
    ffmpeg_next::codec::decoder::find(parameters.id())
        .map(|codec| codec.description().to_string())
        .unwrap_or_else(|| parameters.id().name().to_string())
}

/// Convert a scaled RGB24 video frame to an [`image::DynamicImage`].
fn convert_frame_to_image(
    rgb_frame: &VideoFrame,
    width: u32,
    height: u32,
) -> Result<DynamicImage, ScreengenError> {
    let buffer = conversion::packed_rgb24(rgb_frame, width, height);
    let rgb_image = RgbImage::from_raw(width, height, buffer).ok_or_else(|| {
        ScreengenError::FfmpegError(
            "Failed to construct RGB image from decoded frame data".to_string(),
        )
    })?;
    Ok(DynamicImage::ImageRgb8(rgb_image))
}
