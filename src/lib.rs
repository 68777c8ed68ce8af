//! # screengen
//!
//! Make screenlists (contact sheets) from video files: a header with the
//! file name, size, duration, resolution and codecs, above a grid of
//! thumbnails taken at evenly spaced timestamps.
//!
//! Frames are decoded with FFmpeg through the
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next) crate and written to
//! temporary PNG files; the final image is drawn by ImageMagick's `convert`,
//! which receives the layout as a single argument list.
//!
//! ## Quick Start
//!
//! ```no_run
//! use screengen::{Screenlist, ScreenlistOptions, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let options = ScreenlistOptions::new().with_output("input.jpg");
//! Screenlist::prepare(&mut video, &options)?.render()?;
//! # Ok::<(), screengen::ScreengenError>(())
//! ```
//!
//! ## Inspecting the compositor arguments
//!
//! ```no_run
//! use screengen::{Screenlist, ScreenlistOptions, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let screenlist = Screenlist::prepare(&mut video, &ScreenlistOptions::new())?;
//! println!("convert {}", screenlist.arguments().join(" "));
//! // Temporary thumbnails are removed when `screenlist` is dropped.
//! # Ok::<(), screengen::ScreengenError>(())
//! ```
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed to build, and
//! ImageMagick (or another `convert`-compatible program, see
//! [`Compositor`]) must be available at run time.

pub mod compose;
pub mod compositor;
mod conversion;
pub mod error;
pub mod ffmpeg;
pub mod format;
pub mod layout;
pub mod metadata;
pub mod progress;
pub mod sampler;
pub mod screenlist;
pub mod thumbnail;
pub mod video;

pub use compose::{Fonts, HeaderText};
pub use compositor::Compositor;
pub use error::ScreengenError;
pub use ffmpeg::{FfmpegLogLevel, set_ffmpeg_log_level};
pub use layout::GridLayout;
pub use metadata::VideoMetadata;
pub use progress::{ProgressCallback, ProgressInfo};
pub use screenlist::{Screenlist, ScreenlistOptions, make_screenlist};
pub use thumbnail::{Thumbnail, ThumbnailSet};
pub use video::{FrameSource, VideoFile};
