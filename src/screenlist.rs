//! Screenlist generation.
//!
//! [`Screenlist::prepare`] runs every in-process step: it samples the
//! timestamps, extracts and writes one thumbnail per timestamp, computes the
//! grid layout, and builds the compositor arguments. [`Screenlist::render`]
//! then hands those arguments to the compositor. The temporary thumbnails
//! live exactly as long as the [`Screenlist`] value, so they are removed
//! whether rendering succeeds, fails, or never happens.
//!
//! # Example
//!
//! ```no_run
//! use screengen::{Screenlist, ScreenlistOptions, VideoFile};
//!
//! let mut video = VideoFile::open("input.mp4")?;
//! let options = ScreenlistOptions::new()
//!     .with_thumbnail_count(12)
//!     .with_thumbnails_per_row(4)
//!     .with_output("sheet.jpg");
//! Screenlist::prepare(&mut video, &options)?.render()?;
//! # Ok::<(), screengen::ScreengenError>(())
//! ```

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    fs,
    path::PathBuf,
    sync::Arc,
};

use crate::{
    compose::{self, Fonts, HeaderText, PlacedFrame},
    compositor::Compositor,
    error::ScreengenError,
    layout::{self, DEFAULT_SPACING, DEFAULT_THUMBNAIL_WIDTH, GridLayout},
    metadata::VideoMetadata,
    progress::{NoOpProgress, ProgressCallback, ProgressTracker},
    sampler,
    thumbnail::ThumbnailSet,
    video::FrameSource,
};

/// Default number of thumbnails.
pub const DEFAULT_THUMBNAIL_COUNT: u32 = 27;

/// Default number of thumbnails per row.
pub const DEFAULT_THUMBNAILS_PER_ROW: u32 = 3;

/// Default output quality passed to the compositor.
pub const DEFAULT_QUALITY: u8 = 85;

/// Default output path.
pub const DEFAULT_OUTPUT: &str = "output.jpg";

/// Settings for one screenlist.
///
/// All fields have defaults; a default-constructed value reproduces the
/// classic 27-thumbnail, 3-column, 256-pixel layout.
#[derive(Clone)]
pub struct ScreenlistOptions {
    pub(crate) thumbnail_count: u32,
    pub(crate) thumbnails_per_row: u32,
    pub(crate) thumbnail_width: u32,
    pub(crate) spacing: u32,
    pub(crate) quality: u8,
    pub(crate) output: PathBuf,
    pub(crate) fonts: Fonts,
    pub(crate) compositor: Compositor,
    pub(crate) temp_dir: Option<PathBuf>,
    pub(crate) progress: Arc<dyn ProgressCallback>,
}

impl Debug for ScreenlistOptions {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("ScreenlistOptions")
            .field("thumbnail_count", &self.thumbnail_count)
            .field("thumbnails_per_row", &self.thumbnails_per_row)
            .field("thumbnail_width", &self.thumbnail_width)
            .field("spacing", &self.spacing)
            .field("quality", &self.quality)
            .field("output", &self.output)
            .field("fonts", &self.fonts)
            .field("compositor", &self.compositor)
            .field("temp_dir", &self.temp_dir)
            .finish_non_exhaustive()
    }
}

impl Default for ScreenlistOptions {
    fn default() -> Self {
        Self::new()
    }
}

impl ScreenlistOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self {
            thumbnail_count: DEFAULT_THUMBNAIL_COUNT,
            thumbnails_per_row: DEFAULT_THUMBNAILS_PER_ROW,
            thumbnail_width: DEFAULT_THUMBNAIL_WIDTH,
            spacing: DEFAULT_SPACING,
            quality: DEFAULT_QUALITY,
            output: PathBuf::from(DEFAULT_OUTPUT),
            fonts: Fonts::default(),
            compositor: Compositor::default(),
            temp_dir: None,
            progress: Arc::new(NoOpProgress),
        }
    }

    /// Set the number of thumbnails.
    #[must_use]
    pub fn with_thumbnail_count(mut self, count: u32) -> Self {
        self.thumbnail_count = count;
        self
    }

    /// Set the number of grid columns.
    #[must_use]
    pub fn with_thumbnails_per_row(mut self, columns: u32) -> Self {
        self.thumbnails_per_row = columns;
        self
    }

    /// Set the thumbnail width. The height follows the video's aspect ratio.
    #[must_use]
    pub fn with_thumbnail_width(mut self, width: u32) -> Self {
        self.thumbnail_width = width;
        self
    }

    /// Set the gap between thumbnails and around the grid.
    #[must_use]
    pub fn with_spacing(mut self, spacing: u32) -> Self {
        self.spacing = spacing;
        self
    }

    /// Set the output quality (0–100). Larger values are clamped to 100.
    #[must_use]
    pub fn with_quality(mut self, quality: u8) -> Self {
        self.quality = quality.min(100);
        self
    }

    /// Set the output image path. The compositor picks the format from the
    /// extension.
    #[must_use]
    pub fn with_output<P: Into<PathBuf>>(mut self, output: P) -> Self {
        self.output = output.into();
        self
    }

    /// Set the header and label fonts.
    #[must_use]
    pub fn with_fonts(mut self, fonts: Fonts) -> Self {
        self.fonts = fonts;
        self
    }

    /// Set the compositor to run.
    #[must_use]
    pub fn with_compositor(mut self, compositor: Compositor) -> Self {
        self.compositor = compositor;
        self
    }

    /// Write temporary thumbnails into `directory` instead of the system
    /// temporary directory.
    #[must_use]
    pub fn with_temp_dir<P: Into<PathBuf>>(mut self, directory: P) -> Self {
        self.temp_dir = Some(directory.into());
        self
    }

    /// Attach a progress callback, fired after every thumbnail.
    #[must_use]
    pub fn with_progress(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress = callback;
        self
    }

    /// Compute the grid layout for a video with `metadata`.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::InvalidOption`] for a zero thumbnail count,
    /// column count or thumbnail width, when the video's dimensions give a
    /// zero-height thumbnail, or when the canvas would be too large.
    pub fn layout(&self, metadata: &VideoMetadata) -> Result<GridLayout, ScreengenError> {
        if self.thumbnail_count == 0 {
            return Err(ScreengenError::InvalidOption(
                "number of thumbnails must be at least 1".to_string(),
            ));
        }
        if self.thumbnails_per_row == 0 {
            return Err(ScreengenError::InvalidOption(
                "thumbnails per row must be at least 1".to_string(),
            ));
        }
        if self.thumbnail_width == 0 {
            return Err(ScreengenError::InvalidOption(
                "thumbnail width must be at least 1".to_string(),
            ));
        }

        let thumbnail_height =
            layout::thumbnail_height(self.thumbnail_width, metadata.width, metadata.height)
                .filter(|&height| height > 0)
                .ok_or_else(|| {
                    ScreengenError::InvalidOption(format!(
                        "a {}x{} video gives {}-pixel-wide thumbnails no usable height",
                        metadata.width, metadata.height, self.thumbnail_width
                    ))
                })?;

        GridLayout::new(
            self.thumbnail_count,
            self.thumbnails_per_row,
            self.thumbnail_width,
            thumbnail_height,
            self.spacing,
        )
        .ok_or_else(|| {
            ScreengenError::InvalidOption(format!(
                "{} thumbnails of {}x{} in {} columns with {}-pixel spacing exceed the \
                 {}-pixel canvas limit",
                self.thumbnail_count,
                self.thumbnail_width,
                thumbnail_height,
                self.thumbnails_per_row,
                self.spacing,
                layout::MAX_CANVAS_DIMENSION
            ))
        })
    }
}

/// A screenlist ready to be rendered.
///
/// Holds the temporary thumbnails referenced by its arguments; dropping it
/// deletes them.
#[derive(Debug)]
pub struct Screenlist {
    layout: GridLayout,
    arguments: Vec<String>,
    compositor: Compositor,
    thumbnails: ThumbnailSet,
}

impl Screenlist {
    /// Extract thumbnails from `source` and build the compositor arguments.
    ///
    /// Thumbnails are extracted one at a time in timestamp order. The first
    /// failure aborts; thumbnails written so far are removed before this
    /// returns.
    ///
    /// # Errors
    ///
    /// - [`ScreengenError::InvalidOption`] for out-of-range options.
    /// - [`ScreengenError::FrameExtraction`] if a frame cannot be produced.
    /// - [`ScreengenError::Encoding`] if a thumbnail cannot be written.
    /// - [`ScreengenError::Stat`] if the source file size cannot be read.
    pub fn prepare<S: FrameSource + ?Sized>(
        source: &mut S,
        options: &ScreenlistOptions,
    ) -> Result<Self, ScreengenError> {
        let layout = options.layout(source.metadata())?;
        let timestamps =
            sampler::sample_timestamps(source.metadata().duration_ms, options.thumbnail_count);
        log::debug!(
            "Making {} thumbnails of {}x{} at {:?}",
            timestamps.len(),
            layout.thumbnail_width,
            layout.thumbnail_height,
            timestamps
        );

        let mut thumbnails = match &options.temp_dir {
            Some(directory) => ThumbnailSet::in_directory(directory),
            None => ThumbnailSet::new(),
        };
        let mut tracker = ProgressTracker::new(options.progress.clone(), timestamps.len() as u64);
        for &timestamp_ms in &timestamps {
            let image = source.frame_at(
                timestamp_ms,
                layout.thumbnail_width,
                layout.thumbnail_height,
            )?;
            thumbnails.push(timestamp_ms, &image)?;
            tracker.advance(timestamp_ms);
        }

        let metadata = source.metadata();
        let file_size = fs::metadata(&metadata.path)
            .map_err(|error| ScreengenError::Stat {
                path: metadata.path.clone(),
                source: error,
            })?
            .len();
        let header = HeaderText::new(metadata, file_size);

        let frames: Vec<PlacedFrame<'_>> = thumbnails
            .thumbnails()
            .iter()
            .map(|thumbnail| PlacedFrame {
                timestamp_ms: thumbnail.timestamp_ms,
                path: thumbnail.path(),
            })
            .collect();
        let arguments = compose::build_arguments(
            &header,
            &layout,
            &frames,
            &options.fonts,
            options.quality,
            &options.output,
        );

        Ok(Self {
            layout,
            arguments,
            compositor: options.compositor.clone(),
            thumbnails,
        })
    }

    /// The grid layout.
    pub fn layout(&self) -> &GridLayout {
        &self.layout
    }

    /// The compositor argument list.
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// The temporary thumbnails referenced by the arguments.
    pub fn thumbnails(&self) -> &ThumbnailSet {
        &self.thumbnails
    }

    /// Leave the thumbnails on disk and return the compositor arguments,
    /// which stay valid for running the compositor later.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::Encoding`] if a thumbnail cannot be kept.
    pub fn keep_thumbnails(self) -> Result<Vec<String>, ScreengenError> {
        let Self {
            arguments,
            thumbnails,
            ..
        } = self;
        let kept = thumbnails.keep()?;
        log::debug!("Kept {} thumbnails", kept.len());
        Ok(arguments)
    }

    /// Run the compositor, then remove the temporary thumbnails.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::CompositorLaunch`] or
    /// [`ScreengenError::CompositionFailed`].
    pub fn render(self) -> Result<(), ScreengenError> {
        self.compositor.run(&self.arguments)
    }
}

/// Prepare and render a screenlist in one call.
///
/// # Errors
///
/// Any error from [`Screenlist::prepare`] or [`Screenlist::render`].
pub fn make_screenlist<S: FrameSource + ?Sized>(
    source: &mut S,
    options: &ScreenlistOptions,
) -> Result<(), ScreengenError> {
    Screenlist::prepare(source, options)?.render()
}
