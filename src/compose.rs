//! Compositor argument building.
//!
//! A screenlist is two ImageMagick canvases stacked vertically: a fixed
//! height header with six label/value rows, and the thumbnail grid with a
//! timestamp drawn on each thumbnail. [`build_arguments`] serializes both
//! into the argument list of a single `convert` invocation. The output is a
//! pure function of its inputs.

use std::path::Path;

use crate::{
    format::{escape_draw_text, format_file_size, format_resolution, format_timestamp},
    layout::GridLayout,
    metadata::VideoMetadata,
};

/// Height of the header canvas in pixels.
pub const HEADER_HEIGHT: u32 = 128;

/// Horizontal offset of header values from the label column.
const VALUE_OFFSET: u32 = 80;

/// Vertical distance between header rows.
const LINE_HEIGHT: u32 = 16;

/// Offset of a timestamp label from its thumbnail's top-left corner.
const LABEL_INSET: u32 = 5;

/// Default font for header labels.
pub const DEFAULT_BOLD_FONT: &str = "LiberationSansB";

/// Default font for header values and timestamps.
pub const DEFAULT_FONT: &str = "LiberationSans";

/// Fonts handed to the compositor's `-font` option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fonts {
    /// Font for header values and thumbnail timestamps.
    pub regular: String,
    /// Font for header labels.
    pub bold: String,
}

impl Default for Fonts {
    fn default() -> Self {
        Self {
            regular: DEFAULT_FONT.to_string(),
            bold: DEFAULT_BOLD_FONT.to_string(),
        }
    }
}

/// The six value rows of the header panel, already formatted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderText {
    /// Source path as given on the command line.
    pub filename: String,
    /// Size on disk, e.g. `"700 Mb"`.
    pub size: String,
    /// Duration as `HH:MM:SS`.
    pub duration: String,
    /// `WIDTHxHEIGHT` of the source.
    pub resolution: String,
    /// Video codec long name.
    pub video_codec: String,
    /// Audio codec long name, empty without audio.
    pub audio_codec: String,
}

impl HeaderText {
    /// Format header rows from video metadata and the file size in bytes.
    pub fn new(metadata: &VideoMetadata, file_size: u64) -> Self {
        Self {
            filename: metadata.path.display().to_string(),
            size: format_file_size(file_size),
            duration: format_timestamp(metadata.duration_ms),
            resolution: format_resolution(metadata.width, metadata.height),
            video_codec: metadata.video_codec.clone(),
            audio_codec: metadata.audio_codec.clone(),
        }
    }

    fn rows(&self) -> [(&'static str, &str); 6] {
        [
            ("Filename:", self.filename.as_str()),
            ("Size:", self.size.as_str()),
            ("Duration:", self.duration.as_str()),
            ("Resolution:", self.resolution.as_str()),
            ("Video:", self.video_codec.as_str()),
            ("Audio:", self.audio_codec.as_str()),
        ]
    }
}

/// A thumbnail as seen by the argument builder.
#[derive(Debug, Clone, Copy)]
pub struct PlacedFrame<'a> {
    /// Position in the video, in milliseconds.
    pub timestamp_ms: u64,
    /// Image file to composite.
    pub path: &'a Path,
}

/// Build the full compositor argument list for one screenlist.
///
/// Frames are placed in the order given, row-major according to `layout`.
pub fn build_arguments(
    header: &HeaderText,
    layout: &GridLayout,
    frames: &[PlacedFrame<'_>],
    fonts: &Fonts,
    quality: u8,
    output: &Path,
) -> Vec<String> {
    let mut arguments = Vec::with_capacity(32 + frames.len() * 11);
    push_header_panel(&mut arguments, header, layout, fonts);
    push_grid_panel(&mut arguments, layout, frames, fonts);
    arguments.extend([
        "-append".to_string(),
        "-quality".to_string(),
        quality.to_string(),
        output.to_string_lossy().into_owned(),
    ]);
    arguments
}

fn push_header_panel(
    arguments: &mut Vec<String>,
    header: &HeaderText,
    layout: &GridLayout,
    fonts: &Fonts,
) {
    let spacing = layout.spacing;
    let rows = header.rows();
    let row_y = |row: usize| spacing * 2 + LINE_HEIGHT * row as u32;

    arguments.extend([
        "(".to_string(),
        "-size".to_string(),
        format!("{}x{HEADER_HEIGHT}", layout.canvas_width),
        "xc:white".to_string(),
        "-fill".to_string(),
        "black".to_string(),
        "-font".to_string(),
        fonts.bold.clone(),
    ]);
    for (row, (label, _)) in rows.iter().enumerate() {
        push_draw_text(arguments, spacing, row_y(row), label);
    }

    arguments.extend(["-font".to_string(), fonts.regular.clone()]);
    for (row, (_, value)) in rows.iter().enumerate() {
        push_draw_text(arguments, spacing + VALUE_OFFSET, row_y(row), value);
    }
    arguments.push(")".to_string());
}

fn push_grid_panel(
    arguments: &mut Vec<String>,
    layout: &GridLayout,
    frames: &[PlacedFrame<'_>],
    fonts: &Fonts,
) {
    arguments.extend([
        "(".to_string(),
        "-size".to_string(),
        format!("{}x{}", layout.canvas_width, layout.canvas_height),
        "xc:white".to_string(),
        "-gravity".to_string(),
        "northwest".to_string(),
        "-font".to_string(),
        fonts.regular.clone(),
    ]);

    for (index, frame) in frames.iter().enumerate() {
        let (x, y) = layout.position(index as u32);
        let label = format_timestamp(frame.timestamp_ms);

        arguments.extend([
            frame.path.to_string_lossy().into_owned(),
            "-geometry".to_string(),
            format!("+{x}+{y}"),
            "-composite".to_string(),
        ]);
        // Black first, then white one pixel down-right, so the label reads on
        // both light and dark frames.
        arguments.extend(["-fill".to_string(), "black".to_string()]);
        push_draw_text(arguments, x + LABEL_INSET, y + LABEL_INSET, &label);
        arguments.extend(["-fill".to_string(), "white".to_string()]);
        push_draw_text(arguments, x + LABEL_INSET + 1, y + LABEL_INSET + 1, &label);
    }
    arguments.push(")".to_string());
}

fn push_draw_text(arguments: &mut Vec<String>, x: u32, y: u32, text: &str) {
    arguments.push("-draw".to_string());
    arguments.push(format!("text {x},{y} '{}'", escape_draw_text(text)));
}
