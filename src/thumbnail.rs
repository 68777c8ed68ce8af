//! Temporary thumbnail files.
//!
//! Each extracted frame is written as a PNG into its own uniquely named
//! temporary file so the compositor can read it from disk. [`ThumbnailSet`]
//! owns those files: every file is registered with the set the moment it is
//! created, and dropping the set deletes all of them, whether the run
//! succeeded or failed partway through.

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use image::{DynamicImage, ImageFormat};
use tempfile::{Builder, TempPath};

use crate::error::ScreengenError;

const TEMP_PREFIX: &str = "screengen";
const TEMP_SUFFIX: &str = ".png";

/// One thumbnail on disk.
#[derive(Debug)]
pub struct Thumbnail {
    /// Position in the video, in milliseconds.
    pub timestamp_ms: u64,
    file: TempPath,
}

impl Thumbnail {
    /// Path of the PNG file backing this thumbnail.
    pub fn path(&self) -> &Path {
        &self.file
    }
}

/// The temporary thumbnail files of one screenlist.
///
/// Files are removed exactly once, when the set is dropped. Removal failures
/// are logged and otherwise ignored.
#[derive(Debug, Default)]
pub struct ThumbnailSet {
    directory: Option<PathBuf>,
    thumbnails: Vec<Thumbnail>,
}

impl ThumbnailSet {
    /// Create an empty set writing into the system temporary directory.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty set writing into `directory`.
    pub fn in_directory<P: Into<PathBuf>>(directory: P) -> Self {
        Self {
            directory: Some(directory.into()),
            thumbnails: Vec::new(),
        }
    }

    /// Encode `image` as PNG into a fresh temporary file and keep it.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::Encoding`] if the file cannot be created or
    /// written. A file that was created before the failure is still removed.
    pub fn push(
        &mut self,
        timestamp_ms: u64,
        image: &DynamicImage,
    ) -> Result<&Thumbnail, ScreengenError> {
        let mut builder = Builder::new();
        builder.prefix(TEMP_PREFIX).suffix(TEMP_SUFFIX);
        let temporary_file = match &self.directory {
            Some(directory) => builder.tempfile_in(directory),
            None => builder.tempfile(),
        }
        .map_err(encoding_error)?;

        // Owning the path from here on guarantees removal even if encoding fails.
        let (file, path) = temporary_file.into_parts();
        write_png(file, image)?;
        log::debug!("Wrote thumbnail at {timestamp_ms} ms to {}", path.display());

        self.thumbnails.push(Thumbnail {
            timestamp_ms,
            file: path,
        });
        Ok(&self.thumbnails[self.thumbnails.len() - 1])
    }

    /// The thumbnails in insertion order.
    pub fn thumbnails(&self) -> &[Thumbnail] {
        &self.thumbnails
    }

    /// Number of thumbnails held.
    pub fn len(&self) -> usize {
        self.thumbnails.len()
    }

    /// Returns `true` if no thumbnail has been written yet.
    pub fn is_empty(&self) -> bool {
        self.thumbnails.is_empty()
    }

    /// Stop managing the files and leave them on disk, returning their paths
    /// in insertion order.
    ///
    /// # Errors
    ///
    /// Returns [`ScreengenError::Encoding`] if a file cannot be kept. Files
    /// not yet kept at that point are removed as usual.
    pub fn keep(mut self) -> Result<Vec<PathBuf>, ScreengenError> {
        let mut kept = Vec::with_capacity(self.thumbnails.len());
        while !self.thumbnails.is_empty() {
            let thumbnail = self.thumbnails.remove(0);
            let path = thumbnail.file.keep().map_err(|error| ScreengenError::Encoding {
                reason: error.to_string(),
            })?;
            kept.push(path);
        }
        Ok(kept)
    }
}

impl Drop for ThumbnailSet {
    fn drop(&mut self) {
        for thumbnail in self.thumbnails.drain(..) {
            let path = thumbnail.file.to_path_buf();
            if let Err(error) = thumbnail.file.close() {
                log::warn!(
                    "Failed to remove temporary thumbnail {}: {error}",
                    path.display()
                );
            }
        }
    }
}

fn write_png(file: File, image: &DynamicImage) -> Result<(), ScreengenError> {
    let mut writer = BufWriter::new(file);
    image.write_to(&mut writer, ImageFormat::Png)?;
    writer.flush().map_err(encoding_error)?;
    Ok(())
}

fn encoding_error(error: std::io::Error) -> ScreengenError {
    ScreengenError::Encoding {
        reason: error.to_string(),
    }
}
