//! Screenlist pipeline integration tests.
//!
//! These tests drive [`Screenlist`] with an in-memory frame source, so they
//! need neither FFmpeg fixtures nor ImageMagick.

use std::{
    fs,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use image::{DynamicImage, Rgb, RgbImage};
use screengen::{
    Compositor, FrameSource, ProgressCallback, ProgressInfo, ScreengenError, Screenlist,
    ScreenlistOptions, VideoMetadata, make_screenlist,
};

/// Produces solid-colour frames and records every request.
struct FakeVideo {
    metadata: VideoMetadata,
    requests: Vec<(u64, u32, u32)>,
    fail_on_request: Option<usize>,
}

impl FakeVideo {
    fn new(path: &Path, duration_ms: u64) -> Self {
        Self {
            metadata: VideoMetadata {
                path: path.to_path_buf(),
                duration_ms,
                width: 1920,
                height: 1080,
                video_codec: "H.264 / AVC / MPEG-4 AVC / MPEG-4 part 10".to_string(),
                audio_codec: "AAC (Advanced Audio Coding)".to_string(),
            },
            requests: Vec::new(),
            fail_on_request: None,
        }
    }

    fn timestamps(&self) -> Vec<u64> {
        self.requests.iter().map(|request| request.0).collect()
    }
}

impl FrameSource for FakeVideo {
    fn metadata(&self) -> &VideoMetadata {
        &self.metadata
    }

    fn frame_at(
        &mut self,
        timestamp_ms: u64,
        width: u32,
        height: u32,
    ) -> Result<DynamicImage, ScreengenError> {
        self.requests.push((timestamp_ms, width, height));
        if self.fail_on_request == Some(self.requests.len()) {
            return Err(ScreengenError::FrameExtraction {
                timestamp_ms,
                reason: "corrupt packet".to_string(),
            });
        }
        let shade = (timestamp_ms / 1000 % 256) as u8;
        Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
            width,
            height,
            Rgb([shade, shade, shade]),
        )))
    }
}

/// A source file of exactly three MiB plus a scratch directory for
/// thumbnails.
struct Workspace {
    root: tempfile::TempDir,
    thumbnails: PathBuf,
}

impl Workspace {
    fn new() -> Self {
        let root = tempfile::tempdir().expect("Failed to create temp dir");
        fs::write(root.path().join("movie.mkv"), vec![0_u8; 3 * 1024 * 1024 + 17])
            .expect("Failed to write source file");
        let thumbnails = root.path().join("thumbnails");
        fs::create_dir(&thumbnails).expect("Failed to create thumbnail dir");
        Self { root, thumbnails }
    }

    fn source_path(&self) -> PathBuf {
        self.root.path().join("movie.mkv")
    }

    fn options(&self) -> ScreenlistOptions {
        ScreenlistOptions::new()
            .with_temp_dir(&self.thumbnails)
            .with_output(self.root.path().join("sheet.jpg"))
    }

    fn thumbnail_files(&self) -> usize {
        fs::read_dir(&self.thumbnails)
            .expect("Failed to list thumbnail dir")
            .count()
    }
}

fn with_placeholder_paths(screenlist: &Screenlist) -> Vec<String> {
    let paths: Vec<String> = screenlist
        .thumbnails()
        .thumbnails()
        .iter()
        .map(|thumbnail| thumbnail.path().to_string_lossy().into_owned())
        .collect();
    screenlist
        .arguments()
        .iter()
        .map(|argument| match paths.iter().position(|path| path == argument) {
            Some(index) => format!("<thumbnail {index}>"),
            None => argument.clone(),
        })
        .collect()
}

// ── Sampling and layout ──────────────────────────────────────────

#[test]
fn three_thumbnails_over_four_and_a_half_minutes() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);

    let screenlist =
        Screenlist::prepare(&mut video, &workspace.options().with_thumbnail_count(3))
            .expect("Failed to prepare screenlist");

    assert_eq!(video.timestamps(), vec![0, 90_000, 180_000]);
    assert!(video.requests.iter().all(|&(_, w, h)| (w, h) == (256, 144)));

    let arguments = screenlist.arguments();
    for label in ["'00:00:00'", "'00:01:30'", "'00:03:00'"] {
        assert_eq!(
            arguments.iter().filter(|a| a.ends_with(label)).count(),
            2,
            "{label} should be drawn twice"
        );
    }
    assert!(arguments.contains(&"text 96,48 '3 Mb'".to_string()));
    assert!(arguments.contains(&"text 96,64 '00:04:30'".to_string()));
}

#[test]
fn default_grid_geometry() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 5_400_000);

    let screenlist = Screenlist::prepare(&mut video, &workspace.options())
        .expect("Failed to prepare screenlist");

    let layout = screenlist.layout();
    assert_eq!(layout.thumbnail_height, 144);
    assert_eq!(layout.rows, 9);
    assert_eq!(layout.canvas_width, 832);
    assert_eq!(video.requests.len(), 27);
    assert!(screenlist.arguments().contains(&"832x128".to_string()));
    assert!(screenlist.arguments().contains(&"832x1456".to_string()));

    let tail = &screenlist.arguments()[screenlist.arguments().len() - 4..];
    assert_eq!(tail[0], "-append");
    assert_eq!(tail[1], "-quality");
    assert_eq!(tail[2], "85");
    assert!(tail[3].ends_with("sheet.jpg"));
}

#[test]
fn identical_inputs_give_identical_commands() {
    let workspace = Workspace::new();
    let options = workspace.options().with_thumbnail_count(5);

    let mut first_video = FakeVideo::new(&workspace.source_path(), 600_000);
    let first = Screenlist::prepare(&mut first_video, &options).expect("first run");
    let mut second_video = FakeVideo::new(&workspace.source_path(), 600_000);
    let second = Screenlist::prepare(&mut second_video, &options).expect("second run");

    assert_eq!(with_placeholder_paths(&first), with_placeholder_paths(&second));
}

#[test]
fn progress_is_reported_per_thumbnail() {
    struct Recorder(Mutex<Vec<(u64, u64)>>);

    impl ProgressCallback for Recorder {
        fn on_progress(&self, info: &ProgressInfo) {
            self.0.lock().unwrap().push((info.current, info.timestamp_ms));
        }
    }

    let workspace = Workspace::new();
    let recorder = Arc::new(Recorder(Mutex::new(Vec::new())));
    let options = workspace
        .options()
        .with_thumbnail_count(3)
        .with_progress(recorder.clone());
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);

    Screenlist::prepare(&mut video, &options).expect("Failed to prepare screenlist");

    assert_eq!(
        *recorder.0.lock().unwrap(),
        vec![(1, 0), (2, 90_000), (3, 180_000)]
    );
}

// ── Temporary file lifetime ──────────────────────────────────────

#[test]
fn thumbnails_live_as_long_as_the_screenlist() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);

    let screenlist =
        Screenlist::prepare(&mut video, &workspace.options().with_thumbnail_count(4))
            .expect("Failed to prepare screenlist");
    assert_eq!(workspace.thumbnail_files(), 4);
    for thumbnail in screenlist.thumbnails().thumbnails() {
        assert!(screenlist
            .arguments()
            .contains(&thumbnail.path().to_string_lossy().into_owned()));
    }

    drop(screenlist);
    assert_eq!(workspace.thumbnail_files(), 0);
}

#[test]
fn extraction_failure_aborts_and_cleans_up() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);
    video.fail_on_request = Some(3);

    let error = Screenlist::prepare(&mut video, &workspace.options().with_thumbnail_count(6))
        .expect_err("Extraction should fail");

    assert!(matches!(
        error,
        ScreengenError::FrameExtraction {
            timestamp_ms: 90_000,
            ..
        }
    ));
    assert_eq!(video.requests.len(), 3, "No frame is requested after a failure");
    assert_eq!(workspace.thumbnail_files(), 0);
}

#[test]
fn stat_failure_cleans_up() {
    let workspace = Workspace::new();
    let missing = workspace.root.path().join("vanished.mkv");
    let mut video = FakeVideo::new(&missing, 270_000);

    let error = Screenlist::prepare(&mut video, &workspace.options().with_thumbnail_count(3))
        .expect_err("Stat should fail");

    assert!(matches!(error, ScreengenError::Stat { .. }));
    assert!(error.to_string().contains("vanished.mkv"));
    assert_eq!(workspace.thumbnail_files(), 0);
}

#[test]
fn invalid_options_touch_nothing() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);

    let error = Screenlist::prepare(
        &mut video,
        &workspace.options().with_thumbnails_per_row(0),
    )
    .expect_err("Zero columns should be rejected");

    assert!(matches!(error, ScreengenError::InvalidOption(_)));
    assert!(video.requests.is_empty());
    assert_eq!(workspace.thumbnail_files(), 0);
}

#[test]
fn oversized_grid_is_an_invalid_option() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);
    let options = workspace
        .options()
        .with_thumbnail_count(1)
        .with_thumbnails_per_row(20_000_000);

    let error = Screenlist::prepare(&mut video, &options).expect_err("Canvas should not fit");

    assert!(matches!(error, ScreengenError::InvalidOption(_)));
    assert!(video.requests.is_empty());
    assert_eq!(workspace.thumbnail_files(), 0);
}

#[test]
fn kept_thumbnails_outlive_the_screenlist() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);

    let screenlist =
        Screenlist::prepare(&mut video, &workspace.options().with_thumbnail_count(3))
            .expect("Failed to prepare screenlist");
    let arguments = screenlist.keep_thumbnails().expect("Failed to keep thumbnails");

    let pngs: Vec<&String> = arguments.iter().filter(|a| a.ends_with(".png")).collect();
    assert_eq!(pngs.len(), 3);
    for png in pngs {
        assert!(Path::new(png).exists(), "{png} was removed");
    }
    assert_eq!(workspace.thumbnail_files(), 3);
}

#[test]
fn missing_compositor_cleans_up() {
    let workspace = Workspace::new();
    let mut video = FakeVideo::new(&workspace.source_path(), 270_000);
    let options = workspace
        .options()
        .with_thumbnail_count(2)
        .with_compositor(Compositor::new("screengen-no-such-compositor"));

    let error = make_screenlist(&mut video, &options).expect_err("Launch should fail");

    assert!(matches!(error, ScreengenError::CompositorLaunch { .. }));
    assert_eq!(workspace.thumbnail_files(), 0);
}

#[cfg(unix)]
mod unix {
    use std::os::unix::fs::PermissionsExt;

    use super::*;

    /// Write an executable shell script standing in for `convert`.
    fn fake_compositor(workspace: &Workspace, body: &str) -> Compositor {
        let path = workspace.root.path().join("fake-convert");
        fs::write(&path, format!("#!/bin/sh\n{body}\n")).expect("Failed to write script");
        fs::set_permissions(&path, fs::Permissions::from_mode(0o755))
            .expect("Failed to chmod script");
        Compositor::new(path)
    }

    #[test]
    fn compositor_sees_every_thumbnail_and_cleanup_follows() {
        let workspace = Workspace::new();
        let log = workspace.root.path().join("arguments.txt");
        let compositor = fake_compositor(
            &workspace,
            &format!(
                "for a; do case \"$a\" in *.png) test -f \"$a\" || exit 9;; esac; done\n\
                 printf '%s\\n' \"$@\" > '{}'",
                log.display()
            ),
        );
        let mut video = FakeVideo::new(&workspace.source_path(), 270_000);
        let options = workspace
            .options()
            .with_thumbnail_count(3)
            .with_compositor(compositor);

        make_screenlist(&mut video, &options).expect("Compositor should succeed");

        let recorded = fs::read_to_string(&log).expect("Compositor did not run");
        assert!(recorded.lines().any(|line| line == "text 21,21 '00:00:00'"));
        assert!(recorded.lines().any(|line| line == "-append"));
        assert_eq!(workspace.thumbnail_files(), 0);
    }

    #[test]
    fn compositor_failure_is_reported_and_cleanup_follows() {
        let workspace = Workspace::new();
        let compositor =
            fake_compositor(&workspace, "echo 'unable to read font' >&2\nexit 1");
        let mut video = FakeVideo::new(&workspace.source_path(), 270_000);
        let options = workspace
            .options()
            .with_thumbnail_count(3)
            .with_compositor(compositor);

        let error = make_screenlist(&mut video, &options).expect_err("Compositor should fail");

        match error {
            ScreengenError::CompositionFailed { status, stderr } => {
                assert_eq!(status.code(), Some(1));
                assert_eq!(stderr, "unable to read font");
            }
            other => panic!("Expected CompositionFailed, got: {other}"),
        }
        assert_eq!(workspace.thumbnail_files(), 0);
        assert!(!workspace.root.path().join("sheet.jpg").exists());
    }
}
