use std::{ffi::OsString, path::PathBuf, sync::Arc};

use clap::{CommandFactory, Parser};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use serde_json::json;
use screengen::{
    Compositor, FfmpegLogLevel, Fonts, FrameSource, ProgressCallback, ProgressInfo, Screenlist,
    ScreenlistOptions, VideoFile,
    compose::{DEFAULT_BOLD_FONT, DEFAULT_FONT},
    compositor::DEFAULT_COMPOSITOR,
    format::format_timestamp,
    layout::{DEFAULT_SPACING, DEFAULT_THUMBNAIL_WIDTH},
    screenlist::{
        DEFAULT_OUTPUT, DEFAULT_QUALITY, DEFAULT_THUMBNAIL_COUNT, DEFAULT_THUMBNAILS_PER_ROW,
    },
};

const CLI_AFTER_HELP: &str = "Long options may be written with one or two dashes.\n\nExamples:\n  screengen movie.mkv\n  screengen -n 12 -thumbnails-per-row 4 -o movie.jpg movie.mkv\n  screengen -print-args -keep-temp movie.mkv";

#[derive(Debug, Parser)]
#[command(
    name = "screengen",
    version,
    about = "Make a screenlist (contact sheet) from a video file with ImageMagick's convert",
    override_usage = "screengen [options] videofile",
    after_help = CLI_AFTER_HELP
)]
struct Cli {
    /// Number of thumbnails.
    #[arg(short = 'n', value_name = "N", default_value_t = DEFAULT_THUMBNAIL_COUNT)]
    count: u32,

    /// Thumbnails per row.
    #[arg(long, value_name = "N", default_value_t = DEFAULT_THUMBNAILS_PER_ROW)]
    thumbnails_per_row: u32,

    /// Output file.
    #[arg(short = 'o', value_name = "FILE", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Output image quality (0-100).
    #[arg(
        long,
        default_value_t = DEFAULT_QUALITY,
        value_parser = clap::value_parser!(u8).range(0..=100)
    )]
    quality: u8,

    /// Thumbnail width in pixels; the height follows the video's aspect ratio.
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_THUMBNAIL_WIDTH)]
    thumbnail_width: u32,

    /// Gap between thumbnails in pixels.
    #[arg(long, value_name = "PIXELS", default_value_t = DEFAULT_SPACING)]
    spacing: u32,

    /// Compositor program (ImageMagick convert or compatible).
    #[arg(long, value_name = "PROGRAM", default_value = DEFAULT_COMPOSITOR)]
    compositor: OsString,

    /// Font for header values and timestamps.
    #[arg(long, default_value = DEFAULT_FONT)]
    font: String,

    /// Font for header labels.
    #[arg(long, default_value = DEFAULT_BOLD_FONT)]
    bold_font: String,

    /// Directory for temporary thumbnails (defaults to the system temp dir).
    #[arg(long, value_name = "DIR")]
    temp_dir: Option<PathBuf>,

    /// Print the compositor command as JSON instead of running it. The
    /// thumbnails it names are deleted on exit unless -keep-temp is given.
    #[arg(long)]
    print_args: bool,

    /// With -print-args, leave the thumbnails on disk so the printed command
    /// can be run later.
    #[arg(long, requires = "print_args")]
    keep_temp: bool,

    /// Show a progress bar while extracting thumbnails.
    #[arg(long)]
    progress: bool,

    /// Show debug logging.
    #[arg(long)]
    verbose: bool,

    /// FFmpeg log level (quiet, fatal, error, warning, info, verbose, debug).
    #[arg(long, value_name = "LEVEL")]
    log_level: Option<FfmpegLogLevel>,

    /// Video file.
    #[arg(value_name = "VIDEOFILE")]
    inputs: Vec<PathBuf>,
}

/// Rewrite `-long-name` into `--long-name` for every long option the CLI
/// knows, so flags can be spelled with a single dash. Short options and
/// everything after `--` are left alone.
fn normalize_single_dash_flags<I>(arguments: I, long_names: &[String]) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let mut after_separator = false;
    arguments
        .into_iter()
        .enumerate()
        .map(|(index, argument)| {
            if index == 0 || after_separator {
                return argument;
            }
            let Some(text) = argument.to_str() else {
                return argument;
            };
            if text == "--" {
                after_separator = true;
                return argument;
            }
            let Some(flag) = text.strip_prefix('-').filter(|rest| !rest.starts_with('-')) else {
                return argument;
            };
            let name = flag.split('=').next().unwrap_or(flag);
            if name.len() > 1 && long_names.iter().any(|long| long == name) {
                OsString::from(format!("-{text}"))
            } else {
                argument
            }
        })
        .collect()
}

fn long_option_names() -> Vec<String> {
    let command = Cli::command();
    let mut names: Vec<String> = command
        .get_arguments()
        .filter_map(|argument| argument.get_long())
        .map(str::to_string)
        .collect();
    names.extend(["help".to_string(), "version".to_string()]);
    names
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .init();
}

struct TerminalProgress {
    bar: ProgressBar,
}

impl TerminalProgress {
    fn new(total: u64) -> Self {
        let bar = ProgressBar::new(total);
        bar.set_style(
            ProgressStyle::with_template("{spinner} [{bar:40}] {pos}/{len} {msg}")
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("=> "),
        );
        Self { bar }
    }
}

impl ProgressCallback for TerminalProgress {
    fn on_progress(&self, info: &ProgressInfo) {
        self.bar.set_position(info.current);
        self.bar.set_message(format_timestamp(info.timestamp_ms));
    }
}

fn screenlist_options(cli: &Cli) -> ScreenlistOptions {
    let mut options = ScreenlistOptions::new()
        .with_thumbnail_count(cli.count)
        .with_thumbnails_per_row(cli.thumbnails_per_row)
        .with_thumbnail_width(cli.thumbnail_width)
        .with_spacing(cli.spacing)
        .with_quality(cli.quality)
        .with_output(&cli.output)
        .with_fonts(Fonts {
            regular: cli.font.clone(),
            bold: cli.bold_font.clone(),
        })
        .with_compositor(Compositor::new(cli.compositor.clone()));
    if let Some(directory) = &cli.temp_dir {
        options = options.with_temp_dir(directory);
    }
    options
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let arguments = normalize_single_dash_flags(std::env::args_os(), &long_option_names());
    let cli = Cli::parse_from(arguments);

    // Anything but exactly one video prints usage and does nothing else.
    let [input] = cli.inputs.as_slice() else {
        Cli::command().print_help()?;
        return Ok(());
    };

    init_logging(cli.verbose);
    if let Some(level) = cli.log_level {
        screengen::set_ffmpeg_log_level(level);
    }

    let mut video = VideoFile::open(input)?;
    log::info!(
        "{}: {} ms, {}x{}",
        input.display(),
        video.metadata().duration_ms,
        video.metadata().width,
        video.metadata().height
    );

    let mut options = screenlist_options(&cli);
    let progress = cli
        .progress
        .then(|| Arc::new(TerminalProgress::new(u64::from(cli.count))));
    if let Some(progress) = &progress {
        options = options.with_progress(progress.clone());
    }

    let prepared = Screenlist::prepare(&mut video, &options);
    if let Some(progress) = &progress {
        progress.bar.finish_and_clear();
    }
    let screenlist = prepared?;

    if cli.print_args {
        let arguments = if cli.keep_temp {
            screenlist.keep_thumbnails()?
        } else {
            screenlist.arguments().to_vec()
        };
        let payload = json!({
            "program": cli.compositor.to_string_lossy(),
            "arguments": arguments,
            "thumbnails_kept": cli.keep_temp,
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    screenlist.render()?;
    log::info!("Wrote {}", cli.output.display());
    Ok(())
}

fn main() {
    if let Err(error) = run() {
        eprintln!("{} {error}", "error:".red().bold());
        std::process::exit(1);
    }
}
