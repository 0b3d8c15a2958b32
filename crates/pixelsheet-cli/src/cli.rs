use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;

use clap::{ArgAction, Parser};
use log::{info, warn, LevelFilter};
use pixelsheet_image::{load_pixel_grid, LoadOptions, DEFAULT_THRESHOLD};
use pixelsheet_model::{EXCEL_MAX_COLS, EXCEL_MAX_ROWS};
use pixelsheet_xlsx::write_pixel_art;

use crate::error::CliError;

/// Command-line surface of the `pixelsheet` binary.
///
/// Numeric options are parsed as signed integers so out-of-range values reach
/// [`PixelArtConfig::from_args`] and get the same one-line diagnostics as everything else.
#[derive(Debug, Parser)]
#[command(
    name = "pixelsheet",
    version,
    about = "Convert an image to black-and-white pixel art in an Excel workbook."
)]
pub struct Args {
    /// Image to convert (PNG, JPEG, GIF, BMP, ...; the format is detected from the contents).
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    /// Workbook to write. An existing file is replaced.
    #[arg(long, value_name = "PATH")]
    pub output: PathBuf,

    /// Number of columns in the pixel grid.
    #[arg(long, allow_negative_numbers = true)]
    pub width: i64,

    /// Number of rows. Derived from the image aspect ratio when omitted.
    #[arg(long, allow_negative_numbers = true)]
    pub height: Option<i64>,

    /// Pixels with intensity strictly below this value (0-255) are dark.
    #[arg(long, default_value_t = i64::from(DEFAULT_THRESHOLD), allow_negative_numbers = true)]
    pub threshold: i64,

    /// Swap dark and light.
    #[arg(long)]
    pub invert: bool,

    /// Log more detail to stderr (repeatable). `RUST_LOG` takes precedence.
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

/// Arguments that passed validation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelArtConfig {
    pub input: PathBuf,
    pub output: PathBuf,
    pub width: u32,
    pub height: Option<u32>,
    pub threshold: u8,
    pub invert: bool,
}

impl PixelArtConfig {
    /// Check width, then height, then threshold. Nothing is read or written here.
    pub fn from_args(args: &Args) -> Result<Self, CliError> {
        let width = positive_dimension(args.width, "width", EXCEL_MAX_COLS)?;
        let height = args
            .height
            .map(|height| positive_dimension(height, "height", EXCEL_MAX_ROWS))
            .transpose()?;
        let threshold =
            u8::try_from(args.threshold).map_err(|_| CliError::invalid("threshold out of range"))?;

        Ok(Self {
            input: args.input.clone(),
            output: args.output.clone(),
            width,
            height,
            threshold,
            invert: args.invert,
        })
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            width: self.width,
            height: self.height,
            threshold: self.threshold,
            invert: self.invert,
        }
    }
}

fn positive_dimension(value: i64, name: &str, max: u32) -> Result<u32, CliError> {
    if value <= 0 {
        return Err(CliError::invalid(format!("{name} must be positive")));
    }
    u32::try_from(value)
        .ok()
        .filter(|value| *value <= max)
        .ok_or_else(|| CliError::invalid(format!("{name} must be at most {max}")))
}

/// What a successful run produced.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub width: u32,
    pub height: u32,
    pub dark_cells: usize,
}

/// Load, threshold and render `config.input` into `config.output`, reporting progress on `out`.
///
/// Progress lines are best effort: a closed `out` does not fail the conversion.
pub fn run(config: &PixelArtConfig, out: &mut impl Write) -> Result<RunSummary, CliError> {
    progress(
        out,
        format_args!("Loading and processing image: {}", config.input.display()),
    );
    let loaded = load_pixel_grid(&config.input, &config.load_options())?;
    info!(
        "resized {}x{} source to {}x{} (threshold {}, invert {})",
        loaded.source_width,
        loaded.source_height,
        loaded.width,
        loaded.height,
        config.threshold,
        config.invert
    );

    progress(
        out,
        format_args!("Creating Excel file: {}", config.output.display()),
    );
    write_pixel_art(&loaded.grid, &config.output).map_err(|source| CliError::OutputWrite {
        path: config.output.clone(),
        source,
    })?;

    progress(
        out,
        format_args!(
            "✓ Success! Created {}x{} pixel art in {}",
            loaded.width,
            loaded.height,
            config.output.display()
        ),
    );

    Ok(RunSummary {
        width: loaded.width,
        height: loaded.height,
        dark_cells: loaded.grid.count_dark(),
    })
}

/// Validate `args` and run the conversion with progress on stdout.
pub fn run_with_args(args: &Args) -> Result<RunSummary, CliError> {
    let config = PixelArtConfig::from_args(args)?;
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(&config, &mut out)
}

fn progress(out: &mut impl Write, line: fmt::Arguments<'_>) {
    let result = writeln!(out, "{line}").and_then(|()| out.flush());
    if let Err(err) = result {
        if err.kind() != io::ErrorKind::BrokenPipe {
            warn!("failed to write progress: {err}");
        }
    }
}

/// Map `-v` occurrences to a default log level.
pub fn verbosity_filter(verbose: u8) -> LevelFilter {
    match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    }
}

/// Install the stderr logger. `RUST_LOG`, when set, overrides `verbose`.
pub fn init_logging(verbose: u8) {
    let default = verbosity_filter(verbose).to_string().to_lowercase();
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default))
        .format_timestamp(None)
        .try_init();
}
