use std::io;
use std::path::{Path, PathBuf};

use image::imageops::{self, FilterType};
use image::{GrayImage, ImageError, ImageReader};
use log::debug;
use pixelsheet_model::{PixelGrid, EXCEL_MAX_COLS, EXCEL_MAX_ROWS};
use thiserror::Error;

use crate::threshold::{threshold_image, DEFAULT_THRESHOLD};

/// Resampling filter used to shrink (or enlarge) the source image to the grid size.
pub const RESIZE_FILTER: FilterType = FilterType::Lanczos3;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Input file '{}' not found.", path.display())]
    InputNotFound { path: PathBuf },
    #[error("processing image '{}': {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: ImageError,
    },
    #[error("processing image '{}': {reason}", path.display())]
    InvalidDimensions { path: PathBuf, reason: String },
}

impl LoadError {
    pub fn path(&self) -> &Path {
        match self {
            LoadError::InputNotFound { path }
            | LoadError::Decode { path, .. }
            | LoadError::InvalidDimensions { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, LoadError::InputNotFound { .. })
    }

    fn from_image_error(path: &Path, err: ImageError) -> Self {
        match err {
            ImageError::IoError(io) if io.kind() == io::ErrorKind::NotFound => {
                LoadError::InputNotFound {
                    path: path.to_path_buf(),
                }
            }
            source => LoadError::Decode {
                path: path.to_path_buf(),
                source,
            },
        }
    }
}

/// Target grid size and thresholding parameters.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadOptions {
    /// Grid width in cells.
    pub width: u32,
    /// Grid height in cells; derived from the source aspect ratio when `None`.
    pub height: Option<u32>,
    /// Samples strictly below this intensity are dark.
    pub threshold: u8,
    /// Flip every dark/light decision.
    pub invert: bool,
}

impl LoadOptions {
    /// Options for a grid `width` cells wide with a derived height, the default threshold and
    /// no inversion.
    pub fn new(width: u32) -> Self {
        Self {
            width,
            height: None,
            threshold: DEFAULT_THRESHOLD,
            invert: false,
        }
    }
}

/// A thresholded grid plus the dimensions it was resolved from.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoadedGrid {
    pub grid: PixelGrid,
    pub width: u32,
    pub height: u32,
    pub source_width: u32,
    pub source_height: u32,
}

/// Grid height preserving the source aspect ratio: `floor(width * source_height / source_width)`.
///
/// Returns `None` when the source has no width or the result does not fit in `u32`. The result
/// may be `0` for very wide sources; callers decide whether that is usable.
pub fn derive_height(width: u32, source_width: u32, source_height: u32) -> Option<u32> {
    if source_width == 0 {
        return None;
    }
    let height = u64::from(width) * u64::from(source_height) / u64::from(source_width);
    u32::try_from(height).ok()
}

/// Decode `path` and convert it to 8-bit luma.
///
/// The format is sniffed from the file contents, falling back to the extension.
pub fn load_greyscale(path: &Path) -> Result<GrayImage, LoadError> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|err| LoadError::from_image_error(path, ImageError::IoError(err)))?;
    let decoded = reader
        .decode()
        .map_err(|err| LoadError::from_image_error(path, err))?;
    Ok(decoded.into_luma8())
}

/// Resize a greyscale image to exactly `width` x `height`.
pub fn resize_greyscale(image: &GrayImage, width: u32, height: u32) -> GrayImage {
    imageops::resize(image, width, height, RESIZE_FILTER)
}

/// Decode, resize and threshold `path` into a pixel grid.
///
/// The grid size is checked against the worksheet limits before any resampling happens.
pub fn load_pixel_grid(
    path: impl AsRef<Path>,
    options: &LoadOptions,
) -> Result<LoadedGrid, LoadError> {
    let path = path.as_ref();
    let invalid = |reason: String| LoadError::InvalidDimensions {
        path: path.to_path_buf(),
        reason,
    };

    let source = load_greyscale(path)?;
    let (source_width, source_height) = source.dimensions();
    debug!(
        "decoded {} ({source_width}x{source_height})",
        path.display()
    );
    if source_width == 0 || source_height == 0 {
        return Err(invalid(format!(
            "image has no pixels ({source_width}x{source_height})"
        )));
    }

    let width = options.width;
    if width == 0 {
        return Err(invalid("target width must be positive".to_string()));
    }
    let height = match options.height {
        Some(height) => height,
        None => derive_height(width, source_width, source_height).ok_or_else(|| {
            invalid(format!(
                "cannot derive a height for width {width} from {source_width}x{source_height}"
            ))
        })?,
    };
    if height == 0 {
        return Err(invalid(format!(
            "{source_width}x{source_height} scaled to width {width} has zero height"
        )));
    }
    if width > EXCEL_MAX_COLS || height > EXCEL_MAX_ROWS {
        return Err(invalid(format!(
            "a {width}x{height} grid exceeds the worksheet limit of {EXCEL_MAX_COLS} columns by {EXCEL_MAX_ROWS} rows"
        )));
    }

    debug!(
        "resizing to {width}x{height} with {RESIZE_FILTER:?} (threshold {}, invert {})",
        options.threshold, options.invert
    );
    let resized = resize_greyscale(&source, width, height);
    let grid = threshold_image(&resized, options.threshold, options.invert);
    debug!("{} of {} cells are dark", grid.count_dark(), grid.width() * grid.height());

    Ok(LoadedGrid {
        grid,
        width,
        height,
        source_width,
        source_height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn derived_height_truncates() {
        assert_eq!(derive_height(2, 2, 2), Some(2));
        assert_eq!(derive_height(10, 3, 2), Some(6)); // 6.67
        assert_eq!(derive_height(10, 3, 4), Some(13)); // 13.33
        assert_eq!(derive_height(100, 640, 480), Some(75));
        assert_eq!(derive_height(7, 1000, 1), Some(0));
    }

    #[test]
    fn derived_height_handles_degenerate_sources() {
        assert_eq!(derive_height(10, 0, 5), None);
        assert_eq!(derive_height(u32::MAX, 1, u32::MAX), None);
        assert_eq!(derive_height(u32::MAX, u32::MAX, 3), Some(3));
    }

    #[test]
    fn load_options_defaults() {
        let options = LoadOptions::new(32);
        assert_eq!(options.width, 32);
        assert_eq!(options.height, None);
        assert_eq!(options.threshold, 128);
        assert!(!options.invert);
    }
}
