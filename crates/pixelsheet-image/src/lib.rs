//! Image loading for pixelsheet.
//!
//! [`load_pixel_grid`] decodes an image file, converts it to 8-bit luma, resizes it with a
//! Lanczos filter and thresholds every sample into a [`PixelGrid`]. The thresholding step is
//! exposed separately ([`threshold_image`], [`is_dark`]) so grid logic can be exercised without
//! going through a resampler.

mod loader;
mod threshold;

pub use loader::{
    derive_height, load_greyscale, load_pixel_grid, resize_greyscale, LoadError, LoadOptions,
    LoadedGrid, RESIZE_FILTER,
};
pub use threshold::{is_dark, threshold_image, DEFAULT_THRESHOLD};

pub use pixelsheet_model::PixelGrid;
