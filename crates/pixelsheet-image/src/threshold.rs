use image::GrayImage;
use pixelsheet_model::PixelGrid;

/// Intensity cutoff used when none is given: samples below mid-grey are dark.
pub const DEFAULT_THRESHOLD: u8 = 128;

/// Classify one greyscale sample.
///
/// A sample is dark when `intensity < threshold` (strictly), so a sample equal to the
/// threshold is light. `invert` flips the result after the comparison.
#[inline]
pub fn is_dark(intensity: u8, threshold: u8, invert: bool) -> bool {
    (intensity < threshold) != invert
}

/// Threshold every sample of `image` into a grid with the image's dimensions.
///
/// Grid `(row, col)` is image pixel `(x = col, y = row)`.
pub fn threshold_image(image: &GrayImage, threshold: u8, invert: bool) -> PixelGrid {
    let width = image.width() as usize;
    let height = image.height() as usize;
    PixelGrid::from_fn(width, height, |row, col| {
        let [intensity] = image.get_pixel(col as u32, row as u32).0;
        is_dark(intensity, threshold, invert)
    })
}
