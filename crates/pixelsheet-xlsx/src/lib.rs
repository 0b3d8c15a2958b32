//! XLSX output for pixelsheet.
//!
//! [`render_workbook`] turns a [`PixelGrid`] into a one-sheet [`Workbook`] whose cells are
//! filled black or white and sized to look square; [`write_workbook`] serializes any workbook
//! as an Office Open XML package. [`write_pixel_art`] does both.

mod render;
mod shared_strings;
mod styles;
mod writer;

pub use render::{
    render_workbook, write_pixel_art, write_pixel_art_with_options, RenderOptions,
    DEFAULT_COLUMN_WIDTH, DEFAULT_ROW_HEIGHT, DEFAULT_SHEET_NAME, DARK_GLYPH, LIGHT_GLYPH,
};
pub use writer::{write_workbook, write_workbook_to_writer, XlsxWriteError};

pub use pixelsheet_model::{PixelGrid, Workbook};
