//! `pixelsheet-model` defines the in-memory data structures shared by the pixelsheet crates.
//!
//! - [`PixelGrid`]: the dark/light decision for every output cell
//! - [`Workbook`] / [`Worksheet`]: the spreadsheet document the grid is rendered into
//! - [`Style`] / [`StyleTable`]: deduplicated cell fills referenced by `style_id`

mod address;
mod cell;
mod grid;
mod style;
mod workbook;
mod worksheet;

pub use address::{CellRef, Range};
pub use cell::{Cell, CellValue, EXCEL_MAX_COLS, EXCEL_MAX_ROWS};
pub use grid::{GridShapeError, PixelGrid};
pub use style::{Color, Fill, FillPattern, Style, StyleTable};
pub use workbook::{SheetNameError, Workbook, EXCEL_MAX_SHEET_NAME_LEN};
pub use worksheet::{SheetView, Worksheet, WorksheetId};
