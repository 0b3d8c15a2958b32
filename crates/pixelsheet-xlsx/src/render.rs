use std::path::Path;

use log::debug;
use pixelsheet_model::{
    Cell, CellRef, Color, Fill, PixelGrid, Style, Workbook, EXCEL_MAX_COLS, EXCEL_MAX_ROWS,
};

use crate::writer::{write_workbook, XlsxWriteError};

/// Glyph stored in dark cells (U+2588 FULL BLOCK).
pub const DARK_GLYPH: char = '█';
/// Glyph stored in light cells (U+2591 LIGHT SHADE).
pub const LIGHT_GLYPH: char = '░';

/// Column width in Excel character units; together with [`DEFAULT_ROW_HEIGHT`] this renders
/// cells roughly square at 100% zoom.
pub const DEFAULT_COLUMN_WIDTH: f64 = 2.14;
/// Row height in points.
pub const DEFAULT_ROW_HEIGHT: f64 = 15.0;
pub const DEFAULT_SHEET_NAME: &str = "Pixel Art";

/// How a grid is laid out on the sheet.
#[derive(Clone, Debug, PartialEq)]
pub struct RenderOptions {
    pub sheet_name: String,
    pub column_width: f64,
    pub row_height: f64,
    pub dark_glyph: char,
    pub light_glyph: char,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            column_width: DEFAULT_COLUMN_WIDTH,
            row_height: DEFAULT_ROW_HEIGHT,
            dark_glyph: DARK_GLYPH,
            light_glyph: LIGHT_GLYPH,
        }
    }
}

/// Build a single-sheet workbook with one cell per grid position.
///
/// Grid `(row, col)` lands in cell `(row + 1, col + 1)` (1-indexed), i.e. pixel `(0, 0)` is
/// `A1`. Dark cells get a solid black fill and [`RenderOptions::dark_glyph`]; light cells a
/// solid white fill and [`RenderOptions::light_glyph`]. Every column of the grid gets
/// `column_width`, every row `row_height`, and gridlines are hidden.
pub fn render_workbook(
    grid: &PixelGrid,
    options: &RenderOptions,
) -> Result<Workbook, XlsxWriteError> {
    let (width, height) = (grid.width(), grid.height());
    if width > EXCEL_MAX_COLS as usize || height > EXCEL_MAX_ROWS as usize {
        return Err(XlsxWriteError::Invalid(format!(
            "a {width}x{height} grid exceeds the worksheet limit of {EXCEL_MAX_COLS} columns by {EXCEL_MAX_ROWS} rows"
        )));
    }

    let mut workbook = Workbook::new();
    let dark_style = workbook.intern_style(Style::with_fill(Fill::solid(Color::black())));
    let light_style = workbook.intern_style(Style::with_fill(Fill::solid(Color::white())));
    workbook
        .add_sheet(options.sheet_name.as_str())
        .map_err(|err| XlsxWriteError::Invalid(err.to_string()))?;
    // A fresh workbook: the sheet just added is the only one.
    let sheet = &mut workbook.sheets[0];

    for (row, pixels) in grid.rows().enumerate() {
        for (col, &dark) in pixels.iter().enumerate() {
            let cell = if dark {
                Cell::new(options.dark_glyph).with_style(dark_style)
            } else {
                Cell::new(options.light_glyph).with_style(light_style)
            };
            sheet.set_cell(CellRef::new(row as u32, col as u32), cell);
        }
    }

    for col in 0..width as u32 {
        sheet.set_col_width(col, options.column_width);
    }
    for row in 0..height as u32 {
        sheet.set_row_height(row, options.row_height);
    }
    sheet.view.show_grid_lines = false;

    debug!(
        "rendered {width}x{height} grid into sheet {:?} ({} dark cells)",
        options.sheet_name,
        grid.count_dark()
    );
    Ok(workbook)
}

/// Render `grid` with default options and write it to `path`, replacing any existing file.
pub fn write_pixel_art(grid: &PixelGrid, path: impl AsRef<Path>) -> Result<(), XlsxWriteError> {
    write_pixel_art_with_options(grid, path, &RenderOptions::default())
}

pub fn write_pixel_art_with_options(
    grid: &PixelGrid,
    path: impl AsRef<Path>,
    options: &RenderOptions,
) -> Result<(), XlsxWriteError> {
    let workbook = render_workbook(grid, options)?;
    write_workbook(&workbook, path)
}
