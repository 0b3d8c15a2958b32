use std::collections::BTreeMap;

use crate::{Cell, CellRef, Range};

/// Identifier for a worksheet within its workbook.
pub type WorksheetId = u32;

/// Per-sheet view settings (subset of SpreadsheetML `sheetView`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SheetView {
    /// Whether the application draws gridlines between cells.
    pub show_grid_lines: bool,
}

impl Default for SheetView {
    fn default() -> Self {
        Self {
            show_grid_lines: true,
        }
    }
}

/// A worksheet: sparse cells plus column/row sizing and view settings.
///
/// Column widths are in Excel character-width units, row heights in points. Columns and rows
/// are 0-indexed like [`CellRef`].
#[derive(Clone, Debug, PartialEq)]
pub struct Worksheet {
    pub id: WorksheetId,
    pub name: String,
    pub view: SheetView,
    cells: BTreeMap<CellRef, Cell>,
    col_widths: BTreeMap<u32, f64>,
    row_heights: BTreeMap<u32, f64>,
}

impl Worksheet {
    pub fn new(id: WorksheetId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            view: SheetView::default(),
            cells: BTreeMap::new(),
            col_widths: BTreeMap::new(),
            row_heights: BTreeMap::new(),
        }
    }

    /// Set (or replace) a cell. Truly empty cells are removed from storage.
    pub fn set_cell(&mut self, cell_ref: CellRef, cell: Cell) {
        if cell.is_truly_empty() {
            self.cells.remove(&cell_ref);
        } else {
            self.cells.insert(cell_ref, cell);
        }
    }

    pub fn cell(&self, cell_ref: CellRef) -> Option<&Cell> {
        self.cells.get(&cell_ref)
    }

    /// Iterate stored cells in row-major order (ascending row, then ascending column).
    pub fn iter_cells(&self) -> impl Iterator<Item = (CellRef, &Cell)> + '_ {
        self.cells.iter().map(|(cell_ref, cell)| (*cell_ref, cell))
    }

    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    pub fn set_col_width(&mut self, col: u32, width: f64) {
        self.col_widths.insert(col, width);
    }

    /// Columns with an explicit width, ascending.
    pub fn col_widths(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.col_widths.iter().map(|(col, width)| (*col, *width))
    }

    pub fn set_row_height(&mut self, row: u32, height: f64) {
        self.row_heights.insert(row, height);
    }

    /// Rows with an explicit height, ascending.
    pub fn row_heights(&self) -> impl Iterator<Item = (u32, f64)> + '_ {
        self.row_heights.iter().map(|(row, height)| (*row, *height))
    }

    /// Bounding range of all stored cells, or `None` for an empty sheet.
    pub fn used_range(&self) -> Option<Range> {
        let mut refs = self.cells.keys();
        let first = *refs.next()?;
        let (mut max_row, mut min_col, mut max_col) = (first.row, first.col, first.col);
        for cell_ref in refs {
            max_row = max_row.max(cell_ref.row);
            min_col = min_col.min(cell_ref.col);
            max_col = max_col.max(cell_ref.col);
        }
        Some(Range::new(
            CellRef::new(first.row, min_col),
            CellRef::new(max_row, max_col),
        ))
    }
}
