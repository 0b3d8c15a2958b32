/// Excel-compatible maximum rows per worksheet (1,048,576).
pub const EXCEL_MAX_ROWS: u32 = 1_048_576;

/// Excel-compatible maximum columns per worksheet (16,384).
pub const EXCEL_MAX_COLS: u32 = 16_384;

/// A cell value.
///
/// Pixel art only ever stores glyph text, so the value space is limited to empty and string
/// cells.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum CellValue {
    #[default]
    Empty,
    String(String),
}

impl CellValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            CellValue::Empty => None,
            CellValue::String(s) => Some(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        CellValue::String(value.to_string())
    }
}

impl From<char> for CellValue {
    fn from(value: char) -> Self {
        CellValue::String(value.to_string())
    }
}

/// A single worksheet cell: its value plus a reference into the workbook's style table.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Cell {
    pub value: CellValue,
    /// Style id into [`crate::StyleTable`]; `0` is the default style.
    pub style_id: u32,
}

impl Cell {
    pub fn new(value: impl Into<CellValue>) -> Self {
        Self {
            value: value.into(),
            style_id: 0,
        }
    }

    pub fn with_style(mut self, style_id: u32) -> Self {
        self.style_id = style_id;
        self
    }

    /// Returns true if the cell carries neither a value nor a non-default style.
    pub fn is_truly_empty(&self) -> bool {
        self.value == CellValue::Empty && self.style_id == 0
    }
}
