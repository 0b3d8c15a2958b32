use thiserror::Error;

use crate::{Style, StyleTable, Worksheet, WorksheetId};

/// Excel's maximum worksheet name length, in UTF-16 code units.
pub const EXCEL_MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_NAME_CHARS: [char; 7] = [':', '\\', '/', '?', '*', '[', ']'];

/// Errors raised when adding a worksheet with an invalid name.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum SheetNameError {
    #[error("sheet name cannot be empty")]
    Empty,
    #[error("sheet name cannot exceed {EXCEL_MAX_SHEET_NAME_LEN} characters")]
    TooLong,
    #[error("sheet name contains invalid character `{0}`")]
    InvalidCharacter(char),
    #[error("sheet name cannot begin or end with an apostrophe")]
    LeadingOrTrailingApostrophe,
    #[error("sheet name already exists: {0}")]
    Duplicate(String),
}

/// Validate a worksheet name against Excel's rules.
pub(crate) fn validate_sheet_name(name: &str) -> Result<(), SheetNameError> {
    if name.trim().is_empty() {
        return Err(SheetNameError::Empty);
    }
    if name.encode_utf16().count() > EXCEL_MAX_SHEET_NAME_LEN {
        return Err(SheetNameError::TooLong);
    }
    if let Some(ch) = name.chars().find(|c| FORBIDDEN_SHEET_NAME_CHARS.contains(c)) {
        return Err(SheetNameError::InvalidCharacter(ch));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Err(SheetNameError::LeadingOrTrailingApostrophe);
    }
    Ok(())
}

/// A workbook: ordered worksheets plus the shared style table.
#[derive(Clone, Debug)]
pub struct Workbook {
    pub sheets: Vec<Worksheet>,
    pub styles: StyleTable,
    next_sheet_id: WorksheetId,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    pub fn new() -> Self {
        Self {
            sheets: Vec::new(),
            styles: StyleTable::new(),
            next_sheet_id: 1,
        }
    }

    /// Add a worksheet, returning its id.
    ///
    /// Names are compared case-insensitively, matching Excel.
    pub fn add_sheet(&mut self, name: impl Into<String>) -> Result<WorksheetId, SheetNameError> {
        let name = name.into();
        validate_sheet_name(&name)?;
        let folded = name.to_lowercase();
        if self.sheets.iter().any(|s| s.name.to_lowercase() == folded) {
            return Err(SheetNameError::Duplicate(name));
        }

        let id = self.next_sheet_id;
        self.next_sheet_id = self.next_sheet_id.wrapping_add(1);
        self.sheets.push(Worksheet::new(id, name));
        Ok(id)
    }

    /// Intern a style into the workbook's style table.
    pub fn intern_style(&mut self, style: Style) -> u32 {
        self.styles.intern(style)
    }
}
