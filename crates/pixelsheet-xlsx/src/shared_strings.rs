use std::collections::HashMap;
use std::io::Write;

use pixelsheet_model::{CellValue, Workbook};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;

use crate::writer::{XlsxWriteError, SPREADSHEETML_NS};

/// Workbook-wide string table (`xl/sharedStrings.xml`), in first-seen order.
#[derive(Debug, Clone, Default)]
pub(crate) struct SharedStrings {
    pub(crate) values: Vec<String>,
    index: HashMap<String, usize>,
    /// Number of cells referencing the table (the `count` attribute).
    references: usize,
}

impl SharedStrings {
    pub(crate) fn from_workbook(workbook: &Workbook) -> Self {
        let mut table = Self::default();
        for sheet in &workbook.sheets {
            for (_, cell) in sheet.iter_cells() {
                if let CellValue::String(s) = &cell.value {
                    table.insert(s);
                }
            }
        }
        table
    }

    fn insert(&mut self, value: &str) -> usize {
        self.references += 1;
        if let Some(idx) = self.index.get(value) {
            return *idx;
        }
        let idx = self.values.len();
        self.values.push(value.to_string());
        self.index.insert(value.to_string(), idx);
        idx
    }

    pub(crate) fn get(&self, value: &str) -> Option<usize> {
        self.index.get(value).copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub(crate) fn write_xml<W: Write>(&self, out: W) -> Result<(), XlsxWriteError> {
        let mut writer = Writer::new(out);
        writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

        let count = self.references.to_string();
        let unique = self.values.len().to_string();
        let mut sst = BytesStart::new("sst");
        sst.push_attribute(("xmlns", SPREADSHEETML_NS));
        sst.push_attribute(("count", count.as_str()));
        sst.push_attribute(("uniqueCount", unique.as_str()));
        writer.write_event(Event::Start(sst))?;

        for value in &self.values {
            writer.write_event(Event::Start(BytesStart::new("si")))?;
            let mut t = BytesStart::new("t");
            if value.trim() != value {
                t.push_attribute(("xml:space", "preserve"));
            }
            writer.write_event(Event::Start(t))?;
            writer.write_event(Event::Text(BytesText::new(value)))?;
            writer.write_event(Event::End(BytesEnd::new("t")))?;
            writer.write_event(Event::End(BytesEnd::new("si")))?;
        }

        writer.write_event(Event::End(BytesEnd::new("sst")))?;
        Ok(())
    }
}
