use std::collections::BTreeMap;
use std::fs::File;
use std::io::{Seek, Write};
use std::path::Path;

use log::debug;
use pixelsheet_fs::{atomic_write, AtomicWriteError};
use pixelsheet_model::{Cell, CellRef, CellValue, Workbook, Worksheet, EXCEL_MAX_COLS, EXCEL_MAX_ROWS};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use thiserror::Error;
use zip::write::FileOptions;
use zip::ZipWriter;

use crate::shared_strings::SharedStrings;
use crate::styles::StylesPart;

pub(crate) const SPREADSHEETML_NS: &str =
    "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const RELATIONSHIPS_NS: &str =
    "http://schemas.openxmlformats.org/officeDocument/2006/relationships";

#[derive(Debug, Error)]
pub enum XlsxWriteError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("invalid workbook: {0}")]
    Invalid(String),
}

impl From<AtomicWriteError<XlsxWriteError>> for XlsxWriteError {
    fn from(err: AtomicWriteError<XlsxWriteError>) -> Self {
        match err {
            AtomicWriteError::Io(err) => XlsxWriteError::Io(err),
            AtomicWriteError::Writer(err) => err,
        }
    }
}

/// Write `workbook` to `path` as an XLSX package.
///
/// The package is written to a temp file and renamed into place, so an existing file at `path`
/// is only replaced once the whole package has been written.
pub fn write_workbook(workbook: &Workbook, path: impl AsRef<Path>) -> Result<(), XlsxWriteError> {
    let path = path.as_ref();
    let bytes = atomic_write(path, |file: &mut File| {
        write_workbook_to_writer(workbook, &mut *file)?;
        Ok::<_, XlsxWriteError>(file.stream_position()?)
    })?;
    debug!("wrote {} ({bytes} bytes)", path.display());
    Ok(())
}

pub fn write_workbook_to_writer<W: Write + Seek>(
    workbook: &Workbook,
    writer: W,
) -> Result<(), XlsxWriteError> {
    if workbook.sheets.is_empty() {
        return Err(XlsxWriteError::Invalid(
            "a workbook needs at least one sheet".to_string(),
        ));
    }
    for sheet in &workbook.sheets {
        validate_sheet(workbook, sheet)?;
    }

    let shared_strings = SharedStrings::from_workbook(workbook);
    let styles = StylesPart::from_style_table(&workbook.styles);

    let mut zip = ZipWriter::new(writer);
    let options =
        FileOptions::<()>::default().compression_method(zip::CompressionMethod::Deflated);

    let start_part = |zip: &mut ZipWriter<W>, name: &str| -> Result<(), XlsxWriteError> {
        debug!("writing part {name}");
        zip.start_file(name, options)?;
        Ok(())
    };

    start_part(&mut zip, "[Content_Types].xml")?;
    zip.write_all(content_types_xml(workbook, &shared_strings).as_bytes())?;

    start_part(&mut zip, "_rels/.rels")?;
    zip.write_all(root_rels_xml().as_bytes())?;

    start_part(&mut zip, "xl/workbook.xml")?;
    zip.write_all(workbook_xml(workbook).as_bytes())?;

    start_part(&mut zip, "xl/_rels/workbook.xml.rels")?;
    zip.write_all(workbook_rels_xml(workbook, !shared_strings.is_empty()).as_bytes())?;

    start_part(&mut zip, "xl/styles.xml")?;
    zip.write_all(styles.to_xml().as_bytes())?;

    if !shared_strings.is_empty() {
        start_part(&mut zip, "xl/sharedStrings.xml")?;
        shared_strings.write_xml(&mut zip)?;
    }

    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        start_part(&mut zip, &format!("xl/worksheets/sheet{}.xml", idx + 1))?;
        write_sheet_xml(&mut zip, sheet, &shared_strings)?;
    }

    zip.finish()?;
    Ok(())
}

fn validate_sheet(workbook: &Workbook, sheet: &Worksheet) -> Result<(), XlsxWriteError> {
    let in_bounds = |row: u32, col: u32| row < EXCEL_MAX_ROWS && col < EXCEL_MAX_COLS;
    for (cell_ref, cell) in sheet.iter_cells() {
        if !in_bounds(cell_ref.row, cell_ref.col) {
            return Err(XlsxWriteError::Invalid(format!(
                "cell {cell_ref} in sheet {:?} is outside the worksheet grid",
                sheet.name
            )));
        }
        if workbook.styles.get(cell.style_id).is_none() {
            return Err(XlsxWriteError::Invalid(format!(
                "unknown style_id {} at {cell_ref} in sheet {:?}",
                cell.style_id, sheet.name
            )));
        }
    }
    if let Some((col, _)) = sheet.col_widths().find(|(col, _)| !in_bounds(0, *col)) {
        return Err(XlsxWriteError::Invalid(format!(
            "column {} is outside the worksheet grid",
            col + 1
        )));
    }
    if let Some((row, _)) = sheet.row_heights().find(|(row, _)| !in_bounds(*row, 0)) {
        return Err(XlsxWriteError::Invalid(format!(
            "row {} is outside the worksheet grid",
            row + 1
        )));
    }
    Ok(())
}

fn root_rels_xml() -> String {
    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">
  <Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/>
</Relationships>
"#
    .to_owned()
}

fn workbook_xml(workbook: &Workbook) -> String {
    let mut sheets_xml = String::new();
    for (idx, sheet) in workbook.sheets.iter().enumerate() {
        let sheet_number = idx + 1;
        sheets_xml.push_str(&format!(
            r#"<sheet name="{}" sheetId="{sheet_number}" r:id="rId{sheet_number}"/>"#,
            escape_xml(&sheet.name)
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{SPREADSHEETML_NS}" xmlns:r="{RELATIONSHIPS_NS}">
  <bookViews><workbookView activeTab="0"/></bookViews>
  <sheets>{sheets_xml}</sheets>
</workbook>
"#
    )
}

fn workbook_rels_xml(workbook: &Workbook, has_shared_strings: bool) -> String {
    let mut rels = String::new();
    for idx in 1..=workbook.sheets.len() {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{idx}" Type="{RELATIONSHIPS_NS}/worksheet" Target="worksheets/sheet{idx}.xml"/>"#
        ));
    }
    let mut next = workbook.sheets.len() + 1;
    rels.push_str(&format!(
        r#"<Relationship Id="rId{next}" Type="{RELATIONSHIPS_NS}/styles" Target="styles.xml"/>"#
    ));
    next += 1;
    if has_shared_strings {
        rels.push_str(&format!(
            r#"<Relationship Id="rId{next}" Type="{RELATIONSHIPS_NS}/sharedStrings" Target="sharedStrings.xml"/>"#
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{rels}</Relationships>
"#
    )
}

fn content_types_xml(workbook: &Workbook, shared_strings: &SharedStrings) -> String {
    let mut overrides = String::new();
    overrides.push_str(
        r#"<Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/>"#,
    );
    overrides.push_str(
        r#"<Override PartName="/xl/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.styles+xml"/>"#,
    );
    if !shared_strings.is_empty() {
        overrides.push_str(
            r#"<Override PartName="/xl/sharedStrings.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sharedStrings+xml"/>"#,
        );
    }
    for sheet_number in 1..=workbook.sheets.len() {
        overrides.push_str(&format!(
            r#"<Override PartName="/xl/worksheets/sheet{sheet_number}.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/>"#
        ));
    }

    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types">
  <Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/>
  <Default Extension="xml" ContentType="application/xml"/>
  {overrides}
</Types>
"#
    )
}

/// Stream one worksheet part.
///
/// Element order follows `CT_Worksheet`: `dimension`, `sheetViews`, `sheetFormatPr`, `cols`,
/// `sheetData`, `pageMargins`.
fn write_sheet_xml<W: Write>(
    out: W,
    sheet: &Worksheet,
    shared_strings: &SharedStrings,
) -> Result<(), XlsxWriteError> {
    let mut writer = Writer::new(out);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;

    let mut root = BytesStart::new("worksheet");
    root.push_attribute(("xmlns", SPREADSHEETML_NS));
    root.push_attribute(("xmlns:r", RELATIONSHIPS_NS));
    writer.write_event(Event::Start(root))?;

    let dimension = sheet
        .used_range()
        .map(|range| range.to_string())
        .unwrap_or_else(|| "A1".to_string());
    let mut dim = BytesStart::new("dimension");
    dim.push_attribute(("ref", dimension.as_str()));
    writer.write_event(Event::Empty(dim))?;

    writer.write_event(Event::Start(BytesStart::new("sheetViews")))?;
    let mut view = BytesStart::new("sheetView");
    if !sheet.view.show_grid_lines {
        view.push_attribute(("showGridLines", "0"));
    }
    view.push_attribute(("workbookViewId", "0"));
    writer.write_event(Event::Empty(view))?;
    writer.write_event(Event::End(BytesEnd::new("sheetViews")))?;

    let mut format_pr = BytesStart::new("sheetFormatPr");
    format_pr.push_attribute(("defaultRowHeight", "15"));
    writer.write_event(Event::Empty(format_pr))?;

    let widths: Vec<(u32, f64)> = sheet.col_widths().collect();
    if !widths.is_empty() {
        writer.write_event(Event::Start(BytesStart::new("cols")))?;
        for (col, width) in widths {
            let index = (col + 1).to_string();
            let width = width.to_string();
            let mut el = BytesStart::new("col");
            el.push_attribute(("min", index.as_str()));
            el.push_attribute(("max", index.as_str()));
            el.push_attribute(("width", width.as_str()));
            el.push_attribute(("customWidth", "1"));
            writer.write_event(Event::Empty(el))?;
        }
        writer.write_event(Event::End(BytesEnd::new("cols")))?;
    }

    // Rows must be ascending; a row is emitted when it has cells or a custom height.
    let mut rows: BTreeMap<u32, (Option<f64>, Vec<(CellRef, &Cell)>)> = BTreeMap::new();
    for (row, height) in sheet.row_heights() {
        rows.entry(row).or_default().0 = Some(height);
    }
    for (cell_ref, cell) in sheet.iter_cells() {
        rows.entry(cell_ref.row).or_default().1.push((cell_ref, cell));
    }

    if rows.is_empty() {
        writer.write_event(Event::Empty(BytesStart::new("sheetData")))?;
    } else {
        writer.write_event(Event::Start(BytesStart::new("sheetData")))?;
        for (row, (height, cells)) in rows {
            let number = (row + 1).to_string();
            let height = height.map(|h| h.to_string());
            let mut el = BytesStart::new("row");
            el.push_attribute(("r", number.as_str()));
            if let Some(height) = height.as_deref() {
                el.push_attribute(("ht", height));
                el.push_attribute(("customHeight", "1"));
            }
            if cells.is_empty() {
                writer.write_event(Event::Empty(el))?;
                continue;
            }
            writer.write_event(Event::Start(el))?;
            // `iter_cells` is row-major, so cells are already in ascending column order.
            for (cell_ref, cell) in cells {
                write_cell(&mut writer, cell_ref, cell, shared_strings)?;
            }
            writer.write_event(Event::End(BytesEnd::new("row")))?;
        }
        writer.write_event(Event::End(BytesEnd::new("sheetData")))?;
    }

    let mut margins = BytesStart::new("pageMargins");
    for (key, value) in [
        ("left", "0.7"),
        ("right", "0.7"),
        ("top", "0.75"),
        ("bottom", "0.75"),
        ("header", "0.3"),
        ("footer", "0.3"),
    ] {
        margins.push_attribute((key, value));
    }
    writer.write_event(Event::Empty(margins))?;

    writer.write_event(Event::End(BytesEnd::new("worksheet")))?;
    Ok(())
}

fn write_cell<W: Write>(
    writer: &mut Writer<W>,
    cell_ref: CellRef,
    cell: &Cell,
    shared_strings: &SharedStrings,
) -> Result<(), XlsxWriteError> {
    let a1 = cell_ref.to_a1();
    let style = cell.style_id.to_string();
    let mut el = BytesStart::new("c");
    el.push_attribute(("r", a1.as_str()));
    if cell.style_id != 0 {
        el.push_attribute(("s", style.as_str()));
    }

    match &cell.value {
        CellValue::Empty => writer.write_event(Event::Empty(el))?,
        CellValue::String(s) => {
            let idx = shared_strings.get(s).ok_or_else(|| {
                XlsxWriteError::Invalid(format!("string at {a1} missing from shared strings"))
            })?;
            el.push_attribute(("t", "s"));
            writer.write_event(Event::Start(el))?;
            writer.write_event(Event::Start(BytesStart::new("v")))?;
            writer.write_event(Event::Text(quick_xml::events::BytesText::new(
                &idx.to_string(),
            )))?;
            writer.write_event(Event::End(BytesEnd::new("v")))?;
            writer.write_event(Event::End(BytesEnd::new("c")))?;
        }
    }
    Ok(())
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&apos;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pixelsheet_model::{Color, Fill, Style};
    use std::io::{Cursor, Read};
    use zip::ZipArchive;

    fn part(bytes: &[u8], name: &str) -> String {
        let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open zip");
        let mut xml = String::new();
        archive
            .by_name(name)
            .expect("part exists")
            .read_to_string(&mut xml)
            .expect("read part");
        xml
    }

    fn write_to_vec(workbook: &Workbook) -> Result<Vec<u8>, XlsxWriteError> {
        let mut cursor = Cursor::new(Vec::new());
        write_workbook_to_writer(workbook, &mut cursor)?;
        Ok(cursor.into_inner())
    }

    struct FullDisk;

    impl Write for FullDisk {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Err(std::io::Error::new(std::io::ErrorKind::WriteZero, "disk full"))
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn xml_stream_failures_surface_as_io_errors() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Sheet1").unwrap();
        let sheet = &workbook.sheets[0];
        let err = write_sheet_xml(FullDisk, sheet, &SharedStrings::default()).unwrap_err();
        assert!(
            matches!(&err, XlsxWriteError::Io(io) if io.kind() == std::io::ErrorKind::WriteZero),
            "{err:?}"
        );
    }

    #[test]
    fn rejects_empty_workbooks() {
        let err = write_to_vec(&Workbook::new()).unwrap_err();
        assert!(matches!(err, XlsxWriteError::Invalid(_)), "{err:?}");
    }

    #[test]
    fn rejects_unknown_style_ids() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Sheet1").unwrap();
        workbook.sheets[0].set_cell(CellRef::new(0, 0), Cell::new("x").with_style(9));
        let err = write_to_vec(&workbook).unwrap_err();
        assert!(err.to_string().contains("unknown style_id 9"), "{err}");
    }

    #[test]
    fn rejects_cells_outside_the_worksheet_grid() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Sheet1").unwrap();
        workbook.sheets[0].set_cell(CellRef::new(0, EXCEL_MAX_COLS), Cell::new("x"));
        let err = write_to_vec(&workbook).unwrap_err();
        assert!(err.to_string().contains("outside the worksheet grid"), "{err}");
    }

    #[test]
    fn sheet_names_are_escaped_in_workbook_xml() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Fish & Chips").unwrap();
        let bytes = write_to_vec(&workbook).unwrap();
        let xml = part(&bytes, "xl/workbook.xml");
        assert!(xml.contains(r#"name="Fish &amp; Chips""#), "{xml}");
        // No string cells: no shared strings part or relationship.
        let rels = part(&bytes, "xl/_rels/workbook.xml.rels");
        assert!(!rels.contains("sharedStrings"), "{rels}");
    }

    #[test]
    fn styled_cells_reference_xf_by_style_id() {
        let mut workbook = Workbook::new();
        workbook.add_sheet("Sheet1").unwrap();
        let black = workbook.intern_style(Style::with_fill(Fill::solid(Color::black())));
        let sheet = &mut workbook.sheets[0];
        sheet.set_cell(CellRef::new(0, 0), Cell::new("█").with_style(black));
        sheet.set_cell(CellRef::new(0, 1), Cell::new("plain"));
        sheet.set_row_height(2, 30.0);

        let bytes = write_to_vec(&workbook).unwrap();
        let xml = part(&bytes, "xl/worksheets/sheet1.xml");
        assert!(xml.contains(r#"<c r="A1" s="1" t="s"><v>0</v></c>"#), "{xml}");
        assert!(xml.contains(r#"<c r="B1" t="s"><v>1</v></c>"#), "{xml}");
        assert!(xml.contains(r#"<row r="3" ht="30" customHeight="1"/>"#), "{xml}");
        assert!(xml.contains(r#"<sheetView workbookViewId="0"/>"#), "{xml}");
        assert!(!xml.contains("<cols>"), "{xml}");
    }
}
