use std::fs;
use std::io::{Cursor, Read};
use std::path::Path;

use pixelsheet_xlsx::{
    render_workbook, write_pixel_art, write_workbook_to_writer, PixelGrid, RenderOptions,
    XlsxWriteError,
};
use pretty_assertions::assert_eq;
use zip::ZipArchive;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";

fn read_part(bytes: &[u8], name: &str) -> String {
    let mut archive = ZipArchive::new(Cursor::new(bytes)).expect("open xlsx zip");
    let mut xml = String::new();
    archive
        .by_name(name)
        .unwrap_or_else(|err| panic!("missing part {name}: {err}"))
        .read_to_string(&mut xml)
        .expect("read part");
    xml
}

fn part_names(bytes: &[u8]) -> Vec<String> {
    let archive = ZipArchive::new(Cursor::new(bytes)).expect("open xlsx zip");
    let mut names: Vec<String> = archive.file_names().map(str::to_string).collect();
    names.sort();
    names
}

/// A decoded view of the first worksheet: glyphs, fills and sizing.
#[derive(Debug)]
struct SheetSummary {
    /// (A1 ref, glyph, fill rgb) in document order.
    cells: Vec<(String, String, String)>,
    col_widths: Vec<(String, String)>,
    row_heights: Vec<(String, String)>,
    show_grid_lines: Option<String>,
}

fn summarize(bytes: &[u8]) -> SheetSummary {
    let sst_xml = read_part(bytes, "xl/sharedStrings.xml");
    let sst = roxmltree::Document::parse(&sst_xml).expect("parse sharedStrings");
    let strings: Vec<String> = sst
        .descendants()
        .filter(|n| n.has_tag_name((MAIN_NS, "t")))
        .map(|n| n.text().unwrap_or_default().to_string())
        .collect();

    let styles_xml = read_part(bytes, "xl/styles.xml");
    let styles = roxmltree::Document::parse(&styles_xml).expect("parse styles");
    let fills: Vec<String> = styles
        .descendants()
        .filter(|n| n.has_tag_name((MAIN_NS, "fill")))
        .map(|fill| {
            fill.descendants()
                .find(|n| n.has_tag_name((MAIN_NS, "fgColor")))
                .and_then(|n| n.attribute("rgb"))
                .unwrap_or("none")
                .to_string()
        })
        .collect();
    let cell_xfs = styles
        .descendants()
        .find(|n| n.has_tag_name((MAIN_NS, "cellXfs")))
        .expect("cellXfs");
    let xf_fills: Vec<usize> = cell_xfs
        .children()
        .filter(|n| n.has_tag_name((MAIN_NS, "xf")))
        .map(|xf| xf.attribute("fillId").unwrap().parse().unwrap())
        .collect();

    let sheet_xml = read_part(bytes, "xl/worksheets/sheet1.xml");
    let sheet = roxmltree::Document::parse(&sheet_xml).expect("parse sheet");
    let cells = sheet
        .descendants()
        .filter(|n| n.has_tag_name((MAIN_NS, "c")))
        .map(|c| {
            assert_eq!(c.attribute("t"), Some("s"));
            let idx: usize = c
                .descendants()
                .find(|n| n.has_tag_name((MAIN_NS, "v")))
                .and_then(|v| v.text())
                .expect("cell value")
                .parse()
                .expect("shared string index");
            let xf: usize = c.attribute("s").unwrap_or("0").parse().unwrap();
            (
                c.attribute("r").unwrap().to_string(),
                strings[idx].clone(),
                fills[xf_fills[xf]].clone(),
            )
        })
        .collect();
    let col_widths = sheet
        .descendants()
        .filter(|n| n.has_tag_name((MAIN_NS, "col")))
        .map(|col| {
            assert_eq!(col.attribute("min"), col.attribute("max"));
            assert_eq!(col.attribute("customWidth"), Some("1"));
            (
                col.attribute("min").unwrap().to_string(),
                col.attribute("width").unwrap().to_string(),
            )
        })
        .collect();
    let row_heights = sheet
        .descendants()
        .filter(|n| n.has_tag_name((MAIN_NS, "row")))
        .map(|row| {
            (
                row.attribute("r").unwrap().to_string(),
                row.attribute("ht").unwrap_or_default().to_string(),
            )
        })
        .collect();
    let show_grid_lines = sheet
        .descendants()
        .find(|n| n.has_tag_name((MAIN_NS, "sheetView")))
        .and_then(|n| n.attribute("showGridLines"))
        .map(str::to_string);

    SheetSummary {
        cells,
        col_widths,
        row_heights,
        show_grid_lines,
    }
}

fn cell(a1: &str, glyph: &str, rgb: &str) -> (String, String, String) {
    (a1.to_string(), glyph.to_string(), rgb.to_string())
}

fn write_to_temp(grid: &PixelGrid, dir: &Path) -> Vec<u8> {
    let out = dir.join("art.xlsx");
    write_pixel_art(grid, &out).expect("write pixel art");
    fs::read(&out).expect("read output")
}

#[test]
fn all_light_grid_renders_white_cells() {
    let dir = tempfile::tempdir().expect("temp dir");
    let grid = PixelGrid::from_rows(vec![vec![false, false], vec![false, false]]).unwrap();
    let bytes = write_to_temp(&grid, dir.path());

    let summary = summarize(&bytes);
    assert_eq!(
        summary.cells,
        vec![
            cell("A1", "░", "FFFFFFFF"),
            cell("B1", "░", "FFFFFFFF"),
            cell("A2", "░", "FFFFFFFF"),
            cell("B2", "░", "FFFFFFFF"),
        ]
    );
    assert_eq!(
        summary.col_widths,
        vec![
            ("1".to_string(), "2.14".to_string()),
            ("2".to_string(), "2.14".to_string())
        ]
    );
    assert_eq!(
        summary.row_heights,
        vec![
            ("1".to_string(), "15".to_string()),
            ("2".to_string(), "15".to_string())
        ]
    );
    assert_eq!(summary.show_grid_lines.as_deref(), Some("0"));
}

#[test]
fn all_dark_grid_renders_black_cells() {
    let dir = tempfile::tempdir().expect("temp dir");
    let grid = PixelGrid::from_rows(vec![vec![true, true], vec![true, true]]).unwrap();
    let summary = summarize(&write_to_temp(&grid, dir.path()));
    assert!(
        summary
            .cells
            .iter()
            .all(|(_, glyph, rgb)| glyph == "█" && rgb == "FF000000"),
        "{summary:?}"
    );
    assert_eq!(summary.cells.len(), 4);
}

#[test]
fn mixed_grid_maps_rows_and_columns() {
    let dir = tempfile::tempdir().expect("temp dir");
    // Diagonal across a 28-wide grid so column letters roll over past Z.
    let grid = PixelGrid::from_fn(28, 3, |row, col| col == row * 13);
    let summary = summarize(&write_to_temp(&grid, dir.path()));

    assert_eq!(summary.cells.len(), 28 * 3);
    let dark: Vec<&str> = summary
        .cells
        .iter()
        .filter(|(_, glyph, _)| glyph == "█")
        .map(|(a1, _, rgb)| {
            assert_eq!(rgb, "FF000000");
            a1.as_str()
        })
        .collect();
    assert_eq!(dark, vec!["A1", "N2", "AA3"]);
    assert_eq!(summary.col_widths.len(), 28);
    assert_eq!(summary.col_widths.last().unwrap().0, "28");
    assert_eq!(summary.row_heights.len(), 3);
}

#[test]
fn package_contains_the_expected_parts() {
    let mut cursor = Cursor::new(Vec::new());
    let workbook = render_workbook(&PixelGrid::new(1, 1), &RenderOptions::default()).unwrap();
    write_workbook_to_writer(&workbook, &mut cursor).expect("write in memory");
    let bytes = cursor.into_inner();

    assert_eq!(
        part_names(&bytes),
        vec![
            "[Content_Types].xml",
            "_rels/.rels",
            "xl/_rels/workbook.xml.rels",
            "xl/sharedStrings.xml",
            "xl/styles.xml",
            "xl/workbook.xml",
            "xl/worksheets/sheet1.xml",
        ]
    );

    let workbook_xml = read_part(&bytes, "xl/workbook.xml");
    let doc = roxmltree::Document::parse(&workbook_xml).expect("parse workbook");
    let sheets: Vec<&str> = doc
        .descendants()
        .filter(|n| n.has_tag_name((MAIN_NS, "sheet")))
        .filter_map(|n| n.attribute("name"))
        .collect();
    assert_eq!(sheets, vec!["Pixel Art"]);

    let content_types = read_part(&bytes, "[Content_Types].xml");
    for part in ["/xl/workbook.xml", "/xl/styles.xml", "/xl/sharedStrings.xml", "/xl/worksheets/sheet1.xml"] {
        assert!(
            content_types.contains(&format!(r#"PartName="{part}""#)),
            "missing override for {part}:\n{content_types}"
        );
    }

    let sheet_xml = read_part(&bytes, "xl/worksheets/sheet1.xml");
    assert!(sheet_xml.contains(r#"<dimension ref="A1"/>"#), "{sheet_xml}");
}

#[test]
fn overwrites_an_existing_output() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("art.xlsx");
    fs::write(&out, b"stale bytes").expect("seed stale output");

    write_pixel_art(&PixelGrid::new(3, 3), &out).expect("write pixel art");

    let bytes = fs::read(&out).expect("read output");
    assert_eq!(summarize(&bytes).cells.len(), 9);
}

#[test]
fn unwritable_destination_reports_io_error_and_leaves_no_file() {
    let dir = tempfile::tempdir().expect("temp dir");
    let out = dir.path().join("occupied");
    fs::create_dir(&out).expect("create directory at output path");

    let err = write_pixel_art(&PixelGrid::new(2, 2), &out).unwrap_err();
    assert!(matches!(err, XlsxWriteError::Io(_)), "{err:?}");
    assert!(out.is_dir());

    let leftovers: Vec<_> = fs::read_dir(dir.path())
        .expect("read_dir")
        .map(|e| e.expect("entry").path())
        .filter(|p| p.is_file())
        .collect();
    assert!(leftovers.is_empty(), "temp files left behind: {leftovers:?}");
}
