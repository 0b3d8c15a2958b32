use std::collections::HashMap;

use pixelsheet_model::{Fill, FillPattern, StyleTable};

/// The two fills every SpreadsheetML styles part starts with; Excel reserves ids 0 and 1.
const RESERVED_FILLS: &str = r#"<fill><patternFill patternType="none"/></fill><fill><patternFill patternType="gray125"/></fill>"#;
const RESERVED_FILL_COUNT: usize = 2;

/// `xl/styles.xml` derived from a [`StyleTable`].
///
/// Each style id becomes the `cellXfs` entry with the same index, so cells can use their
/// `style_id` directly as `s=`.
#[derive(Debug, Clone)]
pub(crate) struct StylesPart {
    fills: Vec<Fill>,
    /// Per style id: fill index into the final `<fills>` list (reserved fills included).
    xf_fill_ids: Vec<usize>,
}

impl StylesPart {
    pub(crate) fn from_style_table(table: &StyleTable) -> Self {
        let mut fills: Vec<Fill> = Vec::new();
        let mut fill_index: HashMap<Fill, usize> = HashMap::new();
        let mut xf_fill_ids = Vec::with_capacity(table.len());

        for (_, style) in table.iter() {
            let fill_id = match style.fill.as_ref().filter(|f| !is_empty_fill(f)) {
                None => 0,
                Some(fill) => *fill_index.entry(fill.clone()).or_insert_with(|| {
                    fills.push(fill.clone());
                    RESERVED_FILL_COUNT + fills.len() - 1
                }),
            };
            xf_fill_ids.push(fill_id);
        }

        Self { fills, xf_fill_ids }
    }

    pub(crate) fn cell_xfs_count(&self) -> usize {
        self.xf_fill_ids.len()
    }

    pub(crate) fn to_xml(&self) -> String {
        let mut out = String::new();
        out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        out.push('\n');
        out.push_str(r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);
        out.push('\n');
        out.push_str(
            r#"  <fonts count="1"><font><sz val="11"/><name val="Calibri"/><family val="2"/></font></fonts>"#,
        );
        out.push('\n');

        out.push_str(&format!(
            r#"  <fills count="{}">{RESERVED_FILLS}"#,
            RESERVED_FILL_COUNT + self.fills.len()
        ));
        for fill in &self.fills {
            out.push_str(&fill_xml(fill));
        }
        out.push_str("</fills>\n");

        out.push_str(r#"  <borders count="1"><border><left/><right/><top/><bottom/><diagonal/></border></borders>"#);
        out.push('\n');
        out.push_str(r#"  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);
        out.push('\n');

        out.push_str(&format!(r#"  <cellXfs count="{}">"#, self.cell_xfs_count()));
        out.push('\n');
        for fill_id in &self.xf_fill_ids {
            if *fill_id == 0 {
                out.push_str(r#"    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>"#);
            } else {
                out.push_str(&format!(
                    r#"    <xf numFmtId="0" fontId="0" fillId="{fill_id}" borderId="0" xfId="0" applyFill="1"/>"#
                ));
            }
            out.push('\n');
        }
        out.push_str("  </cellXfs>\n");

        out.push_str(r#"  <cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);
        out.push('\n');
        out.push_str("</styleSheet>\n");
        out
    }
}

fn is_empty_fill(fill: &Fill) -> bool {
    fill.pattern == FillPattern::None
}

fn fill_xml(fill: &Fill) -> String {
    let mut out = format!(
        r#"<fill><patternFill patternType="{}">"#,
        fill.pattern.as_ooxml()
    );
    if let Some(color) = fill.color {
        out.push_str(&format!(
            r#"<fgColor rgb="{}"/><bgColor indexed="64"/>"#,
            color.to_argb_hex()
        ));
    }
    out.push_str("</patternFill></fill>");
    out
}
