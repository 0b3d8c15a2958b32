use std::collections::HashMap;

/// An ARGB color.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Color {
    pub argb: u32,
}

impl Color {
    pub const fn black() -> Self {
        Self { argb: 0xFF000000 }
    }

    pub const fn white() -> Self {
        Self { argb: 0xFFFFFFFF }
    }

    /// `AARRGGBB`, as SpreadsheetML `rgb=` attributes expect.
    pub fn to_argb_hex(self) -> String {
        format!("{:08X}", self.argb)
    }
}

/// Pattern type of a cell fill (subset of SpreadsheetML `ST_PatternType`).
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub enum FillPattern {
    #[default]
    None,
    Solid,
}

impl FillPattern {
    pub fn as_ooxml(self) -> &'static str {
        match self {
            FillPattern::None => "none",
            FillPattern::Solid => "solid",
        }
    }
}

/// Fill (background) formatting.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Fill {
    pub pattern: FillPattern,
    pub color: Option<Color>,
}

impl Fill {
    pub const fn solid(color: Color) -> Self {
        Self {
            pattern: FillPattern::Solid,
            color: Some(color),
        }
    }
}

/// Cell style (subset).
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct Style {
    pub fill: Option<Fill>,
}

impl Style {
    pub fn with_fill(fill: Fill) -> Self {
        Self { fill: Some(fill) }
    }
}

/// Deduplicated table of styles.
///
/// Cells store a `style_id` referencing this table. Style `0` is always the
/// default (empty) style.
#[derive(Clone, Debug)]
pub struct StyleTable {
    styles: Vec<Style>,
    index: HashMap<Style, u32>,
}

impl Default for StyleTable {
    fn default() -> Self {
        Self::new()
    }
}

impl StyleTable {
    pub fn new() -> Self {
        Self {
            styles: vec![Style::default()],
            index: HashMap::from([(Style::default(), 0)]),
        }
    }

    /// Insert (or reuse) a style, returning its ID.
    pub fn intern(&mut self, style: Style) -> u32 {
        if let Some(id) = self.index.get(&style) {
            return *id;
        }
        let id = self.styles.len() as u32;
        self.styles.push(style.clone());
        self.index.insert(style, id);
        id
    }

    pub fn get(&self, style_id: u32) -> Option<&Style> {
        self.styles.get(style_id as usize)
    }

    pub fn len(&self) -> usize {
        self.styles.len()
    }

    /// Always false: the default style occupies id `0`.
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &Style)> {
        self.styles
            .iter()
            .enumerate()
            .map(|(idx, style)| (idx as u32, style))
    }
}
