use thiserror::Error;

/// Errors raised when building a [`PixelGrid`] from nested rows.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GridShapeError {
    #[error("row {row} has {actual} pixels, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        actual: usize,
    },
}

/// Row-major matrix of dark/light decisions, one per output cell.
///
/// `true` renders as a dark (black) cell. Every row holds exactly `width` entries and there are
/// exactly `height` rows; the constructors are the only way to build a grid, so the invariant
/// holds for every value of this type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct PixelGrid {
    width: usize,
    height: usize,
    pixels: Vec<bool>,
}

impl PixelGrid {
    /// An all-light grid of the given dimensions.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            pixels: vec![false; width * height],
        }
    }

    /// Build a grid by evaluating `f(row, col)` for every position.
    pub fn from_fn(width: usize, height: usize, mut f: impl FnMut(usize, usize) -> bool) -> Self {
        let mut pixels = Vec::with_capacity(width * height);
        for row in 0..height {
            for col in 0..width {
                pixels.push(f(row, col));
            }
        }
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Build a grid from nested rows, rejecting ragged input.
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Result<Self, GridShapeError> {
        let width = rows.first().map_or(0, Vec::len);
        let height = rows.len();
        let mut pixels = Vec::with_capacity(width * height);
        for (row, values) in rows.into_iter().enumerate() {
            if values.len() != width {
                return Err(GridShapeError::RaggedRow {
                    row,
                    expected: width,
                    actual: values.len(),
                });
            }
            pixels.extend(values);
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns `None` when `(row, col)` lies outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<bool> {
        self.index(row, col).map(|idx| self.pixels[idx])
    }

    /// Iterate rows top to bottom; each row is a slice of exactly `width` entries.
    pub fn rows(&self) -> impl ExactSizeIterator<Item = &[bool]> + '_ {
        // `chunks_exact(0)` panics, and a zero-width grid has no pixels to yield anyway.
        let chunk = self.width.max(1);
        let rows = if self.width == 0 { 0 } else { self.height };
        self.pixels.chunks_exact(chunk).take(rows)
    }

    pub fn to_rows(&self) -> Vec<Vec<bool>> {
        self.rows().map(<[bool]>::to_vec).collect()
    }

    /// The complement of this grid: every dark cell becomes light and vice versa.
    pub fn inverted(&self) -> Self {
        Self {
            width: self.width,
            height: self.height,
            pixels: self.pixels.iter().map(|dark| !dark).collect(),
        }
    }

    pub fn count_dark(&self) -> usize {
        self.pixels.iter().filter(|dark| **dark).count()
    }

    fn index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.height && col < self.width).then(|| row * self.width + col)
    }
}
