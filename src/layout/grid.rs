//! Value types produced by the pagination engine.
//!
//! A [`Document`] is a non-empty list of [`Page`]s, each holding up to
//! `rows_per_page` [`Row`]s of exactly `cols` [`Glyph`]s.

use serde::{Serialize, Serializer};

/// Number of character cells per row on the attestation form.
pub const COLS: usize = 20;

/// Number of rows per page on the attestation form.
pub const ROWS_PER_PAGE: usize = 10;

/// Largest accepted value for either grid dimension.
pub const MAX_DIMENSION: usize = 1024;

/// Grid dimensions used by the pagination engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridGeometry {
    pub cols: usize,
    pub rows_per_page: usize,
}

impl GridGeometry {
    /// Dimensions are clamped to `1..=MAX_DIMENSION` so pagination stays total.
    pub fn new(cols: usize, rows_per_page: usize) -> Self {
        Self {
            cols: cols.clamp(1, MAX_DIMENSION),
            rows_per_page: rows_per_page.clamp(1, MAX_DIMENSION),
        }
    }
}

impl Default for GridGeometry {
    fn default() -> Self {
        Self::new(COLS, ROWS_PER_PAGE)
    }
}

/// One grid cell: a single display character or an explicit blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Char(char),
    Blank,
}

impl Glyph {
    pub fn is_blank(&self) -> bool {
        matches!(self, Glyph::Blank)
    }

    pub fn as_char(&self) -> Option<char> {
        match self {
            Glyph::Char(c) => Some(*c),
            Glyph::Blank => None,
        }
    }
}

/// Blanks serialize as empty strings, which is what renderers draw as an empty cell.
impl Serialize for Glyph {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Glyph::Char(c) => {
                let mut buf = [0u8; 4];
                serializer.serialize_str(c.encode_utf8(&mut buf))
            }
            Glyph::Blank => serializer.serialize_str(""),
        }
    }
}

/// A fixed-width line of cells, left to right.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Row {
    cells: Vec<Glyph>,
}

impl Row {
    /// Builds a row from at most `cols` glyphs, padding the tail with blanks.
    pub(crate) fn padded(mut cells: Vec<Glyph>, cols: usize) -> Self {
        debug_assert!(cells.len() <= cols);
        cells.resize(cols, Glyph::Blank);
        Self { cells }
    }

    pub fn cells(&self) -> &[Glyph] {
        &self.cells
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// True when every cell is blank.
    pub fn is_blank(&self) -> bool {
        self.cells.iter().all(Glyph::is_blank)
    }

    /// Non-blank characters in order.
    pub fn text(&self) -> String {
        self.cells.iter().filter_map(Glyph::as_char).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Page {
    rows: Vec<Row>,
}

impl Page {
    pub(crate) fn new(rows: Vec<Row>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    /// Row at `index`, if the page holds content that far down.
    pub fn row(&self, index: usize) -> Option<&Row> {
        self.rows.get(index)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Paginated letter body. Always holds at least one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Document {
    pages: Vec<Page>,
    #[serde(skip)]
    geometry: GridGeometry,
}

impl Document {
    pub(crate) fn new(pages: Vec<Page>, geometry: GridGeometry) -> Self {
        let pages = if pages.is_empty() {
            vec![Page::new(Vec::new())]
        } else {
            pages
        };
        Self { pages, geometry }
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn geometry(&self) -> GridGeometry {
        self.geometry
    }

    pub fn total_rows(&self) -> usize {
        self.pages.iter().map(Page::row_count).sum()
    }

    /// Every cell in reading order, padding included.
    pub fn glyphs(&self) -> impl Iterator<Item = &Glyph> + '_ {
        self.pages
            .iter()
            .flat_map(|page| page.rows.iter())
            .flat_map(|row| row.cells.iter())
    }

    /// Non-blank characters in reading order.
    pub fn text(&self) -> String {
        self.glyphs().filter_map(Glyph::as_char).collect()
    }
}
