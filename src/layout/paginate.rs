//! Grid pagination engine.
//!
//! Lays free text out one character per cell. A line break pads the current
//! row with blanks up to the next row boundary; a break that already sits on
//! a boundary has no effect, so consecutive breaks never produce blank rows.
//! A `\r\n` pair is one break; a lone `\r` is an ordinary character cell.

use lazy_static::lazy_static;
use regex::Regex;

use super::grid::{Document, Glyph, GridGeometry, Page, Row, MAX_DIMENSION};

lazy_static! {
    /// Emphasis and heading markers that must never reach the printed form.
    static ref MARKUP: Regex = Regex::new(r"[*_#]").unwrap();
}

/// Removes markup tokens from the text.
pub fn strip_markup(text: &str) -> String {
    MARKUP.replace_all(text, "").into_owned()
}

/// Flattens text into a glyph stream with line breaks expanded to padding.
///
/// The stream is not padded at its end; a trailing partial row stays short.
pub fn layout_glyphs(text: &str, cols: usize) -> Vec<Glyph> {
    let cols = cols.clamp(1, MAX_DIMENSION);
    let mut glyphs = Vec::with_capacity(text.len());

    for ch in text.chars() {
        if ch == '\n' {
            let filled = glyphs.len() % cols;
            if filled > 0 {
                glyphs.resize(glyphs.len() + (cols - filled), Glyph::Blank);
            }
        } else {
            glyphs.push(Glyph::Char(ch));
        }
    }

    glyphs
}

/// Paginates letter text onto the grid.
///
/// Total over all inputs: empty text yields one page with no rows.
pub fn paginate(text: &str, geometry: GridGeometry) -> Document {
    let geometry = GridGeometry::new(geometry.cols, geometry.rows_per_page);
    let cleaned = strip_markup(text).replace("\r\n", "\n");
    let glyphs = layout_glyphs(&cleaned, geometry.cols);

    let rows: Vec<Row> = glyphs
        .chunks(geometry.cols)
        .map(|chunk| Row::padded(chunk.to_vec(), geometry.cols))
        .collect();

    let mut pages = Vec::with_capacity(rows.len().div_ceil(geometry.rows_per_page));
    let mut rows = rows.into_iter().peekable();
    while rows.peek().is_some() {
        let page_rows: Vec<Row> = rows.by_ref().take(geometry.rows_per_page).collect();
        pages.push(Page::new(page_rows));
    }

    log::debug!(
        "paginated {} glyphs into {} page(s) of {}x{}",
        glyphs.len(),
        pages.len().max(1),
        geometry.cols,
        geometry.rows_per_page
    );

    Document::new(pages, geometry)
}

/// Paginates onto the standard 20 x 10 attestation form grid.
pub fn paginate_form(text: &str) -> Document {
    paginate(text, GridGeometry::default())
}
