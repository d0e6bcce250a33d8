//! Grid layout for the postal attestation form.
//!
//! - `grid` - Glyph, Row, Page and Document value types
//! - `paginate` - the pure pagination engine
//! - `form` - form sheet handed to the renderer
//! - `handlers` - HTTP endpoint

pub mod form;
pub mod grid;
pub mod handlers;
pub mod paginate;

pub use form::{AttestationForm, Party};
pub use grid::{Document, Glyph, GridGeometry, Page, Row, COLS, ROWS_PER_PAGE};
pub use paginate::{paginate, paginate_form, strip_markup};
