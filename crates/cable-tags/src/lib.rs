//! Double-sided triangular cable tags
//!
//! Reads a cable schedule (CSV or workbook), expands it into one record per physical tag and
//! lays the tags out as interlocking triangles on duplex PDF sheets.

pub mod constants;
mod document;
mod font;
mod ingest;
pub mod layout;
mod options;
pub mod render;
mod stats;
pub mod text;
mod types;

pub use document::{BuildControl, ProgressCallback, build_document, generate_pdf, layout_document};
pub use font::{LOGICAL_FONT_NAME, ResolvedFont, resolve_font};
pub use ingest::{
    ColumnMap, LoadedRows, detect_delimiter, load_rows, load_rows_from_csv, load_rows_from_xlsx,
    parse_quantity, parse_rows, parse_workbook, resolve_columns, rows_from_records,
};
pub use options::*;
pub use stats::calculate_statistics;
pub use types::*;
