//! Shared constants for tag layout
//!
//! Defaults for the canonical 60 x 49 mm tag on A4, and the fixed factors
//! used by text measurement.

// =============================================================================
// Unit Conversion
// =============================================================================

/// Points per millimeter (1 inch = 72 points, 1 inch = 25.4mm)
pub const POINTS_PER_MM: f32 = 72.0 / 25.4;

#[inline]
pub fn mm_to_pt(mm: f32) -> f32 {
    mm * POINTS_PER_MM
}

#[inline]
pub fn pt_to_mm(pt: f32) -> f32 {
    pt / POINTS_PER_MM
}

// =============================================================================
// Tag Geometry
// =============================================================================

/// Base width of every triangle (mm)
pub const DEFAULT_TRIANGLE_BASE_MM: f32 = 60.0;

/// Triangle height (mm); earlier layouts used 52 and 55
pub const DEFAULT_TRIANGLE_HEIGHT_MM: f32 = 49.0;

pub const DEFAULT_COLUMNS: usize = 5;

pub const DEFAULT_ROWS: usize = 5;

/// Printer-safe margin around the grid (mm)
pub const DEFAULT_PAGE_MARGIN_MM: f32 = 10.0;

pub const DEFAULT_OUTLINE_THICKNESS_MM: f32 = 0.5;

/// Stroke for edges shared by two neighbouring tags (mm)
pub const DEFAULT_SHARED_EDGE_THICKNESS_MM: f32 = 1.0;

// =============================================================================
// Text
// =============================================================================

/// Line height as a multiple of the font size
pub const LINE_SPACING_FACTOR: f32 = 1.2;

/// Approximate glyph advance as a fraction of the font size
pub const APPROX_CHAR_WIDTH_RATIO: f32 = 0.6;

/// Corrective multiplier for wide glyphs in the approximate model
pub const APPROX_WIDE_GLYPH_FACTOR: f32 = 1.5;

/// Corrective multiplier for narrow glyphs in the approximate model
pub const APPROX_NARROW_GLYPH_FACTOR: f32 = 0.5;

/// Unit appended to purely numeric lengths
pub const DEFAULT_LENGTH_UNIT: &str = "м";

/// Splits the front sub field (track) onto two lines
pub const DEFAULT_TRACK_SEPARATOR: char = ';';

// =============================================================================
// Input
// =============================================================================

/// Largest quantity accepted from a single source row
pub const MAX_QUANTITY: usize = 10_000;
