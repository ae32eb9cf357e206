use crate::constants::*;
use crate::types::{Result, TagError};
use std::path::PathBuf;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Standard paper sizes, portrait
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum PaperSize {
    A3,
    #[default]
    A4,
    A5,
    Letter,
    Legal,
    Custom { width_mm: f32, height_mm: f32 },
}

impl PaperSize {
    pub fn dimensions_mm(self) -> (f32, f32) {
        match self {
            PaperSize::A3 => (297.0, 420.0),
            PaperSize::A4 => (210.0, 297.0),
            PaperSize::A5 => (148.0, 210.0),
            PaperSize::Letter => (215.9, 279.4),
            PaperSize::Legal => (215.9, 355.6),
            PaperSize::Custom {
                width_mm,
                height_mm,
            } => (width_mm, height_mm),
        }
    }
}

/// Inclusive font size bounds in points
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SizeRange {
    pub min_pt: f32,
    pub max_pt: f32,
}

impl SizeRange {
    pub const fn new(min_pt: f32, max_pt: f32) -> Self {
        Self { min_pt, max_pt }
    }
}

/// Where a text field sits inside an upright triangle.
///
/// Ratios are fractions of the triangle height measured up from the base.
/// The horizontal budget is the triangle width at `width_at_ratio` or at the
/// top of the region, whichever is narrower, minus the horizontal padding on
/// both sides.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextRegion {
    pub center_ratio: f32,
    pub height_ratio: f32,
    pub width_at_ratio: f32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TextOptions {
    /// Front main field (system), adaptive
    pub system_size: SizeRange,
    pub system_max_lines: usize,

    /// Front sub field (track): fixed size for a single line
    pub track_size_pt: f32,
    /// Front sub field when it contains the separator: adaptive, two lines
    pub track_split_size: SizeRange,
    pub track_separator: char,

    /// Back main field (cable), adaptive over the two-part split
    pub cable_size: SizeRange,
    pub cable_max_lines: usize,

    /// Back sub field (length), fixed size
    pub length_size_pt: f32,
    pub length_max_lines: usize,
    pub length_unit: String,

    pub line_spacing: f32,
    pub horizontal_padding_mm: f32,

    pub main_region: TextRegion,
    pub sub_region: TextRegion,
}

impl Default for TextOptions {
    fn default() -> Self {
        Self {
            system_size: SizeRange::new(10.0, 18.0),
            system_max_lines: 2,
            track_size_pt: 14.0,
            track_split_size: SizeRange::new(10.0, 14.0),
            track_separator: DEFAULT_TRACK_SEPARATOR,
            cable_size: SizeRange::new(10.0, 16.0),
            cable_max_lines: 3,
            length_size_pt: 14.0,
            length_max_lines: 2,
            length_unit: DEFAULT_LENGTH_UNIT.to_string(),
            line_spacing: LINE_SPACING_FACTOR,
            horizontal_padding_mm: 2.0,
            main_region: TextRegion {
                center_ratio: 0.40,
                height_ratio: 0.36,
                width_at_ratio: 0.50,
            },
            sub_region: TextRegion {
                center_ratio: 0.12,
                height_ratio: 0.18,
                width_at_ratio: 0.21,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct FontOptions {
    /// Explicit TrueType file; takes precedence over the system search
    pub font_path: Option<PathBuf>,
    /// Search well-known locations for a bold serif font
    pub use_system_fonts: bool,
}

impl Default for FontOptions {
    fn default() -> Self {
        Self {
            font_path: None,
            use_system_fonts: true,
        }
    }
}

/// Complete tag sheet configuration
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct TagOptions {
    pub paper_size: PaperSize,
    pub page_margin_mm: f32,

    // Triangle grid
    pub triangle_base_mm: f32,
    pub triangle_height_mm: f32,
    pub columns: usize,
    pub rows: usize,

    // Strokes
    pub outline_thickness_mm: f32,
    pub shared_edge_thickness_mm: f32,

    // Duplex registration compensation, back side only
    pub print_offset_x_mm: f32,
    pub print_offset_y_mm: f32,

    pub font: FontOptions,
    pub text: TextOptions,
}

impl Default for TagOptions {
    fn default() -> Self {
        Self {
            paper_size: PaperSize::A4,
            page_margin_mm: DEFAULT_PAGE_MARGIN_MM,
            triangle_base_mm: DEFAULT_TRIANGLE_BASE_MM,
            triangle_height_mm: DEFAULT_TRIANGLE_HEIGHT_MM,
            columns: DEFAULT_COLUMNS,
            rows: DEFAULT_ROWS,
            outline_thickness_mm: DEFAULT_OUTLINE_THICKNESS_MM,
            shared_edge_thickness_mm: DEFAULT_SHARED_EDGE_THICKNESS_MM,
            print_offset_x_mm: 0.0,
            print_offset_y_mm: 0.0,
            font: FontOptions::default(),
            text: TextOptions::default(),
        }
    }
}

impl TagOptions {
    /// Load options from JSON file
    #[cfg(feature = "serde")]
    pub async fn load(path: impl AsRef<std::path::Path>) -> Result<Self> {
        let bytes = tokio::fs::read(path).await?;
        let options = serde_json::from_slice(&bytes)
            .map_err(|e| TagError::Config(format!("Failed to parse config: {}", e)))?;
        Ok(options)
    }

    /// Save options to JSON file
    #[cfg(feature = "serde")]
    pub async fn save(&self, path: impl AsRef<std::path::Path>) -> Result<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| TagError::Config(format!("Failed to serialize config: {}", e)))?;
        tokio::fs::write(path, json).await?;
        Ok(())
    }

    pub fn tags_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Width of the interlocking strip: neighbouring triangles overlap by half a base
    pub fn strip_width_mm(&self) -> f32 {
        (self.columns + 1) as f32 * self.triangle_base_mm / 2.0
    }

    pub fn grid_height_mm(&self) -> f32 {
        self.rows as f32 * self.triangle_height_mm
    }

    /// Validate the options
    pub fn validate(&self) -> Result<()> {
        let (page_width, page_height) = self.paper_size.dimensions_mm();
        if page_width <= 0.0 || page_height <= 0.0 {
            return Err(TagError::Config(format!(
                "Paper dimensions must be positive, got {} x {} mm",
                page_width, page_height
            )));
        }

        if self.columns == 0 || self.rows == 0 {
            return Err(TagError::Config(
                "Grid must have at least one column and one row".to_string(),
            ));
        }

        if self.triangle_base_mm <= 0.0 || self.triangle_height_mm <= 0.0 {
            return Err(TagError::Config(
                "Triangle base and height must be positive".to_string(),
            ));
        }

        if self.page_margin_mm < 0.0 {
            return Err(TagError::Config("Page margin must not be negative".to_string()));
        }

        if self.outline_thickness_mm <= 0.0 || self.shared_edge_thickness_mm <= 0.0 {
            return Err(TagError::Config(
                "Outline thickness must be positive".to_string(),
            ));
        }

        let usable_width = page_width - 2.0 * self.page_margin_mm;
        if self.strip_width_mm() > usable_width {
            return Err(TagError::Config(format!(
                "{} columns of {} mm triangles span {} mm, usable page width is {} mm",
                self.columns,
                self.triangle_base_mm,
                self.strip_width_mm(),
                usable_width
            )));
        }

        let usable_height = page_height - 2.0 * self.page_margin_mm;
        if self.grid_height_mm() > usable_height {
            return Err(TagError::Config(format!(
                "{} rows of {} mm triangles span {} mm, usable page height is {} mm",
                self.rows,
                self.triangle_height_mm,
                self.grid_height_mm(),
                usable_height
            )));
        }

        self.text.validate()
    }
}

impl TextOptions {
    pub fn validate(&self) -> Result<()> {
        let ranges = [
            ("system", self.system_size),
            ("track", self.track_split_size),
            ("cable", self.cable_size),
        ];
        for (field, range) in ranges {
            if range.min_pt <= 0.0 || range.min_pt > range.max_pt {
                return Err(TagError::Config(format!(
                    "Invalid {} font size range {}..{} pt",
                    field, range.min_pt, range.max_pt
                )));
            }
        }

        if self.track_size_pt <= 0.0 || self.length_size_pt <= 0.0 {
            return Err(TagError::Config("Font sizes must be positive".to_string()));
        }

        if self.system_max_lines == 0 || self.cable_max_lines == 0 || self.length_max_lines == 0
        {
            return Err(TagError::Config(
                "Every field must allow at least one line".to_string(),
            ));
        }

        if self.line_spacing < 1.0 {
            return Err(TagError::Config(format!(
                "Line spacing {} is below 1.0",
                self.line_spacing
            )));
        }

        for region in [self.main_region, self.sub_region] {
            let in_unit = |v: f32| (0.0..=1.0).contains(&v);
            if !in_unit(region.center_ratio)
                || !in_unit(region.height_ratio)
                || !in_unit(region.width_at_ratio)
            {
                return Err(TagError::Config(
                    "Text region ratios must lie within 0..1".to_string(),
                ));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_options_are_valid() {
        let options = TagOptions::default();
        assert!(options.validate().is_ok());
        assert_eq!(options.tags_per_page(), 25);
        assert_eq!(options.strip_width_mm(), 180.0);
    }

    #[test]
    fn test_taller_triangles_still_fit_a4() {
        let options = TagOptions {
            triangle_height_mm: 55.0,
            ..Default::default()
        };
        assert!(options.validate().is_ok());
    }

    #[test]
    fn test_too_many_rows_rejected() {
        let options = TagOptions {
            rows: 6,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(TagError::Config(_))));
    }

    #[test]
    fn test_too_many_columns_rejected() {
        let options = TagOptions {
            columns: 7,
            ..Default::default()
        };
        assert!(matches!(options.validate(), Err(TagError::Config(_))));
    }

    #[test]
    fn test_zero_outline_rejected() {
        let options = TagOptions {
            outline_thickness_mm: 0.0,
            ..Default::default()
        };
        assert!(options.validate().is_err());
    }

    #[test]
    fn test_inverted_size_range_rejected() {
        let mut options = TagOptions::default();
        options.text.cable_size = SizeRange::new(16.0, 10.0);
        assert!(options.validate().is_err());
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_partial_json_uses_defaults() {
        let json = r#"{ "triangle_height_mm": 52.0, "rows": 4, "print_offset_x_mm": 0.8 }"#;
        let options: TagOptions = serde_json::from_str(json).unwrap();

        assert_eq!(options.triangle_height_mm, 52.0);
        assert_eq!(options.rows, 4);
        assert_eq!(options.print_offset_x_mm, 0.8);
        assert_eq!(options.columns, 5);
        assert_eq!(options.text, TextOptions::default());
    }
}
