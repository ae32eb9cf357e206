//! Page grid planning
//!
//! Maps tag indices to slots, and slots to positions on the page. Each
//! page pair prints the same range of tags twice: front, then back.

use crate::options::TagOptions;
use crate::types::{Orientation, Result, Side, Slot, TagRecord};

/// Fixed page geometry derived from validated options
#[derive(Debug, Clone, PartialEq)]
pub struct PageGeometry {
    pub page_width_mm: f32,
    pub page_height_mm: f32,
    pub base_width_mm: f32,
    pub height_mm: f32,
    pub columns: usize,
    pub rows: usize,
    /// Front-side center X of each column's base
    pub column_centers_mm: Vec<f32>,
    /// Top line of the first row band
    pub first_row_base_y_mm: f32,
    /// Vertical distance between row bands
    pub row_pitch_mm: f32,
    pub print_offset_x_mm: f32,
    pub print_offset_y_mm: f32,
}

impl PageGeometry {
    /// Center the interlocking strip horizontally and the rows vertically
    pub fn from_options(options: &TagOptions) -> Result<Self> {
        options.validate()?;

        let (page_width_mm, page_height_mm) = options.paper_size.dimensions_mm();
        let base = options.triangle_base_mm;
        let strip_left = (page_width_mm - options.strip_width_mm()) / 2.0;

        let column_centers_mm = (0..options.columns)
            .map(|col| strip_left + base / 2.0 + col as f32 * base / 2.0)
            .collect();

        let first_row_base_y_mm = (page_height_mm + options.grid_height_mm()) / 2.0;

        Ok(Self {
            page_width_mm,
            page_height_mm,
            base_width_mm: base,
            height_mm: options.triangle_height_mm,
            columns: options.columns,
            rows: options.rows,
            column_centers_mm,
            first_row_base_y_mm,
            row_pitch_mm: options.triangle_height_mm,
            print_offset_x_mm: options.print_offset_x_mm,
            print_offset_y_mm: options.print_offset_y_mm,
        })
    }

    pub fn tags_per_page(&self) -> usize {
        self.columns * self.rows
    }

    /// Anchor `(center_x, base_y)` of a slot on its side.
    ///
    /// The back side mirrors X about the page centerline so that the tile
    /// registers with its front after a long-edge flip, then applies the
    /// printer offset. Offsets never touch the front side.
    pub fn slot_anchor(&self, slot: &Slot) -> (f32, f32) {
        let front_x = self.column_centers_mm[slot.col];
        let base_y = self.first_row_base_y_mm - slot.row as f32 * self.row_pitch_mm;

        match slot.side {
            Side::Front => (front_x, base_y),
            Side::Back => (
                self.page_width_mm - front_x + self.print_offset_x_mm,
                base_y + self.print_offset_y_mm,
            ),
        }
    }
}

/// Slot for the n-th tag of a page, row-major
pub fn slot_for_index(index_in_page: usize, columns: usize, side: Side) -> Slot {
    let col = index_in_page % columns;
    Slot {
        row: index_in_page / columns,
        col,
        orientation: Orientation::for_column(col),
        side,
    }
}

/// Assign slots to the tags of one page side.
///
/// Takes up to `per_page` tags starting at `start_index`; stops early when
/// input runs out.
pub fn plan_page<'a>(
    tags: &'a [TagRecord],
    start_index: usize,
    per_page: usize,
    columns: usize,
    side: Side,
) -> Vec<(&'a TagRecord, Slot)> {
    tags.iter()
        .skip(start_index)
        .take(per_page)
        .enumerate()
        .map(|(i, tag)| (tag, slot_for_index(i, columns, side)))
        .collect()
}

/// Number of front/back page pairs needed for `tag_count` tags
pub fn page_pair_count(tag_count: usize, per_page: usize) -> usize {
    if per_page == 0 {
        return 0;
    }
    tag_count.div_ceil(per_page)
}
