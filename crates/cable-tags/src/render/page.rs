//! Page layout: one display list per page side
//!
//! Resolves which fields each side prints, fits them into the triangle and
//! positions every line. Nothing here touches the PDF; `canvas` turns the
//! result into content stream operations.

use crate::constants::{mm_to_pt, pt_to_mm};
use crate::layout::{
    PageGeometry, PointMm, SharedEdges, Triangle, plan_page, shared_edges, tile_center,
    triangle_vertices,
};
use crate::options::{TextOptions, TextRegion};
use crate::text::{
    FitPolicy, TextBlock, TextBox, TextMeasure, fit_segments, format_length, split_at_separator,
    split_cable_text,
};
use crate::types::{Side, Slot, TagRecord};

/// Baseline position below the top of a line box, as a fraction of the line height
const BASELINE_RATIO: f32 = 0.8;

/// One line of text at its final position (upright frame)
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub text: String,
    pub x_mm: f32,
    pub baseline_y_mm: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedText {
    pub font_size_pt: f32,
    pub lines: Vec<PlacedLine>,
}

impl PlacedText {
    pub fn texts(&self) -> Vec<&str> {
        self.lines.iter().map(|line| line.text.as_str()).collect()
    }
}

/// Everything needed to draw one tag
#[derive(Debug, Clone, PartialEq)]
pub struct TileDrawing {
    /// Index into the document's tag list
    pub tag_index: usize,
    pub slot: Slot,
    pub triangle: Triangle,
    pub shared_edges: SharedEdges,
    /// Text is laid out upright; inverted tiles rotate it 180 degrees about this point
    pub rotation_pivot: Option<PointMm>,
    pub main: PlacedText,
    pub sub: PlacedText,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PageDrawing {
    pub side: Side,
    pub start_index: usize,
    /// Slots consumed on this page, drawn or not
    pub slots_used: usize,
    pub tiles: Vec<TileDrawing>,
}

/// Budget for one field inside the upright triangle
struct FieldBudget {
    /// Height of the block center above the triangle base (mm)
    center_offset_mm: f32,
    width_pt: f32,
    height_pt: f32,
}

impl FieldBudget {
    fn new(region: &TextRegion, geometry: &PageGeometry, padding_mm: f32) -> Self {
        // Never wider than the triangle at the top of the region
        let width_at = region
            .width_at_ratio
            .max(region.center_ratio + region.height_ratio / 2.0)
            .min(1.0);
        let width_mm = geometry.base_width_mm * (1.0 - width_at) - 2.0 * padding_mm;
        Self {
            center_offset_mm: region.center_ratio * geometry.height_mm,
            width_pt: mm_to_pt(width_mm.max(0.0)),
            height_pt: mm_to_pt(region.height_ratio * geometry.height_mm),
        }
    }

    fn text_box(&self, max_lines: usize) -> TextBox {
        TextBox {
            max_width_pt: self.width_pt,
            max_height_pt: self.height_pt,
            max_lines,
        }
    }
}

/// Field contents and fitting rules for one side of a tag
struct FieldSpec {
    segments: Vec<String>,
    policy: FitPolicy,
    max_lines: usize,
}

impl FieldSpec {
    fn fit(&self, budget: &FieldBudget, line_spacing: f32, measure: &dyn TextMeasure) -> TextBlock {
        let segments: Vec<&str> = self.segments.iter().map(String::as_str).collect();
        fit_segments(
            &segments,
            &budget.text_box(self.max_lines),
            self.policy,
            line_spacing,
            measure,
        )
    }
}

/// Main and sub field for a side
fn field_specs(tag: &TagRecord, side: Side, text: &TextOptions) -> (FieldSpec, FieldSpec) {
    match side {
        Side::Front => {
            let main = FieldSpec {
                segments: vec![tag.system.trim().to_string()],
                policy: FitPolicy::Adaptive(text.system_size),
                max_lines: text.system_max_lines,
            };
            let sub = match split_at_separator(&tag.track, text.track_separator) {
                Some(parts) => FieldSpec {
                    segments: parts.to_vec(),
                    policy: FitPolicy::Adaptive(text.track_split_size),
                    max_lines: 2,
                },
                None => FieldSpec {
                    segments: vec![tag.track.trim().to_string()],
                    policy: FitPolicy::Fixed(text.track_size_pt),
                    max_lines: 1,
                },
            };
            (main, sub)
        }
        Side::Back => {
            let main = FieldSpec {
                segments: split_cable_text(&tag.cable).to_vec(),
                policy: FitPolicy::Adaptive(text.cable_size),
                max_lines: text.cable_max_lines,
            };
            let sub = FieldSpec {
                segments: vec![format_length(&tag.length, &text.length_unit)],
                policy: FitPolicy::Fixed(text.length_size_pt),
                max_lines: text.length_max_lines,
            };
            (main, sub)
        }
    }
}

/// Both fields of this side are blank
pub fn is_blank(tag: &TagRecord, side: Side) -> bool {
    match side {
        Side::Front => tag.system.trim().is_empty() && tag.track.trim().is_empty(),
        Side::Back => tag.cable.trim().is_empty() && tag.length.trim().is_empty(),
    }
}

/// Center every line horizontally and the block vertically around `center`
fn place_block(block: &TextBlock, center: PointMm, measure: &dyn TextMeasure) -> PlacedText {
    let line_height_mm = pt_to_mm(block.line_height_pt);
    let top = center.y + pt_to_mm(block.height_pt()) / 2.0;

    let lines = block
        .lines
        .iter()
        .enumerate()
        .map(|(i, text)| {
            let width_mm = pt_to_mm(measure.text_width_pt(text, block.font_size_pt));
            PlacedLine {
                text: text.clone(),
                x_mm: center.x - width_mm / 2.0,
                baseline_y_mm: top - (i as f32 + BASELINE_RATIO) * line_height_mm,
            }
        })
        .collect();

    PlacedText {
        font_size_pt: block.font_size_pt,
        lines,
    }
}

/// Lay out one page side.
///
/// Blank tags keep their slot but produce no tile, so the grid never shifts.
pub fn layout_page(
    tags: &[TagRecord],
    start_index: usize,
    side: Side,
    geometry: &PageGeometry,
    text: &TextOptions,
    measure: &dyn TextMeasure,
) -> PageDrawing {
    let plan = plan_page(
        tags,
        start_index,
        geometry.tags_per_page(),
        geometry.columns,
        side,
    );

    let main_budget = FieldBudget::new(&text.main_region, geometry, text.horizontal_padding_mm);
    let sub_budget = FieldBudget::new(&text.sub_region, geometry, text.horizontal_padding_mm);

    let drawn = |row: usize, col: usize| {
        plan.get(row * geometry.columns + col)
            .is_some_and(|(tag, _)| !is_blank(tag, side))
    };

    let mut tiles = Vec::new();
    for (i, (tag, slot)) in plan.iter().enumerate() {
        if is_blank(tag, side) {
            log::debug!("Skipping blank tag {} on {} side", start_index + i, side.name());
            continue;
        }

        let (center_x, base_y) = geometry.slot_anchor(slot);
        let triangle = triangle_vertices(
            center_x,
            base_y,
            geometry.base_width_mm,
            geometry.height_mm,
            slot.orientation,
        );
        let edges = shared_edges(slot.col, geometry.columns, side, |col| drawn(slot.row, col));

        let band_bottom = base_y - geometry.height_mm;
        let (main_spec, sub_spec) = field_specs(tag, side, text);
        let main_block = main_spec.fit(&main_budget, text.line_spacing, measure);
        let sub_block = sub_spec.fit(&sub_budget, text.line_spacing, measure);

        let main = place_block(
            &main_block,
            PointMm::new(center_x, band_bottom + main_budget.center_offset_mm),
            measure,
        );
        let sub = place_block(
            &sub_block,
            PointMm::new(center_x, band_bottom + sub_budget.center_offset_mm),
            measure,
        );

        let rotation_pivot = slot
            .orientation
            .is_inverted()
            .then(|| tile_center(center_x, base_y, geometry.height_mm));

        tiles.push(TileDrawing {
            tag_index: start_index + i,
            slot: *slot,
            triangle,
            shared_edges: edges,
            rotation_pivot,
            main,
            sub,
        });
    }

    PageDrawing {
        side,
        start_index,
        slots_used: plan.len(),
        tiles,
    }
}
