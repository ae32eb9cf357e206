//! printpdf content stream emission
//!
//! Every rotated tile is wrapped in a save/restore pair, so the
//! transformation of one tag never leaks into the next.

use crate::constants::mm_to_pt;
use crate::layout::{PointMm, rotation_180_about};
use crate::render::page::{PageDrawing, PlacedText, TileDrawing};
use printpdf::{
    BuiltinFont, CurTransMat, FontId, Line, LinePoint, Op, Point, Pt, TextItem, TextMatrix,
};

/// Font the text ops refer to
#[derive(Debug, Clone)]
pub enum PdfFont {
    Embedded(FontId),
    Builtin(BuiltinFont),
}

/// Line widths in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeStyle {
    pub outline_pt: f32,
    pub shared_edge_pt: f32,
}

impl StrokeStyle {
    pub fn from_mm(outline_mm: f32, shared_edge_mm: f32) -> Self {
        Self {
            outline_pt: mm_to_pt(outline_mm),
            shared_edge_pt: mm_to_pt(shared_edge_mm),
        }
    }
}

fn point(p: PointMm) -> LinePoint {
    LinePoint {
        p: Point {
            x: Pt(mm_to_pt(p.x)),
            y: Pt(mm_to_pt(p.y)),
        },
        bezier: false,
    }
}

/// Accumulates the operations of one page
pub struct PageCanvas {
    font: PdfFont,
    stroke: StrokeStyle,
    ops: Vec<Op>,
    current_thickness: Option<f32>,
}

impl PageCanvas {
    pub fn new(font: PdfFont, stroke: StrokeStyle) -> Self {
        Self {
            font,
            stroke,
            ops: Vec::new(),
            current_thickness: None,
        }
    }

    fn set_thickness(&mut self, pt: f32) {
        if self.current_thickness != Some(pt) {
            self.ops.push(Op::SetOutlineThickness { pt: Pt(pt) });
            self.current_thickness = Some(pt);
        }
    }

    pub fn stroke_polygon(&mut self, vertices: &[PointMm], thickness_pt: f32) {
        self.set_thickness(thickness_pt);
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vertices.iter().copied().map(point).collect(),
                is_closed: true,
            },
        });
    }

    pub fn stroke_segment(&mut self, from: PointMm, to: PointMm, thickness_pt: f32) {
        self.set_thickness(thickness_pt);
        self.ops.push(Op::DrawLine {
            line: Line {
                points: vec![point(from), point(to)],
                is_closed: false,
            },
        });
    }

    pub fn draw_text(&mut self, text: &PlacedText) {
        for line in &text.lines {
            let size = Pt(text.font_size_pt);
            let matrix = TextMatrix::Translate(
                Pt(mm_to_pt(line.x_mm)),
                Pt(mm_to_pt(line.baseline_y_mm)),
            );
            let items = vec![TextItem::Text(line.text.clone())];

            self.ops.push(Op::StartTextSection);
            match &self.font {
                PdfFont::Embedded(font) => {
                    self.ops.push(Op::SetFontSize {
                        font: font.clone(),
                        size,
                    });
                    self.ops.push(Op::SetTextMatrix { matrix });
                    self.ops.push(Op::WriteText {
                        items,
                        font: font.clone(),
                    });
                }
                PdfFont::Builtin(font) => {
                    self.ops.push(Op::SetFontSizeBuiltinFont { font: *font, size });
                    self.ops.push(Op::SetTextMatrix { matrix });
                    self.ops.push(Op::WriteTextBuiltinFont { items, font: *font });
                }
            }
            self.ops.push(Op::EndTextSection);
        }
    }

    /// Run `draw` with the coordinate system turned 180 degrees about `pivot`
    pub fn rotated_about<F>(&mut self, pivot: PointMm, draw: F)
    where
        F: FnOnce(&mut Self),
    {
        let pivot_pt = PointMm::new(mm_to_pt(pivot.x), mm_to_pt(pivot.y));
        self.ops.push(Op::SaveGraphicsState);
        self.ops.push(Op::SetTransformationMatrix {
            matrix: CurTransMat::Raw(rotation_180_about(pivot_pt)),
        });
        draw(self);
        self.ops.push(Op::RestoreGraphicsState);
        // Line width is part of the graphics state
        self.current_thickness = None;
    }

    pub fn into_ops(self) -> Vec<Op> {
        self.ops
    }
}

fn render_tile(canvas: &mut PageCanvas, tile: &TileDrawing) {
    let stroke = canvas.stroke;
    canvas.stroke_polygon(&tile.triangle.vertices, stroke.outline_pt);

    if tile.shared_edges.left {
        let [from, to] = tile.triangle.left_edge();
        canvas.stroke_segment(from, to, stroke.shared_edge_pt);
    }
    if tile.shared_edges.right {
        let [from, to] = tile.triangle.right_edge();
        canvas.stroke_segment(from, to, stroke.shared_edge_pt);
    }

    match tile.rotation_pivot {
        Some(pivot) => canvas.rotated_about(pivot, |canvas| {
            canvas.draw_text(&tile.main);
            canvas.draw_text(&tile.sub);
        }),
        None => {
            canvas.draw_text(&tile.main);
            canvas.draw_text(&tile.sub);
        }
    }
}

/// Draw every tile of a page side onto the canvas
pub fn render_page(canvas: &mut PageCanvas, page: &PageDrawing) {
    for tile in &page.tiles {
        render_tile(canvas, tile);
    }
}
