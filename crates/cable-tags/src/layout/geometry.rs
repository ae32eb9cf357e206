//! Triangle geometry
//!
//! All coordinates are millimeters in PDF orientation (origin bottom-left,
//! y grows upward). A tile is anchored by the center X of its base and the
//! top line of its row band (`base_y`); upright and inverted tiles of the
//! same row share that band.

use crate::types::{Orientation, Side};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointMm {
    pub x: f32,
    pub y: f32,
}

impl PointMm {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// Vertices in a fixed order: left base corner, right base corner, apex
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Triangle {
    pub vertices: [PointMm; 3],
}

impl Triangle {
    pub fn left_base(&self) -> PointMm {
        self.vertices[0]
    }

    pub fn right_base(&self) -> PointMm {
        self.vertices[1]
    }

    pub fn apex(&self) -> PointMm {
        self.vertices[2]
    }

    /// Slanted edge on the left, from base corner to apex
    pub fn left_edge(&self) -> [PointMm; 2] {
        [self.left_base(), self.apex()]
    }

    /// Slanted edge on the right, from base corner to apex
    pub fn right_edge(&self) -> [PointMm; 2] {
        [self.right_base(), self.apex()]
    }
}

/// Compute the three vertices of a tile
pub fn triangle_vertices(
    center_x: f32,
    base_y: f32,
    base_width: f32,
    height: f32,
    orientation: Orientation,
) -> Triangle {
    let half = base_width / 2.0;
    let vertices = match orientation {
        Orientation::Upright => [
            PointMm::new(center_x - half, base_y - height),
            PointMm::new(center_x + half, base_y - height),
            PointMm::new(center_x, base_y),
        ],
        Orientation::Inverted => [
            PointMm::new(center_x - half, base_y),
            PointMm::new(center_x + half, base_y),
            PointMm::new(center_x, base_y - height),
        ],
    };
    Triangle { vertices }
}

/// Center of the tile's bounding box; the pivot for inverted text
pub fn tile_center(center_x: f32, base_y: f32, height: f32) -> PointMm {
    PointMm::new(center_x, base_y - height / 2.0)
}

/// Affine matrix `[a b c d e f]` rotating 180 degrees about `pivot`
pub fn rotation_180_about(pivot: PointMm) -> [f32; 6] {
    [-1.0, 0.0, 0.0, -1.0, 2.0 * pivot.x, 2.0 * pivot.y]
}

/// Apply an affine matrix to a point
pub fn transform_point(matrix: &[f32; 6], point: PointMm) -> PointMm {
    let [a, b, c, d, e, f] = *matrix;
    PointMm::new(a * point.x + c * point.y + e, b * point.x + d * point.y + f)
}

/// Which slanted edges are shared with a drawn neighbour
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SharedEdges {
    pub left: bool,
    pub right: bool,
}

/// Shared edges of the tile in `col`, as seen on the given side.
///
/// Neighbours are resolved in front-side columns. The back page is a
/// mirror image, so a front-left neighbour sits on the right there.
pub fn shared_edges(
    col: usize,
    columns: usize,
    side: Side,
    neighbour_filled: impl Fn(usize) -> bool,
) -> SharedEdges {
    let has_left = col > 0 && neighbour_filled(col - 1);
    let has_right = col + 1 < columns && neighbour_filled(col + 1);

    match side {
        Side::Front => SharedEdges {
            left: has_left,
            right: has_right,
        },
        Side::Back => SharedEdges {
            left: has_right,
            right: has_left,
        },
    }
}
