//! Layout calculation for tag sheets
//!
//! - Triangle vertices, rotation and shared edges
//! - Grid slot assignment and page positions, including back-side mirroring

mod geometry;
mod grid;

pub use geometry::*;
pub use grid::*;
