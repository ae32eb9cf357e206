//! Page rendering
//!
//! `page` computes a display list for one side of a sheet; `canvas` turns
//! it into printpdf operations.

mod canvas;
mod page;

pub use canvas::*;
pub use page::*;
