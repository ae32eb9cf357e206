//! Text measurement and fitting for triangular tags

mod fit;
mod measure;
mod split;

pub use fit::*;
pub use measure::*;
pub use split::*;
