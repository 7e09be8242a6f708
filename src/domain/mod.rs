//! Pure domain types with minimal dependencies
//!
//! Nothing here touches rendering, clipboards or the async runtime.

pub mod color;
pub mod editor;
pub mod geometry;
pub mod gradient;

pub use color::*;
pub use editor::*;
pub use geometry::*;
pub use gradient::*;
