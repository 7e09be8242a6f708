//! Frame rendering
//!
//! This module contains:
//! - Layout math shared by the preview and the export rasterizer
//! - The background compositor (fill, oversize blur, clip)
//! - The preview renderer with its display/export scale switch
//! - PNG rasterization of export handles

pub mod assets;
pub mod background;
pub mod geometry;
pub mod image;
pub mod preview;
pub mod raster;
