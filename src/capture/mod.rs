//! Screenshot acquisition
//!
//! This module consolidates:
//! - Screenshot image type (image.rs)
//! - File upload and clipboard paste (import.rs)
//! - Interactive screen capture via the desktop portal (portal.rs)

pub mod image;
pub mod import;
pub mod portal;
