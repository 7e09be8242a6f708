//! Pixel helpers shared by the compositors: tiny-skia conversion, rounded
//! rectangles, gaussian blur and PNG encoding.

use std::io;

use image::RgbaImage;
use tiny_skia::{FillRule, IntSize, Mask, Path, PathBuilder, Pixmap, Transform};

use super::geometry::shape;
use crate::domain::Rect;

/// Copy a straight-alpha image into a premultiplied pixmap
pub fn pixmap_from_rgba(img: &RgbaImage) -> Option<Pixmap> {
    let size = IntSize::from_wh(img.width(), img.height())?;
    let mut data = img.as_raw().clone();
    for px in data.chunks_exact_mut(4) {
        let a = px[3] as u16;
        for c in &mut px[..3] {
            *c = ((*c as u16 * a + 127) / 255) as u8;
        }
    }
    Pixmap::from_vec(data, size)
}

/// Copy a premultiplied pixmap back into a straight-alpha image
pub fn pixmap_to_rgba(pixmap: &Pixmap) -> RgbaImage {
    let (w, h) = (pixmap.width(), pixmap.height());
    let mut data = Vec::with_capacity(pixmap.data().len());
    for px in pixmap.pixels() {
        let c = px.demultiply();
        data.extend_from_slice(&[c.red(), c.green(), c.blue(), c.alpha()]);
    }
    RgbaImage::from_raw(w, h, data).unwrap_or_else(|| RgbaImage::new(w, h))
}

/// Build a rounded rectangle path. The radius is clamped to half the shorter side.
pub fn rounded_rect_path(rect: Rect, radius: f32) -> Option<Path> {
    let (x, y) = (rect.left as f32, rect.top as f32);
    let (w, h) = (rect.width() as f32, rect.height() as f32);
    if w <= 0.0 || h <= 0.0 {
        return None;
    }
    let r = radius.min(w / 2.0).min(h / 2.0).max(0.0);
    if r == 0.0 {
        return Some(PathBuilder::from_rect(tiny_skia::Rect::from_xywh(x, y, w, h)?));
    }
    let k = r * shape::BEZIER_K;
    let (right, bottom) = (x + w, y + h);

    let mut pb = PathBuilder::new();
    pb.move_to(x + r, y);
    pb.line_to(right - r, y);
    pb.cubic_to(right - r + k, y, right, y + r - k, right, y + r);
    pb.line_to(right, bottom - r);
    pb.cubic_to(right, bottom - r + k, right - r + k, bottom, right - r, bottom);
    pb.line_to(x + r, bottom);
    pb.cubic_to(x + r - k, bottom, x, bottom - r + k, x, bottom - r);
    pb.line_to(x, y + r);
    pb.cubic_to(x, y + r - k, x + r - k, y, x + r, y);
    pb.close();
    pb.finish()
}

/// Anti-aliased coverage mask of a rounded rectangle
pub fn rounded_rect_mask(width: u32, height: u32, rect: Rect, radius: f32) -> Option<Mask> {
    let path = rounded_rect_path(rect, radius)?;
    let mut mask = Mask::new(width, height)?;
    mask.fill_path(&path, FillRule::Winding, true, Transform::identity());
    Some(mask)
}

/// Clear everything outside a rounded rectangle
pub fn clip_to_rounded_rect(pixmap: &mut Pixmap, rect: Rect, radius: f32) {
    if let Some(mask) = rounded_rect_mask(pixmap.width(), pixmap.height(), rect, radius) {
        pixmap.apply_mask(&mask);
    }
}

/// Gaussian blur in place. Works on premultiplied data so transparent
/// regions do not bleed dark fringes.
pub fn blur_pixmap(pixmap: &mut Pixmap, sigma: f32) {
    if sigma <= 0.0 {
        return;
    }
    let (w, h) = (pixmap.width(), pixmap.height());
    let Some(buffer) = RgbaImage::from_raw(w, h, pixmap.data().to_vec()) else {
        return;
    };
    let blurred = image::imageops::blur(&buffer, sigma);
    let data = pixmap.data_mut();
    data.copy_from_slice(blurred.as_raw());
    // Rounding can push a channel past its alpha
    for px in data.chunks_exact_mut(4) {
        let a = px[3];
        for c in &mut px[..3] {
            *c = (*c).min(a);
        }
    }
}

pub fn write_png<W: io::Write>(w: W, image: &RgbaImage) -> Result<(), png::EncodingError> {
    let mut encoder = png::Encoder::new(w, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())
}

pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>, png::EncodingError> {
    let mut buffer = Vec::new();
    write_png(&mut buffer, image)?;
    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_pixmap_round_trip_keeps_opaque_pixels() {
        let img = RgbaImage::from_pixel(4, 3, Rgba([10, 200, 30, 255]));
        let pixmap = pixmap_from_rgba(&img).unwrap();
        assert_eq!(pixmap_to_rgba(&pixmap), img);
    }

    #[test]
    fn test_rounded_mask_clears_corners() {
        let mut pixmap = pixmap_from_rgba(&RgbaImage::from_pixel(40, 40, Rgba([255; 4]))).unwrap();
        clip_to_rounded_rect(&mut pixmap, Rect::from_size(40, 40), 16.0);
        let img = pixmap_to_rgba(&pixmap);
        assert_eq!(img.get_pixel(0, 0)[3], 0);
        assert_eq!(img.get_pixel(39, 39)[3], 0);
        assert_eq!(img.get_pixel(20, 20)[3], 255);
        assert_eq!(img.get_pixel(20, 0)[3], 255);
    }

    #[test]
    fn test_zero_radius_is_plain_rect() {
        assert!(rounded_rect_path(Rect::from_size(10, 10), 0.0).is_some());
        assert!(rounded_rect_path(Rect::from_size(0, 10), 4.0).is_none());
    }

    #[test]
    fn test_blur_spreads_alpha() {
        let mut img = RgbaImage::new(21, 21);
        img.put_pixel(10, 10, Rgba([0, 0, 0, 255]));
        let mut pixmap = pixmap_from_rgba(&img).unwrap();
        blur_pixmap(&mut pixmap, 2.0);
        let out = pixmap_to_rgba(&pixmap);
        assert!(out.get_pixel(10, 10)[3] < 255);
        assert!(out.get_pixel(11, 10)[3] > 0);
    }

    #[test]
    fn test_encode_png_signature() {
        let bytes = encode_png(&RgbaImage::new(2, 2)).unwrap();
        assert_eq!(&bytes[..8], b"\x89PNG\r\n\x1a\n");
    }
}
