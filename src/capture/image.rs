//! Screenshot image type shared by every acquisition path

use anyhow::Context;
use image::RgbaImage;

/// A decoded screenshot in straight-alpha RGBA
#[derive(Clone, Debug, PartialEq)]
pub struct ScreenshotImage {
    pub rgba: RgbaImage,
}

impl ScreenshotImage {
    pub fn new(rgba: RgbaImage) -> Self {
        log::debug!(
            "ScreenshotImage acquired: {}x{} pixels",
            rgba.width(),
            rgba.height()
        );
        Self { rgba }
    }

    /// Decode an encoded image (PNG, JPEG, ...) sniffing the format from its bytes
    pub fn decode(bytes: &[u8]) -> anyhow::Result<Self> {
        let format = image::guess_format(bytes).context("Unrecognized image format")?;
        let decoded = image::load_from_memory_with_format(bytes, format)
            .with_context(|| format!("Failed to decode {:?} image", format))?;
        let rgba = decoded.to_rgba8();
        anyhow::ensure!(
            rgba.width() > 0 && rgba.height() > 0,
            "Image has no pixels"
        );
        Ok(Self::new(rgba))
    }

    /// Get the width of the image
    pub fn width(&self) -> u32 {
        self.rgba.width()
    }

    /// Get the height of the image
    pub fn height(&self) -> u32 {
        self.rgba.height()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::image::encode_png;

    #[test]
    fn test_decode_png() {
        let img = RgbaImage::from_pixel(5, 4, image::Rgba([9, 8, 7, 255]));
        let shot = ScreenshotImage::decode(&encode_png(&img).unwrap()).unwrap();
        assert_eq!((shot.width(), shot.height()), (5, 4));
        assert_eq!(shot.rgba, img);
    }

    #[test]
    fn test_decode_rejects_unknown_bytes() {
        assert!(ScreenshotImage::decode(b"definitely not an image").is_err());
    }
}
