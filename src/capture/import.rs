//! File upload and clipboard paste acquisition
//!
//! Both paths yield a screenshot or nothing; failures are reported by the caller
//! and never touch the current screenshot.

use std::path::Path;

use anyhow::Context;
use image::RgbaImage;

use super::image::ScreenshotImage;

/// Extensions accepted by the upload path
const IMAGE_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "bmp", "webp", "tiff", "tga"];

/// Load an image file picked by the user
pub async fn import_file(path: &Path) -> anyhow::Result<ScreenshotImage> {
    let supported = path
        .extension()
        .map(|ext| ext.to_string_lossy().to_ascii_lowercase())
        .is_some_and(|ext| IMAGE_EXTENSIONS.contains(&ext.as_str()));
    anyhow::ensure!(supported, "{} is not a supported image file", path.display());

    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    tokio::task::spawn_blocking(move || ScreenshotImage::decode(&bytes)).await?
}

/// Read an image from the system clipboard.
///
/// Returns `None` when the clipboard holds no image. Text holding a path to an
/// image file is accepted as well.
pub async fn paste_from_clipboard() -> Option<ScreenshotImage> {
    let pasted = tokio::task::spawn_blocking(read_clipboard_image).await;
    match pasted {
        Ok(image) => image.map(ScreenshotImage::new),
        Err(err) => {
            log::error!("Clipboard read task failed: {}", err);
            None
        }
    }
}

fn read_clipboard_image() -> Option<RgbaImage> {
    let mut clipboard = match arboard::Clipboard::new() {
        Ok(clipboard) => clipboard,
        Err(err) => {
            log::warn!("System clipboard unavailable: {}", err);
            return None;
        }
    };

    if let Ok(data) = clipboard.get_image() {
        return RgbaImage::from_raw(
            data.width as u32,
            data.height as u32,
            data.bytes.into_owned(),
        );
    }

    let text = clipboard.get_text().ok()?;
    let path = Path::new(text.trim());
    if !path.is_file() {
        log::info!("Clipboard holds no image");
        return None;
    }
    match image::open(path) {
        Ok(img) => Some(img.to_rgba8()),
        Err(err) => {
            log::warn!("Clipboard path {} is not an image: {}", path.display(), err);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::image::encode_png;

    #[tokio::test]
    async fn test_import_png_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("shot.png");
        std::fs::write(&path, encode_png(&RgbaImage::new(7, 3)).unwrap()).unwrap();

        let shot = import_file(&path).await.unwrap();
        assert_eq!((shot.width(), shot.height()), (7, 3));
    }

    #[tokio::test]
    async fn test_import_rejects_unsupported_files() {
        let dir = tempfile::tempdir().unwrap();
        let text = dir.path().join("notes.txt");
        std::fs::write(&text, "hello").unwrap();
        assert!(import_file(&text).await.is_err());

        let fake = dir.path().join("fake.png");
        std::fs::write(&fake, "not a png").unwrap();
        assert!(import_file(&fake).await.is_err());

        assert!(import_file(&dir.path().join("missing.png")).await.is_err());
    }
}
