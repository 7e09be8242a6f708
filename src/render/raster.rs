//! PNG rasterization of an export handle

use std::future::Future;
use std::sync::{Arc, Mutex};

use super::assets::BackgroundImages;
use super::background::BackgroundCompositor;
use super::image::encode_png;
use super::preview::{Scene, compose_frame};
use crate::style::{self, Fill};

#[derive(Debug, thiserror::Error)]
pub enum RasterizeError {
    /// The background image could not be fetched or decoded
    #[error("background image {url} is unavailable")]
    BackgroundImage {
        url: String,
        #[source]
        source: anyhow::Error,
    },
    #[error("failed to encode PNG")]
    Encode(#[from] png::EncodingError),
    #[error("scene has nothing to draw")]
    EmptyScene,
    #[error("rasterizer task failed")]
    Worker(#[from] tokio::task::JoinError),
}

/// Turns an export handle into PNG bytes
pub trait Rasterizer {
    fn rasterize(&self, scene: &Scene) -> impl Future<Output = Result<Vec<u8>, RasterizeError>>;
}

/// Rasterizer drawing with tiny-skia, sharing the preview's compositing code
#[derive(Clone)]
pub struct SkiaRasterizer {
    images: BackgroundImages,
    compositor: Arc<Mutex<BackgroundCompositor>>,
}

impl SkiaRasterizer {
    pub fn new(images: BackgroundImages) -> Self {
        Self {
            images,
            compositor: Arc::new(Mutex::new(BackgroundCompositor::new())),
        }
    }
}

impl Rasterizer for SkiaRasterizer {
    async fn rasterize(&self, scene: &Scene) -> Result<Vec<u8>, RasterizeError> {
        let background_image = match style::background_style(&scene.state).fill {
            Fill::Image(url) => match self.images.resolve(&url).await {
                Ok(image) => Some(image),
                Err(source) => return Err(RasterizeError::BackgroundImage { url, source }),
            },
            _ => None,
        };

        let scene = scene.clone();
        let compositor = self.compositor.clone();
        let png = tokio::task::spawn_blocking(move || {
            let mut compositor = compositor.lock().unwrap_or_else(|e| e.into_inner());
            let frame = compose_frame(
                &scene.screenshot.rgba,
                &scene.state,
                background_image.as_deref(),
                &mut compositor,
                scene.scale,
            )
            .ok_or(RasterizeError::EmptyScene)?;
            log::debug!(
                "Rasterized {}x{} frame at scale {}",
                frame.width(),
                frame.height(),
                scene.scale
            );
            Ok::<_, RasterizeError>(encode_png(&frame)?)
        })
        .await??;
        Ok(png)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::capture::image::ScreenshotImage;
    use crate::domain::{BackgroundType, EditorState};
    use image::RgbaImage;

    fn scene(state: EditorState, scale: f32) -> Scene {
        let shot = RgbaImage::from_pixel(100, 50, image::Rgba([255, 255, 255, 255]));
        Scene {
            screenshot: Arc::new(ScreenshotImage::new(shot)),
            state: Arc::new(state),
            scale,
        }
    }

    #[tokio::test]
    async fn test_rasterize_default_scene() {
        let rasterizer = SkiaRasterizer::new(BackgroundImages::new());
        let png = rasterizer
            .rasterize(&scene(EditorState::default(), 1.0))
            .await
            .unwrap();
        let img = image::load_from_memory(&png).unwrap().to_rgba8();
        assert_eq!((img.width(), img.height()), (228, 178));
        assert_eq!(img.get_pixel(30, 89).0, [0x3b, 0x82, 0xf6, 255]);
    }

    #[tokio::test]
    async fn test_rasterize_honors_scene_scale() {
        let rasterizer = SkiaRasterizer::new(BackgroundImages::new());
        let png = rasterizer
            .rasterize(&scene(EditorState::default(), 0.5))
            .await
            .unwrap();
        let img = image::load_from_memory(&png).unwrap();
        assert_eq!((img.width(), img.height()), (114, 89));
    }

    #[tokio::test]
    async fn test_unreachable_background_image_fails() {
        let rasterizer = SkiaRasterizer::new(BackgroundImages::new());
        let state = EditorState {
            background_type: BackgroundType::Image,
            background_image_url: "/nonexistent/background.png".to_string(),
            ..Default::default()
        };
        let err = rasterizer.rasterize(&scene(state, 1.0)).await.unwrap_err();
        assert!(matches!(err, RasterizeError::BackgroundImage { .. }));
    }
}
