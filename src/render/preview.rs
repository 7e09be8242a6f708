//! Preview renderer
//!
//! Composes background, shadow and the rounded screenshot into one frame. The
//! on-screen preview is shrunk by a display scale; while an export is in progress
//! the renderer switches to 1:1 and announces each presented frame through a commit
//! channel so the exporter never samples a frame that still carries the display scale.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use image::RgbaImage;
use image::imageops::FilterType;
use tiny_skia::{Paint, Pixmap, PixmapPaint, Transform};
use tokio::sync::watch;

use super::assets::BackgroundImages;
use super::background::{BackgroundCompositor, to_skia_color};
use super::geometry::{FrameLayout, ShadowLayout, scaled_size, shape};
use super::image::{
    blur_pixmap, clip_to_rounded_rect, pixmap_from_rgba, pixmap_to_rgba, rounded_rect_mask,
    rounded_rect_path,
};
use crate::capture::image::ScreenshotImage;
use crate::domain::EditorState;
use crate::session::state::EditorStore;
use crate::style::{self, Fill};

/// Default on-screen shrink factor
pub const DEFAULT_DISPLAY_SCALE: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    #[default]
    Display,
    Exporting,
}

/// Requested mode, with a generation bumped on every transition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
struct ModeRequest {
    /// Exports currently holding the renderer at 1:1
    exports: usize,
    generation: u64,
}

impl ModeRequest {
    fn mode(&self) -> RenderMode {
        if self.exports > 0 {
            RenderMode::Exporting
        } else {
            RenderMode::Display
        }
    }
}

/// What the render loop last put on screen
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CommittedFrame {
    pub mode: RenderMode,
    pub scale: f32,
    pub generation: u64,
}

/// Export handle: the composed frame without the display-only scaling wrapper
#[derive(Debug, Clone)]
pub struct Scene {
    pub screenshot: Arc<ScreenshotImage>,
    pub state: Arc<EditorState>,
    /// Render scale committed when the handle was taken
    pub scale: f32,
}

#[derive(Debug, thiserror::Error)]
#[error("no export-scale frame was committed within {0:?}")]
pub struct SettleTimeout(pub Duration);

pub struct PreviewRenderer {
    display_scale: f32,
    mode: watch::Sender<ModeRequest>,
    committed: watch::Sender<CommittedFrame>,
    frame: watch::Sender<Option<Arc<RgbaImage>>>,
    background: Arc<Mutex<BackgroundCompositor>>,
    images: BackgroundImages,
}

impl PreviewRenderer {
    pub fn new(display_scale: f32, images: BackgroundImages) -> Self {
        let display_scale = if display_scale.is_finite() && display_scale > 0.0 {
            display_scale
        } else {
            DEFAULT_DISPLAY_SCALE
        };
        let (mode, _) = watch::channel(ModeRequest::default());
        let (committed, _) = watch::channel(CommittedFrame {
            mode: RenderMode::Display,
            scale: display_scale,
            generation: 0,
        });
        let (frame, _) = watch::channel(None);
        Self {
            display_scale,
            mode,
            committed,
            frame,
            background: Arc::new(Mutex::new(BackgroundCompositor::new())),
            images,
        }
    }

    pub fn mode(&self) -> RenderMode {
        self.mode.borrow().mode()
    }

    /// Scale the next frame will be rendered at
    #[cfg(test)]
    pub fn render_scale(&self) -> f32 {
        self.scale_for(self.mode())
    }

    fn scale_for(&self, mode: RenderMode) -> f32 {
        match mode {
            RenderMode::Display => self.display_scale,
            RenderMode::Exporting => 1.0,
        }
    }

    /// Switch to export scale until the returned guard is dropped
    pub fn begin_export(&self) -> ExportGuard<'_> {
        let mut ticket = 0;
        self.mode.send_modify(|req| {
            req.exports += 1;
            req.generation += 1;
            ticket = req.generation;
        });
        log::debug!("Render mode -> exporting (generation {})", ticket);
        ExportGuard {
            renderer: self,
            ticket,
        }
    }

    fn end_export(&self) {
        self.mode.send_modify(|req| {
            req.exports = req.exports.saturating_sub(1);
            req.generation += 1;
        });
        log::debug!("Render mode -> {:?}", self.mode());
    }

    /// Wait until a frame at export scale, requested no earlier than `ticket`, was presented
    pub async fn wait_for_commit(
        &self,
        ticket: u64,
        timeout: Duration,
    ) -> Result<CommittedFrame, SettleTimeout> {
        let mut rx = self.committed.subscribe();
        let committed = tokio::time::timeout(
            timeout,
            rx.wait_for(|c| c.mode == RenderMode::Exporting && c.generation >= ticket),
        )
        .await;
        match committed {
            Ok(Ok(frame)) => Ok(*frame),
            _ => Err(SettleTimeout(timeout)),
        }
    }

    pub fn last_commit(&self) -> CommittedFrame {
        *self.committed.borrow()
    }

    /// Export handle at the committed scale, or `None` without a screenshot
    pub fn snapshot(&self, store: &EditorStore) -> Option<Scene> {
        Some(Scene {
            screenshot: store.screenshot()?,
            state: store.state(),
            scale: self.last_commit().scale,
        })
    }

    /// Latest preview frame for on-screen display
    #[cfg(test)]
    pub fn subscribe_frames(&self) -> watch::Receiver<Option<Arc<RgbaImage>>> {
        self.frame.subscribe()
    }

    /// Re-render on every state, screenshot or mode change until the store goes away
    pub async fn run(self: Arc<Self>, store: EditorStore) {
        let mut state_rx = store.subscribe_state();
        let mut shot_rx = store.subscribe_screenshot();
        let mut mode_rx = self.mode.subscribe();
        drop(store);

        loop {
            let state = state_rx.borrow_and_update().clone();
            let screenshot = shot_rx.borrow_and_update().clone();
            let request = *mode_rx.borrow_and_update();
            self.present(screenshot, state, request).await;

            let alive = tokio::select! {
                changed = state_rx.changed() => changed.is_ok(),
                changed = shot_rx.changed() => changed.is_ok(),
                changed = mode_rx.changed() => changed.is_ok(),
            };
            if !alive {
                log::debug!("Preview render loop stopped");
                break;
            }
        }
    }

    async fn present(
        &self,
        screenshot: Option<Arc<ScreenshotImage>>,
        state: Arc<EditorState>,
        request: ModeRequest,
    ) {
        let mode = request.mode();
        let scale = self.scale_for(mode);

        let frame = match screenshot {
            Some(screenshot) => self.render_frame(screenshot, state, scale).await,
            None => None,
        };
        self.frame.send_replace(frame.map(Arc::new));
        self.committed.send_replace(CommittedFrame {
            mode,
            scale,
            generation: request.generation,
        });
    }

    async fn render_frame(
        &self,
        screenshot: Arc<ScreenshotImage>,
        state: Arc<EditorState>,
        scale: f32,
    ) -> Option<RgbaImage> {
        // An unreachable background image previews as an empty layer
        let background_image = match style::background_style(&state).fill {
            Fill::Image(url) => match self.images.resolve(&url).await {
                Ok(image) => Some(image),
                Err(err) => {
                    log::warn!("Background image unavailable for preview: {:#}", err);
                    None
                }
            },
            _ => None,
        };

        let compositor = self.background.clone();
        let rendered = tokio::task::spawn_blocking(move || {
            let mut compositor = compositor.lock().unwrap_or_else(|e| e.into_inner());
            compose_frame(
                &screenshot.rgba,
                &state,
                background_image.as_deref(),
                &mut compositor,
                scale,
            )
        })
        .await;

        match rendered {
            Ok(frame) => frame,
            Err(err) => {
                log::error!("Preview render task failed: {}", err);
                None
            }
        }
    }
}

/// Holds the renderer at export scale; restores display scale when dropped
pub struct ExportGuard<'a> {
    renderer: &'a PreviewRenderer,
    ticket: u64,
}

impl ExportGuard<'_> {
    /// Generation of the exporting request
    pub fn ticket(&self) -> u64 {
        self.ticket
    }
}

impl Drop for ExportGuard<'_> {
    fn drop(&mut self) {
        self.renderer.end_export();
    }
}

/// Compose one frame: background, shadow, rounded screenshot, outer clip, then scale.
pub fn compose_frame(
    screenshot: &RgbaImage,
    state: &EditorState,
    background_image: Option<&RgbaImage>,
    compositor: &mut BackgroundCompositor,
    scale: f32,
) -> Option<RgbaImage> {
    let background = compositor.style(state).clone();
    let shadow = style::shadow_style(state.shadow);
    let layout = FrameLayout::compute(
        screenshot.width(),
        screenshot.height(),
        state,
        &background,
        &shadow,
    );
    let size = layout.container.dimensions()?;
    let mut canvas = compositor.paint(&background, size, background_image)?;

    if let Some(shadow) = &layout.shadow {
        draw_shadow(&mut canvas, shadow, &layout);
    }

    let foreground = pixmap_from_rgba(screenshot)?;
    let mask = rounded_rect_mask(
        size.width(),
        size.height(),
        layout.foreground,
        layout.corner_radius,
    )?;
    canvas.draw_pixmap(
        layout.foreground.left,
        layout.foreground.top,
        foreground.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        Some(&mask),
    );

    clip_to_rounded_rect(&mut canvas, layout.container, shape::CONTAINER_RADIUS);

    let composed = pixmap_to_rgba(&canvas);
    if (scale - 1.0).abs() < f32::EPSILON {
        return Some(composed);
    }
    let (w, h) = scaled_size(composed.width(), composed.height(), scale);
    Some(image::imageops::resize(&composed, w, h, FilterType::Triangle))
}

/// Blurred shadow of the foreground shape, never painted underneath the foreground itself
fn draw_shadow(canvas: &mut Pixmap, shadow: &ShadowLayout, layout: &FrameLayout) {
    let (w, h) = (canvas.width(), canvas.height());
    let Some(mut layer) = Pixmap::new(w, h) else {
        return;
    };
    let Some(path) = rounded_rect_path(shadow.rect, shadow.corner_radius) else {
        return;
    };
    let mut paint = Paint::default();
    paint.set_color(to_skia_color(shadow.color));
    paint.anti_alias = true;
    let (dx, dy) = shadow.offset;
    layer.fill_path(
        &path,
        &paint,
        tiny_skia::FillRule::Winding,
        Transform::from_translate(dx, dy),
        None,
    );
    blur_pixmap(&mut layer, shadow.sigma);

    if let Some(mut outside) = rounded_rect_mask(w, h, layout.foreground, layout.corner_radius) {
        outside.invert();
        layer.apply_mask(&outside);
    }

    canvas.draw_pixmap(
        0,
        0,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
}
