//! Background layer compositing
//!
//! Paints the fill into a box grown by twice the blur radius, blurs it, then
//! clips it back to the container so the blur never reveals transparent edges.

use image::RgbaImage;
use tiny_skia::{
    Color, FilterQuality, GradientStop, Paint, Pixmap, PixmapPaint, Point, SpreadMode, Transform,
};

use super::image::{blur_pixmap, pixmap_from_rgba};
use crate::domain::{EditorState, LinearGradient, Rect, RectDimension, Rgba};
use crate::style::{self, BackgroundStyle, Fill, Filter};

/// Memoizing background compositor.
///
/// The style is re-derived whenever the editor state changes by value; the
/// painted layer is reused while style, size and picture stay the same.
#[derive(Default)]
pub struct BackgroundCompositor {
    style: Option<(EditorState, BackgroundStyle)>,
    layer: Option<(BackgroundStyle, RectDimension, ImageKey, Pixmap)>,
}

/// Identity of the decoded picture behind an image fill: size and buffer address
type ImageKey = Option<(u32, u32, usize)>;

fn image_key(style: &BackgroundStyle, image: Option<&RgbaImage>) -> ImageKey {
    match (&style.fill, image) {
        (Fill::Image(_), Some(image)) => Some((
            image.width(),
            image.height(),
            image.as_raw().as_ptr() as usize,
        )),
        _ => None,
    }
}

impl BackgroundCompositor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Background style for `state`, recomputed only when the state differs from the last call
    pub fn style(&mut self, state: &EditorState) -> &BackgroundStyle {
        if !matches!(&self.style, Some((cached, _)) if cached == state) {
            self.style = Some((state.clone(), style::background_style(state)));
        }
        let (_, style) = self
            .style
            .get_or_insert_with(|| (state.clone(), style::background_style(state)));
        style
    }

    /// Container-sized background layer.
    ///
    /// `image` is the decoded picture for [`Fill::Image`]; it is ignored for other fills.
    pub fn paint(
        &mut self,
        style: &BackgroundStyle,
        size: RectDimension,
        image: Option<&RgbaImage>,
    ) -> Option<Pixmap> {
        let key = image_key(style, image);
        if let Some((cached_style, cached_size, cached_key, layer)) = &self.layer
            && cached_style == style
            && *cached_size == size
            && *cached_key == key
        {
            return Some(layer.clone());
        }
        let layer = paint_background(style, size, image)?;
        self.layer = Some((style.clone(), size, key, layer.clone()));
        Some(layer)
    }
}

/// Paint a background layer without memoization
pub fn paint_background(
    style: &BackgroundStyle,
    size: RectDimension,
    image: Option<&RgbaImage>,
) -> Option<Pixmap> {
    let margin = style.margin().max(0.0).round() as i32;
    let container = Rect::from_size(size.width(), size.height());
    let oversize = container.outset(margin).dimensions()?;
    let mut layer = Pixmap::new(oversize.width(), oversize.height())?;

    match &style.fill {
        Fill::Color(value) => match Rgba::parse(value) {
            Some(color) => layer.fill(to_skia_color(color)),
            None => log::warn!("Ignoring unparseable background color '{}'", value),
        },
        Fill::Gradient(value) => match LinearGradient::parse(value) {
            Some(gradient) => fill_gradient(&mut layer, &gradient),
            None => log::warn!("Ignoring unsupported background gradient '{}'", value),
        },
        Fill::Image(url) => match image {
            Some(image) => fill_cover(&mut layer, image),
            None => log::debug!("Background image {} not available, leaving layer empty", url),
        },
        Fill::None => {}
    }

    if let Filter::Blur(radius) = style.filter {
        blur_pixmap(&mut layer, radius);
    }

    let mut clipped = Pixmap::new(size.width(), size.height())?;
    clipped.draw_pixmap(
        -margin,
        -margin,
        layer.as_ref(),
        &PixmapPaint::default(),
        Transform::identity(),
        None,
    );
    Some(clipped)
}

pub(crate) fn to_skia_color(color: Rgba) -> Color {
    Color::from_rgba(
        color.r.clamp(0.0, 1.0),
        color.g.clamp(0.0, 1.0),
        color.b.clamp(0.0, 1.0),
        color.a.clamp(0.0, 1.0),
    )
    .unwrap_or(Color::TRANSPARENT)
}

fn fill_gradient(layer: &mut Pixmap, gradient: &LinearGradient) {
    let (w, h) = (layer.width() as f32, layer.height() as f32);
    let ((sx, sy), (ex, ey)) = gradient.line(w, h);
    let length = ((ex - sx).powi(2) + (ey - sy).powi(2)).sqrt();
    let stops = gradient
        .resolved_stops(length)
        .into_iter()
        .map(|(pos, color)| GradientStop::new(pos.clamp(0.0, 1.0), to_skia_color(color)))
        .collect();

    let Some(shader) = tiny_skia::LinearGradient::new(
        Point::from_xy(sx, sy),
        Point::from_xy(ex, ey),
        stops,
        SpreadMode::Pad,
        Transform::identity(),
    ) else {
        return;
    };
    let paint = Paint {
        shader,
        anti_alias: false,
        ..Default::default()
    };
    if let Some(rect) = tiny_skia::Rect::from_xywh(0.0, 0.0, w, h) {
        layer.fill_rect(rect, &paint, Transform::identity(), None);
    }
}

/// Scale the image to cover the layer and center it
fn fill_cover(layer: &mut Pixmap, image: &RgbaImage) {
    let Some(source) = pixmap_from_rgba(image) else {
        return;
    };
    let (lw, lh) = (layer.width() as f32, layer.height() as f32);
    let (iw, ih) = (source.width() as f32, source.height() as f32);
    let scale = (lw / iw).max(lh / ih);
    let dx = (lw - iw * scale) / 2.0;
    let dy = (lh - ih * scale) / 2.0;

    let paint = PixmapPaint {
        quality: FilterQuality::Bicubic,
        ..Default::default()
    };
    layer.draw_pixmap(
        0,
        0,
        source.as_ref(),
        &paint,
        Transform::from_row(scale, 0.0, 0.0, scale, dx, dy),
        None,
    );
}
