//! Layout of a composed frame
//!
//! Constants and math shared between the live preview and the export rasterizer.

use crate::domain::{EditorState, Rect, Rgba};
use crate::style::{BackgroundStyle, ShadowStyle};

/// Shape constants
pub mod shape {
    /// Corner radius of the outer frame that clips background and shadow
    pub const CONTAINER_RADIUS: f32 = 8.0;

    /// Ellipse bezier approximation constant: 4/3 * (sqrt(2) - 1)
    pub const BEZIER_K: f32 = 0.552_284_8;

    /// A CSS blur radius maps to a gaussian standard deviation of half its value
    pub const SIGMA_PER_BLUR_RADIUS: f32 = 0.5;
}

/// Where the shadow goes and how soft it is
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShadowLayout {
    /// Shadow shape before the offset is applied
    pub rect: Rect,
    /// Sub-pixel offset, applied as a transform when painting
    pub offset: (f32, f32),
    pub corner_radius: f32,
    pub sigma: f32,
    pub color: Rgba,
}

/// Every rectangle of a frame, in container coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameLayout {
    /// Exportable frame: screenshot plus padding on every side
    pub container: Rect,
    /// Background box, grown past the container so blur never samples an edge
    pub background: Rect,
    /// Screenshot position
    pub foreground: Rect,
    /// Screenshot corner radius after clamping to the screenshot size
    pub corner_radius: f32,
    pub shadow: Option<ShadowLayout>,
}

impl FrameLayout {
    /// Padding is snapped to whole pixels so the screenshot lands on the pixel
    /// grid and the exported PNG has integer dimensions. The shadow offset keeps
    /// its fractional part.
    pub fn compute(
        image_width: u32,
        image_height: u32,
        state: &EditorState,
        background: &BackgroundStyle,
        shadow: &ShadowStyle,
    ) -> Self {
        let padding = state.padding.max(0.0).round() as i32;
        let foreground = Rect::from_size(image_width, image_height).translate(padding, padding);
        let container = foreground.outset(padding);
        let background = container.outset(background.margin().max(0.0).round() as i32);

        let corner_radius = clamp_radius(state.corner_radius, foreground);
        let shadow = shadow.map(|s| ShadowLayout {
            rect: foreground.outset(s.spread.round() as i32),
            offset: (s.offset_x, s.offset_y),
            corner_radius,
            sigma: s.blur_radius * shape::SIGMA_PER_BLUR_RADIUS,
            color: s.color,
        });

        Self {
            container,
            background,
            foreground,
            corner_radius,
            shadow,
        }
    }
}

/// Radius no larger than half the shorter side, never negative
pub fn clamp_radius(radius: f32, rect: Rect) -> f32 {
    let max = (rect.width().min(rect.height()).max(0) as f32) / 2.0;
    if radius.is_finite() {
        radius.clamp(0.0, max)
    } else {
        0.0
    }
}

/// Size after applying a render scale, at least one pixel per axis
pub fn scaled_size(width: u32, height: u32, scale: f32) -> (u32, u32) {
    let scale = if scale.is_finite() && scale > 0.0 {
        scale
    } else {
        1.0
    };
    (
        ((width as f32 * scale).round() as u32).max(1),
        ((height as f32 * scale).round() as u32).max(1),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::style::{background_style, shadow_style};

    fn layout(w: u32, h: u32, state: &EditorState) -> FrameLayout {
        FrameLayout::compute(
            w,
            h,
            state,
            &background_style(state),
            &shadow_style(state.shadow),
        )
    }

    #[test]
    fn test_default_layout() {
        let state = EditorState::default();
        let l = layout(200, 100, &state);
        assert_eq!(l.container, Rect::from_size(328, 228));
        assert_eq!(l.foreground, Rect::new(64, 64, 264, 164));
        assert_eq!(l.background, l.container);
        assert_eq!(l.corner_radius, 16.0);

        let shadow = l.shadow.unwrap();
        assert_eq!(shadow.rect, l.foreground);
        assert_eq!(shadow.offset, (0.0, 8.0));
        assert_eq!(shadow.sigma, 8.0);
        assert!((shadow.color.a - 0.18).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_shadow_offset_kept() {
        let state = EditorState {
            padding: 10.4,
            shadow: 7.5,
            ..Default::default()
        };
        let l = layout(20, 20, &state);
        assert_eq!(l.foreground, Rect::new(10, 10, 30, 30));

        let shadow = l.shadow.unwrap();
        assert_eq!(shadow.offset, (0.0, 7.5));
        assert_eq!(shadow.sigma, 7.5);
    }

    #[test]
    fn test_blur_grows_background_box() {
        let state = EditorState {
            background_blur: 20.0,
            ..Default::default()
        };
        let l = layout(100, 100, &state);
        assert_eq!(l.background, l.container.outset(40));
    }

    #[test]
    fn test_no_shadow_and_zero_padding() {
        let state = EditorState {
            padding: 0.0,
            shadow: 0.0,
            ..Default::default()
        };
        let l = layout(50, 40, &state);
        assert_eq!(l.container, Rect::from_size(50, 40));
        assert_eq!(l.foreground, l.container);
        assert!(l.shadow.is_none());
    }

    #[test]
    fn test_radius_clamped_to_half_side() {
        assert_eq!(clamp_radius(64.0, Rect::from_size(30, 100)), 15.0);
        assert_eq!(clamp_radius(-3.0, Rect::from_size(30, 100)), 0.0);
    }

    #[test]
    fn test_scaled_size() {
        assert_eq!(scaled_size(100, 50, 0.8), (80, 40));
        assert_eq!(scaled_size(100, 50, 1.0), (100, 50));
        assert_eq!(scaled_size(1, 1, 0.1), (1, 1));
        assert_eq!(scaled_size(10, 10, f32::NAN), (10, 10));
    }
}
