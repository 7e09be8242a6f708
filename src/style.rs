//! Style mapping: editor configuration to layer styles
//!
//! Everything here is a pure function of [`EditorState`]. The renderers consume
//! these descriptors; `css()` renders the same values as CSS declarations.

use crate::domain::{BackgroundType, EditorState, Rgba};

/// Shadow slider upper bound; intensity is normalized against it
pub const SHADOW_RANGE: f32 = 40.0;

/// How the background layer is filled
#[derive(Debug, Clone, PartialEq)]
pub enum Fill {
    /// Flat color, as entered
    Color(String),
    /// Gradient descriptor, used verbatim
    Gradient(String),
    /// Image scaled to cover its box, centered
    Image(String),
    /// Nothing drawn
    None,
}

/// Filter applied to the background layer
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Filter {
    Identity,
    Blur(f32),
}

impl Filter {
    pub fn css(&self) -> String {
        match self {
            Filter::Identity => "none".to_string(),
            Filter::Blur(radius) => format!("blur({radius}px)"),
        }
    }
}

/// Background layer descriptor
#[derive(Debug, Clone, PartialEq)]
pub struct BackgroundStyle {
    /// Offset of every edge relative to the container; negative grows the box
    pub inset: f32,
    pub filter: Filter,
    pub fill: Fill,
}

impl BackgroundStyle {
    /// How far the layer extends past the container on each side
    pub fn margin(&self) -> f32 {
        -self.inset
    }

    pub fn css(&self) -> Vec<(&'static str, String)> {
        let edge = px(self.inset);
        let mut decls = vec![
            ("position", "absolute".to_string()),
            ("top", edge.clone()),
            ("right", edge.clone()),
            ("bottom", edge.clone()),
            ("left", edge),
            ("filter", self.filter.css()),
        ];
        match &self.fill {
            Fill::Color(color) => decls.push(("background-color", color.clone())),
            Fill::Gradient(gradient) => decls.push(("background", gradient.clone())),
            Fill::Image(url) => {
                decls.push(("background-image", format!("url({url})")));
                decls.push(("background-size", "cover".to_string()));
                decls.push(("background-position", "center".to_string()));
            }
            Fill::None => {
                decls.push(("background-image", "none".to_string()));
                decls.push(("background-size", "cover".to_string()));
                decls.push(("background-position", "center".to_string()));
            }
        }
        decls
    }
}

/// Drop shadow under the screenshot
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoxShadow {
    pub offset_x: f32,
    pub offset_y: f32,
    pub blur_radius: f32,
    pub spread: f32,
    pub color: Rgba,
}

impl BoxShadow {
    pub fn css(&self) -> String {
        format!(
            "{} {} {} {}",
            px(self.offset_x),
            px(self.offset_y),
            px(self.blur_radius),
            self.color
        )
    }
}

/// Shadow descriptor; `None` means no shadow property at all
pub type ShadowStyle = Option<BoxShadow>;

/// Background layer style for a configuration.
pub fn background_style(state: &EditorState) -> BackgroundStyle {
    let blur = state.background_blur.max(0.0);
    let filter = if blur > 0.0 {
        Filter::Blur(blur)
    } else {
        Filter::Identity
    };

    let fill = match state.background_type {
        BackgroundType::Color => Fill::Color(state.background_color.clone()),
        BackgroundType::Gradient => Fill::Gradient(state.background_gradient.clone()),
        BackgroundType::Image if state.background_image_url.is_empty() => Fill::None,
        BackgroundType::Image => Fill::Image(state.background_image_url.clone()),
    };

    BackgroundStyle {
        inset: -(blur * 2.0),
        filter,
        fill,
    }
}

/// Shadow style for a shadow intensity in 0..=40.
///
/// Depth and softness scale together: offset = shadow, blur = 2 * shadow,
/// opacity = 0.1 + (shadow / 40) * 0.4.
pub fn shadow_style(shadow: f32) -> ShadowStyle {
    if shadow <= 0.0 {
        return None;
    }
    let intensity = shadow / SHADOW_RANGE;
    let blur_radius = shadow * 2.0;
    let opacity = 0.1 + intensity * 0.4;

    Some(BoxShadow {
        offset_x: 0.0,
        offset_y: shadow,
        blur_radius,
        spread: 0.0,
        color: Rgba::BLACK.with_alpha(opacity),
    })
}

/// `0` stays unsigned so a zero blur never prints `-0px`
fn px(value: f32) -> String {
    if value == 0.0 {
        "0".to_string()
    } else {
        format!("{value}px")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_shadow_mapping_over_full_range() {
        for step in 1..=40 {
            let shadow = step as f32;
            let s = shadow_style(shadow).unwrap();
            assert!(approx(s.color.a, 0.1 + (shadow / 40.0) * 0.4));
            assert_eq!(s.blur_radius, shadow * 2.0);
            assert_eq!(s.offset_y, shadow);
            assert_eq!(s.offset_x, 0.0);
            assert_eq!(s.spread, 0.0);
        }
    }

    #[test]
    fn test_zero_shadow_emits_nothing() {
        assert!(shadow_style(0.0).is_none());
    }

    #[test]
    fn test_shadow_css_for_default_intensity() {
        let s = shadow_style(8.0).unwrap();
        assert_eq!(s.css(), "0 8px 16px rgba(0, 0, 0, 0.18)");
    }

    #[test]
    fn test_background_inset_tracks_blur() {
        for blur in 0..=20 {
            let state = EditorState {
                background_blur: blur as f32,
                ..Default::default()
            };
            let style = background_style(&state);
            assert_eq!(style.inset, -2.0 * blur as f32);
            assert_eq!(style.margin(), 2.0 * blur as f32);
        }
    }

    #[test]
    fn test_zero_blur_is_identity_filter() {
        let style = background_style(&EditorState::default());
        assert_eq!(style.filter, Filter::Identity);
        let css = style.css();
        assert!(css.contains(&("filter", "none".to_string())));
        assert!(css.contains(&("top", "0".to_string())));
    }

    #[test]
    fn test_max_blur_css() {
        let state = EditorState {
            background_blur: 20.0,
            ..Default::default()
        };
        let css = background_style(&state).css();
        assert!(css.contains(&("filter", "blur(20px)".to_string())));
        for edge in ["top", "right", "bottom", "left"] {
            assert!(css.contains(&(edge, "-40px".to_string())));
        }
    }

    #[test]
    fn test_fill_follows_background_type_without_clearing_others() {
        let mut state = EditorState {
            background_color: "#ff0000".to_string(),
            background_gradient: "linear-gradient(red, blue)".to_string(),
            background_image_url: "file:///tmp/bg.png".to_string(),
            ..Default::default()
        };

        state.background_type = BackgroundType::Gradient;
        assert_eq!(
            background_style(&state).fill,
            Fill::Gradient("linear-gradient(red, blue)".to_string())
        );
        state.background_type = BackgroundType::Image;
        assert_eq!(
            background_style(&state).fill,
            Fill::Image("file:///tmp/bg.png".to_string())
        );
        state.background_type = BackgroundType::Color;
        assert_eq!(
            background_style(&state).fill,
            Fill::Color("#ff0000".to_string())
        );
    }

    #[test]
    fn test_empty_image_url_draws_nothing() {
        let state = EditorState {
            background_type: BackgroundType::Image,
            background_image_url: String::new(),
            ..Default::default()
        };
        let style = background_style(&state);
        assert_eq!(style.fill, Fill::None);
        assert!(style.css().contains(&("background-image", "none".to_string())));
    }
}
