//! Editor configuration: the single value every view is derived from

use serde::{Deserialize, Serialize};

/// Slider ranges enforced by the editor controls
pub mod limits {
    pub const PADDING_MAX: f32 = 128.0;
    pub const CORNER_RADIUS_MAX: f32 = 64.0;
    pub const SHADOW_MAX: f32 = 40.0;
    pub const BLUR_MAX: f32 = 20.0;
}

/// Which background field is authoritative
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackgroundType {
    #[default]
    Color,
    Gradient,
    Image,
}

impl std::str::FromStr for BackgroundType {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "color" => Ok(BackgroundType::Color),
            "gradient" => Ok(BackgroundType::Gradient),
            "image" => Ok(BackgroundType::Image),
            other => anyhow::bail!("unknown background type '{other}'"),
        }
    }
}

/// Editor configuration.
///
/// Replaced wholesale on every edit. Switching `background_type` never clears the
/// inactive background fields, so flipping back restores the previous choice.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorState {
    /// Inset between the background edge and the screenshot, in pixels
    pub padding: f32,
    /// Screenshot corner radius in pixels
    pub corner_radius: f32,
    /// Shadow intensity (0..=40), 0 disables the shadow
    pub shadow: f32,
    pub background_type: BackgroundType,
    pub background_color: String,
    pub background_gradient: String,
    pub background_image_url: String,
    /// Background blur radius (0..=20), 0 disables the blur
    pub background_blur: f32,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            padding: 64.0,
            corner_radius: 16.0,
            shadow: 8.0,
            background_type: BackgroundType::Color,
            background_color: "#3b82f6".to_string(),
            background_gradient: "linear-gradient(to right, #833ab4, #fd1d1d, #fcb045)"
                .to_string(),
            background_image_url:
                "https://512pixels.net/wp-content/uploads/2025/06/15-Sequoia-Light-thumbnail.jpg"
                    .to_string(),
            background_blur: 0.0,
        }
    }
}

impl EditorState {
    /// Clamp every numeric field into its control range.
    ///
    /// Values keep their fractional part; frame layout snaps the padding to whole pixels.
    pub fn sanitized(mut self) -> Self {
        self.padding = clamp_finite(self.padding, limits::PADDING_MAX);
        self.corner_radius = clamp_finite(self.corner_radius, limits::CORNER_RADIUS_MAX);
        self.shadow = clamp_finite(self.shadow, limits::SHADOW_MAX);
        self.background_blur = clamp_finite(self.background_blur, limits::BLUR_MAX);
        self
    }
}

fn clamp_finite(value: f32, max: f32) -> f32 {
    if value.is_finite() {
        value.clamp(0.0, max)
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_editor_defaults() {
        let state = EditorState::default();
        assert_eq!(state.padding, 64.0);
        assert_eq!(state.corner_radius, 16.0);
        assert_eq!(state.shadow, 8.0);
        assert_eq!(state.background_type, BackgroundType::Color);
        assert_eq!(state.background_color, "#3b82f6");
        assert_eq!(state.background_blur, 0.0);
    }

    #[test]
    fn test_sanitized_clamps_ranges() {
        let state = EditorState {
            padding: -4.0,
            corner_radius: 500.0,
            shadow: 41.0,
            background_blur: f32::NAN,
            ..Default::default()
        }
        .sanitized();
        assert_eq!(state.padding, 0.0);
        assert_eq!(state.corner_radius, 64.0);
        assert_eq!(state.shadow, 40.0);
        assert_eq!(state.background_blur, 0.0);
    }

    #[test]
    fn test_json_uses_camel_case_and_defaults() {
        let state: EditorState =
            serde_json::from_str(r#"{"backgroundType":"gradient","backgroundBlur":5}"#).unwrap();
        assert_eq!(state.background_type, BackgroundType::Gradient);
        assert_eq!(state.background_blur, 5.0);
        assert_eq!(state.padding, 64.0);

        let json = serde_json::to_string(&state).unwrap();
        assert!(json.contains("\"cornerRadius\""));
        assert!(json.contains("\"backgroundType\":\"gradient\""));
    }

    #[test]
    fn test_background_type_from_str() {
        assert_eq!("Image".parse::<BackgroundType>().unwrap(), BackgroundType::Image);
        assert!("video".parse::<BackgroundType>().is_err());
    }
}
