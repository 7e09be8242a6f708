//! Message types for the editor
//!
//! One message per user action; the binding layer of whatever UI drives the
//! editor turns widget events into these.

use std::path::PathBuf;

use crate::domain::{BackgroundType, EditorState};

/// Editor control edits, one per widget
#[derive(Debug, Clone, PartialEq)]
pub enum EditMsg {
    Padding(f32),
    CornerRadius(f32),
    Shadow(f32),
    BackgroundBlur(f32),
    /// Background tab switch; never clears the other background fields
    BackgroundType(BackgroundType),
    BackgroundColor(String),
    BackgroundGradient(String),
    BackgroundImageUrl(String),
}

impl EditMsg {
    /// New state with this edit applied
    pub fn apply(self, state: &EditorState) -> EditorState {
        let mut next = state.clone();
        match self {
            EditMsg::Padding(v) => next.padding = v,
            EditMsg::CornerRadius(v) => next.corner_radius = v,
            EditMsg::Shadow(v) => next.shadow = v,
            EditMsg::BackgroundBlur(v) => next.background_blur = v,
            EditMsg::BackgroundType(t) => next.background_type = t,
            EditMsg::BackgroundColor(c) => next.background_color = c,
            EditMsg::BackgroundGradient(g) => next.background_gradient = g,
            EditMsg::BackgroundImageUrl(u) => next.background_image_url = u,
        }
        next
    }
}

/// Where a new screenshot comes from
#[derive(Debug, Clone, PartialEq)]
pub enum AcquireSource {
    /// Interactive screen capture
    Capture,
    /// Image file chosen by the user
    File(PathBuf),
    /// Image on the system clipboard
    Paste,
    /// Encoded image bytes, e.g. piped in on stdin
    Bytes(Vec<u8>),
}

/// Top-level editor messages
#[derive(Debug, Clone, PartialEq)]
pub enum Msg {
    Acquire(AcquireSource),
    Edit(EditMsg),
    Download,
    Copy,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_touches_only_its_field() {
        let state = EditorState::default();
        let next = EditMsg::CornerRadius(3.0).apply(&state);
        assert_eq!(next.corner_radius, 3.0);
        assert_eq!(
            EditorState {
                corner_radius: state.corner_radius,
                ..next
            },
            state
        );
    }
}
