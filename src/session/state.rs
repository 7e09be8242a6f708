//! Editor state store
//!
//! Holds the editor configuration and the current screenshot. Both are replaced
//! wholesale and broadcast through `watch` channels, so every subscriber re-derives
//! from a consistent value.

use std::sync::Arc;

use tokio::sync::watch;

use super::messages::EditMsg;
use crate::capture::image::ScreenshotImage;
use crate::domain::EditorState;

#[derive(Clone, Debug)]
pub struct EditorStore {
    state: watch::Sender<Arc<EditorState>>,
    screenshot: watch::Sender<Option<Arc<ScreenshotImage>>>,
}

impl EditorStore {
    pub fn new(initial: EditorState) -> Self {
        let (state, _) = watch::channel(Arc::new(initial.sanitized()));
        let (screenshot, _) = watch::channel(None);
        Self { state, screenshot }
    }

    /// Current configuration snapshot
    pub fn state(&self) -> Arc<EditorState> {
        self.state.borrow().clone()
    }

    /// Current screenshot, if one was acquired
    pub fn screenshot(&self) -> Option<Arc<ScreenshotImage>> {
        self.screenshot.borrow().clone()
    }

    /// Replace the configuration. Subscribers are only woken when the value changes.
    pub fn replace_state(&self, next: EditorState) -> bool {
        let next = next.sanitized();
        self.state.send_if_modified(|current| {
            if **current == next {
                return false;
            }
            *current = Arc::new(next);
            true
        })
    }

    /// Apply a single control edit
    pub fn apply(&self, edit: EditMsg) -> bool {
        let next = edit.apply(&self.state());
        self.replace_state(next)
    }

    /// Replace the screenshot with a freshly acquired one
    pub fn set_screenshot(&self, screenshot: ScreenshotImage) {
        log::info!(
            "Screenshot replaced: {}x{}",
            screenshot.width(),
            screenshot.height()
        );
        self.screenshot.send_replace(Some(Arc::new(screenshot)));
    }

    pub fn subscribe_state(&self) -> watch::Receiver<Arc<EditorState>> {
        self.state.subscribe()
    }

    pub fn subscribe_screenshot(&self) -> watch::Receiver<Option<Arc<ScreenshotImage>>> {
        self.screenshot.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BackgroundType;
    use image::RgbaImage;

    #[test]
    fn test_edits_replace_whole_value() {
        let store = EditorStore::new(EditorState::default());
        let before = store.state();
        assert!(store.apply(EditMsg::Padding(10.0)));
        let after = store.state();

        assert_eq!(before.padding, 64.0);
        assert_eq!(after.padding, 10.0);
        assert!(!Arc::ptr_eq(&before, &after));
    }

    #[test]
    fn test_unchanged_value_does_not_notify() {
        let store = EditorStore::new(EditorState::default());
        let mut rx = store.subscribe_state();
        assert!(!store.apply(EditMsg::Padding(64.0)));
        assert!(!rx.has_changed().unwrap());

        assert!(store.apply(EditMsg::Shadow(12.0)));
        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().shadow, 12.0);
    }

    #[test]
    fn test_out_of_range_edits_are_clamped() {
        let store = EditorStore::new(EditorState::default());
        store.apply(EditMsg::BackgroundBlur(99.0));
        store.apply(EditMsg::Shadow(-1.0));
        assert_eq!(store.state().background_blur, 20.0);
        assert_eq!(store.state().shadow, 0.0);
    }

    #[test]
    fn test_switching_background_type_keeps_other_fields() {
        let store = EditorStore::new(EditorState::default());
        store.apply(EditMsg::BackgroundColor("#112233".to_string()));
        store.apply(EditMsg::BackgroundType(BackgroundType::Gradient));
        store.apply(EditMsg::BackgroundGradient(
            "linear-gradient(red, blue)".to_string(),
        ));
        store.apply(EditMsg::BackgroundType(BackgroundType::Color));

        let state = store.state();
        assert_eq!(state.background_color, "#112233");
        assert_eq!(state.background_gradient, "linear-gradient(red, blue)");
    }

    #[test]
    fn test_screenshot_replaced_wholesale() {
        let store = EditorStore::new(EditorState::default());
        assert!(store.screenshot().is_none());

        store.set_screenshot(ScreenshotImage::new(RgbaImage::new(4, 4)));
        let first = store.screenshot().unwrap();
        store.set_screenshot(ScreenshotImage::new(RgbaImage::new(8, 2)));
        let second = store.screenshot().unwrap();

        assert_eq!(first.width(), 4);
        assert_eq!((second.width(), second.height()), (8, 2));
    }
}
