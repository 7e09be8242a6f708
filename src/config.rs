//! Configuration persistence for shotframe settings

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use serde::{Deserialize, Serialize};

use crate::domain::EditorState;

/// Save location for screenshots (Pictures or Documents)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SaveLocation {
    #[default]
    Pictures,
    Documents,
}

/// Application configuration persisted between sessions
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShotFrameConfig {
    /// Editor settings applied at startup
    pub editor: EditorState,
    /// On-screen preview shrink factor
    pub display_scale: f32,
    /// Upper bound on waiting for the export-scale frame before rasterizing
    pub settle_timeout_ms: u64,
    /// How long the copy button reads "Copied!"
    pub copied_label_ms: u64,
    /// Where to save screenshots (Pictures or Documents folder)
    pub save_location: SaveLocation,
    /// Ask for the destination with a save dialog
    pub choose_destination: bool,
    /// Whether to also copy to clipboard when saving to file
    pub copy_to_clipboard_on_save: bool,
}

impl Default for ShotFrameConfig {
    fn default() -> Self {
        Self {
            editor: EditorState::default(),
            display_scale: 0.8,
            settle_timeout_ms: 500,
            copied_label_ms: 2000,
            // Default to Pictures folder
            save_location: SaveLocation::Pictures,
            choose_destination: false,
            copy_to_clipboard_on_save: false,
        }
    }
}

impl ShotFrameConfig {
    /// Application directory name under the user's config dir
    pub const ID: &'static str = "shotframe";

    pub fn path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join(Self::ID).join("config.json"))
    }

    /// Load configuration from disk, or return defaults if unavailable
    pub fn load() -> Self {
        match Self::path() {
            Some(path) => Self::load_from(&path),
            None => {
                log::warn!("No config directory, using defaults");
                Self::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Self {
        let text = match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                log::debug!("No config at {}, using defaults", path.display());
                return Self::default();
            }
            Err(err) => {
                log::warn!("Could not read config {}: {}", path.display(), err);
                return Self::default();
            }
        };
        match serde_json::from_str::<Self>(&text) {
            Ok(config) => config.sanitized(),
            Err(err) => {
                log::warn!("Error loading config, using defaults: {:?}", err);
                Self::default()
            }
        }
    }

    /// Write the configuration as pretty JSON, creating parent directories
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let text = serde_json::to_string_pretty(self)?;
        std::fs::write(path, text).with_context(|| format!("Failed to write {}", path.display()))
    }

    pub fn settle_timeout(&self) -> Duration {
        Duration::from_millis(self.settle_timeout_ms)
    }

    pub fn copied_label_duration(&self) -> Duration {
        Duration::from_millis(self.copied_label_ms)
    }

    fn sanitized(mut self) -> Self {
        self.editor = self.editor.sanitized();
        if !(self.display_scale.is_finite() && self.display_scale > 0.0) {
            log::warn!("Invalid display_scale {}, using 0.8", self.display_scale);
            self.display_scale = 0.8;
        }
        self
    }
}
