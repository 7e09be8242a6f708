//! Export pipeline
//!
//! Download and Copy both switch the preview to export scale, wait for a frame at
//! that scale to be committed, rasterize the export handle and hand the PNG to a
//! sink. The export scale is held by a guard, so every exit path restores the
//! display scale.

pub mod label;
pub mod sink;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Mutex;

use self::label::CopyButton;
use self::sink::{ClipboardSink, FileSink};
use crate::render::preview::{PreviewRenderer, SettleTimeout};
use crate::render::raster::{RasterizeError, Rasterizer};
use crate::session::state::EditorStore;

/// Every download uses this file name
pub const EXPORT_FILE_NAME: &str = "screenshot.png";

pub const PNG_MIME: &str = "image/png";

/// Default bound on waiting for the export-scale frame
pub const DEFAULT_SETTLE_TIMEOUT: Duration = Duration::from_millis(500);

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("preview did not settle at export scale")]
    Settle(#[from] SettleTimeout),
    #[error("rasterization failed")]
    Rasterize(#[from] RasterizeError),
    #[error("clipboard write failed")]
    Clipboard(#[source] anyhow::Error),
    #[error("file save failed")]
    FileSave(#[source] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// The save dialog was closed without choosing a file
    Dismissed,
    Copied,
    /// Nothing to export yet
    NoScreenshot,
    /// Another export is still in flight
    Busy,
}

#[derive(Debug, Clone, Copy)]
pub struct ExportOptions {
    pub settle_timeout: Duration,
    /// Also copy the bytes of every download
    pub copy_on_save: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            settle_timeout: DEFAULT_SETTLE_TIMEOUT,
            copy_on_save: false,
        }
    }
}

pub struct Exporter<R, F, C> {
    store: EditorStore,
    renderer: Arc<PreviewRenderer>,
    rasterizer: R,
    files: F,
    clipboard: C,
    options: ExportOptions,
    copy_button: CopyButton,
    in_flight: Mutex<()>,
}

impl<R, F, C> Exporter<R, F, C>
where
    R: Rasterizer,
    F: FileSink,
    C: ClipboardSink,
{
    pub fn new(
        store: EditorStore,
        renderer: Arc<PreviewRenderer>,
        rasterizer: R,
        files: F,
        clipboard: C,
        options: ExportOptions,
        copy_button: CopyButton,
    ) -> Self {
        Self {
            store,
            renderer,
            rasterizer,
            files,
            clipboard,
            options,
            copy_button,
            in_flight: Mutex::new(()),
        }
    }

    #[cfg(test)]
    fn is_busy(&self) -> bool {
        self.in_flight.try_lock().is_err()
    }

    pub fn copy_button(&self) -> &CopyButton {
        &self.copy_button
    }

    pub fn clipboard(&self) -> &C {
        &self.clipboard
    }

    /// Save the composed frame as `screenshot.png`
    pub async fn download(&self) -> Result<ExportOutcome, ExportError> {
        let Ok(_in_flight) = self.in_flight.try_lock() else {
            log::warn!("Download ignored, an export is already running");
            return Ok(ExportOutcome::Busy);
        };
        let Some(bytes) = self.render_png().await? else {
            return Ok(ExportOutcome::NoScreenshot);
        };

        let saved = self
            .files
            .save(EXPORT_FILE_NAME, &bytes)
            .await
            .map_err(ExportError::FileSave)?;
        let Some(path) = saved else {
            return Ok(ExportOutcome::Dismissed);
        };
        log::info!("Screenshot saved to {}", path.display());

        if self.options.copy_on_save {
            // The file is already written; a clipboard failure only gets reported
            match self.clipboard.write(PNG_MIME, bytes).await {
                Ok(()) => self.copy_button.copied(),
                Err(err) => log::error!("Failed to copy saved screenshot: {:?}", err),
            }
        }
        Ok(ExportOutcome::Saved(path))
    }

    /// Put the composed frame on the clipboard as a PNG image
    pub async fn copy(&self) -> Result<ExportOutcome, ExportError> {
        let Ok(_in_flight) = self.in_flight.try_lock() else {
            log::warn!("Copy ignored, an export is already running");
            return Ok(ExportOutcome::Busy);
        };
        let Some(bytes) = self.render_png().await? else {
            return Ok(ExportOutcome::NoScreenshot);
        };

        self.clipboard
            .write(PNG_MIME, bytes)
            .await
            .map_err(ExportError::Clipboard)?;
        self.copy_button.copied();
        log::info!("Screenshot copied to clipboard");
        Ok(ExportOutcome::Copied)
    }

    /// Rasterize at export scale. `None` when there is no screenshot.
    async fn render_png(&self) -> Result<Option<Vec<u8>>, ExportError> {
        if self.store.screenshot().is_none() {
            log::info!("Nothing to export, no screenshot loaded");
            return Ok(None);
        }

        let exporting = self.renderer.begin_export();
        let committed = self
            .renderer
            .wait_for_commit(exporting.ticket(), self.options.settle_timeout)
            .await?;
        log::debug!("Export frame committed: {:?}", committed);

        let Some(scene) = self.renderer.snapshot(&self.store) else {
            return Ok(None);
        };
        let png = self.rasterizer.rasterize(&scene).await?;
        drop(exporting);
        Ok(Some(png))
    }
}
