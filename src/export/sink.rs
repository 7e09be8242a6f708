//! Export destinations: file save and clipboard image write

use std::future::Future;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, bail};

use super::PNG_MIME;
use crate::config::SaveLocation;

/// Saves exported bytes under a file name.
///
/// Resolves to the written path, or `None` when the user dismissed a save dialog.
pub trait FileSink {
    fn save(
        &self,
        file_name: &str,
        bytes: &[u8],
    ) -> impl Future<Output = anyhow::Result<Option<PathBuf>>>;
}

/// Writes an image payload to the system clipboard
pub trait ClipboardSink {
    fn write(&self, mime_type: &str, bytes: Vec<u8>) -> impl Future<Output = anyhow::Result<()>>;
}

/// Writes straight into a directory, replacing any previous export
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSink for DirectorySink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<Option<PathBuf>> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .with_context(|| format!("Failed to create {}", self.dir.display()))?;
        let path = self.dir.join(file_name);
        tokio::fs::write(&path, bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }
}

/// Asks the user where to save through the native save dialog
#[derive(Debug, Clone, Default)]
pub struct DialogSink {
    start_dir: Option<PathBuf>,
}

impl DialogSink {
    pub fn new(start_dir: Option<PathBuf>) -> Self {
        Self { start_dir }
    }
}

impl FileSink for DialogSink {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<Option<PathBuf>> {
        let mut dialog = rfd::AsyncFileDialog::new()
            .set_title("Save Screenshot")
            .set_file_name(file_name)
            .add_filter("PNG image", &["png"]);
        if let Some(dir) = &self.start_dir {
            dialog = dialog.set_directory(dir);
        }

        let Some(handle) = dialog.save_file().await else {
            log::info!("Save dialog dismissed");
            return Ok(None);
        };
        let path = handle.path().to_path_buf();
        handle
            .write(bytes)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(Some(path))
    }
}

/// Either destination, picked from configuration
#[derive(Debug, Clone)]
pub enum Destination {
    Directory(DirectorySink),
    Dialog(DialogSink),
}

impl Destination {
    pub fn from_config(location: SaveLocation, choose: bool, out_dir: Option<PathBuf>) -> Self {
        let dir = out_dir.or_else(|| location_dir(location));
        match dir {
            Some(dir) if !choose => Destination::Directory(DirectorySink::new(dir)),
            dir => Destination::Dialog(DialogSink::new(dir)),
        }
    }
}

impl FileSink for Destination {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> anyhow::Result<Option<PathBuf>> {
        match self {
            Destination::Directory(sink) => sink.save(file_name, bytes).await,
            Destination::Dialog(sink) => sink.save(file_name, bytes).await,
        }
    }
}

fn location_dir(location: SaveLocation) -> Option<PathBuf> {
    match location {
        SaveLocation::Pictures => {
            dirs::picture_dir().or_else(|| dirs::home_dir().map(|h| h.join("Pictures")))
        }
        SaveLocation::Documents => {
            dirs::document_dir().or_else(|| dirs::home_dir().map(|h| h.join("Documents")))
        }
    }
}

/// The desktop clipboard through arboard
///
/// Remembers the last image written so a short-lived process can keep serving it.
#[derive(Debug, Clone, Default)]
pub struct SystemClipboard {
    last: Arc<Mutex<Option<arboard::ImageData<'static>>>>,
}

impl SystemClipboard {
    /// Whether an image was written and not yet handed off
    pub fn holds_image(&self) -> bool {
        self.last.lock().is_ok_and(|last| last.is_some())
    }

    /// Block until another application takes clipboard ownership.
    ///
    /// X11 and Wayland drop the selection with its owner, so a process about to
    /// exit must keep ownership itself. Elsewhere the image already persists.
    pub async fn serve_until_replaced(&self) -> anyhow::Result<()> {
        let data = match self.last.lock() {
            Ok(mut last) => last.take(),
            Err(_) => bail!("Clipboard state poisoned"),
        };
        let Some(data) = data else {
            return Ok(());
        };
        tokio::task::spawn_blocking(move || hold_selection(data)).await?
    }
}

#[cfg(target_os = "linux")]
fn hold_selection(data: arboard::ImageData<'static>) -> anyhow::Result<()> {
    use arboard::SetExtLinux;

    let mut clipboard = arboard::Clipboard::new().context("System clipboard unavailable")?;
    clipboard
        .set()
        .wait()
        .image(data)
        .context("Failed to keep the image on the clipboard")?;
    log::info!("Clipboard image replaced by another application");
    Ok(())
}

#[cfg(not(target_os = "linux"))]
fn hold_selection(_data: arboard::ImageData<'static>) -> anyhow::Result<()> {
    Ok(())
}

impl ClipboardSink for SystemClipboard {
    async fn write(&self, mime_type: &str, bytes: Vec<u8>) -> anyhow::Result<()> {
        if mime_type != PNG_MIME {
            bail!("Unsupported clipboard payload {}", mime_type);
        }
        let data = tokio::task::spawn_blocking(move || {
            let rgba = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png)
                .context("Clipboard payload is not a PNG")?
                .to_rgba8();
            let data = arboard::ImageData {
                width: rgba.width() as usize,
                height: rgba.height() as usize,
                bytes: rgba.into_raw().into(),
            };
            let mut clipboard = arboard::Clipboard::new().context("System clipboard unavailable")?;
            clipboard
                .set_image(data.clone())
                .context("Failed to place image on the clipboard")?;
            anyhow::Ok(data)
        })
        .await??;
        if let Ok(mut last) = self.last.lock() {
            *last = Some(data);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_directory_sink_writes_file() {
        let dir = tempfile::tempdir().unwrap();
        let sink = DirectorySink::new(dir.path().join("nested"));
        let path = sink.save("screenshot.png", b"png").await.unwrap().unwrap();
        assert_eq!(path, dir.path().join("nested").join("screenshot.png"));
        assert_eq!(std::fs::read(&path).unwrap(), b"png");

        // A second export overwrites the fixed file name
        sink.save("screenshot.png", b"again").await.unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"again");
    }

    #[tokio::test]
    async fn test_directory_sink_reports_unwritable_dir() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let sink = DirectorySink::new(blocker.join("sub"));
        assert!(sink.save("screenshot.png", b"png").await.is_err());
    }

    #[tokio::test]
    async fn test_destination_prefers_out_dir() {
        let dir = tempfile::tempdir().unwrap();
        let dest =
            Destination::from_config(SaveLocation::Pictures, false, Some(dir.path().into()));
        assert!(matches!(dest, Destination::Directory(_)));
        let path = dest.save("screenshot.png", b"png").await.unwrap();
        assert_eq!(path, Some(dir.path().join("screenshot.png")));

        let dest = Destination::from_config(SaveLocation::Documents, true, Some(dir.path().into()));
        assert!(matches!(dest, Destination::Dialog(_)));
    }

    #[tokio::test]
    async fn test_system_clipboard_rejects_other_mime() {
        let clipboard = SystemClipboard::default();
        let err = clipboard.write("text/plain", vec![]).await.unwrap_err();
        assert!(err.to_string().contains("text/plain"));
        assert!(!clipboard.holds_image());
    }

    #[tokio::test]
    async fn test_serve_without_image_returns_at_once() {
        let clipboard = SystemClipboard::default();
        assert!(!clipboard.holds_image());
        clipboard.serve_until_replaced().await.unwrap();
    }
}
