use std::sync::Arc;

use anyhow::{Context, bail};
use tokio::io::AsyncReadExt;
use tokio::task::JoinHandle;

use crate::capture::image::ScreenshotImage;
use crate::capture::import::{import_file, paste_from_clipboard};
use crate::capture::portal::capture_screen;
use crate::cli::{Cli, Commands, EditorArgs, ExportArgs};
use crate::config::ShotFrameConfig;
use crate::domain::{EditorState, GRADIENTS};
use crate::export::label::CopyButton;
use crate::export::sink::{ClipboardSink, Destination, FileSink, SystemClipboard};
use crate::export::{ExportOptions, ExportOutcome, Exporter};
use crate::render::assets::BackgroundImages;
use crate::render::preview::PreviewRenderer;
use crate::render::raster::{Rasterizer, SkiaRasterizer};
use crate::session::messages::{AcquireSource, Msg};
use crate::session::state::EditorStore;
use crate::style;

/// Editor session: state store, preview render loop and export pipeline
pub struct Editor<R = SkiaRasterizer, F = Destination, C = SystemClipboard> {
    store: EditorStore,
    renderer: Arc<PreviewRenderer>,
    exporter: Exporter<R, F, C>,
    render_task: JoinHandle<()>,
}

impl Editor {
    /// Editor exporting through the real rasterizer, file destination and clipboard
    pub fn from_config(config: &ShotFrameConfig, state: EditorState, files: Destination) -> Self {
        let images = BackgroundImages::new();
        Self::new(
            config,
            state,
            images.clone(),
            SkiaRasterizer::new(images),
            files,
            SystemClipboard::default(),
        )
    }
}

impl<R, F, C> Editor<R, F, C>
where
    R: Rasterizer,
    F: FileSink,
    C: ClipboardSink,
{
    /// Must be called inside a tokio runtime; the preview render loop is spawned here
    pub fn new(
        config: &ShotFrameConfig,
        state: EditorState,
        images: BackgroundImages,
        rasterizer: R,
        files: F,
        clipboard: C,
    ) -> Self {
        let store = EditorStore::new(state);
        let renderer = Arc::new(PreviewRenderer::new(config.display_scale, images));
        let render_task = tokio::spawn(renderer.clone().run(store.clone()));
        let exporter = Exporter::new(
            store.clone(),
            renderer.clone(),
            rasterizer,
            files,
            clipboard,
            ExportOptions {
                settle_timeout: config.settle_timeout(),
                copy_on_save: config.copy_to_clipboard_on_save,
            },
            CopyButton::new(config.copied_label_duration()),
        );
        Self {
            store,
            renderer,
            exporter,
            render_task,
        }
    }

    pub fn store(&self) -> &EditorStore {
        &self.store
    }

    pub fn exporter(&self) -> &Exporter<R, F, C> {
        &self.exporter
    }

    /// Handle one message. Failures are logged and leave the editor unchanged.
    ///
    /// Returns the outcome of export messages.
    pub async fn update(&self, msg: Msg) -> Option<ExportOutcome> {
        match msg {
            Msg::Acquire(source) => {
                self.acquire(source).await;
                None
            }
            Msg::Edit(edit) => {
                if !self.store.apply(edit) {
                    log::debug!("Edit left the state unchanged");
                }
                None
            }
            Msg::Download => match self.exporter.download().await {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    log::error!("Download failed: {:?}", anyhow::Error::from(err));
                    None
                }
            },
            Msg::Copy => match self.exporter.copy().await {
                Ok(outcome) => Some(outcome),
                Err(err) => {
                    log::error!("Copy failed: {:?}", anyhow::Error::from(err));
                    None
                }
            },
        }
    }

    async fn acquire(&self, source: AcquireSource) {
        let acquired = match source {
            AcquireSource::Capture => capture_screen().await,
            AcquireSource::Paste => paste_from_clipboard().await,
            AcquireSource::File(path) => match import_file(&path).await {
                Ok(image) => Some(image),
                Err(err) => {
                    log::warn!("Failed to import {}: {:?}", path.display(), err);
                    None
                }
            },
            AcquireSource::Bytes(bytes) => {
                match tokio::task::spawn_blocking(move || ScreenshotImage::decode(&bytes)).await {
                    Ok(Ok(image)) => Some(image),
                    Ok(Err(err)) => {
                        log::warn!("Image data is not usable: {:?}", err);
                        None
                    }
                    Err(err) => {
                        log::error!("Image decode task failed: {}", err);
                        None
                    }
                }
            }
        };

        match acquired {
            Some(image) => self.store.set_screenshot(image),
            None => log::info!("No image acquired, keeping the current screenshot"),
        }
    }
}

impl<R, F, C> Drop for Editor<R, F, C> {
    fn drop(&mut self) {
        self.render_task.abort();
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = ShotFrameConfig::load();

    match cli.command {
        Commands::Render {
            input,
            editor,
            export,
        } => {
            let source = if input.as_os_str() == "-" {
                let mut bytes = Vec::new();
                tokio::io::stdin()
                    .read_to_end(&mut bytes)
                    .await
                    .context("Failed to read the image from stdin")?;
                AcquireSource::Bytes(bytes)
            } else {
                AcquireSource::File(input)
            };
            frame_and_export(&config, source, &editor, &export).await
        }
        Commands::Paste { editor, export } => {
            frame_and_export(&config, AcquireSource::Paste, &editor, &export).await
        }
        Commands::Capture { editor, export } => {
            frame_and_export(&config, AcquireSource::Capture, &editor, &export).await
        }
        Commands::Style { editor } => {
            let state = editor.apply(config.editor.clone());
            let background: serde_json::Map<String, serde_json::Value> =
                style::background_style(&state)
                    .css()
                    .into_iter()
                    .map(|(name, value)| (name.to_string(), value.into()))
                    .collect();
            let shadow = style::shadow_style(state.shadow).map(|s| s.css());
            let styles = serde_json::json!({
                "state": state,
                "background": background,
                "boxShadow": shadow,
            });
            println!("{}", serde_json::to_string_pretty(&styles)?);
            Ok(())
        }
        Commands::Gradients => {
            for preset in GRADIENTS.iter() {
                println!("{:<16} {}", preset.name, preset.value);
            }
            Ok(())
        }
        Commands::Config { init } => {
            if init {
                let path = ShotFrameConfig::path().context("No config directory")?;
                ShotFrameConfig::default().save_to(&path)?;
                println!("Wrote {}", path.display());
            } else {
                println!("{}", serde_json::to_string_pretty(&config)?);
            }
            Ok(())
        }
    }
}

async fn frame_and_export(
    config: &ShotFrameConfig,
    source: AcquireSource,
    editor_args: &EditorArgs,
    export: &ExportArgs,
) -> anyhow::Result<()> {
    if export.no_save && !export.copy {
        bail!("Nothing to do: --no-save without --copy");
    }

    let destination = Destination::from_config(
        config.save_location,
        export.choose_destination || config.choose_destination,
        export.out_dir.clone(),
    );
    let editor = Editor::from_config(config, config.editor.clone(), destination);
    for edit in editor_args.edits() {
        editor.update(Msg::Edit(edit)).await;
    }

    editor.update(Msg::Acquire(source)).await;
    if editor.store().screenshot().is_none() {
        bail!("No image acquired");
    }

    if !export.no_save {
        match editor.update(Msg::Download).await {
            Some(ExportOutcome::Saved(path)) => println!("{}", path.display()),
            Some(ExportOutcome::Dismissed) => log::info!("Save cancelled"),
            _ => bail!("Saving the screenshot failed"),
        }
    }
    if export.copy {
        match editor.update(Msg::Copy).await {
            Some(ExportOutcome::Copied) => {
                println!("{}", editor.exporter().copy_button().label().text())
            }
            _ => bail!("Copying the screenshot failed"),
        }
    }

    // X11 and Wayland only serve clipboard contents while the owner runs
    let clipboard = editor.exporter().clipboard();
    if cfg!(target_os = "linux") && clipboard.holds_image() {
        eprintln!("Keeping the image on the clipboard until another copy replaces it");
        clipboard.serve_until_replaced().await?;
    }
    Ok(())
}
