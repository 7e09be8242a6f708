//! Background images referenced by URL
//!
//! Supports `data:` URLs, `file://` URLs or plain paths, and `http(s)://`.
//! Decoded images are cached per URL for the lifetime of the cache.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::{Context, bail};
use base64::Engine;
use image::RgbaImage;

#[derive(Clone, Default)]
pub struct BackgroundImages {
    cache: Arc<Mutex<HashMap<String, Arc<RgbaImage>>>>,
}

impl BackgroundImages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch and decode the image behind `url`, reusing an earlier result
    pub async fn resolve(&self, url: &str) -> anyhow::Result<Arc<RgbaImage>> {
        if let Some(hit) = self.lock().get(url) {
            return Ok(hit.clone());
        }

        let bytes = fetch_bytes(url).await?;
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await?
            .with_context(|| format!("Failed to decode background image {}", url))?;
        let image = Arc::new(decoded.to_rgba8());
        log::debug!(
            "Background image {} loaded: {}x{}",
            url,
            image.width(),
            image.height()
        );

        self.lock().insert(url.to_string(), image.clone());
        Ok(image)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<String, Arc<RgbaImage>>> {
        self.cache.lock().unwrap_or_else(|e| e.into_inner())
    }
}

async fn fetch_bytes(url: &str) -> anyhow::Result<Vec<u8>> {
    let url = url.trim();
    if let Some(rest) = url.strip_prefix("data:") {
        return decode_data_url(rest);
    }
    if url.starts_with("http://") || url.starts_with("https://") {
        let response = reqwest::get(url)
            .await
            .with_context(|| format!("Failed to fetch {}", url))?
            .error_for_status()?;
        return Ok(response.bytes().await?.to_vec());
    }
    let path = url.strip_prefix("file://").unwrap_or(url);
    tokio::fs::read(path)
        .await
        .with_context(|| format!("Failed to read background image {}", path))
}

/// Decode the part of a data URL after `data:`
fn decode_data_url(rest: &str) -> anyhow::Result<Vec<u8>> {
    let Some((meta, payload)) = rest.split_once(',') else {
        bail!("Malformed data URL");
    };
    if meta.ends_with(";base64") {
        Ok(base64::engine::general_purpose::STANDARD.decode(payload.trim())?)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}
