//! Interactive screen capture through the XDG desktop portal

use super::image::ScreenshotImage;

/// Ask the desktop for an interactive screenshot.
///
/// Cancelling the dialog or denying permission yields `None`.
#[cfg(target_os = "linux")]
pub async fn capture_screen() -> Option<ScreenshotImage> {
    use ashpd::desktop::screenshot::Screenshot;

    let response = match Screenshot::request()
        .interactive(true)
        .modal(true)
        .send()
        .await
        .and_then(|request| request.response())
    {
        Ok(response) => response,
        Err(err) => {
            log::info!("Screen capture cancelled or denied: {}", err);
            return None;
        }
    };

    let Ok(path) = response.uri().to_file_path() else {
        log::warn!("Portal returned a non-file URI: {}", response.uri());
        return None;
    };
    log::debug!("Portal screenshot saved to {}", path.display());

    let bytes = match tokio::fs::read(&path).await {
        Ok(bytes) => bytes,
        Err(err) => {
            log::warn!("Failed to read portal screenshot {}: {}", path.display(), err);
            return None;
        }
    };
    match ScreenshotImage::decode(&bytes) {
        Ok(image) => Some(image),
        Err(err) => {
            log::warn!("Failed to decode portal screenshot: {:?}", err);
            None
        }
    }
}

#[cfg(not(target_os = "linux"))]
pub async fn capture_screen() -> Option<ScreenshotImage> {
    log::warn!("Screen capture is only available through the XDG desktop portal");
    None
}
