//! Copy button label feedback

use std::sync::Mutex;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;

/// How long "Copied!" stays up by default
pub const COPIED_LABEL_DURATION: Duration = Duration::from_millis(2000);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyLabel {
    #[default]
    CopyImage,
    Copied,
}

impl CopyLabel {
    pub fn text(self) -> &'static str {
        match self {
            CopyLabel::CopyImage => "Copy Image",
            CopyLabel::Copied => "Copied!",
        }
    }
}

/// Label of the copy button, flipped to "Copied!" after each successful copy
pub struct CopyButton {
    label: watch::Sender<CopyLabel>,
    revert_after: Duration,
    revert: Mutex<Option<JoinHandle<()>>>,
}

impl CopyButton {
    pub fn new(revert_after: Duration) -> Self {
        let (label, _) = watch::channel(CopyLabel::CopyImage);
        Self {
            label,
            revert_after,
            revert: Mutex::new(None),
        }
    }

    pub fn label(&self) -> CopyLabel {
        *self.label.borrow()
    }

    /// Show "Copied!" and restart the revert timer
    pub fn copied(&self) {
        self.label.send_replace(CopyLabel::Copied);

        let label = self.label.clone();
        let revert_after = self.revert_after;
        let timer = tokio::spawn(async move {
            tokio::time::sleep(revert_after).await;
            label.send_replace(CopyLabel::CopyImage);
        });

        let mut pending = self.revert.lock().unwrap_or_else(|e| e.into_inner());
        if let Some(previous) = pending.replace(timer) {
            previous.abort();
        }
    }
}

impl Default for CopyButton {
    fn default() -> Self {
        Self::new(COPIED_LABEL_DURATION)
    }
}

impl Drop for CopyButton {
    fn drop(&mut self) {
        let pending = self.revert.get_mut().unwrap_or_else(|e| e.into_inner());
        if let Some(timer) = pending.take() {
            timer.abort();
        }
    }
}
