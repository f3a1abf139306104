//! System clipboard and browser backed platform collaborators.

use std::sync::Mutex;

use railqa_core::error::{RailqaError, Result};
use railqa_core::platform::{validate_url, Clipboard, UrlOpener};

fn clipboard_error(e: arboard::Error) -> RailqaError {
    RailqaError::Platform(format!("clipboard error: {}", e))
}

/// The OS clipboard.
///
/// One `arboard::Clipboard` is opened on first use and kept for the life of
/// this value. On X11 and Wayland the process owns the selection, so the
/// copied text is only served while that handle is alive.
#[derive(Default)]
pub struct SystemClipboard {
    inner: Mutex<Option<arboard::Clipboard>>,
}

impl SystemClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    #[cfg(test)]
    fn is_open(&self) -> bool {
        self.inner.lock().map(|c| c.is_some()).unwrap_or(false)
    }
}

impl Clipboard for SystemClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|e| RailqaError::Platform(format!("clipboard lock poisoned: {}", e)))?;
        if inner.is_none() {
            *inner = Some(arboard::Clipboard::new().map_err(clipboard_error)?);
        }
        if let Some(clipboard) = inner.as_mut() {
            clipboard.set_text(text).map_err(clipboard_error)?;
        }
        tracing::info!(text_len = text.len(), "Copied to clipboard");
        Ok(())
    }
}

/// Serve `text` as the clipboard selection until another application
/// replaces it. Blocks the calling thread.
#[cfg(target_os = "linux")]
pub fn hold_selection(text: &str) -> Result<()> {
    use arboard::SetExtLinux;

    let mut clipboard = arboard::Clipboard::new().map_err(clipboard_error)?;
    clipboard.set().wait().text(text).map_err(clipboard_error)?;
    tracing::debug!("Clipboard selection taken over by another application");
    Ok(())
}

/// The user's default browser.
pub struct SystemBrowser;

impl UrlOpener for SystemBrowser {
    fn open(&self, url: &str) -> Result<()> {
        validate_url(url)?;
        open::that(url)
            .map_err(|e| RailqaError::Platform(format!("failed to open browser: {}", e)))?;
        tracing::info!(url_len = url.len(), "Opened URL in browser");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_browser_rejects_non_http_schemes() {
        for url in ["", "javascript:alert(1)", "file:///etc/passwd", "ftp://host/x"] {
            assert!(
                matches!(SystemBrowser.open(url), Err(RailqaError::Platform(_))),
                "accepted {url:?}"
            );
        }
    }

    #[test]
    fn test_clipboard_opens_lazily_and_is_shareable() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SystemClipboard>();

        // No display is touched until the first write.
        let clipboard = SystemClipboard::new();
        assert!(!clipboard.is_open());
    }
}
