//! Platform collaborators consumed by the client state machines.
//!
//! The clipboard, file-save and browser primitives are treated as black
//! boxes. State machines take them as trait objects so they can run
//! headless; the binary wires in the system implementations.

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{RailqaError, Result};

/// Writes text to a clipboard.
pub trait Clipboard: Send + Sync {
    fn write_text(&self, text: &str) -> Result<()>;
}

/// Saves a named document somewhere the user can find it.
pub trait FileSaver: Send + Sync {
    /// Save `content` under `file_name`, returning where it ended up.
    fn save(&self, file_name: &str, content: &str) -> Result<PathBuf>;
}

/// Opens a URL in the user's browser.
pub trait UrlOpener: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

/// Reject anything that is not an `http://` or `https://` URL.
///
/// Openers call this before handing a URL to the OS so `javascript:`,
/// `file://` and `data:` links never reach the browser.
pub fn validate_url(url: &str) -> Result<()> {
    if url.is_empty() {
        return Err(RailqaError::Platform("URL must not be empty".to_string()));
    }
    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err(RailqaError::Platform(format!(
            "Unsupported URL scheme. Only http:// and https:// are allowed, got: {}",
            url
        )));
    }
    Ok(())
}

/// Saves documents into a fixed directory, overwriting same-named files.
#[derive(Debug, Clone)]
pub struct DirectorySaver {
    dir: PathBuf,
}

impl DirectorySaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl FileSaver for DirectorySaver {
    fn save(&self, file_name: &str, content: &str) -> Result<PathBuf> {
        if file_name.is_empty() || file_name.contains(['/', '\\']) {
            return Err(RailqaError::Platform(format!(
                "Invalid file name: {:?}",
                file_name
            )));
        }
        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file_name);
        std::fs::write(&path, content)?;
        tracing::info!(path = %path.display(), bytes = content.len(), "Saved document");
        Ok(path)
    }
}

/// In-process clipboard, for headless runs and tests.
#[derive(Debug, Default)]
pub struct MemoryClipboard {
    contents: Mutex<Option<String>>,
}

impl MemoryClipboard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read back the last written text.
    pub fn read_text(&self) -> Option<String> {
        self.contents.lock().ok().and_then(|c| c.clone())
    }
}

impl Clipboard for MemoryClipboard {
    fn write_text(&self, text: &str) -> Result<()> {
        let mut contents = self
            .contents
            .lock()
            .map_err(|e| RailqaError::Platform(format!("clipboard lock poisoned: {}", e)))?;
        *contents = Some(text.to_string());
        Ok(())
    }
}

/// Records opened URLs instead of launching a browser.
#[derive(Debug, Default)]
pub struct RecordingOpener {
    opened: Mutex<Vec<String>>,
}

impl RecordingOpener {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn opened(&self) -> Vec<String> {
        self.opened.lock().map(|o| o.clone()).unwrap_or_default()
    }
}

impl UrlOpener for RecordingOpener {
    fn open(&self, url: &str) -> Result<()> {
        validate_url(url)?;
        self.opened
            .lock()
            .map_err(|e| RailqaError::Platform(format!("opener lock poisoned: {}", e)))?
            .push(url.to_string());
        Ok(())
    }
}
