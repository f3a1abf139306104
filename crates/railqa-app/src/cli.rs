//! CLI argument definitions for the railqa client.
//!
//! Priority resolution: CLI args > env vars > config file > defaults.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// railqa: ask questions about the network statement and sketch process diagrams.
#[derive(Parser, Debug)]
#[command(name = "railqa", version, about)]
pub struct CliArgs {
    /// Path to the configuration file.
    #[arg(short = 'c', long = "config", global = true)]
    pub config: Option<PathBuf>,

    /// Backend base URL, e.g. http://localhost:8000.
    #[arg(short = 'u', long = "base-url", global = true)]
    pub base_url: Option<String>,

    /// Log level (trace, debug, info, warn, error).
    #[arg(short = 'l', long = "log-level", global = true)]
    pub log_level: Option<String>,

    /// Print results as JSON.
    #[arg(long = "json", global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Ask a single question and print the answer.
    Ask {
        /// The question text.
        #[arg(required = true)]
        question: Vec<String>,

        /// Also print the retrieved source passages.
        #[arg(long = "context")]
        context: bool,
    },

    /// Interactive question-answer session.
    Chat,

    /// Generate a process diagram from a description.
    Generate {
        /// Process description. Omit when using --example.
        description: Option<String>,

        /// Use preset description N (1-based).
        #[arg(short = 'e', long = "example", conflicts_with = "description")]
        example: Option<usize>,

        /// Copy the script to the clipboard.
        #[arg(long = "copy")]
        copy: bool,

        /// Save the script as a markdown document.
        #[arg(long = "download")]
        download: bool,

        /// Directory the document is saved to.
        #[arg(short = 'o', long = "out-dir", requires = "download")]
        out_dir: Option<PathBuf>,

        /// Open the diagram in the external editor.
        #[arg(long = "open")]
        open: bool,
    },

    /// Probe the backend dependencies.
    Status {
        /// Keep polling and print every status change until interrupted.
        #[arg(short = 'w', long = "watch")]
        watch: bool,
    },

    /// Open the network statement PDF in the browser.
    OpenDocument,
}

impl CliArgs {
    /// Resolve the configuration file path.
    ///
    /// Priority: --config flag > RAILQA_CONFIG env var > platform default (~/.railqa/config.toml).
    pub fn resolve_config_path(&self) -> PathBuf {
        if let Some(ref p) = self.config {
            return p.clone();
        }
        if let Ok(p) = std::env::var("RAILQA_CONFIG") {
            return PathBuf::from(p);
        }
        default_config_path()
    }

    /// Resolve the backend base URL.
    ///
    /// Priority: --base-url flag > RAILQA_BASE_URL env var > config file value.
    pub fn resolve_base_url(&self, config_base_url: &str) -> String {
        if let Some(ref url) = self.base_url {
            return url.clone();
        }
        if let Ok(url) = std::env::var("RAILQA_BASE_URL") {
            if !url.trim().is_empty() {
                return url;
            }
        }
        config_base_url.to_string()
    }

    /// Resolve the log level.
    ///
    /// Priority: --log-level flag > RAILQA_LOG_LEVEL env var > config file value.
    pub fn resolve_log_level(&self, config_log_level: &str) -> String {
        if let Some(ref level) = self.log_level {
            return level.clone();
        }
        if let Ok(level) = std::env::var("RAILQA_LOG_LEVEL") {
            return level;
        }
        config_log_level.to_string()
    }
}

/// Resolve the download directory.
///
/// Priority: --out-dir flag > RAILQA_DOWNLOAD_DIR env var > config file value.
pub fn resolve_download_dir(flag: Option<&PathBuf>, config_dir: &str) -> PathBuf {
    if let Some(dir) = flag {
        return dir.clone();
    }
    if let Ok(dir) = std::env::var("RAILQA_DOWNLOAD_DIR") {
        return PathBuf::from(dir);
    }
    PathBuf::from(config_dir)
}

/// Default config file path for the current platform.
fn default_config_path() -> PathBuf {
    #[cfg(target_os = "windows")]
    if let Ok(home) = std::env::var("USERPROFILE") {
        return PathBuf::from(home).join(".railqa").join("config.toml");
    }
    #[cfg(not(target_os = "windows"))]
    if let Ok(home) = std::env::var("HOME") {
        return PathBuf::from(home).join(".railqa").join("config.toml");
    }
    PathBuf::from("config.toml")
}
