pub mod ack;
pub mod config;
pub mod error;
pub mod platform;

pub use ack::CopyAck;
pub use config::RailqaConfig;
pub use error::{RailqaError, Result};
pub use platform::{Clipboard, FileSaver, UrlOpener};
