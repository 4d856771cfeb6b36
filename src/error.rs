//! Error types for tachy operations.

use thiserror::Error;

/// Guidance shown for `.kfx` files, which are never parsed.
pub const KFX_GUIDANCE: &str = ".kfx is Amazon's proprietary encrypted format and cannot be read \
     locally. Convert it to EPUB using Calibre first.";

/// Errors that can occur while extracting text from a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Container signature or structure does not match its declared format.
    #[error("Invalid document: {0}")]
    Format(String),

    #[error("Unsupported compression: {0}")]
    UnsupportedCompression(String),

    /// Carries the lower-cased extension without the leading dot.
    #[error("Unsupported format: .{0}")]
    UnsupportedFormat(String),

    #[error("{}", KFX_GUIDANCE)]
    KfxBlocked,

    #[error("No readable words found in document")]
    EmptyResult,
}

impl Error {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Error::Format(msg.into())
    }

    /// True for errors raised before any extraction was attempted.
    pub fn is_unsupported_format(&self) -> bool {
        matches!(self, Error::UnsupportedFormat(_) | Error::KfxBlocked)
    }
}

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while validating pacing settings or loading a config file.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("peak rate must be a whole number of words per minute, got {0:?}")]
    NotANumber(String),

    #[error("peak rate {0} wpm is outside the allowed range 100..=1200")]
    OutOfRange(u32),

    #[error("could not read config file {path}: {detail}")]
    Read { path: String, detail: String },

    #[error("invalid config file {path}: {detail}")]
    Parse { path: String, detail: String },
}
