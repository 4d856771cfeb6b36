//! Format detection and text extraction.
//!
//! A [`SourceDocument`] is routed by its file extension to one extractor;
//! each extractor turns the raw bytes into plain text.

mod archive;
mod docx;
mod epub;
mod html;
mod pdf;
mod plain;
mod rtf;
mod xml;

use std::fmt;
use std::path::Path;

use tracing::debug;

use crate::error::{Error, Result};
use crate::mobi;
use crate::tokenize::WordSequence;

/// Extensions with an extractor, in picker order.
pub const ACCEPTED_EXTENSIONS: &[&str] = &[
    "txt", "html", "htm", "epub", "pdf", "docx", "fb2", "rtf", "mobi", "azw", "azw3",
];

/// Comma-separated `.ext` list for file pickers (`.txt,.html,...`).
pub fn accept_attr() -> String {
    ACCEPTED_EXTENSIONS
        .iter()
        .map(|ext| format!(".{ext}"))
        .collect::<Vec<_>>()
        .join(",")
}

/// Document formats with an extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Text,
    Html,
    Epub,
    Pdf,
    Docx,
    Fb2,
    Rtf,
    /// MOBI, AZW and AZW3 share the PalmDB container.
    Mobi,
}

impl Format {
    /// Resolve a format from a file name's extension.
    ///
    /// The extension is everything after the last `.` (the whole name when
    /// there is no dot), compared case-insensitively.
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = name.rsplit('.').next().unwrap_or(name).to_lowercase();
        Self::from_extension(&ext)
    }

    /// Resolve a lower-cased extension without its leading dot.
    pub fn from_extension(ext: &str) -> Result<Self> {
        match ext {
            "txt" => Ok(Format::Text),
            "html" | "htm" => Ok(Format::Html),
            "epub" => Ok(Format::Epub),
            "pdf" => Ok(Format::Pdf),
            "docx" => Ok(Format::Docx),
            "fb2" => Ok(Format::Fb2),
            "rtf" => Ok(Format::Rtf),
            "mobi" | "azw" | "azw3" => Ok(Format::Mobi),
            "kfx" => Err(Error::KfxBlocked),
            other => Err(Error::UnsupportedFormat(other.to_string())),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Format::Text => "plain text",
            Format::Html => "HTML",
            Format::Epub => "EPUB",
            Format::Pdf => "PDF",
            Format::Docx => "DOCX",
            Format::Fb2 => "FictionBook",
            Format::Rtf => "RTF",
            Format::Mobi => "MOBI/AZW",
        }
    }

    fn extract(self, bytes: &[u8]) -> Result<String> {
        match self {
            Format::Text => Ok(plain::extract(bytes)),
            Format::Html => Ok(html::extract(bytes)),
            Format::Epub => epub::extract(bytes),
            Format::Pdf => pdf::extract(bytes),
            Format::Docx => docx::extract(bytes),
            Format::Fb2 => xml::extract(bytes),
            Format::Rtf => Ok(rtf::extract(bytes)),
            Format::Mobi => mobi::parse_binary_ebook(bytes),
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A named document as the user supplied it.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            bytes: bytes.into(),
        }
    }

    /// Read a document from disk, named after the file name component.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.to_string_lossy().into_owned());
        Ok(Self { name, bytes })
    }

    pub fn format(&self) -> Result<Format> {
        Format::from_file_name(&self.name)
    }
}

/// Extract the plain text of a document.
///
/// The format is resolved before any bytes are inspected, so `.kfx` and
/// unknown extensions fail regardless of content.
pub fn extract_text(doc: &SourceDocument) -> Result<String> {
    let format = doc.format()?;
    debug!(name = %doc.name, %format, bytes = doc.bytes.len(), "extracting text");
    let text = format.extract(&doc.bytes)?;
    debug!(chars = text.len(), "extraction finished");
    Ok(text)
}

/// Extract and tokenize a document, failing when no words survive.
pub fn extract_words(doc: &SourceDocument) -> Result<WordSequence> {
    let words = WordSequence::from_text(&extract_text(doc)?);
    if words.is_empty() {
        return Err(Error::EmptyResult);
    }
    Ok(words)
}
