//! In-memory zip access shared by the EPUB and DOCX extractors.

use std::io::{Cursor, Read};

use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{Error, Result};

pub(super) struct Archive<'a> {
    zip: ZipArchive<Cursor<&'a [u8]>>,
}

impl<'a> Archive<'a> {
    /// Open a zip container. Anything else is a format error.
    pub fn open(bytes: &'a [u8], kind: &str) -> Result<Self> {
        let zip = ZipArchive::new(Cursor::new(bytes))
            .map_err(|e| Error::format(format!("not a valid {kind} archive: {e}")))?;
        Ok(Self { zip })
    }

    /// Entry names in archive order.
    pub fn entry_names(&mut self) -> Vec<String> {
        (0..self.zip.len())
            .filter_map(|i| self.zip.by_index(i).ok().map(|f| f.name().to_string()))
            .collect()
    }

    /// Read an entry, or `None` when the archive has no such name.
    pub fn read(&mut self, path: &str) -> Result<Option<Vec<u8>>> {
        let mut file = match self.zip.by_name(path) {
            Ok(file) => file,
            Err(ZipError::FileNotFound) => return Ok(None),
            Err(e) => return Err(Error::format(format!("cannot read {path}: {e}"))),
        };
        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(Some(contents))
    }

    /// Read an entry by its literal name, falling back to the
    /// percent-decoded name (hrefs in malformed books are often escaped).
    pub fn read_href(&mut self, href: &str) -> Result<Option<Vec<u8>>> {
        if let Some(contents) = self.read(href)? {
            return Ok(Some(contents));
        }
        match percent_encoding::percent_decode_str(href).decode_utf8() {
            Ok(decoded) if decoded != href => self.read(&decoded),
            _ => Ok(None),
        }
    }
}
