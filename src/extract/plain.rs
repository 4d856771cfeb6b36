//! Plain text files.

use crate::util::decode_text;

/// Decode a text file: UTF-8 (BOM aware), else Windows-1252.
pub fn extract(bytes: &[u8]) -> String {
    decode_text(bytes, None).into_owned()
}
