//! Standalone HTML documents.

use crate::dom::html_to_text;
use crate::util::decode_text;

pub fn extract(bytes: &[u8]) -> String {
    html_to_text(&decode_text(bytes, None))
}
