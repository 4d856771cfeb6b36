//! MOBI/AZW/AZW3 (PalmDB) text extraction.

mod headers;
pub mod palmdoc;
mod parser;
mod reader;

pub use headers::{Compression, Encoding, MobiHeader};
pub use parser::PdbInfo;
pub use reader::parse_binary_ebook;
