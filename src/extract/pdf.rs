//! PDF documents, via the `pdf-extract` text engine.

use std::panic::{self, AssertUnwindSafe};

use tracing::debug;

use crate::error::{Error, Result};

pub fn extract(bytes: &[u8]) -> Result<String> {
    // pdf-extract panics on some malformed inputs
    let text = panic::catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem(bytes)
    }))
    .map_err(|_| Error::format("PDF text engine failed on this file"))?
    .map_err(|e| Error::format(format!("PDF extraction error: {e}")))?;

    Ok(join_pages(&text))
}

/// Flatten each form-feed separated page to one line.
fn join_pages(text: &str) -> String {
    let pages: Vec<String> = text
        .split('\x0C')
        .map(|page| page.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();
    debug!(pages = pages.len(), "PDF pages extracted");
    pages.join("\n")
}
