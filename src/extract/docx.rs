//! Office Open XML word-processing documents.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;

use crate::error::{Error, Result};
use crate::util::{decode_xml, local_name, resolve_entity};

use super::archive::Archive;

const DOCUMENT_PART: &str = "word/document.xml";

/// One line per `<w:p>`, built from the `<w:t>` runs inside it.
pub fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = Archive::open(bytes, "DOCX")?;
    let xml = archive
        .read(DOCUMENT_PART)?
        .ok_or_else(|| Error::format("no word/document.xml found; is this a valid .docx?"))?;

    let paragraphs = paragraphs(&decode_xml(&xml))?;
    debug!(paragraphs = paragraphs.len(), "DOCX body read");
    Ok(paragraphs.join("\n"))
}

/// Paragraph texts in document order.
///
/// Paragraphs can nest (text boxes inside a run); a nested paragraph's text
/// also counts toward every enclosing one.
fn paragraphs(xml: &str) -> Result<Vec<String>> {
    let mut reader = Reader::from_str(xml);

    let mut paragraphs: Vec<String> = Vec::new();
    // Indices into `paragraphs` of the currently open <p> elements
    let mut open: Vec<usize> = Vec::new();
    let mut text_depth = 0usize;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    open.push(paragraphs.len());
                    paragraphs.push(String::new());
                }
                b"t" => text_depth += 1,
                _ => {}
            },
            Ok(Event::Empty(e)) => {
                if local_name(e.name().as_ref()) == b"p" {
                    paragraphs.push(String::new());
                }
            }
            Ok(Event::End(e)) => match local_name(e.name().as_ref()) {
                b"p" => {
                    open.pop();
                }
                b"t" => text_depth = text_depth.saturating_sub(1),
                _ => {}
            },
            Ok(Event::Text(e)) if text_depth > 0 => {
                push_text(&mut paragraphs, &open, &String::from_utf8_lossy(e.as_ref()));
            }
            Ok(Event::GeneralRef(e)) if text_depth > 0 => {
                if let Some(c) = resolve_entity(&String::from_utf8_lossy(e.as_ref())) {
                    push_text(&mut paragraphs, &open, c.encode_utf8(&mut [0; 4]));
                }
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(Error::format(format!("malformed {DOCUMENT_PART}: {e}"))),
            _ => {}
        }
    }

    Ok(paragraphs)
}

fn push_text(paragraphs: &mut [String], open: &[usize], text: &str) {
    for &index in open {
        paragraphs[index].push_str(text);
    }
}
