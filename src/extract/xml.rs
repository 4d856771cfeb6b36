//! FictionBook (FB2) documents.

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::warn;

use crate::error::{Error, Result};
use crate::util::{decode_xml, local_name, resolve_entity};

/// Elements whose content is never shown.
const HIDDEN: &[&[u8]] = &[b"script", b"style", b"head", b"binary"];

/// Elements that end a line of text.
const LINE_ENDS: &[&[u8]] = &[
    b"p", b"v", b"title", b"subtitle", b"section", b"stanza", b"epigraph", b"text-author",
    b"empty-line", b"cite",
];

/// Extract the text of an FB2 document.
///
/// Only `<body>` content is read when the document has one, which leaves
/// out the `<description>` metadata and embedded `<binary>` images.
pub fn extract(bytes: &[u8]) -> Result<String> {
    let content = decode_xml(bytes);
    let mut reader = Reader::from_str(&content);

    let mut all = TextBuf::default();
    let mut body = TextBuf::default();
    let mut saw_body = false;
    let mut body_depth = 0usize;
    let mut hidden_depth = 0usize;

    loop {
        let event = reader.read_event().map_err(|e| {
            warn!(error = %e, position = reader.buffer_position(), "FB2 parse failed");
            Error::format(format!("malformed XML: {e}"))
        })?;

        match event {
            Event::Start(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if hidden_depth > 0 || HIDDEN.contains(&local) {
                    hidden_depth += 1;
                } else if local == b"body" {
                    saw_body = true;
                    body_depth += 1;
                }
            }
            Event::End(e) => {
                let name = e.name();
                let local = local_name(name.as_ref());
                if hidden_depth > 0 {
                    hidden_depth -= 1;
                    continue;
                }
                if local == b"body" {
                    body_depth = body_depth.saturating_sub(1);
                }
                if LINE_ENDS.contains(&local) {
                    all.end_line();
                    if body_depth > 0 {
                        body.end_line();
                    }
                }
            }
            Event::Empty(e) => {
                if hidden_depth == 0 && local_name(e.name().as_ref()) == b"empty-line" {
                    all.end_line();
                    if body_depth > 0 {
                        body.end_line();
                    }
                }
            }
            Event::Text(e) if hidden_depth == 0 => {
                let text = String::from_utf8_lossy(e.as_ref());
                all.push(&text);
                if body_depth > 0 {
                    body.push(&text);
                }
            }
            Event::CData(e) if hidden_depth == 0 => {
                let text = String::from_utf8_lossy(e.as_ref());
                all.push(&text);
                if body_depth > 0 {
                    body.push(&text);
                }
            }
            Event::GeneralRef(e) if hidden_depth == 0 => {
                let entity = String::from_utf8_lossy(e.as_ref());
                if let Some(c) = resolve_entity(&entity) {
                    let mut utf8 = [0u8; 4];
                    let text = c.encode_utf8(&mut utf8);
                    all.push(text);
                    if body_depth > 0 {
                        body.push(text);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(if saw_body { body.finish() } else { all.finish() })
}

#[derive(Default)]
struct TextBuf {
    out: String,
}

impl TextBuf {
    fn push(&mut self, text: &str) {
        self.out.push_str(text);
    }

    fn end_line(&mut self) {
        if !self.out.is_empty() && !self.out.ends_with('\n') {
            self.out.push('\n');
        }
    }

    fn finish(self) -> String {
        self.out.trim().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BOOK: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<FictionBook xmlns="http://www.gribuse.com/fb2">
  <description><title-info><book-title>Meta Title</book-title></title-info></description>
  <body>
    <title><p>Chapter One</p></title>
    <section><p>It was a <emphasis>dark</emphasis> night.</p><empty-line/><p>Rain &amp; wind.</p></section>
  </body>
  <binary id="cover.jpg" content-type="image/jpeg">QUJDRA==</binary>
</FictionBook>"#;

    #[test]
    fn test_body_only() {
        let text = extract(BOOK.as_bytes()).unwrap();
        assert!(text.starts_with("Chapter One"));
        assert!(text.contains("It was a dark night.\n"));
        assert!(text.contains("Rain & wind."));
        assert!(!text.contains("Meta Title"));
        assert!(!text.contains("QUJDRA"));
    }

    #[test]
    fn test_no_body_reads_everything() {
        let xml = b"<root><a>one</a> <b>two</b></root>";
        assert_eq!(extract(xml).unwrap(), "one two");
    }

    #[test]
    fn test_numeric_reference() {
        let xml = b"<FictionBook><body><p>caf&#233;</p></body></FictionBook>";
        assert_eq!(extract(xml).unwrap(), "caf\u{e9}");
    }

    #[test]
    fn test_garbage_is_format_error() {
        assert!(matches!(extract(b"</oops"), Err(Error::Format(_))));
    }

    #[test]
    fn test_truncated_document_is_format_error() {
        let xml = b"<FictionBook><body><p>started</p></oops></body></FictionBook>";
        assert!(matches!(extract(xml), Err(Error::Format(_))));
    }
}
