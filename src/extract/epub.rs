//! EPUB 2/3 books: spine-ordered XHTML documents in a zip container.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::Event;
use tracing::{debug, warn};

use crate::dom::html_to_text;
use crate::error::Result;
use crate::util::{decode_text, decode_xml, extract_xml_encoding, local_name};

use super::archive::Archive;

/// Manifest and spine of an OPF package document.
#[derive(Debug, Default)]
struct Package {
    /// Manifest id -> href, relative to the OPF.
    manifest: HashMap<String, String>,
    spine_ids: Vec<String>,
}

pub fn extract(bytes: &[u8]) -> Result<String> {
    let mut archive = Archive::open(bytes, "EPUB")?;

    let mut hrefs = spine_hrefs(&mut archive)?;
    if hrefs.is_empty() {
        hrefs = archive
            .entry_names()
            .into_iter()
            .filter(|name| is_content_document(name))
            .collect();
        debug!(documents = hrefs.len(), "no usable spine, reading every HTML entry");
    }

    let mut parts = Vec::with_capacity(hrefs.len());
    for href in &hrefs {
        match archive.read_href(href)? {
            Some(doc) => {
                let html = decode_text(&doc, extract_xml_encoding(&doc));
                parts.push(html_to_text(&html));
            }
            None => {
                warn!(%href, "spine document missing from archive");
                parts.push(String::new());
            }
        }
    }
    Ok(parts.join("\n"))
}

/// Resolve the spine to archive paths via `META-INF/container.xml`.
///
/// A missing container or OPF yields an empty list, not an error.
fn spine_hrefs(archive: &mut Archive<'_>) -> Result<Vec<String>> {
    let Some(container) = archive.read("META-INF/container.xml")? else {
        return Ok(Vec::new());
    };
    let Some(opf_path) = rootfile_path(&decode_xml(&container)) else {
        return Ok(Vec::new());
    };
    let Some(opf) = archive.read(&opf_path)? else {
        warn!(%opf_path, "package document missing");
        return Ok(Vec::new());
    };

    let base = match opf_path.rfind('/') {
        Some(i) => &opf_path[..=i],
        None => "",
    };
    let package = parse_opf(&decode_xml(&opf));
    debug!(
        %opf_path,
        manifest = package.manifest.len(),
        spine = package.spine_ids.len(),
        "package parsed"
    );

    Ok(package
        .spine_ids
        .iter()
        .filter_map(|id| package.manifest.get(id))
        .map(|href| format!("{base}{href}"))
        .collect())
}

fn is_content_document(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".html") || lower.ends_with(".xhtml") || lower.ends_with(".htm")
}

/// Find `rootfile@full-path` in container.xml.
fn rootfile_path(container: &str) -> Option<String> {
    let mut reader = Reader::from_str(container);
    reader.config_mut().trim_text(true);

    loop {
        match reader.read_event() {
            Ok(Event::Empty(e)) | Ok(Event::Start(e))
                if local_name(e.name().as_ref()) == b"rootfile" =>
            {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"full-path" {
                        return Some(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            Ok(Event::Eof) | Err(_) => return None,
            _ => {}
        }
    }
}

/// Collect manifest items and spine itemrefs. Parsing stops quietly at the
/// first XML error, keeping whatever was read.
fn parse_opf(content: &str) -> Package {
    let mut reader = Reader::from_str(content);
    reader.config_mut().trim_text(true);

    let mut package = Package::default();
    let mut in_manifest = false;
    let mut in_spine = false;

    loop {
        let (e, is_empty) = match reader.read_event() {
            Ok(Event::Start(e)) => (e, false),
            Ok(Event::Empty(e)) => (e, true),
            Ok(Event::End(e)) => {
                match local_name(e.name().as_ref()) {
                    b"manifest" => in_manifest = false,
                    b"spine" => in_spine = false,
                    _ => {}
                }
                continue;
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                warn!(error = %e, "package document is malformed");
                break;
            }
            _ => continue,
        };

        match local_name(e.name().as_ref()) {
            b"manifest" if !is_empty => in_manifest = true,
            b"spine" if !is_empty => in_spine = true,
            b"item" if in_manifest => {
                let mut id = None;
                let mut href = None;
                for attr in e.attributes().flatten() {
                    let raw = String::from_utf8_lossy(&attr.value);
                    let value = unescape(&raw).map_or_else(|_| raw.to_string(), |v| v.into_owned());
                    match attr.key.as_ref() {
                        b"id" => id = Some(value),
                        b"href" => href = Some(value),
                        _ => {}
                    }
                }
                if let (Some(id), Some(href)) = (id, href) {
                    package.manifest.insert(id, href);
                }
            }
            b"itemref" if in_spine => {
                for attr in e.attributes().flatten() {
                    if attr.key.as_ref() == b"idref" {
                        package
                            .spine_ids
                            .push(String::from_utf8_lossy(&attr.value).into_owned());
                    }
                }
            }
            _ => {}
        }
    }

    package
}
