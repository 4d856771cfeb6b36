//! Text reassembly for MOBI/AZW/AZW3 files.

use std::sync::LazyLock;

use regex::Regex;
use tracing::{debug, warn};

use crate::dom::html_to_text;
use crate::error::{Error, Result};
use crate::util::decode_entities;

use super::headers::{Compression, MobiHeader};
use super::palmdoc;
use super::parser::{PdbInfo, strip_overlap_suffix, strip_trailing_data};

/// Tag-like runs in legacy MOBI text. Bounded so stray `<` cannot swallow
/// whole chapters.
static LEGACY_TAG: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]{0,200}>").unwrap());

/// Extract the readable text of a PalmDB-based ebook.
///
/// When the file carries a KF8 section (AZW3, or a combined MOBI) only that
/// section is read, as HTML. Otherwise the legacy text records are joined
/// and stripped of markup.
pub fn parse_binary_ebook(data: &[u8]) -> Result<String> {
    let pdb = PdbInfo::parse(data)?;
    let header = MobiHeader::parse(pdb.record(data, 0))?;

    debug!(
        name = %pdb.name,
        records = pdb.len(),
        text_records = header.text_record_count,
        compression = ?header.compression,
        encoding = ?header.encoding,
        "MOBI headers parsed"
    );
    if let Some(exth_length) = header.exth_length {
        debug!(exth_length, "EXTH block present");
    }

    match pdb.kf8_start(data) {
        Some(kf8) => {
            debug!(boundary = kf8 - 1, kf8_record0 = kf8, "KF8 section found");
            read_kf8(data, &pdb, kf8)
        }
        None => read_legacy(data, &pdb, &header),
    }
}

fn read_kf8(data: &[u8], pdb: &PdbInfo, kf8: usize) -> Result<String> {
    let header = MobiHeader::parse(pdb.record(data, kf8))?;
    check_compression(header.compression)?;

    let mut html = Vec::new();
    for i in 1..=header.text_record_count as usize {
        let index = kf8 + i;
        if index >= pdb.len() {
            warn!(index, "KF8 text record count runs past the record table");
            break;
        }
        let record = strip_trailing_data(pdb.record(data, index), header.extra_data_flags);
        append_record(&mut html, record, header.compression);
    }

    let html = String::from_utf8_lossy(&html);
    Ok(html_to_text(&decode_entities(&html)))
}

fn read_legacy(data: &[u8], pdb: &PdbInfo, header: &MobiHeader) -> Result<String> {
    check_compression(header.compression)?;

    let mut raw = Vec::new();
    for index in 1..=header.text_record_count as usize {
        if index >= pdb.len() {
            warn!(index, "text record count runs past the record table");
            break;
        }
        let record = strip_overlap_suffix(pdb.record(data, index));
        append_record(&mut raw, record, header.compression);
    }

    let text = header.encoding.decode(&raw);
    Ok(decode_entities(&LEGACY_TAG.replace_all(&text, " ")))
}

fn check_compression(compression: Compression) -> Result<()> {
    match compression {
        Compression::None | Compression::PalmDoc => Ok(()),
        Compression::Huffman => Err(Error::UnsupportedCompression(
            "HUFF/CDIC compressed MOBI is not supported. Try converting to EPUB first.".into(),
        )),
        Compression::Unknown(n) => Err(Error::UnsupportedCompression(format!(
            "unknown MOBI compression type {n}. Try converting to EPUB first."
        ))),
    }
}

fn append_record(out: &mut Vec<u8>, record: &[u8], compression: Compression) {
    match compression {
        Compression::PalmDoc => out.extend_from_slice(&palmdoc::decompress(record)),
        _ => out.extend_from_slice(record),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_zero(compression: u16, text_records: u16, encoding: u32) -> Vec<u8> {
        let mut rec = vec![0u8; 16 + 0xE8];
        rec[0..2].copy_from_slice(&compression.to_be_bytes());
        rec[8..10].copy_from_slice(&text_records.to_be_bytes());
        rec[16..20].copy_from_slice(b"MOBI");
        rec[20..24].copy_from_slice(&0xE8u32.to_be_bytes());
        rec[28..32].copy_from_slice(&encoding.to_be_bytes());
        rec
    }

    fn pdb(records: &[Vec<u8>]) -> Vec<u8> {
        let mut data = vec![0u8; 78];
        data[60..68].copy_from_slice(b"BOOKMOBI");
        data[76..78].copy_from_slice(&(records.len() as u16).to_be_bytes());
        let mut offset = (78 + records.len() * 8) as u32;
        for record in records {
            data.extend_from_slice(&offset.to_be_bytes());
            data.extend_from_slice(&[0; 4]);
            offset += record.len() as u32;
        }
        for record in records {
            data.extend_from_slice(record);
        }
        data
    }

    /// A text record with the two-byte legacy suffix.
    fn legacy(text: &[u8]) -> Vec<u8> {
        let mut rec = text.to_vec();
        rec.extend_from_slice(&[0, 0]);
        rec
    }

    #[test]
    fn test_legacy_uncompressed() {
        let data = pdb(&[
            record_zero(1, 2, 1252),
            legacy(b"<p>Hello &amp; "),
            legacy(b"goodbye</p>"),
        ]);
        assert_eq!(parse_binary_ebook(&data).unwrap(), " Hello & goodbye ");
    }

    #[test]
    fn test_legacy_palmdoc() {
        let text = b"It was the best of times, it was the worst of times.";
        let data = pdb(&[record_zero(2, 1, 1252), legacy(&palmdoc::compress(text))]);
        assert_eq!(
            parse_binary_ebook(&data).unwrap(),
            String::from_utf8_lossy(text)
        );
    }

    #[test]
    fn test_legacy_cp1252_and_utf8() {
        let cp1252 = pdb(&[record_zero(1, 1, 1252), legacy(b"caf\xE9")]);
        assert_eq!(parse_binary_ebook(&cp1252).unwrap(), "café");

        let utf8 = pdb(&[record_zero(1, 1, 65001), legacy("café".as_bytes())]);
        assert_eq!(parse_binary_ebook(&utf8).unwrap(), "café");
    }

    #[test]
    fn test_text_count_clamped_to_records() {
        let data = pdb(&[record_zero(1, 9, 1252), legacy(b"only one")]);
        assert_eq!(parse_binary_ebook(&data).unwrap(), "only one");
    }

    #[test]
    fn test_huffman_rejected() {
        let data = pdb(&[record_zero(0x4448, 1, 1252), legacy(b"x")]);
        let err = parse_binary_ebook(&data).unwrap_err();
        assert!(matches!(err, Error::UnsupportedCompression(_)));
        assert!(err.to_string().contains("EPUB"));
    }

    #[test]
    fn test_legacy_tag_strip_is_bounded() {
        let long = "y".repeat(250);
        let text = format!("a <b>bold</b> x <{long}> end");
        let data = pdb(&[record_zero(1, 1, 1252), legacy(text.as_bytes())]);
        assert_eq!(
            parse_binary_ebook(&data).unwrap(),
            format!("a  bold  x <{long}> end")
        );
    }

    #[test]
    fn test_kf8_uncompressed_is_utf8() {
        let html = "<html><body><p>Caf\u{e9} &amp; cr\u{e8}me</p></body></html>";
        let data = pdb(&[
            record_zero(1, 1, 1252),
            legacy(b"legacy text"),
            b"BOUNDARY".to_vec(),
            record_zero(1, 1, 1252),
            html.as_bytes().to_vec(),
        ]);
        assert_eq!(parse_binary_ebook(&data).unwrap(), "Caf\u{e9} & cr\u{e8}me");
    }

    #[test]
    fn test_kf8_section_preferred() {
        let html = b"<html><head><title>t</title></head><body><p>Modern &amp; new</p></body></html>";
        let data = pdb(&[
            record_zero(1, 1, 1252),
            legacy(b"legacy text"),
            b"BOUNDARY".to_vec(),
            record_zero(2, 1, 65001),
            palmdoc::compress(html),
        ]);
        assert_eq!(parse_binary_ebook(&data).unwrap(), "Modern & new");
    }
}
