use crate::error::{Error, Result};

/// Length of the PalmDOC header that opens record 0.
pub const PALMDOC_HEADER_LEN: usize = 16;

/// Offset of the EXTH flags field within the MOBI header.
const EXTH_FLAGS_OFFSET: usize = 0x70;

/// Record-0 headers (PalmDOC header + MOBI header).
///
/// The same layout opens both the legacy section of a file and the KF8
/// section that follows a boundary record.
#[derive(Debug, Clone)]
pub struct MobiHeader {
    pub compression: Compression,
    pub text_record_count: u16,
    pub encoding: Encoding,
    /// Total length of the MOBI header, starting at its signature.
    pub header_length: u32,
    pub exth_flags: u32,
    /// Flags describing trailing entries appended to each text record.
    pub extra_data_flags: u16,
    /// Length of the EXTH block, when one is present and well formed.
    pub exth_length: Option<u32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Compression {
    None,
    PalmDoc,
    Huffman,
    Unknown(u16),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Encoding {
    Cp1252,
    Utf8,
    Unknown(u32),
}

impl Encoding {
    /// Decode text bytes with this code page (Windows-1252 unless UTF-8).
    pub fn decode(self, bytes: &[u8]) -> String {
        match self {
            Encoding::Utf8 => String::from_utf8_lossy(bytes).into_owned(),
            Encoding::Cp1252 | Encoding::Unknown(_) => {
                let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                text.into_owned()
            }
        }
    }
}

impl MobiHeader {
    /// Parse the headers at the start of a record-0 slice.
    pub fn parse(record: &[u8]) -> Result<Self> {
        let mobi = PALMDOC_HEADER_LEN;
        if record.len() < mobi + 8 {
            return Err(Error::format("MOBI record 0 is too short"));
        }

        let compression = match be_u16(record, 0) {
            1 => Compression::None,
            2 => Compression::PalmDoc,
            0x4448 => Compression::Huffman, // "DH"
            n => Compression::Unknown(n),
        };
        let text_record_count = be_u16(record, 8);

        if &record[mobi..mobi + 4] != b"MOBI" {
            return Err(Error::format("Missing MOBI header"));
        }

        let header_length = be_u32(record, mobi + 4);

        let encoding = if record.len() >= mobi + 16 {
            match be_u32(record, mobi + 12) {
                1252 => Encoding::Cp1252,
                65001 => Encoding::Utf8,
                n => Encoding::Unknown(n),
            }
        } else {
            Encoding::Cp1252
        };

        let exth_flags = if record.len() >= mobi + EXTH_FLAGS_OFFSET + 4 {
            be_u32(record, mobi + EXTH_FLAGS_OFFSET)
        } else {
            0
        };

        let extra_data_flags = if record.len() >= 0xF4 && header_length >= 0xE4 {
            be_u16(record, 0xF2)
        } else {
            0
        };

        let mut header = Self {
            compression,
            text_record_count,
            encoding,
            header_length,
            exth_flags,
            extra_data_flags,
            exth_length: None,
        };

        if header.has_exth() {
            header.exth_length = exth_length(record, mobi + header_length as usize);
        }

        Ok(header)
    }

    pub fn has_exth(&self) -> bool {
        self.exth_flags & 0x40 != 0
    }
}

/// Measure the EXTH block at `offset`. Its records are not interpreted.
fn exth_length(record: &[u8], offset: usize) -> Option<u32> {
    let block = record.get(offset..offset.checked_add(8)?)?;
    if &block[..4] != b"EXTH" {
        return None;
    }
    Some(be_u32(block, 4))
}

pub(crate) fn be_u16(data: &[u8], pos: usize) -> u16 {
    u16::from_be_bytes([data[pos], data[pos + 1]])
}

pub(crate) fn be_u32(data: &[u8], pos: usize) -> u32 {
    u32::from_be_bytes([data[pos], data[pos + 1], data[pos + 2], data[pos + 3]])
}
