//! Pure PalmDB/MOBI parsing functions (no IO).

use crate::error::{Error, Result};

use super::headers::be_u32;

/// Size of the fixed PalmDB header preceding the record table.
const PDB_HEADER_LEN: usize = 78;

/// Marker record separating the legacy section from the KF8 section.
const BOUNDARY_MARKER: &[u8; 8] = b"BOUNDARY";

/// Two-byte prefix of the 4-byte boundary form.
const BOUNDARY_MAGIC: [u8; 2] = [0xE9, 0x8E];

/// PDB (Palm Database) record table.
#[derive(Debug)]
pub struct PdbInfo {
    pub name: String,
    pub num_records: u16,
    /// Record offsets within the file, followed by a sentinel equal to the
    /// file length so every record has an end.
    pub record_offsets: Vec<u32>,
}

impl PdbInfo {
    /// Parse the PDB header and record table of a BOOKMOBI file.
    pub fn parse(data: &[u8]) -> Result<Self> {
        if data.len() < PDB_HEADER_LEN {
            return Err(Error::format("PDB header too short"));
        }

        // Bytes 0-31: Database name (null-terminated)
        let name_end = data[..32].iter().position(|&b| b == 0).unwrap_or(32);
        let name = String::from_utf8_lossy(&data[..name_end]).to_string();

        // Bytes 60-67: Type/Creator
        if &data[60..64] != b"BOOK" || &data[64..68] != b"MOBI" {
            return Err(Error::format(
                "Not a valid MOBI/AZW file (missing BOOK/MOBI signature)",
            ));
        }

        // Bytes 76-77: Number of records
        let num_records = u16::from_be_bytes([data[76], data[77]]);
        if num_records < 2 {
            return Err(Error::format("MOBI file has no content records"));
        }

        // Record info list (8 bytes per record: offset + attributes/unique id)
        let records_len = num_records as usize * 8;
        if data.len() < PDB_HEADER_LEN + records_len {
            return Err(Error::format("PDB record table truncated"));
        }

        let mut record_offsets: Vec<u32> = (0..num_records as usize)
            .map(|i| be_u32(data, PDB_HEADER_LEN + i * 8))
            .collect();
        record_offsets.push(data.len() as u32);

        Ok(Self {
            name,
            num_records,
            record_offsets,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.num_records as usize
    }

    /// Byte span of a record, clamped to the buffer.
    fn record_range(&self, index: usize, file_len: usize) -> (usize, usize) {
        let start = self
            .record_offsets
            .get(index)
            .map_or(file_len, |&o| (o as usize).min(file_len));
        let end = self
            .record_offsets
            .get(index + 1)
            .map_or(file_len, |&o| (o as usize).min(file_len));
        (start, end.max(start))
    }

    /// Slice out a record. Malformed offsets yield a short or empty slice.
    pub fn record<'a>(&self, data: &'a [u8], index: usize) -> &'a [u8] {
        let (start, end) = self.record_range(index, data.len());
        &data[start..end]
    }

    /// Find the first record of the KF8 section, if the file has one.
    ///
    /// Records `1..N-1` are scanned for a `BOUNDARY` record (or its 4-byte
    /// magic form). The record after it opens the KF8 section.
    pub fn kf8_start(&self, data: &[u8]) -> Option<usize> {
        (1..self.len().saturating_sub(1))
            .find(|&i| is_boundary_record(self.record(data, i)))
            .map(|i| i + 1)
    }
}

fn is_boundary_record(record: &[u8]) -> bool {
    record.starts_with(BOUNDARY_MARKER)
        || (record.len() == 4 && record.starts_with(&BOUNDARY_MAGIC))
}

/// Strip trailing multibyte extra data from text records.
///
/// MOBI text records can have trailing data appended. The extra_flags field
/// indicates which types are present. We need to strip this data before
/// decompression.
pub fn strip_trailing_data(record: &[u8], flags: u16) -> &[u8] {
    if flags == 0 || record.is_empty() {
        return record;
    }

    let mut end = record.len();

    // Bits 1-15 each describe one size-prefixed trailing entry
    let mut shifted_flags = flags >> 1;
    while shifted_flags != 0 {
        if shifted_flags & 1 != 0 {
            if end == 0 {
                break;
            }
            // Backward VWI: low 7 bits are value, high bit SET marks the last byte
            let mut size = 0usize;
            let mut shift = 0;
            let mut pos = end;
            while pos > 0 {
                pos -= 1;
                let byte = record[pos];
                size |= ((byte & 0x7F) as usize) << shift;
                shift += 7;
                if byte & 0x80 != 0 || shift >= 28 {
                    break;
                }
            }
            if size > 0 && size <= end {
                end -= size;
            }
        }
        shifted_flags >>= 1;
    }

    // Multibyte overlap (bit 0) is processed last
    if flags & 1 != 0 && end > 0 {
        let overlap = (record[end - 1] & 3) as usize + 1;
        if overlap <= end {
            end -= overlap;
        }
    }

    &record[..end]
}

/// Drop the fixed two-byte overlap suffix of a legacy text record.
pub fn strip_overlap_suffix(record: &[u8]) -> &[u8] {
    &record[..record.len().saturating_sub(2)]
}
