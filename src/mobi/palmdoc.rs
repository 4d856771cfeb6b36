/// PalmDOC LZ77 decompression
///
/// The compression scheme is simple:
/// - Byte 0x00: Literal zero
/// - Bytes 0x01-0x08: Copy next 'n' bytes literally
/// - Bytes 0x09-0x7F: Literal character
/// - Bytes 0x80-0xBF: Back-reference (LZ77)
///   - Combined with next byte: distance = 11 bits, length = (low 3 bits) + 3
/// - Bytes 0xC0-0xFF: Space + (byte ^ 0x80)
///
/// Decoding is best-effort: truncated input and references that point before
/// the start of the output never fail. Missing reference bytes decode as
/// spaces. The result is raw bytes; choosing a text codec is up to the caller.
pub fn decompress(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len() * 2);
    let mut i = 0;

    while i < input.len() {
        let c = input[i];
        i += 1;

        match c {
            0x00 | 0x09..=0x7F => output.push(c),
            0x01..=0x08 => {
                let end = (i + c as usize).min(input.len());
                output.extend_from_slice(&input[i..end]);
                i = end;
            }
            0x80..=0xBF => {
                let next = input.get(i).copied().unwrap_or(0);
                i += 1;

                let distance = (((c & 0x3F) as usize) << 5) | (next >> 3) as usize;
                let length = (next & 0x07) as usize + 3;
                copy_back_reference(&mut output, distance, length);
            }
            0xC0..=0xFF => {
                output.push(b' ');
                output.push(c ^ 0x80);
            }
        }
    }

    output
}

/// Append `length` bytes read `distance` bytes back from the end of `output`.
///
/// The read position wraps modulo `distance`, so a reference shorter than its
/// length repeats its window. Positions outside the output become spaces.
fn copy_back_reference(output: &mut Vec<u8>, distance: usize, length: usize) {
    let start = output.len();
    if distance == 0 {
        output.resize(start + length, b' ');
        return;
    }

    for j in 0..length {
        let byte = (start + j % distance)
            .checked_sub(distance)
            .and_then(|pos| output.get(pos).copied())
            .unwrap_or(b' ');
        output.push(byte);
    }
}

/// PalmDOC LZ77 compression.
///
/// Back-references never overlap the bytes they encode, so any decoder for
/// the scheme above reproduces the input exactly.
pub fn compress(input: &[u8]) -> Vec<u8> {
    let mut output = Vec::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if i > 10
            && input.len() - i > 10
            && let Some((distance, len)) = longest_match(input, i)
        {
            let compound = (distance << 3) | (len - 3);
            output.push(0x80 | (compound >> 8) as u8);
            output.push((compound & 0xFF) as u8);
            i += len;
            continue;
        }

        let c = input[i];

        // Space followed by a printable character packs into one byte
        if c == b' '
            && let Some(&next) = input.get(i + 1)
            && (0x40..=0x7F).contains(&next)
        {
            output.push(next ^ 0x80);
            i += 2;
            continue;
        }

        if is_plain_literal(c) {
            output.push(c);
            i += 1;
            continue;
        }

        // Bytes 0x01-0x08 and 0x80+ need an explicit literal run
        let run_start = i;
        while i < input.len() && i - run_start < 8 && !is_plain_literal(input[i]) {
            i += 1;
        }
        output.push((i - run_start) as u8);
        output.extend_from_slice(&input[run_start..i]);
    }

    output
}

fn is_plain_literal(c: u8) -> bool {
    c == 0 || (0x09..0x80).contains(&c)
}

/// Find the longest earlier occurrence (3..=10 bytes, within 2047 bytes).
fn longest_match(data: &[u8], pos: usize) -> Option<(usize, usize)> {
    (3..=10usize).rev().find_map(|len| {
        if pos < len {
            return None;
        }
        let pattern = &data[pos..pos + len];
        (0..=pos - len)
            .rev()
            .find(|&start| &data[start..start + len] == pattern)
            .map(|start| pos - start)
            .filter(|&distance| distance <= 2047)
            .map(|distance| (distance, len))
    })
}
