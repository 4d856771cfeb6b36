//! Rich Text Format, reduced to its visible characters by regex passes.
//!
//! Only innermost `{\name ...}` groups are dropped as destinations; Unicode
//! escapes and tables are not interpreted.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::util::decode_text;

// Any group that opens with a backslash and holds no nested group. A flat
// document such as `{\rtf1 text}` is itself one and comes out empty.
static GROUPED_CONTROL: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{\\[^{}]+\}").unwrap());
static HEX_ESCAPE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\\'([0-9a-f]{2})").unwrap());
static CONTROL_WORD: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\\[a-z]+(-?\d+)? ?").unwrap());
static BRACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[{}]").unwrap());
static ESCAPED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\\([^a-z])").unwrap());

pub fn extract(bytes: &[u8]) -> String {
    let raw = decode_text(bytes, None);

    let text = GROUPED_CONTROL.replace_all(&raw, "");
    let text = HEX_ESCAPE.replace_all(&text, |caps: &Captures| {
        u8::from_str_radix(&caps[1], 16)
            .map(|b| {
                let byte = [b];
                let (c, _, _) = encoding_rs::WINDOWS_1252.decode(&byte);
                c.into_owned()
            })
            .unwrap_or_default()
    });
    let text = CONTROL_WORD.replace_all(&text, "");
    let text = BRACE.replace_all(&text, "");
    let text = ESCAPED.replace_all(&text, "$1");

    text.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_document() {
        let rtf = br"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard This is \b bold\b0 text.\par}";
        // A control word swallows one following space
        assert_eq!(extract(rtf), "This is boldtext.");

        let rtf = br"{\rtf1\ansi{\fonttbl\f0\fswiss Helvetica;}\f0\pard This is \b bold\b0  text.\par}";
        assert_eq!(extract(rtf), "This is bold text.");
    }

    #[test]
    fn test_flat_document_is_dropped() {
        assert_eq!(extract(br"{\rtf1 text}"), "");
    }

    #[test]
    fn test_escaped_punctuation() {
        let rtf = br"{\rtf1{\fonttbl\f0 Times;} Hello\~world\-wide}";
        assert_eq!(extract(rtf), "Hello~world-wide");
    }

    #[test]
    fn test_hex_escape_decodes_cp1252() {
        let rtf = br"{\rtf1{\fonttbl\f0 Times;}\f0 caf\'e9 \'93quoted\'94}";
        assert_eq!(extract(rtf), "caf\u{e9} \u{201c}quoted\u{201d}");
    }

    #[test]
    fn test_negative_parameter() {
        let rtf = br"{\rtf1{\fonttbl\f0 Times;}\li-360 indented\par}";
        assert_eq!(extract(rtf), "indented");
    }
}
