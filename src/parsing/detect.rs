use std::borrow::Cow;

use crate::core::types::{Delimiter, Detection, TextEncoding};
use crate::parsing::ParseError;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Determine the encoding and delimiter of raw upload bytes
///
/// # Errors
///
/// Returns `ParseError::UnsupportedEncoding` if no candidate encoding decodes
/// the full byte stream.
pub fn detect(bytes: &[u8]) -> Result<Detection, ParseError> {
    decode(bytes).map(|(detection, _)| detection)
}

/// Decode raw upload bytes to text, returning what was detected alongside it.
///
/// The byte-order mark, if any, is not part of the returned text.
///
/// # Errors
///
/// Returns `ParseError::UnsupportedEncoding` if no candidate encoding decodes
/// the full byte stream.
pub fn decode(bytes: &[u8]) -> Result<(Detection, String), ParseError> {
    let (encoding, text) = decode_text(bytes)?;
    let delimiter = detect_delimiter(&text);

    tracing::debug!("Detected encoding {encoding}, {delimiter} delimiter");

    Ok((
        Detection {
            encoding,
            delimiter,
        },
        text,
    ))
}

/// Try each candidate encoding in order; the first clean decode wins
fn decode_text(bytes: &[u8]) -> Result<(TextEncoding, String), ParseError> {
    TextEncoding::CANDIDATES
        .into_iter()
        .find_map(|encoding| try_decode(bytes, encoding).map(|text| (encoding, text)))
        .ok_or_else(|| ParseError::UnsupportedEncoding {
            attempted: TextEncoding::CANDIDATES
                .iter()
                .map(TextEncoding::display_name)
                .collect(),
        })
}

fn try_decode(bytes: &[u8], encoding: TextEncoding) -> Option<String> {
    match encoding {
        TextEncoding::Utf8Bom => bytes
            .strip_prefix(UTF8_BOM)
            .and_then(|rest| std::str::from_utf8(rest).ok())
            .map(str::to_owned),
        TextEncoding::Utf8 => std::str::from_utf8(bytes).ok().map(str::to_owned),
        TextEncoding::ShiftJis => encoding_rs::SHIFT_JIS
            .decode_without_bom_handling_and_without_replacement(bytes)
            .map(Cow::into_owned),
    }
}

/// Pick the delimiter that splits the first non-blank line into more fields.
///
/// Ties go to comma.
#[must_use]
pub fn detect_delimiter(text: &str) -> Delimiter {
    let first_line = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best = Delimiter::CANDIDATES[0];
    let mut best_count = field_count(first_line, best);
    for &candidate in &Delimiter::CANDIDATES[1..] {
        let count = field_count(first_line, candidate);
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Number of fields in a single line, honoring quotes
fn field_count(line: &str, delimiter: Delimiter) -> usize {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter.as_byte())
        .from_reader(line.as_bytes());

    reader
        .records()
        .next()
        .and_then(Result::ok)
        .map_or(0, |record| record.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_utf8_comma() {
        let (d, text) = decode(b"Species,s1.fastq\nTuna,3\n").unwrap();
        assert_eq!(d.encoding, TextEncoding::Utf8);
        assert_eq!(d.delimiter, Delimiter::Comma);
        assert!(text.starts_with("Species"));
    }

    #[test]
    fn test_bom_is_stripped() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("種名,s1\nマグロ,3\n".as_bytes());

        let (d, text) = decode(&bytes).unwrap();
        assert_eq!(d.encoding, TextEncoding::Utf8Bom);
        assert!(text.starts_with("種名"));
    }

    #[test]
    fn test_shift_jis() {
        let (encoded, _, had_errors) = encoding_rs::SHIFT_JIS.encode("種名,s1\nマグロ,3\n");
        assert!(!had_errors);
        assert!(std::str::from_utf8(&encoded).is_err());

        let (d, text) = decode(&encoded).unwrap();
        assert_eq!(d.encoding, TextEncoding::ShiftJis);
        assert_eq!(text, "種名,s1\nマグロ,3\n");
    }

    #[test]
    fn test_unsupported_encoding() {
        let err = detect(b"Species,s1\n\xff\xfd,1\n").unwrap_err();
        match err {
            ParseError::UnsupportedEncoding { attempted } => {
                assert_eq!(attempted, vec!["UTF-8 (BOM)", "UTF-8", "Shift-JIS"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_tab_delimiter() {
        assert_eq!(
            detect_delimiter("Species\ts1.fastq\ts2.fastq\nTuna\t1\t2\n"),
            Delimiter::Tab
        );
    }

    #[test]
    fn test_delimiter_tie_prefers_comma() {
        assert_eq!(detect_delimiter("Species\n"), Delimiter::Comma);
        assert_eq!(detect_delimiter(""), Delimiter::Comma);
    }

    #[test]
    fn test_quoted_commas_do_not_count() {
        // Three tab fields; the comma only appears inside quotes
        let line = "\"Thunnus, sp.\"\ts1\ts2\n";
        assert_eq!(detect_delimiter(line), Delimiter::Tab);
    }

    #[test]
    fn test_leading_blank_lines_skipped() {
        assert_eq!(detect_delimiter("\n\nA\tB\tC\n"), Delimiter::Tab);
    }
}
