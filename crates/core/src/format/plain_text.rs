//! Plain text: one segment per line.

use crate::segmenter::{Segment, Terminator};

use super::error::FormatError;
use super::traits::{DocumentFormat, Extraction};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// UTF-8 plain text. Each line is a segment; a byte order mark is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextFormat;

impl PlainTextFormat {
    pub fn new() -> Self {
        Self
    }

    fn decode(document: &[u8]) -> Result<(&[u8], &str), FormatError> {
        let (bom, body) = match document.strip_prefix(UTF8_BOM) {
            Some(body) => (UTF8_BOM, body),
            None => (&[][..], document),
        };
        let text = std::str::from_utf8(body)
            .map_err(|e| FormatError::BadFile(format!("not valid UTF-8: {}", e)))?;
        Ok((bom, text))
    }
}

/// Split text into lines, keeping track of each line's terminator.
fn split_lines(text: &str) -> Vec<Segment> {
    text.split_inclusive('\n')
        .enumerate()
        .map(|(index, line)| {
            let (content, terminator) = if let Some(content) = line.strip_suffix("\r\n") {
                (content, Terminator::CrLf)
            } else if let Some(content) = line.strip_suffix('\n') {
                (content, Terminator::Lf)
            } else {
                (line, Terminator::None)
            };
            Segment::new(index, content.trim_end(), terminator)
        })
        .collect()
}

impl DocumentFormat for PlainTextFormat {
    fn name(&self) -> &str {
        "plain_text"
    }

    fn extract(&self, document: &[u8]) -> Result<Extraction, FormatError> {
        let (_, text) = Self::decode(document)?;
        Ok(Extraction::new(split_lines(text)))
    }

    fn reassemble(&self, document: &[u8], lines: &[String]) -> Result<Vec<u8>, FormatError> {
        let (bom, text) = Self::decode(document)?;
        let expected = text.split_inclusive('\n').count();
        if lines.len() != expected {
            return Err(FormatError::Reassembly(format!(
                "expected {} lines, got {}",
                expected,
                lines.len()
            )));
        }

        let mut output = Vec::with_capacity(bom.len() + lines.iter().map(String::len).sum::<usize>());
        output.extend_from_slice(bom);
        for line in lines {
            output.extend_from_slice(line.as_bytes());
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(extraction: &Extraction) -> Vec<&str> {
        extraction.segments.iter().map(|s| s.text.as_str()).collect()
    }

    #[test]
    fn test_extract_lines_and_terminators() {
        let extraction = PlainTextFormat.extract(b"one\r\ntwo  \nthree").unwrap();
        assert_eq!(texts(&extraction), vec!["one", "two", "three"]);

        let terminators: Vec<Terminator> =
            extraction.segments.iter().map(|s| s.terminator).collect();
        assert_eq!(
            terminators,
            vec![Terminator::CrLf, Terminator::Lf, Terminator::None]
        );
        assert!(extraction.temp_artifacts.is_empty());
    }

    #[test]
    fn test_trailing_newline_has_no_empty_segment() {
        let extraction = PlainTextFormat.extract(b"a\n\nb\n").unwrap();
        assert_eq!(texts(&extraction), vec!["a", "", "b"]);
    }

    #[test]
    fn test_empty_document_has_no_segments() {
        let extraction = PlainTextFormat.extract(b"").unwrap();
        assert!(extraction.segments.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_bad_file() {
        let err = PlainTextFormat.extract(&[0x66, 0xff, 0xfe, 0x0a]).unwrap_err();
        assert_eq!(err.kind(), "bad_file");
    }

    #[test]
    fn test_reassemble_restores_bom_and_terminators() {
        let document = b"\xEF\xBB\xBFhello\r\nworld";
        let extraction = PlainTextFormat.extract(document).unwrap();
        assert_eq!(texts(&extraction), vec!["hello", "world"]);

        let lines: Vec<String> = extraction
            .segments
            .iter()
            .map(|s| format!("{}!{}", s.text, s.terminator.as_str()))
            .collect();
        let output = PlainTextFormat.reassemble(document, &lines).unwrap();
        assert_eq!(output, b"\xEF\xBB\xBFhello!\r\nworld!".to_vec());
    }

    #[test]
    fn test_reassemble_line_count_mismatch() {
        let err = PlainTextFormat
            .reassemble(b"a\nb\n", &["x\n".to_string()])
            .unwrap_err();
        assert!(matches!(err, FormatError::Reassembly(_)));
    }
}
