// src/process/detect.rs
use encoding_rs::Encoding;
use tracing::debug;

use super::delimiter::{detect_delimiter, display_delimiter};
use super::encoding::{decode, decode_with};

/// Decoded text plus the format it was read with.
#[derive(Debug, Clone)]
pub struct DetectedText {
    pub text: String,
    pub encoding: &'static Encoding,
    pub delimiter: u8,
}

/// Turns raw file bytes into text and a field separator.
///
/// Detection is heuristic, so the merge pipeline only ever sees this trait;
/// tests plug in [`FixedFormat`] to pin the format.
pub trait FormatDetector {
    fn detect(&self, bytes: &[u8]) -> DetectedText;
}

/// Charset detection followed by header-line delimiter detection.
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoDetect;

impl FormatDetector for AutoDetect {
    fn detect(&self, bytes: &[u8]) -> DetectedText {
        let decoded = decode(bytes);
        let delimiter = detect_delimiter(&decoded.text);
        debug!(
            encoding = decoded.encoding.name(),
            delimiter = %display_delimiter(delimiter),
            "detected format"
        );
        DetectedText {
            text: decoded.text,
            encoding: decoded.encoding,
            delimiter,
        }
    }
}

/// A known encoding and delimiter, no guessing.
#[derive(Debug, Clone, Copy)]
pub struct FixedFormat {
    pub encoding: &'static Encoding,
    pub delimiter: u8,
}

impl FixedFormat {
    pub fn utf8(delimiter: u8) -> Self {
        Self {
            encoding: encoding_rs::UTF_8,
            delimiter,
        }
    }
}

impl FormatDetector for FixedFormat {
    fn detect(&self, bytes: &[u8]) -> DetectedText {
        let decoded = decode_with(bytes, self.encoding);
        DetectedText {
            text: decoded.text,
            encoding: self.encoding,
            delimiter: self.delimiter,
        }
    }
}
