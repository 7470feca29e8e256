// src/process/encoding.rs
use chardetng::EncodingDetector;
use encoding_rs::{Encoding, UTF_8};
use tracing::{debug, warn};

/// Text decoded from a price list file, plus the encoding it was read as.
#[derive(Debug, Clone)]
pub struct DecodedText {
    pub text: String,
    pub encoding: &'static Encoding,
}

/// Guess the encoding of `bytes`.
///
/// A byte-order mark wins outright. Valid UTF-8 is taken as UTF-8. Anything
/// else goes through charset detection, which for spreadsheet exports usually
/// lands on a legacy single-byte code page such as windows-1251.
pub fn detect_encoding(bytes: &[u8]) -> &'static Encoding {
    if let Some((encoding, _)) = Encoding::for_bom(bytes) {
        return encoding;
    }
    if std::str::from_utf8(bytes).is_ok() {
        return UTF_8;
    }
    let mut detector = EncodingDetector::new();
    detector.feed(bytes, true);
    detector.guess(None, true)
}

/// Decode `bytes` with the detected encoding and strip any leading BOM.
///
/// Never fails: malformed sequences become U+FFFD.
pub fn decode(bytes: &[u8]) -> DecodedText {
    let encoding = detect_encoding(bytes);
    decode_with(bytes, encoding)
}

/// Decode `bytes` as `encoding`, skipping a BOM that matches it.
pub fn decode_with(bytes: &[u8], encoding: &'static Encoding) -> DecodedText {
    let body = match Encoding::for_bom(bytes) {
        Some((bom_encoding, bom_len)) if bom_encoding == encoding => &bytes[bom_len..],
        _ => bytes,
    };
    let (text, had_errors) = encoding.decode_without_bom_handling(body);
    if had_errors {
        warn!(
            encoding = encoding.name(),
            "input contained malformed sequences; replaced with U+FFFD"
        );
    }
    let text = text.trim_start_matches('\u{feff}').to_string();
    debug!(encoding = encoding.name(), chars = text.len(), "decoded");
    DecodedText { text, encoding }
}

#[cfg(test)]
mod tests {
    use super::*;
    use encoding_rs::{UTF_16LE, WINDOWS_1251};

    #[test]
    fn utf8_bom_is_stripped() {
        let mut bytes = vec![0xEF, 0xBB, 0xBF];
        bytes.extend_from_slice("Артикул;Цена".as_bytes());
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "Артикул;Цена");
    }

    #[test]
    fn utf16_bom_selects_utf16() {
        let mut bytes = vec![0xFF, 0xFE];
        for unit in "a;b".encode_utf16() {
            bytes.extend_from_slice(&unit.to_le_bytes());
        }
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, UTF_16LE);
        assert_eq!(decoded.text, "a;b");
    }

    #[test]
    fn plain_ascii_is_utf8() {
        let decoded = decode(b"vendor_code;price\nA1;15");
        assert_eq!(decoded.encoding, UTF_8);
        assert_eq!(decoded.text, "vendor_code;price\nA1;15");
    }

    #[test]
    fn cyrillic_windows_1251_is_detected() {
        let source = "Артикул;Наименование;Цена\n\
                      A1;Дрель аккумуляторная ударная;150,00\n\
                      A2;Перфоратор сетевой с набором буров;320,50\n\
                      A3;Шуруповерт компактный бесщеточный;210,00\n";
        let (bytes, _, _) = WINDOWS_1251.encode(source);
        let decoded = decode(&bytes);
        assert_eq!(decoded.encoding, WINDOWS_1251);
        assert_eq!(decoded.text, source);
    }

    #[test]
    fn arbitrary_bytes_do_not_fail() {
        let bytes: Vec<u8> = (0u8..=255).collect();
        let decoded = decode(&bytes);
        assert!(!decoded.text.is_empty());
    }
}
