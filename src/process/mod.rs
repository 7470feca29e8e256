// src/process/mod.rs
pub mod delimiter;
pub mod detect;
pub mod encoding;
pub mod merge;
pub mod parse;
pub mod record;
pub mod serialize;

use std::{fs, path::Path};

use tracing::info;

use crate::error::{PriceSyncError, Result};
use delimiter::display_delimiter;
use detect::FormatDetector;
use record::RecordSet;

/// Decode `bytes`, detect their delimiter and parse them, skipping blank lines.
pub fn parse_price_list(bytes: &[u8], detector: &dyn FormatDetector) -> Result<RecordSet> {
    let detected = detector.detect(bytes);
    let set = parse::parse_records(&detected.text, detected.delimiter, true)?;
    info!(
        encoding = detected.encoding.name(),
        delimiter = %display_delimiter(detected.delimiter),
        columns = set.headers().len(),
        rows = set.len(),
        "loaded price list"
    );
    Ok(set)
}

/// Read a price list file of unknown encoding and delimiter.
#[tracing::instrument(level = "info", skip(path, detector), fields(path = %path.as_ref().display()))]
pub fn load_price_list<P: AsRef<Path>>(path: P, detector: &dyn FormatDetector) -> Result<RecordSet> {
    let bytes = fs::read(&path).map_err(|e| PriceSyncError::io(&path, e))?;
    parse_price_list(&bytes, detector)
}

#[cfg(test)]
mod tests {
    use super::*;
    use detect::{AutoDetect, FixedFormat};
    use encoding_rs::WINDOWS_1251;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use tracing_subscriber::{EnvFilter, FmtSubscriber};

    fn init_test_logging() {
        let subscriber = FmtSubscriber::builder()
            .with_env_filter(
                EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| EnvFilter::new("info,pricesync::process=debug")),
            )
            .with_test_writer()
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    }

    #[test]
    fn loads_cp1251_semicolon_file() -> anyhow::Result<()> {
        init_test_logging();
        let content = "Артикул;Наименование;Цена\r\n\
                       A1;Дрель аккумуляторная ударная;150,00\r\n\
                       A2;Перфоратор сетевой с набором буров;320,50\r\n\
                       \r\n";
        let (bytes, _, _) = WINDOWS_1251.encode(content);
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(&bytes)?;

        let set = load_price_list(tmp.path(), &AutoDetect)?;
        assert_eq!(set.headers(), &["Артикул", "Наименование", "Цена"]);
        assert_eq!(set.len(), 2);
        assert_eq!(set.records()[1].get("Цена"), Some("320,50"));
        Ok(())
    }

    #[test]
    fn loads_bom_comma_file() -> anyhow::Result<()> {
        init_test_logging();
        let mut tmp = NamedTempFile::new()?;
        tmp.write_all(b"\xEF\xBB\xBFvendor_code,price\nA1,15\n")?;

        let set = load_price_list(tmp.path(), &AutoDetect)?;
        assert_eq!(set.headers(), &["vendor_code", "price"]);
        assert_eq!(set.records()[0].get("price"), Some("15"));
        Ok(())
    }

    #[test]
    fn fixed_format_overrides_detection() {
        // A comma-looking header read with a pinned semicolon stays one column.
        let set = parse_price_list(b"a,b,c\n1,2,3", &FixedFormat::utf8(b';')).unwrap();
        assert_eq!(set.headers(), &["a,b,c"]);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = load_price_list("/nonexistent/price-reset.csv", &AutoDetect).unwrap_err();
        assert!(matches!(err, PriceSyncError::Io { .. }));
    }
}
