// src/process/delimiter.rs

/// Field separators we try, in order of preference.
pub const CANDIDATES: [u8; 3] = [b';', b',', b'\t'];

/// Pick the separator that splits the header line into the most fields.
///
/// The header line is the first non-blank line. Ties, including a line with
/// none of the candidates and empty input, go to the earliest candidate (`;`).
pub fn detect_delimiter(text: &str) -> u8 {
    let header = text.lines().find(|l| !l.trim().is_empty()).unwrap_or("");

    let mut best = CANDIDATES[0];
    let mut best_count = 0;
    for &candidate in &CANDIDATES {
        let count = header.split(candidate as char).count();
        if count > best_count {
            best = candidate;
            best_count = count;
        }
    }
    best
}

/// Printable name for log lines (`\t` is otherwise invisible).
pub fn display_delimiter(delimiter: u8) -> String {
    match delimiter {
        b'\t' => "\\t".to_string(),
        d => (d as char).to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_semicolon() {
        assert_eq!(detect_delimiter("a;b;c"), b';');
    }

    #[test]
    fn picks_comma() {
        assert_eq!(detect_delimiter("a,b,c\n1;2;3;4;5"), b',');
    }

    #[test]
    fn picks_tab() {
        assert_eq!(detect_delimiter("a\tb\tc,d"), b'\t');
    }

    #[test]
    fn no_candidate_falls_back_to_first() {
        assert_eq!(detect_delimiter("single_column"), b';');
        assert_eq!(detect_delimiter(""), b';');
        assert_eq!(detect_delimiter("\n\n"), b';');
    }

    #[test]
    fn tie_prefers_declared_order() {
        assert_eq!(detect_delimiter("a;b,c"), b';');
        assert_eq!(detect_delimiter("a,b\tc"), b',');
    }

    #[test]
    fn leading_blank_lines_are_skipped() {
        assert_eq!(detect_delimiter("\n  \nArticle,Price\n"), b',');
    }
}
