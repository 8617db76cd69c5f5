//! File acceptance checks shared by the upload zone and the preview.

/// Media type accepted by the upload zone.
pub const PDF_MIME: &str = "application/pdf";

/// Exact match on the declared media type. Anything else is rejected,
/// including parametrized variants like `application/pdf;foo=bar`.
pub fn is_pdf_mime(declared: &str) -> bool {
    declared == PDF_MIME
}

/// Cheap sanity check on raw bytes before they are handed to pdf.js.
///
/// Catches obviously broken reads with a local message instead of a deep
/// library error: header magic up front, `%%EOF` marker somewhere in the
/// final kilobyte.
pub fn quick_validate(bytes: &[u8]) -> Result<(), String> {
    if bytes.len() < 8 {
        return Err("File too small to be a valid PDF".to_string());
    }

    if !bytes.starts_with(b"%PDF-") {
        return Err("Not a valid PDF file (missing %PDF- header)".to_string());
    }

    let tail = if bytes.len() > 1024 {
        &bytes[bytes.len() - 1024..]
    } else {
        bytes
    };
    if !tail.windows(5).any(|w| w == b"%%EOF") {
        return Err("PDF appears truncated (missing %%EOF marker)".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_accepts_exact_pdf_mime() {
        assert!(is_pdf_mime("application/pdf"));
    }

    #[test]
    fn test_rejects_other_mimes() {
        assert!(!is_pdf_mime("application/x-pdf"));
        assert!(!is_pdf_mime("text/plain"));
        assert!(!is_pdf_mime("application/pdf; charset=binary"));
        assert!(!is_pdf_mime(""));
    }

    #[test]
    fn test_quick_validate_rejects_small_file() {
        assert!(quick_validate(b"tiny").is_err());
    }

    #[test]
    fn test_quick_validate_rejects_bad_header() {
        assert!(quick_validate(b"not a pdf file at all").is_err());
    }

    #[test]
    fn test_quick_validate_rejects_missing_eof() {
        assert!(quick_validate(b"%PDF-1.7\nsome content with no trailer").is_err());
    }

    #[test]
    fn test_quick_validate_accepts_minimal_pdf() {
        assert!(quick_validate(b"%PDF-1.4\n1 0 obj\nendobj\n%%EOF\n").is_ok());
    }

    #[test]
    fn test_quick_validate_finds_eof_in_tail_of_large_file() {
        let mut bytes = b"%PDF-1.7\n".to_vec();
        bytes.extend(std::iter::repeat(b'x').take(8192));
        bytes.extend_from_slice(b"\n%%EOF\n");
        assert!(quick_validate(&bytes).is_ok());
    }

    proptest! {
        #[test]
        fn prop_only_exact_mime_accepted(mime in "[a-z/+.;= -]{0,40}") {
            prop_assert_eq!(is_pdf_mime(&mime), mime == PDF_MIME);
        }

        #[test]
        fn prop_random_bytes_never_panic(bytes in proptest::collection::vec(any::<u8>(), 0..2048)) {
            let _ = quick_validate(&bytes);
        }
    }
}
