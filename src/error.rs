//! Error taxonomy for the preview pipeline.
//!
//! Every failure is contained to the component that detected it: the drop
//! zone raises a blocking alert, the clipboard button logs and alerts, and
//! the preview renderer shows its errors inline. Nothing here is fatal to
//! the page.

use serde::{Deserialize, Serialize};
use std::fmt;
use wasm_bindgen::JsValue;

/// Preview pipeline errors
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum PreviewError {
    /// pdf.js rejected the document bytes
    ParseError(String),
    /// A page-level render call failed
    RenderError(String),
    /// JavaScript interop failed (missing property, bad type, etc.)
    JsBridgeError(String),
    /// pdf.js is not loaded, or we are not running in a browser
    LibraryUnavailable(String),
    /// The selected bytes do not look like a PDF at all
    InvalidFile(String),
}

impl fmt::Display for PreviewError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PreviewError::ParseError(detail) => write!(f, "Parse error: {}", detail),
            PreviewError::RenderError(detail) => write!(f, "Render error: {}", detail),
            PreviewError::JsBridgeError(detail) => write!(f, "JS bridge error: {}", detail),
            PreviewError::LibraryUnavailable(detail) => {
                write!(f, "PDF library unavailable: {}", detail)
            }
            PreviewError::InvalidFile(detail) => write!(f, "Invalid file: {}", detail),
        }
    }
}

impl std::error::Error for PreviewError {}

impl From<PreviewError> for JsValue {
    fn from(error: PreviewError) -> JsValue {
        JsValue::from_str(&error.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_includes_detail() {
        let err = PreviewError::ParseError("bad xref table".to_string());
        assert!(err.to_string().contains("bad xref table"));

        let err = PreviewError::RenderError("canvas gone".to_string());
        assert!(err.to_string().contains("canvas gone"));
    }

    #[test]
    fn test_serializes_to_json() {
        let err = PreviewError::LibraryUnavailable("pdf.js not loaded".to_string());
        let json = serde_json::to_string(&err).unwrap();
        assert!(json.contains("LibraryUnavailable"));
        assert!(json.contains("pdf.js not loaded"));
    }
}
