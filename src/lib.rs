//! Browser-side layer of the PDF→XML converter web app.
//!
//! This crate replaces the page's hand-written scripting: drag-and-drop
//! upload handling, optional auto-submit of the upload form, a capped
//! pdf.js preview of the selected document, clipboard copy of the
//! converted XML, and auto-dismissal of notification banners. State and
//! behavior live in Rust; JavaScript only loads the module.
//!
//! ## Usage (JavaScript)
//!
//! ```javascript
//! import init, { init_app } from './pkg/pdfxml_wasm.js';
//!
//! await init();
//! const wiring = init_app();
//! // e.g. { dropzone: true, preview: true, placeholder: false,
//! //        clipboard: true, alerts: 1 }
//! ```
//!
//! Every component is optional: a page carrying only a subset of the
//! expected elements wires only that subset.

pub mod alerts;
pub mod clipboard;
pub mod dropzone;
pub mod error;
pub mod pdfjs;
pub mod preview;
pub mod validation;

use serde::Serialize;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

// Re-export main types for JavaScript and library consumers
pub use clipboard::CopyButton;
pub use dropzone::{selected_label, DropZone};
pub use error::PreviewError;
pub use pdfjs::{PdfDocument, PdfPage, PageViewport};
pub use preview::{
    conversion_reference, omitted_note, pages_to_render, PreviewRenderer, PreviewState,
    MAX_PREVIEW_PAGES,
};
pub use validation::{is_pdf_mime, quick_validate, PDF_MIME};

/// Initialize the WASM module
/// Called automatically by wasm-bindgen
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
}

/// Get the library version
#[wasm_bindgen]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Which components `init_app` found and wired on the current page.
#[derive(Debug, Clone, Serialize)]
pub struct AppWiring {
    pub dropzone: bool,
    pub preview: bool,
    pub placeholder: bool,
    pub clipboard: bool,
    pub alerts: usize,
}

/// Wire every component present on the page. The page calls this once
/// after the module is loaded, in place of a DOMContentLoaded handler.
#[wasm_bindgen]
pub fn init_app() -> Result<JsValue, JsValue> {
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document object available"))?;

    let mut wiring = AppWiring {
        dropzone: false,
        preview: false,
        placeholder: false,
        clipboard: false,
        alerts: 0,
    };

    if let Some(zone) = DropZone::from_document(&document)? {
        zone.attach()?;
        wiring.dropzone = true;
    }

    // The preview needs both its container and the shared file input.
    if let Some(renderer) = PreviewRenderer::from_document(&document)? {
        if let Some(input) = document.get_element_by_id("pdf_file") {
            let input: web_sys::HtmlInputElement = input.dyn_into()?;
            if let Err(err) = pdfjs::configure_worker(pdfjs::DEFAULT_WORKER_SRC) {
                web_sys::console::warn_1(&JsValue::from_str(&format!(
                    "pdf.js worker not configured: {}",
                    err
                )));
            }
            renderer.attach(&input)?;
            wiring.preview = true;

            if let Some(id) = conversion_reference(&document) {
                renderer.show_placeholder(&id)?;
                wiring.placeholder = true;
            }
        }
    }

    if let Some(copy) = CopyButton::from_document(&document)? {
        copy.attach()?;
        wiring.clipboard = true;
    }

    wiring.alerts = alerts::dismiss_alerts(&document)?;

    serde_wasm_bindgen::to_value(&wiring)
        .map_err(|e| JsValue::from_str(&format!("Failed to serialize wiring: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }

    #[test]
    fn test_app_wiring_serializes() {
        let wiring = AppWiring {
            dropzone: true,
            preview: true,
            placeholder: false,
            clipboard: false,
            alerts: 2,
        };
        let json = serde_json::to_string(&wiring).unwrap();
        assert!(json.contains("\"dropzone\":true"));
        assert!(json.contains("\"alerts\":2"));
    }
}
