//! Capped in-browser preview of the selected PDF.
//!
//! On each file selection the renderer reads the bytes, hands them to the
//! pdf.js bridge and draws at most [`MAX_PREVIEW_PAGES`] pages into fresh
//! canvases. The preview is best effort: a new selection does not cancel
//! in-flight work for the previous one, and page renders are issued as
//! independent tasks that may complete out of order.

use serde::{Deserialize, Serialize};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement, HtmlInputElement};

use crate::error::PreviewError;
use crate::pdfjs::PdfDocument;

#[cfg(target_arch = "wasm32")]
use crate::validation::{is_pdf_mime, quick_validate};
#[cfg(target_arch = "wasm32")]
use web_sys::{CanvasRenderingContext2d, Element, HtmlCanvasElement};

/// Number of pages rendered before the preview is cut off.
pub const MAX_PREVIEW_PAGES: u32 = 3;

/// Static markup for the already-converted-document panel.
const PLACEHOLDER_ICON: &str = r#"<svg width="64" height="64" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" stroke-linecap="round" stroke-linejoin="round"><path d="M14 2H6a2 2 0 0 0-2 2v16a2 2 0 0 0 2 2h12a2 2 0 0 0 2-2V8z"></path><polyline points="14 2 14 8 20 8"></polyline><line x1="16" y1="13" x2="8" y2="13"></line><line x1="16" y1="17" x2="8" y2="17"></line><polyline points="10 9 9 9 8 9"></polyline></svg>"#;

/// Lifecycle of one preview pass.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PreviewState {
    /// No file loaded
    Idle,
    /// File bytes are being read into memory
    Reading,
    /// pdf.js is parsing the bytes
    Parsing,
    /// Canvases are being created and page renders issued
    Rendering,
    /// Parse or render failed; error shown inline
    Error,
    /// Preview complete until the next selection
    Done,
}

/// Pages actually drawn for a document with `total` pages.
pub fn pages_to_render(total: u32) -> u32 {
    total.min(MAX_PREVIEW_PAGES)
}

/// Summary line appended when pages were cut off, `None` otherwise.
pub fn omitted_note(total: u32) -> Option<String> {
    let rendered = pages_to_render(total);
    if total > rendered {
        Some(format!("... and {} more pages", total - rendered))
    } else {
        None
    }
}

/// Read the opaque server-side conversion id from its hidden field, if the
/// page carries one with a non-empty value.
pub fn conversion_reference(document: &Document) -> Option<String> {
    let field = document
        .get_element_by_id("currentConversionId")?
        .dyn_into::<HtmlInputElement>()
        .ok()?;
    let value = field.value();
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}

/// Renders previews into an injected container element.
#[derive(Clone)]
pub struct PreviewRenderer {
    document: Document,
    container: HtmlElement,
    state: Rc<Cell<PreviewState>>,
}

impl PreviewRenderer {
    pub fn new(document: Document, container: HtmlElement) -> Self {
        Self {
            document,
            container,
            state: Rc::new(Cell::new(PreviewState::Idle)),
        }
    }

    /// Standard page lookup. Returns `Ok(None)` when the page has no
    /// preview container.
    pub fn from_document(document: &Document) -> Result<Option<PreviewRenderer>, JsValue> {
        let container = match document.get_element_by_id("pdfViewer") {
            Some(el) => el.dyn_into::<HtmlElement>()?,
            None => return Ok(None),
        };
        Ok(Some(PreviewRenderer::new(document.clone(), container)))
    }

    /// Current position in the preview lifecycle.
    pub fn state(&self) -> PreviewState {
        self.state.get()
    }

    /// Drop everything in the preview container. Old render targets are
    /// destroyed here; stale in-flight renders may still write into
    /// detached nodes, which is accepted.
    fn clear(&self) {
        self.container.set_inner_html("");
    }

    /// Replace the preview with an inline error panel.
    pub fn show_error(&self, error: &PreviewError) {
        self.state.set(PreviewState::Error);
        self.clear();
        if let Ok(panel) = self.document.create_element("div") {
            panel.set_class_name("pdf-error");
            panel.set_text_content(Some(&format!("Error loading PDF: {}", error)));
            let _ = self.container.append_child(&panel);
        }
    }

    /// Static panel for a previously completed server-side conversion.
    /// No document bytes are fetched or parsed on this path.
    pub fn show_placeholder(&self, conversion_id: &str) -> Result<(), JsValue> {
        self.clear();

        let panel = self.document.create_element("div")?;
        panel.set_class_name("pdf-placeholder");
        panel.set_inner_html(PLACEHOLDER_ICON);

        let caption = self.document.create_element("p")?;
        caption.set_text_content(Some(&format!(
            "PDF preview for conversion #{}",
            conversion_id
        )));
        panel.append_child(&caption)?;

        let hint = self.document.create_element("p")?;
        hint.set_class_name("text-muted");
        hint.set_text_content(Some(
            "To view a new PDF, upload a file using the form above.",
        ));
        panel.append_child(&hint)?;

        self.container.append_child(&panel)?;
        Ok(())
    }
}

#[cfg(target_arch = "wasm32")]
impl PreviewRenderer {
    /// Full preview pass for one selected file: read, parse, render.
    /// Failures end up inline in the preview area and in the Error state.
    pub async fn preview_file(&self, file: &web_sys::File) -> Result<(), JsValue> {
        use wasm_bindgen_futures::JsFuture;

        self.state.set(PreviewState::Reading);
        let buffer = match JsFuture::from(file.array_buffer()).await {
            Ok(buffer) => buffer,
            Err(err) => {
                let err = PreviewError::JsBridgeError(format!("file read failed: {:?}", err));
                self.show_error(&err);
                return Err(err.into());
            }
        };
        let bytes = js_sys::Uint8Array::new(&buffer).to_vec();

        if let Err(detail) = quick_validate(&bytes) {
            let err = PreviewError::InvalidFile(detail);
            self.show_error(&err);
            return Err(err.into());
        }

        self.state.set(PreviewState::Parsing);
        let pdf = match PdfDocument::load(&bytes).await {
            Ok(pdf) => pdf,
            Err(err) => {
                web_sys::console::error_1(&JsValue::from_str(&format!(
                    "Error rendering PDF: {}",
                    err
                )));
                self.show_error(&err);
                return Err(err.into());
            }
        };

        self.state.set(PreviewState::Rendering);
        self.render_pass(pdf)?;
        self.state.set(PreviewState::Done);
        Ok(())
    }

    /// Clear the container and issue one independent render task per
    /// previewed page. Nothing awaits page n before issuing page n+1, so
    /// pixels may arrive out of sequence; each slot is labeled with its own
    /// page number regardless of arrival order.
    fn render_pass(&self, pdf: PdfDocument) -> Result<(), JsValue> {
        use wasm_bindgen_futures::spawn_local;

        self.clear();

        let pages = self.document.create_element("div")?;
        pages.set_class_name("pdf-pages");
        self.container.append_child(&pages)?;

        let total = pdf.page_count();
        let count = pages_to_render(total);

        for page_num in 1..=count {
            let slot = self.document.create_element("div")?;
            slot.set_class_name("pdf-page");
            pages.append_child(&slot)?;

            let renderer = self.clone();
            let pdf = pdf.clone();
            spawn_local(async move {
                if let Err(err) = renderer.render_page_into(&pdf, page_num, &slot).await {
                    web_sys::console::error_1(&JsValue::from_str(&format!(
                        "Error rendering page {}: {}",
                        page_num, err
                    )));
                    renderer.state.set(PreviewState::Error);
                    // Keep sibling pages alive; the failure stays in its slot.
                    if let Ok(panel) = renderer.document.create_element("div") {
                        panel.set_class_name("pdf-error");
                        panel.set_text_content(Some(&format!("Error loading PDF: {}", err)));
                        let _ = slot.append_child(&panel);
                    }
                }
            });
        }

        if let Some(note) = omitted_note(total) {
            let more = self.document.create_element("div")?;
            more.set_class_name("more-pages-message");
            more.set_text_content(Some(&note));
            pages.append_child(&more)?;
        }

        Ok(())
    }

    /// Canvas sized to the page's 1.0-scale viewport, labeled beneath, with
    /// the render issued against its 2d context.
    async fn render_page_into(
        &self,
        pdf: &PdfDocument,
        page_num: u32,
        slot: &Element,
    ) -> Result<(), PreviewError> {
        let page = pdf.page(page_num).await?;
        let viewport = page.viewport(1.0)?;

        let canvas: HtmlCanvasElement = self
            .document
            .create_element("canvas")
            .map_err(|e| PreviewError::RenderError(format!("canvas creation failed: {:?}", e)))?
            .dyn_into()
            .map_err(|_| PreviewError::RenderError("canvas element has wrong type".to_string()))?;
        canvas.set_width(viewport.width as u32);
        canvas.set_height(viewport.height as u32);
        slot.append_child(&canvas)
            .map_err(|e| PreviewError::RenderError(format!("canvas attach failed: {:?}", e)))?;

        let label = self
            .document
            .create_element("div")
            .map_err(|e| PreviewError::RenderError(format!("label creation failed: {:?}", e)))?;
        label.set_class_name("page-number");
        label.set_text_content(Some(&format!("Page {}", page_num)));
        slot.append_child(&label)
            .map_err(|e| PreviewError::RenderError(format!("label attach failed: {:?}", e)))?;

        let context = canvas
            .get_context("2d")
            .map_err(|e| PreviewError::RenderError(format!("2d context unavailable: {:?}", e)))?
            .ok_or_else(|| PreviewError::RenderError("2d context unavailable".to_string()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| PreviewError::RenderError("2d context has wrong type".to_string()))?;

        page.render_into(&context, &viewport).await
    }

    /// Wire the change listener on the shared file input. Files whose
    /// declared type is not the accepted one are ignored here; user-facing
    /// rejection belongs to the drop zone.
    pub fn attach(&self, input: &HtmlInputElement) -> Result<(), JsValue> {
        use wasm_bindgen::closure::Closure;
        use wasm_bindgen_futures::spawn_local;

        let renderer = self.clone();
        let input_handle = input.clone();
        let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
            let file = match input_handle.files().and_then(|files| files.get(0)) {
                Some(file) => file,
                None => return,
            };
            if !is_pdf_mime(&file.type_()) {
                return;
            }
            let renderer = renderer.clone();
            spawn_local(async move {
                // Failures are already surfaced in the preview area.
                let _ = renderer.preview_file(&file).await;
            });
        });
        input.add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
        on_change.forget();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PreviewRenderer {
    pub async fn preview_file(&self, _file: &web_sys::File) -> Result<(), JsValue> {
        Err(PreviewError::LibraryUnavailable(
            "preview only available in WASM".to_string(),
        )
        .into())
    }

    pub fn attach(&self, _input: &HtmlInputElement) -> Result<(), JsValue> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_pages_to_render_caps_at_three() {
        assert_eq!(pages_to_render(0), 0);
        assert_eq!(pages_to_render(1), 1);
        assert_eq!(pages_to_render(3), 3);
        assert_eq!(pages_to_render(4), 3);
        assert_eq!(pages_to_render(250), 3);
    }

    #[test]
    fn test_no_note_at_or_under_cap() {
        assert_eq!(omitted_note(0), None);
        assert_eq!(omitted_note(2), None);
        assert_eq!(omitted_note(3), None);
    }

    #[test]
    fn test_note_text_over_cap() {
        assert_eq!(omitted_note(4).as_deref(), Some("... and 1 more pages"));
        assert_eq!(omitted_note(10).as_deref(), Some("... and 7 more pages"));
    }

    #[test]
    fn test_state_serializes() {
        let json = serde_json::to_string(&PreviewState::Rendering).unwrap();
        assert_eq!(json, "\"Rendering\"");
    }

    proptest! {
        #[test]
        fn prop_rendered_plus_omitted_equals_total(total in 0u32..10_000) {
            let rendered = pages_to_render(total);
            prop_assert!(rendered <= MAX_PREVIEW_PAGES);
            match omitted_note(total) {
                Some(note) => {
                    let omitted = total - rendered;
                    prop_assert_eq!(note, format!("... and {} more pages", omitted));
                }
                None => prop_assert_eq!(rendered, total),
            }
        }
    }
}

// WASM-specific tests that run in a browser environment
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn build_renderer() -> PreviewRenderer {
        let document = web_sys::window().unwrap().document().unwrap();
        let container: HtmlElement = document
            .create_element("div")
            .unwrap()
            .dyn_into()
            .unwrap();
        PreviewRenderer::new(document, container)
    }

    #[wasm_bindgen_test]
    fn test_initial_state_is_idle() {
        let renderer = build_renderer();
        assert_eq!(renderer.state(), PreviewState::Idle);
    }

    #[wasm_bindgen_test]
    fn test_show_error_fills_container() {
        let renderer = build_renderer();
        let err = PreviewError::ParseError("Invalid PDF structure".to_string());
        renderer.show_error(&err);

        assert_eq!(renderer.state(), PreviewState::Error);
        let panel = renderer.container.query_selector(".pdf-error").unwrap();
        let text = panel.unwrap().text_content().unwrap();
        assert!(text.starts_with("Error loading PDF:"));
        assert!(text.contains("Invalid PDF structure"));
        // Zero canvases on the error path.
        assert!(renderer
            .container
            .query_selector("canvas")
            .unwrap()
            .is_none());
    }

    #[wasm_bindgen_test]
    fn test_show_placeholder_builds_panel() {
        let renderer = build_renderer();
        renderer.show_placeholder("42").unwrap();

        let panel = renderer
            .container
            .query_selector(".pdf-placeholder")
            .unwrap()
            .unwrap();
        assert!(panel
            .text_content()
            .unwrap()
            .contains("PDF preview for conversion #42"));
        assert!(panel.query_selector("svg").unwrap().is_some());
    }

    #[wasm_bindgen_test]
    fn test_show_error_replaces_placeholder() {
        let renderer = build_renderer();
        renderer.show_placeholder("7").unwrap();
        renderer.show_error(&PreviewError::ParseError("boom".to_string()));

        assert!(renderer
            .container
            .query_selector(".pdf-placeholder")
            .unwrap()
            .is_none());
    }

    #[wasm_bindgen_test]
    fn test_conversion_reference_absent() {
        let document = web_sys::window().unwrap().document().unwrap();
        assert_eq!(conversion_reference(&document), None);
    }
}
