//! Bridge to the page-global pdf.js library.
//!
//! The host page loads pdf.js from a CDN; this module reaches the global
//! `pdfjsLib` object through `Reflect` and wraps the handful of calls the
//! preview needs: load bytes into a document, fetch a page, read its
//! viewport, render into a canvas context. Parsing and rasterization stay
//! entirely on the pdf.js side.

use wasm_bindgen::prelude::*;

use crate::error::PreviewError;

#[cfg(target_arch = "wasm32")]
use js_sys::{Function, Object, Promise, Reflect, Uint8Array};
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen_futures::JsFuture;
#[cfg(target_arch = "wasm32")]
use web_sys::CanvasRenderingContext2d;

/// Worker script matching the pdf.js build the host pages load.
pub const DEFAULT_WORKER_SRC: &str =
    "https://cdnjs.cloudflare.com/ajax/libs/pdf.js/3.4.120/pdf.worker.min.js";

/// Check if pdf.js is available in the current environment
pub fn is_available() -> bool {
    #[cfg(target_arch = "wasm32")]
    {
        pdfjs_lib().is_ok()
    }

    #[cfg(not(target_arch = "wasm32"))]
    false
}

/// Point pdf.js at its worker script. Must happen before the first
/// `getDocument` call.
#[cfg(target_arch = "wasm32")]
pub fn configure_worker(worker_src: &str) -> Result<(), PreviewError> {
    let lib = pdfjs_lib()?;
    let options = Reflect::get(&lib, &JsValue::from_str("GlobalWorkerOptions")).map_err(|e| {
        PreviewError::JsBridgeError(format!("GlobalWorkerOptions not found: {:?}", e))
    })?;
    Reflect::set(
        &options,
        &JsValue::from_str("workerSrc"),
        &JsValue::from_str(worker_src),
    )
    .map_err(|e| PreviewError::JsBridgeError(format!("failed to set workerSrc: {:?}", e)))?;
    Ok(())
}

#[cfg(not(target_arch = "wasm32"))]
pub fn configure_worker(_worker_src: &str) -> Result<(), PreviewError> {
    Err(PreviewError::LibraryUnavailable(
        "pdf.js bridge only available in WASM".to_string(),
    ))
}

#[cfg(target_arch = "wasm32")]
fn pdfjs_lib() -> Result<JsValue, PreviewError> {
    let window = web_sys::window()
        .ok_or_else(|| PreviewError::JsBridgeError("no window object".to_string()))?;

    let lib = Reflect::get(&window, &JsValue::from_str("pdfjsLib"))
        .map_err(|e| PreviewError::JsBridgeError(format!("pdfjsLib lookup failed: {:?}", e)))?;

    if lib.is_undefined() {
        return Err(PreviewError::LibraryUnavailable(
            "pdf.js not loaded".to_string(),
        ));
    }
    Ok(lib)
}

/// Fetch a named property and require it to be callable.
#[cfg(target_arch = "wasm32")]
fn get_fn(target: &JsValue, name: &str) -> Result<Function, PreviewError> {
    let value = Reflect::get(target, &JsValue::from_str(name))
        .map_err(|e| PreviewError::JsBridgeError(format!("{} not found: {:?}", name, e)))?;
    value
        .dyn_into::<Function>()
        .map_err(|_| PreviewError::JsBridgeError(format!("{} is not a function", name)))
}

/// Best-effort human-readable form of a rejected promise value.
#[cfg(target_arch = "wasm32")]
fn describe(value: &JsValue) -> String {
    if let Some(text) = value.as_string() {
        return text;
    }
    if let Ok(message) = Reflect::get(value, &JsValue::from_str("message")) {
        if let Some(text) = message.as_string() {
            return text;
        }
    }
    format!("{:?}", value)
}

/// Handle to a parsed document held by pdf.js.
///
/// Cloning clones the underlying JS reference; dropping the last handle
/// drops the reference, pdf.js owns the actual document state.
#[derive(Clone)]
#[allow(dead_code)]
pub struct PdfDocument {
    inner: JsValue,
    page_count: u32,
}

impl PdfDocument {
    /// Total page count, as reported by pdf.js at load time.
    pub fn page_count(&self) -> u32 {
        self.page_count
    }
}

#[cfg(target_arch = "wasm32")]
impl PdfDocument {
    /// Parse raw bytes via `pdfjsLib.getDocument({data})`.
    pub async fn load(bytes: &[u8]) -> Result<PdfDocument, PreviewError> {
        let lib = pdfjs_lib()?;

        // Copy into JS memory; a zero-copy view would not survive the await.
        let data = Uint8Array::from(bytes);
        let options = Object::new();
        Reflect::set(&options, &JsValue::from_str("data"), &data)
            .map_err(|e| PreviewError::JsBridgeError(format!("failed to set data: {:?}", e)))?;

        let get_document = get_fn(&lib, "getDocument")?;
        let loading_task = get_document
            .call1(&lib, &options)
            .map_err(|e| PreviewError::ParseError(describe(&e)))?;

        let promise: Promise = Reflect::get(&loading_task, &JsValue::from_str("promise"))
            .map_err(|e| PreviewError::JsBridgeError(format!("no loading promise: {:?}", e)))?
            .dyn_into()
            .map_err(|_| PreviewError::JsBridgeError("loading task is not a promise".to_string()))?;

        let inner = JsFuture::from(promise)
            .await
            .map_err(|e| PreviewError::ParseError(describe(&e)))?;

        let page_count = Reflect::get(&inner, &JsValue::from_str("numPages"))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(0.0) as u32;

        Ok(PdfDocument { inner, page_count })
    }

    /// Fetch a page proxy (1-indexed).
    pub async fn page(&self, page_num: u32) -> Result<PdfPage, PreviewError> {
        let get_page = get_fn(&self.inner, "getPage")?;
        let promise: Promise = get_page
            .call1(&self.inner, &JsValue::from_f64(page_num as f64))
            .map_err(|e| PreviewError::JsBridgeError(format!("getPage call failed: {:?}", e)))?
            .dyn_into()
            .map_err(|_| PreviewError::JsBridgeError("getPage did not return a promise".to_string()))?;

        let inner = JsFuture::from(promise)
            .await
            .map_err(|e| PreviewError::RenderError(describe(&e)))?;

        Ok(PdfPage { inner })
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PdfDocument {
    pub async fn load(_bytes: &[u8]) -> Result<PdfDocument, PreviewError> {
        Err(PreviewError::LibraryUnavailable(
            "pdf.js bridge only available in WASM".to_string(),
        ))
    }

    pub async fn page(&self, _page_num: u32) -> Result<PdfPage, PreviewError> {
        Err(PreviewError::LibraryUnavailable(
            "pdf.js bridge only available in WASM".to_string(),
        ))
    }
}

/// Proxy for a single page of a loaded document.
#[allow(dead_code)]
pub struct PdfPage {
    inner: JsValue,
}

#[cfg(target_arch = "wasm32")]
impl PdfPage {
    /// Synchronous `getViewport({scale})` returning pixel dimensions.
    pub fn viewport(&self, scale: f64) -> Result<PageViewport, PreviewError> {
        let get_viewport = get_fn(&self.inner, "getViewport")?;

        let params = Object::new();
        Reflect::set(&params, &JsValue::from_str("scale"), &JsValue::from_f64(scale)).map_err(
            |e| PreviewError::JsBridgeError(format!("failed to set scale: {:?}", e)),
        )?;

        let inner = get_viewport
            .call1(&self.inner, &params)
            .map_err(|e| PreviewError::JsBridgeError(format!("getViewport call failed: {:?}", e)))?;

        // US Letter fallback matches what pdf.js reports for a missing MediaBox.
        let width = Reflect::get(&inner, &JsValue::from_str("width"))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(612.0);
        let height = Reflect::get(&inner, &JsValue::from_str("height"))
            .ok()
            .and_then(|v| v.as_f64())
            .unwrap_or(792.0);

        Ok(PageViewport {
            inner,
            width,
            height,
        })
    }

    /// Issue `page.render({canvasContext, viewport})` and await the render
    /// task's completion promise.
    pub async fn render_into(
        &self,
        context: &CanvasRenderingContext2d,
        viewport: &PageViewport,
    ) -> Result<(), PreviewError> {
        let render = get_fn(&self.inner, "render")?;

        let params = Object::new();
        Reflect::set(&params, &JsValue::from_str("canvasContext"), context).map_err(|e| {
            PreviewError::JsBridgeError(format!("failed to set canvasContext: {:?}", e))
        })?;
        Reflect::set(&params, &JsValue::from_str("viewport"), &viewport.inner)
            .map_err(|e| PreviewError::JsBridgeError(format!("failed to set viewport: {:?}", e)))?;

        let task = render
            .call1(&self.inner, &params)
            .map_err(|e| PreviewError::RenderError(describe(&e)))?;

        // pdf.js returns a RenderTask; completion is exposed as `promise`.
        let promise = Reflect::get(&task, &JsValue::from_str("promise"))
            .ok()
            .and_then(|p| p.dyn_into::<Promise>().ok());
        if let Some(promise) = promise {
            JsFuture::from(promise)
                .await
                .map_err(|e| PreviewError::RenderError(describe(&e)))?;
        }

        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl PdfPage {
    pub fn viewport(&self, _scale: f64) -> Result<PageViewport, PreviewError> {
        Err(PreviewError::LibraryUnavailable(
            "pdf.js bridge only available in WASM".to_string(),
        ))
    }

    pub async fn render_into(
        &self,
        _context: &web_sys::CanvasRenderingContext2d,
        _viewport: &PageViewport,
    ) -> Result<(), PreviewError> {
        Err(PreviewError::LibraryUnavailable(
            "pdf.js bridge only available in WASM".to_string(),
        ))
    }
}

/// Page-to-pixel mapping at a fixed scale.
#[allow(dead_code)]
pub struct PageViewport {
    inner: JsValue,
    /// Width in CSS pixels at the requested scale
    pub width: f64,
    /// Height in CSS pixels at the requested scale
    pub height: f64,
}
