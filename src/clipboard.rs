//! Copy-to-clipboard control for the converted XML output.

use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement, Window};

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::closure::Closure;

/// How long the confirmation label stays up, in milliseconds.
const CONFIRMATION_MS: i32 = 2000;
const CONFIRMATION_LABEL: &str = "Copied!";

/// Button that copies a fixed source element's text to the clipboard.
#[derive(Clone)]
pub struct CopyButton {
    window: Window,
    button: HtmlElement,
    source: Element,
}

impl CopyButton {
    /// Create a controller over the given button and text source.
    ///
    /// # Errors
    /// Returns JsValue error if unable to access the window object
    pub fn new(button: HtmlElement, source: Element) -> Result<CopyButton, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;
        Ok(CopyButton {
            window,
            button,
            source,
        })
    }

    /// Standard page lookups. Returns `Ok(None)` unless both the button
    /// and its source element exist.
    pub fn from_document(document: &Document) -> Result<Option<CopyButton>, JsValue> {
        let button = match document.get_element_by_id("copyXmlBtn") {
            Some(el) => el.dyn_into::<HtmlElement>()?,
            None => return Ok(None),
        };
        let source = match document.get_element_by_id("xmlContent") {
            Some(el) => el,
            None => return Ok(None),
        };
        CopyButton::new(button, source).map(Some)
    }

    #[allow(dead_code)]
    fn source_text(&self) -> String {
        self.source.text_content().unwrap_or_default()
    }
}

#[cfg(target_arch = "wasm32")]
impl CopyButton {
    /// Write the source text to the system clipboard. Success swaps the
    /// button label for [`CONFIRMATION_MS`]; failure logs and raises a
    /// blocking alert.
    pub async fn copy(&self) -> Result<(), JsValue> {
        use wasm_bindgen_futures::JsFuture;

        let clipboard = self.window.navigator().clipboard();
        match JsFuture::from(clipboard.write_text(&self.source_text())).await {
            Ok(_) => self.confirm(),
            Err(err) => {
                web_sys::console::error_1(&err);
                self.window
                    .alert_with_message("Failed to copy XML to clipboard.")?;
                Err(err)
            }
        }
    }

    /// Swap the label to the confirmation string, restore after the delay.
    fn confirm(&self) -> Result<(), JsValue> {
        let original = self.button.text_content().unwrap_or_default();
        self.button.set_text_content(Some(CONFIRMATION_LABEL));

        let button = self.button.clone();
        let restore = Closure::once(Box::new(move || {
            button.set_text_content(Some(&original));
        }) as Box<dyn FnOnce()>);
        self.window.set_timeout_with_callback_and_timeout_and_arguments_0(
            restore.as_ref().unchecked_ref(),
            CONFIRMATION_MS,
        )?;
        restore.forget();
        Ok(())
    }

    /// Register the click listener.
    pub fn attach(&self) -> Result<(), JsValue> {
        use wasm_bindgen_futures::spawn_local;

        let ctrl = self.clone();
        let on_click = Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_| {
            let ctrl = ctrl.clone();
            spawn_local(async move {
                // The failure path already alerted the user.
                let _ = ctrl.copy().await;
            });
        });
        self.button
            .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
        on_click.forget();
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
impl CopyButton {
    pub async fn copy(&self) -> Result<(), JsValue> {
        Err(JsValue::from_str("clipboard only available in WASM"))
    }

    pub fn attach(&self) -> Result<(), JsValue> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    #[test]
    fn test_confirmation_timing() {
        // Label restore happens well before the alert dismissal window.
        assert_eq!(super::CONFIRMATION_MS, 2000);
        assert_eq!(super::CONFIRMATION_LABEL, "Copied!");
    }
}

// WASM-specific tests that run in a browser environment
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn test_document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn test_from_document_without_button_is_none() {
        let document = test_document();
        let result = CopyButton::from_document(&document).unwrap();
        assert!(result.is_none());
    }

    #[wasm_bindgen_test]
    fn test_source_text_reads_element() {
        let document = test_document();
        let button: HtmlElement = document
            .create_element("button")
            .unwrap()
            .dyn_into()
            .unwrap();
        let source = document.create_element("pre").unwrap();
        source.set_text_content(Some("<root>converted</root>"));

        let ctrl = CopyButton::new(button, source).unwrap();
        assert_eq!(ctrl.source_text(), "<root>converted</root>");
    }

    #[wasm_bindgen_test]
    fn test_confirm_swaps_label() {
        let document = test_document();
        let button: HtmlElement = document
            .create_element("button")
            .unwrap()
            .dyn_into()
            .unwrap();
        button.set_text_content(Some("Copy XML"));
        let source = document.create_element("pre").unwrap();

        let ctrl = CopyButton::new(button, source).unwrap();
        ctrl.confirm().unwrap();
        assert_eq!(ctrl.button.text_content().unwrap(), "Copied!");
    }
}
