//! Upload zone: click-to-browse, drag-and-drop, optional auto-submit.
//!
//! The zone owns exactly one hidden file input. A file arrives through one
//! of two exclusive paths per user action, manual pick or drop; both update
//! the label and run the same auto-submit logic. Rejected drops leave the
//! previous selection untouched.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{
    DataTransfer, Document, DragEvent, Element, HtmlElement, HtmlFormElement, HtmlInputElement,
    Window,
};

use crate::validation::is_pdf_mime;

/// Class applied to the zone while a drag hovers over it.
const ACTIVE_CLASS: &str = "dragover";

/// Label text shown once a file is staged.
pub fn selected_label(file_name: &str) -> String {
    format!("Selected: {}", file_name)
}

/// Controller for the drop target and its file input.
///
/// Element handles are injected; nothing in the behavior methods touches
/// the document globally except the blocking alert on a rejected drop.
#[derive(Clone)]
pub struct DropZone {
    window: Window,
    zone: HtmlElement,
    label: Element,
    input: HtmlInputElement,
    auto_submit: Option<HtmlInputElement>,
    form: Option<HtmlFormElement>,
    submit_btn: Option<HtmlElement>,
}

impl DropZone {
    /// Create a controller over the given handles.
    ///
    /// # Errors
    /// Returns JsValue error if unable to access the window object
    pub fn new(
        zone: HtmlElement,
        label: Element,
        input: HtmlInputElement,
        auto_submit: Option<HtmlInputElement>,
        form: Option<HtmlFormElement>,
        submit_btn: Option<HtmlElement>,
    ) -> Result<Self, JsValue> {
        let window =
            web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;

        Ok(Self {
            window,
            zone,
            label,
            input,
            auto_submit,
            form,
            submit_btn,
        })
    }

    /// Standard page lookups. Returns `Ok(None)` when the page has no
    /// upload zone at all.
    pub fn from_document(document: &Document) -> Result<Option<DropZone>, JsValue> {
        let zone = match document.query_selector(".file-upload-zone")? {
            Some(el) => el.dyn_into::<HtmlElement>()?,
            None => return Ok(None),
        };
        let label = zone
            .query_selector(".upload-text")?
            .ok_or_else(|| JsValue::from_str("upload zone is missing its .upload-text label"))?;
        let input = document
            .get_element_by_id("pdf_file")
            .ok_or_else(|| JsValue::from_str("upload zone requires a #pdf_file input"))?
            .dyn_into::<HtmlInputElement>()?;
        let auto_submit = document
            .get_element_by_id("autoSubmit")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok());
        let form = document
            .query_selector("form[enctype=\"multipart/form-data\"]")?
            .and_then(|el| el.dyn_into::<HtmlFormElement>().ok());
        let submit_btn = document
            .get_element_by_id("pdfSubmitBtn")
            .and_then(|el| el.dyn_into::<HtmlElement>().ok());

        DropZone::new(zone, label, input, auto_submit, form, submit_btn).map(Some)
    }

    /// Open the file picker bound to the hidden input.
    pub fn open_picker(&self) {
        self.input.click();
    }

    /// Toggle the drag highlight on the zone.
    pub fn set_active(&self, active: bool) -> Result<(), JsValue> {
        let classes = self.zone.class_list();
        if active {
            classes.add_1(ACTIVE_CLASS)
        } else {
            classes.remove_1(ACTIVE_CLASS)
        }
    }

    /// React to a manual pick on the file input: reflect the name in the
    /// label and run the auto-submit logic. No file chosen is a no-op.
    pub fn handle_selection(&self) -> Result<(), JsValue> {
        let file = match self.input.files().and_then(|files| files.get(0)) {
            Some(file) => file,
            None => return Ok(()),
        };

        self.show_selected(&file.name());
        self.maybe_submit()
    }

    /// React to a drop. A first file with exactly the accepted media type
    /// replaces the input's selection; anything else raises a blocking
    /// alert and changes nothing.
    pub fn handle_drop(&self, transfer: &DataTransfer) -> Result<(), JsValue> {
        let files = match transfer.files() {
            Some(files) => files,
            None => return Ok(()),
        };
        let file = match files.get(0) {
            Some(file) => file,
            None => return Ok(()),
        };

        if !is_pdf_mime(&file.type_()) {
            self.window.alert_with_message("Please upload a PDF file.")?;
            return Ok(());
        }

        self.input.set_files(Some(&files));
        self.show_selected(&file.name());
        self.maybe_submit()
    }

    fn show_selected(&self, file_name: &str) {
        self.label.set_text_content(Some(&selected_label(file_name)));
    }

    fn auto_submit_enabled(&self) -> bool {
        self.auto_submit
            .as_ref()
            .map(|toggle| toggle.checked())
            .unwrap_or(false)
    }

    fn maybe_submit(&self) -> Result<(), JsValue> {
        if !self.auto_submit_enabled() {
            return Ok(());
        }
        if let Some(form) = &self.form {
            // Clicking the submit control lets built-in form validation run;
            // form.submit() bypasses it and is only the fallback.
            match &self.submit_btn {
                Some(btn) => btn.click(),
                None => form.submit()?,
            }
        }
        Ok(())
    }

    /// Register all listeners. Closures are leaked into the page, which is
    /// the intended lifetime for per-page wiring.
    pub fn attach(&self) -> Result<(), JsValue> {
        {
            let ctrl = self.clone();
            let on_click =
                Closure::<dyn FnMut(web_sys::MouseEvent)>::new(move |_| ctrl.open_picker());
            self.zone
                .add_event_listener_with_callback("click", on_click.as_ref().unchecked_ref())?;
            on_click.forget();
        }

        {
            let ctrl = self.clone();
            let on_change = Closure::<dyn FnMut(web_sys::Event)>::new(move |_| {
                if let Err(err) = ctrl.handle_selection() {
                    web_sys::console::error_1(&err);
                }
            });
            self.input
                .add_event_listener_with_callback("change", on_change.as_ref().unchecked_ref())?;
            on_change.forget();
        }

        // Every drag event suppresses the browser's default navigation;
        // enter/over highlight the zone, leave/drop clear it.
        for (event_name, active) in [
            ("dragenter", true),
            ("dragover", true),
            ("dragleave", false),
            ("drop", false),
        ] {
            let ctrl = self.clone();
            let handler = Closure::<dyn FnMut(DragEvent)>::new(move |event: DragEvent| {
                event.prevent_default();
                event.stop_propagation();
                if let Err(err) = ctrl.set_active(active) {
                    web_sys::console::error_1(&err);
                }
                if event.type_() == "drop" {
                    if let Some(transfer) = event.data_transfer() {
                        if let Err(err) = ctrl.handle_drop(&transfer) {
                            web_sys::console::error_1(&err);
                        }
                    }
                }
            });
            self.zone
                .add_event_listener_with_callback(event_name, handler.as_ref().unchecked_ref())?;
            handler.forget();
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_selected_label_uses_exact_name() {
        assert_eq!(selected_label("report.pdf"), "Selected: report.pdf");
        assert_eq!(
            selected_label("with spaces and ümlauts.pdf"),
            "Selected: with spaces and ümlauts.pdf"
        );
    }

    #[test]
    fn test_selected_label_empty_name() {
        assert_eq!(selected_label(""), "Selected: ");
    }

    proptest! {
        #[test]
        fn prop_selected_label_round_trips_name(name in ".{0,64}") {
            let label = selected_label(&name);
            prop_assert!(label.starts_with("Selected: "));
            prop_assert_eq!(&label["Selected: ".len()..], name.as_str());
        }
    }
}
