//! Auto-dismissal of transient notification banners.
//!
//! Every `.alert` element present at load starts a 1 second opacity fade
//! after 5 seconds and is removed from the document once the fade is over.

use wasm_bindgen::closure::Closure;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, HtmlElement};

/// Delay before the fade starts, in milliseconds.
const DISMISS_DELAY_MS: i32 = 5000;
/// Duration of the opacity transition; removal follows it.
const FADE_MS: i32 = 1000;

/// Schedule dismissal for every banner currently in the document.
/// Returns how many banners were scheduled.
pub fn dismiss_alerts(document: &Document) -> Result<usize, JsValue> {
    let window =
        web_sys::window().ok_or_else(|| JsValue::from_str("No window object available"))?;

    let nodes = document.query_selector_all(".alert")?;
    let mut banners = Vec::with_capacity(nodes.length() as usize);
    for i in 0..nodes.length() {
        if let Some(node) = nodes.get(i) {
            if let Ok(el) = node.dyn_into::<HtmlElement>() {
                banners.push(el);
            }
        }
    }
    if banners.is_empty() {
        return Ok(0);
    }
    let count = banners.len();

    let fade_window = window.clone();
    let start_fade = Closure::once(Box::new(move || {
        for banner in banners {
            let style = banner.style();
            let _ = style.set_property("transition", "opacity 1s");
            let _ = style.set_property("opacity", "0");

            let doomed = banner.clone();
            let remove = Closure::once(Box::new(move || {
                doomed.remove();
            }) as Box<dyn FnOnce()>);
            let _ = fade_window.set_timeout_with_callback_and_timeout_and_arguments_0(
                remove.as_ref().unchecked_ref(),
                FADE_MS,
            );
            remove.forget();
        }
    }) as Box<dyn FnOnce()>);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        start_fade.as_ref().unchecked_ref(),
        DISMISS_DELAY_MS,
    )?;
    start_fade.forget();

    Ok(count)
}


// WASM-specific tests that run in a browser environment
#[cfg(test)]
#[cfg(target_arch = "wasm32")]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_no_alerts_schedules_nothing() {
        let document = web_sys::window().unwrap().document().unwrap();
        assert_eq!(dismiss_alerts(&document).unwrap(), 0);
    }

    #[wasm_bindgen_test]
    fn test_alerts_are_counted_and_still_present_immediately() {
        let document = web_sys::window().unwrap().document().unwrap();
        let body = document.body().unwrap();

        let banner = document.create_element("div").unwrap();
        banner.set_class_name("alert");
        body.append_child(&banner).unwrap();

        let scheduled = dismiss_alerts(&document).unwrap();
        assert_eq!(scheduled, 1);
        // Dismissal is delayed; the banner must survive the call itself.
        assert!(document.query_selector(".alert").unwrap().is_some());

        banner.remove();
    }
}
