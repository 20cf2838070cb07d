//! Hosted SDK loader
//!
//! Injects the hosted viewer script exactly once, waits for both the
//! script load and the SDK's ready event, and retries a bounded number of
//! times with backoff before declaring the viewer unavailable. Teardown
//! removes the injected script tag.

pub mod bindings;

use js_sys::{Function, Promise};
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use wasm_bindgen_futures::JsFuture;
use web_sys::{console, AddEventListenerOptions, Document, HtmlScriptElement, Window};

use crate::config::{
    INITIAL_BACKOFF_MS, LOAD_ATTEMPTS, READY_TIMEOUT_MS, SDK_READY_EVENT, SDK_SCRIPT_ID, SDK_URL,
};

pub use bindings::{Sdk, SdkView};

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("No window object available")]
    NoWindow,

    #[error("No document available")]
    NoDocument,

    #[error("Document has no body to inject the viewer script into")]
    NoBody,

    #[error("Failed to inject viewer script: {0}")]
    ScriptInjection(String),

    #[error("Viewer script did not become ready: {0}")]
    NotReady(String),

    #[error("Viewer global missing after ready signal")]
    MissingGlobal,

    #[error("Viewer unavailable after {0} load attempts")]
    Unavailable(u32),
}

fn js_msg(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Owns the injected script tag for one component instance.
#[derive(Default)]
pub struct SdkLoader {
    script: Option<HtmlScriptElement>,
}

impl SdkLoader {
    pub fn new() -> Self {
        Self { script: None }
    }

    /// Resolve the SDK handle, injecting the hosted script if needed.
    ///
    /// Fast path: if the SDK global is already present (earlier mount, or
    /// the hosting page loaded it itself), no script is injected and no
    /// ready listener is registered again.
    pub async fn ensure_loaded(&mut self) -> Result<Sdk, LoadError> {
        let window = web_sys::window().ok_or(LoadError::NoWindow)?;
        if let Some(sdk) = Sdk::from_window(&window) {
            return Ok(sdk);
        }

        let mut backoff_ms = INITIAL_BACKOFF_MS;
        for attempt in 1..=LOAD_ATTEMPTS {
            match self.try_load(&window).await {
                Ok(sdk) => return Ok(sdk),
                Err(e) => {
                    console::warn_1(&JsValue::from_str(&format!(
                        "viewer script load attempt {attempt}/{LOAD_ATTEMPTS} failed: {e}"
                    )));
                    self.remove_script();
                    if attempt < LOAD_ATTEMPTS {
                        sleep_ms(&window, backoff_ms as i32).await;
                        backoff_ms *= 2;
                    }
                }
            }
        }
        Err(LoadError::Unavailable(LOAD_ATTEMPTS))
    }

    async fn try_load(&mut self, window: &Window) -> Result<Sdk, LoadError> {
        let document = window.document().ok_or(LoadError::NoDocument)?;
        let script = self.inject_script(&document)?;
        let ready = ready_promise(window, &document, &script, READY_TIMEOUT_MS);
        JsFuture::from(ready)
            .await
            .map_err(|e| LoadError::NotReady(js_msg(e)))?;
        Sdk::from_window(window).ok_or(LoadError::MissingGlobal)
    }

    fn inject_script(&mut self, document: &Document) -> Result<HtmlScriptElement, LoadError> {
        if let Some(script) = &self.script {
            return Ok(script.clone());
        }
        // An earlier mount of this page may have left the tag in place.
        if let Some(existing) = document.get_element_by_id(SDK_SCRIPT_ID) {
            if let Ok(script) = existing.dyn_into::<HtmlScriptElement>() {
                self.script = Some(script.clone());
                return Ok(script);
            }
        }

        let script: HtmlScriptElement = document
            .create_element("script")
            .map_err(|e| LoadError::ScriptInjection(js_msg(e)))?
            .dyn_into()
            .map_err(|_| LoadError::ScriptInjection("not a script element".into()))?;
        script.set_id(SDK_SCRIPT_ID);
        script.set_src(SDK_URL);
        script.set_async(true);

        let body = document.body().ok_or(LoadError::NoBody)?;
        body.append_child(&script)
            .map_err(|e| LoadError::ScriptInjection(js_msg(e)))?;
        self.script = Some(script.clone());
        Ok(script)
    }

    /// Remove the injected script tag, if this loader injected one.
    pub fn remove_script(&mut self) {
        if let Some(script) = self.script.take() {
            script.remove();
        }
    }
}

/// Resolves once the SDK fires its ready event on the document; rejects if
/// the script errors or the timeout elapses first. The listeners are
/// one-shot.
fn ready_promise(
    window: &Window,
    document: &Document,
    script: &HtmlScriptElement,
    timeout_ms: u32,
) -> Promise {
    Promise::new(&mut |resolve: Function, reject: Function| {
        let ready_opts = AddEventListenerOptions::new();
        ready_opts.set_once(true);
        let on_ready = Closure::once_into_js(move || {
            let _ = resolve.call0(&JsValue::NULL);
        });
        let _ = document.add_event_listener_with_callback_and_add_event_listener_options(
            SDK_READY_EVENT,
            on_ready.unchecked_ref(),
            &ready_opts,
        );

        let error_opts = AddEventListenerOptions::new();
        error_opts.set_once(true);
        let reject_on_error = reject.clone();
        let on_error = Closure::once_into_js(move || {
            let _ = reject_on_error.call1(&JsValue::NULL, &JsValue::from_str("script fetch failed"));
        });
        let _ = script.add_event_listener_with_callback_and_add_event_listener_options(
            "error",
            on_error.unchecked_ref(),
            &error_opts,
        );

        let on_timeout = Closure::once_into_js(move || {
            let _ = reject.call1(
                &JsValue::NULL,
                &JsValue::from_str(&format!("ready signal timeout after {timeout_ms}ms")),
            );
        });
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(
            on_timeout.unchecked_ref(),
            timeout_ms as i32,
        );
    })
}

async fn sleep_ms(window: &Window, ms: i32) {
    let promise = Promise::new(&mut |resolve: Function, _reject: Function| {
        let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
    });
    let _ = JsFuture::from(promise).await;
}
