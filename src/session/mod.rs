//! Viewer session
//!
//! Owns exactly one SDK view instance per mount: constructs it against the
//! container element, registers the save bridge and the event observer,
//! and issues the preview request. Teardown drops the callback closures
//! and clears the container so nothing fires against a dead session.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::{Object, Promise, Reflect};
use serde::Serialize;
use thiserror::Error;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::JsValue;
use web_sys::console;

use crate::config::ViewerConfig;
use crate::payload::{SaveSlot, SavedPayload};
use crate::sdk::{Sdk, SdkView};

#[derive(Error, Debug)]
pub enum SessionError {
    #[error("No document available")]
    NoDom,

    #[error("Container element #{0} not found")]
    ContainerMissing(String),

    #[error("Failed to construct viewer instance: {0}")]
    Construct(String),

    #[error("Failed to register viewer callback: {0}")]
    Register(String),

    #[error("Preview request failed: {0}")]
    Preview(String),
}

fn js_msg(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Shared save slot: the save bridge writes it, the export path reads it.
pub type SharedSlot = Rc<RefCell<SaveSlot>>;

type SaveBridgeFn = dyn FnMut(JsValue, JsValue, JsValue, JsValue) -> JsValue;

pub struct ViewerSession {
    view: SdkView,
    config: ViewerConfig,
    slot: SharedSlot,
    zoom: Rc<Cell<Option<f64>>>,
    // Closures handed to the SDK. Dropping them on teardown invalidates
    // the SDK-held handles, which is what stops further callbacks.
    save_bridge: Option<Closure<SaveBridgeFn>>,
    event_observer: Option<Closure<dyn FnMut(JsValue)>>,
}

impl ViewerSession {
    /// Build the session: one view instance, both callbacks, one preview
    /// request.
    pub fn create(sdk: &Sdk, config: ViewerConfig) -> Result<Self, SessionError> {
        let document = web_sys::window()
            .and_then(|w| w.document())
            .ok_or(SessionError::NoDom)?;
        if document.get_element_by_id(&config.container_id).is_none() {
            return Err(SessionError::ContainerMissing(config.container_id.clone()));
        }

        let view = sdk
            .create_view(&config.client_id, &config.container_id)
            .map_err(|e| SessionError::Construct(js_msg(e)))?;

        let mut session = Self {
            view,
            config,
            slot: Rc::new(RefCell::new(SaveSlot::new())),
            zoom: Rc::new(Cell::new(None)),
            save_bridge: None,
            event_observer: None,
        };
        session.register_save_bridge(sdk)?;
        session.register_event_observer(sdk);
        session.request_preview()?;
        Ok(session)
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn slot(&self) -> &SharedSlot {
        &self.slot
    }

    /// Last zoom level reported by the event observer.
    pub fn current_zoom(&self) -> Option<f64> {
        self.zoom.get()
    }

    /// Stop listening and release the container.
    ///
    /// The save slot is cleared here and only here; a retained payload
    /// never outlives its session.
    pub fn teardown(&mut self) {
        self.save_bridge = None;
        self.event_observer = None;
        self.slot.borrow_mut().clear();
        self.zoom.set(None);
        if let Some(document) = web_sys::window().and_then(|w| w.document()) {
            if let Some(container) = document.get_element_by_id(&self.config.container_id) {
                container.set_inner_html("");
            }
        }
    }

    /// Register the save bridge under the SDK's save category.
    ///
    /// Every invocation is acknowledged with a resolved promise carrying
    /// the SDK's success code and echoing the file metadata, even when
    /// the payload itself is rejected. A missing acknowledgment stalls
    /// the SDK's save cycle.
    fn register_save_bridge(&mut self, sdk: &Sdk) -> Result<(), SessionError> {
        let slot = Rc::clone(&self.slot);
        let success = sdk.success_code();

        let bridge = Closure::wrap(Box::new(
            move |meta: JsValue, content: JsValue, _options: JsValue, _extra: JsValue| -> JsValue {
                match SavedPayload::from_js(&content) {
                    Ok(payload) => {
                        let diag =
                            serde_wasm_bindgen::from_value::<serde_json::Value>(meta.clone()).ok();
                        slot.borrow_mut().replace(payload, js_sys::Date::now(), diag);
                    }
                    Err(e) => {
                        console::warn_1(&JsValue::from_str(&format!(
                            "save payload rejected: {e}"
                        )));
                    }
                }

                let response = Object::new();
                let _ = Reflect::set(&response, &JsValue::from_str("code"), &success);
                let data = Object::new();
                let _ = Reflect::set(&data, &JsValue::from_str("metaData"), &meta);
                let _ = Reflect::set(&response, &JsValue::from_str("data"), &data);
                Promise::resolve(&JsValue::from(response)).into()
            },
        ) as Box<SaveBridgeFn>);

        let options = serde_wasm_bindgen::to_value(&self.config.save)
            .map_err(|e| SessionError::Register(e.to_string()))?;
        self.view.register_callback(
            &sdk.callback_category("SAVE_API"),
            bridge.as_ref(),
            &options,
        );
        self.save_bridge = Some(bridge);
        Ok(())
    }

    /// Register the zoom observer under the SDK's event-listener category.
    /// Read-only diagnostics; never part of the persistence path.
    fn register_event_observer(&mut self, sdk: &Sdk) {
        let zoom = Rc::clone(&self.zoom);
        let observer = Closure::wrap(Box::new(move |event: JsValue| {
            let kind = Reflect::get(&event, &JsValue::from_str("type"))
                .ok()
                .and_then(|v| v.as_string());
            if kind.as_deref() == Some("PAGE_ZOOM") {
                let level = Reflect::get(&event, &JsValue::from_str("data"))
                    .ok()
                    .and_then(|d| Reflect::get(&d, &JsValue::from_str("zoom")).ok())
                    .and_then(|z| z.as_f64());
                if let Some(level) = level {
                    zoom.set(Some(level));
                    console::debug_1(&JsValue::from_str(&format!("zoom level: {level}")));
                }
            }
        }) as Box<dyn FnMut(JsValue)>);

        let options = Object::new();
        let _ = Reflect::set(
            &options,
            &JsValue::from_str("enablePDFAnalytics"),
            &JsValue::TRUE,
        );
        self.view.register_callback(
            &sdk.callback_category("EVENT_LISTENER"),
            observer.as_ref(),
            &options.into(),
        );
        self.event_observer = Some(observer);
    }

    fn request_preview(&self) -> Result<(), SessionError> {
        let file_name = self
            .config
            .file_name
            .clone()
            .unwrap_or_else(|| self.config.document_url.clone());
        let file_id = self
            .config
            .file_id
            .clone()
            .unwrap_or_else(|| "document".to_string());
        let descriptor = FileDescriptor {
            content: FileContent {
                location: ContentLocation {
                    url: &self.config.document_url,
                },
            },
            meta_data: FileMeta {
                file_name: &file_name,
                id: &file_id,
            },
        };

        let descriptor = serde_wasm_bindgen::to_value(&descriptor)
            .map_err(|e| SessionError::Preview(e.to_string()))?;
        let display = serde_wasm_bindgen::to_value(&self.config.display)
            .map_err(|e| SessionError::Preview(e.to_string()))?;
        // The returned promise resolves once the SDK has taken over
        // rendering; the session does not wait on it.
        let _ = self.view.preview_file(&descriptor, &display);
        Ok(())
    }
}

/// `previewFile` content descriptor.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileDescriptor<'a> {
    content: FileContent<'a>,
    meta_data: FileMeta<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileContent<'a> {
    location: ContentLocation<'a>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ContentLocation<'a> {
    url: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileMeta<'a> {
    file_name: &'a str,
    id: &'a str,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_serializes_sdk_shape() {
        let descriptor = FileDescriptor {
            content: FileContent {
                location: ContentLocation { url: "/sample.pdf" },
            },
            meta_data: FileMeta {
                file_name: "/sample.pdf",
                id: "document",
            },
        };
        let value = serde_json::to_value(&descriptor).unwrap();
        assert_eq!(value["content"]["location"]["url"], "/sample.pdf");
        assert_eq!(value["metaData"]["fileName"], "/sample.pdf");
        assert_eq!(value["metaData"]["id"], "document");
    }
}
