//! JavaScript bindings for the hosted viewer SDK
//!
//! The SDK global (`window.AdobeDC.View`) only exists after the hosted
//! script has loaded and fired its ready event, so the handle is looked up
//! dynamically instead of bound at module instantiation. Methods on a view
//! instance are structural.

use js_sys::{Array, Function, Object, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

/// Name of the SDK global on `window`.
pub const SDK_GLOBAL: &str = "AdobeDC";

#[wasm_bindgen]
extern "C" {
    /// One viewer instance bound to a container element.
    pub type SdkView;

    #[wasm_bindgen(method, structural, js_name = registerCallback)]
    pub fn register_callback(
        this: &SdkView,
        category: &JsValue,
        handler: &JsValue,
        options: &JsValue,
    );

    #[wasm_bindgen(method, structural, js_name = previewFile)]
    pub fn preview_file(this: &SdkView, descriptor: &JsValue, options: &JsValue) -> Promise;
}

/// Handle to the loaded SDK namespace.
#[derive(Clone)]
pub struct Sdk {
    view_ctor: Function,
}

impl Sdk {
    /// Look up the SDK on `window`, if its script has loaded and announced
    /// readiness.
    pub fn from_window(window: &web_sys::Window) -> Option<Self> {
        let global: &JsValue = window.as_ref();
        let namespace = Reflect::get(global, &JsValue::from_str(SDK_GLOBAL)).ok()?;
        if namespace.is_undefined() || namespace.is_null() {
            return None;
        }
        let view = Reflect::get(&namespace, &JsValue::from_str("View")).ok()?;
        view.dyn_into::<Function>().ok().map(|view_ctor| Self { view_ctor })
    }

    /// Construct a viewer instance bound to `{clientId, divId}`.
    pub fn create_view(&self, client_id: &str, container_id: &str) -> Result<SdkView, JsValue> {
        let init = Object::new();
        Reflect::set(&init, &JsValue::from_str("clientId"), &JsValue::from_str(client_id))?;
        Reflect::set(&init, &JsValue::from_str("divId"), &JsValue::from_str(container_id))?;
        let args = Array::of1(&init);
        let view = Reflect::construct(&self.view_ctor, &args)?;
        Ok(view.unchecked_into::<SdkView>())
    }

    /// Callback category constant (`SAVE_API`, `EVENT_LISTENER`, ...).
    /// Falls back to the literal name if the enum object is absent.
    pub fn callback_category(&self, name: &str) -> JsValue {
        self.enum_value(&["Enum", "CallbackType", name])
            .unwrap_or_else(|| JsValue::from_str(name))
    }

    /// The success code save acknowledgments must carry.
    pub fn success_code(&self) -> JsValue {
        self.enum_value(&["Enum", "ApiResponseCode", "SUCCESS"])
            .unwrap_or_else(|| JsValue::from_str("SUCCESS"))
    }

    fn enum_value(&self, path: &[&str]) -> Option<JsValue> {
        let mut current: JsValue = self.view_ctor.clone().into();
        for key in path {
            current = Reflect::get(&current, &JsValue::from_str(key)).ok()?;
            if current.is_undefined() || current.is_null() {
                return None;
            }
        }
        Some(current)
    }
}
