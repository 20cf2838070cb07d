//! PDF Embed
//!
//! A WASM-based integration layer for the hosted Adobe DC View SDK:
//! - one-shot loading of the hosted viewer script, with bounded retry
//! - a viewer session bound to a container element
//! - a save bridge retaining the most recently saved document
//! - a client-side "download last saved state" export
//!
//! Rendering, annotation, and form filling all happen inside the hosted
//! SDK; this crate only wires it to the page.

use wasm_bindgen::prelude::*;

pub mod config;
pub mod export;
pub mod payload;
pub mod sdk;
pub mod session;

// Re-export common types
pub use config::{DisplayOptions, SaveOptions, ViewerConfig};
pub use payload::{PayloadError, SaveSlot, SavedPayload};
pub use session::ViewerSession;

/// Initialize the WASM module
/// Call this before using any other functions
#[wasm_bindgen(start)]
pub fn init() {
    // Set up better panic messages in debug mode
    #[cfg(feature = "console_error_panic_hook")]
    console_error_panic_hook::set_once();
}

/// Component lifecycle state, surfaced to the hosting page so a failed
/// load shows as "unavailable" instead of a silent hang.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ViewerStatus {
    Unmounted,
    Loading,
    Ready,
    Unavailable,
}

impl ViewerStatus {
    fn as_str(self) -> &'static str {
        match self {
            ViewerStatus::Unmounted => "unmounted",
            ViewerStatus::Loading => "loading",
            ViewerStatus::Ready => "ready",
            ViewerStatus::Unavailable => "unavailable",
        }
    }
}

/// Embedded PDF viewer bound to one container element
#[wasm_bindgen]
pub struct PdfViewer {
    config: ViewerConfig,
    loader: sdk::SdkLoader,
    session: Option<ViewerSession>,
    status: ViewerStatus,
}

#[wasm_bindgen]
impl PdfViewer {
    /// Create a viewer from a JS configuration object; missing fields
    /// fall back to the defaults.
    #[wasm_bindgen(constructor)]
    pub fn new(config: JsValue) -> Result<PdfViewer, JsValue> {
        let config: ViewerConfig = if config.is_undefined() || config.is_null() {
            ViewerConfig::default()
        } else {
            serde_wasm_bindgen::from_value(config)
                .map_err(|e| JsValue::from_str(&e.to_string()))?
        };
        config
            .validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Self {
            config,
            loader: sdk::SdkLoader::new(),
            session: None,
            status: ViewerStatus::Unmounted,
        })
    }

    /// Mount the viewer into its container.
    ///
    /// Loads the hosted script if needed, creates the session, registers
    /// the callbacks and requests the preview. A second call with a live
    /// session is a no-op: one viewer instance per mount lifecycle.
    pub async fn mount(&mut self) -> Result<(), JsValue> {
        if self.session.is_some() {
            return Ok(());
        }
        self.status = ViewerStatus::Loading;

        let sdk = match self.loader.ensure_loaded().await {
            Ok(sdk) => sdk,
            Err(e) => {
                self.status = ViewerStatus::Unavailable;
                return Err(JsValue::from_str(&e.to_string()));
            }
        };
        match ViewerSession::create(&sdk, self.config.clone()) {
            Ok(session) => {
                self.session = Some(session);
                self.status = ViewerStatus::Ready;
                Ok(())
            }
            Err(e) => {
                self.status = ViewerStatus::Unavailable;
                Err(JsValue::from_str(&e.to_string()))
            }
        }
    }

    /// Apply a new configuration.
    ///
    /// An unchanged configuration with a live session is a no-op; any
    /// change tears the previous session down fully before mounting the
    /// new one, so callbacks are never registered twice.
    pub async fn reconfigure(&mut self, config: JsValue) -> Result<(), JsValue> {
        let next: ViewerConfig = serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        next.validate()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        if next == self.config && self.session.is_some() {
            return Ok(());
        }
        self.unmount();
        self.config = next;
        self.mount().await
    }

    /// Tear down the session, clear the retained payload and remove the
    /// injected script tag.
    pub fn unmount(&mut self) {
        if let Some(mut session) = self.session.take() {
            session.teardown();
        }
        self.loader.remove_script();
        self.status = ViewerStatus::Unmounted;
    }

    /// Download the most recently saved document as "document.pdf".
    #[wasm_bindgen(js_name = "exportPdf")]
    pub fn export_pdf(&self) -> Result<(), JsValue> {
        let bytes = self
            .saved_bytes_inner()
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        export::download_pdf(&bytes).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Decoded bytes of the most recent save.
    #[wasm_bindgen(js_name = "savedBytes")]
    pub fn saved_bytes(&self) -> Result<Vec<u8>, JsValue> {
        self.saved_bytes_inner()
            .map_err(|e| JsValue::from_str(&e.to_string()))
    }

    /// Whether a save event has delivered content since the last mount.
    #[wasm_bindgen(js_name = "hasSaved")]
    pub fn has_saved(&self) -> bool {
        self.session
            .as_ref()
            .map(|s| s.slot().borrow().has_record())
            .unwrap_or(false)
    }

    /// ISO-8601 timestamp of the most recent save, if any.
    #[wasm_bindgen(js_name = "lastSavedAt")]
    pub fn last_saved_at(&self) -> Option<String> {
        let ms = self.session.as_ref()?.slot().borrow().saved_at_ms()?;
        let date = js_sys::Date::new(&JsValue::from_f64(ms));
        Some(String::from(date.to_iso_string()))
    }

    /// Last observed zoom level. Diagnostics only.
    #[wasm_bindgen(js_name = "currentZoom")]
    pub fn current_zoom(&self) -> Option<f64> {
        self.session.as_ref().and_then(|s| s.current_zoom())
    }

    /// Lifecycle state: "unmounted" | "loading" | "ready" | "unavailable".
    pub fn status(&self) -> String {
        self.status.as_str().to_string()
    }

    fn saved_bytes_inner(&self) -> Result<Vec<u8>, PayloadError> {
        match &self.session {
            Some(session) => session.slot().borrow().bytes(),
            None => Err(PayloadError::NothingSaved),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_labels() {
        assert_eq!(ViewerStatus::Unmounted.as_str(), "unmounted");
        assert_eq!(ViewerStatus::Loading.as_str(), "loading");
        assert_eq!(ViewerStatus::Ready.as_str(), "ready");
        assert_eq!(ViewerStatus::Unavailable.as_str(), "unavailable");
    }

    // One save of "JVBERi0x", then export: the export path must see the
    // decoded bytes under the fixed file name.
    #[test]
    fn test_save_then_export_scenario() {
        let mut slot = SaveSlot::new();
        slot.replace(SavedPayload::Base64Text("JVBERi0x".into()), 1_000.0, None);
        assert_eq!(slot.bytes().unwrap(), b"%PDF-1");
        assert_eq!(export::EXPORT_FILE_NAME, "document.pdf");
    }

    #[test]
    fn test_export_before_any_save_is_a_clear_error() {
        let slot = SaveSlot::new();
        assert!(matches!(slot.bytes(), Err(PayloadError::NothingSaved)));
    }
}
