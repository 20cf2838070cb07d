//! Viewer session configuration
//!
//! Typed configuration for one viewer session. Every field change forces a
//! full teardown and re-creation of the session, so the whole struct is
//! compared with `PartialEq` rather than diffed field by field.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Hosted viewer script endpoint.
pub const SDK_URL: &str = "https://acrobatservices.adobe.com/view-sdk/viewer.js";

/// DOM id carried by the injected script tag, so re-mounts can find an
/// existing tag instead of injecting a second one.
pub const SDK_SCRIPT_ID: &str = "pdf-embed-sdk";

/// Document event fired by the SDK once its global is usable.
pub const SDK_READY_EVENT: &str = "adobe_dc_view_sdk.ready";

/// Bounded reload policy for the hosted script.
pub const LOAD_ATTEMPTS: u32 = 3;
/// Backoff before the second attempt; doubles per attempt.
pub const INITIAL_BACKOFF_MS: u32 = 500;
/// How long to wait for the ready signal per attempt.
pub const READY_TIMEOUT_MS: u32 = 10_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Configuration for one viewer session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ViewerConfig {
    /// URL of the document to preview.
    pub document_url: String,
    /// Client id issued for the hosted SDK.
    pub client_id: String,
    /// DOM id of the container element the viewer renders into.
    pub container_id: String,
    /// File name shown in the viewer chrome; defaults to the document URL.
    pub file_name: Option<String>,
    /// Stable file id passed to the SDK; defaults to "document".
    pub file_id: Option<String>,
    pub display: DisplayOptions,
    pub save: SaveOptions,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            document_url: "/mypdf.pdf".to_string(),
            client_id: String::new(),
            container_id: "adobe-dc-view".to_string(),
            file_name: None,
            file_id: None,
            display: DisplayOptions::default(),
            save: SaveOptions::default(),
        }
    }
}

impl ViewerConfig {
    /// Reject configurations the SDK would fail on at preview time.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.document_url.is_empty() {
            return Err(ConfigError::Invalid("documentUrl must not be empty".into()));
        }
        if self.client_id.is_empty() {
            return Err(ConfigError::Invalid("clientId must not be empty".into()));
        }
        if self.container_id.is_empty() {
            return Err(ConfigError::Invalid("containerId must not be empty".into()));
        }
        Ok(())
    }
}

/// Display toggles passed through to the SDK's `previewFile` call.
///
/// Field names serialize to the exact keys the SDK expects; two of them
/// break the plain camelCase pattern (`showDownloadPDF`,
/// `enableAnnotationAPIs`) and carry explicit renames.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplayOptions {
    pub show_annotation_tools: bool,
    pub dock_page_controls: bool,
    pub default_view_mode: String,
    #[serde(rename = "showDownloadPDF")]
    pub show_download_pdf: bool,
    pub show_left_hand_panel: bool,
    pub enable_form_filling: bool,
    pub show_save_button: bool,
    #[serde(rename = "enableAnnotationAPIs")]
    pub enable_annotation_apis: bool,
    pub show_page_controls: bool,
    pub show_zoom_control: bool,
    pub disable_text_selection: bool,
}

impl Default for DisplayOptions {
    fn default() -> Self {
        Self {
            show_annotation_tools: false,
            dock_page_controls: false,
            default_view_mode: "FIT_PAGE".to_string(),
            show_download_pdf: false,
            show_left_hand_panel: false,
            enable_form_filling: true,
            show_save_button: true,
            enable_annotation_apis: true,
            show_page_controls: false,
            show_zoom_control: true,
            disable_text_selection: true,
        }
    }
}

/// Options passed when registering the save callback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SaveOptions {
    /// Autosave polling interval in seconds.
    pub auto_save_frequency: f64,
    pub enable_focus_polling: bool,
    pub show_save_button: bool,
}

impl Default for SaveOptions {
    fn default() -> Self {
        Self {
            auto_save_frequency: 0.25,
            enable_focus_polling: true,
            show_save_button: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_display_options() {
        let display = DisplayOptions::default();
        assert!(!display.show_annotation_tools);
        assert!(display.enable_form_filling);
        assert!(display.show_save_button);
        assert!(display.show_zoom_control);
        assert_eq!(display.default_view_mode, "FIT_PAGE");
    }

    #[test]
    fn test_display_options_serialize_sdk_keys() {
        let value = serde_json::to_value(DisplayOptions::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert!(obj.contains_key("showAnnotationTools"));
        assert!(obj.contains_key("showDownloadPDF"));
        assert!(obj.contains_key("enableAnnotationAPIs"));
        assert!(obj.contains_key("disableTextSelection"));
        assert_eq!(obj["defaultViewMode"], "FIT_PAGE");
    }

    #[test]
    fn test_save_options_serialize_sdk_keys() {
        let value = serde_json::to_value(SaveOptions::default()).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj["autoSaveFrequency"], 0.25);
        assert_eq!(obj["enableFocusPolling"], true);
        assert_eq!(obj["showSaveButton"], true);
    }

    #[test]
    fn test_config_deserialize_partial_camel_case() {
        let config: ViewerConfig = serde_json::from_str(
            r#"{"documentUrl": "/sample.pdf", "clientId": "abc123"}"#,
        )
        .unwrap();
        assert_eq!(config.document_url, "/sample.pdf");
        assert_eq!(config.client_id, "abc123");
        assert_eq!(config.container_id, "adobe-dc-view");
        assert!(config.display.enable_form_filling);
    }

    #[test]
    fn test_changed_document_url_compares_unequal() {
        let a = ViewerConfig {
            document_url: "/a.pdf".into(),
            client_id: "abc".into(),
            ..Default::default()
        };
        let mut b = a.clone();
        assert_eq!(a, b);
        b.document_url = "/b.pdf".into();
        assert_ne!(a, b);
    }

    #[test]
    fn test_validate_rejects_empty_client_id() {
        let config = ViewerConfig {
            client_id: String::new(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_accepts_complete_config() {
        let config = ViewerConfig {
            client_id: "abc123".into(),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }
}
