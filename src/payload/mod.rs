//! Saved document payload
//!
//! Models the loosely-typed content value the SDK's save callback delivers
//! as an explicit tagged union, so the decode step is testable without the
//! SDK, and retains at most one saved document (most-recent-wins).

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};

#[derive(Error, Debug)]
pub enum PayloadError {
    #[error("No saved document yet")]
    NothingSaved,

    #[error("Unsupported save payload shape: {0}")]
    Unsupported(String),

    #[error("Base64 decode failed: {0}")]
    Decode(#[from] base64::DecodeError),
}

/// Document content as delivered by the viewer's save callback.
#[derive(Debug, Clone, PartialEq)]
pub enum SavedPayload {
    /// Raw document bytes (ArrayBuffer or typed array from the SDK).
    Binary(Vec<u8>),
    /// Base64-encoded document text.
    Base64Text(String),
}

impl SavedPayload {
    /// Classify the content value of a save event.
    pub fn from_js(content: &JsValue) -> Result<Self, PayloadError> {
        if let Some(text) = content.as_string() {
            return Ok(SavedPayload::Base64Text(text));
        }
        if let Some(buffer) = content.dyn_ref::<js_sys::ArrayBuffer>() {
            return Ok(SavedPayload::Binary(js_sys::Uint8Array::new(buffer).to_vec()));
        }
        if let Some(array) = content.dyn_ref::<js_sys::Uint8Array>() {
            return Ok(SavedPayload::Binary(array.to_vec()));
        }
        Err(PayloadError::Unsupported(format!("{:?}", content)))
    }

    /// Decode to raw document bytes.
    ///
    /// Text payloads go through a real base64 decode; a decode failure is
    /// an error, never a zero-filled buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>, PayloadError> {
        match self {
            SavedPayload::Binary(bytes) => Ok(bytes.clone()),
            SavedPayload::Base64Text(text) => {
                // Some SDK builds hand back a data URL instead of bare base64.
                let encoded = match text.split_once(',') {
                    Some((prefix, rest)) if prefix.starts_with("data:") => rest,
                    _ => text.as_str(),
                };
                Ok(BASE64.decode(encoded.trim())?)
            }
        }
    }
}

/// One saved document with its timestamp and the SDK's file metadata.
#[derive(Debug, Clone)]
pub struct SavedRecord {
    pub payload: SavedPayload,
    /// Milliseconds since the epoch at the moment the save arrived.
    pub saved_at_ms: f64,
    /// File metadata the SDK sent alongside the content, kept for
    /// diagnostics.
    pub meta: Option<serde_json::Value>,
}

/// Single-slot store for the most recent save.
///
/// Payload and timestamp live in one record and are replaced as a unit, so
/// they can never be observed out of sync. Repeated autosaves only ever
/// occupy this one slot.
#[derive(Debug, Default)]
pub struct SaveSlot {
    record: Option<SavedRecord>,
}

impl SaveSlot {
    pub fn new() -> Self {
        Self { record: None }
    }

    /// Replace the retained record with a newer save.
    pub fn replace(
        &mut self,
        payload: SavedPayload,
        saved_at_ms: f64,
        meta: Option<serde_json::Value>,
    ) {
        self.record = Some(SavedRecord {
            payload,
            saved_at_ms,
            meta,
        });
    }

    pub fn record(&self) -> Option<&SavedRecord> {
        self.record.as_ref()
    }

    pub fn saved_at_ms(&self) -> Option<f64> {
        self.record.as_ref().map(|r| r.saved_at_ms)
    }

    pub fn has_record(&self) -> bool {
        self.record.is_some()
    }

    /// Decoded bytes of the retained payload.
    pub fn bytes(&self) -> Result<Vec<u8>, PayloadError> {
        self.record
            .as_ref()
            .ok_or(PayloadError::NothingSaved)?
            .payload
            .to_bytes()
    }

    /// Drop the retained record. Only session teardown calls this.
    pub fn clear(&mut self) {
        self.record = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base64_fixture_decodes_to_pdf_prefix() {
        let payload = SavedPayload::Base64Text("JVBERi0x".to_string());
        assert_eq!(payload.to_bytes().unwrap(), b"%PDF-1");
    }

    #[test]
    fn test_base64_decode_matches_reference_decoder() {
        let payload = SavedPayload::Base64Text("JVBERi0x".to_string());
        let reference = BASE64.decode("JVBERi0x").unwrap();
        assert_eq!(payload.to_bytes().unwrap(), reference);
    }

    #[test]
    fn test_data_url_prefix_is_stripped() {
        let payload =
            SavedPayload::Base64Text("data:application/pdf;base64,JVBERi0x".to_string());
        assert_eq!(payload.to_bytes().unwrap(), b"%PDF-1");
    }

    #[test]
    fn test_binary_payload_passes_through() {
        let payload = SavedPayload::Binary(vec![0x25, 0x50, 0x44, 0x46]);
        assert_eq!(payload.to_bytes().unwrap(), vec![0x25, 0x50, 0x44, 0x46]);
    }

    #[test]
    fn test_invalid_base64_is_an_error_not_zeros() {
        let payload = SavedPayload::Base64Text("not base64 at all!!".to_string());
        assert!(matches!(payload.to_bytes(), Err(PayloadError::Decode(_))));
    }

    #[test]
    fn test_empty_slot_reports_nothing_saved() {
        let slot = SaveSlot::new();
        assert!(!slot.has_record());
        assert!(matches!(slot.bytes(), Err(PayloadError::NothingSaved)));
        assert!(slot.saved_at_ms().is_none());
    }

    #[test]
    fn test_most_recent_save_wins() {
        let mut slot = SaveSlot::new();
        slot.replace(SavedPayload::Base64Text("AAAA".into()), 1_000.0, None);
        slot.replace(SavedPayload::Base64Text("JVBERi0x".into()), 2_000.0, None);
        slot.replace(SavedPayload::Binary(b"%PDF-2".to_vec()), 3_000.0, None);
        assert_eq!(slot.bytes().unwrap(), b"%PDF-2");
        assert_eq!(slot.saved_at_ms(), Some(3_000.0));
    }

    #[test]
    fn test_payload_and_timestamp_replaced_together() {
        let mut slot = SaveSlot::new();
        slot.replace(SavedPayload::Base64Text("JVBERi0x".into()), 1_000.0, None);
        let first = slot.record().unwrap().clone();
        slot.replace(SavedPayload::Binary(b"%PDF-2".to_vec()), 2_000.0, None);
        let second = slot.record().unwrap();
        assert_ne!(first.saved_at_ms, second.saved_at_ms);
        assert_ne!(first.payload, second.payload);
    }

    #[test]
    fn test_clear_empties_the_slot() {
        let mut slot = SaveSlot::new();
        slot.replace(SavedPayload::Base64Text("JVBERi0x".into()), 1_000.0, None);
        slot.clear();
        assert!(!slot.has_record());
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::wasm_bindgen_test;

    #[wasm_bindgen_test]
    fn classifies_string_as_base64_text() {
        let value = JsValue::from_str("JVBERi0x");
        let payload = SavedPayload::from_js(&value).unwrap();
        assert_eq!(payload, SavedPayload::Base64Text("JVBERi0x".to_string()));
    }

    #[wasm_bindgen_test]
    fn classifies_typed_array_as_binary() {
        let array = js_sys::Uint8Array::from(&b"%PDF-1"[..]);
        let payload = SavedPayload::from_js(&array.into()).unwrap();
        assert_eq!(payload, SavedPayload::Binary(b"%PDF-1".to_vec()));
    }

    #[wasm_bindgen_test]
    fn rejects_unclassifiable_content() {
        assert!(SavedPayload::from_js(&JsValue::NULL).is_err());
    }
}
