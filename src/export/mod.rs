//! Client-side download of the retained document
//!
//! Converts decoded document bytes into a one-shot browser download named
//! `document.pdf`. The temporary object URL is revoked on every path once
//! the download has been triggered.

use js_sys::{Array, Uint8Array};
use thiserror::Error;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{Blob, BlobPropertyBag, Document, HtmlAnchorElement, Url};

/// Deterministic name for the exported file.
pub const EXPORT_FILE_NAME: &str = "document.pdf";
pub const EXPORT_MIME: &str = "application/pdf";

#[derive(Error, Debug)]
pub enum ExportError {
    #[error("No document window available")]
    NoWindow,

    #[error("Failed to build download blob: {0}")]
    Blob(String),

    #[error("Failed to create object URL: {0}")]
    ObjectUrl(String),

    #[error("Failed to trigger download: {0}")]
    Trigger(String),
}

fn js_msg(value: JsValue) -> String {
    value
        .as_string()
        .unwrap_or_else(|| format!("{:?}", value))
}

/// Trigger a browser download of `bytes` as `document.pdf`.
pub fn download_pdf(bytes: &[u8]) -> Result<(), ExportError> {
    let window = web_sys::window().ok_or(ExportError::NoWindow)?;
    let document = window.document().ok_or(ExportError::NoWindow)?;

    let parts = Array::new();
    parts.push(&Uint8Array::from(bytes));
    let options = BlobPropertyBag::new();
    options.set_type(EXPORT_MIME);
    let blob = Blob::new_with_u8_array_sequence_and_options(&parts, &options)
        .map_err(|e| ExportError::Blob(js_msg(e)))?;

    let url = Url::create_object_url_with_blob(&blob)
        .map_err(|e| ExportError::ObjectUrl(js_msg(e)))?;
    let result = click_download_anchor(&document, &url);
    let _ = Url::revoke_object_url(&url);
    result
}

fn click_download_anchor(document: &Document, url: &str) -> Result<(), ExportError> {
    let anchor: HtmlAnchorElement = document
        .create_element("a")
        .map_err(|e| ExportError::Trigger(js_msg(e)))?
        .dyn_into()
        .map_err(|_| ExportError::Trigger("not an anchor element".into()))?;
    anchor.set_href(url);
    anchor.set_download(EXPORT_FILE_NAME);

    let body = document.body().ok_or_else(|| {
        ExportError::Trigger("document has no body".into())
    })?;
    body.append_child(&anchor)
        .map_err(|e| ExportError::Trigger(js_msg(e)))?;
    anchor.click();
    anchor.remove();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_name_is_deterministic() {
        assert_eq!(EXPORT_FILE_NAME, "document.pdf");
        assert_eq!(EXPORT_MIME, "application/pdf");
    }
}
