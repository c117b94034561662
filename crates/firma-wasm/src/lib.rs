//! WASM bridge for Firma: binds the signature pad to an HTML canvas.
//!
//! Compiled via `wasm-pack build --target web` and loaded by the attendee and
//! trainer registration pages. The page owns the form and the network; this
//! crate owns the pad, its pixels, and the pure form/status helpers.

mod bridge;
mod dom;

use bridge::SharedBinding;
use firma_core::config::PadConfig;
use firma_core::form::{FormSchema, FormValues};
use firma_core::status::{StatusChange, StatusTracker, SystemStatus};
use serde_json::json;
use wasm_bindgen::prelude::*;
use web_sys::{HtmlCanvasElement, HtmlElement};

/// Handle to a canvas-bound signature pad.
///
/// Binding the same canvas twice yields a handle to the same pad.
#[wasm_bindgen]
pub struct SignaturePadHandle {
    binding: SharedBinding,
}

#[wasm_bindgen]
impl SignaturePadHandle {
    /// Bind a pad to `canvas`. `error_element` is the "please sign" message
    /// toggled by `require_signature` and `clear`. `config_json` is an
    /// optional `PadConfig` document.
    #[wasm_bindgen(constructor)]
    pub fn new(
        canvas: HtmlCanvasElement,
        error_element: Option<HtmlElement>,
        config_json: Option<String>,
    ) -> Result<SignaturePadHandle, JsValue> {
        setup();
        let config = match config_json.as_deref() {
            Some(json) => PadConfig::from_json(json).map_err(|e| JsValue::from_str(&e))?,
            None => PadConfig::default(),
        };
        let binding = bridge::bind(canvas, error_element, config)?;
        Ok(Self { binding })
    }

    /// `true` once any stroke has been drawn since the last clear.
    pub fn has_content(&self) -> bool {
        self.binding.borrow().field.pad().has_content()
    }

    pub fn is_drawing(&self) -> bool {
        self.binding.borrow().field.pad().is_drawing()
    }

    /// Erase the pad and hide the validation message.
    pub fn clear(&self) {
        let mut b = self.binding.borrow_mut();
        b.field.clear();
        b.redraw();
    }

    /// The signature as a `data:image/png;base64,...` URL.
    pub fn export_data_url(&self) -> Result<String, JsValue> {
        self.binding
            .borrow()
            .field
            .pad()
            .export_data_url()
            .map_err(|e| JsValue::from_str(&e))
    }

    /// Submission precondition. When the pad is empty, shows the validation
    /// message, scrolls the pad into view, and returns `false`.
    pub fn require_signature(&self) -> bool {
        let mut b = self.binding.borrow_mut();
        if b.field.require() {
            return true;
        }
        dom::scroll_into_view(&b.canvas);
        false
    }

    /// Re-measure the canvas now instead of waiting for a window resize.
    pub fn refresh_layout(&self) {
        self.binding.borrow_mut().resize_now();
    }
}

fn setup() {
    #[cfg(target_arch = "wasm32")]
    {
        use std::sync::Once;
        static SET_HOOK: Once = Once::new();
        SET_HOOK.call_once(|| {
            std::panic::set_hook(Box::new(|info| {
                let msg = format!("Firma WASM panic: {info}");
                web_sys::console::error_1(&msg.into());
            }));
            if console_log::init_with_level(log::Level::Info).is_err() {
                web_sys::console::warn_1(&"Firma: logger already set".into());
            }
        });
    }
}

// ─── Standalone helpers (no canvas needed) ───────────────────────────────

fn schema_from(spec: &str) -> Result<FormSchema, String> {
    match FormSchema::preset(spec) {
        Some(schema) => Ok(schema),
        None => FormSchema::from_json(spec),
    }
}

/// Validate form values against a schema, given either a preset name
/// (`"attendee"`, `"trainer"`) or a schema document.
///
/// Returns JSON: `{"ok":true,"valid":[..],"invalid":[..]}` or
/// `{"ok":false,"error":"..."}`.
#[wasm_bindgen]
pub fn validate_form(schema: &str, values_json: &str) -> String {
    let checked = schema_from(schema).and_then(|schema| {
        let values = FormValues::from_json(values_json)?;
        Ok(schema.validate(&values))
    });
    match checked {
        Ok(report) => json!({
            "ok": report.is_ok(),
            "valid": report.valid,
            "invalid": report.invalid,
        })
        .to_string(),
        Err(e) => json!({ "ok": false, "error": e }).to_string(),
    }
}

/// Assemble the multipart entries for a submission. Fields are not
/// re-validated here; call `validate_form` first.
///
/// Returns JSON: `{"ok":true,"endpoint":"..","entries":[[key,value],..]}`.
#[wasm_bindgen]
pub fn build_payload(schema: &str, values_json: &str, signature: Option<String>) -> String {
    let built = schema_from(schema).and_then(|schema| {
        let values = FormValues::from_json(values_json)?;
        Ok(schema.build_payload(&values, signature.as_deref()))
    });
    match built {
        Ok(payload) => json!({
            "ok": true,
            "endpoint": payload.endpoint,
            "entries": payload
                .entries
                .iter()
                .map(|(k, v)| [k.as_str(), v.as_str()])
                .collect::<Vec<_>>(),
        })
        .to_string(),
        Err(e) => json!({ "ok": false, "error": e }).to_string(),
    }
}

/// Interpret a `/api/estado` response for the page header.
///
/// Returns JSON: `{"ok":true,"open":bool,"message":"..","summary":{..}}`.
/// A body that fails to parse is reported the same way a failed request is.
#[wasm_bindgen]
pub fn parse_status(json: &str) -> String {
    let mut tracker = StatusTracker::new();
    let (ok, change) = match SystemStatus::from_json(json) {
        Ok(status) => (true, tracker.load(status)),
        Err(e) => {
            log::warn!("bad status response: {e}");
            (false, tracker.load_failed())
        }
    };
    match change {
        StatusChange::Changed {
            available,
            message,
            summary,
        } => json!({
            "ok": ok,
            "open": available,
            "message": message,
            "summary": summary,
        })
        .to_string(),
        StatusChange::Unchanged => json!({ "ok": ok, "open": tracker.is_available() }).to_string(),
    }
}

/// Check an uploaded signature image. Returns the rejection message, or `undefined`
/// when the file is acceptable.
#[wasm_bindgen]
pub fn check_upload(mime: &str, size: f64) -> Option<String> {
    firma_core::form::validate_upload(mime, size.max(0.0) as u64).err()
}
