//! Schema-driven registration forms.
//!
//! The public attendee form and the trainer form differ only in their field
//! lists and endpoint, so both are values of one `FormSchema` type. A page
//! instantiates the schema it needs and runs the same validation and payload
//! assembly against it.

use crate::id::FieldId;
use serde::{Deserialize, Serialize};

// ─── Schema ──────────────────────────────────────────────────────────────

/// How a field is rendered. Validation treats all kinds the same way.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldKind {
    Text,
    Select,
    /// Identity document number.
    Document,
}

/// One input of a registration form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldSpec {
    /// Multipart key the value is sent under.
    pub key: FieldId,
    pub label: String,
    pub kind: FieldKind,
    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl FieldSpec {
    pub fn new(key: &'static str, label: &str, kind: FieldKind) -> Self {
        Self {
            key: FieldId::from_static(key),
            label: label.to_string(),
            kind,
            required: true,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }
}

/// A registration form: ordered fields, target endpoint, and whether a
/// handwritten signature must accompany the submission.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FormSchema {
    pub name: String,
    pub endpoint: String,
    pub fields: Vec<FieldSpec>,
    /// Key the exported signature is sent under, if the form takes one.
    #[serde(default)]
    pub signature_field: Option<FieldId>,
    #[serde(default = "default_submit_label")]
    pub submit_label: String,
}

fn default_submit_label() -> String {
    "Registrar".to_string()
}

/// Endpoint every form polls before submitting.
pub const STATUS_ENDPOINT: &str = "/api/estado";

impl FormSchema {
    /// Public attendee self-registration.
    pub fn attendee() -> Self {
        Self {
            name: "attendee".to_string(),
            endpoint: "/api/registrar".to_string(),
            fields: vec![
                FieldSpec::new("nombres_apellidos", "Nombres y apellidos", FieldKind::Text),
                FieldSpec::new("tipodocumento", "Tipo de documento", FieldKind::Select),
                FieldSpec::new("numero_documento", "Número de documento", FieldKind::Document),
                FieldSpec::new("cargo", "Cargo", FieldKind::Text),
                FieldSpec::new("ruta", "Ruta", FieldKind::Text),
                FieldSpec::new("ciudad", "Ciudad", FieldKind::Select),
            ],
            signature_field: Some(FieldId::SIGNATURE),
            submit_label: "Registrar Asistencia".to_string(),
        }
    }

    /// Trainer / instructor self-registration.
    pub fn trainer() -> Self {
        Self {
            name: "trainer".to_string(),
            endpoint: "/api/capacitador/registrar".to_string(),
            fields: vec![FieldSpec::new(
                "nombre_completo",
                "Nombre completo",
                FieldKind::Text,
            )],
            signature_field: Some(FieldId::SIGNATURE),
            submit_label: "Registrar Información".to_string(),
        }
    }

    /// Look up a built-in schema by name.
    pub fn preset(name: &str) -> Option<Self> {
        match name {
            "attendee" => Some(Self::attendee()),
            "trainer" => Some(Self::trainer()),
            _ => None,
        }
    }

    /// Load a schema from JSON.
    ///
    /// # Errors
    /// Returns the serde error message, or a description of a blank or
    /// duplicate key.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let schema: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        for (i, field) in schema.fields.iter().enumerate() {
            if field.key.is_blank() {
                return Err(format!("field {i} of form `{}` has a blank key", schema.name));
            }
            if schema.fields[..i].iter().any(|f| f.key == field.key) {
                return Err(format!("duplicate field `{}` in form `{}`", field.key, schema.name));
            }
            if schema.signature_field.as_ref() == Some(&field.key) {
                return Err(format!(
                    "field `{}` collides with the signature field",
                    field.key
                ));
            }
        }
        Ok(schema)
    }

    pub fn field(&self, key: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.key == key)
    }

    pub fn requires_signature(&self) -> bool {
        self.signature_field.is_some()
    }

    /// Check every required field is non-empty after trimming.
    pub fn validate(&self, values: &FormValues) -> ValidationReport {
        let mut report = ValidationReport::default();
        for field in &self.fields {
            let filled = values
                .get(field.key.as_str())
                .is_some_and(|v| !v.trim().is_empty());
            if field.required && !filled {
                report.invalid.push(field.key.clone());
            } else if filled {
                report.valid.push(field.key.clone());
            }
        }
        if !report.invalid.is_empty() {
            log::debug!(
                "form `{}`: {} required field(s) empty",
                self.name,
                report.invalid.len()
            );
        }
        report
    }

    /// Assemble the outgoing request body: trimmed field values in schema
    /// order, then the signature under the schema's signature key.
    ///
    /// Values for keys the schema doesn't declare are dropped.
    pub fn build_payload(&self, values: &FormValues, signature: Option<&str>) -> Payload {
        let mut entries: Vec<(FieldId, String)> = self
            .fields
            .iter()
            .filter_map(|f| {
                values
                    .get(f.key.as_str())
                    .map(|v| (f.key.clone(), v.trim().to_string()))
            })
            .collect();
        if let (Some(key), Some(sig)) = (self.signature_field.as_ref(), signature) {
            entries.push((key.clone(), sig.to_string()));
        }
        Payload {
            endpoint: self.endpoint.clone(),
            entries,
        }
    }
}

// ─── Values ──────────────────────────────────────────────────────────────

/// Raw input values keyed by field, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormValues {
    entries: Vec<(FieldId, String)>,
}

impl FormValues {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a value, replacing any previous one for the same key.
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> &mut Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(slot) => slot.1 = value,
            None => self.entries.push((FieldId::new(key), value)),
        }
        self
    }

    pub fn with(mut self, key: &str, value: impl Into<String>) -> Self {
        self.set(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a flat JSON object of string values.
    ///
    /// # Errors
    /// Returns an error if the JSON is not an object of strings.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let value: serde_json::Value = serde_json::from_str(json).map_err(|e| e.to_string())?;
        let obj = value
            .as_object()
            .ok_or_else(|| "form values must be a JSON object".to_string())?;
        let mut values = Self::new();
        for (key, v) in obj {
            let s = v
                .as_str()
                .ok_or_else(|| format!("value for `{key}` must be a string"))?;
            values.set(key, s);
        }
        Ok(values)
    }
}

// ─── Results ─────────────────────────────────────────────────────────────

/// Outcome of `FormSchema::validate`. `invalid` fields get the error marker,
/// `valid` fields the success marker; untouched optional fields get neither.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ValidationReport {
    pub valid: Vec<FieldId>,
    pub invalid: Vec<FieldId>,
}

impl ValidationReport {
    pub fn is_ok(&self) -> bool {
        self.invalid.is_empty()
    }
}

/// Ordered multipart body bound for `endpoint`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payload {
    pub endpoint: String,
    pub entries: Vec<(FieldId, String)>,
}

impl Payload {
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Flat JSON object form, for hosts that post JSON instead of multipart.
    pub fn to_json(&self) -> serde_json::Value {
        let map = self
            .entries
            .iter()
            .map(|(k, v)| (k.as_str().to_string(), serde_json::Value::String(v.clone())))
            .collect::<serde_json::Map<_, _>>();
        serde_json::Value::Object(map)
    }
}

// ─── Uploads ─────────────────────────────────────────────────────────────

/// MIME types accepted for an uploaded signature image.
pub const ALLOWED_UPLOAD_TYPES: [&str; 4] = ["image/png", "image/jpg", "image/jpeg", "image/gif"];

/// Largest accepted upload, in bytes (5 MiB).
pub const MAX_UPLOAD_BYTES: u64 = 5 * 1024 * 1024;

/// Check an uploaded image file before previewing it.
///
/// # Errors
/// Returns the user-facing rejection message.
pub fn validate_upload(mime: &str, size: u64) -> Result<(), String> {
    if !ALLOWED_UPLOAD_TYPES.contains(&mime) {
        return Err("Tipo de archivo no permitido. Use PNG, JPG, JPEG o GIF.".to_string());
    }
    if size > MAX_UPLOAD_BYTES {
        return Err("El archivo es demasiado grande. Máximo 5MB.".to_string());
    }
    Ok(())
}
