//! Page view-model for the registration forms.
//!
//! A `RegistrationPage` is built once at page load from a `FormSchema` and
//! the UI bindings that page actually has. Optional bindings (the signature
//! pad, its error message) are `Option`s resolved at construction, so the
//! submit flow never re-queries the page.

use crate::pad::SignaturePad;
use firma_core::form::{FormSchema, FormValues, Payload, ValidationReport};
use firma_core::status::{StatusChange, StatusTracker, SystemStatus};

/// A page element that can be toggled visible, such as the
/// "please sign" message under the pad.
pub trait Indicator {
    fn show(&mut self);
    fn hide(&mut self);
}

// ─── Signature field ─────────────────────────────────────────────────────

/// The pad plus its optional validation message.
pub struct SignatureField {
    pad: SignaturePad,
    error: Option<Box<dyn Indicator>>,
}

impl SignatureField {
    pub fn new(pad: SignaturePad, error: Option<Box<dyn Indicator>>) -> Self {
        Self { pad, error }
    }

    pub fn pad(&self) -> &SignaturePad {
        &self.pad
    }

    pub fn pad_mut(&mut self) -> &mut SignaturePad {
        &mut self.pad
    }

    /// Clear the pad and hide the validation message.
    pub fn clear(&mut self) {
        self.pad.clear();
        if let Some(error) = self.error.as_mut() {
            error.hide();
        }
    }

    /// Submission precondition. Shows the validation message and returns
    /// `false` when nothing has been drawn.
    pub fn require(&mut self) -> bool {
        if self.pad.has_content() {
            return true;
        }
        log::debug!("submission blocked: signature missing");
        if let Some(error) = self.error.as_mut() {
            error.show();
        }
        false
    }
}

// ─── Submission ──────────────────────────────────────────────────────────

/// Why a submission did not go out.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitBlocked {
    /// A previous submission is still in flight.
    Busy,
    /// Required fields are empty.
    Fields(ValidationReport),
    /// The form needs a signature and none was drawn. The host should scroll
    /// the pad into view.
    MissingSignature,
    /// Registration is closed. Carries the server's message and what the
    /// fresh status changed, so the host can re-render the header.
    Unavailable {
        message: String,
        change: StatusChange,
    },
    /// The signature could not be exported.
    Export(String),
}

impl SubmitBlocked {
    /// Notification text shown to the user.
    pub fn message(&self) -> String {
        match self {
            Self::Busy => "Registro en curso, espere un momento.".to_string(),
            Self::Fields(_) => "Por favor complete todos los campos obligatorios.".to_string(),
            Self::MissingSignature => {
                "Por favor firme en el recuadro antes de continuar.".to_string()
            }
            Self::Unavailable { message, .. } => message.clone(),
            Self::Export(_) => "Error al procesar la firma. Intente nuevamente.".to_string(),
        }
    }
}

/// Everything one registration page binds together.
pub struct RegistrationPage {
    schema: FormSchema,
    status: StatusTracker,
    signature: Option<SignatureField>,
    submitting: bool,
}

impl RegistrationPage {
    pub fn new(schema: FormSchema, signature: Option<SignatureField>) -> Self {
        if schema.requires_signature() && signature.is_none() {
            log::warn!(
                "form `{}` takes a signature but the page has no pad; submitting without one",
                schema.name
            );
        }
        Self {
            schema,
            status: StatusTracker::new(),
            signature,
            submitting: false,
        }
    }

    pub fn schema(&self) -> &FormSchema {
        &self.schema
    }

    pub fn status(&self) -> &StatusTracker {
        &self.status
    }

    pub fn status_mut(&mut self) -> &mut StatusTracker {
        &mut self.status
    }

    pub fn signature(&self) -> Option<&SignatureField> {
        self.signature.as_ref()
    }

    pub fn signature_mut(&mut self) -> Option<&mut SignatureField> {
        self.signature.as_mut()
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    /// Run the submit checks in page order: fields, signature, availability
    /// (from a status fetched just before submitting), then export. On
    /// success the page is marked as submitting until `finish_submit`.
    pub fn submit(
        &mut self,
        values: &FormValues,
        fresh_status: &SystemStatus,
    ) -> Result<Payload, SubmitBlocked> {
        if self.submitting {
            return Err(SubmitBlocked::Busy);
        }

        let report = self.schema.validate(values);
        if !report.is_ok() {
            return Err(SubmitBlocked::Fields(report));
        }

        if let Some(field) = self.signature.as_mut()
            && !field.require()
        {
            return Err(SubmitBlocked::MissingSignature);
        }

        if !fresh_status.disponible {
            let message = fresh_status
                .mensaje
                .clone()
                .unwrap_or_else(|| "El formulario no está disponible".to_string());
            let change = self.status.poll(fresh_status.clone());
            return Err(SubmitBlocked::Unavailable { message, change });
        }

        let signature = match self.signature.as_ref() {
            Some(field) => Some(field.pad().export_data_url().map_err(|e| {
                log::error!("signature export failed: {e}");
                SubmitBlocked::Export(e)
            })?),
            None => None,
        };

        self.submitting = true;
        Ok(self.schema.build_payload(values, signature.as_deref()))
    }

    /// The request finished. A successful submission resets the pad for the
    /// next entry; a failed one leaves it so the user can retry.
    pub fn finish_submit(&mut self, succeeded: bool) {
        self.submitting = false;
        if succeeded && let Some(field) = self.signature.as_mut() {
            field.clear();
        }
    }

    /// Apply a periodic status poll.
    pub fn poll_status(&mut self, status: SystemStatus) -> StatusChange {
        self.status.poll(status)
    }
}
