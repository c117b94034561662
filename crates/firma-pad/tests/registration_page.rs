//! Integration tests: registration page submit flow.
//!
//! Exercises schema validation, the signature precondition, availability
//! checks, and payload assembly across firma-core and firma-pad.

use firma_core::config::PadConfig;
use firma_core::form::{FormSchema, FormValues};
use firma_core::geometry::SurfaceBox;
use firma_core::id::FieldId;
use firma_core::input::{InputEvent, PointerSample, PointerSource};
use firma_core::status::{StatusChange, SystemStatus};
use firma_pad::{Indicator, RegistrationPage, SignatureField, SignaturePad, SubmitBlocked};
use firma_render::{decode_data_uri, decode_png};
use pretty_assertions::assert_eq;
use std::cell::Cell;
use std::rc::Rc;

/// Records visibility so tests can observe the error message.
#[derive(Clone, Default)]
struct Flag(Rc<Cell<bool>>);

impl Indicator for Flag {
    fn show(&mut self) {
        self.0.set(true);
    }
    fn hide(&mut self) {
        self.0.set(false);
    }
}

fn open() -> SystemStatus {
    SystemStatus::from_json(
        r#"{"disponible": true, "mensaje": "Formulario disponible", "configuracion": {}}"#,
    )
    .unwrap()
}

fn attendee_values() -> FormValues {
    FormValues::new()
        .with("nombres_apellidos", "María Gómez")
        .with("tipodocumento", "CC")
        .with("numero_documento", " 1020304050 ")
        .with("cargo", "Conductora")
        .with("ruta", "R-12")
        .with("ciudad", "Bogotá")
}

fn page(schema: FormSchema) -> (RegistrationPage, Flag) {
    let flag = Flag::default();
    let pad = SignaturePad::new(SurfaceBox::sized(300.0, 150.0), PadConfig::default());
    let field = SignatureField::new(pad, Some(Box::new(flag.clone())));
    (RegistrationPage::new(schema, Some(field)), flag)
}

fn sign(page: &mut RegistrationPage) {
    let pad = page.signature_mut().unwrap().pad_mut();
    pad.handle(&InputEvent::Down(PointerSample::mouse(50.0, 50.0)));
    pad.handle(&InputEvent::Move(PointerSample::mouse(120.0, 80.0)));
    pad.handle(&InputEvent::Up(PointerSource::Mouse));
}

// ─── Blocking ───────────────────────────────────────────────────────────

#[test]
fn empty_signature_blocks_and_shows_error() {
    let (mut page, flag) = page(FormSchema::attendee());
    let err = page.submit(&attendee_values(), &open()).unwrap_err();
    assert_eq!(err, SubmitBlocked::MissingSignature);
    assert_eq!(
        err.message(),
        "Por favor firme en el recuadro antes de continuar."
    );
    assert!(flag.0.get(), "error message should be visible");
    assert!(!page.is_submitting());
}

#[test]
fn clearing_the_pad_hides_the_error() {
    let (mut page, flag) = page(FormSchema::attendee());
    page.submit(&attendee_values(), &open()).unwrap_err();
    assert!(flag.0.get());
    page.signature_mut().unwrap().clear();
    assert!(!flag.0.get());
}

#[test]
fn missing_fields_are_reported_before_signature() {
    let (mut page, flag) = page(FormSchema::attendee());
    let values = attendee_values().with("ruta", "  ").with("ciudad", "");
    match page.submit(&values, &open()).unwrap_err() {
        SubmitBlocked::Fields(report) => {
            assert_eq!(
                report.invalid,
                vec![FieldId::from_static("ruta"), FieldId::from_static("ciudad")]
            );
            assert_eq!(report.valid.len(), 4);
        }
        other => panic!("expected Fields, got {other:?}"),
    }
    assert!(!flag.0.get(), "signature not checked yet");
}

#[test]
fn closed_registration_blocks_with_server_message() {
    let (mut page, _) = page(FormSchema::trainer());
    sign(&mut page);
    let closed = SystemStatus::from_json(
        r#"{"disponible": false, "mensaje": "El formulario está disponible de 08:00 a 12:00", "configuracion": {}}"#,
    )
    .unwrap();
    let values = FormValues::new().with("nombre_completo", "Jorge Ruiz");
    let err = page.submit(&values, &closed).unwrap_err();
    assert_eq!(err.message(), "El formulario está disponible de 08:00 a 12:00");
    match err {
        SubmitBlocked::Unavailable { change, .. } => assert!(matches!(
            change,
            StatusChange::Changed {
                available: false,
                ..
            }
        )),
        other => panic!("expected Unavailable, got {other:?}"),
    }
    assert!(!page.status().is_available());

    // Already known to be closed: the header needs no re-render.
    match page.submit(&values, &closed).unwrap_err() {
        SubmitBlocked::Unavailable { change, .. } => assert_eq!(change, StatusChange::Unchanged),
        other => panic!("expected Unavailable, got {other:?}"),
    }
    assert!(page.signature().unwrap().pad().has_content(), "signature kept");
}

// ─── Success ────────────────────────────────────────────────────────────

#[test]
fn signed_submission_builds_payload_with_png() {
    let (mut page, flag) = page(FormSchema::attendee());
    sign(&mut page);
    let payload = page.submit(&attendee_values(), &open()).unwrap();

    assert_eq!(payload.endpoint, "/api/registrar");
    assert_eq!(
        payload.get("numero_documento"),
        Some("1020304050")
    );
    let keys: Vec<&str> = payload.entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(
        keys,
        [
            "nombres_apellidos",
            "tipodocumento",
            "numero_documento",
            "cargo",
            "ruta",
            "ciudad",
            "firma_digital"
        ]
    );

    let uri = payload.get(FieldId::SIGNATURE.as_str()).unwrap();
    let image = decode_png(&decode_data_uri(uri).unwrap()).unwrap();
    assert_eq!((image.width(), image.height()), (300, 150));
    assert!(image.pixels().iter().any(|p| p.alpha() > 0));
    assert!(!flag.0.get());
}

#[test]
fn second_submit_while_in_flight_is_busy() {
    let (mut page, _) = page(FormSchema::attendee());
    sign(&mut page);
    page.submit(&attendee_values(), &open()).unwrap();
    assert!(page.is_submitting());
    assert_eq!(
        page.submit(&attendee_values(), &open()).unwrap_err(),
        SubmitBlocked::Busy
    );
}

#[test]
fn successful_finish_clears_signature() {
    let (mut page, _) = page(FormSchema::attendee());
    sign(&mut page);
    page.submit(&attendee_values(), &open()).unwrap();
    page.finish_submit(true);
    assert!(!page.is_submitting());
    assert!(!page.signature().unwrap().pad().has_content());
}

#[test]
fn failed_finish_keeps_signature_for_retry() {
    let (mut page, _) = page(FormSchema::attendee());
    sign(&mut page);
    page.submit(&attendee_values(), &open()).unwrap();
    page.finish_submit(false);
    assert!(page.signature().unwrap().pad().has_content());
    assert!(page.submit(&attendee_values(), &open()).is_ok());
}

#[test]
fn page_without_pad_submits_fields_only() {
    let mut page = RegistrationPage::new(FormSchema::trainer(), None);
    let payload = page
        .submit(&FormValues::new().with("nombre_completo", "Ana"), &open())
        .unwrap();
    assert_eq!(payload.entries.len(), 1);
    assert!(payload.get(FieldId::SIGNATURE.as_str()).is_none());
}

#[test]
fn poll_status_reports_flip() {
    let (mut page, _) = page(FormSchema::attendee());
    page.status_mut().load(open());
    let mut closed = open();
    closed.disponible = false;
    assert!(matches!(
        page.poll_status(closed),
        StatusChange::Changed { available: false, .. }
    ));
}
