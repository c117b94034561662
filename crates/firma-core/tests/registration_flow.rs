//! Integration tests: form schemas and status handling as a page uses them.

use firma_core::form::{FormSchema, FormValues};
use firma_core::status::{StatusChange, StatusTracker, SystemStatus};
use pretty_assertions::assert_eq;

const STATUS_OPEN: &str = r#"{
    "disponible": true,
    "mensaje": "Formulario disponible",
    "configuracion": {
        "nombre_capacitacion": "Manejo defensivo",
        "ciudad_capacitacion": "Medellín",
        "fecha_capacitacion": "2025-03-15",
        "hora_inicio": "08:00:00",
        "hora_fin": "12:30:00"
    }
}"#;

#[test]
fn custom_schema_from_json_validates_and_orders_payload() {
    let schema = FormSchema::from_json(
        r#"{
            "name": "visitante",
            "endpoint": "/api/visitante",
            "fields": [
                {"key": "nombre", "label": "Nombre", "kind": "text"},
                {"key": "empresa", "label": "Empresa", "kind": "text", "required": false}
            ],
            "signature_field": "firma_digital",
            "submit_label": "Enviar"
        }"#,
    )
    .unwrap();
    assert!(schema.requires_signature());

    let values = FormValues::new().with("empresa", "ACME").with("nombre", " Luis ");
    let report = schema.validate(&values);
    assert!(report.is_ok());

    let payload = schema.build_payload(&values, Some("data:image/png;base64,AA=="));
    let keys: Vec<&str> = payload.entries.iter().map(|(k, _)| k.as_str()).collect();
    assert_eq!(keys, ["nombre", "empresa", "firma_digital"]);
    assert_eq!(payload.get("nombre"), Some("Luis"));
}

#[test]
fn page_load_then_polls_only_report_flips() {
    let mut tracker = StatusTracker::new();
    let status = SystemStatus::from_json(STATUS_OPEN).unwrap();

    match tracker.load(status.clone()) {
        StatusChange::Changed {
            available,
            summary,
            ..
        } => {
            assert!(available);
            assert_eq!(summary.title, "Manejo defensivo");
            assert_eq!(summary.city, "Medellín");
            assert_eq!(summary.date, "15 de marzo de 2025");
            assert_eq!(summary.schedule, "08:00 - 12:30");
        }
        StatusChange::Unchanged => panic!("initial load must render"),
    }

    assert_eq!(tracker.poll(status.clone()), StatusChange::Unchanged);

    let mut closed = status;
    closed.disponible = false;
    assert!(matches!(
        tracker.poll(closed.clone()),
        StatusChange::Changed {
            available: false,
            ..
        }
    ));
    assert_eq!(tracker.poll(closed), StatusChange::Unchanged);
    assert!(!tracker.is_available());
}
