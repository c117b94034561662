//! Registration availability, as reported by the status endpoint.
//!
//! Both registration pages load the status once at startup and then poll it
//! every 30 seconds. `StatusTracker` decides when a poll result is worth
//! re-rendering; the `EventConfig` display helpers format dates and times
//! the way the pages show them.

use chrono::{Datelike, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

/// How often the pages re-check availability.
pub const POLL_INTERVAL_MS: u32 = 30_000;

/// Placeholder shown when there is nothing to display.
const EMPTY: &str = "-";

// ─── Wire model ──────────────────────────────────────────────────────────

/// Body of the status endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SystemStatus {
    #[serde(default)]
    pub disponible: bool,
    #[serde(default)]
    pub mensaje: Option<String>,
    #[serde(default)]
    pub configuracion: Option<EventConfig>,
}

impl SystemStatus {
    /// # Errors
    /// Returns the serde error message if the body is not a status object.
    pub fn from_json(json: &str) -> Result<Self, String> {
        serde_json::from_str(json).map_err(|e| e.to_string())
    }

    /// Registration is open only when the server says so and sent a
    /// configuration to go with it.
    pub fn is_open(&self) -> bool {
        self.disponible && self.configuracion.is_some()
    }
}

/// Training session and company details. Every field is optional on the
/// wire; the display helpers fall back to placeholders.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventConfig {
    pub nombre_capacitacion: Option<String>,
    pub ciudad_capacitacion: Option<String>,
    /// `YYYY-MM-DD`
    pub fecha_capacitacion: Option<String>,
    /// `HH:MM` or `HH:MM:SS`
    pub hora_inicio: Option<String>,
    pub hora_fin: Option<String>,
    pub nombre_instructor: Option<String>,
    pub cargo_instructor: Option<String>,
    pub asesor_externo: Option<String>,
    pub nombre_empresa: Option<String>,
    pub direccion_empresa: Option<String>,
    pub telefono_empresa: Option<String>,
    pub logo_empresa: Option<String>,
}

impl EventConfig {
    /// Long-form session date, e.g. `15 de marzo de 2025`.
    pub fn date_label(&self) -> String {
        self.fecha_capacitacion
            .as_deref()
            .and_then(format_date)
            .unwrap_or_else(|| EMPTY.to_string())
    }

    /// `HH:MM - HH:MM`, or a placeholder unless both ends are known.
    pub fn schedule_label(&self) -> String {
        match (self.hora_inicio.as_deref(), self.hora_fin.as_deref()) {
            (Some(start), Some(end)) => format!("{} - {}", format_time(start), format_time(end)),
            _ => EMPTY.to_string(),
        }
    }

    pub fn summary(&self) -> EventSummary {
        EventSummary {
            title: non_empty(&self.nombre_capacitacion)
                .unwrap_or_else(|| NO_EVENT_TITLE.to_string()),
            city: non_empty(&self.ciudad_capacitacion).unwrap_or_else(|| EMPTY.to_string()),
            date: self.date_label(),
            schedule: self.schedule_label(),
            instructor: non_empty(&self.nombre_instructor),
            company: CompanyInfo {
                name: non_empty(&self.nombre_empresa),
                address: non_empty(&self.direccion_empresa),
                phone: non_empty(&self.telefono_empresa),
                logo: non_empty(&self.logo_empresa),
            },
        }
    }
}

const NO_EVENT_TITLE: &str = "Sin capacitación programada";

fn non_empty(v: &Option<String>) -> Option<String> {
    v.as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Header text for the registration pages.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventSummary {
    pub title: String,
    pub city: String,
    pub date: String,
    pub schedule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instructor: Option<String>,
    pub company: CompanyInfo,
}

/// Company block of the page header. `None` fields keep whatever the page
/// already shows; a logo is an image URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompanyInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

impl EventSummary {
    /// What the header shows when no session is configured.
    pub fn empty() -> Self {
        Self {
            title: NO_EVENT_TITLE.to_string(),
            city: EMPTY.to_string(),
            date: EMPTY.to_string(),
            schedule: EMPTY.to_string(),
            instructor: None,
            company: CompanyInfo::default(),
        }
    }
}

// ─── Formatting ──────────────────────────────────────────────────────────

const MONTHS_ES: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

/// Format `YYYY-MM-DD` in Colombian Spanish long form. The date is taken
/// as a calendar date, so no timezone shift can move it a day.
pub fn format_date(iso: &str) -> Option<String> {
    let date = NaiveDate::parse_from_str(iso.trim(), "%Y-%m-%d").ok()?;
    let month = MONTHS_ES[date.month0() as usize];
    Some(format!("{} de {} de {}", date.day(), month, date.year()))
}

/// Trim a time to `HH:MM`.
pub fn format_time(time: &str) -> String {
    let time = time.trim();
    NaiveTime::parse_from_str(time, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(time, "%H:%M"))
        .map(|t| t.format("%H:%M").to_string())
        .unwrap_or_else(|_| time.chars().take(5).collect())
}

// ─── Tracking ────────────────────────────────────────────────────────────

/// Whether a status update needs the page to re-render.
#[derive(Debug, Clone, PartialEq)]
pub enum StatusChange {
    Unchanged,
    Changed {
        available: bool,
        message: String,
        summary: EventSummary,
    },
}

/// Page-scoped availability state.
#[derive(Debug, Clone, Default)]
pub struct StatusTracker {
    available: Option<bool>,
    config: Option<EventConfig>,
}

impl StatusTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_available(&self) -> bool {
        self.available == Some(true)
    }

    pub fn config(&self) -> Option<&EventConfig> {
        self.config.as_ref()
    }

    /// Apply the status fetched at page load. Always reports a change so the
    /// page renders its initial state.
    pub fn load(&mut self, status: SystemStatus) -> StatusChange {
        match status.configuracion {
            None => {
                log::warn!("status response carries no configuration");
                self.set_unavailable(
                    status
                        .mensaje
                        .unwrap_or_else(|| "No hay capacitaciones programadas para hoy".to_string()),
                )
            }
            Some(config) => {
                self.available = Some(status.disponible);
                let change = StatusChange::Changed {
                    available: status.disponible,
                    message: status.mensaje.unwrap_or_default(),
                    summary: config.summary(),
                };
                self.config = Some(config);
                change
            }
        }
    }

    /// The initial fetch failed; show the page as closed.
    pub fn load_failed(&mut self) -> StatusChange {
        self.set_unavailable("Error al conectar con el servidor".to_string())
    }

    /// Apply a periodic poll. Reports a change only when availability flips
    /// or the configuration disappears.
    pub fn poll(&mut self, status: SystemStatus) -> StatusChange {
        let Some(config) = status.configuracion else {
            if self.available == Some(false) {
                return StatusChange::Unchanged;
            }
            return self.set_unavailable(
                status
                    .mensaje
                    .unwrap_or_else(|| "No hay capacitaciones programadas".to_string()),
            );
        };

        if self.available == Some(status.disponible) {
            return StatusChange::Unchanged;
        }

        log::info!(
            "registration availability changed: {:?} -> {}",
            self.available,
            status.disponible
        );
        self.available = Some(status.disponible);
        let summary = config.summary();
        self.config = Some(config);
        StatusChange::Changed {
            available: status.disponible,
            message: status.mensaje.unwrap_or_default(),
            summary,
        }
    }

    fn set_unavailable(&mut self, message: String) -> StatusChange {
        self.available = Some(false);
        self.config = None;
        StatusChange::Changed {
            available: false,
            message,
            summary: EventSummary::empty(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn open_status() -> SystemStatus {
        SystemStatus::from_json(
            r#"{
                "disponible": true,
                "mensaje": "Formulario disponible",
                "configuracion": {
                    "nombre_capacitacion": "Manejo defensivo",
                    "ciudad_capacitacion": "Medellín",
                    "fecha_capacitacion": "2025-03-15",
                    "hora_inicio": "08:00",
                    "hora_fin": "12:30",
                    "nombre_empresa": "Transportes S.A."
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn formats_long_spanish_date() {
        assert_eq!(format_date("2025-03-15").as_deref(), Some("15 de marzo de 2025"));
        assert_eq!(format_date("2024-12-01").as_deref(), Some("1 de diciembre de 2024"));
        assert_eq!(format_date("15/03/2025"), None);
    }

    #[test]
    fn trims_times_to_minutes() {
        assert_eq!(format_time("08:00:59"), "08:00");
        assert_eq!(format_time("17:45"), "17:45");
        assert_eq!(format_time("garbage-time"), "garba");
    }

    #[test]
    fn summary_uses_placeholders() {
        let summary = EventConfig::default().summary();
        assert_eq!(summary, EventSummary::empty());

        let summary = open_status().configuracion.unwrap().summary();
        assert_eq!(summary.title, "Manejo defensivo");
        assert_eq!(summary.date, "15 de marzo de 2025");
        assert_eq!(summary.schedule, "08:00 - 12:30");
    }

    #[test]
    fn summary_carries_company_block() {
        let mut config = open_status().configuracion.unwrap();
        config.nombre_instructor = Some("Carlos Ruiz".to_string());
        config.telefono_empresa = Some("  ".to_string());
        config.logo_empresa = Some("/static/logo.png".to_string());
        let summary = config.summary();
        assert_eq!(summary.instructor.as_deref(), Some("Carlos Ruiz"));
        assert_eq!(
            summary.company,
            CompanyInfo {
                name: Some("Transportes S.A.".to_string()),
                address: None,
                phone: None,
                logo: Some("/static/logo.png".to_string()),
            }
        );
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["company"], serde_json::json!({
            "name": "Transportes S.A.",
            "logo": "/static/logo.png"
        }));
    }

    #[test]
    fn load_without_configuration_is_unavailable() {
        let mut tracker = StatusTracker::new();
        let status = SystemStatus::from_json(r#"{"disponible": true}"#).unwrap();
        assert!(!status.is_open());
        match tracker.load(status) {
            StatusChange::Changed {
                available, message, ..
            } => {
                assert!(!available);
                assert_eq!(message, "No hay capacitaciones programadas para hoy");
            }
            StatusChange::Unchanged => panic!("initial load must render"),
        }
        assert!(tracker.config().is_none());
    }

    #[test]
    fn poll_reports_only_flips() {
        let mut tracker = StatusTracker::new();
        tracker.load(open_status());
        assert!(tracker.is_available());

        assert_eq!(tracker.poll(open_status()), StatusChange::Unchanged);

        let mut closed = open_status();
        closed.disponible = false;
        closed.mensaje = Some("El formulario está desactivado".to_string());
        assert!(matches!(
            tracker.poll(closed.clone()),
            StatusChange::Changed { available: false, .. }
        ));
        assert_eq!(tracker.poll(closed), StatusChange::Unchanged);
    }

    #[test]
    fn poll_losing_configuration_closes_once() {
        let mut tracker = StatusTracker::new();
        tracker.load(open_status());
        let gone = SystemStatus::default();
        assert!(matches!(tracker.poll(gone.clone()), StatusChange::Changed { .. }));
        assert!(!tracker.is_available());
        assert_eq!(tracker.poll(gone), StatusChange::Unchanged);
    }

    #[test]
    fn failed_load_shows_connection_error() {
        let mut tracker = StatusTracker::new();
        match tracker.load_failed() {
            StatusChange::Changed { message, .. } => {
                assert_eq!(message, "Error al conectar con el servidor")
            }
            StatusChange::Unchanged => panic!("expected change"),
        }
    }
}
