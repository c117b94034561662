pub mod config;
pub mod form;
pub mod geometry;
pub mod id;
pub mod input;
pub mod status;
pub mod style;

pub use config::PadConfig;
pub use form::{FieldKind, FieldSpec, FormSchema, FormValues, Payload, ValidationReport};
pub use geometry::SurfaceBox;
pub use id::FieldId;
pub use input::{InputEvent, PointerSample, PointerSource, Touch};
pub use status::{CompanyInfo, EventConfig, EventSummary, StatusChange, StatusTracker, SystemStatus};
pub use style::{LineCap, LineJoin, Rgba, StrokeStyle};

// Re-export kurbo's point so downstream crates don't need a direct dependency
pub use kurbo::Point;
