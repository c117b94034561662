//! Pad configuration.

use crate::style::{Rgba, StrokeStyle};
use serde::{Deserialize, Serialize};

/// Configuration for a `SignaturePad`.
///
/// Defaults reproduce the registration pages: a 3px round black pen on a
/// transparent surface, resize handling debounced by 100ms.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PadConfig {
    /// Fixed stroke attributes.
    pub stroke: StrokeStyle,

    /// Quiet period after the last viewport `resize` before the surface is
    /// re-measured. Default: **100**.
    pub debounce_ms: u32,

    /// Colour a cleared surface is filled with. Default: transparent, so an
    /// exported blank image matches a fresh canvas.
    pub background: Rgba,
}

impl Default for PadConfig {
    fn default() -> Self {
        Self {
            stroke: StrokeStyle::default(),
            debounce_ms: 100,
            background: Rgba::TRANSPARENT,
        }
    }
}

impl PadConfig {
    /// Load from JSON; missing keys fall back to the defaults.
    ///
    /// # Errors
    /// Returns the serde error message if the JSON is malformed.
    pub fn from_json(json: &str) -> Result<Self, String> {
        let config: Self = serde_json::from_str(json).map_err(|e| e.to_string())?;
        if !(config.stroke.width.is_finite() && config.stroke.width > 0.0) {
            return Err(format!(
                "stroke width must be positive, got {}",
                config.stroke.width
            ));
        }
        Ok(config)
    }
}
