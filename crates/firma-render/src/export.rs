//! Lossless export of the surface.
//!
//! Exporting reads the raster and never mutates it. An empty surface exports
//! a blank image; callers decide whether blank is acceptable.

use crate::raster::Raster;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use tiny_skia::Pixmap;

pub const PNG_MIME: &str = "image/png";
const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

/// Encode the surface as PNG.
///
/// # Errors
/// Fails for a zero-area surface (PNG can't express it) or if the encoder fails.
pub fn encode_png(raster: &Raster) -> Result<Vec<u8>, String> {
    let pixmap = raster.pixmap().ok_or_else(|| {
        format!(
            "cannot export a {}x{} surface",
            raster.width(),
            raster.height()
        )
    })?;
    pixmap.encode_png().map_err(|e| format!("PNG encoding failed: {e}"))
}

/// Wrap PNG bytes in a `data:image/png;base64,` URI.
pub fn png_data_uri(png: &[u8]) -> String {
    let mut uri = String::with_capacity(PNG_DATA_URI_PREFIX.len() + png.len() * 4 / 3 + 4);
    uri.push_str(PNG_DATA_URI_PREFIX);
    STANDARD.encode_string(png, &mut uri);
    uri
}

/// Extract the PNG bytes from a data URI produced by `png_data_uri`.
///
/// # Errors
/// Returns an error for a non-PNG URI or malformed base64.
pub fn decode_data_uri(uri: &str) -> Result<Vec<u8>, String> {
    let payload = uri
        .strip_prefix(PNG_DATA_URI_PREFIX)
        .ok_or_else(|| "not a base64 PNG data URI".to_string())?;
    STANDARD
        .decode(payload)
        .map_err(|e| format!("invalid base64 payload: {e}"))
}

/// Decode PNG bytes into a pixmap.
///
/// # Errors
/// Returns the decoder's message for malformed input.
pub fn decode_png(png: &[u8]) -> Result<Pixmap, String> {
    Pixmap::decode_png(png).map_err(|e| format!("PNG decoding failed: {e}"))
}
