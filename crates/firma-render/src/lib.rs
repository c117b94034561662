pub mod export;
pub mod raster;

pub use export::{decode_data_uri, decode_png, encode_png, png_data_uri};
pub use raster::{Raster, Snapshot};
