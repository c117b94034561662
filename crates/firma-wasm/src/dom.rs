//! Thin helpers over `web_sys` used by the bridge.

use firma_core::geometry::SurfaceBox;
use firma_core::input::Touch;
use firma_pad::Indicator;
use firma_render::Raster;
use wasm_bindgen::{Clamped, JsValue};
use web_sys::{
    CanvasRenderingContext2d, Element, HtmlCanvasElement, HtmlElement, ImageData, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition, TouchList,
};

/// The validation message element under the pad, toggled via `display`.
pub struct ElementIndicator(pub HtmlElement);

impl ElementIndicator {
    fn set_display(&self, value: &str) {
        if let Err(e) = self.0.style().set_property("display", value) {
            log::warn!("could not set signature message display to {value}: {e:?}");
        }
    }
}

impl Indicator for ElementIndicator {
    fn show(&mut self) {
        self.set_display("block");
    }

    fn hide(&mut self) {
        self.set_display("none");
    }
}

/// Current on-screen box of an element.
pub fn surface_box(el: &Element) -> SurfaceBox {
    let rect = el.get_bounding_client_rect();
    SurfaceBox::new(rect.left(), rect.top(), rect.width(), rect.height())
}

/// Match the canvas backing store to the raster.
pub fn sync_canvas_size(canvas: &HtmlCanvasElement, raster: &Raster) {
    if canvas.width() != raster.width() {
        canvas.set_width(raster.width());
    }
    if canvas.height() != raster.height() {
        canvas.set_height(raster.height());
    }
}

/// Copy the raster onto the canvas. Zero-area rasters are skipped.
pub fn blit(ctx: &CanvasRenderingContext2d, raster: &Raster) -> Result<(), JsValue> {
    let rgba = raster.to_rgba();
    if rgba.is_empty() {
        return Ok(());
    }
    let image =
        ImageData::new_with_u8_clamped_array_and_sh(Clamped(rgba.as_slice()), raster.width(), raster.height())?;
    ctx.put_image_data(&image, 0.0, 0.0)
}

/// Collect a DOM `TouchList`.
pub fn touches(list: &TouchList) -> Vec<Touch> {
    (0..list.length())
        .filter_map(|i| list.get(i))
        .map(|t| Touch {
            id: t.identifier(),
            client_x: f64::from(t.client_x()),
            client_y: f64::from(t.client_y()),
        })
        .collect()
}

/// Smoothly scroll an element to the middle of the viewport.
pub fn scroll_into_view(el: &Element) {
    let opts = ScrollIntoViewOptions::new();
    opts.set_behavior(ScrollBehavior::Smooth);
    opts.set_block(ScrollLogicalPosition::Center);
    el.scroll_into_view_with_scroll_into_view_options(&opts);
}

/// `performance.now()`, or 0 outside a window context.
pub fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or(0.0)
}
