//! Freehand signature capture.
//!
//! `SignaturePad` turns normalized pointer input into strokes burned into a
//! `Raster`. It owns the raster exclusively; hosts read it only through
//! `has_content` and the export calls.
//!
//! ## Stroke lifecycle
//!
//! | Event  | Idle                               | Drawing                                  |
//! |--------|------------------------------------|------------------------------------------|
//! | Down   | in bounds: start stroke, paint dot | in bounds: swallowed, nothing painted    |
//! | Move   | ignored                            | same source: paint segment; else swallowed |
//! | Up     | ignored                            | same source: end, take snapshot          |
//! | Leave / Cancel | ignored                    | end, take snapshot                       |
//!
//! The first pointer owns the stroke. Extra fingers are swallowed rather
//! than ignored so the host still suppresses pinch-zoom and scrolling.

use firma_core::config::PadConfig;
use firma_core::geometry::SurfaceBox;
use firma_core::input::{InputEvent, PointerSample, PointerSource};
use firma_render::{Raster, Snapshot, encode_png, png_data_uri};
use kurbo::Point;

/// Whether the pad acted on an event. `Consumed` means the host should
/// suppress the event's default action (scrolling, text selection).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    Ignored,
    Consumed,
}

impl Handled {
    pub fn prevent_default(self) -> bool {
        self == Handled::Consumed
    }
}

#[derive(Debug, Clone, Copy)]
struct ActiveStroke {
    source: PointerSource,
    /// End of the last rendered segment, in surface-local coordinates.
    cursor: Point,
}

pub struct SignaturePad {
    config: PadConfig,
    bounds: SurfaceBox,
    raster: Raster,
    stroke: Option<ActiveStroke>,
    has_strokes: bool,
    /// Content as of the last completed stroke, at the resolution it was
    /// drawn. Resizes always scale from here, so repeated layout changes
    /// don't compound resampling blur.
    snapshot: Option<Snapshot>,
}

impl SignaturePad {
    /// Initialize a pad over a surface measured at `bounds`.
    pub fn new(bounds: SurfaceBox, config: PadConfig) -> Self {
        let (w, h) = bounds.pixel_size();
        log::debug!("signature pad initialized at {w}x{h}");
        Self {
            raster: Raster::new(w, h, &config),
            config,
            bounds,
            stroke: None,
            has_strokes: false,
            snapshot: None,
        }
    }

    pub fn config(&self) -> &PadConfig {
        &self.config
    }

    pub fn bounds(&self) -> SurfaceBox {
        self.bounds
    }

    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    pub fn is_drawing(&self) -> bool {
        self.stroke.is_some()
    }

    /// True iff at least one point was committed since the last clear.
    pub fn has_content(&self) -> bool {
        self.has_strokes
    }

    /// The surface moved (page scroll, layout shift) without changing size.
    pub fn reposition(&mut self, left: f64, top: f64) {
        self.bounds.left = left;
        self.bounds.top = top;
    }

    // ─── Input ───────────────────────────────────────────────────────────

    /// Dispatch a normalized input event.
    pub fn handle(&mut self, event: &InputEvent) -> Handled {
        match event {
            InputEvent::Down(sample) => self.begin_stroke(sample),
            InputEvent::Move(sample) => self.continue_stroke(sample),
            InputEvent::Up(source) => match self.stroke {
                Some(active) if active.source == *source => self.end_stroke(),
                _ => Handled::Ignored,
            },
            InputEvent::Leave | InputEvent::Cancel => self.end_stroke(),
        }
    }

    /// Start a stroke at `sample` if it lands on the surface and no other
    /// stroke is active. Paints a dot so a tap leaves a mark.
    pub fn begin_stroke(&mut self, sample: &PointerSample) -> Handled {
        let local = self.bounds.to_local(sample.client);
        if !self.bounds.contains_local(local) {
            return Handled::Ignored;
        }
        if self.stroke.is_some() {
            log::trace!("swallowing {:?}: stroke already active", sample.source);
            return Handled::Consumed;
        }

        self.stroke = Some(ActiveStroke {
            source: sample.source,
            cursor: local,
        });
        self.has_strokes = true;
        self.raster.dot(local);
        log::debug!("stroke begin at ({:.1}, {:.1})", local.x, local.y);
        Handled::Consumed
    }

    /// Extend the active stroke to `sample` and render the new segment.
    /// Moves from another pointer are swallowed without painting.
    pub fn continue_stroke(&mut self, sample: &PointerSample) -> Handled {
        let Some(active) = self.stroke.as_mut() else {
            return Handled::Ignored;
        };
        if active.source != sample.source {
            return Handled::Consumed;
        }
        let local = self.bounds.to_local(sample.client);
        self.raster.segment(active.cursor, local);
        active.cursor = local;
        Handled::Consumed
    }

    /// Finish the active stroke and capture the resize snapshot.
    pub fn end_stroke(&mut self) -> Handled {
        if self.stroke.take().is_none() {
            return Handled::Ignored;
        }
        self.snapshot = self.raster.snapshot();
        log::debug!("stroke end");
        Handled::Consumed
    }

    // ─── Surface ─────────────────────────────────────────────────────────

    /// Re-measure the surface. Existing content is redrawn scaled to the new
    /// size. A stroke still in progress is ended first, since its
    /// coordinates were mapped against the old box.
    ///
    /// A measurement with the same pixel size only updates the box and
    /// leaves an active stroke running.
    ///
    /// Returns `true` if the raster was reallocated.
    pub fn resize(&mut self, bounds: SurfaceBox) -> bool {
        let (w, h) = bounds.pixel_size();
        if (w, h) == (self.raster.width(), self.raster.height()) {
            self.bounds = bounds;
            return false;
        }

        if self.is_drawing() {
            log::debug!("ending active stroke before resize");
            self.end_stroke();
        }
        self.bounds = bounds;

        let restore = if self.has_strokes {
            self.snapshot.as_ref()
        } else {
            None
        };
        log::info!(
            "signature surface {}x{} -> {w}x{h}",
            self.raster.width(),
            self.raster.height()
        );
        self.raster.resize(w, h, restore);
        true
    }

    /// Erase everything and forget the snapshot. Safe to call repeatedly.
    pub fn clear(&mut self) {
        self.raster.clear();
        self.stroke = None;
        self.has_strokes = false;
        self.snapshot = None;
    }

    // ─── Export ──────────────────────────────────────────────────────────

    /// Current content as PNG. A pad without content exports a blank image;
    /// check `has_content` first.
    ///
    /// # Errors
    /// Fails only for a zero-area surface or an encoder error.
    pub fn export_png(&self) -> Result<Vec<u8>, String> {
        encode_png(&self.raster)
    }

    /// Current content as a `data:image/png;base64,` URI.
    ///
    /// # Errors
    /// Same as `export_png`.
    pub fn export_data_url(&self) -> Result<String, String> {
        self.export_png().map(|png| png_data_uri(&png))
    }
}
