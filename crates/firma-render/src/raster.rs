//! CPU raster backing the drawing surface.
//!
//! Strokes are not retained: every segment is burned into the pixmap as it
//! arrives. The only other pixel state is a `Snapshot`, an owned copy the
//! pad keeps so a signature survives a resize.

use firma_core::config::PadConfig;
use firma_core::style::{LineCap as CapStyle, LineJoin as JoinStyle, Rgba, StrokeStyle};
use kurbo::Point;
use tiny_skia::{
    Color, FillRule, FilterQuality, LineCap, LineJoin, Paint, PathBuilder, Pixmap, PixmapPaint,
    PremultipliedColorU8, Rect, Stroke, Transform,
};

/// Segments shorter than this render as a dot.
const MIN_SEGMENT: f64 = 1e-3;

/// The drawing surface's pixels.
///
/// A zero-area surface (hidden element, collapsed layout) keeps its nominal
/// size but owns no pixmap; drawing on it is a no-op.
#[derive(Clone)]
pub struct Raster {
    width: u32,
    height: u32,
    pixmap: Option<Pixmap>,
    stroke: StrokeStyle,
    background: Rgba,
}

/// Pixel content captured at a given resolution.
#[derive(Clone)]
pub struct Snapshot {
    pixmap: Pixmap,
}

impl Snapshot {
    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }
}

impl std::fmt::Debug for Snapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Snapshot({}x{})", self.width(), self.height())
    }
}

impl std::fmt::Debug for Raster {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Raster")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stroke", &self.stroke)
            .finish_non_exhaustive()
    }
}

impl Raster {
    /// Allocate a blank surface.
    pub fn new(width: u32, height: u32, config: &PadConfig) -> Self {
        let mut raster = Self {
            width,
            height,
            pixmap: None,
            stroke: config.stroke,
            background: config.background,
        };
        raster.pixmap = raster.blank_pixmap(width, height);
        raster
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn stroke_style(&self) -> &StrokeStyle {
        &self.stroke
    }

    /// Underlying pixmap, `None` for a zero-area surface.
    pub fn pixmap(&self) -> Option<&Pixmap> {
        self.pixmap.as_ref()
    }

    /// Erase everything back to the background.
    pub fn clear(&mut self) {
        let bg = to_skia_color(self.background);
        if let Some(pixmap) = self.pixmap.as_mut() {
            pixmap.fill(bg);
        }
    }

    /// Render the zero-length starting segment of a stroke at `p`.
    ///
    /// With round caps this is a filled disc of the stroke width, with square
    /// caps a square; butt caps leave no mark, as on a canvas.
    pub fn dot(&mut self, p: Point) {
        let paint = self.paint();
        let r = self.stroke.width / 2.0;
        let (x, y) = (p.x as f32, p.y as f32);
        let path = match self.stroke.cap {
            CapStyle::Round => PathBuilder::from_circle(x, y, r),
            CapStyle::Square => Rect::from_xywh(x - r, y - r, r * 2.0, r * 2.0).map(PathBuilder::from_rect),
            CapStyle::Butt => None,
        };
        if let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), path) {
            pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);
        }
    }

    /// Render one incremental segment of the current stroke.
    pub fn segment(&mut self, from: Point, to: Point) {
        if from.distance(to) < MIN_SEGMENT {
            self.dot(to);
            return;
        }
        let paint = self.paint();
        let stroke = self.skia_stroke();
        let mut pb = PathBuilder::new();
        pb.move_to(from.x as f32, from.y as f32);
        pb.line_to(to.x as f32, to.y as f32);
        if let (Some(pixmap), Some(path)) = (self.pixmap.as_mut(), pb.finish()) {
            pixmap.stroke_path(&path, &paint, &stroke, Transform::identity(), None);
        }
    }

    /// Copy the current pixels. `None` for a zero-area surface.
    pub fn snapshot(&self) -> Option<Snapshot> {
        self.pixmap.clone().map(|pixmap| Snapshot { pixmap })
    }

    /// Reallocate at `width`×`height`. When `restore` is given its content is
    /// redrawn stretched to fill the new dimensions.
    pub fn resize(&mut self, width: u32, height: u32, restore: Option<&Snapshot>) {
        log::debug!(
            "raster resize {}x{} -> {}x{} (restore: {:?})",
            self.width,
            self.height,
            width,
            height,
            restore
        );
        self.width = width;
        self.height = height;
        self.pixmap = self.blank_pixmap(width, height);

        let (Some(pixmap), Some(snap)) = (self.pixmap.as_mut(), restore) else {
            return;
        };
        let sx = width as f32 / snap.width() as f32;
        let sy = height as f32 / snap.height() as f32;
        let paint = PixmapPaint {
            quality: FilterQuality::Bilinear,
            ..PixmapPaint::default()
        };
        pixmap.draw_pixmap(
            0,
            0,
            snap.pixmap.as_ref(),
            &paint,
            Transform::from_scale(sx, sy),
            None,
        );
    }

    /// True when every pixel equals the background.
    pub fn is_blank(&self) -> bool {
        let Some(pixmap) = self.pixmap.as_ref() else {
            return true;
        };
        let bg = background_pixel(self.background);
        pixmap.pixels().iter().all(|p| *p == bg)
    }

    /// Straight-alpha RGBA bytes, row-major, as `ImageData` expects.
    pub fn to_rgba(&self) -> Vec<u8> {
        let Some(pixmap) = self.pixmap.as_ref() else {
            return Vec::new();
        };
        pixmap
            .pixels()
            .iter()
            .flat_map(|p| {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            })
            .collect()
    }

    /// Count of pixels that differ from the background.
    pub fn inked_pixels(&self) -> usize {
        let Some(pixmap) = self.pixmap.as_ref() else {
            return 0;
        };
        let bg = background_pixel(self.background);
        pixmap.pixels().iter().filter(|p| **p != bg).count()
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn blank_pixmap(&self, width: u32, height: u32) -> Option<Pixmap> {
        let mut pixmap = Pixmap::new(width, height);
        match pixmap.as_mut() {
            Some(p) => p.fill(to_skia_color(self.background)),
            None => log::warn!("zero-area surface {width}x{height}; drawing disabled"),
        }
        pixmap
    }

    fn paint(&self) -> Paint<'static> {
        let c = self.stroke.color;
        let mut paint = Paint::default();
        paint.set_color_rgba8(c.r, c.g, c.b, c.a);
        paint.anti_alias = true;
        paint
    }

    fn skia_stroke(&self) -> Stroke {
        Stroke {
            width: self.stroke.width,
            line_cap: match self.stroke.cap {
                CapStyle::Butt => LineCap::Butt,
                CapStyle::Round => LineCap::Round,
                CapStyle::Square => LineCap::Square,
            },
            line_join: match self.stroke.join {
                JoinStyle::Miter => LineJoin::Miter,
                JoinStyle::Round => LineJoin::Round,
                JoinStyle::Bevel => LineJoin::Bevel,
            },
            ..Stroke::default()
        }
    }
}

fn to_skia_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn background_pixel(c: Rgba) -> PremultipliedColorU8 {
    to_skia_color(c).premultiply().to_color_u8()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn raster(w: u32, h: u32) -> Raster {
        Raster::new(w, h, &PadConfig::default())
    }

    #[test]
    fn new_raster_is_blank() {
        let r = raster(300, 150);
        assert_eq!((r.width(), r.height()), (300, 150));
        assert!(r.is_blank());
        assert_eq!(r.inked_pixels(), 0);
    }

    #[test]
    fn dot_inks_pixels_around_point() {
        let mut r = raster(100, 100);
        r.dot(Point::new(50.0, 50.0));
        assert!(!r.is_blank());
        let pixmap = r.pixmap().unwrap();
        let center = pixmap.pixel(50, 50).unwrap();
        assert!(center.alpha() > 0, "dot centre should be inked");
        let far = pixmap.pixel(5, 5).unwrap();
        assert_eq!(far.alpha(), 0);
    }

    #[test]
    fn butt_cap_dot_leaves_no_mark() {
        let mut config = PadConfig::default();
        config.stroke.cap = CapStyle::Butt;
        let mut r = Raster::new(40, 40, &config);
        r.dot(Point::new(20.0, 20.0));
        assert!(r.is_blank());
    }

    #[test]
    fn segment_inks_along_line() {
        let mut r = raster(100, 20);
        r.segment(Point::new(10.0, 10.0), Point::new(90.0, 10.0));
        let pixmap = r.pixmap().unwrap();
        for x in [20, 50, 80] {
            assert!(pixmap.pixel(x, 10).unwrap().alpha() > 0, "x={x} should be inked");
        }
    }

    #[test]
    fn clear_restores_blank() {
        let mut r = raster(64, 64);
        r.segment(Point::new(0.0, 0.0), Point::new(64.0, 64.0));
        r.clear();
        assert!(r.is_blank());
    }

    #[test]
    fn resize_without_snapshot_is_blank() {
        let mut r = raster(50, 50);
        r.dot(Point::new(25.0, 25.0));
        r.resize(80, 40, None);
        assert_eq!((r.width(), r.height()), (80, 40));
        assert!(r.is_blank());
    }

    #[test]
    fn resize_with_snapshot_scales_content() {
        let mut r = raster(100, 50);
        r.dot(Point::new(25.0, 25.0));
        let snap = r.snapshot().unwrap();
        r.resize(200, 100, Some(&snap));
        let pixmap = r.pixmap().unwrap();
        assert!(pixmap.pixel(50, 50).unwrap().alpha() > 0, "dot should move to 2x position");
        assert_eq!(pixmap.pixel(25, 25).unwrap().alpha(), 0);
    }

    #[test]
    fn zero_area_surface_is_inert() {
        let mut r = raster(0, 150);
        assert!(r.pixmap().is_none());
        r.dot(Point::new(0.0, 0.0));
        r.segment(Point::new(0.0, 0.0), Point::new(10.0, 10.0));
        assert!(r.is_blank());
        assert!(r.snapshot().is_none());
        assert!(r.to_rgba().is_empty());
    }

    #[test]
    fn rgba_export_is_straight_alpha() {
        let mut config = PadConfig::default();
        config.stroke.color = Rgba::rgb(255, 0, 0);
        let mut r = Raster::new(10, 10, &config);
        r.dot(Point::new(5.0, 5.0));
        let rgba = r.to_rgba();
        assert_eq!(rgba.len(), 10 * 10 * 4);
        let i = (5 * 10 + 5) * 4;
        assert_eq!(rgba[i], 255, "red channel is not premultiplied");
        assert!(rgba[i + 3] > 0);
    }

    #[test]
    fn opaque_background_is_blank_until_drawn() {
        let config = PadConfig {
            background: Rgba::rgb(255, 255, 255),
            ..PadConfig::default()
        };
        let mut r = Raster::new(20, 20, &config);
        assert!(r.is_blank());
        r.dot(Point::new(10.0, 10.0));
        assert!(!r.is_blank());
    }
}
