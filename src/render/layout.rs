use crate::foundation::core::{BezPath, Canvas, Point, Rect, Rgba8};

#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Every geometric and color constant used by the compositor.
///
/// The defaults target the 1590x920 group cover crop.
pub struct CoverLayout {
    /// Output size.
    pub canvas: Canvas,
    /// Flat fill when there is no album art.
    pub background: Rgba8,
    /// Gaussian radius applied to the reduced-resolution background.
    pub background_blur_radius: u32,
    /// Gaussian sigma matching `background_blur_radius`.
    pub background_blur_sigma: f32,
    /// Background downscale factor before blurring.
    pub background_downscale: u32,
    /// Color multiplier applied after blurring (1.0 leaves it untouched).
    pub background_darken: f32,
    /// Top-left corner of the album thumbnail.
    pub thumb_origin: Point,
    /// Thumbnail edge length.
    pub thumb_size: u32,
    /// Horizontal gap between the thumbnail and the text column.
    pub text_gap: f64,
    /// Margin kept free at the right edge of the canvas.
    pub right_margin: f64,
    /// Margin kept free at the bottom edge of the canvas.
    pub bottom_margin: f64,
    /// Title size before shrink-to-fit.
    pub title_max_size: f32,
    /// Subtitle size before shrink-to-fit.
    pub subtitle_max_size: f32,
    /// Vertical gap between stacked text blocks.
    pub line_gap: f64,
    /// Primary text color.
    pub text_color: Rgba8,
    /// Subtitle, artist and caption color.
    pub secondary_text_color: Rgba8,
    /// Gap between the title block and the first artist row.
    pub artists_gap: f64,
    /// Fixed height of one artist row.
    pub artist_row_height: f64,
    /// Artist avatar edge length.
    pub artist_avatar_size: u32,
    /// Artist name size before shrink-to-fit.
    pub artist_name_max_size: f32,
    /// Corner radius for every rounded avatar.
    pub avatar_corner_radius: f64,
    /// Gap between an avatar and the name next to it.
    pub avatar_gap: f64,
    /// Listener badge avatar edge length.
    pub badge_avatar_size: u32,
    /// Total badge width (avatar + gap + name).
    pub badge_width: f64,
    /// Listener name size before shrink-to-fit.
    pub badge_name_max_size: f32,
    /// Fixed timestamp caption size.
    pub timestamp_size: f32,
    /// Gap between the thumbnail and the caption.
    pub timestamp_gap: f64,
    /// `chrono` format string for the caption.
    pub timestamp_format: String,
}

impl Default for CoverLayout {
    fn default() -> Self {
        Self {
            canvas: Canvas {
                width: 1590,
                height: 920,
            },
            background: Rgba8::rgb(0x1e, 0x1e, 0x24),
            background_blur_radius: 6,
            background_blur_sigma: 3.0,
            background_downscale: 4,
            background_darken: 0.55,
            thumb_origin: Point::new(260.0, 200.0),
            thumb_size: 350,
            text_gap: 60.0,
            right_margin: 60.0,
            bottom_margin: 48.0,
            title_max_size: 72.0,
            subtitle_max_size: 44.0,
            line_gap: 12.0,
            text_color: Rgba8::rgb(0xff, 0xff, 0xff),
            secondary_text_color: Rgba8::rgb(0xd0, 0xd0, 0xd8),
            artists_gap: 36.0,
            artist_row_height: 72.0,
            artist_avatar_size: 56,
            artist_name_max_size: 36.0,
            avatar_corner_radius: 14.0,
            avatar_gap: 16.0,
            badge_avatar_size: 64,
            badge_width: 420.0,
            badge_name_max_size: 32.0,
            timestamp_size: 28.0,
            timestamp_gap: 24.0,
            timestamp_format: "%H:%M".to_string(),
        }
    }
}

impl CoverLayout {
    /// Thumbnail placement.
    pub fn thumb_rect(&self) -> Rect {
        let s = f64::from(self.thumb_size);
        Rect::from_origin_size(self.thumb_origin, (s, s))
    }

    /// Left edge of the text column.
    pub fn text_left(&self) -> f64 {
        self.thumb_rect().x1 + self.text_gap
    }

    /// Width available to text between the thumbnail and the right margin.
    pub fn text_width(&self) -> f64 {
        (f64::from(self.canvas.width) - self.right_margin - self.text_left()).max(0.0)
    }

    /// Top of the title line.
    pub fn title_top(&self) -> f64 {
        self.thumb_origin.y
    }

    /// Listener badge box, anchored at the bottom-right corner.
    pub fn badge_rect(&self) -> Rect {
        let h = f64::from(self.badge_avatar_size);
        let x1 = f64::from(self.canvas.width) - self.right_margin;
        let y1 = f64::from(self.canvas.height) - self.bottom_margin;
        Rect::new(x1 - self.badge_width, y1 - h, x1, y1)
    }

    /// Lowest y an artist row may reach.
    pub fn artists_bottom(&self, has_badge: bool) -> f64 {
        if has_badge {
            self.badge_rect().y0 - self.line_gap
        } else {
            f64::from(self.canvas.height) - self.bottom_margin
        }
    }

    /// Top of the timestamp caption.
    pub fn timestamp_top(&self) -> f64 {
        self.thumb_rect().y1 + self.timestamp_gap
    }
}

/// Rectangle with quadratic-curve corners of radius `radius` (clamped to half the short side).
pub fn rounded_rect_path(rect: Rect, radius: f64) -> BezPath {
    let r = radius.max(0.0).min(rect.width() / 2.0).min(rect.height() / 2.0);
    let (x0, y0, x1, y1) = (rect.x0, rect.y0, rect.x1, rect.y1);

    let mut path = BezPath::new();
    path.move_to((x0 + r, y0));
    path.line_to((x1 - r, y0));
    path.quad_to((x1, y0), (x1, y0 + r));
    path.line_to((x1, y1 - r));
    path.quad_to((x1, y1), (x1 - r, y1));
    path.line_to((x0 + r, y1));
    path.quad_to((x0, y1), (x0, y1 - r));
    path.line_to((x0, y0 + r));
    path.quad_to((x0, y0), (x0 + r, y0));
    path.close_path();
    path
}

#[cfg(test)]
#[path = "../../tests/unit/render/layout.rs"]
mod tests;
