use std::fmt::Write as _;

use crate::{
    assets::{decode::PreparedImage, fonts::CoverFonts, store::PreparedCoverAssets},
    capability::CoverRenderer,
    foundation::core::{BezPath, Point, Rect, Rgba8},
    foundation::error::CoverResult,
    model::cover::{CoverRequest, avatars_first},
    render::{
        frame::{CoverFrame, EncodedCover, OutputFormat},
        layout::{CoverLayout, rounded_rect_path},
        raster::{blurred_background, image_paint, square_thumbnail},
        text::{FittedText, TextLayoutEngine},
    },
};

/// One drawable piece of the banner.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CoverElement {
    /// Blurred album art behind everything.
    ArtBackground,
    /// Flat fill used when there is no usable album art.
    FlatBackground,
    /// Sharp album art thumbnail.
    Thumbnail,
    /// Track title.
    Title,
    /// Line under the title.
    Subtitle,
    /// Listener avatar in the badge.
    BadgeAvatar,
    /// Listener name in the badge.
    BadgeName,
    /// Avatar of the n-th artist row (display order).
    ArtistAvatar(usize),
    /// Name of the n-th artist row (display order).
    ArtistName(usize),
    /// Time caption under the thumbnail.
    Timestamp,
}

/// Where each element ended up, and which ones were skipped.
#[derive(Clone, Debug, Default)]
pub struct ComposeReport {
    /// Drawn elements with their bounds.
    pub placed: Vec<(CoverElement, Rect)>,
    /// Elements that were wanted but could not be drawn.
    pub skipped: Vec<CoverElement>,
}

impl ComposeReport {
    /// Bounds of a drawn element.
    pub fn rect_of(&self, element: CoverElement) -> Option<Rect> {
        self.placed
            .iter()
            .find(|(e, _)| *e == element)
            .map(|(_, r)| *r)
    }

    /// Whether `element` was drawn.
    pub fn contains(&self, element: CoverElement) -> bool {
        self.rect_of(element).is_some()
    }
}

/// Raster compositor for cover banners. Pure: no IO, no clock.
#[derive(Clone, Debug)]
pub struct Compositor {
    layout: CoverLayout,
    fonts: CoverFonts,
    format: OutputFormat,
}

impl Compositor {
    /// Compositor with the given geometry, font and output encoding.
    pub fn new(layout: CoverLayout, fonts: CoverFonts, format: OutputFormat) -> Self {
        Self {
            layout,
            fonts,
            format,
        }
    }

    /// Geometry in use.
    pub fn layout(&self) -> &CoverLayout {
        &self.layout
    }

    /// Render `request` into a frame.
    pub fn compose(
        &self,
        request: &CoverRequest,
        assets: &PreparedCoverAssets,
    ) -> CoverResult<CoverFrame> {
        self.compose_with_report(request, assets).map(|(frame, _)| frame)
    }

    /// Render `request` and report what was placed where.
    pub fn compose_with_report(
        &self,
        request: &CoverRequest,
        assets: &PreparedCoverAssets,
    ) -> CoverResult<(CoverFrame, ComposeReport)> {
        let layout = &self.layout;
        let (w, h) = layout.canvas.as_u16()?;
        let text = match TextLayoutEngine::new(&self.fonts) {
            Ok(engine) => Some(engine),
            Err(err) => {
                tracing::warn!(error = %err, "banner font unusable, text will be skipped");
                None
            }
        };
        let mut painter = Painter {
            ctx: vello_cpu::RenderContext::new(w, h),
            font: self.fonts.font_data(),
            text,
            layout,
            report: ComposeReport::default(),
        };

        let art = assets.image_opt(request.album_art_url.as_deref());
        painter.background(art)?;
        if let Some(art) = art {
            painter.thumbnail(art)?;
        } else if request.album_art_url.is_some() {
            painter.report.skipped.push(CoverElement::Thumbnail);
        }

        let mut y = layout.title_top();
        y = painter.text_line(
            CoverElement::Title,
            &request.title,
            layout.title_max_size,
            layout.text_color,
            y,
        )?;
        if let Some(subtitle) = request.subtitle.as_deref().filter(|s| !s.trim().is_empty()) {
            y = painter.text_line(
                CoverElement::Subtitle,
                subtitle,
                layout.subtitle_max_size,
                layout.secondary_text_color,
                y,
            )?;
        }

        if let Some(listener) = &request.listener {
            let avatar = assets.image_opt(listener.avatar_url.as_deref());
            painter.badge(&listener.display_name, avatar)?;
        }

        let bottom = layout.artists_bottom(request.listener.is_some());
        let mut row_top = y - layout.line_gap + layout.artists_gap;
        for (idx, artist) in avatars_first(&request.artists).into_iter().enumerate() {
            if row_top + layout.artist_row_height > bottom {
                tracing::debug!(
                    dropped = request.artists.len() - idx,
                    "artist rows overflow the canvas"
                );
                break;
            }
            let avatar = assets.image_opt(artist.avatar_url.as_deref());
            if avatar.is_none() && artist.avatar_url.is_some() {
                painter.report.skipped.push(CoverElement::ArtistAvatar(idx));
            }
            painter.artist_row(idx, &artist.name, avatar, row_top)?;
            row_top += layout.artist_row_height;
        }

        let mut caption = String::new();
        match write!(caption, "{}", request.stamped_at.format(&layout.timestamp_format)) {
            Ok(()) => painter.timestamp(&caption)?,
            Err(_) => {
                tracing::warn!(format = %layout.timestamp_format, "invalid timestamp format");
                painter.report.skipped.push(CoverElement::Timestamp);
            }
        }

        painter.finish()
    }
}

impl CoverRenderer for Compositor {
    fn render(
        &self,
        request: &CoverRequest,
        assets: &PreparedCoverAssets,
    ) -> CoverResult<EncodedCover> {
        let (frame, report) = self.compose_with_report(request, assets)?;
        if !report.skipped.is_empty() {
            tracing::info!(skipped = ?report.skipped, "banner rendered with missing elements");
        }
        frame.encode(self.format)
    }
}

struct Painter<'a> {
    ctx: vello_cpu::RenderContext,
    font: vello_cpu::peniko::FontData,
    text: Option<TextLayoutEngine>,
    layout: &'a CoverLayout,
    report: ComposeReport,
}

impl Painter<'_> {
    fn background(&mut self, art: Option<&PreparedImage>) -> CoverResult<()> {
        if let Some(art) = art {
            match blurred_background(&art.rgba, self.layout) {
                Ok(bg) => {
                    self.image(&bg, Point::ORIGIN)?;
                    self.place(CoverElement::ArtBackground, self.canvas_rect());
                    return Ok(());
                }
                Err(err) => {
                    tracing::warn!(error = %err, "background blur failed, using flat fill");
                    self.report.skipped.push(CoverElement::ArtBackground);
                }
            }
        }
        let canvas = self.canvas_rect();
        self.fill_rect(canvas, self.layout.background);
        self.place(CoverElement::FlatBackground, canvas);
        Ok(())
    }

    fn thumbnail(&mut self, art: &PreparedImage) -> CoverResult<()> {
        let rect = self.layout.thumb_rect();
        let thumb = square_thumbnail(&art.rgba, self.layout.thumb_size);
        self.image(&thumb, rect.origin())?;
        self.place(CoverElement::Thumbnail, rect);
        Ok(())
    }

    /// Draw one shrink-to-fit line in the text column; returns the next line's top.
    fn text_line(
        &mut self,
        element: CoverElement,
        text: &str,
        max_size: f32,
        color: Rgba8,
        top: f64,
    ) -> CoverResult<f64> {
        let left = self.layout.text_left();
        let width = self.layout.text_width();
        let height = match self.fit(element, text, max_size, width, color) {
            Some(fitted) => {
                let height = f64::from(fitted.height());
                let origin = Point::new(left, top);
                self.text(&fitted, origin);
                self.place(element, text_rect(origin, &fitted));
                height
            }
            None => f64::from(max_size),
        };
        Ok(top + height + self.layout.line_gap)
    }

    fn badge(&mut self, name: &str, avatar: Option<&PreparedImage>) -> CoverResult<()> {
        let rect = self.layout.badge_rect();
        let size = f64::from(self.layout.badge_avatar_size);
        let mut name_left = rect.x0;
        match avatar {
            Some(img) => {
                let avatar_rect = Rect::from_origin_size(rect.origin(), (size, size));
                self.rounded_image(img, avatar_rect, self.layout.badge_avatar_size)?;
                self.place(CoverElement::BadgeAvatar, avatar_rect);
                name_left += size + self.layout.avatar_gap;
            }
            None => self.report.skipped.push(CoverElement::BadgeAvatar),
        }

        let available = rect.x1 - name_left;
        let color = self.layout.text_color;
        let max_size = self.layout.badge_name_max_size;
        if let Some(fitted) = self.fit(CoverElement::BadgeName, name, max_size, available, color) {
            let origin = Point::new(name_left, rect.y0 + (size - f64::from(fitted.height())) / 2.0);
            self.text(&fitted, origin);
            self.place(CoverElement::BadgeName, text_rect(origin, &fitted));
        }
        Ok(())
    }

    fn artist_row(
        &mut self,
        idx: usize,
        name: &str,
        avatar: Option<&PreparedImage>,
        top: f64,
    ) -> CoverResult<()> {
        let layout = self.layout;
        let row_h = layout.artist_row_height;
        let size = f64::from(layout.artist_avatar_size);
        let mut name_left = layout.text_left();
        if let Some(img) = avatar {
            let avatar_rect =
                Rect::from_origin_size((name_left, top + (row_h - size) / 2.0), (size, size));
            self.rounded_image(img, avatar_rect, layout.artist_avatar_size)?;
            self.place(CoverElement::ArtistAvatar(idx), avatar_rect);
            name_left += size + layout.avatar_gap;
        }

        let available = layout.text_left() + layout.text_width() - name_left;
        let element = CoverElement::ArtistName(idx);
        let color = layout.secondary_text_color;
        if let Some(fitted) = self.fit(element, name, layout.artist_name_max_size, available, color) {
            let origin = Point::new(name_left, top + (row_h - f64::from(fitted.height())) / 2.0);
            self.text(&fitted, origin);
            self.place(element, text_rect(origin, &fitted));
        }
        Ok(())
    }

    fn timestamp(&mut self, caption: &str) -> CoverResult<()> {
        let Some(engine) = self.text.as_mut() else {
            self.report.skipped.push(CoverElement::Timestamp);
            return Ok(());
        };
        let color = self.layout.secondary_text_color;
        let layout = match engine.layout(caption, self.layout.timestamp_size, color) {
            Ok(layout) => layout,
            Err(err) => {
                tracing::warn!(error = %err, "timestamp layout failed");
                self.report.skipped.push(CoverElement::Timestamp);
                return Ok(());
            }
        };
        let fitted = FittedText {
            size: self.layout.timestamp_size,
            layout,
        };
        let thumb = self.layout.thumb_rect();
        let origin = Point::new(
            thumb.center().x - f64::from(fitted.width()) / 2.0,
            self.layout.timestamp_top(),
        );
        self.text(&fitted, origin);
        self.place(CoverElement::Timestamp, text_rect(origin, &fitted));
        Ok(())
    }

    fn finish(mut self) -> CoverResult<(CoverFrame, ComposeReport)> {
        let (w, h) = self.layout.canvas.as_u16()?;
        let mut pixmap = vello_cpu::Pixmap::new(w, h);
        self.ctx.flush();
        self.ctx.render_to_pixmap(&mut pixmap);
        let frame = CoverFrame {
            width: u32::from(w),
            height: u32::from(h),
            data: pixmap.data_as_u8_slice().to_vec(),
        };
        Ok((frame, self.report))
    }

    fn fit(
        &mut self,
        element: CoverElement,
        text: &str,
        max_size: f32,
        available: f64,
        color: Rgba8,
    ) -> Option<FittedText> {
        let Some(engine) = self.text.as_mut() else {
            self.report.skipped.push(element);
            return None;
        };
        match engine.fit(text, max_size, available as f32, color) {
            Ok(fitted) => Some(fitted),
            Err(err) => {
                tracing::warn!(?element, error = %err, "text skipped");
                self.report.skipped.push(element);
                None
            }
        }
    }

    fn place(&mut self, element: CoverElement, rect: Rect) {
        self.report.placed.push((element, rect));
    }

    fn canvas_rect(&self) -> Rect {
        Rect::new(
            0.0,
            0.0,
            f64::from(self.layout.canvas.width),
            f64::from(self.layout.canvas.height),
        )
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba8) {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
            color.r, color.g, color.b, color.a,
        ));
        self.ctx.fill_rect(&rect_to_cpu(rect));
    }

    fn image(&mut self, img: &image::RgbaImage, origin: Point) -> CoverResult<()> {
        let paint = image_paint(img)?;
        let (w, h) = img.dimensions();
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        self.ctx.set_paint(paint);
        self.ctx.fill_rect(&vello_cpu::kurbo::Rect::new(
            0.0,
            0.0,
            f64::from(w),
            f64::from(h),
        ));
        Ok(())
    }

    /// Avatar clipped to a rounded rectangle. The clip is popped before returning,
    /// also when drawing fails.
    fn rounded_image(&mut self, img: &PreparedImage, rect: Rect, size: u32) -> CoverResult<()> {
        let avatar = square_thumbnail(&img.rgba, size);
        let clip = rounded_rect_path(rect, self.layout.avatar_corner_radius);
        self.with_clip(&clip, |p| p.image(&avatar, rect.origin()))
    }

    fn with_clip(
        &mut self,
        clip: &BezPath,
        draw: impl FnOnce(&mut Self) -> CoverResult<()>,
    ) -> CoverResult<()> {
        self.ctx.set_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx.push_clip_layer(&bezpath_to_cpu(clip));
        let result = draw(self);
        self.ctx.pop_layer();
        result
    }

    fn text(&mut self, fitted: &FittedText, origin: Point) {
        self.ctx.set_paint_transform(vello_cpu::kurbo::Affine::IDENTITY);
        self.ctx
            .set_transform(vello_cpu::kurbo::Affine::translate((origin.x, origin.y)));
        for line in fitted.layout.lines() {
            for item in line.items() {
                let parley::layout::PositionedLayoutItem::GlyphRun(run) = item else {
                    continue;
                };

                let brush = run.style().brush;
                self.ctx.set_paint(vello_cpu::peniko::Color::from_rgba8(
                    brush.r, brush.g, brush.b, brush.a,
                ));

                let glyphs = run.positioned_glyphs().map(|g| vello_cpu::Glyph {
                    id: g.id,
                    x: g.x,
                    y: g.y,
                });
                self.ctx
                    .glyph_run(&self.font)
                    .font_size(run.run().font_size())
                    .fill_glyphs(glyphs);
            }
        }
    }
}

fn text_rect(origin: Point, fitted: &FittedText) -> Rect {
    Rect::from_origin_size(
        origin,
        (f64::from(fitted.width()), f64::from(fitted.height())),
    )
}

fn rect_to_cpu(r: Rect) -> vello_cpu::kurbo::Rect {
    vello_cpu::kurbo::Rect::new(r.x0, r.y0, r.x1, r.y1)
}

fn point_to_cpu(p: Point) -> vello_cpu::kurbo::Point {
    vello_cpu::kurbo::Point::new(p.x, p.y)
}

fn bezpath_to_cpu(path: &BezPath) -> vello_cpu::kurbo::BezPath {
    use kurbo::PathEl;

    let mut out = vello_cpu::kurbo::BezPath::new();
    for &el in path.elements() {
        match el {
            PathEl::MoveTo(p) => out.move_to(point_to_cpu(p)),
            PathEl::LineTo(p) => out.line_to(point_to_cpu(p)),
            PathEl::QuadTo(p1, p2) => out.quad_to(point_to_cpu(p1), point_to_cpu(p2)),
            PathEl::CurveTo(p1, p2, p3) => {
                out.curve_to(point_to_cpu(p1), point_to_cpu(p2), point_to_cpu(p3));
            }
            PathEl::ClosePath => out.close_path(),
        }
    }
    out
}

#[cfg(test)]
#[path = "../../tests/unit/render/compose.rs"]
mod tests;
