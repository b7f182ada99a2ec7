use crate::{
    assets::fonts::CoverFonts,
    foundation::core::Rgba8,
    foundation::error::{CoverError, CoverResult},
};

/// Slack allowed between measured width and available width.
pub const FIT_TOLERANCE_PX: f32 = 0.5;
const MAX_FIT_PASSES: usize = 6;
const MIN_FONT_SIZE_PX: f32 = 1.0;

/// Shrink-to-fit: the largest size `<= max_size` whose measured width fits `available`.
///
/// Starts at `max_size` and scales linearly by `available / measured` until the
/// measurement fits. Never grows past `max_size`. Errors when the text cannot
/// fit above a 1px size or the measurement is unusable.
pub fn fit_font_size(
    max_size: f32,
    available: f32,
    mut measure: impl FnMut(f32) -> CoverResult<f32>,
) -> CoverResult<f32> {
    if !max_size.is_finite() || max_size <= 0.0 {
        return Err(CoverError::validation("max font size must be finite and > 0"));
    }
    if !available.is_finite() || available <= 0.0 {
        return Err(CoverError::validation("no horizontal space for text"));
    }

    let mut size = max_size;
    for _ in 0..MAX_FIT_PASSES {
        let width = measure(size)?;
        if width <= available + FIT_TOLERANCE_PX {
            return Ok(size);
        }
        if !width.is_finite() {
            return Err(CoverError::render("text measured to a non-finite width"));
        }
        // Strictly shrink even if the measurement is not proportional to size.
        size = (size * available / width).min(size * 0.98);
        if size < MIN_FONT_SIZE_PX {
            break;
        }
    }
    Err(CoverError::render("text does not fit the available width"))
}

/// A shaped line of text at its fitted size.
pub struct FittedText {
    /// Shaped layout ready to draw.
    pub layout: parley::Layout<Rgba8>,
    /// Chosen font size.
    pub size: f32,
}

impl FittedText {
    /// Advance width of the laid out text.
    pub fn width(&self) -> f32 {
        self.layout.width()
    }

    /// Line box height of the laid out text.
    pub fn height(&self) -> f32 {
        self.layout.height()
    }
}

/// Parley contexts bound to the banner font. One per composition.
pub struct TextLayoutEngine {
    font_ctx: parley::FontContext,
    layout_ctx: parley::LayoutContext<Rgba8>,
    family_name: String,
}

impl TextLayoutEngine {
    /// Register `fonts` and remember its family name.
    pub fn new(fonts: &CoverFonts) -> CoverResult<Self> {
        let mut font_ctx = parley::FontContext::default();
        let families = font_ctx
            .collection
            .register_fonts(parley::fontique::Blob::from(fonts.bytes().to_vec()), None);
        if families.is_empty() {
            return Err(CoverError::validation(
                "no font families registered from font bytes",
            ));
        }
        // Glyphs are painted from `fonts.index()`, so shaping must use that face's family.
        let family_id = families
            .iter()
            .find(|(_, faces)| faces.iter().any(|f| f.index() == fonts.index()))
            .map(|(id, _)| *id)
            .ok_or_else(|| {
                CoverError::validation(format!(
                    "font face {} not found in font bytes",
                    fonts.index()
                ))
            })?;
        let family_name = font_ctx
            .collection
            .family_name(family_id)
            .ok_or_else(|| CoverError::validation("registered font family has no name"))?
            .to_string();

        Ok(Self {
            font_ctx,
            layout_ctx: parley::LayoutContext::new(),
            family_name,
        })
    }

    /// Family name of the registered font.
    pub fn family_name(&self) -> &str {
        &self.family_name
    }

    /// Shape `text` on a single line.
    pub fn layout(
        &mut self,
        text: &str,
        size_px: f32,
        brush: Rgba8,
    ) -> CoverResult<parley::Layout<Rgba8>> {
        if !size_px.is_finite() || size_px <= 0.0 {
            return Err(CoverError::validation(
                "text size_px must be finite and > 0",
            ));
        }

        let mut builder = self
            .layout_ctx
            .ranged_builder(&mut self.font_ctx, text, 1.0, true);
        builder.push_default(parley::style::StyleProperty::FontStack(
            parley::style::FontStack::Source(std::borrow::Cow::Owned(self.family_name.clone())),
        ));
        builder.push_default(parley::style::StyleProperty::FontSize(size_px));
        builder.push_default(parley::style::StyleProperty::Brush(brush));

        let mut layout: parley::Layout<Rgba8> = builder.build(text);
        layout.break_all_lines(None);
        Ok(layout)
    }

    /// Shrink-to-fit `text` into `available` pixels, starting at `max_size`.
    pub fn fit(
        &mut self,
        text: &str,
        max_size: f32,
        available: f32,
        brush: Rgba8,
    ) -> CoverResult<FittedText> {
        let size = fit_font_size(max_size, available, |s| {
            Ok(self.layout(text, s, brush)?.width())
        })?;
        let layout = self.layout(text, size, brush)?;
        Ok(FittedText { layout, size })
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/text.rs"]
mod tests;
