use std::sync::Arc;

use anyhow::Context;

use crate::foundation::error::CoverResult;

#[derive(Clone, Debug)]
/// Decoded raster image in straight RGBA8 form.
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Pixels, row-major, straight alpha.
    pub rgba: Arc<image::RgbaImage>,
}

/// Decode any format the `image` crate recognizes.
pub fn decode_image(bytes: &[u8]) -> CoverResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();
    if width == 0 || height == 0 {
        return Err(crate::CoverError::validation("decoded image is empty"));
    }

    Ok(PreparedImage {
        width,
        height,
        rgba: Arc::new(rgba),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
