use std::io::Cursor;

use anyhow::Context;

use crate::foundation::error::{CoverError, CoverResult};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
/// Encoding handed to the publisher.
pub enum OutputFormat {
    /// Lossless PNG.
    #[default]
    Png,
    /// Baseline JPEG (alpha dropped).
    Jpeg,
}

impl OutputFormat {
    /// Conventional file extension.
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Jpeg => "jpg",
        }
    }
}

#[derive(Clone, Debug)]
/// Rendered banner pixels.
pub struct CoverFrame {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8, row-major, tightly packed.
    pub data: Vec<u8>,
}

impl CoverFrame {
    /// Straight-alpha copy of the pixels.
    pub fn to_rgba_image(&self) -> CoverResult<image::RgbaImage> {
        let mut data = self.data.clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            if a == 0 || a == 255 {
                continue;
            }
            for c in px.iter_mut().take(3) {
                *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
            }
        }
        image::RgbaImage::from_raw(self.width, self.height, data)
            .ok_or_else(|| CoverError::render("frame byte length does not match its size"))
    }

    /// Encode as `format`.
    pub fn encode(&self, format: OutputFormat) -> CoverResult<EncodedCover> {
        let rgba = image::DynamicImage::ImageRgba8(self.to_rgba_image()?);
        let mut bytes = Vec::new();
        match format {
            OutputFormat::Png => rgba
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Png)
                .context("encode cover as png")?,
            OutputFormat::Jpeg => image::DynamicImage::ImageRgb8(rgba.to_rgb8())
                .write_to(&mut Cursor::new(&mut bytes), image::ImageFormat::Jpeg)
                .context("encode cover as jpeg")?,
        }
        Ok(EncodedCover {
            format,
            width: self.width,
            height: self.height,
            bytes,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
/// Encoded banner as accepted by [`crate::ImagePublisher::publish`].
pub struct EncodedCover {
    /// Encoding of `bytes`.
    pub format: OutputFormat,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Encoded file contents.
    pub bytes: Vec<u8>,
}

#[cfg(test)]
#[path = "../../tests/unit/render/frame.rs"]
mod tests;
