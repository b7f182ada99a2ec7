use std::sync::Arc;

use image::imageops::FilterType;

use crate::{
    foundation::error::{CoverError, CoverResult},
    render::blur::{darken_in_place, gaussian_blur_rgba8},
    render::layout::CoverLayout,
};

/// Center-crop `src` to the target aspect ratio, then scale to `width`x`height` ("cover" fit).
///
/// The crop happens in source space, so the only allocation of target size is the output.
pub fn cover_fit(src: &image::RgbaImage, width: u32, height: u32) -> image::RgbaImage {
    let (sw, sh) = src.dimensions();
    if sw == 0 || sh == 0 || width == 0 || height == 0 {
        return image::RgbaImage::new(width, height);
    }
    let (cw, ch) = cover_crop(sw, sh, width, height);
    let crop = image::imageops::crop_imm(src, (sw - cw) / 2, (sh - ch) / 2, cw, ch).to_image();
    image::imageops::resize(&crop, width, height, FilterType::Triangle)
}

/// Largest `(w, h)` inside `sw`x`sh` with the aspect ratio of `width`x`height`.
fn cover_crop(sw: u32, sh: u32, width: u32, height: u32) -> (u32, u32) {
    // sw / sh > width / height, compared without division.
    if u64::from(sw) * u64::from(height) > u64::from(sh) * u64::from(width) {
        let cw = (f64::from(sh) * f64::from(width) / f64::from(height)).round() as u32;
        (cw.clamp(1, sw), sh)
    } else {
        let ch = (f64::from(sw) * f64::from(height) / f64::from(width)).round() as u32;
        (sw, ch.clamp(1, sh))
    }
}

/// Blurred, darkened full-canvas background built from album art.
///
/// Blurring happens on a reduced copy which is then scaled back up; the
/// result is fully opaque.
pub fn blurred_background(
    art: &image::RgbaImage,
    layout: &CoverLayout,
) -> CoverResult<image::RgbaImage> {
    let (w, h) = (layout.canvas.width, layout.canvas.height);
    let down = layout.background_downscale.max(1);
    let (sw, sh) = ((w / down).max(1), (h / down).max(1));

    let mut small = cover_fit(art, sw, sh);
    for px in small.pixels_mut() {
        px.0[3] = 255;
    }
    let mut small = gaussian_blur_rgba8(
        &small,
        layout.background_blur_radius,
        layout.background_blur_sigma,
    )?;
    darken_in_place(&mut small, layout.background_darken);
    Ok(image::imageops::resize(&small, w, h, FilterType::Triangle))
}

/// Square crop of `src` resized to `size`x`size`.
pub fn square_thumbnail(src: &image::RgbaImage, size: u32) -> image::RgbaImage {
    cover_fit(src, size, size)
}

/// Convert straight RGBA8 into a premultiplied `vello_cpu` image paint.
pub fn image_paint(img: &image::RgbaImage) -> CoverResult<vello_cpu::Image> {
    let (width, height) = img.dimensions();
    let w: u16 = width
        .try_into()
        .map_err(|_| CoverError::render("image width exceeds u16"))?;
    let h: u16 = height
        .try_into()
        .map_err(|_| CoverError::render("image height exceeds u16"))?;

    let mut may_have_opacities = false;
    let mut pixels = Vec::with_capacity(width as usize * height as usize);
    for px in img.pixels() {
        let [r, g, b, a] = px.0;
        may_have_opacities |= a != 255;
        let premul = |c: u8| -> u8 { ((u16::from(c) * u16::from(a) + 127) / 255) as u8 };
        pixels.push(vello_cpu::peniko::color::PremulRgba8 {
            r: premul(r),
            g: premul(g),
            b: premul(b),
            a,
        });
    }

    let pixmap = vello_cpu::Pixmap::from_parts_with_opacity(pixels, w, h, may_have_opacities);
    Ok(vello_cpu::Image {
        image: vello_cpu::ImageSource::Pixmap(Arc::new(pixmap)),
        sampler: vello_cpu::peniko::ImageSampler::default(),
    })
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
