use crate::foundation::error::{CoverError, CoverResult};

#[derive(Clone, Copy)]
enum Axis {
    Horizontal,
    Vertical,
}

/// Separable gaussian blur over a tightly packed RGBA8 image.
///
/// Weights are fixed-point (Q16) and sum to exactly 1.0, so flat regions are
/// preserved bit for bit. Edges clamp.
pub fn gaussian_blur_rgba8(
    src: &image::RgbaImage,
    radius: u32,
    sigma: f32,
) -> CoverResult<image::RgbaImage> {
    if radius == 0 {
        return Ok(src.clone());
    }
    let (w, h) = src.dimensions();
    let kernel = gaussian_kernel_q16(radius, sigma)?;

    let mut tmp = image::RgbaImage::new(w, h);
    let mut out = image::RgbaImage::new(w, h);
    convolve(src, &mut tmp, &kernel, Axis::Horizontal);
    convolve(&tmp, &mut out, &kernel, Axis::Vertical);
    Ok(out)
}

fn gaussian_kernel_q16(radius: u32, sigma: f32) -> CoverResult<Vec<u32>> {
    if !sigma.is_finite() || sigma <= 0.0 {
        return Err(CoverError::validation("blur sigma must be > 0"));
    }

    let r = radius as i32;
    let denom = 2.0 * f64::from(sigma) * f64::from(sigma);
    let weights_f: Vec<f64> = (-r..=r)
        .map(|i| (-f64::from(i * i) / denom).exp())
        .collect();
    let sum: f64 = weights_f.iter().sum();
    if sum <= 0.0 {
        return Err(CoverError::render("gaussian kernel sum is zero"));
    }

    let mut weights: Vec<u32> = weights_f
        .iter()
        .map(|wf| ((wf / sum) * 65536.0).round().clamp(0.0, 65536.0) as u32)
        .collect();
    let acc: i64 = weights.iter().map(|&q| i64::from(q)).sum();
    let mid = weights.len() / 2;
    weights[mid] = (i64::from(weights[mid]) + (65536 - acc)).clamp(0, 65536) as u32;
    Ok(weights)
}

fn convolve(src: &image::RgbaImage, dst: &mut image::RgbaImage, k: &[u32], axis: Axis) {
    let radius = (k.len() / 2) as i64;
    let (w, h) = src.dimensions();
    let (w, h) = (i64::from(w), i64::from(h));
    for y in 0..h {
        for x in 0..w {
            let mut acc = [0u64; 4];
            for (ki, &kw) in k.iter().enumerate() {
                let d = ki as i64 - radius;
                let (sx, sy) = match axis {
                    Axis::Horizontal => ((x + d).clamp(0, w - 1), y),
                    Axis::Vertical => (x, (y + d).clamp(0, h - 1)),
                };
                let px = src.get_pixel(sx as u32, sy as u32);
                for (a, &c) in acc.iter_mut().zip(px.0.iter()) {
                    *a += u64::from(kw) * u64::from(c);
                }
            }
            let out = dst.get_pixel_mut(x as u32, y as u32);
            for (o, a) in out.0.iter_mut().zip(acc) {
                *o = ((a + 32768) >> 16).min(255) as u8;
            }
        }
    }
}

/// Scale color channels by `factor` (clamped to `[0, 1]`), leaving alpha alone.
pub fn darken_in_place(img: &mut image::RgbaImage, factor: f32) {
    let f = factor.clamp(0.0, 1.0);
    for px in img.pixels_mut() {
        for c in px.0.iter_mut().take(3) {
            *c = (f32::from(*c) * f).round() as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/blur.rs"]
mod tests;
