//! Image normalisation before the image is handed to the model.
//!
//! Canvas drawings arrive as light strokes on a dark (or transparent)
//! background. The model reads dark ink on a light page best, so the image
//! is reduced to luminance, inverted, and its contrast doubled.

use image::{imageops, DynamicImage, GrayImage, Luma};

/// Multiplicative contrast factor applied around the mean luminance.
pub const CONTRAST_FACTOR: f32 = 2.0;

/// Produce the grayscale, inverted, contrast-enhanced form of `img`.
pub fn normalize(img: &DynamicImage) -> GrayImage {
    let gray = to_luma_601(img);

    let mut inverted = gray.clone();
    imageops::invert(&mut inverted);

    enhance_contrast(&inverted, CONTRAST_FACTOR)
}

/// Luminance with ITU-R 601-2 weights, `L = R*299/1000 + G*587/1000 + B*114/1000`.
///
/// Fixed point in 16 bits, rounded to nearest. Alpha is discarded.
pub fn to_luma_601(img: &DynamicImage) -> GrayImage {
    let rgb = img.to_rgb8();
    GrayImage::from_fn(rgb.width(), rgb.height(), |x, y| {
        let [r, g, b] = rgb.get_pixel(x, y).0;
        let l = (r as u32 * 19595 + g as u32 * 38470 + b as u32 * 7471 + 0x8000) >> 16;
        Luma([l as u8])
    })
}

/// Scale every pixel's distance from the mean luminance by `factor`.
///
/// `out = mean + factor * (in - mean)`, clamped to `0..=255`, with the mean
/// rounded to the nearest integer first.
pub fn enhance_contrast(img: &GrayImage, factor: f32) -> GrayImage {
    let Some(mean) = mean_luminance(img) else {
        return img.clone();
    };

    GrayImage::from_fn(img.width(), img.height(), |x, y| {
        let value = img.get_pixel(x, y)[0] as f32;
        let scaled = mean + factor * (value - mean);
        Luma([scaled.round().clamp(0.0, 255.0) as u8])
    })
}

/// Rounded mean pixel value, or `None` for an empty image.
fn mean_luminance(img: &GrayImage) -> Option<f32> {
    let count = img.as_raw().len() as u64;
    if count == 0 {
        return None;
    }
    let sum: u64 = img.as_raw().iter().map(|&p| p as u64).sum();
    Some((sum as f64 / count as f64).round() as f32)
}
