//! Color utilities
//!
//! Helper functions for alpha layers and pixel blending.

use egui::{Color32, ColorImage};
use image::{Rgba, RgbImage, RgbaImage};

/// Build a scratch RGBA layer from an RGB frame with a uniform alpha
///
/// The frame is copied onto a transparent layer of the same size, then
/// every pixel's alpha is scaled by `alpha / 255`.
pub fn with_uniform_alpha(frame: &RgbImage, alpha: u8) -> RgbaImage {
    let mut layer = RgbaImage::new(frame.width(), frame.height());
    for (dst, src) in layer.pixels_mut().zip(frame.pixels()) {
        *dst = Rgba([src[0], src[1], src[2], 255]);
    }
    for pixel in layer.pixels_mut() {
        pixel[3] = scale_alpha(pixel[3], alpha);
    }
    layer
}

/// Multiply two alpha values in 0..=255
pub fn scale_alpha(a: u8, b: u8) -> u8 {
    ((u16::from(a) * u16::from(b) + 127) / 255) as u8
}

/// Source-over blend of `fg` onto `bg`
pub fn blend_rgba(bg: Rgba<u8>, fg: Rgba<u8>) -> Rgba<u8> {
    match fg[3] {
        0 => return bg,
        255 => return fg,
        _ => {}
    }

    let fg_alpha = f32::from(fg[3]) / 255.0;
    let bg_alpha = f32::from(bg[3]) / 255.0;

    let out_alpha = fg_alpha + bg_alpha * (1.0 - fg_alpha);
    if out_alpha < 0.001 {
        return Rgba([0, 0, 0, 0]);
    }

    let channel = |f: u8, b: u8| {
        ((f32::from(f) * fg_alpha + f32::from(b) * bg_alpha * (1.0 - fg_alpha)) / out_alpha)
            .round()
            .clamp(0.0, 255.0) as u8
    };

    Rgba([
        channel(fg[0], bg[0]),
        channel(fg[1], bg[1]),
        channel(fg[2], bg[2]),
        (out_alpha * 255.0).round() as u8,
    ])
}

/// Convert an RGBA canvas into an egui image for texture upload
pub fn to_color_image(canvas: &RgbaImage) -> ColorImage {
    let size = [canvas.width() as usize, canvas.height() as usize];
    let pixels = canvas
        .pixels()
        .map(|p| Color32::from_rgba_unmultiplied(p[0], p[1], p[2], p[3]))
        .collect();
    ColorImage { size, pixels }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;

    #[test]
    fn test_uniform_alpha_layer() {
        let frame = RgbImage::from_pixel(3, 2, Rgb([10, 20, 30]));
        let layer = with_uniform_alpha(&frame, 128);
        assert_eq!(layer.dimensions(), (3, 2));
        assert!(layer.pixels().all(|p| *p == Rgba([10, 20, 30, 128])));

        let opaque = with_uniform_alpha(&frame, 255);
        assert!(opaque.pixels().all(|p| p[3] == 255));
    }

    #[test]
    fn test_scale_alpha() {
        assert_eq!(scale_alpha(255, 255), 255);
        assert_eq!(scale_alpha(255, 0), 0);
        assert_eq!(scale_alpha(255, 26), 26);
        assert_eq!(scale_alpha(128, 128), 64);
    }

    #[test]
    fn test_blend_rgba() {
        let bg = Rgba([0, 0, 0, 255]);
        // Fully transparent foreground leaves background
        assert_eq!(blend_rgba(bg, Rgba([255, 255, 255, 0])), bg);
        // Fully opaque foreground replaces background
        assert_eq!(blend_rgba(bg, Rgba([1, 2, 3, 255])), Rgba([1, 2, 3, 255]));
        // Half blend over opaque black
        let result = blend_rgba(bg, Rgba([200, 200, 200, 128]));
        assert_eq!(result[3], 255);
        assert!(result[0] >= 95 && result[0] <= 105);
    }

    #[test]
    fn test_to_color_image() {
        let canvas = RgbaImage::from_pixel(2, 3, Rgba([5, 6, 7, 255]));
        let image = to_color_image(&canvas);
        assert_eq!(image.size, [2, 3]);
        assert_eq!(image.pixels[0], Color32::from_rgb(5, 6, 7));
    }
}
