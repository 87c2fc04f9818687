//! Render targets
//!
//! In-memory drawable surfaces that accept positioned alpha composites.

use image::RgbaImage;

use crate::utils::color::blend_rgba;

/// A surface the video layer can be composited onto
pub trait RenderTarget {
    /// Source-over blend `layer` with its top-left corner at `position`
    ///
    /// Parts of the layer falling outside the surface are clipped.
    fn composite(&mut self, layer: &RgbaImage, position: (i64, i64));
}

impl RenderTarget for RgbaImage {
    fn composite(&mut self, layer: &RgbaImage, position: (i64, i64)) {
        let (x0, y0) = position;
        let (width, height) = (i64::from(self.width()), i64::from(self.height()));

        for (lx, ly, src) in layer.enumerate_pixels() {
            let x = x0 + i64::from(lx);
            let y = y0 + i64::from(ly);
            if x < 0 || y < 0 || x >= width || y >= height {
                continue;
            }
            let dst = self.get_pixel_mut(x as u32, y as u32);
            *dst = blend_rgba(*dst, *src);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn test_composite_clips_to_surface() {
        let mut stage = RgbaImage::from_pixel(4, 4, Rgba([0, 0, 0, 255]));
        let layer = RgbaImage::from_pixel(3, 3, Rgba([9, 9, 9, 255]));

        stage.composite(&layer, (-1, 2));

        assert_eq!(*stage.get_pixel(0, 2), Rgba([9, 9, 9, 255]));
        assert_eq!(*stage.get_pixel(1, 3), Rgba([9, 9, 9, 255]));
        assert_eq!(*stage.get_pixel(2, 2), Rgba([0, 0, 0, 255]));
        assert_eq!(*stage.get_pixel(0, 1), Rgba([0, 0, 0, 255]));
    }

    #[test]
    fn test_composite_transparent_layer_is_invisible() {
        let mut stage = RgbaImage::from_pixel(2, 2, Rgba([50, 60, 70, 255]));
        let before = stage.clone();
        let layer = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 0]));

        stage.composite(&layer, (0, 0));
        assert_eq!(stage, before);
    }

    #[test]
    fn test_composite_far_offscreen() {
        let mut stage = RgbaImage::from_pixel(2, 2, Rgba([1, 1, 1, 255]));
        let before = stage.clone();
        let layer = RgbaImage::from_pixel(2, 2, Rgba([255, 0, 0, 255]));

        stage.composite(&layer, (100, -100));
        assert_eq!(stage, before);
    }
}
