//! 8-bit image conversion of rasters and fields for previews and debugging.

use crate::classify::ColorRaster;
use crate::field::ScalarField;
use crate::gradient::Rgba;

/// A 2D image stored as row-major RGBA8 pixels.
///
/// Grids map to images with `z` along the pixel row and `x` down the
/// columns, i.e. pixel `(px, py)` shows cell `(x = py, z = px)`. This matches
/// the order the texture pixels were uploaded in.
#[derive(Clone, Debug, PartialEq)]
pub struct DebugImage {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// Pixel data in row-major RGBA format. Length = `width * height * 4`.
    pub pixels: Vec<u8>,
}

impl DebugImage {
    /// Create a new black (all-zero) image with the given dimensions.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Set a single pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn set_pixel(&mut self, x: u32, y: u32, rgba: [u8; 4]) {
        let idx = ((y * self.width + x) * 4) as usize;
        self.pixels[idx..idx + 4].copy_from_slice(&rgba);
    }

    /// Get a pixel's RGBA value.
    ///
    /// # Panics
    ///
    /// Panics if `x >= width` or `y >= height`.
    pub fn get_pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let idx = ((y * self.width + x) * 4) as usize;
        [
            self.pixels[idx],
            self.pixels[idx + 1],
            self.pixels[idx + 2],
            self.pixels[idx + 3],
        ]
    }

    /// Returns `(width, height)`.
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Convert a color raster.
    pub fn from_raster(raster: &ColorRaster) -> Self {
        let mut image = Self::new(raster.height() as u32, raster.width() as u32);
        for ((x, z), color) in raster.iter() {
            image.set_pixel(z as u32, x as u32, color.to_rgba8());
        }
        image
    }

    /// Render a scalar field as greyscale, mapping `[lo, hi]` to black..white.
    pub fn from_field(field: &ScalarField, lo: f64, hi: f64) -> Self {
        let span = hi - lo;
        let mut image = Self::new(field.height() as u32, field.width() as u32);
        for ((x, z), &v) in field.iter() {
            let t = if span > 0.0 { (v - lo) / span } else { 0.5 };
            let color = Rgba::BLACK.lerp(Rgba::WHITE, t.clamp(0.0, 1.0) as f32);
            image.set_pixel(z as u32, x as u32, color.to_rgba8());
        }
        image
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::Grid;

    #[test]
    fn test_debug_image_correct_dimensions() {
        let image = DebugImage::new(256, 128);
        assert_eq!(image.dimensions(), (256, 128));
        assert_eq!(image.pixels.len(), 256 * 128 * 4);
    }

    #[test]
    fn test_get_pixel_roundtrip() {
        let mut image = DebugImage::new(8, 8);
        image.set_pixel(2, 3, [10, 20, 30, 40]);
        assert_eq!(image.get_pixel(2, 3), [10, 20, 30, 40]);
    }

    #[test]
    fn test_raster_orientation() {
        let raster = Grid::from_fn(3, 2, |x, z| {
            if (x, z) == (2, 1) {
                Rgba::WHITE
            } else {
                Rgba::BLACK
            }
        });
        let image = DebugImage::from_raster(&raster);
        assert_eq!(image.dimensions(), (2, 3));
        assert_eq!(image.get_pixel(1, 2), [255, 255, 255, 255]);
        assert_eq!(image.get_pixel(0, 2), [0, 0, 0, 255]);
    }

    #[test]
    fn test_field_greyscale() {
        let field = Grid::from_fn(1, 3, |_, z| z as f64 * 0.5);
        let image = DebugImage::from_field(&field, 0.0, 1.0);
        assert_eq!(image.get_pixel(0, 0), [0, 0, 0, 255]);
        assert_eq!(image.get_pixel(1, 0), [128, 128, 128, 255]);
        assert_eq!(image.get_pixel(2, 0), [255, 255, 255, 255]);
    }
}
