//! PNG previews of tile textures.

use std::path::{Path, PathBuf};

use image::RgbaImage;
use terratile_terrain::{ColorRaster, DebugImage, ScalarField, TileCoord};

/// File name of a tile's preview, e.g. `tile_1_0_height.png`.
pub fn preview_path(dir: &Path, coord: TileCoord, layer: &str) -> PathBuf {
    dir.join(format!("tile_{}_{}_{layer}.png", coord.x, coord.z))
}

/// Write `raster` as an RGBA PNG.
pub fn export_raster(raster: &ColorRaster, path: &Path) -> Result<(), image::ImageError> {
    export_image(DebugImage::from_raster(raster), path)
}

/// Write a `[0, 1]` scalar field as a greyscale PNG.
pub fn export_field(field: &ScalarField, path: &Path) -> Result<(), image::ImageError> {
    export_image(DebugImage::from_field(field, 0.0, 1.0), path)
}

fn export_image(image: DebugImage, path: &Path) -> Result<(), image::ImageError> {
    let DebugImage {
        width,
        height,
        pixels,
    } = image;
    let img = RgbaImage::from_raw(width, height, pixels).ok_or_else(|| {
        image::ImageError::Parameter(image::error::ParameterError::from_kind(
            image::error::ParameterErrorKind::DimensionMismatch,
        ))
    })?;
    img.save(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use terratile_terrain::{Grid, Rgba};

    #[test]
    fn test_preview_path() {
        let path = preview_path(Path::new("out"), TileCoord::new(1, 0), "heat");
        assert_eq!(path, Path::new("out").join("tile_1_0_heat.png"));
    }

    #[test]
    fn test_export_writes_png() {
        let dir = tempfile::tempdir().unwrap();
        let raster = Grid::from_fn(4, 3, |x, _| {
            if x == 0 { Rgba::WHITE } else { Rgba::BLACK }
        });
        let path = dir.path().join("preview.png");
        export_raster(&raster, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        // Pixel rows follow the grid's x axis.
        assert_eq!(img.dimensions(), (3, 4));
        assert_eq!(img.get_pixel(0, 0).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(0, 1).0, [0, 0, 0, 255]);
    }

    #[test]
    fn test_export_field_greyscale() {
        let dir = tempfile::tempdir().unwrap();
        let field = Grid::from_fn(2, 2, |x, z| if (x, z) == (1, 0) { 1.0 } else { 0.0 });
        let path = dir.path().join("field.png");
        export_field(&field, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.get_pixel(0, 1).0, [255, 255, 255, 255]);
        assert_eq!(img.get_pixel(1, 0).0, [0, 0, 0, 255]);
    }
}
