//! PNG output of a rendered [`PixelSurface`].
//!
//! This module is feature-gated behind `png` (default on) so that WASM builds
//! can depend on the `engines` crate without pulling in the `image` crate.
//! Rasterization itself lives in [`crate::pixel`] (always available).

use cosmos_core::error::EngineError;
use std::path::Path;

use crate::pixel::PixelSurface;

/// Writes the surface as a PNG image at its physical resolution.
///
/// Returns `EngineError::InvalidDimensions` if the surface is empty or its
/// dimensions overflow `u32`, or `EngineError::Io` on write failure.
pub fn write_png(surface: &PixelSurface, path: &Path) -> Result<(), EngineError> {
    if surface.width() == 0 || surface.height() == 0 {
        return Err(EngineError::InvalidDimensions);
    }
    let w = u32::try_from(surface.width()).map_err(|_| EngineError::InvalidDimensions)?;
    let h = u32::try_from(surface.height()).map_err(|_| EngineError::InvalidDimensions)?;
    let img = image::RgbaImage::from_raw(w, h, surface.to_rgba8())
        .ok_or_else(|| EngineError::Io("RGBA buffer size mismatch".into()))?;
    img.save(path).map_err(|e| EngineError::Io(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmos_core::{Rgba, Surface};

    #[test]
    fn write_png_round_trip() {
        let mut surface = PixelSurface::new(16.0, 8.0, 2.0);
        surface.fill_rect(0.0, 0.0, 16.0, 8.0, Rgba::from_u8(5, 7, 13, 1.0));
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("test.png");

        write_png(&surface, &path).unwrap();

        let img = image::open(&path).unwrap().to_rgba8();
        assert_eq!(img.width(), 32);
        assert_eq!(img.height(), 16);
        assert_eq!(img.get_pixel(3, 3).0, [5, 7, 13, 255]);
    }

    #[test]
    fn write_png_rejects_empty_surface() {
        let surface = PixelSurface::new(0.0, 10.0, 1.0);
        let dir = tempfile::tempdir().unwrap();
        let result = write_png(&surface, &dir.path().join("empty.png"));
        assert!(matches!(result, Err(EngineError::InvalidDimensions)));
    }

    #[test]
    fn write_png_reports_io_errors() {
        let surface = PixelSurface::new(4.0, 4.0, 1.0);
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.png");
        assert!(matches!(write_png(&surface, &path), Err(EngineError::Io(_))));
    }
}
