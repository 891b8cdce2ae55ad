//! # Surfaces
//!
//! CPU-side RGBA pixel buffers. Every cached sprite, spritesheet cell and baked
//! tilemap is a [`Surface`]; platforms upload them to textures on first use.

use crate::scale::ScaleFactor;
use crate::{PixieError, PixieResult};
use image::imageops::{self, FilterType};
use image::{Rgba, RgbaImage};
use std::fmt;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_SURFACE_ID: AtomicU64 = AtomicU64::new(1);

/// Largest width or height of a scaled or baked surface, in pixels.
///
/// Matches the per-side texture limit of the macroquad backend.
pub const MAX_SURFACE_SIDE: u32 = u16::MAX as u32;

/// Stable identity of a surface's pixel content.
///
/// Platforms key their texture caches on this; surfaces never change after
/// construction so one id always means the same pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SurfaceId(u64);

impl SurfaceId {
    fn next() -> Self {
        Self(NEXT_SURFACE_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// Immutable RGBA pixel buffer.
#[derive(Clone)]
pub struct Surface {
    id: SurfaceId,
    pixels: RgbaImage,
}

impl Surface {
    /// Wraps decoded pixels in a new surface.
    pub fn new(pixels: RgbaImage) -> Self {
        Self {
            id: SurfaceId::next(),
            pixels,
        }
    }

    pub fn id(&self) -> SurfaceId {
        self.id
    }

    pub fn width(&self) -> u32 {
        self.pixels.width()
    }

    pub fn height(&self) -> u32 {
        self.pixels.height()
    }

    pub fn size(&self) -> (u32, u32) {
        self.pixels.dimensions()
    }

    pub fn pixels(&self) -> &RgbaImage {
        &self.pixels
    }

    /// Reads one pixel, `None` outside the surface.
    pub fn pixel(&self, x: u32, y: u32) -> Option<Rgba<u8>> {
        self.pixels.get_pixel_checked(x, y).copied()
    }

    /// Returns a nearest-neighbour copy scaled by an integer factor.
    ///
    /// # Errors
    ///
    /// Fails with [`PixieError::SurfaceTooLarge`] if either scaled side would
    /// exceed [`MAX_SURFACE_SIDE`].
    pub fn scaled(&self, scale: ScaleFactor) -> PixieResult<Surface> {
        if scale == ScaleFactor::ONE {
            return Ok(Surface::new(self.pixels.clone()));
        }
        Ok(Surface::new(scale_pixels(&self.pixels, scale)?))
    }

    /// Copies a rectangular region into a new surface.
    pub fn region(&self, x: u32, y: u32, width: u32, height: u32) -> Surface {
        Surface::new(imageops::crop_imm(&self.pixels, x, y, width, height).to_image())
    }
}

impl fmt::Debug for Surface {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Surface")
            .field("id", &self.id)
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}

/// Checks a surface size computed in 64 bits against [`MAX_SURFACE_SIDE`].
pub(crate) fn checked_size(width: u64, height: u64) -> PixieResult<(u32, u32)> {
    let limit = u64::from(MAX_SURFACE_SIDE);
    if width > limit || height > limit {
        return Err(PixieError::SurfaceTooLarge { width, height });
    }
    // both sides fit in u16 here
    Ok((width as u32, height as u32))
}

/// Nearest-neighbour integer upscale.
pub(crate) fn scale_pixels(pixels: &RgbaImage, scale: ScaleFactor) -> PixieResult<RgbaImage> {
    let factor = u64::from(scale.get());
    let (width, height) = checked_size(
        u64::from(pixels.width()) * factor,
        u64::from(pixels.height()) * factor,
    )?;
    Ok(imageops::resize(pixels, width, height, FilterType::Nearest))
}

/// Makes every pixel whose RGB equals `key` fully transparent.
pub(crate) fn apply_color_key(pixels: &mut RgbaImage, key: [u8; 3]) {
    for pixel in pixels.pixels_mut() {
        if pixel.0[..3] == key {
            pixel.0[3] = 0;
        }
    }
}

/// Where a sprite or spritesheet gets its pixels from.
#[derive(Clone)]
pub enum ImageSource {
    /// Image file decoded on materialization
    File(PathBuf),
    /// Pixels already in memory
    Pixels(RgbaImage),
}

impl ImageSource {
    /// Decodes the source into RGBA pixels.
    pub fn decode(&self) -> PixieResult<RgbaImage> {
        match self {
            ImageSource::File(path) => image::open(path)
                .map(|image| image.to_rgba8())
                .map_err(|source| PixieError::ImageLoad {
                    path: path.clone(),
                    source,
                }),
            ImageSource::Pixels(pixels) => Ok(pixels.clone()),
        }
    }

    /// Short description for log lines.
    pub fn describe(&self) -> String {
        match self {
            ImageSource::File(path) => path.display().to_string(),
            ImageSource::Pixels(pixels) => {
                format!("<{}x{} pixels>", pixels.width(), pixels.height())
            }
        }
    }
}

impl fmt::Debug for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ImageSource({})", self.describe())
    }
}

impl From<&str> for ImageSource {
    fn from(path: &str) -> Self {
        ImageSource::File(PathBuf::from(path))
    }
}

impl From<String> for ImageSource {
    fn from(path: String) -> Self {
        ImageSource::File(PathBuf::from(path))
    }
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        ImageSource::File(path)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(path: &std::path::Path) -> Self {
        ImageSource::File(path.to_path_buf())
    }
}

impl From<RgbaImage> for ImageSource {
    fn from(pixels: RgbaImage) -> Self {
        ImageSource::Pixels(pixels)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RED: Rgba<u8> = Rgba([255, 0, 0, 255]);
    const BLUE: Rgba<u8> = Rgba([0, 0, 255, 255]);

    fn two_tone() -> RgbaImage {
        RgbaImage::from_fn(2, 1, |x, _| if x == 0 { RED } else { BLUE })
    }

    #[test]
    fn test_scaled_replicates_pixels() {
        let surface = Surface::new(two_tone());
        let scaled = surface.scaled(ScaleFactor::new(3).unwrap()).unwrap();
        assert_eq!(scaled.size(), (6, 3));
        assert_eq!(scaled.pixel(1, 1), Some(RED));
        assert_eq!(scaled.pixel(4, 2), Some(BLUE));
        assert_ne!(scaled.id(), surface.id());
    }

    #[test]
    fn test_scale_past_side_limit_is_rejected() {
        let surface = Surface::new(two_tone());
        let result = surface.scaled(ScaleFactor::new(1 << 30).unwrap());
        match result {
            Err(PixieError::SurfaceTooLarge { width, height }) => {
                assert_eq!((width, height), (2 << 30, 1 << 30));
            }
            other => panic!("expected SurfaceTooLarge, got {:?}", other),
        }
    }

    #[test]
    fn test_region_copies_sub_rectangle() {
        let surface = Surface::new(two_tone());
        let right = surface.region(1, 0, 1, 1);
        assert_eq!(right.size(), (1, 1));
        assert_eq!(right.pixel(0, 0), Some(BLUE));
    }

    #[test]
    fn test_color_key_clears_alpha() {
        let mut pixels = two_tone();
        apply_color_key(&mut pixels, [255, 0, 0]);
        assert_eq!(pixels.get_pixel(0, 0).0[3], 0);
        assert_eq!(pixels.get_pixel(1, 0), &BLUE);
    }

    #[test]
    fn test_missing_file_reports_path() {
        let source = ImageSource::from("definitely/not/here.png");
        match source.decode() {
            Err(PixieError::ImageLoad { path, .. }) => {
                assert_eq!(path, PathBuf::from("definitely/not/here.png"))
            }
            other => panic!("expected ImageLoad error, got {:?}", other.map(|_| ())),
        }
    }

    #[test]
    fn test_pixel_source_decodes_to_copy() {
        let source = ImageSource::from(two_tone());
        let pixels = source.decode().unwrap();
        assert_eq!(pixels.dimensions(), (2, 1));
        assert_eq!(source.describe(), "<2x1 pixels>");
    }
}
