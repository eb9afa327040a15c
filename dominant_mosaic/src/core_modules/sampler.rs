// THEORY:
// `SampleGrid` is the read-only view of a decoded, resized image. It owns the
// 16-bit RGBA buffer for the duration of one run and answers exactly one
// question: which colors lie inside this rectangle?
//
// Out-of-bounds rectangles are rejected outright. Clamping would quietly shrink a
// cell and change its dominant color, so a bad rectangle is treated as a bug in
// the caller's geometry.

use crate::core_modules::grid_manager::CellRect;
use crate::core_modules::pixel::pixel::Pixel;
use crate::error::{MosaicError, Result};
use image::{DynamicImage, ImageBuffer, Rgba};

/// An RGBA image buffer with 16 bits per channel.
pub type Rgba16Image = ImageBuffer<Rgba<u16>, Vec<u16>>;

/// Immutable pixel grid addressed by `(x, y)` in `[0, width) x [0, height)`.
#[derive(Debug, Clone)]
pub struct SampleGrid {
    image: Rgba16Image,
}

impl SampleGrid {
    pub fn new(image: Rgba16Image) -> Self {
        Self { image }
    }

    /// Converts any decoded image to the 16-bit grid without resizing.
    pub fn from_dynamic(image: &DynamicImage) -> Self {
        Self::new(image.to_rgba16())
    }

    /// Builds a grid from row-major pixels. `pixels.len()` must equal `width * height`.
    pub fn from_pixels(width: u32, height: u32, pixels: &[Pixel]) -> Result<Self> {
        if pixels.len() != width as usize * height as usize {
            return Err(MosaicError::invalid(format!(
                "expected {} pixels for a {width}x{height} grid, got {}",
                width as usize * height as usize,
                pixels.len()
            )));
        }
        let image = Rgba16Image::from_fn(width, height, |x, y| {
            pixels[y as usize * width as usize + x as usize].into()
        });
        Ok(Self::new(image))
    }

    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }

    pub fn as_image(&self) -> &Rgba16Image {
        &self.image
    }

    pub fn into_image(self) -> Rgba16Image {
        self.image
    }

    pub fn pixel_at(&self, x: u32, y: u32) -> Option<Pixel> {
        self.image.get_pixel_checked(x, y).map(Pixel::from)
    }

    /// Every pixel inside `rect`, row by row.
    pub fn sample(&self, rect: &CellRect) -> Result<Vec<Pixel>> {
        if rect.x0 > rect.x1 || rect.y0 > rect.y1 {
            return Err(MosaicError::invalid(format!("inverted rectangle {rect:?}")));
        }
        if rect.x1 > self.width() || rect.y1 > self.height() {
            return Err(MosaicError::invalid(format!(
                "rectangle {rect:?} exceeds image bounds {}x{}",
                self.width(),
                self.height()
            )));
        }

        let mut pixels = Vec::with_capacity(rect.area() as usize);
        for y in rect.y0..rect.y1 {
            for x in rect.x0..rect.x1 {
                pixels.push(Pixel::from(self.image.get_pixel(x, y)));
            }
        }
        Ok(pixels)
    }
}
