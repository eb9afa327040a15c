// Decode, resize and encode helpers. These sit outside the color-reduction core:
// they turn a file into a `SampleGrid` on the way in and a mosaic into a PNG on
// the way out.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::sampler::{Rgba16Image, SampleGrid};
use crate::core_modules::utils::staging;
use crate::error::{MosaicError, Result};
use image::codecs::png::PngEncoder;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ExtendedColorType, ImageEncoder, ImageReader, RgbaImage};
use std::io::{BufWriter, Cursor, Write};
use std::path::Path;
use tempfile::NamedTempFile;

/// Opens and decodes `path`, sniffing the format from its contents.
pub fn load(path: &Path) -> Result<DynamicImage> {
    let image = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()
        .map_err(MosaicError::Decode)?;
    log::info!(
        "decoded {} ({}x{})",
        path.display(),
        image.width(),
        image.height()
    );
    Ok(image)
}

/// Decodes an in-memory encoded image.
pub fn decode(bytes: &[u8]) -> Result<DynamicImage> {
    ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()?
        .decode()
        .map_err(MosaicError::Decode)
}

/// True when `image` stores more than 8 bits per channel.
fn is_wide(image: &DynamicImage) -> bool {
    let color = image.color();
    color.bytes_per_pixel() > color.channel_count()
}

/// Resamples `image` to exactly `width x height` at the source's own bit depth.
///
/// 8-bit sources are filtered as 8-bit and then widened by byte replication, so
/// the grid holds exactly the values an 8-bit resize produces.
pub fn resize(image: &DynamicImage, width: u32, height: u32, filter: FilterType) -> SampleGrid {
    if (image.width(), image.height()) != (width, height) {
        log::debug!(
            "resizing {}x{} -> {}x{} with {:?} at {:?}",
            image.width(),
            image.height(),
            width,
            height,
            filter,
            image.color()
        );
    }

    if is_wide(image) {
        let source = image.to_rgba16();
        if source.dimensions() == (width, height) {
            return SampleGrid::new(source);
        }
        return SampleGrid::new(imageops::resize(&source, width, height, filter));
    }

    let source = image.to_rgba8();
    let resized = if source.dimensions() == (width, height) {
        source
    } else {
        imageops::resize(&source, width, height, filter)
    };
    SampleGrid::new(widen_rgba8(&resized))
}

/// Widens an 8-bit image to 16 bits per channel by byte replication.
pub fn widen_rgba8(image: &RgbaImage) -> Rgba16Image {
    Rgba16Image::from_fn(image.width(), image.height(), |x, y| {
        Pixel::from_rgba8(image.get_pixel(x, y).0).into()
    })
}

/// Narrows a 16-bit canvas to 8 bits per channel, keeping the high byte.
pub fn to_rgba8(canvas: &Rgba16Image) -> RgbaImage {
    RgbaImage::from_fn(canvas.width(), canvas.height(), |x, y| {
        image::Rgba(Pixel::from(canvas.get_pixel(x, y)).to_rgba8())
    })
}

/// Encodes `canvas` as an 8-bit RGBA PNG into `writer`.
pub fn encode_png<W: Write>(canvas: &Rgba16Image, writer: W) -> Result<()> {
    let rgba8 = to_rgba8(canvas);
    PngEncoder::new(writer)
        .write_image(
            rgba8.as_raw(),
            rgba8.width(),
            rgba8.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(MosaicError::Encode)
}

/// Encodes into a staged temporary file beside `path` without touching `path`.
pub fn stage_png(canvas: &Rgba16Image, path: &Path) -> Result<NamedTempFile> {
    let mut staged = staging::stage(path)?;
    {
        let mut writer = BufWriter::new(staged.as_file_mut());
        encode_png(canvas, &mut writer)?;
        writer.flush()?;
    }
    Ok(staged)
}

/// Encodes to a temporary file beside `path` and renames it into place, so a
/// failed encode never leaves a truncated PNG behind.
pub fn save_png_atomic(canvas: &Rgba16Image, path: &Path) -> Result<()> {
    staging::commit(stage_png(canvas, path)?, path)?;
    log::info!("wrote mosaic {}x{} to {}", canvas.width(), canvas.height(), path.display());
    Ok(())
}
