// THEORY:
// The mosaic renderer is the inverse of extraction: given one color per cell it
// paints a fresh canvas where every cell is a flat block of that color. Cell
// positions come from the same `GridGeometry` the extractor used, so color `i`
// always lands where cell `i` was sampled.
//
// The canvas starts zeroed (transparent black). Pixels in the truncated right and
// bottom strips belong to no cell and keep that value.

use crate::core_modules::grid_manager::{GridGeometry, GridShape};
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::sampler::Rgba16Image;
use crate::error::{MosaicError, Result};
use image::Rgba;

/// Paints `colors` (row-major, one per cell) onto a canvas laid out by `geometry`.
pub fn render_with_geometry(geometry: &GridGeometry, colors: &[Pixel]) -> Result<Rgba16Image> {
    if colors.len() != geometry.cell_count() {
        return Err(MosaicError::invalid(format!(
            "expected {} colors for a {} grid, got {}",
            geometry.cell_count(),
            geometry.shape(),
            colors.len()
        )));
    }

    let mut canvas = Rgba16Image::new(geometry.canvas_width(), geometry.canvas_height());
    if geometry.is_degenerate() {
        return Ok(canvas);
    }

    for (cell, color) in geometry.cells().iter().zip(colors) {
        let fill: Rgba<u16> = (*color).into();
        for y in cell.y0..cell.y1 {
            for x in cell.x0..cell.x1 {
                canvas.put_pixel(x, y, fill);
            }
        }
    }

    Ok(canvas)
}

/// Builds the geometry from the canvas size and grid shape, then renders.
pub fn render(
    colors: &[Pixel],
    canvas_width: u32,
    canvas_height: u32,
    rows: u32,
    cols: u32,
) -> Result<Rgba16Image> {
    let geometry = GridGeometry::new(canvas_width, canvas_height, GridShape::new(rows, cols)?);
    render_with_geometry(&geometry, colors)
}
