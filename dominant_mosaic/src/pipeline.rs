// THEORY:
// The `pipeline` module is the top-level API of the mosaic engine. It wires the
// core modules into one pass:
//
//   decoded image -> resize to canvas -> partition -> (sample + extract) per cell
//                 -> report -> render
//
// Key architectural principles:
// 1.  **Geometry computed once**: `MosaicPipeline::new` derives a `GridGeometry`
//     from the configured canvas and grid shape. Extraction and rendering both read
//     it, so their idea of cell placement can never drift apart.
// 2.  **Row-major ordering**: Colors are produced cell by cell in row-major order;
//     the report and the renderer consume that sequence as-is.
// 3.  **No I/O**: The pipeline works on in-memory images only. Loading and saving
//     are the caller's job (see `core_modules::utils::image_helper`).

use crate::core_modules::chunk::chunk::Chunk;
use crate::core_modules::grid_manager::{CellRect, GridGeometry, GridShape};
use crate::core_modules::mosaic::render_with_geometry;
use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::report::ColorReport;
use crate::core_modules::sampler::{Rgba16Image, SampleGrid};
use crate::core_modules::utils::image_helper;
use crate::error::{MosaicError, Result};
use image::DynamicImage;
use image::imageops::FilterType;
use std::collections::HashSet;

pub const DEFAULT_CANVAS_SIZE: u32 = 320;

/// Configuration for the MosaicPipeline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PipelineConfig {
    /// Width every input is resized to before partitioning.
    pub canvas_width: u32,
    /// Height every input is resized to before partitioning.
    pub canvas_height: u32,
    pub grid: GridShape,
    /// Resampling filter used by the resize step.
    pub resize_filter: FilterType,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            canvas_width: DEFAULT_CANVAS_SIZE,
            canvas_height: DEFAULT_CANVAS_SIZE,
            grid: GridShape::default(),
            resize_filter: FilterType::Lanczos3,
        }
    }
}

/// Everything one run produces.
#[derive(Debug, Clone)]
pub struct MosaicOutput {
    /// Flat-filled canvas, same size as the resized input.
    pub mosaic: Rgba16Image,
    /// Dominant color per cell, row-major.
    pub colors: Vec<Pixel>,
    pub report: ColorReport,
}

impl MosaicOutput {
    /// Number of distinct dominant colors across all cells.
    pub fn distinct_colors(&self) -> usize {
        self.colors.iter().collect::<HashSet<_>>().len()
    }
}

/// The sequential mosaic engine.
#[derive(Debug, Clone)]
pub struct MosaicPipeline {
    config: PipelineConfig,
    geometry: GridGeometry,
}

impl MosaicPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        if config.canvas_width == 0 || config.canvas_height == 0 {
            return Err(MosaicError::Config(format!(
                "canvas must be at least 1x1, got {}x{}",
                config.canvas_width, config.canvas_height
            )));
        }

        let geometry = GridGeometry::new(config.canvas_width, config.canvas_height, config.grid);
        if geometry.is_degenerate() {
            log::warn!(
                "grid {} is finer than the {}x{} canvas; every cell will be empty",
                config.grid,
                config.canvas_width,
                config.canvas_height
            );
        } else if geometry.remainder() != (0, 0) {
            let (right, bottom) = geometry.remainder();
            log::debug!("dropping a {right}px right strip and a {bottom}px bottom strip");
        }

        Ok(Self { config, geometry })
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn geometry(&self) -> &GridGeometry {
        &self.geometry
    }

    /// Resizes a decoded image to the configured canvas.
    pub fn prepare(&self, image: &DynamicImage) -> SampleGrid {
        image_helper::resize(
            image,
            self.config.canvas_width,
            self.config.canvas_height,
            self.config.resize_filter,
        )
    }

    /// Resize, extract, report and render in one call.
    pub fn process(&self, image: &DynamicImage) -> Result<MosaicOutput> {
        let grid = self.prepare(image);
        self.run(&grid)
    }

    /// Runs the core on a grid that already has the canvas dimensions.
    pub fn run(&self, grid: &SampleGrid) -> Result<MosaicOutput> {
        let colors = self.extract_colors(grid)?;
        self.assemble(colors)
    }

    /// Dominant color of every cell, row-major.
    pub fn extract_colors(&self, grid: &SampleGrid) -> Result<Vec<Pixel>> {
        self.check_grid(grid)?;
        log::info!(
            "extracting dominant colors for {} cells of {}x{}px",
            self.geometry.cell_count(),
            self.geometry.cell_width(),
            self.geometry.cell_height()
        );
        self.geometry
            .cells()
            .iter()
            .enumerate()
            .map(|(index, cell)| extract_cell(grid, index, *cell))
            .collect()
    }

    pub(crate) fn check_grid(&self, grid: &SampleGrid) -> Result<()> {
        let expected = (self.geometry.canvas_width(), self.geometry.canvas_height());
        if (grid.width(), grid.height()) != expected {
            return Err(MosaicError::invalid(format!(
                "image is {}x{} but the pipeline expects {}x{}",
                grid.width(),
                grid.height(),
                expected.0,
                expected.1
            )));
        }
        Ok(())
    }

    pub(crate) fn assemble(&self, colors: Vec<Pixel>) -> Result<MosaicOutput> {
        let report = ColorReport::build(&colors);
        let mosaic = render_with_geometry(&self.geometry, &colors)?;
        Ok(MosaicOutput {
            mosaic,
            colors,
            report,
        })
    }
}

/// Samples one cell and reduces it to its dominant color.
pub(crate) fn extract_cell(grid: &SampleGrid, index: usize, cell: CellRect) -> Result<Pixel> {
    let chunk = Chunk::from_grid(grid, cell)?;
    let dominant = chunk.dominant_pixel();
    log::debug!("cell {} {:?}: {}", index + 1, cell, dominant.to_hex());
    Ok(dominant)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn config(width: u32, height: u32, rows: u32, cols: u32) -> PipelineConfig {
        PipelineConfig {
            canvas_width: width,
            canvas_height: height,
            grid: GridShape::new(rows, cols).unwrap(),
            resize_filter: FilterType::Nearest,
        }
    }

    #[test]
    fn default_config_matches_cli_defaults() {
        let config = PipelineConfig::default();
        assert_eq!((config.canvas_width, config.canvas_height), (320, 320));
        assert_eq!(config.grid.to_string(), "4x8");
        assert_eq!(config.resize_filter, FilterType::Lanczos3);
    }

    #[test]
    fn zero_canvas_is_config_error() {
        let err = MosaicPipeline::new(config(0, 10, 1, 1)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Config);
    }

    #[test]
    fn mismatched_grid_size_is_rejected() {
        let pipeline = MosaicPipeline::new(config(4, 4, 2, 2)).unwrap();
        let grid = SampleGrid::from_pixels(2, 2, &[Pixel::TRANSPARENT; 4]).unwrap();
        assert_eq!(pipeline.run(&grid).unwrap_err().kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn degenerate_grid_yields_sentinels() {
        let pipeline = MosaicPipeline::new(config(2, 2, 3, 3)).unwrap();
        let grid = SampleGrid::from_pixels(2, 2, &[Pixel::from_hex(0xabcdef); 4]).unwrap();
        let output = pipeline.run(&grid).unwrap();
        assert_eq!(output.colors, vec![Pixel::TRANSPARENT; 9]);
        assert_eq!(output.report.len(), 9);
        assert_eq!(output.distinct_colors(), 1);
    }

    #[test]
    fn process_resizes_before_partitioning() {
        let pipeline = MosaicPipeline::new(config(4, 4, 2, 2)).unwrap();
        let source = SampleGrid::from_pixels(8, 8, &[Pixel::from_hex(0x336699); 64]).unwrap();
        let output = pipeline
            .process(&DynamicImage::ImageRgba16(source.into_image()))
            .unwrap();
        assert_eq!(output.mosaic.dimensions(), (4, 4));
        assert!(output.report.entries().iter().all(|e| e.color == "#336699"));
    }
}
