// THEORY:
// This file is the main entry point for the `dominant_mosaic` library crate.
// It exposes the `MosaicPipeline` (and its parallel sibling) as the high-level
// interface: hand it a decoded image and a grid shape, get back a flat-colored
// mosaic plus an ordered report of each cell's dominant color.
//
// The individual stages live in `core_modules` and stay public so callers can
// drive partitioning, sampling, extraction and rendering on their own.

pub mod core_modules;
pub mod error;
pub mod parallel_pipeline;
pub mod pipeline;

pub use core_modules::chunk::chunk::{Chunk, color_histogram, dominant_color};
pub use core_modules::grid_manager::{CellRect, GridGeometry, GridShape, partition};
pub use core_modules::mosaic::{render, render_with_geometry};
pub use core_modules::pixel::pixel::Pixel;
pub use core_modules::report::{ColorReport, ColorReportEntry};
pub use core_modules::sampler::{Rgba16Image, SampleGrid};
pub use core_modules::utils::{image_helper, staging};
pub use error::{ErrorKind, MosaicError, Result};
pub use parallel_pipeline::ParallelPipeline;
pub use pipeline::{MosaicOutput, MosaicPipeline, PipelineConfig};
