// THEORY:
// Each cell's extraction reads a disjoint rectangle of an immutable image, so the
// work splits cleanly across threads. `ParallelPipeline` shares the grid behind an
// `Arc`, hands contiguous batches of cells to blocking tokio tasks, and joins the
// batches back in submission order. Because batches are contiguous runs of the
// row-major cell list, concatenating them restores row-major order and the output
// is identical to `MosaicPipeline::run`.

use crate::core_modules::pixel::pixel::Pixel;
use crate::core_modules::sampler::SampleGrid;
use crate::error::{MosaicError, Result};
use crate::pipeline::{MosaicOutput, MosaicPipeline, PipelineConfig, extract_cell};
use futures::future::try_join_all;
use image::DynamicImage;
use std::sync::Arc;

/// Runs per-cell extraction on a pool of blocking tasks.
#[derive(Debug, Clone)]
pub struct ParallelPipeline {
    pipeline: MosaicPipeline,
    workers: usize,
}

impl ParallelPipeline {
    /// One worker per logical CPU.
    pub fn new(config: PipelineConfig) -> Result<Self> {
        Self::with_workers(config, num_cpus::get())
    }

    pub fn with_workers(config: PipelineConfig, workers: usize) -> Result<Self> {
        Ok(Self {
            pipeline: MosaicPipeline::new(config)?,
            workers: workers.max(1),
        })
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn pipeline(&self) -> &MosaicPipeline {
        &self.pipeline
    }

    pub async fn process(&self, image: &DynamicImage) -> Result<MosaicOutput> {
        let grid = Arc::new(self.pipeline.prepare(image));
        self.run(grid).await
    }

    pub async fn run(&self, grid: Arc<SampleGrid>) -> Result<MosaicOutput> {
        let colors = self.extract_colors(grid).await?;
        self.pipeline.assemble(colors)
    }

    pub async fn extract_colors(&self, grid: Arc<SampleGrid>) -> Result<Vec<Pixel>> {
        self.pipeline.check_grid(&grid)?;

        let cells = self.pipeline.geometry().cells();
        let batch_size = cells.len().div_ceil(self.workers).max(1);
        log::info!(
            "extracting {} cells on {} workers ({} cells per batch)",
            cells.len(),
            self.workers,
            batch_size
        );

        let tasks = cells.chunks(batch_size).enumerate().map(|(batch_index, batch)| {
            let batch = batch.to_vec();
            let grid = Arc::clone(&grid);
            let first_index = batch_index * batch_size;
            tokio::task::spawn_blocking(move || {
                batch
                    .into_iter()
                    .enumerate()
                    .map(|(offset, cell)| extract_cell(&grid, first_index + offset, cell))
                    .collect::<Result<Vec<Pixel>>>()
            })
        });

        let batches = try_join_all(tasks)
            .await
            .map_err(|e| MosaicError::Worker(e.to_string()))?;

        let mut colors = Vec::with_capacity(cells.len());
        for batch in batches {
            colors.extend(batch?);
        }
        Ok(colors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_modules::grid_manager::GridShape;
    use crate::error::ErrorKind;
    use image::imageops::FilterType;

    fn striped_grid(width: u32, height: u32) -> SampleGrid {
        let pixels: Vec<Pixel> = (0..width * height)
            .map(|i| Pixel::from_hex((i % width) * 0x010203 + (i / width) * 0x0a0000))
            .collect();
        SampleGrid::from_pixels(width, height, &pixels).unwrap()
    }

    fn config(width: u32, height: u32, rows: u32, cols: u32) -> PipelineConfig {
        PipelineConfig {
            canvas_width: width,
            canvas_height: height,
            grid: GridShape::new(rows, cols).unwrap(),
            resize_filter: FilterType::Nearest,
        }
    }

    #[tokio::test]
    async fn matches_sequential_output() {
        let grid = striped_grid(12, 9);
        let config = config(12, 9, 3, 4);
        let sequential = MosaicPipeline::new(config).unwrap().run(&grid).unwrap();

        for workers in [1, 2, 5, 64] {
            let parallel = ParallelPipeline::with_workers(config, workers)
                .unwrap()
                .run(Arc::new(grid.clone()))
                .await
                .unwrap();
            assert_eq!(parallel.colors, sequential.colors, "workers = {workers}");
            assert_eq!(parallel.report, sequential.report);
            assert_eq!(parallel.mosaic, sequential.mosaic);
        }
    }

    #[tokio::test]
    async fn rejects_grid_of_wrong_size() {
        let pipeline = ParallelPipeline::with_workers(config(4, 4, 2, 2), 2).unwrap();
        let err = pipeline.run(Arc::new(striped_grid(3, 3))).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
    }

    #[test]
    fn zero_workers_is_clamped() {
        let pipeline = ParallelPipeline::with_workers(config(4, 4, 2, 2), 0).unwrap();
        assert_eq!(pipeline.workers(), 1);
    }
}
