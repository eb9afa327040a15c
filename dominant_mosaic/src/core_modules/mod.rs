pub mod chunk;
pub mod grid_manager;
pub mod mosaic;
pub mod pixel;
pub mod report;
pub mod sampler;
pub mod utils;
