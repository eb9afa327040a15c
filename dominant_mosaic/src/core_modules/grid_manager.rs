// THEORY:
// The `grid_manager` owns the geometry of the mosaic. It turns a canvas size and a
// grid shape into the ordered list of cell rectangles that every later stage
// walks: sampling reads them, rendering fills them.
//
// Key architectural principles:
// 1.  **One geometry, computed once**: `GridGeometry` is derived a single time from
//     the post-resize canvas and the `GridShape`, then threaded through both the
//     extraction and rendering steps, so the two can never disagree about where
//     a cell lives.
// 2.  **Truncation, not stretching**: cells are `floor(W / cols) x floor(H / rows)`.
//     Any right or bottom strip that does not divide evenly is excluded from every
//     cell rather than folded into the last one.
// 3.  **Row-major order is a contract**: cell `i` is at row `i / cols`, column
//     `i % cols`. Extraction, the report and the renderer all rely on it.

use crate::error::{MosaicError, Result};
use std::fmt;
use std::str::FromStr;

/// A half-open pixel rectangle `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellRect {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRect {
    pub fn new(x0: u32, y0: u32, x1: u32, y1: u32) -> Self {
        Self { x0, y0, x1, y1 }
    }

    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }

    pub fn area(&self) -> u64 {
        self.width() as u64 * self.height() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.area() == 0
    }

    pub fn contains(&self, x: u32, y: u32) -> bool {
        x >= self.x0 && x < self.x1 && y >= self.y0 && y < self.y1
    }

    /// True when the two rectangles share at least one pixel.
    pub fn overlaps(&self, other: &CellRect) -> bool {
        !self.is_empty()
            && !other.is_empty()
            && self.x0 < other.x1
            && other.x0 < self.x1
            && self.y0 < other.y1
            && other.y0 < self.y1
    }
}

/// The `rows x cols` layout of the mosaic. Both dimensions are at least 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridShape {
    rows: u32,
    cols: u32,
}

impl GridShape {
    pub fn new(rows: u32, cols: u32) -> Result<Self> {
        if rows == 0 {
            return Err(MosaicError::invalid("rows must be at least 1"));
        }
        if cols == 0 {
            return Err(MosaicError::invalid("cols must be at least 1"));
        }
        Ok(Self { rows, cols })
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn cols(&self) -> u32 {
        self.cols
    }

    pub fn cell_count(&self) -> usize {
        self.rows as usize * self.cols as usize
    }
}

impl Default for GridShape {
    fn default() -> Self {
        Self { rows: 4, cols: 8 }
    }
}

impl fmt::Display for GridShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.rows, self.cols)
    }
}

/// Parses the `"RxC"` form used on the command line, e.g. `"4x8"`.
impl FromStr for GridShape {
    type Err = MosaicError;

    fn from_str(s: &str) -> Result<Self> {
        let parts: Vec<&str> = s.trim().split(['x', 'X']).collect();
        if parts.len() != 2 {
            return Err(MosaicError::Config(format!(
                "invalid grid format {s:?}, expected ROWSxCOLS"
            )));
        }

        let rows = parts[0]
            .trim()
            .parse::<u32>()
            .map_err(|e| MosaicError::Config(format!("invalid rows value {:?}: {e}", parts[0])))?;
        let cols = parts[1]
            .trim()
            .parse::<u32>()
            .map_err(|e| MosaicError::Config(format!("invalid cols value {:?}: {e}", parts[1])))?;

        GridShape::new(rows, cols).map_err(|e| match e {
            MosaicError::InvalidArgument(msg) => MosaicError::Config(msg),
            other => other,
        })
    }
}

/// Cell layout for a fixed canvas and grid shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridGeometry {
    canvas_width: u32,
    canvas_height: u32,
    shape: GridShape,
    cell_width: u32,
    cell_height: u32,
}

impl GridGeometry {
    pub fn new(canvas_width: u32, canvas_height: u32, shape: GridShape) -> Self {
        Self {
            canvas_width,
            canvas_height,
            shape,
            cell_width: canvas_width / shape.cols,
            cell_height: canvas_height / shape.rows,
        }
    }

    pub fn canvas_width(&self) -> u32 {
        self.canvas_width
    }

    pub fn canvas_height(&self) -> u32 {
        self.canvas_height
    }

    pub fn shape(&self) -> GridShape {
        self.shape
    }

    pub fn cell_width(&self) -> u32 {
        self.cell_width
    }

    pub fn cell_height(&self) -> u32 {
        self.cell_height
    }

    pub fn cell_count(&self) -> usize {
        self.shape.cell_count()
    }

    /// True when the grid is finer than the canvas, leaving every cell with zero pixels.
    pub fn is_degenerate(&self) -> bool {
        self.cell_width == 0 || self.cell_height == 0
    }

    /// Width of the right strip and height of the bottom strip left out of every cell.
    pub fn remainder(&self) -> (u32, u32) {
        (
            self.canvas_width - self.cell_width * self.shape.cols,
            self.canvas_height - self.cell_height * self.shape.rows,
        )
    }

    /// Row-major index of the cell at (`row`, `col`).
    pub fn index(&self, row: u32, col: u32) -> usize {
        row as usize * self.shape.cols as usize + col as usize
    }

    pub fn cell(&self, row: u32, col: u32) -> CellRect {
        CellRect::new(
            col * self.cell_width,
            row * self.cell_height,
            (col + 1) * self.cell_width,
            (row + 1) * self.cell_height,
        )
    }

    /// All cells in row-major order.
    pub fn cells(&self) -> Vec<CellRect> {
        let mut cells = Vec::with_capacity(self.cell_count());
        for row in 0..self.shape.rows {
            for col in 0..self.shape.cols {
                cells.push(self.cell(row, col));
            }
        }
        cells
    }
}

/// Splits `[0, image_width) x [0, image_height)` into `rows x cols` equal cells.
pub fn partition(image_width: u32, image_height: u32, rows: u32, cols: u32) -> Result<Vec<CellRect>> {
    let shape = GridShape::new(rows, cols)?;
    Ok(GridGeometry::new(image_width, image_height, shape).cells())
}
