// THEORY:
// The `Chunk` module represents the pixels of a single grid cell and knows how to
// summarize them into one color. The summary is the dominant color: the exact
// color value that occurs most often, not a mean or a centroid.
//
// Key architectural principles:
// 1.  **Exact counting**: A frequency map keyed on the full 16-bit `Pixel` counts
//     occurrences. No quantization happens before counting.
// 2.  **Deterministic ties**: Distinct colors are tallied in the order they are first
//     seen during the row-major scan, and the winner must beat the running best
//     strictly. Among equally frequent colors the first one scanned wins, so the
//     same cell always yields the same color.
// 3.  **Total function**: A cell without pixels yields `Pixel::TRANSPARENT` so the
//     renderer still has a fill for every declared cell.
// 4.  **Scoped memory**: The frequency map lives only for one extraction call.

pub mod chunk {
    use crate::core_modules::grid_manager::CellRect;
    use crate::core_modules::pixel::pixel::Pixel;
    use crate::core_modules::sampler::SampleGrid;
    use crate::error::Result;
    use std::collections::HashMap;
    use std::collections::hash_map::Entry;

    /// The sampled pixels of one grid cell.
    pub struct Chunk {
        /// Where the chunk sits on the canvas.
        pub rect: CellRect,
        /// Row-major pixels inside `rect`.
        pub pixels: Vec<Pixel>,
    }

    impl Chunk {
        pub fn new(rect: CellRect, pixels: Vec<Pixel>) -> Self {
            Self { rect, pixels }
        }

        /// Samples `rect` out of `grid`.
        pub fn from_grid(grid: &SampleGrid, rect: CellRect) -> Result<Self> {
            Ok(Self::new(rect, grid.sample(&rect)?))
        }

        pub fn dominant_pixel(&self) -> Pixel {
            dominant_color(&self.pixels)
        }
    }

    /// Distinct colors of `samples` with their counts, in first-occurrence order.
    pub fn color_histogram(samples: &[Pixel]) -> Vec<(Pixel, usize)> {
        let mut slots: HashMap<Pixel, usize> = HashMap::new();
        let mut tallies: Vec<(Pixel, usize)> = Vec::new();

        for pixel in samples {
            match slots.entry(*pixel) {
                Entry::Occupied(slot) => tallies[*slot.get()].1 += 1,
                Entry::Vacant(slot) => {
                    slot.insert(tallies.len());
                    tallies.push((*pixel, 1));
                }
            }
        }

        tallies
    }

    /// The most frequent exact color in `samples`; ties go to the color seen first.
    /// Returns `Pixel::TRANSPARENT` for an empty slice.
    pub fn dominant_color(samples: &[Pixel]) -> Pixel {
        let mut best: Option<(Pixel, usize)> = None;
        for (pixel, count) in color_histogram(samples) {
            if best.is_none_or(|(_, best_count)| count > best_count) {
                best = Some((pixel, count));
            }
        }
        best.map(|(pixel, _)| pixel).unwrap_or(Pixel::TRANSPARENT)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        const A: Pixel = Pixel::from_hex(0xff0000);
        const B: Pixel = Pixel::from_hex(0x00ff00);
        const C: Pixel = Pixel::from_hex(0x0000ff);

        #[test]
        fn uniform_region_returns_its_color() {
            assert_eq!(dominant_color(&[C; 9]), C);
        }

        #[test]
        fn majority_wins_regardless_of_order() {
            let mut samples = vec![B, B, B, A, A, A, A, A];
            assert_eq!(dominant_color(&samples), A);
            samples.reverse();
            assert_eq!(dominant_color(&samples), A);
            let interleaved = [A, B, A, B, A, B, A, A];
            assert_eq!(dominant_color(&interleaved), A);
        }

        #[test]
        fn ties_go_to_first_occurrence() {
            assert_eq!(dominant_color(&[B, A, A, B, C]), B);
            assert_eq!(dominant_color(&[A, B, B, A, C]), A);
            assert_eq!(dominant_color(&[C, B, A]), C);
        }

        #[test]
        fn empty_region_returns_sentinel() {
            assert_eq!(dominant_color(&[]), Pixel::TRANSPARENT);
        }

        #[test]
        fn colors_differing_only_in_alpha_are_distinct() {
            let faded = Pixel::new(A.red, A.green, A.blue, 0x8000);
            assert_eq!(dominant_color(&[faded, A, A, faded, faded]), faded);
        }

        #[test]
        fn histogram_keeps_first_seen_order() {
            let histogram = color_histogram(&[C, A, C, B, A, C]);
            assert_eq!(histogram, vec![(C, 3), (A, 2), (B, 1)]);
        }

        #[test]
        fn chunk_samples_its_rect() {
            let grid = SampleGrid::from_pixels(2, 2, &[A, B, B, B]).unwrap();
            let chunk = Chunk::from_grid(&grid, CellRect::new(0, 0, 2, 1)).unwrap();
            assert_eq!(chunk.pixels, vec![A, B]);
            assert_eq!(chunk.dominant_pixel(), A);
        }
    }
}
