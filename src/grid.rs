use crate::{moore_neighborhood, Cell, Pattern, Topology, ALIVE, DEAD};
use anyhow::{anyhow, Result};
use std::hash::BuildHasher;
use tracing::debug;

/// Fixed seeds so that [`Grid::hash`] is reproducible within a build.
const HASH_SEEDS: [u64; 4] = [
    0x243f_6a88_85a3_08d3,
    0x1319_8a2e_0370_7344,
    0xa409_3822_299f_31d0,
    0x082e_fa98_ec4e_6c89,
];

/// A double-buffered Game of Life field of fixed size.
///
/// Cells live in a flat row-major buffer: the cell in column `col` of row
/// `row` has index `col + row * width`. Every cell has an immutable list of
/// neighbor indices, resolved once at construction for the grid's
/// [`Topology`].
///
/// Each generation is computed against a frozen `snapshot` of the previous
/// one, so the result does not depend on the order in which cells are
/// visited.
///
/// # Example
///
/// ```rust
/// use gol_grid::{Grid, Pattern, Topology, TransitionKind};
///
/// let blinker = Pattern::from_rows(["OOO"]).unwrap();
/// let mut grid = Grid::with_tiling(&blinker, Topology::Bounded, 5, 5).unwrap();
///
/// grid.compute();
/// assert_eq!(grid.population(), 3);
/// assert_eq!(grid.cell(2, 1).unwrap().pending(), TransitionKind::Reborn);
/// assert_eq!(grid.cell(1, 2).unwrap().pending(), TransitionKind::Lonely);
/// ```
pub struct Grid {
    width: usize,
    height: usize,
    topology: Topology,
    /// The current generation, exposed to renderers.
    pending: Vec<Cell>,
    /// The previous generation, read-only while `compute` runs.
    snapshot: Vec<Cell>,
    neighbors: Vec<Box<[usize]>>,
    generation: u64,
}

impl Grid {
    /// Creates a grid with all cells dead.
    ///
    /// # Errors
    ///
    /// Returns an error if `width` or `height` is zero or the cell count
    /// overflows.
    pub fn new(width: usize, height: usize, topology: Topology) -> Result<Self> {
        Self::build(width, height, topology, |_, _| false)
    }

    /// Creates a grid with the dimensions and cells of `pattern`.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty.
    pub fn from_pattern(pattern: &Pattern, topology: Topology) -> Result<Self> {
        if pattern.is_empty() {
            return Err(anyhow!("Cannot build a grid from an empty pattern"));
        }
        Self::build(pattern.width(), pattern.height(), topology, |col, row| {
            pattern.is_alive(col, row)
        })
    }

    /// Fits `pattern` into a `columns` x `rows` tiling (see [`Pattern::fit`])
    /// and creates a grid from the result.
    ///
    /// # Errors
    ///
    /// Returns an error if the pattern is empty or larger than the tiling.
    pub fn with_tiling(
        pattern: &Pattern,
        topology: Topology,
        columns: usize,
        rows: usize,
    ) -> Result<Self> {
        Self::from_pattern(&pattern.fit(columns, rows)?, topology)
    }

    fn build(
        width: usize,
        height: usize,
        topology: Topology,
        is_alive: impl Fn(usize, usize) -> bool,
    ) -> Result<Self> {
        if width == 0 || height == 0 {
            return Err(anyhow!(
                "Grid dimensions must be positive, got {}x{}",
                width,
                height
            ));
        }
        let size = width
            .checked_mul(height)
            .ok_or_else(|| anyhow!("Grid {}x{} is too large", width, height))?;

        let mut pending = Vec::with_capacity(size);
        let mut neighbors = Vec::with_capacity(size);
        for row in 0..height {
            for col in 0..width {
                pending.push(Cell::seeded(is_alive(col, row)));
                neighbors.push(
                    moore_neighborhood(col, row, width, height, topology)
                        .into_iter()
                        .map(|(x, y)| x + y * width)
                        .collect(),
                );
            }
        }
        debug!(width, height, ?topology, "built grid");

        Ok(Self {
            width,
            height,
            topology,
            snapshot: pending.clone(),
            pending,
            neighbors,
            generation: 0,
        })
    }

    /// Advances the field by one generation.
    pub fn compute(&mut self) {
        self.snapshot.copy_from_slice(&self.pending);
        for (idx, cell) in self.pending.iter_mut().enumerate() {
            let alive_neighbors = self.neighbors[idx]
                .iter()
                .filter(|&&n| self.snapshot[n].is_alive())
                .count();
            *cell = self.snapshot[idx].next(alive_neighbors);
        }
        self.generation += 1;
    }

    /// Advances the field by `generations` generations.
    pub fn update(&mut self, generations: u64) {
        for _ in 0..generations {
            self.compute();
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn topology(&self) -> Topology {
        self.topology
    }

    /// Number of generations computed since construction.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// All cells of the current generation in row-major order.
    pub fn cells(&self) -> &[Cell] {
        &self.pending
    }

    pub fn cell(&self, col: usize, row: usize) -> Option<Cell> {
        self.index(col, row).map(|idx| self.pending[idx])
    }

    /// Iterates over the rows of the current generation, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[Cell]> {
        self.pending.chunks(self.width)
    }

    /// Flat indices of the neighbors of the cell at `(col, row)`.
    pub fn neighbors(&self, col: usize, row: usize) -> Option<&[usize]> {
        self.index(col, row).map(|idx| &*self.neighbors[idx])
    }

    /// Counts the alive cells of the current generation.
    pub fn population(&self) -> usize {
        self.pending.iter().filter(|cell| cell.is_alive()).count()
    }

    /// Computes a 64-bit hash of the alive cells. Intended for fast
    /// probabilistic comparison of generations, e.g. for cycle detection.
    /// Transition kinds do not participate.
    pub fn hash(&self) -> u64 {
        let hasher = ahash::RandomState::with_seeds(
            HASH_SEEDS[0],
            HASH_SEEDS[1],
            HASH_SEEDS[2],
            HASH_SEEDS[3],
        );
        let mut packed = vec![0u64; self.pending.len().div_ceil(64)];
        for (idx, cell) in self.pending.iter().enumerate() {
            if cell.is_alive() {
                packed[idx / 64] |= 1u64 << (idx % 64);
            }
        }
        hasher.hash_one((self.width, self.height, packed))
    }

    /// Returns the alive/dead state of the current generation.
    pub fn current_state(&self) -> Pattern {
        let rows = self.rows().map(|row| {
            row.iter()
                .map(|cell| if cell.is_alive() { ALIVE } else { DEAD })
                .collect::<String>()
        });
        Pattern::from_rows(rows).expect("grid rows are rectangular")
    }

    fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.width && row < self.height).then(|| col + row * self.width)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::TransitionKind;
    const SEED: u64 = 42;

    const GLIDER: [&str; 3] = [".O.", "..O", "OOO"];

    fn alive_cells(grid: &Grid) -> Vec<(usize, usize)> {
        let mut result = vec![];
        for (row, cells) in grid.rows().enumerate() {
            for (col, cell) in cells.iter().enumerate() {
                if cell.is_alive() {
                    result.push((col, row));
                }
            }
        }
        result
    }

    #[test]
    fn test_zero_dimensions() {
        assert!(Grid::new(0, 5, Topology::Bounded).is_err());
        assert!(Grid::new(5, 0, Topology::Torus).is_err());
        assert!(Grid::from_pattern(&Pattern::default(), Topology::Bounded).is_err());
    }

    #[test]
    fn test_neighbor_counts() {
        let grid = Grid::new(6, 4, Topology::Bounded).unwrap();
        assert_eq!(grid.neighbors(0, 0).unwrap().len(), 3);
        assert_eq!(grid.neighbors(5, 3).unwrap().len(), 3);
        assert_eq!(grid.neighbors(2, 0).unwrap().len(), 5);
        assert_eq!(grid.neighbors(0, 2).unwrap().len(), 5);
        assert_eq!(grid.neighbors(3, 2).unwrap().len(), 8);
        assert!(grid.neighbors(6, 0).is_none());

        let grid = Grid::new(6, 4, Topology::Torus).unwrap();
        for row in 0..4 {
            for col in 0..6 {
                assert_eq!(grid.neighbors(col, row).unwrap().len(), 8);
            }
        }
        // (0, 0) wraps to the last row and column
        assert_eq!(grid.neighbors(0, 0).unwrap()[0], 5 + 3 * 6);
    }

    #[test]
    fn test_blank_is_fixed_point() {
        for topology in [Topology::Bounded, Topology::Torus] {
            let mut grid = Grid::new(7, 5, topology).unwrap();
            grid.update(3);
            assert_eq!(grid.population(), 0);
            assert!(grid
                .cells()
                .iter()
                .all(|cell| cell.pending() == TransitionKind::Dormant));
            assert_eq!(grid.generation(), 3);
        }
    }

    #[test]
    fn test_block_is_still() {
        let block = Pattern::from_rows(["OO", "OO"]).unwrap();
        for (columns, rows) in [(2, 2), (3, 2), (4, 4), (9, 6)] {
            let mut grid = Grid::with_tiling(&block, Topology::Bounded, columns, rows).unwrap();
            let before = alive_cells(&grid);
            grid.compute();
            assert_eq!(alive_cells(&grid), before);
            for &(col, row) in &before {
                assert_eq!(
                    grid.cell(col, row).unwrap().pending(),
                    TransitionKind::Living
                );
            }
        }
    }

    #[test]
    fn test_blinker_classification() {
        let blinker = Pattern::from_rows(["OOO"]).unwrap();
        let mut grid = Grid::with_tiling(&blinker, Topology::Bounded, 3, 3).unwrap();
        grid.compute();
        let kinds: Vec<_> = grid.cells().iter().map(|cell| cell.pending()).collect();
        use TransitionKind::*;
        assert_eq!(
            kinds,
            [
                Dormant, Reborn, Dormant, //
                Lonely, Living, Lonely, //
                Dormant, Reborn, Dormant,
            ]
        );
        grid.compute();
        assert_eq!(grid.current_state(), blinker.fit(3, 3).unwrap());
    }

    #[test]
    fn test_overcrowded_center() {
        // the center has 4 alive neighbors
        let pattern = Pattern::from_rows(["O.O", ".O.", "O.O"]).unwrap();
        let mut grid = Grid::from_pattern(&pattern, Topology::Bounded).unwrap();
        grid.compute();
        assert_eq!(grid.cell(1, 1).unwrap().pending(), TransitionKind::Choked);
        assert!(!grid.cell(1, 1).unwrap().is_alive());
    }

    #[test]
    fn test_glider_translation() {
        let glider = Pattern::from_rows(GLIDER).unwrap();
        let mut grid = Grid::with_tiling(&glider, Topology::Bounded, 11, 11).unwrap();
        let before = alive_cells(&grid);
        grid.update(4);
        let expected: Vec<_> = before.iter().map(|&(x, y)| (x + 1, y + 1)).collect();
        assert_eq!(alive_cells(&grid), expected);
    }

    #[test]
    fn test_glider_wraps_on_torus() {
        // a glider on an 8x8 torus returns home after 4 * 8 generations
        let glider = Pattern::from_rows(GLIDER).unwrap();
        let mut grid = Grid::with_tiling(&glider, Topology::Torus, 8, 8).unwrap();
        let start = grid.current_state();
        grid.update(32);
        assert_eq!(grid.current_state(), start);
        assert_eq!(grid.population(), 5);
    }

    #[test]
    fn test_compute_is_deterministic() {
        let soup = Pattern::random(24, 17, Some(SEED)).unwrap();
        for topology in [Topology::Bounded, Topology::Torus] {
            let mut a = Grid::from_pattern(&soup, topology).unwrap();
            let mut b = Grid::from_pattern(&soup, topology).unwrap();
            for _ in 0..10 {
                a.compute();
                b.compute();
                assert_eq!(a.cells(), b.cells());
                assert_eq!(a.hash(), b.hash());
            }
        }
    }

    #[test]
    fn test_compute_reads_only_previous_generation() {
        // reference: recompute every cell from an independent copy
        let soup = Pattern::random(13, 9, Some(SEED)).unwrap();
        let mut grid = Grid::from_pattern(&soup, Topology::Torus).unwrap();
        for _ in 0..5 {
            let previous = grid.current_state();
            grid.compute();
            for row in 0..grid.height() {
                for col in 0..grid.width() {
                    let count = moore_neighborhood(col, row, 13, 9, Topology::Torus)
                        .into_iter()
                        .filter(|&(x, y)| previous.is_alive(x, y))
                        .count();
                    let expected = TransitionKind::classify(count, previous.is_alive(col, row));
                    assert_eq!(grid.cell(col, row).unwrap().pending(), expected);
                }
            }
        }
    }

    #[test]
    fn test_seeded_classification() {
        let glider = Pattern::from_rows(GLIDER).unwrap();
        let grid = Grid::from_pattern(&glider, Topology::Bounded).unwrap();
        assert_eq!(grid.cell(1, 0).unwrap().pending(), TransitionKind::Living);
        assert_eq!(grid.cell(0, 0).unwrap().pending(), TransitionKind::Dormant);
        assert_eq!(grid.generation(), 0);
    }

    #[test]
    fn test_current_state_roundtrip() {
        let soup = Pattern::random(10, 3, Some(SEED)).unwrap();
        let grid = Grid::from_pattern(&soup, Topology::Bounded).unwrap();
        assert_eq!(grid.current_state(), soup);
        assert_eq!(grid.population(), soup.population());
        assert_eq!((grid.width(), grid.height()), (10, 3));
    }

    #[test]
    fn test_hash_ignores_transition_kinds() {
        let block = Pattern::from_rows(["OO", "OO"]).unwrap();
        let mut grid = Grid::with_tiling(&block, Topology::Bounded, 4, 4).unwrap();
        let before = grid.hash();
        grid.compute();
        assert_eq!(grid.hash(), before);

        let tub = Pattern::from_rows(["OO", "O."]).unwrap();
        let a = Grid::from_pattern(&tub, Topology::Bounded).unwrap();
        let b = Grid::from_pattern(&block, Topology::Bounded).unwrap();
        assert_ne!(a.hash(), b.hash());
    }
}
