//! Broad-phase obstacle lookup.
//!
//! The grid covers the bounding box of every obstacle grown by its own radius
//! plus the racer radius, independent of the arena. Because obstacles are
//! pre-grown by the racer radius, a query only needs the racer's centre.
//!
//! Each cell keeps its obstacles in the original input order. The collision
//! pass resolves only the first overlapping candidate per iteration, so that
//! order decides which obstacle wins when several overlap.

use alloc::{vec, vec::Vec};

use crate::constants::MAX_GRID_AXIS_CELLS;
use crate::world::Circle;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GridLookup {
    cells: Vec<Vec<Circle>>,
    cells_x: i64,
    cells_y: i64,
    start_x: i64,
    start_y: i64,
    cell_size: i64,
}

impl GridLookup {
    /// Builds the grid so the longer axis spans `axis_cells` cells, clamped to
    /// `1..=MAX_GRID_AXIS_CELLS`.
    pub fn new(obstacles: &[Circle], racer_radius: i32, axis_cells: i32) -> Self {
        if obstacles.is_empty() {
            return Self {
                cells: vec![Vec::new()],
                cells_x: 1,
                cells_y: 1,
                start_x: 0,
                start_y: 0,
                cell_size: 1,
            };
        }

        let mut min_x = i64::MAX;
        let mut min_y = i64::MAX;
        let mut max_x = i64::MIN;
        let mut max_y = i64::MIN;

        for obstacle in obstacles {
            let (lo_x, lo_y, hi_x, hi_y) = expanded_bounds(obstacle, racer_radius);
            min_x = min_x.min(lo_x);
            min_y = min_y.min(lo_y);
            max_x = max_x.max(hi_x);
            max_y = max_y.max(hi_y);
        }

        let size_x = max_x - min_x + 1;
        let size_y = max_y - min_y + 1;
        let axis_cells = i64::from(axis_cells.clamp(1, MAX_GRID_AXIS_CELLS));

        let cell_size = ceil_div(size_x.max(size_y), axis_cells).max(1);
        let cells_x = ceil_div(size_x, cell_size).max(1);
        let cells_y = ceil_div(size_y, cell_size).max(1);

        let mut grid = Self {
            cells: vec![Vec::new(); (cells_x * cells_y) as usize],
            cells_x,
            cells_y,
            start_x: min_x,
            start_y: min_y,
            cell_size,
        };

        for obstacle in obstacles {
            let (lo_x, lo_y, hi_x, hi_y) = expanded_bounds(obstacle, racer_radius);
            let (cell_min_x, cell_min_y) = grid.clamped_cell(lo_x, lo_y);
            let (cell_max_x, cell_max_y) = grid.clamped_cell(hi_x, hi_y);

            for cell_y in cell_min_y..=cell_max_y {
                for cell_x in cell_min_x..=cell_max_x {
                    let idx = grid.flat_index(cell_x, cell_y);
                    grid.cells[idx].push(*obstacle);
                }
            }
        }

        grid
    }

    /// Obstacles that may touch a racer centred at `(x, y)`, in input order.
    ///
    /// Points outside the covered extent get an empty slice. No obstacle can
    /// reach such a point, so this is a silent miss rather than an error.
    pub fn candidates(&self, x: i32, y: i32) -> &[Circle] {
        let (x, y) = (i64::from(x), i64::from(y));
        if !self.covers(x, y) {
            return &[];
        }

        let (cell_x, cell_y) = self.clamped_cell(x, y);
        &self.cells[self.flat_index(cell_x, cell_y)]
    }

    /// Cell coordinates for a world point, clamped into the grid.
    pub fn cell_coords(&self, x: i32, y: i32) -> (usize, usize) {
        let (cell_x, cell_y) = self.clamped_cell(i64::from(x), i64::from(y));
        (cell_x as usize, cell_y as usize)
    }

    pub fn cell(&self, cell_x: usize, cell_y: usize) -> Option<&[Circle]> {
        if cell_x as i64 >= self.cells_x || cell_y as i64 >= self.cells_y {
            return None;
        }
        Some(&self.cells[self.flat_index(cell_x as i64, cell_y as i64)])
    }

    pub fn cells_x(&self) -> usize {
        self.cells_x as usize
    }

    pub fn cells_y(&self) -> usize {
        self.cells_y as usize
    }

    pub fn cell_size(&self) -> i64 {
        self.cell_size
    }

    /// World-space corner of cell `(0, 0)`.
    pub fn origin(&self) -> (i64, i64) {
        (self.start_x, self.start_y)
    }

    /// Half-open world-space extent `[min, max)` on both axes.
    pub fn extent(&self) -> (i64, i64, i64, i64) {
        (
            self.start_x,
            self.start_y,
            self.start_x + self.cells_x * self.cell_size,
            self.start_y + self.cells_y * self.cell_size,
        )
    }

    fn covers(&self, x: i64, y: i64) -> bool {
        let (min_x, min_y, max_x, max_y) = self.extent();
        x >= min_x && y >= min_y && x < max_x && y < max_y
    }

    fn clamped_cell(&self, x: i64, y: i64) -> (i64, i64) {
        let cell_x = (x - self.start_x).div_euclid(self.cell_size);
        let cell_y = (y - self.start_y).div_euclid(self.cell_size);
        (
            cell_x.clamp(0, self.cells_x - 1),
            cell_y.clamp(0, self.cells_y - 1),
        )
    }

    #[inline]
    fn flat_index(&self, cell_x: i64, cell_y: i64) -> usize {
        (cell_x + cell_y * self.cells_x) as usize
    }
}

fn expanded_bounds(obstacle: &Circle, racer_radius: i32) -> (i64, i64, i64, i64) {
    let reach = i64::from(obstacle.r) + i64::from(racer_radius);
    let (x, y) = (i64::from(obstacle.x), i64::from(obstacle.y));
    (x - reach, y - reach, x + reach, y + reach)
}

#[inline]
fn ceil_div(value: i64, divisor: i64) -> i64 {
    (value + divisor - 1) / divisor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::GRID_AXIS_CELL_TARGET;

    struct XorShift(u32);

    impl XorShift {
        fn next(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }

        fn range(&mut self, min: i32, max_exclusive: i32) -> i32 {
            min + (self.next() % (max_exclusive - min) as u32) as i32
        }
    }

    #[test]
    fn single_obstacle_layout() {
        let grid = GridLookup::new(&[Circle::new(0, 0, 10)], 5, GRID_AXIS_CELL_TARGET);

        assert_eq!(grid.origin(), (-15, -15));
        assert_eq!(grid.cell_size(), 1);
        assert_eq!((grid.cells_x(), grid.cells_y()), (31, 31));
        assert_eq!(grid.candidates(0, 0), &[Circle::new(0, 0, 10)]);
        assert_eq!(grid.candidates(15, 15), &[Circle::new(0, 0, 10)]);
        assert_eq!(grid.candidates(-15, -15), &[Circle::new(0, 0, 10)]);
    }

    #[test]
    fn cell_size_targets_longest_axis() {
        let grid = GridLookup::new(
            &[Circle::new(0, 0, 0), Circle::new(1_000, 0, 0)],
            0,
            GRID_AXIS_CELL_TARGET,
        );

        // extent 1001 x 1: ceil(1001 / 128) = 8, ceil(1001 / 8) = 126
        assert_eq!(grid.cell_size(), 8);
        assert_eq!((grid.cells_x(), grid.cells_y()), (126, 1));
        assert_eq!(grid.cell_coords(0, 0), (0, 0));
        assert_eq!(grid.cell_coords(1_000, 0), (125, 0));
        assert_eq!(grid.candidates(4, 0), &[Circle::new(0, 0, 0)]);
        assert_eq!(grid.candidates(1_003, 0), &[Circle::new(1_000, 0, 0)]);
        assert!(grid.candidates(996, 0).is_empty());
        assert!(grid.candidates(500, 0).is_empty());
    }

    #[test]
    fn alternate_axis_target() {
        let grid = GridLookup::new(&[Circle::new(0, 0, 0), Circle::new(99, 0, 0)], 0, 4);

        assert_eq!(grid.cell_size(), 25);
        assert_eq!((grid.cells_x(), grid.cells_y()), (4, 1));
    }

    #[test]
    fn oversized_axis_target_is_capped() {
        let wide = [Circle::new(i32::MIN, 0, 0), Circle::new(i32::MAX, 0, 0)];
        let grid = GridLookup::new(&wide, 0, i32::MAX);

        assert_eq!(grid.cell_size(), 1 << 22);
        assert_eq!((grid.cells_x(), grid.cells_y()), (1024, 1));
        assert_eq!(grid.candidates(i32::MIN, 0), &[wide[0]]);
        assert_eq!(grid.candidates(i32::MAX, 0), &[wide[1]]);
    }

    #[test]
    fn queries_outside_extent_are_empty() {
        let grid = GridLookup::new(&[Circle::new(0, 0, 10)], 5, GRID_AXIS_CELL_TARGET);

        assert!(grid.candidates(16, 0).is_empty());
        assert!(grid.candidates(-16, 0).is_empty());
        assert!(grid.candidates(0, 16).is_empty());
        assert!(grid.candidates(0, -16).is_empty());
        assert!(grid.candidates(i32::MAX, i32::MIN).is_empty());
    }

    #[test]
    fn empty_obstacle_list_never_yields_candidates() {
        let grid = GridLookup::new(&[], 5, GRID_AXIS_CELL_TARGET);

        assert_eq!((grid.cells_x(), grid.cells_y()), (1, 1));
        assert!(grid.candidates(0, 0).is_empty());
        assert!(grid.candidates(1_000, -1_000).is_empty());
    }

    #[test]
    fn cells_preserve_input_order() {
        let a = Circle::new(0, 0, 10);
        let b = Circle::new(5, 0, 10);
        let c = Circle::new(200, 200, 5);

        let forward = GridLookup::new(&[a, b, c], 2, GRID_AXIS_CELL_TARGET);
        let reversed = GridLookup::new(&[c, b, a], 2, GRID_AXIS_CELL_TARGET);

        assert_eq!(forward.candidates(3, 0), &[a, b]);
        assert_eq!(reversed.candidates(3, 0), &[b, a]);
    }

    #[test]
    fn duplicates_are_kept() {
        let a = Circle::new(0, 0, 10);
        let grid = GridLookup::new(&[a, a], 0, GRID_AXIS_CELL_TARGET);
        assert_eq!(grid.candidates(0, 0), &[a, a]);
    }

    #[test]
    fn candidates_are_ordered_subset_covering_cell() {
        let mut rng = XorShift(0xC0FF_EE00);
        let racer_radius = 7;
        let obstacles: Vec<Circle> = (0..40)
            .map(|_| {
                Circle::new(
                    rng.range(-2_000, 2_000),
                    rng.range(-1_000, 1_000),
                    rng.range(0, 150),
                )
            })
            .collect();
        let grid = GridLookup::new(&obstacles, racer_radius, 16);

        for cell_y in 0..grid.cells_y() {
            for cell_x in 0..grid.cells_x() {
                let expected: Vec<Circle> = obstacles
                    .iter()
                    .copied()
                    .filter(|o| {
                        let reach = o.r + racer_radius;
                        let (lo_x, lo_y) = grid.cell_coords(o.x - reach, o.y - reach);
                        let (hi_x, hi_y) = grid.cell_coords(o.x + reach, o.y + reach);
                        (lo_x..=hi_x).contains(&cell_x) && (lo_y..=hi_y).contains(&cell_y)
                    })
                    .collect();
                assert_eq!(grid.cell(cell_x, cell_y), Some(expected.as_slice()));
            }
        }
        assert_eq!(grid.cell(grid.cells_x(), 0), None);
    }

    #[test]
    fn every_touching_obstacle_is_a_candidate() {
        let mut rng = XorShift(0x1234_5678);
        let racer_radius = 12;
        let obstacles: Vec<Circle> = (0..60)
            .map(|_| {
                Circle::new(
                    rng.range(-5_000, 5_000),
                    rng.range(-5_000, 5_000),
                    rng.range(10, 400),
                )
            })
            .collect();
        let grid = GridLookup::new(&obstacles, racer_radius, GRID_AXIS_CELL_TARGET);

        for _ in 0..2_000 {
            let x = rng.range(-5_500, 5_500);
            let y = rng.range(-5_500, 5_500);
            let candidates = grid.candidates(x, y);

            for obstacle in &obstacles {
                let dx = i64::from(x - obstacle.x);
                let dy = i64::from(y - obstacle.y);
                let reach = i64::from(obstacle.r + racer_radius);
                if dx * dx + dy * dy <= reach * reach {
                    assert!(
                        candidates.contains(obstacle),
                        "obstacle {obstacle:?} touches ({x}, {y}) but is not a candidate"
                    );
                }
            }
        }
    }
}
