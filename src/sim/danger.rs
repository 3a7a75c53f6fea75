//! Danger field
//!
//! Every occupied obstacle cell is projected straight down for a bounded
//! number of steps. Each projected cell inside the grid adds one to the
//! field, so overlapping threats sum rather than saturate. The field is
//! rebuilt from scratch whenever a bot thinks.

use super::grid::{Grid, occupied_cells_clipped};
use super::piece::Obstacle;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DangerField {
    columns: i32,
    rows: i32,
    values: Vec<u32>,
}

impl DangerField {
    /// Project `obstacles` forward `depth` steps on `grid`
    pub fn build(grid: &Grid, obstacles: &[Obstacle], depth: i32) -> Self {
        let columns = grid.columns.max(0);
        let rows = grid.rows.max(0);
        let mut values = vec![0u32; columns as usize * rows as usize];

        for obstacle in obstacles {
            for cell in occupied_cells_clipped(&obstacle.shape, obstacle.origin, columns) {
                let first = cell.y.max(0);
                let last = cell.y.saturating_add(depth.max(0)).min(rows);
                for row in first..last {
                    values[row as usize * columns as usize + cell.x as usize] += 1;
                }
            }
        }

        Self {
            columns,
            rows,
            values,
        }
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Threat at a cell, `None` outside the field
    pub fn get(&self, column: i32, row: i32) -> Option<u32> {
        if column < 0 || column >= self.columns || row < 0 || row >= self.rows {
            return None;
        }
        Some(self.values[row as usize * self.columns as usize + column as usize])
    }

    /// Threat at `row` plus the row above it (if any). Out-of-range cells count as zero.
    pub fn exposure(&self, column: i32, row: i32) -> u32 {
        let here = self.get(column, row).unwrap_or(0);
        let above = if row > 0 {
            self.get(column, row - 1).unwrap_or(0)
        } else {
            0
        };
        here + above
    }

    /// Zero threat at `row` and, when it exists, at `row - 1`
    pub fn is_safe(&self, column: i32, row: i32) -> bool {
        self.get(column, row) == Some(0) && (row == 0 || self.get(column, row - 1) == Some(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::Shape;
    use crate::sim::piece::{ShapeTemplate, catalog};
    use glam::IVec2;
    use proptest::prelude::*;

    const GRID: Grid = Grid::new(10, 20, 40);

    fn piece(rows: &[&[u8]], x: i32, y: i32) -> Obstacle {
        let template = ShapeTemplate {
            shape: Shape::from_rows(rows).unwrap(),
            color: 0,
        };
        Obstacle::new(&template, IVec2::new(x, y), 0)
    }

    #[test]
    fn test_projection_fills_column_below() {
        let field = DangerField::build(&GRID, &[piece(&[&[1]], 3, 5)], 25);
        for row in 0..20 {
            let expected = if row >= 5 { 1 } else { 0 };
            assert_eq!(field.get(3, row), Some(expected), "row {row}");
            assert_eq!(field.get(2, row), Some(0));
        }
    }

    #[test]
    fn test_depth_limits_projection() {
        let field = DangerField::build(&GRID, &[piece(&[&[1]], 0, 2)], 3);
        assert_eq!(field.get(0, 2), Some(1));
        assert_eq!(field.get(0, 4), Some(1));
        assert_eq!(field.get(0, 5), Some(0));
    }

    #[test]
    fn test_unbounded_depth_clips_to_grid() {
        let field = DangerField::build(&GRID, &[piece(&[&[1]], 0, 2)], i32::MAX);
        assert_eq!(field.get(0, 1), Some(0));
        assert_eq!(field.get(0, 2), Some(1));
        assert_eq!(field.get(0, 19), Some(1));
    }

    #[test]
    fn test_overlaps_accumulate() {
        let obstacles = vec![piece(&[&[1], &[1]], 4, 0), piece(&[&[1]], 4, 10)];
        let field = DangerField::build(&GRID, &obstacles, 25);
        assert_eq!(field.get(4, 0), Some(1));
        assert_eq!(field.get(4, 1), Some(2));
        assert_eq!(field.get(4, 12), Some(3));
    }

    #[test]
    fn test_pieces_above_grid_still_project() {
        let field = DangerField::build(&GRID, &[piece(&[&[1]], 7, -3)], 25);
        assert_eq!(field.get(7, 0), Some(1));
        assert_eq!(field.get(7, 19), Some(1));
    }

    #[test]
    fn test_out_of_range_lookups() {
        let field = DangerField::build(&GRID, &[], 25);
        assert_eq!(field.get(-1, 0), None);
        assert_eq!(field.get(10, 0), None);
        assert_eq!(field.get(0, 20), None);
        assert_eq!(field.columns(), GRID.columns);
        assert_eq!(field.rows(), GRID.rows);
    }

    #[test]
    fn test_safety_looks_one_row_up_only() {
        let field = DangerField::build(&GRID, &[piece(&[&[1]], 5, 18)], 1);
        // Only (5, 18) is dangerous
        assert!(!field.is_safe(5, 18));
        assert!(!field.is_safe(5, 19));
        assert!(field.is_safe(5, 17));
        assert_eq!(field.exposure(5, 19), 1);
        assert_eq!(field.exposure(5, 18), 1);
        assert!(field.is_safe(5, 0) && field.exposure(5, 0) == 0);
    }

    fn arb_obstacles() -> impl Strategy<Value = Vec<Obstacle>> {
        let shapes = catalog();
        proptest::collection::vec((0..shapes.len(), -4i32..10, -5i32..22), 0..8).prop_map(
            move |placements| {
                placements
                    .into_iter()
                    .map(|(i, x, y)| Obstacle::new(&shapes[i], IVec2::new(x, y), 0))
                    .collect()
            },
        )
    }

    proptest! {
        #[test]
        fn field_counts_every_projected_cell(obstacles in arb_obstacles(), depth in 0i32..30) {
            let field = DangerField::build(&GRID, &obstacles, depth);
            let mut expected = vec![0u32; 200];
            for obstacle in &obstacles {
                for cell in obstacle.cells() {
                    for step in 0..depth {
                        let at = IVec2::new(cell.x, cell.y + step);
                        if GRID.contains(at) {
                            expected[(at.y * 10 + at.x) as usize] += 1;
                        }
                    }
                }
            }
            for row in 0..20 {
                for column in 0..10 {
                    prop_assert_eq!(field.get(column, row), Some(expected[(row * 10 + column) as usize]));
                }
            }
        }

        #[test]
        fn rebuilding_is_idempotent(obstacles in arb_obstacles()) {
            let a = DangerField::build(&GRID, &obstacles, 25);
            let b = DangerField::build(&GRID, &obstacles, 25);
            prop_assert_eq!(a, b);
        }
    }
}
