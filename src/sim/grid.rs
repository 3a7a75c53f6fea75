//! Grid geometry and shape occupancy
//!
//! Cells are addressed as `IVec2 { x: column, y: row }` with the origin at the
//! top-left. Rows above the visible grid are negative.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// Fixed grid dimensions for one player's field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Grid {
    pub columns: i32,
    pub rows: i32,
    /// Pixel size of one cell
    pub cell_size: i32,
}

impl Grid {
    pub const fn new(columns: i32, rows: i32, cell_size: i32) -> Self {
        Self {
            columns,
            rows,
            cell_size,
        }
    }

    #[inline]
    pub fn contains(&self, cell: IVec2) -> bool {
        self.contains_column(cell.x) && cell.y >= 0 && cell.y < self.rows
    }

    #[inline]
    pub fn contains_column(&self, column: i32) -> bool {
        column >= 0 && column < self.columns
    }

    /// Clamp a column into the playable range
    #[inline]
    pub fn clamp_column(&self, column: i32) -> i32 {
        column.clamp(0, self.columns - 1)
    }

    /// Column index of the center column
    #[inline]
    pub fn center_column(&self) -> i32 {
        self.columns / 2
    }

    /// Top-left pixel of a cell
    #[inline]
    pub fn to_pixels(&self, cell: IVec2) -> IVec2 {
        cell * self.cell_size
    }

    /// Cell at a pixel position. Positions that are not an exact multiple of
    /// the cell size do not name a cell.
    pub fn cell_from_pixels(&self, pixels: IVec2) -> Option<IVec2> {
        if self.cell_size <= 0
            || pixels.x % self.cell_size != 0
            || pixels.y % self.cell_size != 0
        {
            return None;
        }
        Some(pixels / self.cell_size)
    }
}

/// Binary occupancy matrix of a piece, row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Shape {
    width: i32,
    height: i32,
    mask: Vec<bool>,
}

impl Shape {
    /// Build from rows of 0/1. Returns `None` for empty or ragged input.
    pub fn from_rows(rows: &[&[u8]]) -> Option<Self> {
        let width = rows.first()?.len();
        if width == 0 || rows.iter().any(|r| r.len() != width) {
            return None;
        }
        let mask = rows.iter().flat_map(|r| r.iter().map(|&v| v != 0)).collect();
        Some(Self {
            width: width as i32,
            height: rows.len() as i32,
            mask,
        })
    }

    /// Footprint width in cells (bounding box)
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Footprint height in cells (bounding box)
    pub fn height(&self) -> i32 {
        self.height
    }

    pub fn is_filled(&self, local: IVec2) -> bool {
        if local.x < 0 || local.y < 0 || local.x >= self.width || local.y >= self.height {
            return false;
        }
        self.mask[(local.y * self.width + local.x) as usize]
    }

    /// Filled cells relative to the shape's top-left corner
    pub fn local_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.mask.iter().enumerate().filter_map(|(i, &filled)| {
            let i = i as i32;
            filled.then(|| IVec2::new(i % self.width, i / self.width))
        })
    }
}

/// Cells covered by `shape` anchored with its top-left at `origin`
pub fn occupied_cells(shape: &Shape, origin: IVec2) -> Vec<IVec2> {
    shape.local_cells().map(|local| origin + local).collect()
}

/// Like [`occupied_cells`] but drops cells outside `0..columns`
pub fn occupied_cells_clipped(shape: &Shape, origin: IVec2, columns: i32) -> Vec<IVec2> {
    shape
        .local_cells()
        .map(|local| origin + local)
        .filter(|cell| cell.x >= 0 && cell.x < columns)
        .collect()
}
