//! Falling pieces and the shape catalog

use glam::IVec2;
use serde::{Deserialize, Serialize};

use super::grid::{Shape, occupied_cells};

/// Piece colors (0xRRGGBB)
pub mod colors {
    pub const LIGHT_GRAY: u32 = 0xC8C8C8;
    pub const GRAY: u32 = 0x969696;
    pub const DARK_GRAY: u32 = 0x646464;
    pub const CYAN: u32 = 0x00FFFF;
    pub const YELLOW: u32 = 0xFFFF00;
    pub const MAGENTA: u32 = 0xFF00FF;
    pub const GREEN: u32 = 0x00FF00;
    pub const RED: u32 = 0xFF0000;
    pub const BLUE: u32 = 0x0000FF;
    pub const ORANGE: u32 = 0xFFA500;
    pub const HOT_PINK: u32 = 0xFF69B4;
    pub const TURQUOISE: u32 = 0x40E0D0;
}

/// A shape that can be spawned, with its draw color
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShapeTemplate {
    pub shape: Shape,
    pub color: u32,
}

/// Every shape the spawner can choose from
pub fn catalog() -> Vec<ShapeTemplate> {
    const ROWS: [(&[&[u8]], u32); 12] = [
        (&[&[1]], colors::LIGHT_GRAY),
        (&[&[1, 1]], colors::GRAY),
        (&[&[1], &[1]], colors::DARK_GRAY),
        (&[&[1, 1, 1, 1]], colors::CYAN),
        (&[&[1, 1], &[1, 1]], colors::YELLOW),
        (&[&[0, 1, 0], &[1, 1, 1]], colors::MAGENTA),
        (&[&[0, 1, 1], &[1, 1, 0]], colors::GREEN),
        (&[&[1, 1, 0], &[0, 1, 1]], colors::RED),
        (&[&[0, 0, 1], &[1, 1, 1]], colors::BLUE),
        (&[&[1, 0, 0], &[1, 1, 1]], colors::ORANGE),
        (&[&[1, 1, 1]], colors::HOT_PINK),
        (&[&[1], &[1], &[1]], colors::TURQUOISE),
    ];

    ROWS.iter()
        .filter_map(|(rows, color)| {
            Shape::from_rows(rows).map(|shape| ShapeTemplate {
                shape,
                color: *color,
            })
        })
        .collect()
}

/// A falling obstacle. Its column span never changes once spawned.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Obstacle {
    pub shape: Shape,
    /// Top-left cell; negative rows are above the visible grid
    pub origin: IVec2,
    pub color: u32,
    /// Index of the lane it spawned in
    pub lane: usize,
}

impl Obstacle {
    pub fn new(template: &ShapeTemplate, origin: IVec2, lane: usize) -> Self {
        Self {
            shape: template.shape.clone(),
            origin,
            color: template.color,
            lane,
        }
    }

    pub fn cells(&self) -> Vec<IVec2> {
        occupied_cells(&self.shape, self.origin)
    }

    /// Move down one row
    pub fn descend(&mut self) {
        self.origin.y += 1;
    }

    /// True once the whole piece is below the bottom edge
    pub fn has_exited(&self, rows: i32) -> bool {
        self.origin.y >= rows
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_complete() {
        let shapes = catalog();
        assert_eq!(shapes.len(), 12);
        assert!(shapes.iter().all(|t| t.shape.local_cells().count() > 0));
        assert_eq!(shapes.iter().map(|t| t.shape.width()).max(), Some(4));
    }

    #[test]
    fn test_descend_keeps_columns() {
        let template = &catalog()[5];
        let mut piece = Obstacle::new(template, IVec2::new(3, -2), 1);
        let before: Vec<i32> = piece.cells().iter().map(|c| c.x).collect();
        piece.descend();
        piece.descend();
        let after: Vec<i32> = piece.cells().iter().map(|c| c.x).collect();
        assert_eq!(before, after);
        assert_eq!(piece.origin, IVec2::new(3, 0));
    }

    #[test]
    fn test_has_exited() {
        let template = &catalog()[2];
        let mut piece = Obstacle::new(template, IVec2::new(0, 18), 0);
        assert!(!piece.has_exited(20));
        piece.descend();
        assert!(!piece.has_exited(20));
        piece.descend();
        assert!(piece.has_exited(20));
    }
}
