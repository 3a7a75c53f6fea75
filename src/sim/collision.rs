//! Token vs obstacle collision
//!
//! Exact cell overlap. With `check_row_above` the cell directly above the
//! token also counts, so a piece cannot slip past the token between ticks.

use glam::IVec2;

use super::piece::Obstacle;

/// True if any obstacle cell lands on the token (or just above it)
pub fn token_collides(token: IVec2, obstacles: &[Obstacle], check_row_above: bool) -> bool {
    let above = token - IVec2::Y;
    obstacles.iter().any(|obstacle| {
        obstacle
            .shape
            .local_cells()
            .map(|local| obstacle.origin + local)
            .any(|cell| cell == token || (check_row_above && cell == above))
    })
}
