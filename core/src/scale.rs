//! Conversion between fine unit coordinates and coarse surface coordinates.

use crate::Pos;

/// Number of fine cells along each edge of a surface cell.
pub const CELL_SCALE: i32 = 2;

/// World units along each edge of a surface cell.
pub const MAP_SCALE: i32 = 2;

/// Converts a fine unit position into the surface cell covering it.
///
/// Division floors, so negative positions map to the surface cell on their
/// left/top rather than collapsing onto zero.
#[must_use]
pub const fn to_surface_coords(unit: Pos) -> Pos {
    Pos::new(unit.x().div_euclid(CELL_SCALE), unit.y().div_euclid(CELL_SCALE))
}

/// Converts a surface position into the fine position of its top-left cell.
#[must_use]
pub const fn to_unit_coords(surface: Pos) -> Pos {
    Pos::new(surface.x() * CELL_SCALE, surface.y() * CELL_SCALE)
}
