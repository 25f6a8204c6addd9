//! Occupancy writes issued by the simulation loop.

use skirmish_core::{
    to_surface_coords, Field, GridError, Occupant, Pos, PositionAccess, Result, UnitId,
};

use crate::{grid::Grid, queries::block};

/// Outcome of [`Grid::put_unit_cells`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Placement {
    /// Every footprint cell now records the unit.
    Placed,
    /// A moving unit found another unit on its way. Nothing was written and
    /// the caller is expected to cancel the move.
    Blocked {
        /// First conflicting cell.
        pos: Pos,
        /// Unit holding that cell.
        occupant: UnitId,
    },
}

impl Grid {
    fn footprint_cells(
        &self,
        unit: &dyn Occupant,
        pos: Pos,
        ignore_skill: bool,
    ) -> Result<Vec<(Pos, bool)>> {
        let footprint = unit.footprint(ignore_skill);
        let facing = unit.facing();
        let mut cells = Vec::new();
        for y in 0..footprint.size() {
            for x in 0..footprint.size() {
                let cell = pos.offset(x, y);
                if !self.is_inside_both(cell) {
                    return Err(GridError::CellOutOfRange {
                        pos: cell,
                        width: self.width,
                        height: self.height,
                    });
                }
                cells.push((cell, footprint.covers(x, y, facing)));
            }
        }
        Ok(cells)
    }

    /// Claims the footprint of `unit` with its top-left corner at `pos`.
    ///
    /// Masked-out cells record the unit in their empty-footprint slot when
    /// the footprint allows it. Cells held by another unit stop a moving unit
    /// with [`Placement::Blocked`] and fail for any other unit with
    /// [`GridError::CellOccupied`]. In both cases nothing is written.
    /// `threaded` selects the worker-safe position accessor for diagnostics.
    pub fn put_unit_cells(
        &mut self,
        unit: &dyn Occupant,
        pos: Pos,
        ignore_skill: bool,
        threaded: bool,
    ) -> Result<Placement> {
        let cells = self.footprint_cells(unit, pos, ignore_skill)?;
        let field = unit.field();
        let id = unit.id();

        for &(cell_pos, covered) in &cells {
            if !covered {
                continue;
            }
            let cell = self.cell(cell_pos)?;
            if let Some(occupant) = cell.occupant(field).filter(|&other| other != id) {
                if unit.is_moving() {
                    if self.diagnostics.enabled() {
                        let access = if threaded {
                            PositionAccess::Threaded
                        } else {
                            PositionAccess::Primary
                        };
                        self.diagnostics.record(
                            id,
                            format_args!(
                                "put_unit_cells blocked at {cell_pos:?} by {} while at {:?}",
                                occupant.get(),
                                unit.position(access)
                            ),
                        );
                    }
                    return Ok(Placement::Blocked {
                        pos: cell_pos,
                        occupant,
                    });
                }
                return Err(GridError::CellOccupied {
                    pos: cell_pos,
                    occupant: occupant.get(),
                });
            }
        }

        let footprint = unit.footprint(ignore_skill);
        let track_empty = footprint.has_empty_cell_map() && footprint.allow_empty_cell_map();
        for (cell_pos, covered) in cells {
            let cell = self.cell_mut(cell_pos)?;
            if covered {
                cell.set_occupant(field, Some(id));
            } else if track_empty {
                cell.set_occupant_with_empty_footprint(field, Some(id));
            }
        }
        Ok(Placement::Placed)
    }

    /// Releases the footprint of `unit` at `pos`. Slots held by any other
    /// unit are left alone.
    pub fn clear_unit_cells(
        &mut self,
        unit: &dyn Occupant,
        pos: Pos,
        ignore_skill: bool,
    ) -> Result<()> {
        let cells = self.footprint_cells(unit, pos, ignore_skill)?;
        let field = unit.field();
        let id = unit.id();

        for (cell_pos, _) in cells {
            let cell = self.cell_mut(cell_pos)?;
            if cell.occupant(field) == Some(id) {
                cell.set_occupant(field, None);
            }
            if cell.occupant_with_empty_footprint(field) == Some(id) {
                cell.set_occupant_with_empty_footprint(field, None);
            }
        }
        Ok(())
    }

    /// Levels the ground around `unit` to the height under its centre.
    ///
    /// Covers the footprint plus a one-cell margin. Surface cells carrying an
    /// object, or whose land slot is held by another unit, keep their height.
    pub fn flatten_terrain(&mut self, unit: &dyn Occupant) -> Result<()> {
        let center = unit.centered_position(PositionAccess::Primary);
        let reference = self.surface_cell(to_surface_coords(center))?.height();
        let origin = unit.position(PositionAccess::Primary);
        let size = unit.footprint(true).size();
        let id = unit.id();

        for pos in block(origin.offset(-1, -1), size + 2) {
            if !self.is_inside_both(pos) {
                continue;
            }
            let land = self.cell(pos)?.occupant(Field::Land);
            let surface = self.surface_cell_mut(to_surface_coords(pos))?;
            if surface.object().is_none() && land.map_or(true, |occupant| occupant == id) {
                surface.set_height(reference, true);
            }
        }
        Ok(())
    }

    /// Flattens the ground under a new structure and refreshes the derived
    /// terrain data.
    pub fn prepare_terrain(&mut self, unit: &dyn Occupant) -> Result<()> {
        self.flatten_terrain(unit)?;
        self.compute_normals();
        self.compute_interpolated_heights();
        self.compute_near_submerged();
        Ok(())
    }
}
