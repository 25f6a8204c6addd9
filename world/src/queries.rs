//! Occupancy predicates consulted by pathfinding and AI planning.
//!
//! Every predicate is a pure read. Positions outside either grid are simply
//! not free; only the footprint variants that take a specific unit fail with
//! an error, and only when the caller passes a field the unit does not live
//! in.

use skirmish_core::{
    to_surface_coords, Field, GridError, Occupant, OccupantLookup, Pos, Result, TeamIndex,
};

use crate::{cell::Cell, grid::Grid};

impl Grid {
    /// Terrain part of the freedom rule: the surface must be free unless the
    /// field is air, and land cells must not be deep submerged.
    fn terrain_allows(&self, pos: Pos, field: Field, cell: &Cell) -> bool {
        let surface_free = field == Field::Air
            || self
                .try_covering_surface_cell(pos)
                .map_or(false, |surface| surface.is_free());
        surface_free && (field != Field::Land || !self.is_deep_submerged_cell(cell))
    }

    fn is_free_cell_with(
        &self,
        pos: Pos,
        field: Field,
        occupant_free: impl FnOnce(&Cell) -> bool,
    ) -> bool {
        if !self.is_inside_both(pos) {
            return false;
        }
        let Some(cell) = self.try_cell(pos) else {
            return false;
        };
        occupant_free(cell) && self.terrain_allows(pos, field, cell)
    }

    /// Whether a unit living in `field` may occupy `pos` right now.
    #[must_use]
    pub fn is_free_cell(&self, pos: Pos, field: Field, units: &dyn OccupantLookup) -> bool {
        self.is_free_cell_with(pos, field, |cell| cell.is_free(field, units))
    }

    /// Like [`Grid::is_free_cell`], but mobile occupants do not block. Only
    /// static structures and terrain count.
    #[must_use]
    pub fn is_free_cell_buildings_only(
        &self,
        pos: Pos,
        field: Field,
        units: &dyn OccupantLookup,
    ) -> bool {
        self.is_free_cell_with(pos, field, |cell| {
            cell.is_free(field, units)
                || cell
                    .occupant(field)
                    .and_then(|id| units.occupant(id))
                    .map_or(false, |occupant| occupant.is_mobile())
        })
    }

    /// Like [`Grid::is_free_cell`], but a cell already claimed by `unit`
    /// itself only has to satisfy the terrain rule.
    ///
    /// Fails with [`GridError::FieldMismatch`] when `field` is not the
    /// unit's current field.
    pub fn is_free_cell_or_has_unit(
        &self,
        pos: Pos,
        field: Field,
        unit: &dyn Occupant,
        units: &dyn OccupantLookup,
    ) -> Result<bool> {
        if unit.field() != field {
            return Err(GridError::FieldMismatch {
                unit: unit.field(),
                requested: field,
            });
        }
        let own_id = unit.id();
        Ok(self.is_free_cell_with(pos, field, |cell| {
            cell.occupant(field) == Some(own_id) || cell.is_free(field, units)
        }))
    }

    /// Planning relaxation of [`Grid::is_free_cell`] that lets mobile
    /// occupants further than the configured radius from `origin` pass.
    #[must_use]
    pub fn is_free_cell_or_might_be_free_soon(
        &self,
        origin: Pos,
        pos: Pos,
        field: Field,
        units: &dyn OccupantLookup,
    ) -> bool {
        let radius = self.config.might_be_free_soon_radius;
        self.is_free_cell_with(pos, field, |cell| {
            cell.is_free_or_might_be_free_soon(origin, pos, field, units, radius)
        })
    }

    /// Fog-aware freedom as far as `team` can know it.
    ///
    /// Cells `team` sees use `exact`. Explored but unseen cells fall back to
    /// the static terrain rule for land and are free for other fields.
    /// Unexplored cells are assumed free.
    fn aprox_free_with(
        &self,
        pos: Pos,
        field: Field,
        team: TeamIndex,
        exact: impl FnOnce() -> bool,
    ) -> bool {
        if !self.is_inside_both(pos) {
            return false;
        }
        let (Some(surface), Some(cell)) = (self.try_covering_surface_cell(pos), self.try_cell(pos))
        else {
            return false;
        };

        if surface.is_visible(team) {
            exact()
        } else if surface.is_explored(team) {
            field != Field::Land || (surface.is_free() && !self.is_deep_submerged_cell(cell))
        } else {
            true
        }
    }

    /// Freedom of `pos` for `team`, limited to what its fog of war reveals.
    #[must_use]
    pub fn is_aprox_free_cell(
        &self,
        pos: Pos,
        field: Field,
        team: TeamIndex,
        units: &dyn OccupantLookup,
    ) -> bool {
        self.aprox_free_with(pos, field, team, || self.is_free_cell(pos, field, units))
    }

    /// Fog-aware form of [`Grid::is_free_cell_or_might_be_free_soon`].
    #[must_use]
    pub fn is_aprox_free_cell_or_might_be_free_soon(
        &self,
        origin: Pos,
        pos: Pos,
        field: Field,
        team: TeamIndex,
        units: &dyn OccupantLookup,
    ) -> bool {
        self.aprox_free_with(pos, field, team, || {
            self.is_free_cell_or_might_be_free_soon(origin, pos, field, units)
        })
    }

    /// Whether every cell of the `size`×`size` block at `pos` is free.
    #[must_use]
    pub fn is_free_cells(
        &self,
        pos: Pos,
        size: i32,
        field: Field,
        units: &dyn OccupantLookup,
    ) -> bool {
        block(pos, size).all(|cell| self.is_free_cell(cell, field, units))
    }

    /// Block form of [`Grid::is_free_cell_or_has_unit`].
    pub fn is_free_cells_or_has_unit(
        &self,
        pos: Pos,
        size: i32,
        field: Field,
        unit: &dyn Occupant,
        units: &dyn OccupantLookup,
    ) -> Result<bool> {
        for cell in block(pos, size) {
            if !self.is_free_cell_or_has_unit(cell, field, unit, units)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    /// Block form of [`Grid::is_aprox_free_cell`].
    #[must_use]
    pub fn is_aprox_free_cells(
        &self,
        pos: Pos,
        size: i32,
        field: Field,
        team: TeamIndex,
        units: &dyn OccupantLookup,
    ) -> bool {
        block(pos, size).all(|cell| self.is_aprox_free_cell(cell, field, team, units))
    }

    /// Whether the surface cell covering fine position `pos` has been
    /// explored by `team`.
    #[must_use]
    pub fn is_explored_by(&self, pos: Pos, team: TeamIndex) -> bool {
        self.try_surface_cell(to_surface_coords(pos))
            .map_or(false, |surface| surface.is_explored(team))
    }
}

/// Positions of the `size`×`size` block whose top-left corner is `origin`,
/// row by row.
pub(crate) fn block(origin: Pos, size: i32) -> impl Iterator<Item = Pos> {
    (0..size).flat_map(move |dy| (0..size).map(move |dx| origin.offset(dx, dy)))
}
