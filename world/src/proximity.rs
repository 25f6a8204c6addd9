//! Neighbourhood queries used by build, harvest and group-move commands.

use skirmish_core::{
    to_surface_coords, CardinalDir, Field, Footprint, Occupant, OccupantLookup, Pos,
    PositionAccess, ResourceKind, UnitId,
};

use crate::{grid::Grid, queries::block};

/// Group formation offsets wrap at this distance from the reference unit.
const FORMATION_SPAN: i32 = 3;

impl Grid {
    /// Finds a resource of `kind` touching the `size`×`size` block at `pos`.
    ///
    /// Scans the block plus a one-cell margin and returns the fine position
    /// of the first match. With `click_pos`, only that position qualifies.
    #[must_use]
    pub fn is_resource_near(
        &self,
        pos: Pos,
        kind: ResourceKind,
        size: i32,
        click_pos: Option<Pos>,
    ) -> Option<Pos> {
        block(pos.offset(-1, -1), size + 2).find(|&candidate| {
            if click_pos.map_or(false, |click| click != candidate) {
                return false;
            }
            self.is_inside(candidate)
                && self
                    .try_surface_cell(to_surface_coords(candidate))
                    .and_then(|surface| surface.resource())
                    .map_or(false, |resource| resource.kind == kind)
        })
    }

    fn holds_land_slot(&self, pos: Pos, unit: UnitId) -> bool {
        self.is_inside_both(pos)
            && self.try_cell(pos).map_or(false, |cell| {
                cell.occupant(Field::Land) == Some(unit)
                    || cell.occupant_with_empty_footprint(Field::Land) == Some(unit)
            })
    }

    /// Whether `unit` holds the land slot of `pos` or one of its eight
    /// neighbours.
    #[must_use]
    pub fn is_next_to_unit(&self, pos: Pos, unit: UnitId) -> bool {
        block(pos.offset(-1, -1), 3).any(|candidate| self.holds_land_slot(candidate, unit))
    }

    /// Whether `other` is `pos` or one of its eight neighbours.
    #[must_use]
    pub fn is_next_to_pos(&self, pos: Pos, other: Pos) -> bool {
        (pos.x() - other.x()).abs() <= 1 && (pos.y() - other.y()).abs() <= 1
    }

    /// Whether `other` holds a land slot on or around the footprint of
    /// `unit`.
    #[must_use]
    pub fn are_units_next_to(&self, unit: &dyn Occupant, other: UnitId) -> bool {
        let origin = unit.position(PositionAccess::Primary);
        let size = unit.footprint(true).size();
        block(origin.offset(-1, -1), size + 2)
            .any(|candidate| self.holds_land_slot(candidate, other))
    }

    /// Moves `pos` onto the nearest fine cell.
    #[must_use]
    pub fn clamp_pos(&self, pos: Pos) -> Pos {
        Pos::new(
            pos.x().clamp(0, (self.width - 1).max(0)),
            pos.y().clamp(0, (self.height - 1).max(0)),
        )
    }

    /// Average position of a selection, or `None` for an empty one.
    #[must_use]
    pub fn compute_ref_pos(&self, selection: &[&dyn Occupant]) -> Option<Pos> {
        let count = i32::try_from(selection.len()).ok().filter(|&count| count > 0)?;
        let total = selection
            .iter()
            .map(|unit| unit.position(PositionAccess::Primary))
            .fold(Pos::default(), |total, pos| total + pos);
        Some(Pos::new(total.x() / count, total.y() / count))
    }

    /// Destination of one selected unit for a group move to `command_pos`.
    ///
    /// The unit keeps its offset from the reference position, folded into a
    /// small formation, and the result is clamped into the grid.
    #[must_use]
    pub fn compute_dest_pos(&self, ref_unit_pos: Pos, unit_pos: Pos, command_pos: Pos) -> Pos {
        let fold = |delta: i32| {
            if delta.abs() >= FORMATION_SPAN {
                delta % FORMATION_SPAN
            } else {
                delta
            }
        };
        let diff = unit_pos - ref_unit_pos;
        self.clamp_pos(command_pos + Pos::new(fold(diff.x()), fold(diff.y())))
    }

    /// Selected unit closest to any covered cell of a structure placed at
    /// `build_pos`.
    #[must_use]
    pub fn find_closest_unit_to_pos(
        &self,
        selection: &[&dyn Occupant],
        build_pos: Pos,
        footprint: &Footprint,
    ) -> Option<UnitId> {
        let mut best: Option<(f32, UnitId)> = None;
        for cell in covered_cells(build_pos, footprint) {
            for unit in selection {
                let range = unit.position(PositionAccess::Primary).dist(cell);
                if best.map_or(true, |(best_range, _)| range < best_range) {
                    best = Some((range, unit.id()));
                }
            }
        }
        best.map(|(_, id)| id)
    }

    /// Free cell bordering a structure placed at `build_pos` that `unit` can
    /// reach fastest.
    ///
    /// Only the one-cell ring around the footprint qualifies. The cell the
    /// builder already stands on counts as free. Falls back to `build_pos`
    /// when the whole ring is blocked or outside the grid.
    #[must_use]
    pub fn find_best_build_approach(
        &self,
        unit: &dyn Occupant,
        build_pos: Pos,
        footprint: &Footprint,
        units: &dyn OccupantLookup,
    ) -> Pos {
        let builder = unit.position(PositionAccess::Primary);
        let field = unit.field();
        let size = footprint.size();
        let mut best: Option<(f32, Pos)> = None;
        for cell in block(build_pos.offset(-1, -1), size + 2) {
            if self.is_in_unit_type_cells(size, build_pos, cell)
                || (cell != builder && !self.is_free_cell(cell, field, units))
            {
                continue;
            }
            let range = builder.dist(cell);
            if best.map_or(true, |(best_range, _)| range < best_range) {
                best = Some((range, cell));
            }
        }
        best.map_or(build_pos, |(_, cell)| cell)
    }

    /// Whether `test_pos` lies inside the `size`×`size` block at `pos`.
    #[must_use]
    pub fn is_in_unit_type_cells(&self, size: i32, pos: Pos, test_pos: Pos) -> bool {
        block(pos, size).any(|cell| self.is_inside(cell) && cell == test_pos)
    }

    /// Whether `test_pos` borders the `size`×`size` block at `pos` without
    /// lying inside it.
    #[must_use]
    pub fn is_next_to_unit_type_cells(&self, size: i32, pos: Pos, test_pos: Pos) -> bool {
        if self.is_in_unit_type_cells(size, pos, test_pos) {
            return false;
        }
        block(pos.offset(-1, -1), size + 2).any(|cell| self.is_inside(cell) && cell == test_pos)
    }

    /// Whether `unit` could turn into a type with footprint `target` living
    /// in `target_field` while staying at `pos`.
    ///
    /// Cells the unit already holds do not block; every other covered cell
    /// must be free and inside the grid.
    #[must_use]
    pub fn can_morph(
        &self,
        pos: Pos,
        unit: &dyn Occupant,
        target: &Footprint,
        target_field: Field,
        units: &dyn OccupantLookup,
    ) -> bool {
        let id = unit.id();
        let facing = unit.facing();
        for y in 0..target.size() {
            for x in 0..target.size() {
                if !target.covers(x, y, facing) {
                    continue;
                }
                let cell_pos = pos.offset(x, y);
                let Some(cell) = self.try_cell(cell_pos).filter(|_| self.is_inside_both(cell_pos))
                else {
                    return false;
                };
                if cell.occupant(target_field) != Some(id)
                    && !self.is_free_cell(cell_pos, target_field, units)
                {
                    return false;
                }
            }
        }
        true
    }
}

fn covered_cells(origin: Pos, footprint: &Footprint) -> impl Iterator<Item = Pos> + '_ {
    (0..footprint.size()).flat_map(move |x| {
        (0..footprint.size()).filter_map(move |y| {
            footprint
                .covers(x, y, CardinalDir::North)
                .then(|| origin.offset(x, y))
        })
    })
}
