//! Fine-grained occupancy cell.

use skirmish_core::{
    truncate_decimal, Field, OccupantLookup, Pos, Result, UnitId, FIELD_COUNT,
};

/// One fine grid slot: per-field occupant plus a cached terrain height.
///
/// Occupants are stored as [`UnitId`]s; the unit arena remains their only
/// owner.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Cell {
    occupants: [Option<UnitId>; FIELD_COUNT],
    empty_footprint_occupants: [Option<UnitId>; FIELD_COUNT],
    height: f32,
}

impl Cell {
    /// Unit occupying the cell in `field`, if any.
    #[must_use]
    pub fn occupant(&self, field: Field) -> Option<UnitId> {
        self.occupants[field.index()]
    }

    /// Records `occupant` in `field`, replacing any previous claim.
    pub fn set_occupant(&mut self, field: Field, occupant: Option<UnitId>) {
        self.occupants[field.index()] = occupant;
    }

    /// Unit whose masked footprint leaves this cell uncovered, if any.
    #[must_use]
    pub fn occupant_with_empty_footprint(&self, field: Field) -> Option<UnitId> {
        self.empty_footprint_occupants[field.index()]
    }

    /// Records a unit whose masked footprint leaves this cell uncovered.
    pub fn set_occupant_with_empty_footprint(&mut self, field: Field, occupant: Option<UnitId>) {
        self.empty_footprint_occupants[field.index()] = occupant;
    }

    /// Raw-index form of [`Cell::occupant`] for indices read from external data.
    pub fn occupant_by_index(&self, index: i32) -> Result<Option<UnitId>> {
        Ok(self.occupant(Field::from_index(index)?))
    }

    /// Raw-index form of [`Cell::set_occupant`].
    pub fn set_occupant_by_index(&mut self, index: i32, occupant: Option<UnitId>) -> Result<()> {
        self.set_occupant(Field::from_index(index)?, occupant);
        Ok(())
    }

    /// Raw-index form of [`Cell::occupant_with_empty_footprint`].
    pub fn occupant_with_empty_footprint_by_index(&self, index: i32) -> Result<Option<UnitId>> {
        Ok(self.occupant_with_empty_footprint(Field::from_index(index)?))
    }

    /// Raw-index form of [`Cell::set_occupant_with_empty_footprint`].
    pub fn set_occupant_with_empty_footprint_by_index(
        &mut self,
        index: i32,
        occupant: Option<UnitId>,
    ) -> Result<()> {
        self.set_occupant_with_empty_footprint(Field::from_index(index)?, occupant);
        Ok(())
    }

    /// Terrain height sample, truncated to six decimals.
    #[must_use]
    pub fn height(&self) -> f32 {
        truncate_decimal(self.height)
    }

    /// Stores a terrain height sample, truncated to six decimals.
    pub fn set_height(&mut self, height: f32) {
        self.height = truncate_decimal(height);
    }

    /// Reports whether `field` holds no blocking occupant.
    ///
    /// Decaying corpses do not block. An identifier the arena no longer
    /// resolves is treated the same way.
    #[must_use]
    pub fn is_free(&self, field: Field, units: &dyn OccupantLookup) -> bool {
        match self.occupant(field) {
            None => true,
            Some(id) => units.occupant(id).map_or(true, |unit| unit.is_decaying()),
        }
    }

    /// Planning-only relaxation of [`Cell::is_free`].
    ///
    /// A mobile occupant further than `radius` from `origin` is expected to
    /// have moved away by the time the planning unit reaches `cell_pos`.
    #[must_use]
    pub fn is_free_or_might_be_free_soon(
        &self,
        origin: Pos,
        cell_pos: Pos,
        field: Field,
        units: &dyn OccupantLookup,
        radius: f32,
    ) -> bool {
        let Some(id) = self.occupant(field) else {
            return true;
        };
        let Some(unit) = units.occupant(id) else {
            return true;
        };
        if unit.is_decaying() {
            return true;
        }

        origin.dist(cell_pos) > radius && unit.is_mobile()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{UnitArena, UnitKind};
    use skirmish_core::{CardinalDir, GridError, TeamIndex};

    fn team() -> TeamIndex {
        TeamIndex::new(0).expect("team")
    }

    #[test]
    fn set_occupant_toggles_freedom() {
        let mut units = UnitArena::new();
        let soldier = units.spawn(UnitKind::soldier(), team(), Pos::new(0, 0), CardinalDir::North);
        let mut cell = Cell::default();

        for field in Field::ALL {
            cell.set_occupant(field, Some(soldier));
            assert!(!cell.is_free(field, &units), "{field:?} should be blocked");
            cell.set_occupant(field, None);
            assert!(cell.is_free(field, &units), "{field:?} should be free");
        }
    }

    #[test]
    fn fields_are_independent() {
        let mut units = UnitArena::new();
        let soldier = units.spawn(UnitKind::soldier(), team(), Pos::new(0, 0), CardinalDir::North);
        let mut cell = Cell::default();

        cell.set_occupant(Field::Land, Some(soldier));

        assert!(!cell.is_free(Field::Land, &units));
        assert!(cell.is_free(Field::Air, &units));
    }

    #[test]
    fn decaying_occupant_does_not_block() {
        let mut units = UnitArena::new();
        let soldier = units.spawn(UnitKind::soldier(), team(), Pos::new(0, 0), CardinalDir::North);
        let mut cell = Cell::default();
        cell.set_occupant(Field::Land, Some(soldier));

        units.get_mut(soldier).expect("soldier").mark_decaying();

        assert!(cell.is_free(Field::Land, &units));
    }

    #[test]
    fn raw_field_index_outside_range_is_rejected() {
        let mut cell = Cell::default();

        assert_eq!(
            cell.occupant_by_index(FIELD_COUNT as i32),
            Err(GridError::FieldOutOfRange { index: 2 })
        );
        assert_eq!(
            cell.set_occupant_by_index(-1, None),
            Err(GridError::FieldOutOfRange { index: -1 })
        );
        assert_eq!(
            cell.occupant_with_empty_footprint_by_index(7),
            Err(GridError::FieldOutOfRange { index: 7 })
        );
        assert_eq!(
            cell.set_occupant_with_empty_footprint_by_index(2, None),
            Err(GridError::FieldOutOfRange { index: 2 })
        );
        assert_eq!(cell.occupant_by_index(1), Ok(None));
    }

    #[test]
    fn height_is_stored_truncated() {
        let mut cell = Cell::default();
        cell.set_height(1.234_567_9);

        let stored = cell.height();
        assert!((stored - 1.234_567).abs() < 1.0e-7);
        cell.set_height(stored);
        assert_eq!(cell.height(), stored);
    }

    #[test]
    fn distant_mobile_occupant_might_be_free_soon() {
        let mut units = UnitArena::new();
        let soldier = units.spawn(UnitKind::soldier(), team(), Pos::new(9, 0), CardinalDir::North);
        let mut cell = Cell::default();
        cell.set_occupant(Field::Land, Some(soldier));

        let origin = Pos::new(0, 0);
        let might_be_free =
            |pos| cell.is_free_or_might_be_free_soon(origin, pos, Field::Land, &units, 5.0);
        assert!(might_be_free(Pos::new(9, 0)));
        assert!(!might_be_free(Pos::new(4, 3)));
    }

    #[test]
    fn static_occupant_never_might_be_free_soon() {
        let mut units = UnitArena::new();
        let farm = units.spawn(UnitKind::structure(2), team(), Pos::new(9, 0), CardinalDir::North);
        let mut cell = Cell::default();
        cell.set_occupant(Field::Land, Some(farm));

        assert!(!cell.is_free_or_might_be_free_soon(
            Pos::new(0, 0),
            Pos::new(9, 0),
            Field::Land,
            &units,
            5.0
        ));
    }
}
