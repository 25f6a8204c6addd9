//! Movement feasibility between neighbouring cells.

use rustc_hash::FxHashMap;
use skirmish_core::{
    Field, HarvestAware, Occupant, OccupantLookup, Pos, PositionAccess, TeamIndex, UnitId,
};

use crate::{grid::Grid, queries::block};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
struct MoveKey {
    from: Pos,
    to: Pos,
    size: i32,
    field: Field,
    team: Option<TeamIndex>,
}

/// Caller-owned memo of movement answers for one unit's planning pass.
///
/// The cache is bound to the first unit that uses it and starts over when a
/// different unit queries through it. Skipping the cache never changes an
/// answer.
#[derive(Clone, Debug, Default)]
pub struct MoveCache {
    owner: Option<UnitId>,
    entries: FxHashMap<MoveKey, bool>,
}

impl MoveCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops every memoised answer.
    pub fn clear(&mut self) {
        self.owner = None;
        self.entries.clear();
    }

    /// Number of memoised answers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether nothing is memoised.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn bind(&mut self, owner: UnitId) {
        if self.owner != Some(owner) {
            self.entries.clear();
            self.owner = Some(owner);
        }
    }

    fn get_or_insert_with(
        &mut self,
        owner: UnitId,
        key: MoveKey,
        compute: impl FnOnce() -> bool,
    ) -> bool {
        self.bind(owner);
        *self.entries.entry(key).or_insert_with(compute)
    }
}

impl Grid {
    /// Whether `unit` may step from `from` to `to` given the live occupancy.
    ///
    /// Single-cell units moving diagonally also need both orthogonal cells
    /// free. Larger units need every destination cell free, apart from the
    /// cells they already occupy. Harvesters never step onto a position they
    /// marked as a bad harvest target.
    pub fn can_move<U>(
        &self,
        unit: &U,
        from: Pos,
        to: Pos,
        units: &dyn OccupantLookup,
        cache: Option<&mut MoveCache>,
    ) -> bool
    where
        U: Occupant + HarvestAware + ?Sized,
    {
        let field = unit.field();
        let key = MoveKey {
            from,
            to,
            size: unit.footprint(true).size(),
            field,
            team: None,
        };
        let compute =
            || self.move_feasible(unit, from, to, |pos| self.is_free_cell(pos, field, units));
        match cache {
            Some(cache) => cache.get_or_insert_with(unit.id(), key, compute),
            None => compute(),
        }
    }

    /// Form of [`Grid::can_move`] that only uses what the unit's team can
    /// see. Either endpoint outside the grid rejects the move.
    pub fn aprox_can_move<U>(
        &self,
        unit: &U,
        from: Pos,
        to: Pos,
        units: &dyn OccupantLookup,
        cache: Option<&mut MoveCache>,
    ) -> bool
    where
        U: Occupant + HarvestAware + ?Sized,
    {
        let field = unit.field();
        let team = unit.team();
        let key = MoveKey {
            from,
            to,
            size: unit.footprint(true).size(),
            field,
            team: Some(team),
        };
        let compute = || {
            self.move_feasible(unit, from, to, |pos| {
                self.is_aprox_free_cell(pos, field, team, units)
            })
        };
        match cache {
            Some(cache) => cache.get_or_insert_with(unit.id(), key, compute),
            None => compute(),
        }
    }

    /// Optimistic fog-aware form of [`Grid::can_move`] for planning.
    ///
    /// Distant mobile occupants are assumed to clear the way. Reads the
    /// unit position through the worker-safe accessor, so it may run off the
    /// simulation thread.
    pub fn aprox_can_move_soon<U>(
        &self,
        unit: &U,
        from: Pos,
        to: Pos,
        units: &dyn OccupantLookup,
    ) -> bool
    where
        U: Occupant + HarvestAware + ?Sized,
    {
        let field = unit.field();
        let team = unit.team();
        let origin = unit.position(PositionAccess::Threaded);

        let feasible = self.move_feasible(unit, from, to, |pos| {
            let free =
                self.is_aprox_free_cell_or_might_be_free_soon(origin, pos, field, team, units);
            if self.diagnostics.enabled() {
                if let Some(surface) = self.try_covering_surface_cell(pos) {
                    self.diagnostics.record(
                        unit.id(),
                        format_args!(
                            "aprox_can_move_soon {pos:?} free={free} visible={} explored={}",
                            surface.visible_string(),
                            surface.explored_string()
                        ),
                    );
                }
            }
            free
        });

        if !feasible && self.diagnostics.enabled() {
            self.diagnostics.record(
                unit.id(),
                format_args!("aprox_can_move_soon {from:?} -> {to:?} rejected"),
            );
        }
        feasible
    }

    fn move_feasible<U>(
        &self,
        unit: &U,
        from: Pos,
        to: Pos,
        mut is_free: impl FnMut(Pos) -> bool,
    ) -> bool
    where
        U: Occupant + HarvestAware + ?Sized,
    {
        if !self.is_inside_both(from) || !self.is_inside_both(to) {
            return false;
        }

        let size = unit.footprint(true).size();
        if size == 1 {
            if !is_free(to) {
                return false;
            }
            if from.is_diagonal_to(to)
                && (!is_free(Pos::new(from.x(), to.y())) || !is_free(Pos::new(to.x(), from.y())))
            {
                return false;
            }
        } else {
            let field = unit.field();
            let id = unit.id();
            for pos in block(to, size) {
                let Some(cell) = self.try_cell(pos).filter(|_| self.is_inside_both(pos)) else {
                    return false;
                };
                if cell.occupant(field) == Some(id) {
                    continue;
                }
                if !is_free(pos) {
                    return false;
                }
            }
        }

        !unit.is_bad_harvest_pos(to)
    }
}
