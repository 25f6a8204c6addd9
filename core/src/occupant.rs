//! Capabilities through which the grid observes the units occupying it.

use crate::{CardinalDir, Field, Footprint, Pos, TeamIndex, UnitId};

/// Selects which position accessor a unit should serve a read from.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum PositionAccess {
    /// Fast path, valid only on the primary simulation thread.
    #[default]
    Primary,
    /// Accessor safe to call from worker threads.
    Threaded,
}

/// Read-only view of a unit as seen by the grid.
pub trait Occupant {
    /// Identifier stored in the cells the unit occupies.
    fn id(&self) -> UnitId;

    /// Team the unit belongs to, used for fog-of-war aware queries.
    fn team(&self) -> TeamIndex;

    /// Occupancy field the unit currently lives in.
    fn field(&self) -> Field;

    /// Footprint used to claim cells.
    ///
    /// While a morph is in progress the unit reports the footprint of the
    /// type it is morphing into, unless `ignore_skill` is set.
    fn footprint(&self, ignore_skill: bool) -> &Footprint;

    /// Facing used to rotate masked footprints.
    fn facing(&self) -> CardinalDir;

    /// Top-left fine cell of the unit.
    fn position(&self, access: PositionAccess) -> Pos;

    /// Whether the unit type can move at all.
    fn is_mobile(&self) -> bool;

    /// Whether the unit is dead and decaying, which makes its cells passable.
    fn is_decaying(&self) -> bool;

    /// Whether the unit is currently executing a move skill.
    fn is_moving(&self) -> bool;

    /// Fine cell at the centre of the unit's footprint.
    fn centered_position(&self, access: PositionAccess) -> Pos {
        let half = self.footprint(true).size() / 2;
        self.position(access).offset(half, half)
    }
}

/// Harvest task state consulted by movement predicates.
pub trait HarvestAware {
    /// Reports whether `pos` is a harvest target the unit already found
    /// exhausted or unreachable. Implementations answer `false` whenever the
    /// unit is not running a harvest command.
    fn is_bad_harvest_pos(&self, pos: Pos) -> bool;
}

/// Resolves unit identifiers stored in cells back to their units.
pub trait OccupantLookup {
    /// Returns the unit registered under `id`, if it still exists.
    fn occupant(&self, id: UnitId) -> Option<&dyn Occupant>;
}
