//! Unit arena that owns every entity the grid refers to by identifier.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use skirmish_core::{
    CardinalDir, Field, Footprint, HarvestAware, Occupant, OccupantLookup, Pos, PositionAccess,
    TeamIndex, UnitId,
};

/// Static description of a unit type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UnitKind {
    /// Human readable type name.
    pub name: String,
    /// Cells claimed by units of this type.
    pub footprint: Footprint,
    /// Field the type lives in.
    pub field: Field,
    /// Whether units of this type can move.
    pub mobile: bool,
    /// Sight range in fine cells.
    pub sight: i32,
}

impl UnitKind {
    /// Single-cell mobile land unit.
    #[must_use]
    pub fn soldier() -> Self {
        Self {
            name: String::from("soldier"),
            footprint: Footprint::square(1),
            field: Field::Land,
            mobile: true,
            sight: 8,
        }
    }

    /// Single-cell mobile air unit.
    #[must_use]
    pub fn flyer() -> Self {
        Self {
            name: String::from("flyer"),
            footprint: Footprint::square(1),
            field: Field::Air,
            mobile: true,
            sight: 10,
        }
    }

    /// Static land structure covering a `size`×`size` block.
    #[must_use]
    pub fn structure(size: i32) -> Self {
        Self {
            name: String::from("structure"),
            footprint: Footprint::square(size),
            field: Field::Land,
            mobile: false,
            sight: 4,
        }
    }
}

/// Command a unit is currently executing, as far as the grid cares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Skill {
    /// Idle or executing a stationary command.
    #[default]
    Stop,
    /// Walking or flying between cells.
    Move,
    /// Transforming into another unit type.
    Morph,
}

/// Entity stored in the [`UnitArena`].
#[derive(Clone, Debug)]
pub struct UnitRecord {
    id: UnitId,
    team: TeamIndex,
    kind: UnitKind,
    morph_into: Option<UnitKind>,
    field: Field,
    facing: CardinalDir,
    pos: Pos,
    skill: Skill,
    decaying: bool,
    harvesting: bool,
    bad_harvest_positions: BTreeSet<Pos>,
}

impl UnitRecord {
    /// Type the unit was created as.
    #[must_use]
    pub fn kind(&self) -> &UnitKind {
        &self.kind
    }

    /// Current skill.
    #[must_use]
    pub fn skill(&self) -> Skill {
        self.skill
    }

    /// Switches the current skill. Leaving [`Skill::Morph`] drops the pending
    /// morph target.
    pub fn set_skill(&mut self, skill: Skill) {
        if skill != Skill::Morph {
            self.morph_into = None;
        }
        self.skill = skill;
    }

    /// Starts morphing into `target`, which changes the footprint reported
    /// to skill-aware queries.
    pub fn begin_morph(&mut self, target: UnitKind) {
        self.morph_into = Some(target);
        self.skill = Skill::Morph;
    }

    /// Moves the unit's top-left cell.
    pub fn set_position(&mut self, pos: Pos) {
        self.pos = pos;
    }

    /// Rotates the unit.
    pub fn set_facing(&mut self, facing: CardinalDir) {
        self.facing = facing;
    }

    /// Moves the unit into another field.
    pub fn set_field(&mut self, field: Field) {
        self.field = field;
    }

    /// Marks the unit as a decaying corpse.
    pub fn mark_decaying(&mut self) {
        self.decaying = true;
        self.skill = Skill::Stop;
    }

    /// Starts or stops the harvest command. Stopping forgets every bad
    /// harvest position.
    pub fn set_harvesting(&mut self, harvesting: bool) {
        self.harvesting = harvesting;
        if !harvesting {
            self.bad_harvest_positions.clear();
        }
    }

    /// Remembers `pos` as an exhausted or unreachable harvest target.
    pub fn mark_bad_harvest_pos(&mut self, pos: Pos) {
        let _ = self.bad_harvest_positions.insert(pos);
    }
}

impl Occupant for UnitRecord {
    fn id(&self) -> UnitId {
        self.id
    }

    fn team(&self) -> TeamIndex {
        self.team
    }

    fn field(&self) -> Field {
        self.field
    }

    fn footprint(&self, ignore_skill: bool) -> &Footprint {
        match (&self.morph_into, ignore_skill) {
            (Some(target), false) if self.skill == Skill::Morph => &target.footprint,
            _ => &self.kind.footprint,
        }
    }

    fn facing(&self) -> CardinalDir {
        self.facing
    }

    fn position(&self, _access: PositionAccess) -> Pos {
        self.pos
    }

    fn is_mobile(&self) -> bool {
        self.kind.mobile
    }

    fn is_decaying(&self) -> bool {
        self.decaying
    }

    fn is_moving(&self) -> bool {
        self.skill == Skill::Move
    }
}

impl HarvestAware for UnitRecord {
    fn is_bad_harvest_pos(&self, pos: Pos) -> bool {
        self.harvesting && self.bad_harvest_positions.contains(&pos)
    }
}

/// Registry that owns units and allocates their identifiers.
#[derive(Debug)]
pub struct UnitArena {
    entries: BTreeMap<UnitId, UnitRecord>,
    next_unit_id: UnitId,
}

impl UnitArena {
    /// Creates an empty arena with a reset identifier counter.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_unit_id: UnitId::new(1),
        }
    }

    /// Registers a new unit and returns its identifier.
    pub fn spawn(
        &mut self,
        kind: UnitKind,
        team: TeamIndex,
        pos: Pos,
        facing: CardinalDir,
    ) -> UnitId {
        let id = self.next_unit_id;
        self.next_unit_id = UnitId::new(id.get().saturating_add(1));
        let record = UnitRecord {
            id,
            team,
            field: kind.field,
            kind,
            morph_into: None,
            facing,
            pos,
            skill: Skill::Stop,
            decaying: false,
            harvesting: false,
            bad_harvest_positions: BTreeSet::new(),
        };
        let _ = self.entries.insert(id, record);
        id
    }

    /// Looks up a unit.
    #[must_use]
    pub fn get(&self, id: UnitId) -> Option<&UnitRecord> {
        self.entries.get(&id)
    }

    /// Looks up a unit for mutation.
    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut UnitRecord> {
        self.entries.get_mut(&id)
    }

    /// Removes a unit, returning it when it existed.
    pub fn remove(&mut self, id: UnitId) -> Option<UnitRecord> {
        self.entries.remove(&id)
    }

    /// Iterates units in identifier order.
    pub fn iter(&self) -> impl Iterator<Item = &UnitRecord> {
        self.entries.values()
    }

    /// Number of registered units.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Reports whether the arena holds no unit.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for UnitArena {
    fn default() -> Self {
        Self::new()
    }
}

impl OccupantLookup for UnitArena {
    fn occupant(&self, id: UnitId) -> Option<&dyn Occupant> {
        self.entries.get(&id).map(|record| record as &dyn Occupant)
    }
}
