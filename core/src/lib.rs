#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Skirmish spatial engine.
//!
//! This crate defines the vocabulary that connects the authoritative grid,
//! the unit layer that owns entities, and pure systems. The grid stores only
//! [`UnitId`] values in its cells and consults units exclusively through the
//! [`Occupant`], [`HarvestAware`] and [`OccupantLookup`] capabilities, so it
//! never depends on concrete entity types. Systems respond with
//! [`FogCommand`] batches that the world applies.

use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

mod error;
mod occupant;
mod precision;
mod scale;

pub use error::{GridError, Result};
pub use occupant::{HarvestAware, Occupant, OccupantLookup, PositionAccess};
pub use precision::{truncate_decimal, HEIGHT_DECIMALS};
pub use scale::{to_surface_coords, to_unit_coords, CELL_SCALE, MAP_SCALE};

/// Maximum number of human or AI players a map can host.
pub const MAX_PLAYERS: usize = 8;

/// Number of special factions (neutral, observer) tracked next to players.
pub const SPECIAL_FACTIONS: usize = 2;

/// Number of team slots tracked by per-team visibility state.
pub const MAX_TEAMS: usize = MAX_PLAYERS + SPECIAL_FACTIONS;

/// Number of occupancy fields available on every cell.
pub const FIELD_COUNT: usize = 2;

/// Mutually exclusive occupancy channel of a fine cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Field {
    /// Ground level occupancy.
    Land,
    /// Airborne occupancy.
    Air,
}

impl Field {
    /// Every field in index order.
    pub const ALL: [Field; FIELD_COUNT] = [Field::Land, Field::Air];

    /// Zero-based slot index of the field.
    #[must_use]
    pub const fn index(self) -> usize {
        match self {
            Self::Land => 0,
            Self::Air => 1,
        }
    }

    /// Resolves a raw field index, rejecting anything outside `0..FIELD_COUNT`.
    pub fn from_index(index: i32) -> Result<Self> {
        match index {
            0 => Ok(Self::Land),
            1 => Ok(Self::Air),
            _ => Err(GridError::FieldOutOfRange { index }),
        }
    }
}

/// Facing of a unit, used to rotate footprint masks.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardinalDir {
    /// Unrotated facing.
    #[default]
    North,
    /// Rotated a quarter turn clockwise.
    East,
    /// Rotated half a turn.
    South,
    /// Rotated a quarter turn counter-clockwise.
    West,
}

/// Stable identifier of a unit stored in the unit arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(u32);

impl UnitId {
    /// Creates a new unit identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Index of a team slot in per-team visibility arrays.
///
/// Construction validates the index against [`MAX_TEAMS`], so every
/// `TeamIndex` in circulation addresses an existing slot.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "usize", into = "usize")]
pub struct TeamIndex(usize);

impl TeamIndex {
    /// Creates a team index, rejecting values outside `0..MAX_TEAMS`.
    pub fn new(value: usize) -> Result<Self> {
        if value < MAX_TEAMS {
            Ok(Self(value))
        } else {
            Err(GridError::TeamOutOfRange {
                index: value,
                teams: MAX_TEAMS,
            })
        }
    }

    /// Retrieves the raw slot index.
    #[must_use]
    pub const fn get(&self) -> usize {
        self.0
    }
}

impl TryFrom<usize> for TeamIndex {
    type Error = GridError;

    fn try_from(value: usize) -> Result<Self> {
        Self::new(value)
    }
}

impl From<TeamIndex> for usize {
    fn from(team: TeamIndex) -> Self {
        team.0
    }
}

/// Integer grid position, either in fine unit coordinates or in coarse
/// surface coordinates depending on context.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Pos {
    x: i32,
    y: i32,
}

impl Pos {
    /// Creates a new position.
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Horizontal component.
    #[must_use]
    pub const fn x(&self) -> i32 {
        self.x
    }

    /// Vertical component.
    #[must_use]
    pub const fn y(&self) -> i32 {
        self.y
    }

    /// Returns the position shifted by the provided deltas.
    #[must_use]
    pub const fn offset(self, dx: i32, dy: i32) -> Self {
        Self::new(self.x + dx, self.y + dy)
    }

    /// Euclidean distance between two positions.
    #[must_use]
    pub fn dist(self, other: Pos) -> f32 {
        let dx = (other.x - self.x) as f32;
        let dy = (other.y - self.y) as f32;
        (dx * dx + dy * dy).sqrt()
    }

    /// Squared Euclidean distance, exact in integer arithmetic.
    #[must_use]
    pub fn dist_squared(self, other: Pos) -> i64 {
        let dx = i64::from(other.x) - i64::from(self.x);
        let dy = i64::from(other.y) - i64::from(self.y);
        dx * dx + dy * dy
    }

    /// Reports whether a step from `self` to `other` changes both axes.
    #[must_use]
    pub const fn is_diagonal_to(self, other: Pos) -> bool {
        self.x != other.x && self.y != other.y
    }
}

impl Add for Pos {
    type Output = Pos;

    fn add(self, rhs: Pos) -> Pos {
        Pos::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Pos {
    type Output = Pos;

    fn sub(self, rhs: Pos) -> Pos {
        Pos::new(self.x - rhs.x, self.y - rhs.y)
    }
}

/// Square set of fine cells a unit covers, optionally masked.
///
/// Without a cell map every cell of the `size`×`size` block is covered. With a
/// cell map, the mask is stored row-major for a unit facing north and rotated
/// by the unit's facing when queried.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Footprint {
    size: i32,
    cell_map: Option<Vec<bool>>,
    allow_empty_cell_map: bool,
}

impl Footprint {
    /// Creates an unmasked `size`×`size` footprint.
    ///
    /// Sizes below one are raised to one, so every unit claims at least its
    /// own cell.
    #[must_use]
    pub fn square(size: i32) -> Self {
        Self {
            size: size.max(1),
            cell_map: None,
            allow_empty_cell_map: false,
        }
    }

    /// Creates a masked footprint.
    ///
    /// `size` must be at least one and `mask` must hold `size * size` entries
    /// in row-major order. Masked-out cells are tracked in the empty-footprint
    /// slots when `allow_empty_cell_map` is set.
    pub fn masked(size: i32, mask: Vec<bool>, allow_empty_cell_map: bool) -> Result<Self> {
        let expected = size
            .checked_mul(size)
            .filter(|_| size >= 1)
            .and_then(|cells| usize::try_from(cells).ok());
        if expected != Some(mask.len()) {
            return Err(GridError::InvalidFootprint {
                size,
                cells: mask.len(),
            });
        }
        Ok(Self {
            size,
            cell_map: Some(mask),
            allow_empty_cell_map,
        })
    }

    /// Edge length of the footprint in fine cells.
    #[must_use]
    pub const fn size(&self) -> i32 {
        self.size
    }

    /// Reports whether the footprint carries a mask.
    #[must_use]
    pub fn has_cell_map(&self) -> bool {
        self.cell_map.is_some()
    }

    /// Reports whether the mask has any uncovered cell.
    #[must_use]
    pub fn has_empty_cell_map(&self) -> bool {
        self.cell_map
            .as_ref()
            .map_or(false, |mask| mask.iter().any(|covered| !covered))
    }

    /// Whether uncovered cells should record the unit in their
    /// empty-footprint slot.
    #[must_use]
    pub const fn allow_empty_cell_map(&self) -> bool {
        self.allow_empty_cell_map
    }

    /// Reports whether the footprint covers offset `(x, y)` for the given facing.
    #[must_use]
    pub fn covers(&self, x: i32, y: i32, facing: CardinalDir) -> bool {
        let Some(mask) = &self.cell_map else {
            return true;
        };
        let last = self.size - 1;
        let (x, y) = match facing {
            CardinalDir::North => (x, y),
            CardinalDir::East => (last - y, x),
            CardinalDir::South => (last - x, last - y),
            CardinalDir::West => (y, last - x),
        };
        if x < 0 || y < 0 || x > last || y > last {
            return false;
        }
        usize::try_from(y * self.size + x)
            .ok()
            .and_then(|index| mask.get(index).copied())
            .unwrap_or(false)
    }
}

/// Fog-of-war mutation emitted by systems and applied by the world.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum FogCommand {
    /// Clears the current line-of-sight of a team. Exploration is kept.
    Conceal {
        /// Team whose visibility is cleared.
        team: TeamIndex,
    },
    /// Marks a surface cell as explored, and optionally as visible.
    Reveal {
        /// Team gaining sight of the cell.
        team: TeamIndex,
        /// Surface coordinate of the cell.
        surface: Pos,
        /// Whether the cell is in direct line-of-sight.
        visible: bool,
    },
}

/// Kind of harvestable resource attached to a terrain object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceKind(u16);

impl ResourceKind {
    /// Creates a resource kind from its tech-tree index.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the tech-tree index.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}
