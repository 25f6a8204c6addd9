#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure visibility system that turns unit sight into fog-of-war commands.

use serde::{Deserialize, Serialize};
use skirmish_core::{
    to_surface_coords, FogCommand, Occupant, Pos, PositionAccess, TeamIndex, CELL_SCALE,
};
use skirmish_world::{CircularArea, Grid, Resolution, UnitArena};

/// Tunables of the visibility pass.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Surface cells past the sight radius that become explored without
    /// becoming visible.
    pub indirect_sight_range: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            indirect_sight_range: 1,
        }
    }
}

/// One unit's contribution to its team's line of sight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Sighting {
    /// Team receiving the sight.
    pub team: TeamIndex,
    /// Fine position of the observer.
    pub pos: Pos,
    /// Sight radius in fine cells.
    pub sight: i32,
}

impl Sighting {
    /// Creates a new sighting descriptor.
    #[must_use]
    pub const fn new(team: TeamIndex, pos: Pos, sight: i32) -> Self {
        Self { team, pos, sight }
    }

    fn surface_radius(&self) -> i32 {
        (self.sight.max(0) + CELL_SCALE - 1) / CELL_SCALE
    }
}

/// Collects one sighting per living unit, in identifier order.
///
/// Decaying units no longer see anything.
#[must_use]
pub fn sightings(units: &UnitArena) -> Vec<Sighting> {
    units
        .iter()
        .filter(|unit| !unit.is_decaying())
        .map(|unit| {
            Sighting::new(
                unit.team(),
                unit.position(PositionAccess::Primary),
                unit.kind().sight,
            )
        })
        .collect()
}

/// Visibility system that recomputes every team's line of sight each pass.
#[derive(Clone, Debug, Default)]
pub struct Visibility {
    config: Config,
}

impl Visibility {
    /// Creates a visibility system with the provided tunables.
    #[must_use]
    pub const fn new(config: Config) -> Self {
        Self { config }
    }

    /// Emits the fog commands for one pass.
    ///
    /// Every team in `teams` is concealed first. Each sighting then reveals
    /// the surface cells within its sight radius and explores the ring of
    /// `indirect_sight_range` cells around it. Sightings of teams missing
    /// from `teams` are still revealed.
    pub fn handle(
        &self,
        grid: &Grid,
        teams: &[TeamIndex],
        sightings: &[Sighting],
        out: &mut Vec<FogCommand>,
    ) {
        let start = out.len();
        out.extend(teams.iter().map(|&team| FogCommand::Conceal { team }));

        let indirect = self.config.indirect_sight_range.max(0);
        for sighting in sightings {
            let center = to_surface_coords(sighting.pos);
            let radius = sighting.surface_radius();
            let limit = i64::from(radius) * i64::from(radius);
            let area = CircularArea::new(grid, center, radius + indirect, Resolution::Surface);
            out.extend(area.map(|surface| FogCommand::Reveal {
                team: sighting.team,
                surface,
                visible: center.dist_squared(surface) <= limit,
            }));
        }

        tracing::trace!(
            sightings = sightings.len(),
            commands = out.len() - start,
            "visibility pass"
        );
    }
}
