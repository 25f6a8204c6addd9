//! Terrain fixtures shared by unit tests.

use skirmish_core::{Pos, TeamIndex};

use crate::{GridConfig, Grid, TerrainSource};

/// Raw altitude of dry land; scaled height 5.
pub(crate) const DRY: f32 = 10.0;

/// Raw altitude of lake beds; scaled height 1, below the deep line at 1.25.
pub(crate) const LAKE_BED: f32 = 2.0;

pub(crate) fn team(index: usize) -> TeamIndex {
    TeamIndex::new(index).expect("team")
}

pub(crate) fn source(surface_width: i32, surface_height: i32) -> TerrainSource {
    let mut source = TerrainSource::flat("fixture", surface_width, surface_height, DRY);
    source.height_factor = 2.0;
    source.water_level = 4.01;
    source
}

pub(crate) fn set_altitude(source: &mut TerrainSource, spos: Pos, altitude: f32) {
    let index = (spos.y() * source.surface_width + spos.x()) as usize;
    source.altitudes[index] = altitude;
}

pub(crate) fn set_object(source: &mut TerrainSource, spos: Pos, object: u16) {
    let index = (spos.y() * source.surface_width + spos.x()) as usize;
    source.objects[index] = object;
}

/// Dry grid without objects.
pub(crate) fn dry_grid(surface_width: i32, surface_height: i32) -> Grid {
    Grid::load(&source(surface_width, surface_height), GridConfig::default()).expect("fixture")
}

/// 8x8 surface grid with a 3x3 lake on surface cells `(2..5, 2..5)`.
/// Fine cells `(6..8, 6..8)` are deep submerged.
pub(crate) fn lake_grid() -> Grid {
    let mut source = source(8, 8);
    for sy in 2..5 {
        for sx in 2..5 {
            set_altitude(&mut source, Pos::new(sx, sy), LAKE_BED);
        }
    }
    Grid::load(&source, GridConfig::default()).expect("fixture")
}
