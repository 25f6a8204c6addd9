//! Occupancy-independent grid state for save games.

use serde::{Deserialize, Serialize};
use skirmish_core::{GridError, Pos, Result};

use crate::{cell::Cell, grid::Grid, surface_cell::SurfaceCell};

/// Serialisable copy of everything the grid knows apart from occupancy.
///
/// Occupancy is rebuilt by placing the restored units again.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridSnapshot {
    /// Map title.
    pub title: String,
    /// Width in surface cells.
    pub surface_width: i32,
    /// Height in surface cells.
    pub surface_height: i32,
    /// Scaled water level.
    pub water_level: f32,
    /// Height factor of the loaded terrain.
    pub height_factor: f32,
    /// Scaled cliff level.
    pub cliff_level: f32,
    /// Default camera height.
    pub camera_height: i32,
    /// Highest surface height.
    pub max_map_height: f32,
    /// Number of player slots.
    pub max_players: usize,
    /// Start locations in fine coordinates.
    pub start_locations: Vec<Pos>,
    /// Checksum of the originally loaded terrain.
    pub checksum: u32,
    /// Height of every fine cell, row-major.
    pub cell_heights: Vec<f32>,
    /// Every surface cell, row-major.
    pub surface_cells: Vec<SurfaceCell>,
}

impl Grid {
    /// Captures the current terrain, object and fog state.
    #[must_use]
    pub fn save_snapshot(&self) -> GridSnapshot {
        GridSnapshot {
            title: self.title.clone(),
            surface_width: self.surface_width,
            surface_height: self.surface_height,
            water_level: self.water_level(),
            height_factor: self.height_factor(),
            cliff_level: self.cliff_level(),
            camera_height: self.camera_height,
            max_map_height: self.max_map_height(),
            max_players: self.max_players,
            start_locations: self.start_locations.clone(),
            checksum: self.checksum,
            cell_heights: self.cells.iter().map(Cell::height).collect(),
            surface_cells: self.surface_cells.clone(),
        }
    }

    /// Replaces terrain, object and fog state with `snapshot`.
    ///
    /// The grid must already have the snapshot's dimensions. Every occupancy
    /// slot is cleared.
    pub fn restore_snapshot(&mut self, snapshot: &GridSnapshot) -> Result<()> {
        if snapshot.surface_width != self.surface_width
            || snapshot.surface_height != self.surface_height
        {
            return Err(GridError::SnapshotMismatch {
                reason: format!(
                    "snapshot covers {}x{} surface cells, grid has {}x{}",
                    snapshot.surface_width,
                    snapshot.surface_height,
                    self.surface_width,
                    self.surface_height
                ),
            });
        }
        if snapshot.cell_heights.len() != self.cells.len()
            || snapshot.surface_cells.len() != self.surface_cells.len()
        {
            return Err(GridError::SnapshotMismatch {
                reason: format!(
                    "snapshot holds {} cells and {} surface cells, grid has {} and {}",
                    snapshot.cell_heights.len(),
                    snapshot.surface_cells.len(),
                    self.cells.len(),
                    self.surface_cells.len()
                ),
            });
        }

        self.title = snapshot.title.clone();
        self.water_level = snapshot.water_level;
        self.height_factor = snapshot.height_factor;
        self.cliff_level = snapshot.cliff_level;
        self.camera_height = snapshot.camera_height;
        self.max_map_height = snapshot.max_map_height;
        self.max_players = snapshot.max_players;
        self.start_locations = snapshot.start_locations.clone();
        self.checksum = snapshot.checksum;
        for (cell, &height) in self.cells.iter_mut().zip(&snapshot.cell_heights) {
            *cell = Cell::default();
            cell.set_height(height);
        }
        self.surface_cells.clone_from(&snapshot.surface_cells);

        tracing::info!(
            title = %self.title,
            changed = self
                .surface_cells
                .iter()
                .filter(|cell| cell.changed_from_original_load())
                .count(),
            "grid snapshot restored"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        test_terrain::{dry_grid, lake_grid, team},
        UnitArena, UnitKind,
    };
    use skirmish_core::{CardinalDir, Field};

    #[test]
    fn restore_into_other_dimensions_fails() {
        let snapshot = dry_grid(3, 3).save_snapshot();
        let mut grid = dry_grid(4, 3);

        assert!(matches!(
            grid.restore_snapshot(&snapshot),
            Err(GridError::SnapshotMismatch { .. })
        ));
    }

    #[test]
    fn restore_clears_occupancy_and_keeps_fog() {
        let mut grid = lake_grid();
        grid.init();
        let mut units = UnitArena::new();
        let id = units.spawn(UnitKind::soldier(), team(0), Pos::new(1, 1), CardinalDir::North);
        grid.reveal_surface_area(team(0), Pos::new(0, 0), 1);
        let snapshot = grid.save_snapshot();

        let unit = units.get(id).expect("soldier");
        let _ = grid.put_unit_cells(unit, Pos::new(1, 1), false, false).expect("placed");
        grid.restore_snapshot(&snapshot).expect("restore");

        assert_eq!(grid.cell(Pos::new(1, 1)).expect("cell").occupant(Field::Land), None);
        assert!(grid.surface_cell(Pos::new(1, 0)).expect("surface").is_visible(team(0)));
        assert_eq!(grid.save_snapshot(), snapshot);
    }
}
