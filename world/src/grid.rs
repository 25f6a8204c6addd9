//! Grid storage, bounds handling and fog-of-war state.

use skirmish_core::{
    to_surface_coords, truncate_decimal, FogCommand, GridError, Pos, Result, TeamIndex,
    MAX_PLAYERS,
};

use crate::{
    area::{CircularArea, Resolution},
    cell::Cell,
    config::GridConfig,
    diagnostics::{NoopDiagnostics, SyncDiagnostics, TracingDiagnostics},
    surface_cell::SurfaceCell,
};

/// Authoritative dual-resolution spatial grid.
///
/// Fine cells are stored row-major as `y * width + x`; surface cells as
/// `sy * surface_width + sx`. Dimensions are fixed by [`Grid::load`].
#[derive(Debug)]
pub struct Grid {
    pub(crate) config: GridConfig,
    pub(crate) title: String,
    pub(crate) water_level: f32,
    pub(crate) height_factor: f32,
    pub(crate) cliff_level: f32,
    pub(crate) camera_height: i32,
    pub(crate) max_map_height: f32,
    pub(crate) width: i32,
    pub(crate) height: i32,
    pub(crate) surface_width: i32,
    pub(crate) surface_height: i32,
    pub(crate) max_players: usize,
    pub(crate) start_locations: Vec<Pos>,
    pub(crate) checksum: u32,
    pub(crate) cells: Vec<Cell>,
    pub(crate) surface_cells: Vec<SurfaceCell>,
    pub(crate) diagnostics: Box<dyn SyncDiagnostics>,
}

impl Grid {
    /// Creates an empty grid. Storage accessors fail until a terrain is
    /// loaded.
    #[must_use]
    pub fn new(config: GridConfig) -> Self {
        let diagnostics: Box<dyn SyncDiagnostics> = if config.synch_diagnostics {
            Box::new(TracingDiagnostics::new())
        } else {
            Box::new(NoopDiagnostics)
        };

        Self {
            config,
            title: String::new(),
            water_level: 0.0,
            height_factor: 1.0,
            cliff_level: 0.0,
            camera_height: 0,
            max_map_height: 0.0,
            width: 0,
            height: 0,
            surface_width: 0,
            surface_height: 0,
            max_players: 0,
            start_locations: Vec::new(),
            checksum: 0,
            cells: Vec::new(),
            surface_cells: Vec::new(),
            diagnostics,
        }
    }

    /// Replaces the synchronisation diagnostics sink.
    pub fn set_diagnostics(&mut self, diagnostics: Box<dyn SyncDiagnostics>) {
        self.diagnostics = diagnostics;
    }

    /// Configuration the grid was created with.
    #[must_use]
    pub fn config(&self) -> &GridConfig {
        &self.config
    }

    /// Map title.
    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    /// Width in fine cells.
    #[must_use]
    pub fn width(&self) -> i32 {
        self.width
    }

    /// Height in fine cells.
    #[must_use]
    pub fn height(&self) -> i32 {
        self.height
    }

    /// Width in surface cells.
    #[must_use]
    pub fn surface_width(&self) -> i32 {
        self.surface_width
    }

    /// Height in surface cells.
    #[must_use]
    pub fn surface_height(&self) -> i32 {
        self.surface_height
    }

    /// Number of player slots the map offers.
    #[must_use]
    pub fn max_players(&self) -> usize {
        self.max_players
    }

    /// Height scaling applied to raw terrain altitudes.
    #[must_use]
    pub fn height_factor(&self) -> f32 {
        truncate_decimal(self.height_factor)
    }

    /// Water level in scaled height units.
    #[must_use]
    pub fn water_level(&self) -> f32 {
        truncate_decimal(self.water_level)
    }

    /// Height difference above which neighbouring cells count as a cliff.
    #[must_use]
    pub fn cliff_level(&self) -> f32 {
        truncate_decimal(self.cliff_level)
    }

    /// Default camera height of the map.
    #[must_use]
    pub fn camera_height(&self) -> i32 {
        self.camera_height
    }

    /// Highest surface height after the terrain passes ran.
    #[must_use]
    pub fn max_map_height(&self) -> f32 {
        truncate_decimal(self.max_map_height)
    }

    /// Fingerprint of the loaded terrain for cross-replica verification.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Start location of player slot `index` in fine coordinates.
    pub fn start_location(&self, index: usize) -> Result<Pos> {
        self.start_locations
            .get(index)
            .copied()
            .ok_or(GridError::StartLocationOutOfRange {
                index,
                max_players: self.max_players.min(MAX_PLAYERS),
            })
    }

    /// Whether `pos` addresses a fine cell.
    #[must_use]
    pub fn is_inside(&self, pos: Pos) -> bool {
        pos.x() >= 0 && pos.y() >= 0 && pos.x() < self.width && pos.y() < self.height
    }

    /// Whether `spos` addresses a surface cell.
    #[must_use]
    pub fn is_inside_surface(&self, spos: Pos) -> bool {
        spos.x() >= 0
            && spos.y() >= 0
            && spos.x() < self.surface_width
            && spos.y() < self.surface_height
    }

    /// Whether `pos` addresses a fine cell whose covering surface cell also
    /// exists.
    #[must_use]
    pub(crate) fn is_inside_both(&self, pos: Pos) -> bool {
        self.is_inside(pos) && self.is_inside_surface(to_surface_coords(pos))
    }

    fn cell_index(&self, pos: Pos) -> Option<usize> {
        if !self.is_inside(pos) {
            return None;
        }
        usize::try_from(pos.y() * self.width + pos.x()).ok()
    }

    fn surface_index(&self, spos: Pos) -> Option<usize> {
        if !self.is_inside_surface(spos) {
            return None;
        }
        usize::try_from(spos.y() * self.surface_width + spos.x()).ok()
    }

    fn cell_out_of_range(&self, pos: Pos) -> GridError {
        GridError::CellOutOfRange {
            pos,
            width: self.width,
            height: self.height,
        }
    }

    fn surface_out_of_range(&self, spos: Pos) -> GridError {
        GridError::SurfaceCellOutOfRange {
            pos: spos,
            width: self.surface_width,
            height: self.surface_height,
        }
    }

    /// Fine cell at `pos`.
    pub fn cell(&self, pos: Pos) -> Result<&Cell> {
        if self.cells.is_empty() {
            return Err(GridError::StorageMissing);
        }
        self.cell_index(pos)
            .and_then(|index| self.cells.get(index))
            .ok_or_else(|| self.cell_out_of_range(pos))
    }

    /// Mutable fine cell at `pos`.
    pub fn cell_mut(&mut self, pos: Pos) -> Result<&mut Cell> {
        if self.cells.is_empty() {
            return Err(GridError::StorageMissing);
        }
        let error = self.cell_out_of_range(pos);
        match self.cell_index(pos) {
            Some(index) => self.cells.get_mut(index).ok_or(error),
            None => Err(error),
        }
    }

    /// Non-failing lookup for call sites that test positions which may lie
    /// outside the grid.
    #[must_use]
    pub fn try_cell(&self, pos: Pos) -> Option<&Cell> {
        self.cell_index(pos).and_then(|index| self.cells.get(index))
    }

    /// Surface cell at surface coordinate `spos`.
    pub fn surface_cell(&self, spos: Pos) -> Result<&SurfaceCell> {
        if self.surface_cells.is_empty() {
            return Err(GridError::StorageMissing);
        }
        self.surface_index(spos)
            .and_then(|index| self.surface_cells.get(index))
            .ok_or_else(|| self.surface_out_of_range(spos))
    }

    /// Mutable surface cell at surface coordinate `spos`.
    pub fn surface_cell_mut(&mut self, spos: Pos) -> Result<&mut SurfaceCell> {
        if self.surface_cells.is_empty() {
            return Err(GridError::StorageMissing);
        }
        let error = self.surface_out_of_range(spos);
        match self.surface_index(spos) {
            Some(index) => self.surface_cells.get_mut(index).ok_or(error),
            None => Err(error),
        }
    }

    /// Non-failing surface lookup.
    #[must_use]
    pub fn try_surface_cell(&self, spos: Pos) -> Option<&SurfaceCell> {
        self.surface_index(spos)
            .and_then(|index| self.surface_cells.get(index))
    }

    pub(crate) fn try_surface_cell_mut(&mut self, spos: Pos) -> Option<&mut SurfaceCell> {
        self.surface_index(spos)
            .and_then(|index| self.surface_cells.get_mut(index))
    }

    /// Surface cell covering fine position `pos`.
    pub(crate) fn try_covering_surface_cell(&self, pos: Pos) -> Option<&SurfaceCell> {
        self.try_surface_cell(to_surface_coords(pos))
    }

    fn deep_submerged_height(&self) -> f32 {
        self.water_level - self.config.deep_submerged_margin / self.height_factor
    }

    /// Whether the fine cell lies below the water level.
    #[must_use]
    pub fn is_submerged_cell(&self, cell: &Cell) -> bool {
        cell.height() < self.water_level
    }

    /// Whether the fine cell lies too deep for land units.
    #[must_use]
    pub fn is_deep_submerged_cell(&self, cell: &Cell) -> bool {
        cell.height() < self.deep_submerged_height()
    }

    /// Whether the surface cell lies below the water level.
    #[must_use]
    pub fn is_submerged_surface(&self, cell: &SurfaceCell) -> bool {
        cell.height() < self.water_level
    }

    /// Whether the surface cell lies too deep for land units.
    #[must_use]
    pub fn is_deep_submerged_surface(&self, cell: &SurfaceCell) -> bool {
        cell.height() < self.deep_submerged_height()
    }

    /// Clears the current line of sight of `team` on every surface cell.
    /// Exploration is kept.
    pub fn reset_visibility(&mut self, team: TeamIndex) {
        for cell in &mut self.surface_cells {
            cell.set_visible(team, false);
        }
    }

    /// Marks every surface cell within `radius` of `surface_center` as
    /// visible to and explored by `team`.
    pub fn reveal_surface_area(&mut self, team: TeamIndex, surface_center: Pos, radius: i32) {
        let area: Vec<Pos> =
            CircularArea::new(self, surface_center, radius, Resolution::Surface).collect();
        for spos in area {
            if let Some(cell) = self.try_surface_cell_mut(spos) {
                cell.set_visible(team, true);
                cell.set_explored(team);
            }
        }
    }

    /// Applies a batch of fog-of-war commands in order.
    ///
    /// Reveals outside the surface grid fail the batch; commands before the
    /// failing one stay applied.
    pub fn apply_fog(&mut self, commands: &[FogCommand]) -> Result<()> {
        for command in commands {
            match *command {
                FogCommand::Conceal { team } => self.reset_visibility(team),
                FogCommand::Reveal {
                    team,
                    surface,
                    visible,
                } => {
                    let cell = self.surface_cell_mut(surface)?;
                    if visible {
                        cell.set_visible(team, true);
                    }
                    cell.set_explored(team);
                }
            }
        }
        Ok(())
    }
}

impl Default for Grid {
    fn default() -> Self {
        Self::new(GridConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terrain::TerrainSource;

    fn team(index: usize) -> TeamIndex {
        TeamIndex::new(index).expect("team")
    }

    fn loaded(surface_width: i32, surface_height: i32) -> Grid {
        let source = TerrainSource::flat("test", surface_width, surface_height, 10.0);
        Grid::load(&source, GridConfig::default()).expect("terrain loads")
    }

    #[test]
    fn empty_grid_reports_missing_storage() {
        let grid = Grid::default();

        assert_eq!(grid.cell(Pos::new(0, 0)).err(), Some(GridError::StorageMissing));
        assert_eq!(
            grid.surface_cell(Pos::new(0, 0)).err(),
            Some(GridError::StorageMissing)
        );
        assert!(grid.try_cell(Pos::new(0, 0)).is_none());
    }

    #[test]
    fn out_of_range_access_fails_loudly() {
        let grid = loaded(4, 3);

        assert_eq!(grid.width(), 8);
        assert_eq!(grid.height(), 6);
        assert_eq!(
            grid.cell(Pos::new(8, 0)).err(),
            Some(GridError::CellOutOfRange {
                pos: Pos::new(8, 0),
                width: 8,
                height: 6,
            })
        );
        assert_eq!(
            grid.surface_cell(Pos::new(-1, 0)).err(),
            Some(GridError::SurfaceCellOutOfRange {
                pos: Pos::new(-1, 0),
                width: 4,
                height: 3,
            })
        );
        assert!(grid.try_cell(Pos::new(8, 0)).is_none());
        assert!(grid.try_cell(Pos::new(7, 5)).is_some());
    }

    #[test]
    fn reveal_marks_visible_and_explored_then_reset_keeps_exploration() {
        let mut grid = loaded(6, 6);
        let scout = team(1);

        grid.reveal_surface_area(scout, Pos::new(2, 2), 1);
        let center = grid.surface_cell(Pos::new(2, 2)).expect("center");
        assert!(center.is_visible(scout));
        assert!(center.is_explored(scout));
        let corner = grid.surface_cell(Pos::new(3, 3)).expect("corner");
        assert!(!corner.is_explored(scout), "diagonal neighbour lies outside radius 1");

        grid.reset_visibility(scout);
        let center = grid.surface_cell(Pos::new(2, 2)).expect("center");
        assert!(!center.is_visible(scout));
        assert!(center.is_explored(scout));
    }

    #[test]
    fn apply_fog_rejects_reveal_outside_surface() {
        let mut grid = loaded(2, 2);
        let commands = [
            FogCommand::Reveal {
                team: team(0),
                surface: Pos::new(1, 1),
                visible: false,
            },
            FogCommand::Reveal {
                team: team(0),
                surface: Pos::new(2, 0),
                visible: true,
            },
        ];

        assert!(matches!(
            grid.apply_fog(&commands),
            Err(GridError::SurfaceCellOutOfRange { .. })
        ));
        let cell = grid.surface_cell(Pos::new(1, 1)).expect("cell");
        assert!(cell.is_explored(team(0)));
        assert!(!cell.is_visible(team(0)));
    }

    #[test]
    fn start_location_rejects_missing_slot() {
        let grid = loaded(2, 2);

        assert_eq!(
            grid.start_location(0),
            Err(GridError::StartLocationOutOfRange {
                index: 0,
                max_players: 0,
            })
        );
    }
}
