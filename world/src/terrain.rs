//! Terrain loading and the batch passes that derive geometry from heights.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use skirmish_core::{
    to_unit_coords, GridError, Pos, ResourceKind, Result, CELL_SCALE, MAP_SCALE, MAX_PLAYERS,
};
use xxhash_rust::xxh32::Xxh32;

use crate::{
    cell::Cell,
    config::GridConfig,
    grid::Grid,
    surface_cell::{ObjectKind, Resource, SurfaceCell, TerrainObject},
};

/// Number of tileset object classes. Object ids above this encode resources.
pub const OBJECT_KINDS: u16 = 10;

/// Surface type assigned to cells that smoothing identified as cliffs.
pub const CLIFF_SURFACE_TYPE: i32 = 5;

/// Offset subtracted from raw water and cliff levels before scaling.
const LEVEL_BIAS: f32 = 0.01;

/// Terrain description consumed by [`Grid::load`].
///
/// Per-cell arrays are row-major over the surface grid.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TerrainSource {
    /// Map title.
    pub title: String,
    /// Width in surface cells.
    pub surface_width: i32,
    /// Height in surface cells.
    pub surface_height: i32,
    /// Divisor applied to raw altitudes and levels.
    pub height_factor: f32,
    /// Raw water level.
    pub water_level: f32,
    /// Raw cliff level. Zero or below disables cliff detection.
    #[serde(default)]
    pub cliff_level: f32,
    /// Default camera height.
    #[serde(default)]
    pub camera_height: i32,
    /// Number of player slots.
    pub max_players: usize,
    /// Player start locations in surface coordinates.
    pub start_locations: Vec<Pos>,
    /// Raw altitude of every surface cell.
    pub altitudes: Vec<f32>,
    /// One-based tileset surface index of every surface cell.
    pub surface_types: Vec<i32>,
    /// Object id of every surface cell: zero for none, up to
    /// [`OBJECT_KINDS`] for tileset objects, resources above.
    pub objects: Vec<u16>,
    /// Tileset object ids land units can walk through.
    #[serde(default)]
    pub walkable_objects: Vec<u16>,
}

impl TerrainSource {
    /// Flat terrain without objects or players, every cell at raw altitude
    /// `altitude`, water level at zero and a unit height factor.
    #[must_use]
    pub fn flat(title: &str, surface_width: i32, surface_height: i32, altitude: f32) -> Self {
        let cells = usize::try_from(surface_width.max(0) * surface_height.max(0)).unwrap_or(0);
        Self {
            title: title.to_owned(),
            surface_width,
            surface_height,
            height_factor: 1.0,
            water_level: 0.0,
            cliff_level: 0.0,
            camera_height: 0,
            max_players: 0,
            start_locations: Vec::new(),
            altitudes: vec![altitude; cells],
            surface_types: vec![1; cells],
            objects: vec![0; cells],
            walkable_objects: Vec::new(),
        }
    }

    fn validate(&self) -> Result<usize> {
        let invalid = |reason: String| Err(GridError::InvalidTerrain { reason });

        if self.surface_width <= 0 || self.surface_height <= 0 {
            return invalid(format!(
                "surface dimensions must be positive, got {}x{}",
                self.surface_width, self.surface_height
            ));
        }
        if !(self.height_factor > 0.0) {
            return invalid(format!(
                "height factor must be positive, got {}",
                self.height_factor
            ));
        }
        let cells = usize::try_from(self.surface_width)
            .ok()
            .zip(usize::try_from(self.surface_height).ok())
            .and_then(|(w, h)| w.checked_mul(h));
        let Some(cells) = cells else {
            return invalid(String::from("surface dimensions overflow"));
        };
        for (name, len) in [
            ("altitudes", self.altitudes.len()),
            ("surface_types", self.surface_types.len()),
            ("objects", self.objects.len()),
        ] {
            if len != cells {
                return invalid(format!("{name} holds {len} entries, expected {cells}"));
            }
        }
        if self.max_players > MAX_PLAYERS {
            return invalid(format!(
                "map offers {} players, at most {MAX_PLAYERS} are supported",
                self.max_players
            ));
        }
        if self.start_locations.len() != self.max_players {
            return invalid(format!(
                "{} start locations for {} players",
                self.start_locations.len(),
                self.max_players
            ));
        }
        Ok(cells)
    }

    /// Fingerprint over the canonical little-endian encoding of the source.
    #[must_use]
    pub fn checksum(&self) -> u32 {
        let mut hasher = Xxh32::new(0);
        hasher.update(&(self.title.len() as u64).to_le_bytes());
        hasher.update(self.title.as_bytes());
        hasher.update(&self.surface_width.to_le_bytes());
        hasher.update(&self.surface_height.to_le_bytes());
        hasher.update(&self.height_factor.to_le_bytes());
        hasher.update(&self.water_level.to_le_bytes());
        hasher.update(&self.cliff_level.to_le_bytes());
        hasher.update(&self.camera_height.to_le_bytes());
        hasher.update(&(self.max_players as u64).to_le_bytes());
        for location in &self.start_locations {
            hasher.update(&location.x().to_le_bytes());
            hasher.update(&location.y().to_le_bytes());
        }
        for altitude in &self.altitudes {
            hasher.update(&altitude.to_le_bytes());
        }
        for surface_type in &self.surface_types {
            hasher.update(&surface_type.to_le_bytes());
        }
        for object in &self.objects {
            hasher.update(&object.to_le_bytes());
        }
        for object in &self.walkable_objects {
            hasher.update(&object.to_le_bytes());
        }
        hasher.digest()
    }

    fn object_at(&self, index: usize, resource_amount: i32) -> Option<TerrainObject> {
        let id = self.objects.get(index).copied().unwrap_or(0);
        match id {
            0 => None,
            id if id <= OBJECT_KINDS => Some(TerrainObject {
                kind: ObjectKind::new(id),
                walkable: self.walkable_objects.contains(&id),
                resource: None,
            }),
            id => Some(TerrainObject {
                kind: ObjectKind::new(id),
                walkable: false,
                resource: Some(Resource {
                    kind: ResourceKind::new(id - OBJECT_KINDS),
                    amount: resource_amount,
                }),
            }),
        }
    }
}

fn next_power_of_two(value: i32) -> f32 {
    u32::try_from(value.max(1))
        .map(u32::next_power_of_two)
        .unwrap_or(1) as f32
}

impl Grid {
    /// Builds a grid from a terrain description.
    ///
    /// Fixes the dimensions, allocates both cell arrays, places objects and
    /// resources and interpolates fine cell heights. Run [`Grid::init`]
    /// afterwards to smooth the surface and derive the remaining geometry.
    pub fn load(source: &TerrainSource, config: GridConfig) -> Result<Self> {
        let surface_cells = source.validate()?;
        let mut grid = Grid::new(config);

        grid.title = source.title.clone();
        grid.height_factor = source.height_factor;
        grid.water_level = (source.water_level - LEVEL_BIAS) / source.height_factor;
        grid.cliff_level = if source.cliff_level > 0.0 {
            (source.cliff_level - LEVEL_BIAS) / source.height_factor
        } else {
            0.0
        };
        grid.camera_height = source.camera_height;
        grid.surface_width = source.surface_width;
        grid.surface_height = source.surface_height;
        grid.width = source.surface_width * CELL_SCALE;
        grid.height = source.surface_height * CELL_SCALE;
        grid.max_players = source.max_players;
        grid.start_locations = source
            .start_locations
            .iter()
            .map(|&location| to_unit_coords(location))
            .collect();

        let cells = surface_cells * (CELL_SCALE * CELL_SCALE) as usize;
        grid.cells = vec![Cell::default(); cells];
        grid.surface_cells = Vec::with_capacity(surface_cells);

        let amount = grid.config.default_resource_amount;
        for index in 0..surface_cells {
            let sx = (index % source.surface_width as usize) as i32;
            let sy = (index / source.surface_width as usize) as i32;
            let altitude = source.altitudes.get(index).copied().unwrap_or(0.0);

            let mut cell = SurfaceCell::default();
            cell.set_vertex(Vec3::new(
                (sx * MAP_SCALE) as f32,
                altitude / source.height_factor,
                (sy * MAP_SCALE) as f32,
            ));
            cell.set_surf_tex_coord(Vec2::new(
                sx as f32 / source.surface_width as f32,
                sy as f32 / source.surface_height as f32,
            ));
            cell.set_surface_type(source.surface_types.get(index).copied().unwrap_or(1) - 1);
            cell.set_object(source.object_at(index, amount));
            grid.surface_cells.push(cell);
        }

        grid.checksum = source.checksum();
        grid.compute_interpolated_heights();

        tracing::info!(
            title = %grid.title,
            surface_width = grid.surface_width,
            surface_height = grid.surface_height,
            checksum = grid.checksum,
            "terrain loaded"
        );
        Ok(grid)
    }

    /// Runs every terrain pass in order.
    pub fn init(&mut self) {
        self.smooth_surface();
        self.compute_normals();
        self.compute_interpolated_heights();
        self.compute_near_submerged();
        self.compute_cell_colors();
        self.compute_fow_tex_coords();
        self.max_map_height = self
            .surface_cells
            .iter()
            .map(SurfaceCell::height)
            .fold(0.0, f32::max);

        tracing::debug!(
            max_map_height = self.max_map_height,
            "terrain passes finished"
        );
    }

    fn surface_heights(&self) -> Vec<f32> {
        self.surface_cells.iter().map(SurfaceCell::height).collect()
    }

    fn surface_slot(&self, sx: i32, sy: i32) -> usize {
        (sy * self.surface_width + sx) as usize
    }

    /// Averages interior surface heights with their neighbours.
    ///
    /// Neighbours further away than the cliff level are left out of the
    /// average and turn the cell into a cliff.
    pub fn smooth_surface(&mut self) {
        let heights = self.surface_heights();
        let cliff_level = self.cliff_level;

        for sy in 1..self.surface_height - 1 {
            for sx in 1..self.surface_width - 1 {
                let own = heights[self.surface_slot(sx, sy)];
                let mut sum = 0.0;
                let mut used = 0;
                let mut cliff = false;

                for dy in -1..=1 {
                    for dx in -1..=1 {
                        let neighbour = heights[self.surface_slot(sx + dx, sy + dy)];
                        if cliff_level <= 0.1 || cliff_level > (own - neighbour).abs() {
                            sum += neighbour;
                            used += 1;
                        } else {
                            cliff = true;
                        }
                    }
                }

                let slot = self.surface_slot(sx, sy);
                let cell = &mut self.surface_cells[slot];
                if cliff {
                    cell.set_surface_type(CLIFF_SURFACE_TYPE);
                }
                if used > 0 {
                    cell.set_height(sum / used as f32, false);
                }
            }
        }
    }

    /// Recomputes interior surface normals from the four neighbours.
    pub fn compute_normals(&mut self) {
        for sy in 1..self.surface_height - 1 {
            for sx in 1..self.surface_width - 1 {
                let vertex = |x: i32, y: i32| self.surface_cells[self.surface_slot(x, y)].vertex();
                let center = vertex(sx, sy);
                let ring = [
                    vertex(sx, sy - 1),
                    vertex(sx + 1, sy),
                    vertex(sx, sy + 1),
                    vertex(sx - 1, sy),
                ];

                let mut normal = Vec3::ZERO;
                for (i, &first) in ring.iter().enumerate() {
                    let second = ring[(i + 1) % ring.len()];
                    normal += (second - center)
                        .cross(first - center)
                        .normalize_or_zero();
                }
                let normal = normal.try_normalize().unwrap_or(Vec3::Y);

                let slot = self.surface_slot(sx, sy);
                self.surface_cells[slot].set_normal(normal);
            }
        }
    }

    /// Derives fine cell heights by bilinear interpolation between surface
    /// vertices. Border blocks copy their surface height.
    pub fn compute_interpolated_heights(&mut self) {
        let heights = self.surface_heights();
        if heights.is_empty() {
            return;
        }

        for y in 0..self.height {
            for x in 0..self.width {
                let surface = self.surface_slot(x / CELL_SCALE, y / CELL_SCALE);
                let cell = (y * self.width + x) as usize;
                self.cells[cell].set_height(heights[surface]);
            }
        }

        let scale = CELL_SCALE as f32;
        let surface_width = self.surface_width;
        let h = |x: i32, y: i32| heights[(y * surface_width + x) as usize];
        for sy in 1..self.surface_height - 1 {
            for sx in 1..self.surface_width - 1 {
                for l in 0..CELL_SCALE {
                    for k in 0..CELL_SCALE {
                        let fx = k as f32 / scale;
                        let fy = l as f32 / scale;
                        let height = match (k, l) {
                            (0, 0) => h(sx, sy),
                            (_, 0) => h(sx, sy) * (1.0 - fx) + h(sx + 1, sy) * fx,
                            (0, _) => h(sx, sy) * (1.0 - fy) + h(sx, sy + 1) * fy,
                            _ => {
                                let top = h(sx, sy) * (1.0 - fx) + h(sx + 1, sy) * fx;
                                let bottom = h(sx, sy + 1) * (1.0 - fx) + h(sx + 1, sy + 1) * fx;
                                top * (1.0 - fy) + bottom * fy
                            }
                        };
                        let x = sx * CELL_SCALE + k;
                        let y = sy * CELL_SCALE + l;
                        let cell = (y * self.width + x) as usize;
                        self.cells[cell].set_height(height);
                    }
                }
            }
        }
    }

    /// Flags surface cells with a submerged cell in their neighbourhood.
    pub fn compute_near_submerged(&mut self) {
        let submerged: Vec<bool> = self
            .surface_cells
            .iter()
            .map(|cell| self.is_submerged_surface(cell))
            .collect();

        for sy in 0..self.surface_height {
            for sx in 0..self.surface_width {
                let mut near = false;
                for dy in -1..=2 {
                    for dx in -1..=2 {
                        let x = sx + dx;
                        let y = sy + dy;
                        let inside = self.is_inside_surface(Pos::new(x, y));
                        if inside && submerged[self.surface_slot(x, y)] {
                            near = true;
                        }
                    }
                }
                let slot = self.surface_slot(sx, sy);
                self.surface_cells[slot].set_near_submerged(near);
            }
        }
    }

    /// Darkens deep submerged surface cells.
    pub fn compute_cell_colors(&mut self) {
        for slot in 0..self.surface_cells.len() {
            let cell = &self.surface_cells[slot];
            let color = if self.is_deep_submerged_surface(cell) {
                let factor = (self.water_level - cell.height() * 1.5).clamp(1.0, 1.5);
                Vec3::ONE / factor
            } else {
                Vec3::ONE
            };
            self.surface_cells[slot].set_color(color);
        }
    }

    /// Maps every surface cell onto the power-of-two fog-of-war texture.
    pub fn compute_fow_tex_coords(&mut self) {
        let u_span = (next_power_of_two(self.surface_width) - 1.0).max(1.0);
        let v_span = (next_power_of_two(self.surface_height) - 1.0).max(1.0);

        for sy in 0..self.surface_height {
            for sx in 0..self.surface_width {
                let slot = self.surface_slot(sx, sy);
                self.surface_cells[slot]
                    .set_fow_tex_coord(Vec2::new(sx as f32 / u_span, sy as f32 / v_span));
            }
        }
    }
}
