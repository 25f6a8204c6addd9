//! Coarse terrain cell: geometry, placed objects and per-team fog state.

use glam::{Vec2, Vec3};
use serde::{Deserialize, Serialize};
use skirmish_core::{truncate_decimal, ResourceKind, TeamIndex, MAX_TEAMS};

/// Tileset object class identifier as stored in terrain sources.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectKind(u16);

impl ObjectKind {
    /// Creates an object kind from its raw terrain identifier.
    #[must_use]
    pub const fn new(value: u16) -> Self {
        Self(value)
    }

    /// Retrieves the raw terrain identifier.
    #[must_use]
    pub const fn get(&self) -> u16 {
        self.0
    }
}

/// Depletable resource attached to a terrain object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resource {
    /// Kind of resource harvested here.
    pub kind: ResourceKind,
    /// Remaining amount, never negative.
    pub amount: i32,
}

/// Object placed on a surface cell, owned by that cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerrainObject {
    /// Raw terrain identifier the object was loaded from.
    pub kind: ObjectKind,
    /// Whether land units can walk through the object.
    pub walkable: bool,
    /// Attached resource, if the object can be harvested.
    pub resource: Option<Resource>,
}

/// One coarse grid slot covering a `CELL_SCALE`×`CELL_SCALE` block of cells.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SurfaceCell {
    vertex: Vec3,
    normal: Vec3,
    color: Vec3,
    surf_tex_coord: Vec2,
    fow_tex_coord: Vec2,
    surface_type: i32,
    object: Option<TerrainObject>,
    visible: [bool; MAX_TEAMS],
    explored: [bool; MAX_TEAMS],
    near_submerged: bool,
    changed_from_original_load: bool,
}

impl Default for SurfaceCell {
    fn default() -> Self {
        Self {
            vertex: Vec3::ZERO,
            normal: Vec3::Y,
            color: Vec3::ONE,
            surf_tex_coord: Vec2::ZERO,
            fow_tex_coord: Vec2::ZERO,
            surface_type: 0,
            object: None,
            visible: [false; MAX_TEAMS],
            explored: [false; MAX_TEAMS],
            near_submerged: false,
            changed_from_original_load: false,
        }
    }
}

impl SurfaceCell {
    /// Vertex position `(x, height, y)` in world units.
    #[must_use]
    pub fn vertex(&self) -> Vec3 {
        self.vertex
    }

    /// Replaces the vertex; the height component is truncated.
    pub fn set_vertex(&mut self, vertex: Vec3) {
        self.vertex = Vec3::new(vertex.x, truncate_decimal(vertex.y), vertex.z);
    }

    /// Terrain height, truncated to six decimals.
    #[must_use]
    pub fn height(&self) -> f32 {
        truncate_decimal(self.vertex.y)
    }

    /// Stores a truncated height. `changed` flags the cell as edited after
    /// the original load.
    pub fn set_height(&mut self, height: f32, changed: bool) {
        self.vertex.y = truncate_decimal(height);
        if changed {
            self.changed_from_original_load = true;
        }
    }

    /// Surface normal.
    #[must_use]
    pub fn normal(&self) -> Vec3 {
        self.normal
    }

    /// Replaces the surface normal.
    pub fn set_normal(&mut self, normal: Vec3) {
        self.normal = normal;
    }

    /// Vertex colour multiplier.
    #[must_use]
    pub fn color(&self) -> Vec3 {
        self.color
    }

    /// Replaces the vertex colour multiplier.
    pub fn set_color(&mut self, color: Vec3) {
        self.color = color;
    }

    /// Terrain texture coordinate.
    #[must_use]
    pub fn surf_tex_coord(&self) -> Vec2 {
        self.surf_tex_coord
    }

    /// Replaces the terrain texture coordinate.
    pub fn set_surf_tex_coord(&mut self, coord: Vec2) {
        self.surf_tex_coord = coord;
    }

    /// Fog-of-war overlay texture coordinate.
    #[must_use]
    pub fn fow_tex_coord(&self) -> Vec2 {
        self.fow_tex_coord
    }

    /// Replaces the fog-of-war overlay texture coordinate.
    pub fn set_fow_tex_coord(&mut self, coord: Vec2) {
        self.fow_tex_coord = coord;
    }

    /// Tileset surface index.
    #[must_use]
    pub fn surface_type(&self) -> i32 {
        self.surface_type
    }

    /// Replaces the tileset surface index.
    pub fn set_surface_type(&mut self, surface_type: i32) {
        self.surface_type = surface_type;
    }

    /// Object placed on the cell.
    #[must_use]
    pub fn object(&self) -> Option<&TerrainObject> {
        self.object.as_ref()
    }

    /// Places or removes the object on the cell.
    pub fn set_object(&mut self, object: Option<TerrainObject>) {
        self.object = object;
    }

    /// Resource attached to the placed object.
    #[must_use]
    pub fn resource(&self) -> Option<&Resource> {
        self.object.as_ref().and_then(|object| object.resource.as_ref())
    }

    /// Releases the object together with its resource and marks the cell
    /// dirty. Cells without a resource are left untouched.
    pub fn delete_resource(&mut self) {
        if self.resource().is_some() {
            self.object = None;
            self.changed_from_original_load = true;
        }
    }

    /// Harvests `value` from the attached resource.
    ///
    /// The amount is clamped at zero. Returns `true` when the resource was
    /// exhausted by this call, in which case the object is released and the
    /// cell becomes free. A `value` of zero or less harvests nothing.
    pub fn dec_amount(&mut self, value: i32) -> bool {
        if value <= 0 {
            return false;
        }
        let Some(resource) = self
            .object
            .as_mut()
            .and_then(|object| object.resource.as_mut())
        else {
            return false;
        };

        self.changed_from_original_load = true;
        resource.amount = resource.amount.saturating_sub(value).max(0);
        if resource.amount > 0 {
            return false;
        }

        self.object = None;
        true
    }

    /// Whether land units may stand on the cell.
    #[must_use]
    pub fn is_free(&self) -> bool {
        self.object.as_ref().map_or(true, |object| object.walkable)
    }

    /// Whether `team` currently has line of sight to the cell.
    #[must_use]
    pub fn is_visible(&self, team: TeamIndex) -> bool {
        self.visible[team.get()]
    }

    /// Sets the current line-of-sight flag of `team`.
    pub fn set_visible(&mut self, team: TeamIndex, visible: bool) {
        self.visible[team.get()] = visible;
    }

    /// Whether `team` has ever seen the cell.
    #[must_use]
    pub fn is_explored(&self, team: TeamIndex) -> bool {
        self.explored[team.get()]
    }

    /// Marks the cell as explored by `team`. Exploration never reverts.
    pub fn set_explored(&mut self, team: TeamIndex) {
        self.explored[team.get()] = true;
    }

    /// Visibility flags of every team as a string of `0`/`1`.
    #[must_use]
    pub fn visible_string(&self) -> String {
        flags_to_string(&self.visible)
    }

    /// Exploration flags of every team as a string of `0`/`1`.
    #[must_use]
    pub fn explored_string(&self) -> String {
        flags_to_string(&self.explored)
    }

    /// Whether a neighbouring cell lies below the water level.
    #[must_use]
    pub fn near_submerged(&self) -> bool {
        self.near_submerged
    }

    pub(crate) fn set_near_submerged(&mut self, near_submerged: bool) {
        self.near_submerged = near_submerged;
    }

    /// Whether the cell was edited after the terrain was loaded.
    #[must_use]
    pub fn changed_from_original_load(&self) -> bool {
        self.changed_from_original_load
    }
}

fn flags_to_string(flags: &[bool; MAX_TEAMS]) -> String {
    flags.iter().map(|&flag| if flag { '1' } else { '0' }).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resource_cell(amount: i32) -> SurfaceCell {
        let mut cell = SurfaceCell::default();
        cell.set_object(Some(TerrainObject {
            kind: ObjectKind::new(11),
            walkable: false,
            resource: Some(Resource {
                kind: ResourceKind::new(1),
                amount,
            }),
        }));
        cell
    }

    fn team(index: usize) -> TeamIndex {
        TeamIndex::new(index).expect("team")
    }

    #[test]
    fn exhausting_resource_releases_object() {
        let mut cell = resource_cell(5);
        assert!(!cell.is_free());

        assert!(cell.dec_amount(5), "reaching zero must release the resource");
        assert!(cell.object().is_none());
        assert!(cell.is_free());
        assert!(cell.changed_from_original_load());
    }

    #[test]
    fn overdraw_clamps_and_releases_on_first_exhaustion() {
        let mut cell = resource_cell(5);

        assert!(!cell.dec_amount(3));
        assert_eq!(cell.resource().map(|resource| resource.amount), Some(2));
        assert!(!cell.is_free());

        assert!(cell.dec_amount(3));
        assert!(cell.resource().is_none());
        assert!(cell.is_free());
        assert!(!cell.dec_amount(3), "nothing left to harvest");
    }

    #[test]
    fn non_positive_harvest_leaves_resource_untouched() {
        let mut cell = resource_cell(5);

        assert!(!cell.dec_amount(0));
        assert!(!cell.dec_amount(-7));
        assert_eq!(cell.resource().map(|resource| resource.amount), Some(5));
        assert!(!cell.changed_from_original_load());
    }

    #[test]
    fn dec_amount_without_resource_is_a_no_op() {
        let mut cell = SurfaceCell::default();
        cell.set_object(Some(TerrainObject {
            kind: ObjectKind::new(3),
            walkable: true,
            resource: None,
        }));

        assert!(!cell.dec_amount(1));
        assert!(cell.object().is_some());
        assert!(!cell.changed_from_original_load());
    }

    #[test]
    fn walkable_object_keeps_cell_free() {
        let mut cell = SurfaceCell::default();
        cell.set_object(Some(TerrainObject {
            kind: ObjectKind::new(2),
            walkable: true,
            resource: None,
        }));
        assert!(cell.is_free());

        cell.set_object(Some(TerrainObject {
            kind: ObjectKind::new(2),
            walkable: false,
            resource: None,
        }));
        assert!(!cell.is_free());
    }

    #[test]
    fn exploration_is_monotonic_while_visibility_toggles() {
        let mut cell = SurfaceCell::default();
        let scout = team(2);

        cell.set_visible(scout, true);
        cell.set_explored(scout);
        cell.set_visible(scout, false);

        assert!(!cell.is_visible(scout));
        assert!(cell.is_explored(scout));
        assert!(!cell.is_explored(team(3)));
        assert_eq!(cell.explored_string(), "0010000000");
        assert_eq!(cell.visible_string(), "0000000000");
    }

    #[test]
    fn height_edits_mark_cell_dirty_only_on_request() {
        let mut cell = SurfaceCell::default();

        cell.set_height(3.5, false);
        assert!(!cell.changed_from_original_load());
        assert_eq!(cell.height(), 3.5);

        cell.set_height(4.25, true);
        assert!(cell.changed_from_original_load());
        assert_eq!(cell.vertex().y, 4.25);
    }

    #[test]
    fn delete_resource_frees_cell() {
        let mut cell = resource_cell(40);
        cell.delete_resource();

        assert!(cell.is_free());
        assert!(cell.changed_from_original_load());
    }
}
