#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative spatial grid for Skirmish.
//!
//! The [`Grid`] owns two flat arrays: fine [`Cell`]s that record which unit
//! occupies each location per [`Field`](skirmish_core::Field), and coarse
//! [`SurfaceCell`]s that carry terrain geometry, placed objects and per-team
//! fog-of-war state. The simulation loop is the only writer; pathfinding and
//! AI layers call the read-only predicates, possibly from worker threads
//! between ticks.

mod area;
mod cell;
mod config;
mod diagnostics;
mod grid;
mod movement;
mod persistence;
mod placement;
mod proximity;
mod queries;
mod surface_cell;
mod terrain;
#[cfg(test)]
mod test_terrain;
mod units;

pub use area::{CircularArea, Quad, QuadArea, Resolution};
pub use cell::Cell;
pub use config::GridConfig;
pub use diagnostics::{NoopDiagnostics, SyncDiagnostics, TracingDiagnostics};
pub use grid::Grid;
pub use movement::MoveCache;
pub use persistence::GridSnapshot;
pub use placement::Placement;
pub use surface_cell::{ObjectKind, Resource, SurfaceCell, TerrainObject};
pub use terrain::{TerrainSource, CLIFF_SURFACE_TYPE, OBJECT_KINDS};
pub use units::{Skill, UnitArena, UnitKind, UnitRecord};
