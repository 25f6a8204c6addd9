//! Precondition violations raised by the spatial grid.

use thiserror::Error;

use crate::{Field, Pos};

/// Convenience alias used throughout the grid crates.
pub type Result<T> = std::result::Result<T, GridError>;

/// Programming errors detected by the grid.
///
/// Ordinary negative answers (an occupied cell, a blocked move) are never
/// reported through this type; predicates return `bool` or `Option` for those.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum GridError {
    /// A raw field index was outside `0..FIELD_COUNT`.
    #[error("invalid field value {index}")]
    FieldOutOfRange {
        /// Offending raw index.
        index: i32,
    },
    /// A team index was outside `0..MAX_TEAMS`.
    #[error("invalid team index {index}, teams = {teams}")]
    TeamOutOfRange {
        /// Offending raw index.
        index: usize,
        /// Number of team slots available.
        teams: usize,
    },
    /// A fine cell lookup addressed a position outside the grid.
    #[error("cell {pos:?} outside grid of {width}x{height}")]
    CellOutOfRange {
        /// Requested position.
        pos: Pos,
        /// Grid width in fine cells.
        width: i32,
        /// Grid height in fine cells.
        height: i32,
    },
    /// A surface cell lookup addressed a position outside the surface grid.
    #[error("surface cell {pos:?} outside surface of {width}x{height}")]
    SurfaceCellOutOfRange {
        /// Requested surface position.
        pos: Pos,
        /// Surface width.
        width: i32,
        /// Surface height.
        height: i32,
    },
    /// Cell storage was accessed before terrain was loaded.
    #[error("grid storage has not been loaded")]
    StorageMissing,
    /// A unit was queried in a field it does not currently occupy.
    #[error("unit field {unit:?} does not match queried field {requested:?}")]
    FieldMismatch {
        /// Field the unit currently occupies.
        unit: Field,
        /// Field passed by the caller.
        requested: Field,
    },
    /// A stationary unit was placed onto a cell claimed by another unit.
    #[error("cell {pos:?} already occupied by unit {occupant}")]
    CellOccupied {
        /// Contested position.
        pos: Pos,
        /// Raw identifier of the unit holding the cell.
        occupant: u32,
    },
    /// A start location index exceeded the map's player count.
    #[error("start location {index} requested, map has {max_players}")]
    StartLocationOutOfRange {
        /// Requested index.
        index: usize,
        /// Players supported by the map.
        max_players: usize,
    },
    /// A footprint mask did not match its declared size.
    #[error("footprint of size {size} expects {size}x{size} mask entries, got {cells}")]
    InvalidFootprint {
        /// Declared edge length.
        size: i32,
        /// Number of mask entries supplied.
        cells: usize,
    },
    /// Terrain source data violated a load rule.
    #[error("invalid terrain: {reason}")]
    InvalidTerrain {
        /// Description of the violated rule.
        reason: String,
    },
    /// A snapshot does not fit the grid it is restored into.
    #[error("snapshot mismatch: {reason}")]
    SnapshotMismatch {
        /// Description of the mismatch.
        reason: String,
    },
}
