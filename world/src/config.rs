//! Tunable parameters of the spatial grid.

use serde::{Deserialize, Serialize};

/// Distance beyond which a mobile occupant is assumed to have moved on by the
/// time a planning unit arrives.
pub(crate) const MIGHT_BE_FREE_SOON_RADIUS: f32 = 5.0;

/// Depth below the water line, in raw map height units, at which land units
/// can no longer wade.
pub(crate) const DEEP_SUBMERGED_MARGIN: f32 = 1.5;

/// Amount assigned to resources placed by the terrain loader.
pub(crate) const DEFAULT_RESOURCE_AMOUNT: i32 = 500;

/// Runtime configuration consumed by [`Grid`](crate::Grid).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Radius used by the "might be free soon" planning relaxation.
    pub might_be_free_soon_radius: f32,
    /// Margin below the water level that marks a cell as deep submerged.
    /// Divided by the map height factor before use.
    pub deep_submerged_margin: f32,
    /// Starting amount of every resource placed at load time.
    pub default_resource_amount: i32,
    /// Installs the tracing backed synchronisation diagnostics on creation.
    pub synch_diagnostics: bool,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            might_be_free_soon_radius: MIGHT_BE_FREE_SOON_RADIUS,
            deep_submerged_margin: DEEP_SUBMERGED_MARGIN,
            default_resource_amount: DEFAULT_RESOURCE_AMOUNT,
            synch_diagnostics: false,
        }
    }
}
