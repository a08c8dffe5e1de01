//! Tool selection.

use serde::{Deserialize, Serialize};

/// Available tools.
///
/// The tool decides how a press is interpreted; the gesture itself lives in
/// [`crate::interaction::Mode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ToolKind {
    /// Select, drag, pan and box-select.
    #[default]
    Select,
    /// Draw wall segments inside the active building.
    Wall,
    /// Draw rooms inside the active building.
    Room,
    /// Link two devices.
    Connect,
    /// Measure a distance in diagram units.
    Measure,
}

impl ToolKind {
    /// Drawing tools only work on a floor plan.
    pub fn requires_floor(self) -> bool {
        matches!(self, ToolKind::Wall | ToolKind::Room)
    }
}
