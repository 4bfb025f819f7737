//! Non-fatal anomalies of a layout run

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::asset::AssetKind;

/// Something the run worked around instead of failing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// No available cell for the `sequence_index`-th drawn asset; it was skipped
    NoBuildableCells { kind: AssetKind, sequence_index: usize },
    /// Pathfinding gave up; the road is a straight hub-to-asset segment
    StraightLineFallback { asset_index: usize, kind: AssetKind },
    /// The pad window held no valid elevation; the asset adds no earthwork
    EmptyPad { asset_index: usize, kind: AssetKind },
}

impl fmt::Display for LayoutWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LayoutWarning::NoBuildableCells { kind, sequence_index } => {
                write!(f, "no buildable cells for {kind} (draw {sequence_index}), skipped")
            }
            LayoutWarning::StraightLineFallback { asset_index, kind } => {
                write!(f, "road to {kind} #{asset_index} fell back to a straight line")
            }
            LayoutWarning::EmptyPad { asset_index, kind } => {
                write!(f, "pad of {kind} #{asset_index} has no valid elevation")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tag() {
        let w = LayoutWarning::EmptyPad { asset_index: 3, kind: AssetKind::Inverter };
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "empty_pad");
        assert_eq!(json["kind"], "inverter");
        assert_eq!(json["asset_index"], 3);
    }

    #[test]
    fn test_display() {
        let w = LayoutWarning::NoBuildableCells { kind: AssetKind::Battery, sequence_index: 2 };
        assert_eq!(w.to_string(), "no buildable cells for battery (draw 2), skipped");
    }
}
