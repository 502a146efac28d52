//! Sibling-chain activation on resolved background clicks.

use kurbo::Point;
use serde::{Deserialize, Serialize};

use crate::geometry::point_in_polygon;

/// A sibling chain the active session could switch to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SiblingChain {
    /// Host-side identity, handed back through the switch callback.
    pub index: usize,
    /// Closed outline in world coordinates.
    pub outline: Vec<Point>,
    /// Overlay layers (fog of war and the like) are not switch targets.
    pub interactive: bool,
}

impl SiblingChain {
    pub fn new(index: usize, outline: Vec<Point>) -> Self {
        Self {
            index,
            outline,
            interactive: true,
        }
    }
}

/// Resolve a background click against the sibling chains.
///
/// Returns the first sibling (in array order) whose filled area contains the
/// point, skipping the active chain and non-interactive overlays. `None`
/// means the click hit empty space and selection should clear instead.
pub fn resolve_chain_switch(
    point: Point,
    siblings: &[SiblingChain],
    active_index: Option<usize>,
) -> Option<usize> {
    siblings
        .iter()
        .filter(|sibling| sibling.interactive && Some(sibling.index) != active_index)
        .find(|sibling| point_in_polygon(point, &sibling.outline))
        .map(|sibling| sibling.index)
}
