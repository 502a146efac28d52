//! Grid configuration shared by the snap controller and the host.

use kurbo::Size;
use serde::{Deserialize, Serialize};

/// Lattice family used for quantization and rendering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum GridType {
    /// No grid; equivalent to disabled snapping.
    NoGrid,
    /// Rectangular cell lattice.
    #[default]
    Square,
    /// Hexagonal cells in horizontal rows (alternating rows shifted).
    HexHorizontal,
    /// Hexagonal cells in vertical columns (alternating columns shifted).
    HexVertical,
    /// Diamond cells (alternating half-height rows shifted).
    Isometric,
}

/// Grid origin offset in world units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct GridOffset {
    pub left: f64,
    pub top: f64,
}

impl GridOffset {
    pub fn new(left: f64, top: f64) -> Self {
        Self { left, top }
    }
}

/// Host-supplied grid description.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GridConfig {
    pub grid_type: GridType,
    /// Cell extents in world units.
    pub cell_size: Size,
    /// Lattice origin in world units.
    pub offset: GridOffset,
    /// Master switch; when false every snap request passes through unchanged.
    pub snap: bool,
    /// World units per map unit. Carried for the host; quantization works on
    /// `cell_size` directly.
    pub scale: f64,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            grid_type: GridType::Square,
            cell_size: Size::new(50.0, 50.0),
            offset: GridOffset::default(),
            snap: true,
            scale: 1.0,
        }
    }
}

impl GridConfig {
    /// True when the grid can quantize points at all.
    pub fn is_snappable(&self) -> bool {
        self.snap && self.grid_type != GridType::NoGrid
    }
}
