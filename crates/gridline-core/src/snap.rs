//! Snap controller: modifier resolution and grid quantization.

use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

use crate::grid::{GridConfig, GridType};
use crate::input::Modifiers;

/// Quantization granularity for a world point against the active grid.
///
/// Modes are hierarchical: each includes every target of the coarser modes.
/// `Free` quantizes to the full cell (its center); `Half` adds cell corners
/// and edge midpoints; `Quarter` adds quarter-edge points, quadrant centers
/// and the cross points where quadrant lines meet the half lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SnapMode {
    #[default]
    Free,
    Half,
    Quarter,
}

/// Resolve the snap mode for one input event from its modifier state.
///
/// Alt wins over Ctrl when both are held; with neither, the coarse full-cell
/// granularity applies.
pub fn resolve_snap_mode(modifiers: Modifiers) -> SnapMode {
    if modifiers.alt {
        SnapMode::Quarter
    } else if modifiers.ctrl {
        SnapMode::Half
    } else {
        SnapMode::Free
    }
}

/// Quantize a world point to the nearest grid target of the given mode.
///
/// Returns the point unchanged when the grid cannot snap (`snap` off or no
/// grid). Otherwise collects the targets of the point's cell and its eight
/// lattice neighbors and picks the closest one; there is no distance
/// threshold, quantization always wants the nearest target of the active
/// granularity. Must be called on every move event of a constrained drag so
/// preview and commit never diverge.
pub fn snap(point: Point, grid: &GridConfig, mode: SnapMode) -> Point {
    if !grid.is_snappable() {
        return point;
    }

    let (col, row) = cell_of(grid, point);
    let mut best = point;
    let mut best_dist_sq = f64::INFINITY;
    for dc in -1..=1 {
        for dr in -1..=1 {
            let anchor = cell_anchor(grid, col + dc, row + dr);
            for target in cell_targets(anchor, grid.cell_size, mode) {
                let dist_sq = (target - point).hypot2();
                if dist_sq < best_dist_sq {
                    best_dist_sq = dist_sq;
                    best = target;
                }
            }
        }
    }
    best
}

/// Top-left anchor of the lattice cell at `(col, row)`.
///
/// Square grids use the plain rectangular lattice. Hex lattices advance 3/4
/// of a cell along their hex axis and shift alternating columns/rows by half
/// a cell; isometric rows advance half a cell height and shift alternating
/// rows by half a cell width.
fn cell_anchor(grid: &GridConfig, col: i64, row: i64) -> Point {
    let Size { width, height } = grid.cell_size;
    let left = grid.offset.left;
    let top = grid.offset.top;
    match grid.grid_type {
        GridType::NoGrid | GridType::Square => {
            Point::new(left + col as f64 * width, top + row as f64 * height)
        }
        GridType::HexVertical => {
            let shift = if col.rem_euclid(2) == 1 { height * 0.5 } else { 0.0 };
            Point::new(
                left + col as f64 * width * 0.75,
                top + row as f64 * height + shift,
            )
        }
        GridType::HexHorizontal => {
            let shift = if row.rem_euclid(2) == 1 { width * 0.5 } else { 0.0 };
            Point::new(
                left + col as f64 * width + shift,
                top + row as f64 * height * 0.75,
            )
        }
        GridType::Isometric => {
            let shift = if row.rem_euclid(2) == 1 { width * 0.5 } else { 0.0 };
            Point::new(
                left + col as f64 * width + shift,
                top + row as f64 * height * 0.5,
            )
        }
    }
}

/// Approximate lattice indices of the cell containing `point`, inverting the
/// anchor spacing of the active grid type.
fn cell_of(grid: &GridConfig, point: Point) -> (i64, i64) {
    let Size { width, height } = grid.cell_size;
    let x = point.x - grid.offset.left;
    let y = point.y - grid.offset.top;
    let (step_x, step_y) = match grid.grid_type {
        GridType::NoGrid | GridType::Square => (width, height),
        GridType::HexVertical => (width * 0.75, height),
        GridType::HexHorizontal => (width, height * 0.75),
        GridType::Isometric => (width, height * 0.5),
    };
    ((x / step_x).floor() as i64, (y / step_y).floor() as i64)
}

/// Snap targets of one cell for the given mode, coarse to fine.
fn cell_targets(anchor: Point, size: Size, mode: SnapMode) -> Vec<Point> {
    let Point { x, y } = anchor;
    let w = size.width;
    let h = size.height;

    // Free: cell center only
    let mut targets = vec![Point::new(x + w / 2.0, y + h / 2.0)];
    if mode == SnapMode::Free {
        return targets;
    }

    // Half: corners and edge midpoints
    targets.extend([
        Point::new(x, y),
        Point::new(x + w, y),
        Point::new(x, y + h),
        Point::new(x + w, y + h),
        Point::new(x + w / 2.0, y),
        Point::new(x + w, y + h / 2.0),
        Point::new(x + w / 2.0, y + h),
        Point::new(x, y + h / 2.0),
    ]);
    if mode == SnapMode::Half {
        return targets;
    }

    // Quarter: quarter-edge points
    targets.extend([
        Point::new(x + w / 4.0, y),
        Point::new(x + 3.0 * w / 4.0, y),
        Point::new(x + w, y + h / 4.0),
        Point::new(x + w, y + 3.0 * h / 4.0),
        Point::new(x + w / 4.0, y + h),
        Point::new(x + 3.0 * w / 4.0, y + h),
        Point::new(x, y + h / 4.0),
        Point::new(x, y + 3.0 * h / 4.0),
    ]);
    // Quadrant centers
    targets.extend([
        Point::new(x + w / 4.0, y + h / 4.0),
        Point::new(x + 3.0 * w / 4.0, y + h / 4.0),
        Point::new(x + w / 4.0, y + 3.0 * h / 4.0),
        Point::new(x + 3.0 * w / 4.0, y + 3.0 * h / 4.0),
    ]);
    // Cross points where quadrant lines meet the half lines
    targets.extend([
        Point::new(x + w / 4.0, y + h / 2.0),
        Point::new(x + 3.0 * w / 4.0, y + h / 2.0),
        Point::new(x + w / 2.0, y + h / 4.0),
        Point::new(x + w / 2.0, y + 3.0 * h / 4.0),
    ]);
    targets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::GridOffset;

    fn grid(grid_type: GridType) -> GridConfig {
        GridConfig {
            grid_type,
            ..GridConfig::default()
        }
    }

    #[test]
    fn test_resolve_mode_table() {
        let none = Modifiers::default();
        assert_eq!(resolve_snap_mode(none), SnapMode::Free);

        let ctrl = Modifiers {
            ctrl: true,
            ..Modifiers::default()
        };
        assert_eq!(resolve_snap_mode(ctrl), SnapMode::Half);

        let alt = Modifiers {
            alt: true,
            ..Modifiers::default()
        };
        assert_eq!(resolve_snap_mode(alt), SnapMode::Quarter);
    }

    #[test]
    fn test_resolve_mode_alt_beats_ctrl() {
        let both = Modifiers {
            ctrl: true,
            alt: true,
            ..Modifiers::default()
        };
        assert_eq!(resolve_snap_mode(both), SnapMode::Quarter);
    }

    #[test]
    fn test_free_snaps_to_cell_center() {
        let result = snap(Point::new(30.0, 20.0), &grid(GridType::Square), SnapMode::Free);
        assert_eq!(result, Point::new(25.0, 25.0));
    }

    #[test]
    fn test_half_snaps_to_corner() {
        let result = snap(Point::new(48.0, 53.0), &grid(GridType::Square), SnapMode::Half);
        assert_eq!(result, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_half_snaps_to_edge_midpoint() {
        let result = snap(Point::new(27.0, 3.0), &grid(GridType::Square), SnapMode::Half);
        assert_eq!(result, Point::new(25.0, 0.0));
    }

    #[test]
    fn test_quarter_snaps_to_quadrant_center() {
        let result = snap(
            Point::new(12.0, 13.5),
            &grid(GridType::Square),
            SnapMode::Quarter,
        );
        assert_eq!(result, Point::new(12.5, 12.5));
    }

    #[test]
    fn test_disabled_snap_passes_through() {
        let mut config = grid(GridType::Square);
        config.snap = false;
        let p = Point::new(31.7, 18.2);
        assert_eq!(snap(p, &config, SnapMode::Half), p);
    }

    #[test]
    fn test_no_grid_passes_through() {
        let p = Point::new(31.7, 18.2);
        assert_eq!(snap(p, &grid(GridType::NoGrid), SnapMode::Half), p);
    }

    #[test]
    fn test_offset_shifts_lattice() {
        let config = GridConfig {
            offset: GridOffset::new(10.0, 5.0),
            ..grid(GridType::Square)
        };
        let result = snap(Point::new(30.0, 28.0), &config, SnapMode::Free);
        assert_eq!(result, Point::new(35.0, 30.0));
    }

    #[test]
    fn test_hex_vertical_shifts_odd_columns() {
        // Column 1 anchors at (37.5, 25): centers land on (62.5, 50).
        let result = snap(
            Point::new(60.0, 50.0),
            &grid(GridType::HexVertical),
            SnapMode::Free,
        );
        assert_eq!(result, Point::new(62.5, 50.0));
    }

    #[test]
    fn test_hex_horizontal_shifts_odd_rows() {
        // Row 1 anchors at (25, 37.5): centers land on (50, 62.5).
        let result = snap(
            Point::new(48.0, 60.0),
            &grid(GridType::HexHorizontal),
            SnapMode::Free,
        );
        assert_eq!(result, Point::new(50.0, 62.5));
    }

    #[test]
    fn test_isometric_half_height_rows() {
        // Row 1 anchors at (25, 25): centers land on (50, 50).
        let result = snap(
            Point::new(48.0, 47.0),
            &grid(GridType::Isometric),
            SnapMode::Free,
        );
        assert_eq!(result, Point::new(50.0, 50.0));
    }

    #[test]
    fn test_snap_is_idempotent_on_targets() {
        let config = grid(GridType::Square);
        let snapped = snap(Point::new(33.0, 41.0), &config, SnapMode::Quarter);
        assert_eq!(snap(snapped, &config, SnapMode::Quarter), snapped);
    }
}
