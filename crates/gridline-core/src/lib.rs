//! Gridline Core Library
//!
//! Interactive editing engine for grid-snapped edge chains: walls, region
//! outlines, and similar vertex-chain shapes in scene editors.

pub mod actions;
pub mod chain;
pub mod geometry;
pub mod grid;
pub mod history;
pub mod input;
pub mod selection;
pub mod session;
pub mod snap;
pub mod switch;
pub mod viewport;

pub use actions::{ActionError, LocalAction, VertexMove};
pub use chain::{ChainId, ChainProfile, EdgeChain, Vertex};
pub use geometry::{
    GeometryError, marquee_rect, point_in_polygon, point_in_rect, point_to_segment_dist,
    project_point_to_segment,
};
pub use grid::{GridConfig, GridOffset, GridType};
pub use history::{MAX_UNDO_HISTORY, UndoStack};
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
pub use selection::{Marquee, SelectionState};
pub use session::{
    EditorError, EditorHost, EditorSession, EngineResult, HitTarget, LINE_HIT_WIDTH,
    MARQUEE_CLICK_THRESHOLD, VERTEX_HIT_RADIUS,
};
pub use snap::{SnapMode, resolve_snap_mode, snap};
pub use switch::{SiblingChain, resolve_chain_switch};
pub use viewport::Viewport;
