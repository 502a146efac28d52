//! Interactive editing session: pointer/keyboard gestures, commits, and undo.

use std::collections::BTreeSet;

use kurbo::{Point, Vec2};
use thiserror::Error;

use crate::actions::{ActionError, LocalAction, VertexMove};
use crate::chain::{ChainProfile, EdgeChain, Vertex};
use crate::geometry::{
    GeometryError, ensure_finite, marquee_rect, point_in_rect, point_to_segment_dist,
    project_point_to_segment,
};
use crate::grid::GridConfig;
use crate::history::UndoStack;
use crate::input::{KeyEvent, Modifiers, MouseButton, PointerEvent};
use crate::selection::SelectionState;
use crate::snap::{SnapMode, resolve_snap_mode, snap};
use crate::switch::{SiblingChain, resolve_chain_switch};
use crate::viewport::Viewport;

/// Vertex grab radius in world units.
pub const VERTEX_HIT_RADIUS: f64 = 25.0;
/// Full width of the line grab band in world units.
pub const LINE_HIT_WIDTH: f64 = 100.0;
/// Pointer travel below this many screen pixels per axis resolves as a click.
pub const MARQUEE_CLICK_THRESHOLD: f64 = 5.0;

/// Errors surfaced by session operations.
#[derive(Debug, Error, PartialEq)]
pub enum EditorError {
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Action(#[from] ActionError),
}

/// Result alias for session operations.
pub type EngineResult<T> = Result<T, EditorError>;

/// Callbacks an owning application receives from an editing session.
///
/// Every method has a no-op default body, so a host implements only the
/// notifications it cares about. Hosts that only poll session state can pass
/// `&mut ()`.
pub trait EditorHost {
    /// The chain was mutated (commit or undo/redo replay).
    fn on_vertices_change(&mut self, _vertices: &[Vertex], _closed: bool) {}

    /// A background click resolved to "nothing selected".
    fn on_clear_selections(&mut self) {}

    /// A background click landed inside a sibling chain; the host owns
    /// activating it.
    fn on_switch_to_chain(&mut self, _index: usize) {}

    /// A new action was committed, for hosts keeping a global timeline.
    /// Not re-emitted on undo/redo replay.
    fn on_local_action(&mut self, _action: &LocalAction) {}

    /// The chain was split at `break_index`; the session keeps the head and
    /// the host owns creating an entity for the detached tail.
    fn on_chain_split(&mut self, _break_index: usize, _detached: &EdgeChain) {}

    /// Enter was pressed with no pending gesture.
    fn on_finish(&mut self) {}

    /// Escape was pressed with nothing left to abort or deselect.
    fn on_cancel(&mut self) {}
}

impl EditorHost for () {}

/// What a world-space point lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitTarget {
    Vertex(usize),
    Line(usize),
    Background,
}

/// In-flight pointer gesture. Captured state refers to the committed chain,
/// never the preview, so aborting a gesture loses nothing.
#[derive(Debug, Clone, Copy)]
enum Gesture {
    Idle,
    VertexDown {
        index: usize,
        vertex_start: Point,
        pointer_start: Point,
        moved: bool,
    },
    LineDown {
        line: usize,
        /// A line drags only when it was already the selected line at press.
        armed: bool,
        /// Snapped world pointer at press, the fixed reference for deltas.
        pointer_start: Point,
        v1_start: Vertex,
        v2_start: Vertex,
        moved: bool,
    },
    Marquee,
}

/// An interactive editing session over one edge chain.
///
/// The session owns the committed chain plus all transient interaction state:
/// selection, the in-flight gesture, a preview vertex list that tracks drags
/// before commit, and the undo history. Pointer events arrive in screen
/// space and are mapped through [`Viewport`]; key events carry logical key
/// names. Hosts observe mutations through [`EditorHost`].
#[derive(Debug)]
pub struct EditorSession {
    chain: EdgeChain,
    profile: ChainProfile,
    /// Grid configuration used for snapping; the host may swap it anytime.
    pub grid: GridConfig,
    /// Screen-to-world mapping; the host updates it on pan/zoom.
    pub viewport: Viewport,
    selection: SelectionState,
    gesture: Gesture,
    preview: Vec<Vertex>,
    insert_preview: Option<Point>,
    history: UndoStack,
    siblings: Vec<SiblingChain>,
    active_sibling: Option<usize>,
}

impl EditorSession {
    pub fn new(chain: EdgeChain, profile: ChainProfile, grid: GridConfig) -> Self {
        let preview = chain.vertices.clone();
        Self {
            chain,
            profile,
            grid,
            viewport: Viewport::default(),
            selection: SelectionState::new(),
            gesture: Gesture::Idle,
            preview,
            insert_preview: None,
            history: UndoStack::new(),
            siblings: Vec::new(),
            active_sibling: None,
        }
    }

    /// The committed chain. Preview state never leaks through here.
    pub fn chain(&self) -> &EdgeChain {
        &self.chain
    }

    pub fn profile(&self) -> ChainProfile {
        self.profile
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    /// Vertices to render: the committed chain plus any in-flight drag.
    pub fn preview(&self) -> &[Vertex] {
        &self.preview
    }

    /// Position of the dashed insertion marker while Shift-hovering a line.
    pub fn insert_preview(&self) -> Option<Point> {
        self.insert_preview
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Sibling chains tested on background clicks when the profile enables
    /// chain switching.
    pub fn set_siblings(&mut self, siblings: Vec<SiblingChain>) {
        self.siblings = siblings;
    }

    /// The active chain's own sibling index, skipped during switch lookup.
    pub fn set_active_sibling(&mut self, index: Option<usize>) {
        self.active_sibling = index;
    }

    /// Consume the session, handing the committed chain back to the host.
    pub fn into_chain(self) -> EdgeChain {
        self.chain
    }

    /// Hit-test a world point against preview vertices first, then lines.
    /// The first match in index order wins.
    pub fn hit_test(&self, world: Point) -> HitTarget {
        for (index, vertex) in self.preview.iter().enumerate() {
            if (vertex.position - world).hypot2() <= VERTEX_HIT_RADIUS * VERTEX_HIT_RADIUS {
                return HitTarget::Vertex(index);
            }
        }
        let half_band = LINE_HIT_WIDTH / 2.0;
        for line in 0..self.preview_line_count() {
            let a = self.preview[line].position;
            let b = self.preview[(line + 1) % self.preview.len()].position;
            if point_to_segment_dist(world, a, b) <= half_band {
                return HitTarget::Line(line);
            }
        }
        HitTarget::Background
    }

    /// Feed one pointer event. Only the left button starts or ends gestures.
    pub fn handle_pointer(
        &mut self,
        event: PointerEvent,
        host: &mut dyn EditorHost,
    ) -> EngineResult<()> {
        ensure_finite(event.position(), "pointer position")?;
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => {
                if button != MouseButton::Left {
                    return Ok(());
                }
                self.pointer_down(position, modifiers)
            }
            PointerEvent::Move {
                position,
                modifiers,
            } => self.pointer_move(position, modifiers),
            PointerEvent::Up {
                position,
                button,
                modifiers,
            } => {
                if button != MouseButton::Left {
                    return Ok(());
                }
                self.pointer_up(position, modifiers, host)
            }
        }
    }

    /// Feed one keyboard event.
    pub fn handle_key(&mut self, event: KeyEvent, host: &mut dyn EditorHost) -> EngineResult<()> {
        match event {
            KeyEvent::Pressed { key, modifiers } => match key.as_str() {
                "Delete" if modifiers.alt => self.break_chain(host),
                "Delete" => self.delete_selected(host),
                "Escape" => {
                    self.escape(host);
                    Ok(())
                }
                "Enter" => {
                    host.on_finish();
                    Ok(())
                }
                "z" | "Z" if modifiers.ctrl => self.undo(host),
                "y" | "Y" if modifiers.ctrl => self.redo(host),
                _ => Ok(()),
            },
            KeyEvent::Released { key, .. } => {
                if key == "Shift" {
                    self.insert_preview = None;
                }
                Ok(())
            }
        }
    }

    /// Append a snapped vertex to the chain end while the host is authoring
    /// the chain. Snaps with the default full-cell mode; callers wanting a
    /// finer granularity can run [`snap`] themselves first.
    pub fn place_vertex(
        &mut self,
        position: Point,
        height: Option<f64>,
        host: &mut dyn EditorHost,
    ) -> EngineResult<()> {
        ensure_finite(position, "placed vertex")?;
        let position = snap(position, &self.grid, SnapMode::Free);
        let height = if self.profile.vertex_height {
            height
        } else {
            None
        };
        let vertex = Vertex { position, height };
        self.commit(LocalAction::PlaceVertex { vertex }, host)
    }

    /// Replay the most recent action in reverse. A failed replay drops the
    /// action from the history.
    pub fn undo(&mut self, host: &mut dyn EditorHost) -> EngineResult<()> {
        let Some(action) = self.history.take_undo() else {
            return Ok(());
        };
        if let Err(error) = action.apply_undo(&mut self.chain) {
            log::warn!(
                "Undo of \"{}\" failed and was dropped: {error}",
                action.description()
            );
            return Err(error.into());
        }
        log::debug!("Undid: {}", action.description());
        self.history.accept_undone(action);
        self.after_replay(host);
        Ok(())
    }

    /// Replay the most recently undone action forward.
    pub fn redo(&mut self, host: &mut dyn EditorHost) -> EngineResult<()> {
        let Some(action) = self.history.take_redo() else {
            return Ok(());
        };
        if let Err(error) = action.apply_redo(&mut self.chain) {
            log::warn!(
                "Redo of \"{}\" failed and was dropped: {error}",
                action.description()
            );
            return Err(error.into());
        }
        log::debug!("Redid: {}", action.description());
        self.history.accept_redone(action);
        self.after_replay(host);
        Ok(())
    }

    fn pointer_down(&mut self, screen: Point, modifiers: Modifiers) -> EngineResult<()> {
        let world = self.viewport.screen_to_world(screen);
        self.insert_preview = None;
        match self.hit_test(world) {
            HitTarget::Vertex(index) => {
                let vertex_start = self.vertex_at(index)?.position;
                self.gesture = Gesture::VertexDown {
                    index,
                    vertex_start,
                    pointer_start: world,
                    moved: false,
                };
            }
            HitTarget::Line(line) => {
                let (first, second) = self.chain.line_endpoints(line);
                let armed = self.selection.line() == Some(line);
                let mode = resolve_snap_mode(modifiers);
                self.gesture = Gesture::LineDown {
                    line,
                    armed,
                    pointer_start: snap(world, &self.grid, mode),
                    v1_start: self.vertex_at(first)?,
                    v2_start: self.vertex_at(second)?,
                    moved: false,
                };
            }
            HitTarget::Background => {
                self.selection.begin_marquee(screen);
                self.gesture = Gesture::Marquee;
            }
        }
        Ok(())
    }

    fn pointer_move(&mut self, screen: Point, modifiers: Modifiers) -> EngineResult<()> {
        let world = self.viewport.screen_to_world(screen);
        match self.gesture {
            Gesture::Idle => self.update_insert_marker(world, modifiers)?,
            Gesture::VertexDown {
                index,
                vertex_start,
                pointer_start,
                moved,
            } => {
                if !moved {
                    // A drag starting on an unselected vertex selects it alone.
                    if !self.selection.contains_vertex(index) {
                        self.selection.select_vertex(index);
                    }
                    self.gesture = Gesture::VertexDown {
                        index,
                        vertex_start,
                        pointer_start,
                        moved: true,
                    };
                }
                let mode = resolve_snap_mode(modifiers);
                let target = snap(vertex_start + (world - pointer_start), &self.grid, mode);
                let delta = target - vertex_start;
                self.preview = self.chain.vertices.clone();
                if self.selection.selected_count() > 1 && self.selection.contains_vertex(index) {
                    for &selected in self.selection.vertices() {
                        if let Some(vertex) = self.preview.get_mut(selected) {
                            vertex.position += delta;
                        }
                    }
                } else if let Some(vertex) = self.preview.get_mut(index) {
                    vertex.position = target;
                }
            }
            Gesture::LineDown {
                line,
                armed,
                pointer_start,
                v1_start,
                v2_start,
                moved,
            } => {
                if !armed {
                    return Ok(());
                }
                if !moved {
                    self.gesture = Gesture::LineDown {
                        line,
                        armed,
                        pointer_start,
                        v1_start,
                        v2_start,
                        moved: true,
                    };
                }
                // Delta always measures against the captured start, not the
                // previous frame, so repeated snapping cannot drift.
                let mode = resolve_snap_mode(modifiers);
                let delta = snap(world, &self.grid, mode) - pointer_start;
                let (first, second) = self.chain.line_endpoints(line);
                self.preview = self.chain.vertices.clone();
                if let Some(vertex) = self.preview.get_mut(first) {
                    vertex.position = v1_start.position + delta;
                }
                if let Some(vertex) = self.preview.get_mut(second) {
                    vertex.position = v2_start.position + delta;
                }
            }
            Gesture::Marquee => self.selection.update_marquee(screen),
        }
        Ok(())
    }

    fn pointer_up(
        &mut self,
        screen: Point,
        modifiers: Modifiers,
        host: &mut dyn EditorHost,
    ) -> EngineResult<()> {
        let world = self.viewport.screen_to_world(screen);
        let gesture = self.gesture;
        self.gesture = Gesture::Idle;
        match gesture {
            Gesture::Idle => Ok(()),
            Gesture::VertexDown {
                index,
                vertex_start,
                pointer_start,
                moved,
            } => {
                if !moved {
                    if modifiers.shift {
                        return self.duplicate_vertex(index, host);
                    }
                    if modifiers.ctrl || modifiers.meta {
                        self.selection.toggle_vertex(index);
                    } else {
                        self.selection.select_vertex(index);
                    }
                    return Ok(());
                }
                let mode = resolve_snap_mode(modifiers);
                let target = snap(vertex_start + (world - pointer_start), &self.grid, mode);
                let delta = target - vertex_start;
                if delta == Vec2::ZERO {
                    self.sync_preview();
                    return Ok(());
                }
                let group =
                    self.selection.selected_count() > 1 && self.selection.contains_vertex(index);
                let action = if group {
                    let mut moves = Vec::new();
                    for &selected in self.selection.vertices() {
                        let before = self.vertex_at(selected)?.position;
                        moves.push(VertexMove {
                            index: selected,
                            before,
                            after: before + delta,
                        });
                    }
                    LocalAction::multi_move(moves)?
                } else {
                    LocalAction::MoveVertex {
                        index,
                        before: vertex_start,
                        after: target,
                    }
                };
                self.commit(action, host)
            }
            Gesture::LineDown {
                line,
                armed,
                pointer_start,
                v1_start,
                v2_start,
                moved,
            } => {
                if armed && moved {
                    // The raw pointer delta decides whether anything moved;
                    // the snapped first endpoint then fixes the rigid delta.
                    let raw = world - pointer_start;
                    if raw == Vec2::ZERO {
                        self.sync_preview();
                        return Ok(());
                    }
                    let mode = resolve_snap_mode(modifiers);
                    let first_target = snap(v1_start.position + raw, &self.grid, mode);
                    let delta = first_target - v1_start.position;
                    if delta == Vec2::ZERO {
                        self.sync_preview();
                        return Ok(());
                    }
                    let action = LocalAction::MoveLine {
                        line,
                        before: (v1_start.position, v2_start.position),
                        after: (first_target, v2_start.position + delta),
                    };
                    return self.commit(action, host);
                }
                if modifiers.shift {
                    self.insert_on_line(line, world, modifiers, host)
                } else {
                    self.selection.select_line(line, self.chain.len());
                    Ok(())
                }
            }
            Gesture::Marquee => self.finish_marquee(host),
        }
    }

    fn finish_marquee(&mut self, host: &mut dyn EditorHost) -> EngineResult<()> {
        let Some(marquee) = self.selection.take_marquee() else {
            return Ok(());
        };
        if marquee.is_simple_click(MARQUEE_CLICK_THRESHOLD) {
            let click = self.viewport.screen_to_world(marquee.start);
            if self.profile.chain_switching {
                if let Some(target) =
                    resolve_chain_switch(click, &self.siblings, self.active_sibling)
                {
                    self.selection.clear();
                    log::info!("Background click switches to chain {target}");
                    host.on_switch_to_chain(target);
                    return Ok(());
                }
            }
            self.selection.clear();
            host.on_clear_selections();
            return Ok(());
        }
        let rect = marquee_rect(
            self.viewport.screen_to_world(marquee.start),
            self.viewport.screen_to_world(marquee.end),
        );
        let captured: BTreeSet<usize> = self
            .preview
            .iter()
            .enumerate()
            .filter(|(_, vertex)| point_in_rect(vertex.position, rect))
            .map(|(index, _)| index)
            .collect();
        self.selection.set_vertices(captured);
        Ok(())
    }

    fn insert_on_line(
        &mut self,
        line: usize,
        world: Point,
        modifiers: Modifiers,
        host: &mut dyn EditorHost,
    ) -> EngineResult<()> {
        let (first, second) = self.chain.line_endpoints(line);
        let a = self.vertex_at(first)?;
        let b = self.vertex_at(second)?;
        let projected = project_point_to_segment(world, a.position, b.position)?;
        let position = snap(projected, &self.grid, resolve_snap_mode(modifiers));
        let index = first + 1;
        let vertex = Vertex {
            position,
            height: a.height,
        };
        self.commit(LocalAction::InsertVertex { index, vertex }, host)?;
        self.selection.select_vertex(index);
        Ok(())
    }

    fn duplicate_vertex(&mut self, index: usize, host: &mut dyn EditorHost) -> EngineResult<()> {
        let vertex = self.vertex_at(index)?;
        let insert_index = index + 1;
        self.commit(
            LocalAction::InsertVertex {
                index: insert_index,
                vertex,
            },
            host,
        )?;
        self.selection.select_vertex(insert_index);
        Ok(())
    }

    fn delete_selected(&mut self, host: &mut dyn EditorHost) -> EngineResult<()> {
        if self.selection.selected_count() == 0 {
            return Ok(());
        }
        let indices: Vec<usize> = self.selection.vertices().iter().rev().copied().collect();
        if !self.chain.can_remove(indices.len()) {
            log::debug!(
                "Deleting {} vertices rejected, chain at structural minimum",
                indices.len()
            );
            return Ok(());
        }
        // One action per removed index, recorded in removal order, so undo
        // re-inserts ascending and restores the original indices exactly.
        for &index in &indices {
            let vertex = self.vertex_at(index)?;
            let action = LocalAction::DeleteVertex { index, vertex };
            action.apply_redo(&mut self.chain)?;
            host.on_local_action(&action);
            log::debug!("Committed: {}", action.description());
            self.history.push(action);
        }
        self.selection.clear();
        self.sync_preview();
        host.on_vertices_change(&self.chain.vertices, self.chain.closed);
        Ok(())
    }

    fn break_chain(&mut self, host: &mut dyn EditorHost) -> EngineResult<()> {
        if self.profile.closed_only {
            log::debug!("Chain break ignored, profile keeps the chain closed");
            return Ok(());
        }
        let Some(index) = self.selection.min_vertex() else {
            return Ok(());
        };
        if self.chain.closed {
            if !self.chain.open_at(index) {
                log::debug!("Opening chain at vertex {index} rejected");
                return Ok(());
            }
            log::info!("Opened chain {} at vertex {index}", self.chain.id);
            self.after_break(host);
            return Ok(());
        }
        let Some((head, tail)) = self.chain.split_open_at(index) else {
            log::debug!("Splitting chain at vertex {index} rejected");
            return Ok(());
        };
        log::info!(
            "Split chain {} at vertex {index}, detached chain {}",
            head.id,
            tail.id
        );
        self.chain = head;
        // Recorded indices no longer describe the surviving chain.
        self.selection.clear();
        self.history.clear();
        self.sync_preview();
        host.on_chain_split(index, &tail);
        host.on_vertices_change(&self.chain.vertices, self.chain.closed);
        Ok(())
    }

    fn after_break(&mut self, host: &mut dyn EditorHost) {
        self.selection.clear();
        self.history.clear();
        self.sync_preview();
        host.on_vertices_change(&self.chain.vertices, self.chain.closed);
    }

    fn escape(&mut self, host: &mut dyn EditorHost) {
        if !matches!(self.gesture, Gesture::Idle) {
            self.gesture = Gesture::Idle;
            self.selection.take_marquee();
            self.insert_preview = None;
            self.sync_preview();
        } else if !self.selection.is_empty() {
            self.selection.clear();
        } else {
            host.on_cancel();
        }
    }

    fn update_insert_marker(&mut self, world: Point, modifiers: Modifiers) -> EngineResult<()> {
        if !modifiers.shift {
            self.insert_preview = None;
            return Ok(());
        }
        let HitTarget::Line(line) = self.hit_test(world) else {
            self.insert_preview = None;
            return Ok(());
        };
        let (first, second) = self.chain.line_endpoints(line);
        let a = self.vertex_at(first)?.position;
        let b = self.vertex_at(second)?.position;
        let projected = project_point_to_segment(world, a, b)?;
        self.insert_preview = Some(snap(projected, &self.grid, resolve_snap_mode(modifiers)));
        Ok(())
    }

    fn commit(&mut self, action: LocalAction, host: &mut dyn EditorHost) -> EngineResult<()> {
        action.apply_redo(&mut self.chain)?;
        host.on_local_action(&action);
        log::debug!("Committed: {}", action.description());
        self.history.push(action);
        self.selection
            .retain_valid(self.chain.len(), self.chain.line_count());
        self.sync_preview();
        host.on_vertices_change(&self.chain.vertices, self.chain.closed);
        Ok(())
    }

    fn after_replay(&mut self, host: &mut dyn EditorHost) {
        self.selection
            .retain_valid(self.chain.len(), self.chain.line_count());
        self.sync_preview();
        host.on_vertices_change(&self.chain.vertices, self.chain.closed);
    }

    fn sync_preview(&mut self) {
        self.preview = self.chain.vertices.clone();
    }

    fn preview_line_count(&self) -> usize {
        if self.chain.closed {
            self.preview.len()
        } else {
            self.preview.len().saturating_sub(1)
        }
    }

    fn vertex_at(&self, index: usize) -> Result<Vertex, ActionError> {
        self.chain
            .vertices
            .get(index)
            .copied()
            .ok_or(ActionError::IndexOutOfRange {
                index,
                len: self.chain.len(),
            })
    }
}
