//! Selection state: vertex index set, selected line, transient marquee.

use std::collections::BTreeSet;

use kurbo::Point;

/// Rubber-band rectangle in screen space, alive for one pointer gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Marquee {
    pub start: Point,
    pub end: Point,
}

impl Marquee {
    /// A drag under `threshold` pixels in both axes counts as a plain
    /// background click, not a marquee selection.
    pub fn is_simple_click(&self, threshold: f64) -> bool {
        (self.end.x - self.start.x).abs() < threshold
            && (self.end.y - self.start.y).abs() < threshold
    }
}

/// Current selection within the active chain.
///
/// Selecting a line always mirrors its two endpoint indices into the vertex
/// set, so deletion and group moves can treat both selection kinds uniformly.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SelectionState {
    vertices: BTreeSet<usize>,
    line: Option<usize>,
    marquee: Option<Marquee>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn vertices(&self) -> &BTreeSet<usize> {
        &self.vertices
    }

    pub fn line(&self) -> Option<usize> {
        self.line
    }

    pub fn marquee(&self) -> Option<Marquee> {
        self.marquee
    }

    pub fn contains_vertex(&self, index: usize) -> bool {
        self.vertices.contains(&index)
    }

    pub fn selected_count(&self) -> usize {
        self.vertices.len()
    }

    /// Smallest selected vertex index, if any.
    pub fn min_vertex(&self) -> Option<usize> {
        self.vertices.iter().next().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty() && self.line.is_none()
    }

    /// Plain click: select exactly this vertex.
    pub fn select_vertex(&mut self, index: usize) {
        self.vertices.clear();
        self.vertices.insert(index);
        self.line = None;
    }

    /// Modified click: toggle this vertex in the current set.
    pub fn toggle_vertex(&mut self, index: usize) {
        if !self.vertices.remove(&index) {
            self.vertices.insert(index);
        }
        self.line = None;
    }

    /// Select a line; its endpoints become the vertex set.
    pub fn select_line(&mut self, line: usize, chain_len: usize) {
        self.line = Some(line);
        self.vertices.clear();
        self.vertices.insert(line);
        self.vertices.insert((line + 1) % chain_len);
    }

    /// Replace the vertex set wholesale (marquee resolution).
    pub fn set_vertices(&mut self, vertices: BTreeSet<usize>) {
        self.vertices = vertices;
        self.line = None;
    }

    pub fn clear(&mut self) {
        self.vertices.clear();
        self.line = None;
        self.marquee = None;
    }

    pub fn begin_marquee(&mut self, start: Point) {
        self.marquee = Some(Marquee { start, end: start });
    }

    pub fn update_marquee(&mut self, end: Point) {
        if let Some(marquee) = &mut self.marquee {
            marquee.end = end;
        }
    }

    /// End the marquee gesture, handing the final rectangle to the caller.
    pub fn take_marquee(&mut self) -> Option<Marquee> {
        self.marquee.take()
    }

    /// Drop selection entries that no longer index into the chain, after a
    /// structural change or history replay.
    pub fn retain_valid(&mut self, chain_len: usize, line_count: usize) {
        self.vertices.retain(|&i| i < chain_len);
        if self.line.is_some_and(|line| line >= line_count) {
            self.line = None;
        }
    }
}
