//! Edge-chain shape model: vertices, profiles, and structural operators.

use kurbo::Point;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an edge chain.
pub type ChainId = Uuid;

/// One vertex of an edge chain: a world point plus an optional height carried
/// by wall-like chains. Region vertices leave the height unset.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Vertex {
    pub position: Point,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
}

impl Vertex {
    pub fn new(position: Point) -> Self {
        Self {
            position,
            height: None,
        }
    }

    pub fn with_height(position: Point, height: f64) -> Self {
        Self {
            position,
            height: Some(height),
        }
    }
}

/// Capability descriptor selecting wall-like or region-like behavior for an
/// editing session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChainProfile {
    /// The chain may never be opened or split.
    pub closed_only: bool,
    /// Vertices carry a per-vertex height.
    pub vertex_height: bool,
    /// Background clicks may activate a sibling chain.
    pub chain_switching: bool,
}

impl ChainProfile {
    /// Open-or-closed polyline with per-vertex heights.
    pub const WALL: Self = Self {
        closed_only: false,
        vertex_height: true,
        chain_switching: false,
    };

    /// Closed polygon that participates in click-through chain switching.
    pub const REGION: Self = Self {
        closed_only: true,
        vertex_height: false,
        chain_switching: true,
    };
}

/// Ordered sequence of vertices forming an open polyline or a closed polygon.
///
/// Structural invariants: a closed chain holds at least 3 vertices, an open
/// chain at least 2; indices are contiguous; a closed chain has an implicit
/// wrap edge from the last vertex back to the first. The mutation operators
/// below reject structural edits that would break these invariants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeChain {
    pub id: ChainId,
    pub vertices: Vec<Vertex>,
    pub closed: bool,
}

impl EdgeChain {
    pub fn new(vertices: Vec<Vertex>, closed: bool) -> Self {
        Self {
            id: ChainId::new_v4(),
            vertices,
            closed,
        }
    }

    /// Build a chain from bare points, without heights.
    pub fn from_points(points: &[Point], closed: bool) -> Self {
        Self::new(points.iter().copied().map(Vertex::new).collect(), closed)
    }

    /// Minimum vertex count a chain of the given topology must keep.
    pub fn min_vertex_count(closed: bool) -> usize {
        if closed { 3 } else { 2 }
    }

    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Vertex positions without heights.
    pub fn positions(&self) -> Vec<Point> {
        self.vertices.iter().map(|v| v.position).collect()
    }

    /// Number of line segments: `n` when closed (wrap edge included),
    /// `n - 1` when open.
    pub fn line_count(&self) -> usize {
        if self.closed {
            self.vertices.len()
        } else {
            self.vertices.len().saturating_sub(1)
        }
    }

    /// Endpoint indices of a line. The wrap line of a closed chain connects
    /// the last vertex back to index 0. `line` must be below `line_count`.
    pub fn line_endpoints(&self, line: usize) -> (usize, usize) {
        (line, (line + 1) % self.vertices.len())
    }

    /// Whether removing `count` vertices keeps the structural minimum.
    pub fn can_remove(&self, count: usize) -> bool {
        self.vertices
            .len()
            .checked_sub(count)
            .is_some_and(|rest| rest >= Self::min_vertex_count(self.closed))
    }

    /// Splice a vertex in at `index`. Insertion cannot violate the minimum
    /// count, so it always succeeds. `index` must be at most `len`.
    pub fn insert_vertex(&mut self, index: usize, vertex: Vertex) {
        self.vertices.insert(index, vertex);
    }

    /// Remove the given vertex indices, descending so later removals do not
    /// shift earlier ones. Returns false (chain untouched) when the result
    /// would drop below the structural minimum. Out-of-range and duplicate
    /// indices are ignored.
    pub fn delete_vertices(&mut self, indices: &[usize]) -> bool {
        let mut sorted: Vec<usize> = indices
            .iter()
            .copied()
            .filter(|&i| i < self.vertices.len())
            .collect();
        sorted.sort_unstable_by(|a, b| b.cmp(a));
        sorted.dedup();
        if !self.can_remove(sorted.len()) {
            return false;
        }
        for index in sorted {
            self.vertices.remove(index);
        }
        true
    }

    /// Split an open chain at an interior vertex into two open chains that
    /// share the boundary vertex. The head keeps this chain's id, the tail
    /// gets a fresh one. Rejected (`None`) for closed chains and whenever
    /// either half would fall below 2 vertices.
    pub fn split_open_at(&self, index: usize) -> Option<(EdgeChain, EdgeChain)> {
        if self.closed || index == 0 || index + 1 >= self.vertices.len() {
            return None;
        }
        let head = self.vertices[..=index].to_vec();
        let tail = self.vertices[index..].to_vec();
        Some((
            EdgeChain {
                id: self.id,
                vertices: head,
                closed: false,
            },
            EdgeChain {
                id: ChainId::new_v4(),
                vertices: tail,
                closed: false,
            },
        ))
    }

    /// Open a closed chain at a vertex. Below the last index the vertex list
    /// rotates so `index` becomes position 0 and the break vertex repeats at
    /// the tail, preserving every original edge (the old wrap edge turns into
    /// an interior one). At the last index the vertex is removed instead and
    /// the remaining run opens. Returns false for open chains and
    /// out-of-range indices.
    pub fn open_at(&mut self, index: usize) -> bool {
        if !self.closed || index >= self.vertices.len() {
            return false;
        }
        if index + 1 == self.vertices.len() {
            if self.vertices.len() - 1 < Self::min_vertex_count(false) {
                return false;
            }
            self.vertices.pop();
        } else {
            let mut rotated = Vec::with_capacity(self.vertices.len() + 1);
            rotated.extend_from_slice(&self.vertices[index..]);
            rotated.extend_from_slice(&self.vertices[..=index]);
            self.vertices = rotated;
        }
        self.closed = false;
        true
    }

    /// Serialize the chain to a JSON snapshot.
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    /// Restore a chain from a JSON snapshot.
    pub fn from_json(json: &str) -> serde_json::Result<EdgeChain> {
        serde_json::from_str(json)
    }
}
