//! Reversible local actions recorded for every committed mutation.
//!
//! Actions store indices plus before/after data, never chain snapshots; the
//! chain they operate on is supplied at replay time, so an action stays
//! valid when the chain has since been mutated through other actions.

use kurbo::Point;
use thiserror::Error;

use crate::chain::{EdgeChain, Vertex};

/// Errors raised when an action is built from or replayed against an
/// incompatible chain state.
#[derive(Debug, Error, PartialEq)]
pub enum ActionError {
    /// A multi-move was built with no vertices.
    #[error("multi-move requires at least one vertex")]
    EmptyMoveSet,
    /// A stored index no longer exists in the chain.
    #[error("vertex index {index} is out of range (chain has {len} vertices)")]
    IndexOutOfRange { index: usize, len: usize },
    /// A line's endpoints collapse onto one vertex at the current length.
    #[error("line {0} is degenerate at the current chain length")]
    DegenerateLine(usize),
    /// Replaying the removal would drop the chain below its minimum.
    #[error("removing vertex {0} would drop the chain below its structural minimum")]
    BelowMinimum(usize),
    /// Undoing a placement against a chain with no vertices.
    #[error("cannot pop a placed vertex from an empty chain")]
    EmptyChain,
}

/// One vertex's contribution to a group move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VertexMove {
    pub index: usize,
    pub before: Point,
    pub after: Point,
}

/// A committed, reversible mutation of the active chain.
#[derive(Debug, Clone, PartialEq)]
pub enum LocalAction {
    /// A vertex appended to the chain end while authoring.
    PlaceVertex { vertex: Vertex },
    /// A single vertex moved between two positions.
    MoveVertex {
        index: usize,
        before: Point,
        after: Point,
    },
    /// A group of vertices moved by one shared drag.
    MultiMoveVertex { moves: Vec<VertexMove> },
    /// A vertex spliced in at `index`.
    InsertVertex { index: usize, vertex: Vertex },
    /// The vertex previously at `index` removed.
    DeleteVertex { index: usize, vertex: Vertex },
    /// Both endpoints of a line moved rigidly.
    MoveLine {
        line: usize,
        before: (Point, Point),
        after: (Point, Point),
    },
}

impl LocalAction {
    /// Build a group move; rejected when empty.
    pub fn multi_move(moves: Vec<VertexMove>) -> Result<Self, ActionError> {
        if moves.is_empty() {
            return Err(ActionError::EmptyMoveSet);
        }
        Ok(LocalAction::MultiMoveVertex { moves })
    }

    /// Human-readable label for host timelines and logging.
    pub fn description(&self) -> String {
        match self {
            LocalAction::PlaceVertex { .. } => "Place vertex".to_string(),
            LocalAction::MoveVertex { index, .. } => format!("Move vertex {index}"),
            LocalAction::MultiMoveVertex { moves } => {
                format!("Move {} vertices", moves.len())
            }
            LocalAction::InsertVertex { index, .. } => format!("Insert vertex at {index}"),
            LocalAction::DeleteVertex { index, .. } => format!("Delete vertex {index}"),
            LocalAction::MoveLine { line, .. } => format!("Move line {line}"),
        }
    }

    /// Reverse this action against the current chain.
    pub fn apply_undo(&self, chain: &mut EdgeChain) -> Result<(), ActionError> {
        match self {
            LocalAction::PlaceVertex { .. } => {
                if chain.vertices.pop().is_none() {
                    return Err(ActionError::EmptyChain);
                }
                Ok(())
            }
            LocalAction::MoveVertex { index, before, .. } => set_position(chain, *index, *before),
            LocalAction::MultiMoveVertex { moves } => {
                for vertex_move in moves {
                    set_position(chain, vertex_move.index, vertex_move.before)?;
                }
                Ok(())
            }
            LocalAction::InsertVertex { index, .. } => remove_at(chain, *index).map(|_| ()),
            LocalAction::DeleteVertex { index, vertex } => insert_at(chain, *index, *vertex),
            LocalAction::MoveLine { line, before, .. } => set_line(chain, *line, *before),
        }
    }

    /// Reapply this action against the current chain.
    pub fn apply_redo(&self, chain: &mut EdgeChain) -> Result<(), ActionError> {
        match self {
            LocalAction::PlaceVertex { vertex } => {
                chain.vertices.push(*vertex);
                Ok(())
            }
            LocalAction::MoveVertex { index, after, .. } => set_position(chain, *index, *after),
            LocalAction::MultiMoveVertex { moves } => {
                for vertex_move in moves {
                    set_position(chain, vertex_move.index, vertex_move.after)?;
                }
                Ok(())
            }
            LocalAction::InsertVertex { index, vertex } => insert_at(chain, *index, *vertex),
            LocalAction::DeleteVertex { index, .. } => {
                if !chain.can_remove(1) {
                    return Err(ActionError::BelowMinimum(*index));
                }
                remove_at(chain, *index).map(|_| ())
            }
            LocalAction::MoveLine { line, after, .. } => set_line(chain, *line, *after),
        }
    }
}

fn set_position(chain: &mut EdgeChain, index: usize, position: Point) -> Result<(), ActionError> {
    let len = chain.len();
    let vertex = chain
        .vertices
        .get_mut(index)
        .ok_or(ActionError::IndexOutOfRange { index, len })?;
    vertex.position = position;
    Ok(())
}

fn insert_at(chain: &mut EdgeChain, index: usize, vertex: Vertex) -> Result<(), ActionError> {
    if index > chain.len() {
        return Err(ActionError::IndexOutOfRange {
            index,
            len: chain.len(),
        });
    }
    chain.insert_vertex(index, vertex);
    Ok(())
}

fn remove_at(chain: &mut EdgeChain, index: usize) -> Result<Vertex, ActionError> {
    if index >= chain.len() {
        return Err(ActionError::IndexOutOfRange {
            index,
            len: chain.len(),
        });
    }
    Ok(chain.vertices.remove(index))
}

/// Write both endpoint positions of a line, deriving the second endpoint
/// from the chain length at replay time.
fn set_line(chain: &mut EdgeChain, line: usize, positions: (Point, Point)) -> Result<(), ActionError> {
    let len = chain.len();
    if line >= len {
        return Err(ActionError::IndexOutOfRange { index: line, len });
    }
    let second = (line + 1) % len;
    if second == line {
        return Err(ActionError::DegenerateLine(line));
    }
    chain.vertices[line].position = positions.0;
    chain.vertices[second].position = positions.1;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_chain() -> EdgeChain {
        EdgeChain::from_points(
            &[
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(200.0, 0.0),
                Point::new(300.0, 0.0),
            ],
            false,
        )
    }

    #[test]
    fn test_move_vertex_round_trip() {
        let mut chain = open_chain();
        let original = chain.clone();
        let action = LocalAction::MoveVertex {
            index: 1,
            before: Point::new(100.0, 0.0),
            after: Point::new(120.0, 30.0),
        };

        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.vertices[1].position, Point::new(120.0, 30.0));

        action.apply_undo(&mut chain).unwrap();
        assert_eq!(chain, original);
    }

    #[test]
    fn test_undo_redo_undo_is_undo() {
        let mut chain = open_chain();
        let action = LocalAction::MoveVertex {
            index: 2,
            before: Point::new(200.0, 0.0),
            after: Point::new(250.0, 50.0),
        };
        action.apply_redo(&mut chain).unwrap();

        let mut once = chain.clone();
        action.apply_undo(&mut once).unwrap();

        let mut thrice = chain.clone();
        action.apply_undo(&mut thrice).unwrap();
        action.apply_redo(&mut thrice).unwrap();
        action.apply_undo(&mut thrice).unwrap();

        assert_eq!(once, thrice);
    }

    #[test]
    fn test_move_preserves_height() {
        let mut chain = EdgeChain::new(
            vec![
                Vertex::with_height(Point::new(0.0, 0.0), 9.0),
                Vertex::with_height(Point::new(50.0, 0.0), 4.0),
            ],
            false,
        );
        let action = LocalAction::MoveVertex {
            index: 1,
            before: Point::new(50.0, 0.0),
            after: Point::new(75.0, 25.0),
        };
        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.vertices[1].height, Some(4.0));
        action.apply_undo(&mut chain).unwrap();
        assert_eq!(chain.vertices[1].height, Some(4.0));
    }

    #[test]
    fn test_multi_move_applies_every_vertex() {
        let mut chain = open_chain();
        let moves = vec![
            VertexMove {
                index: 0,
                before: Point::new(0.0, 0.0),
                after: Point::new(10.0, 20.0),
            },
            VertexMove {
                index: 3,
                before: Point::new(300.0, 0.0),
                after: Point::new(310.0, 20.0),
            },
        ];
        let action = LocalAction::multi_move(moves).unwrap();

        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.vertices[0].position, Point::new(10.0, 20.0));
        assert_eq!(chain.vertices[1].position, Point::new(100.0, 0.0));
        assert_eq!(chain.vertices[3].position, Point::new(310.0, 20.0));

        action.apply_undo(&mut chain).unwrap();
        assert_eq!(chain.positions(), open_chain().positions());
    }

    #[test]
    fn test_multi_move_rejects_empty() {
        assert_eq!(
            LocalAction::multi_move(Vec::new()),
            Err(ActionError::EmptyMoveSet)
        );
    }

    #[test]
    fn test_insert_round_trip() {
        let mut chain = open_chain();
        let action = LocalAction::InsertVertex {
            index: 2,
            vertex: Vertex::new(Point::new(150.0, 0.0)),
        };
        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.len(), 5);
        assert_eq!(chain.vertices[2].position, Point::new(150.0, 0.0));

        action.apply_undo(&mut chain).unwrap();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.vertices[2].position, Point::new(200.0, 0.0));
    }

    #[test]
    fn test_delete_actions_restore_indices_in_order() {
        let mut chain = open_chain();
        // Removal order is descending: index 3 first, then index 1.
        let first = LocalAction::DeleteVertex {
            index: 3,
            vertex: chain.vertices[3],
        };
        let second = LocalAction::DeleteVertex {
            index: 1,
            vertex: chain.vertices[1],
        };
        first.apply_redo(&mut chain).unwrap();
        second.apply_redo(&mut chain).unwrap();
        assert_eq!(
            chain.positions(),
            vec![Point::new(0.0, 0.0), Point::new(200.0, 0.0)]
        );

        // Undo runs in reverse push order, restoring ascending indices.
        second.apply_undo(&mut chain).unwrap();
        first.apply_undo(&mut chain).unwrap();
        assert_eq!(
            chain.positions(),
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(200.0, 0.0),
                Point::new(300.0, 0.0),
            ]
        );
    }

    #[test]
    fn test_delete_redo_respects_minimum() {
        let mut chain = EdgeChain::from_points(
            &[Point::new(0.0, 0.0), Point::new(50.0, 0.0)],
            false,
        );
        let action = LocalAction::DeleteVertex {
            index: 1,
            vertex: chain.vertices[1],
        };
        assert_eq!(
            action.apply_redo(&mut chain),
            Err(ActionError::BelowMinimum(1))
        );
        assert_eq!(chain.len(), 2);
    }

    #[test]
    fn test_move_line_round_trip() {
        let mut chain = open_chain();
        let action = LocalAction::MoveLine {
            line: 0,
            before: (Point::new(0.0, 0.0), Point::new(100.0, 0.0)),
            after: (Point::new(20.0, 30.0), Point::new(120.0, 30.0)),
        };
        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.vertices[0].position, Point::new(20.0, 30.0));
        assert_eq!(chain.vertices[1].position, Point::new(120.0, 30.0));

        action.apply_undo(&mut chain).unwrap();
        assert_eq!(chain.vertices[0].position, Point::new(0.0, 0.0));
        assert_eq!(chain.vertices[1].position, Point::new(100.0, 0.0));
    }

    #[test]
    fn test_move_line_wraps_on_closed_chain() {
        let mut chain = EdgeChain::from_points(
            &[
                Point::new(0.0, 0.0),
                Point::new(100.0, 0.0),
                Point::new(50.0, 100.0),
            ],
            true,
        );
        let action = LocalAction::MoveLine {
            line: 2,
            before: (Point::new(50.0, 100.0), Point::new(0.0, 0.0)),
            after: (Point::new(60.0, 110.0), Point::new(10.0, 10.0)),
        };
        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.vertices[2].position, Point::new(60.0, 110.0));
        assert_eq!(chain.vertices[0].position, Point::new(10.0, 10.0));
    }

    #[test]
    fn test_replay_against_shrunken_chain_fails() {
        let mut chain = EdgeChain::from_points(
            &[Point::new(0.0, 0.0), Point::new(50.0, 0.0)],
            false,
        );
        let action = LocalAction::MoveVertex {
            index: 5,
            before: Point::new(0.0, 0.0),
            after: Point::new(1.0, 1.0),
        };
        assert_eq!(
            action.apply_redo(&mut chain),
            Err(ActionError::IndexOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn test_place_round_trip() {
        let mut chain = open_chain();
        let action = LocalAction::PlaceVertex {
            vertex: Vertex::new(Point::new(400.0, 0.0)),
        };
        action.apply_redo(&mut chain).unwrap();
        assert_eq!(chain.len(), 5);
        action.apply_undo(&mut chain).unwrap();
        assert_eq!(chain.len(), 4);
        assert_eq!(chain.vertices[3].position, Point::new(300.0, 0.0));
    }
}
