//! Doorway detection.
//!
//! A doorway exists wherever a corridor's edge faces another space's
//! opposite edge within [`ADJACENCY`](crate::constants::tolerances::ADJACENCY)
//! and the two edges overlap along their length. Doorways are transient:
//! they are recomputed per generation run and consumed by wall synthesis,
//! connectivity checks and the layout's free-edge search.

use crate::constants::tolerances::ADJACENCY;
use crate::space::{Direction, Interval, Space};
use serde::{Deserialize, Serialize};

/// Identity of a space within a floor: index into the room list or the
/// corridor list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpaceId {
    Room(usize),
    Corridor(usize),
}

/// An opening between two spaces.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Doorway {
    /// Extent along the shared edge.
    pub span: Interval,
    /// Which edge of `owner` the opening is on.
    pub direction: Direction,
    /// Always a corridor.
    pub owner: SpaceId,
    pub connecting: SpaceId,
}

impl Doorway {
    /// Whether this doorway opens `side` of `space`, seen from either end.
    pub fn opens(&self, space: SpaceId, side: Direction) -> bool {
        (self.owner == space && self.direction == side)
            || (self.connecting == space && self.direction.opposite() == side)
    }
}

/// Every edge of `owner` that faces an edge of `other` closely enough to
/// open into it, with the shared span.
pub fn openings(owner: &Space, other: &Space) -> Vec<(Direction, Interval)> {
    Direction::ALL
        .into_iter()
        .filter_map(|side| {
            let (line, span) = owner.edge(side);
            let (other_line, other_span) = other.edge(side.opposite());
            if (line - other_line).abs() > ADJACENCY {
                return None;
            }
            span.overlap(&other_span).map(|shared| (side, shared))
        })
        .collect()
}

/// Whether any corridor opens onto `side` of `room`.
pub fn has_opening(room: &Space, side: Direction, corridors: &[Space]) -> bool {
    corridors
        .iter()
        .any(|c| openings(room, c).iter().any(|(s, _)| *s == side))
}

/// Detect every doorway on a floor.
///
/// Each corridor is tested against every room and every other corridor.
/// Corridor pairs are tested in both orders, so each corridor-to-corridor
/// opening appears twice, once per owner.
pub fn detect(rooms: &[Space], corridors: &[Space]) -> Vec<Doorway> {
    let mut doorways = Vec::new();
    for (ci, corridor) in corridors.iter().enumerate() {
        let owner = SpaceId::Corridor(ci);
        let others = rooms
            .iter()
            .enumerate()
            .map(|(i, s)| (SpaceId::Room(i), s))
            .chain(
                corridors
                    .iter()
                    .enumerate()
                    .filter(|(i, _)| *i != ci)
                    .map(|(i, s)| (SpaceId::Corridor(i), s)),
            );
        for (connecting, other) in others {
            for (direction, span) in openings(corridor, other) {
                doorways.push(Doorway {
                    span,
                    direction,
                    owner,
                    connecting,
                });
            }
        }
    }
    doorways
}

/// Spans of every doorway opening `side` of `space`.
pub fn spans_on(doorways: &[Doorway], space: SpaceId, side: Direction) -> Vec<Interval> {
    doorways
        .iter()
        .filter(|d| d.opens(space, side))
        .map(|d| d.span)
        .collect()
}

/// Clip spans to `edge`, drop what falls outside, and merge overlapping or
/// touching spans. The result is sorted and disjoint.
pub fn merge_spans(spans: &[Interval], edge: Interval) -> Vec<Interval> {
    let mut clipped: Vec<Interval> = spans
        .iter()
        .map(|s| Interval::new(s.start.max(edge.start), s.end.min(edge.end)))
        .filter(|s| !s.is_empty())
        .collect();
    clipped.sort_by(|a, b| a.start.total_cmp(&b.start));

    let mut merged: Vec<Interval> = Vec::with_capacity(clipped.len());
    for span in clipped {
        match merged.last_mut() {
            Some(last) if span.start <= last.end => last.end = last.end.max(span.end),
            _ => merged.push(span),
        }
    }
    merged
}
