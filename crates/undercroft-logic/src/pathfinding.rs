//! Reachability over the doorway graph.
//!
//! `LayoutGraph` holds an adjacency list built from doorways. Rooms and
//! corridors are both nodes; a doorway is an undirected edge between its
//! owner and the space it opens into.

use crate::doorways::{Doorway, SpaceId};
use std::collections::{HashMap, HashSet, VecDeque};

pub struct LayoutGraph {
    adj: HashMap<SpaceId, Vec<SpaceId>>,
}

impl LayoutGraph {
    pub fn from_doorways(doorways: &[Doorway]) -> Self {
        let mut adj: HashMap<SpaceId, Vec<SpaceId>> = HashMap::new();
        for d in doorways {
            adj.entry(d.owner).or_default().push(d.connecting);
            adj.entry(d.connecting).or_default().push(d.owner);
        }
        for neighbors in adj.values_mut() {
            neighbors.sort();
            neighbors.dedup();
        }
        Self { adj }
    }

    pub fn neighbors(&self, id: SpaceId) -> &[SpaceId] {
        self.adj.get(&id).map(|v| v.as_slice()).unwrap_or(&[])
    }

    /// Every space reachable from `start`, `start` included.
    pub fn reachable_from(&self, start: SpaceId) -> HashSet<SpaceId> {
        let mut visited = HashSet::new();
        let mut queue = VecDeque::new();
        visited.insert(start);
        queue.push_back(start);
        while let Some(current) = queue.pop_front() {
            for &next in self.neighbors(current) {
                if visited.insert(next) {
                    queue.push_back(next);
                }
            }
        }
        visited
    }

    /// Rooms `0..room_count` that cannot be reached from `start`.
    pub fn unreachable_rooms(&self, start: SpaceId, room_count: usize) -> Vec<usize> {
        let reached = self.reachable_from(start);
        (0..room_count)
            .filter(|i| !reached.contains(&SpaceId::Room(*i)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::{Direction, Interval};

    fn door(owner: usize, connecting: SpaceId) -> Doorway {
        Doorway {
            span: Interval::new(0.0, 6.0),
            direction: Direction::North,
            owner: SpaceId::Corridor(owner),
            connecting,
        }
    }

    /// Room 0 -c0- Room 1 -c1- Room 2, room 3 isolated.
    fn linear_graph() -> LayoutGraph {
        LayoutGraph::from_doorways(&[
            door(0, SpaceId::Room(0)),
            door(0, SpaceId::Room(1)),
            door(1, SpaceId::Room(1)),
            door(1, SpaceId::Room(2)),
        ])
    }

    #[test]
    fn test_unreachable() {
        let g = linear_graph();
        assert_eq!(g.unreachable_rooms(SpaceId::Room(0), 4), vec![3]);
        assert!(g.neighbors(SpaceId::Room(3)).is_empty());
    }

    #[test]
    fn test_duplicate_doorways_collapse() {
        let g = LayoutGraph::from_doorways(&[
            door(0, SpaceId::Corridor(1)),
            Doorway {
                owner: SpaceId::Corridor(1),
                connecting: SpaceId::Corridor(0),
                ..door(1, SpaceId::Corridor(0))
            },
        ]);
        assert_eq!(g.neighbors(SpaceId::Corridor(0)), &[SpaceId::Corridor(1)]);
    }

    #[test]
    fn test_reachable_includes_start() {
        let g = linear_graph();
        let reached = g.reachable_from(SpaceId::Room(0));
        assert_eq!(reached.len(), 5);
        assert!(reached.contains(&SpaceId::Room(0)));
    }
}
