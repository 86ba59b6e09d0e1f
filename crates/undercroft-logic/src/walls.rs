//! Wall enclosure: split each edge around its doorways, fill corners with
//! pillars, and turn the result into axis-aligned colliders.

use crate::constants::{tolerances, SLAB_THICKNESS};
use crate::doorways::{merge_spans, spans_on, Doorway, SpaceId};
use crate::space::{Aabb, Direction, Interval, Point3, Space};
use serde::{Deserialize, Serialize};

/// A straight run of wall along one edge of a space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WallSegment {
    pub owner: SpaceId,
    pub side: Direction,
    /// Fixed coordinate of the edge (Z for north/south, X for east/west).
    pub line: f32,
    /// Extent along the edge.
    pub span: Interval,
}

impl WallSegment {
    pub fn length(&self) -> f32 {
        self.span.len()
    }

    /// Edge-centered box, `thickness` deep and `height` tall.
    pub fn collider(&self, height: f32, thickness: f32) -> Aabb {
        let half = thickness / 2.0;
        if self.side.runs_along_x() {
            Aabb::new(
                Point3::new(self.span.start, 0.0, self.line - half),
                Point3::new(self.span.end, height, self.line + half),
            )
        } else {
            Aabb::new(
                Point3::new(self.line - half, 0.0, self.span.start),
                Point3::new(self.line + half, height, self.span.end),
            )
        }
    }
}

/// Square infill at a space corner.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pillar {
    pub owner: SpaceId,
    pub x: f32,
    pub z: f32,
}

impl Pillar {
    pub fn collider(&self, height: f32, thickness: f32) -> Aabb {
        let half = thickness / 2.0;
        Aabb::new(
            Point3::new(self.x - half, 0.0, self.z - half),
            Point3::new(self.x + half, height, self.z + half),
        )
    }
}

/// Walls and pillars enclosing a set of spaces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Enclosure {
    pub walls: Vec<WallSegment>,
    pub pillars: Vec<Pillar>,
}

/// Gaps of `edge` not covered by `openings`, dropping anything shorter
/// than [`MIN_WALL_WIDTH`](tolerances::MIN_WALL_WIDTH).
pub fn split_edge(edge: Interval, openings: &[Interval]) -> Vec<Interval> {
    let mut walls = Vec::new();
    let mut cursor = edge.start;
    for opening in merge_spans(openings, edge) {
        if opening.start - cursor >= tolerances::MIN_WALL_WIDTH {
            walls.push(Interval::new(cursor, opening.start));
        }
        cursor = cursor.max(opening.end);
    }
    if edge.end - cursor >= tolerances::MIN_WALL_WIDTH {
        walls.push(Interval::new(cursor, edge.end));
    }
    walls
}

// Corner order matches `Space::corners`: NW, NE, SE, SW. Each corner is
// shared by one edge running along X and one running along Z.
const CORNER_SIDES: [(Direction, Direction); 4] = [
    (Direction::North, Direction::West),
    (Direction::North, Direction::East),
    (Direction::South, Direction::East),
    (Direction::South, Direction::West),
];

/// Corners of `space` that need a pillar: those with no doorway span on
/// either adjoining edge within `1.5 × wall_thickness`.
pub fn pillar_corners(
    id: SpaceId,
    space: &Space,
    doorways: &[Doorway],
    wall_thickness: f32,
) -> Vec<(f32, f32)> {
    let clearance = tolerances::CORNER_CLEARANCE_FACTOR * wall_thickness;
    space
        .corners()
        .into_iter()
        .zip(CORNER_SIDES)
        .filter(|&((x, z), (along_x, along_z))| {
            let near_x = spans_on(doorways, id, along_x)
                .iter()
                .any(|s| s.distance_to(x) <= clearance);
            let near_z = spans_on(doorways, id, along_z)
                .iter()
                .any(|s| s.distance_to(z) <= clearance);
            !near_x && !near_z
        })
        .map(|(corner, _)| corner)
        .collect()
}

/// Enclose one space given the doorways that touch it.
pub fn enclose_space(
    id: SpaceId,
    space: &Space,
    doorways: &[Doorway],
    wall_thickness: f32,
) -> Enclosure {
    let mut enclosure = Enclosure::default();
    for side in Direction::ALL {
        let (line, edge) = space.edge(side);
        let openings = spans_on(doorways, id, side);
        for span in split_edge(edge, &openings) {
            enclosure.walls.push(WallSegment {
                owner: id,
                side,
                line,
                span,
            });
        }
    }

    for (x, z) in pillar_corners(id, space, doorways, wall_thickness) {
        enclosure.pillars.push(Pillar { owner: id, x, z });
    }
    enclosure
}

/// Enclose every room and corridor on a floor.
pub fn enclose_all(
    rooms: &[Space],
    corridors: &[Space],
    doorways: &[Doorway],
    wall_thickness: f32,
) -> Enclosure {
    let spaces = rooms
        .iter()
        .enumerate()
        .map(|(i, s)| (SpaceId::Room(i), s))
        .chain(
            corridors
                .iter()
                .enumerate()
                .map(|(i, s)| (SpaceId::Corridor(i), s)),
        );
    let mut all = Enclosure::default();
    for (id, space) in spaces {
        let part = enclose_space(id, space, doorways, wall_thickness);
        all.walls.extend(part.walls);
        all.pillars.extend(part.pillars);
    }
    log::debug!(
        "enclosed {} spaces with {} walls and {} pillars",
        rooms.len() + corridors.len(),
        all.walls.len(),
        all.pillars.len()
    );
    all
}

/// Floor slab under a space and ceiling slab over it.
pub fn slabs(space: &Space, wall_height: f32) -> [Aabb; 2] {
    let y = space.floor_elevation();
    let (x0, x1) = (space.min_x(), space.max_x());
    let (z0, z1) = (space.min_z(), space.max_z());
    [
        Aabb::new(
            Point3::new(x0, y - SLAB_THICKNESS, z0),
            Point3::new(x1, y, z1),
        ),
        Aabb::new(
            Point3::new(x0, y + wall_height, z0),
            Point3::new(x1, y + wall_height + SLAB_THICKNESS, z1),
        ),
    ]
}

/// Every collider for a floor: walls, pillars, then one floor and one
/// ceiling slab per space.
pub fn colliders(
    enclosure: &Enclosure,
    spaces: &[Space],
    wall_height: f32,
    wall_thickness: f32,
) -> Vec<Aabb> {
    let count = enclosure.walls.len() + enclosure.pillars.len() + spaces.len() * 2;
    let mut out = Vec::with_capacity(count);
    out.extend(
        enclosure
            .walls
            .iter()
            .map(|w| w.collider(wall_height, wall_thickness)),
    );
    out.extend(
        enclosure
            .pillars
            .iter()
            .map(|p| p.collider(wall_height, wall_thickness)),
    );
    for space in spaces {
        out.extend(slabs(space, wall_height));
    }
    out
}
