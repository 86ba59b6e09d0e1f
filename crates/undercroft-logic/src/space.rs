//! Spaces: the axis-aligned rectangles every floor is built from.
//!
//! A [`Space`] is either a room or a corridor segment. `(x, z)` is the
//! minimum corner; `width` runs along +X and `depth` along +Z. North is −Z,
//! south is +Z, east is +X, west is −X.

use crate::constants::tolerances;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// What role a space plays in the layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// The center room the player starts in.
    Spawn,
    /// Satellite attached directly to the spawn room.
    Radial,
    /// Diagonal satellite attached to a radial room.
    Cardinal,
    /// Satellite further out along a radial axis.
    CardinalPlus,
    /// Small dead-end room off an unconnected edge.
    Alcove,
    Corridor,
    Normal,
}

impl Classification {
    /// Preference when choosing an exit room; higher wins ties.
    pub fn exit_preference(self) -> u8 {
        match self {
            Classification::CardinalPlus => 3,
            Classification::Cardinal => 2,
            Classification::Radial => 1,
            _ => 0,
        }
    }
}

/// Edge of a space, or the facing of a doorway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    North,
    South,
    East,
    West,
}

impl Direction {
    pub const ALL: [Direction; 4] = [
        Direction::North,
        Direction::South,
        Direction::East,
        Direction::West,
    ];

    pub fn opposite(self) -> Direction {
        match self {
            Direction::North => Direction::South,
            Direction::South => Direction::North,
            Direction::East => Direction::West,
            Direction::West => Direction::East,
        }
    }

    /// North/south edges run along X; east/west edges run along Z.
    pub fn runs_along_x(self) -> bool {
        matches!(self, Direction::North | Direction::South)
    }

    /// Unit step on the XZ plane pointing out of an edge.
    pub fn outward(self) -> (f32, f32) {
        match self {
            Direction::North => (0.0, -1.0),
            Direction::South => (0.0, 1.0),
            Direction::East => (1.0, 0.0),
            Direction::West => (-1.0, 0.0),
        }
    }
}

/// A point in world space. Y is up.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Point3 {
    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    /// Distance ignoring height.
    pub fn horizontal_distance(&self, other: &Point3) -> f32 {
        let dx = self.x - other.x;
        let dz = self.z - other.z;
        (dx * dx + dz * dz).sqrt()
    }
}

/// Axis-aligned bounding volume handed to the physics collaborator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Point3,
    pub max: Point3,
}

impl Aabb {
    pub fn new(min: Point3, max: Point3) -> Self {
        Self { min, max }
    }
}

/// A closed 1D range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Interval {
    pub start: f32,
    pub end: f32,
}

impl Interval {
    pub fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> f32 {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.len() <= 0.0
    }

    pub fn mid(&self) -> f32 {
        (self.start + self.end) / 2.0
    }

    /// Intersection, or `None` when the ranges only touch or are disjoint.
    pub fn overlap(&self, other: &Interval) -> Option<Interval> {
        let start = self.start.max(other.start);
        let end = self.end.min(other.end);
        if end - start > tolerances::EPSILON {
            Some(Interval { start, end })
        } else {
            None
        }
    }

    /// Whether `other` lies entirely inside this range.
    pub fn covers(&self, other: &Interval) -> bool {
        other.start >= self.start - tolerances::EPSILON
            && other.end <= self.end + tolerances::EPSILON
    }

    /// Distance from `v` to the nearest point of the range (0 inside).
    pub fn distance_to(&self, v: f32) -> f32 {
        if v < self.start {
            self.start - v
        } else if v > self.end {
            v - self.end
        } else {
            0.0
        }
    }
}

/// Errors raised when building a space from raw numbers.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SpaceError {
    #[error("space has non-positive size {width}×{depth}")]
    NonPositiveSize { width: f32, depth: f32 },
    #[error("space has a non-finite coordinate")]
    NonFinite,
}

/// A rectangular room or corridor segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Space {
    x: f32,
    z: f32,
    width: f32,
    depth: f32,
    floor_elevation: f32,
    sloped: bool,
    is_corridor: bool,
    classification: Classification,
}

impl Space {
    /// Build a room. Fails unless `width > 0 && depth > 0`.
    pub fn room(
        x: f32,
        z: f32,
        width: f32,
        depth: f32,
        classification: Classification,
    ) -> Result<Self, SpaceError> {
        Self::build(x, z, width, depth, false, classification)
    }

    /// Build a corridor segment.
    pub fn corridor(x: f32, z: f32, width: f32, depth: f32) -> Result<Self, SpaceError> {
        Self::build(x, z, width, depth, true, Classification::Corridor)
    }

    /// Build a room from its center point.
    pub fn centered(
        cx: f32,
        cz: f32,
        width: f32,
        depth: f32,
        classification: Classification,
    ) -> Result<Self, SpaceError> {
        Self::room(cx - width / 2.0, cz - depth / 2.0, width, depth, classification)
    }

    /// Build a corridor from its X and Z extents.
    pub fn corridor_between(xs: Interval, zs: Interval) -> Result<Self, SpaceError> {
        Self::corridor(xs.start, zs.start, xs.len(), zs.len())
    }

    fn build(
        x: f32,
        z: f32,
        width: f32,
        depth: f32,
        is_corridor: bool,
        classification: Classification,
    ) -> Result<Self, SpaceError> {
        if ![x, z, width, depth].iter().all(|v| v.is_finite()) {
            return Err(SpaceError::NonFinite);
        }
        if width <= 0.0 || depth <= 0.0 {
            return Err(SpaceError::NonPositiveSize { width, depth });
        }
        Ok(Self {
            x,
            z,
            width,
            depth,
            floor_elevation: 0.0,
            sloped: false,
            is_corridor,
            classification,
        })
    }

    /// Set the floor elevation at construction time.
    pub fn with_elevation(mut self, elevation: f32, sloped: bool) -> Self {
        self.floor_elevation = elevation;
        self.sloped = sloped;
        self
    }

    /// Flatten to elevation 0 and clear any slope.
    pub(crate) fn normalize_elevation(&mut self) {
        self.floor_elevation = 0.0;
        self.sloped = false;
    }

    pub fn x(&self) -> f32 {
        self.x
    }
    pub fn z(&self) -> f32 {
        self.z
    }
    pub fn width(&self) -> f32 {
        self.width
    }
    pub fn depth(&self) -> f32 {
        self.depth
    }
    pub fn floor_elevation(&self) -> f32 {
        self.floor_elevation
    }
    pub fn is_sloped(&self) -> bool {
        self.sloped
    }
    pub fn is_corridor(&self) -> bool {
        self.is_corridor
    }
    pub fn classification(&self) -> Classification {
        self.classification
    }

    pub fn min_x(&self) -> f32 {
        self.x
    }
    pub fn max_x(&self) -> f32 {
        self.x + self.width
    }
    pub fn min_z(&self) -> f32 {
        self.z
    }
    pub fn max_z(&self) -> f32 {
        self.z + self.depth
    }

    pub fn x_range(&self) -> Interval {
        Interval::new(self.min_x(), self.max_x())
    }

    pub fn z_range(&self) -> Interval {
        Interval::new(self.min_z(), self.max_z())
    }

    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    pub fn center_z(&self) -> f32 {
        self.z + self.depth / 2.0
    }

    /// Horizontal center at floor level.
    pub fn center(&self) -> Point3 {
        Point3::new(self.center_x(), self.floor_elevation, self.center_z())
    }

    pub fn longest_edge(&self) -> f32 {
        self.width.max(self.depth)
    }

    /// Fixed coordinate of an edge and the interval it spans.
    ///
    /// North/south edges sit at a Z and span X; east/west sit at an X and
    /// span Z.
    pub fn edge(&self, side: Direction) -> (f32, Interval) {
        match side {
            Direction::North => (self.min_z(), self.x_range()),
            Direction::South => (self.max_z(), self.x_range()),
            Direction::East => (self.max_x(), self.z_range()),
            Direction::West => (self.min_x(), self.z_range()),
        }
    }

    /// Corner points in order NW, NE, SE, SW as `(x, z)`.
    pub fn corners(&self) -> [(f32, f32); 4] {
        [
            (self.min_x(), self.min_z()),
            (self.max_x(), self.min_z()),
            (self.max_x(), self.max_z()),
            (self.min_x(), self.max_z()),
        ]
    }

    /// Rectangle overlap after growing `self` by `margin` on every side.
    /// Touching edges do not count at zero margin.
    pub fn intersects(&self, other: &Space, margin: f32) -> bool {
        self.min_x() - margin < other.max_x()
            && other.min_x() < self.max_x() + margin
            && self.min_z() - margin < other.max_z()
            && other.min_z() < self.max_z() + margin
    }

    /// Center-to-center distance on the XZ plane.
    pub fn distance_to(&self, other: &Space) -> f32 {
        self.center().horizontal_distance(&other.center())
    }

    /// Whether every edge coordinate lies inside `[0, extent]`.
    pub fn within_extent(&self, extent: f32) -> bool {
        self.min_x() >= 0.0
            && self.min_z() >= 0.0
            && self.max_x() <= extent
            && self.max_z() <= extent
    }
}
