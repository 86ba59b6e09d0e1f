//! Geometry validation for generated floors.
//!
//! Pure functions that take spaces, doorways and walls and return
//! validation findings. The pipeline refuses a floor with any
//! [`Severity::Error`] finding and logs the warnings.

use crate::constants::tolerances;
use crate::doorways::{merge_spans, spans_on, Doorway, SpaceId};
use crate::pathfinding::LayoutGraph;
use crate::space::{Direction, Interval, Space};
use crate::walls::{pillar_corners, Enclosure, Pillar, WallSegment};

/// A geometry validation finding.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub category: &'static str,
    pub severity: Severity,
    pub message: String,
}

/// Finding severity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Severity {
    Error,
    Warning,
}

fn ids<'a>(
    rooms: &'a [Space],
    corridors: &'a [Space],
) -> impl Iterator<Item = (SpaceId, &'a Space)> {
    rooms
        .iter()
        .enumerate()
        .map(|(i, s)| (SpaceId::Room(i), s))
        .chain(
            corridors
                .iter()
                .enumerate()
                .map(|(i, s)| (SpaceId::Corridor(i), s)),
        )
}

// ── A. Per-space geometry ───────────────────────────────────────────────

/// Check that no space has zero or negative dimensions.
pub fn check_space_dimensions(rooms: &[Space], corridors: &[Space]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (id, s) in ids(rooms, corridors) {
        if s.width() <= 0.0 || s.depth() <= 0.0 {
            errors.push(ValidationError {
                category: "space_geometry",
                severity: Severity::Error,
                message: format!(
                    "{:?} has non-positive dimensions: {}×{}",
                    id,
                    s.width(),
                    s.depth()
                ),
            });
        }
    }
    errors
}

/// Check that room aspect ratios are reasonable (< 10:1). Corridors are
/// long by nature and skipped.
pub fn check_space_aspect_ratios(rooms: &[Space]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (i, r) in rooms.iter().enumerate() {
        if r.width() <= 0.0 || r.depth() <= 0.0 {
            continue; // caught by dimension check
        }
        let ratio = r.longest_edge() / r.width().min(r.depth());
        if ratio > 10.0 {
            errors.push(ValidationError {
                category: "space_geometry",
                severity: Severity::Warning,
                message: format!(
                    "Room #{} has extreme aspect ratio {:.1}:1 ({}×{})",
                    i,
                    ratio,
                    r.width(),
                    r.depth()
                ),
            });
        }
    }
    errors
}

/// Check rooms stay inside the square map.
pub fn check_spaces_within_extent(rooms: &[Space], extent: f32) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let slack = tolerances::EPSILON;
    for (i, r) in rooms.iter().enumerate() {
        if r.min_x() < -slack
            || r.min_z() < -slack
            || r.max_x() > extent + slack
            || r.max_z() > extent + slack
        {
            errors.push(ValidationError {
                category: "space_geometry",
                severity: Severity::Error,
                message: format!(
                    "Room #{} extends outside the map: ({:.1},{:.1})→({:.1},{:.1}) vs extent {}",
                    i,
                    r.min_x(),
                    r.min_z(),
                    r.max_x(),
                    r.max_z(),
                    extent
                ),
            });
        }
    }
    errors
}

// ── B. Room-to-room ─────────────────────────────────────────────────────

/// Check no two rooms overlap by more than the touching tolerance.
pub fn check_room_overlaps(rooms: &[Space]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let tolerance = tolerances::OVERLAP;
    for i in 0..rooms.len() {
        for j in (i + 1)..rooms.len() {
            let (a, b) = (&rooms[i], &rooms[j]);
            let overlap_x = a.max_x() - tolerance > b.min_x() && b.max_x() - tolerance > a.min_x();
            let overlap_z = a.max_z() - tolerance > b.min_z() && b.max_z() - tolerance > a.min_z();
            if overlap_x && overlap_z {
                errors.push(ValidationError {
                    category: "room_overlap",
                    severity: Severity::Error,
                    message: format!("Rooms #{} and #{} overlap", i, j),
                });
            }
        }
    }
    errors
}

// ── C. Connectivity ─────────────────────────────────────────────────────

/// Check every room is reachable from the spawn room (room 0).
pub fn check_connectivity(rooms: &[Space], doorways: &[Doorway]) -> Vec<ValidationError> {
    if rooms.is_empty() {
        return vec![ValidationError {
            category: "connectivity",
            severity: Severity::Error,
            message: "floor has no rooms".to_string(),
        }];
    }
    let graph = LayoutGraph::from_doorways(doorways);
    let unreached = graph.unreachable_rooms(SpaceId::Room(0), rooms.len());
    if unreached.is_empty() {
        return Vec::new();
    }
    vec![ValidationError {
        category: "connectivity",
        severity: Severity::Error,
        message: format!(
            "{} of {} rooms unreachable from the spawn room (e.g. room #{})",
            unreached.len(),
            rooms.len(),
            unreached[0]
        ),
    }]
}

// ── D. Enclosure ────────────────────────────────────────────────────────

/// Parts of `edge` that neither a wall nor a doorway covers, longer than
/// the wall sliver tolerance.
pub fn uncovered_gaps(edge: Interval, covered: &[Interval]) -> Vec<Interval> {
    let threshold = tolerances::MIN_WALL_WIDTH + tolerances::EPSILON;
    let mut gaps = Vec::new();
    let mut cursor = edge.start;
    for span in merge_spans(covered, edge) {
        if span.start - cursor > threshold {
            gaps.push(Interval::new(cursor, span.start));
        }
        cursor = cursor.max(span.end);
    }
    if edge.end - cursor > threshold {
        gaps.push(Interval::new(cursor, edge.end));
    }
    gaps
}

/// Check walls and doorways together cover every edge of every space.
pub fn check_enclosure(
    rooms: &[Space],
    corridors: &[Space],
    doorways: &[Doorway],
    walls: &[WallSegment],
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (id, space) in ids(rooms, corridors) {
        for side in Direction::ALL {
            let (_, edge) = space.edge(side);
            let mut covered = spans_on(doorways, id, side);
            covered.extend(
                walls
                    .iter()
                    .filter(|w| w.owner == id && w.side == side)
                    .map(|w| w.span),
            );
            for gap in uncovered_gaps(edge, &covered) {
                errors.push(ValidationError {
                    category: "enclosure",
                    severity: Severity::Error,
                    message: format!(
                        "{:?} {:?} edge open over {:.2}..{:.2}",
                        id, side, gap.start, gap.end
                    ),
                });
            }
        }
    }
    errors
}

/// Check every corner that needs a pillar has one, and no pillar sits at
/// a corner a doorway keeps open.
pub fn check_corner_pillars(
    rooms: &[Space],
    corridors: &[Space],
    doorways: &[Doorway],
    pillars: &[Pillar],
    wall_thickness: f32,
) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (id, space) in ids(rooms, corridors) {
        let expected = pillar_corners(id, space, doorways, wall_thickness);
        let placed: Vec<(f32, f32)> = pillars
            .iter()
            .filter(|p| p.owner == id)
            .map(|p| (p.x, p.z))
            .collect();
        for &(x, z) in &expected {
            if !placed.contains(&(x, z)) {
                errors.push(ValidationError {
                    category: "enclosure",
                    severity: Severity::Error,
                    message: format!("{:?} corner ({:.1}, {:.1}) has no pillar", id, x, z),
                });
            }
        }
        for &(x, z) in &placed {
            if !expected.contains(&(x, z)) {
                errors.push(ValidationError {
                    category: "enclosure",
                    severity: Severity::Error,
                    message: format!("{:?} pillar at ({:.1}, {:.1}) blocks a doorway", id, x, z),
                });
            }
        }
    }
    errors
}

// ── E. Flatness ─────────────────────────────────────────────────────────

/// Check every space sits at elevation 0 and nothing is sloped.
pub fn check_flatness(rooms: &[Space], corridors: &[Space]) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    for (id, s) in ids(rooms, corridors) {
        if s.floor_elevation() != 0.0 || s.is_sloped() {
            errors.push(ValidationError {
                category: "flatness",
                severity: Severity::Error,
                message: format!(
                    "{:?} is not flat: elevation {}, sloped {}",
                    id,
                    s.floor_elevation(),
                    s.is_sloped()
                ),
            });
        }
    }
    errors
}

// ── Master validation ───────────────────────────────────────────────────

/// Run all geometry validations and return combined results.
pub fn validate_all(
    rooms: &[Space],
    corridors: &[Space],
    doorways: &[Doorway],
    enclosure: &Enclosure,
    wall_thickness: f32,
    extent: f32,
) -> Vec<ValidationError> {
    let mut all = Vec::new();
    all.extend(check_space_dimensions(rooms, corridors));
    all.extend(check_space_aspect_ratios(rooms));
    all.extend(check_spaces_within_extent(rooms, extent));
    all.extend(check_room_overlaps(rooms));
    all.extend(check_connectivity(rooms, doorways));
    all.extend(check_enclosure(rooms, corridors, doorways, &enclosure.walls));
    all.extend(check_corner_pillars(
        rooms,
        corridors,
        doorways,
        &enclosure.pillars,
        wall_thickness,
    ));
    all.extend(check_flatness(rooms, corridors));
    all
}
