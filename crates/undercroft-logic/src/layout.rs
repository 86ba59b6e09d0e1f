//! Radial room layout.
//!
//! The spawn room sits at the map center. Radial rooms hang off its four
//! sides, cardinal rooms sit on the diagonals, and cardinal-plus rooms
//! extend the radial axes one ring further out:
//!
//! ```text
//!            N+
//!       NW   N   NE
//!   W+  W  spawn  E  E+
//!       SW   S   SE
//!            S+
//! ```
//!
//! Cardinal and cardinal-plus rooms only appear when their parent radial
//! room did, and connect to it rather than to the spawn room. The layout
//! graph is therefore a tree rooted at the spawn room, connected by
//! construction. Alcoves are added last, off edges nothing else opens onto.

use crate::config::{FloorSize, SizeTemplate};
use crate::constants::{alcoves, chances, corridors as corridor_consts, spacing};
use crate::corridors::{self, Elbow};
use crate::doorways;
use crate::space::{Classification, Direction, Space, SpaceError};
use rand::Rng;

/// Rooms and corridors produced by [`generate_layout`]. `rooms[0]` is the
/// spawn room.
#[derive(Debug, Clone, PartialEq)]
pub struct Layout {
    pub rooms: Vec<Space>,
    pub corridors: Vec<Space>,
}

impl Layout {
    pub fn count(&self, classification: Classification) -> usize {
        self.rooms
            .iter()
            .filter(|r| r.classification() == classification)
            .count()
    }
}

/// Radial directions in roll order: N, E, S, W.
const RADIAL_DIRS: [(f32, f32); 4] = [(0.0, -1.0), (1.0, 0.0), (0.0, 1.0), (-1.0, 0.0)];

/// Diagonals NE, SE, SW, NW. Each one's parent is the radial direction
/// with the same index.
const DIAGONAL_DIRS: [(f32, f32); 4] = [(1.0, -1.0), (1.0, 1.0), (-1.0, 1.0), (-1.0, -1.0)];

struct Builder<'a, R: Rng> {
    rng: &'a mut R,
    spacing: f32,
    rooms: Vec<Space>,
    corridors: Vec<Space>,
    /// Room index of the radial room in each direction.
    radials: [Option<usize>; 4],
}

impl<R: Rng> Builder<'_, R> {
    fn sample_size(&mut self, classification: Classification) -> (f32, f32) {
        let t = SizeTemplate::for_classification(classification);
        if t.max > t.min {
            (
                self.rng.gen_range(t.min..=t.max),
                self.rng.gen_range(t.min..=t.max),
            )
        } else {
            (t.min, t.min)
        }
    }

    /// Sample a satellite's size and place it `ring` spacings out from the
    /// spawn room along `dir`, offsetting each axis by its own half sizes.
    fn satellite(
        &mut self,
        classification: Classification,
        dir: (f32, f32),
        ring: f32,
    ) -> Result<Space, SpaceError> {
        let (w, d) = self.sample_size(classification);
        let spawn = &self.rooms[0];
        let cx = spawn.center_x() + dir.0 * (spawn.width() / 2.0 + ring * self.spacing + w / 2.0);
        let cz = spawn.center_z() + dir.1 * (spawn.depth() / 2.0 + ring * self.spacing + d / 2.0);
        Space::centered(cx, cz, w, d, classification)
    }

    /// Connect `room` to `parent` and keep both if nothing collides.
    /// Returns the new room's index.
    fn attach(&mut self, room: Space, parent: usize) -> Option<usize> {
        let first = if self.rng.gen_bool(0.5) {
            Elbow::HorizontalFirst
        } else {
            Elbow::VerticalFirst
        };
        let routed =
            corridors::l_shaped(&self.rooms[parent], &room, corridor_consts::WIDTH, first);
        let segments = match routed {
            Ok(segments) => segments,
            Err(e) => {
                log::warn!("dropping {:?} room: {}", room.classification(), e);
                return None;
            }
        };

        let room_clear = self
            .rooms
            .iter()
            .chain(self.corridors.iter())
            .all(|s| !room.intersects(s, 0.0));
        let segments_clear = segments.iter().all(|seg| {
            self.rooms
                .iter()
                .chain(self.corridors.iter())
                .all(|s| !seg.intersects(s, 0.0))
        });
        if !room_clear || !segments_clear {
            log::debug!(
                "dropping {:?} room at ({:.1}, {:.1}): collides with existing space",
                room.classification(),
                room.center_x(),
                room.center_z()
            );
            return None;
        }

        log::debug!(
            "placed {:?} room {:.1}×{:.1} at ({:.1}, {:.1}) via {} corridor segment(s)",
            room.classification(),
            room.width(),
            room.depth(),
            room.center_x(),
            room.center_z(),
            segments.len()
        );
        self.rooms.push(room);
        self.corridors.extend(segments);
        Some(self.rooms.len() - 1)
    }

    fn place_radial(&mut self, dir: usize) -> Result<(), SpaceError> {
        let room = self.satellite(Classification::Radial, RADIAL_DIRS[dir], 1.0)?;
        self.radials[dir] = self.attach(room, 0);
        Ok(())
    }

    /// Try an alcove off `side` of `rooms[parent]`. Rejected candidates are
    /// simply skipped.
    fn place_alcove(
        &mut self,
        parent: usize,
        side: Direction,
        extent: f32,
    ) -> Result<(), SpaceError> {
        let host = self.rooms[parent].clone();
        let longest = host.longest_edge();
        let length_ratio = self
            .rng
            .gen_range(alcoves::MIN_LENGTH_RATIO..=alcoves::MAX_LENGTH_RATIO);
        let depth_ratio = self
            .rng
            .gen_range(alcoves::MIN_DEPTH_RATIO..=alcoves::MAX_DEPTH_RATIO);
        let (length, depth) = (longest * length_ratio, longest * depth_ratio);

        let (w, d) = if side.runs_along_x() {
            (length, depth)
        } else {
            (depth, length)
        };
        let (ox, oz) = side.outward();
        let cx = host.center_x() + ox * (host.width() / 2.0 + spacing::ALCOVE_GAP + w / 2.0);
        let cz = host.center_z() + oz * (host.depth() / 2.0 + spacing::ALCOVE_GAP + d / 2.0);
        let alcove = Space::centered(cx, cz, w, d, Classification::Alcove)?;

        let edge_len = host.edge(side).1.len();
        let width = corridor_consts::ALCOVE_WIDTH.min(length).min(edge_len);
        let corridor = match corridors::direct(&host, &alcove, width) {
            Ok(c) => c,
            Err(e) => {
                log::debug!("no alcove off room {} {:?}: {}", parent, side, e);
                return Ok(());
            }
        };

        let inside = alcove.within_extent(extent) && corridor.within_extent(extent);
        let clear = self
            .rooms
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != parent)
            .map(|(_, s)| s)
            .chain(self.corridors.iter())
            .all(|s| {
                !alcove.intersects(s, spacing::ALCOVE_MARGIN)
                    && !corridor.intersects(s, spacing::ALCOVE_MARGIN)
            });
        if !inside || !clear {
            log::debug!("rejected alcove off room {} {:?}", parent, side);
            return Ok(());
        }

        log::debug!(
            "placed alcove {:.1}×{:.1} off room {} {:?}",
            alcove.width(),
            alcove.depth(),
            parent,
            side
        );
        self.rooms.push(alcove);
        self.corridors.push(corridor);
        Ok(())
    }
}

/// Outcome of every candidate's trial. Each candidate is rolled exactly
/// once, whether or not its parent ends up placed or the budget has room.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Trials {
    radial: [bool; 4],
    cardinal: [bool; 4],
    cardinal_plus: [bool; 4],
}

impl Trials {
    fn roll<R: Rng>(rng: &mut R) -> Self {
        let mut trials = Trials::default();
        for hit in trials.radial.iter_mut() {
            *hit = rng.gen_bool(chances::RADIAL);
        }
        trials.ensure_radial(rng);
        for hit in trials.cardinal.iter_mut() {
            *hit = rng.gen_bool(chances::CARDINAL);
        }
        for hit in trials.cardinal_plus.iter_mut() {
            *hit = rng.gen_bool(chances::CARDINAL_PLUS);
        }
        trials
    }

    /// Force one uniformly chosen radial direction if no radial trial hit.
    fn ensure_radial<R: Rng>(&mut self, rng: &mut R) {
        if self.radial.iter().any(|&hit| hit) {
            return;
        }
        let dir = rng.gen_range(0..RADIAL_DIRS.len());
        log::debug!("no radial room rolled; forcing direction {}", dir);
        self.radial[dir] = true;
    }
}

/// Build a floor layout within `size`.
///
/// Every candidate gets its own trial up front. A budget sampled from
/// `size.min_rooms..=size.max_rooms` then caps how many successful
/// candidates are placed as primary rooms (spawn room included, alcoves
/// excluded), in roll order: radial, cardinal, cardinal-plus. The budget
/// is a cap, not a target; a floor holds fewer primary rooms when trials
/// miss or a room is dropped for colliding.
pub fn generate_layout<R: Rng>(rng: &mut R, size: &FloorSize) -> Result<Layout, SpaceError> {
    let budget = rng.gen_range(size.min_rooms..=size.max_rooms.max(size.min_rooms));
    let trials = Trials::roll(rng);
    build_layout(rng, size, (budget as usize).max(2), &trials)
}

fn build_layout<R: Rng>(
    rng: &mut R,
    size: &FloorSize,
    budget: usize,
    trials: &Trials,
) -> Result<Layout, SpaceError> {
    let center = size.extent / 2.0;
    let mut b = Builder {
        rng,
        spacing: size.spacing(),
        rooms: Vec::new(),
        corridors: Vec::new(),
        radials: [None; 4],
    };

    let (w, d) = b.sample_size(Classification::Spawn);
    b.rooms.push(Space::centered(center, center, w, d, Classification::Spawn)?);

    for (dir, &hit) in trials.radial.iter().enumerate() {
        if hit && b.rooms.len() < budget {
            b.place_radial(dir)?;
        }
    }

    for (i, dir) in DIAGONAL_DIRS.iter().enumerate() {
        let Some(parent) = b.radials[i] else { continue };
        if trials.cardinal[i] && b.rooms.len() < budget {
            let room = b.satellite(Classification::Cardinal, *dir, 2.0)?;
            b.attach(room, parent);
        }
    }

    for (i, dir) in RADIAL_DIRS.iter().enumerate() {
        let Some(parent) = b.radials[i] else { continue };
        if trials.cardinal_plus[i] && b.rooms.len() < budget {
            let room = b.satellite(Classification::CardinalPlus, *dir, 3.0)?;
            b.attach(room, parent);
        }
    }

    let primary = b.rooms.len();
    for parent in 0..primary {
        for side in Direction::ALL {
            if doorways::has_opening(&b.rooms[parent], side, &b.corridors) {
                continue;
            }
            if b.rng.gen_bool(chances::ALCOVE) {
                b.place_alcove(parent, side, size.extent)?;
            }
        }
    }

    let mut layout = Layout {
        rooms: b.rooms,
        corridors: b.corridors,
    };
    for space in layout.rooms.iter_mut().chain(layout.corridors.iter_mut()) {
        space.normalize_elevation();
    }

    log::debug!(
        "layout: budget {}, {} primary rooms, {} alcoves, {} corridor segments",
        budget,
        primary,
        layout.rooms.len() - primary,
        layout.corridors.len()
    );
    Ok(layout)
}
