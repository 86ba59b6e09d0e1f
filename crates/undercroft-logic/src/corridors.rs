//! Corridor construction between two rooms.
//!
//! Every corridor runs edge to edge: it starts on one room's boundary and
//! ends on the other's, so doorway detection sees both ends. Multi-segment
//! corridors abut at their elbows instead of overlapping.
//!
//! Routing is written once for the "X first" case. The "Z first" variants
//! transpose both rooms, route, and transpose the segments back.

use crate::constants::tolerances::{ADJACENCY, EPSILON};
use crate::space::{Interval, Space, SpaceError};
use thiserror::Error;

/// Which leg of an L-shaped corridor leaves the first room.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Elbow {
    /// Leave along X at the first room's Z-center, then turn along Z at
    /// the second room's X-center.
    HorizontalFirst,
    /// Leave along Z at the first room's X-center, then turn along X.
    VerticalFirst,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CorridorError {
    #[error("rooms overlap; nothing to connect")]
    Overlapping,
    #[error("no corridor shape fits between the rooms")]
    NoRoute,
    #[error(transparent)]
    Degenerate(#[from] SpaceError),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Rect {
    xs: Interval,
    zs: Interval,
}

impl Rect {
    fn of(space: &Space) -> Self {
        Self {
            xs: space.x_range(),
            zs: space.z_range(),
        }
    }

    fn transposed(self) -> Self {
        Self {
            xs: self.zs,
            zs: self.xs,
        }
    }

    fn cx(&self) -> f32 {
        self.xs.mid()
    }

    fn cz(&self) -> f32 {
        self.zs.mid()
    }

    fn is_degenerate(&self) -> bool {
        self.xs.len() <= EPSILON || self.zs.len() <= EPSILON
    }

    /// True when the rectangles stay at least `margin` apart on some axis.
    fn clear_of(&self, other: &Rect, margin: f32) -> bool {
        let x_hit = self.xs.start - margin < other.xs.end && other.xs.start < self.xs.end + margin;
        let z_hit = self.zs.start - margin < other.zs.end && other.zs.start < self.zs.end + margin;
        !(x_hit && z_hit)
    }

    fn into_space(self) -> Result<Space, CorridorError> {
        Ok(Space::corridor_between(self.xs, self.zs)?)
    }
}

/// Open interval between two disjoint ranges, facing edge to facing edge.
fn gap_between(a: &Interval, b: &Interval) -> Option<Interval> {
    if b.start - a.end > EPSILON {
        Some(Interval::new(a.end, b.start))
    } else if a.start - b.end > EPSILON {
        Some(Interval::new(b.end, a.start))
    } else {
        None
    }
}

fn band(center: f32, width: f32) -> Interval {
    Interval::new(center - width / 2.0, center + width / 2.0)
}

/// One segment along X, centered on the Z-interval both rooms share.
fn straight_x(a: &Rect, b: &Rect, width: f32) -> Option<Rect> {
    let shared = a.zs.overlap(&b.zs)?;
    if shared.len() + EPSILON < width {
        return None;
    }
    let xs = gap_between(&a.xs, &b.xs)?;
    Some(Rect {
        xs,
        zs: band(shared.mid(), width),
    })
}

/// Two segments: along X at `a`'s Z-center, then along Z at `b`'s X-center.
fn elbow_x_first(a: &Rect, b: &Rect, width: f32) -> Option<[Rect; 2]> {
    let hw = width / 2.0;
    let (az, bx) = (a.cz(), b.cx());

    let h = Rect {
        xs: if bx > a.cx() {
            Interval::new(a.xs.end, bx + hw)
        } else {
            Interval::new(bx - hw, a.xs.start)
        },
        zs: band(az, width),
    };
    let v = Rect {
        xs: band(bx, width),
        zs: if b.cz() < az {
            Interval::new(b.zs.end, az - hw)
        } else {
            Interval::new(az + hw, b.zs.start)
        },
    };

    if h.is_degenerate() || v.is_degenerate() {
        return None;
    }
    // Each leg may only touch the room it serves.
    let margin = ADJACENCY + EPSILON;
    if !h.clear_of(b, margin) || !v.clear_of(a, margin) {
        return None;
    }
    if !a.zs.covers(&h.zs) || !b.xs.covers(&v.xs) {
        return None;
    }
    Some([h, v])
}

/// Three segments: along X out of `a`, along Z through the middle of the
/// gap, along X into `b`.
fn zigzag_x(a: &Rect, b: &Rect, width: f32) -> Option<[Rect; 3]> {
    let hw = width / 2.0;
    let gap = gap_between(&a.xs, &b.xs)?;
    if gap.len() < width + 2.0 * (ADJACENCY + EPSILON) {
        return None;
    }
    let (az, bz) = (a.cz(), b.cz());
    if (az - bz).abs() <= width {
        return None;
    }

    let elbow = band(gap.mid(), width);
    let eastward = b.cx() > a.cx();
    let h1 = Rect {
        xs: if eastward {
            Interval::new(a.xs.end, elbow.end)
        } else {
            Interval::new(elbow.start, a.xs.start)
        },
        zs: band(az, width),
    };
    let h2 = Rect {
        xs: if eastward {
            Interval::new(elbow.start, b.xs.start)
        } else {
            Interval::new(b.xs.end, elbow.end)
        },
        zs: band(bz, width),
    };
    let v = Rect {
        xs: elbow,
        zs: if bz < az {
            Interval::new(bz + hw, az - hw)
        } else {
            Interval::new(az + hw, bz - hw)
        },
    };
    if !a.zs.covers(&h1.zs) || !b.zs.covers(&h2.zs) {
        return None;
    }
    Some([h1, v, h2])
}

fn routed<const N: usize>(
    a: &Rect,
    b: &Rect,
    transpose: bool,
    route: impl Fn(&Rect, &Rect) -> Option<[Rect; N]>,
) -> Option<[Rect; N]> {
    if transpose {
        route(&a.transposed(), &b.transposed()).map(|segs| segs.map(Rect::transposed))
    } else {
        route(a, b)
    }
}

/// Connect two rooms with an L-shaped corridor.
///
/// Rooms that share at least `width` along one axis get a single straight
/// segment. Otherwise the requested elbow is tried, then the other one,
/// then a Z-shaped detour through the middle of the gap.
pub fn l_shaped(
    a: &Space,
    b: &Space,
    width: f32,
    first: Elbow,
) -> Result<Vec<Space>, CorridorError> {
    let (ra, rb) = (Rect::of(a), Rect::of(b));
    if !ra.clear_of(&rb, 0.0) {
        return Err(CorridorError::Overlapping);
    }

    for transpose in [false, true] {
        let straight = routed(&ra, &rb, transpose, |a, b| {
            straight_x(a, b, width).map(|s| [s])
        });
        if let Some([seg]) = straight {
            return Ok(vec![seg.into_space()?]);
        }
    }

    let order = match first {
        Elbow::HorizontalFirst => [false, true],
        Elbow::VerticalFirst => [true, false],
    };
    for transpose in order {
        if let Some(segs) = routed(&ra, &rb, transpose, |a, b| elbow_x_first(a, b, width)) {
            return segs.into_iter().map(Rect::into_space).collect();
        }
    }

    for transpose in [false, true] {
        if let Some(segs) = routed(&ra, &rb, transpose, |a, b| zigzag_x(a, b, width)) {
            log::debug!("elbows blocked, using zigzag corridor");
            return segs.into_iter().map(Rect::into_space).collect();
        }
    }
    Err(CorridorError::NoRoute)
}

/// Connect two rooms with one straight segment along the axis of greater
/// center displacement. Used for alcoves.
pub fn direct(a: &Space, b: &Space, width: f32) -> Result<Space, CorridorError> {
    let (ra, rb) = (Rect::of(a), Rect::of(b));
    if !ra.clear_of(&rb, 0.0) {
        return Err(CorridorError::Overlapping);
    }
    let horizontal =
        (b.center_x() - a.center_x()).abs() > (b.center_z() - a.center_z()).abs();
    routed(&ra, &rb, !horizontal, |a, b| straight_x(a, b, width).map(|s| [s]))
        .ok_or(CorridorError::NoRoute)
        .and_then(|[seg]| seg.into_space())
}
