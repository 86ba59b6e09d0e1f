//! Generation constants for tolerances, spawn probabilities, spacing and widths.
//!
//! Plain `f32`/`f64` constants with no runtime dependency. The layout,
//! doorway and wall modules all read from here so the geometry stays
//! consistent between the stage that builds spaces and the stages that
//! enclose them.

/// Geometric tolerances shared by doorway detection and wall synthesis.
pub mod tolerances {
    /// Maximum gap between two facing edges that still counts as adjacent.
    pub const ADJACENCY: f32 = 1.0;
    /// Wall segments shorter than this are dropped.
    pub const MIN_WALL_WIDTH: f32 = 0.1;
    /// A corner needs a pillar unless a doorway comes within
    /// `CORNER_CLEARANCE_FACTOR * wall_thickness` of it.
    pub const CORNER_CLEARANCE_FACTOR: f32 = 1.5;
    /// Float noise allowed when comparing coordinates that should be equal.
    pub const EPSILON: f32 = 1e-3;
    /// Rooms may touch but not overlap by more than this.
    pub const OVERLAP: f32 = 0.1;
}

/// Bernoulli probabilities used by the layout generator and objective placer.
pub mod chances {
    pub const RADIAL: f64 = 0.8;
    pub const CARDINAL: f64 = 0.5;
    pub const CARDINAL_PLUS: f64 = 0.4;
    pub const ALCOVE: f64 = 0.7;
    /// Chance that the key goes into an alcove when one exists.
    pub const KEY_IN_ALCOVE: f64 = 0.3;
}

/// Layout distances, in world units.
pub mod spacing {
    /// Ring spacing at the reference map extent. Radial rooms sit one
    /// spacing out from the spawn room, cardinal two, cardinal-plus three.
    pub const BASE: f32 = 16.0;
    /// Map extent at which `BASE` applies unscaled.
    pub const REFERENCE_EXTENT: f32 = 200.0;
    /// Distance between a room edge and the alcove hanging off it.
    pub const ALCOVE_GAP: f32 = 4.0;
    /// Clearance an alcove (and its corridor) must keep from every other space.
    pub const ALCOVE_MARGIN: f32 = 2.0;
}

/// Corridor cross-sections.
pub mod corridors {
    pub const WIDTH: f32 = 6.0;
    pub const ALCOVE_WIDTH: f32 = 4.0;
}

/// Alcove proportions relative to the parent room's longest edge.
pub mod alcoves {
    pub const MIN_LENGTH_RATIO: f32 = 0.4;
    pub const MAX_LENGTH_RATIO: f32 = 0.8;
    pub const MIN_DEPTH_RATIO: f32 = 0.2;
    pub const MAX_DEPTH_RATIO: f32 = 0.3;
}

/// Objective geometry.
pub mod objectives {
    /// The key floats this far above its room's floor.
    pub const KEY_HEIGHT: f32 = 1.0;
    /// Horizontal distance within which the player counts as standing on
    /// the exit (or the key).
    pub const EXIT_RADIUS: f32 = 3.0;
}

/// Slab thickness for floor and ceiling colliders.
pub const SLAB_THICKNESS: f32 = 0.2;
