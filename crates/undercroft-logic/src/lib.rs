//! Pure dungeon floor generation for Undercroft.
//!
//! This crate builds one floor at a time: a connected set of rooms and
//! corridors, a key and an exit placed far apart, and the walls, pillars
//! and colliders that enclose it. Nothing here renders, simulates physics
//! or touches I/O; every function takes plain data (plus one injected
//! random source) and returns results, so the whole pipeline is unit
//! testable and reproducible from a seed.
//!
//! # Module Overview
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | Floor size tiers, room size templates, theme table, generator settings |
//! | [`constants`] | Tolerances, spawn probabilities, spacing, corridor widths |
//! | [`corridors`] | Straight, L-shaped and zigzag corridors between rooms |
//! | [`doorways`] | Doorway detection between corridors and their neighbours |
//! | [`error`] | Generation failure taxonomy |
//! | [`floor`] | The generated floor and its gameplay queries |
//! | [`geometry`] | Floor validation (bounds, overlaps, connectivity, enclosure, flatness) |
//! | [`layout`] | Radial room layout with alcoves |
//! | [`objectives`] | Key and exit placement |
//! | [`pathfinding`] | BFS reachability over the doorway graph |
//! | [`pipeline`] | Staged generation state machine, hooks and generation lock |
//! | [`space`] | Rooms, corridor segments, directions and points |
//! | [`walls`] | Wall splitting, corner pillars and colliders |

pub mod config;
pub mod constants;
pub mod corridors;
pub mod doorways;
pub mod error;
pub mod floor;
pub mod geometry;
pub mod layout;
pub mod objectives;
pub mod pathfinding;
pub mod pipeline;
pub mod space;
pub mod walls;

pub use config::{determine_dungeon_size, FloorSize, GeneratorSettings, PopulationMode, Theme};
pub use error::{FailureKind, GenerationError};
pub use floor::Floor;
pub use pipeline::{FloorGenerator, GenerationReport, Stage};
pub use space::{Aabb, Classification, Direction, Point3, Space};
