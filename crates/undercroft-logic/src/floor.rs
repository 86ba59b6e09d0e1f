//! The generated floor handed to gameplay.
//!
//! A `Floor` owns every space on it. Rendering, enemy placement and items
//! read it; only the key-collected flag changes after generation.

use crate::config::Theme;
use crate::constants::objectives;
use crate::space::{Aabb, Point3, Space};
use crate::walls::{Enclosure, Pillar, WallSegment};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Floor {
    floor_index: u32,
    extent: f32,
    theme: Option<Theme>,
    rooms: Vec<Space>,
    corridors: Vec<Space>,
    key_room: Option<usize>,
    exit_room: Option<usize>,
    key_position: Option<Point3>,
    exit_position: Option<Point3>,
    player_spawn: Point3,
    walls: Vec<WallSegment>,
    pillars: Vec<Pillar>,
    colliders: Vec<Aabb>,
    key_collected: bool,
    exit_radius: f32,
}

impl Floor {
    /// An empty floor, before any stage has run.
    pub fn empty(floor_index: u32, extent: f32) -> Self {
        Self {
            floor_index,
            extent,
            theme: None,
            rooms: Vec::new(),
            corridors: Vec::new(),
            key_room: None,
            exit_room: None,
            key_position: None,
            exit_position: None,
            player_spawn: Point3::default(),
            walls: Vec::new(),
            pillars: Vec::new(),
            colliders: Vec::new(),
            key_collected: false,
            exit_radius: objectives::EXIT_RADIUS,
        }
    }

    // Stage writers. Generation only ever adds to a floor.

    pub(crate) fn set_theme(&mut self, theme: Theme) {
        self.theme = Some(theme);
    }

    pub(crate) fn add_spaces(&mut self, rooms: Vec<Space>, corridors: Vec<Space>) {
        self.rooms.extend(rooms);
        self.corridors.extend(corridors);
    }

    pub(crate) fn set_objectives(
        &mut self,
        key_room: usize,
        exit_room: usize,
        key_position: Point3,
        exit_position: Point3,
    ) {
        self.key_room = Some(key_room);
        self.exit_room = Some(exit_room);
        self.key_position = Some(key_position);
        self.exit_position = Some(exit_position);
    }

    pub(crate) fn set_player_spawn(&mut self, position: Point3) {
        self.player_spawn = position;
    }

    pub(crate) fn set_geometry(&mut self, enclosure: Enclosure, colliders: Vec<Aabb>) {
        self.walls = enclosure.walls;
        self.pillars = enclosure.pillars;
        self.colliders = colliders;
    }

    pub(crate) fn set_exit_radius(&mut self, radius: f32) {
        self.exit_radius = radius;
    }

    pub fn floor_index(&self) -> u32 {
        self.floor_index
    }

    /// Side length of the square map.
    pub fn extent(&self) -> f32 {
        self.extent
    }

    pub fn theme(&self) -> Option<&Theme> {
        self.theme.as_ref()
    }

    /// Rooms in placement order. `rooms()[0]` is the spawn room.
    pub fn rooms(&self) -> &[Space] {
        &self.rooms
    }

    pub fn corridors(&self) -> &[Space] {
        &self.corridors
    }

    pub fn spawn_room(&self) -> Option<&Space> {
        self.rooms.first()
    }

    pub fn key_room(&self) -> Option<usize> {
        self.key_room
    }

    pub fn exit_room(&self) -> Option<usize> {
        self.exit_room
    }

    pub fn key_position(&self) -> Option<Point3> {
        self.key_position
    }

    pub fn exit_position(&self) -> Option<Point3> {
        self.exit_position
    }

    pub fn player_spawn_position(&self) -> Point3 {
        self.player_spawn
    }

    pub fn walls(&self) -> &[WallSegment] {
        &self.walls
    }

    pub fn pillars(&self) -> &[Pillar] {
        &self.pillars
    }

    /// Walls, pillars, then floor and ceiling slabs.
    pub fn colliders(&self) -> &[Aabb] {
        &self.colliders
    }

    /// Whether `point` is within reach of the exit, ignoring height.
    ///
    /// This does not check the key; gating the exit on
    /// [`is_key_collected`](Self::is_key_collected) is the caller's call.
    pub fn is_player_at_exit(&self, point: Point3) -> bool {
        self.exit_position
            .is_some_and(|exit| exit.horizontal_distance(&point) <= self.exit_radius)
    }

    /// Whether `point` is within reach of a key that is still lying there.
    pub fn is_player_at_key(&self, point: Point3) -> bool {
        !self.key_collected
            && self
                .key_position
                .is_some_and(|key| key.horizontal_distance(&point) <= self.exit_radius)
    }

    /// Mark the key as picked up. Returns `false` if there is no key or it
    /// was already collected.
    pub fn collect_key(&mut self) -> bool {
        if self.key_position.is_none() || self.key_collected {
            return false;
        }
        self.key_collected = true;
        true
    }

    pub fn is_key_collected(&self) -> bool {
        self.key_collected
    }
}
