//! Integration tests for the full floor generation pipeline.
//!
//! Exercises: FloorSize → layout → objectives → doorways → walls →
//! validation, through the public `FloorGenerator` entry points.
//!
//! All tests are pure logic: no rendering, no physics.

use proptest::prelude::*;
use undercroft_logic::config::determine_dungeon_size;
use undercroft_logic::constants::tolerances;
use undercroft_logic::doorways::{self, Doorway, SpaceId};
use undercroft_logic::geometry;
use undercroft_logic::objectives::{farthest_pair, find_farthest_room};
use undercroft_logic::pathfinding::LayoutGraph;
use undercroft_logic::pipeline::{FloorGenerator, Stage};
use undercroft_logic::space::{Classification, Direction, Point3, Space};
use undercroft_logic::Floor;

// ── Helpers ────────────────────────────────────────────────────────────

fn generate(seed: u64, floor_index: u32) -> Floor {
    FloorGenerator::from_seed(seed)
        .generate_floor(floor_index)
        .unwrap_or_else(|e| panic!("seed {} floor {}: {}", seed, floor_index, e))
}

fn space(floor: &Floor, id: SpaceId) -> &Space {
    match id {
        SpaceId::Room(i) => &floor.rooms()[i],
        SpaceId::Corridor(i) => &floor.corridors()[i],
    }
}

fn all_doorways(floor: &Floor) -> Vec<Doorway> {
    doorways::detect(floor.rooms(), floor.corridors())
}

fn spaces_with_ids(floor: &Floor) -> Vec<(SpaceId, &Space)> {
    floor
        .rooms()
        .iter()
        .enumerate()
        .map(|(i, s)| (SpaceId::Room(i), s))
        .chain(
            floor
                .corridors()
                .iter()
                .enumerate()
                .map(|(i, s)| (SpaceId::Corridor(i), s)),
        )
        .collect()
}

fn assert_connected(floor: &Floor) {
    let graph = LayoutGraph::from_doorways(&all_doorways(floor));
    let lost = graph.unreachable_rooms(SpaceId::Room(0), floor.rooms().len());
    assert!(lost.is_empty(), "unreachable rooms {:?}", lost);
}

fn assert_enclosed(floor: &Floor) {
    let findings = geometry::check_enclosure(
        floor.rooms(),
        floor.corridors(),
        &all_doorways(floor),
        floor.walls(),
    );
    assert!(findings.is_empty(), "{:?}", findings);
}

fn assert_corners_pillared(floor: &Floor) {
    let clearance = 1.5 * floor.theme().expect("theme").wall_thickness;
    let doors = all_doorways(floor);
    let near = |id, side, v: f32| {
        doorways::spans_on(&doors, id, side)
            .iter()
            .any(|span| span.distance_to(v) <= clearance)
    };
    for (id, s) in spaces_with_ids(floor) {
        let corners = [
            (s.min_x(), s.min_z(), Direction::North, Direction::West),
            (s.max_x(), s.min_z(), Direction::North, Direction::East),
            (s.max_x(), s.max_z(), Direction::South, Direction::East),
            (s.min_x(), s.max_z(), Direction::South, Direction::West),
        ];
        for (x, z, along_x, along_z) in corners {
            let open = near(id, along_x, x) || near(id, along_z, z);
            let pillared = floor
                .pillars()
                .iter()
                .any(|p| p.owner == id && p.x == x && p.z == z);
            assert_eq!(pillared, !open, "{:?} corner ({}, {})", id, x, z);
        }
    }
}

fn assert_objectives(floor: &Floor) {
    let key = floor.key_room().expect("key room");
    let exit = floor.exit_room().expect("exit room");
    assert_ne!(key, exit);
    let greedy = find_farthest_room(floor.rooms(), key) == Some(exit);
    let pair = farthest_pair(floor.rooms()) == Some((key, exit));
    assert!(
        greedy || pair,
        "exit {} is neither farthest from key {} nor the farthest pair",
        exit,
        key
    );
}

// ── Scenario ───────────────────────────────────────────────────────────

#[test]
fn first_floor_scenario() {
    let floor = generate(2024, 1);

    let spawn = floor.spawn_room().unwrap();
    assert_eq!(spawn.classification(), Classification::Spawn);
    assert!(floor
        .rooms()
        .iter()
        .any(|r| r.classification() == Classification::Radial));

    assert_connected(&floor);
    assert_objectives(&floor);
    assert_corners_pillared(&floor);

    let key = floor.key_position().unwrap();
    let exit = floor.exit_position().unwrap();
    let key_room = &floor.rooms()[floor.key_room().unwrap()];
    assert_eq!(key, Point3::new(key_room.center_x(), 1.0, key_room.center_z()));
    assert_eq!(exit.y, 0.0);
    assert_eq!(floor.player_spawn_position(), spawn.center());

    // Every space edge without an opening carries exactly one full-length wall.
    let doors = all_doorways(&floor);
    for (id, s) in spaces_with_ids(&floor) {
        for side in Direction::ALL {
            if !doorways::spans_on(&doors, id, side).is_empty() {
                continue;
            }
            let walls: Vec<_> = floor
                .walls()
                .iter()
                .filter(|w| w.owner == id && w.side == side)
                .collect();
            assert_eq!(walls.len(), 1, "{:?} {:?}", id, side);
            assert_eq!(walls[0].span, s.edge(side).1);
        }
    }

    let spaces = floor.rooms().len() + floor.corridors().len();
    assert_eq!(
        floor.colliders().len(),
        floor.walls().len() + floor.pillars().len() + 2 * spaces
    );
}

#[test]
fn player_can_finish_the_floor() {
    let mut floor = generate(77, 2);
    let key = floor.key_position().unwrap();
    let exit = floor.exit_position().unwrap();

    assert!(!floor.is_player_at_exit(floor.player_spawn_position()));
    assert!(floor.is_player_at_key(Point3::new(key.x, 0.0, key.z)));
    assert!(floor.collect_key());
    assert!(floor.is_key_collected());
    assert!(floor.is_player_at_exit(Point3::new(exit.x + 1.0, 0.0, exit.z)));
}

// ── Pipeline coherence ─────────────────────────────────────────────────

#[test]
fn deterministic_output() {
    for floor_index in [1, 5, 10] {
        assert_eq!(generate(31, floor_index), generate(31, floor_index));
    }
}

#[test]
fn different_seeds_differ() {
    assert_ne!(generate(1, 1).rooms(), generate(2, 1).rooms());
}

#[test]
fn report_lists_all_stages() {
    let report = FloorGenerator::from_seed(8)
        .generate_with_report(None, 4, determine_dungeon_size(4))
        .unwrap();
    assert_eq!(report.completed.first(), Some(&Stage::Initialized));
    assert_eq!(report.completed.last(), Some(&Stage::Finalized));
    assert_eq!(report.completed.len(), Stage::ALL.len());
}

#[test]
fn one_generator_builds_a_whole_dungeon() {
    let mut generator = FloorGenerator::from_seed(99);
    let mut previous = None;
    for floor_index in 1..=10 {
        let floor = generator
            .generate_replacing(previous.take(), floor_index, determine_dungeon_size(floor_index))
            .unwrap();
        assert_eq!(floor.floor_index(), floor_index);
        previous = Some(floor);
    }
}

#[test]
fn deeper_floors_are_bigger() {
    let mut shallow = 0;
    let mut deep = 0;
    for seed in 0..20 {
        shallow += generate(seed, 1).rooms().len();
        deep += generate(seed, 9).rooms().len();
    }
    assert!(deep > shallow, "deep {} shallow {}", deep, shallow);
}

// ── Size tiers ─────────────────────────────────────────────────────────

#[test]
fn size_tiers() {
    for floor_index in 1..=3 {
        let s = determine_dungeon_size(floor_index);
        assert_eq!((s.min_rooms, s.max_rooms, s.extent), (5, 7, 200.0));
    }
    for floor_index in 4..=7 {
        let s = determine_dungeon_size(floor_index);
        assert_eq!((s.min_rooms, s.max_rooms, s.extent), (8, 11, 280.0));
    }
    for floor_index in [8, 12, 40] {
        let s = determine_dungeon_size(floor_index);
        assert_eq!((s.min_rooms, s.max_rooms, s.extent), (12, 20, 400.0));
    }
}

#[test]
fn floors_stay_on_their_map() {
    for seed in 0..20 {
        for floor_index in [1, 5, 9] {
            let floor = generate(seed, floor_index);
            let extent = determine_dungeon_size(floor_index).extent;
            assert!(floor.rooms().iter().all(|r| r.within_extent(extent)));
        }
    }
}

// ── Properties ─────────────────────────────────────────────────────────

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn every_room_reachable(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        assert_connected(&floor);
    }

    #[test]
    fn every_edge_enclosed(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        assert_enclosed(&floor);
    }

    #[test]
    fn every_closed_corner_pillared(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        assert_corners_pillared(&floor);
    }

    #[test]
    fn key_and_exit_apart(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        assert_objectives(&floor);
    }

    #[test]
    fn floor_is_flat(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        for s in floor.rooms().iter().chain(floor.corridors()) {
            prop_assert_eq!(s.floor_elevation(), 0.0);
            prop_assert!(!s.is_sloped());
        }
    }

    #[test]
    fn doorways_only_between_touching_spaces(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        for d in all_doorways(&floor) {
            let owner = space(&floor, d.owner);
            let other = space(&floor, d.connecting);
            prop_assert!(owner.is_corridor());
            let (line, edge) = owner.edge(d.direction);
            let (other_line, other_edge) = other.edge(d.direction.opposite());
            prop_assert!((line - other_line).abs() <= tolerances::ADJACENCY);
            prop_assert!(d.span.len() > 0.0);
            prop_assert!(edge.covers(&d.span) && other_edge.covers(&d.span));
        }
    }

    #[test]
    fn primary_rooms_respect_budget(seed in any::<u64>(), floor_index in 0u32..12) {
        let floor = generate(seed, floor_index);
        let size = determine_dungeon_size(floor_index);
        let primary = floor
            .rooms()
            .iter()
            .filter(|r| r.classification() != Classification::Alcove)
            .count() as u32;
        prop_assert!(primary <= size.max_rooms);
        prop_assert!(primary >= 2);
    }
}
