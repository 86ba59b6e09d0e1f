//! Undercroft Headless Generation Harness
//!
//! Generates floors across seeds and size tiers and validates every
//! generated floor: connectivity, enclosure, objectives, flatness.
//! Runs entirely in-process with no rendering.
//!
//! Usage:
//!   cargo run -p undercroft-simtest
//!   cargo run -p undercroft-simtest -- --verbose --seeds 200
//!   cargo run -p undercroft-simtest -- --dump 3 --base-seed 42 > floor3.json

use clap::Parser;
use undercroft_logic::config::{determine_dungeon_size, FloorSize};
use undercroft_logic::constants::tolerances;
use undercroft_logic::doorways::{self, SpaceId};
use undercroft_logic::error::FailureKind;
use undercroft_logic::geometry;
use undercroft_logic::objectives::{farthest_pair, find_farthest_room};
use undercroft_logic::pathfinding::LayoutGraph;
use undercroft_logic::pipeline::FloorGenerator;
use undercroft_logic::space::{Classification, Point3};
use undercroft_logic::{Floor, GenerationError};

#[derive(Parser)]
#[command(name = "undercroft-simtest")]
#[command(about = "Headless floor generation sweep for Undercroft")]
struct Cli {
    /// Print every check, not just failures, and log at debug level
    #[arg(long)]
    verbose: bool,
    /// Seeds to sweep per floor
    #[arg(long, default_value_t = 50)]
    seeds: u64,
    /// First seed of the sweep
    #[arg(long, default_value_t = 0)]
    base_seed: u64,
    /// Deepest floor index to sweep
    #[arg(long, default_value_t = 12)]
    floors: u32,
    /// Print this floor (generated from the base seed) as JSON and exit
    #[arg(long, value_name = "FLOOR")]
    dump: Option<u32>,
}

// ── Test harness ────────────────────────────────────────────────────────

struct TestResult {
    name: String,
    passed: bool,
    detail: String,
}

fn init_logging(verbose: bool) {
    use simplelog::LevelFilter::{Debug, Off, Warn};
    let level = if verbose { Debug } else { Warn };
    if let Err(e) = simplelog::TermLogger::init(
        level,
        simplelog::ConfigBuilder::new()
            .set_target_level(Off)
            .set_location_level(Off)
            .build(),
        simplelog::TerminalMode::Stderr,
        simplelog::ColorChoice::Auto,
    ) {
        eprintln!("logger setup failed: {}", e);
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Some(floor_index) = cli.dump {
        std::process::exit(dump_floor(cli.base_seed, floor_index));
    }

    println!("=== Undercroft Generation Harness ===\n");

    let mut results = Vec::new();

    // 1. Size tier table
    results.extend(validate_size_tiers());

    // 2. Floor sweep across seeds and tiers
    results.extend(validate_floor_sweep(&cli));

    // 3. Determinism
    results.extend(validate_determinism(cli.base_seed));

    // 4. Failure handling
    results.extend(validate_failures());

    // 5. Gameplay queries
    results.extend(validate_gameplay(cli.base_seed));

    // ── Summary ──
    println!();
    let passed = results.iter().filter(|r| r.passed).count();
    let failed = results.iter().filter(|r| !r.passed).count();
    let total = results.len();

    for r in &results {
        let icon = if r.passed { "✓" } else { "✗" };
        if !r.passed || cli.verbose {
            println!("  {} {}: {}", icon, r.name, r.detail);
        }
    }

    println!(
        "\n=== RESULT: {}/{} passed, {} failed ===",
        passed, total, failed
    );

    if failed > 0 {
        std::process::exit(1);
    }
}

fn dump_floor(seed: u64, floor_index: u32) -> i32 {
    let floor = match FloorGenerator::from_seed(seed).generate_floor(floor_index) {
        Ok(floor) => floor,
        Err(e) => {
            eprintln!("generation failed: {}", e);
            return 1;
        }
    };
    match serde_json::to_string_pretty(&floor) {
        Ok(json) => {
            println!("{}", json);
            0
        }
        Err(e) => {
            eprintln!("serialization failed: {}", e);
            1
        }
    }
}

// ── 1. Size tiers ───────────────────────────────────────────────────────

fn validate_size_tiers() -> Vec<TestResult> {
    println!("--- Size Tiers ---");
    let mut results = Vec::new();

    let expected = [
        (1..=3, (5, 7, 200.0)),
        (4..=7, (8, 11, 280.0)),
        (8..=30, (12, 20, 400.0)),
    ];
    for (floors, (min, max, extent)) in expected {
        let (first, last) = (*floors.start(), *floors.end());
        let bad: Vec<u32> = floors
            .filter(|&f| {
                let s = determine_dungeon_size(f);
                (s.min_rooms, s.max_rooms, s.extent) != (min, max, extent)
            })
            .collect();
        results.push(TestResult {
            name: format!("tier_floors_{}_to_{}", first, last),
            passed: bad.is_empty(),
            detail: if bad.is_empty() {
                format!("{}–{} rooms at {}×{}", min, max, extent, extent)
            } else {
                format!("wrong tier for floors {:?}", bad)
            },
        });
    }

    let invalid: Vec<u32> = (0..=30)
        .filter(|&f| !determine_dungeon_size(f).problems().is_empty())
        .collect();
    results.push(TestResult {
        name: "tier_sizes_valid".into(),
        passed: invalid.is_empty(),
        detail: format!("{} invalid tiers", invalid.len()),
    });

    results
}

// ── 2. Floor sweep ──────────────────────────────────────────────────────

#[derive(Default)]
struct SweepStats {
    generated: u32,
    failures: Vec<String>,
    disconnected: Vec<String>,
    open_edges: Vec<String>,
    bad_objectives: Vec<String>,
    not_flat: Vec<String>,
    false_doorways: Vec<String>,
    over_budget: Vec<String>,
    rooms: usize,
    alcoves: usize,
    colliders: usize,
}

fn check_floor(floor: &Floor, size: &FloorSize, tag: &str, stats: &mut SweepStats) {
    let rooms = floor.rooms();
    let corridors = floor.corridors();
    let doors = doorways::detect(rooms, corridors);

    let graph = LayoutGraph::from_doorways(&doors);
    if !graph.unreachable_rooms(SpaceId::Room(0), rooms.len()).is_empty() {
        stats.disconnected.push(tag.to_string());
    }

    let thickness = floor.theme().map_or(0.0, |t| t.wall_thickness);
    let open = geometry::check_enclosure(rooms, corridors, &doors, floor.walls());
    let pillars =
        geometry::check_corner_pillars(rooms, corridors, &doors, floor.pillars(), thickness);
    if floor.theme().is_none() || !open.is_empty() || !pillars.is_empty() {
        stats.open_edges.push(tag.to_string());
    }

    let objectives_ok = match (floor.key_room(), floor.exit_room()) {
        (Some(key), Some(exit)) if key != exit => {
            find_farthest_room(rooms, key) == Some(exit)
                || farthest_pair(rooms) == Some((key, exit))
        }
        _ => false,
    };
    if !objectives_ok {
        stats.bad_objectives.push(tag.to_string());
    }

    if rooms
        .iter()
        .chain(corridors)
        .any(|s| s.floor_elevation() != 0.0 || s.is_sloped())
    {
        stats.not_flat.push(tag.to_string());
    }

    let false_door = doors.iter().any(|d| {
        let (SpaceId::Corridor(c), other) = (d.owner, d.connecting) else {
            return true;
        };
        let owner = &corridors[c];
        let other = match other {
            SpaceId::Room(i) => &rooms[i],
            SpaceId::Corridor(i) => &corridors[i],
        };
        let (line, _) = owner.edge(d.direction);
        let (other_line, _) = other.edge(d.direction.opposite());
        (line - other_line).abs() > tolerances::ADJACENCY || d.span.is_empty()
    });
    if false_door {
        stats.false_doorways.push(tag.to_string());
    }

    let alcoves = rooms
        .iter()
        .filter(|r| r.classification() == Classification::Alcove)
        .count();
    if (rooms.len() - alcoves) as u32 > size.max_rooms {
        stats.over_budget.push(tag.to_string());
    }

    stats.rooms += rooms.len();
    stats.alcoves += alcoves;
    stats.colliders += floor.colliders().len();
}

fn sweep_result(name: &str, failures: &[String], total: u32) -> TestResult {
    TestResult {
        name: name.into(),
        passed: failures.is_empty(),
        detail: if failures.is_empty() {
            format!("all {} floors", total)
        } else {
            format!(
                "{} of {} floors (first: {})",
                failures.len(),
                total,
                failures[0]
            )
        },
    }
}

fn validate_floor_sweep(cli: &Cli) -> Vec<TestResult> {
    println!("--- Floor Sweep ---");
    let mut stats = SweepStats::default();
    let mut attempts = 0u32;

    for floor_index in 1..=cli.floors {
        let size = determine_dungeon_size(floor_index);
        for seed in cli.base_seed..cli.base_seed + cli.seeds {
            attempts += 1;
            let tag = format!("floor {} seed {}", floor_index, seed);
            match FloorGenerator::from_seed(seed).generate(floor_index, size) {
                Ok(floor) => {
                    stats.generated += 1;
                    check_floor(&floor, &size, &tag, &mut stats);
                }
                Err(e) => {
                    log::warn!("{}: {}", tag, e);
                    stats.failures.push(format!("{}: {}", tag, e));
                }
            }
        }
        log::debug!("floor {} swept ({} seeds)", floor_index, cli.seeds);
    }

    let generated = stats.generated.max(1) as usize;
    println!(
        "  {} of {} floors generated, avg {:.1} rooms ({:.1} alcoves), avg {:.0} colliders",
        stats.generated,
        attempts,
        stats.rooms as f32 / generated as f32,
        stats.alcoves as f32 / generated as f32,
        stats.colliders as f32 / generated as f32
    );

    vec![
        sweep_result("sweep_generation", &stats.failures, attempts),
        sweep_result("sweep_connectivity", &stats.disconnected, stats.generated),
        sweep_result("sweep_enclosure", &stats.open_edges, stats.generated),
        sweep_result("sweep_key_exit", &stats.bad_objectives, stats.generated),
        sweep_result("sweep_flatness", &stats.not_flat, stats.generated),
        sweep_result("sweep_doorways", &stats.false_doorways, stats.generated),
        sweep_result("sweep_room_budget", &stats.over_budget, stats.generated),
    ]
}

// ── 3. Determinism ──────────────────────────────────────────────────────

fn validate_determinism(seed: u64) -> Vec<TestResult> {
    println!("--- Determinism ---");
    let mut results = Vec::new();

    for floor_index in [1, 5, 9] {
        let a = FloorGenerator::from_seed(seed).generate_floor(floor_index);
        let b = FloorGenerator::from_seed(seed).generate_floor(floor_index);
        results.push(TestResult {
            name: format!("same_seed_same_floor_{}", floor_index),
            passed: a == b,
            detail: match &a {
                Ok(f) => format!("{} rooms, {} corridors", f.rooms().len(), f.corridors().len()),
                Err(e) => format!("{}", e),
            },
        });
    }

    results
}

// ── 4. Failure handling ─────────────────────────────────────────────────

fn validate_failures() -> Vec<TestResult> {
    println!("--- Failure Handling ---");
    let mut results = Vec::new();

    let bad = FloorSize {
        min_rooms: 1,
        max_rooms: 0,
        extent: -1.0,
    };
    let err = FloorGenerator::from_seed(0).generate(1, bad);
    let (passed, detail) = match &err {
        Err(e) => (
            e.kind() == Some(FailureKind::InitializationFailure),
            e.to_string(),
        ),
        Ok(_) => (false, "invalid size was accepted".to_string()),
    };
    results.push(TestResult {
        name: "invalid_size_rejected".into(),
        passed,
        detail,
    });

    let mut generator = FloorGenerator::from_seed(0);
    let handle = generator.lock_handle();
    let guard = handle.try_acquire();
    let blocked = generator.generate_floor(1);
    drop(guard);
    let released = generator.generate_floor(1);
    results.push(TestResult {
        name: "generation_lock".into(),
        passed: blocked == Err(GenerationError::GenerationInProgress) && released.is_ok(),
        detail: "second generation rejected while one is in flight".into(),
    });

    results
}

// ── 5. Gameplay queries ─────────────────────────────────────────────────

fn validate_gameplay(seed: u64) -> Vec<TestResult> {
    println!("--- Gameplay Queries ---");
    let mut results = Vec::new();

    let mut floor = match FloorGenerator::from_seed(seed).generate_floor(1) {
        Ok(floor) => floor,
        Err(e) => {
            results.push(TestResult {
                name: "gameplay_floor".into(),
                passed: false,
                detail: e.to_string(),
            });
            return results;
        }
    };

    let spawn = floor.player_spawn_position();
    results.push(TestResult {
        name: "spawn_not_at_exit".into(),
        passed: !floor.is_player_at_exit(spawn),
        detail: format!("spawn at ({:.1}, {:.1})", spawn.x, spawn.z),
    });

    let exit = floor.exit_position().unwrap_or_default();
    results.push(TestResult {
        name: "exit_reachable_on_foot".into(),
        passed: floor.is_player_at_exit(Point3::new(exit.x, 0.0, exit.z + 2.0)),
        detail: format!("exit at ({:.1}, {:.1})", exit.x, exit.z),
    });

    let collected_once = floor.collect_key();
    let collected_twice = floor.collect_key();
    results.push(TestResult {
        name: "key_collects_once".into(),
        passed: collected_once && !collected_twice && floor.is_key_collected(),
        detail: format!("first {}, second {}", collected_once, collected_twice),
    });

    results
}
