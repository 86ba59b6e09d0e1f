//! Floor generation pipeline.
//!
//! Generation runs as a fixed sequence of stages. Each stage checks its own
//! postconditions; the first critical stage to fail ends the attempt and the
//! half-built floor is discarded. Decorations and population are
//! non-critical: hook errors and panics are logged and the pipeline moves on.
//!
//! ```
//! use undercroft_logic::pipeline::FloorGenerator;
//!
//! let mut generator = FloorGenerator::from_seed(7);
//! let floor = generator.generate_floor(1).unwrap();
//! assert_ne!(floor.key_room(), floor.exit_room());
//! ```

use crate::config::{
    determine_dungeon_size, select_theme, FloorSize, GeneratorSettings, PopulationMode,
};
use crate::doorways::{self, Doorway};
use crate::error::{FailureKind, GenerationError};
use crate::floor::Floor;
use crate::geometry::{self, Severity};
use crate::layout::{generate_layout, Layout};
use crate::objectives::place_objectives;
use crate::space::Classification;
use crate::walls;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Pipeline stages in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Stage {
    Initialized,
    OldFloorCleared,
    ThemeSelected,
    RoomsGenerated,
    KeyAndExitPlaced,
    SpawnPositionSet,
    GeometrySynthesized,
    DecorationsPlaced,
    PopulationSpawned,
    Finalized,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Initialized,
        Stage::OldFloorCleared,
        Stage::ThemeSelected,
        Stage::RoomsGenerated,
        Stage::KeyAndExitPlaced,
        Stage::SpawnPositionSet,
        Stage::GeometrySynthesized,
        Stage::DecorationsPlaced,
        Stage::PopulationSpawned,
        Stage::Finalized,
    ];

    pub fn next(self) -> Option<Stage> {
        let i = Stage::ALL.iter().position(|s| *s == self)?;
        Stage::ALL.get(i + 1).copied()
    }

    /// Whether a failure here ends the attempt.
    pub fn is_critical(self) -> bool {
        !matches!(self, Stage::DecorationsPlaced | Stage::PopulationSpawned)
    }

    /// The failure reported when this stage's postconditions do not hold.
    pub fn failure_kind(self) -> FailureKind {
        match self {
            Stage::Initialized | Stage::OldFloorCleared | Stage::ThemeSelected => {
                FailureKind::InitializationFailure
            }
            Stage::RoomsGenerated => FailureKind::RoomGenerationFailure,
            Stage::KeyAndExitPlaced | Stage::SpawnPositionSet => FailureKind::PlacementFailure,
            Stage::GeometrySynthesized
            | Stage::DecorationsPlaced
            | Stage::PopulationSpawned
            | Stage::Finalized => FailureKind::GeometryFailure,
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Where a generation attempt stands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    /// About to run this stage.
    Running(Stage),
    Failed { stage: Stage, kind: FailureKind },
    Finalized,
}

impl PipelineState {
    pub fn start() -> Self {
        PipelineState::Running(Stage::Initialized)
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, PipelineState::Running(_))
    }

    /// Advance past the running stage given its outcome. Non-critical
    /// stages advance even on failure; terminal states never change.
    pub fn transition(self, outcome: Result<(), FailureKind>) -> PipelineState {
        let PipelineState::Running(stage) = self else {
            return self;
        };
        match outcome {
            Err(kind) if stage.is_critical() => PipelineState::Failed { stage, kind },
            _ => stage
                .next()
                .map_or(PipelineState::Finalized, PipelineState::Running),
        }
    }
}

pub type HookError = Box<dyn std::error::Error + Send + Sync>;

/// Non-critical decoration stage. Errors are logged, never fatal.
pub trait FloorDecorator {
    fn decorate(&mut self, floor: &Floor) -> Result<(), HookError>;
}

/// Non-critical population stage. Errors are logged, never fatal.
pub trait FloorPopulator {
    fn populate(&mut self, floor: &Floor) -> Result<(), HookError>;
}

/// Decorator that does nothing.
pub struct NoDecorations;

impl FloorDecorator for NoDecorations {
    fn decorate(&mut self, _floor: &Floor) -> Result<(), HookError> {
        Ok(())
    }
}

/// Populator that does nothing.
pub struct NoPopulation;

impl FloorPopulator for NoPopulation {
    fn populate(&mut self, _floor: &Floor) -> Result<(), HookError> {
        Ok(())
    }
}

/// Shared in-flight flag. Clones observe the same flag, so a handle held
/// elsewhere can see (or block) generation.
#[derive(Debug, Clone, Default)]
pub struct GenerationLock(Arc<AtomicBool>);

impl GenerationLock {
    /// Take the lock, or `None` if a generation is already running.
    pub fn try_acquire(&self) -> Option<GenerationGuard> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| GenerationGuard(Arc::clone(&self.0)))
    }

    pub fn is_held(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the lock on drop.
#[derive(Debug)]
pub struct GenerationGuard(Arc<AtomicBool>);

impl Drop for GenerationGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// A finished floor plus how the pipeline got there.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub floor: Floor,
    /// Stages in the order they completed.
    pub completed: Vec<Stage>,
    /// Validation warnings that did not block the floor.
    pub warnings: Vec<String>,
    /// Population was deferred and still has to be run.
    pub population_pending: bool,
}

/// Per-attempt scratch state.
struct Attempt {
    floor: Floor,
    previous: Option<Floor>,
    doorways: Vec<Doorway>,
    warnings: Vec<String>,
    population_pending: bool,
}

fn run_hook(name: &str, hook: impl FnOnce() -> Result<(), HookError>) -> bool {
    match panic::catch_unwind(AssertUnwindSafe(hook)) {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            log::warn!("{} failed: {}", name, e);
            false
        }
        Err(_) => {
            log::warn!("{} panicked", name);
            false
        }
    }
}

/// Everything wrong with a fresh layout.
fn layout_problems(layout: &Layout, doorways: &[Doorway]) -> Vec<String> {
    let mut problems = Vec::new();
    match layout.rooms.first() {
        None => {
            problems.push("layout has no rooms".to_string());
            return problems;
        }
        Some(first) if first.classification() != Classification::Spawn => {
            problems.push(format!(
                "room 0 is {:?}, expected the spawn room",
                first.classification()
            ));
        }
        Some(_) => {}
    }
    if layout.count(Classification::Radial) == 0 {
        problems.push("layout has no radial room".to_string());
    }
    problems.extend(
        geometry::check_connectivity(&layout.rooms, doorways)
            .into_iter()
            .map(|e| e.message),
    );
    problems.extend(
        geometry::check_flatness(&layout.rooms, &layout.corridors)
            .into_iter()
            .map(|e| e.message),
    );
    problems
}

/// Drives the pipeline with one injected random source.
pub struct FloorGenerator<R = ChaCha8Rng> {
    rng: R,
    settings: GeneratorSettings,
    decorator: Box<dyn FloorDecorator>,
    populator: Box<dyn FloorPopulator>,
    lock: GenerationLock,
}

impl FloorGenerator<ChaCha8Rng> {
    /// Reproducible generator: the same seed yields the same floors.
    pub fn from_seed(seed: u64) -> Self {
        Self::new(ChaCha8Rng::seed_from_u64(seed))
    }
}

impl<R: Rng> FloorGenerator<R> {
    pub fn new(rng: R) -> Self {
        Self {
            rng,
            settings: GeneratorSettings::default(),
            decorator: Box::new(NoDecorations),
            populator: Box::new(NoPopulation),
            lock: GenerationLock::default(),
        }
    }

    pub fn with_settings(mut self, settings: GeneratorSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_decorator(mut self, decorator: impl FloorDecorator + 'static) -> Self {
        self.decorator = Box::new(decorator);
        self
    }

    pub fn with_populator(mut self, populator: impl FloorPopulator + 'static) -> Self {
        self.populator = Box::new(populator);
        self
    }

    pub fn settings(&self) -> &GeneratorSettings {
        &self.settings
    }

    /// Handle on this generator's in-flight flag.
    pub fn lock_handle(&self) -> GenerationLock {
        self.lock.clone()
    }

    /// Generate floor `floor_index` sized by its tier.
    pub fn generate_floor(&mut self, floor_index: u32) -> Result<Floor, GenerationError> {
        self.generate(floor_index, determine_dungeon_size(floor_index))
    }

    pub fn generate(
        &mut self,
        floor_index: u32,
        size: FloorSize,
    ) -> Result<Floor, GenerationError> {
        self.generate_replacing(None, floor_index, size)
    }

    /// Generate a floor, dropping `previous` before any new space is built.
    pub fn generate_replacing(
        &mut self,
        previous: Option<Floor>,
        floor_index: u32,
        size: FloorSize,
    ) -> Result<Floor, GenerationError> {
        self.generate_with_report(previous, floor_index, size)
            .map(|report| report.floor)
    }

    /// Run deferred population on a floor generated with
    /// [`PopulationMode::Deferred`]. Returns whether the populator succeeded.
    pub fn spawn_deferred_population(&mut self, floor: &Floor) -> bool {
        let populator = &mut self.populator;
        run_hook("deferred population", || populator.populate(floor))
    }

    pub fn generate_with_report(
        &mut self,
        previous: Option<Floor>,
        floor_index: u32,
        size: FloorSize,
    ) -> Result<GenerationReport, GenerationError> {
        let _guard = self
            .lock
            .try_acquire()
            .ok_or(GenerationError::GenerationInProgress)?;

        log::info!(
            "generating floor {}: {}..={} rooms, extent {}",
            floor_index,
            size.min_rooms,
            size.max_rooms,
            size.extent
        );

        let mut attempt = Attempt {
            floor: Floor::empty(floor_index, size.extent),
            previous,
            doorways: Vec::new(),
            warnings: Vec::new(),
            population_pending: false,
        };
        let mut completed = Vec::with_capacity(Stage::ALL.len());
        let mut state = PipelineState::start();

        while let PipelineState::Running(stage) = state {
            let outcome = self.run_stage(stage, &size, &mut attempt);
            let problems = match &outcome {
                Ok(()) => {
                    log::debug!("floor {}: {} done", floor_index, stage);
                    completed.push(stage);
                    Vec::new()
                }
                Err(problems) => problems.clone(),
            };
            state = state.transition(outcome.map_err(|_| stage.failure_kind()));
            if let PipelineState::Failed { stage, kind } = state {
                log::error!(
                    "floor {} failed at {} ({}): {}",
                    floor_index,
                    stage,
                    kind,
                    problems.join("; ")
                );
                return Err(GenerationError::Failed {
                    floor_index,
                    stage,
                    kind,
                    problems,
                });
            }
        }

        log::info!(
            "floor {} ready: {} rooms, {} corridor segments, {} colliders",
            floor_index,
            attempt.floor.rooms().len(),
            attempt.floor.corridors().len(),
            attempt.floor.colliders().len()
        );
        Ok(GenerationReport {
            floor: attempt.floor,
            completed,
            warnings: attempt.warnings,
            population_pending: attempt.population_pending,
        })
    }

    fn run_stage(
        &mut self,
        stage: Stage,
        size: &FloorSize,
        a: &mut Attempt,
    ) -> Result<(), Vec<String>> {
        match stage {
            Stage::Initialized => {
                let mut problems = size.problems();
                if self.settings.themes.is_empty() {
                    problems.push("theme table is empty".to_string());
                }
                if self.settings.exit_radius.is_nan() || self.settings.exit_radius <= 0.0 {
                    problems.push(format!(
                        "exit radius must be positive, got {}",
                        self.settings.exit_radius
                    ));
                }
                if !problems.is_empty() {
                    return Err(problems);
                }
                a.floor.set_exit_radius(self.settings.exit_radius);
            }
            Stage::OldFloorCleared => {
                if let Some(old) = a.previous.take() {
                    log::debug!("dropping floor {}", old.floor_index());
                }
            }
            Stage::ThemeSelected => {
                let index = a.floor.floor_index();
                let theme = select_theme(&self.settings.themes, index)
                    .cloned()
                    .ok_or_else(|| vec![format!("no theme for floor {}", index)])?;
                log::debug!("floor {} theme: {}", index, theme.name);
                a.floor.set_theme(theme);
            }
            Stage::RoomsGenerated => {
                let layout = generate_layout(&mut self.rng, size).map_err(|e| vec![e.to_string()])?;
                let found = doorways::detect(&layout.rooms, &layout.corridors);
                let problems = layout_problems(&layout, &found);
                if !problems.is_empty() {
                    return Err(problems);
                }
                a.doorways = found;
                a.floor.add_spaces(layout.rooms, layout.corridors);
            }
            Stage::KeyAndExitPlaced => {
                let o = place_objectives(&mut self.rng, a.floor.rooms())
                    .map_err(|e| vec![e.to_string()])?;
                if o.key_room == o.exit_room {
                    return Err(vec![format!("key and exit share room {}", o.key_room)]);
                }
                a.floor
                    .set_objectives(o.key_room, o.exit_room, o.key_position, o.exit_position);
            }
            Stage::SpawnPositionSet => {
                let spawn = a
                    .floor
                    .spawn_room()
                    .map(|room| room.center())
                    .ok_or_else(|| vec!["no spawn room".to_string()])?;
                a.floor.set_player_spawn(spawn);
            }
            Stage::GeometrySynthesized => {
                let (height, thickness) = a
                    .floor
                    .theme()
                    .map(|t| (t.wall_height, t.wall_thickness))
                    .ok_or_else(|| vec!["no theme selected".to_string()])?;
                let rooms = a.floor.rooms();
                let corridors = a.floor.corridors();
                let enclosure = walls::enclose_all(rooms, corridors, &a.doorways, thickness);
                let spaces: Vec<_> = rooms.iter().chain(corridors).cloned().collect();
                let colliders = walls::colliders(&enclosure, &spaces, height, thickness);

                let mut problems = Vec::new();
                if colliders.is_empty() {
                    problems.push("no colliders generated".to_string());
                }
                let findings = geometry::validate_all(
                    rooms,
                    corridors,
                    &a.doorways,
                    &enclosure,
                    thickness,
                    a.floor.extent(),
                );
                for finding in findings {
                    match finding.severity {
                        Severity::Error => problems.push(finding.message),
                        Severity::Warning => {
                            log::warn!("floor {}: {}", a.floor.floor_index(), finding.message);
                            a.warnings.push(finding.message);
                        }
                    }
                }
                if !problems.is_empty() {
                    return Err(problems);
                }
                a.floor.set_geometry(enclosure, colliders);
            }
            Stage::DecorationsPlaced => {
                let decorator = &mut self.decorator;
                let floor = &a.floor;
                run_hook("decoration", || decorator.decorate(floor));
            }
            Stage::PopulationSpawned => match self.settings.population {
                PopulationMode::Immediate => {
                    let populator = &mut self.populator;
                    let floor = &a.floor;
                    run_hook("population", || populator.populate(floor));
                }
                PopulationMode::Deferred => {
                    log::debug!("population deferred for floor {}", a.floor.floor_index());
                    a.population_pending = true;
                }
            },
            Stage::Finalized => {}
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Theme;
    use crate::space::Space;
    use std::sync::atomic::AtomicU32;

    struct Counting(Arc<AtomicU32>);

    impl FloorPopulator for Counting {
        fn populate(&mut self, _floor: &Floor) -> Result<(), HookError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Failing;

    impl FloorDecorator for Failing {
        fn decorate(&mut self, _floor: &Floor) -> Result<(), HookError> {
            Err("out of torches".into())
        }
    }

    struct Panicking;

    impl FloorPopulator for Panicking {
        fn populate(&mut self, _floor: &Floor) -> Result<(), HookError> {
            panic!("spawner exploded");
        }
    }

    #[test]
    fn test_stage_order() {
        let mut stage = Stage::Initialized;
        let mut seen = vec![stage];
        while let Some(next) = stage.next() {
            seen.push(next);
            stage = next;
        }
        assert_eq!(seen, Stage::ALL.to_vec());
    }

    #[test]
    fn test_transition_success_path() {
        let mut state = PipelineState::start();
        for _ in 0..Stage::ALL.len() {
            assert!(!state.is_terminal());
            state = state.transition(Ok(()));
        }
        assert_eq!(state, PipelineState::Finalized);
    }

    #[test]
    fn test_transition_critical_failure() {
        let state = PipelineState::Running(Stage::RoomsGenerated)
            .transition(Err(FailureKind::RoomGenerationFailure));
        assert_eq!(
            state,
            PipelineState::Failed {
                stage: Stage::RoomsGenerated,
                kind: FailureKind::RoomGenerationFailure
            }
        );
        assert_eq!(state.transition(Ok(())), state);
    }

    #[test]
    fn test_transition_non_critical_failure_advances() {
        let state = PipelineState::Running(Stage::DecorationsPlaced)
            .transition(Err(FailureKind::GeometryFailure));
        assert_eq!(state, PipelineState::Running(Stage::PopulationSpawned));
    }

    #[test]
    fn test_generate_completes_every_stage() {
        let mut generator = FloorGenerator::from_seed(11);
        let report = generator
            .generate_with_report(None, 1, determine_dungeon_size(1))
            .unwrap();
        assert_eq!(report.completed, Stage::ALL.to_vec());
        assert!(!report.population_pending);
        assert!(!generator.lock_handle().is_held());
    }

    #[test]
    fn test_invalid_size_fails_initialization() {
        let mut generator = FloorGenerator::from_seed(1);
        let size = FloorSize {
            min_rooms: 8,
            max_rooms: 2,
            extent: 200.0,
        };
        let err = generator.generate(1, size).unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::InitializationFailure));
        assert_eq!(err.stage(), Some(Stage::Initialized));
        assert!(err.to_string().contains("exceeds max_rooms"));
    }

    #[test]
    fn test_empty_theme_table_fails_initialization() {
        let settings = GeneratorSettings {
            themes: Vec::new(),
            ..GeneratorSettings::default()
        };
        let mut generator = FloorGenerator::from_seed(1).with_settings(settings);
        let err = generator.generate_floor(1).unwrap_err();
        assert_eq!(err.kind(), Some(FailureKind::InitializationFailure));
    }

    #[test]
    fn test_held_lock_rejects_generation() {
        let mut generator = FloorGenerator::from_seed(1);
        let handle = generator.lock_handle();
        let guard = handle.try_acquire().unwrap();
        assert_eq!(
            generator.generate_floor(1),
            Err(GenerationError::GenerationInProgress)
        );
        drop(guard);
        assert!(generator.generate_floor(1).is_ok());
    }

    #[test]
    fn test_failing_hooks_are_not_fatal() {
        let mut generator = FloorGenerator::from_seed(5)
            .with_decorator(Failing)
            .with_populator(Panicking);
        let report = generator
            .generate_with_report(None, 2, determine_dungeon_size(2))
            .unwrap();
        assert!(report.completed.contains(&Stage::DecorationsPlaced));
        assert!(report.completed.contains(&Stage::PopulationSpawned));
        assert!(!generator.lock_handle().is_held());
    }

    #[test]
    fn test_deferred_population() {
        let calls = Arc::new(AtomicU32::new(0));
        let settings = GeneratorSettings {
            population: PopulationMode::Deferred,
            ..GeneratorSettings::default()
        };
        let mut generator = FloorGenerator::from_seed(3)
            .with_settings(settings)
            .with_populator(Counting(Arc::clone(&calls)));
        let report = generator
            .generate_with_report(None, 1, determine_dungeon_size(1))
            .unwrap();
        assert!(report.population_pending);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(generator.spawn_deferred_population(&report.floor));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_immediate_population_runs_once() {
        let calls = Arc::new(AtomicU32::new(0));
        let mut generator =
            FloorGenerator::from_seed(3).with_populator(Counting(Arc::clone(&calls)));
        generator.generate_floor(1).unwrap();
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_replacing_previous_floor() {
        let mut generator = FloorGenerator::from_seed(9);
        let first = generator.generate_floor(1).unwrap();
        let second = generator
            .generate_replacing(Some(first), 2, determine_dungeon_size(2))
            .unwrap();
        assert_eq!(second.floor_index(), 2);
    }

    #[test]
    fn test_theme_follows_tier() {
        let mut generator = FloorGenerator::from_seed(9);
        let floor = generator.generate_floor(9).unwrap();
        let theme: &Theme = floor.theme().unwrap();
        assert_eq!(theme.name, "Abyss");
    }

    #[test]
    fn test_layout_problems_reported() {
        let layout = Layout {
            rooms: vec![
                Space::centered(100.0, 100.0, 20.0, 20.0, Classification::Radial).unwrap(),
                Space::centered(150.0, 150.0, 10.0, 10.0, Classification::Normal).unwrap(),
            ],
            corridors: Vec::new(),
        };
        let problems = layout_problems(&layout, &[]);
        assert_eq!(problems.len(), 2, "{:?}", problems);
        assert!(problems[0].contains("expected the spawn room"));
        assert!(problems[1].contains("unreachable"));

        let empty = Layout {
            rooms: Vec::new(),
            corridors: Vec::new(),
        };
        assert_eq!(layout_problems(&empty, &[]), vec!["layout has no rooms".to_string()]);
    }
}
